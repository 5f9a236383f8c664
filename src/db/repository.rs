use async_trait::async_trait;
use futures::stream::BoxStream;

use crate::db::models::ContentEntity;
#[cfg(feature = "ssr")]
use crate::db::models::ContentStatus;
use crate::error::AppError;

/// A stream of content entities, read one at a time from the store.
pub type EntityStream = BoxStream<'static, Result<ContentEntity, AppError>>;

/// Repository trait for the content store the search layer reads from.
///
/// This trait allows mocking the database layer in tests.
#[async_trait]
pub trait ContentRepository: Send + Sync {
    /// Stream every published entity without collecting them.
    async fn stream_published(&self) -> Result<EntityStream, AppError>;

    /// Published overview pages that the query lands on.
    ///
    /// An overview page has "overview" in its title or in one of its tags.
    /// It matches when the title contains the query or a tag equals it,
    /// both case-insensitively. Newest first, at most `limit`.
    async fn find_overview_candidates(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<ContentEntity>, AppError>;

    /// Create an entity or replace the one with the same id.
    async fn save(&self, entity: &ContentEntity) -> Result<(), AppError>;

    /// Delete an entity by id.
    async fn delete(&self, id: i64) -> Result<(), AppError>;
}

/// MongoDB implementation of the ContentRepository.
///
/// This is only available when the `ssr` feature is enabled (i.e., server-side).
#[cfg(feature = "ssr")]
pub struct MongoContentRepository {
    collection: mongodb::Collection<ContentEntity>,
}

#[cfg(feature = "ssr")]
impl MongoContentRepository {
    pub fn new(db: &mongodb::Database) -> Self {
        Self {
            collection: db.collection("pages"),
        }
    }
}

/// Case-insensitive regex filters for an overview lookup.
#[cfg(feature = "ssr")]
fn overview_filter(query: &str) -> bson::Document {
    use bson::doc;

    let escaped = regex::escape(query.trim());
    let exact = format!("^{escaped}$");

    doc! {
        "status": ContentStatus::Published.as_str(),
        "$and": [
            { "$or": [
                { "title": { "$regex": "overview", "$options": "i" } },
                { "tags": { "$regex": "overview", "$options": "i" } },
            ] },
            { "$or": [
                { "title": { "$regex": escaped, "$options": "i" } },
                { "tags": { "$regex": exact, "$options": "i" } },
            ] },
        ]
    }
}

#[cfg(feature = "ssr")]
#[async_trait]
impl ContentRepository for MongoContentRepository {
    async fn stream_published(&self) -> Result<EntityStream, AppError> {
        use futures::{StreamExt, TryStreamExt};
        use mongodb::bson::doc;

        let cursor = self
            .collection
            .find(doc! { "status": ContentStatus::Published.as_str() })
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(cursor
            .map_err(|e| AppError::Database(e.to_string()))
            .boxed())
    }

    async fn find_overview_candidates(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<ContentEntity>, AppError> {
        use futures::TryStreamExt;
        use mongodb::bson::doc;
        use mongodb::options::FindOptions;

        let options = FindOptions::builder()
            .sort(doc! { "modified_at": -1 })
            .limit(i64::try_from(limit).unwrap_or(i64::MAX))
            .build();

        let cursor = self
            .collection
            .find(overview_filter(query))
            .with_options(options)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        cursor
            .try_collect()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    async fn save(&self, entity: &ContentEntity) -> Result<(), AppError> {
        use mongodb::bson::doc;
        use mongodb::options::ReplaceOptions;

        let options = ReplaceOptions::builder().upsert(true).build();

        self.collection
            .replace_one(doc! { "id": entity.id }, entity)
            .with_options(options)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(())
    }

    async fn delete(&self, id: i64) -> Result<(), AppError> {
        use mongodb::bson::doc;

        self.collection
            .delete_one(doc! { "id": id })
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(())
    }
}
