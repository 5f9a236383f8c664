use std::sync::Arc;

use futures::{Stream, StreamExt};

use crate::db::models::ContentEntity;
use crate::error::{AppError, EngineError};
use crate::search::client::SearchEngine;
use crate::search::document::{format_entity, SearchDocument};

/// Documents sent to the engine per bulk write.
pub const BULK_BATCH_SIZE: usize = 100;

/// Counters reported by [`Indexer::bulk_reindex`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReindexStats {
    pub indexed: usize,
    pub skipped: usize,
    pub batches: usize,
}

/// Keeps the engine index in step with the content store.
pub struct Indexer {
    engine: Arc<dyn SearchEngine>,
}

impl Indexer {
    pub fn new(engine: Arc<dyn SearchEngine>) -> Self {
        Self { engine }
    }

    /// Write the entity's document, or drop it from the index when unpublished.
    pub async fn upsert(&self, entity: &ContentEntity) -> Result<(), EngineError> {
        if !entity.status.is_published() {
            return self.remove(entity.id).await;
        }

        let doc = format_entity(entity);
        self.engine.add_documents(std::slice::from_ref(&doc)).await?;
        tracing::debug!(id = entity.id, priority = doc.search_priority, "Indexed page");
        Ok(())
    }

    /// Delete a document by id. Deleting an absent id is a no-op.
    pub async fn remove(&self, id: i64) -> Result<(), EngineError> {
        self.engine.delete_document(id).await?;
        tracing::debug!(id, "Removed page from search index");
        Ok(())
    }

    /// Delete every document from the index.
    pub async fn clear(&self) -> Result<(), EngineError> {
        self.engine.delete_all_documents().await?;
        tracing::info!("Search index cleared");
        Ok(())
    }

    /// Index a stream of entities in batches of [`BULK_BATCH_SIZE`].
    ///
    /// Holds at most one batch in memory. Unpublished entities are skipped.
    /// Batches are flushed in stream order; the first failure stops the run.
    pub async fn bulk_reindex<S>(&self, entities: S) -> Result<ReindexStats, AppError>
    where
        S: Stream<Item = Result<ContentEntity, AppError>>,
    {
        let mut entities = std::pin::pin!(entities);
        let mut stats = ReindexStats::default();
        let mut batch: Vec<SearchDocument> = Vec::with_capacity(BULK_BATCH_SIZE);

        while let Some(entity) = entities.next().await {
            let entity = entity?;
            if !entity.status.is_published() {
                stats.skipped += 1;
                continue;
            }

            batch.push(format_entity(&entity));
            if batch.len() >= BULK_BATCH_SIZE {
                self.flush(&mut batch, &mut stats).await?;
            }
        }

        if !batch.is_empty() {
            self.flush(&mut batch, &mut stats).await?;
        }

        tracing::info!(
            indexed = stats.indexed,
            skipped = stats.skipped,
            batches = stats.batches,
            "Bulk reindex finished"
        );
        Ok(stats)
    }

    async fn flush(
        &self,
        batch: &mut Vec<SearchDocument>,
        stats: &mut ReindexStats,
    ) -> Result<(), EngineError> {
        self.engine.add_documents(batch).await?;
        stats.indexed += batch.len();
        stats.batches += 1;
        tracing::debug!(size = batch.len(), total = stats.indexed, "Flushed batch");
        batch.clear();
        Ok(())
    }
}
