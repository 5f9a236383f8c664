use std::sync::Arc;

use crate::db::models::ContentEntity;
use crate::search::indexer::Indexer;

/// Hooks the content store calls after it changes a page.
///
/// The store stays the source of truth: an indexing failure is logged and
/// never fails the save that triggered it. A later reindex repairs the index.
pub struct SearchSync {
    indexer: Arc<Indexer>,
}

impl SearchSync {
    pub fn new(indexer: Arc<Indexer>) -> Self {
        Self { indexer }
    }

    /// A page was created or updated.
    pub async fn on_save(&self, entity: &ContentEntity) {
        if let Err(e) = self.indexer.upsert(entity).await {
            tracing::warn!(id = entity.id, "Failed to sync saved page to search: {e}");
        }
    }

    /// A page was deleted from the store.
    pub async fn on_delete(&self, id: i64) {
        if let Err(e) = self.indexer.remove(id).await {
            tracing::warn!(id, "Failed to remove deleted page from search: {e}");
        }
    }

    /// Tags were attached to or detached from a page.
    pub async fn on_tags_changed(&self, entity: &ContentEntity) {
        if let Err(e) = self.indexer.upsert(entity).await {
            tracing::warn!(id = entity.id, "Failed to reindex page after tag change: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::{ContentStatus, TagName};
    use crate::search::indexer::tests::{page, RecordingEngine};

    fn hooks() -> (Arc<RecordingEngine>, SearchSync) {
        let engine = Arc::new(RecordingEngine::default());
        let indexer = Arc::new(Indexer::new(engine.clone()));
        (engine, SearchSync::new(indexer))
    }

    #[tokio::test]
    async fn test_save_then_unpublish() {
        let (engine, sync) = hooks();
        let mut entity = page(1, "Gut", &[], ContentStatus::Published);

        sync.on_save(&entity).await;
        assert!(engine.documents.lock().unwrap().contains_key(&1));

        entity.status = ContentStatus::Draft;
        sync.on_save(&entity).await;
        assert!(!engine.documents.lock().unwrap().contains_key(&1));
    }

    #[tokio::test]
    async fn test_tag_change_recomputes_priority() {
        let (engine, sync) = hooks();
        let mut entity = page(2, "Gut and vitamin D", &[], ContentStatus::Published);
        sync.on_save(&entity).await;
        assert_eq!(engine.documents.lock().unwrap()[&2].search_priority, 0);

        entity.tags.push(TagName::new("Overview").unwrap());
        sync.on_tags_changed(&entity).await;

        let docs = engine.documents.lock().unwrap();
        assert_eq!(docs[&2].search_priority, 3);
        assert_eq!(docs[&2].tags, vec!["Overview"]);
    }

    #[tokio::test]
    async fn test_delete_removes_document() {
        let (engine, sync) = hooks();
        sync.on_save(&page(3, "Gut", &[], ContentStatus::Published))
            .await;

        sync.on_delete(3).await;
        assert!(engine.documents.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_engine_failure_does_not_propagate() {
        let engine = Arc::new(RecordingEngine {
            fail_writes: true,
            ..Default::default()
        });
        let sync = SearchSync::new(Arc::new(Indexer::new(engine.clone())));

        // Completes without panicking or returning an error.
        sync.on_save(&page(4, "Gut", &[], ContentStatus::Published))
            .await;
        assert!(engine.documents.lock().unwrap().is_empty());
    }
}
