use std::sync::Arc;

use crate::config::AppConfig;
use crate::db::repository::{ContentRepository, MongoContentRepository};
use crate::error::AppError;
use crate::search::client::{MeilisearchEngine, SearchEngine};
use crate::search::hooks::SearchSync;
use crate::search::index::IndexManager;
use crate::search::indexer::Indexer;
use crate::search::query::QueryService;

/// Shared services handed to request handlers and the content lifecycle.
#[derive(Clone)]
pub struct AppState {
    pub content_repo: Arc<dyn ContentRepository>,
    pub index_manager: Arc<IndexManager>,
    pub indexer: Arc<Indexer>,
    pub query_service: Arc<QueryService>,
    pub search_sync: Arc<SearchSync>,
}

impl AppState {
    /// Wire the search services around an engine and a content store.
    pub fn new(engine: Arc<dyn SearchEngine>, content_repo: Arc<dyn ContentRepository>) -> Self {
        let index_manager = Arc::new(IndexManager::new(engine.clone()));
        let indexer = Arc::new(Indexer::new(engine.clone()));
        let query_service = Arc::new(QueryService::new(
            engine,
            index_manager.clone(),
            content_repo.clone(),
        ));
        let search_sync = Arc::new(SearchSync::new(indexer.clone()));

        Self {
            content_repo,
            index_manager,
            indexer,
            query_service,
            search_sync,
        }
    }

    /// Connect to MongoDB and Meilisearch as configured.
    pub async fn connect(config: &AppConfig) -> Result<Self, AppError> {
        let mongo_client = mongodb::Client::with_uri_str(&config.mongodb_uri)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to MongoDB: {e}")))?;
        let mongo_db = mongo_client.database(&config.mongodb_database);
        let content_repo: Arc<dyn ContentRepository> =
            Arc::new(MongoContentRepository::new(&mongo_db));

        tracing::info!("Connected to MongoDB at {}", config.mongodb_uri);

        let engine: Arc<dyn SearchEngine> = Arc::new(MeilisearchEngine::from_config(config)?);

        Ok(Self::new(engine, content_repo))
    }
}
