use std::sync::Arc;

use axum::routing::get;
use axum::Router;
use chrono::{TimeZone, Utc};
use testcontainers::runners::AsyncRunner;
use testcontainers::ContainerAsync;
use testcontainers_modules::meilisearch::Meilisearch;
use testcontainers_modules::mongo::Mongo;

use vdw_search::db::models::{slugify, ContentEntity, ContentStatus, TagName};
use vdw_search::db::repository::{ContentRepository, MongoContentRepository};
use vdw_search::search::client::{MeilisearchEngine, SearchEngine};
use vdw_search::state::AppState;

/// Holds running containers and the wired search services for integration tests.
///
/// Containers are kept alive for as long as this struct lives. When dropped,
/// containers are stopped and cleaned up automatically.
pub struct TestEnv {
    _mongo: ContainerAsync<Mongo>,
    _meili: ContainerAsync<Meilisearch>,
    pub meili_url: String,
    pub index_name: String,
    pub state: AppState,
    pub router: Router,
}

impl TestEnv {
    /// Spin up MongoDB and Meilisearch and configure the index.
    pub async fn start() -> Self {
        let (mongo_container, meili_container) =
            tokio::join!(Mongo::default().start(), Meilisearch::default().start());
        let mongo_container = mongo_container.expect("Failed to start MongoDB container");
        let meili_container = meili_container.expect("Failed to start Meilisearch container");

        // --- MongoDB ---
        let mongo_port = mongo_container
            .get_host_port_ipv4(27017)
            .await
            .expect("Failed to get MongoDB port");
        let mongo_uri = format!("mongodb://127.0.0.1:{}", mongo_port);
        let mongo_client = mongodb::Client::with_uri_str(&mongo_uri)
            .await
            .expect("Failed to connect to MongoDB");
        let content_repo: Arc<dyn ContentRepository> = Arc::new(MongoContentRepository::new(
            &mongo_client.database("vdw_test"),
        ));

        // --- Meilisearch ---
        let meili_port = meili_container
            .get_host_port_ipv4(7700)
            .await
            .expect("Failed to get Meilisearch port");
        let meili_url = format!("http://127.0.0.1:{}", meili_port);
        let index_name = format!("pages_test_{}", uuid::Uuid::new_v4().simple());
        let engine: Arc<dyn SearchEngine> = Arc::new(
            MeilisearchEngine::new(&meili_url, None, &index_name)
                .expect("Failed to create MeilisearchEngine"),
        );

        let state = AppState::new(engine, content_repo);
        state
            .index_manager
            .initialize()
            .await
            .expect("Failed to configure Meilisearch index");

        let router = Router::new()
            .route(
                "/api/v1/search",
                get(vdw_search::api::search::search_handler),
            )
            .with_state(state.clone());

        Self {
            _mongo: mongo_container,
            _meili: meili_container,
            meili_url,
            index_name,
            state,
            router,
        }
    }

    /// Build an `axum_test::TestServer` from this environment's router.
    pub fn server(&self) -> axum_test::TestServer {
        axum_test::TestServer::builder()
            .try_build(self.router.clone())
            .expect("Failed to build TestServer")
    }

    /// A raw SDK client, for poking at index state directly.
    pub fn meili_client(&self) -> meilisearch_sdk::client::Client {
        meilisearch_sdk::client::Client::new(&self.meili_url, None::<String>)
            .expect("Failed to create Meilisearch client")
    }

    /// Helper: store a page and run the save hook, as the content store would.
    pub async fn publish(&self, entity: &ContentEntity) {
        self.state
            .content_repo
            .save(entity)
            .await
            .expect("Failed to save page");
        self.state.search_sync.on_save(entity).await;
    }
}

/// Build a page with a deterministic modification time derived from `id`.
pub fn page(id: i64, title: &str, tags: &[&str], status: ContentStatus) -> ContentEntity {
    ContentEntity {
        id,
        title: title.to_string(),
        slug: slugify(title),
        plain_text_body: format!("{title}. Notes about vitamin D levels."),
        html_body: format!("<p>{title}. Notes about vitamin D levels.</p>"),
        tags: tags
            .iter()
            .map(|t| TagName::new(*t).expect("valid tag"))
            .collect(),
        status,
        created_at: Utc.with_ymd_and_hms(2022, 1, 1, 0, 0, 0).unwrap(),
        modified_at: Utc.timestamp_opt(1_700_000_000 + id * 60, 0).unwrap(),
    }
}
