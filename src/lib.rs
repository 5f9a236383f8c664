pub mod error;
pub mod db {
    pub mod models;
    pub mod repository;
}
pub mod search {
    pub mod client;
    pub mod document;
    pub mod hooks;
    pub mod index;
    pub mod indexer;
    pub mod query;
    pub mod relevance;
}
pub mod api {
    pub mod errors;
    pub mod search;
}

#[cfg(feature = "ssr")]
pub mod config;
#[cfg(feature = "ssr")]
pub mod state;

#[cfg(feature = "ssr")]
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "vdw_search=info".into()),
        )
        .init();
}
