use std::collections::HashMap;

use serde::Deserialize;

use crate::error::AppError;

/// Service configuration, read from `VDW_*` environment variables.
///
/// - `VDW_MEILISEARCH_URL`, `VDW_MEILISEARCH_API_KEY`, `VDW_INDEX_NAME`
/// - `VDW_MONGODB_URI`, `VDW_MONGODB_DATABASE`
/// - `VDW_BIND_ADDR`
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub meilisearch_url: String,
    #[serde(default)]
    pub meilisearch_api_key: Option<String>,
    pub index_name: String,
    pub mongodb_uri: String,
    pub mongodb_database: String,
    pub bind_addr: String,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, AppError> {
        Self::load(None)
    }

    /// Load defaults overlaid with `env`, or the process environment when `None`.
    pub fn load(env: Option<HashMap<String, String>>) -> Result<Self, AppError> {
        let build = || -> Result<Self, config::ConfigError> {
            config::Config::builder()
                .set_default("meilisearch_url", "http://localhost:7700")?
                .set_default("index_name", "pages")?
                .set_default("mongodb_uri", "mongodb://localhost:27017")?
                .set_default("mongodb_database", "vdw")?
                .set_default("bind_addr", "127.0.0.1:3000")?
                .add_source(config::Environment::with_prefix("VDW").source(env))
                .build()?
                .try_deserialize()
        };

        build().map_err(|e| AppError::Config(e.to_string()))
    }
}
