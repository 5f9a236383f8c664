use async_trait::async_trait;
use serde::Deserialize;

use crate::error::EngineError;
use crate::search::document::{SearchDocument, SearchHit};
use crate::search::index::SettingUpdate;

/// Everything the engine needs to run one query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineQuery {
    pub query: String,
    pub limit: usize,
    pub offset: usize,
    pub filter: String,
    pub sort: Vec<String>,
    pub attributes_to_highlight: Vec<String>,
    pub attributes_to_crop: Vec<String>,
    pub crop_length: usize,
}

/// Total-count fields, named differently across engine versions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct TotalHitCounts {
    #[serde(rename = "totalHits", default)]
    pub total_hits: Option<usize>,
    #[serde(rename = "estimatedTotalHits", default)]
    pub estimated_total_hits: Option<usize>,
    #[serde(rename = "nbHits", default)]
    pub nb_hits: Option<usize>,
}

/// Resolve the total-hit count; the first field present wins.
pub fn resolve_total_hits(counts: &TotalHitCounts) -> Option<usize> {
    counts
        .total_hits
        .or(counts.estimated_total_hits)
        .or(counts.nb_hits)
}

/// Raw engine answer to a query, before re-ranking.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct EngineResponse {
    #[serde(default)]
    pub hits: Vec<SearchHit>,
    #[serde(flatten)]
    pub totals: TotalHitCounts,
}

/// Trait for search engine operations, enabling mock testing.
///
/// Every write waits for the engine to finish the resulting task.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SearchEngine: Send + Sync {
    /// Apply one index setting.
    async fn update_setting(&self, update: &SettingUpdate) -> Result<(), EngineError>;

    /// Add or replace documents, keyed by `id`.
    async fn add_documents(&self, docs: &[SearchDocument]) -> Result<(), EngineError>;

    /// Remove a document. Unknown ids are not an error.
    async fn delete_document(&self, id: i64) -> Result<(), EngineError>;

    /// Remove every document from the index.
    async fn delete_all_documents(&self) -> Result<(), EngineError>;

    async fn search(&self, query: &EngineQuery) -> Result<EngineResponse, EngineError>;
}

const SORT_REJECTION_CODES: [&str; 2] = ["invalid_search_sort", "invalid_sort"];

fn normalize_code(code: &str) -> String {
    code.chars()
        .filter(|c| *c != '_')
        .flat_map(char::to_lowercase)
        .collect()
}

/// Map an engine rejection onto [`EngineError`], singling out missing sortable attributes.
pub fn classify_api_error(code: &str, message: &str) -> EngineError {
    let normalized = normalize_code(code);
    let sort_rejected = SORT_REJECTION_CODES
        .iter()
        .any(|c| normalize_code(c) == normalized);

    if sort_rejected || message.contains("is not sortable") {
        EngineError::SchemaDrift {
            message: message.to_string(),
        }
    } else {
        EngineError::Api {
            code: code.to_string(),
            message: message.to_string(),
        }
    }
}

/// Meilisearch implementation of the SearchEngine.
#[cfg(feature = "ssr")]
pub struct MeilisearchEngine {
    client: meilisearch_sdk::client::Client,
    index_name: String,
}

#[cfg(feature = "ssr")]
const TASK_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(60);

#[cfg(feature = "ssr")]
impl MeilisearchEngine {
    /// Create with explicit values (useful for testing / DI).
    pub fn new(
        url: &str,
        api_key: Option<String>,
        index_name: &str,
    ) -> Result<Self, crate::error::AppError> {
        let client = meilisearch_sdk::client::Client::new(url, api_key).map_err(|e| {
            crate::error::AppError::Config(format!("Failed to create Meilisearch client: {e}"))
        })?;

        Ok(Self {
            client,
            index_name: index_name.to_string(),
        })
    }

    pub fn from_config(config: &crate::config::AppConfig) -> Result<Self, crate::error::AppError> {
        Self::new(
            &config.meilisearch_url,
            config.meilisearch_api_key.clone(),
            &config.index_name,
        )
    }

    fn index(&self) -> meilisearch_sdk::indexes::Index {
        self.client.index(&self.index_name)
    }

    async fn wait(&self, task: meilisearch_sdk::task_info::TaskInfo) -> Result<(), EngineError> {
        use meilisearch_sdk::tasks::Task;

        let task = task
            .wait_for_completion(&self.client, None, Some(TASK_TIMEOUT))
            .await
            .map_err(classify_sdk_error)?;

        match task {
            Task::Failed { content } => Err(EngineError::Task {
                message: content.error.error_message,
            }),
            _ => Ok(()),
        }
    }
}

#[cfg(feature = "ssr")]
fn classify_sdk_error(err: meilisearch_sdk::errors::Error) -> EngineError {
    match err {
        meilisearch_sdk::errors::Error::Meilisearch(api) => {
            let code = format!("{:?}", api.error_code);
            classify_api_error(&code, &api.error_message)
        }
        other => EngineError::Unavailable {
            message: other.to_string(),
        },
    }
}

#[cfg(feature = "ssr")]
#[async_trait]
impl SearchEngine for MeilisearchEngine {
    async fn update_setting(&self, update: &SettingUpdate) -> Result<(), EngineError> {
        let index = self.index();

        let task = match update {
            SettingUpdate::SearchableAttributes(attrs) => {
                index
                    .set_searchable_attributes(attrs.iter().map(String::as_str))
                    .await
            }
            SettingUpdate::FilterableAttributes(attrs) => {
                index
                    .set_filterable_attributes(attrs.iter().map(String::as_str))
                    .await
            }
            SettingUpdate::SortableAttributes(attrs) => {
                index
                    .set_sortable_attributes(attrs.iter().map(String::as_str))
                    .await
            }
            SettingUpdate::RankingRules(rules) => {
                index
                    .set_ranking_rules(rules.iter().map(String::as_str))
                    .await
            }
        }
        .map_err(classify_sdk_error)?;

        self.wait(task).await
    }

    async fn add_documents(&self, docs: &[SearchDocument]) -> Result<(), EngineError> {
        let task = self
            .index()
            .add_documents(docs, Some("id"))
            .await
            .map_err(classify_sdk_error)?;

        self.wait(task).await
    }

    async fn delete_document(&self, id: i64) -> Result<(), EngineError> {
        let task = self
            .index()
            .delete_document(id)
            .await
            .map_err(classify_sdk_error)?;

        self.wait(task).await
    }

    async fn delete_all_documents(&self) -> Result<(), EngineError> {
        let task = self
            .index()
            .delete_all_documents()
            .await
            .map_err(classify_sdk_error)?;

        self.wait(task).await
    }

    async fn search(&self, query: &EngineQuery) -> Result<EngineResponse, EngineError> {
        use meilisearch_sdk::search::{SearchResults, Selectors};

        let sort: Vec<&str> = query.sort.iter().map(String::as_str).collect();
        let highlight: Vec<&str> = query
            .attributes_to_highlight
            .iter()
            .map(String::as_str)
            .collect();
        let crop: Vec<(&str, Option<usize>)> = query
            .attributes_to_crop
            .iter()
            .map(|attr| (attr.as_str(), None))
            .collect();

        let index = self.index();
        let results: SearchResults<SearchHit> = index
            .search()
            .with_query(&query.query)
            .with_filter(&query.filter)
            .with_sort(&sort)
            .with_limit(query.limit)
            .with_offset(query.offset)
            .with_attributes_to_highlight(Selectors::Some(&highlight))
            .with_attributes_to_crop(Selectors::Some(&crop))
            .with_crop_length(query.crop_length)
            .execute()
            .await
            .map_err(classify_sdk_error)?;

        let hits = results
            .hits
            .into_iter()
            .map(|hit| SearchHit {
                formatted: hit.formatted_result,
                ..hit.result
            })
            .collect();

        Ok(EngineResponse {
            hits,
            totals: TotalHitCounts {
                total_hits: results.total_hits,
                estimated_total_hits: results.estimated_total_hits,
                nb_hits: None,
            },
        })
    }
}
