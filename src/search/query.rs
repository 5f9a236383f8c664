use std::collections::HashSet;
use std::sync::Arc;

use serde::Serialize;

use crate::db::repository::ContentRepository;
use crate::error::{AppError, EngineError};
use crate::search::client::{resolve_total_hits, EngineQuery, EngineResponse, SearchEngine};
use crate::search::document::{format_entity, SearchHit};
use crate::search::index::IndexManager;
use crate::search::relevance::{has_overview_query_match, rerank};

/// Raw hits fetched per query, and the furthest position a page may reach.
pub const MAX_FETCH_WINDOW: usize = 1000;
/// Most overview pages injected from the content store.
pub const OVERVIEW_FALLBACK_LIMIT: usize = 10;
pub const DEFAULT_LIMIT: usize = 20;

const PUBLISHED_FILTER: &str = "status = published";
const SORT: [&str; 2] = ["search_priority:desc", "modified_date:desc"];
const HIGHLIGHT_ATTRIBUTES: [&str; 2] = ["title", "content"];
const CROP_ATTRIBUTES: [&str; 1] = ["content"];
const CROP_LENGTH: usize = 150;

/// A window into the ranked results, clamped to [`MAX_FETCH_WINDOW`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    limit: usize,
    offset: usize,
}

impl Pagination {
    /// `offset + limit` never exceeds [`MAX_FETCH_WINDOW`].
    pub fn new(limit: usize, offset: usize) -> Self {
        let offset = offset.min(MAX_FETCH_WINDOW);
        let limit = limit.min(MAX_FETCH_WINDOW - offset);
        Self { limit, offset }
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    fn apply<T>(&self, items: Vec<T>) -> Vec<T> {
        items
            .into_iter()
            .skip(self.offset)
            .take(self.limit)
            .collect()
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self::new(DEFAULT_LIMIT, 0)
    }
}

/// One page of search results.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchPage {
    pub hits: Vec<SearchHit>,
    #[serde(rename = "totalHits")]
    pub total_hits: usize,
    pub query: String,
}

impl SearchPage {
    pub fn empty(query: &str) -> Self {
        Self {
            hits: Vec::new(),
            total_hits: 0,
            query: query.to_string(),
        }
    }
}

/// Runs user queries against the engine and post-processes the hits.
pub struct QueryService {
    engine: Arc<dyn SearchEngine>,
    index_manager: Arc<IndexManager>,
    content: Arc<dyn ContentRepository>,
}

impl QueryService {
    pub fn new(
        engine: Arc<dyn SearchEngine>,
        index_manager: Arc<IndexManager>,
        content: Arc<dyn ContentRepository>,
    ) -> Self {
        Self {
            engine,
            index_manager,
            content,
        }
    }

    /// Search published pages.
    ///
    /// The full candidate window is re-ranked and, when no hit is an overview
    /// page for this query, matching overview pages from the content store are
    /// put in front. Pagination is applied last.
    pub async fn search(&self, query: &str, page: Pagination) -> Result<SearchPage, AppError> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(SearchPage::empty(query));
        }

        let response = self.execute(&engine_query(query)).await?;
        let engine_total = resolve_total_hits(&response.totals);
        let raw_count = response.hits.len();

        let mut hits = rerank(response.hits, query);
        let mut injected = 0;

        if !hits.iter().any(|hit| has_overview_query_match(hit, query)) {
            let overviews = self.overview_fallback(query).await?;
            if !overviews.is_empty() {
                (hits, injected) = prepend_unique(overviews, hits);
                tracing::debug!(query, injected, "Injecting overview pages ahead of engine hits");
            }
        }

        // Injected pages the engine did not return count towards the total.
        let total_hits = engine_total
            .map_or(hits.len(), |total| (total + injected).max(hits.len()));
        tracing::debug!(query, raw_count, total_hits, "Search completed");

        Ok(SearchPage {
            hits: page.apply(hits),
            total_hits,
            query: query.to_string(),
        })
    }

    /// Run the query, recovering once from a schema drift rejection.
    async fn execute(&self, request: &EngineQuery) -> Result<EngineResponse, EngineError> {
        match self.engine.search(request).await {
            Err(EngineError::SchemaDrift { message }) => {
                tracing::warn!(%message, "Index settings missing, reinitializing and retrying once");
                self.index_manager.initialize().await?;
                self.engine.search(request).await
            }
            outcome => outcome,
        }
    }

    async fn overview_fallback(&self, query: &str) -> Result<Vec<SearchHit>, AppError> {
        let entities = self
            .content
            .find_overview_candidates(query, OVERVIEW_FALLBACK_LIMIT)
            .await?;

        Ok(entities
            .iter()
            .filter(|entity| entity.status.is_published())
            .map(|entity| SearchHit::from(format_entity(entity)))
            .collect())
    }
}

fn owned(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn engine_query(query: &str) -> EngineQuery {
    EngineQuery {
        query: query.to_string(),
        limit: MAX_FETCH_WINDOW,
        offset: 0,
        filter: PUBLISHED_FILTER.to_string(),
        sort: owned(&SORT),
        attributes_to_highlight: owned(&HIGHLIGHT_ATTRIBUTES),
        attributes_to_crop: owned(&CROP_ATTRIBUTES),
        crop_length: CROP_LENGTH,
    }
}

/// `front` followed by `rest`, keeping the first occurrence of each id.
///
/// A front hit that replaces a later one inherits its highlight. Also returns
/// how many front ids were absent from `rest`.
fn prepend_unique(front: Vec<SearchHit>, mut rest: Vec<SearchHit>) -> (Vec<SearchHit>, usize) {
    let mut seen = HashSet::new();
    let mut merged = Vec::with_capacity(front.len() + rest.len());
    let mut added = 0;

    for mut hit in front {
        if !seen.insert(hit.id) {
            continue;
        }
        match rest.iter_mut().find(|other| other.id == hit.id) {
            Some(other) if hit.formatted.is_none() => hit.formatted = other.formatted.take(),
            Some(_) => {}
            None => added += 1,
        }
        merged.push(hit);
    }

    merged.extend(rest.into_iter().filter(|hit| seen.insert(hit.id)));
    (merged, added)
}
