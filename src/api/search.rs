use serde::Deserialize;

use crate::error::AppError;
use crate::search::query::{Pagination, DEFAULT_LIMIT};

/// Queries shorter than this return no results.
pub const MIN_QUERY_LENGTH: usize = 2;

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub q: String,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

fn non_negative(name: &str, value: Option<i64>, default: usize) -> Result<usize, AppError> {
    match value {
        None => Ok(default),
        Some(v) => usize::try_from(v)
            .map_err(|_| AppError::BadRequest(format!("'{name}' must be a non-negative integer"))),
    }
}

impl SearchParams {
    /// Validate the paging parameters at the HTTP boundary.
    pub fn pagination(&self) -> Result<Pagination, AppError> {
        let limit = non_negative("limit", self.limit, DEFAULT_LIMIT)?;
        let offset = non_negative("offset", self.offset, 0)?;
        Ok(Pagination::new(limit, offset))
    }

    /// The trimmed query, if it is long enough to search for.
    pub fn searchable_query(&self) -> Option<&str> {
        let query = self.q.trim();
        (query.chars().count() >= MIN_QUERY_LENGTH).then_some(query)
    }
}

/// Axum handler for `GET /api/v1/search`.
///
/// Only available when the `ssr` feature is enabled.
#[cfg(feature = "ssr")]
pub async fn search_handler(
    axum::extract::State(state): axum::extract::State<crate::state::AppState>,
    axum::extract::Query(params): axum::extract::Query<SearchParams>,
) -> Result<axum::Json<crate::search::query::SearchPage>, AppError> {
    use crate::search::query::SearchPage;

    let pagination = params.pagination()?;
    let Some(query) = params.searchable_query() else {
        return Ok(axum::Json(SearchPage::empty(params.q.trim())));
    };

    let page = state.query_service.search(query, pagination).await?;
    Ok(axum::Json(page))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(q: &str, limit: Option<i64>, offset: Option<i64>) -> SearchParams {
        SearchParams {
            q: q.to_string(),
            limit,
            offset,
        }
    }

    #[test]
    fn test_pagination_defaults() {
        let page = params("gut", None, None).pagination().unwrap();
        assert_eq!(page.limit(), DEFAULT_LIMIT);
        assert_eq!(page.offset(), 0);
    }

    #[test]
    fn test_pagination_rejects_negative_values() {
        assert!(matches!(
            params("gut", Some(-1), None).pagination(),
            Err(AppError::BadRequest(_))
        ));
        assert!(matches!(
            params("gut", None, Some(-20)).pagination(),
            Err(AppError::BadRequest(_))
        ));
    }

    #[test]
    fn test_pagination_caps_limit() {
        let page = params("gut", Some(5000), Some(10)).pagination().unwrap();
        assert_eq!(page.limit(), 990);
    }

    #[test]
    fn test_short_queries_are_not_searched() {
        assert_eq!(params(" g ", None, None).searchable_query(), None);
        assert_eq!(params("", None, None).searchable_query(), None);
        assert_eq!(params(" gut ", None, None).searchable_query(), Some("gut"));
        assert_eq!(params("D3", None, None).searchable_query(), Some("D3"));
    }
}
