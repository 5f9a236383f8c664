//! Query-time re-ranking of engine hits.
//!
//! The stored `search_priority` says how important a page is in general.
//! Here the same signals only count when the query actually matches the page,
//! so an unrelated overview cannot bury a direct hit.

use std::cmp::Reverse;

use crate::db::models::slugify;
use crate::search::document::{
    normalize_tag_key, PrioritySignals, SearchHit, PRIORITY_CATEGORY, PRIORITY_MANY_STUDIES,
    PRIORITY_NONE, PRIORITY_OVERVIEW,
};

/// Transient sort key for one hit; ordered field by field, all descending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct RankKey {
    effective_priority: u8,
    strong_match: bool,
    modified_date: i64,
}

/// Case-folded view of a hit's title and tags.
struct FoldedHit {
    title: String,
    tags: Vec<String>,
    signals: PrioritySignals,
}

impl FoldedHit {
    fn new(hit: &SearchHit) -> Self {
        let keys: Vec<String> = hit
            .tags
            .iter()
            .map(|t| normalize_tag_key(t))
            .chain(hit.tags.iter().map(|t| normalize_tag_key(&slugify(t))))
            .collect();

        Self {
            title: hit.title.to_lowercase(),
            tags: hit.tags.iter().map(|t| t.to_lowercase()).collect(),
            signals: PrioritySignals::detect(&keys, &hit.title),
        }
    }

    /// Query is inside the title, or equals one tag exactly.
    fn strong_match(&self, folded_query: &str) -> bool {
        self.title.contains(folded_query) || self.tags.iter().any(|t| t == folded_query)
    }
}

fn fold_query(query: &str) -> String {
    query.trim().to_lowercase()
}

fn rank_key(hit: &SearchHit, folded_query: &str) -> RankKey {
    let folded = FoldedHit::new(hit);
    let strong_match = folded.strong_match(folded_query);
    let signals = folded.signals;

    let effective_priority = if signals.overview && strong_match {
        PRIORITY_OVERVIEW
    } else if signals.many_studies {
        PRIORITY_MANY_STUDIES
    } else if signals.category && strong_match {
        PRIORITY_CATEGORY
    } else {
        PRIORITY_NONE
    };

    RankKey {
        effective_priority,
        strong_match,
        modified_date: hit.modified_date,
    }
}

/// Sort hits by `(effective_priority, strong_match, modified_date)` descending.
///
/// The sort is stable: hits with equal keys keep the engine's order.
pub fn rerank(hits: Vec<SearchHit>, query: &str) -> Vec<SearchHit> {
    let folded_query = fold_query(query);

    let mut keyed: Vec<(RankKey, SearchHit)> = hits
        .into_iter()
        .map(|hit| (rank_key(&hit, &folded_query), hit))
        .collect();

    keyed.sort_by_key(|(key, _)| Reverse(*key));

    keyed.into_iter().map(|(_, hit)| hit).collect()
}

/// Whether a hit is an overview page that the query lands on directly.
pub fn has_overview_query_match(hit: &SearchHit, query: &str) -> bool {
    let folded = FoldedHit::new(hit);
    folded.signals.overview && folded.strong_match(&fold_query(query))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hit(id: i64, title: &str, tags: &[&str], modified_date: i64) -> SearchHit {
        SearchHit {
            id,
            title: title.to_string(),
            slug: slugify(title),
            content: String::new(),
            content_html: String::new(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            status: None,
            created_date: String::new(),
            modified_date,
            search_priority: 0,
            formatted: None,
        }
    }

    fn ids(hits: &[SearchHit]) -> Vec<i64> {
        hits.iter().map(|h| h.id).collect()
    }

    #[test]
    fn test_overview_hits_sort_ahead_of_many_studies() {
        let hits = vec![
            hit(1, "Alcohol and Vitamin D - many studies", &["Many Studies"], 200),
            hit(2, "Overview Alcohol and Vitamin D", &["Overview"], 100),
        ];

        assert_eq!(ids(&rerank(hits, "alcohol")), vec![2, 1]);
    }

    #[test]
    fn test_query_match_sorts_within_overview_bucket() {
        let hits = vec![
            hit(1, "Overview Fibromyalgia and vitamin D", &["Overview"], 200),
            hit(2, "Overview Gut and vitamin D", &["Overview", "Gut"], 100),
        ];

        assert_eq!(ids(&rerank(hits, "gut")), vec![2, 1]);
    }

    #[test]
    fn test_unrelated_overview_does_not_outrank_direct_match() {
        let hits = vec![
            hit(1, "Overview Gut and vitamin D", &["Overview"], 300),
            hit(2, "Addictions to smoking, alcohol, opiates", &[], 100),
        ];

        assert_eq!(ids(&rerank(hits, "alcohol")), vec![2, 1]);
    }

    #[test]
    fn test_title_match_overview_beats_other_title_matches() {
        let hits = vec![
            hit(1, "Addictions to smoking, alcohol, opiates, etc.", &[], 200),
            hit(2, "Overview Alcohol and Vitamin D", &["Overview"], 100),
        ];

        assert_eq!(ids(&rerank(hits, "alcohol")), vec![2, 1]);
    }

    #[test]
    fn test_category_requires_query_match() {
        let hits = vec![
            hit(1, "Cancer", &["category"], 500),
            hit(2, "Gut", &["category"], 100),
        ];

        // Only hit 2 matches the query, so only its category signal counts.
        assert_eq!(ids(&rerank(hits, "Gut")), vec![2, 1]);
    }

    #[test]
    fn test_tag_must_equal_query_for_strong_match() {
        let hits = vec![
            hit(1, "Pregnancy", &["Gut health"], 900),
            hit(2, "Pregnancy", &["gut"], 100),
        ];

        assert_eq!(ids(&rerank(hits, " GUT ")), vec![2, 1]);
    }

    #[test]
    fn test_recency_breaks_ties_then_engine_order() {
        let hits = vec![
            hit(1, "Gut one", &[], 100),
            hit(2, "Gut two", &[], 300),
            hit(3, "Gut three", &[], 100),
            hit(4, "Gut four", &[], 100),
        ];

        assert_eq!(ids(&rerank(hits, "gut")), vec![2, 1, 3, 4]);
    }

    #[test]
    fn test_rerank_empty() {
        assert!(rerank(Vec::new(), "gut").is_empty());
    }

    #[test]
    fn test_overview_query_match_detection() {
        let overview = hit(1, "Overview Alcohol and Vitamin D", &[], 0);
        assert!(has_overview_query_match(&overview, "alcohol"));
        assert!(!has_overview_query_match(&overview, "gut"));

        let tagged = hit(2, "Alcohol and Vitamin D", &["overview-for-doctors", "Gut"], 0);
        assert!(has_overview_query_match(&tagged, "gut"));

        let plain = hit(3, "Alcohol and Vitamin D", &["Gut"], 0);
        assert!(!has_overview_query_match(&plain, "alcohol"));
    }
}
