use std::sync::Arc;

use crate::error::EngineError;
use crate::search::client::SearchEngine;

/// A single index setting the engine applies as its own task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettingUpdate {
    SearchableAttributes(Vec<String>),
    FilterableAttributes(Vec<String>),
    SortableAttributes(Vec<String>),
    RankingRules(Vec<String>),
}

/// Index configuration the query path relies on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexSettings {
    /// In priority order: a title match beats a tag match beats a body match.
    pub searchable_attributes: Vec<String>,
    pub filterable_attributes: Vec<String>,
    pub sortable_attributes: Vec<String>,
    /// `sort` leads so priority bucket and recency dominate text scoring;
    /// `attribute` sits ahead of `proximity` and `exactness`.
    pub ranking_rules: Vec<String>,
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl Default for IndexSettings {
    fn default() -> Self {
        Self {
            searchable_attributes: strings(&["title", "tags", "content"]),
            filterable_attributes: strings(&["status", "created_date", "modified_date", "tags"]),
            sortable_attributes: strings(&["search_priority", "modified_date"]),
            ranking_rules: strings(&["sort", "words", "typo", "attribute", "proximity", "exactness"]),
        }
    }
}

impl IndexSettings {
    /// The settings as individual updates, in the order they are applied.
    pub fn updates(&self) -> Vec<SettingUpdate> {
        vec![
            SettingUpdate::SearchableAttributes(self.searchable_attributes.clone()),
            SettingUpdate::FilterableAttributes(self.filterable_attributes.clone()),
            SettingUpdate::SortableAttributes(self.sortable_attributes.clone()),
            SettingUpdate::RankingRules(self.ranking_rules.clone()),
        ]
    }
}

/// Applies [`IndexSettings`] to the engine.
pub struct IndexManager {
    engine: Arc<dyn SearchEngine>,
    settings: IndexSettings,
}

impl IndexManager {
    pub fn new(engine: Arc<dyn SearchEngine>) -> Self {
        Self {
            engine,
            settings: IndexSettings::default(),
        }
    }

    /// Apply every setting and wait for each engine task to finish.
    ///
    /// Idempotent. The first rejected update aborts and is returned.
    pub async fn initialize(&self) -> Result<(), EngineError> {
        for update in self.settings.updates() {
            tracing::debug!(?update, "Applying index setting");
            self.engine.update_setting(&update).await?;
        }

        tracing::info!("Search index configured");
        Ok(())
    }
}
