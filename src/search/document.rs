use serde::{Deserialize, Serialize};

use crate::db::models::{ContentEntity, ContentStatus};

pub const PRIORITY_OVERVIEW: u8 = 3;
pub const PRIORITY_MANY_STUDIES: u8 = 2;
pub const PRIORITY_CATEGORY: u8 = 1;
pub const PRIORITY_NONE: u8 = 0;

const OVERVIEW_MARKER: &str = "overview";
const MANY_STUDIES_MARKER: &str = "many studies";
const CATEGORY_PREFIX: &str = "category";

/// A page as written to the search index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchDocument {
    /// Primary key, equal to the content entity id.
    pub id: i64,
    pub title: String,
    pub slug: String,
    /// Plain text body. The only body field that is searched.
    pub content: String,
    /// Display-only HTML body.
    pub content_html: String,
    /// Tag display names.
    pub tags: Vec<String>,
    pub status: ContentStatus,
    /// ISO-8601 creation timestamp.
    pub created_date: String,
    /// Last modification as Unix seconds, numeric so the engine can sort on it.
    pub modified_date: i64,
    /// Query-independent priority bucket (0..=3).
    pub search_priority: u8,
}

/// A single search result.
///
/// The engine may return a subset of the document fields, so everything but
/// the id falls back to a default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub id: i64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub content_html: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub status: Option<ContentStatus>,
    #[serde(default)]
    pub created_date: String,
    #[serde(default)]
    pub modified_date: i64,
    #[serde(default)]
    pub search_priority: u8,
    /// Highlighted and cropped fragments produced by the engine.
    #[serde(
        rename = "_formatted",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub formatted: Option<serde_json::Map<String, serde_json::Value>>,
}

impl From<SearchDocument> for SearchHit {
    fn from(doc: SearchDocument) -> Self {
        Self {
            id: doc.id,
            title: doc.title,
            slug: doc.slug,
            content: doc.content,
            content_html: doc.content_html,
            tags: doc.tags,
            status: Some(doc.status),
            created_date: doc.created_date,
            modified_date: doc.modified_date,
            search_priority: doc.search_priority,
            formatted: None,
        }
    }
}

/// Structural priority signals found in a page's title and tags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PrioritySignals {
    pub overview: bool,
    pub many_studies: bool,
    pub category: bool,
}

impl PrioritySignals {
    /// Detect signals from normalized tag keys (see [`normalize_tag_key`]) and a raw title.
    pub fn detect<S: AsRef<str>>(tag_keys: &[S], title: &str) -> Self {
        let title = title.to_lowercase();
        let keys = || tag_keys.iter().map(|k| k.as_ref());

        Self {
            overview: title.contains(OVERVIEW_MARKER)
                || keys().any(|k| k.contains(OVERVIEW_MARKER)),
            many_studies: title.contains(MANY_STUDIES_MARKER)
                || keys().any(|k| k.contains(MANY_STUDIES_MARKER)),
            category: keys().any(|k| k.starts_with(CATEGORY_PREFIX)),
        }
    }

    /// Collapse the signals into a bucket; first match wins.
    pub fn priority(&self) -> u8 {
        if self.overview {
            PRIORITY_OVERVIEW
        } else if self.many_studies {
            PRIORITY_MANY_STUDIES
        } else if self.category {
            PRIORITY_CATEGORY
        } else {
            PRIORITY_NONE
        }
    }
}

/// Case-fold a tag name or slug and turn hyphens into spaces.
pub fn normalize_tag_key(raw: &str) -> String {
    raw.to_lowercase().replace('-', " ")
}

/// Normalized keys for a tag set: every name followed by every slug.
pub fn tag_keys(tag_names: &[&str], tag_slugs: &[&str]) -> Vec<String> {
    tag_names
        .iter()
        .chain(tag_slugs.iter())
        .map(|raw| normalize_tag_key(raw))
        .collect()
}

/// Document-level priority bucket, independent of any query.
///
/// Overview (3) beats "many studies" (2), which beats category (1).
pub fn compute_priority(tag_names: &[&str], tag_slugs: &[&str], title: &str) -> u8 {
    PrioritySignals::detect(&tag_keys(tag_names, tag_slugs), title).priority()
}

/// Convert a content entity into its search document.
pub fn format_entity(entity: &ContentEntity) -> SearchDocument {
    let tags: Vec<String> = entity.tags.iter().map(|t| t.as_str().to_string()).collect();
    let slugs: Vec<String> = entity.tags.iter().map(|t| t.slug()).collect();

    let names: Vec<&str> = tags.iter().map(String::as_str).collect();
    let slug_refs: Vec<&str> = slugs.iter().map(String::as_str).collect();
    let search_priority = compute_priority(&names, &slug_refs, &entity.title);

    SearchDocument {
        id: entity.id,
        title: entity.title.clone(),
        slug: entity.slug.clone(),
        content: entity.plain_text_body.clone(),
        content_html: entity.html_body.clone(),
        tags,
        status: entity.status,
        created_date: entity.created_at.to_rfc3339(),
        modified_date: entity.modified_at.timestamp(),
        search_priority,
    }
}
