use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Publication state of a content entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentStatus {
    Draft,
    Published,
}

impl ContentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentStatus::Draft => "draft",
            ContentStatus::Published => "published",
        }
    }

    pub fn is_published(&self) -> bool {
        matches!(self, ContentStatus::Published)
    }
}

/// A tag display name, trimmed and guaranteed non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TagName(String);

impl TagName {
    pub fn new(name: impl Into<String>) -> Result<Self, String> {
        let name = name.into();
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err("tag name cannot be empty".to_string());
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// URL-safe form of the name (`"Many Studies"` -> `"many-studies"`).
    pub fn slug(&self) -> String {
        slugify(&self.0)
    }
}

impl TryFrom<String> for TagName {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        TagName::new(value)
    }
}

impl From<TagName> for String {
    fn from(tag: TagName) -> Self {
        tag.0
    }
}

/// Lowercase, keep alphanumerics, collapse separators into single hyphens.
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_hyphen = false;

    for ch in text.chars() {
        if ch.is_alphanumeric() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.extend(ch.to_lowercase());
        } else if ch.is_whitespace() || ch == '-' || ch == '_' {
            pending_hyphen = true;
        }
    }

    slug
}

/// A wiki page as held by the content store.
///
/// The search subsystem only reads these; persistence belongs to the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentEntity {
    /// Stable primary key, shared with the search document.
    pub id: i64,
    pub title: String,
    /// URL-safe slug (e.g. `overview-alcohol-and-vitamin-d`).
    pub slug: String,
    /// Rendered body with markup stripped; the only body text that is searched.
    pub plain_text_body: String,
    /// Rendered HTML body, kept for display.
    pub html_body: String,
    /// Tags in the order they were attached.
    #[serde(default)]
    pub tags: Vec<TagName>,
    pub status: ContentStatus,
    #[serde(with = "bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub modified_at: DateTime<Utc>,
}
