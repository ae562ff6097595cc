//! News document model.
//!
//! Defines the full document stored in the search index and the typed
//! patch used for partial updates.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A news article as stored in the search index.
///
/// The `id` is the sole identity of a document; every other field may be
/// empty or zero. Existence in the index is derived entirely from applied
/// lifecycle events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsDocument {
    /// Stable external key, never empty.
    pub id: String,
    /// Article headline.
    #[serde(default)]
    pub title: String,
    /// Article body; the primary full-text search field.
    #[serde(default)]
    pub content: String,
    /// Article author.
    #[serde(default)]
    pub author: String,
    /// Ordered tag list; duplicates permitted.
    #[serde(default)]
    pub tags: Vec<String>,
    /// When the article was published.
    #[serde(default = "epoch")]
    pub published_at: DateTime<Utc>,
    /// When the article record was created.
    #[serde(default = "epoch")]
    pub created_at: DateTime<Utc>,
    /// Set by the applier on every successful update; absent until then.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

fn epoch() -> DateTime<Utc> {
    DateTime::<Utc>::UNIX_EPOCH
}

impl NewsDocument {
    /// Create a document with the given id and all other fields empty.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: String::new(),
            content: String::new(),
            author: String::new(),
            tags: Vec::new(),
            published_at: epoch(),
            created_at: epoch(),
            updated_at: None,
        }
    }
}

/// A partial update to a news document.
///
/// Only fields that are `Some` are applied; `None` fields are skipped
/// during serialization and never overwrite stored values. The `id` is
/// mandatory and identifies the target document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewsPatch {
    /// The target document's identifier (required).
    pub id: String,
    /// New title.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// New content.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// New author.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    /// Replacement tag list.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    /// New publication timestamp.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published_at: Option<DateTime<Utc>>,
    /// New creation timestamp.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    /// Last-write timestamp. Whatever the producer supplies here is
    /// discarded by the applier, which stamps its own apply time.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl NewsPatch {
    /// Create an empty patch targeting the given document.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    /// Set the title to update.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set the content to update.
    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    /// Set the author to update.
    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    /// Set the tag list to update.
    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = Some(tags);
        self
    }

    /// Set the publication timestamp to update.
    pub fn with_published_at(mut self, published_at: DateTime<Utc>) -> Self {
        self.published_at = Some(published_at);
        self
    }

    /// Check if any fields besides the id are set.
    pub fn has_changes(&self) -> bool {
        self.title.is_some()
            || self.content.is_some()
            || self.author.is_some()
            || self.tags.is_some()
            || self.published_at.is_some()
            || self.created_at.is_some()
            || self.updated_at.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_patch_builder() {
        let patch = NewsPatch::new("n1")
            .with_title("New Title")
            .with_tags(vec!["breaking".to_string()]);

        assert_eq!(patch.id, "n1");
        assert_eq!(patch.title, Some("New Title".to_string()));
        assert_eq!(patch.tags, Some(vec!["breaking".to_string()]));
        assert!(patch.content.is_none());
        assert!(patch.has_changes());
    }

    #[test]
    fn test_patch_has_changes() {
        let patch = NewsPatch::new("n1");
        assert!(!patch.has_changes());

        let patch = patch.with_content("body");
        assert!(patch.has_changes());
    }

    #[test]
    fn test_patch_serializes_only_present_fields() {
        let patch = NewsPatch::new("n1").with_title("X");
        let value = serde_json::to_value(&patch).unwrap();

        let obj = value.as_object().unwrap();
        assert_eq!(obj.len(), 2);
        assert_eq!(obj["id"], "n1");
        assert_eq!(obj["title"], "X");
    }

    #[test]
    fn test_document_omits_absent_updated_at() {
        let doc = NewsDocument::new("n1");
        let value = serde_json::to_value(&doc).unwrap();

        assert!(value.get("updated_at").is_none());
    }

    #[test]
    fn test_document_decodes_with_missing_fields() {
        let doc: NewsDocument = serde_json::from_str(r#"{"id": "n1"}"#).unwrap();

        assert_eq!(doc.id, "n1");
        assert!(doc.title.is_empty());
        assert!(doc.tags.is_empty());
        assert!(doc.updated_at.is_none());
    }
}
