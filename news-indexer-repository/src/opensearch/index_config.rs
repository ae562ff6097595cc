//! Index settings and mappings for the news article index.

use serde_json::{json, Value};

/// The name of the news article index.
pub const INDEX_NAME: &str = "news_articles";

/// Get the settings and mappings for the news article index.
///
/// `content` is the primary full-text field; `title` is also analyzed as
/// text for completeness. Identity and filter fields are keywords, and
/// all lifecycle timestamps are dates.
pub fn get_index_settings() -> Value {
    json!({
        "settings": {
            "number_of_shards": 1,
            "number_of_replicas": 1
        },
        "mappings": {
            "properties": {
                "id": {
                    "type": "keyword"
                },
                "title": {
                    "type": "text",
                    "fields": {
                        "raw": {
                            "type": "keyword"
                        }
                    }
                },
                "content": {
                    "type": "text"
                },
                "author": {
                    "type": "keyword"
                },
                "tags": {
                    "type": "keyword"
                },
                "published_at": {
                    "type": "date"
                },
                "created_at": {
                    "type": "date"
                },
                "updated_at": {
                    "type": "date"
                }
            }
        }
    })
}
