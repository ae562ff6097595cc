//! OpenSearch query builders.
//!
//! Builds the search request body from a `SearchQuery`.

use serde_json::{json, Value};

use news_indexer_shared::SearchQuery;

/// Build a search request body from a `SearchQuery`.
///
/// An empty query text becomes `match_all`; anything else is a fuzzy
/// match against the `content` field only. AUTO fuzziness allows variable
/// edits based on term length: 1-2 chars: 0 edits, 3-4 chars: 1 edit,
/// 5+ chars: 2 edits.
pub fn build_search_body(query: &SearchQuery) -> Value {
    let text_query = if query.q.is_empty() {
        json!({ "match_all": {} })
    } else {
        json!({
            "match": {
                "content": {
                    "query": query.q,
                    "fuzziness": "AUTO"
                }
            }
        })
    };

    json!({
        "query": text_query,
        "from": query.from(),
        "size": query.limit
    })
}
