//! OpenSearch client implementation.
//!
//! This module provides the concrete implementation of `DocumentStore`
//! using the OpenSearch Rust client.

use async_trait::async_trait;
use opensearch::cluster::ClusterHealthParts;
use opensearch::http::response::Response;
use opensearch::http::transport::{SingleNodeConnectionPool, TransportBuilder};
use opensearch::indices::{IndicesCreateParts, IndicesExistsParts};
use opensearch::params::Refresh;
use opensearch::{DeleteParts, GetParts, IndexParts, OpenSearch, SearchParts, UpdateParts};
use serde_json::{json, Value};
use tracing::{debug, error, info};
use url::Url;

use crate::errors::StoreError;
use crate::interfaces::DocumentStore;
use crate::opensearch::index_config::{get_index_settings, INDEX_NAME};
use crate::opensearch::queries::build_search_body;
use news_indexer_shared::{NewsDocument, NewsPatch, SearchQuery, SearchResults};

/// OpenSearch-backed document store.
///
/// Writes use `refresh=true` so that a successfully applied event is
/// visible to the very next query, matching the read-after-write
/// expectations of the pipeline tests.
pub struct OpenSearchStore {
    client: OpenSearch,
    index: String,
}

impl OpenSearchStore {
    /// Create a new store connected to the specified URL.
    ///
    /// # Arguments
    ///
    /// * `url` - The OpenSearch server URL (e.g., "http://localhost:9200")
    pub fn new(url: &str) -> Result<Self, StoreError> {
        let parsed_url = Url::parse(url).map_err(|e| StoreError::connection(e.to_string()))?;

        let conn_pool = SingleNodeConnectionPool::new(parsed_url);
        let transport = TransportBuilder::new(conn_pool)
            .disable_proxy()
            .build()
            .map_err(|e| StoreError::connection(e.to_string()))?;

        let client = OpenSearch::new(transport);

        info!(url = %url, index = INDEX_NAME, "Created OpenSearch store");

        Ok(Self {
            client,
            index: INDEX_NAME.to_string(),
        })
    }

    /// Classify a non-success response into a store error.
    ///
    /// 5xx and 429 mean the backend is transiently unable to serve the
    /// request and map to the retryable `Unavailable` variant; anything
    /// else is handed to `fatal` for an operation-specific error.
    async fn classify_failure(
        response: Response,
        fatal: impl FnOnce(String) -> StoreError,
    ) -> StoreError {
        let status = response.status_code();
        let body = response.text().await.unwrap_or_default();

        error!(status = %status, body = %body, "Store request failed");

        if status.is_server_error() || status.as_u16() == 429 {
            StoreError::unavailable(status.as_u16(), body)
        } else {
            fatal(format!("status {}: {}", status, body))
        }
    }

    /// Parse a single search hit into a document.
    ///
    /// Returns `None` when the `_source` does not deserialize; a single
    /// bad hit must not fail the whole result page.
    fn parse_hit(hit: &Value) -> Option<NewsDocument> {
        serde_json::from_value(hit.get("_source")?.clone()).ok()
    }

    /// Parse a search response body into results.
    fn parse_search_response(body: Value) -> Result<SearchResults, StoreError> {
        let hits = body
            .get("hits")
            .ok_or_else(|| StoreError::parse("search response has no hits section"))?;

        let total_hits = hits
            .pointer("/total/value")
            .and_then(Value::as_u64)
            .unwrap_or(0);

        let articles = hits
            .get("hits")
            .and_then(Value::as_array)
            .map(|entries| entries.iter().filter_map(Self::parse_hit).collect())
            .unwrap_or_default();

        Ok(SearchResults {
            articles,
            total_hits,
        })
    }
}

#[async_trait]
impl DocumentStore for OpenSearchStore {
    async fn index_document(&self, document: &NewsDocument) -> Result<(), StoreError> {
        let response = self
            .client
            .index(IndexParts::IndexId(&self.index, &document.id))
            .body(serde_json::to_value(document).map_err(|e| {
                StoreError::SerializationError(e.to_string())
            })?)
            .refresh(Refresh::True)
            .send()
            .await
            .map_err(|e| StoreError::connection(e.to_string()))?;

        if !response.status_code().is_success() {
            return Err(Self::classify_failure(response, StoreError::index).await);
        }

        debug!(id = %document.id, "Document indexed");
        Ok(())
    }

    async fn update_document(&self, patch: &NewsPatch) -> Result<(), StoreError> {
        let doc = serde_json::to_value(patch)
            .map_err(|e| StoreError::SerializationError(e.to_string()))?;

        let response = self
            .client
            .update(UpdateParts::IndexId(&self.index, &patch.id))
            .body(json!({ "doc": doc }))
            .refresh(Refresh::True)
            .send()
            .await
            .map_err(|e| StoreError::connection(e.to_string()))?;

        let status = response.status_code();
        if status.as_u16() == 404 {
            return Err(StoreError::DocumentMissing(patch.id.clone()));
        }
        if !status.is_success() {
            return Err(Self::classify_failure(response, StoreError::update).await);
        }

        debug!(id = %patch.id, "Document updated");
        Ok(())
    }

    async fn delete_document(&self, id: &str) -> Result<(), StoreError> {
        let response = self
            .client
            .delete(DeleteParts::IndexId(&self.index, id))
            .refresh(Refresh::True)
            .send()
            .await
            .map_err(|e| StoreError::connection(e.to_string()))?;

        let status = response.status_code();

        // 404 is acceptable - delete is idempotent
        if !status.is_success() && status.as_u16() != 404 {
            return Err(Self::classify_failure(response, StoreError::delete).await);
        }

        debug!(id = %id, "Document deleted");
        Ok(())
    }

    async fn get_document(&self, id: &str) -> Result<Option<NewsDocument>, StoreError> {
        let response = self
            .client
            .get(GetParts::IndexId(&self.index, id))
            .send()
            .await
            .map_err(|e| StoreError::connection(e.to_string()))?;

        let status = response.status_code();
        if status.as_u16() == 404 {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(Self::classify_failure(response, StoreError::query).await);
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| StoreError::parse(e.to_string()))?;

        if !body.get("found").and_then(Value::as_bool).unwrap_or(false) {
            return Ok(None);
        }

        let source = body
            .get("_source")
            .cloned()
            .ok_or_else(|| StoreError::parse("get response has no _source"))?;

        let document =
            serde_json::from_value(source).map_err(|e| StoreError::parse(e.to_string()))?;

        Ok(Some(document))
    }

    async fn search(&self, query: &SearchQuery) -> Result<SearchResults, StoreError> {
        let response = self
            .client
            .search(SearchParts::Index(&[self.index.as_str()]))
            .body(build_search_body(query))
            .send()
            .await
            .map_err(|e| StoreError::connection(e.to_string()))?;

        if !response.status_code().is_success() {
            return Err(Self::classify_failure(response, StoreError::query).await);
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| StoreError::parse(e.to_string()))?;

        Self::parse_search_response(body)
    }

    async fn ensure_index_exists(&self) -> Result<(), StoreError> {
        let response = self
            .client
            .indices()
            .exists(IndicesExistsParts::Index(&[self.index.as_str()]))
            .send()
            .await
            .map_err(|e| StoreError::connection(e.to_string()))?;

        if response.status_code().is_success() {
            debug!(index = %self.index, "Index already exists");
            return Ok(());
        }

        info!(index = %self.index, "Creating index");

        let response = self
            .client
            .indices()
            .create(IndicesCreateParts::Index(&self.index))
            .body(get_index_settings())
            .send()
            .await
            .map_err(|e| StoreError::connection(e.to_string()))?;

        if !response.status_code().is_success() {
            return Err(Self::classify_failure(response, StoreError::index_creation).await);
        }

        Ok(())
    }

    async fn health_check(&self) -> Result<bool, StoreError> {
        let response = self
            .client
            .cluster()
            .health(ClusterHealthParts::None)
            .send()
            .await
            .map_err(|e| StoreError::connection(e.to_string()))?;

        if !response.status_code().is_success() {
            return Ok(false);
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| StoreError::parse(e.to_string()))?;

        let status = body.get("status").and_then(Value::as_str).unwrap_or("red");
        Ok(status != "red")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hit() {
        let hit = json!({
            "_source": {
                "id": "n1",
                "title": "Test Article",
                "content": "Body text",
                "author": "Reporter",
                "tags": ["world"],
                "published_at": "2024-01-01T00:00:00Z",
                "created_at": "2024-01-01T00:00:00Z"
            },
            "_score": 1.5
        });

        let doc = OpenSearchStore::parse_hit(&hit).unwrap();

        assert_eq!(doc.id, "n1");
        assert_eq!(doc.title, "Test Article");
        assert!(doc.updated_at.is_none());
    }

    #[test]
    fn test_parse_hit_without_source() {
        let hit = json!({ "_score": 1.0 });

        assert!(OpenSearchStore::parse_hit(&hit).is_none());
    }

    #[test]
    fn test_parse_search_response() {
        let body = json!({
            "hits": {
                "total": { "value": 42, "relation": "eq" },
                "hits": [
                    {
                        "_source": {
                            "id": "n1",
                            "title": "A",
                            "content": "First",
                            "author": "",
                            "tags": [],
                            "published_at": "2024-01-01T00:00:00Z",
                            "created_at": "2024-01-01T00:00:00Z"
                        }
                    },
                    {
                        "_source": {
                            "id": "n2",
                            "title": "B",
                            "content": "Second",
                            "author": "",
                            "tags": [],
                            "published_at": "2024-01-01T00:00:00Z",
                            "created_at": "2024-01-01T00:00:00Z"
                        }
                    }
                ]
            }
        });

        let results = OpenSearchStore::parse_search_response(body).unwrap();

        assert_eq!(results.total_hits, 42);
        assert_eq!(results.articles.len(), 2);
        assert_eq!(results.articles[1].id, "n2");
    }

    #[test]
    fn test_parse_search_response_no_matches() {
        let body = json!({
            "hits": {
                "total": { "value": 0, "relation": "eq" },
                "hits": []
            }
        });

        let results = OpenSearchStore::parse_search_response(body).unwrap();

        assert_eq!(results.total_hits, 0);
        assert!(results.articles.is_empty());
    }

    #[test]
    fn test_parse_search_response_missing_hits() {
        let body = json!({ "took": 3 });

        let err = OpenSearchStore::parse_search_response(body).unwrap_err();
        assert!(matches!(err, StoreError::ParseError(_)));
    }
}
