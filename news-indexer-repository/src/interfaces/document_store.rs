//! Document store trait definition.
//!
//! This module defines the abstract interface over the search backend,
//! allowing different implementations (OpenSearch, in-memory mocks for
//! tests) behind the same seam.

use async_trait::async_trait;

use crate::errors::StoreError;
use news_indexer_shared::{NewsDocument, NewsPatch, SearchQuery, SearchResults};

/// Abstract interface for the store holding the queryable document state.
///
/// The store is the only shared mutable resource in the system; it must
/// support concurrent upsert/update/delete/get/search without external
/// locking, relying on the backend's per-document atomicity. The last
/// write physically applied to a given id wins.
///
/// All implementations must be `Send + Sync` for use across async tasks.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Index a full document, replacing any existing document with the
    /// same id. Semantically an upsert, never an insert-only operation.
    async fn index_document(&self, document: &NewsDocument) -> Result<(), StoreError>;

    /// Merge the present fields of the patch into the stored document
    /// identified by `patch.id`, leaving absent fields untouched.
    ///
    /// # Errors
    ///
    /// * `StoreError::DocumentMissing` - if no document with that id exists
    async fn update_document(&self, patch: &NewsPatch) -> Result<(), StoreError>;

    /// Delete the document with the given id. Deleting a non-existent id
    /// is a no-op success.
    async fn delete_document(&self, id: &str) -> Result<(), StoreError>;

    /// Fetch a document by id. Absence is `Ok(None)`, not an error.
    async fn get_document(&self, id: &str) -> Result<Option<NewsDocument>, StoreError>;

    /// Execute a paginated full-text search. An empty result set is a
    /// valid outcome with `total_hits = 0`.
    async fn search(&self, query: &SearchQuery) -> Result<SearchResults, StoreError>;

    /// Ensure the index exists with the expected mappings, creating it if
    /// necessary. Called during startup.
    async fn ensure_index_exists(&self) -> Result<(), StoreError>;

    /// Check if the backend is healthy and reachable.
    async fn health_check(&self) -> Result<bool, StoreError>;
}
