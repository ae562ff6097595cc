//! Test doubles for the document store.
//!
//! `InMemoryStore` mirrors the backend's per-document merge semantics so
//! applier and dispatch tests can assert on resulting state;
//! `FailingStore` simulates backend failure modes.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use news_indexer_repository::{DocumentStore, StoreError};
use news_indexer_shared::{NewsDocument, NewsPatch, SearchQuery, SearchResults};

/// In-memory document store with merge-on-update semantics.
pub struct InMemoryStore {
    docs: Mutex<HashMap<String, NewsDocument>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            docs: Mutex::new(HashMap::new()),
        }
    }

    pub async fn len(&self) -> usize {
        self.docs.lock().await.len()
    }

    pub async fn get(&self, id: &str) -> Option<NewsDocument> {
        self.docs.lock().await.get(id).cloned()
    }
}

#[async_trait]
impl DocumentStore for InMemoryStore {
    async fn index_document(&self, document: &NewsDocument) -> Result<(), StoreError> {
        self.docs
            .lock()
            .await
            .insert(document.id.clone(), document.clone());
        Ok(())
    }

    async fn update_document(&self, patch: &NewsPatch) -> Result<(), StoreError> {
        let mut docs = self.docs.lock().await;
        let doc = docs
            .get_mut(&patch.id)
            .ok_or_else(|| StoreError::DocumentMissing(patch.id.clone()))?;

        if let Some(title) = &patch.title {
            doc.title = title.clone();
        }
        if let Some(content) = &patch.content {
            doc.content = content.clone();
        }
        if let Some(author) = &patch.author {
            doc.author = author.clone();
        }
        if let Some(tags) = &patch.tags {
            doc.tags = tags.clone();
        }
        if let Some(published_at) = patch.published_at {
            doc.published_at = published_at;
        }
        if let Some(created_at) = patch.created_at {
            doc.created_at = created_at;
        }
        if let Some(updated_at) = patch.updated_at {
            doc.updated_at = Some(updated_at);
        }

        Ok(())
    }

    async fn delete_document(&self, id: &str) -> Result<(), StoreError> {
        self.docs.lock().await.remove(id);
        Ok(())
    }

    async fn get_document(&self, id: &str) -> Result<Option<NewsDocument>, StoreError> {
        Ok(self.docs.lock().await.get(id).cloned())
    }

    async fn search(&self, query: &SearchQuery) -> Result<SearchResults, StoreError> {
        let docs = self.docs.lock().await;
        let needle = query.q.to_lowercase();

        let mut matches: Vec<NewsDocument> = docs
            .values()
            .filter(|doc| needle.is_empty() || doc.content.to_lowercase().contains(&needle))
            .cloned()
            .collect();
        matches.sort_by(|a, b| a.id.cmp(&b.id));

        let total_hits = matches.len() as u64;
        let articles = matches
            .into_iter()
            .skip(query.from())
            .take(query.limit)
            .collect();

        Ok(SearchResults {
            articles,
            total_hits,
        })
    }

    async fn ensure_index_exists(&self) -> Result<(), StoreError> {
        Ok(())
    }

    async fn health_check(&self) -> Result<bool, StoreError> {
        Ok(true)
    }
}

/// Store that fails every mutation with a fixed error.
pub struct FailingStore {
    error: StoreError,
}

impl FailingStore {
    /// Fails with a retryable backend-unavailable error.
    pub fn unavailable() -> Self {
        Self {
            error: StoreError::unavailable(503, "backend down"),
        }
    }

    /// Fails with a permanent rejection.
    pub fn rejecting() -> Self {
        Self {
            error: StoreError::update("mapping conflict"),
        }
    }
}

#[async_trait]
impl DocumentStore for FailingStore {
    async fn index_document(&self, _document: &NewsDocument) -> Result<(), StoreError> {
        Err(self.error.clone())
    }

    async fn update_document(&self, _patch: &NewsPatch) -> Result<(), StoreError> {
        Err(self.error.clone())
    }

    async fn delete_document(&self, _id: &str) -> Result<(), StoreError> {
        Err(self.error.clone())
    }

    async fn get_document(&self, _id: &str) -> Result<Option<NewsDocument>, StoreError> {
        Err(self.error.clone())
    }

    async fn search(&self, _query: &SearchQuery) -> Result<SearchResults, StoreError> {
        Err(self.error.clone())
    }

    async fn ensure_index_exists(&self) -> Result<(), StoreError> {
        Err(self.error.clone())
    }

    async fn health_check(&self) -> Result<bool, StoreError> {
        Ok(false)
    }
}
