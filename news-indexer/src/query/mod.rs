//! Read-only query service over the document store.
//!
//! Serves search and lookup independently of the indexing pipeline; the
//! HTTP collaborator exposes these as `GET /news` and `GET /news/{id}`.

use std::sync::Arc;

use tracing::debug;

use news_indexer_repository::{DocumentStore, StoreError};
use news_indexer_shared::{NewsDocument, SearchPage, SearchQuery};

/// Query service for news articles.
pub struct NewsQueryService {
    store: Arc<dyn DocumentStore>,
}

impl NewsQueryService {
    /// Create a query service over the given store.
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Search news articles.
    ///
    /// An empty query matches all documents; matching nothing yields an
    /// empty page with `total_hits = 0` rather than an error.
    pub async fn search_news(&self, query: SearchQuery) -> Result<SearchPage, StoreError> {
        debug!(q = %query.q, page = query.page, limit = query.limit, "Searching news");

        let results = self.store.search(&query).await?;

        Ok(SearchPage {
            total_hits: results.total_hits,
            page: query.page,
            limit: query.limit,
            articles: results.articles,
        })
    }

    /// Fetch a single article by id.
    ///
    /// Absence is a first-class outcome: a never-created or deleted id
    /// returns `Ok(None)`, and callers branch on it rather than on an
    /// error.
    pub async fn get_news_by_id(&self, id: &str) -> Result<Option<NewsDocument>, StoreError> {
        debug!(id = %id, "Fetching news article");
        self.store.get_document(id).await
    }
}
