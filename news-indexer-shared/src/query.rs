//! Search query and result types.

use serde::Serialize;

use crate::document::NewsDocument;

/// Page number used when the caller supplies none or an invalid value.
pub const DEFAULT_PAGE: usize = 1;
/// Page size used when the caller supplies none or an invalid value.
pub const DEFAULT_LIMIT: usize = 10;

/// A paginated full-text search request.
///
/// An empty query string means match-all. A non-empty query is matched
/// fuzzily against the `content` field only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    /// The query text; empty means match-all.
    pub q: String,
    /// 1-based page number.
    pub page: usize,
    /// Number of results per page.
    pub limit: usize,
}

impl SearchQuery {
    /// Create a query, normalizing out-of-range pagination values.
    pub fn new(q: impl Into<String>, page: usize, limit: usize) -> Self {
        Self {
            q: q.into(),
            page: if page < 1 { DEFAULT_PAGE } else { page },
            limit: if limit < 1 { DEFAULT_LIMIT } else { limit },
        }
    }

    /// Create a match-all query with default pagination.
    pub fn match_all() -> Self {
        Self::new("", DEFAULT_PAGE, DEFAULT_LIMIT)
    }

    /// Build a query from raw query-string values.
    ///
    /// Unparsable or out-of-range `page`/`limit` fall back to their
    /// defaults, so `page=0` and `page=abc` both behave as page 1.
    pub fn from_raw(q: Option<&str>, page: Option<&str>, limit: Option<&str>) -> Self {
        let page = page
            .and_then(|p| p.parse::<usize>().ok())
            .filter(|p| *p >= 1)
            .unwrap_or(DEFAULT_PAGE);
        let limit = limit
            .and_then(|l| l.parse::<usize>().ok())
            .filter(|l| *l >= 1)
            .unwrap_or(DEFAULT_LIMIT);

        Self::new(q.unwrap_or_default(), page, limit)
    }

    /// The result offset for this page.
    ///
    /// Saturates instead of overflowing: page and limit come straight
    /// from query-string input, so arbitrarily large values must not
    /// panic.
    pub fn from(&self) -> usize {
        self.page.saturating_sub(1).saturating_mul(self.limit)
    }
}

/// Raw search results from the document store.
#[derive(Debug, Clone, Default)]
pub struct SearchResults {
    /// Matching documents for the requested page.
    pub articles: Vec<NewsDocument>,
    /// Total number of matches across all pages.
    pub total_hits: u64,
}

impl SearchResults {
    /// An empty result set.
    pub fn empty() -> Self {
        Self::default()
    }
}

/// A page of search results as served to the query boundary.
///
/// Serialized as `{total_hits, page, limit, articles}`.
#[derive(Debug, Clone, Serialize)]
pub struct SearchPage {
    /// Total number of matches across all pages.
    pub total_hits: u64,
    /// The 1-based page number that was served.
    pub page: usize,
    /// The page size that was applied.
    pub limit: usize,
    /// Matching documents for this page.
    pub articles: Vec<NewsDocument>,
}
