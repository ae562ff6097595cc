//! Document store error types.
//!
//! Every store operation reports a `StoreError`; the `is_retryable`
//! classification is what the pipeline uses to decide between redelivery
//! and the dead-letter path.

use thiserror::Error;

/// Errors that can occur during document store operations.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    /// Failed to reach the search backend.
    #[error("connection error: {0}")]
    ConnectionError(String),

    /// The backend answered but is transiently unable to serve the
    /// request (5xx or 429).
    #[error("search backend unavailable ({status}): {message}")]
    Unavailable {
        /// HTTP status returned by the backend.
        status: u16,
        /// Response body or error description.
        message: String,
    },

    /// The targeted document does not exist in the index. Surfaced by
    /// partial updates; an update arriving before its Created event can
    /// succeed on redelivery, so this counts as retryable.
    #[error("document '{0}' does not exist")]
    DocumentMissing(String),

    /// Search query execution failed.
    #[error("query error: {0}")]
    QueryError(String),

    /// Failed to index a document.
    #[error("index error: {0}")]
    IndexError(String),

    /// Failed to update a document.
    #[error("update error: {0}")]
    UpdateError(String),

    /// Failed to delete a document.
    #[error("delete error: {0}")]
    DeleteError(String),

    /// Failed to create the search index.
    #[error("index creation error: {0}")]
    IndexCreationError(String),

    /// Failed to parse a response from the search backend.
    #[error("parse error: {0}")]
    ParseError(String),

    /// Failed to serialize data for the search backend.
    #[error("serialization error: {0}")]
    SerializationError(String),
}

impl StoreError {
    /// Create a connection error.
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::ConnectionError(msg.into())
    }

    /// Create an unavailable error from an HTTP status and message.
    pub fn unavailable(status: u16, msg: impl Into<String>) -> Self {
        Self::Unavailable {
            status,
            message: msg.into(),
        }
    }

    /// Create a query error.
    pub fn query(msg: impl Into<String>) -> Self {
        Self::QueryError(msg.into())
    }

    /// Create an index error.
    pub fn index(msg: impl Into<String>) -> Self {
        Self::IndexError(msg.into())
    }

    /// Create an update error.
    pub fn update(msg: impl Into<String>) -> Self {
        Self::UpdateError(msg.into())
    }

    /// Create a delete error.
    pub fn delete(msg: impl Into<String>) -> Self {
        Self::DeleteError(msg.into())
    }

    /// Create an index creation error.
    pub fn index_creation(msg: impl Into<String>) -> Self {
        Self::IndexCreationError(msg.into())
    }

    /// Create a parse error.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::ParseError(msg.into())
    }

    /// Whether retrying the failed operation can reasonably succeed
    /// without any other change in the system.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::ConnectionError(_) | Self::Unavailable { .. } | Self::DocumentMissing(_)
        )
    }
}
