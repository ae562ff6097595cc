//! Error types for the news indexer pipeline.

use thiserror::Error;

use news_indexer_shared::EventCodecError;

/// Errors that can occur while publishing an event.
///
/// Publishing makes at most one attempt per call; retry and backoff
/// policy belong to the caller.
#[derive(Debug, Error)]
pub enum PublishError {
    /// The event payload could not be serialized. Should not occur for
    /// the fixed schema; never worth retrying.
    #[error("failed to encode event: {0}")]
    Encoding(#[from] EventCodecError),

    /// The broker did not confirm delivery within the publish window.
    #[error("publish timed out")]
    Timeout,

    /// The broker connection failed.
    #[error("broker connection error: {0}")]
    Connection(String),
}

/// Errors that can occur in the consumption pipeline.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Kafka-related error.
    #[error("Kafka error: {0}")]
    KafkaError(String),

    /// Error from the document store.
    #[error("Store error: {0}")]
    StoreError(#[from] news_indexer_repository::StoreError),
}

impl From<rdkafka::error::KafkaError> for PipelineError {
    fn from(err: rdkafka::error::KafkaError) -> Self {
        Self::KafkaError(err.to_string())
    }
}
