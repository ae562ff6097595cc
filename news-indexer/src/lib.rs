//! # News Indexer
//!
//! Main library for the event-driven news indexing and search service.
//!
//! This crate wires configuration, the indexing pipeline, and the query
//! service together into a runnable process.

pub mod config;
pub mod query;

pub use config::Dependencies;
pub use query::NewsQueryService;

use thiserror::Error;

/// Errors that can occur during service initialization or execution.
#[derive(Error, Debug)]
pub enum ServiceError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Pipeline error.
    #[error("Pipeline error: {0}")]
    PipelineError(#[from] news_indexer_pipeline::PipelineError),

    /// Document store error.
    #[error("Store error: {0}")]
    StoreError(#[from] news_indexer_repository::StoreError),

    /// IO error.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl ServiceError {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }
}
