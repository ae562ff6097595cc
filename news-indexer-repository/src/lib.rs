//! # News Indexer Repository
//!
//! This crate provides the trait and implementations for interacting with
//! the document store that backs the news index. It includes definitions
//! for errors, the store interface, and a concrete implementation for
//! OpenSearch.

pub mod errors;
pub mod interfaces;
pub mod opensearch;

pub use errors::StoreError;
pub use interfaces::DocumentStore;
pub use opensearch::OpenSearchStore;
