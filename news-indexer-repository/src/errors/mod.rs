//! Error types for the news indexer repository.

mod store_error;

pub use store_error::StoreError;
