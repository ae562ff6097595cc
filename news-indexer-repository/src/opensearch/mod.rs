//! OpenSearch implementation of the document store.

mod client;
mod index_config;
mod queries;

pub use client::OpenSearchStore;
pub use index_config::{get_index_settings, INDEX_NAME};
