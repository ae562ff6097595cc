//! Abstract interfaces exposed by the repository.

mod document_store;

pub use document_store::DocumentStore;
