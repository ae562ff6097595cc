//! # News Indexer Shared
//!
//! Shared types and data structures for the news indexer system:
//! the document model, the lifecycle event wire schema, and the
//! search query/result types exchanged between the pipeline and the
//! query layer.

pub mod document;
pub mod event;
pub mod query;

pub use document::{NewsDocument, NewsPatch};
pub use event::{EventCodecError, EventKind, IndexOp, NewsEvent};
pub use query::{SearchPage, SearchQuery, SearchResults};
