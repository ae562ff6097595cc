//! Indexing applier.
//!
//! Maps decoded lifecycle events onto idempotent document store
//! mutations. Re-applying any event produces the same store state as
//! applying it once, which is what makes at-least-once delivery safe.

use std::sync::Arc;

use chrono::Utc;
use thiserror::Error;
use tracing::debug;

use news_indexer_repository::{DocumentStore, StoreError};
use news_indexer_shared::{NewsDocument, NewsPatch};

/// Errors surfaced by apply operations.
///
/// The retryable/fatal split drives the consumer's disposition: retryable
/// failures are redelivered (bounded), everything else goes to the
/// dead-letter topic.
#[derive(Debug, Error)]
pub enum ApplyError {
    /// The event payload violates a model invariant.
    #[error("invalid event payload: {0}")]
    Invalid(String),

    /// The store failed transiently; redelivery can succeed.
    #[error("retryable store failure: {0}")]
    Retryable(#[source] StoreError),

    /// The store rejected the operation permanently.
    #[error("fatal store failure: {0}")]
    Fatal(#[source] StoreError),
}

impl ApplyError {
    /// Create an invalid-payload error.
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::Invalid(msg.into())
    }

    /// Whether redelivering the event can reasonably succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Retryable(_))
    }
}

impl From<StoreError> for ApplyError {
    fn from(err: StoreError) -> Self {
        if err.is_retryable() {
            Self::Retryable(err)
        } else {
            Self::Fatal(err)
        }
    }
}

/// Applies lifecycle events to the document store.
///
/// The applier performs no application-level locking; it relies on the
/// store's per-document atomicity. Two concurrently delivered events for
/// the same id may interleave, and the last write physically applied
/// wins.
pub struct IndexApplier {
    store: Arc<dyn DocumentStore>,
}

impl IndexApplier {
    /// Create an applier over the given store.
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Upsert the full document at `doc.id`.
    ///
    /// Reapplying with the same id overwrites rather than duplicating;
    /// Created is semantically an upsert, not an insert-only operation.
    pub async fn apply_create(&self, doc: &NewsDocument) -> Result<(), ApplyError> {
        if doc.id.is_empty() {
            return Err(ApplyError::invalid("document id must not be empty"));
        }

        self.store.index_document(doc).await?;
        debug!(id = %doc.id, "Applied create");
        Ok(())
    }

    /// Merge the present fields of the patch into the stored document.
    ///
    /// `updated_at` is always stamped here at apply time; any
    /// producer-supplied value is discarded so the field reflects true
    /// last-write time.
    pub async fn apply_update(&self, mut patch: NewsPatch) -> Result<(), ApplyError> {
        if patch.id.is_empty() {
            return Err(ApplyError::invalid("document id must not be empty"));
        }

        patch.updated_at = Some(Utc::now());

        self.store.update_document(&patch).await?;
        debug!(id = %patch.id, "Applied update");
        Ok(())
    }

    /// Remove the document with the given id.
    ///
    /// Deleting a non-existent id is a no-op success; the store treats
    /// absence as already-deleted.
    pub async fn apply_delete(&self, id: &str) -> Result<(), ApplyError> {
        if id.is_empty() {
            return Err(ApplyError::invalid("document id must not be empty"));
        }

        self.store.delete_document(id).await?;
        debug!(id = %id, "Applied delete");
        Ok(())
    }
}
