//! Per-message processing state machine.
//!
//! Each message moves Received → Decoded → Dispatched and ends in exactly
//! one terminal disposition. Decode and dispatch failures are handled
//! here and never escape to the consumption loop; applier failures are
//! classified into requeue vs dead-letter.

use tracing::{debug, warn};

use crate::applier::IndexApplier;
use news_indexer_shared::{IndexOp, NewsEvent};

/// Terminal disposition of a consumed message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// Message fully applied; remove it from the queue.
    Ack,
    /// Transient failure; schedule redelivery.
    NackRequeue,
    /// Unprocessable message; drop without retry.
    NackDiscard,
    /// Permanent processing failure; route to the dead-letter topic.
    DeadLetter,
}

/// Decode a message body and apply the event it carries.
///
/// Malformed bodies, unknown event types, and payloads without a document
/// id are discarded: redelivering them can never succeed, and dropping
/// them is what keeps a poison message from stalling the loop.
pub async fn dispatch(payload: &[u8], applier: &IndexApplier) -> Disposition {
    let event = match NewsEvent::from_json(payload) {
        Ok(event) => event,
        Err(e) => {
            warn!(error = %e, "Discarding undecodable message");
            return Disposition::NackDiscard;
        }
    };

    let kind = event.kind();
    let id = event.doc_id().to_string();
    debug!(kind = %kind, id = %id, "Dispatching event");

    let result = match event.op {
        IndexOp::Create(doc) => applier.apply_create(&doc).await,
        IndexOp::Update(patch) => applier.apply_update(patch).await,
        IndexOp::Delete { id } => applier.apply_delete(&id).await,
    };

    match result {
        Ok(()) => {
            debug!(kind = %kind, id = %id, "Event applied");
            Disposition::Ack
        }
        Err(e) if e.is_retryable() => {
            warn!(kind = %kind, id = %id, error = %e, "Apply failed transiently, requeueing");
            Disposition::NackRequeue
        }
        Err(e) => {
            warn!(kind = %kind, id = %id, error = %e, "Apply failed permanently, dead-lettering");
            Disposition::DeadLetter
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FailingStore, InMemoryStore};
    use chrono::Utc;
    use news_indexer_repository::DocumentStore;
    use news_indexer_shared::{NewsDocument, NewsPatch, SearchQuery};
    use std::sync::Arc;

    fn doc(id: &str, title: &str, content: &str) -> NewsDocument {
        NewsDocument {
            id: id.to_string(),
            title: title.to_string(),
            content: content.to_string(),
            author: "Reporter".to_string(),
            tags: Vec::new(),
            published_at: Utc::now(),
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    #[tokio::test]
    async fn test_malformed_message_is_discarded() {
        let applier = IndexApplier::new(Arc::new(InMemoryStore::new()));

        let disposition = dispatch(b"{not json", &applier).await;

        assert_eq!(disposition, Disposition::NackDiscard);
    }

    #[tokio::test]
    async fn test_unknown_event_type_is_discarded() {
        let applier = IndexApplier::new(Arc::new(InMemoryStore::new()));
        let body = r#"{
            "type": "ARCHIVED",
            "timestamp": "2024-01-01T00:00:00Z",
            "payload": {"id": "n1"}
        }"#;

        let disposition = dispatch(body.as_bytes(), &applier).await;

        assert_eq!(disposition, Disposition::NackDiscard);
    }

    #[tokio::test]
    async fn test_successful_apply_is_acked() {
        let store = Arc::new(InMemoryStore::new());
        let applier = IndexApplier::new(store.clone());
        let bytes = NewsEvent::created(doc("n1", "A", "Body")).to_json().unwrap();

        let disposition = dispatch(&bytes, &applier).await;

        assert_eq!(disposition, Disposition::Ack);
        assert_eq!(store.get("n1").await.unwrap().title, "A");
    }

    #[tokio::test]
    async fn test_retryable_failure_is_requeued() {
        let applier = IndexApplier::new(Arc::new(FailingStore::unavailable()));
        let bytes = NewsEvent::deleted("n1").to_json().unwrap();

        let disposition = dispatch(&bytes, &applier).await;

        assert_eq!(disposition, Disposition::NackRequeue);
    }

    #[tokio::test]
    async fn test_fatal_failure_is_dead_lettered() {
        let applier = IndexApplier::new(Arc::new(FailingStore::rejecting()));
        let bytes = NewsEvent::deleted("n1").to_json().unwrap();

        let disposition = dispatch(&bytes, &applier).await;

        assert_eq!(disposition, Disposition::DeadLetter);
    }

    /// Full lifecycle: create, search, partial update, delete.
    #[tokio::test]
    async fn test_lifecycle_scenario() {
        let store = Arc::new(InMemoryStore::new());
        let applier = IndexApplier::new(store.clone());

        let bytes = NewsEvent::created(doc("n1", "A", "Story about A"))
            .to_json()
            .unwrap();
        assert_eq!(dispatch(&bytes, &applier).await, Disposition::Ack);

        let results = store.search(&SearchQuery::new("A", 1, 10)).await.unwrap();
        assert_eq!(results.total_hits, 1);
        assert_eq!(results.articles[0].id, "n1");

        let bytes = NewsEvent::updated(
            NewsPatch::new("n1").with_tags(vec!["x".to_string()]),
        )
        .to_json()
        .unwrap();
        assert_eq!(dispatch(&bytes, &applier).await, Disposition::Ack);

        let stored = store.get("n1").await.unwrap();
        assert_eq!(stored.title, "A");
        assert_eq!(stored.tags, vec!["x".to_string()]);

        let bytes = NewsEvent::deleted("n1").to_json().unwrap();
        assert_eq!(dispatch(&bytes, &applier).await, Disposition::Ack);
        assert!(store.get("n1").await.is_none());
    }

    /// Redelivering the same Created event leaves a single stored entry.
    #[tokio::test]
    async fn test_duplicate_delivery_is_idempotent() {
        let store = Arc::new(InMemoryStore::new());
        let applier = IndexApplier::new(store.clone());
        let bytes = NewsEvent::created(doc("n1", "A", "Body")).to_json().unwrap();

        assert_eq!(dispatch(&bytes, &applier).await, Disposition::Ack);
        assert_eq!(dispatch(&bytes, &applier).await, Disposition::Ack);

        assert_eq!(store.len().await, 1);
    }
}
