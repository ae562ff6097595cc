//! Lifecycle event wire schema.
//!
//! Events travel as JSON envelopes of the form
//! `{"type": "...", "timestamp": "...", "payload": {...}}` where the
//! payload shape depends on the event type: Created carries a full
//! document snapshot, Updated carries a patch (changed fields plus id),
//! Deleted carries only the id.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::document::{NewsDocument, NewsPatch};

/// Wire value of the `type` field for Created events.
pub const EVENT_TYPE_CREATED: &str = "CREATED";
/// Wire value of the `type` field for Updated events.
pub const EVENT_TYPE_UPDATED: &str = "UPDATED";
/// Wire value of the `type` field for Deleted events.
pub const EVENT_TYPE_DELETED: &str = "DELETED";

/// The kind of lifecycle event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    /// A document was created.
    Created,
    /// A document was partially updated.
    Updated,
    /// A document was deleted.
    Deleted,
}

impl EventKind {
    /// The wire representation of this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Created => EVENT_TYPE_CREATED,
            EventKind::Updated => EVENT_TYPE_UPDATED,
            EventKind::Deleted => EVENT_TYPE_DELETED,
        }
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The index mutation a decoded event requests.
#[derive(Debug, Clone, PartialEq)]
pub enum IndexOp {
    /// Upsert the full document snapshot.
    Create(NewsDocument),
    /// Merge the present fields of the patch into the stored document.
    Update(NewsPatch),
    /// Remove the document with the given id.
    Delete {
        /// The target document's identifier.
        id: String,
    },
}

/// A document lifecycle event.
#[derive(Debug, Clone, PartialEq)]
pub struct NewsEvent {
    /// Event emission time; informational only, never used for ordering.
    pub timestamp: DateTime<Utc>,
    /// The requested index mutation.
    pub op: IndexOp,
}

/// Errors produced while encoding or decoding events.
#[derive(Debug, Error)]
pub enum EventCodecError {
    /// The message body is not valid JSON or does not match the envelope
    /// or payload shape.
    #[error("malformed event: {0}")]
    Malformed(String),

    /// The envelope carries an unrecognized `type`.
    #[error("unknown event type: {0}")]
    UnknownKind(String),

    /// The payload has no usable document id.
    #[error("event payload is missing a document id")]
    MissingId,

    /// The event could not be serialized.
    #[error("failed to encode event: {0}")]
    Encode(String),
}

/// JSON envelope shared by all event kinds.
#[derive(Serialize, Deserialize)]
struct Envelope {
    #[serde(rename = "type")]
    kind: String,
    timestamp: DateTime<Utc>,
    payload: Value,
}

impl NewsEvent {
    /// Create a Created event carrying a full document snapshot.
    pub fn created(document: NewsDocument) -> Self {
        Self {
            timestamp: Utc::now(),
            op: IndexOp::Create(document),
        }
    }

    /// Create an Updated event carrying a patch.
    pub fn updated(patch: NewsPatch) -> Self {
        Self {
            timestamp: Utc::now(),
            op: IndexOp::Update(patch),
        }
    }

    /// Create a Deleted event for the given document id.
    pub fn deleted(id: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            op: IndexOp::Delete { id: id.into() },
        }
    }

    /// The kind of this event.
    pub fn kind(&self) -> EventKind {
        match self.op {
            IndexOp::Create(_) => EventKind::Created,
            IndexOp::Update(_) => EventKind::Updated,
            IndexOp::Delete { .. } => EventKind::Deleted,
        }
    }

    /// The id of the document this event targets.
    pub fn doc_id(&self) -> &str {
        match &self.op {
            IndexOp::Create(doc) => &doc.id,
            IndexOp::Update(patch) => &patch.id,
            IndexOp::Delete { id } => id,
        }
    }

    /// Serialize the event to its JSON wire form.
    pub fn to_json(&self) -> Result<Vec<u8>, EventCodecError> {
        let payload = match &self.op {
            IndexOp::Create(doc) => serde_json::to_value(doc),
            IndexOp::Update(patch) => serde_json::to_value(patch),
            IndexOp::Delete { id } => Ok(serde_json::json!({ "id": id })),
        }
        .map_err(|e| EventCodecError::Encode(e.to_string()))?;

        let envelope = Envelope {
            kind: self.kind().as_str().to_string(),
            timestamp: self.timestamp,
            payload,
        };

        serde_json::to_vec(&envelope).map_err(|e| EventCodecError::Encode(e.to_string()))
    }

    /// Decode an event from its JSON wire form.
    ///
    /// Distinguishes malformed bodies, unknown event types, and payloads
    /// without a document id so the consumer can log them apart; all three
    /// are terminal for the message.
    pub fn from_json(bytes: &[u8]) -> Result<Self, EventCodecError> {
        let envelope: Envelope = serde_json::from_slice(bytes)
            .map_err(|e| EventCodecError::Malformed(e.to_string()))?;

        let op = match envelope.kind.as_str() {
            EVENT_TYPE_CREATED => {
                let doc: NewsDocument = serde_json::from_value(envelope.payload)
                    .map_err(|e| EventCodecError::Malformed(e.to_string()))?;
                if doc.id.is_empty() {
                    return Err(EventCodecError::MissingId);
                }
                IndexOp::Create(doc)
            }
            EVENT_TYPE_UPDATED => {
                let patch: NewsPatch = serde_json::from_value(envelope.payload)
                    .map_err(|e| EventCodecError::Malformed(e.to_string()))?;
                if patch.id.is_empty() {
                    return Err(EventCodecError::MissingId);
                }
                IndexOp::Update(patch)
            }
            EVENT_TYPE_DELETED => {
                let id = envelope
                    .payload
                    .get("id")
                    .and_then(Value::as_str)
                    .unwrap_or_default();
                if id.is_empty() {
                    return Err(EventCodecError::MissingId);
                }
                IndexOp::Delete { id: id.to_string() }
            }
            other => return Err(EventCodecError::UnknownKind(other.to_string())),
        };

        Ok(Self {
            timestamp: envelope.timestamp,
            op,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_doc() -> NewsDocument {
        NewsDocument {
            id: "n1".to_string(),
            title: "Title".to_string(),
            content: "Body".to_string(),
            author: "Reporter".to_string(),
            tags: vec!["world".to_string()],
            published_at: Utc::now(),
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    #[test]
    fn test_created_roundtrip() {
        let event = NewsEvent::created(sample_doc());
        let bytes = event.to_json().unwrap();

        let decoded = NewsEvent::from_json(&bytes).unwrap();
        assert_eq!(decoded.kind(), EventKind::Created);
        assert_eq!(decoded.doc_id(), "n1");
        match decoded.op {
            IndexOp::Create(doc) => assert_eq!(doc.title, "Title"),
            other => panic!("unexpected op: {:?}", other),
        }
    }

    #[test]
    fn test_updated_decodes_partial_payload() {
        let body = r#"{
            "type": "UPDATED",
            "timestamp": "2024-01-01T00:00:00Z",
            "payload": {"id": "n1", "title": "X"}
        }"#;

        let event = NewsEvent::from_json(body.as_bytes()).unwrap();
        match event.op {
            IndexOp::Update(patch) => {
                assert_eq!(patch.id, "n1");
                assert_eq!(patch.title, Some("X".to_string()));
                assert!(patch.content.is_none());
                assert!(patch.tags.is_none());
            }
            other => panic!("unexpected op: {:?}", other),
        }
    }

    #[test]
    fn test_deleted_decodes_id_only() {
        let body = r#"{
            "type": "DELETED",
            "timestamp": "2024-01-01T00:00:00Z",
            "payload": {"id": "n1", "title": "ignored"}
        }"#;

        let event = NewsEvent::from_json(body.as_bytes()).unwrap();
        assert_eq!(event.op, IndexOp::Delete { id: "n1".to_string() });
    }

    #[test]
    fn test_deleted_wire_payload_carries_only_id() {
        let event = NewsEvent::deleted("n1");
        let bytes = event.to_json().unwrap();

        let value: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(value["type"], "DELETED");
        assert_eq!(value["payload"].as_object().unwrap().len(), 1);
        assert_eq!(value["payload"]["id"], "n1");
    }

    #[test]
    fn test_malformed_body() {
        let err = NewsEvent::from_json(b"not json at all").unwrap_err();
        assert!(matches!(err, EventCodecError::Malformed(_)));
    }

    #[test]
    fn test_unknown_kind() {
        let body = r#"{
            "type": "ARCHIVED",
            "timestamp": "2024-01-01T00:00:00Z",
            "payload": {"id": "n1"}
        }"#;

        let err = NewsEvent::from_json(body.as_bytes()).unwrap_err();
        match err {
            EventCodecError::UnknownKind(kind) => assert_eq!(kind, "ARCHIVED"),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_missing_id() {
        let body = r#"{
            "type": "DELETED",
            "timestamp": "2024-01-01T00:00:00Z",
            "payload": {}
        }"#;

        let err = NewsEvent::from_json(body.as_bytes()).unwrap_err();
        assert!(matches!(err, EventCodecError::MissingId));
    }
}
