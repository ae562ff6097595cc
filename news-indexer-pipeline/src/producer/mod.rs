//! Event producer.
//!
//! Serializes lifecycle events and publishes them to the durable news
//! topic, keyed by document id so a single sequential producer preserves
//! per-id order.

use std::time::Duration;

use rdkafka::config::ClientConfig;
use rdkafka::error::KafkaError;
use rdkafka::producer::{FutureProducer, FutureRecord};
use rdkafka::types::RDKafkaErrorCode;
use tracing::{debug, info};

use crate::errors::PublishError;
use news_indexer_shared::NewsEvent;

/// The Kafka topic for news lifecycle events.
pub const NEWS_EVENTS_TOPIC: &str = "news.events";

/// Window within which the broker must confirm a published message.
const PUBLISH_TIMEOUT: Duration = Duration::from_secs(5);

/// Publisher for news lifecycle events.
pub struct EventPublisher {
    producer: FutureProducer,
    topic: String,
}

impl EventPublisher {
    /// Create a publisher connected to the given brokers.
    ///
    /// The producer performs no internal retries; each `publish` call is
    /// at most one delivery attempt and callers own any retry/backoff
    /// policy.
    pub fn new(brokers: &str) -> Result<Self, PublishError> {
        let producer: FutureProducer = ClientConfig::new()
            .set("bootstrap.servers", brokers)
            .set("message.timeout.ms", "5000")
            .set("message.send.max.retries", "0")
            .set("acks", "all")
            .create()
            .map_err(|e| PublishError::Connection(e.to_string()))?;

        info!(brokers = %brokers, topic = NEWS_EVENTS_TOPIC, "Created event publisher");

        Ok(Self {
            producer,
            topic: NEWS_EVENTS_TOPIC.to_string(),
        })
    }

    /// Publish a single event.
    ///
    /// # Errors
    ///
    /// * `PublishError::Encoding` - the event could not be serialized
    /// * `PublishError::Timeout` - the broker did not confirm within 5s
    /// * `PublishError::Connection` - any other broker failure
    pub async fn publish(&self, event: &NewsEvent) -> Result<(), PublishError> {
        let payload = event.to_json()?;

        let record = FutureRecord::to(&self.topic)
            .key(event.doc_id())
            .payload(&payload);

        match self.producer.send(record, PUBLISH_TIMEOUT).await {
            Ok(_) => {
                debug!(kind = %event.kind(), id = %event.doc_id(), "Published event");
                Ok(())
            }
            Err((KafkaError::MessageProduction(RDKafkaErrorCode::MessageTimedOut), _)) => {
                Err(PublishError::Timeout)
            }
            Err((e, _)) => Err(PublishError::Connection(e.to_string())),
        }
    }
}
