//! Kafka consumer implementation for the news indexer.
//!
//! Pulls lifecycle events from the news topic, processes each message on
//! its own bounded task, and executes the resulting disposition against
//! the broker: commit on ack/discard, bounded re-publish on requeue, and
//! a dead-letter topic for messages that keep failing or fail fatally.
//! Every message ends in an offset commit, issued only after any
//! re-publish has been accepted by the broker.

use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;
use rdkafka::config::ClientConfig;
use rdkafka::consumer::{CommitMode, Consumer, StreamConsumer};
use rdkafka::message::{Header, Headers, Message as KafkaMessage, OwnedHeaders, OwnedMessage};
use rdkafka::producer::{FutureProducer, FutureRecord};
use rdkafka::{Offset, TopicPartitionList};
use tokio::sync::{broadcast, Semaphore};
use tokio::task::JoinSet;
use tracing::{debug, error, info, instrument, warn};

use crate::applier::IndexApplier;
use crate::consumer::dispatch::{dispatch, Disposition};
use crate::errors::PipelineError;
use crate::producer::NEWS_EVENTS_TOPIC;

/// Topic receiving messages that exhausted their delivery attempts or
/// failed fatally.
pub const DEAD_LETTER_TOPIC: &str = "news.events.dlq";

/// Message header carrying the number of failed deliveries so far.
pub const ATTEMPTS_HEADER: &str = "delivery-attempts";

/// Header describing why a message was dead-lettered.
const DEAD_LETTER_REASON_HEADER: &str = "dead-letter-reason";

/// Configuration for the news consumer.
#[derive(Debug, Clone)]
pub struct ConsumerConfig {
    /// Total deliveries a message gets before it is dead-lettered.
    pub max_delivery_attempts: u32,
    /// Maximum number of messages processed concurrently.
    pub max_in_flight: usize,
}

impl Default for ConsumerConfig {
    fn default() -> Self {
        Self {
            max_delivery_attempts: 5,
            max_in_flight: 8,
        }
    }
}

/// Kafka consumer for news lifecycle events.
pub struct NewsConsumer {
    consumer: Arc<StreamConsumer>,
    producer: FutureProducer,
    applier: Arc<IndexApplier>,
    config: ConsumerConfig,
    topic: String,
}

impl NewsConsumer {
    /// Create a new consumer.
    ///
    /// # Arguments
    ///
    /// * `brokers` - Kafka broker addresses (comma-separated)
    /// * `group_id` - Consumer group ID
    /// * `applier` - The applier invoked for each decoded event
    /// * `config` - Retry and concurrency limits
    pub fn new(
        brokers: &str,
        group_id: &str,
        applier: Arc<IndexApplier>,
        config: ConsumerConfig,
    ) -> Result<Self, PipelineError> {
        let consumer: StreamConsumer = ClientConfig::new()
            .set("bootstrap.servers", brokers)
            .set("group.id", group_id)
            .set("enable.auto.commit", "false")
            .set("auto.offset.reset", "earliest")
            .set("session.timeout.ms", "6000")
            .create()?;

        // Requeue and dead-letter messages go back out through this
        // producer.
        let producer: FutureProducer = ClientConfig::new()
            .set("bootstrap.servers", brokers)
            .set("message.timeout.ms", "5000")
            .create()?;

        info!(brokers = %brokers, group_id = %group_id, "Created news consumer");

        Ok(Self {
            consumer: Arc::new(consumer),
            producer,
            applier,
            config,
            topic: NEWS_EVENTS_TOPIC.to_string(),
        })
    }

    /// Subscribe to the news events topic.
    pub fn subscribe(&self) -> Result<(), PipelineError> {
        self.consumer.subscribe(&[self.topic.as_str()])?;
        info!(topic = %self.topic, "Subscribed to topic");
        Ok(())
    }

    /// Run the consumption loop until shutdown or stream end.
    ///
    /// Each message is detached from the stream and processed on its own
    /// task so a slow apply for one id does not block delivery of
    /// unrelated messages; the semaphore bounds how many appliers run at
    /// once. On shutdown the loop stops pulling and drains in-flight
    /// tasks before returning.
    #[instrument(skip(self, shutdown))]
    pub async fn run(&self, mut shutdown: broadcast::Receiver<()>) -> Result<(), PipelineError> {
        let semaphore = Arc::new(Semaphore::new(self.config.max_in_flight));
        let mut tasks: JoinSet<()> = JoinSet::new();
        let mut stream = self.consumer.stream();

        loop {
            tokio::select! {
                _ = shutdown.recv() => {
                    info!("Consumer received shutdown signal");
                    break;
                }
                message = stream.next() => {
                    match message {
                        Some(Ok(msg)) => {
                            let owned = msg.detach();
                            let permit = match semaphore.clone().acquire_owned().await {
                                Ok(permit) => permit,
                                Err(_) => break,
                            };

                            let consumer = Arc::clone(&self.consumer);
                            let producer = self.producer.clone();
                            let applier = Arc::clone(&self.applier);
                            let config = self.config.clone();

                            tasks.spawn(async move {
                                process_message(&consumer, &producer, &applier, &config, owned)
                                    .await;
                                drop(permit);
                            });

                            // Reap whatever has already finished.
                            while tasks.try_join_next().is_some() {}
                        }
                        Some(Err(e)) => {
                            error!(error = %e, "Kafka error");
                        }
                        None => {
                            info!("Kafka stream ended");
                            break;
                        }
                    }
                }
            }
        }

        drop(stream);
        while tasks.join_next().await.is_some() {}

        info!("Consumer drained in-flight messages");
        Ok(())
    }
}

/// Broker action a message resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Resolution {
    /// Commit the offset, nothing else.
    Commit,
    /// Re-publish with this attempts header, then commit.
    Requeue(u32),
    /// Publish to the dead-letter topic, then commit.
    DeadLetter { attempts: u32, reason: &'static str },
}

/// Map a disposition and the delivery history onto a broker action.
fn resolve(disposition: Disposition, attempts: u32, max_delivery_attempts: u32) -> Resolution {
    match disposition {
        Disposition::Ack | Disposition::NackDiscard => Resolution::Commit,
        Disposition::DeadLetter => Resolution::DeadLetter {
            attempts,
            reason: "fatal apply failure",
        },
        Disposition::NackRequeue => {
            let next_attempt = attempts.saturating_add(1);
            if next_attempt >= max_delivery_attempts {
                Resolution::DeadLetter {
                    attempts: next_attempt,
                    reason: "delivery attempts exhausted",
                }
            } else {
                Resolution::Requeue(next_attempt)
            }
        }
    }
}

/// Process one message to a terminal disposition and execute it.
///
/// The offset is committed only once the message has left the active
/// path: immediately for ack/discard, and after the re-publish has
/// landed for requeue/dead-letter. Commits run async and unordered
/// across tasks, so committing before the re-publish succeeds would let
/// a later offset on the same partition overtake this one and the
/// message would be lost on rebalance.
async fn process_message(
    consumer: &StreamConsumer,
    producer: &FutureProducer,
    applier: &IndexApplier,
    config: &ConsumerConfig,
    msg: OwnedMessage,
) {
    let attempts = delivery_attempts(&msg);

    let disposition = match msg.payload() {
        Some(payload) => dispatch(payload, applier).await,
        None => {
            warn!("Received message with empty payload");
            Disposition::NackDiscard
        }
    };

    match resolve(disposition, attempts, config.max_delivery_attempts) {
        Resolution::Commit => {
            debug!(offset = msg.offset(), "Message done");
        }
        Resolution::Requeue(next_attempt) => {
            requeue(producer, &msg, next_attempt).await;
        }
        Resolution::DeadLetter { attempts, reason } => {
            dead_letter(producer, &msg, attempts, reason).await;
        }
    }

    commit(consumer, &msg);
}

/// Read the delivery-attempts header, defaulting to zero.
fn delivery_attempts(msg: &OwnedMessage) -> u32 {
    msg.headers()
        .and_then(|headers| {
            headers
                .iter()
                .find(|header| header.key == ATTEMPTS_HEADER)
                .and_then(|header| header.value)
                .and_then(|value| std::str::from_utf8(value).ok())
                .and_then(|value| value.parse().ok())
        })
        .unwrap_or(0)
}

/// Commit the message's offset, marking it done from the broker's view.
fn commit(consumer: &StreamConsumer, msg: &OwnedMessage) {
    let mut tpl = TopicPartitionList::new();
    if let Err(e) =
        tpl.add_partition_offset(msg.topic(), msg.partition(), Offset::Offset(msg.offset() + 1))
    {
        error!(error = %e, "Failed to build offset list");
        return;
    }

    if let Err(e) = consumer.commit(&tpl, CommitMode::Async) {
        error!(error = %e, offset = msg.offset(), "Failed to commit offset");
    }
}

/// Delay before re-publish retry number `retries`, doubling up to a cap.
fn retry_delay(retries: u32) -> Duration {
    Duration::from_secs(1 << retries.min(5))
}

/// Re-publish the message to the news topic with an incremented
/// attempts header.
///
/// Does not return until the broker accepts the message: the caller's
/// offset commit must never run before the re-publish has landed. A
/// stuck broker blocks this task only; the permit it holds bounds how
/// many messages can wait here at once.
async fn requeue(producer: &FutureProducer, msg: &OwnedMessage, next_attempt: u32) {
    let attempts = next_attempt.to_string();
    let mut retries = 0u32;

    loop {
        let headers = OwnedHeaders::new().insert(Header {
            key: ATTEMPTS_HEADER,
            value: Some(attempts.as_str()),
        });

        let record = FutureRecord::to(NEWS_EVENTS_TOPIC)
            .key(msg.key().unwrap_or_default())
            .payload(msg.payload().unwrap_or_default())
            .headers(headers);

        match producer.send(record, Duration::from_secs(5)).await {
            Ok(_) => {
                debug!(attempt = next_attempt, "Requeued message");
                return;
            }
            Err((e, _)) => {
                error!(error = %e, retries, "Failed to requeue message, retrying");
                tokio::time::sleep(retry_delay(retries)).await;
                retries = retries.saturating_add(1);
            }
        }
    }
}

/// Publish the message to the dead-letter topic.
///
/// Same contract as `requeue`: returns only once the broker has the
/// message, so the caller can commit the offset afterwards.
async fn dead_letter(producer: &FutureProducer, msg: &OwnedMessage, attempts: u32, reason: &str) {
    let attempts_value = attempts.to_string();
    let mut retries = 0u32;

    loop {
        let headers = OwnedHeaders::new()
            .insert(Header {
                key: ATTEMPTS_HEADER,
                value: Some(attempts_value.as_str()),
            })
            .insert(Header {
                key: DEAD_LETTER_REASON_HEADER,
                value: Some(reason),
            });

        let record = FutureRecord::to(DEAD_LETTER_TOPIC)
            .key(msg.key().unwrap_or_default())
            .payload(msg.payload().unwrap_or_default())
            .headers(headers);

        match producer.send(record, Duration::from_secs(5)).await {
            Ok(_) => {
                warn!(reason = %reason, "Message dead-lettered");
                return;
            }
            Err((e, _)) => {
                error!(error = %e, retries, "Failed to publish to dead-letter topic, retrying");
                tokio::time::sleep(retry_delay(retries)).await;
                retries = retries.saturating_add(1);
            }
        }
    }
}
