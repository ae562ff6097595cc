//! Consumer module for the news indexer pipeline.
//!
//! Pulls lifecycle events from Kafka and drives each message through the
//! decode/dispatch/acknowledge state machine.

mod dispatch;
mod kafka_consumer;

pub use dispatch::{dispatch, Disposition};
pub use kafka_consumer::{ConsumerConfig, NewsConsumer, ATTEMPTS_HEADER, DEAD_LETTER_TOPIC};
