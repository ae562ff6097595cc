//! # News Indexer Pipeline
//!
//! This crate provides the event-driven indexing pipeline: publishing
//! lifecycle events to Kafka, consuming them, and idempotently applying
//! them to the document store.
//!
//! ## Architecture
//!
//! 1. **Producer**: Serializes events and publishes them to the topic
//! 2. **Consumer**: Pulls messages and drives each one through the
//!    decode/dispatch/acknowledge state machine
//! 3. **Applier**: Maps decoded events onto idempotent store mutations
//! 4. **Orchestrator**: Coordinates lifecycle and graceful shutdown

pub mod applier;
pub mod consumer;
pub mod errors;
pub mod orchestrator;
pub mod producer;

#[cfg(test)]
pub(crate) mod testing;

pub use applier::{ApplyError, IndexApplier};
pub use consumer::{ConsumerConfig, Disposition, NewsConsumer};
pub use errors::{PipelineError, PublishError};
pub use orchestrator::Orchestrator;
pub use producer::EventPublisher;
