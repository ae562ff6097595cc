//! Orchestrator for the indexing pipeline.
//!
//! Owns the consumer lifecycle: index bootstrap, subscription, the
//! consumption task, and graceful shutdown.

use std::sync::Arc;

use tokio::sync::broadcast;
use tracing::{error, info, instrument};

use crate::consumer::NewsConsumer;
use crate::errors::PipelineError;
use news_indexer_repository::DocumentStore;

/// Coordinates the pipeline components.
pub struct Orchestrator {
    consumer: Arc<NewsConsumer>,
    store: Arc<dyn DocumentStore>,
    shutdown_tx: broadcast::Sender<()>,
}

impl Orchestrator {
    /// Create a new orchestrator.
    pub fn new(consumer: NewsConsumer, store: Arc<dyn DocumentStore>) -> Self {
        let (shutdown_tx, _) = broadcast::channel(1);

        Self {
            consumer: Arc::new(consumer),
            store,
            shutdown_tx,
        }
    }

    /// Run the pipeline until a shutdown signal is received.
    ///
    /// Ensures the index exists, subscribes, and then consumes until
    /// SIGINT or stream end. In-flight applies are drained before this
    /// returns; dropping the consumer afterwards releases the broker
    /// connection.
    #[instrument(skip(self))]
    pub async fn run(&self) -> Result<(), PipelineError> {
        info!("Starting news indexing pipeline");

        self.store.ensure_index_exists().await?;
        self.consumer.subscribe()?;

        let consumer = Arc::clone(&self.consumer);
        let shutdown_rx = self.shutdown_tx.subscribe();

        let mut consumer_handle = tokio::spawn(async move {
            if let Err(e) = consumer.run(shutdown_rx).await {
                error!(error = %e, "Consumer error");
            }
        });

        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Received shutdown signal");
                let _ = self.shutdown_tx.send(());
            }
            _ = &mut consumer_handle => {
                info!("Consumer task ended");
                return Ok(());
            }
        }

        let _ = consumer_handle.await;

        info!("Pipeline shutdown complete");
        Ok(())
    }

    /// Trigger a graceful shutdown.
    pub fn shutdown(&self) {
        let _ = self.shutdown_tx.send(());
    }
}
