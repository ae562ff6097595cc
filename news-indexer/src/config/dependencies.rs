//! Dependency initialization and wiring for the news indexer.

use std::env;
use std::sync::Arc;

use tracing::info;

use crate::query::NewsQueryService;
use crate::ServiceError;
use news_indexer_pipeline::{ConsumerConfig, IndexApplier, NewsConsumer, Orchestrator};
use news_indexer_repository::{DocumentStore, OpenSearchStore};

/// Default OpenSearch URL.
const DEFAULT_OPENSEARCH_URL: &str = "http://localhost:9200";

/// Default Kafka broker address.
const DEFAULT_KAFKA_BROKER: &str = "localhost:9092";

/// Default Kafka consumer group ID.
const DEFAULT_KAFKA_GROUP_ID: &str = "news-indexer";

/// Container for all initialized dependencies.
pub struct Dependencies {
    /// The configured orchestrator ready to run.
    pub orchestrator: Orchestrator,
    /// Read-only query service over the same store.
    pub query_service: NewsQueryService,
}

impl Dependencies {
    /// Initialize all dependencies from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `OPENSEARCH_URL`: OpenSearch server URL (default: http://localhost:9200)
    /// - `KAFKA_BROKER`: Kafka broker address (default: localhost:9092)
    /// - `KAFKA_GROUP_ID`: Consumer group ID (default: news-indexer)
    pub async fn new() -> Result<Self, ServiceError> {
        let opensearch_url =
            env::var("OPENSEARCH_URL").unwrap_or_else(|_| DEFAULT_OPENSEARCH_URL.to_string());
        let kafka_broker =
            env::var("KAFKA_BROKER").unwrap_or_else(|_| DEFAULT_KAFKA_BROKER.to_string());
        let kafka_group_id =
            env::var("KAFKA_GROUP_ID").unwrap_or_else(|_| DEFAULT_KAFKA_GROUP_ID.to_string());

        info!(
            opensearch_url = %opensearch_url,
            kafka_broker = %kafka_broker,
            kafka_group_id = %kafka_group_id,
            "Initializing dependencies"
        );

        let store: Arc<dyn DocumentStore> = Arc::new(
            OpenSearchStore::new(&opensearch_url)
                .map_err(|e| ServiceError::config(format!("Failed to create store: {}", e)))?,
        );

        // Verify the store is reachable before consuming anything.
        let healthy = store
            .health_check()
            .await
            .map_err(|e| ServiceError::config(format!("Store health check failed: {}", e)))?;

        if !healthy {
            return Err(ServiceError::config("Search backend is unhealthy"));
        }

        info!("Document store connection verified");

        let applier = Arc::new(IndexApplier::new(Arc::clone(&store)));

        let consumer = NewsConsumer::new(
            &kafka_broker,
            &kafka_group_id,
            applier,
            ConsumerConfig::default(),
        )
        .map_err(|e| ServiceError::config(format!("Failed to create consumer: {}", e)))?;

        info!("News consumer created");

        let orchestrator = Orchestrator::new(consumer, Arc::clone(&store));
        let query_service = NewsQueryService::new(store);

        Ok(Self {
            orchestrator,
            query_service,
        })
    }
}
