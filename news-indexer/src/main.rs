//! Entry point for the news indexer service.

use tracing::info;
use tracing_subscriber::EnvFilter;

use news_indexer::{Dependencies, ServiceError};

#[tokio::main]
async fn main() -> Result<(), ServiceError> {
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Starting news indexer service");

    let deps = Dependencies::new().await?;

    deps.orchestrator.run().await?;

    info!("News indexer service stopped");
    Ok(())
}
