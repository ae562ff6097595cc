//! Demo producer for the news indexing pipeline.
//!
//! Publishes a Created → Updated → Deleted lifecycle for a handful of
//! sample articles so the consumer side can be exercised end to end.

use std::env;

use chrono::Utc;
use tracing::info;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use news_indexer_pipeline::{EventPublisher, PublishError};
use news_indexer_shared::{NewsDocument, NewsEvent, NewsPatch};

fn sample_article(index: usize) -> NewsDocument {
    NewsDocument {
        id: Uuid::new_v4().to_string(),
        title: format!("Sample headline {}", index),
        content: format!(
            "Body of sample article {}. Lorem ipsum dolor sit amet, \
             consectetur adipiscing elit.",
            index
        ),
        author: "newsroom".to_string(),
        tags: vec!["sample".to_string(), "demo".to_string()],
        published_at: Utc::now(),
        created_at: Utc::now(),
        updated_at: None,
    }
}

#[tokio::main]
async fn main() -> Result<(), PublishError> {
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let broker = env::var("KAFKA_BROKER").unwrap_or_else(|_| "localhost:9092".to_string());
    let publisher = EventPublisher::new(&broker)?;

    info!(broker = %broker, "Publisher connected");

    // Full lifecycle for one article.
    let article = sample_article(0);
    let id = article.id.clone();

    publisher.publish(&NewsEvent::created(article)).await?;
    info!(id = %id, "Published CREATED");

    let patch = NewsPatch::new(id.clone())
        .with_title("Updated headline 0")
        .with_tags(vec!["sample".to_string(), "updated".to_string()]);
    publisher.publish(&NewsEvent::updated(patch)).await?;
    info!(id = %id, "Published UPDATED");

    publisher.publish(&NewsEvent::deleted(id.clone())).await?;
    info!(id = %id, "Published DELETED");

    // A batch of creates that stay in the index.
    for i in 1..=10 {
        let article = sample_article(i);
        let id = article.id.clone();
        publisher.publish(&NewsEvent::created(article)).await?;
        info!(id = %id, index = i, "Published CREATED");
    }

    info!("Done");
    Ok(())
}
