//! Corpus server binary
//!
//! Run with: cargo run -p corpus-rag --bin corpus-rag-server

use std::path::PathBuf;

use corpus_rag::{config::AppConfig, server::CorpusServer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "corpus_rag=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config_path = std::env::var("CORPUS_RAG_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("corpus-rag.toml"));
    let config = AppConfig::load(&config_path)?;

    tracing::info!("Configuration loaded");
    tracing::info!("  - Service: {}", config.service.base_url);
    tracing::info!("  - Model: {}", config.service.model);
    tracing::info!("  - Upload limit: {} bytes", config.limits.max_payload_bytes);

    let server = CorpusServer::new(config)?;

    println!("\nServer starting...");
    println!("  API: http://{}", server.address());
    println!("  Health: http://{}/health", server.address());
    println!("\nEndpoints:");
    println!("  POST /api/stores         - Create a store");
    println!("  POST /api/documents      - Upload documents");
    println!("  POST /api/chat           - Ask questions with citations");
    println!("\nPress Ctrl+C to stop\n");

    server.start().await?;

    Ok(())
}
