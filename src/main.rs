//! Server binary: config, capabilities, one-shot index build, then serve.

use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::{Level, info};
use tracing_subscriber::{EnvFilter, fmt};

use docqa::capabilities::{HttpEmbedder, HttpGenerator};
use docqa::config::QaConfig;
use docqa::loader::TextDocumentLoader;
use docqa::server;
use docqa::service::QaService;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(Level::INFO.into()))
        .init();

    let config = QaConfig::from_env()?;

    let client = reqwest::Client::new();
    let embedder = Arc::new(HttpEmbedder::new(
        client.clone(),
        &config.api.base_url,
        config.api.api_key.clone(),
        config.api.embedding_model.clone(),
    ));
    let generator = Arc::new(HttpGenerator::new(
        client,
        &config.api.base_url,
        config.api.api_key.clone(),
        config.api.chat_model.clone(),
    ));

    // Any failure here is fatal: the process refuses to serve rather than
    // answering from a half-built pipeline.
    let service = QaService::init(&config, &TextDocumentLoader, embedder, generator).await?;
    info!(
        chunks = service.index().len(),
        dimension = service.index().dimension(),
        "pipeline initialized"
    );

    let router = server::router(Arc::new(service));
    let listener = TcpListener::bind(config.bind_addr).await?;
    info!("serving on http://{}/ask", config.bind_addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("shutdown signal received");
        })
        .await?;

    Ok(())
}
