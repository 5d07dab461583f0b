//! Query server binary
//!
//! Run with: cargo run -p faq-rag --bin faq-rag-server

use faq_rag::{
    config::RagConfig,
    server::{state::AppState, RagServer},
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "faq_rag=info,faq_index=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = RagConfig::load()?;

    tracing::info!("Configuration loaded");
    tracing::info!("  - Index directory: {}", config.index.dir.display());
    tracing::info!("  - Embedding model: {}", config.llm.embed_model);
    tracing::info!("  - LLM model: {}", config.llm.generate_model);
    tracing::info!("  - Top k: {}", config.retrieval.top_k);
    tracing::info!("  - Provider timeout: {}s", config.pipeline.provider_timeout_secs);

    let state = AppState::from_config(config)?;

    let ollama = faq_rag::OllamaClient::new(&state.config().llm)?;
    if ollama.health_check().await? {
        tracing::info!("Ollama is running at {}", state.config().llm.base_url);
    } else {
        tracing::warn!("Ollama not available at {}", state.config().llm.base_url);
        tracing::warn!(
            "  Pull models with: ollama pull {} && ollama pull {}",
            state.config().llm.embed_model,
            state.config().llm.generate_model
        );
    }

    let server = RagServer::new(state);

    println!("\nServer starting...");
    println!("  API: http://{}", server.address());
    println!("  Health: http://{}/health", server.address());
    println!("  API Info: http://{}/api/info", server.address());
    println!("\nPress Ctrl+C to stop\n");

    server.start().await?;

    Ok(())
}
