//! Offline index builder
//!
//! Run with: cargo run -p faq-rag --features cli --bin faq-rag-index -- --input data/faq.json

use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use faq_rag::{
    config::RagConfig,
    ingestion::{clean_records, load_records, IndexBuilder},
    OllamaClient,
};

/// Build the persisted vector index from a FAQ JSON export
#[derive(Parser, Debug)]
#[command(name = "faq-rag-index", version, about)]
struct Args {
    /// JSON array of FAQ records
    #[arg(short, long)]
    input: PathBuf,

    /// Output directory (defaults to index.dir from config)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Config file (defaults to $FAQ_RAG_CONFIG or ./faq-rag.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "faq_rag=info,faq_index=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => RagConfig::from_file(path)?,
        None => RagConfig::load()?,
    };
    let output = args.output.unwrap_or_else(|| config.index.dir.clone());

    let records = clean_records(&load_records(&args.input)?);
    if records.is_empty() {
        anyhow::bail!("no usable FAQ records in {}", args.input.display());
    }

    let bar = ProgressBar::new(records.len() as u64);
    bar.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} embedding chunks")?
            .progress_chars("#>-"),
    );

    let embedder = Arc::new(OllamaClient::new(&config.llm)?);
    let progress = bar.clone();
    let index = IndexBuilder::new(embedder)
        .with_dimensions(config.embeddings.dimensions)
        .with_progress(move |done, _| progress.set_position(done as u64))
        .build(&records)
        .await?;
    bar.finish_and_clear();

    index.save(&output)?;

    println!(
        "Indexed {} chunks ({} dimensions) into {}",
        index.len(),
        index.dimensions(),
        output.display()
    );
    println!("Categories: {}", index.categories().join(", "));

    Ok(())
}
