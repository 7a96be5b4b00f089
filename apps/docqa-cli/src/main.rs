//! `docqa`: ingest a folder of documents, then ask questions about them.
//!
//! ```bash
//! docqa ingest ./documents
//! docqa query "What is Rinvoq used for?"
//! docqa stats
//! ```

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

use docqa_core::config::Config;
use docqa_ingest::{ingest_directory, DocumentProcessor};
use docqa_vector::LanceDocumentStore;

#[derive(Parser)]
#[command(name = "docqa")]
#[command(about = "Question answering over local documents", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to a JSON config file (defaults to $DOCQA_CONFIG or ./config.json)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract, chunk and store every supported file in a directory
    Ingest {
        /// Directory to ingest (defaults to paths.docs_directory)
        #[arg(value_name = "DIR")]
        dir: Option<PathBuf>,
    },
    /// Answer a question from the stored documents
    Query {
        #[arg(value_name = "QUESTION")]
        question: String,
        /// Print the response envelope as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show document count, model names and LLM connectivity
    Stats,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt().with_env_filter(filter).with_target(false).try_init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    }
    .map_err(|e| {
        eprintln!("Error loading config: {}", e);
        e
    })?;

    match cli.command {
        Commands::Ingest { dir } => {
            let docs_dir = match dir {
                Some(d) => d,
                None => config.docs_dir()?,
            };
            println!("Ingesting from {}", docs_dir.display());
            let processor = DocumentProcessor::from_config(&config)?;
            let store =
                LanceDocumentStore::from_config(&config).await.context("opening document store")?;
            let report = ingest_directory(&processor, &docs_dir, &store).await?;
            if report.chunks_processed == 0 {
                println!(
                    "No documents were processed. Add PDF, DOCX, TXT or MD files to {}",
                    docs_dir.display()
                );
            } else {
                println!(
                    "✅ Ingest complete ({} chunks, {} in store)",
                    report.chunks_processed, report.total_in_store
                );
            }
        }
        Commands::Query { question, json } => {
            let pipeline = docqa_rag::from_config(&config).await?;
            let response = pipeline.query(&question).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&response)?);
                return Ok(());
            }
            println!("{}\n", response.answer);
            if !response.sources.is_empty() {
                println!("Sources ({} found):", response.found_results);
                for (i, src) in response.sources.iter().enumerate() {
                    let page = src.page.map(|p| format!(", page {}", p)).unwrap_or_default();
                    println!(
                        "  {}. {}{} (similarity {:.3})",
                        i + 1,
                        src.source,
                        page,
                        src.similarity
                    );
                    println!("     {}", src.content_preview);
                }
            }
        }
        Commands::Stats => {
            let pipeline = docqa_rag::from_config(&config).await?;
            let stats = pipeline.stats().await;
            println!("Documents in store: {}", stats.total_documents);
            println!("LLM model:          {}", stats.llm_model);
            println!("Embedding model:    {}", stats.embedding_model);
            println!("LLM connected:      {}", if stats.llm_connected { "yes" } else { "no" });
        }
    }
    Ok(())
}
