//! # medqa
//!
//! Command-line interface for grounded question answering.
//!
//! ## Commands
//!
//! - `medqa note <PATH> <QUERY>` - answer a question over a clinical note
//!   (`.txt`) or structured patient record (`.json`)
//! - `medqa pubmed <QUERY>` - answer a question over freshly fetched PubMed
//!   abstracts
//!
//! ## Examples
//!
//! ```bash
//! medqa note ./note.txt "Why was the patient prescribed an antibiotic?"
//!
//! medqa pubmed "What is the first-line treatment for sinusitis?" \
//!     --email you@example.org --max-results 10
//! ```
//!
//! The Gemini API key is read from `GEMINI_API_KEY` (a `.env` file is
//! honored). Any unrecovered error exits non-zero with a stage-identifying
//! message.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use medqa_rag::gemini::{GeminiEmbedder, GeminiGenerator};
use medqa_rag::{load_corpus, PubMedSource, RagConfig, RagPipeline};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "medqa")]
#[command(about = "Grounded question answering over clinical notes and literature")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Number of context passages to retrieve
    #[arg(long, global = true, default_value_t = 3)]
    top_k: usize,

    /// Approximate token budget per chunk
    #[arg(long, global = true, default_value_t = 300)]
    max_tokens: usize,

    /// Gemini API key
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true, global = true)]
    api_key: Option<String>,
}

#[derive(Subcommand)]
enum Command {
    /// Answer a question over a clinical note or patient record
    Note {
        /// Path to a .txt note or .json patient record
        path: PathBuf,
        /// The question to answer
        query: String,
    },
    /// Answer a question over PubMed abstracts
    Pubmed {
        /// The question to search PubMed for and answer
        query: String,
        /// Contact e-mail required by the Entrez API
        #[arg(long, env = "ENTREZ_EMAIL")]
        email: String,
        /// Maximum number of abstracts to fetch
        #[arg(long, default_value_t = 10)]
        max_results: usize,
    },
}

fn build_pipeline(cli: &Cli) -> Result<RagPipeline> {
    let api_key = cli
        .api_key
        .clone()
        .context("GEMINI_API_KEY is not set (flag --api-key or environment)")?;

    let config = RagConfig::builder()
        .top_k(cli.top_k)
        .max_tokens(cli.max_tokens)
        .build()
        .context("invalid pipeline configuration")?;

    let pipeline = RagPipeline::builder()
        .config(config)
        .embedding_provider(Arc::new(
            GeminiEmbedder::new(&api_key).context("failed to set up the embedding provider")?,
        ))
        .generation_provider(Arc::new(
            GeminiGenerator::new(&api_key).context("failed to set up the generation provider")?,
        ))
        .build()
        .context("failed to assemble the pipeline")?;

    Ok(pipeline)
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .init();

    let cli = Cli::parse();
    let pipeline = build_pipeline(&cli)?;

    let answer = match &cli.command {
        Command::Note { path, query } => {
            let corpus = load_corpus(path)
                .with_context(|| format!("failed to load corpus from {}", path.display()))?;
            pipeline.run(&corpus, query).await.context("pipeline run failed")?
        }
        Command::Pubmed { query, email, max_results } => {
            let source = PubMedSource::new(email).context("failed to set up the PubMed source")?;
            pipeline
                .run_with_source(&source, query, *max_results)
                .await
                .context("pipeline run failed")?
        }
    };

    println!("{answer}");
    Ok(())
}
