use carbon_ai_embed::{EmbedConfig, FastEmbedProvider};
use carbon_ai_retriever::{RetrievalConfig, RetrievalSystem};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process;
use std::sync::Arc;

/// A CLI tool to build and query the carbon-accounting knowledge index.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Directory containing the knowledge base documents and the index
    #[arg(short, long, default_value = "knowledge_base")]
    knowledge_base: PathBuf,

    /// Optional TOML configuration file overriding the defaults
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Rebuild the vector index from the knowledge base documents
    Build,
    /// Search the index and print the nearest chunks (no LLM involved)
    Search {
        /// Query text
        query: String,
        /// Maximum number of results
        #[arg(short, long, default_value_t = 4)]
        limit: usize,
        /// Print results as JSON instead of a summary
        #[arg(long)]
        json: bool,
    },
    /// Show index statistics
    Stats,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "carbon_ai_retriever=info,carbon_ai_embed=info".into()),
        )
        .init();

    if let Err(e) = run().await {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => RetrievalConfig::from_toml_file(path)?,
        None => RetrievalConfig::default(),
    };
    if args.config.is_none() {
        config.knowledge_base_path = args.knowledge_base.clone();
    }

    let provider = Arc::new(FastEmbedProvider::create(EmbedConfig::default()).await?);

    match args.command {
        Commands::Build => {
            let system = RetrievalSystem::rebuild(config, provider).await?;
            let stats = system.stats().await?;
            println!(
                "Index built in {}: {} documents, {} chunks, {} embeddings",
                system.config().knowledge_base_path.display(),
                stats.documents_count,
                stats.chunks_count,
                stats.embeddings_count
            );
            Ok(())
        }
        Commands::Search { query, limit, json } => {
            let system = RetrievalSystem::open_or_build(config, provider).await?;
            let results = system.search(&query, limit).await?;

            if json {
                println!("{}", serde_json::to_string_pretty(&results)?);
            } else {
                println!("Found {} matching chunks:", results.len());
                for result in results {
                    println!(
                        "  Score: {:.3} | Source: {} | Chunk: {}",
                        result.score, result.source, result.sequence
                    );
                    println!(
                        "    {}",
                        result.content.chars().take(120).collect::<String>()
                    );
                }
            }
            Ok(())
        }
        Commands::Stats => {
            let system = RetrievalSystem::open_or_build(config, provider).await?;
            let stats = system.stats().await?;
            println!("Index statistics:");
            println!("  Documents: {}", stats.documents_count);
            println!("  Chunks: {}", stats.chunks_count);
            println!("  Embeddings: {}", stats.embeddings_count);
            Ok(())
        }
    }
}
