use anyhow::{Context, Result};
use clap::Parser;
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use advisor_engine::{SearchConfig, SemanticSearchService};
use advisor_retrieval::{
    default_corpus, ingestion::load_seed_file, CorpusIngestionPipeline, DocumentStore,
    EmbeddingProvider, FastembedProvider, VectorIndex,
};

/// Corpus validation and preview CLI
///
/// Loads a seed corpus, generates embeddings, reports ingestion stats, and
/// optionally runs a sanity query against the freshly built index.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Corpus file (JSON array of {id?, content, metadata}); the built-in
    /// corpus is used when omitted
    #[arg(short, long)]
    corpus: Option<String>,

    /// Optional sanity query to run against the ingested corpus
    #[arg(short, long)]
    query: Option<String>,

    /// Number of results to show for the sanity query
    #[arg(short = 'k', long, default_value = "5")]
    top_k: usize,

    /// Minimum cosine similarity for sanity-query results
    #[arg(short = 's', long, default_value = "0.3")]
    min_similarity: f32,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short = 'l', long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "advisor_ingest={0},advisor_retrieval={0},advisor_engine={0}",
                args.log_level
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let seeds = match &args.corpus {
        Some(path) => load_seed_file(std::path::Path::new(path))
            .context(format!("Failed to load corpus file {path}"))?,
        None => {
            tracing::info!("No corpus file given, using the built-in corpus");
            default_corpus()
        }
    };
    tracing::info!("Loaded {} seed documents", seeds.len());

    let embedder: Arc<dyn EmbeddingProvider> =
        Arc::new(FastembedProvider::new().context("Failed to load the embedding model")?);
    let index = Arc::new(VectorIndex::new(Arc::new(DocumentStore::new())));
    let pipeline = CorpusIngestionPipeline::new(embedder.clone(), index.clone());

    let stats = pipeline.ingest(seeds).await.context("Ingestion failed")?;

    println!("Ingestion summary");
    println!("  documents loaded:     {}", stats.documents_loaded);
    println!("  embeddings generated: {}", stats.embeddings_generated);
    println!("  documents indexed:    {}", stats.documents_indexed);
    println!(
        "  embedding dimension:  {}",
        index
            .store()
            .dimension()
            .map(|d| d.to_string())
            .unwrap_or_else(|| "n/a".to_string())
    );

    if let Some(query) = args.query {
        run_sanity_query(embedder, index, &query, args.top_k, args.min_similarity).await?;
    }

    Ok(())
}

async fn run_sanity_query(
    embedder: Arc<dyn EmbeddingProvider>,
    index: Arc<VectorIndex>,
    query: &str,
    top_k: usize,
    min_similarity: f32,
) -> Result<()> {
    let search = SemanticSearchService::new(
        embedder,
        index,
        SearchConfig {
            top_k,
            min_similarity,
            ..Default::default()
        },
    );

    let context = search
        .search_relevant_context(query, &BTreeSet::new())
        .await
        .context("Sanity query failed")?;

    println!("\nSanity query: {query:?}");
    if context.is_empty() {
        println!("  no documents above similarity {min_similarity:.2}");
        return Ok(());
    }

    for (i, result) in context.relevant_documents.iter().enumerate() {
        println!(
            "  {}. {} [{}] similarity {:.3}",
            i + 1,
            result.document.metadata.title,
            result.document.metadata.source,
            result.similarity
        );
    }
    println!(
        "  sources: {}",
        context.sources.iter().cloned().collect::<Vec<_>>().join(", ")
    );
    println!("  context chars: {}", context.context.chars().count());

    Ok(())
}
