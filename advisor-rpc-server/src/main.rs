mod config;
mod error;
mod handler;
mod protocol;
mod server;

use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use advisor_engine::{
    GenerationConfig, OpenAiChatModel, OrchestratorConfig, RagOrchestrator, SearchConfig,
    SemanticSearchService,
};
use advisor_retrieval::{
    default_corpus, ingestion::load_seed_file, CorpusIngestionPipeline, DocumentStore,
    EmbeddingProvider, FastembedProvider, VectorIndex,
};

use config::ServerConfig;
use handler::AdvisorHandler;
use server::RpcServer;

#[derive(Parser)]
#[command(name = "advisor-rpc-server")]
#[command(about = "JSON-RPC server for the portfolio advisor RAG core")]
struct Cli {
    /// Server host to bind to
    #[arg(long, default_value = "0.0.0.0")]
    host: String,

    /// Server port to bind to
    #[arg(long, default_value = "7891")]
    port: u16,

    /// Seed corpus file (JSON array); the built-in corpus is used when omitted
    #[arg(long)]
    corpus: Option<String>,

    /// Maximum documents retrieved per query
    #[arg(long, default_value = "5")]
    top_k: usize,

    /// Minimum cosine similarity for retrieved documents
    #[arg(long, default_value = "0.3")]
    min_similarity: f32,

    /// Character budget for the assembled context
    #[arg(long, default_value = "2000")]
    context_budget: usize,

    /// Conversation messages retained in the prompt
    #[arg(long, default_value = "6")]
    history_window: usize,

    /// Chat model name
    #[arg(long, default_value = "gpt-4-turbo")]
    model: String,

    /// LLM call timeout in seconds
    #[arg(long, default_value = "10")]
    llm_timeout: u64,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

impl Cli {
    fn into_config(self) -> ServerConfig {
        ServerConfig {
            host: self.host,
            port: self.port,
            corpus_path: self.corpus,
            search: SearchConfig {
                top_k: self.top_k,
                min_similarity: self.min_similarity,
                context_budget_chars: self.context_budget,
                ..Default::default()
            },
            generation: GenerationConfig {
                model: self.model,
                timeout_seconds: self.llm_timeout,
                ..Default::default()
            },
            orchestrator: OrchestratorConfig {
                history_window: self.history_window,
                ..Default::default()
            },
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let log_level = cli.log_level.clone();

    // Initialize logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "advisor_rpc_server={log_level},advisor_engine={log_level},advisor_retrieval={log_level}"
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = cli.into_config();

    tracing::info!("Advisor JSON-RPC server starting");
    tracing::info!("  Host: {}", config.host);
    tracing::info!("  Port: {}", config.port);
    tracing::info!(
        "  Corpus: {}",
        config.corpus_path.as_deref().unwrap_or("<built-in>")
    );
    tracing::info!("  Model: {}", config.generation.model);

    // Missing credentials are fatal at startup, not per-request
    let api_key = std::env::var("OPENAI_API_KEY")
        .context("OPENAI_API_KEY is not set; the LLM client cannot start")?;

    let handler = build_handler(&config, api_key).await?;

    let server = RpcServer::new(config.host.clone(), config.port, handler);
    server.run().await?;

    Ok(())
}

async fn build_handler(config: &ServerConfig, api_key: String) -> Result<Arc<AdvisorHandler>> {
    tracing::info!("Initializing RAG components...");

    let embedder: Arc<dyn EmbeddingProvider> =
        Arc::new(FastembedProvider::new().context("Failed to load the embedding model")?);

    let store = Arc::new(DocumentStore::new());
    let index = Arc::new(VectorIndex::new(store.clone()));
    let pipeline = Arc::new(CorpusIngestionPipeline::new(embedder.clone(), index.clone()));

    // Ingest the seed corpus before accepting connections
    let seeds = match &config.corpus_path {
        Some(path) => load_seed_file(std::path::Path::new(path))
            .context(format!("Failed to load corpus file {path}"))?,
        None => default_corpus(),
    };
    let stats = pipeline
        .ingest(seeds)
        .await
        .context("Corpus ingestion failed")?;
    tracing::info!(
        "Corpus ready: {} documents indexed ({} embeddings)",
        stats.documents_indexed,
        stats.embeddings_generated
    );

    let search = Arc::new(SemanticSearchService::new(
        embedder,
        index,
        config.search.clone(),
    ));

    let model = Arc::new(
        OpenAiChatModel::new(config.generation.clone(), api_key)
            .context("Failed to initialize the LLM client")?,
    );

    let orchestrator = Arc::new(RagOrchestrator::new(
        search.clone(),
        model,
        config.orchestrator.clone(),
    ));

    tracing::info!("RAG components initialized successfully");

    Ok(Arc::new(AdvisorHandler::new(
        orchestrator,
        search,
        store,
        pipeline,
        config.corpus_path.clone(),
    )))
}
