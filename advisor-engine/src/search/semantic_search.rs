use advisor_core::{DocumentMetadata, Embedding, RagError, RetrievalContext, SearchResult};
use advisor_retrieval::{EmbeddingProvider, VectorIndex};
use moka::future::Cache;
use std::collections::BTreeSet;
use std::sync::Arc;

/// Tuning knobs for context retrieval.
#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// Maximum number of documents retrieved per query.
    pub top_k: usize,

    /// Results below this cosine similarity are dropped.
    pub min_similarity: f32,

    /// Character budget for the assembled context string.
    pub context_budget_chars: usize,

    /// Capacity of the query-embedding cache.
    pub embedding_cache_size: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            top_k: 5,
            min_similarity: 0.3,
            context_budget_chars: 2000,
            embedding_cache_size: 256,
        }
    }
}

/// Turns a natural-language query into ranked, budgeted, source-attributed
/// context.
///
/// Deterministic for a fixed corpus, provider, and query: ranking, threshold
/// filtering, and truncation involve no randomness, and the embedding cache
/// only short-circuits the provider call.
pub struct SemanticSearchService {
    embedder: Arc<dyn EmbeddingProvider>,
    index: Arc<VectorIndex>,
    config: SearchConfig,
    query_cache: Cache<String, Embedding>,
}

impl SemanticSearchService {
    pub fn new(
        embedder: Arc<dyn EmbeddingProvider>,
        index: Arc<VectorIndex>,
        config: SearchConfig,
    ) -> Self {
        let query_cache = Cache::builder()
            .max_capacity(config.embedding_cache_size)
            .build();

        Self {
            embedder,
            index,
            config,
            query_cache,
        }
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Retrieve context relevant to `query`, optionally restricted to
    /// documents whose symbols intersect `symbols`.
    ///
    /// An empty result set (nothing retrieved, or everything below the
    /// similarity threshold) is a valid empty context, not an error. Errors
    /// are limited to validation (`Validation`), provider failures
    /// (`Embedding`), and index misconfiguration (`Configuration`).
    pub async fn search_relevant_context(
        &self,
        query: &str,
        symbols: &BTreeSet<String>,
    ) -> Result<RetrievalContext, RagError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(RagError::Validation("query must not be empty".to_string()));
        }

        let query_embedding = self.query_embedding(query).await?;

        let results = if symbols.is_empty() {
            self.index.search(&query_embedding, self.config.top_k, None)?
        } else {
            let wanted = symbols.clone();
            let filter = move |meta: &DocumentMetadata| !meta.symbols.is_disjoint(&wanted);
            self.index
                .search(&query_embedding, self.config.top_k, Some(&filter))?
        };

        let min_similarity = self.config.min_similarity;
        let surviving: Vec<SearchResult> = results
            .into_iter()
            .filter(|r| r.similarity >= min_similarity)
            .collect();

        tracing::debug!(
            "Semantic search for {:?}: {} documents above threshold {:.2}",
            query,
            surviving.len(),
            min_similarity
        );

        let mut sources = BTreeSet::new();
        let mut doc_symbols = BTreeSet::new();
        let mut sectors = BTreeSet::new();
        for result in &surviving {
            let meta = &result.document.metadata;
            sources.insert(meta.source.clone());
            doc_symbols.extend(meta.symbols.iter().cloned());
            sectors.extend(meta.sectors.iter().cloned());
        }

        let context = self.build_context(&surviving);

        Ok(RetrievalContext {
            relevant_documents: surviving,
            sources,
            symbols: doc_symbols,
            sectors,
            context,
        })
    }

    async fn query_embedding(&self, query: &str) -> Result<Embedding, RagError> {
        if let Some(cached) = self.query_cache.get(query).await {
            tracing::debug!("Query embedding served from cache");
            return Ok(cached);
        }

        let embedding = self.embedder.embed(query).await?;
        self.query_cache
            .insert(query.to_string(), embedding.clone())
            .await;
        Ok(embedding)
    }

    /// Concatenate excerpts with provenance headers under the character
    /// budget. Excerpts are dropped lowest-similarity-first once the budget
    /// is exceeded; if even the single best excerpt is over budget it is
    /// truncated rather than dropped, so a non-empty result set never yields
    /// an empty context.
    fn build_context(&self, results: &[SearchResult]) -> String {
        if results.is_empty() {
            return String::new();
        }

        let budget = self.config.context_budget_chars;
        let mut entries: Vec<String> = results.iter().map(format_entry).collect();

        while entries.len() > 1 && joined_len(&entries) > budget {
            entries.pop();
        }

        if entries.len() == 1 && entries[0].chars().count() > budget {
            entries[0] = truncate_chars(&entries[0], budget);
        }

        entries.join("\n\n")
    }
}

fn format_entry(result: &SearchResult) -> String {
    let meta = &result.document.metadata;
    format!(
        "[{} — {}]\n{}",
        meta.title, meta.source, result.document.content
    )
}

fn joined_len(entries: &[String]) -> usize {
    let separators = entries.len().saturating_sub(1) * 2;
    entries.iter().map(|e| e.chars().count()).sum::<usize>() + separators
}

fn truncate_chars(text: &str, budget: usize) -> String {
    text.chars().take(budget).collect()
}
