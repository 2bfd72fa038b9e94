use advisor_retrieval::{default_corpus, CorpusIngestionPipeline, DocumentStore};
use advisor_engine::{RagOrchestrator, SemanticSearchService};
use std::sync::Arc;
use std::time::Instant;

use crate::error::RpcError;
use crate::protocol::*;

/// Handler for advisor queries
pub struct AdvisorHandler {
    orchestrator: Arc<RagOrchestrator>,
    search: Arc<SemanticSearchService>,
    store: Arc<DocumentStore>,
    pipeline: Arc<CorpusIngestionPipeline>,
    corpus_path: Option<String>,
}

impl AdvisorHandler {
    pub fn new(
        orchestrator: Arc<RagOrchestrator>,
        search: Arc<SemanticSearchService>,
        store: Arc<DocumentStore>,
        pipeline: Arc<CorpusIngestionPipeline>,
        corpus_path: Option<String>,
    ) -> Self {
        Self {
            orchestrator,
            search,
            store,
            pipeline,
            corpus_path,
        }
    }

    /// Handle an advisor.chat request. Provider failures never reach the
    /// wire: the orchestrator resolves them to the fallback envelope, so
    /// the only error paths left are validation ones.
    pub async fn handle_chat(&self, params: ChatParams) -> Result<ChatResult, RpcError> {
        let started = Instant::now();

        tracing::debug!(
            "Handling chat request: message_chars={}, history_len={}",
            params.message.chars().count(),
            params.history.len()
        );

        let response = self
            .orchestrator
            .generate_response(&params.message, &params.history)
            .await?;

        tracing::info!(
            "Chat request completed: analysis_type={}, sources={}, duration={}ms",
            response.analysis_type.as_str(),
            response.sources.len(),
            started.elapsed().as_millis()
        );

        Ok(ChatResult {
            response: response.response,
            metadata: ResponseMetadata {
                analysis_type: response.analysis_type,
                relevant_stocks: response.relevant_stocks.into_iter().collect(),
                sources: response.sources.into_iter().collect(),
                timestamp: response.timestamp,
            },
        })
    }

    /// Handle an advisor.search request.
    pub async fn handle_search(
        &self,
        params: SearchParams,
    ) -> Result<SearchResultPayload, RpcError> {
        let context = self
            .search
            .search_relevant_context(&params.query, &params.symbols)
            .await?;

        let matches = context
            .relevant_documents
            .iter()
            .map(|r| MatchJson {
                id: r.document.id.clone(),
                title: r.document.metadata.title.clone(),
                source: r.document.metadata.source.clone(),
                similarity: r.similarity,
            })
            .collect();

        Ok(SearchResultPayload {
            matches,
            sources: context.sources.into_iter().collect(),
            symbols: context.symbols.into_iter().collect(),
            sectors: context.sectors.into_iter().collect(),
            context: params.include_context.then_some(context.context),
        })
    }

    /// Handle an advisor.documents request: read-only corpus introspection.
    pub fn handle_documents(&self) -> DocumentsResult {
        let documents: Vec<DocumentJson> = self
            .store
            .snapshot()
            .iter()
            .map(|doc| DocumentJson {
                id: doc.id.clone(),
                title: doc.metadata.title.clone(),
                source: doc.metadata.source.clone(),
                kind: doc.metadata.kind.clone(),
                symbols: doc.metadata.symbols.iter().cloned().collect(),
                sectors: doc.metadata.sectors.iter().cloned().collect(),
                content_chars: doc.content.chars().count(),
            })
            .collect();

        DocumentsResult {
            total: documents.len(),
            embedding_dimension: self.store.dimension(),
            documents,
        }
    }

    /// Handle an advisor.reload request: re-ingest the configured corpus and
    /// swap it in atomically.
    pub async fn handle_reload(&self) -> Result<ReloadResult, RpcError> {
        let seeds = match &self.corpus_path {
            Some(path) => advisor_retrieval::ingestion::load_seed_file(std::path::Path::new(path))?,
            None => default_corpus(),
        };

        tracing::info!("Reload requested: {} seed documents", seeds.len());
        let stats = self.pipeline.reload(seeds).await?;

        Ok(ReloadResult {
            documents_loaded: stats.documents_loaded,
            embeddings_generated: stats.embeddings_generated,
            documents_indexed: stats.documents_indexed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use advisor_core::{Embedding, RagError};
    use advisor_engine::llm::LanguageModel;
    use advisor_engine::{OrchestratorConfig, SearchConfig};
    use advisor_retrieval::{EmbeddingProvider, SeedDocument, VectorIndex};
    use async_trait::async_trait;
    use std::collections::BTreeSet;

    struct UnitEmbedder;

    #[async_trait]
    impl EmbeddingProvider for UnitEmbedder {
        async fn embed(&self, text: &str) -> Result<Embedding, RagError> {
            // crude two-bucket router so tests get distinct directions
            if text.to_lowercase().contains("apple") {
                Ok(vec![1.0, 0.0])
            } else {
                Ok(vec![0.0, 1.0])
            }
        }

        fn dimension(&self) -> usize {
            2
        }
    }

    struct CannedModel;

    #[async_trait]
    impl LanguageModel for CannedModel {
        async fn generate(&self, _prompt: &str) -> Result<String, RagError> {
            Ok("Canned analysis.".to_string())
        }
    }

    async fn handler() -> AdvisorHandler {
        let embedder: Arc<dyn EmbeddingProvider> = Arc::new(UnitEmbedder);
        let store = Arc::new(DocumentStore::new());
        let index = Arc::new(VectorIndex::new(store.clone()));
        let pipeline = Arc::new(CorpusIngestionPipeline::new(embedder.clone(), index.clone()));

        let seeds = vec![SeedDocument {
            id: Some("apple-doc".to_string()),
            content: "Apple earnings overview.".to_string(),
            metadata: advisor_core::DocumentMetadata {
                title: "Apple".to_string(),
                source: "desk".to_string(),
                kind: "research".to_string(),
                symbols: ["AAPL".to_string()].into_iter().collect(),
                sectors: BTreeSet::new(),
            },
        }];
        pipeline.ingest(seeds).await.unwrap();

        let search = Arc::new(SemanticSearchService::new(
            embedder,
            index,
            SearchConfig::default(),
        ));
        let orchestrator = Arc::new(RagOrchestrator::new(
            search.clone(),
            Arc::new(CannedModel),
            OrchestratorConfig::default(),
        ));

        AdvisorHandler::new(orchestrator, search, store, pipeline, None)
    }

    #[tokio::test]
    async fn test_chat_returns_envelope() {
        let handler = handler().await;
        let result = handler
            .handle_chat(ChatParams {
                message: "How did apple do?".to_string(),
                history: Vec::new(),
            })
            .await
            .unwrap();

        assert_eq!(result.response, "Canned analysis.");
        assert!(result.metadata.sources.contains(&"desk".to_string()));
    }

    #[tokio::test]
    async fn test_chat_rejects_empty_message() {
        let handler = handler().await;
        let err = handler
            .handle_chat(ChatParams {
                message: "  ".to_string(),
                history: Vec::new(),
            })
            .await
            .unwrap_err();

        assert_eq!(err.code(), INVALID_PARAMS);
    }

    #[tokio::test]
    async fn test_search_lists_matches() {
        let handler = handler().await;
        let result = handler
            .handle_search(SearchParams {
                query: "apple outlook".to_string(),
                symbols: BTreeSet::new(),
                include_context: true,
            })
            .await
            .unwrap();

        assert_eq!(result.matches.len(), 1);
        assert_eq!(result.matches[0].id, "apple-doc");
        assert!(result.context.unwrap().contains("Apple earnings overview."));
    }

    #[tokio::test]
    async fn test_documents_elides_embeddings() {
        let handler = handler().await;
        let result = handler.handle_documents();

        assert_eq!(result.total, 1);
        assert_eq!(result.embedding_dimension, Some(2));
        assert_eq!(result.documents[0].id, "apple-doc");

        let json = serde_json::to_value(&result).unwrap();
        assert!(json["documents"][0].get("embedding").is_none());
    }

    #[tokio::test]
    async fn test_reload_rebuilds_builtin_corpus() {
        let handler = handler().await;
        let result = handler.handle_reload().await.unwrap();

        // built-in corpus replaces the single seeded document
        assert!(result.documents_indexed > 1);
        assert_eq!(handler.handle_documents().total, result.documents_indexed);
    }
}
