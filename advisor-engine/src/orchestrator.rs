use advisor_core::{
    AnalysisType, ConversationMessage, RagError, RagResponse, RetrievalContext,
};
use chrono::Utc;
use std::collections::BTreeSet;
use std::sync::Arc;

use crate::llm::{LanguageModel, PromptBuilder};
use crate::metrics::{MetricsTimer, RagMetrics};
use crate::search::{
    KeywordClassifier, QueryClassifier, SemanticSearchService, SymbolExtractor,
    TickerPatternExtractor,
};

/// Configuration for response orchestration.
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// How many trailing conversation messages reach the prompt.
    pub history_window: usize,

    /// Deterministic user-safe reply when generation fails.
    pub fallback_message: String,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            history_window: 6,
            fallback_message: "I'm sorry, I wasn't able to generate an analysis for that \
                               question right now. Please try again in a moment."
                .to_string(),
        }
    }
}

/// Phase a request is in, for logging and failure attribution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RequestPhase {
    Retrieving,
    Prompting,
    Generating,
}

/// Produces the final classified, source-attributed answer.
///
/// Each call runs retrieval, prompt assembly, and generation as one
/// independent unit of work. The orchestrator holds no per-request state:
/// conversation history is a caller-supplied parameter, so concurrent calls
/// never interfere.
///
/// Failure policy: retrieval problems degrade to an empty context and the
/// request continues; generation problems resolve to the fixed fallback
/// response. Only input validation errors reach the caller.
pub struct RagOrchestrator {
    search: Arc<SemanticSearchService>,
    model: Arc<dyn LanguageModel>,
    classifier: Arc<dyn QueryClassifier>,
    extractor: Arc<dyn SymbolExtractor>,
    config: OrchestratorConfig,
}

impl RagOrchestrator {
    /// Create an orchestrator with the default keyword classifier and
    /// ticker-pattern extractor.
    pub fn new(
        search: Arc<SemanticSearchService>,
        model: Arc<dyn LanguageModel>,
        config: OrchestratorConfig,
    ) -> Self {
        Self::with_strategies(
            search,
            model,
            Arc::new(KeywordClassifier),
            Arc::new(TickerPatternExtractor),
            config,
        )
    }

    /// Create an orchestrator with explicit classification and extraction
    /// strategies, e.g. deterministic stubs in tests.
    pub fn with_strategies(
        search: Arc<SemanticSearchService>,
        model: Arc<dyn LanguageModel>,
        classifier: Arc<dyn QueryClassifier>,
        extractor: Arc<dyn SymbolExtractor>,
        config: OrchestratorConfig,
    ) -> Self {
        Self {
            search,
            model,
            classifier,
            extractor,
            config,
        }
    }

    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    /// Answer `message` with retrieval-augmented generation.
    ///
    /// Never fails past this boundary except for `Validation` on malformed
    /// input: every other failure path resolves to a complete `RagResponse`.
    pub async fn generate_response(
        &self,
        message: &str,
        history: &[ConversationMessage],
    ) -> Result<RagResponse, RagError> {
        let message = message.trim();
        if message.is_empty() {
            return Err(RagError::Validation("message must not be empty".to_string()));
        }

        let mut metrics = RagMetrics::new();
        let mut phase = RequestPhase::Retrieving;

        // RETRIEVING: degrade to an empty context on failure, keep going
        let inferred_symbols = self.extractor.extract(message);
        let timer = MetricsTimer::start();
        let context = match self
            .search
            .search_relevant_context(message, &inferred_symbols)
            .await
        {
            Ok(context) => context,
            Err(e) => {
                tracing::warn!(
                    "Retrieval failed in phase {:?}, continuing without context: {}",
                    phase,
                    e
                );
                RetrievalContext::default()
            }
        };
        metrics.set_retrieval_latency(timer.stop());
        metrics.set_similarity_scores(
            context
                .relevant_documents
                .iter()
                .map(|r| r.similarity)
                .collect(),
        );
        metrics.context_chars = context.context.chars().count();

        // PROMPTING
        phase = RequestPhase::Prompting;
        let analysis_type = self.classifier.classify(message, &context);
        let prompt =
            PromptBuilder::build(message, &context, history, self.config.history_window);

        tracing::debug!(
            "Phase {:?}: analysis_type={}, context_docs={}, prompt_chars={}",
            phase,
            analysis_type.as_str(),
            context.relevant_documents.len(),
            prompt.chars().count()
        );

        // GENERATING: any failure here resolves to the fallback response
        phase = RequestPhase::Generating;
        let timer = MetricsTimer::start();
        let response = match self.model.generate(&prompt).await {
            Ok(text) => {
                metrics.set_generation_latency(timer.stop());

                let mut relevant_stocks: BTreeSet<String> = context.symbols.clone();
                relevant_stocks.extend(self.extractor.extract(&text));

                RagResponse {
                    response: text,
                    analysis_type,
                    relevant_stocks,
                    sources: context.sources.clone(),
                    timestamp: Utc::now(),
                }
            }
            Err(e) => {
                metrics.set_generation_latency(timer.stop());
                tracing::warn!(
                    "Generation failed in phase {:?}, returning fallback response: {}",
                    phase,
                    e
                );
                self.fallback_response()
            }
        };

        metrics.report();
        Ok(response)
    }

    /// Deterministic response used when generation fails.
    pub fn fallback_response(&self) -> RagResponse {
        RagResponse {
            response: self.config.fallback_message.clone(),
            analysis_type: AnalysisType::General,
            relevant_stocks: BTreeSet::new(),
            sources: BTreeSet::new(),
            timestamp: Utc::now(),
        }
    }
}
