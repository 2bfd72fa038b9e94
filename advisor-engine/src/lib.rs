pub mod llm;
pub mod metrics;
pub mod orchestrator;
pub mod search;

// Re-export commonly used items from the llm module
pub use llm::{GenerationConfig, LanguageModel, OpenAiChatModel, PromptBuilder};

// Re-export commonly used items from the search module
pub use search::{
    KeywordClassifier, QueryClassifier, SearchConfig, SemanticSearchService, SymbolExtractor,
    TickerPatternExtractor,
};

// Re-export the orchestrator entry points
pub use orchestrator::{OrchestratorConfig, RagOrchestrator};

pub use metrics::{MetricsTimer, RagMetrics};
