pub mod error;
pub mod types;

// Re-export common types
pub use error::RagError;
pub use types::{
    AnalysisType, ConversationMessage, Document, DocumentMetadata, Embedding, MessageRole,
    RagResponse, RetrievalContext, SearchResult,
};
