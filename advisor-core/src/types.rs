pub mod conversation;
pub mod document;

// Re-export common types
pub use conversation::{AnalysisType, ConversationMessage, MessageRole, RagResponse};
pub use document::{Document, DocumentMetadata, Embedding, RetrievalContext, SearchResult};
