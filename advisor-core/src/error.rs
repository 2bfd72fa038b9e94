use thiserror::Error;

/// Error taxonomy for the RAG subsystem.
///
/// `Configuration` and `Validation` are surfaced to callers as hard errors;
/// the remaining variants are absorbed by the search service and orchestrator,
/// which degrade the context or substitute the fallback response instead of
/// propagating them.
#[derive(Error, Debug)]
pub enum RagError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Embedding provider error: {0}")]
    Embedding(String),

    #[error("Retrieval error: {0}")]
    Retrieval(String),

    #[error("Generation error: {0}")]
    Generation(String),

    #[error("Generation timed out after {0}s")]
    Timeout(u64),

    #[error("Invalid request: {0}")]
    Validation(String),
}

impl RagError {
    /// True for errors that are fatal at startup rather than recoverable
    /// per-request.
    pub fn is_fatal(&self) -> bool {
        matches!(self, RagError::Configuration(_))
    }
}
