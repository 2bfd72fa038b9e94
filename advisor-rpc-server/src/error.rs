use advisor_core::RagError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RpcError {
    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Method not found: {0}")]
    MethodNotFound(String),

    #[error("Invalid params: {0}")]
    InvalidParams(String),

    #[error("Internal error: {0}")]
    InternalError(String),

    #[error("Embedding error: {0}")]
    EmbeddingError(String),

    #[error("Retrieval error: {0}")]
    RetrievalError(String),

    #[error("Generation error: {0}")]
    GenerationError(String),

    #[error("Timeout: {0}")]
    TimeoutError(String),

    #[error("Configuration error: {0}")]
    ConfigurationError(String),
}

impl RpcError {
    /// Get the JSON-RPC error code for this error
    pub fn code(&self) -> i32 {
        use crate::protocol::*;
        match self {
            RpcError::ParseError(_) => PARSE_ERROR,
            RpcError::InvalidRequest(_) => INVALID_REQUEST,
            RpcError::MethodNotFound(_) => METHOD_NOT_FOUND,
            RpcError::InvalidParams(_) => INVALID_PARAMS,
            RpcError::InternalError(_) => INTERNAL_ERROR,
            RpcError::EmbeddingError(_) => EMBEDDING_ERROR,
            RpcError::RetrievalError(_) => RETRIEVAL_ERROR,
            RpcError::GenerationError(_) => GENERATION_ERROR,
            RpcError::TimeoutError(_) => TIMEOUT_ERROR,
            RpcError::ConfigurationError(_) => CONFIGURATION_ERROR,
        }
    }
}

// Map subsystem errors onto wire errors. Validation failures are rejected
// requests (invalid params); everything else keeps its category.
impl From<RagError> for RpcError {
    fn from(err: RagError) -> Self {
        match err {
            RagError::Validation(msg) => RpcError::InvalidParams(msg),
            RagError::Embedding(msg) => RpcError::EmbeddingError(msg),
            RagError::Retrieval(msg) => RpcError::RetrievalError(msg),
            RagError::Generation(msg) => RpcError::GenerationError(msg),
            RagError::Timeout(secs) => {
                RpcError::TimeoutError(format!("generation timed out after {secs}s"))
            }
            RagError::Configuration(msg) => RpcError::ConfigurationError(msg),
        }
    }
}
