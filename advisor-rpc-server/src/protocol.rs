use advisor_core::{AnalysisType, ConversationMessage};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeSet;

/// JSON-RPC 2.0 Request
#[derive(Debug, Deserialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: String,
    pub id: Option<Value>,
    pub method: String,
    pub params: Option<Value>,
}

/// JSON-RPC 2.0 Success Response
#[derive(Debug, Serialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: String,
    pub id: Option<Value>,
    pub result: Value,
}

/// JSON-RPC 2.0 Error Response
#[derive(Debug, Serialize)]
pub struct JsonRpcError {
    pub jsonrpc: String,
    pub id: Option<Value>,
    pub error: ErrorObject,
}

/// JSON-RPC Error Object
#[derive(Debug, Serialize)]
pub struct ErrorObject {
    pub code: i32,
    pub message: String,
}

// Standard JSON-RPC error codes
pub const PARSE_ERROR: i32 = -32700;
pub const INVALID_REQUEST: i32 = -32600;
pub const METHOD_NOT_FOUND: i32 = -32601;
pub const INVALID_PARAMS: i32 = -32602;
pub const INTERNAL_ERROR: i32 = -32603;

// Custom error codes for RAG operations
pub const EMBEDDING_ERROR: i32 = -32001;
pub const RETRIEVAL_ERROR: i32 = -32002;
pub const GENERATION_ERROR: i32 = -32003;
pub const TIMEOUT_ERROR: i32 = -32004;
pub const CONFIGURATION_ERROR: i32 = -32005;

/// Parameters for advisor.chat
#[derive(Debug, Deserialize)]
pub struct ChatParams {
    pub message: String,
    #[serde(default)]
    pub history: Vec<ConversationMessage>,
}

/// Result of advisor.chat: the response envelope handed to the HTTP layer
#[derive(Debug, Serialize)]
pub struct ChatResult {
    pub response: String,
    pub metadata: ResponseMetadata,
}

#[derive(Debug, Serialize)]
pub struct ResponseMetadata {
    pub analysis_type: AnalysisType,
    pub relevant_stocks: Vec<String>,
    pub sources: Vec<String>,
    pub timestamp: DateTime<Utc>,
}

/// Parameters for advisor.search
#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub query: String,
    #[serde(default)]
    pub symbols: BTreeSet<String>,
    #[serde(default)]
    pub include_context: bool,
}

/// Result of advisor.search
#[derive(Debug, Serialize)]
pub struct SearchResultPayload {
    pub matches: Vec<MatchJson>,
    pub sources: Vec<String>,
    pub symbols: Vec<String>,
    pub sectors: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

/// One retrieved document on the wire
#[derive(Debug, Serialize)]
pub struct MatchJson {
    pub id: String,
    pub title: String,
    pub source: String,
    pub similarity: f32,
}

/// Result of advisor.documents
#[derive(Debug, Serialize)]
pub struct DocumentsResult {
    pub documents: Vec<DocumentJson>,
    pub total: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub embedding_dimension: Option<usize>,
}

/// Corpus document summary on the wire; the embedding itself is elided.
#[derive(Debug, Serialize)]
pub struct DocumentJson {
    pub id: String,
    pub title: String,
    pub source: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub symbols: Vec<String>,
    pub sectors: Vec<String>,
    pub content_chars: usize,
}

/// Result of advisor.reload
#[derive(Debug, Serialize)]
pub struct ReloadResult {
    pub documents_loaded: usize,
    pub embeddings_generated: usize,
    pub documents_indexed: usize,
}
