use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::Arc;

/// Fixed-dimension vector representation of a piece of text.
///
/// The dimension is set process-wide by the first document inserted into the
/// store; every later embedding must match it.
pub type Embedding = Vec<f32>;

/// Descriptive metadata attached to a corpus document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentMetadata {
    pub title: String,
    pub source: String,

    /// Free-form document category, e.g. "earnings_report" or "education".
    #[serde(rename = "type")]
    pub kind: String,

    /// Ticker symbols this document is about. Empty for general material.
    #[serde(default)]
    pub symbols: BTreeSet<String>,

    /// Market sectors this document is about.
    #[serde(default)]
    pub sectors: BTreeSet<String>,
}

/// A corpus document with its precomputed embedding.
///
/// Immutable after insertion into the store; `id` is unique within the corpus.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub content: String,
    pub metadata: DocumentMetadata,
    pub embedding: Embedding,
}

/// A single similarity-search hit.
///
/// `similarity` is the cosine similarity between the query and the document
/// embedding, in [-1, 1].
#[derive(Debug, Clone)]
pub struct SearchResult {
    pub document: Arc<Document>,
    pub similarity: f32,
}

/// Ranked, budgeted context assembled for one query.
///
/// Built per request and discarded once the response is returned; never
/// persisted.
#[derive(Debug, Clone, Default)]
pub struct RetrievalContext {
    /// Surviving search results in descending similarity order.
    pub relevant_documents: Vec<SearchResult>,

    /// Deduplicated `metadata.source` values of the surviving documents.
    pub sources: BTreeSet<String>,

    /// Union of the surviving documents' symbols.
    pub symbols: BTreeSet<String>,

    /// Union of the surviving documents' sectors.
    pub sectors: BTreeSet<String>,

    /// Concatenated, budget-truncated excerpts with provenance headers.
    pub context: String,
}

impl RetrievalContext {
    /// True when retrieval produced no usable context. Not an error: the
    /// orchestrator falls back to answering from the question alone.
    pub fn is_empty(&self) -> bool {
        self.relevant_documents.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_metadata() -> DocumentMetadata {
        DocumentMetadata {
            title: "Apple Q3 Earnings".to_string(),
            source: "earnings-wire".to_string(),
            kind: "earnings_report".to_string(),
            symbols: ["AAPL".to_string()].into_iter().collect(),
            sectors: ["technology".to_string()].into_iter().collect(),
        }
    }

    #[test]
    fn test_metadata_kind_serializes_as_type() {
        let json = serde_json::to_value(sample_metadata()).unwrap();
        assert_eq!(json["type"], "earnings_report");
        assert!(json.get("kind").is_none());
    }

    #[test]
    fn test_metadata_sets_default_to_empty() {
        let meta: DocumentMetadata = serde_json::from_str(
            r#"{"title": "t", "source": "s", "type": "education"}"#,
        )
        .unwrap();
        assert!(meta.symbols.is_empty());
        assert!(meta.sectors.is_empty());
    }

    #[test]
    fn test_document_roundtrip() {
        let doc = Document {
            id: "doc-1".to_string(),
            content: "Apple reported record revenue.".to_string(),
            metadata: sample_metadata(),
            embedding: vec![0.1, 0.2, 0.3],
        };

        let json = serde_json::to_string(&doc).unwrap();
        let back: Document = serde_json::from_str(&json).unwrap();
        assert_eq!(back.id, "doc-1");
        assert_eq!(back.embedding.len(), 3);
        assert!(back.metadata.symbols.contains("AAPL"));
    }

    #[test]
    fn test_empty_retrieval_context() {
        let ctx = RetrievalContext::default();
        assert!(ctx.is_empty());
        assert!(ctx.context.is_empty());
        assert!(ctx.sources.is_empty());
    }
}
