use advisor_core::{Document, DocumentMetadata, RagError, SearchResult};
use std::sync::Arc;

use crate::document_store::DocumentStore;

/// Metadata predicate applied before ranking, e.g. symbol membership.
pub type MetadataPredicate = dyn Fn(&DocumentMetadata) -> bool + Send + Sync;

/// Brute-force nearest-neighbor search over the document store.
///
/// A full cosine scan is adequate at the expected corpus size of hundreds to
/// low thousands of documents. Search reads a snapshot and never mutates the
/// store.
pub struct VectorIndex {
    store: Arc<DocumentStore>,
}

impl VectorIndex {
    pub fn new(store: Arc<DocumentStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<DocumentStore> {
        &self.store
    }

    /// Add a document to the index. Dimension and id uniqueness rules are
    /// enforced by the store.
    pub fn add(&self, document: Document) -> Result<(), RagError> {
        self.store.insert(document)
    }

    /// Return the top `k` documents by cosine similarity to `query`,
    /// descending, ties broken by insertion order. An empty index yields an
    /// empty result; a query of the wrong dimension is a `Configuration`
    /// error.
    pub fn search(
        &self,
        query: &[f32],
        k: usize,
        filter: Option<&MetadataPredicate>,
    ) -> Result<Vec<SearchResult>, RagError> {
        let documents = self.store.snapshot();
        if documents.is_empty() {
            return Ok(Vec::new());
        }

        // dimension is Some once the store is non-empty
        let dimension = self.store.dimension().unwrap_or(0);
        if query.len() != dimension {
            return Err(RagError::Configuration(format!(
                "query embedding has {} dimensions, index has {}",
                query.len(),
                dimension
            )));
        }

        if k == 0 {
            return Ok(Vec::new());
        }

        let mut results: Vec<SearchResult> = documents
            .into_iter()
            .filter(|doc| filter.map_or(true, |f| f(&doc.metadata)))
            .map(|doc| {
                let similarity = cosine_similarity(query, &doc.embedding);
                SearchResult {
                    document: doc,
                    similarity,
                }
            })
            .collect();

        // stable sort keeps insertion order within equal similarities
        results.sort_by(|a, b| {
            b.similarity
                .partial_cmp(&a.similarity)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        results.truncate(k);

        tracing::debug!(
            "Vector search returned {} results (k={}, top similarity={:.3})",
            results.len(),
            k,
            results.first().map(|r| r.similarity).unwrap_or(0.0)
        );

        Ok(results)
    }
}

/// Cosine of the angle between two equal-length vectors; 0.0 when either
/// vector has zero norm.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot_product / (norm_a * norm_b)
    }
}
