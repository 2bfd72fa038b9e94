use advisor_core::{Document, RagError};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Default)]
struct StoreInner {
    documents: Vec<Arc<Document>>,
    by_id: HashMap<String, usize>,
    dimension: Option<usize>,
}

impl StoreInner {
    fn insert(&mut self, document: Document) -> Result<(), RagError> {
        if document.embedding.is_empty() {
            return Err(RagError::Configuration(format!(
                "document '{}' has an empty embedding",
                document.id
            )));
        }

        match self.dimension {
            None => self.dimension = Some(document.embedding.len()),
            Some(dimension) if dimension != document.embedding.len() => {
                return Err(RagError::Configuration(format!(
                    "embedding dimension mismatch for document '{}': expected {}, got {}",
                    document.id,
                    dimension,
                    document.embedding.len()
                )));
            }
            Some(_) => {}
        }

        if self.by_id.contains_key(&document.id) {
            return Err(RagError::Validation(format!(
                "duplicate document id '{}'",
                document.id
            )));
        }

        self.by_id.insert(document.id.clone(), self.documents.len());
        self.documents.push(Arc::new(document));
        Ok(())
    }
}

/// Append-only, in-memory corpus of embedded documents.
///
/// Reads take a shared lock only long enough to clone the `Arc` list, so
/// concurrent searches never block each other; appends and reloads are
/// serialized through the write lock and become visible atomically.
pub struct DocumentStore {
    inner: RwLock<StoreInner>,
}

impl DocumentStore {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(StoreInner::default()),
        }
    }

    /// Insert a document. The first insert fixes the corpus embedding
    /// dimension; later documents with a different dimension are rejected
    /// with a `Configuration` error, duplicate ids with `Validation`.
    pub fn insert(&self, document: Document) -> Result<(), RagError> {
        let mut inner = self.inner.write();
        inner.insert(document)
    }

    /// Replace the whole corpus in one step. The new document list is
    /// validated into a fresh store off-lock, then swapped in; readers see
    /// either the old or the new corpus, never a partial one.
    pub fn replace_all(&self, documents: Vec<Document>) -> Result<usize, RagError> {
        let mut fresh = StoreInner::default();
        for document in documents {
            fresh.insert(document)?;
        }

        let count = fresh.documents.len();
        *self.inner.write() = fresh;

        tracing::info!("Corpus replaced: {} documents", count);
        Ok(count)
    }

    /// Snapshot of the corpus in insertion order. Cheap: clones `Arc`s, not
    /// document contents.
    pub fn snapshot(&self) -> Vec<Arc<Document>> {
        self.inner.read().documents.clone()
    }

    pub fn get(&self, id: &str) -> Option<Arc<Document>> {
        let inner = self.inner.read();
        inner.by_id.get(id).map(|&idx| inner.documents[idx].clone())
    }

    /// Embedding dimension of the corpus, `None` until the first insert.
    pub fn dimension(&self) -> Option<usize> {
        self.inner.read().dimension
    }

    pub fn len(&self) -> usize {
        self.inner.read().documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().documents.is_empty()
    }
}

impl Default for DocumentStore {
    fn default() -> Self {
        Self::new()
    }
}
