pub mod corpus;
pub mod document_store;
pub mod embedding;
pub mod ingestion;
pub mod vector_index;

// Re-export commonly used items
pub use corpus::default_corpus;
pub use document_store::DocumentStore;
pub use embedding::{EmbeddingProvider, FastembedProvider};
pub use ingestion::{CorpusIngestionPipeline, IngestStats, SeedDocument};
pub use vector_index::VectorIndex;
