use advisor_core::{Document, DocumentMetadata, RagError};
use serde::Deserialize;
use std::path::Path;
use std::sync::Arc;

use crate::embedding::EmbeddingProvider;
use crate::vector_index::VectorIndex;

/// One corpus entry before embedding: content plus metadata, id optional.
#[derive(Debug, Clone, Deserialize)]
pub struct SeedDocument {
    #[serde(default)]
    pub id: Option<String>,
    pub content: String,
    pub metadata: DocumentMetadata,
}

/// Statistics from an ingestion run.
#[derive(Debug, Default, Clone)]
pub struct IngestStats {
    pub documents_loaded: usize,
    pub embeddings_generated: usize,
    pub documents_indexed: usize,
}

/// Boot-time pipeline that turns `{content, metadata}` seed pairs into
/// embedded, indexed documents:
/// 1. Batch-embeds seed contents through the provider
/// 2. Assigns ids where the seed has none
/// 3. Inserts into the vector index
pub struct CorpusIngestionPipeline {
    embedder: Arc<dyn EmbeddingProvider>,
    index: Arc<VectorIndex>,
}

const BATCH_SIZE: usize = 100;

impl CorpusIngestionPipeline {
    pub fn new(embedder: Arc<dyn EmbeddingProvider>, index: Arc<VectorIndex>) -> Self {
        Self { embedder, index }
    }

    /// Append the seed documents to the corpus.
    pub async fn ingest(&self, seeds: Vec<SeedDocument>) -> Result<IngestStats, RagError> {
        let mut stats = IngestStats {
            documents_loaded: seeds.len(),
            ..Default::default()
        };

        if seeds.is_empty() {
            tracing::warn!("Ingestion invoked with an empty seed list");
            return Ok(stats);
        }

        tracing::info!("Starting corpus ingestion: {} seed documents", seeds.len());

        let documents = self.embed_seeds(seeds, &mut stats).await?;
        for document in documents {
            self.index.add(document)?;
            stats.documents_indexed += 1;
        }

        tracing::info!(
            "Ingestion complete: {} documents indexed ({} embeddings generated)",
            stats.documents_indexed,
            stats.embeddings_generated
        );
        Ok(stats)
    }

    /// Rebuild the corpus from scratch and swap it in atomically. Readers see
    /// the previous corpus until the swap completes.
    pub async fn reload(&self, seeds: Vec<SeedDocument>) -> Result<IngestStats, RagError> {
        let mut stats = IngestStats {
            documents_loaded: seeds.len(),
            ..Default::default()
        };

        tracing::info!("Reloading corpus: {} seed documents", seeds.len());

        let documents = self.embed_seeds(seeds, &mut stats).await?;
        stats.documents_indexed = self.index.store().replace_all(documents)?;

        Ok(stats)
    }

    async fn embed_seeds(
        &self,
        seeds: Vec<SeedDocument>,
        stats: &mut IngestStats,
    ) -> Result<Vec<Document>, RagError> {
        let mut documents = Vec::with_capacity(seeds.len());
        let mut next_id = 0usize;

        for batch in seeds.chunks(BATCH_SIZE) {
            let texts: Vec<String> = batch.iter().map(|s| s.content.clone()).collect();
            let embeddings = self.embedder.embed_batch(&texts).await?;
            stats.embeddings_generated += embeddings.len();

            for (seed, embedding) in batch.iter().zip(embeddings) {
                let id = seed
                    .id
                    .clone()
                    .unwrap_or_else(|| format!("doc-{next_id:04}"));
                next_id += 1;

                documents.push(Document {
                    id,
                    content: seed.content.clone(),
                    metadata: seed.metadata.clone(),
                    embedding,
                });
            }
        }

        Ok(documents)
    }
}

/// Parse a seed corpus from a JSON array of `{id?, content, metadata}`.
pub fn parse_seed_json(json: &str) -> Result<Vec<SeedDocument>, RagError> {
    let seeds: Vec<SeedDocument> = serde_json::from_str(json)
        .map_err(|e| RagError::Validation(format!("invalid corpus file: {e}")))?;

    for (idx, seed) in seeds.iter().enumerate() {
        if seed.content.trim().is_empty() {
            return Err(RagError::Validation(format!(
                "corpus entry {idx} has empty content"
            )));
        }
    }

    Ok(seeds)
}

/// Load and parse a seed corpus file.
pub fn load_seed_file(path: &Path) -> Result<Vec<SeedDocument>, RagError> {
    let json = std::fs::read_to_string(path).map_err(|e| {
        RagError::Configuration(format!("cannot read corpus file {}: {e}", path.display()))
    })?;
    parse_seed_json(&json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document_store::DocumentStore;
    use advisor_core::Embedding;
    use async_trait::async_trait;

    /// Counts each text's characters into a fixed-dimension vector.
    struct CountingEmbedder;

    #[async_trait]
    impl EmbeddingProvider for CountingEmbedder {
        async fn embed(&self, text: &str) -> Result<Embedding, RagError> {
            let len = text.chars().count() as f32;
            Ok(vec![len, 1.0, 0.0])
        }

        fn dimension(&self) -> usize {
            3
        }
    }

    fn seed(id: Option<&str>, content: &str) -> SeedDocument {
        SeedDocument {
            id: id.map(|s| s.to_string()),
            content: content.to_string(),
            metadata: DocumentMetadata {
                title: content.chars().take(10).collect(),
                source: "test".to_string(),
                kind: "education".to_string(),
                symbols: Default::default(),
                sectors: Default::default(),
            },
        }
    }

    fn pipeline() -> (CorpusIngestionPipeline, Arc<VectorIndex>) {
        let index = Arc::new(VectorIndex::new(Arc::new(DocumentStore::new())));
        let pipeline = CorpusIngestionPipeline::new(Arc::new(CountingEmbedder), index.clone());
        (pipeline, index)
    }

    #[tokio::test]
    async fn test_ingest_counts_and_ids() {
        let (pipeline, index) = pipeline();

        let stats = pipeline
            .ingest(vec![
                seed(Some("alpha"), "first document"),
                seed(None, "second document"),
            ])
            .await
            .unwrap();

        assert_eq!(stats.documents_loaded, 2);
        assert_eq!(stats.embeddings_generated, 2);
        assert_eq!(stats.documents_indexed, 2);

        assert!(index.store().get("alpha").is_some());
        // generated id for the unnamed seed keeps its position
        assert!(index.store().get("doc-0001").is_some());
    }

    #[tokio::test]
    async fn test_ingest_empty_seed_list() {
        let (pipeline, index) = pipeline();
        let stats = pipeline.ingest(Vec::new()).await.unwrap();
        assert_eq!(stats.documents_indexed, 0);
        assert!(index.store().is_empty());
    }

    #[tokio::test]
    async fn test_reload_replaces_corpus() {
        let (pipeline, index) = pipeline();
        pipeline.ingest(vec![seed(Some("old"), "old doc")]).await.unwrap();

        let stats = pipeline
            .reload(vec![seed(Some("new-a"), "newer"), seed(Some("new-b"), "newest")])
            .await
            .unwrap();

        assert_eq!(stats.documents_indexed, 2);
        assert!(index.store().get("old").is_none());
        assert!(index.store().get("new-a").is_some());
    }

    #[test]
    fn test_parse_seed_json() {
        let json = r#"[
            {
                "id": "apple-q3",
                "content": "Apple reported Q3 earnings.",
                "metadata": {
                    "title": "Apple Q3 Earnings",
                    "source": "earnings-wire",
                    "type": "earnings_report",
                    "symbols": ["AAPL"],
                    "sectors": ["technology"]
                }
            },
            {
                "content": "Bonds pay fixed coupons.",
                "metadata": {"title": "Bonds", "source": "handbook", "type": "education"}
            }
        ]"#;

        let seeds = parse_seed_json(json).unwrap();
        assert_eq!(seeds.len(), 2);
        assert_eq!(seeds[0].id.as_deref(), Some("apple-q3"));
        assert!(seeds[0].metadata.symbols.contains("AAPL"));
        assert!(seeds[1].id.is_none());
        assert!(seeds[1].metadata.symbols.is_empty());
    }

    #[test]
    fn test_parse_seed_json_rejects_empty_content() {
        let json = r#"[{"content": "   ", "metadata": {"title": "t", "source": "s", "type": "k"}}]"#;
        let err = parse_seed_json(json).unwrap_err();
        assert!(matches!(err, RagError::Validation(_)));
    }

    #[test]
    fn test_parse_seed_json_rejects_malformed() {
        let err = parse_seed_json("not json").unwrap_err();
        assert!(matches!(err, RagError::Validation(_)));
    }
}
