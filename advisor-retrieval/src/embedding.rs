use advisor_core::{Embedding, RagError};
use async_trait::async_trait;
use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};

/// Text-to-vector boundary of the retrieval layer.
///
/// Implementations must be deterministic for a fixed input; provider
/// unavailability or malformed output surfaces as `RagError::Embedding`.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Embed a single text into a vector of `dimension()` floats.
    async fn embed(&self, text: &str) -> Result<Embedding, RagError>;

    /// Embed a batch of texts. The default implementation loops `embed`;
    /// providers with native batching should override it.
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Embedding>, RagError> {
        let mut embeddings = Vec::with_capacity(texts.len());
        for text in texts {
            embeddings.push(self.embed(text).await?);
        }
        Ok(embeddings)
    }

    /// Fixed output dimension of this provider.
    fn dimension(&self) -> usize;
}

/// Local ONNX embedding provider backed by fastembed.
pub struct FastembedProvider {
    model: TextEmbedding,
    dimension: usize,
}

impl FastembedProvider {
    /// Initialize the default model (BGE-small-en-v1.5, 384 dimensions).
    /// Downloads the model on first run.
    pub fn new() -> Result<Self, RagError> {
        tracing::info!("Loading embedding model (BGE-small-en-v1.5)...");

        let model = TextEmbedding::try_new(
            InitOptions::new(EmbeddingModel::BGESmallENV15).with_show_download_progress(true),
        )
        .map_err(|e| RagError::Embedding(format!("failed to load embedding model: {e}")))?;

        tracing::info!("Embedding model loaded (384 dimensions)");

        Ok(Self {
            model,
            dimension: 384,
        })
    }

    fn check_dimension(&self, embedding: &[f32]) -> Result<(), RagError> {
        if embedding.len() != self.dimension {
            return Err(RagError::Embedding(format!(
                "model returned {} dimensions, expected {}",
                embedding.len(),
                self.dimension
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl EmbeddingProvider for FastembedProvider {
    async fn embed(&self, text: &str) -> Result<Embedding, RagError> {
        let embedding = self
            .model
            .embed(vec![text.to_string()], None)
            .map_err(|e| RagError::Embedding(format!("embedding failed: {e}")))?
            .into_iter()
            .next()
            .ok_or_else(|| RagError::Embedding("model returned an empty batch".to_string()))?;

        self.check_dimension(&embedding)?;
        Ok(embedding)
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Embedding>, RagError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        tracing::debug!("Generating embeddings for batch of {} texts", texts.len());

        let embeddings = self
            .model
            .embed(texts.to_vec(), None)
            .map_err(|e| RagError::Embedding(format!("batch embedding failed: {e}")))?;

        if embeddings.len() != texts.len() {
            return Err(RagError::Embedding(format!(
                "model returned {} embeddings for {} texts",
                embeddings.len(),
                texts.len()
            )));
        }
        for embedding in &embeddings {
            self.check_dimension(embedding)?;
        }

        Ok(embeddings)
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}
