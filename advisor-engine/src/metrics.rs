//! Per-request RAG performance metrics: retrieval and generation latency,
//! match counts, and similarity quality, reported through tracing.

use std::time::{Duration, Instant};

/// Metrics for one `generate_response` call.
#[derive(Debug, Clone, Default)]
pub struct RagMetrics {
    /// Time spent embedding the query and searching the index (milliseconds)
    pub retrieval_latency_ms: u64,

    /// Time spent in the language-model call (milliseconds)
    pub generation_latency_ms: u64,

    /// Number of documents that survived the similarity threshold
    pub num_matches: usize,

    /// Similarity scores of the surviving documents
    pub similarity_scores: Vec<f32>,

    /// Minimum similarity among matches
    pub similarity_min: Option<f32>,

    /// Maximum similarity among matches
    pub similarity_max: Option<f32>,

    /// Characters of context handed to the prompt
    pub context_chars: usize,
}

impl RagMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_retrieval_latency(&mut self, duration: Duration) {
        self.retrieval_latency_ms = duration.as_millis() as u64;
    }

    pub fn set_generation_latency(&mut self, duration: Duration) {
        self.generation_latency_ms = duration.as_millis() as u64;
    }

    /// Record similarity scores and derive min/max.
    pub fn set_similarity_scores(&mut self, scores: Vec<f32>) {
        if scores.is_empty() {
            self.similarity_min = None;
            self.similarity_max = None;
            self.num_matches = 0;
        } else {
            self.similarity_min = scores
                .iter()
                .copied()
                .min_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
            self.similarity_max = scores
                .iter()
                .copied()
                .max_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
            self.num_matches = scores.len();
        }
        self.similarity_scores = scores;
    }

    pub fn avg_similarity(&self) -> f32 {
        if self.similarity_scores.is_empty() {
            0.0
        } else {
            self.similarity_scores.iter().sum::<f32>() / self.similarity_scores.len() as f32
        }
    }

    pub fn total_latency_ms(&self) -> u64 {
        self.retrieval_latency_ms + self.generation_latency_ms
    }

    /// Report metrics to tracing logs.
    pub fn report(&self) {
        tracing::info!(
            "RAG metrics: retrieval={}ms, generation={}ms, total={}ms, matches={}, avg_sim={:.2}, sim_range=[{:?},{:?}], context_chars={}",
            self.retrieval_latency_ms,
            self.generation_latency_ms,
            self.total_latency_ms(),
            self.num_matches,
            self.avg_similarity(),
            self.similarity_min,
            self.similarity_max,
            self.context_chars,
        );
    }
}

/// Timer helper for measuring operation latency.
pub struct MetricsTimer {
    start: Instant,
}

impl MetricsTimer {
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    pub fn stop(self) -> Duration {
        self.start.elapsed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_creation() {
        let metrics = RagMetrics::new();
        assert_eq!(metrics.num_matches, 0);
        assert_eq!(metrics.retrieval_latency_ms, 0);
        assert_eq!(metrics.generation_latency_ms, 0);
    }

    #[test]
    fn test_similarity_scores() {
        let mut metrics = RagMetrics::new();
        metrics.set_similarity_scores(vec![0.9, 0.85, 0.75, 0.95, 0.8]);

        assert_eq!(metrics.num_matches, 5);
        assert_eq!(metrics.similarity_min, Some(0.75));
        assert_eq!(metrics.similarity_max, Some(0.95));
        assert_eq!(metrics.avg_similarity(), 0.85);
    }

    #[test]
    fn test_empty_similarity_scores() {
        let mut metrics = RagMetrics::new();
        metrics.set_similarity_scores(vec![]);

        assert_eq!(metrics.num_matches, 0);
        assert_eq!(metrics.similarity_min, None);
        assert_eq!(metrics.avg_similarity(), 0.0);
    }

    #[test]
    fn test_latency_setters() {
        let mut metrics = RagMetrics::new();
        metrics.set_retrieval_latency(Duration::from_millis(50));
        metrics.set_generation_latency(Duration::from_millis(200));

        assert_eq!(metrics.retrieval_latency_ms, 50);
        assert_eq!(metrics.generation_latency_ms, 200);
        assert_eq!(metrics.total_latency_ms(), 250);
    }

    #[test]
    fn test_timer() {
        let timer = MetricsTimer::start();
        std::thread::sleep(Duration::from_millis(10));
        let duration = timer.stop();
        assert!(duration.as_millis() >= 10);
    }
}
