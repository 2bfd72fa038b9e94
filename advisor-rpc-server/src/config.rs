use advisor_engine::{GenerationConfig, OrchestratorConfig, SearchConfig};

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,

    /// Seed corpus file (JSON array). The built-in corpus is used when unset.
    pub corpus_path: Option<String>,

    pub search: SearchConfig,
    pub generation: GenerationConfig,
    pub orchestrator: OrchestratorConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 7891,
            corpus_path: None,
            search: SearchConfig::default(),
            generation: GenerationConfig::default(),
            orchestrator: OrchestratorConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ServerConfig::default();
        assert_eq!(config.port, 7891);
        assert!(config.corpus_path.is_none());
        assert_eq!(config.search.top_k, 5);
        assert_eq!(config.orchestrator.history_window, 6);
    }
}
