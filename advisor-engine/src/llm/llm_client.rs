use advisor_core::RagError;
use async_openai::{
    config::OpenAIConfig,
    types::{
        ChatCompletionRequestMessage, ChatCompletionRequestUserMessage,
        ChatCompletionRequestUserMessageContent, CreateChatCompletionRequest,
    },
    Client as OpenAiClient,
};
use async_trait::async_trait;
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;

/// Configuration for language-model generation.
#[derive(Debug, Clone)]
pub struct GenerationConfig {
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub requests_per_minute: u32,
    pub timeout_seconds: u64,
    /// Total attempts per request. Transient failures get at most one retry,
    /// so the useful range is 1..=2.
    pub max_attempts: u32,
    /// Fixed delay between the first attempt and the retry.
    pub retry_delay_ms: u64,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            model: "gpt-4-turbo".to_string(),
            max_tokens: 600,
            temperature: 0.3,
            requests_per_minute: 20,
            timeout_seconds: 10,
            max_attempts: 2,
            retry_delay_ms: 500,
        }
    }
}

/// Language-model boundary of the orchestrator. Implementations must map
/// failures onto `Generation`/`Timeout` so the orchestrator can substitute
/// its fallback response.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, RagError>;
}

/// OpenAI chat-completions client with rate limiting, a bounded timeout, and
/// a single fixed-delay retry for transient failures.
#[derive(Debug)]
pub struct OpenAiChatModel {
    client: OpenAiClient<OpenAIConfig>,
    rate_limiter: Arc<DefaultDirectRateLimiter>,
    config: GenerationConfig,
}

impl OpenAiChatModel {
    /// Create a new client. An empty API key or a zero rate limit is a
    /// startup configuration error, not a per-request failure.
    pub fn new(config: GenerationConfig, api_key: String) -> Result<Self, RagError> {
        if api_key.trim().is_empty() {
            return Err(RagError::Configuration(
                "LLM API key is missing".to_string(),
            ));
        }

        tracing::info!(
            "Initializing LLM client: model={}, rate_limit={}/min, timeout={}s",
            config.model,
            config.requests_per_minute,
            config.timeout_seconds
        );

        let requests_per_minute = NonZeroU32::new(config.requests_per_minute).ok_or_else(|| {
            RagError::Configuration("requests_per_minute must be > 0".to_string())
        })?;

        let quota = Quota::per_minute(requests_per_minute);
        let rate_limiter = Arc::new(RateLimiter::direct(quota));

        let client = OpenAiClient::with_config(OpenAIConfig::new().with_api_key(api_key));

        Ok(Self {
            client,
            rate_limiter,
            config,
        })
    }

    async fn call_openai(&self, prompt: &str) -> Result<String, RagError> {
        let request = CreateChatCompletionRequest {
            model: self.config.model.clone(),
            messages: vec![ChatCompletionRequestMessage::User(
                ChatCompletionRequestUserMessage {
                    content: ChatCompletionRequestUserMessageContent::Text(prompt.to_string()),
                    name: None,
                },
            )],
            max_tokens: Some(self.config.max_tokens),
            temperature: Some(self.config.temperature),
            ..Default::default()
        };

        let response = tokio::time::timeout(
            Duration::from_secs(self.config.timeout_seconds),
            self.client.chat().create(request),
        )
        .await
        .map_err(|_| RagError::Timeout(self.config.timeout_seconds))?
        .map_err(|e| RagError::Generation(format!("OpenAI API error: {e}")))?;

        response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .ok_or_else(|| RagError::Generation("empty response from LLM".to_string()))
    }
}

#[async_trait]
impl LanguageModel for OpenAiChatModel {
    async fn generate(&self, prompt: &str) -> Result<String, RagError> {
        self.rate_limiter.until_ready().await;

        tracing::debug!("Sending prompt to LLM (length: {} chars)", prompt.len());

        let mut last_error = None;

        for attempt in 0..self.config.max_attempts.max(1) {
            match self.call_openai(prompt).await {
                Ok(text) => {
                    tracing::info!(
                        "LLM response received: model={}, length={} chars",
                        self.config.model,
                        text.len()
                    );
                    return Ok(text);
                }
                Err(e) => {
                    if attempt + 1 < self.config.max_attempts {
                        tracing::warn!(
                            "LLM call failed (attempt {}/{}), retrying in {}ms: {}",
                            attempt + 1,
                            self.config.max_attempts,
                            self.config.retry_delay_ms,
                            e
                        );
                        sleep(Duration::from_millis(self.config.retry_delay_ms)).await;
                    }
                    last_error = Some(e);
                }
            }
        }

        Err(last_error
            .unwrap_or_else(|| RagError::Generation("all attempts failed".to_string())))
    }
}
