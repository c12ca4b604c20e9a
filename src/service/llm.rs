//! Shared LLM client and the structured-extraction seam
//!
//! All three AI touch-points (intake, inbound proposal parsing, proposal
//! comparison) go through the `StructuredExtractor` trait: prompt context
//! in, parsed JSON out. The live implementation wraps the OpenAI provider
//! from rig-core; tests inject deterministic implementations.

use std::time::Duration;

use async_trait::async_trait;
use rig::client::CompletionClient;
use rig::completion::Prompt;
use rig::providers::openai;
use serde_json::Value;

/// Environment variable for OpenAI API key
const ENV_OPENAI_API_KEY: &str = "OPENAI_API_KEY";

/// Default model for all extraction calls; services may override per call
pub const DEFAULT_MODEL: &str = openai::GPT_4O_MINI;

/// Defensive ceiling on a single model call
const EXTRACT_TIMEOUT: Duration = Duration::from_secs(60);

/// Error type for structured extraction
#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    #[error("LLM call failed: {0}")]
    Upstream(String),

    #[error("LLM call timed out")]
    Timeout,

    #[error("Malformed model output: {0}")]
    Malformed(String),

    #[error("OpenAI client not configured (missing {ENV_OPENAI_API_KEY})")]
    NotConfigured,
}

/// Shared LLM client wrapper
#[derive(Clone)]
pub struct LlmClient {
    client: openai::Client,
}

impl LlmClient {
    /// Create a new LLM client with the provided API key
    pub fn new(api_key: &str) -> Result<Self, String> {
        let client = openai::Client::new(api_key);

        Ok(Self { client })
    }

    /// Create a client from the environment
    pub fn from_env() -> Result<Self, ExtractError> {
        let api_key =
            std::env::var(ENV_OPENAI_API_KEY).map_err(|_| ExtractError::NotConfigured)?;

        Self::new(&api_key).map_err(|e| {
            tracing::warn!(error = %e, "Failed to create OpenAI client");
            ExtractError::NotConfigured
        })
    }

    /// Get a reference to the underlying OpenAI client
    pub fn openai_client(&self) -> &openai::Client {
        &self.client
    }
}

/// The single abstract AI capability of the application.
///
/// Implementations take a system prompt and a task prompt and return the
/// model's reply parsed as JSON.
#[async_trait]
pub trait StructuredExtractor: Send + Sync {
    async fn extract(&self, model: &str, system: &str, prompt: &str)
        -> Result<Value, ExtractError>;
}

/// Live extractor over the OpenAI chat completion API
pub struct OpenAiExtractor {
    client: LlmClient,
}

impl OpenAiExtractor {
    pub fn new(client: LlmClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl StructuredExtractor for OpenAiExtractor {
    async fn extract(
        &self,
        model: &str,
        system: &str,
        prompt: &str,
    ) -> Result<Value, ExtractError> {
        let start_time = std::time::Instant::now();

        let agent = self
            .client
            .openai_client()
            .agent(model)
            .preamble(system)
            .build();

        let reply = tokio::time::timeout(EXTRACT_TIMEOUT, agent.prompt(prompt))
            .await
            .map_err(|_| {
                tracing::error!(model = %model, timeout_s = EXTRACT_TIMEOUT.as_secs(), "LLM call timed out");
                ExtractError::Timeout
            })?
            .map_err(|e| ExtractError::Upstream(e.to_string()))?;

        tracing::debug!(
            model = %model,
            elapsed_ms = start_time.elapsed().as_millis(),
            prompt_length = prompt.len(),
            reply_length = reply.len(),
            "LLM extraction call completed"
        );

        parse_json_reply(&reply)
    }
}

/// Strip markdown code-fence markers from a model reply.
///
/// Models regularly wrap JSON output in ```json fences despite being asked
/// not to; every fence marker is removed before structural parsing.
pub fn strip_code_fences(text: &str) -> String {
    text.replace("```json", "")
        .replace("```", "")
        .trim()
        .to_string()
}

/// Parse a model reply into JSON after fence stripping.
///
/// Malformed output is not recovered locally; the error propagates to the
/// caller.
pub fn parse_json_reply(reply: &str) -> Result<Value, ExtractError> {
    let cleaned = strip_code_fences(reply);
    serde_json::from_str(&cleaned).map_err(|e| ExtractError::Malformed(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_json_fence() {
        let reply = "```json\n{\"title\": \"Laptops\"}\n```";
        assert_eq!(strip_code_fences(reply), "{\"title\": \"Laptops\"}");
    }

    #[test]
    fn test_strip_bare_fence() {
        let reply = "```\n{\"a\": 1}\n```";
        assert_eq!(strip_code_fences(reply), "{\"a\": 1}");
    }

    #[test]
    fn test_unfenced_reply_passes_through() {
        let reply = "{\"a\": 1}";
        assert_eq!(strip_code_fences(reply), "{\"a\": 1}");
    }

    #[test]
    fn test_parse_fenced_reply() {
        let value = parse_json_reply("```json\n{\"budget\": 50000}\n```").unwrap();
        assert_eq!(value["budget"], 50000);
    }

    #[test]
    fn test_parse_malformed_reply_is_an_error() {
        let err = parse_json_reply("I could not find any items.").unwrap_err();
        assert!(matches!(err, ExtractError::Malformed(_)));
    }

    #[test]
    fn test_parse_reply_with_surrounding_whitespace() {
        let value = parse_json_reply("\n\n```json\n[1, 2]\n```\n").unwrap();
        assert_eq!(value, serde_json::json!([1, 2]));
    }
}
