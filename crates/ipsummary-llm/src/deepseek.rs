//! DeepSeek provider implementation
//!
//! Talks to DeepSeek's OpenAI-compatible chat-completions endpoint. Any
//! other OpenAI-compatible service works by pointing `base_url` at it.
//!
//! Per-call configuration (temperature default, top-p, token cap, request
//! timeout) comes from static settings; callers may override temperature
//! and the token cap per call. Failures propagate unmodified, with no
//! retries and no fallbacks.

use crate::LlmError;
use async_trait::async_trait;
use ipsummary_domain::{ChatMessage, ChatOptions, LlmProvider};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Default API endpoint
pub const DEFAULT_BASE_URL: &str = "https://api.deepseek.com";

/// Default model identifier
pub const DEFAULT_MODEL: &str = "deepseek-chat";

/// Static provider configuration
#[derive(Debug, Clone)]
pub struct DeepSeekConfig {
    /// Bearer token for the API
    pub api_key: String,
    /// Service root; `/chat/completions` is appended
    pub base_url: String,
    /// Model identifier
    pub model: String,
    /// Default sampling temperature
    pub temperature: f32,
    /// Nucleus sampling parameter
    pub top_p: f32,
    /// Default output token cap
    pub max_output_tokens: u32,
    /// Per-request timeout in seconds
    pub request_timeout_secs: u64,
}

impl Default for DeepSeekConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            temperature: 0.1,
            top_p: 0.9,
            max_output_tokens: 2000,
            request_timeout_secs: 60,
        }
    }
}

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f32,
    top_p: f32,
    max_tokens: u32,
    stream: bool,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

/// OpenAI-compatible chat-completions provider
#[derive(Debug, Clone)]
pub struct DeepSeekProvider {
    client: reqwest::Client,
    config: DeepSeekConfig,
}

impl DeepSeekProvider {
    /// Create a provider from static settings.
    ///
    /// The request timeout is baked into the HTTP client here; every call
    /// carries it.
    pub fn new(config: DeepSeekConfig) -> Result<Self, LlmError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| LlmError::Other(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client, config })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/chat/completions",
            self.config.base_url.trim_end_matches('/')
        )
    }
}

#[async_trait]
impl LlmProvider for DeepSeekProvider {
    type Error = LlmError;

    async fn chat(
        &self,
        messages: &[ChatMessage],
        options: ChatOptions,
    ) -> Result<String, Self::Error> {
        let body = ChatCompletionRequest {
            model: &self.config.model,
            messages,
            temperature: options.temperature.unwrap_or(self.config.temperature),
            top_p: self.config.top_p,
            max_tokens: options
                .max_output_tokens
                .unwrap_or(self.config.max_output_tokens),
            stream: false,
        };

        debug!(
            turns = messages.len(),
            model = %self.config.model,
            "sending chat completion"
        );

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| LlmError::Communication(format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(LlmError::Api(format!("HTTP {status}: {detail}")));
        }

        let completion: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| LlmError::InvalidResponse(format!("failed to parse response: {e}")))?;

        Ok(completion
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_config(base_url: String) -> DeepSeekConfig {
        DeepSeekConfig {
            api_key: "test-key".to_string(),
            base_url,
            ..DeepSeekConfig::default()
        }
    }

    #[test]
    fn endpoint_tolerates_trailing_slash() {
        let provider =
            DeepSeekProvider::new(test_config("https://api.example.com/".to_string())).unwrap();
        assert_eq!(provider.endpoint(), "https://api.example.com/chat/completions");
    }

    #[tokio::test]
    async fn chat_returns_first_choice_content() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("authorization", "Bearer test-key"))
            .and(body_partial_json(serde_json::json!({
                "model": "deepseek-chat",
                "stream": false
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [
                    {"message": {"role": "assistant", "content": "{\"direction\":\"upstream\"}"}}
                ]
            })))
            .mount(&server)
            .await;

        let provider = DeepSeekProvider::new(test_config(server.uri())).unwrap();
        let reply = provider
            .chat(
                &[ChatMessage::system("s"), ChatMessage::user("u")],
                ChatOptions::default(),
            )
            .await
            .unwrap();
        assert_eq!(reply, "{\"direction\":\"upstream\"}");
    }

    #[tokio::test]
    async fn chat_surfaces_api_errors() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(429).set_body_string("rate limited"))
            .mount(&server)
            .await;

        let provider = DeepSeekProvider::new(test_config(server.uri())).unwrap();
        let result = provider
            .chat(&[ChatMessage::user("u")], ChatOptions::default())
            .await;
        match result {
            Err(LlmError::Api(detail)) => assert!(detail.contains("429")),
            other => panic!("expected Api error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn chat_applies_per_call_overrides() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(body_partial_json(serde_json::json!({
                "temperature": 0.7,
                "max_tokens": 128
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [{"message": {"role": "assistant", "content": "ok"}}]
            })))
            .mount(&server)
            .await;

        let provider = DeepSeekProvider::new(test_config(server.uri())).unwrap();
        let options = ChatOptions {
            temperature: Some(0.7),
            max_output_tokens: Some(128),
        };
        let reply = provider
            .chat(&[ChatMessage::user("u")], options)
            .await
            .unwrap();
        assert_eq!(reply, "ok");
    }
}
