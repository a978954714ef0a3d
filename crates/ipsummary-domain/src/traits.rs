//! Trait definitions for external interactions
//!
//! These traits define the boundary between the pipeline and infrastructure.
//! Provider implementations live in `ipsummary-llm`.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// One role-tagged turn in a chat-completions request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// "system" or "user"
    pub role: String,
    /// Turn content
    pub content: String,
}

impl ChatMessage {
    /// A system turn
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    /// A user turn
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// Per-call overrides for a chat completion.
///
/// `None` means "use the configured default". Only the parameters the
/// pipeline actually varies are exposed here.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChatOptions {
    /// Sampling temperature override
    pub temperature: Option<f32>,
    /// Output token cap override
    pub max_output_tokens: Option<u32>,
}

/// Trait for text-generation providers.
///
/// One external call per invocation. Implementations must not retry or
/// swallow transport failures; the caller decides what a failure means.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Error type for provider operations
    type Error: std::fmt::Display + Send;

    /// Generate a completion for the given message turns
    async fn chat(
        &self,
        messages: &[ChatMessage],
        options: ChatOptions,
    ) -> Result<String, Self::Error>;
}
