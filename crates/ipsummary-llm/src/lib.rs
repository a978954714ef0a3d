//! ipsummary LLM Gateway Layer
//!
//! Provider implementations of the `LlmProvider` trait from
//! `ipsummary-domain`, plus the admission-limited [`Gateway`] every pipeline
//! stage calls through.
//!
//! # Providers
//!
//! - `MockProvider`: deterministic test double with call counting and
//!   in-flight tracking
//! - `DeepSeekProvider`: OpenAI-compatible chat-completions API over HTTP
//!
//! The gateway layer never retries: a transport or API failure propagates
//! to the caller unmodified, and the batch driver decides what it means.

#![warn(missing_docs)]

pub mod deepseek;

use async_trait::async_trait;
use ipsummary_domain::{ChatMessage, ChatOptions, LlmProvider};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use thiserror::Error;

pub use deepseek::{DeepSeekConfig, DeepSeekProvider};

/// Errors that can occur during LLM operations
#[derive(Error, Debug)]
pub enum LlmError {
    /// Network or transport error
    #[error("Communication error: {0}")]
    Communication(String),

    /// Non-success status from the completions API
    #[error("API error: {0}")]
    Api(String),

    /// Response body did not match the expected shape
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Generic error (mock scripting, client construction)
    #[error("LLM error: {0}")]
    Other(String),
}

/// Admission-limited gateway over a provider.
///
/// Holds the one shared semaphore bounding concurrent external calls. Every
/// stage of every document draws a permit from this pool, so at most
/// `concurrent_requests` calls are in flight at any instant across the whole
/// batch. Admission order is not FIFO.
#[derive(Debug)]
pub struct Gateway<P> {
    provider: Arc<P>,
    limiter: Arc<tokio::sync::Semaphore>,
}

impl<P> Clone for Gateway<P> {
    fn clone(&self) -> Self {
        Self {
            provider: Arc::clone(&self.provider),
            limiter: Arc::clone(&self.limiter),
        }
    }
}

impl<P: LlmProvider> Gateway<P> {
    /// Create a gateway admitting at most `concurrent_requests` calls
    pub fn new(provider: P, concurrent_requests: usize) -> Self {
        Self {
            provider: Arc::new(provider),
            limiter: Arc::new(tokio::sync::Semaphore::new(concurrent_requests)),
        }
    }

    /// Permits not currently held by in-flight calls
    pub fn available_permits(&self) -> usize {
        self.limiter.available_permits()
    }

    /// Send one chat completion through the limiter.
    ///
    /// Suspends until a permit is available, holds it for the duration of
    /// the provider call, and releases it on return. Provider failures
    /// propagate unmodified.
    pub async fn chat(
        &self,
        messages: &[ChatMessage],
        options: ChatOptions,
    ) -> Result<String, P::Error> {
        let _permit = self
            .limiter
            .acquire()
            .await
            .expect("admission limiter closed");
        self.provider.chat(messages, options).await
    }
}

enum ScriptedReply {
    Text(String),
    Error(String),
}

/// Mock provider for deterministic testing.
///
/// Returns a fixed default reply, or a scripted reply for any call whose
/// joined message content contains a registered needle (first registered
/// match wins). Tracks total calls and the high-water mark of concurrent
/// in-flight calls so tests can observe the admission cap.
#[derive(Clone)]
pub struct MockProvider {
    default_response: String,
    scripted: Arc<Mutex<Vec<(String, ScriptedReply)>>>,
    call_count: Arc<Mutex<usize>>,
    in_flight: Arc<Mutex<usize>>,
    max_in_flight: Arc<Mutex<usize>>,
    delay: Option<Duration>,
}

impl MockProvider {
    /// Create a provider answering every call with `response`
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            default_response: response.into(),
            scripted: Arc::new(Mutex::new(Vec::new())),
            call_count: Arc::new(Mutex::new(0)),
            in_flight: Arc::new(Mutex::new(0)),
            max_in_flight: Arc::new(Mutex::new(0)),
            delay: None,
        }
    }

    /// Hold each call open for `delay` before replying.
    ///
    /// Gives concurrency tests a window in which overlapping calls are
    /// actually overlapping.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Script a reply for calls whose content contains `needle`
    pub fn add_response(&mut self, needle: impl Into<String>, response: impl Into<String>) {
        self.scripted
            .lock()
            .unwrap()
            .push((needle.into(), ScriptedReply::Text(response.into())));
    }

    /// Script a failure for calls whose content contains `needle`
    pub fn add_error(&mut self, needle: impl Into<String>, detail: impl Into<String>) {
        self.scripted
            .lock()
            .unwrap()
            .push((needle.into(), ScriptedReply::Error(detail.into())));
    }

    /// Total calls received
    pub fn call_count(&self) -> usize {
        *self.call_count.lock().unwrap()
    }

    /// Highest number of calls observed in flight at once
    pub fn max_in_flight(&self) -> usize {
        *self.max_in_flight.lock().unwrap()
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new("{}")
    }
}

#[async_trait]
impl LlmProvider for MockProvider {
    type Error = LlmError;

    async fn chat(
        &self,
        messages: &[ChatMessage],
        _options: ChatOptions,
    ) -> Result<String, Self::Error> {
        *self.call_count.lock().unwrap() += 1;
        {
            let mut in_flight = self.in_flight.lock().unwrap();
            *in_flight += 1;
            let mut max = self.max_in_flight.lock().unwrap();
            if *in_flight > *max {
                *max = *in_flight;
            }
        }

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let joined: String = messages
            .iter()
            .map(|m| m.content.as_str())
            .collect::<Vec<_>>()
            .join("\n");

        let reply = {
            let scripted = self.scripted.lock().unwrap();
            scripted.iter().find_map(|(needle, reply)| {
                if joined.contains(needle.as_str()) {
                    Some(match reply {
                        ScriptedReply::Text(text) => Ok(text.clone()),
                        ScriptedReply::Error(detail) => Err(LlmError::Other(detail.clone())),
                    })
                } else {
                    None
                }
            })
        };

        *self.in_flight.lock().unwrap() -= 1;

        match reply {
            Some(result) => result,
            None => Ok(self.default_response.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn turns(content: &str) -> Vec<ChatMessage> {
        vec![ChatMessage::system("s"), ChatMessage::user(content)]
    }

    #[tokio::test]
    async fn mock_returns_default_response() {
        let provider = MockProvider::new("fixed");
        let reply = provider
            .chat(&turns("anything"), ChatOptions::default())
            .await
            .unwrap();
        assert_eq!(reply, "fixed");
        assert_eq!(provider.call_count(), 1);
    }

    #[tokio::test]
    async fn mock_matches_scripted_needles_in_order() {
        let mut provider = MockProvider::new("default");
        provider.add_response("classifier", "first");
        provider.add_response("class", "second");

        let reply = provider
            .chat(&turns("the classifier prompt"), ChatOptions::default())
            .await
            .unwrap();
        assert_eq!(reply, "first");

        let reply = provider
            .chat(&turns("a class apart"), ChatOptions::default())
            .await
            .unwrap();
        assert_eq!(reply, "second");

        let reply = provider
            .chat(&turns("nothing matches"), ChatOptions::default())
            .await
            .unwrap();
        assert_eq!(reply, "default");
    }

    #[tokio::test]
    async fn mock_scripted_error_propagates() {
        let mut provider = MockProvider::default();
        provider.add_error("bad", "connection reset");

        let result = provider.chat(&turns("a bad call"), ChatOptions::default()).await;
        assert!(matches!(result, Err(LlmError::Other(_))));
    }

    #[tokio::test]
    async fn gateway_caps_in_flight_calls() {
        let provider = MockProvider::new("{}").with_delay(Duration::from_millis(30));
        let observer = provider.clone();
        let gateway = Gateway::new(provider, 2);

        let mut handles = Vec::new();
        for _ in 0..8 {
            let gw = gateway.clone();
            handles.push(tokio::spawn(async move {
                gw.chat(&[ChatMessage::user("go")], ChatOptions::default())
                    .await
                    .unwrap();
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(observer.call_count(), 8);
        assert!(
            observer.max_in_flight() <= 2,
            "observed {} concurrent calls with cap 2",
            observer.max_in_flight()
        );
        assert_eq!(gateway.available_permits(), 2);
    }
}
