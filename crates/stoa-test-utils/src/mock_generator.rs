// SPDX-FileCopyrightText: 2026 Stoa Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock generation adapter for deterministic testing.
//!
//! `MockGenerator` implements `GenerationAdapter` with pre-configured
//! outcomes, so reflection and chat flows run without the network.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;

use stoa_core::traits::adapter::PluginAdapter;
use stoa_core::traits::generation::GenerationAdapter;
use stoa_core::types::{AdapterType, ApiKey, ConversationMessage, HealthStatus};
use stoa_core::StoaError;

/// A mock generator that returns queued outcomes.
///
/// Outcomes are popped from a FIFO queue. When the queue is empty, a default
/// "mock reflection" text is returned.
pub struct MockGenerator {
    outcomes: Arc<Mutex<VecDeque<Result<String, StoaError>>>>,
    prompts: Arc<Mutex<Vec<String>>>,
    chat_histories: Arc<Mutex<Vec<Vec<ConversationMessage>>>>,
    delay: Option<Duration>,
}

impl MockGenerator {
    /// Create a new mock generator with an empty queue.
    pub fn new() -> Self {
        Self {
            outcomes: Arc::new(Mutex::new(VecDeque::new())),
            prompts: Arc::new(Mutex::new(Vec::new())),
            chat_histories: Arc::new(Mutex::new(Vec::new())),
            delay: None,
        }
    }

    /// Create a mock generator pre-loaded with successful replies.
    pub fn with_responses<S: Into<String>>(responses: Vec<S>) -> Self {
        let generator = Self::new();
        let queue = responses.into_iter().map(|r| Ok(r.into())).collect();
        Self {
            outcomes: Arc::new(Mutex::new(queue)),
            ..generator
        }
    }

    /// Hold every call for `delay` before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Queue a successful reply.
    pub async fn push_response(&self, text: impl Into<String>) {
        self.outcomes.lock().await.push_back(Ok(text.into()));
    }

    /// Queue a failure.
    pub async fn push_error(&self, error: StoaError) {
        self.outcomes.lock().await.push_back(Err(error));
    }

    /// Number of calls received, single-turn and chat together.
    pub async fn call_count(&self) -> usize {
        self.prompts.lock().await.len()
    }

    /// The prompt of every `generate` call and the message of every `chat`
    /// call, in call order.
    pub async fn prompts(&self) -> Vec<String> {
        self.prompts.lock().await.clone()
    }

    /// The history passed to every `chat` call.
    pub async fn chat_histories(&self) -> Vec<Vec<ConversationMessage>> {
        self.chat_histories.lock().await.clone()
    }

    async fn next_outcome(&self, prompt: &str) -> Result<String, StoaError> {
        self.prompts.lock().await.push(prompt.to_string());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.outcomes
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| Ok("mock reflection".to_string()))
    }
}

impl Default for MockGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PluginAdapter for MockGenerator {
    fn name(&self) -> &str {
        "mock-generator"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Generation
    }

    async fn health_check(&self) -> Result<HealthStatus, StoaError> {
        Ok(HealthStatus::Healthy)
    }
}

#[async_trait]
impl GenerationAdapter for MockGenerator {
    async fn generate(&self, _api_key: &ApiKey, prompt: &str) -> Result<String, StoaError> {
        self.next_outcome(prompt).await
    }

    async fn chat(
        &self,
        _api_key: &ApiKey,
        history: &[ConversationMessage],
        message: &str,
    ) -> Result<String, StoaError> {
        self.chat_histories.lock().await.push(history.to_vec());
        self.next_outcome(message).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key() -> ApiKey {
        ApiKey::parse(Some("test")).unwrap()
    }

    #[tokio::test]
    async fn returns_queued_outcomes_in_order_then_default() {
        let generator = MockGenerator::with_responses(vec!["first"]);
        generator
            .push_error(StoaError::MalformedResponse("empty".into()))
            .await;

        assert_eq!(generator.generate(&key(), "a").await.unwrap(), "first");
        assert!(generator.generate(&key(), "b").await.is_err());
        assert_eq!(generator.generate(&key(), "c").await.unwrap(), "mock reflection");
        assert_eq!(generator.prompts().await, ["a", "b", "c"]);
    }

    #[tokio::test]
    async fn chat_records_history() {
        let generator = MockGenerator::new();
        generator
            .chat(&key(), &[ConversationMessage::user("A")], "B")
            .await
            .unwrap();
        assert_eq!(generator.call_count().await, 1);
        assert_eq!(generator.chat_histories().await[0].len(), 1);
    }
}
