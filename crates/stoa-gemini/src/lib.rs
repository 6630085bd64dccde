// SPDX-FileCopyrightText: 2026 Stoa Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Google Gemini generation adapter for Stoa.
//!
//! This crate implements [`GenerationAdapter`] over the Gemini
//! `generateContent` endpoint, in both single-turn and multi-turn form.

pub mod client;
pub mod types;

use std::time::Duration;

use async_trait::async_trait;
use stoa_config::model::GeminiConfig;
use stoa_core::traits::{GenerationAdapter, PluginAdapter};
use stoa_core::types::{AdapterType, ApiKey, ConversationMessage, HealthStatus};
use stoa_core::StoaError;
use tracing::info;

pub use crate::client::{ChatSession, GeminiClient};

/// Gemini provider implementing [`GenerationAdapter`].
///
/// Holds no credentials: the key is supplied on every call so a missing key
/// is caught before any request is built.
#[derive(Debug, Clone)]
pub struct GeminiProvider {
    client: GeminiClient,
}

impl GeminiProvider {
    /// Creates a provider from the `[gemini]` configuration section.
    pub fn new(config: &GeminiConfig) -> Result<Self, StoaError> {
        let client = GeminiClient::new(
            config.model.clone(),
            Duration::from_secs(config.timeout_secs),
        )?
        .with_base_url(config.base_url.clone());

        info!(
            model = %config.model,
            timeout_secs = config.timeout_secs,
            "Gemini provider initialized"
        );

        Ok(Self { client })
    }

    /// Wraps an existing client.
    pub fn with_client(client: GeminiClient) -> Self {
        Self { client }
    }

    /// The underlying client, for opening [`ChatSession`]s directly.
    pub fn client(&self) -> &GeminiClient {
        &self.client
    }
}

#[async_trait]
impl PluginAdapter for GeminiProvider {
    fn name(&self) -> &str {
        "gemini"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Generation
    }

    async fn health_check(&self) -> Result<HealthStatus, StoaError> {
        // No request is sent; a live call would spend quota.
        Ok(HealthStatus::Healthy)
    }
}

#[async_trait]
impl GenerationAdapter for GeminiProvider {
    async fn generate(&self, api_key: &ApiKey, prompt: &str) -> Result<String, StoaError> {
        self.client.generate(api_key, prompt).await
    }

    async fn chat(
        &self,
        api_key: &ApiKey,
        history: &[ConversationMessage],
        message: &str,
    ) -> Result<String, StoaError> {
        self.client.generate_turn(api_key, history, message).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config(base_url: &str) -> GeminiConfig {
        GeminiConfig {
            base_url: base_url.to_string(),
            ..GeminiConfig::default()
        }
    }

    #[test]
    fn provider_reports_identity() {
        let provider = GeminiProvider::new(&GeminiConfig::default()).unwrap();
        assert_eq!(provider.name(), "gemini");
        assert_eq!(provider.adapter_type(), AdapterType::Generation);
        assert_eq!(provider.client().model(), "gemini-2.5-flash");
    }

    #[tokio::test]
    async fn health_check_is_healthy_without_network() {
        let provider = GeminiProvider::new(&config("http://127.0.0.1:1")).unwrap();
        assert_eq!(provider.health_check().await.unwrap(), HealthStatus::Healthy);
    }

    #[tokio::test]
    async fn chat_through_trait_object() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/models/gemini-2.5-flash:generateContent"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{"content": {"parts": [{"text": "Be still."}]}}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let provider: Box<dyn GenerationAdapter> =
            Box::new(GeminiProvider::new(&config(&server.uri())).unwrap());
        let key = ApiKey::parse(Some("k")).unwrap();
        let reply = provider
            .chat(&key, &[ConversationMessage::user("A"), ConversationMessage::model("B")], "C")
            .await
            .unwrap();
        assert_eq!(reply, "Be still.");
    }
}
