// SPDX-FileCopyrightText: 2026 Stoa Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the Gemini `generateContent` API.
//!
//! Provides [`GeminiClient`] for single-turn generation and [`ChatSession`]
//! for multi-turn exchanges. Each call issues exactly one POST; nothing is
//! retried.

use std::time::Duration;

use reqwest::Url;
use stoa_core::types::{ApiKey, ConversationMessage, Role};
use stoa_core::StoaError;
use tracing::{debug, warn};

use crate::types::{ApiErrorResponse, GenerateContentRequest, GenerateContentResponse};

/// API root for the public Gemini endpoint.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Model used when none is configured.
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// Request timeout used when none is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// HTTP client for Gemini API communication.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    client: reqwest::Client,
    model: String,
    base_url: String,
}

impl GeminiClient {
    /// Creates a client for `model` with the given request timeout.
    pub fn new(model: impl Into<String>, timeout: Duration) -> Result<Self, StoaError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| StoaError::Connectivity {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            client,
            model: model.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
        })
    }

    /// Overrides the API root (self-hosted proxies, wiremock in tests).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Returns the model identifier.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Sends `prompt` as a single untagged turn and returns the generated text.
    pub async fn generate(&self, api_key: &ApiKey, prompt: &str) -> Result<String, StoaError> {
        self.post(api_key, &GenerateContentRequest::single_turn(prompt))
            .await
    }

    /// Sends `history` plus `message` as a new user turn.
    ///
    /// `history` must begin with a user turn.
    pub async fn generate_turn(
        &self,
        api_key: &ApiKey,
        history: &[ConversationMessage],
        message: &str,
    ) -> Result<String, StoaError> {
        check_history(history)?;
        self.post(api_key, &GenerateContentRequest::multi_turn(history, message))
            .await
    }

    /// Opens a multi-turn session seeded with `history`, which must not
    /// include the message about to be sent.
    pub fn start_chat(
        &self,
        api_key: ApiKey,
        history: Vec<ConversationMessage>,
    ) -> Result<ChatSession, StoaError> {
        check_history(&history)?;
        Ok(ChatSession {
            client: self.clone(),
            api_key,
            history,
        })
    }

    fn endpoint(&self, api_key: &ApiKey) -> Result<Url, StoaError> {
        let raw = format!("{}/models/{}:generateContent", self.base_url, self.model);
        Url::parse_with_params(&raw, &[("key", api_key.expose())])
            .map_err(|e| StoaError::Config(format!("invalid generation endpoint: {e}")))
    }

    async fn post(
        &self,
        api_key: &ApiKey,
        request: &GenerateContentRequest,
    ) -> Result<String, StoaError> {
        let response = self
            .client
            .post(self.endpoint(api_key)?)
            .json(request)
            .send()
            .await
            .map_err(connectivity)?;

        let status = response.status();
        debug!(status = %status, model = %self.model, turns = request.contents.len(), "generateContent response received");

        let body = response.text().await.map_err(connectivity)?;

        if !status.is_success() {
            let message = serde_json::from_str::<ApiErrorResponse>(&body)
                .ok()
                .and_then(|e| e.error.message)
                .filter(|m| !m.trim().is_empty())
                .unwrap_or_else(|| {
                    format!("generation request failed with status {}", status.as_u16())
                });
            warn!(status = status.as_u16(), "generation service returned an error");
            return Err(StoaError::Service {
                status: Some(status.as_u16()),
                message,
            });
        }

        let parsed: GenerateContentResponse = serde_json::from_str(&body).map_err(|e| {
            StoaError::MalformedResponse(format!("response body is not valid JSON: {e}"))
        })?;

        parsed.first_text().ok_or_else(|| {
            warn!(model = %self.model, "generation response carried no candidate text");
            StoaError::MalformedResponse("response contained no candidate text".to_string())
        })
    }
}

/// A multi-turn conversation with the generation service.
///
/// The session history grows by a user and a model turn on every successful
/// [`ChatSession::send`]; failed sends leave it untouched.
#[derive(Debug)]
pub struct ChatSession {
    client: GeminiClient,
    api_key: ApiKey,
    history: Vec<ConversationMessage>,
}

impl ChatSession {
    /// Sends `text` as the next user turn and returns the model's reply.
    pub async fn send(&mut self, text: &str) -> Result<String, StoaError> {
        let reply = self
            .client
            .post(
                &self.api_key,
                &GenerateContentRequest::multi_turn(&self.history, text),
            )
            .await?;
        self.history.push(ConversationMessage::user(text));
        self.history.push(ConversationMessage::model(reply.clone()));
        Ok(reply)
    }

    /// Turns exchanged so far, oldest first.
    pub fn history(&self) -> &[ConversationMessage] {
        &self.history
    }
}

fn check_history(history: &[ConversationMessage]) -> Result<(), StoaError> {
    match history.first() {
        Some(first) if first.role != Role::User => Err(StoaError::Conversation(
            "service history must begin with a user turn".to_string(),
        )),
        _ => Ok(()),
    }
}

/// Maps a transport failure. The request URL carries the key, so it is
/// stripped before the error is stored or displayed.
fn connectivity(e: reqwest::Error) -> StoaError {
    let e = e.without_url();
    let message = if e.is_timeout() {
        "generation request timed out".to_string()
    } else {
        format!("generation request failed: {e}")
    };
    warn!(error = %e, "generation request did not complete");
    StoaError::Connectivity {
        message,
        source: Some(Box::new(e)),
    }
}
