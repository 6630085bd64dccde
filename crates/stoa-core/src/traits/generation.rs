// SPDX-FileCopyrightText: 2026 Stoa Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Generation adapter trait for generative-text services.

use async_trait::async_trait;

use crate::error::StoaError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{ApiKey, ConversationMessage};

/// Adapter for a remote generative-text service.
///
/// Implementations issue exactly one request per call and never retry;
/// retrying is a caller decision.
#[async_trait]
pub trait GenerationAdapter: PluginAdapter {
    /// Single-turn completion: sends `prompt` and returns the generated text.
    async fn generate(&self, api_key: &ApiKey, prompt: &str) -> Result<String, StoaError>;

    /// Multi-turn completion.
    ///
    /// `history` must start with a user turn and must not contain `message`,
    /// which is sent as the new user turn.
    async fn chat(
        &self,
        api_key: &ApiKey,
        history: &[ConversationMessage],
        message: &str,
    ) -> Result<String, StoaError>;
}
