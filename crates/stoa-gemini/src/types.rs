// SPDX-FileCopyrightText: 2026 Stoa Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Wire types for the Gemini `generateContent` endpoint.

use serde::{Deserialize, Serialize};
use stoa_core::types::{ConversationMessage, Role};

/// Request body for `models/{model}:generateContent`.
#[derive(Debug, Clone, Serialize)]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
}

impl GenerateContentRequest {
    /// A single untagged user turn.
    pub fn single_turn(prompt: &str) -> Self {
        Self {
            contents: vec![Content {
                role: None,
                parts: vec![Part::text(prompt)],
            }],
        }
    }

    /// Role-tagged history followed by a new user turn.
    pub fn multi_turn(history: &[ConversationMessage], message: &str) -> Self {
        let contents = history
            .iter()
            .map(Content::from)
            .chain(std::iter::once(Content {
                role: Some(Role::User.to_string()),
                parts: vec![Part::text(message)],
            }))
            .collect();
        Self { contents }
    }
}

/// One turn of content.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub parts: Vec<Part>,
}

impl From<&ConversationMessage> for Content {
    fn from(message: &ConversationMessage) -> Self {
        Self {
            role: Some(message.role.to_string()),
            parts: vec![Part::text(&message.text)],
        }
    }
}

/// A content part. Only text parts are produced or read.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl Part {
    pub fn text(text: &str) -> Self {
        Self {
            text: Some(text.to_string()),
        }
    }
}

/// Successful response body.
#[derive(Debug, Clone, Deserialize)]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Option<Vec<Candidate>>,
}

impl GenerateContentResponse {
    /// Concatenated text parts of the first candidate, or `None` when the
    /// first candidate carries no text part at all.
    pub fn first_text(&self) -> Option<String> {
        let parts = &self.candidates.as_ref()?.first()?.content.as_ref()?.parts;
        let texts: Vec<&str> = parts.iter().filter_map(|p| p.text.as_deref()).collect();
        if texts.is_empty() {
            None
        } else {
            Some(texts.concat())
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<Content>,
}

/// Error body returned with non-2xx statuses.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorResponse {
    pub error: ApiErrorDetail,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorDetail {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}
