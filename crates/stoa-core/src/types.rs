// SPDX-FileCopyrightText: 2026 Stoa Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types used across adapter traits and the Stoa core.

use chrono::{DateTime, Utc};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::error::StoaError;

/// Identifier of an authenticated user, as issued by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub String);

impl UserId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for UserId {
    fn from(value: &str) -> Self {
        UserId(value.to_string())
    }
}

/// Opaque authenticated session handed out by the identity provider.
///
/// The core only ever reads [`Session::user_id`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub user_id: UserId,
    #[serde(default)]
    pub email: Option<String>,
}

impl Session {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: UserId(user_id.into()),
            email: None,
        }
    }
}

/// A change in the authenticated session, delivered to subscribers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    SignedIn(Session),
    SignedOut,
    Refreshed(Session),
}

impl SessionEvent {
    /// The session that is current after this event, if any.
    pub fn session(&self) -> Option<&Session> {
        match self {
            SessionEvent::SignedIn(s) | SessionEvent::Refreshed(s) => Some(s),
            SessionEvent::SignedOut => None,
        }
    }
}

/// Result of a sign-up request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignUpOutcome {
    /// The account was created and a session is already active.
    Session(Session),
    /// The account was created but the email address must be confirmed first.
    ConfirmationPending,
}

/// Health status reported by adapter health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Adapter is fully operational.
    Healthy,
    /// Adapter is operational but experiencing issues.
    Degraded(String),
    /// Adapter is not operational.
    Unhealthy(String),
}

/// Identifies the kind of adapter behind a trait object.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum AdapterType {
    Generation,
    Journal,
    Identity,
}

/// Author of a conversation turn.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Role {
    User,
    Model,
}

/// One role-tagged turn of a multi-turn conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationMessage {
    pub role: Role,
    pub text: String,
}

impl ConversationMessage {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            text: text.into(),
        }
    }

    pub fn model(text: impl Into<String>) -> Self {
        Self {
            role: Role::Model,
            text: text.into(),
        }
    }
}

/// One persisted note/reflection pair.
///
/// Created by the journal store on a successful generation and never
/// updated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalEntry {
    /// Store-assigned identifier.
    pub id: String,
    pub user_id: UserId,
    /// The note the user wrote, if any.
    pub user_input: Option<String>,
    /// The mentor's reply.
    pub model_response: String,
    pub created_at: DateTime<Utc>,
}

impl JournalEntry {
    /// Returns the reply cut to `max_chars` characters, with `...` appended
    /// when something was cut. Used by history listings.
    pub fn preview(&self, max_chars: usize) -> String {
        let mut chars = self.model_response.chars();
        let head: String = chars.by_ref().take(max_chars).collect();
        if chars.next().is_some() {
            format!("{head}...")
        } else {
            head
        }
    }
}

/// A validated, non-blank API key for the generation service.
///
/// The only constructor trims its input and rejects blank keys, so holding an
/// `ApiKey` means a request may be attempted.
#[derive(Debug)]
pub struct ApiKey(SecretString);

impl ApiKey {
    /// Parses an optional raw key, failing with [`StoaError::Config`] when it
    /// is absent or blank.
    pub fn parse(raw: Option<&str>) -> Result<Self, StoaError> {
        let trimmed = raw.map(str::trim).unwrap_or_default();
        if trimmed.is_empty() {
            return Err(StoaError::Config(
                "generation API key not provided".to_string(),
            ));
        }
        Ok(Self(SecretString::from(trimmed.to_string())))
    }

    /// Returns the key text for placing on the wire.
    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }
}
