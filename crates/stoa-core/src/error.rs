// SPDX-FileCopyrightText: 2026 Stoa Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Stoa reflection journal.

use strum::{Display, EnumString};
use thiserror::Error;

/// The primary error type used across all Stoa adapter traits and core operations.
#[derive(Debug, Error)]
pub enum StoaError {
    /// Configuration errors (missing or blank API key, invalid settings).
    #[error("configuration error: {0}")]
    Config(String),

    /// Transport-level failures talking to a remote service (DNS, reset, timeout).
    #[error("connectivity error: {message}")]
    Connectivity {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The generation service answered with a non-success status.
    #[error("service error: {message}")]
    Service {
        /// HTTP status returned by the service, when known.
        status: Option<u16>,
        /// Upstream error message, or a generic description.
        message: String,
    },

    /// The service answered successfully but the body lacked generated text.
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// Journal store failures (connection, query, serialization).
    #[error("storage error: {source}")]
    Persistence {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Identity provider rejected or failed an operation.
    #[error("authentication error: {0}")]
    Auth(String),

    /// A submission is already in flight for this session.
    #[error("a reflection is already in progress")]
    Busy,

    /// Misuse of a conversation log (e.g. building history from an empty log).
    #[error("conversation error: {0}")]
    Conversation(String),

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

/// Coarse classification of a [`StoaError`], stable for matching and logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum ErrorKind {
    Configuration,
    Connectivity,
    Service,
    MalformedResponse,
    Persistence,
    Auth,
    Busy,
    Conversation,
    Internal,
}

impl StoaError {
    /// Convenience constructor for storage failures from any error type.
    pub fn persistence(source: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        StoaError::Persistence {
            source: source.into(),
        }
    }

    /// Returns the kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            StoaError::Config(_) => ErrorKind::Configuration,
            StoaError::Connectivity { .. } => ErrorKind::Connectivity,
            StoaError::Service { .. } => ErrorKind::Service,
            StoaError::MalformedResponse(_) => ErrorKind::MalformedResponse,
            StoaError::Persistence { .. } => ErrorKind::Persistence,
            StoaError::Auth(_) => ErrorKind::Auth,
            StoaError::Busy => ErrorKind::Busy,
            StoaError::Conversation(_) => ErrorKind::Conversation,
            StoaError::Internal(_) => ErrorKind::Internal,
        }
    }

    /// Short text suitable for showing to the person using the journal.
    ///
    /// Service errors surface the upstream message verbatim.
    pub fn user_message(&self) -> String {
        match self {
            StoaError::Config(msg) => format!("Stoa is not configured correctly: {msg}"),
            StoaError::Connectivity { .. } => {
                "Could not reach the mentor. Check your connection and try again.".to_string()
            }
            StoaError::Service { message, .. } => format!("The mentor service replied: {message}"),
            StoaError::MalformedResponse(_) => {
                "The mentor returned an empty answer. Try again.".to_string()
            }
            StoaError::Persistence { .. } => "Your reflection could not be saved.".to_string(),
            StoaError::Auth(msg) => msg.clone(),
            StoaError::Busy => "Still waiting on the previous reflection.".to_string(),
            StoaError::Conversation(msg) | StoaError::Internal(msg) => msg.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_matches_variant() {
        assert_eq!(StoaError::Config("x".into()).kind(), ErrorKind::Configuration);
        assert_eq!(
            StoaError::Connectivity {
                message: "reset".into(),
                source: None
            }
            .kind(),
            ErrorKind::Connectivity
        );
        assert_eq!(
            StoaError::persistence(std::io::Error::other("disk")).kind(),
            ErrorKind::Persistence
        );
        assert_eq!(StoaError::Busy.kind(), ErrorKind::Busy);
    }

    #[test]
    fn service_user_message_carries_upstream_text() {
        let err = StoaError::Service {
            status: Some(400),
            message: "API key not valid".into(),
        };
        assert!(err.user_message().contains("API key not valid"));
        assert_eq!(err.to_string(), "service error: API key not valid");
    }

    #[test]
    fn error_kind_display_is_snake_case() {
        assert_eq!(ErrorKind::MalformedResponse.to_string(), "malformed_response");
    }
}
