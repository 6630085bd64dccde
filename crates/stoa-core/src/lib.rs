// SPDX-FileCopyrightText: 2026 Stoa Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Stoa reflection journal.
//!
//! This crate provides the trait definitions, error types, and common types
//! shared by the generation client, the journal store, the identity provider
//! and the orchestration layer.

pub mod error;
pub mod subscription;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::{ErrorKind, StoaError};
pub use subscription::{SessionBroadcast, SessionHandler, Subscription};
pub use types::{
    AdapterType, ApiKey, ConversationMessage, HealthStatus, JournalEntry, Role, Session,
    SessionEvent, SignUpOutcome, UserId,
};

// Re-export all adapter traits at crate root.
pub use traits::{GenerationAdapter, IdentityProvider, JournalStore, PluginAdapter};
