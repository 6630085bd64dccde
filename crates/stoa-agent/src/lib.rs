// SPDX-FileCopyrightText: 2026 Stoa Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Orchestration layer of the Stoa reflection journal.
//!
//! - [`ReflectionService`] runs one reflection: compose the prompt, generate,
//!   record the exchange and refresh the history
//! - [`JournalSession`] holds the per-user draft and history a shell drives
//! - [`Conversation`] drives the multi-turn chat over a [`ConversationLog`]
//! - [`sign_in_or_register`] and [`SessionWatch`] sit on top of the
//!   identity provider
//!
//! Every collaborator is injected as an `Arc<dyn Trait>` from `stoa-core`.

pub mod auth;
pub mod conversation;
mod guard;
pub mod reflection;
pub mod session_watch;

pub use auth::{sign_in_or_register, AuthOutcome};
pub use conversation::{ChatReply, Conversation, ConversationLog, ConversationState, LoggedMessage};
pub use reflection::{JournalSession, Reflection, ReflectionService, SaveStatus};
pub use session_watch::SessionWatch;
