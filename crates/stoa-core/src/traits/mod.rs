// SPDX-FileCopyrightText: 2026 Stoa Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Adapter trait definitions for Stoa's external collaborators.
//!
//! All adapters extend the [`PluginAdapter`] base trait and use
//! `#[async_trait]` for dynamic dispatch compatibility.

pub mod adapter;
pub mod generation;
pub mod identity;
pub mod journal;

pub use adapter::PluginAdapter;
pub use generation::GenerationAdapter;
pub use identity::IdentityProvider;
pub use journal::JournalStore;
