// SPDX-FileCopyrightText: 2026 Stoa Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Journal store trait for persisting note/reflection exchanges.

use async_trait::async_trait;

use crate::error::StoaError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{JournalEntry, UserId};

/// Adapter for the user-scoped journal-entry collection.
///
/// Entries are immutable once written; the core only creates and reads them.
#[async_trait]
pub trait JournalStore: PluginAdapter {
    /// Inserts one exchange and returns the stored entry with its
    /// store-assigned id and timestamp.
    async fn record_exchange(
        &self,
        user_id: &UserId,
        user_input: Option<&str>,
        model_response: &str,
    ) -> Result<JournalEntry, StoaError>;

    /// Returns up to `limit` entries for `user_id`, newest first.
    ///
    /// Callers that need oldest-first order reverse the result themselves.
    async fn list_recent(
        &self,
        user_id: &UserId,
        limit: usize,
    ) -> Result<Vec<JournalEntry>, StoaError>;
}
