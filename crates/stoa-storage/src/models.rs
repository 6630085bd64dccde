// SPDX-FileCopyrightText: 2026 Stoa Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Row types for the journal table.
//!
//! [`JournalEntry`] itself lives in `stoa-core` so it can cross adapter trait
//! boundaries; it is re-exported here for convenience.

use chrono::{DateTime, SecondsFormat, Utc};
use stoa_core::types::UserId;
use stoa_core::StoaError;

pub use stoa_core::types::JournalEntry;

/// Insert payload. The store assigns `id` and `created_at`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewJournalEntry {
    pub user_id: UserId,
    pub user_input: Option<String>,
    pub model_response: String,
}

/// A `journal_entries` row as stored, timestamps still in text form.
#[derive(Debug, Clone)]
pub(crate) struct JournalRow {
    pub id: String,
    pub user_id: String,
    pub user_input: Option<String>,
    pub model_response: String,
    pub created_at: String,
}

impl JournalRow {
    pub fn into_entry(self) -> Result<JournalEntry, StoaError> {
        let created_at = DateTime::parse_from_rfc3339(&self.created_at)
            .map_err(StoaError::persistence)?
            .with_timezone(&Utc);
        Ok(JournalEntry {
            id: self.id,
            user_id: UserId(self.user_id),
            user_input: self.user_input,
            model_response: self.model_response,
            created_at,
        })
    }
}

/// RFC 3339 with millisecond precision and a `Z` suffix. Fixed width, so
/// text order matches time order.
pub(crate) fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn timestamps_are_millisecond_rfc3339() {
        let at = Utc.with_ymd_and_hms(2026, 3, 1, 8, 5, 9).unwrap();
        assert_eq!(format_timestamp(at), "2026-03-01T08:05:09.000Z");
    }

    #[test]
    fn row_converts_to_entry() {
        let row = JournalRow {
            id: "id-1".into(),
            user_id: "u1".into(),
            user_input: None,
            model_response: "Breathe.".into(),
            created_at: "2026-03-01T08:05:09.123Z".into(),
        };
        let entry = row.into_entry().unwrap();
        assert_eq!(entry.user_id, UserId::from("u1"));
        assert_eq!(format_timestamp(entry.created_at), "2026-03-01T08:05:09.123Z");
    }

    #[test]
    fn bad_timestamp_is_persistence_error() {
        let row = JournalRow {
            id: "id-1".into(),
            user_id: "u1".into(),
            user_input: None,
            model_response: "x".into(),
            created_at: "yesterday".into(),
        };
        assert_eq!(
            row.into_entry().unwrap_err().kind(),
            stoa_core::ErrorKind::Persistence
        );
    }
}
