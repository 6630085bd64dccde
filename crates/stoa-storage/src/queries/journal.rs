// SPDX-FileCopyrightText: 2026 Stoa Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Journal entry insert and listing.

use chrono::Utc;
use rusqlite::params;
use stoa_core::types::UserId;
use stoa_core::StoaError;

use crate::database::Database;
use crate::models::{format_timestamp, JournalEntry, JournalRow, NewJournalEntry};

/// Insert one entry, assigning a UUID v4 id and the current time.
pub async fn insert_entry(
    db: &Database,
    new: &NewJournalEntry,
) -> Result<JournalEntry, StoaError> {
    let entry = JournalEntry {
        id: uuid::Uuid::new_v4().to_string(),
        user_id: new.user_id.clone(),
        user_input: new.user_input.clone(),
        model_response: new.model_response.clone(),
        // Round-trip through the stored form so the returned entry equals a re-read one.
        created_at: truncate_to_millis(Utc::now()),
    };

    let row = (
        entry.id.clone(),
        entry.user_id.0.clone(),
        entry.user_input.clone(),
        entry.model_response.clone(),
        format_timestamp(entry.created_at),
    );
    db.connection()
        .call(move |conn| -> Result<(), rusqlite::Error> {
            conn.execute(
                "INSERT INTO journal_entries (id, user_id, user_input, model_response, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![row.0, row.1, row.2, row.3, row.4],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)?;

    Ok(entry)
}

/// The `limit` most recent entries for `user_id`, newest first.
///
/// Entries sharing a timestamp are ordered by insertion, latest first.
pub async fn list_recent(
    db: &Database,
    user_id: &UserId,
    limit: usize,
) -> Result<Vec<JournalEntry>, StoaError> {
    let user_id = user_id.0.clone();
    let limit = i64::try_from(limit).unwrap_or(i64::MAX);
    let rows = db
        .connection()
        .call(move |conn| -> Result<Vec<JournalRow>, rusqlite::Error> {
            let mut stmt = conn.prepare(
                "SELECT id, user_id, user_input, model_response, created_at
                 FROM journal_entries
                 WHERE user_id = ?1
                 ORDER BY created_at DESC, seq DESC
                 LIMIT ?2",
            )?;
            let rows = stmt
                .query_map(params![user_id, limit], |row| {
                    Ok(JournalRow {
                        id: row.get(0)?,
                        user_id: row.get(1)?,
                        user_input: row.get(2)?,
                        model_response: row.get(3)?,
                        created_at: row.get(4)?,
                    })
                })?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(rows)
        })
        .await
        .map_err(crate::database::map_tr_err)?;

    rows.into_iter().map(JournalRow::into_entry).collect()
}

/// Number of entries stored for `user_id`.
pub async fn count_entries(db: &Database, user_id: &UserId) -> Result<u64, StoaError> {
    let user_id = user_id.0.clone();
    let count: i64 = db
        .connection()
        .call(move |conn| -> Result<i64, rusqlite::Error> {
            conn.query_row(
                "SELECT COUNT(*) FROM journal_entries WHERE user_id = ?1",
                params![user_id],
                |row| row.get(0),
            )
        })
        .await
        .map_err(crate::database::map_tr_err)?;
    Ok(count.max(0) as u64)
}

fn truncate_to_millis(at: chrono::DateTime<Utc>) -> chrono::DateTime<Utc> {
    use chrono::Timelike;
    let millis = at.nanosecond() / 1_000_000 * 1_000_000;
    at.with_nanosecond(millis).unwrap_or(at)
}
