// SPDX-FileCopyrightText: 2026 Stoa Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Database connection management with PRAGMA setup, WAL mode, and lifecycle.
//!
//! All statements run on tokio-rusqlite's single background thread, which
//! serializes writes. Do NOT open additional connections for writes.

use std::path::Path;

use stoa_core::StoaError;
use tracing::debug;

use crate::migrations;

/// Handle to the journal database.
#[derive(Debug, Clone)]
pub struct Database {
    conn: tokio_rusqlite::Connection,
}

impl Database {
    /// Opens (creating if needed) the database at `path` in WAL mode and
    /// applies pending migrations.
    pub async fn open(path: &str) -> Result<Self, StoaError> {
        Self::open_with_options(path, true).await
    }

    /// Like [`Database::open`], with WAL optional.
    pub async fn open_with_options(path: &str, wal_mode: bool) -> Result<Self, StoaError> {
        if let Some(parent) = Path::new(path).parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(StoaError::persistence)?;
        }

        let conn = tokio_rusqlite::Connection::open(path)
            .await
            .map_err(StoaError::persistence)?;

        conn.call(move |conn| -> Result<(), StoaError> {
            let journal_mode = if wal_mode { "WAL" } else { "DELETE" };
            conn.execute_batch(&format!(
                "PRAGMA journal_mode = {journal_mode};
                 PRAGMA synchronous = NORMAL;
                 PRAGMA foreign_keys = ON;
                 PRAGMA busy_timeout = 5000;"
            ))
            .map_err(StoaError::persistence)?;
            migrations::run_migrations(conn)
        })
        .await
        .map_err(map_call_err)?;

        debug!(path, wal_mode, "database opened");
        Ok(Self { conn })
    }

    /// Opens a private in-memory database with migrations applied.
    pub async fn open_in_memory() -> Result<Self, StoaError> {
        let conn = tokio_rusqlite::Connection::open_in_memory()
            .await
            .map_err(StoaError::persistence)?;
        conn.call(|conn| -> Result<(), StoaError> { migrations::run_migrations(conn) })
            .await
            .map_err(map_call_err)?;
        Ok(Self { conn })
    }

    /// The underlying single-writer connection.
    pub fn connection(&self) -> &tokio_rusqlite::Connection {
        &self.conn
    }

    /// Checkpoints the WAL into the main database file.
    pub async fn checkpoint(&self) -> Result<(), StoaError> {
        self.conn
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")
            })
            .await
            .map_err(map_tr_err)?;
        debug!("WAL checkpoint complete");
        Ok(())
    }

    /// Checkpoints and closes the connection.
    pub async fn close(self) -> Result<(), StoaError> {
        self.checkpoint().await?;
        self.conn.close().await.map_err(StoaError::persistence)
    }
}

/// Convert a tokio-rusqlite error into [`StoaError::Persistence`].
pub(crate) fn map_tr_err(e: tokio_rusqlite::Error<rusqlite::Error>) -> StoaError {
    StoaError::persistence(e)
}

/// Unwrap errors raised inside a call closure that already speaks `StoaError`.
fn map_call_err(e: tokio_rusqlite::Error<StoaError>) -> StoaError {
    match e {
        tokio_rusqlite::Error::Error(inner) => inner,
        other => StoaError::persistence(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn open_creates_parent_dirs_and_schema() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/dir/stoa.db");
        let db = Database::open(path.to_str().unwrap()).await.unwrap();

        let tables: i64 = db
            .connection()
            .call(|conn| -> Result<i64, rusqlite::Error> {
                conn.query_row(
                    "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = 'journal_entries'",
                    [],
                    |row| row.get(0),
                )
            })
            .await
            .unwrap();
        assert_eq!(tables, 1);
        assert!(path.exists());
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn reopening_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stoa.db");
        let path = path.to_str().unwrap();

        Database::open(path).await.unwrap().close().await.unwrap();
        let db = Database::open(path).await.unwrap();
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn wal_mode_is_enabled() {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::open(dir.path().join("wal.db").to_str().unwrap())
            .await
            .unwrap();
        let mode: String = db
            .connection()
            .call(|conn| -> Result<String, rusqlite::Error> {
                conn.query_row("PRAGMA journal_mode", [], |row| row.get(0))
            })
            .await
            .unwrap();
        assert_eq!(mode.to_lowercase(), "wal");
        db.close().await.unwrap();
    }
}
