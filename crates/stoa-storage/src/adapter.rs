// SPDX-FileCopyrightText: 2026 Stoa Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the [`JournalStore`] trait.

use async_trait::async_trait;
use tokio::sync::OnceCell;
use tracing::{debug, info};

use stoa_config::model::StorageConfig;
use stoa_core::types::{JournalEntry, UserId};
use stoa_core::{AdapterType, HealthStatus, JournalStore, PluginAdapter, StoaError};

use crate::database::Database;
use crate::models::NewJournalEntry;
use crate::queries;

/// SQLite-backed journal store.
///
/// The database is opened by [`SqliteJournalStore::initialize`]; every
/// other operation fails with a persistence error until then.
pub struct SqliteJournalStore {
    config: StorageConfig,
    db: OnceCell<Database>,
}

impl SqliteJournalStore {
    /// Create a store for the configured path without opening it.
    pub fn new(config: StorageConfig) -> Self {
        Self {
            config,
            db: OnceCell::new(),
        }
    }

    /// Create and initialize a store in one step.
    pub async fn open(config: StorageConfig) -> Result<Self, StoaError> {
        let store = Self::new(config);
        store.initialize().await?;
        Ok(store)
    }

    /// Wrap an already-open database.
    pub fn from_database(config: StorageConfig, db: Database) -> Self {
        Self {
            config,
            db: OnceCell::new_with(Some(db)),
        }
    }

    /// Open the database and apply migrations.
    pub async fn initialize(&self) -> Result<(), StoaError> {
        let db = Database::open_with_options(&self.config.database_path, self.config.wal_mode)
            .await?;
        self.db
            .set(db)
            .map_err(|_| StoaError::persistence("journal store already initialized"))?;
        info!(path = %self.config.database_path, "journal store initialized");
        Ok(())
    }

    /// Checkpoint the WAL. The connection itself closes on drop.
    pub async fn close(&self) -> Result<(), StoaError> {
        self.db()?.checkpoint().await
    }

    /// Total number of entries stored for `user_id`.
    pub async fn count_entries(&self, user_id: &UserId) -> Result<u64, StoaError> {
        queries::journal::count_entries(self.db()?, user_id).await
    }

    fn db(&self) -> Result<&Database, StoaError> {
        self.db.get().ok_or_else(|| {
            StoaError::persistence("journal store not initialized -- call initialize() first")
        })
    }
}

#[async_trait]
impl PluginAdapter for SqliteJournalStore {
    fn name(&self) -> &str {
        "sqlite"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Journal
    }

    async fn health_check(&self) -> Result<HealthStatus, StoaError> {
        let Ok(db) = self.db() else {
            return Ok(HealthStatus::Unhealthy("not initialized".to_string()));
        };
        db.connection()
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.query_row("SELECT 1", [], |_| Ok(()))
            })
            .await
            .map_err(crate::database::map_tr_err)?;
        Ok(HealthStatus::Healthy)
    }
}

#[async_trait]
impl JournalStore for SqliteJournalStore {
    async fn record_exchange(
        &self,
        user_id: &UserId,
        user_input: Option<&str>,
        model_response: &str,
    ) -> Result<JournalEntry, StoaError> {
        let new = NewJournalEntry {
            user_id: user_id.clone(),
            user_input: user_input.map(str::to_string),
            model_response: model_response.to_string(),
        };
        let entry = queries::journal::insert_entry(self.db()?, &new).await?;
        debug!(entry_id = %entry.id, user_id = %user_id, "journal entry recorded");
        Ok(entry)
    }

    async fn list_recent(
        &self,
        user_id: &UserId,
        limit: usize,
    ) -> Result<Vec<JournalEntry>, StoaError> {
        queries::journal::list_recent(self.db()?, user_id, limit).await
    }
}
