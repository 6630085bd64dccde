// SPDX-FileCopyrightText: 2026 Stoa Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory journal store with failure injection.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;

use stoa_core::traits::adapter::PluginAdapter;
use stoa_core::traits::journal::JournalStore;
use stoa_core::types::{AdapterType, HealthStatus, JournalEntry, UserId};
use stoa_core::StoaError;

/// Arguments of one `record_exchange` call that reached the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordCall {
    pub user_id: UserId,
    pub user_input: Option<String>,
    pub model_response: String,
}

/// A journal store backed by a `Vec`, in insertion order.
///
/// `fail_records` and `fail_lists` make the matching operation return
/// [`StoaError::Persistence`] until switched off again.
pub struct MockJournal {
    entries: Arc<Mutex<Vec<JournalEntry>>>,
    record_calls: Arc<Mutex<Vec<RecordCall>>>,
    next_id: AtomicU64,
    fail_records: AtomicBool,
    fail_lists: AtomicBool,
}

impl MockJournal {
    pub fn new() -> Self {
        Self {
            entries: Arc::new(Mutex::new(Vec::new())),
            record_calls: Arc::new(Mutex::new(Vec::new())),
            next_id: AtomicU64::new(1),
            fail_records: AtomicBool::new(false),
            fail_lists: AtomicBool::new(false),
        }
    }

    pub fn fail_records(&self, fail: bool) {
        self.fail_records.store(fail, Ordering::SeqCst);
    }

    pub fn fail_lists(&self, fail: bool) {
        self.fail_lists.store(fail, Ordering::SeqCst);
    }

    /// Successful `record_exchange` calls, in call order.
    pub async fn record_calls(&self) -> Vec<RecordCall> {
        self.record_calls.lock().await.clone()
    }

    /// All stored entries, oldest first.
    pub async fn entries(&self) -> Vec<JournalEntry> {
        self.entries.lock().await.clone()
    }
}

impl Default for MockJournal {
    fn default() -> Self {
        Self::new()
    }
}

fn injected(operation: &str) -> StoaError {
    StoaError::persistence(std::io::Error::other(format!("injected {operation} failure")))
}

#[async_trait]
impl PluginAdapter for MockJournal {
    fn name(&self) -> &str {
        "mock-journal"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Journal
    }

    async fn health_check(&self) -> Result<HealthStatus, StoaError> {
        Ok(HealthStatus::Healthy)
    }
}

#[async_trait]
impl JournalStore for MockJournal {
    async fn record_exchange(
        &self,
        user_id: &UserId,
        user_input: Option<&str>,
        model_response: &str,
    ) -> Result<JournalEntry, StoaError> {
        if self.fail_records.load(Ordering::SeqCst) {
            return Err(injected("record"));
        }

        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let entry = JournalEntry {
            id: format!("mock-{id}"),
            user_id: user_id.clone(),
            user_input: user_input.map(str::to_string),
            model_response: model_response.to_string(),
            created_at: Utc::now(),
        };
        self.entries.lock().await.push(entry.clone());
        self.record_calls.lock().await.push(RecordCall {
            user_id: user_id.clone(),
            user_input: user_input.map(str::to_string),
            model_response: model_response.to_string(),
        });
        Ok(entry)
    }

    async fn list_recent(
        &self,
        user_id: &UserId,
        limit: usize,
    ) -> Result<Vec<JournalEntry>, StoaError> {
        if self.fail_lists.load(Ordering::SeqCst) {
            return Err(injected("list"));
        }

        Ok(self
            .entries
            .lock()
            .await
            .iter()
            .rev()
            .filter(|e| &e.user_id == user_id)
            .take(limit)
            .cloned()
            .collect())
    }
}
