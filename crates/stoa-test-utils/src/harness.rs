// SPDX-FileCopyrightText: 2026 Stoa Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for end-to-end integration testing.
//!
//! `TestHarness` wires a real SQLite journal in a temp directory to a
//! [`MockGenerator`] through a [`ReflectionService`], so the full reflection
//! pipeline (compose -> generate -> record -> refresh) runs without network.

use std::sync::Arc;

use secrecy::SecretString;
use stoa_agent::{JournalSession, Reflection, ReflectionService};
use stoa_config::model::{ContextConfig, StoaConfig, StorageConfig};
use stoa_context::{Persona, PromptComposer};
use stoa_core::traits::{GenerationAdapter, JournalStore};
use stoa_core::types::UserId;
use stoa_core::StoaError;
use stoa_storage::SqliteJournalStore;

use crate::mock_generator::MockGenerator;

/// Builder for creating test environments with configurable options.
pub struct TestHarnessBuilder {
    responses: Vec<String>,
    api_key: Option<String>,
    persona: Option<String>,
    context: ContextConfig,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        Self {
            responses: Vec::new(),
            api_key: Some("test-key".to_string()),
            persona: None,
            context: ContextConfig::default(),
        }
    }

    /// Set mock generator replies.
    pub fn with_mock_responses(mut self, responses: Vec<String>) -> Self {
        self.responses = responses;
        self
    }

    /// Set the API key handed to the service; `None` leaves it unset.
    pub fn with_api_key(mut self, key: Option<&str>) -> Self {
        self.api_key = key.map(str::to_string);
        self
    }

    /// Set a custom mentor persona.
    pub fn with_persona(mut self, persona: impl Into<String>) -> Self {
        self.persona = Some(persona.into());
        self
    }

    /// Set the prompt window and refresh limit.
    pub fn with_history(mut self, window: usize, limit: usize) -> Self {
        self.context.history_window = window;
        self.context.history_limit = limit;
        self
    }

    /// Build the test harness, creating all required subsystems.
    pub async fn build(self) -> Result<TestHarness, StoaError> {
        let temp_dir = tempfile::TempDir::new().map_err(StoaError::persistence)?;
        let db_path = temp_dir.path().join("test.db");

        let storage_config = StorageConfig {
            database_path: db_path.to_string_lossy().to_string(),
            wal_mode: true,
        };
        let journal = Arc::new(SqliteJournalStore::open(storage_config.clone()).await?);

        let mock_generator = Arc::new(if self.responses.is_empty() {
            MockGenerator::new()
        } else {
            MockGenerator::with_responses(self.responses)
        });

        let persona = self
            .persona
            .map(Persona::new)
            .unwrap_or_else(|| Persona::new("You are a test mentor."));
        let composer = PromptComposer::new(persona, self.context.max_response_chars);

        let service = ReflectionService::new(
            Arc::clone(&mock_generator) as Arc<dyn GenerationAdapter>,
            Arc::clone(&journal) as Arc<dyn JournalStore>,
            composer,
            self.api_key.map(SecretString::from),
        )
        .with_history(self.context.history_window, self.context.history_limit);

        let config = StoaConfig {
            storage: storage_config,
            context: self.context,
            ..StoaConfig::default()
        };

        Ok(TestHarness {
            mock_generator,
            journal,
            service: Arc::new(service),
            config,
            _temp_dir: temp_dir,
        })
    }
}

/// A complete test environment with a mock generator and temp storage.
pub struct TestHarness {
    /// The mock generator.
    pub mock_generator: Arc<MockGenerator>,
    /// SQLite journal (temp DB, cleaned up on drop).
    pub journal: Arc<SqliteJournalStore>,
    /// The reflection service under test.
    pub service: Arc<ReflectionService>,
    /// Stoa configuration matching the wiring above.
    pub config: StoaConfig,
    /// Temp directory kept alive for cleanup on drop.
    _temp_dir: tempfile::TempDir,
}

impl TestHarness {
    /// Create a new builder for configuring the test harness.
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    /// A fresh journal session for `user_id`.
    pub fn session(&self, user_id: &str) -> JournalSession {
        JournalSession::new(Arc::clone(&self.service), UserId::from(user_id))
    }

    /// Runs one reflection for `user_id` against its stored history.
    pub async fn reflect(&self, user_id: &str, note: &str) -> Result<Reflection, StoaError> {
        let user_id = UserId::from(user_id);
        let history = self.service.load_history(&user_id).await?;
        self.service
            .request_reflection(&user_id, note, &history)
            .await
    }
}
