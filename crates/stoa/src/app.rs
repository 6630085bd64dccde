// SPDX-FileCopyrightText: 2026 Stoa Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Process-wide wiring: one journal store, one generator, one service.

use std::sync::Arc;

use secrecy::SecretString;
use stoa_agent::ReflectionService;
use stoa_config::model::StoaConfig;
use stoa_core::traits::{GenerationAdapter, JournalStore};
use stoa_core::StoaError;
use stoa_gemini::GeminiProvider;
use stoa_storage::SqliteJournalStore;
use tracing::{info, warn};

/// Adapters built once at startup and shared by every command.
pub struct App {
    pub config: StoaConfig,
    pub journal: Arc<SqliteJournalStore>,
    pub generator: Arc<GeminiProvider>,
    pub service: Arc<ReflectionService>,
}

impl App {
    pub async fn open(config: StoaConfig) -> Result<Self, StoaError> {
        let journal = Arc::new(SqliteJournalStore::open(config.storage.clone()).await?);
        let generator = Arc::new(GeminiProvider::new(&config.gemini)?);

        let service = ReflectionService::from_config(
            &config,
            Arc::clone(&generator) as Arc<dyn GenerationAdapter>,
            Arc::clone(&journal) as Arc<dyn JournalStore>,
        )
        .await;

        info!(
            agent = %config.agent.name,
            model = %config.gemini.model,
            "stoa ready"
        );

        Ok(Self {
            config,
            journal,
            generator,
            service: Arc::new(service),
        })
    }

    /// The configured API key, re-resolved for components that hold their own.
    pub fn api_key(&self) -> Option<SecretString> {
        stoa_config::resolve_api_key(&self.config.gemini)
    }

    /// Flushes the journal. Failures are logged, not returned.
    pub async fn close(&self) {
        if let Err(e) = self.journal.close().await {
            warn!(error = %e, "journal checkpoint on exit failed");
        }
    }
}
