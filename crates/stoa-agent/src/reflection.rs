// SPDX-FileCopyrightText: 2026 Stoa Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The reflection use case: compose, generate, persist, refresh.
//!
//! [`ReflectionService`] is stateless and shared; [`JournalSession`] holds
//! the per-user draft and history a UI shell drives.

use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

use secrecy::{ExposeSecret, SecretString};
use stoa_config::model::StoaConfig;
use stoa_context::{context_window, PromptComposer};
use stoa_core::traits::{GenerationAdapter, JournalStore};
use stoa_core::types::{ApiKey, JournalEntry, UserId};
use stoa_core::StoaError;
use tracing::{debug, info, warn};

use crate::guard::{lock, InFlight};

const DEFAULT_HISTORY_WINDOW: usize = 3;
const DEFAULT_HISTORY_LIMIT: usize = 10;

/// Whether a generated reply made it into the journal.
#[derive(Debug)]
pub enum SaveStatus {
    Saved(JournalEntry),
    /// Generation succeeded but the write failed. The reply stands.
    NotSaved(StoaError),
    /// No write was attempted.
    NotRequested,
}

impl SaveStatus {
    pub fn entry(&self) -> Option<&JournalEntry> {
        match self {
            SaveStatus::Saved(entry) => Some(entry),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&StoaError> {
        match self {
            SaveStatus::NotSaved(err) => Some(err),
            _ => None,
        }
    }

    pub fn is_saved(&self) -> bool {
        matches!(self, SaveStatus::Saved(_))
    }
}

/// Outcome of a successful generation.
#[derive(Debug)]
pub struct Reflection {
    /// The mentor's reply, as generated.
    pub text: String,
    pub saved: SaveStatus,
    /// Recent entries, newest first, after this reflection.
    pub history: Vec<JournalEntry>,
    /// Set when re-reading the history failed; `history` is then the
    /// previous history with the new entry prepended.
    pub refresh_error: Option<StoaError>,
}

/// Orchestrates one reflection against the injected generator and store.
pub struct ReflectionService {
    generator: Arc<dyn GenerationAdapter>,
    journal: Arc<dyn JournalStore>,
    composer: PromptComposer,
    api_key: Option<SecretString>,
    history_window: usize,
    history_limit: usize,
}

impl ReflectionService {
    pub fn new(
        generator: Arc<dyn GenerationAdapter>,
        journal: Arc<dyn JournalStore>,
        composer: PromptComposer,
        api_key: Option<SecretString>,
    ) -> Self {
        Self {
            generator,
            journal,
            composer,
            api_key,
            history_window: DEFAULT_HISTORY_WINDOW,
            history_limit: DEFAULT_HISTORY_LIMIT,
        }
    }

    /// Sets how many prior entries feed the prompt (`window`) and how many
    /// are read back after a reflection (`limit`).
    pub fn with_history(mut self, window: usize, limit: usize) -> Self {
        self.history_window = window;
        self.history_limit = limit;
        self
    }

    /// Builds the service from loaded configuration. The API key is resolved
    /// from `[gemini].api_key` or the environment fallback.
    pub async fn from_config(
        config: &StoaConfig,
        generator: Arc<dyn GenerationAdapter>,
        journal: Arc<dyn JournalStore>,
    ) -> Self {
        let composer = PromptComposer::from_config(&config.mentor, &config.context).await;
        let api_key = stoa_config::resolve_api_key(&config.gemini);
        if api_key.is_none() {
            warn!("no generation API key configured; reflections will fail until one is set");
        }
        Self::new(generator, journal, composer, api_key).with_history(
            config.context.history_window,
            config.context.history_limit,
        )
    }

    pub fn history_limit(&self) -> usize {
        self.history_limit
    }

    /// Reads the most recent entries for `user_id`, newest first.
    pub async fn load_history(&self, user_id: &UserId) -> Result<Vec<JournalEntry>, StoaError> {
        self.journal.list_recent(user_id, self.history_limit).await
    }

    /// Generates a reflection on `note` given `history` (newest first) and
    /// records it.
    ///
    /// Fails only when no reply was generated; in that case nothing was
    /// written. Save and refresh failures are reported inside the returned
    /// [`Reflection`].
    pub async fn request_reflection(
        &self,
        user_id: &UserId,
        note: &str,
        history: &[JournalEntry],
    ) -> Result<Reflection, StoaError> {
        let api_key = ApiKey::parse(self.api_key.as_ref().map(|k| k.expose_secret()))?;

        let window = context_window(history, self.history_window);
        let prompt = self.composer.compose(&window, note);
        debug!(
            user_id = %user_id,
            context_entries = window.len(),
            prompt_chars = prompt.len(),
            "requesting reflection"
        );

        let text = match self.generator.generate(&api_key, &prompt).await {
            Ok(text) => text,
            Err(e) => {
                warn!(user_id = %user_id, error = %e, "reflection generation failed");
                return Err(e);
            }
        };

        let saved = match self
            .journal
            .record_exchange(user_id, stored_note(note), &text)
            .await
        {
            Ok(entry) => {
                info!(user_id = %user_id, entry_id = %entry.id, "reflection saved");
                SaveStatus::Saved(entry)
            }
            Err(e) => {
                warn!(user_id = %user_id, error = %e, "reflection generated but not saved");
                SaveStatus::NotSaved(e)
            }
        };

        let (history, refresh_error) =
            match self.journal.list_recent(user_id, self.history_limit).await {
                Ok(fresh) => (fresh, None),
                Err(e) => {
                    warn!(user_id = %user_id, error = %e, "history refresh failed");
                    let mut fallback = Vec::with_capacity(history.len() + 1);
                    if let Some(entry) = saved.entry() {
                        fallback.push(entry.clone());
                    }
                    fallback.extend(history.iter().cloned());
                    fallback.truncate(self.history_limit);
                    (fallback, Some(e))
                }
            };

        Ok(Reflection {
            text,
            saved,
            history,
            refresh_error,
        })
    }
}

/// Blank notes are stored as absent; others are stored trimmed.
pub(crate) fn stored_note(note: &str) -> Option<&str> {
    let trimmed = note.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}

#[derive(Debug, Default)]
struct SessionView {
    draft: String,
    history: Vec<JournalEntry>,
    last_reflection: Option<String>,
}

/// Per-user journal state driven by a UI shell.
///
/// At most one submission runs at a time; a second concurrent
/// [`submit`](Self::submit) fails with [`StoaError::Busy`].
pub struct JournalSession {
    service: Arc<ReflectionService>,
    user_id: UserId,
    view: Mutex<SessionView>,
    in_flight: AtomicBool,
}

impl JournalSession {
    pub fn new(service: Arc<ReflectionService>, user_id: UserId) -> Self {
        Self {
            service,
            user_id,
            view: Mutex::new(SessionView::default()),
            in_flight: AtomicBool::new(false),
        }
    }

    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    pub fn set_draft(&self, text: impl Into<String>) {
        lock(&self.view).draft = text.into();
    }

    pub fn draft(&self) -> String {
        lock(&self.view).draft.clone()
    }

    /// Recent entries, newest first, as last loaded or refreshed.
    pub fn history(&self) -> Vec<JournalEntry> {
        lock(&self.view).history.clone()
    }

    pub fn last_reflection(&self) -> Option<String> {
        lock(&self.view).last_reflection.clone()
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.load(std::sync::atomic::Ordering::Acquire)
    }

    /// Reads recent history for this user into the session.
    pub async fn load(&self) -> Result<Vec<JournalEntry>, StoaError> {
        let history = self.service.load_history(&self.user_id).await?;
        lock(&self.view).history = history.clone();
        Ok(history)
    }

    /// Submits the current draft.
    ///
    /// The draft is cleared only once a reply was generated; on failure it
    /// is left for the user to resubmit. A draft edited while the request
    /// was in flight is kept.
    pub async fn submit(&self) -> Result<Reflection, StoaError> {
        let _in_flight = InFlight::acquire(&self.in_flight)?;

        let (note, history) = {
            let view = lock(&self.view);
            (view.draft.clone(), view.history.clone())
        };

        let reflection = self
            .service
            .request_reflection(&self.user_id, &note, &history)
            .await?;

        let mut view = lock(&self.view);
        if view.draft == note {
            view.draft.clear();
        }
        view.history = reflection.history.clone();
        view.last_reflection = Some(reflection.text.clone());
        Ok(reflection)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use stoa_context::{Persona, NO_REMARKS};
    use stoa_core::ErrorKind;
    use stoa_test_utils::{MockGenerator, MockJournal};

    fn service(
        generator: &Arc<MockGenerator>,
        journal: &Arc<MockJournal>,
        key: Option<&str>,
    ) -> ReflectionService {
        ReflectionService::new(
            Arc::clone(generator) as Arc<dyn GenerationAdapter>,
            Arc::clone(journal) as Arc<dyn JournalStore>,
            PromptComposer::new(Persona::new("Be Seneca."), 500),
            key.map(|k| SecretString::from(k.to_string())),
        )
    }

    fn user() -> UserId {
        UserId::from("u1")
    }

    #[tokio::test]
    async fn missing_or_blank_key_fails_before_any_call() {
        for key in [None, Some(""), Some("  ")] {
            let generator = Arc::new(MockGenerator::new());
            let journal = Arc::new(MockJournal::new());
            let svc = service(&generator, &journal, key);

            let err = svc.request_reflection(&user(), "hi", &[]).await.unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Configuration);
            assert_eq!(generator.call_count().await, 0);
            assert!(journal.record_calls().await.is_empty());
        }
    }

    #[tokio::test]
    async fn success_records_and_refreshes() {
        let generator = Arc::new(MockGenerator::with_responses(vec!["Respire e aja."]));
        let journal = Arc::new(MockJournal::new());
        let svc = service(&generator, &journal, Some("key"));

        let reflection = svc
            .request_reflection(&user(), "  Estou ansioso ", &[])
            .await
            .unwrap();

        assert_eq!(reflection.text, "Respire e aja.");
        assert!(reflection.saved.is_saved());
        assert!(reflection.refresh_error.is_none());
        assert_eq!(reflection.history.len(), 1);

        let calls = journal.record_calls().await;
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].user_input.as_deref(), Some("Estou ansioso"));
        assert_eq!(calls[0].model_response, "Respire e aja.");

        let prompt = generator.prompts().await.remove(0);
        assert!(prompt.starts_with("Be Seneca."));
        assert!(prompt.contains("Today they write: \"Estou ansioso\""));
    }

    #[tokio::test]
    async fn blank_note_is_stored_as_absent() {
        let generator = Arc::new(MockGenerator::with_responses(vec!["Rest."]));
        let journal = Arc::new(MockJournal::new());
        let svc = service(&generator, &journal, Some("key"));

        svc.request_reflection(&user(), "   ", &[]).await.unwrap();

        assert_eq!(journal.record_calls().await[0].user_input, None);
        assert!(generator.prompts().await[0].contains(NO_REMARKS));
    }

    #[tokio::test]
    async fn generation_failure_persists_nothing() {
        let generator = Arc::new(MockGenerator::new());
        generator
            .push_error(StoaError::Service {
                status: Some(500),
                message: "overloaded".into(),
            })
            .await;
        let journal = Arc::new(MockJournal::new());
        let svc = service(&generator, &journal, Some("key"));

        let err = svc.request_reflection(&user(), "hi", &[]).await.unwrap_err();
        assert!(err.to_string().contains("overloaded"));
        assert!(journal.record_calls().await.is_empty());
    }

    #[tokio::test]
    async fn save_failure_is_reported_not_raised() {
        let generator = Arc::new(MockGenerator::with_responses(vec!["Endure."]));
        let journal = Arc::new(MockJournal::new());
        journal.fail_records(true);
        let svc = service(&generator, &journal, Some("key"));

        let reflection = svc.request_reflection(&user(), "hi", &[]).await.unwrap();
        assert_eq!(reflection.text, "Endure.");
        assert_eq!(
            reflection.saved.error().map(StoaError::kind),
            Some(ErrorKind::Persistence)
        );
    }

    #[tokio::test]
    #[tracing_test::traced_test]
    async fn save_failure_is_logged_without_the_key() {
        let generator = Arc::new(MockGenerator::new());
        let journal = Arc::new(MockJournal::new());
        journal.fail_records(true);
        let svc = service(&generator, &journal, Some("very-secret-key"));

        svc.request_reflection(&user(), "hi", &[]).await.unwrap();

        assert!(logs_contain("reflection generated but not saved"));
        assert!(!logs_contain("very-secret-key"));
    }

    #[tokio::test]
    async fn refresh_failure_prepends_new_entry_to_previous_history() {
        let journal = Arc::new(MockJournal::new());
        let earlier = journal
            .record_exchange(&user(), Some("yesterday"), "Then.")
            .await
            .unwrap();
        journal.fail_lists(true);

        let generator = Arc::new(MockGenerator::with_responses(vec!["Now."]));
        let svc = service(&generator, &journal, Some("key")).with_history(3, 2);

        let reflection = svc
            .request_reflection(&user(), "today", std::slice::from_ref(&earlier))
            .await
            .unwrap();

        assert!(reflection.refresh_error.is_some());
        let responses: Vec<&str> = reflection
            .history
            .iter()
            .map(|e| e.model_response.as_str())
            .collect();
        assert_eq!(responses, ["Now.", "Then."]);
    }

    #[tokio::test]
    async fn only_the_window_reaches_the_prompt() {
        let journal = Arc::new(MockJournal::new());
        for day in ["one", "two", "three", "four"] {
            journal.record_exchange(&user(), Some(day), day).await.unwrap();
        }
        let history = journal.list_recent(&user(), 10).await.unwrap();

        let generator = Arc::new(MockGenerator::new());
        let svc = service(&generator, &journal, Some("key")).with_history(2, 10);
        svc.request_reflection(&user(), "five", &history).await.unwrap();

        let prompt = generator.prompts().await.remove(0);
        assert!(!prompt.contains("\"two\""));
        let three = prompt.find("\"three\"").unwrap();
        let four = prompt.find("\"four\"").unwrap();
        assert!(three < four);
    }

    #[tokio::test]
    async fn session_keeps_draft_on_failure_and_clears_on_success() {
        let generator = Arc::new(MockGenerator::new());
        generator
            .push_error(StoaError::Connectivity {
                message: "offline".into(),
                source: None,
            })
            .await;
        generator.push_response("Breathe.").await;
        let journal = Arc::new(MockJournal::new());
        let session = JournalSession::new(Arc::new(service(&generator, &journal, Some("k"))), user());

        session.set_draft("Estou ansioso");
        let err = session.submit().await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Connectivity);
        assert_eq!(session.draft(), "Estou ansioso");
        assert!(!session.is_busy());

        let reflection = session.submit().await.unwrap();
        assert_eq!(reflection.text, "Breathe.");
        assert_eq!(session.draft(), "");
        assert_eq!(session.last_reflection().as_deref(), Some("Breathe."));
        assert_eq!(session.history()[0].model_response, "Breathe.");
    }

    #[tokio::test]
    async fn concurrent_submit_is_busy() {
        let generator = Arc::new(MockGenerator::new().with_delay(Duration::from_millis(200)));
        let journal = Arc::new(MockJournal::new());
        let session = Arc::new(JournalSession::new(
            Arc::new(service(&generator, &journal, Some("k"))),
            user(),
        ));
        session.set_draft("first");

        let background = Arc::clone(&session);
        let first = tokio::spawn(async move { background.submit().await });
        tokio::time::sleep(Duration::from_millis(50)).await;

        let err = session.submit().await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Busy);

        first.await.unwrap().unwrap();
        assert_eq!(generator.call_count().await, 1);
        assert!(!session.is_busy());
    }

    #[tokio::test]
    async fn draft_edited_in_flight_survives_success() {
        let generator = Arc::new(MockGenerator::new().with_delay(Duration::from_millis(200)));
        let journal = Arc::new(MockJournal::new());
        let session = Arc::new(JournalSession::new(
            Arc::new(service(&generator, &journal, Some("k"))),
            user(),
        ));
        session.set_draft("first");

        let background = Arc::clone(&session);
        let pending = tokio::spawn(async move { background.submit().await });
        tokio::time::sleep(Duration::from_millis(50)).await;
        session.set_draft("second");

        pending.await.unwrap().unwrap();
        assert_eq!(session.draft(), "second");
        assert_eq!(journal.record_calls().await[0].user_input.as_deref(), Some("first"));
    }

    #[tokio::test]
    async fn load_reads_recent_history() {
        let journal = Arc::new(MockJournal::new());
        journal.record_exchange(&user(), None, "a").await.unwrap();
        journal.record_exchange(&UserId::from("other"), None, "b").await.unwrap();

        let generator = Arc::new(MockGenerator::new());
        let session = JournalSession::new(Arc::new(service(&generator, &journal, None)), user());
        let loaded = session.load().await.unwrap();

        assert_eq!(loaded.len(), 1);
        assert_eq!(session.history(), loaded);
    }
}
