// SPDX-FileCopyrightText: 2026 Stoa Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Multi-turn chat with the mentor.
//!
//! [`ConversationLog`] is the ordered, append-only record of what the user
//! sees. [`Conversation`] drives one exchange at a time over it:
//! Idle -> Sending -> {Succeeded, Failed} -> Idle.

use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

use secrecy::{ExposeSecret, SecretString};
use stoa_context::NO_REMARKS;
use stoa_core::traits::{GenerationAdapter, JournalStore};
use stoa_core::types::{ApiKey, ConversationMessage, JournalEntry, Role, UserId};
use stoa_core::StoaError;
use tracing::{debug, warn};

use crate::guard::{lock, InFlight};
use crate::reflection::{stored_note, SaveStatus};

/// A message as shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggedMessage {
    pub message: ConversationMessage,
    /// False for local seed text (such as the greeting) that the service
    /// never sees.
    pub submittable: bool,
}

/// Ordered conversation log.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConversationLog {
    messages: Vec<LoggedMessage>,
}

impl ConversationLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// A log opening with a local model greeting.
    pub fn with_greeting(text: impl Into<String>) -> Self {
        Self {
            messages: vec![LoggedMessage {
                message: ConversationMessage::model(text),
                submittable: false,
            }],
        }
    }

    /// Rebuilds a log from persisted entries, oldest first.
    pub fn from_entries(entries: &[JournalEntry]) -> Self {
        let mut log = Self::new();
        for entry in entries {
            let input = entry
                .user_input
                .as_deref()
                .and_then(stored_note)
                .unwrap_or(NO_REMARKS);
            log.append(ConversationMessage::user(input));
            log.append(ConversationMessage::model(entry.model_response.clone()));
        }
        log
    }

    pub fn append(&mut self, message: ConversationMessage) {
        self.messages.push(LoggedMessage {
            message,
            submittable: true,
        });
    }

    pub fn messages(&self) -> &[LoggedMessage] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// The answered part of the log, as the service expects it.
    ///
    /// Seed messages and leading model turns are dropped, a user turn with
    /// no reply after it is skipped (the trailing pending one included), so
    /// the result alternates user/model and starts with a user turn.
    pub fn to_service_history(&self) -> Result<Vec<ConversationMessage>, StoaError> {
        let mut history = Vec::with_capacity(self.messages.len());
        let mut pending: Option<&ConversationMessage> = None;
        let mut saw_user = false;

        for logged in self.messages.iter().filter(|m| m.submittable) {
            match logged.message.role {
                Role::User => {
                    saw_user = true;
                    pending = Some(&logged.message);
                }
                Role::Model => {
                    if let Some(user) = pending.take() {
                        history.push(user.clone());
                        history.push(logged.message.clone());
                    }
                }
            }
        }

        if !saw_user {
            return Err(StoaError::Conversation(
                "conversation has no user turn to send".to_string(),
            ));
        }
        Ok(history)
    }
}

/// States of a [`Conversation`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConversationState {
    /// Ready for the next message.
    Idle,
    /// Waiting on the generation service.
    Sending,
    /// The last exchange produced a reply.
    Succeeded,
    /// The last exchange failed; the user turn stays visible.
    Failed,
}

impl std::fmt::Display for ConversationState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConversationState::Idle => write!(f, "idle"),
            ConversationState::Sending => write!(f, "sending"),
            ConversationState::Succeeded => write!(f, "succeeded"),
            ConversationState::Failed => write!(f, "failed"),
        }
    }
}

/// A reply to one chat message.
#[derive(Debug)]
pub struct ChatReply {
    pub text: String,
    pub saved: SaveStatus,
}

/// Drives a multi-turn chat, one exchange at a time.
pub struct Conversation {
    generator: Arc<dyn GenerationAdapter>,
    api_key: Option<SecretString>,
    journal: Option<(Arc<dyn JournalStore>, UserId)>,
    log: Mutex<ConversationLog>,
    state: Mutex<ConversationState>,
    in_flight: AtomicBool,
}

impl Conversation {
    pub fn new(generator: Arc<dyn GenerationAdapter>, api_key: Option<SecretString>) -> Self {
        Self {
            generator,
            api_key,
            journal: None,
            log: Mutex::new(ConversationLog::new()),
            state: Mutex::new(ConversationState::Idle),
            in_flight: AtomicBool::new(false),
        }
    }

    /// Starts from an existing log, e.g. one seeded with a greeting.
    pub fn with_log(mut self, log: ConversationLog) -> Self {
        self.log = Mutex::new(log);
        self
    }

    /// Records every successful exchange as a journal entry for `user_id`.
    pub fn persist_turns(mut self, journal: Arc<dyn JournalStore>, user_id: UserId) -> Self {
        self.journal = Some((journal, user_id));
        self
    }

    pub fn state(&self) -> ConversationState {
        *lock(&self.state)
    }

    /// Snapshot of the log.
    pub fn log(&self) -> ConversationLog {
        lock(&self.log).clone()
    }

    /// Sends `text` as the next user turn.
    ///
    /// Blank text is sent as a placeholder. On failure the user turn stays
    /// in the log without a reply and the conversation returns to idle, so
    /// the user may resubmit.
    pub async fn send(&self, text: &str) -> Result<ChatReply, StoaError> {
        let _exchange = Exchange {
            conversation: self,
            _in_flight: InFlight::acquire(&self.in_flight)?,
        };
        let api_key = ApiKey::parse(self.api_key.as_ref().map(|k| k.expose_secret()))?;
        let message = stored_note(text).unwrap_or(NO_REMARKS).to_string();

        let history = {
            let mut log = lock(&self.log);
            log.append(ConversationMessage::user(message.clone()));
            log.to_service_history()?
        };
        self.transition(ConversationState::Sending);

        let result = self.generator.chat(&api_key, &history, &message).await;
        let reply = match result {
            Ok(reply) => reply,
            Err(e) => {
                warn!(error = %e, "chat turn failed");
                self.finish(ConversationState::Failed);
                return Err(e);
            }
        };

        lock(&self.log).append(ConversationMessage::model(reply.clone()));

        let saved = match &self.journal {
            Some((journal, user_id)) => {
                match journal
                    .record_exchange(user_id, stored_note(text), &reply)
                    .await
                {
                    Ok(entry) => SaveStatus::Saved(entry),
                    Err(e) => {
                        warn!(user_id = %user_id, error = %e, "chat turn not saved");
                        SaveStatus::NotSaved(e)
                    }
                }
            }
            None => SaveStatus::NotRequested,
        };

        self.finish(ConversationState::Succeeded);
        Ok(ChatReply { text: reply, saved })
    }

    fn transition(&self, next: ConversationState) {
        let mut state = lock(&self.state);
        debug!(from = %*state, to = %next, "conversation state transition");
        *state = next;
    }

    fn finish(&self, outcome: ConversationState) {
        self.transition(outcome);
        self.transition(ConversationState::Idle);
    }
}

/// One exchange in progress. Dropping it mid-flight returns the
/// conversation to idle.
struct Exchange<'a> {
    conversation: &'a Conversation,
    _in_flight: InFlight<'a>,
}

impl Drop for Exchange<'_> {
    fn drop(&mut self) {
        let mut state = lock(&self.conversation.state);
        if *state == ConversationState::Sending {
            *state = ConversationState::Idle;
        }
    }
}
