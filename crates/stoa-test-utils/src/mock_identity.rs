// SPDX-FileCopyrightText: 2026 Stoa Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory identity provider.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use tokio::sync::Mutex;

use stoa_core::subscription::{SessionBroadcast, SessionHandler, Subscription};
use stoa_core::traits::adapter::PluginAdapter;
use stoa_core::traits::identity::IdentityProvider;
use stoa_core::types::{AdapterType, HealthStatus, Session, SessionEvent, SignUpOutcome};
use stoa_core::StoaError;

const MIN_PASSWORD_CHARS: usize = 6;

struct Account {
    password: String,
    user_id: String,
}

/// An identity provider holding accounts in memory.
///
/// Mirrors the hosted provider's behaviour closely enough for flow tests:
/// duplicate emails and short passwords are rejected on sign-up, and every
/// session change is broadcast to subscribers.
pub struct MockIdentity {
    accounts: Mutex<HashMap<String, Account>>,
    current: Mutex<Option<Session>>,
    broadcast: SessionBroadcast,
    require_confirmation: bool,
    next_user: AtomicU64,
}

impl MockIdentity {
    pub fn new() -> Self {
        Self {
            accounts: Mutex::new(HashMap::new()),
            current: Mutex::new(None),
            broadcast: SessionBroadcast::new(),
            require_confirmation: false,
            next_user: AtomicU64::new(1),
        }
    }

    /// Adds an existing account.
    pub fn with_account(mut self, email: &str, password: &str, user_id: &str) -> Self {
        self.accounts.get_mut().insert(
            email.to_string(),
            Account {
                password: password.to_string(),
                user_id: user_id.to_string(),
            },
        );
        self
    }

    /// Starts with `session` already active.
    pub fn with_session(mut self, session: Session) -> Self {
        *self.current.get_mut() = Some(session);
        self
    }

    /// When set, sign-up leaves the account pending email confirmation.
    pub fn require_confirmation(mut self, require: bool) -> Self {
        self.require_confirmation = require;
        self
    }

    /// Delivers `event` to subscribers, as a token refresh or a sign-out
    /// from another device would.
    pub fn emit(&self, event: &SessionEvent) {
        self.broadcast.emit(event);
    }

    pub fn subscriber_count(&self) -> usize {
        self.broadcast.subscriber_count()
    }

    async fn activate(&self, user_id: &str, email: &str) -> Session {
        let session = Session {
            email: Some(email.to_string()),
            ..Session::new(user_id)
        };
        *self.current.lock().await = Some(session.clone());
        self.broadcast.emit(&SessionEvent::SignedIn(session.clone()));
        session
    }
}

impl Default for MockIdentity {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PluginAdapter for MockIdentity {
    fn name(&self) -> &str {
        "mock-identity"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Identity
    }

    async fn health_check(&self) -> Result<HealthStatus, StoaError> {
        Ok(HealthStatus::Healthy)
    }
}

#[async_trait]
impl IdentityProvider for MockIdentity {
    async fn sign_in(&self, email: &str, password: &SecretString) -> Result<Session, StoaError> {
        let user_id = {
            let accounts = self.accounts.lock().await;
            match accounts.get(email) {
                Some(account) if account.password == password.expose_secret() => {
                    account.user_id.clone()
                }
                _ => return Err(StoaError::Auth("invalid login credentials".to_string())),
            }
        };
        Ok(self.activate(&user_id, email).await)
    }

    async fn sign_up(
        &self,
        email: &str,
        password: &SecretString,
        _profile: Option<serde_json::Value>,
    ) -> Result<SignUpOutcome, StoaError> {
        if password.expose_secret().chars().count() < MIN_PASSWORD_CHARS {
            return Err(StoaError::Auth(format!(
                "password should be at least {MIN_PASSWORD_CHARS} characters"
            )));
        }

        let user_id = {
            let mut accounts = self.accounts.lock().await;
            if accounts.contains_key(email) {
                return Err(StoaError::Auth("user already registered".to_string()));
            }
            let user_id = format!("user-{}", self.next_user.fetch_add(1, Ordering::SeqCst));
            accounts.insert(
                email.to_string(),
                Account {
                    password: password.expose_secret().to_string(),
                    user_id: user_id.clone(),
                },
            );
            user_id
        };

        if self.require_confirmation {
            return Ok(SignUpOutcome::ConfirmationPending);
        }
        Ok(SignUpOutcome::Session(self.activate(&user_id, email).await))
    }

    async fn current_session(&self) -> Result<Option<Session>, StoaError> {
        Ok(self.current.lock().await.clone())
    }

    fn subscribe(&self, handler: SessionHandler) -> Subscription {
        self.broadcast.subscribe(handler)
    }

    async fn sign_out(&self) -> Result<(), StoaError> {
        *self.current.lock().await = None;
        self.broadcast.emit(&SessionEvent::SignedOut);
        Ok(())
    }
}
