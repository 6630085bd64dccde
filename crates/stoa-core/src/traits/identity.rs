// SPDX-FileCopyrightText: 2026 Stoa Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Identity provider trait for sign-in, sign-up and session tracking.

use async_trait::async_trait;
use secrecy::SecretString;

use crate::error::StoaError;
use crate::subscription::{SessionHandler, Subscription};
use crate::traits::adapter::PluginAdapter;
use crate::types::{Session, SignUpOutcome};

/// Adapter for the external identity provider.
///
/// Providers deliver session changes to subscribers one at a time, never
/// concurrently; [`crate::SessionBroadcast`] implements that contract.
#[async_trait]
pub trait IdentityProvider: PluginAdapter {
    /// Signs in with email and password.
    async fn sign_in(&self, email: &str, password: &SecretString) -> Result<Session, StoaError>;

    /// Creates an account. `profile` is optional provider-specific user data.
    async fn sign_up(
        &self,
        email: &str,
        password: &SecretString,
        profile: Option<serde_json::Value>,
    ) -> Result<SignUpOutcome, StoaError>;

    /// Returns the currently active session, if any.
    async fn current_session(&self) -> Result<Option<Session>, StoaError>;

    /// Registers a handler for session changes. Dropping the returned
    /// [`Subscription`] unregisters it.
    fn subscribe(&self, handler: SessionHandler) -> Subscription;

    /// Ends the current session.
    async fn sign_out(&self) -> Result<(), StoaError>;
}
