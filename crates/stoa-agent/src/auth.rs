// SPDX-FileCopyrightText: 2026 Stoa Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Combined sign-in / registration flow.

use secrecy::SecretString;
use stoa_core::traits::IdentityProvider;
use stoa_core::types::{Session, SignUpOutcome};
use stoa_core::StoaError;
use tracing::{debug, info};

/// How [`sign_in_or_register`] ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthOutcome {
    SignedIn(Session),
    /// A new account was created and is already signed in.
    Registered(Session),
    /// A new account was created; the email must be confirmed before use.
    ConfirmationPending,
}

impl AuthOutcome {
    pub fn session(&self) -> Option<&Session> {
        match self {
            AuthOutcome::SignedIn(s) | AuthOutcome::Registered(s) => Some(s),
            AuthOutcome::ConfirmationPending => None,
        }
    }
}

/// Signs in with `email` and `password`, registering a new account with the
/// same credentials when sign-in fails.
///
/// When both attempts fail the sign-up error is returned, since it is the
/// more specific of the two (e.g. a weak password).
pub async fn sign_in_or_register(
    provider: &dyn IdentityProvider,
    email: &str,
    password: &SecretString,
) -> Result<AuthOutcome, StoaError> {
    let email = email.trim();
    if email.is_empty() {
        return Err(StoaError::Auth("an email address is required".to_string()));
    }

    match provider.sign_in(email, password).await {
        Ok(session) => {
            info!(user_id = %session.user_id, "signed in");
            return Ok(AuthOutcome::SignedIn(session));
        }
        Err(e) => debug!(error = %e, "sign-in failed, trying registration"),
    }

    match provider.sign_up(email, password, None).await? {
        SignUpOutcome::Session(session) => {
            info!(user_id = %session.user_id, "registered and signed in");
            Ok(AuthOutcome::Registered(session))
        }
        SignUpOutcome::ConfirmationPending => {
            info!("registered, awaiting email confirmation");
            Ok(AuthOutcome::ConfirmationPending)
        }
    }
}
