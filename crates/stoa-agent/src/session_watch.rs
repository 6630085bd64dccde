// SPDX-FileCopyrightText: 2026 Stoa Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Tracks the signed-in session for a UI shell.

use std::sync::{Arc, Mutex};

use stoa_core::subscription::{SessionBroadcast, SessionHandler, Subscription};
use stoa_core::traits::IdentityProvider;
use stoa_core::types::{Session, SessionEvent, UserId};
use stoa_core::StoaError;
use tracing::debug;

use crate::guard::lock;

#[derive(Default)]
struct Watched {
    session: Option<Session>,
    /// Set once an event has been applied; the initial read must not
    /// overwrite a newer event.
    updated: bool,
}

struct WatchState {
    watched: Mutex<Watched>,
    listeners: SessionBroadcast,
}

impl WatchState {
    fn apply(&self, event: &SessionEvent) {
        {
            let mut watched = lock(&self.watched);
            watched.session = event.session().cloned();
            watched.updated = true;
        }
        debug!(signed_in = event.session().is_some(), "session changed");
        self.listeners.emit(event);
    }
}

/// The current session of an identity provider, kept up to date from its
/// change notifications.
///
/// Listeners registered through [`SessionWatch::subscribe`] are called one
/// at a time, after the watch itself has been updated.
pub struct SessionWatch {
    state: Arc<WatchState>,
    _subscription: Subscription,
}

impl SessionWatch {
    /// Subscribes to `provider` and reads its current session.
    pub async fn start(provider: &dyn IdentityProvider) -> Result<Self, StoaError> {
        let state = Arc::new(WatchState {
            watched: Mutex::new(Watched::default()),
            listeners: SessionBroadcast::new(),
        });

        let handler_state = Arc::clone(&state);
        let subscription = provider.subscribe(Box::new(move |event| handler_state.apply(event)));

        let initial = provider.current_session().await?;
        {
            let mut watched = lock(&state.watched);
            if !watched.updated {
                watched.session = initial;
            }
        }

        Ok(Self {
            state,
            _subscription: subscription,
        })
    }

    pub fn current(&self) -> Option<Session> {
        lock(&self.state.watched).session.clone()
    }

    pub fn user_id(&self) -> Option<UserId> {
        self.current().map(|s| s.user_id)
    }

    pub fn is_signed_in(&self) -> bool {
        lock(&self.state.watched).session.is_some()
    }

    /// Registers a listener for later session changes.
    pub fn subscribe(&self, handler: SessionHandler) -> Subscription {
        self.state.listeners.subscribe(handler)
    }
}
