// SPDX-FileCopyrightText: 2026 Stoa Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Session-change subscriptions.
//!
//! [`SessionBroadcast`] is the handler registry identity providers use to
//! fan out [`SessionEvent`]s. Delivery is serialized: no two handlers run at
//! the same time, whichever thread emits.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::types::SessionEvent;

/// Callback invoked for every session change.
pub type SessionHandler = Box<dyn Fn(&SessionEvent) + Send + Sync>;

type SharedHandler = Arc<dyn Fn(&SessionEvent) + Send + Sync>;

/// Handle returned by a subscription. Dropping it unregisters the handler.
#[must_use = "dropping a Subscription immediately unregisters its handler"]
pub struct Subscription {
    unsubscribe: Option<Box<dyn FnOnce() + Send>>,
}

impl Subscription {
    /// Creates a subscription that runs `unsubscribe` exactly once when
    /// cancelled or dropped.
    pub fn new(unsubscribe: impl FnOnce() + Send + 'static) -> Self {
        Self {
            unsubscribe: Some(Box::new(unsubscribe)),
        }
    }

    /// Unregisters the handler now.
    pub fn unsubscribe(mut self) {
        self.run();
    }

    fn run(&mut self) {
        if let Some(f) = self.unsubscribe.take() {
            f();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.run();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.unsubscribe.is_some())
            .finish()
    }
}

#[derive(Default)]
struct Registry {
    handlers: Mutex<Vec<(u64, SharedHandler)>>,
    next_id: AtomicU64,
    delivery: Mutex<()>,
}

/// Registry of session-change handlers with sequential delivery.
///
/// Handlers must not call [`SessionBroadcast::emit`] themselves.
#[derive(Clone, Default)]
pub struct SessionBroadcast {
    registry: Arc<Registry>,
}

impl SessionBroadcast {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `handler` and returns the handle that unregisters it.
    pub fn subscribe(&self, handler: SessionHandler) -> Subscription {
        let id = self.registry.next_id.fetch_add(1, Ordering::Relaxed);
        lock(&self.registry.handlers).push((id, Arc::from(handler)));

        let registry = Arc::downgrade(&self.registry);
        Subscription::new(move || {
            if let Some(registry) = registry.upgrade() {
                lock(&registry.handlers).retain(|(handler_id, _)| *handler_id != id);
            }
        })
    }

    /// Delivers `event` to every registered handler, in registration order.
    pub fn emit(&self, event: &SessionEvent) {
        let _delivery = lock(&self.registry.delivery);
        let handlers: Vec<SharedHandler> = lock(&self.registry.handlers)
            .iter()
            .map(|(_, handler)| Arc::clone(handler))
            .collect();
        tracing::debug!(handlers = handlers.len(), "delivering session event");
        for handler in handlers {
            handler(event);
        }
    }

    /// Number of live subscriptions.
    pub fn subscriber_count(&self) -> usize {
        lock(&self.registry.handlers).len()
    }
}

impl std::fmt::Debug for SessionBroadcast {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionBroadcast")
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Session;
    use std::sync::atomic::AtomicUsize;

    #[test]
    fn handlers_receive_events_until_unsubscribed() {
        let broadcast = SessionBroadcast::new();
        let seen = Arc::new(Mutex::new(Vec::new()));

        let sink = Arc::clone(&seen);
        let sub = broadcast.subscribe(Box::new(move |event| {
            sink.lock().unwrap().push(event.clone());
        }));
        assert_eq!(broadcast.subscriber_count(), 1);

        broadcast.emit(&SessionEvent::SignedIn(Session::new("u1")));
        sub.unsubscribe();
        broadcast.emit(&SessionEvent::SignedOut);

        assert_eq!(broadcast.subscriber_count(), 0);
        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0], SessionEvent::SignedIn(Session::new("u1")));
    }

    #[test]
    fn dropping_subscription_unregisters() {
        let broadcast = SessionBroadcast::new();
        {
            let _sub = broadcast.subscribe(Box::new(|_| {}));
            assert_eq!(broadcast.subscriber_count(), 1);
        }
        assert_eq!(broadcast.subscriber_count(), 0);
    }

    #[test]
    fn delivery_is_never_concurrent() {
        let broadcast = SessionBroadcast::new();
        let active = Arc::new(AtomicUsize::new(0));
        let overlaps = Arc::new(AtomicUsize::new(0));
        let delivered = Arc::new(AtomicUsize::new(0));

        let (a, o, d) = (active.clone(), overlaps.clone(), delivered.clone());
        let _sub = broadcast.subscribe(Box::new(move |_| {
            if a.fetch_add(1, Ordering::SeqCst) > 0 {
                o.fetch_add(1, Ordering::SeqCst);
            }
            std::thread::sleep(std::time::Duration::from_millis(2));
            d.fetch_add(1, Ordering::SeqCst);
            a.fetch_sub(1, Ordering::SeqCst);
        }));

        let threads: Vec<_> = (0..4)
            .map(|_| {
                let b = broadcast.clone();
                std::thread::spawn(move || {
                    for _ in 0..5 {
                        b.emit(&SessionEvent::SignedOut);
                    }
                })
            })
            .collect();
        for t in threads {
            t.join().unwrap();
        }

        assert_eq!(delivered.load(Ordering::SeqCst), 20);
        assert_eq!(overlaps.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn subscription_outliving_broadcast_is_harmless() {
        let broadcast = SessionBroadcast::new();
        let sub = broadcast.subscribe(Box::new(|_| {}));
        drop(broadcast);
        sub.unsubscribe();
    }
}
