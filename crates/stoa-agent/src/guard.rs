// SPDX-FileCopyrightText: 2026 Stoa Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Single-flight guard shared by the stateful session types.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use stoa_core::StoaError;

/// Marks one operation as in flight until dropped.
///
/// Dropping the owning future releases the flag, so a cancelled submission
/// never leaves its session stuck in the busy state.
pub(crate) struct InFlight<'a> {
    flag: &'a AtomicBool,
}

impl<'a> InFlight<'a> {
    /// Claims `flag`, failing with [`StoaError::Busy`] if it is already held.
    pub(crate) fn acquire(flag: &'a AtomicBool) -> Result<Self, StoaError> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| StoaError::Busy)?;
        Ok(Self { flag })
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

/// Locks `mutex`, recovering the data if a previous holder panicked.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use stoa_core::ErrorKind;

    #[test]
    fn second_acquire_is_busy_until_release() {
        let flag = AtomicBool::new(false);
        let first = InFlight::acquire(&flag).unwrap();
        let err = InFlight::acquire(&flag).err().unwrap();
        assert_eq!(err.kind(), ErrorKind::Busy);

        drop(first);
        assert!(InFlight::acquire(&flag).is_ok());
    }
}
