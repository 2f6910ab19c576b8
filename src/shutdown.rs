//! Blocking stop signal for background threads.
//!
//! Plays the role a `CancellationToken` plays for async tasks, for code that
//! runs on a plain OS thread: the thread sleeps on the signal instead of
//! `thread::sleep`, so cancelling wakes it immediately.

use std::sync::{Condvar, Mutex, PoisonError};
use std::time::Duration;

/// One-shot, sticky stop flag that sleeping threads can wait on.
#[derive(Debug, Default)]
pub struct StopSignal {
    stopped: Mutex<bool>,
    wake: Condvar,
}

impl StopSignal {
    /// Creates a signal in the running (not cancelled) state.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            stopped: Mutex::new(false),
            wake: Condvar::new(),
        }
    }

    /// Sets the flag and wakes every waiting thread. Idempotent.
    pub fn cancel(&self) {
        let mut stopped = self.stopped.lock().unwrap_or_else(PoisonError::into_inner);
        *stopped = true;
        self.wake.notify_all();
    }

    /// Returns whether [`cancel`](Self::cancel) has been called.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        *self.stopped.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Sleeps for up to `timeout`, returning early if cancelled.
    ///
    /// Returns `true` if the signal is cancelled.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        let stopped = self.stopped.lock().unwrap_or_else(PoisonError::into_inner);
        let (stopped, _) = self
            .wake
            .wait_timeout_while(stopped, timeout, |stopped| !*stopped)
            .unwrap_or_else(PoisonError::into_inner);
        *stopped
    }
}
