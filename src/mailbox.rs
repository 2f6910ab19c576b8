//! Single-slot notification mailbox.
//!
//! [`NotificationChannel`] holds at most one pending value. A `send` replaces
//! any value nobody has received yet, so a late receiver only ever sees the
//! latest notification, never a backlog. Receivers block on a condition
//! variable until the slot is filled, then drain it under the same lock.

use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

/// Thread-safe last-value-wins mailbox.
///
/// Multiple sends between two receives collapse into one: only the most
/// recent value is delivered. Each delivered value is consumed by exactly one
/// receiver.
pub struct NotificationChannel<T> {
    slot: Mutex<Option<T>>,
    ready: Condvar,
}

impl<T> NotificationChannel<T> {
    /// Creates an empty channel.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            slot: Mutex::new(None),
            ready: Condvar::new(),
        }
    }

    /// Stores `value`, replacing any unread value, and wakes one receiver.
    ///
    /// Never blocks beyond the short critical section.
    pub fn send(&self, value: T) {
        let mut slot = self.lock();
        *slot = Some(value);
        self.ready.notify_one();
    }

    /// Blocks until a value is available, then takes it.
    ///
    /// Spurious wakeups are absorbed: the slot is re-checked after every wake
    /// and the call only returns once it has taken a value.
    pub fn receive(&self) -> T {
        let mut slot = self.lock();
        loop {
            if let Some(value) = slot.take() {
                return value;
            }
            slot = self
                .ready
                .wait(slot)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }

    /// Like [`receive`](Self::receive), but gives up after `timeout`.
    ///
    /// Returns `None` if no value arrived in time.
    pub fn receive_timeout(&self, timeout: Duration) -> Option<T> {
        let deadline = Instant::now().checked_add(timeout);
        let mut slot = self.lock();
        loop {
            if let Some(value) = slot.take() {
                return Some(value);
            }
            // A timeout too large to represent as an Instant waits unbounded.
            let Some(deadline) = deadline else {
                slot = self
                    .ready
                    .wait(slot)
                    .unwrap_or_else(PoisonError::into_inner);
                continue;
            };
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return None;
            }
            slot = self
                .ready
                .wait_timeout(slot, remaining)
                .unwrap_or_else(PoisonError::into_inner)
                .0;
        }
    }

    /// Takes the pending value without blocking.
    pub fn try_receive(&self) -> Option<T> {
        self.lock().take()
    }

    /// Returns whether a value is waiting to be received.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.lock().is_some()
    }

    // The slot is a plain Option, so a peer that panicked while holding the
    // lock cannot have left it half-written.
    fn lock(&self) -> MutexGuard<'_, Option<T>> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<T> Default for NotificationChannel<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> std::fmt::Debug for NotificationChannel<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotificationChannel")
            .field("pending", &self.is_pending())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::thread;

    #[test]
    fn test_new_channel_is_empty() {
        let channel: NotificationChannel<u32> = NotificationChannel::new();
        assert!(!channel.is_pending());
        assert_eq!(channel.try_receive(), None);
    }

    #[test]
    fn test_send_then_receive() {
        let channel = NotificationChannel::new();
        channel.send(7);
        assert!(channel.is_pending());
        assert_eq!(channel.receive(), 7);
        assert!(!channel.is_pending());
    }

    #[test]
    fn test_second_send_replaces_first() {
        let channel = NotificationChannel::new();
        channel.send("first");
        channel.send("second");
        assert_eq!(channel.receive(), "second");
        assert_eq!(channel.try_receive(), None);
    }

    #[test]
    fn test_receive_moves_non_clone_value() {
        struct Token(String);

        let channel = NotificationChannel::new();
        channel.send(Token("green".to_string()));
        let Token(inner) = channel.receive();
        assert_eq!(inner, "green");
    }

    #[test]
    fn test_receive_timeout_expires_when_empty() {
        let channel: NotificationChannel<u8> = NotificationChannel::new();
        let started = Instant::now();
        assert_eq!(channel.receive_timeout(Duration::from_millis(30)), None);
        assert!(started.elapsed() >= Duration::from_millis(30));
    }

    #[test]
    fn test_receive_timeout_zero_drains_pending() {
        let channel = NotificationChannel::new();
        channel.send(1);
        assert_eq!(channel.receive_timeout(Duration::ZERO), Some(1));
    }

    #[test]
    fn test_receive_blocks_until_send() {
        let channel = Arc::new(NotificationChannel::new());
        let received = Arc::new(AtomicBool::new(false));

        let receiver = {
            let channel = Arc::clone(&channel);
            let received = Arc::clone(&received);
            thread::spawn(move || {
                let value = channel.receive();
                received.store(true, Ordering::SeqCst);
                value
            })
        };

        thread::sleep(Duration::from_millis(50));
        assert!(!received.load(Ordering::SeqCst), "receive returned before any send");

        channel.send(42);
        assert_eq!(receiver.join().unwrap(), 42);
    }

    #[test]
    fn test_value_not_redelivered_after_receive() {
        let channel = NotificationChannel::new();
        channel.send(1);
        assert_eq!(channel.receive(), 1);
        assert_eq!(channel.receive_timeout(Duration::from_millis(20)), None);
    }

    #[test]
    fn test_each_value_consumed_by_one_receiver() {
        let channel = Arc::new(NotificationChannel::new());
        let receivers: Vec<_> = (0..2)
            .map(|_| {
                let channel = Arc::clone(&channel);
                thread::spawn(move || channel.receive_timeout(Duration::from_millis(300)))
            })
            .collect();

        thread::sleep(Duration::from_millis(20));
        channel.send(5);

        let results: Vec<Option<i32>> = receivers.into_iter().map(|h| h.join().unwrap()).collect();
        assert_eq!(results.iter().filter(|r| r.is_some()).count(), 1);
        assert!(results.contains(&Some(5)));
    }

    #[test]
    fn test_survives_poisoned_lock() {
        let channel = Arc::new(NotificationChannel::new());
        let poisoner = Arc::clone(&channel);
        let _ = thread::spawn(move || {
            let _guard = poisoner.slot.lock().unwrap();
            panic!("poison the slot");
        })
        .join();

        channel.send(3);
        assert_eq!(channel.receive(), 3);
    }

    #[test]
    fn test_debug_output() {
        let channel = NotificationChannel::new();
        channel.send(1);
        let debug = format!("{channel:?}");
        assert!(debug.contains("NotificationChannel"));
        assert!(debug.contains("pending: true"));
    }

    proptest! {
        #[test]
        fn prop_receive_yields_last_send(values in proptest::collection::vec(any::<u64>(), 1..32)) {
            let channel = NotificationChannel::new();
            for value in &values {
                channel.send(*value);
            }
            prop_assert_eq!(channel.receive(), *values.last().unwrap());
            prop_assert_eq!(channel.try_receive(), None);
        }
    }
}
