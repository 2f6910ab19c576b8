//! Phase state representation
//!
//! Lock-free current phase plus toggle bookkeeping. The cycle loop is the only
//! writer; status queries from any thread read it through atomics.

use std::sync::Mutex;
use std::sync::PoisonError;
use std::sync::atomic::{AtomicU8, AtomicU64, Ordering};
use std::time::Instant;

use super::Phase;

/// Atomic phase cell shared between the cycle loop and status readers.
///
/// Uses `AtomicU8` for the current phase, `AtomicU64` for the number of
/// toggles so far, and `Mutex<Instant>` for the phase entry timestamp.
pub struct PhaseState {
    /// Current phase, encoded with `Phase::to_u8`
    current_phase: AtomicU8,
    /// Number of toggles since construction
    toggles: AtomicU64,
    /// Timestamp when the current phase was entered
    phase_entered_at: Mutex<Instant>,
}

impl PhaseState {
    /// Creates a new `PhaseState` in `initial`.
    #[must_use]
    pub fn new(initial: Phase) -> Self {
        Self {
            current_phase: AtomicU8::new(initial.to_u8()),
            toggles: AtomicU64::new(0),
            phase_entered_at: Mutex::new(Instant::now()),
        }
    }

    /// Returns the current phase.
    #[must_use]
    pub fn current_phase(&self) -> Phase {
        Phase::from_u8(self.current_phase.load(Ordering::SeqCst))
    }

    /// Returns how many times the phase has toggled.
    #[must_use]
    pub fn toggles(&self) -> u64 {
        self.toggles.load(Ordering::SeqCst)
    }

    /// Returns the instant when the current phase was entered.
    #[must_use]
    pub fn phase_entered_at(&self) -> Instant {
        *self
            .phase_entered_at
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Flips the phase and returns the newly entered phase.
    ///
    /// Also bumps the toggle counter and resets the phase entry timestamp.
    pub fn toggle(&self) -> Phase {
        // fetch_xor keeps the flip atomic even if a second writer ever appears.
        let previous = Phase::from_u8(self.current_phase.fetch_xor(1, Ordering::SeqCst));
        self.toggles.fetch_add(1, Ordering::SeqCst);
        *self
            .phase_entered_at
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Instant::now();
        previous.toggled()
    }
}

impl Default for PhaseState {
    fn default() -> Self {
        Self::new(Phase::default())
    }
}

impl std::fmt::Debug for PhaseState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PhaseState")
            .field("current_phase", &self.current_phase())
            .field("toggles", &self.toggles())
            .finish_non_exhaustive()
    }
}
