//! Traffic light phase machine
//!
//! A [`PhaseActor`] toggles between [`Phase::Red`] and [`Phase::Green`] on a
//! background thread at randomized intervals and publishes every change on a
//! last-value-wins [`NotificationChannel`](crate::mailbox::NotificationChannel).
//!
//! # Architecture
//!
//! - [`PhaseState`]: Atomic current phase, toggle counter, phase timing
//! - [`CycleTimer`]: Per-actor seeded RNG drawing cycle durations
//! - [`PhaseActor`]: Owns the state and mailbox, runs the cycle loop, serves waiters

pub mod actor;
pub mod cycle;
pub mod state;

pub use actor::PhaseActor;
pub use cycle::{CycleBounds, CycleTimer};
pub use state::PhaseState;

use serde::{Deserialize, Serialize};

/// Signal phase of a traffic light.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    /// Traffic must stop. Every light starts here.
    #[default]
    Red,
    /// Traffic may proceed.
    Green,
}

impl Phase {
    /// Returns the opposite phase.
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Red => Self::Green,
            Self::Green => Self::Red,
        }
    }

    /// Returns the lowercase name of the phase.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Red => "red",
            Self::Green => "green",
        }
    }

    pub(crate) const fn to_u8(self) -> u8 {
        match self {
            Self::Red => 0,
            Self::Green => 1,
        }
    }

    // Only values produced by `to_u8` are ever stored.
    pub(crate) const fn from_u8(raw: u8) -> Self {
        if raw == 0 { Self::Red } else { Self::Green }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
