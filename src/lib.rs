//! `trafficlight` - Intersection traffic light actor
//!
//! A [`PhaseActor`](phase::PhaseActor) toggles between red and green on its
//! own thread at randomized intervals and publishes each change on a
//! last-value-wins [`NotificationChannel`](mailbox::NotificationChannel).
//! Any number of threads can block until the light reaches a given phase.
//!
//! ```no_run
//! use trafficlight::phase::{Phase, PhaseActor};
//!
//! let light = PhaseActor::with_defaults();
//! light.start()?;
//! light.wait_for_phase(Phase::Green);
//! # Ok::<(), trafficlight::error::ActorError>(())
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod mailbox;
pub mod observability;
pub mod phase;
pub mod shutdown;
