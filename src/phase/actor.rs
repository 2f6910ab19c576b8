//! Phase actor orchestration
//!
//! The `PhaseActor` owns the phase state and the notification mailbox, runs
//! the background cycle loop, and serves callers blocked waiting for a phase.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use tracing::{debug, info, trace, warn};

use crate::config::LightConfig;
use crate::error::ActorError;
use crate::mailbox::NotificationChannel;
use crate::shutdown::StopSignal;

use super::Phase;
use super::cycle::{CycleBounds, CycleTimer};
use super::state::PhaseState;

/// Name given to the background cycle thread.
pub const CYCLE_THREAD_NAME: &str = "phase-cycle";

/// Traffic light actor toggling between red and green.
///
/// Coordinates:
/// - Randomized cycle durations from a per-actor seeded RNG
/// - A background thread that toggles the phase at each cycle boundary
/// - Publication of every new phase on a last-value-wins mailbox
/// - Blocking waits for a specific phase
///
/// The cycle loop is the only writer of the phase and the only sender on the
/// mailbox. Callers of [`wait_for_phase`](Self::wait_for_phase) are the only
/// receivers. Each published phase is consumed by one receiver, so concurrent
/// waiters compete for notifications.
pub struct PhaseActor {
    /// Current phase, written by the cycle loop only
    state: Arc<PhaseState>,
    /// Phase-change notifications
    channel: Arc<NotificationChannel<Phase>>,
    /// Stops the cycle loop
    stop: Arc<StopSignal>,
    /// Upper bound on one sleep of the cycle loop
    tick: Duration,
    /// Seed of the cycle RNG
    seed: u64,
    /// Cycle bounds the timer draws from
    bounds: CycleBounds,
    /// Cycle RNG, moved into the loop thread on start
    timer: Mutex<Option<CycleTimer>>,
    /// Handle of the running cycle thread
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl PhaseActor {
    /// Creates an actor in [`Phase::Red`] with an empty mailbox.
    ///
    /// The cycle loop does not run until [`start`](Self::start) is called.
    /// Without a configured seed one is drawn from the thread RNG and logged.
    #[must_use]
    pub fn new(config: &LightConfig) -> Self {
        let seed = config.seed.unwrap_or_else(rand::random);
        let bounds = config.cycle_bounds();
        debug!(
            seed,
            min_cycle = ?bounds.min,
            max_cycle = ?bounds.max,
            tick = ?config.tick,
            "phase actor created"
        );

        Self {
            state: Arc::new(PhaseState::new(Phase::Red)),
            channel: Arc::new(NotificationChannel::new()),
            stop: Arc::new(StopSignal::new()),
            tick: config.tick,
            seed,
            bounds,
            timer: Mutex::new(Some(CycleTimer::new(bounds, seed))),
            handle: Mutex::new(None),
        }
    }

    /// Creates an actor with 4–6 second cycles and a 100 ms tick.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(&LightConfig::default())
    }

    /// Spawns the background cycle loop and returns immediately.
    ///
    /// # Errors
    ///
    /// Returns [`ActorError::Stopped`] once [`shutdown`](Self::shutdown) has
    /// been called, [`ActorError::AlreadyStarted`] if the loop was started
    /// before, and [`ActorError::Spawn`] if the OS refuses to create the
    /// thread. A failed spawn is not retryable.
    pub fn start(&self) -> Result<(), ActorError> {
        if self.stop.is_cancelled() {
            return Err(ActorError::Stopped);
        }
        let Some(timer) = lock(&self.timer).take() else {
            return Err(ActorError::AlreadyStarted);
        };

        let cycle_loop = CycleLoop {
            state: Arc::clone(&self.state),
            channel: Arc::clone(&self.channel),
            stop: Arc::clone(&self.stop),
            tick: self.tick,
            timer,
        };

        let handle = thread::Builder::new()
            .name(CYCLE_THREAD_NAME.to_string())
            .spawn(move || cycle_loop.run())
            .map_err(ActorError::Spawn)?;

        *lock(&self.handle) = Some(handle);
        info!(seed = self.seed, "phase cycle started");
        Ok(())
    }

    /// Blocks until a published phase equal to `target` is received.
    ///
    /// Every phase received on the way is consumed and discarded, including
    /// the matching one. Phases published while this call was not receiving
    /// may be skipped, and a concurrent waiter may take the notification this
    /// call was waiting for. There is no timeout.
    pub fn wait_for_phase(&self, target: Phase) {
        loop {
            let phase = self.channel.receive();
            if phase == target {
                trace!(%phase, "target phase received");
                return;
            }
            trace!(%phase, %target, "discarding phase");
        }
    }

    /// Like [`wait_for_phase`](Self::wait_for_phase), but gives up after `timeout`.
    ///
    /// Returns `true` if `target` was received in time.
    pub fn wait_for_phase_timeout(&self, target: Phase, timeout: Duration) -> bool {
        let Some(deadline) = Instant::now().checked_add(timeout) else {
            self.wait_for_phase(target);
            return true;
        };

        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.channel.receive_timeout(remaining) {
                Some(phase) if phase == target => return true,
                Some(phase) => trace!(%phase, %target, "discarding phase"),
                None => return false,
            }
        }
    }

    /// Returns the current phase.
    #[must_use]
    pub fn current_phase(&self) -> Phase {
        self.state.current_phase()
    }

    /// Returns how many times the phase has toggled.
    #[must_use]
    pub fn toggles(&self) -> u64 {
        self.state.toggles()
    }

    /// Returns the instant the current phase was entered.
    #[must_use]
    pub fn phase_entered_at(&self) -> Instant {
        self.state.phase_entered_at()
    }

    /// Returns whether the cycle loop is running.
    #[must_use]
    pub fn is_running(&self) -> bool {
        lock(&self.handle)
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Returns the seed of the cycle RNG.
    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.seed
    }

    /// Returns the polling tick of the cycle loop.
    #[must_use]
    pub const fn tick(&self) -> Duration {
        self.tick
    }

    /// Returns the cycle bounds.
    #[must_use]
    pub const fn cycle_bounds(&self) -> CycleBounds {
        self.bounds
    }

    /// Stops the cycle loop and waits for its thread to exit.
    ///
    /// Returns within about one tick. No phase is published after this
    /// returns. Callers blocked in [`wait_for_phase`](Self::wait_for_phase)
    /// are not woken.
    pub fn shutdown(&self) {
        self.stop.cancel();
        let handle = lock(&self.handle).take();
        if let Some(handle) = handle {
            if handle.join().is_err() {
                warn!("phase cycle thread panicked");
            }
        }
    }
}

impl Drop for PhaseActor {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl std::fmt::Debug for PhaseActor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PhaseActor")
            .field("current_phase", &self.state.current_phase())
            .field("toggles", &self.state.toggles())
            .field("seed", &self.seed)
            .field("running", &self.is_running())
            .finish_non_exhaustive()
    }
}

/// State moved into the background thread.
struct CycleLoop {
    state: Arc<PhaseState>,
    channel: Arc<NotificationChannel<Phase>>,
    stop: Arc<StopSignal>,
    tick: Duration,
    timer: CycleTimer,
}

impl CycleLoop {
    fn run(mut self) {
        let mut cycle = self.timer.next_cycle();
        let mut cycle_started = Instant::now();
        debug!(?cycle, "first cycle drawn");

        while !self.stop.is_cancelled() {
            let elapsed = cycle_started.elapsed();
            if elapsed >= cycle {
                publish_toggle(&self.state, &self.channel, cycle);
                cycle_started = Instant::now();
                cycle = self.timer.next_cycle();
                continue;
            }

            // Never sleep past the cycle boundary, never longer than a tick.
            if self.stop.wait_timeout((cycle - elapsed).min(self.tick)) {
                break;
            }
        }
        debug!(toggles = self.state.toggles(), "phase cycle stopped");
    }
}

/// Toggles the phase, then publishes the newly entered phase.
///
/// The send always carries the value assigned just before it.
fn publish_toggle(
    state: &PhaseState,
    channel: &NotificationChannel<Phase>,
    cycle: Duration,
) -> Phase {
    let phase = state.toggle();
    info!(%phase, ?cycle, "phase changed");
    channel.send(phase);
    phase
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
