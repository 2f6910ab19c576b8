//! Configuration schema
//!
//! Two layers: [`ConfigFile`] mirrors the YAML document (durations as
//! humantime strings, everything optional), [`LightConfig`] is the resolved
//! form the actor consumes.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::phase::CycleBounds;
use crate::phase::cycle::{DEFAULT_MAX_CYCLE, DEFAULT_MIN_CYCLE};

/// Default polling granularity of the cycle loop.
pub const DEFAULT_TICK: Duration = Duration::from_millis(100);

// ============================================================================
// File Schema
// ============================================================================

/// Top-level YAML document.
///
/// ```yaml
/// light:
///   min_cycle: 4s
///   max_cycle: 6s
///   tick: 100ms
///   seed: 42
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    /// Light timing settings
    #[serde(default)]
    pub light: LightSection,
}

/// `light:` section of the configuration file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LightSection {
    /// Shortest cycle, as a humantime duration (`"4s"`, `"3500ms"`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_cycle: Option<String>,

    /// Longest cycle, as a humantime duration
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_cycle: Option<String>,

    /// Loop polling granularity, as a humantime duration
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tick: Option<String>,

    /// RNG seed for cycle durations; random when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

// ============================================================================
// Resolved Config
// ============================================================================

/// Resolved light timing configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LightConfig {
    /// Shortest cycle duration
    pub min_cycle: Duration,
    /// Longest cycle duration
    pub max_cycle: Duration,
    /// Upper bound on a single sleep of the cycle loop
    pub tick: Duration,
    /// RNG seed; `None` picks one at construction
    pub seed: Option<u64>,
}

impl Default for LightConfig {
    fn default() -> Self {
        Self {
            min_cycle: DEFAULT_MIN_CYCLE,
            max_cycle: DEFAULT_MAX_CYCLE,
            tick: DEFAULT_TICK,
            seed: None,
        }
    }
}

impl LightConfig {
    /// Returns the cycle interval as [`CycleBounds`].
    #[must_use]
    pub fn cycle_bounds(&self) -> CycleBounds {
        CycleBounds::new(self.min_cycle, self.max_cycle)
    }

    /// Returns a copy with every `Some` field of `overrides` applied.
    #[must_use]
    pub fn with_overrides(self, overrides: &LightOverrides) -> Self {
        Self {
            min_cycle: overrides.min_cycle.unwrap_or(self.min_cycle),
            max_cycle: overrides.max_cycle.unwrap_or(self.max_cycle),
            tick: overrides.tick.unwrap_or(self.tick),
            seed: overrides.seed.or(self.seed),
        }
    }
}

/// Command-line overrides layered on top of a file or the defaults.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LightOverrides {
    /// Replacement for `min_cycle`
    pub min_cycle: Option<Duration>,
    /// Replacement for `max_cycle`
    pub max_cycle: Option<Duration>,
    /// Replacement for `tick`
    pub tick: Option<Duration>,
    /// Replacement for `seed`
    pub seed: Option<u64>,
}

impl LightOverrides {
    /// Returns whether no override is set.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.min_cycle.is_none()
            && self.max_cycle.is_none()
            && self.tick.is_none()
            && self.seed.is_none()
    }
}
