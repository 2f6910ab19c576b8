//! Configuration validation
//!
//! Resolves a [`LightSection`] into a [`LightConfig`] and checks the result
//! semantically. Validation collects every issue instead of stopping at the
//! first one.

use std::time::Duration;

use crate::config::schema::{LightConfig, LightSection};
use crate::error::{Severity, ValidationIssue};

/// Ticks above this make shutdown noticeably sluggish.
const MAX_RECOMMENDED_TICK: Duration = Duration::from_secs(1);

// ============================================================================
// Public API
// ============================================================================

/// Result of configuration validation.
#[derive(Debug, Default)]
pub struct ValidationResult {
    /// Validation errors (prevent loading).
    pub errors: Vec<ValidationIssue>,

    /// Validation warnings (informational).
    pub warnings: Vec<ValidationIssue>,
}

impl ValidationResult {
    /// Returns `true` if there are any errors.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Returns `true` if validation passed (no errors).
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Configuration validator.
#[derive(Debug, Default)]
pub struct Validator {
    errors: Vec<ValidationIssue>,
    warnings: Vec<ValidationIssue>,
}

impl Validator {
    /// Creates a new validator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolves a file section against the defaults, then validates it.
    ///
    /// Fields whose duration string does not parse are reported as errors and
    /// left at their default in the returned config.
    pub fn validate_section(&mut self, section: &LightSection) -> (LightConfig, ValidationResult) {
        self.errors.clear();
        self.warnings.clear();

        let defaults = LightConfig::default();
        let config = LightConfig {
            min_cycle: self.duration_field(
                "light.min_cycle",
                section.min_cycle.as_deref(),
                defaults.min_cycle,
            ),
            max_cycle: self.duration_field(
                "light.max_cycle",
                section.max_cycle.as_deref(),
                defaults.max_cycle,
            ),
            tick: self.duration_field("light.tick", section.tick.as_deref(), defaults.tick),
            seed: section.seed,
        };

        self.check(&config);
        (config, self.take_result())
    }

    /// Validates an already resolved configuration.
    pub fn validate(&mut self, config: &LightConfig) -> ValidationResult {
        self.errors.clear();
        self.warnings.clear();
        self.check(config);
        self.take_result()
    }

    fn check(&mut self, config: &LightConfig) {
        if config.min_cycle.is_zero() {
            self.error("light.min_cycle", "minimum cycle must be greater than zero");
        } else if config.min_cycle < config.tick {
            self.error(
                "light.min_cycle",
                format!(
                    "minimum cycle ({}) is shorter than the tick ({})",
                    humantime::format_duration(config.min_cycle),
                    humantime::format_duration(config.tick),
                ),
            );
        }
        if config.min_cycle > config.max_cycle {
            self.error(
                "light.max_cycle",
                format!(
                    "maximum cycle ({}) is shorter than minimum cycle ({})",
                    humantime::format_duration(config.max_cycle),
                    humantime::format_duration(config.min_cycle),
                ),
            );
        }
        if config.tick.is_zero() {
            self.error("light.tick", "tick must be greater than zero");
        } else if config.tick > MAX_RECOMMENDED_TICK {
            self.warning(
                "light.tick",
                format!(
                    "tick of {} delays shutdown by up to one tick",
                    humantime::format_duration(config.tick)
                ),
            );
        }
    }

    fn duration_field(&mut self, path: &str, raw: Option<&str>, default: Duration) -> Duration {
        let Some(raw) = raw else {
            return default;
        };
        match humantime::parse_duration(raw.trim()) {
            Ok(duration) => duration,
            Err(e) => {
                self.error(path, format!("invalid duration '{raw}': {e}"));
                default
            }
        }
    }

    fn error(&mut self, path: &str, message: impl Into<String>) {
        self.errors.push(ValidationIssue {
            path: path.to_string(),
            message: message.into(),
            severity: Severity::Error,
        });
    }

    fn warning(&mut self, path: &str, message: impl Into<String>) {
        self.warnings.push(ValidationIssue {
            path: path.to_string(),
            message: message.into(),
            severity: Severity::Warning,
        });
    }

    fn take_result(&mut self) -> ValidationResult {
        ValidationResult {
            errors: std::mem::take(&mut self.errors),
            warnings: std::mem::take(&mut self.warnings),
        }
    }
}
