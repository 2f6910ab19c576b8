//! Shared integration-test helpers for running the `trafficlight` binary and
//! building fast-cycling lights.

#![allow(dead_code)]

use std::path::PathBuf;
use std::process::{Command, Output};
use std::time::Duration;

use trafficlight::config::LightConfig;

/// Timeout for waits that should finish within a handful of fast cycles.
pub const FAST_TIMEOUT: Duration = Duration::from_secs(10);

/// A light cycling every 20–40 ms with a 5 ms tick.
pub fn fast_config(seed: u64) -> LightConfig {
    LightConfig {
        min_cycle: Duration::from_millis(20),
        max_cycle: Duration::from_millis(40),
        tick: Duration::from_millis(5),
        seed: Some(seed),
    }
}

/// Runs the binary to completion with the given arguments.
#[allow(clippy::missing_panics_doc)]
pub fn run_binary(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_trafficlight"))
        .args(args)
        .env_remove("TRAFFICLIGHT_CONFIG")
        .env_remove("TRAFFICLIGHT_SEED")
        .env_remove("TRAFFICLIGHT_LOG_LEVEL")
        .output()
        .expect("failed to run trafficlight")
}

/// Path to a file under `tests/fixtures`.
pub fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}
