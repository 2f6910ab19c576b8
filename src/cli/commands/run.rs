//! `run` command handler
//!
//! Starts one phase actor and a set of blocking waiters that repeatedly wait
//! for the target phase until a count is reached or the process is signalled.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::cli::args::RunArgs;
use crate::config::{ConfigLoader, LightConfig, Validator};
use crate::error::{ActorError, ConfigError, TrafficLightError};
use crate::phase::{Phase, PhaseActor};

/// Start a light and drive its waiters.
///
/// # Errors
///
/// Returns a config error if the configuration or overrides are invalid, and
/// an actor error if the cycle thread cannot be spawned or a waiter dies.
pub async fn run(args: &RunArgs, cancel: CancellationToken) -> Result<(), TrafficLightError> {
    let config = resolve_config(args)?;

    let actor = Arc::new(PhaseActor::new(&config));
    actor.start()?;
    info!(
        seed = actor.seed(),
        waiters = args.waiters,
        target = %args.target,
        "traffic light running"
    );

    let mut waiters = JoinSet::new();
    for waiter in 0..args.waiters {
        let actor = Arc::clone(&actor);
        let cancel = cancel.clone();
        let target = args.target;
        let count = args.count;
        // Waiters re-check cancellation once per tick.
        let slice = config.tick;
        waiters.spawn_blocking(move || {
            observe(&actor, waiter, target, count, slice, &cancel)
        });
    }

    let mut observed = 0;
    let mut failure = None;
    while let Some(joined) = waiters.join_next().await {
        match joined {
            Ok(seen) => observed += seen,
            Err(e) => {
                warn!(error = %e, "waiter failed");
                cancel.cancel();
                failure.get_or_insert_with(|| ActorError::WaiterFailed(e.to_string()));
            }
        }
    }

    let stopping = Arc::clone(&actor);
    if let Err(e) = tokio::task::spawn_blocking(move || stopping.shutdown()).await {
        warn!(error = %e, "phase actor shutdown failed");
    }

    info!(observed, toggles = actor.toggles(), "traffic light stopped");
    println!(
        "observed {observed} {} phase(s) over {} toggle(s)",
        args.target,
        actor.toggles()
    );

    failure.map_or(Ok(()), |e| Err(e.into()))
}

/// Loads the config file (if any), then layers the command-line overrides.
///
/// # Errors
///
/// Returns a config error if the file fails to load or the final
/// configuration fails validation.
pub fn resolve_config(args: &RunArgs) -> Result<LightConfig, TrafficLightError> {
    let base = if let Some(ref path) = args.config {
        info!(config = %path.display(), "loading configuration");
        let result = ConfigLoader::new().load(path)?;
        for warning in &result.warnings {
            warn!(
                location = warning.location.as_deref().unwrap_or("<unknown>"),
                "{}",
                warning.message
            );
        }
        result.config
    } else {
        LightConfig::default()
    };

    let overrides = args.overrides();
    if overrides.is_empty() {
        return Ok(base);
    }

    let config = base.with_overrides(&overrides);
    let result = Validator::new().validate(&config);
    for warning in &result.warnings {
        warn!(location = %warning.path, "{}", warning.message);
    }
    if result.has_errors() {
        return Err(ConfigError::ValidationError {
            path: "<command line>".to_string(),
            errors: result.errors,
        }
        .into());
    }

    Ok(config)
}

/// Waits for `target` repeatedly until `count` is reached or `cancel` fires.
///
/// Returns the number of target phases this waiter consumed.
fn observe(
    actor: &PhaseActor,
    waiter: u16,
    target: Phase,
    count: Option<u64>,
    slice: Duration,
    cancel: &CancellationToken,
) -> u64 {
    let mut seen = 0;
    while !cancel.is_cancelled() && count.is_none_or(|limit| seen < limit) {
        if actor.wait_for_phase_timeout(target, slice) {
            seen += 1;
            info!(waiter, phase = %target, seen, "phase observed");
        }
    }
    seen
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::args::{Cli, Commands};
    use clap::Parser;
    use std::io::Write;

    fn parse_run(argv: &[&str]) -> RunArgs {
        let mut full = vec!["trafficlight", "run"];
        full.extend_from_slice(argv);
        match Cli::try_parse_from(full).unwrap().command {
            Commands::Run(args) => args,
            other => panic!("Expected RunArgs, got {other:?}"),
        }
    }

    #[test]
    fn test_resolve_defaults() {
        let config = resolve_config(&parse_run(&[])).unwrap();
        assert_eq!(config, LightConfig::default());
    }

    #[test]
    fn test_resolve_overrides_on_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "light:\n  min_cycle: 1s\n  max_cycle: 2s\n  seed: 4").unwrap();
        let path = file.path().to_str().unwrap();

        let config =
            resolve_config(&parse_run(&["--config", path, "--max-cycle", "3s"])).unwrap();
        assert_eq!(config.min_cycle, Duration::from_secs(1));
        assert_eq!(config.max_cycle, Duration::from_secs(3));
        assert_eq!(config.seed, Some(4));
    }

    #[test]
    fn test_resolve_rejects_inverted_overrides() {
        let err = resolve_config(&parse_run(&["--min-cycle", "5s", "--max-cycle", "1s"]))
            .unwrap_err();
        assert!(matches!(
            err,
            TrafficLightError::Config(ConfigError::ValidationError { .. })
        ));
    }

    #[test]
    fn test_resolve_missing_file() {
        let err = resolve_config(&parse_run(&["--config", "/nonexistent/light.yaml"]))
            .unwrap_err();
        assert!(matches!(
            err,
            TrafficLightError::Config(ConfigError::MissingFile { .. })
        ));
    }

    #[test]
    fn test_observe_stops_at_count() {
        let config = LightConfig {
            min_cycle: Duration::from_millis(10),
            max_cycle: Duration::from_millis(20),
            tick: Duration::from_millis(5),
            seed: Some(1),
        };
        let actor = PhaseActor::new(&config);
        actor.start().unwrap();
        let seen = observe(
            &actor,
            0,
            Phase::Green,
            Some(2),
            config.tick,
            &CancellationToken::new(),
        );
        assert_eq!(seen, 2);
    }

    #[test]
    fn test_observe_stops_on_cancel() {
        let actor = PhaseActor::new(&LightConfig::default());
        let cancel = CancellationToken::new();
        cancel.cancel();
        let seen = observe(&actor, 0, Phase::Green, None, Duration::from_millis(5), &cancel);
        assert_eq!(seen, 0);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_run_two_waiters_to_completion() {
        let args = parse_run(&[
            "--min-cycle",
            "10ms",
            "--max-cycle",
            "20ms",
            "--tick",
            "2ms",
            "--seed",
            "3",
            "--waiters",
            "2",
            "--count",
            "2",
        ]);
        let result = tokio::time::timeout(
            Duration::from_secs(30),
            run(&args, CancellationToken::new()),
        )
        .await;
        assert!(matches!(result, Ok(Ok(()))));
    }
}
