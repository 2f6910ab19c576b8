//! Tracing subscriber setup for the CLI.
//!
//! Lines carry the emitting thread name and the time since startup, so the
//! cadence of `phase changed` events from the `phase-cycle` thread can be read
//! straight off the log.

use std::io::IsTerminal;

use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::time::Uptime;

use crate::cli::args::ColorChoice;

/// Environment variable holding an `EnvFilter` directive.
pub const LOG_LEVEL_ENV: &str = "TRAFFICLIGHT_LOG_LEVEL";

/// Log line format on stderr.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum LogFormat {
    /// Human-readable lines, colored when stderr is a terminal.
    #[default]
    Human,
    /// One JSON object per line.
    Json,
}

/// Filter directive for a `-v` count.
///
/// Without `-v` only warnings are shown. `-v` turns on this crate's phase and
/// waiter events while dependencies stay at `warn`; `-vv` and above open up
/// every target.
#[must_use]
pub const fn verbosity_to_directive(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "warn,trafficlight=info",
        2 => "debug",
        _ => "trace",
    }
}

/// Resolves `--color` against the terminal and `NO_COLOR`.
#[must_use]
pub fn use_ansi(color: ColorChoice) -> bool {
    match color {
        ColorChoice::Auto => {
            std::io::stderr().is_terminal() && std::env::var_os("NO_COLOR").is_none()
        }
        ColorChoice::Always => true,
        ColorChoice::Never => false,
    }
}

fn env_filter(verbosity: u8) -> EnvFilter {
    EnvFilter::try_from_env(LOG_LEVEL_ENV)
        .unwrap_or_else(|_| EnvFilter::new(verbosity_to_directive(verbosity)))
}

/// Installs the global subscriber.
///
/// `TRAFFICLIGHT_LOG_LEVEL` overrides `verbosity`. A second call is ignored.
pub fn init_logging(format: LogFormat, verbosity: u8, color: ColorChoice) {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter(verbosity))
        .with_timer(Uptime::default())
        .with_thread_names(true)
        .with_target(verbosity >= 2)
        .with_writer(std::io::stderr);

    let installed = match format {
        LogFormat::Human => builder.with_ansi(use_ansi(color)).try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
    if installed.is_err() {
        tracing::debug!("tracing subscriber already installed");
    }
}
