//! CLI argument definitions
//!
//! All Clap derive structs for `trafficlight` command-line parsing.

use std::path::PathBuf;
use std::time::Duration;

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};

use crate::config::LightOverrides;
use crate::observability::LogFormat;
use crate::phase::Phase;

// ============================================================================
// Root CLI
// ============================================================================

/// Intersection traffic light running on its own thread.
#[derive(Parser, Debug)]
#[command(name = "trafficlight", author, version, about)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all non-error output.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Color output control.
    #[arg(long, default_value = "auto", global = true, env = "TRAFFICLIGHT_COLOR")]
    pub color: ColorChoice,

    /// Log line format.
    #[arg(long, default_value = "human", global = true)]
    pub log_format: LogFormat,
}

// ============================================================================
// Top-Level Commands
// ============================================================================

/// Top-level subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start a light and wait on its phase changes.
    Run(RunArgs),

    /// Validate configuration files without starting a light.
    Validate(ValidateArgs),

    /// Generate shell completion scripts.
    Completions(CompletionsArgs),

    /// Display version information.
    Version(VersionArgs),
}

// ============================================================================
// Run Command
// ============================================================================

/// Arguments for `run`.
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Path to YAML configuration file.
    #[arg(short, long, env = "TRAFFICLIGHT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Shortest cycle duration (e.g. `4s`, `3500ms`).
    #[arg(long, value_parser = humantime::parse_duration)]
    pub min_cycle: Option<Duration>,

    /// Longest cycle duration.
    #[arg(long, value_parser = humantime::parse_duration)]
    pub max_cycle: Option<Duration>,

    /// Polling granularity of the cycle loop.
    #[arg(long, value_parser = humantime::parse_duration)]
    pub tick: Option<Duration>,

    /// Seed for the cycle duration RNG.
    #[arg(long, env = "TRAFFICLIGHT_SEED")]
    pub seed: Option<u64>,

    /// Number of concurrent waiter threads.
    #[arg(
        short,
        long,
        default_value_t = 1,
        value_parser = clap::value_parser!(u16).range(1..)
    )]
    pub waiters: u16,

    /// Phase every waiter waits for.
    #[arg(long, default_value = "green")]
    pub target: Phase,

    /// Stop each waiter after it has observed this many target phases.
    #[arg(long)]
    pub count: Option<u64>,
}

impl RunArgs {
    /// Collects the timing flags as config overrides.
    #[must_use]
    pub const fn overrides(&self) -> LightOverrides {
        LightOverrides {
            min_cycle: self.min_cycle,
            max_cycle: self.max_cycle,
            tick: self.tick,
            seed: self.seed,
        }
    }
}

// ============================================================================
// Validate Command
// ============================================================================

/// Arguments for `validate`.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Configuration files to validate.
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Output format.
    #[arg(short, long, default_value = "human")]
    pub format: OutputFormat,

    /// Enable strict validation (warnings become errors).
    #[arg(long)]
    pub strict: bool,
}

// ============================================================================
// Completions / Version
// ============================================================================

/// Arguments for shell completion generation.
#[derive(Args, Debug)]
pub struct CompletionsArgs {
    /// Target shell for completion script.
    pub shell: Shell,
}

/// Arguments for version display.
#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Output format.
    #[arg(short, long, default_value = "human")]
    pub format: OutputFormat,
}

// ============================================================================
// CLI-Local Enums
// ============================================================================

/// Color output choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ColorChoice {
    /// Auto-detect terminal support.
    #[default]
    Auto,
    /// Always use color.
    Always,
    /// Never use color.
    Never,
}

/// Output format for structured output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable output.
    #[default]
    Human,
    /// JSON output.
    Json,
}

/// Shell type for completion generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Shell {
    /// Bash shell.
    Bash,
    /// Zsh shell.
    Zsh,
    /// Fish shell.
    Fish,
    /// `PowerShell`.
    #[value(name = "powershell")]
    PowerShell,
    /// Elvish shell.
    Elvish,
}

// ============================================================================
// Tests
// ============================================================================
