//! `validate` command handler
//!
//! Loads each configuration file through the regular loader and reports the
//! outcome without starting a light.

use std::path::{Path, PathBuf};

use serde_json::{Value, json};

use crate::cli::args::{OutputFormat, ValidateArgs};
use crate::config::ConfigLoader;
use crate::error::{ConfigError, Severity, TrafficLightError, ValidationIssue};

/// Outcome of validating one file.
#[derive(Debug)]
struct FileReport {
    path: PathBuf,
    errors: Vec<String>,
    warnings: Vec<String>,
}

impl FileReport {
    fn is_valid(&self, strict: bool) -> bool {
        self.errors.is_empty() && !(strict && !self.warnings.is_empty())
    }

    fn to_json(&self, strict: bool) -> Value {
        json!({
            "file": self.path.display().to_string(),
            "valid": self.is_valid(strict),
            "errors": self.errors,
            "warnings": self.warnings,
        })
    }
}

/// Validate configuration files.
///
/// # Errors
///
/// Returns a validation error naming every file that failed, or a JSON
/// error if the report cannot be serialized.
pub fn run(args: &ValidateArgs) -> Result<(), TrafficLightError> {
    let mut loader = ConfigLoader::new();
    let reports: Vec<FileReport> = args
        .files
        .iter()
        .map(|path| check_file(&mut loader, path))
        .collect();

    match args.format {
        OutputFormat::Human => {
            for report in &reports {
                let mark = if report.is_valid(args.strict) { "ok" } else { "FAILED" };
                println!("{}: {mark}", report.path.display());
                for error in &report.errors {
                    println!("  error: {error}");
                }
                for warning in &report.warnings {
                    println!("  warning: {warning}");
                }
            }
        }
        OutputFormat::Json => {
            let files: Vec<Value> = reports.iter().map(|r| r.to_json(args.strict)).collect();
            println!("{}", serde_json::to_string_pretty(&json!({ "files": files }))?);
        }
    }

    let failed: Vec<ValidationIssue> = reports
        .iter()
        .filter(|r| !r.is_valid(args.strict))
        .map(|r| ValidationIssue {
            path: r.path.display().to_string(),
            message: format!(
                "{} error(s), {} warning(s)",
                r.errors.len(),
                r.warnings.len()
            ),
            severity: Severity::Error,
        })
        .collect();

    if failed.is_empty() {
        return Ok(());
    }

    let names: Vec<&str> = failed.iter().map(|issue| issue.path.as_str()).collect();
    Err(ConfigError::ValidationError {
        path: names.join(", "),
        errors: failed,
    }
    .into())
}

fn check_file(loader: &mut ConfigLoader, path: &Path) -> FileReport {
    tracing::info!(file = %path.display(), "validating configuration");

    let mut report = FileReport {
        path: path.to_path_buf(),
        errors: Vec::new(),
        warnings: Vec::new(),
    };

    match loader.load(path) {
        Ok(result) => {
            report.warnings = result
                .warnings
                .into_iter()
                .map(|w| match w.location {
                    Some(location) => format!("{} at {location}", w.message),
                    None => w.message,
                })
                .collect();
        }
        Err(ConfigError::ValidationError { errors, .. }) => {
            report.errors = errors
                .iter()
                .map(|issue| format!("{} at {}", issue.message, issue.path))
                .collect();
        }
        Err(e) => report.errors.push(e.to_string()),
    }

    report
}
