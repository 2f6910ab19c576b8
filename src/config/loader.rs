//! Configuration loader
//!
//! Pipeline:
//! 1. Read the file (BOM stripped)
//! 2. YAML parsing into [`ConfigFile`]
//! 3. Duration resolution and validation
//! 4. Hand back the resolved [`LightConfig`] plus warnings

use std::path::Path;

use crate::config::schema::{ConfigFile, LightConfig};
use crate::config::validation::Validator;
use crate::error::ConfigError;

/// Upper bound on a configuration file's size.
pub const MAX_CONFIG_SIZE: u64 = 64 * 1024;

/// Result of loading a configuration file.
#[derive(Debug)]
pub struct LoadResult {
    /// The loaded and validated configuration.
    pub config: LightConfig,

    /// Warnings encountered during loading.
    pub warnings: Vec<LoadWarning>,
}

/// Warning during configuration loading.
#[derive(Debug, Clone)]
pub struct LoadWarning {
    /// Warning message.
    pub message: String,

    /// Location where the warning occurred.
    pub location: Option<String>,
}

/// Configuration loader.
#[derive(Debug, Default)]
pub struct ConfigLoader {
    validator: Validator,
}

impl ConfigLoader {
    /// Creates a new configuration loader.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads and validates a configuration file.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The file cannot be read or is too large
    /// - YAML parsing fails
    /// - Validation fails
    pub fn load(&mut self, path: &Path) -> Result<LoadResult, ConfigError> {
        let metadata = std::fs::metadata(path).map_err(|_| ConfigError::MissingFile {
            path: path.to_path_buf(),
        })?;
        if metadata.len() > MAX_CONFIG_SIZE {
            return Err(ConfigError::InvalidValue {
                field: "file_size".to_string(),
                value: format!("{} bytes", metadata.len()),
                expected: format!("at most {MAX_CONFIG_SIZE} bytes"),
            });
        }

        let raw = std::fs::read_to_string(path).map_err(|_| ConfigError::MissingFile {
            path: path.to_path_buf(),
        })?;

        self.load_str(&raw, path)
    }

    /// Parses and validates configuration text. `origin` is only used in errors.
    ///
    /// # Errors
    ///
    /// Returns a parse error for malformed YAML or unknown fields, and a
    /// validation error if any field fails validation.
    pub fn load_str(&mut self, raw: &str, origin: &Path) -> Result<LoadResult, ConfigError> {
        let raw = raw.strip_prefix('\u{feff}').unwrap_or(raw);

        // An empty document means "all defaults".
        let file: ConfigFile = if raw.trim().is_empty() {
            ConfigFile::default()
        } else {
            serde_yaml::from_str(raw).map_err(|e| ConfigError::ParseError {
                path: origin.to_path_buf(),
                line: e.location().map(|l| l.line()),
                message: e.to_string(),
            })?
        };

        let (config, result) = self.validator.validate_section(&file.light);
        if result.has_errors() {
            return Err(ConfigError::ValidationError {
                path: origin.display().to_string(),
                errors: result.errors,
            });
        }

        let warnings = result
            .warnings
            .into_iter()
            .map(|issue| LoadWarning {
                message: issue.message,
                location: Some(issue.path),
            })
            .collect();

        Ok(LoadResult { config, warnings })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::path::PathBuf;
    use std::time::Duration;

    fn origin() -> PathBuf {
        PathBuf::from("light.yaml")
    }

    #[test]
    fn test_load_str_full() {
        let yaml = "light:\n  min_cycle: 2s\n  max_cycle: 3s\n  tick: 50ms\n  seed: 11\n";
        let result = ConfigLoader::new().load_str(yaml, &origin()).unwrap();
        assert_eq!(result.config.min_cycle, Duration::from_secs(2));
        assert_eq!(result.config.max_cycle, Duration::from_secs(3));
        assert_eq!(result.config.tick, Duration::from_millis(50));
        assert_eq!(result.config.seed, Some(11));
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_empty_file_is_defaults() {
        let result = ConfigLoader::new().load_str("  \n", &origin()).unwrap();
        assert_eq!(result.config, LightConfig::default());
    }

    #[test]
    fn test_bom_stripped() {
        let yaml = "\u{feff}light:\n  seed: 3\n";
        let result = ConfigLoader::new().load_str(yaml, &origin()).unwrap();
        assert_eq!(result.config.seed, Some(3));
    }

    #[test]
    fn test_malformed_yaml_is_parse_error() {
        let err = ConfigLoader::new()
            .load_str("light: [unclosed", &origin())
            .unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { .. }));
    }

    #[test]
    fn test_unknown_field_is_parse_error() {
        let err = ConfigLoader::new()
            .load_str("light:\n  yellow: 2s\n", &origin())
            .unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { .. }));
    }

    #[test]
    fn test_invalid_bounds_are_validation_error() {
        let err = ConfigLoader::new()
            .load_str("light:\n  min_cycle: 9s\n  max_cycle: 1s\n", &origin())
            .unwrap_err();
        match err {
            ConfigError::ValidationError { path, errors } => {
                assert_eq!(path, "light.yaml");
                assert_eq!(errors.len(), 1);
            }
            other => panic!("expected ValidationError, got {other:?}"),
        }
    }

    #[test]
    fn test_warnings_carried_through() {
        let result = ConfigLoader::new()
            .load_str("light:\n  min_cycle: 10s\n  max_cycle: 12s\n  tick: 5s\n", &origin())
            .unwrap();
        assert_eq!(result.warnings.len(), 1);
        assert_eq!(result.warnings[0].location.as_deref(), Some("light.tick"));
    }

    #[test]
    fn test_load_missing_file() {
        let err = ConfigLoader::new()
            .load(Path::new("/nonexistent/light.yaml"))
            .unwrap_err();
        assert!(matches!(err, ConfigError::MissingFile { .. }));
    }

    #[test]
    fn test_load_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "light:\n  min_cycle: 100ms\n  max_cycle: 200ms").unwrap();
        let result = ConfigLoader::new().load(file.path()).unwrap();
        assert_eq!(result.config.min_cycle, Duration::from_millis(100));
        assert_eq!(result.config.max_cycle, Duration::from_millis(200));
    }

    #[test]
    fn test_oversized_file_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        let padding = "#".repeat(usize::try_from(MAX_CONFIG_SIZE).unwrap() + 1);
        writeln!(file, "{padding}").unwrap();
        let err = ConfigLoader::new().load(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }
}
