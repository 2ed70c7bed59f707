//! Parser configuration
//!
//! Configuration loaded from .th-log-parser.toml.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use th_log_parser::{
    ParserOptions, TruncationPolicy, DEFAULT_MAX_STEP_ERRORS, TALOS_DATA_MARKER,
    TALOS_RESULT_MARKER,
};
use thiserror::Error;

/// Errors loading an explicitly requested config file
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Parser configuration loaded from .th-log-parser.toml
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct ParserConfig {
    /// Characters kept of lines without a measurement marker
    #[serde(default = "default_max_line_length")]
    pub max_line_length: usize,

    /// Substrings that exempt a line from truncation
    #[serde(default = "default_measurement_markers")]
    pub measurement_markers: Vec<String>,

    /// Check step lines for failures in the structured log view
    #[serde(default = "default_check_errors")]
    pub check_errors: bool,

    /// Error lines stored per step
    #[serde(default = "default_max_step_errors")]
    pub max_step_errors: usize,
}

fn default_max_line_length() -> usize {
    TruncationPolicy::DEFAULT_MAX_LINE_LENGTH
}

fn default_measurement_markers() -> Vec<String> {
    vec![
        TALOS_DATA_MARKER.to_string(),
        TALOS_RESULT_MARKER.to_string(),
    ]
}

fn default_check_errors() -> bool {
    true
}

fn default_max_step_errors() -> usize {
    DEFAULT_MAX_STEP_ERRORS
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            max_line_length: default_max_line_length(),
            measurement_markers: default_measurement_markers(),
            check_errors: default_check_errors(),
            max_step_errors: default_max_step_errors(),
        }
    }
}

impl ParserConfig {
    /// Load config from CWD first, then home and config directories, or use defaults
    pub fn load() -> Self {
        if let Some((path, content)) = crate::load_config_file() {
            match toml::from_str(&content) {
                Ok(config) => {
                    log::info!("Loaded parser config from {}", path.display());
                    return config;
                }
                Err(e) => {
                    log::warn!("Failed to parse config file {}: {}", path.display(), e);
                }
            }
        }

        log::debug!("Using default parser config");
        Self::default()
    }

    /// Load config from an explicit path
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn truncation_policy(&self) -> TruncationPolicy {
        TruncationPolicy::new(
            self.max_line_length,
            self.measurement_markers.iter().cloned(),
        )
    }

    /// Options handed to a builder picked at runtime
    pub fn parser_options(&self) -> ParserOptions {
        ParserOptions {
            check_errors: self.check_errors,
            max_step_errors: self.max_step_errors,
            truncation: self.truncation_policy(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = ParserConfig::default();
        assert_eq!(config.max_line_length, 500);
        assert_eq!(config.measurement_markers, vec!["TALOSDATA", "TalosResult"]);
        assert!(config.check_errors);
        assert_eq!(config.max_step_errors, 100);
        assert_eq!(config.parser_options(), ParserOptions::default());
    }

    #[test]
    fn test_config_deserialize() {
        let toml = r#"
            max_line_length = 1000
            measurement_markers = ["PERFHERDER_DATA"]
            check_errors = false
        "#;
        let config: ParserConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.max_line_length, 1000);
        assert_eq!(config.measurement_markers, vec!["PERFHERDER_DATA"]);
        assert!(!config.check_errors);
        // max_step_errors should use default
        assert_eq!(config.max_step_errors, 100);

        let options = config.parser_options();
        assert_eq!(options.truncation.max_line_length(), 1000);
        assert!(options.truncation.is_exempt("PERFHERDER_DATA: {}"));
        assert!(!options.truncation.is_exempt("TALOSDATA: []"));
    }

    #[test]
    fn test_config_deserialize_partial() {
        let config: ParserConfig = toml::from_str("max_step_errors = 5").unwrap();
        assert_eq!(config.max_step_errors, 5);
        assert_eq!(config.max_line_length, 500);
        assert!(config.check_errors);
    }

    #[test]
    fn test_from_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "max_line_length = 80").unwrap();

        let config = ParserConfig::from_path(file.path()).unwrap();
        assert_eq!(config.max_line_length, 80);
    }

    #[test]
    fn test_from_path_invalid_toml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "max_line_length = \"long\"").unwrap();

        let err = ParserConfig::from_path(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_from_path_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = ParserConfig::from_path(dir.path().join("missing.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
