//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::ScoutConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Parse and validate configuration from TOML text.
pub fn parse_config(content: &str) -> Result<ScoutConfig, ConfigError> {
    let config: ScoutConfig = toml::from_str(content)?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<ScoutConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    parse_config(&content)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_config() {
        let config = parse_config(
            r#"
            [pipeline]
            poll_interval_secs = 15

            [storage]
            data_dir = "/var/lib/scout"
            "#,
        )
        .unwrap();
        assert_eq!(config.pipeline.poll_interval_secs, 15);
        assert_eq!(config.storage.data_dir, "/var/lib/scout");
    }

    #[test]
    fn test_validation_error_message_lists_fields() {
        let err = parse_config("[pipeline]\nqueue_capacity = 0\ngas_limit = 0\n").unwrap_err();
        let msg = err.to_string();
        assert!(msg.starts_with("Validation failed"));
        assert!(msg.contains("pipeline.queue_capacity"));
        assert!(msg.contains("pipeline.gas_limit"));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = load_config(Path::new("/nonexistent/scout.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn test_malformed_toml_is_parse_error() {
        let err = parse_config("[pipeline\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
