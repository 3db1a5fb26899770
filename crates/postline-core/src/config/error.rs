//! Error types for configuration loading.

use crate::error::{ErrorKind, ValidationError};
use std::path::PathBuf;
use thiserror::Error;

/// Configuration loading error
#[derive(Debug, Error)]
pub enum ConfigError {
    /// File does not exist (or a glob pattern matched nothing)
    #[error("configuration file not found: {}", path.display())]
    NotFound { path: PathBuf },

    /// File exists but could not be read or written
    #[error("failed to access {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// JSON parsing error
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML parsing error
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Unknown file type
    #[error("unknown file type: {0}")]
    UnknownFileType(String),

    /// Environment file line without `=`
    #[error("invalid environment entry on line {line}: '{content}' (expected KEY=VALUE)")]
    Environment { line: usize, content: String },

    /// Malformed glob pattern
    #[error("invalid path pattern: {0}")]
    Pattern(#[from] glob::PatternError),

    /// Document parsed but failed validation
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

impl ConfigError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ConfigError::NotFound { .. } => ErrorKind::ConfigNotFound,
            ConfigError::Validation(_) => ErrorKind::Validation,
            _ => ErrorKind::ConfigParse,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::error::Error;

    #[rstest]
    fn test_config_error_json_display() {
        let json_err = serde_json::from_str::<serde_json::Value>("invalid json").unwrap_err();
        let error = ConfigError::from(json_err);
        assert!(error.to_string().contains("JSON parsing error"));
        assert!(error.source().is_some());
        assert_eq!(error.kind(), ErrorKind::ConfigParse);
    }

    #[rstest]
    fn test_config_error_yaml_display() {
        let yaml_err = serde_yaml::from_str::<serde_yaml::Value>("invalid: yaml: [").unwrap_err();
        let error = ConfigError::from(yaml_err);
        assert!(error.to_string().contains("YAML parsing error"));
        assert!(matches!(error, ConfigError::Yaml(_)));
    }

    #[rstest]
    #[case("collection.yaml")]
    #[case("nested/dir/mock.json")]
    fn test_config_error_not_found_display(#[case] path: &str) {
        let error = ConfigError::NotFound {
            path: PathBuf::from(path),
        };
        assert!(error.to_string().contains(path));
        assert_eq!(error.kind(), ErrorKind::ConfigNotFound);
        assert!(error.source().is_none());
    }

    #[rstest]
    fn test_config_error_environment_display() {
        let error = ConfigError::Environment {
            line: 3,
            content: "JUSTAKEY".to_string(),
        };
        let display = error.to_string();
        assert!(display.contains("line 3"));
        assert!(display.contains("JUSTAKEY"));
    }

    #[rstest]
    fn test_config_error_validation_kind() {
        let error = ConfigError::from(ValidationError::InvalidStatusCode { code: 999 });
        assert_eq!(error.kind(), ErrorKind::Validation);
        assert_eq!(error.to_string(), "invalid status code 999 (expected 100-599)");
    }

    #[rstest]
    fn test_config_error_pattern() {
        let pattern_err = glob::Pattern::new("[").unwrap_err();
        let error = ConfigError::from(pattern_err);
        assert!(error.to_string().starts_with("invalid path pattern"));
    }
}
