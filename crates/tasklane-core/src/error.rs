//! Error types for tasklane

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using HelperError
pub type Result<T> = std::result::Result<T, HelperError>;

/// Main error type for tasklane operations
#[derive(Debug, Error)]
pub enum HelperError {
    /// A required argument was blank or a required collaborator was not configured
    #[error("Invalid argument '{argument}': {message}")]
    InvalidArgument { argument: String, message: String },

    /// Configuration-related errors
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The host failed to run a target
    #[error("Failed to run target '{target}': {reason}")]
    Execution { target: String, reason: String },

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic errors
    #[error("{0}")]
    Other(String),
}

/// Configuration-related errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Configuration file not found
    #[error("Task file not found in {0} or any parent directory")]
    NotFound(PathBuf),

    /// Invalid configuration value
    #[error("Invalid configuration: {field} - {message}")]
    InvalidValue { field: String, message: String },

    /// YAML parsing error
    #[error("YAML parsing error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    /// IO error
    #[error("IO error reading config: {0}")]
    Io(#[from] std::io::Error),
}

impl HelperError {
    /// Create an invalid argument error
    pub fn invalid_argument(argument: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            argument: argument.into(),
            message: message.into(),
        }
    }

    /// Create a new "other" error with a message
    pub fn other<S: Into<String>>(msg: S) -> Self {
        Self::Other(msg.into())
    }

    /// Whether this is an argument/precondition failure
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, Self::InvalidArgument { .. })
    }
}

/// Fail with `InvalidArgument` when `value` is empty or whitespace
pub fn require_non_blank(argument: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(HelperError::invalid_argument(
            argument,
            "value cannot be blank",
        ));
    }
    Ok(())
}
