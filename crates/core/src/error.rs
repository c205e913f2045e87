//! Error handling with context and recovery suggestions
//!
//! This module provides structured error types with:
//! - Detailed error context
//! - Recovery suggestions
//! - Error codes that map onto CLI exit codes

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use thiserror::Error;

/// Error codes for programmatic error handling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // IO errors (2xxx)
    /// Any other I/O failure
    IoError = 2000,
    /// A required file does not exist
    FileNotFound = 2001,
    /// A file exists but cannot be read
    PermissionDenied = 2002,

    // Configuration errors (3xxx)
    /// Configuration could not be located or read
    ConfigError = 3000,
    /// An explicitly named config file does not exist
    ConfigNotFound = 3001,
    /// A config file is not valid TOML or JSON for its schema
    ConfigParseError = 3002,
    /// A config value is well-formed but not usable
    InvalidConfigValue = 3004,
    /// A properties file exists but is not decodable text
    MalformedConfig = 3005,

    // Validation errors (6xxx)
    /// Command-line input is malformed
    InvalidInput = 6001,

    // Signing errors (7xxx)
    /// One or more signing fields are missing
    IncompleteSigningConfig = 7001,

    // Build errors (8xxx)
    /// No build type with the requested name
    UnknownVariant = 8001,
}

impl ErrorCode {
    /// Get the numeric code
    pub fn code(&self) -> u32 {
        *self as u32
    }

    /// Get a human-readable category
    pub fn category(&self) -> &'static str {
        match self.code() / 1000 {
            2 => "IO",
            3 => "Configuration",
            6 => "Validation",
            7 => "Signing",
            8 => "Build",
            _ => "Unknown",
        }
    }

    /// Exit code a CLI should use when this error ends the process
    pub fn exit_code(&self) -> i32 {
        match self.code() / 1000 {
            3 => exit_codes::CONFIG_ERROR,
            6 => exit_codes::VALIDATION_ERROR,
            7 => exit_codes::SIGNING_ERROR,
            _ => exit_codes::FAILURE,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "E{:04}", self.code())
    }
}

/// Main error type with rich context
#[derive(Error, Debug)]
pub struct Error {
    /// Error code for programmatic handling
    pub code: ErrorCode,
    /// Human-readable message
    pub message: String,
    /// Additional context
    pub context: Option<String>,
    /// Recovery suggestion
    pub suggestion: Option<String>,
    /// Source error
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)?;
        if let Some(ctx) = &self.context {
            write!(f, "\n  Context: {}", ctx)?;
        }
        if let Some(suggestion) = &self.suggestion {
            write!(f, "\n  Suggestion: {}", suggestion)?;
        }
        Ok(())
    }
}

impl Error {
    /// Create a new error
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            context: None,
            suggestion: None,
            source: None,
        }
    }

    /// Add context to the error
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    /// Add a recovery suggestion
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Add a source error
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    // Convenience constructors

    /// An explicitly requested config file is missing
    pub fn config_not_found(path: impl AsRef<Path>) -> Self {
        Self::new(
            ErrorCode::ConfigNotFound,
            format!("Configuration file not found: {}", path.as_ref().display()),
        )
        .with_suggestion("Create a droidsign.toml file or use --config to specify a path")
    }

    /// A file exists but its bytes are not valid text
    pub fn malformed_config(path: impl AsRef<Path>, reason: impl fmt::Display) -> Self {
        Self::new(
            ErrorCode::MalformedConfig,
            format!(
                "Malformed configuration file {}: {}",
                path.as_ref().display(),
                reason
            ),
        )
        .with_suggestion("Re-save the file as UTF-8 text")
    }

    /// No build type named `name`; `known` lists the configured ones
    pub fn unknown_variant(name: &str, known: &[&str]) -> Self {
        Self::new(
            ErrorCode::UnknownVariant,
            format!("Unknown build variant: {}", name),
        )
        .with_suggestion(format!("Known variants: {}", known.join(", ")))
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Exit codes for CLI commands
pub mod exit_codes {
    /// Command completed
    pub const SUCCESS: i32 = 0;
    /// Unclassified failure, including I/O errors
    pub const FAILURE: i32 = 1;
    /// Project configuration failed validation
    pub const VALIDATION_ERROR: i32 = 2;
    /// Configuration could not be loaded or parsed
    pub const CONFIG_ERROR: i32 = 3;
    /// Signing configuration is incomplete
    pub const SIGNING_ERROR: i32 = 4;
}

// Implement From for common error types

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        let code = match err.kind() {
            std::io::ErrorKind::NotFound => ErrorCode::FileNotFound,
            std::io::ErrorKind::PermissionDenied => ErrorCode::PermissionDenied,
            _ => ErrorCode::IoError,
        };
        Error::new(code, err.to_string()).with_source(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::new(ErrorCode::ConfigParseError, format!("JSON error: {}", err)).with_source(err)
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::new(ErrorCode::ConfigParseError, format!("TOML parse error: {}", err))
            .with_source(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_display() {
        assert_eq!(ErrorCode::FileNotFound.to_string(), "E2001");
        assert_eq!(ErrorCode::MalformedConfig.to_string(), "E3005");
    }

    #[test]
    fn test_error_code_category() {
        assert_eq!(ErrorCode::IoError.category(), "IO");
        assert_eq!(ErrorCode::MalformedConfig.category(), "Configuration");
        assert_eq!(ErrorCode::IncompleteSigningConfig.category(), "Signing");
        assert_eq!(ErrorCode::UnknownVariant.category(), "Build");
    }

    #[test]
    fn test_error_code_exit_code() {
        assert_eq!(ErrorCode::MalformedConfig.exit_code(), exit_codes::CONFIG_ERROR);
        assert_eq!(ErrorCode::InvalidInput.exit_code(), exit_codes::VALIDATION_ERROR);
        assert_eq!(ErrorCode::IncompleteSigningConfig.exit_code(), exit_codes::SIGNING_ERROR);
        assert_eq!(ErrorCode::IoError.exit_code(), exit_codes::FAILURE);
    }

    #[test]
    fn test_error_with_context() {
        let err = Error::config_not_found("/path/to/droidsign.toml")
            .with_context("While loading project configuration");

        assert_eq!(err.code, ErrorCode::ConfigNotFound);
        assert!(err.context.is_some());
        assert!(err.suggestion.is_some());
    }

    #[test]
    fn test_malformed_config_message() {
        let err = Error::malformed_config("key.properties", "invalid utf-8 sequence");
        let rendered = err.to_string();
        assert!(rendered.starts_with("[E3005]"));
        assert!(rendered.contains("key.properties"));
        assert!(rendered.contains("Suggestion"));
    }

    #[test]
    fn test_io_not_found_maps_code() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: Error = io.into();
        assert_eq!(err.code, ErrorCode::FileNotFound);
        assert!(err.source.is_some());
    }

    #[test]
    fn test_unknown_variant_lists_known() {
        let err = Error::unknown_variant("staging", &["debug", "release"]);

        assert!(err.to_string().starts_with("[E8001]"));
        assert_eq!(err.suggestion.as_deref(), Some("Known variants: debug, release"));
    }
}
