//! Configuration validation
//!
//! Collects errors and warnings instead of failing on the first problem, so a
//! single `check` run can report everything wrong with a project file.
//!
//! # Example
//!
//! ```rust
//! use droidsign_core::validation::Validator;
//!
//! let result = Validator::new()
//!     .required("default_config.namespace", "com.example.app")
//!     .range("default_config.sdk.min", 21u32, 1, 35)
//!     .validate();
//!
//! assert!(result.is_valid());
//! ```

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Validation error
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationError {
    /// Field that failed validation
    pub field: String,
    /// Error message
    pub message: String,
    /// Error code
    pub code: String,
    /// Expected value (if applicable)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected: Option<String>,
    /// Actual value (if applicable)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actual: Option<String>,
}

impl ValidationError {
    /// Create an error without expected/actual details
    pub fn new(field: impl Into<String>, code: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            code: code.to_string(),
            expected: None,
            actual: None,
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validation result
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ValidationResult {
    errors: Vec<ValidationError>,
    warnings: Vec<ValidationError>,
}

impl ValidationResult {
    /// Create a new empty result
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if validation passed
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Get all errors
    pub fn errors(&self) -> &[ValidationError] {
        &self.errors
    }

    /// Get all warnings
    pub fn warnings(&self) -> &[ValidationError] {
        &self.warnings
    }

    /// Add an error
    pub fn add_error(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    /// Add a warning
    pub fn add_warning(&mut self, warning: ValidationError) {
        self.warnings.push(warning);
    }

    /// Merge another result into this one
    pub fn merge(&mut self, other: ValidationResult) {
        self.errors.extend(other.errors);
        self.warnings.extend(other.warnings);
    }
}

/// Fluent validator builder
pub struct Validator {
    result: ValidationResult,
}

impl Default for Validator {
    fn default() -> Self {
        Self::new()
    }
}

impl Validator {
    /// Create a new validator
    pub fn new() -> Self {
        Self {
            result: ValidationResult::new(),
        }
    }

    /// Validate that a field is not empty
    pub fn required(mut self, field: &str, value: &str) -> Self {
        if value.trim().is_empty() {
            self.result.add_error(ValidationError {
                field: field.to_string(),
                message: "Field is required".to_string(),
                code: "REQUIRED".to_string(),
                expected: Some("non-empty value".to_string()),
                actual: Some("empty".to_string()),
            });
        }
        self
    }

    /// Validate against a pattern. Empty values are left to `required`.
    pub fn pattern(mut self, field: &str, value: &str, pattern: &Regex, description: &str) -> Self {
        if !value.is_empty() && !pattern.is_match(value) {
            self.result.add_error(ValidationError {
                field: field.to_string(),
                message: format!("Must be {}", description),
                code: "PATTERN".to_string(),
                expected: Some(description.to_string()),
                actual: Some(value.to_string()),
            });
        }
        self
    }

    /// Validate a numeric range
    pub fn range<T: PartialOrd + std::fmt::Display>(
        mut self,
        field: &str,
        value: T,
        min: T,
        max: T,
    ) -> Self {
        if value < min || value > max {
            self.result.add_error(ValidationError {
                field: field.to_string(),
                message: format!("Must be between {} and {}", min, max),
                code: "RANGE".to_string(),
                expected: Some(format!("{} - {}", min, max)),
                actual: Some(value.to_string()),
            });
        }
        self
    }

    /// Validate that `lower` does not exceed `upper`
    pub fn ordered<T: PartialOrd + std::fmt::Display>(
        mut self,
        lower_field: &str,
        lower: T,
        upper_field: &str,
        upper: T,
    ) -> Self {
        if lower > upper {
            self.result.add_error(ValidationError {
                field: lower_field.to_string(),
                message: format!("Must not exceed {} ({})", upper_field, upper),
                code: "ORDER".to_string(),
                expected: Some(format!("<= {}", upper)),
                actual: Some(lower.to_string()),
            });
        }
        self
    }

    /// Validate that a list has at least one entry
    pub fn not_empty<T>(mut self, field: &str, values: &[T]) -> Self {
        if values.is_empty() {
            self.result.add_error(ValidationError {
                field: field.to_string(),
                message: "Must contain at least one entry".to_string(),
                code: "EMPTY_LIST".to_string(),
                expected: Some("one or more entries".to_string()),
                actual: Some("none".to_string()),
            });
        }
        self
    }

    /// Record an error when `failed` is true
    pub fn check(mut self, field: &str, failed: bool, code: &str, message: &str) -> Self {
        if failed {
            self.result.add_error(ValidationError::new(field, code, message));
        }
        self
    }

    /// Record a warning when `suspicious` is true
    pub fn warn_if(mut self, field: &str, suspicious: bool, code: &str, message: &str) -> Self {
        if suspicious {
            self.result.add_warning(ValidationError::new(field, code, message));
        }
        self
    }

    /// Finish validation and return the result
    pub fn validate(self) -> ValidationResult {
        self.result
    }
}
