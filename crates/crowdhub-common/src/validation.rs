//! Validation traits and common validators
//!
//! A unified validation interface so request handlers report malformed input
//! the same way everywhere, instead of each module rolling its own checks.
//! Validation failures are a distinct failure class: they must never be
//! conflated with an access-denied outcome.

use thiserror::Error;

/// Validation error with context
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },

    #[error("Required field missing: {field}")]
    Required { field: String },

    #[error("Format error for {field}: {message}")]
    Format { field: String, message: String },

    #[error("Multiple validation errors: {0:?}")]
    Multiple(Vec<ValidationError>),
}

/// Trait for types that can validate themselves
pub trait Validatable {
    /// Validate the instance, returning Ok(()) if valid
    fn validate(&self) -> Result<(), ValidationError>;

    /// Check validity without the error details
    fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }
}

/// Trait for validators that check values
pub trait Validator<T> {
    /// Validate a value
    fn validate(&self, value: &T) -> Result<(), ValidationError>;
}

/// Non-empty string validator
pub struct NonEmptyStringValidator {
    field_name: String,
}

impl NonEmptyStringValidator {
    pub fn new(field_name: impl Into<String>) -> Self {
        Self {
            field_name: field_name.into(),
        }
    }
}

impl Validator<String> for NonEmptyStringValidator {
    fn validate(&self, value: &String) -> Result<(), ValidationError> {
        if value.trim().is_empty() {
            return Err(ValidationError::Required {
                field: self.field_name.clone(),
            });
        }
        Ok(())
    }
}

impl Validator<&str> for NonEmptyStringValidator {
    fn validate(&self, value: &&str) -> Result<(), ValidationError> {
        if value.trim().is_empty() {
            return Err(ValidationError::Required {
                field: self.field_name.clone(),
            });
        }
        Ok(())
    }
}

/// Identifier validator for resource and action names.
///
/// Accepts lowercase ASCII identifiers (`[a-z0-9_-]`) or the lone wildcard
/// `*` used by wildcard permission entries.
pub struct IdentifierValidator {
    field_name: String,
}

impl IdentifierValidator {
    pub fn new(field_name: impl Into<String>) -> Self {
        Self {
            field_name: field_name.into(),
        }
    }

    fn check(&self, value: &str) -> Result<(), ValidationError> {
        if value.trim().is_empty() {
            return Err(ValidationError::Required {
                field: self.field_name.clone(),
            });
        }
        if value == "*" {
            return Ok(());
        }
        let valid = value
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '-');
        if !valid {
            return Err(ValidationError::Format {
                field: self.field_name.clone(),
                message: "expected lowercase identifier or '*'".to_string(),
            });
        }
        Ok(())
    }
}

impl Validator<String> for IdentifierValidator {
    fn validate(&self, value: &String) -> Result<(), ValidationError> {
        self.check(value)
    }
}

impl Validator<&str> for IdentifierValidator {
    fn validate(&self, value: &&str) -> Result<(), ValidationError> {
        self.check(value)
    }
}
