//! Error types for the access-control system
//!
//! Three failure classes are kept apart on purpose: a malformed request is a
//! `Validation` error, a store outage is `StoreUnavailable`, and neither is
//! ever reported as an access-denied decision. Denials are ordinary
//! [`Decision`](crate::permission::Decision) values, not errors.

use crowdhub_common::validation::ValidationError;
use thiserror::Error;

/// Result type for access-control operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in the access-control system
#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid request: {0}")]
    Validation(#[from] ValidationError),

    #[error("Permission store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid access log entry: {0}")]
    InvalidAuditEntry(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Whether this error reports a malformed request
    pub fn is_validation(&self) -> bool {
        matches!(self, Error::Validation(_))
    }

    /// Whether this error reports a store outage
    pub fn is_store_unavailable(&self) -> bool {
        matches!(self, Error::StoreUnavailable(_))
    }
}
