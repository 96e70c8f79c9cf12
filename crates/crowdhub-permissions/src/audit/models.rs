//! Access log data models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Outcome recorded for an access check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessOutcome {
    /// Access was granted
    Allowed,
    /// Access was refused
    Denied,
}

impl std::fmt::Display for AccessOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AccessOutcome::Allowed => write!(f, "allowed"),
            AccessOutcome::Denied => write!(f, "denied"),
        }
    }
}

/// Which resolution stage produced the outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionSource {
    /// User missing or inactive
    UserStatus,
    /// No permission registered at any specificity
    PermissionLookup,
    /// A user-level override decided
    Override,
    /// A role rule decided
    Role,
    /// Default-closed fallthrough
    Default,
}

impl std::fmt::Display for DecisionSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DecisionSource::UserStatus => write!(f, "user_status"),
            DecisionSource::PermissionLookup => write!(f, "permission_lookup"),
            DecisionSource::Override => write!(f, "override"),
            DecisionSource::Role => write!(f, "role"),
            DecisionSource::Default => write!(f, "default"),
        }
    }
}

/// Entry in the access log
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessLogEntry {
    /// Unique identifier for this entry
    pub id: String,
    /// When the check resolved
    pub timestamp: DateTime<Utc>,
    /// Subject of the check
    pub user: String,
    /// Resource the check targeted
    pub resource: String,
    /// Action the check targeted
    pub action: String,
    /// Outcome of the check
    pub outcome: AccessOutcome,
    /// Stage that produced the outcome
    pub source: DecisionSource,
    /// Optional additional context
    pub context: Option<String>,
}

impl AccessLogEntry {
    /// Create a new access log entry stamped now
    pub fn new(
        user: impl Into<String>,
        resource: impl Into<String>,
        action: impl Into<String>,
        outcome: AccessOutcome,
        source: DecisionSource,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            user: user.into(),
            resource: resource.into(),
            action: action.into(),
            outcome,
            source,
            context: None,
        }
    }

    /// Attach context to the entry
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }
}
