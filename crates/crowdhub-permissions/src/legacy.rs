//! Legacy string-keyed permission checking
//!
//! Screens that predate the structured (resource, action) model gate on
//! flat permission keys resolved against a role-to-keys mapping. The
//! mapping is an injected configuration object, so tests and deployments
//! can swap it without touching global state. The bridge convention
//! `{action}_{resource}` lets both systems name the same capability during
//! the incremental migration.

use std::collections::HashMap;

use crowdhub_common::validation::ValidationError;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::permission::PermissionKey;

/// Role-to-permission-key mapping for the legacy checker
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LegacyPermissionConfig {
    /// Permission keys granted to each role
    pub roles: HashMap<String, Vec<String>>,
}

impl LegacyPermissionConfig {
    /// Create an empty configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Grant a role a list of permission keys
    pub fn with_role(
        mut self,
        role: impl Into<String>,
        keys: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        self.roles
            .insert(role.into(), keys.into_iter().map(Into::into).collect());
        self
    }

    /// Keys granted to a role, if the role is configured
    pub fn keys_for(&self, role: &str) -> Option<&[String]> {
        self.roles.get(role).map(|keys| keys.as_slice())
    }
}

/// String-keyed permission checker with no override or wildcard semantics.
///
/// A permission holds exactly when one of the caller's roles lists the key.
pub struct LegacyPermissionChecker {
    config: LegacyPermissionConfig,
}

impl LegacyPermissionChecker {
    /// Create a checker over an injected configuration
    pub fn new(config: LegacyPermissionConfig) -> Self {
        Self { config }
    }

    /// Whether a single role grants the key
    pub fn has_permission(&self, role: &str, key: &str) -> bool {
        self.config
            .keys_for(role)
            .map(|keys| keys.iter().any(|k| k == key))
            .unwrap_or(false)
    }

    /// Whether any of the held roles grants the key
    pub fn any_role_has(&self, roles: &[String], key: &str) -> bool {
        roles.iter().any(|role| self.has_permission(role, key))
    }
}

/// Build the legacy key for a structured pair: `{action}_{resource}`.
pub fn legacy_key(resource: &str, action: &str) -> String {
    format!("{}_{}", action, resource)
}

/// Parse a legacy key back into a structured permission key.
///
/// The key splits on the first `_`, so the action component must not
/// contain an underscore; capabilities whose action does cannot be
/// expressed as legacy keys and must use structured specs directly.
pub fn parse_legacy_key(key: &str) -> Result<PermissionKey> {
    match key.split_once('_') {
        Some((action, resource)) if !action.is_empty() && !resource.is_empty() => {
            Ok(PermissionKey::new(resource, action))
        }
        _ => Err(ValidationError::Format {
            field: "permission".to_string(),
            message: format!("'{}' is not an {{action}}_{{resource}} key", key),
        }
        .into()),
    }
}
