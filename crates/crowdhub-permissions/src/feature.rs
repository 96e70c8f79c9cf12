//! Feature flag gating
//!
//! Flags are queried independently of permissions; the gate consults them
//! before any permission check runs. Unknown flags read as disabled.

use std::collections::HashMap;

use crate::error::Result;

/// Feature flag store interface
pub trait FeatureFlags: Send + Sync {
    /// Whether a flag is enabled; unknown flags are disabled
    fn is_enabled(&self, flag: &str) -> Result<bool>;
}

/// Map-backed flag store for configuration-driven deployments and tests
#[derive(Debug, Clone, Default)]
pub struct StaticFeatureFlags {
    flags: HashMap<String, bool>,
}

impl StaticFeatureFlags {
    /// Create an empty store (every flag disabled)
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable a flag
    pub fn enable(mut self, flag: impl Into<String>) -> Self {
        self.flags.insert(flag.into(), true);
        self
    }

    /// Disable a flag explicitly
    pub fn disable(mut self, flag: impl Into<String>) -> Self {
        self.flags.insert(flag.into(), false);
        self
    }
}

impl FeatureFlags for StaticFeatureFlags {
    fn is_enabled(&self, flag: &str) -> Result<bool> {
        Ok(self.flags.get(flag).copied().unwrap_or(false))
    }
}
