//! Access-control data models

use serde::{Deserialize, Serialize};

/// The wildcard component matching any resource or action
pub const WILDCARD: &str = "*";

/// The outcome a rule assigns to a permission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Effect {
    /// Access is granted
    Allow,
    /// Access is refused
    Deny,
}

impl std::fmt::Display for Effect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Effect::Allow => write!(f, "allow"),
            Effect::Deny => write!(f, "deny"),
        }
    }
}

/// A permission identifier: an ordered (resource, action) pair.
///
/// Either component may be the wildcard `*`. `articles:*` covers every
/// action on articles; `*:*` covers everything. Lookup prefers the exact
/// pair, then the resource wildcard, then the global wildcard.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PermissionKey {
    /// Noun identifying the protected entity class (e.g. "articles")
    pub resource: String,
    /// Verb identifying the operation (e.g. "edit")
    pub action: String,
}

impl PermissionKey {
    /// Create a key for a concrete (resource, action) pair
    pub fn new(resource: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            resource: resource.into(),
            action: action.into(),
        }
    }

    /// Key matching any action on the given resource
    pub fn resource_wildcard(resource: impl Into<String>) -> Self {
        Self::new(resource, WILDCARD)
    }

    /// Key matching everything
    pub fn global_wildcard() -> Self {
        Self::new(WILDCARD, WILDCARD)
    }

    /// Whether this key names a concrete pair with no wildcard component
    pub fn is_exact(&self) -> bool {
        self.resource != WILDCARD && self.action != WILDCARD
    }

    /// Whether this is the global `*:*` key
    pub fn is_global(&self) -> bool {
        self.resource == WILDCARD && self.action == WILDCARD
    }

    /// The string-keyed bridge form used by the legacy checker.
    ///
    /// An RBAC pair maps to `{action}_{resource}` so screens still running
    /// on the legacy checker can gate the same capability.
    pub fn legacy_key(&self) -> String {
        format!("{}_{}", self.action, self.resource)
    }
}

impl std::fmt::Display for PermissionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.resource, self.action)
    }
}

/// A registered permission: immutable reference data
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Permission {
    /// Stable identifier referenced by role rules and overrides
    pub id: String,
    /// The (resource, action) pair this permission protects
    pub key: PermissionKey,
    /// Optional administrator-facing description
    pub description: Option<String>,
}

impl Permission {
    /// Create a new permission
    pub fn new(id: impl Into<String>, key: PermissionKey) -> Self {
        Self {
            id: id.into(),
            key,
            description: None,
        }
    }

    /// Attach a description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// A single (permission, effect) rule carried by a role
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoleRule {
    /// Permission this rule applies to
    pub permission_id: String,
    /// Effect the role assigns
    pub effect: Effect,
}

/// A named bundle of permission rules assignable to users
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Role {
    /// Stable identifier referenced by assignments
    pub id: String,
    /// Administrator-facing name (e.g. "editor")
    pub name: String,
    /// Zero or more permission rules
    pub rules: Vec<RoleRule>,
}

impl Role {
    /// Create a role with no rules
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            rules: Vec::new(),
        }
    }

    /// Add a rule to this role
    pub fn with_rule(mut self, permission_id: impl Into<String>, effect: Effect) -> Self {
        self.rules.push(RoleRule {
            permission_id: permission_id.into(),
            effect,
        });
        self
    }

    /// Effect this role assigns to a permission, if any rule matches
    pub fn effect_for(&self, permission_id: &str) -> Option<Effect> {
        self.rules
            .iter()
            .find(|rule| rule.permission_id == permission_id)
            .map(|rule| rule.effect)
    }
}

/// A user-to-role assignment (many-to-many)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoleAssignment {
    pub user_id: String,
    pub role_id: String,
}

/// A user-specific rule that bypasses role computation for one permission
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserOverride {
    pub user_id: String,
    pub permission_id: String,
    pub effect: Effect,
}

/// A portal user. Only existence and the active flag matter to resolution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub active: bool,
    pub display_name: Option<String>,
}

impl User {
    /// Create an active user
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            active: true,
            display_name: None,
        }
    }

    /// Attach a display name
    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }

    /// Mark the user inactive
    pub fn deactivated(mut self) -> Self {
        self.active = false;
        self
    }
}

/// Result recorded for a single trace step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepResult {
    Allow,
    Deny,
    Skip,
}

impl std::fmt::Display for StepResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StepResult::Allow => write!(f, "allow"),
            StepResult::Deny => write!(f, "deny"),
            StepResult::Skip => write!(f, "skip"),
        }
    }
}

/// The stages of the resolution algorithm, in the order they run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionStep {
    UserStatus,
    PermissionLookup,
    UserOverride,
    RoleLookup,
    RolePermissions,
    Default,
}

impl std::fmt::Display for ResolutionStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResolutionStep::UserStatus => write!(f, "user_status"),
            ResolutionStep::PermissionLookup => write!(f, "permission_lookup"),
            ResolutionStep::UserOverride => write!(f, "user_override"),
            ResolutionStep::RoleLookup => write!(f, "role_lookup"),
            ResolutionStep::RolePermissions => write!(f, "role_permissions"),
            ResolutionStep::Default => write!(f, "default"),
        }
    }
}

/// One entry of a resolution trace, for diagnostics only
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraceStep {
    pub step: ResolutionStep,
    pub result: StepResult,
    pub reason: String,
}

/// The output of a resolution
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Decision {
    /// Whether access is granted
    pub allowed: bool,
    /// Ordered trace steps, present only when requested
    pub trace: Option<Vec<TraceStep>>,
}

impl Decision {
    /// An allow decision
    pub fn allowed(trace: Option<Vec<TraceStep>>) -> Self {
        Self {
            allowed: true,
            trace,
        }
    }

    /// A deny decision
    pub fn denied(trace: Option<Vec<TraceStep>>) -> Self {
        Self {
            allowed: false,
            trace,
        }
    }

    /// Build a decision from a rule effect
    pub fn from_effect(effect: Effect, trace: Option<Vec<TraceStep>>) -> Self {
        match effect {
            Effect::Allow => Self::allowed(trace),
            Effect::Deny => Self::denied(trace),
        }
    }
}
