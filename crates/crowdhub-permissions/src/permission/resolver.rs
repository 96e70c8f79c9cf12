//! Layered permission resolution
//!
//! One resolution pass runs, in strict order: user status, permission lookup
//! (exact key, then `resource:*`, then `*:*`), user override, role
//! aggregation with deny-over-allow, then the default-closed fallthrough.
//! The pass is read-only; every call re-reads store state.

use std::sync::Arc;

use crowdhub_common::validation::{IdentifierValidator, Validatable, ValidationError, Validator};
use tracing::debug;

use crate::error::Result;
use crate::identity::IdentityProvider;
use crate::permission::models::{
    Decision, Effect, Permission, PermissionKey, ResolutionStep, StepResult, TraceStep,
};
use crate::storage::PermissionStore;

/// A single access-check request.
///
/// `user_id` is optional; when absent the resolver falls back to the
/// injected identity provider. `include_trace` turns on the diagnostic
/// trace in the returned decision.
#[derive(Debug, Clone)]
pub struct ResolveRequest {
    pub user_id: Option<String>,
    pub resource: String,
    pub action: String,
    pub include_trace: bool,
}

impl ResolveRequest {
    /// Request a check for the caller's authenticated identity
    pub fn new(resource: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            user_id: None,
            resource: resource.into(),
            action: action.into(),
            include_trace: false,
        }
    }

    /// Check on behalf of an explicit user
    pub fn for_user(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    /// Include the diagnostic trace in the decision
    pub fn with_trace(mut self) -> Self {
        self.include_trace = true;
        self
    }
}

impl Validatable for ResolveRequest {
    fn validate(&self) -> std::result::Result<(), ValidationError> {
        IdentifierValidator::new("resource").validate(&self.resource)?;
        IdentifierValidator::new("action").validate(&self.action)?;
        Ok(())
    }
}

/// Collects trace steps when the request asked for them
struct TraceRecorder {
    steps: Option<Vec<TraceStep>>,
}

impl TraceRecorder {
    fn new(enabled: bool) -> Self {
        Self {
            steps: enabled.then(Vec::new),
        }
    }

    fn push(&mut self, step: ResolutionStep, result: StepResult, reason: impl Into<String>) {
        if let Some(steps) = self.steps.as_mut() {
            steps.push(TraceStep {
                step,
                result,
                reason: reason.into(),
            });
        }
    }

    fn finish(&mut self) -> Option<Vec<TraceStep>> {
        self.steps.take()
    }
}

/// Resolves (user, resource, action) triples to allow/deny decisions
pub struct PermissionResolver {
    store: Arc<dyn PermissionStore>,
    identity: Arc<dyn IdentityProvider>,
}

impl PermissionResolver {
    /// Create a resolver over a store and an identity provider
    pub fn new(store: Arc<dyn PermissionStore>, identity: Arc<dyn IdentityProvider>) -> Self {
        Self { store, identity }
    }

    /// Resolve a request to a decision.
    ///
    /// A malformed request (blank resource/action, or no user id and no
    /// authenticated identity) is a validation error, never a deny. A store
    /// failure propagates as an error; whether to treat an outage as a deny
    /// is the caller's policy, not the resolver's.
    pub fn resolve(&self, request: &ResolveRequest) -> Result<Decision> {
        request.validate()?;

        let user_id = match request.user_id.clone().or_else(|| self.identity.current_user_id()) {
            Some(id) => id,
            None => {
                return Err(ValidationError::Required {
                    field: "user_id".to_string(),
                }
                .into())
            }
        };

        let mut trace = TraceRecorder::new(request.include_trace);
        let decision = self.resolve_inner(&user_id, request, &mut trace)?;

        debug!(
            user = %user_id,
            resource = %request.resource,
            action = %request.action,
            allowed = decision.allowed,
            "access check resolved"
        );

        Ok(decision)
    }

    fn resolve_inner(
        &self,
        user_id: &str,
        request: &ResolveRequest,
        trace: &mut TraceRecorder,
    ) -> Result<Decision> {
        // 1. User status
        match self.store.find_user(user_id)? {
            None => {
                trace.push(
                    ResolutionStep::UserStatus,
                    StepResult::Deny,
                    format!("user '{}' not found", user_id),
                );
                return Ok(Decision::denied(trace.finish()));
            }
            Some(user) if !user.active => {
                trace.push(
                    ResolutionStep::UserStatus,
                    StepResult::Deny,
                    format!("user '{}' is inactive", user_id),
                );
                return Ok(Decision::denied(trace.finish()));
            }
            Some(_) => {
                trace.push(
                    ResolutionStep::UserStatus,
                    StepResult::Allow,
                    "user is active",
                );
            }
        }

        // 2. Permission lookup, most specific entry first
        let permission =
            match self.lookup_permission(&request.resource, &request.action, trace)? {
                Some(permission) => permission,
                None => {
                    trace.push(
                        ResolutionStep::PermissionLookup,
                        StepResult::Deny,
                        format!(
                            "no permission registered for '{}:{}' at any specificity",
                            request.resource, request.action
                        ),
                    );
                    return Ok(Decision::denied(trace.finish()));
                }
            };

        // 3. User override: authoritative, short-circuits roles entirely
        if let Some(effect) = self.store.find_override(user_id, &permission.id)? {
            let result = match effect {
                Effect::Allow => StepResult::Allow,
                Effect::Deny => StepResult::Deny,
            };
            trace.push(
                ResolutionStep::UserOverride,
                result,
                format!("user override on '{}': {}", permission.key, effect),
            );
            return Ok(Decision::from_effect(effect, trace.finish()));
        }
        trace.push(
            ResolutionStep::UserOverride,
            StepResult::Skip,
            "no user override",
        );

        // 4. Role aggregation
        let role_ids = self.store.assigned_roles(user_id)?;
        if role_ids.is_empty() {
            trace.push(
                ResolutionStep::RoleLookup,
                StepResult::Deny,
                "user holds no roles",
            );
            return Ok(Decision::denied(trace.finish()));
        }
        trace.push(
            ResolutionStep::RoleLookup,
            StepResult::Allow,
            format!("user holds {} role(s)", role_ids.len()),
        );

        let effects = self.store.role_effects(&role_ids, &permission.id)?;
        if effects.contains(&Effect::Deny) {
            trace.push(
                ResolutionStep::RolePermissions,
                StepResult::Deny,
                format!("a held role denies '{}'", permission.key),
            );
            return Ok(Decision::denied(trace.finish()));
        }
        if effects.contains(&Effect::Allow) {
            trace.push(
                ResolutionStep::RolePermissions,
                StepResult::Allow,
                format!("a held role allows '{}'", permission.key),
            );
            return Ok(Decision::allowed(trace.finish()));
        }
        trace.push(
            ResolutionStep::RolePermissions,
            StepResult::Skip,
            "no role rule for this permission",
        );

        // 5. Default-closed
        trace.push(
            ResolutionStep::Default,
            StepResult::Deny,
            "no matching rule; access denied by default",
        );
        Ok(Decision::denied(trace.finish()))
    }

    /// Find the permission record for (resource, action), trying the exact
    /// key, then the resource wildcard, then the global wildcard. The first
    /// match stops the search.
    fn lookup_permission(
        &self,
        resource: &str,
        action: &str,
        trace: &mut TraceRecorder,
    ) -> Result<Option<Permission>> {
        let exact = PermissionKey::new(resource, action);
        if let Some(permission) = self.store.find_permission(&exact)? {
            trace.push(
                ResolutionStep::PermissionLookup,
                StepResult::Allow,
                format!("exact permission '{}'", permission.key),
            );
            return Ok(Some(permission));
        }

        let resource_wide = PermissionKey::resource_wildcard(resource);
        if let Some(permission) = self.store.find_permission(&resource_wide)? {
            trace.push(
                ResolutionStep::PermissionLookup,
                StepResult::Allow,
                format!("resolved via resource wildcard '{}'", permission.key),
            );
            return Ok(Some(permission));
        }

        let global = PermissionKey::global_wildcard();
        if let Some(permission) = self.store.find_permission(&global)? {
            trace.push(
                ResolutionStep::PermissionLookup,
                StepResult::Allow,
                "resolved via global wildcard '*:*'",
            );
            return Ok(Some(permission));
        }

        Ok(None)
    }
}
