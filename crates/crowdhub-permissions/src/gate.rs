//! Presentation-layer permission gate
//!
//! The gate decides what a screen should do with protected content: render
//! it, hide it, show a denied notice, or show a loading affordance. It never
//! renders anything itself; callers map the returned [`GateOutcome`] onto
//! their UI. Checks can mix legacy string keys and structured
//! (resource, action) pairs, aggregated with ANY or ALL semantics.

use std::sync::Arc;

use crate::error::Result;
use crate::feature::FeatureFlags;
use crate::legacy::{parse_legacy_key, LegacyPermissionChecker};
use crate::permission::{PermissionKey, PermissionResolver, ResolveRequest};

/// One permission requirement, in either naming system
#[derive(Debug, Clone)]
pub enum PermissionSpec {
    /// Flat legacy key, e.g. "edit_articles"
    Legacy(String),
    /// Structured (resource, action) pair
    Structured(PermissionKey),
}

impl PermissionSpec {
    /// A legacy string-keyed requirement
    pub fn legacy(key: impl Into<String>) -> Self {
        PermissionSpec::Legacy(key.into())
    }

    /// A structured requirement
    pub fn structured(resource: impl Into<String>, action: impl Into<String>) -> Self {
        PermissionSpec::Structured(PermissionKey::new(resource, action))
    }

    /// Normalize to a structured key. Legacy keys convert via the
    /// `{action}_{resource}` bridge; malformed keys are validation errors.
    pub fn normalize(&self) -> Result<PermissionKey> {
        match self {
            PermissionSpec::Structured(key) => Ok(key.clone()),
            PermissionSpec::Legacy(key) => parse_legacy_key(key),
        }
    }
}

/// What the gate should require before rendering
#[derive(Debug, Clone)]
pub struct GateSpec {
    /// Requirements to check; empty means nothing to check
    pub permissions: Vec<PermissionSpec>,
    /// ALL semantics when set; ANY otherwise
    pub require_all: bool,
    /// Feature flag checked before any permission
    pub feature: Option<String>,
    /// Hide instead of showing a denied notice
    pub hide_on_denied: bool,
    /// Show an explicit loading affordance while the context loads
    pub show_loading: bool,
}

impl GateSpec {
    /// Gate on a single requirement
    pub fn permission(spec: PermissionSpec) -> Self {
        Self::permissions(vec![spec])
    }

    /// Gate on several requirements (ANY by default)
    pub fn permissions(specs: Vec<PermissionSpec>) -> Self {
        Self {
            permissions: specs,
            require_all: false,
            feature: None,
            hide_on_denied: false,
            show_loading: false,
        }
    }

    /// Require every listed permission
    pub fn require_all(mut self) -> Self {
        self.require_all = true;
        self
    }

    /// Also require a feature flag
    pub fn feature(mut self, flag: impl Into<String>) -> Self {
        self.feature = Some(flag.into());
        self
    }

    /// Hide the content on denial instead of showing a notice
    pub fn hide_on_denied(mut self) -> Self {
        self.hide_on_denied = true;
        self
    }

    /// Show a loading affordance while the permission context loads
    pub fn show_loading(mut self) -> Self {
        self.show_loading = true;
        self
    }
}

/// Legacy checker plus the caller's held roles, used when the structured
/// resolver is not mounted
#[derive(Clone)]
pub struct LegacyFallback {
    pub checker: Arc<LegacyPermissionChecker>,
    pub held_roles: Vec<String>,
}

/// The permission context a screen runs under.
///
/// Both handles are optional: the RBAC resolver may not be mounted yet on a
/// given screen, and fully migrated screens carry no legacy fallback. With
/// neither present every check reads as "no access yet".
#[derive(Clone, Default)]
pub struct ReadyContext {
    pub resolver: Option<Arc<PermissionResolver>>,
    pub legacy: Option<LegacyFallback>,
}

impl ReadyContext {
    /// Context backed by the structured resolver
    pub fn with_resolver(resolver: Arc<PermissionResolver>) -> Self {
        Self {
            resolver: Some(resolver),
            legacy: None,
        }
    }

    /// Context backed by the legacy checker only
    pub fn with_legacy(checker: Arc<LegacyPermissionChecker>, held_roles: Vec<String>) -> Self {
        Self {
            resolver: None,
            legacy: Some(LegacyFallback {
                checker,
                held_roles,
            }),
        }
    }

    /// Attach a legacy fallback to a resolver-backed context
    pub fn and_legacy(
        mut self,
        checker: Arc<LegacyPermissionChecker>,
        held_roles: Vec<String>,
    ) -> Self {
        self.legacy = Some(LegacyFallback {
            checker,
            held_roles,
        });
        self
    }
}

/// Whether the permission context has finished loading
#[derive(Clone)]
pub enum GateContext {
    /// Context still loading; nothing may be rendered yet
    Loading,
    /// Context ready for checks
    Ready(ReadyContext),
}

/// What the caller should render
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateOutcome {
    /// Render the protected content
    Render,
    /// Render the loading affordance
    Loading,
    /// Render the caller's fallback or the default access-denied notice
    Denied,
    /// Render nothing
    Hidden,
}

/// Evaluates gate specs against the current context
pub struct PermissionGate {
    features: Option<Arc<dyn FeatureFlags>>,
}

impl PermissionGate {
    /// Gate with no feature flag store; any feature-gated spec hides
    pub fn new() -> Self {
        Self { features: None }
    }

    /// Gate with a feature flag store
    pub fn with_features(features: Arc<dyn FeatureFlags>) -> Self {
        Self {
            features: Some(features),
        }
    }

    /// Evaluate a spec against the context.
    ///
    /// The feature flag runs first; a disabled feature hides the content
    /// regardless of permissions. A loading context renders nothing (or the
    /// loading affordance when requested) rather than flashing denied
    /// content. Store failures propagate as errors.
    pub fn evaluate(&self, spec: &GateSpec, context: &GateContext) -> Result<GateOutcome> {
        if let Some(flag) = &spec.feature {
            let enabled = match &self.features {
                Some(features) => features.is_enabled(flag)?,
                None => false,
            };
            if !enabled {
                return Ok(GateOutcome::Hidden);
            }
        }

        let ready = match context {
            GateContext::Loading => {
                return Ok(if spec.show_loading {
                    GateOutcome::Loading
                } else {
                    GateOutcome::Hidden
                });
            }
            GateContext::Ready(ready) => ready,
        };

        let passed = self.check_all(spec, ready)?;
        if passed {
            Ok(GateOutcome::Render)
        } else if spec.hide_on_denied {
            Ok(GateOutcome::Hidden)
        } else {
            Ok(GateOutcome::Denied)
        }
    }

    fn check_all(&self, spec: &GateSpec, ready: &ReadyContext) -> Result<bool> {
        if spec.permissions.is_empty() {
            return Ok(true);
        }

        if spec.require_all {
            for permission in &spec.permissions {
                if !self.check_one(permission, ready)? {
                    return Ok(false);
                }
            }
            Ok(true)
        } else {
            for permission in &spec.permissions {
                if self.check_one(permission, ready)? {
                    return Ok(true);
                }
            }
            Ok(false)
        }
    }

    fn check_one(&self, spec: &PermissionSpec, ready: &ReadyContext) -> Result<bool> {
        match spec {
            PermissionSpec::Structured(key) => {
                if let Some(resolver) = &ready.resolver {
                    let request = ResolveRequest::new(key.resource.clone(), key.action.clone());
                    Ok(resolver.resolve(&request)?.allowed)
                } else if let Some(legacy) = &ready.legacy {
                    Ok(legacy
                        .checker
                        .any_role_has(&legacy.held_roles, &key.legacy_key()))
                } else {
                    // No usable checker mounted: no access yet
                    Ok(false)
                }
            }
            PermissionSpec::Legacy(key) => {
                if let Some(legacy) = &ready.legacy {
                    Ok(legacy.checker.any_role_has(&legacy.held_roles, key))
                } else if let Some(resolver) = &ready.resolver {
                    let normalized = parse_legacy_key(key)?;
                    let request = ResolveRequest::new(normalized.resource, normalized.action);
                    Ok(resolver.resolve(&request)?.allowed)
                } else {
                    Ok(false)
                }
            }
        }
    }
}

impl Default for PermissionGate {
    fn default() -> Self {
        Self::new()
    }
}
