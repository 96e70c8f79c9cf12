//! Property-based tests for cross-crate resolution behavior
//!
//! Covers the contracts that span crates: request validation through
//! crowdhub-common, the legacy bridge convention, and trace completeness.

use std::sync::Arc;

use proptest::prelude::*;

use crowdhub_permissions::{
    legacy, Effect, InMemoryPermissionStore, Permission, PermissionKey, PermissionResolver,
    PermissionSpec, ResolveRequest, Role, StaticIdentity, StepResult, User,
};

/// Strategy for resource names (may contain underscores)
fn resource_strategy() -> impl Strategy<Value = String> {
    r"[a-z][a-z0-9_]{0,12}".prop_map(|s| s.to_string())
}

/// Strategy for action names (no underscores, so the legacy bridge applies)
fn action_strategy() -> impl Strategy<Value = String> {
    r"[a-z][a-z0-9]{0,8}".prop_map(|s| s.to_string())
}

// ============================================================================
// Legacy bridge roundtrip
// ============================================================================
// For any pair whose action carries no underscore, converting to the legacy
// key and normalizing back yields the original pair.

proptest! {
    #[test]
    fn prop_legacy_bridge_roundtrips(
        resource in resource_strategy(),
        action in action_strategy(),
    ) {
        let key = PermissionKey::new(resource.clone(), action.clone());
        let bridged = key.legacy_key();
        let normalized = legacy::parse_legacy_key(&bridged).unwrap();

        prop_assert_eq!(normalized.resource, resource);
        prop_assert_eq!(normalized.action, action);
    }

    #[test]
    fn prop_spec_normalization_agrees_with_bridge(
        resource in resource_strategy(),
        action in action_strategy(),
    ) {
        let structured = PermissionSpec::structured(resource.clone(), action.clone());
        let via_legacy =
            PermissionSpec::legacy(legacy::legacy_key(&resource, &action));

        prop_assert_eq!(structured.normalize().unwrap(), via_legacy.normalize().unwrap());
    }
}

// ============================================================================
// Trace completeness
// ============================================================================
// A requested trace always ends with a decisive step whose result matches
// the decision; skip never terminates a trace.

proptest! {
    #[test]
    fn prop_trace_ends_with_decisive_step(
        resource in resource_strategy(),
        action in action_strategy(),
        register_permission in any::<bool>(),
        assign_role in any::<bool>(),
        effect in prop_oneof![Just(Effect::Allow), Just(Effect::Deny)],
    ) {
        let store = InMemoryPermissionStore::new();
        store.add_user(User::new("u-1")).unwrap();
        if register_permission {
            store
                .add_permission(Permission::new(
                    "p-1",
                    PermissionKey::new(resource.clone(), action.clone()),
                ))
                .unwrap();
            if assign_role {
                store
                    .add_role(Role::new("r-1", "role").with_rule("p-1", effect))
                    .unwrap();
                store.assign_role("u-1", "r-1").unwrap();
            }
        }

        let resolver = PermissionResolver::new(
            Arc::new(store),
            Arc::new(StaticIdentity::user("u-1")),
        );
        let decision = resolver
            .resolve(&ResolveRequest::new(resource, action).with_trace())
            .unwrap();

        let trace = decision.trace.expect("trace was requested");
        let last = trace.last().expect("trace is never empty");

        prop_assert_ne!(last.result, StepResult::Skip);
        match last.result {
            StepResult::Allow => prop_assert!(decision.allowed),
            StepResult::Deny => prop_assert!(!decision.allowed),
            StepResult::Skip => unreachable!(),
        }
    }
}

// ============================================================================
// Validation is total over malformed input
// ============================================================================
// Whatever the store holds, a blank component always fails validation and
// never reaches a decision.

proptest! {
    #[test]
    fn prop_blank_components_always_validation_errors(
        valid in resource_strategy(),
        blank in prop_oneof![Just("".to_string()), Just("   ".to_string())],
    ) {
        let store = InMemoryPermissionStore::new();
        store.add_user(User::new("u-1")).unwrap();
        let resolver = PermissionResolver::new(
            Arc::new(store),
            Arc::new(StaticIdentity::user("u-1")),
        );

        let err = resolver
            .resolve(&ResolveRequest::new(blank.clone(), valid.clone()))
            .unwrap_err();
        prop_assert!(err.is_validation());

        let err = resolver
            .resolve(&ResolveRequest::new(valid, blank))
            .unwrap_err();
        prop_assert!(err.is_validation());
    }
}
