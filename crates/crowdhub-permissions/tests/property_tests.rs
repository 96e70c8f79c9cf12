//! Property-based tests for crowdhub-permissions
//!
//! These verify the resolution invariants that should hold across all
//! inputs: override supremacy, deny-over-allow across roles, the wildcard
//! fallback order, and default-closed behavior.

use std::sync::Arc;

use proptest::prelude::*;

use crowdhub_permissions::{
    Effect, InMemoryPermissionStore, Permission, PermissionKey, PermissionResolver,
    ResolveRequest, Role, StaticIdentity, User,
};

/// Strategy for generating resource and action identifiers
fn identifier_strategy() -> impl Strategy<Value = String> {
    r"[a-z][a-z0-9_]{0,12}".prop_map(|s| s.to_string())
}

/// Strategy for generating user ids
fn user_id_strategy() -> impl Strategy<Value = String> {
    r"u-[a-z0-9]{1,8}".prop_map(|s| s.to_string())
}

fn resolver_over(store: InMemoryPermissionStore, user: &str) -> PermissionResolver {
    PermissionResolver::new(Arc::new(store), Arc::new(StaticIdentity::user(user)))
}

// ============================================================================
// Property 1: Override supremacy
// ============================================================================
// A user override on the resolved permission decides the outcome no matter
// what the user's roles say.

proptest! {
    #[test]
    fn prop_override_beats_any_role_result(
        user in user_id_strategy(),
        resource in identifier_strategy(),
        action in identifier_strategy(),
        role_effect in prop_oneof![Just(Effect::Allow), Just(Effect::Deny)],
        override_effect in prop_oneof![Just(Effect::Allow), Just(Effect::Deny)],
    ) {
        let store = InMemoryPermissionStore::new();
        store.add_user(User::new(user.clone())).unwrap();
        store
            .add_permission(Permission::new("p-1", PermissionKey::new(resource.clone(), action.clone())))
            .unwrap();
        store
            .add_role(Role::new("r-1", "some-role").with_rule("p-1", role_effect))
            .unwrap();
        store.assign_role(user.clone(), "r-1").unwrap();
        store.set_override(user.clone(), "p-1", override_effect).unwrap();

        let resolver = resolver_over(store, &user);
        let decision = resolver
            .resolve(&ResolveRequest::new(resource, action))
            .unwrap();

        // The override effect is the outcome, regardless of the role rule
        prop_assert_eq!(decision.allowed, override_effect == Effect::Allow);
    }
}

// ============================================================================
// Property 2: Deny wins across roles
// ============================================================================
// Holding any role that denies a permission denies it, however many other
// roles allow it.

proptest! {
    #[test]
    fn prop_single_deny_overrides_many_allows(
        user in user_id_strategy(),
        resource in identifier_strategy(),
        action in identifier_strategy(),
        allowing_roles in 1usize..6,
    ) {
        let store = InMemoryPermissionStore::new();
        store.add_user(User::new(user.clone())).unwrap();
        store
            .add_permission(Permission::new("p-1", PermissionKey::new(resource.clone(), action.clone())))
            .unwrap();

        for i in 0..allowing_roles {
            let role_id = format!("r-allow-{}", i);
            store
                .add_role(Role::new(role_id.clone(), "allower").with_rule("p-1", Effect::Allow))
                .unwrap();
            store.assign_role(user.clone(), role_id).unwrap();
        }

        store
            .add_role(Role::new("r-deny", "restricted").with_rule("p-1", Effect::Deny))
            .unwrap();
        store.assign_role(user.clone(), "r-deny").unwrap();

        let resolver = resolver_over(store, &user);
        let decision = resolver
            .resolve(&ResolveRequest::new(resource, action))
            .unwrap();

        prop_assert!(!decision.allowed, "a denying role must win over allowing roles");
    }
}

// ============================================================================
// Property 3: Wildcard fallback order
// ============================================================================
// When entries exist at several specificities, lookup binds to the most
// specific one and its rules alone decide.

proptest! {
    #[test]
    fn prop_exact_entry_shadows_wildcards(
        user in user_id_strategy(),
        resource in identifier_strategy(),
        action in identifier_strategy(),
        exact_effect in prop_oneof![Just(Effect::Allow), Just(Effect::Deny)],
    ) {
        let store = InMemoryPermissionStore::new();
        store.add_user(User::new(user.clone())).unwrap();
        store
            .add_permission(Permission::new("p-exact", PermissionKey::new(resource.clone(), action.clone())))
            .unwrap();
        store
            .add_permission(Permission::new("p-wide", PermissionKey::resource_wildcard(resource.clone())))
            .unwrap();
        store
            .add_permission(Permission::new("p-global", PermissionKey::global_wildcard()))
            .unwrap();

        // The wildcard entries carry the opposite effect of the exact one
        let opposite = match exact_effect {
            Effect::Allow => Effect::Deny,
            Effect::Deny => Effect::Allow,
        };
        store
            .add_role(
                Role::new("r-1", "mixed")
                    .with_rule("p-exact", exact_effect)
                    .with_rule("p-wide", opposite)
                    .with_rule("p-global", opposite),
            )
            .unwrap();
        store.assign_role(user.clone(), "r-1").unwrap();

        let resolver = resolver_over(store, &user);
        let decision = resolver
            .resolve(&ResolveRequest::new(resource, action))
            .unwrap();

        prop_assert_eq!(decision.allowed, exact_effect == Effect::Allow);
    }
}

// ============================================================================
// Property 4: Default-closed
// ============================================================================
// With no matching permission entry at any specificity, every check denies.

proptest! {
    #[test]
    fn prop_unregistered_permission_always_denies(
        user in user_id_strategy(),
        resource in identifier_strategy(),
        action in identifier_strategy(),
    ) {
        let store = InMemoryPermissionStore::new();
        store.add_user(User::new(user.clone())).unwrap();
        // Generous role that would allow anything it had a rule for
        store
            .add_role(Role::new("r-1", "generous"))
            .unwrap();
        store.assign_role(user.clone(), "r-1").unwrap();

        let resolver = resolver_over(store, &user);
        let decision = resolver
            .resolve(&ResolveRequest::new(resource, action))
            .unwrap();

        prop_assert!(!decision.allowed);
    }
}

// ============================================================================
// Property 5: No roles, no override, no access
// ============================================================================

proptest! {
    #[test]
    fn prop_user_without_roles_never_allowed(
        user in user_id_strategy(),
        resource in identifier_strategy(),
        action in identifier_strategy(),
    ) {
        let store = InMemoryPermissionStore::new();
        store.add_user(User::new(user.clone())).unwrap();
        store
            .add_permission(Permission::new("p-1", PermissionKey::new(resource.clone(), action.clone())))
            .unwrap();

        let resolver = resolver_over(store, &user);
        let decision = resolver
            .resolve(&ResolveRequest::new(resource, action))
            .unwrap();

        prop_assert!(!decision.allowed);
    }
}

// ============================================================================
// Property 6: Resolution is repeatable
// ============================================================================
// The pass is read-only, so re-running the same check cannot change state
// or outcome.

proptest! {
    #[test]
    fn prop_resolution_is_idempotent(
        user in user_id_strategy(),
        resource in identifier_strategy(),
        action in identifier_strategy(),
        effect in prop_oneof![Just(Effect::Allow), Just(Effect::Deny)],
    ) {
        let store = InMemoryPermissionStore::new();
        store.add_user(User::new(user.clone())).unwrap();
        store
            .add_permission(Permission::new("p-1", PermissionKey::new(resource.clone(), action.clone())))
            .unwrap();
        store
            .add_role(Role::new("r-1", "role").with_rule("p-1", effect))
            .unwrap();
        store.assign_role(user.clone(), "r-1").unwrap();

        let resolver = resolver_over(store, &user);
        let request = ResolveRequest::new(resource, action);

        let first = resolver.resolve(&request).unwrap();
        let second = resolver.resolve(&request).unwrap();
        prop_assert_eq!(first.allowed, second.allowed);
        prop_assert_eq!(first.allowed, effect == Effect::Allow);
    }
}
