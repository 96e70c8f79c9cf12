//! RBAC permission model and resolution

pub mod models;
pub mod resolver;

pub use models::{
    Decision, Effect, Permission, PermissionKey, ResolutionStep, Role, RoleAssignment, RoleRule,
    StepResult, TraceStep, User, UserOverride, WILDCARD,
};
pub use resolver::{PermissionResolver, ResolveRequest};
