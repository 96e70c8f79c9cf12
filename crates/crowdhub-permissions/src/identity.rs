//! Authenticated identity lookup
//!
//! The resolver never reads ambient session state. Whoever constructs it
//! injects an [`IdentityProvider`] that supplies the caller's authenticated
//! user id, so resolution stays testable and explicit about where the
//! subject comes from.

/// Supplies the current authenticated user id, if any
pub trait IdentityProvider: Send + Sync {
    /// The authenticated user id for the current session
    fn current_user_id(&self) -> Option<String>;
}

/// Fixed identity, for sessions whose user is known up front and for tests
pub struct StaticIdentity {
    user_id: Option<String>,
}

impl StaticIdentity {
    /// Identity of a signed-in user
    pub fn user(user_id: impl Into<String>) -> Self {
        Self {
            user_id: Some(user_id.into()),
        }
    }

    /// No authenticated user
    pub fn anonymous() -> Self {
        Self { user_id: None }
    }
}

impl IdentityProvider for StaticIdentity {
    fn current_user_id(&self) -> Option<String> {
        self.user_id.clone()
    }
}
