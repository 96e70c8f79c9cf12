//! Storage integration for the access-control system
//!
//! The resolver sees storage through the read-only [`PermissionStore`]
//! trait: five relation queries, each re-reading current state. There is no
//! caching layer; reference data changes rarely and a stale grant is worse
//! than a repeated read. Administrative mutation lives on the concrete
//! stores, not on the trait.

use std::path::Path;
use std::sync::RwLock;

use serde::{Deserialize, Serialize};

use crate::audit::AccessLogEntry;
use crate::error::{Error, Result};
use crate::permission::{
    Effect, Permission, PermissionKey, Role, RoleAssignment, User, UserOverride,
};

/// Read-only query interface over the permission relations
pub trait PermissionStore: Send + Sync {
    /// Look up a user by id
    fn find_user(&self, user_id: &str) -> Result<Option<User>>;

    /// Look up a permission by its exact key. Wildcard fallback order is the
    /// resolver's job; the store only answers exact-key queries.
    fn find_permission(&self, key: &PermissionKey) -> Result<Option<Permission>>;

    /// Look up a user-level override for a permission
    fn find_override(&self, user_id: &str, permission_id: &str) -> Result<Option<Effect>>;

    /// Ids of all roles held by a user
    fn assigned_roles(&self, user_id: &str) -> Result<Vec<String>>;

    /// Effects the given roles assign to a permission, in role order
    fn role_effects(&self, role_ids: &[String], permission_id: &str) -> Result<Vec<Effect>>;
}

/// The serialized form of the permission relations.
///
/// Shared by the in-memory store (as its live state) and the file store (as
/// the on-disk document).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PermissionSnapshot {
    pub users: Vec<User>,
    pub permissions: Vec<Permission>,
    pub roles: Vec<Role>,
    pub assignments: Vec<RoleAssignment>,
    pub overrides: Vec<UserOverride>,
}

impl PermissionSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    fn find_user(&self, user_id: &str) -> Option<User> {
        self.users.iter().find(|u| u.id == user_id).cloned()
    }

    fn find_permission(&self, key: &PermissionKey) -> Option<Permission> {
        self.permissions.iter().find(|p| &p.key == key).cloned()
    }

    fn find_override(&self, user_id: &str, permission_id: &str) -> Option<Effect> {
        self.overrides
            .iter()
            .find(|o| o.user_id == user_id && o.permission_id == permission_id)
            .map(|o| o.effect)
    }

    fn assigned_roles(&self, user_id: &str) -> Vec<String> {
        self.assignments
            .iter()
            .filter(|a| a.user_id == user_id)
            .map(|a| a.role_id.clone())
            .collect()
    }

    fn role_effects(&self, role_ids: &[String], permission_id: &str) -> Vec<Effect> {
        self.roles
            .iter()
            .filter(|role| role_ids.contains(&role.id))
            .filter_map(|role| role.effect_for(permission_id))
            .collect()
    }
}

/// In-memory permission store.
///
/// The live store for single-process deployments and the test double
/// everywhere else. Administrative mutators cover the relations the
/// admin screens manage.
pub struct InMemoryPermissionStore {
    inner: RwLock<PermissionSnapshot>,
}

impl InMemoryPermissionStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(PermissionSnapshot::new()),
        }
    }

    /// Create a store seeded from a snapshot
    pub fn from_snapshot(snapshot: PermissionSnapshot) -> Self {
        Self {
            inner: RwLock::new(snapshot),
        }
    }

    /// Current contents as a snapshot
    pub fn snapshot(&self) -> Result<PermissionSnapshot> {
        Ok(self.read()?.clone())
    }

    pub fn add_user(&self, user: User) -> Result<()> {
        self.write()?.users.push(user);
        Ok(())
    }

    /// Mark a user inactive; missing users are left as-is
    pub fn deactivate_user(&self, user_id: &str) -> Result<()> {
        let mut inner = self.write()?;
        if let Some(user) = inner.users.iter_mut().find(|u| u.id == user_id) {
            user.active = false;
        }
        Ok(())
    }

    pub fn add_permission(&self, permission: Permission) -> Result<()> {
        self.write()?.permissions.push(permission);
        Ok(())
    }

    pub fn add_role(&self, role: Role) -> Result<()> {
        self.write()?.roles.push(role);
        Ok(())
    }

    pub fn assign_role(&self, user_id: impl Into<String>, role_id: impl Into<String>) -> Result<()> {
        self.write()?.assignments.push(RoleAssignment {
            user_id: user_id.into(),
            role_id: role_id.into(),
        });
        Ok(())
    }

    pub fn revoke_role(&self, user_id: &str, role_id: &str) -> Result<()> {
        self.write()?
            .assignments
            .retain(|a| !(a.user_id == user_id && a.role_id == role_id));
        Ok(())
    }

    /// Set a user-level override, replacing any existing one for the pair
    pub fn set_override(
        &self,
        user_id: impl Into<String>,
        permission_id: impl Into<String>,
        effect: Effect,
    ) -> Result<()> {
        let user_id = user_id.into();
        let permission_id = permission_id.into();
        let mut inner = self.write()?;
        inner
            .overrides
            .retain(|o| !(o.user_id == user_id && o.permission_id == permission_id));
        inner.overrides.push(UserOverride {
            user_id,
            permission_id,
            effect,
        });
        Ok(())
    }

    pub fn clear_override(&self, user_id: &str, permission_id: &str) -> Result<()> {
        self.write()?
            .overrides
            .retain(|o| !(o.user_id == user_id && o.permission_id == permission_id));
        Ok(())
    }

    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, PermissionSnapshot>> {
        self.inner
            .read()
            .map_err(|e| Error::Internal(format!("Failed to read store: {}", e)))
    }

    fn write(&self) -> Result<std::sync::RwLockWriteGuard<'_, PermissionSnapshot>> {
        self.inner
            .write()
            .map_err(|e| Error::Internal(format!("Failed to write store: {}", e)))
    }
}

impl Default for InMemoryPermissionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl PermissionStore for InMemoryPermissionStore {
    fn find_user(&self, user_id: &str) -> Result<Option<User>> {
        Ok(self.read()?.find_user(user_id))
    }

    fn find_permission(&self, key: &PermissionKey) -> Result<Option<Permission>> {
        Ok(self.read()?.find_permission(key))
    }

    fn find_override(&self, user_id: &str, permission_id: &str) -> Result<Option<Effect>> {
        Ok(self.read()?.find_override(user_id, permission_id))
    }

    fn assigned_roles(&self, user_id: &str) -> Result<Vec<String>> {
        Ok(self.read()?.assigned_roles(user_id))
    }

    fn role_effects(&self, role_ids: &[String], permission_id: &str) -> Result<Vec<Effect>> {
        Ok(self.read()?.role_effects(role_ids, permission_id))
    }
}

/// File-backed permission store.
///
/// Holds the snapshot as a JSON document and re-reads it on every query,
/// honoring the no-caching contract. Access logs are persisted next to the
/// snapshot. Read failures surface as [`Error::StoreUnavailable`] so callers
/// can tell an outage apart from a deny.
pub struct FilePermissionStore {
    snapshot_path: std::path::PathBuf,
    access_log_path: std::path::PathBuf,
}

impl FilePermissionStore {
    /// Create a store over explicit file paths
    pub fn new<P: AsRef<Path>>(snapshot_path: P, access_log_path: P) -> Self {
        Self {
            snapshot_path: snapshot_path.as_ref().to_path_buf(),
            access_log_path: access_log_path.as_ref().to_path_buf(),
        }
    }

    /// Create a store with default filenames under a base directory
    pub fn with_defaults<P: AsRef<Path>>(base_path: P) -> Self {
        let base = base_path.as_ref();
        Self {
            snapshot_path: base.join("permissions.json"),
            access_log_path: base.join("access_logs.json"),
        }
    }

    /// Load the snapshot; an absent file reads as the empty snapshot
    pub fn load_snapshot(&self) -> Result<PermissionSnapshot> {
        if !self.snapshot_path.exists() {
            return Ok(PermissionSnapshot::new());
        }

        let content = std::fs::read_to_string(&self.snapshot_path)
            .map_err(|e| Error::StoreUnavailable(e.to_string()))?;
        let snapshot = serde_json::from_str(&content)?;
        Ok(snapshot)
    }

    /// Persist a snapshot, creating parent directories as needed
    pub fn save_snapshot(&self, snapshot: &PermissionSnapshot) -> Result<()> {
        if let Some(parent) = self.snapshot_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(snapshot)?;
        std::fs::write(&self.snapshot_path, content)?;
        Ok(())
    }

    /// Load persisted access logs; an absent file reads as empty
    pub fn load_access_logs(&self) -> Result<Vec<AccessLogEntry>> {
        if !self.access_log_path.exists() {
            return Ok(Vec::new());
        }

        let content = std::fs::read_to_string(&self.access_log_path)
            .map_err(|e| Error::StoreUnavailable(e.to_string()))?;
        let logs = serde_json::from_str(&content)?;
        Ok(logs)
    }

    /// Persist access logs, creating parent directories as needed
    pub fn save_access_logs(&self, logs: &[AccessLogEntry]) -> Result<()> {
        if let Some(parent) = self.access_log_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(logs)?;
        std::fs::write(&self.access_log_path, content)?;
        Ok(())
    }

    /// Append a single access log entry
    pub fn append_access_log(&self, entry: &AccessLogEntry) -> Result<()> {
        let mut logs = self.load_access_logs()?;
        logs.push(entry.clone());
        self.save_access_logs(&logs)?;
        Ok(())
    }
}

impl PermissionStore for FilePermissionStore {
    fn find_user(&self, user_id: &str) -> Result<Option<User>> {
        Ok(self.load_snapshot()?.find_user(user_id))
    }

    fn find_permission(&self, key: &PermissionKey) -> Result<Option<Permission>> {
        Ok(self.load_snapshot()?.find_permission(key))
    }

    fn find_override(&self, user_id: &str, permission_id: &str) -> Result<Option<Effect>> {
        Ok(self.load_snapshot()?.find_override(user_id, permission_id))
    }

    fn assigned_roles(&self, user_id: &str) -> Result<Vec<String>> {
        Ok(self.load_snapshot()?.assigned_roles(user_id))
    }

    fn role_effects(&self, role_ids: &[String], permission_id: &str) -> Result<Vec<Effect>> {
        Ok(self.load_snapshot()?.role_effects(role_ids, permission_id))
    }
}
