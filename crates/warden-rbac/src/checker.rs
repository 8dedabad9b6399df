//! Answers "may this user use this permission?".
//!
//! The check walks user → role → permissions on every call with no
//! caching. References that no longer resolve (a deleted role, a deleted
//! permission) deny rather than fail.

use tracing::debug;
use uuid::Uuid;
use warden_core::error::WardenResult;
use warden_core::repository::{PermissionRepository, RoleRepository, UserRepository};

/// Read-only composer over the three stores.
pub struct AuthorizationChecker<U: UserRepository, R: RoleRepository, P: PermissionRepository> {
    users: U,
    roles: R,
    permissions: P,
}

impl<U: UserRepository, R: RoleRepository, P: PermissionRepository> AuthorizationChecker<U, R, P> {
    pub fn new(users: U, roles: R, permissions: P) -> Self {
        Self {
            users,
            roles,
            permissions,
        }
    }

    /// `Ok(true)` iff the user's role holds a permission named exactly
    /// `permission_name`. Fails only when the user itself does not exist
    /// or the store is unavailable.
    pub async fn can(&self, user_id: Uuid, permission_name: &str) -> WardenResult<bool> {
        let user = self.users.get_by_id(user_id).await?;

        let Some(role_id) = user.role_id else {
            debug!(%user_id, permission = permission_name, "Denied: user has no role");
            return Ok(false);
        };

        let role = match self.roles.get_by_id(role_id).await {
            Ok(role) => role,
            Err(e) if e.is_not_found() => {
                debug!(%user_id, %role_id, "Denied: role reference is dangling");
                return Ok(false);
            }
            Err(e) => return Err(e),
        };

        let permissions = self.permissions.get_many(&role.permission_ids).await?;
        let dangling = role.permission_ids.len().saturating_sub(permissions.len());
        if dangling > 0 {
            debug!(%role_id, dangling, "Skipping dangling permission references");
        }

        let granted = permissions.iter().any(|p| p.name == permission_name);
        debug!(
            %user_id,
            %role_id,
            permission = permission_name,
            granted,
            "Authorization check"
        );
        Ok(granted)
    }
}
