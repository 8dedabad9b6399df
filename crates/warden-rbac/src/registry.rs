//! Role registry: owns roles and each role's permission set.
//!
//! Assignment is additive and idempotent: assigning a permission a role
//! already holds changes nothing. Revocation filters the id out and always
//! succeeds for an existing role, member or not.

use std::collections::HashMap;

use tracing::{debug, info};
use uuid::Uuid;
use warden_core::error::{WardenError, WardenResult};
use warden_core::models::permission::Permission;
use warden_core::models::role::{CreateRole, ResolvedRole, Role, UpdateRole};
use warden_core::normalize;
use warden_core::repository::{
    ListQuery, Page, Pagination, PermissionRepository, RoleRepository, UserRepository,
};

use crate::config::DeletePolicy;

const ENTITY: &str = "role";

/// Role registry service.
///
/// The user repository is only touched when deletes cascade.
pub struct RoleRegistry<R: RoleRepository, P: PermissionRepository, U: UserRepository> {
    roles: R,
    permissions: P,
    users: U,
    delete_policy: DeletePolicy,
}

impl<R: RoleRepository, P: PermissionRepository, U: UserRepository> RoleRegistry<R, P, U> {
    pub fn new(roles: R, permissions: P, users: U, delete_policy: DeletePolicy) -> Self {
        Self {
            roles,
            permissions,
            users,
            delete_policy,
        }
    }

    /// Create a role. Repeated ids in `permission_ids` are collapsed.
    pub async fn create(&self, name: &str, permission_ids: Vec<Uuid>) -> WardenResult<Role> {
        let name = normalize::name("role name", name)?;
        self.ensure_name_free(&name, None).await?;

        let role = self
            .roles
            .create(CreateRole {
                name,
                permission_ids: normalize::unique_ids(permission_ids),
            })
            .await?;

        info!(
            role_id = %role.id,
            name = %role.name,
            permissions = role.permission_ids.len(),
            "Role created"
        );
        Ok(role)
    }

    /// Replace both the name and the permission set.
    pub async fn update(
        &self,
        id: Uuid,
        name: &str,
        permission_ids: Vec<Uuid>,
    ) -> WardenResult<Role> {
        let name = normalize::name("role name", name)?;
        self.roles.get_by_id(id).await?;
        self.ensure_name_free(&name, Some(id)).await?;

        let role = self
            .roles
            .update(
                id,
                UpdateRole {
                    name,
                    permission_ids: normalize::unique_ids(permission_ids),
                },
            )
            .await?;

        info!(role_id = %id, name = %role.name, "Role updated");
        Ok(role)
    }

    pub async fn delete(&self, id: Uuid) -> WardenResult<()> {
        self.roles.delete(id).await?;

        match self.delete_policy {
            DeletePolicy::Retain => {
                info!(role_id = %id, "Role deleted; user references retained");
            }
            DeletePolicy::Cascade => {
                let users_changed = self.users.clear_role_from_all(id).await?;
                info!(role_id = %id, users_changed, "Role deleted with cascade");
            }
        }
        Ok(())
    }

    /// Fetch a role with its permissions resolved.
    pub async fn get(&self, id: Uuid) -> WardenResult<ResolvedRole> {
        let role = self.roles.get_by_id(id).await?;
        let permissions = self.resolve(&role).await?;
        Ok(ResolvedRole::new(role, permissions))
    }

    pub async fn get_by_name(&self, name: &str) -> WardenResult<ResolvedRole> {
        let role = self.roles.get_by_name(name.trim()).await?;
        let permissions = self.resolve(&role).await?;
        Ok(ResolvedRole::new(role, permissions))
    }

    /// Roles by name ascending, permissions resolved.
    pub async fn list(&self, pagination: Pagination) -> WardenResult<Page<ResolvedRole>> {
        let page = self.roles.list(ListQuery::all(pagination)).await?;
        self.resolve_page(page).await
    }

    /// Case-insensitive substring match on the name, newest first.
    pub async fn search(
        &self,
        term: &str,
        pagination: Pagination,
    ) -> WardenResult<Page<ResolvedRole>> {
        let page = self.roles.list(ListQuery::search(term, pagination)).await?;
        self.resolve_page(page).await
    }

    pub async fn permissions_of(&self, id: Uuid) -> WardenResult<Vec<Permission>> {
        let role = self.roles.get_by_id(id).await?;
        self.resolve(&role).await
    }

    /// Grant a permission to a role. A no-op if the role already holds it.
    pub async fn assign_permission(&self, role_id: Uuid, permission_id: Uuid) -> WardenResult<Role> {
        let role = self.roles.get_by_id(role_id).await?;
        if role.has_permission(permission_id) {
            debug!(%role_id, %permission_id, "Permission already assigned");
            return Ok(role);
        }

        self.permissions.get_by_id(permission_id).await?;
        let role = self.roles.add_permission(role_id, permission_id).await?;

        info!(%role_id, %permission_id, "Permission assigned to role");
        Ok(role)
    }

    /// Withdraw a permission from a role. Succeeds whether or not the role
    /// held it.
    pub async fn revoke_permission(&self, role_id: Uuid, permission_id: Uuid) -> WardenResult<Role> {
        let role = self.roles.remove_permission(role_id, permission_id).await?;
        info!(%role_id, %permission_id, "Permission revoked from role");
        Ok(role)
    }

    async fn resolve(&self, role: &Role) -> WardenResult<Vec<Permission>> {
        let permissions = self.permissions.get_many(&role.permission_ids).await?;
        let dangling = role.permission_ids.len().saturating_sub(permissions.len());
        if dangling > 0 {
            debug!(role_id = %role.id, dangling, "Skipping dangling permission references");
        }
        Ok(permissions)
    }

    async fn resolve_page(&self, page: Page<Role>) -> WardenResult<Page<ResolvedRole>> {
        let ids = normalize::unique_ids(
            page.items
                .iter()
                .flat_map(|role| role.permission_ids.iter().copied()),
        );
        let by_id: HashMap<Uuid, Permission> = self
            .permissions
            .get_many(&ids)
            .await?
            .into_iter()
            .map(|p| (p.id, p))
            .collect();

        Ok(page.map(|role| {
            let permissions = role
                .permission_ids
                .iter()
                .filter_map(|id| by_id.get(id).cloned())
                .collect();
            ResolvedRole::new(role, permissions)
        }))
    }

    async fn ensure_name_free(&self, name: &str, owner: Option<Uuid>) -> WardenResult<()> {
        match self.roles.get_by_name(name).await {
            Ok(existing) if Some(existing.id) == owner => Ok(()),
            Ok(_) => Err(WardenError::DuplicateName {
                entity: ENTITY.into(),
                name: name.into(),
            }),
            Err(e) if e.is_not_found() => Ok(()),
            Err(e) => Err(e),
        }
    }
}
