//! Permission catalog: owns the set of named permissions.

use tracing::{debug, info};
use uuid::Uuid;
use warden_core::error::{WardenError, WardenResult};
use warden_core::models::permission::{CreatePermission, Permission, UpdatePermission};
use warden_core::normalize;
use warden_core::repository::{ListQuery, Page, Pagination, PermissionRepository, RoleRepository};

use crate::config::DeletePolicy;

const ENTITY: &str = "permission";

/// Permission catalog service.
///
/// The role repository is only touched when deletes cascade.
pub struct PermissionCatalog<P: PermissionRepository, R: RoleRepository> {
    permissions: P,
    roles: R,
    delete_policy: DeletePolicy,
}

impl<P: PermissionRepository, R: RoleRepository> PermissionCatalog<P, R> {
    pub fn new(permissions: P, roles: R, delete_policy: DeletePolicy) -> Self {
        Self {
            permissions,
            roles,
            delete_policy,
        }
    }

    pub async fn create(&self, name: &str, module: Option<String>) -> WardenResult<Permission> {
        let name = normalize::name("permission name", name)?;
        self.ensure_name_free(&name, None).await?;

        let permission = self
            .permissions
            .create(CreatePermission {
                name,
                module: normalize::optional(module),
            })
            .await?;

        info!(permission_id = %permission.id, name = %permission.name, "Permission created");
        Ok(permission)
    }

    /// Rename a permission and/or change its module tag.
    pub async fn update(&self, id: Uuid, input: UpdatePermission) -> WardenResult<Permission> {
        self.permissions.get_by_id(id).await?;

        let name = match input.name {
            Some(raw) => {
                let name = normalize::name("permission name", &raw)?;
                self.ensure_name_free(&name, Some(id)).await?;
                Some(name)
            }
            None => None,
        };
        let module = input.module.map(normalize::optional);

        let permission = self
            .permissions
            .update(id, UpdatePermission { name, module })
            .await?;

        info!(permission_id = %id, name = %permission.name, "Permission updated");
        Ok(permission)
    }

    pub async fn delete(&self, id: Uuid) -> WardenResult<()> {
        self.permissions.delete(id).await?;

        match self.delete_policy {
            DeletePolicy::Retain => {
                info!(permission_id = %id, "Permission deleted; role references retained");
            }
            DeletePolicy::Cascade => {
                let roles_changed = self.roles.remove_permission_from_all(id).await?;
                info!(permission_id = %id, roles_changed, "Permission deleted with cascade");
            }
        }
        Ok(())
    }

    pub async fn get(&self, id: Uuid) -> WardenResult<Permission> {
        debug!(permission_id = %id, "Fetching permission");
        self.permissions.get_by_id(id).await
    }

    pub async fn get_by_name(&self, name: &str) -> WardenResult<Permission> {
        self.permissions.get_by_name(name.trim()).await
    }

    /// Newest first.
    pub async fn list(&self, pagination: Pagination) -> WardenResult<Page<Permission>> {
        self.permissions.list(ListQuery::all(pagination)).await
    }

    /// Case-insensitive substring match on the name, newest first.
    pub async fn search(&self, term: &str, pagination: Pagination) -> WardenResult<Page<Permission>> {
        self.permissions
            .list(ListQuery::search(term, pagination))
            .await
    }

    async fn ensure_name_free(&self, name: &str, owner: Option<Uuid>) -> WardenResult<()> {
        match self.permissions.get_by_name(name).await {
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
