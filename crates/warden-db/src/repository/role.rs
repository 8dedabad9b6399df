//! SurrealDB implementation of [`RoleRepository`].
//!
//! A role's permission set is an array of permission id strings on the
//! role record. Appends and removals are single `UPDATE` statements so
//! the store serializes concurrent writers on the same role.

use chrono::{DateTime, Utc};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;
use warden_core::error::WardenResult;
use warden_core::models::role::{CreateRole, Role, UpdateRole};
use warden_core::repository::{ListQuery, Page, RoleRepository};

use super::{CountRow, parse_uuid, parse_uuids};
use crate::error::DbError;

const ENTITY: &str = "role";

#[derive(Debug, SurrealValue)]
struct RoleRow {
    name: String,
    permissions: Vec<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl RoleRow {
    fn into_role(self, id: Uuid) -> Result<Role, DbError> {
        Ok(Role {
            id,
            name: self.name,
            permission_ids: parse_uuids(&self.permissions)?,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(Debug, SurrealValue)]
struct RoleRowWithId {
    record_id: String,
    name: String,
    permissions: Vec<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl RoleRowWithId {
    fn try_into_role(self) -> Result<Role, DbError> {
        Ok(Role {
            id: parse_uuid(&self.record_id)?,
            name: self.name,
            permission_ids: parse_uuids(&self.permissions)?,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

fn id_strings(ids: &[Uuid]) -> Vec<String> {
    ids.iter().map(Uuid::to_string).collect()
}

/// SurrealDB implementation of the Role repository.
#[derive(Clone)]
pub struct SurrealRoleRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealRoleRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> RoleRepository for SurrealRoleRepository<C> {
    async fn create(&self, input: CreateRole) -> WardenResult<Role> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "CREATE type::record('role', $id) SET \
                 name = $name, permissions = $permissions",
            )
            .bind(("id", id_str.clone()))
            .bind(("name", input.name.clone()))
            .bind(("permissions", id_strings(&input.permission_ids)))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::from_write(e, ENTITY, "name", &input.name))?;

        let rows: Vec<RoleRow> = result.take(0).map_err(DbError::from)?;
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| DbError::not_found(ENTITY, &id_str))?;

        Ok(row.into_role(id)?)
    }

    async fn get_by_id(&self, id: Uuid) -> WardenResult<Role> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query("SELECT * FROM type::record('role', $id)")
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<RoleRow> = result.take(0).map_err(DbError::from)?;
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| DbError::not_found(ENTITY, &id_str))?;

        Ok(row.into_role(id)?)
    }

    async fn get_by_name(&self, name: &str) -> WardenResult<Role> {
        let mut result = self
            .db
            .query("SELECT record::id(id) AS record_id, * FROM role WHERE name = $name")
            .bind(("name", name.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<RoleRowWithId> = result.take(0).map_err(DbError::from)?;
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| DbError::not_found(ENTITY, format!("name={name}")))?;

        Ok(row.try_into_role()?)
    }

    async fn update(&self, id: Uuid, input: UpdateRole) -> WardenResult<Role> {
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "UPDATE type::record('role', $id) SET \
                 name = $name, permissions = $permissions, \
                 updated_at = time::now()",
            )
            .bind(("id", id_str.clone()))
            .bind(("name", input.name.clone()))
            .bind(("permissions", id_strings(&input.permission_ids)))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::from_write(e, ENTITY, "name", &input.name))?;

        let rows: Vec<RoleRow> = result.take(0).map_err(DbError::from)?;
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| DbError::not_found(ENTITY, &id_str))?;

        Ok(row.into_role(id)?)
    }

    async fn delete(&self, id: Uuid) -> WardenResult<()> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query("DELETE type::record('role', $id) RETURN BEFORE")
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<RoleRow> = result.take(0).map_err(DbError::from)?;
        if rows.is_empty() {
            return Err(DbError::not_found(ENTITY, id_str).into());
        }

        Ok(())
    }

    async fn list(&self, query: ListQuery) -> WardenResult<Page<Role>> {
        let pagination = query.pagination;
        let search = query.normalized_search();
        let (filter, order) = if search.is_some() {
            (
                "WHERE string::contains(string::lowercase(name), $q)",
                "created_at DESC",
            )
        } else {
            ("", "name ASC")
        };

        let mut count_result = self
            .db
            .query(format!("SELECT count() AS total FROM role {filter} GROUP ALL"))
            .bind(("q", search.clone().unwrap_or_default()))
            .await
            .map_err(DbError::from)?;
        let count_rows: Vec<CountRow> = count_result.take(0).map_err(DbError::from)?;
        let total = count_rows.first().map(|r| r.total).unwrap_or(0);

        let mut result = self
            .db
            .query(format!(
                "SELECT record::id(id) AS record_id, * FROM role {filter} \
                 ORDER BY {order} \
                 LIMIT $limit START $offset"
            ))
            .bind(("q", search.unwrap_or_default()))
            .bind(("limit", pagination.page_size))
            .bind(("offset", pagination.offset()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<RoleRowWithId> = result.take(0).map_err(DbError::from)?;

        let items = rows
            .into_iter()
            .map(|row| row.try_into_role())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(Page {
            items,
            total,
            page: pagination.page,
            page_size: pagination.page_size,
        })
    }

    async fn add_permission(&self, role_id: Uuid, permission_id: Uuid) -> WardenResult<Role> {
        let id_str = role_id.to_string();

        // The WHERE guard makes the append a no-op when the id is already
        // present, so the set never holds it twice.
        let result = self
            .db
            .query(
                "UPDATE type::record('role', $id) SET \
                 permissions = array::append(permissions, $permission_id), \
                 updated_at = time::now() \
                 WHERE permissions CONTAINSNOT $permission_id",
            )
            .bind(("id", id_str.clone()))
            .bind(("permission_id", permission_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<RoleRow> = result.take(0).map_err(DbError::from)?;
        match rows.into_iter().next() {
            Some(row) => Ok(row.into_role(role_id)?),
            // Either already a member or the role does not exist.
            None => self.get_by_id(role_id).await,
        }
    }

    async fn remove_permission(&self, role_id: Uuid, permission_id: Uuid) -> WardenResult<Role> {
        let id_str = role_id.to_string();

        let result = self
            .db
            .query(
                "UPDATE type::record('role', $id) SET \
                 permissions = array::complement(permissions, [$permission_id]), \
                 updated_at = time::now()",
            )
            .bind(("id", id_str.clone()))
            .bind(("permission_id", permission_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<RoleRow> = result.take(0).map_err(DbError::from)?;
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| DbError::not_found(ENTITY, &id_str))?;

        Ok(row.into_role(role_id)?)
    }

    async fn remove_permission_from_all(&self, permission_id: Uuid) -> WardenResult<u64> {
        let result = self
            .db
            .query(
                "UPDATE role SET \
                 permissions = array::complement(permissions, [$permission_id]), \
                 updated_at = time::now() \
                 WHERE permissions CONTAINS $permission_id",
            )
            .bind(("permission_id", permission_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<RoleRow> = result.take(0).map_err(DbError::from)?;
        Ok(rows.len() as u64)
    }
}
