//! SurrealDB repository implementations.

mod permission;
mod role;
mod user;

pub use permission::SurrealPermissionRepository;
pub use role::SurrealRoleRepository;
pub use user::SurrealUserRepository;

use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::DbError;

/// Row struct for count queries.
#[derive(Debug, SurrealValue)]
struct CountRow {
    total: u64,
}

fn parse_uuid(raw: &str) -> Result<Uuid, DbError> {
    Uuid::parse_str(raw).map_err(|e| DbError::InvalidRecord(format!("invalid UUID {raw:?}: {e}")))
}

fn parse_uuids(raw: &[String]) -> Result<Vec<Uuid>, DbError> {
    raw.iter().map(|s| parse_uuid(s)).collect()
}
