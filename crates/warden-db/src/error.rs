//! Database-specific error types and conversions.

use std::fmt::Display;

use warden_core::error::WardenError;

/// Database-layer error type.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("SurrealDB error: {0}")]
    Surreal(#[from] surrealdb::Error),

    #[error("Migration failed: {0}")]
    Migration(String),

    #[error("Query failed: {0}")]
    Query(String),

    #[error("Malformed record: {0}")]
    InvalidRecord(String),

    #[error("Record not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("Unique constraint violated: {entity}.{field} = {value}")]
    Duplicate {
        entity: String,
        field: String,
        value: String,
    },
}

impl DbError {
    pub(crate) fn not_found(entity: &str, id: impl ToString) -> Self {
        Self::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }

    /// Classify a failed write. SurrealDB reports unique index violations
    /// as "Database index `...` already contains ..."; everything else is a
    /// plain query failure.
    pub(crate) fn from_write(err: impl Display, entity: &str, field: &str, value: &str) -> Self {
        let message = err.to_string();
        if message.contains("already contains") {
            Self::Duplicate {
                entity: entity.into(),
                field: field.into(),
                value: value.into(),
            }
        } else {
            Self::Query(message)
        }
    }
}

impl From<DbError> for WardenError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => WardenError::NotFound { entity, id },
            DbError::Duplicate { field, value, .. } if field == "email" => {
                WardenError::DuplicateEmail { email: value }
            }
            DbError::Duplicate { entity, value, .. } => WardenError::DuplicateName {
                entity,
                name: value,
            },
            other => WardenError::StoreUnavailable(other.to_string()),
        }
    }
}
