//! Error types for the Warden system.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum WardenError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("Duplicate {entity} name: {name}")]
    DuplicateName { entity: String, name: String },

    #[error("Duplicate email: {email}")]
    DuplicateEmail { email: String },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Credential error: {0}")]
    Credential(String),
}

impl WardenError {
    pub fn not_found(entity: &str, id: impl ToString) -> Self {
        Self::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

pub type WardenResult<T> = Result<T, WardenError>;
