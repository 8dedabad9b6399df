//! Credential hashing error types.

use thiserror::Error;
use warden_core::error::WardenError;

#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("invalid hashing parameters: {0}")]
    Params(String),

    #[error("hashing failed: {0}")]
    Hash(String),

    #[error("stored hash is malformed: {0}")]
    MalformedHash(String),
}

impl From<CredentialError> for WardenError {
    fn from(err: CredentialError) -> Self {
        WardenError::Credential(err.to_string())
    }
}
