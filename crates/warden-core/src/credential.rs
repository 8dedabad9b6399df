//! The credential hashing collaborator.

use crate::error::WardenResult;

/// One-way, salted transform for user secrets.
///
/// `hash` must produce a different output for the same input on every call
/// (fresh salt); `verify` is the only way to compare a plaintext against a
/// stored hash.
pub trait CredentialHasher: Send + Sync {
    fn hash(&self, secret: &str) -> WardenResult<String>;
    fn verify(&self, secret: &str, hash: &str) -> WardenResult<bool>;
}
