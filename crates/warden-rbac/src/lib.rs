//! Warden RBAC — the permission catalog, role registry, user directory and
//! authorization checker, plus the Argon2id credential hasher.
//!
//! Every component is generic over the `warden-core` repository traits and
//! receives its store handles at construction time.

pub mod catalog;
pub mod checker;
pub mod config;
pub mod directory;
pub mod error;
pub mod password;
pub mod registry;

pub use catalog::PermissionCatalog;
pub use checker::AuthorizationChecker;
pub use config::{DeletePolicy, PasswordConfig, RbacConfig};
pub use directory::UserDirectory;
pub use error::CredentialError;
pub use password::Argon2Hasher;
pub use registry::RoleRegistry;
