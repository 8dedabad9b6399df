//! Service configuration.

/// What happens to references when their target is deleted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DeletePolicy {
    /// Leave references in place; readers skip them.
    #[default]
    Retain,
    /// Strip a deleted permission from every role and clear a deleted role
    /// from every user.
    Cascade,
}

/// Argon2id parameters for hashing user secrets.
#[derive(Debug, Clone)]
pub struct PasswordConfig {
    /// Memory cost in KiB (default: 19456 = 19 MiB).
    pub memory_kib: u32,
    /// Iteration count (default: 2).
    pub iterations: u32,
    /// Degree of parallelism (default: 1).
    pub parallelism: u32,
    /// Optional server-side secret prepended to every secret before hashing.
    pub pepper: Option<String>,
}

impl Default for PasswordConfig {
    fn default() -> Self {
        // OWASP ASVS recommended: m=19456 (19 MiB), t=2, p=1
        Self {
            memory_kib: 19456,
            iterations: 2,
            parallelism: 1,
            pepper: None,
        }
    }
}

/// Configuration shared by the RBAC services.
#[derive(Debug, Clone, Default)]
pub struct RbacConfig {
    pub delete_policy: DeletePolicy,
    pub password: PasswordConfig,
}
