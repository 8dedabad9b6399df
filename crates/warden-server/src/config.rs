//! Process configuration loaded from the environment.

use std::env;

use anyhow::{Context, Result};
use warden_db::DbConfig;
use warden_rbac::{DeletePolicy, PasswordConfig, RbacConfig};

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub db: DbConfig,
    pub rbac: RbacConfig,
}

impl ServerConfig {
    /// Read `WARDEN_*` variables, falling back to defaults for anything
    /// unset.
    pub fn from_env() -> Result<Self> {
        let db_defaults = DbConfig::default();
        let db = DbConfig {
            url: env::var("WARDEN_DB_URL").unwrap_or(db_defaults.url),
            namespace: env::var("WARDEN_DB_NAMESPACE").unwrap_or(db_defaults.namespace),
            database: env::var("WARDEN_DB_DATABASE").unwrap_or(db_defaults.database),
            username: env::var("WARDEN_DB_USER").unwrap_or(db_defaults.username),
            password: env::var("WARDEN_DB_PASSWORD").unwrap_or(db_defaults.password),
        };

        let cascade = env::var("WARDEN_CASCADE_DELETES")
            .ok()
            .map(|v| v.parse::<bool>())
            .transpose()
            .context("WARDEN_CASCADE_DELETES must be true or false")?
            .unwrap_or(false);

        let rbac = RbacConfig {
            delete_policy: if cascade {
                DeletePolicy::Cascade
            } else {
                DeletePolicy::Retain
            },
            password: PasswordConfig {
                pepper: env::var("WARDEN_PASSWORD_PEPPER").ok(),
                ..PasswordConfig::default()
            },
        };

        Ok(Self { db, rbac })
    }
}
