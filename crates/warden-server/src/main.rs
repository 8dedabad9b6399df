//! Bootstraps the store and the RBAC services.

mod config;

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::EnvFilter;
use warden_db::repository::{
    SurrealPermissionRepository, SurrealRoleRepository, SurrealUserRepository,
};
use warden_db::{DbManager, run_migrations};
use warden_rbac::{
    Argon2Hasher, AuthorizationChecker, PermissionCatalog, RoleRegistry, UserDirectory,
};

use crate::config::ServerConfig;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warden_server=info,warden_rbac=info,warden_db=info".into()),
        )
        .json()
        .init();

    dotenvy::dotenv().ok();
    let config = ServerConfig::from_env()?;

    info!(version = env!("CARGO_PKG_VERSION"), "Starting Warden server");

    let manager = DbManager::connect(&config.db)
        .await
        .context("store is unavailable")?;
    run_migrations(manager.client())
        .await
        .context("schema migration failed")?;
    manager.health().await.context("store is unavailable")?;

    let db = manager.client().clone();
    let permissions = SurrealPermissionRepository::new(db.clone());
    let roles = SurrealRoleRepository::new(db.clone());
    let users = SurrealUserRepository::new(db);

    let hasher = Argon2Hasher::new(&config.rbac.password)?;
    let policy = config.rbac.delete_policy;

    let _catalog = PermissionCatalog::new(permissions.clone(), roles.clone(), policy);
    let _registry = RoleRegistry::new(roles.clone(), permissions.clone(), users.clone(), policy);
    let _directory = UserDirectory::new(users.clone(), roles.clone(), hasher);
    let _checker = AuthorizationChecker::new(users, roles, permissions);

    info!(delete_policy = ?policy, "Store is ready; RBAC services initialized");

    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for shutdown signal")?;

    info!("Warden server stopped.");
    Ok(())
}
