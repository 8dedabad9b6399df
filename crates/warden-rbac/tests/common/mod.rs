//! Shared fixtures: in-memory SurrealDB wired into every RBAC service.

#![allow(dead_code)]

use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem};
use warden_core::models::user::NewUser;
use warden_db::repository::{
    SurrealPermissionRepository, SurrealRoleRepository, SurrealUserRepository,
};
use warden_rbac::{
    Argon2Hasher, AuthorizationChecker, DeletePolicy, PasswordConfig, PermissionCatalog,
    RoleRegistry, UserDirectory,
};

pub type Permissions = SurrealPermissionRepository<Db>;
pub type Roles = SurrealRoleRepository<Db>;
pub type Users = SurrealUserRepository<Db>;

pub struct Rbac {
    pub catalog: PermissionCatalog<Permissions, Roles>,
    pub registry: RoleRegistry<Roles, Permissions, Users>,
    pub directory: UserDirectory<Users, Roles, Argon2Hasher>,
    pub checker: AuthorizationChecker<Users, Roles, Permissions>,
}

/// Cheap Argon2 parameters; production defaults are far too slow for tests.
pub fn test_hasher() -> Argon2Hasher {
    Argon2Hasher::new(&PasswordConfig {
        memory_kib: 8,
        iterations: 1,
        parallelism: 1,
        pepper: None,
    })
    .unwrap()
}

pub async fn setup() -> Rbac {
    setup_with(DeletePolicy::Retain).await
}

pub async fn setup_with(policy: DeletePolicy) -> Rbac {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    warden_db::run_migrations(&db).await.unwrap();

    let permissions = SurrealPermissionRepository::new(db.clone());
    let roles = SurrealRoleRepository::new(db.clone());
    let users = SurrealUserRepository::new(db);

    Rbac {
        catalog: PermissionCatalog::new(permissions.clone(), roles.clone(), policy),
        registry: RoleRegistry::new(roles.clone(), permissions.clone(), users.clone(), policy),
        directory: UserDirectory::new(users.clone(), roles.clone(), test_hasher()),
        checker: AuthorizationChecker::new(users, roles, permissions),
    }
}

pub fn new_user(email: &str) -> NewUser {
    NewUser {
        first_name: Some("Test".into()),
        last_name: Some("User".into()),
        email: email.into(),
        secret: "correct horse battery staple".into(),
    }
}
