//! End-to-end authorization checks across all three stores.

mod common;

use uuid::Uuid;

use common::{new_user, setup};

#[tokio::test]
async fn user_can_use_permissions_of_their_role() {
    let rbac = setup().await;
    let perm = rbac
        .catalog
        .create("invoice:read", Some("billing".into()))
        .await
        .unwrap();
    let role = rbac
        .registry
        .create("billing-clerk", vec![perm.id])
        .await
        .unwrap();
    let user = rbac.directory.create(new_user("a@x.com")).await.unwrap();
    rbac.directory.assign_role(user.id, role.id).await.unwrap();

    assert!(rbac.checker.can(user.id, "invoice:read").await.unwrap());
    assert!(!rbac.checker.can(user.id, "invoice:write").await.unwrap());
}

#[tokio::test]
async fn permission_names_match_exactly() {
    let rbac = setup().await;
    let perm = rbac.catalog.create("invoice:read", None).await.unwrap();
    let role = rbac.registry.create("clerk", vec![perm.id]).await.unwrap();
    let user = rbac.directory.create(new_user("a@x.com")).await.unwrap();
    rbac.directory.assign_role(user.id, role.id).await.unwrap();

    assert!(!rbac.checker.can(user.id, "Invoice:Read").await.unwrap());
    assert!(!rbac.checker.can(user.id, "invoice").await.unwrap());
}

#[tokio::test]
async fn user_without_role_is_denied() {
    let rbac = setup().await;
    rbac.catalog.create("invoice:read", None).await.unwrap();
    let user = rbac.directory.create(new_user("a@x.com")).await.unwrap();

    assert!(!rbac.checker.can(user.id, "invoice:read").await.unwrap());
}

#[tokio::test]
async fn missing_user_is_not_found() {
    let rbac = setup().await;

    let err = rbac
        .checker
        .can(Uuid::new_v4(), "invoice:read")
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn deleted_permission_is_denied() {
    let rbac = setup().await;
    let perm = rbac.catalog.create("invoice:read", None).await.unwrap();
    let role = rbac
        .registry
        .create("billing-clerk", vec![perm.id])
        .await
        .unwrap();
    let user = rbac.directory.create(new_user("a@x.com")).await.unwrap();
    rbac.directory.assign_role(user.id, role.id).await.unwrap();

    rbac.catalog.delete(perm.id).await.unwrap();

    assert!(!rbac.checker.can(user.id, "invoice:read").await.unwrap());
}

#[tokio::test]
async fn revoked_role_is_denied() {
    let rbac = setup().await;
    let perm = rbac.catalog.create("invoice:read", None).await.unwrap();
    let role = rbac.registry.create("clerk", vec![perm.id]).await.unwrap();
    let user = rbac.directory.create(new_user("a@x.com")).await.unwrap();
    rbac.directory.assign_role(user.id, role.id).await.unwrap();

    rbac.directory.revoke_role(user.id).await.unwrap();

    assert!(!rbac.checker.can(user.id, "invoice:read").await.unwrap());
}

#[tokio::test]
async fn revoked_permission_is_denied() {
    let rbac = setup().await;
    let perm = rbac.catalog.create("invoice:read", None).await.unwrap();
    let role = rbac.registry.create("clerk", vec![perm.id]).await.unwrap();
    let user = rbac.directory.create(new_user("a@x.com")).await.unwrap();
    rbac.directory.assign_role(user.id, role.id).await.unwrap();

    rbac.registry.revoke_permission(role.id, perm.id).await.unwrap();

    assert!(!rbac.checker.can(user.id, "invoice:read").await.unwrap());
}

#[tokio::test]
async fn dangling_role_is_denied() {
    let rbac = setup().await;
    let perm = rbac.catalog.create("invoice:read", None).await.unwrap();
    let role = rbac.registry.create("clerk", vec![perm.id]).await.unwrap();
    let user = rbac.directory.create(new_user("a@x.com")).await.unwrap();
    rbac.directory.assign_role(user.id, role.id).await.unwrap();

    rbac.registry.delete(role.id).await.unwrap();

    assert!(!rbac.checker.can(user.id, "invoice:read").await.unwrap());
}

#[tokio::test]
async fn granted_after_permission_assigned_later() {
    let rbac = setup().await;
    let perm = rbac.catalog.create("invoice:read", None).await.unwrap();
    let role = rbac.registry.create("clerk", vec![]).await.unwrap();
    let user = rbac.directory.create(new_user("a@x.com")).await.unwrap();
    rbac.directory.assign_role(user.id, role.id).await.unwrap();

    assert!(!rbac.checker.can(user.id, "invoice:read").await.unwrap());

    rbac.registry.assign_permission(role.id, perm.id).await.unwrap();

    assert!(rbac.checker.can(user.id, "invoice:read").await.unwrap());
}
