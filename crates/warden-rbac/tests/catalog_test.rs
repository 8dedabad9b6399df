//! Integration tests for the permission catalog.

mod common;

use uuid::Uuid;
use warden_core::error::WardenError;
use warden_core::models::permission::UpdatePermission;
use warden_core::repository::Pagination;
use warden_rbac::DeletePolicy;

use common::{setup, setup_with};

#[tokio::test]
async fn create_trims_name_and_module() {
    let rbac = setup().await;

    let perm = rbac
        .catalog
        .create("  invoice:read  ", Some("  billing ".into()))
        .await
        .unwrap();
    assert_eq!(perm.name, "invoice:read");
    assert_eq!(perm.module.as_deref(), Some("billing"));

    let fetched = rbac.catalog.get(perm.id).await.unwrap();
    assert_eq!(fetched.name, "invoice:read");
}

#[tokio::test]
async fn blank_module_is_absent() {
    let rbac = setup().await;

    let perm = rbac.catalog.create("audit:view", Some("   ".into())).await.unwrap();
    assert_eq!(perm.module, None);
}

#[tokio::test]
async fn blank_name_is_a_validation_error() {
    let rbac = setup().await;

    let result = rbac.catalog.create("   ", None).await;
    assert!(matches!(result, Err(WardenError::Validation { .. })));
}

#[tokio::test]
async fn duplicate_after_trim_is_rejected() {
    let rbac = setup().await;

    rbac.catalog.create("invoice:read", None).await.unwrap();
    let result = rbac.catalog.create(" invoice:read ", None).await;

    assert!(matches!(
        result,
        Err(WardenError::DuplicateName { ref name, .. }) if name == "invoice:read"
    ));
}

#[tokio::test]
async fn rename_permission() {
    let rbac = setup().await;
    let perm = rbac.catalog.create("invoice:read", None).await.unwrap();

    let renamed = rbac
        .catalog
        .update(
            perm.id,
            UpdatePermission {
                name: Some(" invoice:view ".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(renamed.name, "invoice:view");

    // Renaming to its own name is not a conflict.
    rbac.catalog
        .update(
            perm.id,
            UpdatePermission {
                name: Some("invoice:view".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
}

#[tokio::test]
async fn rename_onto_existing_name_is_rejected() {
    let rbac = setup().await;
    rbac.catalog.create("invoice:read", None).await.unwrap();
    let other = rbac.catalog.create("invoice:write", None).await.unwrap();

    let result = rbac
        .catalog
        .update(
            other.id,
            UpdatePermission {
                name: Some("invoice:read".into()),
                ..Default::default()
            },
        )
        .await;
    assert!(matches!(result, Err(WardenError::DuplicateName { .. })));
}

#[tokio::test]
async fn missing_permission_is_not_found() {
    let rbac = setup().await;
    let ghost = Uuid::new_v4();

    assert!(rbac.catalog.get(ghost).await.unwrap_err().is_not_found());
    assert!(rbac.catalog.delete(ghost).await.unwrap_err().is_not_found());
    assert!(
        rbac.catalog
            .update(ghost, UpdatePermission::default())
            .await
            .unwrap_err()
            .is_not_found()
    );
}

#[tokio::test]
async fn delete_retains_role_references_by_default() {
    let rbac = setup().await;
    let perm = rbac.catalog.create("invoice:read", None).await.unwrap();
    let role = rbac.registry.create("clerk", vec![perm.id]).await.unwrap();

    rbac.catalog.delete(perm.id).await.unwrap();

    let resolved = rbac.registry.get(role.id).await.unwrap();
    assert!(resolved.permissions.is_empty());
    // The raw reference is still on the role.
    let again = rbac
        .registry
        .revoke_permission(role.id, Uuid::new_v4())
        .await
        .unwrap();
    assert_eq!(again.permission_ids, vec![perm.id]);
}

#[tokio::test]
async fn cascading_delete_strips_role_references() {
    let rbac = setup_with(DeletePolicy::Cascade).await;
    let perm = rbac.catalog.create("invoice:read", None).await.unwrap();
    let keep = rbac.catalog.create("invoice:write", None).await.unwrap();
    let role = rbac
        .registry
        .create("clerk", vec![perm.id, keep.id])
        .await
        .unwrap();

    rbac.catalog.delete(perm.id).await.unwrap();

    let untouched = rbac
        .registry
        .revoke_permission(role.id, Uuid::new_v4())
        .await
        .unwrap();
    assert_eq!(untouched.permission_ids, vec![keep.id]);
}

#[tokio::test]
async fn list_and_search() {
    let rbac = setup().await;
    rbac.catalog.create("invoice:read", None).await.unwrap();
    rbac.catalog.create("invoice:write", None).await.unwrap();
    rbac.catalog.create("report:read", None).await.unwrap();

    let all = rbac.catalog.list(Pagination::default()).await.unwrap();
    assert_eq!(all.total, 3);
    assert_eq!(all.page, 1);
    assert_eq!(all.items[0].name, "report:read");

    let found = rbac
        .catalog
        .search("Invoice", Pagination::new(1, 1).unwrap())
        .await
        .unwrap();
    assert_eq!(found.total, 2);
    assert_eq!(found.items.len(), 1);
    assert!(found.has_next());
}

#[tokio::test]
async fn get_by_name_trims_input() {
    let rbac = setup().await;
    let perm = rbac.catalog.create("invoice:read", None).await.unwrap();

    let found = rbac.catalog.get_by_name(" invoice:read ").await.unwrap();
    assert_eq!(found.id, perm.id);
}
