//! Integration tests for the User repository using in-memory SurrealDB.

use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem};
use uuid::Uuid;
use warden_core::error::WardenError;
use warden_core::models::user::{CreateUser, UpdateUser};
use warden_core::repository::{ListQuery, Pagination, UserRepository};
use warden_db::repository::SurrealUserRepository;

async fn setup() -> SurrealUserRepository<Db> {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    warden_db::run_migrations(&db).await.unwrap();
    SurrealUserRepository::new(db)
}

fn user(first: &str, email: &str) -> CreateUser {
    CreateUser {
        first_name: Some(first.into()),
        last_name: Some("Tester".into()),
        email: email.into(),
        password_hash: "$argon2id$stub".into(),
    }
}

#[tokio::test]
async fn create_and_get_user() {
    let repo = setup().await;

    let created = repo.create(user("Alice", "alice@example.com")).await.unwrap();
    assert_eq!(created.email, "alice@example.com");
    assert_eq!(created.first_name.as_deref(), Some("Alice"));
    assert_eq!(created.role_id, None);

    let fetched = repo.get_by_id(created.id).await.unwrap();
    assert_eq!(fetched, created);

    let by_email = repo.get_by_email("alice@example.com").await.unwrap();
    assert_eq!(by_email.id, created.id);
}

#[tokio::test]
async fn names_are_optional() {
    let repo = setup().await;

    let created = repo
        .create(CreateUser {
            first_name: None,
            last_name: None,
            email: "anon@example.com".into(),
            password_hash: "$argon2id$stub".into(),
        })
        .await
        .unwrap();

    let fetched = repo.get_by_id(created.id).await.unwrap();
    assert_eq!(fetched.first_name, None);
    assert_eq!(fetched.last_name, None);
}

#[tokio::test]
async fn duplicate_email_rejected() {
    let repo = setup().await;

    repo.create(user("Alice", "alice@example.com")).await.unwrap();
    let result = repo.create(user("Alicia", "alice@example.com")).await;

    assert!(
        matches!(result, Err(WardenError::DuplicateEmail { ref email }) if email == "alice@example.com"),
        "expected DuplicateEmail, got {result:?}"
    );
}

#[tokio::test]
async fn update_user_fields() {
    let repo = setup().await;
    let created = repo.create(user("Alice", "alice@example.com")).await.unwrap();

    let updated = repo
        .update(
            created.id,
            UpdateUser {
                email: Some("alice@new.example.com".into()),
                password_hash: Some("$argon2id$other".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.email, "alice@new.example.com");
    assert_eq!(updated.password_hash, "$argon2id$other");
    assert_eq!(updated.first_name.as_deref(), Some("Alice")); // unchanged
}

#[tokio::test]
async fn update_to_taken_email_rejected() {
    let repo = setup().await;
    repo.create(user("Alice", "alice@example.com")).await.unwrap();
    let bob = repo.create(user("Bob", "bob@example.com")).await.unwrap();

    let result = repo
        .update(
            bob.id,
            UpdateUser {
                email: Some("alice@example.com".into()),
                ..Default::default()
            },
        )
        .await;

    assert!(matches!(result, Err(WardenError::DuplicateEmail { .. })));
}

#[tokio::test]
async fn delete_user() {
    let repo = setup().await;
    let created = repo.create(user("Alice", "alice@example.com")).await.unwrap();

    repo.delete(created.id).await.unwrap();

    assert!(matches!(
        repo.get_by_id(created.id).await,
        Err(WardenError::NotFound { .. })
    ));
    assert!(matches!(
        repo.delete(created.id).await,
        Err(WardenError::NotFound { .. })
    ));
}

#[tokio::test]
async fn set_role_overwrites_and_clears() {
    let repo = setup().await;
    let created = repo.create(user("Alice", "alice@example.com")).await.unwrap();
    let (first, second) = (Uuid::new_v4(), Uuid::new_v4());

    let with_first = repo.set_role(created.id, Some(first)).await.unwrap();
    assert_eq!(with_first.role_id, Some(first));

    let with_second = repo.set_role(created.id, Some(second)).await.unwrap();
    assert_eq!(with_second.role_id, Some(second));

    let cleared = repo.set_role(created.id, None).await.unwrap();
    assert_eq!(cleared.role_id, None);

    let cleared_again = repo.set_role(created.id, None).await.unwrap();
    assert_eq!(cleared_again.role_id, None);

    let missing = repo.set_role(Uuid::new_v4(), Some(first)).await;
    assert!(matches!(missing, Err(WardenError::NotFound { .. })));
}

#[tokio::test]
async fn clear_role_from_all_users() {
    let repo = setup().await;
    let (doomed, kept) = (Uuid::new_v4(), Uuid::new_v4());
    let a = repo.create(user("A", "a@example.com")).await.unwrap();
    let b = repo.create(user("B", "b@example.com")).await.unwrap();
    let c = repo.create(user("C", "c@example.com")).await.unwrap();
    repo.set_role(a.id, Some(doomed)).await.unwrap();
    repo.set_role(b.id, Some(doomed)).await.unwrap();
    repo.set_role(c.id, Some(kept)).await.unwrap();

    let changed = repo.clear_role_from_all(doomed).await.unwrap();
    assert_eq!(changed, 2);

    assert_eq!(repo.get_by_id(a.id).await.unwrap().role_id, None);
    assert_eq!(repo.get_by_id(b.id).await.unwrap().role_id, None);
    assert_eq!(repo.get_by_id(c.id).await.unwrap().role_id, Some(kept));
}

#[tokio::test]
async fn list_users_with_pagination() {
    let repo = setup().await;
    for i in 0..4 {
        repo.create(user(&format!("User{i}"), &format!("user{i}@example.com")))
            .await
            .unwrap();
    }

    let page1 = repo
        .list(ListQuery::all(Pagination::new(1, 3).unwrap()))
        .await
        .unwrap();
    assert_eq!(page1.items.len(), 3);
    assert_eq!(page1.total, 4);
    assert_eq!(page1.items[0].email, "user0@example.com");

    let page2 = repo
        .list(ListQuery::all(Pagination::new(2, 3).unwrap()))
        .await
        .unwrap();
    assert_eq!(page2.items.len(), 1);
    assert_eq!(page2.items[0].email, "user3@example.com");
}

#[tokio::test]
async fn search_matches_names_and_email() {
    let repo = setup().await;
    repo.create(user("Grace", "hopper@navy.mil")).await.unwrap();
    repo.create(user("Ada", "ada@example.com")).await.unwrap();
    repo.create(CreateUser {
        first_name: None,
        last_name: None,
        email: "nobody@example.com".into(),
        password_hash: "$argon2id$stub".into(),
    })
    .await
    .unwrap();

    let by_name = repo
        .list(ListQuery::search("grace", Pagination::default()))
        .await
        .unwrap();
    assert_eq!(by_name.total, 1);
    assert_eq!(by_name.items[0].email, "hopper@navy.mil");

    let by_email = repo
        .list(ListQuery::search("EXAMPLE.COM", Pagination::default()))
        .await
        .unwrap();
    assert_eq!(by_email.total, 2);
}
