//! Integration tests for the user repository using in-memory SurrealDB.

use campus_core::models::principal::RoleScope;
use campus_core::models::user::{CreateUser, UpdateUser};
use campus_core::rbac::Role;
use campus_core::repository::{Pagination, UserRepository};
use campus_db::repository::SurrealUserRepository;
use surrealdb::Surreal;
use surrealdb::engine::local::Mem;

/// Helper: spin up in-memory DB and run migrations.
async fn setup() -> Surreal<surrealdb::engine::local::Db> {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    campus_db::run_migrations(&db).await.unwrap();
    db
}

fn new_user(tenant: &str, name: &str, email: &str, role: Role) -> CreateUser {
    CreateUser {
        tenant: tenant.into(),
        name: name.into(),
        email: email.into(),
        role,
        role_scope: RoleScope::Tenant,
        managed_tenants: vec![],
        password_hash: "$argon2id$v=19$m=19456,t=2,p=1$c2FsdA$aGFzaA".into(),
    }
}

#[tokio::test]
async fn create_and_get_user() {
    let db = setup().await;
    let repo = SurrealUserRepository::new(db);

    let user = repo
        .create(new_user("school-a", "Alice", "alice@example.com", Role::Teacher))
        .await
        .unwrap();

    assert_eq!(user.tenant, "school-a");
    assert_eq!(user.name, "Alice");
    assert_eq!(user.email, "alice@example.com");
    assert_eq!(user.role, Role::Teacher);
    assert_eq!(user.role_scope, RoleScope::Tenant);
    assert!(user.is_active);
    assert!(user.password_changed_at.is_none());

    let fetched = repo.get_by_id(user.id).await.unwrap();
    assert_eq!(fetched.id, user.id);
    assert_eq!(fetched.name, "Alice");
}

#[tokio::test]
async fn get_user_by_email_is_tenant_scoped() {
    let db = setup().await;
    let repo = SurrealUserRepository::new(db);

    let user = repo
        .create(new_user("school-a", "Bob", "bob@example.com", Role::Admin))
        .await
        .unwrap();

    let fetched = repo.get_by_email("school-a", "bob@example.com").await.unwrap();
    assert_eq!(fetched.id, user.id);

    // Same email under another tenant does not resolve.
    let missing = repo.get_by_email("school-b", "bob@example.com").await;
    assert!(missing.is_err(), "lookup must not cross tenants");
}

#[tokio::test]
async fn same_email_allowed_across_tenants() {
    let db = setup().await;
    let repo = SurrealUserRepository::new(db);

    repo.create(new_user("school-a", "Carol", "carol@example.com", Role::Teacher))
        .await
        .unwrap();
    let result = repo
        .create(new_user("school-b", "Carol", "carol@example.com", Role::Teacher))
        .await;

    assert!(result.is_ok(), "uniqueness is per tenant, not global");
}

#[tokio::test]
async fn duplicate_email_in_tenant_rejected() {
    let db = setup().await;
    let repo = SurrealUserRepository::new(db);

    repo.create(new_user("school-a", "Dave", "same@example.com", Role::Student))
        .await
        .unwrap();
    let result = repo
        .create(new_user("school-a", "Dan", "same@example.com", Role::Student))
        .await;

    assert!(result.is_err(), "duplicate email in a tenant should be rejected");
}

#[tokio::test]
async fn update_user() {
    let db = setup().await;
    let repo = SurrealUserRepository::new(db);

    let user = repo
        .create(new_user("school-a", "Eve", "eve@example.com", Role::TenantAdmin))
        .await
        .unwrap();

    let updated = repo
        .update(
            user.id,
            UpdateUser {
                name: Some("Evelyn".into()),
                role_scope: Some(RoleScope::Limited),
                managed_tenants: Some(vec!["school-b".into()]),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.name, "Evelyn");
    assert_eq!(updated.role_scope, RoleScope::Limited);
    assert_eq!(updated.managed_tenants, vec!["school-b".to_string()]);
    assert_eq!(updated.email, "eve@example.com"); // unchanged
    assert_eq!(updated.role, Role::TenantAdmin); // role has its own path
}

#[tokio::test]
async fn update_role() {
    let db = setup().await;
    let repo = SurrealUserRepository::new(db);

    let user = repo
        .create(new_user("school-a", "Frank", "frank@example.com", Role::Teacher))
        .await
        .unwrap();

    let updated = repo.update_role(user.id, Role::Admin).await.unwrap();
    assert_eq!(updated.role, Role::Admin);

    let fetched = repo.get_by_id(user.id).await.unwrap();
    assert_eq!(fetched.role, Role::Admin);
}

#[tokio::test]
async fn set_password_bumps_changed_at() {
    let db = setup().await;
    let repo = SurrealUserRepository::new(db);

    let user = repo
        .create(new_user("school-a", "Grace", "grace@example.com", Role::Manager))
        .await
        .unwrap();
    assert!(user.password_changed_at.is_none());

    repo.set_password(user.id, "$argon2id$v=19$m=19456,t=2,p=1$bmV3$bmV3".into())
        .await
        .unwrap();

    let fetched = repo.get_by_id(user.id).await.unwrap();
    assert!(
        fetched.password_changed_at.is_some(),
        "password change must be timestamped to invalidate older tokens"
    );
}

#[tokio::test]
async fn deactivate_is_soft() {
    let db = setup().await;
    let repo = SurrealUserRepository::new(db);

    let user = repo
        .create(new_user("school-a", "Heidi", "heidi@example.com", Role::Parent))
        .await
        .unwrap();

    repo.deactivate(user.id).await.unwrap();

    // Record survives, only the active flag changes.
    let fetched = repo.get_by_id(user.id).await.unwrap();
    assert!(!fetched.is_active);
}

#[tokio::test]
async fn list_users_with_pagination() {
    let db = setup().await;
    let repo = SurrealUserRepository::new(db);

    for i in 0..5 {
        repo.create(new_user(
            "school-a",
            &format!("User {i}"),
            &format!("user-{i}@example.com"),
            Role::Student,
        ))
        .await
        .unwrap();
    }
    // A user in another tenant must not leak into the listing.
    repo.create(new_user("school-b", "Other", "other@example.com", Role::Student))
        .await
        .unwrap();

    let page1 = repo
        .list("school-a", Pagination { offset: 0, limit: 3 })
        .await
        .unwrap();
    assert_eq!(page1.items.len(), 3);
    assert_eq!(page1.total, 5);

    let page2 = repo
        .list("school-a", Pagination { offset: 3, limit: 3 })
        .await
        .unwrap();
    assert_eq!(page2.items.len(), 2);
}
