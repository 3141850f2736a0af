mod common;

use serde_json::json;
use userbase::{AssignmentPolicy, Authenticatable, User};

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn create_and_find_by_email() {
    let db = common::pool().await;
    let input = common::profile();
    let user = User::from_fillable(&input, AssignmentPolicy::Reject).unwrap();

    let created = User::create(&db, &user).await.unwrap();
    assert_eq!(created.id, user.id);
    assert!(!created.email_verified);

    let found = User::find_by_email(&db, &user.email).await.unwrap().unwrap();
    assert_eq!(found.name, user.name);
    assert_eq!(found.city.as_deref(), Some("Berlin"));

    User::delete(&db, user.id).await.unwrap();
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn email_verified_reads_back_as_bool() {
    let db = common::pool().await;
    let user = User::from_fillable(&common::profile(), AssignmentPolicy::Reject).unwrap();
    User::create(&db, &user).await.unwrap();

    let verified = User::mark_email_verified(&db, user.id).await.unwrap();
    assert!(verified.email_verified);

    let raw: i16 = sqlx::query_scalar("SELECT email_verified FROM users WHERE id = $1")
        .bind(user.id)
        .fetch_one(&db)
        .await
        .unwrap();
    assert_eq!(raw, 1);

    User::delete(&db, user.id).await.unwrap();
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn profile_update_ignores_guarded_keys() {
    let db = common::pool().await;
    let mut user = User::from_fillable(&common::profile(), AssignmentPolicy::Reject).unwrap();
    User::create(&db, &user).await.unwrap();

    let patch = json!({ "city": "Hamburg", "is_admin": true, "remember_token": "x" });
    user.fill(patch.as_object().unwrap(), AssignmentPolicy::Discard)
        .unwrap();
    let saved = User::update(&db, &user).await.unwrap();
    assert_eq!(saved.city.as_deref(), Some("Hamburg"));
    assert_eq!(saved.remember_token(), None);

    User::delete(&db, user.id).await.unwrap();
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn find_or_create_by_auth0_id_is_idempotent() {
    let db = common::pool().await;
    let auth0_id = format!("auth0|{}", uuid::Uuid::new_v4());
    let profile = common::profile();

    let first = User::find_or_create_by_auth0_id(&db, &auth0_id, &profile)
        .await
        .unwrap();
    let second = User::find_or_create_by_auth0_id(&db, &auth0_id, &profile)
        .await
        .unwrap();
    assert_eq!(first.id, second.id);
    assert_eq!(second.auth0_id.as_deref(), Some(auth0_id.as_str()));

    assert!(User::delete(&db, first.id).await.unwrap());
    assert!(User::find_by_id(&db, first.id).await.unwrap().is_none());
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn remember_token_is_stored_but_never_serialized() {
    let db = common::pool().await;
    let user = User::from_fillable(&common::profile(), AssignmentPolicy::Reject).unwrap();
    User::create(&db, &user).await.unwrap();

    User::set_remember_token(&db, user.id, Some("persisted-token"))
        .await
        .unwrap();
    let found = User::find_by_id(&db, user.id).await.unwrap().unwrap();
    assert_eq!(found.remember_token(), Some("persisted-token"));

    let json = serde_json::to_string(&found).unwrap();
    assert!(!json.contains("persisted-token"));
    assert!(!json.contains("argon2"));

    User::delete(&db, user.id).await.unwrap();
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn concurrent_first_logins_share_one_account() {
    let db = common::pool().await;
    let auth0_id = format!("auth0|{}", uuid::Uuid::new_v4());
    let profile = common::profile();

    let (a, b) = tokio::join!(
        User::find_or_create_by_auth0_id(&db, &auth0_id, &profile),
        User::find_or_create_by_auth0_id(&db, &auth0_id, &profile),
    );
    let (a, b) = (a.unwrap(), b.unwrap());
    assert_eq!(a.id, b.id);

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE auth0_id = $1")
        .bind(&auth0_id)
        .fetch_one(&db)
        .await
        .unwrap();
    assert_eq!(count, 1);

    User::delete(&db, a.id).await.unwrap();
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn identity_provider_login_with_taken_email_is_an_error() {
    let db = common::pool().await;
    let profile = common::profile();
    let local = User::from_fillable(&profile, AssignmentPolicy::Reject).unwrap();
    User::create(&db, &local).await.unwrap();

    let auth0_id = format!("auth0|{}", uuid::Uuid::new_v4());
    let err = User::find_or_create_by_auth0_id(&db, &auth0_id, &profile)
        .await
        .unwrap_err();
    assert!(err.to_string().contains("already belongs to another account"));

    User::delete(&db, local.id).await.unwrap();
}
