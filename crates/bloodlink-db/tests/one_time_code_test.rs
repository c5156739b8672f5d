//! Integration tests for one-time code storage.

use bloodlink_core::error::BloodlinkError;
use bloodlink_core::models::one_time_code::{CodePurpose, CreateOneTimeCode};
use bloodlink_core::repository::OneTimeCodeRepository;
use bloodlink_db::repository::SurrealOneTimeCodeRepository;
use chrono::{Duration, Utc};
use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem};

async fn setup() -> SurrealOneTimeCodeRepository<Db> {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    bloodlink_db::run_migrations(&db).await.unwrap();
    SurrealOneTimeCodeRepository::new(db)
}

fn code(subject: &str, hash: &str, ttl: Duration) -> CreateOneTimeCode {
    let now = Utc::now();
    CreateOneTimeCode {
        purpose: CodePurpose::EmailVerification,
        subject: subject.into(),
        code_hash: hash.into(),
        created_at: now,
        expires_at: now + ttl,
    }
}

#[tokio::test]
async fn upsert_then_get() {
    let repo = setup().await;
    let stored = repo
        .upsert(code("a@example.com", "h1", Duration::minutes(10)))
        .await
        .unwrap();
    assert!(!stored.consumed);

    let fetched = repo
        .get(CodePurpose::EmailVerification, "a@example.com")
        .await
        .unwrap();
    assert_eq!(fetched.code_hash, "h1");

    let err = repo
        .get(CodePurpose::PasswordReset, "a@example.com")
        .await
        .unwrap_err();
    assert!(matches!(err, BloodlinkError::NotFound { .. }));
}

#[tokio::test]
async fn consume_is_single_use() {
    let repo = setup().await;
    repo.upsert(code("a@example.com", "h1", Duration::minutes(10)))
        .await
        .unwrap();

    let now = Utc::now();
    assert!(!repo
        .consume(CodePurpose::EmailVerification, "a@example.com", "wrong", now)
        .await
        .unwrap());
    assert!(repo
        .consume(CodePurpose::EmailVerification, "a@example.com", "h1", now)
        .await
        .unwrap());
    assert!(!repo
        .consume(CodePurpose::EmailVerification, "a@example.com", "h1", now)
        .await
        .unwrap());

    let stored = repo
        .get(CodePurpose::EmailVerification, "a@example.com")
        .await
        .unwrap();
    assert!(stored.consumed);
    assert!(stored.consumed_at.is_some());
}

#[tokio::test]
async fn consume_rejects_expired_code() {
    let repo = setup().await;
    repo.upsert(code("a@example.com", "h1", Duration::minutes(10)))
        .await
        .unwrap();

    let later = Utc::now() + Duration::minutes(11);
    assert!(!repo
        .consume(CodePurpose::EmailVerification, "a@example.com", "h1", later)
        .await
        .unwrap());
}

#[tokio::test]
async fn consume_unknown_key_is_false() {
    let repo = setup().await;
    assert!(!repo
        .consume(CodePurpose::PhoneVerification, "+1555", "h1", Utc::now())
        .await
        .unwrap());
}

#[tokio::test]
async fn upsert_replaces_previous_code() {
    let repo = setup().await;
    repo.upsert(code("a@example.com", "old", Duration::minutes(10)))
        .await
        .unwrap();
    repo.upsert(code("a@example.com", "new", Duration::minutes(10)))
        .await
        .unwrap();

    let now = Utc::now();
    assert!(!repo
        .consume(CodePurpose::EmailVerification, "a@example.com", "old", now)
        .await
        .unwrap());
    assert!(repo
        .consume(CodePurpose::EmailVerification, "a@example.com", "new", now)
        .await
        .unwrap());
}

#[tokio::test]
async fn delete_expired_removes_only_stale_codes() {
    let repo = setup().await;
    repo.upsert(code("stale@example.com", "h1", Duration::minutes(-1)))
        .await
        .unwrap();
    repo.upsert(code("fresh@example.com", "h2", Duration::minutes(10)))
        .await
        .unwrap();

    let removed = repo.delete_expired(Utc::now()).await.unwrap();
    assert_eq!(removed, 1);
    assert!(repo
        .get(CodePurpose::EmailVerification, "fresh@example.com")
        .await
        .is_ok());
    assert!(repo
        .get(CodePurpose::EmailVerification, "stale@example.com")
        .await
        .is_err());

    // Idempotent.
    assert_eq!(repo.delete_expired(Utc::now()).await.unwrap(), 0);
}
