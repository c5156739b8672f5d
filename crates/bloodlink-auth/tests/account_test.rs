//! Integration tests for the account flows.

use bloodlink_auth::{AccountService, AuthConfig, CodeIssuanceService, RegisterUser};
use bloodlink_core::error::BloodlinkError;
use bloodlink_core::models::blood_group::BloodGroup;
use bloodlink_core::models::user::UserRole;
use bloodlink_db::repository::{
    SurrealNotificationRepository, SurrealOneTimeCodeRepository, SurrealUserRepository,
};
use bloodlink_notify::NotificationSink;
use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem};

type Accounts = AccountService<
    SurrealUserRepository<Db>,
    SurrealOneTimeCodeRepository<Db>,
    SurrealNotificationRepository<Db>,
>;

async fn setup_with(config: AuthConfig) -> Accounts {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    bloodlink_db::run_migrations(&db).await.unwrap();
    AccountService::new(
        SurrealUserRepository::new(db.clone()),
        CodeIssuanceService::new(
            SurrealOneTimeCodeRepository::new(db.clone()),
            NotificationSink::new(SurrealNotificationRepository::new(db)),
            config,
        ),
    )
}

async fn setup() -> Accounts {
    setup_with(AuthConfig::default()).await
}

fn donor(username: &str) -> RegisterUser {
    RegisterUser {
        username: username.into(),
        email: format!("{username}@example.com"),
        phone: "+15550100".into(),
        password: "secret1".into(),
        confirm_password: "secret1".into(),
        role: UserRole::Donor,
        blood_group: Some(BloodGroup::ONeg),
        age: Some(30),
    }
}

async fn verify_contacts(accounts: &Accounts, input: &RegisterUser) {
    let email = accounts.send_email_otp(&input.email).await.unwrap();
    assert!(accounts.verify_email_otp(&input.email, &email.code).await.unwrap());
    let phone = accounts.send_phone_otp(&input.phone).await.unwrap();
    assert!(accounts.verify_phone_otp(&input.phone, &phone.code).await.unwrap());
}

fn assert_validation(err: BloodlinkError) {
    assert!(
        matches!(err, BloodlinkError::Validation { .. }),
        "expected Validation error, got {err:?}"
    );
}

#[tokio::test]
async fn register_requires_verified_contacts() {
    let accounts = setup().await;
    let input = donor("dana");

    assert_validation(accounts.register(input.clone()).await.unwrap_err());

    verify_contacts(&accounts, &input).await;
    let registration = accounts.register(input).await.unwrap();
    assert!(registration.warning.is_none());
    assert!(registration.user.email_verified);
    assert!(registration.user.phone_verified);
    assert_ne!(registration.user.password_hash, "secret1");

    let welcome = accounts
        .codes()
        .sink()
        .notifications_for("dana@example.com")
        .await
        .unwrap();
    assert!(welcome.iter().any(|n| n.message.contains("Dear dana")));
}

#[tokio::test]
async fn register_validates_input() {
    let accounts = setup_with(AuthConfig {
        require_contact_verification: false,
        ..AuthConfig::default()
    })
    .await;

    let mut mismatch = donor("a");
    mismatch.confirm_password = "secret2".into();
    assert_validation(accounts.register(mismatch).await.unwrap_err());

    let mut short = donor("b");
    short.password = "abc".into();
    short.confirm_password = "abc".into();
    assert_validation(accounts.register(short).await.unwrap_err());

    let mut no_group = donor("c");
    no_group.blood_group = None;
    assert_validation(accounts.register(no_group).await.unwrap_err());

    for age in [17, 66] {
        let mut out_of_range = donor("d");
        out_of_range.age = Some(age);
        assert_validation(accounts.register(out_of_range).await.unwrap_err());
    }

    let mut blank = donor("e");
    blank.email = " ".into();
    assert_validation(accounts.register(blank).await.unwrap_err());
}

#[tokio::test]
async fn receivers_need_no_blood_group() {
    let accounts = setup_with(AuthConfig {
        require_contact_verification: false,
        ..AuthConfig::default()
    })
    .await;
    let mut input = donor("rita");
    input.role = UserRole::Receiver;
    input.blood_group = None;
    input.age = None;

    let user = accounts.register(input).await.unwrap().user;
    assert_eq!(user.role, UserRole::Receiver);
    assert!(user.blood_group.is_none());
    assert!(!user.email_verified);
}

#[tokio::test]
async fn duplicate_username_is_rejected() {
    let accounts = setup_with(AuthConfig {
        require_contact_verification: false,
        ..AuthConfig::default()
    })
    .await;
    accounts.register(donor("dana")).await.unwrap();
    let err = accounts.register(donor("dana")).await.unwrap_err();
    assert!(matches!(err, BloodlinkError::AlreadyExists { .. }), "{err:?}");
}

#[tokio::test]
async fn login_checks_password_and_role() {
    let accounts = setup_with(AuthConfig {
        require_contact_verification: false,
        ..AuthConfig::default()
    })
    .await;
    accounts.register(donor("dana")).await.unwrap();

    let session = accounts
        .login("dana", "secret1", UserRole::Donor)
        .await
        .unwrap();
    assert_eq!(session.username, "dana");
    assert!(session.is_donor());

    for (username, password, role) in [
        ("dana", "wrong", UserRole::Donor),
        ("dana", "secret1", UserRole::Receiver),
        ("ghost", "secret1", UserRole::Donor),
    ] {
        let err = accounts.login(username, password, role).await.unwrap_err();
        assert!(
            matches!(err, BloodlinkError::AuthenticationFailed { .. }),
            "{username}/{password}: {err:?}"
        );
    }
}

#[tokio::test]
async fn password_reset_flow() {
    let accounts = setup_with(AuthConfig {
        require_contact_verification: false,
        ..AuthConfig::default()
    })
    .await;
    accounts.register(donor("dana")).await.unwrap();

    let issued = accounts
        .initiate_password_reset("dana@example.com")
        .await
        .unwrap();
    let mail = accounts
        .codes()
        .sink()
        .notifications_for("dana@example.com")
        .await
        .unwrap();
    assert!(mail.iter().any(|n| n.message.contains(&issued.code)
        && n.message.contains("expire in 60 minutes")));

    // A rejected password leaves the token usable.
    assert_validation(
        accounts
            .reset_password("dana@example.com", &issued.code, "abc", "abc")
            .await
            .unwrap_err(),
    );

    accounts
        .reset_password("dana@example.com", &issued.code, "newpass1", "newpass1")
        .await
        .unwrap();
    accounts
        .login("dana", "newpass1", UserRole::Donor)
        .await
        .unwrap();

    let reused = accounts
        .reset_password("dana@example.com", &issued.code, "other12", "other12")
        .await
        .unwrap_err();
    assert!(matches!(reused, BloodlinkError::AuthenticationFailed { .. }));
}

#[tokio::test]
async fn reset_for_unknown_email_is_not_found() {
    let accounts = setup().await;
    let err = accounts
        .initiate_password_reset("ghost@example.com")
        .await
        .unwrap_err();
    assert!(matches!(err, BloodlinkError::NotFound { .. }));
}

#[tokio::test]
async fn change_password_rules() {
    let accounts = setup_with(AuthConfig {
        require_contact_verification: false,
        pepper: Some("pepper!".into()),
        ..AuthConfig::default()
    })
    .await;
    accounts.register(donor("dana")).await.unwrap();
    let session = accounts
        .login("dana", "secret1", UserRole::Donor)
        .await
        .unwrap();

    let wrong_current = accounts
        .change_password(&session, "nope", "newpass1", "newpass1")
        .await
        .unwrap_err();
    assert!(matches!(wrong_current, BloodlinkError::AuthenticationFailed { .. }));

    assert_validation(
        accounts
            .change_password(&session, "secret1", "secret1", "secret1")
            .await
            .unwrap_err(),
    );

    accounts
        .change_password(&session, "secret1", "newpass1", "newpass1")
        .await
        .unwrap();
    assert!(accounts.login("dana", "secret1", UserRole::Donor).await.is_err());
    accounts
        .login("dana", "newpass1", UserRole::Donor)
        .await
        .unwrap();
}
