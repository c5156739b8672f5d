//! Integration tests for request matching and donor responses.

use bloodlink_core::error::BloodlinkError;
use bloodlink_core::models::blood_group::BloodGroup;
use bloodlink_core::models::blood_request::{RequestStatus, Urgency};
use bloodlink_core::models::donor_response::{ResponseKind, ResponseStatus};
use bloodlink_core::models::notification::Channel;
use bloodlink_core::models::user::{CreateUser, UserRole};
use bloodlink_core::repository::UserRepository;
use bloodlink_db::repository::{
    SurrealBloodRequestRepository, SurrealDonorResponseRepository, SurrealNotificationRepository,
    SurrealUserRepository,
};
use bloodlink_matching::{MatchingEngine, NewBloodRequest, NewDonorResponse, RequestLedger};
use bloodlink_notify::NotificationSink;
use chrono::NaiveDate;
use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem};

type Engine = MatchingEngine<
    SurrealUserRepository<Db>,
    SurrealBloodRequestRepository<Db>,
    SurrealDonorResponseRepository<Db>,
    SurrealNotificationRepository<Db>,
>;

struct Fixture {
    users: SurrealUserRepository<Db>,
    sink: NotificationSink<SurrealNotificationRepository<Db>>,
    engine: Engine,
}

async fn setup() -> Fixture {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    bloodlink_db::run_migrations(&db).await.unwrap();

    let users = SurrealUserRepository::new(db.clone());
    let sink = NotificationSink::new(SurrealNotificationRepository::new(db.clone()));
    let engine = MatchingEngine::new(
        users.clone(),
        RequestLedger::new(SurrealBloodRequestRepository::new(db.clone())),
        SurrealDonorResponseRepository::new(db),
        sink.clone(),
    );
    Fixture { users, sink, engine }
}

async fn add_user(fx: &Fixture, username: &str, role: UserRole, group: Option<BloodGroup>) {
    fx.users
        .create(CreateUser {
            username: username.into(),
            email: format!("{username}@example.com"),
            phone: format!("+1555{:04}", username.len()),
            password_hash: "$argon2id$placeholder".into(),
            role,
            blood_group: group,
            age: Some(30),
            email_verified: true,
            phone_verified: true,
        })
        .await
        .unwrap();
}

async fn add_donor_per_group(fx: &Fixture) {
    for group in BloodGroup::ALL {
        add_user(fx, &format!("donor_{}", group.slug()), UserRole::Donor, Some(group)).await;
    }
}

fn new_request(group: BloodGroup, quantity: u32) -> NewBloodRequest {
    NewBloodRequest {
        blood_group: group,
        quantity,
        urgency: Urgency::High,
        required_date: NaiveDate::from_ymd_opt(2030, 1, 15).unwrap(),
        reason: "Surgery".into(),
        contact_info: "+15550199".into(),
    }
}

fn accept(request_id: &str, quantity: u32) -> NewDonorResponse {
    NewDonorResponse {
        request_id: request_id.into(),
        kind: ResponseKind::Accept,
        message: Some("Happy to help".into()),
        quantity_offered: quantity,
    }
}

fn decline(request_id: &str, quantity: u32) -> NewDonorResponse {
    NewDonorResponse {
        request_id: request_id.into(),
        kind: ResponseKind::Decline,
        message: None,
        quantity_offered: quantity,
    }
}

#[tokio::test]
async fn o_negative_request_matches_only_o_negative_donors() {
    let fx = setup().await;
    add_donor_per_group(&fx).await;
    add_user(&fx, "rita", UserRole::Receiver, Some(BloodGroup::ONeg)).await;

    let submission = fx
        .engine
        .submit_request("rita", new_request(BloodGroup::ONeg, 450))
        .await
        .unwrap();

    assert_eq!(submission.report.total_compatible, 1);
    assert_eq!(submission.report.notifications_sent, 1);
    assert!(submission.report.warnings.is_empty());
    assert_eq!(
        fx.sink
            .notifications_for("donor_o_neg@example.com")
            .await
            .unwrap()
            .len(),
        1
    );
    assert!(fx
        .sink
        .notifications_for("donor_o_pos@example.com")
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn ab_positive_request_matches_every_donor_with_a_group() {
    let fx = setup().await;
    add_donor_per_group(&fx).await;
    add_user(&fx, "nogroup", UserRole::Donor, None).await;
    add_user(&fx, "rita", UserRole::Receiver, None).await;

    let submission = fx
        .engine
        .submit_request("rita", new_request(BloodGroup::AbPos, 350))
        .await
        .unwrap();

    assert_eq!(submission.report.total_compatible, 8);
    assert_eq!(submission.report.notifications_sent, 8);
    assert!(fx
        .sink
        .notifications_for("nogroup@example.com")
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn failed_sends_leave_the_request_on_record() {
    let fx = setup().await;
    add_user(&fx, "rita", UserRole::Receiver, None).await;
    fx.users
        .create(CreateUser {
            username: "silent".into(),
            email: "".into(),
            phone: "".into(),
            password_hash: "x".into(),
            role: UserRole::Donor,
            blood_group: Some(BloodGroup::ONeg),
            age: Some(40),
            email_verified: false,
            phone_verified: false,
        })
        .await
        .unwrap();

    let submission = fx
        .engine
        .submit_request("rita", new_request(BloodGroup::APos, 200))
        .await
        .unwrap();

    assert_eq!(submission.report.total_compatible, 1);
    assert_eq!(submission.report.notifications_sent, 0);
    assert_eq!(submission.report.warnings.len(), 2);

    let stored = fx.engine.ledger().get(&submission.request.id).await.unwrap();
    assert_eq!(stored.status, RequestStatus::Pending);
}

#[tokio::test]
async fn request_validation_happens_before_persistence() {
    let fx = setup().await;

    let zero = fx
        .engine
        .submit_request("rita", new_request(BloodGroup::APos, 0))
        .await
        .unwrap_err();
    assert!(matches!(zero, BloodlinkError::Validation { .. }));

    let mut blank = new_request(BloodGroup::APos, 100);
    blank.reason = "  ".into();
    let err = fx.engine.submit_request("rita", blank).await.unwrap_err();
    assert!(matches!(err, BloodlinkError::Validation { .. }));

    assert!(fx.engine.ledger().list_by_requester("rita").await.unwrap().is_empty());
}

#[tokio::test]
async fn end_to_end_accept_flow() {
    let fx = setup().await;
    add_user(&fx, "dana", UserRole::Donor, Some(BloodGroup::ONeg)).await;
    add_user(&fx, "rita", UserRole::Receiver, None).await;

    let submission = fx
        .engine
        .submit_request("rita", new_request(BloodGroup::AbPos, 350))
        .await
        .unwrap();
    assert!(submission.report.total_compatible >= 1);
    let to_donor = fx.sink.notifications_for("dana@example.com").await.unwrap();
    assert_eq!(to_donor.len(), 1);
    assert_eq!(to_donor[0].channel, Channel::Email);
    assert!(to_donor[0].message.contains(&submission.request.id));

    let receipt = fx
        .engine
        .respond("dana", accept(&submission.request.id, 350))
        .await
        .unwrap();
    assert!(receipt.warnings.is_empty());
    assert_eq!(receipt.response.status, ResponseStatus::PendingApproval);
    assert_eq!(receipt.response.quantity_offered, 350);

    let to_requester = fx.sink.notifications_for("rita@example.com").await.unwrap();
    assert_eq!(to_requester.len(), 1);
    assert!(to_requester[0].message.contains("Quantity Offered: 350 ml"));
    assert!(to_requester[0].message.contains("Happy to help"));

    let request = fx.engine.ledger().get(&submission.request.id).await.unwrap();
    assert_eq!(request.status, RequestStatus::Pending);
}

#[tokio::test]
async fn accept_quantity_must_fit_the_request() {
    let fx = setup().await;
    add_user(&fx, "dana", UserRole::Donor, Some(BloodGroup::ONeg)).await;
    add_user(&fx, "rita", UserRole::Receiver, None).await;
    let request = fx
        .engine
        .submit_request("rita", new_request(BloodGroup::APos, 300))
        .await
        .unwrap()
        .request;

    for quantity in [0, 301] {
        let err = fx
            .engine
            .respond("dana", accept(&request.id, quantity))
            .await
            .unwrap_err();
        assert!(matches!(err, BloodlinkError::Validation { .. }), "{quantity}");
    }
    assert!(fx
        .engine
        .responses_for_request(&request.id)
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn decline_always_offers_zero() {
    let fx = setup().await;
    add_user(&fx, "dana", UserRole::Donor, Some(BloodGroup::ONeg)).await;
    add_user(&fx, "rita", UserRole::Receiver, None).await;
    let request = fx
        .engine
        .submit_request("rita", new_request(BloodGroup::APos, 300))
        .await
        .unwrap()
        .request;

    let receipt = fx
        .engine
        .respond("dana", decline(&request.id, 9999))
        .await
        .unwrap();
    assert_eq!(receipt.response.quantity_offered, 0);
    assert_eq!(receipt.response.response_type, ResponseKind::Decline);

    let stored = fx.engine.responses_for_request(&request.id).await.unwrap();
    assert_eq!(stored[0].quantity_offered, 0);

    let to_requester = fx.sink.notifications_for("rita@example.com").await.unwrap();
    assert!(to_requester[0].message.contains("still searching"));
}

#[tokio::test]
async fn respond_to_unknown_request_is_not_found() {
    let fx = setup().await;
    let err = fx
        .engine
        .respond("dana", accept("REQ_missing", 100))
        .await
        .unwrap_err();
    assert!(matches!(err, BloodlinkError::NotFound { .. }));
}

#[tokio::test]
async fn response_is_kept_when_requester_is_unknown() {
    let fx = setup().await;
    add_user(&fx, "dana", UserRole::Donor, Some(BloodGroup::ONeg)).await;
    let request = fx
        .engine
        .submit_request("walk_in", new_request(BloodGroup::ONeg, 300))
        .await
        .unwrap()
        .request;

    let receipt = fx
        .engine
        .respond("dana", accept(&request.id, 100))
        .await
        .unwrap();
    assert_eq!(receipt.warnings.len(), 1);
    assert_eq!(
        fx.engine
            .donor_response_history("dana")
            .await
            .unwrap()
            .len(),
        1
    );
}

#[tokio::test]
async fn pending_requests_follow_donor_compatibility() {
    let fx = setup().await;
    add_user(&fx, "alex", UserRole::Donor, Some(BloodGroup::APos)).await;
    add_user(&fx, "nogroup", UserRole::Donor, None).await;
    add_user(&fx, "rita", UserRole::Receiver, None).await;

    let a_pos = fx
        .engine
        .submit_request("rita", new_request(BloodGroup::APos, 100))
        .await
        .unwrap()
        .request;
    let ab_pos = fx
        .engine
        .submit_request("rita", new_request(BloodGroup::AbPos, 100))
        .await
        .unwrap()
        .request;
    fx.engine
        .submit_request("rita", new_request(BloodGroup::ONeg, 100))
        .await
        .unwrap();
    let closed = fx
        .engine
        .submit_request("rita", new_request(BloodGroup::APos, 100))
        .await
        .unwrap()
        .request;
    fx.engine
        .ledger()
        .update_status(&closed.id, RequestStatus::Fulfilled)
        .await
        .unwrap();

    let mut ids: Vec<String> = fx
        .engine
        .pending_requests_for_donor("alex")
        .await
        .unwrap()
        .into_iter()
        .map(|r| r.id)
        .collect();
    ids.sort();
    let mut expected = vec![a_pos.id, ab_pos.id];
    expected.sort();
    assert_eq!(ids, expected);

    assert!(fx
        .engine
        .pending_requests_for_donor("nogroup")
        .await
        .unwrap()
        .is_empty());

    let err = fx
        .engine
        .pending_requests_for_donor("ghost")
        .await
        .unwrap_err();
    assert!(matches!(err, BloodlinkError::NotFound { .. }));
}

#[tokio::test]
async fn requester_view_groups_responses_by_request() {
    let fx = setup().await;
    add_user(&fx, "dana", UserRole::Donor, Some(BloodGroup::ONeg)).await;
    add_user(&fx, "omar", UserRole::Donor, Some(BloodGroup::OPos)).await;
    add_user(&fx, "rita", UserRole::Receiver, None).await;

    let first = fx
        .engine
        .submit_request("rita", new_request(BloodGroup::APos, 400))
        .await
        .unwrap()
        .request;
    let second = fx
        .engine
        .submit_request("rita", new_request(BloodGroup::BPos, 400))
        .await
        .unwrap()
        .request;

    fx.engine.respond("dana", accept(&first.id, 200)).await.unwrap();
    fx.engine.respond("omar", decline(&first.id, 0)).await.unwrap();
    fx.engine.respond("dana", accept(&second.id, 400)).await.unwrap();

    let view = fx.engine.requester_view("rita").await.unwrap();
    assert_eq!(view.len(), 2);
    for entry in &view {
        let expected = if entry.request.id == first.id { 2 } else { 1 };
        assert_eq!(entry.responses.len(), expected, "{}", entry.request.id);
        assert!(entry.responses.iter().all(|r| r.request_id == entry.request.id));
    }
    assert!(fx.engine.requester_view("nobody").await.unwrap().is_empty());
}

#[tokio::test]
async fn repeated_responses_are_kept_and_latest_wins() {
    let fx = setup().await;
    add_user(&fx, "dana", UserRole::Donor, Some(BloodGroup::ONeg)).await;
    add_user(&fx, "rita", UserRole::Receiver, None).await;
    let request = fx
        .engine
        .submit_request("rita", new_request(BloodGroup::APos, 400))
        .await
        .unwrap()
        .request;

    fx.engine.respond("dana", accept(&request.id, 200)).await.unwrap();
    fx.engine.respond("dana", decline(&request.id, 0)).await.unwrap();

    assert_eq!(
        fx.engine
            .responses_for_request(&request.id)
            .await
            .unwrap()
            .len(),
        2
    );
    let latest = fx.engine.latest_response_per_donor(&request.id).await.unwrap();
    assert_eq!(latest.len(), 1);
    assert_eq!(latest[0].ordinal, 2);
    assert_eq!(latest[0].response_type, ResponseKind::Decline);
}

#[tokio::test]
async fn request_statistics() {
    let fx = setup().await;
    for (group, quantity) in [
        (BloodGroup::APos, 100),
        (BloodGroup::APos, 250),
        (BloodGroup::ONeg, 50),
    ] {
        fx.engine
            .submit_request("rita", new_request(group, quantity))
            .await
            .unwrap();
    }

    let ledger = fx.engine.ledger();
    assert_eq!(ledger.total_requested().await.unwrap(), 400);
    let by_group = ledger.requested_by_blood_group().await.unwrap();
    assert_eq!(by_group.get(&BloodGroup::APos), Some(&350));
    assert_eq!(by_group.get(&BloodGroup::ONeg), Some(&50));
    assert!(!by_group.contains_key(&BloodGroup::BNeg));
}

#[tokio::test]
async fn status_updates_are_unrestricted() {
    let fx = setup().await;
    let request = fx
        .engine
        .submit_request("rita", new_request(BloodGroup::APos, 100))
        .await
        .unwrap()
        .request;
    let ledger = fx.engine.ledger();

    let cancelled = ledger
        .update_status(&request.id, RequestStatus::Cancelled)
        .await
        .unwrap();
    assert_eq!(cancelled.status, RequestStatus::Cancelled);
    assert!(cancelled.updated_at.is_some());

    let reopened = ledger
        .update_status(&request.id, RequestStatus::Pending)
        .await
        .unwrap();
    assert_eq!(reopened.status, RequestStatus::Pending);
    assert_eq!(ledger.list_pending().await.unwrap().len(), 1);
}
