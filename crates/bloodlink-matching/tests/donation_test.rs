//! Integration tests for the donation ledger.

use bloodlink_core::error::BloodlinkError;
use bloodlink_core::models::blood_group::BloodGroup;
use bloodlink_core::models::donation::CreateDonation;
use bloodlink_db::repository::SurrealDonationRepository;
use bloodlink_matching::DonationLedger;
use chrono::NaiveDate;
use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem};

async fn setup() -> DonationLedger<SurrealDonationRepository<Db>> {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    bloodlink_db::run_migrations(&db).await.unwrap();
    DonationLedger::new(SurrealDonationRepository::new(db))
}

fn donation(donor: &str, group: BloodGroup, quantity: u32) -> CreateDonation {
    CreateDonation {
        donor: donor.into(),
        blood_group: group,
        quantity,
        date: NaiveDate::from_ymd_opt(2030, 3, 1).unwrap(),
        blood_bank: "City Central Blood Bank".into(),
        notes: String::new(),
    }
}

#[tokio::test]
async fn donations_feed_the_inventory() {
    let ledger = setup().await;

    let first = ledger
        .donate(donation("dana", BloodGroup::ONeg, 450))
        .await
        .unwrap();
    assert_eq!(first.inventory.blood_group, BloodGroup::ONeg);
    assert_eq!(first.inventory.quantity, 450);

    let second = ledger
        .donate(donation("omar", BloodGroup::ONeg, 300))
        .await
        .unwrap();
    assert_eq!(second.inventory.quantity, 750);

    ledger
        .donate(donation("dana", BloodGroup::APos, 200))
        .await
        .unwrap();

    let inventory = ledger.inventory().await.unwrap();
    assert_eq!(inventory.len(), 8);
    for level in &inventory {
        let expected = match level.blood_group {
            BloodGroup::ONeg => 750,
            BloodGroup::APos => 200,
            _ => 0,
        };
        assert_eq!(level.quantity, expected, "{}", level.blood_group);
    }
}

#[tokio::test]
async fn donation_totals() {
    let ledger = setup().await;
    ledger
        .donate(donation("dana", BloodGroup::ONeg, 450))
        .await
        .unwrap();
    ledger
        .donate(donation("dana", BloodGroup::ONeg, 100))
        .await
        .unwrap();
    ledger
        .donate(donation("omar", BloodGroup::BPos, 250))
        .await
        .unwrap();

    assert_eq!(ledger.total_donated().await.unwrap(), 800);
    assert_eq!(ledger.donations_by_donor("dana").await.unwrap().len(), 2);
    assert!(ledger.donations_by_donor("nobody").await.unwrap().is_empty());

    let by_group = ledger.donated_by_blood_group().await.unwrap();
    assert_eq!(by_group.get(&BloodGroup::ONeg), Some(&550));
    assert_eq!(by_group.get(&BloodGroup::BPos), Some(&250));
    assert_eq!(by_group.len(), 2);
}

#[tokio::test]
async fn invalid_donations_are_rejected() {
    let ledger = setup().await;

    for input in [
        donation("dana", BloodGroup::ONeg, 0),
        donation(" ", BloodGroup::ONeg, 100),
        CreateDonation {
            blood_bank: String::new(),
            ..donation("dana", BloodGroup::ONeg, 100)
        },
    ] {
        let err = ledger.donate(input).await.unwrap_err();
        assert!(matches!(err, BloodlinkError::Validation { .. }), "{err:?}");
    }
    assert_eq!(ledger.total_donated().await.unwrap(), 0);
}
