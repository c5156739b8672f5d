//! Donation ledger and blood inventory.

use std::collections::BTreeMap;

use bloodlink_core::error::{BloodlinkError, BloodlinkResult};
use bloodlink_core::models::blood_group::BloodGroup;
use bloodlink_core::models::donation::{CreateDonation, Donation, InventoryLevel};
use bloodlink_core::repository::DonationRepository;
use tracing::info;

#[derive(Debug, Clone)]
pub struct DonationReceipt {
    pub donation: Donation,
    /// Inventory for the donated group after this donation.
    pub inventory: InventoryLevel,
}

pub struct DonationLedger<D: DonationRepository> {
    repo: D,
}

impl<D: DonationRepository> DonationLedger<D> {
    pub fn new(repo: D) -> Self {
        Self { repo }
    }

    /// Record a donation and add it to the inventory for its group.
    pub async fn donate(&self, input: CreateDonation) -> BloodlinkResult<DonationReceipt> {
        if input.donor.trim().is_empty() {
            return Err(BloodlinkError::validation("donor is required"));
        }
        if input.quantity == 0 {
            return Err(BloodlinkError::validation(
                "quantity must be greater than zero",
            ));
        }
        if input.blood_bank.trim().is_empty() {
            return Err(BloodlinkError::validation("blood bank is required"));
        }

        let donation = self.repo.create(input).await?;
        let inventory = self
            .repo
            .increment_inventory(donation.blood_group, donation.quantity)
            .await?;

        info!(
            donor = %donation.donor,
            blood_group = %donation.blood_group,
            quantity = donation.quantity,
            inventory = inventory.quantity,
            "Donation recorded"
        );
        Ok(DonationReceipt {
            donation,
            inventory,
        })
    }

    /// One level per blood group in canonical order.
    pub async fn inventory(&self) -> BloodlinkResult<Vec<InventoryLevel>> {
        self.repo.inventory().await
    }

    pub async fn donations_by_donor(&self, donor: &str) -> BloodlinkResult<Vec<Donation>> {
        self.repo.list_by_donor(donor).await
    }

    pub async fn total_donated(&self) -> BloodlinkResult<u64> {
        Ok(self
            .repo
            .list()
            .await?
            .iter()
            .map(|d| u64::from(d.quantity))
            .sum())
    }

    /// Donated quantity per blood group; groups never donated are absent.
    pub async fn donated_by_blood_group(&self) -> BloodlinkResult<BTreeMap<BloodGroup, u64>> {
        let mut totals = BTreeMap::new();
        for donation in self.repo.list().await? {
            *totals.entry(donation.blood_group).or_insert(0) += u64::from(donation.quantity);
        }
        Ok(totals)
    }
}
