//! Donation and inventory models.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::blood_group::BloodGroup;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Donation {
    pub id: Uuid,
    pub donor: String,
    pub blood_group: BloodGroup,
    /// Millilitres.
    pub quantity: u32,
    /// Day the blood was given.
    pub date: NaiveDate,
    pub blood_bank: String,
    pub notes: String,
    /// When the donation was recorded.
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateDonation {
    pub donor: String,
    pub blood_group: BloodGroup,
    pub quantity: u32,
    pub date: NaiveDate,
    pub blood_bank: String,
    pub notes: String,
}

/// Running total of donated millilitres for one blood group.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct InventoryLevel {
    pub blood_group: BloodGroup,
    pub quantity: u64,
}
