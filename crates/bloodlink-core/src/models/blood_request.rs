//! Blood request domain model.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::blood_group::BloodGroup;
use crate::error::BloodlinkError;

/// Priority of a request. Ordered `Low < Medium < High < Critical`;
/// affects display order only, never matching eligibility.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Urgency {
    Low,
    Medium,
    High,
    Critical,
}

impl Urgency {
    pub fn as_str(self) -> &'static str {
        match self {
            Urgency::Low => "Low",
            Urgency::Medium => "Medium",
            Urgency::High => "High",
            Urgency::Critical => "Critical",
        }
    }
}

impl fmt::Display for Urgency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Urgency {
    type Err = BloodlinkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Urgency::Low),
            "medium" => Ok(Urgency::Medium),
            "high" => Ok(Urgency::High),
            "critical" => Ok(Urgency::Critical),
            other => Err(BloodlinkError::validation(format!("unknown urgency: {other}"))),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    Pending,
    Fulfilled,
    Cancelled,
}

impl RequestStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            RequestStatus::Pending => "pending",
            RequestStatus::Fulfilled => "fulfilled",
            RequestStatus::Cancelled => "cancelled",
        }
    }
}

impl FromStr for RequestStatus {
    type Err = BloodlinkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(RequestStatus::Pending),
            "fulfilled" => Ok(RequestStatus::Fulfilled),
            "cancelled" => Ok(RequestStatus::Cancelled),
            other => Err(BloodlinkError::validation(format!(
                "unknown request status: {other}"
            ))),
        }
    }
}

/// A request for blood. Everything except `status` (and the
/// `updated_at` stamp that tracks it) is immutable after creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BloodRequest {
    /// `REQ_` followed by a time-ordered UUIDv7.
    pub id: String,
    pub requester: String,
    pub blood_group: BloodGroup,
    /// Millilitres, always positive.
    pub quantity: u32,
    pub urgency: Urgency,
    pub required_date: NaiveDate,
    pub reason: String,
    pub contact_info: String,
    /// Creation timestamp.
    pub date: DateTime<Utc>,
    pub status: RequestStatus,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateBloodRequest {
    pub id: String,
    pub requester: String,
    pub blood_group: BloodGroup,
    pub quantity: u32,
    pub urgency: Urgency,
    pub required_date: NaiveDate,
    pub reason: String,
    pub contact_info: String,
    pub date: DateTime<Utc>,
}
