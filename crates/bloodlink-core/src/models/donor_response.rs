//! Donor response domain model.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::BloodlinkError;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ResponseKind {
    Accept,
    Decline,
}

impl ResponseKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ResponseKind::Accept => "accept",
            ResponseKind::Decline => "decline",
        }
    }
}

impl FromStr for ResponseKind {
    type Err = BloodlinkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "accept" => Ok(ResponseKind::Accept),
            "decline" => Ok(ResponseKind::Decline),
            other => Err(BloodlinkError::validation(format!(
                "unknown response type: {other}"
            ))),
        }
    }
}

/// Approval state of a response. Only `PendingApproval` exists today.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ResponseStatus {
    PendingApproval,
}

impl ResponseStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ResponseStatus::PendingApproval => "pending_approval",
        }
    }
}

/// A donor's answer to a blood request. Identified by
/// `(request_id, donor_username, ordinal)`; a donor may answer the same
/// request more than once and every answer is kept.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DonorResponse {
    pub id: Uuid,
    pub request_id: String,
    pub donor_username: String,
    /// 1 for the donor's first answer to this request, 2 for the next, ...
    pub ordinal: u32,
    pub response_type: ResponseKind,
    pub message: Option<String>,
    /// Always 0 for declines.
    pub quantity_offered: u32,
    pub response_date: DateTime<Utc>,
    pub status: ResponseStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateDonorResponse {
    pub request_id: String,
    pub donor_username: String,
    pub response_type: ResponseKind,
    pub message: Option<String>,
    pub quantity_offered: u32,
}
