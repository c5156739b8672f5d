//! Outbound notification log entry.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::BloodlinkError;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    Email,
    Sms,
}

impl Channel {
    pub fn as_str(self) -> &'static str {
        match self {
            Channel::Email => "email",
            Channel::Sms => "sms",
        }
    }
}

impl FromStr for Channel {
    type Err = BloodlinkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "email" => Ok(Channel::Email),
            "sms" => Ok(Channel::Sms),
            other => Err(BloodlinkError::validation(format!(
                "unknown channel: {other}"
            ))),
        }
    }
}

/// No delivery confirmation is modelled, so every record is `Sent`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryStatus {
    Sent,
}

/// Append-only; never mutated after creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationRecord {
    pub id: Uuid,
    pub channel: Channel,
    pub recipient: String,
    /// Email only.
    pub subject: Option<String>,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub status: DeliveryStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateNotification {
    pub channel: Channel,
    pub recipient: String,
    pub subject: Option<String>,
    pub message: String,
}
