//! User domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::blood_group::BloodGroup;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Donor,
    Receiver,
}

impl UserRole {
    pub fn as_str(self) -> &'static str {
        match self {
            UserRole::Donor => "donor",
            UserRole::Receiver => "receiver",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "donor" => Some(UserRole::Donor),
            "receiver" => Some(UserRole::Receiver),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    /// Identity used across requests, responses and donations.
    pub username: String,
    pub email: String,
    pub phone: String,
    /// Argon2id PHC string.
    pub password_hash: String,
    pub role: UserRole,
    /// Only donors are required to register one.
    pub blood_group: Option<BloodGroup>,
    pub age: Option<u32>,
    pub email_verified: bool,
    pub phone_verified: bool,
    pub registration_date: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUser {
    pub username: String,
    pub email: String,
    pub phone: String,
    pub password_hash: String,
    pub role: UserRole,
    pub blood_group: Option<BloodGroup>,
    pub age: Option<u32>,
    pub email_verified: bool,
    pub phone_verified: bool,
}
