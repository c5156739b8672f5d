//! One-time code domain model (verification OTPs and reset tokens).

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::BloodlinkError;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum CodePurpose {
    EmailVerification,
    PhoneVerification,
    PasswordReset,
}

impl CodePurpose {
    pub fn as_str(self) -> &'static str {
        match self {
            CodePurpose::EmailVerification => "email_verification",
            CodePurpose::PhoneVerification => "phone_verification",
            CodePurpose::PasswordReset => "password_reset",
        }
    }

    /// Composite storage key for `(purpose, subject)`.
    pub fn key(self, subject: &str) -> String {
        format!("{}:{}", self.as_str(), subject)
    }
}

impl FromStr for CodePurpose {
    type Err = BloodlinkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "email_verification" => Ok(CodePurpose::EmailVerification),
            "phone_verification" => Ok(CodePurpose::PhoneVerification),
            "password_reset" => Ok(CodePurpose::PasswordReset),
            other => Err(BloodlinkError::validation(format!(
                "unknown code purpose: {other}"
            ))),
        }
    }
}

/// A stored code. Only the SHA-256 digest of the code is kept.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OneTimeCode {
    pub purpose: CodePurpose,
    /// Email address or phone number the code was sent to.
    pub subject: String,
    pub code_hash: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    /// Set once by the first successful verification; never cleared.
    pub consumed: bool,
    pub consumed_at: Option<DateTime<Utc>>,
}

impl OneTimeCode {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateOneTimeCode {
    pub purpose: CodePurpose,
    pub subject: String,
    pub code_hash: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_are_scoped_by_purpose() {
        let email = CodePurpose::EmailVerification.key("a@example.com");
        let reset = CodePurpose::PasswordReset.key("a@example.com");
        assert_ne!(email, reset);
        assert_eq!(reset, "password_reset:a@example.com");
    }
}
