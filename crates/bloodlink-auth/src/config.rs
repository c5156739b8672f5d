//! Authentication configuration.

use bloodlink_core::models::one_time_code::CodePurpose;
use chrono::Duration;

/// Configuration for code issuance and account flows.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Digits in an email/phone verification code (default: 6).
    pub otp_length: usize,
    /// Verification code lifetime in seconds (default: 600 = 10 minutes).
    pub otp_ttl_secs: u64,
    /// Characters in a password reset token (default: 32).
    pub reset_token_length: usize,
    /// Reset token lifetime in seconds (default: 3600 = 1 hour).
    pub reset_token_ttl_secs: u64,
    /// Minimum password length for policy enforcement (default: 6).
    pub min_password_length: usize,
    /// Optional pepper prepended to passwords before Argon2id hashing.
    pub pepper: Option<String>,
    /// Registration requires both the email and the phone code to have
    /// been verified first (default: true).
    pub require_contact_verification: bool,
    /// Base URL embedded in reset emails; token and email are appended as
    /// query parameters.
    pub reset_link_base: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            otp_length: 6,
            otp_ttl_secs: 600,
            reset_token_length: 32,
            reset_token_ttl_secs: 3600,
            min_password_length: 6,
            pepper: None,
            require_contact_verification: true,
            reset_link_base: "https://bloodlink.local/reset".into(),
        }
    }
}

impl AuthConfig {
    /// Lifetime of a code issued for `purpose`.
    pub fn ttl(&self, purpose: CodePurpose) -> Duration {
        let secs = match purpose {
            CodePurpose::EmailVerification | CodePurpose::PhoneVerification => self.otp_ttl_secs,
            CodePurpose::PasswordReset => self.reset_token_ttl_secs,
        };
        Duration::seconds(secs as i64)
    }
}
