//! Authentication error types.

use bloodlink_core::error::BloodlinkError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("invalid or expired code")]
    InvalidOrExpiredCode,

    #[error("{0} is required")]
    MissingField(&'static str),

    #[error("passwords do not match")]
    PasswordMismatch,

    #[error("password must be at least {min} characters long")]
    PasswordTooShort { min: usize },

    #[error("new password must be different from current password")]
    PasswordUnchanged,

    #[error("{0} has not been verified")]
    ContactNotVerified(&'static str),

    #[error("cryptography error: {0}")]
    Crypto(String),
}

impl From<AuthError> for BloodlinkError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials | AuthError::InvalidOrExpiredCode => {
                BloodlinkError::AuthenticationFailed {
                    reason: err.to_string(),
                }
            }
            AuthError::MissingField(_)
            | AuthError::PasswordMismatch
            | AuthError::PasswordTooShort { .. }
            | AuthError::PasswordUnchanged
            | AuthError::ContactNotVerified(_) => BloodlinkError::Validation {
                message: err.to_string(),
            },
            AuthError::Crypto(msg) => BloodlinkError::Crypto(msg),
        }
    }
}
