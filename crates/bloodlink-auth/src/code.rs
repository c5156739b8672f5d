//! One-time code generation and hashing.

use bloodlink_core::models::one_time_code::CodePurpose;
use rand::Rng;
use rand::distr::Alphanumeric;
use sha2::{Digest, Sha256};

use crate::config::AuthConfig;

/// Numeric verification code of `length` digits. Leading zeros are kept.
pub fn generate_otp(length: usize) -> String {
    let mut rng = rand::rng();
    (0..length)
        .map(|_| char::from(b'0' + rng.random_range(0..10u8)))
        .collect()
}

/// Alphanumeric password reset token of `length` characters.
pub fn generate_reset_token(length: usize) -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(length)
        .map(char::from)
        .collect()
}

/// Fresh code in the format used for `purpose`.
pub fn generate_for(purpose: CodePurpose, config: &AuthConfig) -> String {
    match purpose {
        CodePurpose::EmailVerification | CodePurpose::PhoneVerification => {
            generate_otp(config.otp_length)
        }
        CodePurpose::PasswordReset => generate_reset_token(config.reset_token_length),
    }
}

/// SHA-256 hash of a raw code, hex-encoded.
///
/// This is the value stored as `one_time_code.code_hash`.
pub fn hash_code(raw: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(raw.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn otp_is_all_digits() {
        for _ in 0..50 {
            let otp = generate_otp(6);
            assert_eq!(otp.len(), 6);
            assert!(otp.chars().all(|c| c.is_ascii_digit()), "{otp}");
        }
    }

    #[test]
    fn reset_token_is_alphanumeric() {
        let token = generate_reset_token(32);
        assert_eq!(token.len(), 32);
        assert!(token.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_ne!(token, generate_reset_token(32));
    }

    #[test]
    fn format_follows_purpose() {
        let config = AuthConfig::default();
        assert_eq!(generate_for(CodePurpose::PhoneVerification, &config).len(), 6);
        assert_eq!(generate_for(CodePurpose::PasswordReset, &config).len(), 32);
    }

    #[test]
    fn hash_is_deterministic_hex() {
        let a = hash_code("123456");
        assert_eq!(a, hash_code("123456"));
        assert_ne!(a, hash_code("123457"));
        assert_eq!(a.len(), 64);
    }
}
