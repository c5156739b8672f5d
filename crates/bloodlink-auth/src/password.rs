//! Password hashing and policy using Argon2id.

use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHasher, PasswordVerifier};

use crate::error::AuthError;

fn argon2() -> Result<Argon2<'static>, AuthError> {
    // OWASP ASVS recommended: m=19456 (19 MiB), t=2, p=1
    let params = argon2::Params::new(19456, 2, 1, None)
        .map_err(|e| AuthError::Crypto(format!("argon2 params error: {e}")))?;
    Ok(Argon2::new(
        argon2::Algorithm::Argon2id,
        argon2::Version::V0x13,
        params,
    ))
}

fn peppered(password: &str, pepper: Option<&str>) -> String {
    match pepper {
        Some(p) => format!("{p}{password}"),
        None => password.to_string(),
    }
}

/// Hash a plaintext password into an Argon2id PHC string.
///
/// If `pepper` is provided it is prepended to the password first.
pub fn hash_password(password: &str, pepper: Option<&str>) -> Result<String, AuthError> {
    let input = peppered(password, pepper);
    let salt = SaltString::generate(&mut argon2::password_hash::rand_core::OsRng);
    let hash = argon2()?
        .hash_password(input.as_bytes(), &salt)
        .map_err(|e| AuthError::Crypto(format!("password hash error: {e}")))?;
    Ok(hash.to_string())
}

/// Verify a plaintext password against an Argon2id PHC-format hash.
///
/// Returns `Ok(true)` on match, `Ok(false)` on mismatch, or
/// `Err(AuthError::Crypto)` if the stored hash is malformed.
pub fn verify_password(password: &str, hash: &str, pepper: Option<&str>) -> Result<bool, AuthError> {
    let input = peppered(password, pepper);
    let parsed_hash = argon2::PasswordHash::new(hash)
        .map_err(|e| AuthError::Crypto(format!("invalid hash format: {e}")))?;

    match Argon2::default().verify_password(input.as_bytes(), &parsed_hash) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(AuthError::Crypto(format!("verify error: {e}"))),
    }
}

/// Check a new password and its confirmation against the length policy.
pub fn check_new_password(password: &str, confirm: &str, min_length: usize) -> Result<(), AuthError> {
    if password.is_empty() {
        return Err(AuthError::MissingField("password"));
    }
    if password != confirm {
        return Err(AuthError::PasswordMismatch);
    }
    if password.chars().count() < min_length {
        return Err(AuthError::PasswordTooShort { min: min_length });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn correct_password_matches() {
        let hash = hash_password("hunter22", None).unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("hunter22", &hash, None).unwrap());
    }

    #[test]
    fn wrong_password_does_not_match() {
        let hash = hash_password("hunter22", None).unwrap();
        assert!(!verify_password("wrong", &hash, None).unwrap());
    }

    #[test]
    fn pepper_is_applied() {
        let hash = hash_password("hunter22", Some("pepper!")).unwrap();
        assert!(verify_password("hunter22", &hash, Some("pepper!")).unwrap());
        assert!(!verify_password("hunter22", &hash, None).unwrap());
    }

    #[test]
    fn malformed_hash_is_crypto_error() {
        let err = verify_password("x", "not-a-hash", None).unwrap_err();
        assert!(matches!(err, AuthError::Crypto(_)));
    }

    #[test]
    fn policy_checks() {
        assert!(check_new_password("secret1", "secret1", 6).is_ok());
        assert!(matches!(
            check_new_password("secret1", "secret2", 6),
            Err(AuthError::PasswordMismatch)
        ));
        assert!(matches!(
            check_new_password("abc", "abc", 6),
            Err(AuthError::PasswordTooShort { min: 6 })
        ));
        assert!(matches!(
            check_new_password("", "", 6),
            Err(AuthError::MissingField("password"))
        ));
    }
}
