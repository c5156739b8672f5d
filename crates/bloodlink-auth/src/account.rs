//! Account flows: registration, login, contact verification and
//! password management.

use bloodlink_core::error::{BloodlinkError, BloodlinkResult};
use bloodlink_core::models::blood_group::BloodGroup;
use bloodlink_core::models::one_time_code::CodePurpose;
use bloodlink_core::models::session::Session;
use bloodlink_core::models::user::{CreateUser, User, UserRole};
use bloodlink_core::repository::{NotificationRepository, OneTimeCodeRepository, UserRepository};
use tracing::{info, warn};

use crate::error::AuthError;
use crate::issuance::{CodeIssuanceService, IssuedCode};
use crate::messages;
use crate::password;

/// Minimum and maximum donor age, inclusive.
pub const DONOR_AGE_RANGE: std::ops::RangeInclusive<u32> = 18..=65;

/// Input for the registration flow.
#[derive(Debug, Clone)]
pub struct RegisterUser {
    pub username: String,
    pub email: String,
    pub phone: String,
    pub password: String,
    pub confirm_password: String,
    pub role: UserRole,
    pub blood_group: Option<BloodGroup>,
    pub age: Option<u32>,
}

/// Successful registration.
#[derive(Debug, Clone)]
pub struct Registration {
    pub user: User,
    /// Set when the welcome email could not be recorded.
    pub warning: Option<String>,
}

pub struct AccountService<U, C, N>
where
    U: UserRepository,
    C: OneTimeCodeRepository,
    N: NotificationRepository,
{
    user_repo: U,
    codes: CodeIssuanceService<C, N>,
}

impl<U, C, N> AccountService<U, C, N>
where
    U: UserRepository,
    C: OneTimeCodeRepository,
    N: NotificationRepository,
{
    pub fn new(user_repo: U, codes: CodeIssuanceService<C, N>) -> Self {
        Self { user_repo, codes }
    }

    pub fn codes(&self) -> &CodeIssuanceService<C, N> {
        &self.codes
    }

    pub async fn user(&self, username: &str) -> BloodlinkResult<User> {
        self.user_repo.get_by_username(username).await
    }

    /// Create an account after validating the input and, when configured,
    /// confirming that both contact codes were verified.
    pub async fn register(&self, input: RegisterUser) -> BloodlinkResult<Registration> {
        let username = input.username.trim();
        let email = input.email.trim();
        let phone = input.phone.trim();

        if username.is_empty() {
            return Err(AuthError::MissingField("username").into());
        }
        if email.is_empty() {
            return Err(AuthError::MissingField("email").into());
        }
        if phone.is_empty() {
            return Err(AuthError::MissingField("phone").into());
        }

        let config = self.codes.config();
        password::check_new_password(
            &input.password,
            &input.confirm_password,
            config.min_password_length,
        )?;

        let (blood_group, age) = match input.role {
            UserRole::Donor => {
                let group = input.blood_group.ok_or(AuthError::MissingField("blood group"))?;
                let age = input.age.ok_or(AuthError::MissingField("age"))?;
                if !DONOR_AGE_RANGE.contains(&age) {
                    return Err(BloodlinkError::validation(format!(
                        "donors must be between {} and {} years old",
                        DONOR_AGE_RANGE.start(),
                        DONOR_AGE_RANGE.end()
                    )));
                }
                (Some(group), Some(age))
            }
            UserRole::Receiver => (input.blood_group, input.age),
        };

        let email_verified = self
            .codes
            .is_verified(email, CodePurpose::EmailVerification)
            .await?;
        let phone_verified = self
            .codes
            .is_verified(phone, CodePurpose::PhoneVerification)
            .await?;
        if config.require_contact_verification {
            if !email_verified {
                return Err(AuthError::ContactNotVerified("email").into());
            }
            if !phone_verified {
                return Err(AuthError::ContactNotVerified("phone").into());
            }
        }

        let password_hash = password::hash_password(&input.password, config.pepper.as_deref())?;

        let user = self
            .user_repo
            .create(CreateUser {
                username: username.to_string(),
                email: email.to_string(),
                phone: phone.to_string(),
                password_hash,
                role: input.role,
                blood_group,
                age,
                email_verified,
                phone_verified,
            })
            .await?;

        info!(username = %user.username, role = user.role.as_str(), "User registered");

        let warning = match self
            .codes
            .sink()
            .send_email(
                &user.email,
                messages::WELCOME_EMAIL_SUBJECT,
                &messages::welcome_email(&user.username),
            )
            .await
        {
            Ok(_) => None,
            Err(e) => {
                warn!(username = %user.username, error = %e, "Welcome email not recorded");
                Some(e.to_string())
            }
        };

        Ok(Registration { user, warning })
    }

    /// Check credentials and role, returning the caller context on success.
    pub async fn login(&self, username: &str, password: &str, role: UserRole) -> BloodlinkResult<Session> {
        let user = match self.user_repo.get_by_username(username.trim()).await {
            Ok(u) => u,
            Err(BloodlinkError::NotFound { .. }) => return Err(AuthError::InvalidCredentials.into()),
            Err(e) => return Err(e),
        };

        let valid = password::verify_password(
            password,
            &user.password_hash,
            self.codes.config().pepper.as_deref(),
        )?;
        if !valid || user.role != role {
            warn!(username = %user.username, "Login rejected");
            return Err(AuthError::InvalidCredentials.into());
        }

        info!(username = %user.username, role = role.as_str(), "Login succeeded");
        Ok(Session {
            username: user.username,
            role: user.role,
        })
    }

    pub async fn send_email_otp(&self, email: &str) -> BloodlinkResult<IssuedCode> {
        self.codes.issue(email, CodePurpose::EmailVerification).await
    }

    pub async fn send_phone_otp(&self, phone: &str) -> BloodlinkResult<IssuedCode> {
        self.codes.issue(phone, CodePurpose::PhoneVerification).await
    }

    pub async fn verify_email_otp(&self, email: &str, otp: &str) -> BloodlinkResult<bool> {
        self.codes
            .verify(email, CodePurpose::EmailVerification, otp)
            .await
    }

    pub async fn verify_phone_otp(&self, phone: &str, otp: &str) -> BloodlinkResult<bool> {
        self.codes
            .verify(phone, CodePurpose::PhoneVerification, otp)
            .await
    }

    /// Mail a reset token to the account registered under `email`.
    pub async fn initiate_password_reset(&self, email: &str) -> BloodlinkResult<IssuedCode> {
        let user = self.user_repo.get_by_email(email.trim()).await?;
        self.codes
            .issue_to(&user.email, CodePurpose::PasswordReset, Some(&user.username))
            .await
    }

    /// Replace the password of the account under `email` using a reset
    /// token. The password policy is checked before the token is
    /// consumed, so a rejected password leaves the token usable.
    pub async fn reset_password(
        &self,
        email: &str,
        token: &str,
        new_password: &str,
        confirm_password: &str,
    ) -> BloodlinkResult<()> {
        let config = self.codes.config();
        password::check_new_password(new_password, confirm_password, config.min_password_length)?;

        let user = self.user_repo.get_by_email(email.trim()).await?;
        if !self
            .codes
            .verify(&user.email, CodePurpose::PasswordReset, token)
            .await?
        {
            return Err(AuthError::InvalidOrExpiredCode.into());
        }

        let hash = password::hash_password(new_password, config.pepper.as_deref())?;
        self.user_repo.update_password(&user.username, hash).await?;
        info!(username = %user.username, "Password reset");
        Ok(())
    }

    pub async fn change_password(
        &self,
        session: &Session,
        current_password: &str,
        new_password: &str,
        confirm_password: &str,
    ) -> BloodlinkResult<()> {
        let config = self.codes.config();
        let user = self.user_repo.get_by_username(&session.username).await?;

        if !password::verify_password(current_password, &user.password_hash, config.pepper.as_deref())? {
            return Err(AuthError::InvalidCredentials.into());
        }
        password::check_new_password(new_password, confirm_password, config.min_password_length)?;
        if new_password == current_password {
            return Err(AuthError::PasswordUnchanged.into());
        }

        let hash = password::hash_password(new_password, config.pepper.as_deref())?;
        self.user_repo.update_password(&user.username, hash).await?;
        info!(username = %user.username, "Password changed");
        Ok(())
    }
}
