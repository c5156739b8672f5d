//! One-time code issuance and single-use verification.

use bloodlink_core::error::{BloodlinkError, BloodlinkResult};
use bloodlink_core::models::one_time_code::{CodePurpose, CreateOneTimeCode};
use bloodlink_core::repository::{NotificationRepository, OneTimeCodeRepository};
use bloodlink_notify::NotificationSink;
use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::code;
use crate::config::AuthConfig;
use crate::messages;

/// A freshly issued code.
///
/// The raw value is returned to the caller as well as sent through the
/// notification sink; only its hash is stored.
#[derive(Debug, Clone)]
pub struct IssuedCode {
    pub purpose: CodePurpose,
    pub subject: String,
    pub code: String,
    pub expires_at: DateTime<Utc>,
    /// Set when the code was stored but its notification could not be
    /// recorded.
    pub warning: Option<String>,
}

/// Issues, verifies and garbage-collects codes keyed by
/// `(purpose, subject)`.
pub struct CodeIssuanceService<C: OneTimeCodeRepository, N: NotificationRepository> {
    code_repo: C,
    sink: NotificationSink<N>,
    config: AuthConfig,
}

impl<C: OneTimeCodeRepository, N: NotificationRepository> CodeIssuanceService<C, N> {
    pub fn new(code_repo: C, sink: NotificationSink<N>, config: AuthConfig) -> Self {
        Self {
            code_repo,
            sink,
            config,
        }
    }

    pub fn sink(&self) -> &NotificationSink<N> {
        &self.sink
    }

    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    /// Issue a new code for `subject`, replacing any previous one for the
    /// same purpose, and send it by email or SMS.
    pub async fn issue(&self, subject: &str, purpose: CodePurpose) -> BloodlinkResult<IssuedCode> {
        self.issue_to(subject, purpose, None).await
    }

    /// Like [`issue`](Self::issue), addressing the message to `name` when
    /// the channel supports a greeting.
    pub async fn issue_to(
        &self,
        subject: &str,
        purpose: CodePurpose,
        name: Option<&str>,
    ) -> BloodlinkResult<IssuedCode> {
        let subject = subject.trim();
        if subject.is_empty() {
            return Err(BloodlinkError::validation(format!(
                "a subject is required to issue a {} code",
                purpose.as_str()
            )));
        }

        let raw = code::generate_for(purpose, &self.config);
        let now = Utc::now();
        let ttl = self.config.ttl(purpose);

        let stored = self
            .code_repo
            .upsert(CreateOneTimeCode {
                purpose,
                subject: subject.to_string(),
                code_hash: code::hash_code(&raw),
                created_at: now,
                expires_at: now + ttl,
            })
            .await?;

        let ttl_minutes = ttl.num_minutes();
        let sent = match purpose {
            CodePurpose::EmailVerification => {
                self.sink
                    .send_email(
                        subject,
                        messages::OTP_EMAIL_SUBJECT,
                        &messages::otp_email(&raw, ttl_minutes),
                    )
                    .await
            }
            CodePurpose::PhoneVerification => {
                self.sink
                    .send_sms(subject, &messages::otp_sms(&raw, ttl_minutes))
                    .await
            }
            CodePurpose::PasswordReset => {
                let body = messages::reset_email(
                    name,
                    subject,
                    &raw,
                    &self.config.reset_link_base,
                    ttl_minutes,
                );
                self.sink
                    .send_email(subject, messages::RESET_EMAIL_SUBJECT, &body)
                    .await
            }
        };

        let warning = match sent {
            Ok(_) => None,
            Err(e) => {
                warn!(purpose = purpose.as_str(), subject, error = %e, "Code stored but not delivered");
                Some(e.to_string())
            }
        };

        info!(
            purpose = purpose.as_str(),
            subject,
            expires_at = %stored.expires_at,
            "Code issued"
        );

        Ok(IssuedCode {
            purpose,
            subject: subject.to_string(),
            code: raw,
            expires_at: stored.expires_at,
            warning,
        })
    }

    /// One verification attempt. Returns `false` when no code exists, it
    /// has expired, it was already used, or the value does not match. A
    /// match consumes the code.
    pub async fn verify(
        &self,
        subject: &str,
        purpose: CodePurpose,
        presented: &str,
    ) -> BloodlinkResult<bool> {
        let subject = subject.trim();
        let presented = presented.trim();
        if subject.is_empty() || presented.is_empty() {
            return Ok(false);
        }

        let consumed = self
            .code_repo
            .consume(purpose, subject, &code::hash_code(presented), Utc::now())
            .await?;

        if consumed {
            info!(purpose = purpose.as_str(), subject, "Code verified");
        } else {
            debug!(purpose = purpose.as_str(), subject, "Code rejected");
        }
        Ok(consumed)
    }

    /// Whether the code for `(purpose, subject)` has been consumed.
    pub async fn is_verified(&self, subject: &str, purpose: CodePurpose) -> BloodlinkResult<bool> {
        match self.code_repo.get(purpose, subject.trim()).await {
            Ok(code) => Ok(code.consumed),
            Err(BloodlinkError::NotFound { .. }) => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Delete every expired code and return how many were removed.
    pub async fn expire_old_codes(&self) -> BloodlinkResult<u64> {
        let removed = self.code_repo.delete_expired(Utc::now()).await?;
        if removed > 0 {
            info!(removed, "Expired codes removed");
        }
        Ok(removed)
    }
}
