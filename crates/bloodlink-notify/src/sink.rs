//! Notification sink over a [`NotificationRepository`].

use bloodlink_core::error::{BloodlinkError, BloodlinkResult};
use bloodlink_core::models::notification::{Channel, CreateNotification, NotificationRecord};
use bloodlink_core::repository::NotificationRepository;
use tracing::{debug, info};

#[derive(Clone)]
pub struct NotificationSink<N: NotificationRepository> {
    repo: N,
}

impl<N: NotificationRepository> NotificationSink<N> {
    pub fn new(repo: N) -> Self {
        Self { repo }
    }

    /// Record an email. Fails when the address is blank or the log write
    /// fails; never reports anything about actual delivery.
    pub async fn send_email(
        &self,
        recipient: &str,
        subject: &str,
        body: &str,
    ) -> BloodlinkResult<NotificationRecord> {
        self.send(Channel::Email, recipient, Some(subject), body)
            .await
    }

    /// Record an SMS.
    pub async fn send_sms(&self, recipient: &str, body: &str) -> BloodlinkResult<NotificationRecord> {
        self.send(Channel::Sms, recipient, None, body).await
    }

    /// All records addressed to `recipient`, in no particular order.
    pub async fn notifications_for(&self, recipient: &str) -> BloodlinkResult<Vec<NotificationRecord>> {
        debug!(recipient, "Listing notifications");
        self.repo.list_by_recipient(recipient).await
    }

    async fn send(
        &self,
        channel: Channel,
        recipient: &str,
        subject: Option<&str>,
        body: &str,
    ) -> BloodlinkResult<NotificationRecord> {
        let recipient = recipient.trim();
        if recipient.is_empty() {
            return Err(BloodlinkError::Notification(format!(
                "no {} address for recipient",
                channel.as_str()
            )));
        }

        let record = self
            .repo
            .append(CreateNotification {
                channel,
                recipient: recipient.to_string(),
                subject: subject.map(str::to_string),
                message: body.to_string(),
            })
            .await
            .map_err(|e| BloodlinkError::Notification(e.to_string()))?;

        info!(
            channel = channel.as_str(),
            recipient = %record.recipient,
            notification_id = %record.id,
            "Notification recorded"
        );
        Ok(record)
    }
}
