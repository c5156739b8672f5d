//! SurrealDB implementation of [`NotificationRepository`].

use bloodlink_core::error::BloodlinkResult;
use bloodlink_core::models::notification::{
    Channel, CreateNotification, DeliveryStatus, NotificationRecord,
};
use bloodlink_core::repository::NotificationRepository;
use chrono::{DateTime, Utc};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use super::{decode, decode_uuid};
use crate::error::DbError;

#[derive(Debug, SurrealValue)]
struct NotificationRow {
    record_id: String,
    channel: String,
    recipient: String,
    subject: Option<String>,
    message: String,
    timestamp: DateTime<Utc>,
}

impl NotificationRow {
    fn try_into_record(self) -> Result<NotificationRecord, DbError> {
        Ok(NotificationRecord {
            id: decode_uuid(&self.record_id)?,
            channel: decode::<Channel>(&self.channel, "channel")?,
            recipient: self.recipient,
            subject: self.subject,
            message: self.message,
            timestamp: self.timestamp,
            status: DeliveryStatus::Sent,
        })
    }
}

/// SurrealDB implementation of the Notification repository.
pub struct SurrealNotificationRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> Clone for SurrealNotificationRepository<C> {
    fn clone(&self) -> Self {
        Self {
            db: self.db.clone(),
        }
    }
}

impl<C: Connection> SurrealNotificationRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> NotificationRepository for SurrealNotificationRepository<C> {
    async fn append(&self, input: CreateNotification) -> BloodlinkResult<NotificationRecord> {
        let id_str = Uuid::new_v4().to_string();

        let result = self
            .db
            .query(
                "CREATE type::record('notification', $id) SET \
                 channel = $channel, recipient = $recipient, \
                 subject = $subject, message = $message, status = 'sent'; \
                 SELECT meta::id(id) AS record_id, * \
                 FROM type::record('notification', $id);",
            )
            .bind(("id", id_str.clone()))
            .bind(("channel", input.channel.as_str().to_string()))
            .bind(("recipient", input.recipient))
            .bind(("subject", input.subject))
            .bind(("message", input.message))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<NotificationRow> = result.take(1).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "notification".into(),
            id: id_str,
        })?;

        Ok(row.try_into_record()?)
    }

    async fn list_by_recipient(&self, recipient: &str) -> BloodlinkResult<Vec<NotificationRecord>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM notification \
                 WHERE recipient = $recipient",
            )
            .bind(("recipient", recipient.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<NotificationRow> = result.take(0).map_err(DbError::from)?;
        let records = rows
            .into_iter()
            .map(NotificationRow::try_into_record)
            .collect::<Result<Vec<_>, DbError>>()?;
        Ok(records)
    }
}
