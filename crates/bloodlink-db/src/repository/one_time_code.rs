//! SurrealDB implementation of [`OneTimeCodeRepository`].
//!
//! Codes live at `one_time_code:⟨purpose:subject⟩`, so a new code for the
//! same key replaces the previous one in a single UPSERT, and consumption
//! is a single conditional UPDATE.

use bloodlink_core::error::BloodlinkResult;
use bloodlink_core::models::one_time_code::{CodePurpose, CreateOneTimeCode, OneTimeCode};
use bloodlink_core::repository::OneTimeCodeRepository;
use chrono::{DateTime, Utc};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;

use super::{CountRow, decode};
use crate::error::DbError;

#[derive(Debug, SurrealValue)]
struct OneTimeCodeRow {
    purpose: String,
    subject: String,
    code_hash: String,
    created_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
    consumed: bool,
    consumed_at: Option<DateTime<Utc>>,
}

impl OneTimeCodeRow {
    fn try_into_code(self) -> Result<OneTimeCode, DbError> {
        Ok(OneTimeCode {
            purpose: decode::<CodePurpose>(&self.purpose, "purpose")?,
            subject: self.subject,
            code_hash: self.code_hash,
            created_at: self.created_at,
            expires_at: self.expires_at,
            consumed: self.consumed,
            consumed_at: self.consumed_at,
        })
    }
}

/// SurrealDB implementation of the OneTimeCode repository.
pub struct SurrealOneTimeCodeRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> Clone for SurrealOneTimeCodeRepository<C> {
    fn clone(&self) -> Self {
        Self {
            db: self.db.clone(),
        }
    }
}

impl<C: Connection> SurrealOneTimeCodeRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> OneTimeCodeRepository for SurrealOneTimeCodeRepository<C> {
    async fn upsert(&self, input: CreateOneTimeCode) -> BloodlinkResult<OneTimeCode> {
        let key = input.purpose.key(&input.subject);

        let result = self
            .db
            .query(
                "UPSERT type::record('one_time_code', $key) SET \
                 purpose = $purpose, subject = $subject, \
                 code_hash = $code_hash, created_at = $created_at, \
                 expires_at = $expires_at, consumed = false, \
                 consumed_at = NONE",
            )
            .bind(("key", key.clone()))
            .bind(("purpose", input.purpose.as_str().to_string()))
            .bind(("subject", input.subject))
            .bind(("code_hash", input.code_hash))
            .bind(("created_at", input.created_at))
            .bind(("expires_at", input.expires_at))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<OneTimeCodeRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "one_time_code".into(),
            id: key,
        })?;

        Ok(row.try_into_code()?)
    }

    async fn get(&self, purpose: CodePurpose, subject: &str) -> BloodlinkResult<OneTimeCode> {
        let key = purpose.key(subject);

        let mut result = self
            .db
            .query("SELECT * FROM type::record('one_time_code', $key)")
            .bind(("key", key.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<OneTimeCodeRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "one_time_code".into(),
            id: key,
        })?;

        Ok(row.try_into_code()?)
    }

    async fn consume(
        &self,
        purpose: CodePurpose,
        subject: &str,
        code_hash: &str,
        now: DateTime<Utc>,
    ) -> BloodlinkResult<bool> {
        let mut result = self
            .db
            .query(
                "UPDATE type::record('one_time_code', $key) SET \
                 consumed = true, consumed_at = $now \
                 WHERE code_hash = $code_hash AND consumed = false \
                 AND expires_at >= $now",
            )
            .bind(("key", purpose.key(subject)))
            .bind(("code_hash", code_hash.to_string()))
            .bind(("now", now))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<OneTimeCodeRow> = result.take(0).map_err(DbError::from)?;
        Ok(!rows.is_empty())
    }

    async fn delete_expired(&self, now: DateTime<Utc>) -> BloodlinkResult<u64> {
        // Count expired codes first, then delete.
        let mut count_result = self
            .db
            .query(
                "SELECT count() AS total FROM one_time_code \
                 WHERE expires_at < $now GROUP ALL",
            )
            .bind(("now", now))
            .await
            .map_err(DbError::from)?;
        let count_rows: Vec<CountRow> = count_result.take(0).map_err(DbError::from)?;
        let total = count_rows.first().map(|r| r.total).unwrap_or(0);

        self.db
            .query("DELETE one_time_code WHERE expires_at < $now")
            .bind(("now", now))
            .await
            .map_err(DbError::from)?;

        Ok(total)
    }
}
