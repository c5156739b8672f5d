//! SurrealDB implementation of [`DonorResponseRepository`].

use bloodlink_core::error::BloodlinkResult;
use bloodlink_core::models::donor_response::{
    CreateDonorResponse, DonorResponse, ResponseKind, ResponseStatus,
};
use bloodlink_core::repository::DonorResponseRepository;
use chrono::{DateTime, Utc};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use super::{CountRow, decode, decode_uuid};
use crate::error::DbError;

#[derive(Debug, SurrealValue)]
struct DonorResponseRow {
    record_id: String,
    request_id: String,
    donor_username: String,
    ordinal: u32,
    response_type: String,
    message: Option<String>,
    quantity_offered: u32,
    response_date: DateTime<Utc>,
    status: String,
}

impl DonorResponseRow {
    fn try_into_response(self) -> Result<DonorResponse, DbError> {
        let status = match self.status.as_str() {
            "pending_approval" => ResponseStatus::PendingApproval,
            other => return Err(DbError::Decode(format!("status: unknown {other}"))),
        };
        Ok(DonorResponse {
            id: decode_uuid(&self.record_id)?,
            request_id: self.request_id,
            donor_username: self.donor_username,
            ordinal: self.ordinal,
            response_type: decode::<ResponseKind>(&self.response_type, "response_type")?,
            message: self.message,
            quantity_offered: self.quantity_offered,
            response_date: self.response_date,
            status,
        })
    }
}

fn rows_into_responses(rows: Vec<DonorResponseRow>) -> Result<Vec<DonorResponse>, DbError> {
    rows.into_iter()
        .map(DonorResponseRow::try_into_response)
        .collect()
}

/// SurrealDB implementation of the DonorResponse repository.
pub struct SurrealDonorResponseRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> Clone for SurrealDonorResponseRepository<C> {
    fn clone(&self) -> Self {
        Self {
            db: self.db.clone(),
        }
    }
}

impl<C: Connection> SurrealDonorResponseRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> DonorResponseRepository for SurrealDonorResponseRepository<C> {
    async fn create(&self, input: CreateDonorResponse) -> BloodlinkResult<DonorResponse> {
        let mut count_result = self
            .db
            .query(
                "SELECT count() AS total FROM donor_response \
                 WHERE request_id = $request_id \
                 AND donor_username = $donor_username GROUP ALL",
            )
            .bind(("request_id", input.request_id.clone()))
            .bind(("donor_username", input.donor_username.clone()))
            .await
            .map_err(DbError::from)?;
        let count_rows: Vec<CountRow> = count_result.take(0).map_err(DbError::from)?;
        let previous = count_rows.first().map(|r| r.total).unwrap_or(0);
        let ordinal = u32::try_from(previous + 1)
            .map_err(|_| DbError::Query("response ordinal overflow".into()))?;

        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "CREATE type::record('donor_response', $id) SET \
                 request_id = $request_id, donor_username = $donor_username, \
                 ordinal = $ordinal, response_type = $response_type, \
                 message = $message, quantity_offered = $quantity_offered, \
                 status = $status; \
                 SELECT meta::id(id) AS record_id, * \
                 FROM type::record('donor_response', $id);",
            )
            .bind(("id", id_str.clone()))
            .bind(("request_id", input.request_id))
            .bind(("donor_username", input.donor_username))
            .bind(("ordinal", ordinal))
            .bind(("response_type", input.response_type.as_str().to_string()))
            .bind(("message", input.message))
            .bind(("quantity_offered", input.quantity_offered))
            .bind((
                "status",
                ResponseStatus::PendingApproval.as_str().to_string(),
            ))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<DonorResponseRow> = result.take(1).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "donor_response".into(),
            id: id_str,
        })?;

        Ok(row.try_into_response()?)
    }

    async fn list_by_request(&self, request_id: &str) -> BloodlinkResult<Vec<DonorResponse>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM donor_response \
                 WHERE request_id = $request_id \
                 ORDER BY response_date ASC",
            )
            .bind(("request_id", request_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<DonorResponseRow> = result.take(0).map_err(DbError::from)?;
        Ok(rows_into_responses(rows)?)
    }

    async fn list_by_donor(&self, donor_username: &str) -> BloodlinkResult<Vec<DonorResponse>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM donor_response \
                 WHERE donor_username = $donor_username \
                 ORDER BY response_date ASC",
            )
            .bind(("donor_username", donor_username.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<DonorResponseRow> = result.take(0).map_err(DbError::from)?;
        Ok(rows_into_responses(rows)?)
    }
}
