//! SurrealDB implementation of [`BloodRequestRepository`].

use bloodlink_core::error::BloodlinkResult;
use bloodlink_core::models::blood_group::BloodGroup;
use bloodlink_core::models::blood_request::{
    BloodRequest, CreateBloodRequest, RequestStatus, Urgency,
};
use bloodlink_core::repository::BloodRequestRepository;
use chrono::{DateTime, NaiveDate, Utc};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;

use super::decode;
use crate::error::DbError;

#[derive(Debug, SurrealValue)]
struct BloodRequestRow {
    record_id: String,
    requester: String,
    blood_group: String,
    quantity: u32,
    urgency: String,
    required_date: String,
    reason: String,
    contact_info: String,
    date: DateTime<Utc>,
    status: String,
    updated_at: Option<DateTime<Utc>>,
}

impl BloodRequestRow {
    fn try_into_request(self) -> Result<BloodRequest, DbError> {
        let required_date = self
            .required_date
            .parse::<NaiveDate>()
            .map_err(|e| DbError::Decode(format!("required_date: {e}")))?;
        Ok(BloodRequest {
            id: self.record_id,
            requester: self.requester,
            blood_group: decode::<BloodGroup>(&self.blood_group, "blood_group")?,
            quantity: self.quantity,
            urgency: decode::<Urgency>(&self.urgency, "urgency")?,
            required_date,
            reason: self.reason,
            contact_info: self.contact_info,
            date: self.date,
            status: decode::<RequestStatus>(&self.status, "status")?,
            updated_at: self.updated_at,
        })
    }
}

fn rows_into_requests(rows: Vec<BloodRequestRow>) -> Result<Vec<BloodRequest>, DbError> {
    rows.into_iter()
        .map(BloodRequestRow::try_into_request)
        .collect()
}

const SELECT_REQUEST: &str = "SELECT meta::id(id) AS record_id, * FROM blood_request";

/// SurrealDB implementation of the BloodRequest repository.
pub struct SurrealBloodRequestRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> Clone for SurrealBloodRequestRepository<C> {
    fn clone(&self) -> Self {
        Self {
            db: self.db.clone(),
        }
    }
}

impl<C: Connection> SurrealBloodRequestRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> BloodRequestRepository for SurrealBloodRequestRepository<C> {
    async fn create(&self, input: CreateBloodRequest) -> BloodlinkResult<BloodRequest> {
        let id = input.id.clone();

        let result = self
            .db
            .query(
                "CREATE type::record('blood_request', $id) SET \
                 requester = $requester, blood_group = $blood_group, \
                 quantity = $quantity, urgency = $urgency, \
                 required_date = $required_date, reason = $reason, \
                 contact_info = $contact_info, date = $date, \
                 status = 'pending', updated_at = NONE; \
                 SELECT meta::id(id) AS record_id, * \
                 FROM type::record('blood_request', $id);",
            )
            .bind(("id", id.clone()))
            .bind(("requester", input.requester))
            .bind(("blood_group", input.blood_group.as_str().to_string()))
            .bind(("quantity", input.quantity))
            .bind(("urgency", input.urgency.as_str().to_string()))
            .bind(("required_date", input.required_date.to_string()))
            .bind(("reason", input.reason))
            .bind(("contact_info", input.contact_info))
            .bind(("date", input.date))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<BloodRequestRow> = result.take(1).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "blood_request".into(),
            id,
        })?;

        Ok(row.try_into_request()?)
    }

    async fn get_by_id(&self, id: &str) -> BloodlinkResult<BloodRequest> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * \
                 FROM type::record('blood_request', $id)",
            )
            .bind(("id", id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<BloodRequestRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "blood_request".into(),
            id: id.to_string(),
        })?;

        Ok(row.try_into_request()?)
    }

    async fn update_status(&self, id: &str, status: RequestStatus) -> BloodlinkResult<BloodRequest> {
        let result = self
            .db
            .query(
                "UPDATE type::record('blood_request', $id) SET \
                 status = $status, updated_at = time::now(); \
                 SELECT meta::id(id) AS record_id, * \
                 FROM type::record('blood_request', $id);",
            )
            .bind(("id", id.to_string()))
            .bind(("status", status.as_str().to_string()))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<BloodRequestRow> = result.take(1).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "blood_request".into(),
            id: id.to_string(),
        })?;

        Ok(row.try_into_request()?)
    }

    async fn list_by_requester(&self, requester: &str) -> BloodlinkResult<Vec<BloodRequest>> {
        let mut result = self
            .db
            .query(format!(
                "{SELECT_REQUEST} WHERE requester = $requester ORDER BY date ASC"
            ))
            .bind(("requester", requester.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<BloodRequestRow> = result.take(0).map_err(DbError::from)?;
        Ok(rows_into_requests(rows)?)
    }

    async fn list_by_status(&self, status: RequestStatus) -> BloodlinkResult<Vec<BloodRequest>> {
        let mut result = self
            .db
            .query(format!(
                "{SELECT_REQUEST} WHERE status = $status ORDER BY date ASC"
            ))
            .bind(("status", status.as_str().to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<BloodRequestRow> = result.take(0).map_err(DbError::from)?;
        Ok(rows_into_requests(rows)?)
    }

    async fn list(&self) -> BloodlinkResult<Vec<BloodRequest>> {
        let mut result = self
            .db
            .query(format!("{SELECT_REQUEST} ORDER BY date ASC"))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<BloodRequestRow> = result.take(0).map_err(DbError::from)?;
        Ok(rows_into_requests(rows)?)
    }
}
