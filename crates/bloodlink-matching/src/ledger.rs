//! Blood request ledger.

use std::collections::BTreeMap;

use bloodlink_core::error::{BloodlinkError, BloodlinkResult};
use bloodlink_core::models::blood_group::BloodGroup;
use bloodlink_core::models::blood_request::{
    BloodRequest, CreateBloodRequest, RequestStatus, Urgency,
};
use bloodlink_core::repository::BloodRequestRepository;
use chrono::{NaiveDate, Utc};
use tracing::info;
use uuid::Uuid;

/// Caller-supplied fields of a new request.
#[derive(Debug, Clone)]
pub struct NewBloodRequest {
    pub blood_group: BloodGroup,
    /// Millilitres.
    pub quantity: u32,
    pub urgency: Urgency,
    pub required_date: NaiveDate,
    pub reason: String,
    pub contact_info: String,
}

/// `REQ_` followed by a time-ordered UUID, unique even for requests
/// created in the same millisecond.
pub fn generate_request_id() -> String {
    format!("REQ_{}", Uuid::now_v7().simple())
}

pub struct RequestLedger<R: BloodRequestRepository> {
    repo: R,
}

impl<R: BloodRequestRepository> RequestLedger<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Validate and persist a request with status `pending`.
    pub async fn create(
        &self,
        requester: &str,
        input: NewBloodRequest,
    ) -> BloodlinkResult<BloodRequest> {
        let requester = requester.trim();
        if requester.is_empty() {
            return Err(BloodlinkError::validation("requester is required"));
        }
        if input.quantity == 0 {
            return Err(BloodlinkError::validation(
                "quantity must be greater than zero",
            ));
        }
        let reason = input.reason.trim();
        if reason.is_empty() {
            return Err(BloodlinkError::validation("reason is required"));
        }
        let contact_info = input.contact_info.trim();
        if contact_info.is_empty() {
            return Err(BloodlinkError::validation("contact information is required"));
        }

        let request = self
            .repo
            .create(CreateBloodRequest {
                id: generate_request_id(),
                requester: requester.to_string(),
                blood_group: input.blood_group,
                quantity: input.quantity,
                urgency: input.urgency,
                required_date: input.required_date,
                reason: reason.to_string(),
                contact_info: contact_info.to_string(),
                date: Utc::now(),
            })
            .await?;

        info!(
            request_id = %request.id,
            requester = %request.requester,
            blood_group = %request.blood_group,
            quantity = request.quantity,
            urgency = request.urgency.as_str(),
            "Blood request recorded"
        );
        Ok(request)
    }

    /// Overwrite the status. Any status may replace any other.
    pub async fn update_status(
        &self,
        id: &str,
        status: RequestStatus,
    ) -> BloodlinkResult<BloodRequest> {
        let request = self.repo.update_status(id, status).await?;
        info!(request_id = %request.id, status = status.as_str(), "Request status updated");
        Ok(request)
    }

    pub async fn get(&self, id: &str) -> BloodlinkResult<BloodRequest> {
        self.repo.get_by_id(id).await
    }

    pub async fn list_by_requester(&self, requester: &str) -> BloodlinkResult<Vec<BloodRequest>> {
        self.repo.list_by_requester(requester).await
    }

    pub async fn list_pending(&self) -> BloodlinkResult<Vec<BloodRequest>> {
        self.repo.list_by_status(RequestStatus::Pending).await
    }

    /// Sum of requested quantities across every request.
    pub async fn total_requested(&self) -> BloodlinkResult<u64> {
        Ok(self
            .repo
            .list()
            .await?
            .iter()
            .map(|r| u64::from(r.quantity))
            .sum())
    }

    /// Requested quantity per blood group; groups never requested are absent.
    pub async fn requested_by_blood_group(&self) -> BloodlinkResult<BTreeMap<BloodGroup, u64>> {
        let mut totals = BTreeMap::new();
        for request in self.repo.list().await? {
            *totals.entry(request.blood_group).or_insert(0) += u64::from(request.quantity);
        }
        Ok(totals)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_ids_are_prefixed_and_unique() {
        let a = generate_request_id();
        let b = generate_request_id();
        assert!(a.starts_with("REQ_"));
        assert_eq!(a.len(), 4 + 32);
        assert_ne!(a, b);
    }
}
