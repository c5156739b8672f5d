//! Matching and response engine.
//!
//! Routes a request to every donor whose blood group may give to it,
//! records donor responses and reports them back to the requester.
//! Notifications are best effort: a failed send becomes a warning on an
//! otherwise successful result and never undoes the write that caused it.

use std::collections::BTreeMap;

use bloodlink_core::compatibility::{compatible_donor_groups, compatible_recipient_groups};
use bloodlink_core::error::{BloodlinkError, BloodlinkResult};
use bloodlink_core::models::blood_request::BloodRequest;
use bloodlink_core::models::donor_response::{CreateDonorResponse, DonorResponse, ResponseKind};
use bloodlink_core::models::user::{User, UserRole};
use bloodlink_core::repository::{
    BloodRequestRepository, DonorResponseRepository, NotificationRepository, UserRepository,
};
use bloodlink_notify::NotificationSink;
use tracing::{info, warn};

use crate::ledger::{NewBloodRequest, RequestLedger};
use crate::messages;

/// Outcome of notifying compatible donors about one request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchReport {
    /// Emails successfully recorded.
    pub notifications_sent: usize,
    /// Donors whose blood group is compatible, regardless of sends.
    pub total_compatible: usize,
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct RequestSubmission {
    pub request: BloodRequest,
    pub report: MatchReport,
}

/// A donor's answer to a request.
#[derive(Debug, Clone)]
pub struct NewDonorResponse {
    pub request_id: String,
    pub kind: ResponseKind,
    pub message: Option<String>,
    /// Millilitres. Ignored for declines.
    pub quantity_offered: u32,
}

#[derive(Debug, Clone)]
pub struct ResponseReceipt {
    pub response: DonorResponse,
    pub warnings: Vec<String>,
}

/// One of a requester's requests together with every response to it.
#[derive(Debug, Clone)]
pub struct RequestWithResponses {
    pub request: BloodRequest,
    pub responses: Vec<DonorResponse>,
}

pub struct MatchingEngine<U, R, D, N>
where
    U: UserRepository,
    R: BloodRequestRepository,
    D: DonorResponseRepository,
    N: NotificationRepository,
{
    users: U,
    ledger: RequestLedger<R>,
    responses: D,
    sink: NotificationSink<N>,
}

impl<U, R, D, N> MatchingEngine<U, R, D, N>
where
    U: UserRepository,
    R: BloodRequestRepository,
    D: DonorResponseRepository,
    N: NotificationRepository,
{
    pub fn new(users: U, ledger: RequestLedger<R>, responses: D, sink: NotificationSink<N>) -> Self {
        Self {
            users,
            ledger,
            responses,
            sink,
        }
    }

    pub fn ledger(&self) -> &RequestLedger<R> {
        &self.ledger
    }

    /// Record a request and notify compatible donors. Once the request is
    /// stored the call succeeds; matching problems are reported as
    /// warnings.
    pub async fn submit_request(
        &self,
        requester: &str,
        input: NewBloodRequest,
    ) -> BloodlinkResult<RequestSubmission> {
        let request = self.ledger.create(requester, input).await?;

        let report = match self.match_and_notify(&request).await {
            Ok(report) => report,
            Err(e) => {
                warn!(request_id = %request.id, error = %e, "Donor matching failed");
                MatchReport {
                    warnings: vec![format!("donors could not be notified: {e}")],
                    ..MatchReport::default()
                }
            }
        };

        Ok(RequestSubmission { request, report })
    }

    /// Email and text every donor whose blood group may give to the
    /// request's group.
    pub async fn match_and_notify(&self, request: &BloodRequest) -> BloodlinkResult<MatchReport> {
        let groups = compatible_donor_groups(request.blood_group);
        let donors: Vec<(User, _)> = self
            .users
            .list_by_role(UserRole::Donor)
            .await?
            .into_iter()
            .filter_map(|donor| {
                let group = donor.blood_group.filter(|g| groups.contains(g))?;
                Some((donor, group))
            })
            .collect();

        let mut report = MatchReport {
            total_compatible: donors.len(),
            ..MatchReport::default()
        };

        for (donor, group) in &donors {
            let email = messages::match_email(&donor.username, *group, request);
            match self
                .sink
                .send_email(&donor.email, messages::MATCH_SUBJECT, &email)
                .await
            {
                Ok(_) => report.notifications_sent += 1,
                Err(e) => report
                    .warnings
                    .push(format!("email to donor {}: {e}", donor.username)),
            }

            if let Err(e) = self
                .sink
                .send_sms(&donor.phone, &messages::match_sms(*group, request))
                .await
            {
                report
                    .warnings
                    .push(format!("sms to donor {}: {e}", donor.username));
            }
        }

        info!(
            request_id = %request.id,
            blood_group = %request.blood_group,
            total_compatible = report.total_compatible,
            notifications_sent = report.notifications_sent,
            "Compatible donors notified"
        );
        Ok(report)
    }

    /// Pending requests the donor's blood may serve. Empty when the donor
    /// has not registered a blood group.
    pub async fn pending_requests_for_donor(&self, donor: &str) -> BloodlinkResult<Vec<BloodRequest>> {
        let user = self.users.get_by_username(donor).await?;
        let Some(group) = user.blood_group else {
            return Ok(Vec::new());
        };

        let recipients = compatible_recipient_groups(group);
        Ok(self
            .ledger
            .list_pending()
            .await?
            .into_iter()
            .filter(|r| recipients.contains(&r.blood_group))
            .collect())
    }

    /// Record a donor's answer and tell the requester. The request status
    /// is left unchanged.
    pub async fn respond(&self, donor: &str, input: NewDonorResponse) -> BloodlinkResult<ResponseReceipt> {
        let request = self.ledger.get(&input.request_id).await?;

        let quantity_offered = match input.kind {
            ResponseKind::Accept => {
                if input.quantity_offered == 0 {
                    return Err(BloodlinkError::validation(
                        "quantity offered must be greater than zero",
                    ));
                }
                if input.quantity_offered > request.quantity {
                    return Err(BloodlinkError::validation(format!(
                        "quantity offered ({} ml) exceeds the requested {} ml",
                        input.quantity_offered, request.quantity
                    )));
                }
                input.quantity_offered
            }
            ResponseKind::Decline => 0,
        };
        let message = input
            .message
            .map(|m| m.trim().to_string())
            .filter(|m| !m.is_empty());

        let response = self
            .responses
            .create(CreateDonorResponse {
                request_id: request.id.clone(),
                donor_username: donor.to_string(),
                response_type: input.kind,
                message,
                quantity_offered,
            })
            .await?;

        info!(
            request_id = %request.id,
            donor,
            response = input.kind.as_str(),
            quantity_offered,
            "Donor response recorded"
        );

        let warnings = self.notify_requester(&request, &response).await;
        Ok(ResponseReceipt { response, warnings })
    }

    async fn notify_requester(&self, request: &BloodRequest, response: &DonorResponse) -> Vec<String> {
        let mut warnings = Vec::new();

        let requester = match self.users.get_by_username(&request.requester).await {
            Ok(u) => u,
            Err(e) => {
                warnings.push(format!("requester {} not notified: {e}", request.requester));
                return warnings;
            }
        };
        let donor = match self.users.get_by_username(&response.donor_username).await {
            Ok(u) => u,
            Err(e) => {
                warnings.push(format!(
                    "requester {} not notified, donor {} unknown: {e}",
                    request.requester, response.donor_username
                ));
                return warnings;
            }
        };

        let message = response.message.as_deref();
        let (subject, email, sms) = match response.response_type {
            ResponseKind::Accept => (
                messages::ACCEPT_SUBJECT,
                messages::accept_email(
                    &requester.username,
                    &donor.username,
                    donor.blood_group,
                    &donor.phone,
                    response.quantity_offered,
                    message,
                    request,
                ),
                messages::accept_sms(request, response.quantity_offered, &donor.phone),
            ),
            ResponseKind::Decline => (
                messages::DECLINE_SUBJECT,
                messages::decline_email(&requester.username, message),
                messages::decline_sms(request),
            ),
        };

        if let Err(e) = self.sink.send_email(&requester.email, subject, &email).await {
            warnings.push(format!("email to requester {}: {e}", requester.username));
        }
        if let Err(e) = self.sink.send_sms(&requester.phone, &sms).await {
            warnings.push(format!("sms to requester {}: {e}", requester.username));
        }
        for warning in &warnings {
            warn!(request_id = %request.id, %warning, "Requester notification incomplete");
        }
        warnings
    }

    pub async fn responses_for_request(&self, request_id: &str) -> BloodlinkResult<Vec<DonorResponse>> {
        self.responses.list_by_request(request_id).await
    }

    /// Every request the requester made, each with its responses.
    pub async fn requester_view(&self, requester: &str) -> BloodlinkResult<Vec<RequestWithResponses>> {
        let requests = self.ledger.list_by_requester(requester).await?;
        let mut view = Vec::with_capacity(requests.len());
        for request in requests {
            let responses = self.responses.list_by_request(&request.id).await?;
            view.push(RequestWithResponses { request, responses });
        }
        Ok(view)
    }

    pub async fn donor_response_history(&self, donor: &str) -> BloodlinkResult<Vec<DonorResponse>> {
        self.responses.list_by_donor(donor).await
    }

    /// The most recent response of each donor to a request, ordered by
    /// donor username.
    pub async fn latest_response_per_donor(&self, request_id: &str) -> BloodlinkResult<Vec<DonorResponse>> {
        let mut latest: BTreeMap<String, DonorResponse> = BTreeMap::new();
        for response in self.responses.list_by_request(request_id).await? {
            match latest.get(&response.donor_username) {
                Some(seen) if seen.ordinal >= response.ordinal => {}
                _ => {
                    latest.insert(response.donor_username.clone(), response);
                }
            }
        }
        Ok(latest.into_values().collect())
    }
}
