//! Application facade.

use std::collections::BTreeMap;

use bloodlink_auth::{AccountService, AuthConfig, CodeIssuanceService, RegisterUser};
use bloodlink_core::error::{BloodlinkError, BloodlinkResult};
use bloodlink_core::models::blood_group::BloodGroup;
use bloodlink_core::models::blood_request::{BloodRequest, RequestStatus};
use bloodlink_core::models::donation::{CreateDonation, Donation, InventoryLevel};
use bloodlink_core::models::donor_response::DonorResponse;
use bloodlink_core::models::notification::NotificationRecord;
use bloodlink_core::models::session::Session;
use bloodlink_core::models::user::UserRole;
use bloodlink_core::repository::UserRepository;
use bloodlink_db::repository::{
    SurrealBloodRequestRepository, SurrealDonationRepository, SurrealDonorResponseRepository,
    SurrealNotificationRepository, SurrealOneTimeCodeRepository, SurrealUserRepository,
};
use bloodlink_matching::{
    DonationLedger, MatchingEngine, NewBloodRequest, NewDonorResponse, RequestLedger,
};
use bloodlink_notify::NotificationSink;
use chrono::NaiveDate;
use serde::Serialize;
use surrealdb::{Connection, Surreal};
use tracing::{info, warn};

use crate::outcome::{DataOutcome, MessageOutcome, RequestOutcome};

type Accounts<C> = AccountService<
    SurrealUserRepository<C>,
    SurrealOneTimeCodeRepository<C>,
    SurrealNotificationRepository<C>,
>;

type Engine<C> = MatchingEngine<
    SurrealUserRepository<C>,
    SurrealBloodRequestRepository<C>,
    SurrealDonorResponseRepository<C>,
    SurrealNotificationRepository<C>,
>;

/// Which contact a verification code is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Contact {
    Email,
    Phone,
}

impl Contact {
    fn label(self) -> &'static str {
        match self {
            Contact::Email => "email",
            Contact::Phone => "phone",
        }
    }
}

/// One request with every response to it.
#[derive(Debug, Clone, Serialize)]
pub struct RequestResponses {
    pub request: BloodRequest,
    pub responses: Vec<DonorResponse>,
}

/// Dashboard figures.
#[derive(Debug, Clone, Serialize)]
pub struct Statistics {
    pub total_users: u64,
    pub total_donated: u64,
    pub total_requested: u64,
    pub donated_by_blood_group: BTreeMap<BloodGroup, u64>,
    pub requested_by_blood_group: BTreeMap<BloodGroup, u64>,
}

/// Input for recording a donation on behalf of the logged-in donor.
#[derive(Debug, Clone)]
pub struct DonationInput {
    pub blood_group: Option<BloodGroup>,
    pub quantity: u32,
    pub date: NaiveDate,
    pub blood_bank: String,
    pub notes: String,
}

/// Every service over one SurrealDB handle.
pub struct App<C: Connection> {
    users: SurrealUserRepository<C>,
    accounts: Accounts<C>,
    engine: Engine<C>,
    donations: DonationLedger<SurrealDonationRepository<C>>,
    sink: NotificationSink<SurrealNotificationRepository<C>>,
}

impl<C: Connection> App<C> {
    /// Wire the services. Migrations must already have been applied.
    pub fn new(db: Surreal<C>, auth: AuthConfig) -> Self {
        let users = SurrealUserRepository::new(db.clone());
        let sink = NotificationSink::new(SurrealNotificationRepository::new(db.clone()));
        let codes = CodeIssuanceService::new(
            SurrealOneTimeCodeRepository::new(db.clone()),
            sink.clone(),
            auth,
        );
        let engine = MatchingEngine::new(
            users.clone(),
            RequestLedger::new(SurrealBloodRequestRepository::new(db.clone())),
            SurrealDonorResponseRepository::new(db.clone()),
            sink.clone(),
        );

        Self {
            accounts: AccountService::new(users.clone(), codes),
            users,
            engine,
            donations: DonationLedger::new(SurrealDonationRepository::new(db)),
            sink,
        }
    }

    // -------------------------------------------------------------------
    // Accounts and codes
    // -------------------------------------------------------------------

    pub async fn register(&self, input: RegisterUser) -> MessageOutcome {
        match self.accounts.register(input).await {
            Ok(registration) => MessageOutcome::ok(format!(
                "Account {} created",
                registration.user.username
            ))
            .with_warnings(registration.warning),
            Err(e) => failed("register", e),
        }
    }

    pub async fn login(&self, username: &str, password: &str, role: UserRole) -> BloodlinkResult<Session> {
        self.accounts.login(username, password, role).await
    }

    pub async fn send_otp(&self, contact: Contact, address: &str) -> MessageOutcome {
        let issued = match contact {
            Contact::Email => self.accounts.send_email_otp(address).await,
            Contact::Phone => self.accounts.send_phone_otp(address).await,
        };
        match issued {
            Ok(code) => MessageOutcome::ok(format!(
                "Verification code sent to {} (valid until {})",
                code.subject, code.expires_at
            ))
            .with_warnings(code.warning),
            Err(e) => failed("send_otp", e),
        }
    }

    pub async fn verify_otp(&self, contact: Contact, address: &str, code: &str) -> MessageOutcome {
        let verified = match contact {
            Contact::Email => self.accounts.verify_email_otp(address, code).await,
            Contact::Phone => self.accounts.verify_phone_otp(address, code).await,
        };
        match verified {
            Ok(true) => MessageOutcome::ok(format!("{} {address} verified", contact.label())),
            Ok(false) => MessageOutcome::failed("invalid or expired code"),
            Err(e) => failed("verify_otp", e),
        }
    }

    pub async fn initiate_password_reset(&self, email: &str) -> MessageOutcome {
        match self.accounts.initiate_password_reset(email).await {
            Ok(code) => MessageOutcome::ok(format!("Password reset instructions sent to {}", code.subject))
                .with_warnings(code.warning),
            Err(e) => failed("initiate_password_reset", e),
        }
    }

    pub async fn reset_password(
        &self,
        email: &str,
        token: &str,
        new_password: &str,
        confirm_password: &str,
    ) -> MessageOutcome {
        match self
            .accounts
            .reset_password(email, token, new_password, confirm_password)
            .await
        {
            Ok(()) => MessageOutcome::ok("Password has been reset"),
            Err(e) => failed("reset_password", e),
        }
    }

    pub async fn change_password(
        &self,
        session: &Session,
        current_password: &str,
        new_password: &str,
        confirm_password: &str,
    ) -> MessageOutcome {
        match self
            .accounts
            .change_password(session, current_password, new_password, confirm_password)
            .await
        {
            Ok(()) => MessageOutcome::ok("Password changed"),
            Err(e) => failed("change_password", e),
        }
    }

    /// Remove expired codes.
    pub async fn sweep_codes(&self) -> MessageOutcome {
        match self.accounts.codes().expire_old_codes().await {
            Ok(removed) => MessageOutcome::ok(format!("{removed} expired code(s) removed")),
            Err(e) => failed("sweep_codes", e),
        }
    }

    // -------------------------------------------------------------------
    // Requests and responses
    // -------------------------------------------------------------------

    pub async fn submit_request(&self, session: &Session, input: NewBloodRequest) -> RequestOutcome {
        match self.engine.submit_request(&session.username, input).await {
            Ok(submission) => RequestOutcome {
                success: true,
                request_id: Some(submission.request.id),
                notifications_sent: submission.report.notifications_sent,
                total_compatible: submission.report.total_compatible,
                warnings: submission.report.warnings,
                error: None,
            },
            Err(e) => {
                warn!(operation = "submit_request", error = %e, "Operation failed");
                RequestOutcome::failed(e)
            }
        }
    }

    pub async fn pending_requests(&self, session: &Session) -> DataOutcome<Vec<BloodRequest>> {
        if !session.is_donor() {
            return DataOutcome::failed(donors_only());
        }
        self.engine
            .pending_requests_for_donor(&session.username)
            .await
            .into()
    }

    pub async fn respond(&self, session: &Session, input: NewDonorResponse) -> MessageOutcome {
        if !session.is_donor() {
            return MessageOutcome::failed(donors_only());
        }
        match self.engine.respond(&session.username, input).await {
            Ok(receipt) => MessageOutcome::ok(format!(
                "Response recorded for request {}",
                receipt.response.request_id
            ))
            .with_warnings(receipt.warnings),
            Err(e) => failed("respond", e),
        }
    }

    /// Every request made by the caller with its responses.
    pub async fn my_requests(&self, session: &Session) -> DataOutcome<Vec<RequestResponses>> {
        self.engine
            .requester_view(&session.username)
            .await
            .map(|view| {
                view.into_iter()
                    .map(|entry| RequestResponses {
                        request: entry.request,
                        responses: entry.responses,
                    })
                    .collect()
            })
            .into()
    }

    /// The caller's own response history.
    pub async fn my_responses(&self, session: &Session) -> DataOutcome<Vec<DonorResponse>> {
        self.engine
            .donor_response_history(&session.username)
            .await
            .into()
    }

    /// Change the status of one of the caller's requests.
    pub async fn update_request_status(
        &self,
        session: &Session,
        request_id: &str,
        status: RequestStatus,
    ) -> MessageOutcome {
        let result = async {
            let request = self.engine.ledger().get(request_id).await?;
            if request.requester != session.username {
                return Err(BloodlinkError::validation(
                    "only the requester may change a request's status",
                ));
            }
            self.engine.ledger().update_status(request_id, status).await
        }
        .await;

        match result {
            Ok(request) => MessageOutcome::ok(format!(
                "Request {} is now {}",
                request.id,
                request.status.as_str()
            )),
            Err(e) => failed("update_request_status", e),
        }
    }

    // -------------------------------------------------------------------
    // Donations, inventory and notifications
    // -------------------------------------------------------------------

    /// Record a donation by the caller. The blood group defaults to the
    /// donor's registered group.
    pub async fn donate(&self, session: &Session, input: DonationInput) -> MessageOutcome {
        if !session.is_donor() {
            return MessageOutcome::failed(donors_only());
        }
        let result = async {
            let blood_group = match input.blood_group {
                Some(group) => group,
                None => self
                    .users
                    .get_by_username(&session.username)
                    .await?
                    .blood_group
                    .ok_or_else(|| BloodlinkError::validation("blood group is required"))?,
            };
            self.donations
                .donate(CreateDonation {
                    donor: session.username.clone(),
                    blood_group,
                    quantity: input.quantity,
                    date: input.date,
                    blood_bank: input.blood_bank,
                    notes: input.notes,
                })
                .await
        }
        .await;

        match result {
            Ok(receipt) => MessageOutcome::ok(format!(
                "Donation of {} ml recorded; {} inventory is now {} ml",
                receipt.donation.quantity, receipt.inventory.blood_group, receipt.inventory.quantity
            )),
            Err(e) => failed("donate", e),
        }
    }

    pub async fn my_donations(&self, session: &Session) -> DataOutcome<Vec<Donation>> {
        self.donations
            .donations_by_donor(&session.username)
            .await
            .into()
    }

    pub async fn inventory(&self) -> DataOutcome<Vec<InventoryLevel>> {
        self.donations.inventory().await.into()
    }

    /// Notifications addressed to `address`, newest first.
    pub async fn notifications(&self, address: &str) -> DataOutcome<Vec<NotificationRecord>> {
        self.sink
            .notifications_for(address)
            .await
            .map(|mut records| {
                records.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
                records
            })
            .into()
    }

    pub async fn statistics(&self) -> DataOutcome<Statistics> {
        let result = async {
            let ledger = self.engine.ledger();
            Ok::<_, BloodlinkError>(Statistics {
                total_users: self.users.count().await?,
                total_donated: self.donations.total_donated().await?,
                total_requested: ledger.total_requested().await?,
                donated_by_blood_group: self.donations.donated_by_blood_group().await?,
                requested_by_blood_group: ledger.requested_by_blood_group().await?,
            })
        }
        .await;
        result.into()
    }
}

fn donors_only() -> BloodlinkError {
    BloodlinkError::validation("only donors can do this")
}

fn failed(operation: &'static str, error: BloodlinkError) -> MessageOutcome {
    match &error {
        BloodlinkError::Database(_) | BloodlinkError::Internal(_) | BloodlinkError::Crypto(_) => {
            warn!(operation, error = %error, "Operation failed");
        }
        _ => info!(operation, error = %error, "Operation rejected"),
    }
    MessageOutcome::failed(error)
}
