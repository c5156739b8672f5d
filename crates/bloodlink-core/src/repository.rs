//! Repository trait definitions for data access abstraction.
//!
//! All repository operations are async. Each trait covers one logical
//! collection; implementations must perform every mutation as a single
//! storage statement so that concurrent callers cannot lose updates.

use chrono::{DateTime, Utc};

use crate::error::BloodlinkResult;
use crate::models::{
    blood_group::BloodGroup,
    blood_request::{BloodRequest, CreateBloodRequest, RequestStatus},
    donation::{CreateDonation, Donation, InventoryLevel},
    donor_response::{CreateDonorResponse, DonorResponse},
    notification::{CreateNotification, NotificationRecord},
    one_time_code::{CodePurpose, CreateOneTimeCode, OneTimeCode},
    user::{CreateUser, User, UserRole},
};

// ---------------------------------------------------------------------------
// User directory
// ---------------------------------------------------------------------------

pub trait UserRepository: Send + Sync {
    /// Fails with `AlreadyExists` when the username is taken.
    fn create(&self, input: CreateUser) -> impl Future<Output = BloodlinkResult<User>> + Send;
    fn get_by_username(&self, username: &str)
    -> impl Future<Output = BloodlinkResult<User>> + Send;
    fn get_by_email(&self, email: &str) -> impl Future<Output = BloodlinkResult<User>> + Send;
    fn list_by_role(&self, role: UserRole)
    -> impl Future<Output = BloodlinkResult<Vec<User>>> + Send;
    fn update_password(
        &self,
        username: &str,
        password_hash: String,
    ) -> impl Future<Output = BloodlinkResult<()>> + Send;
    fn count(&self) -> impl Future<Output = BloodlinkResult<u64>> + Send;
}

// ---------------------------------------------------------------------------
// Requests and responses
// ---------------------------------------------------------------------------

pub trait BloodRequestRepository: Send + Sync {
    fn create(
        &self,
        input: CreateBloodRequest,
    ) -> impl Future<Output = BloodlinkResult<BloodRequest>> + Send;
    fn get_by_id(&self, id: &str) -> impl Future<Output = BloodlinkResult<BloodRequest>> + Send;
    /// Overwrites the status unconditionally.
    fn update_status(
        &self,
        id: &str,
        status: RequestStatus,
    ) -> impl Future<Output = BloodlinkResult<BloodRequest>> + Send;
    fn list_by_requester(
        &self,
        requester: &str,
    ) -> impl Future<Output = BloodlinkResult<Vec<BloodRequest>>> + Send;
    fn list_by_status(
        &self,
        status: RequestStatus,
    ) -> impl Future<Output = BloodlinkResult<Vec<BloodRequest>>> + Send;
    fn list(&self) -> impl Future<Output = BloodlinkResult<Vec<BloodRequest>>> + Send;
}

pub trait DonorResponseRepository: Send + Sync {
    /// Persists a new response with status `pending_approval`, assigning
    /// the next ordinal for this `(request, donor)` pair.
    fn create(
        &self,
        input: CreateDonorResponse,
    ) -> impl Future<Output = BloodlinkResult<DonorResponse>> + Send;
    fn list_by_request(
        &self,
        request_id: &str,
    ) -> impl Future<Output = BloodlinkResult<Vec<DonorResponse>>> + Send;
    fn list_by_donor(
        &self,
        donor_username: &str,
    ) -> impl Future<Output = BloodlinkResult<Vec<DonorResponse>>> + Send;
}

// ---------------------------------------------------------------------------
// One-time codes
// ---------------------------------------------------------------------------

pub trait OneTimeCodeRepository: Send + Sync {
    /// Store a code under `(purpose, subject)`, replacing whatever was
    /// there before.
    fn upsert(
        &self,
        input: CreateOneTimeCode,
    ) -> impl Future<Output = BloodlinkResult<OneTimeCode>> + Send;
    fn get(
        &self,
        purpose: CodePurpose,
        subject: &str,
    ) -> impl Future<Output = BloodlinkResult<OneTimeCode>> + Send;
    /// Atomically mark the code consumed if it matches `code_hash`, is
    /// unconsumed and has not expired at `now`. Returns whether it did.
    fn consume(
        &self,
        purpose: CodePurpose,
        subject: &str,
        code_hash: &str,
        now: DateTime<Utc>,
    ) -> impl Future<Output = BloodlinkResult<bool>> + Send;
    /// Delete every code that expired before `now`, consumed or not.
    fn delete_expired(&self, now: DateTime<Utc>)
    -> impl Future<Output = BloodlinkResult<u64>> + Send;
}

// ---------------------------------------------------------------------------
// Notifications
// ---------------------------------------------------------------------------

pub trait NotificationRepository: Send + Sync {
    fn append(
        &self,
        input: CreateNotification,
    ) -> impl Future<Output = BloodlinkResult<NotificationRecord>> + Send;
    /// Unordered.
    fn list_by_recipient(
        &self,
        recipient: &str,
    ) -> impl Future<Output = BloodlinkResult<Vec<NotificationRecord>>> + Send;
}

// ---------------------------------------------------------------------------
// Donations and inventory
// ---------------------------------------------------------------------------

pub trait DonationRepository: Send + Sync {
    fn create(&self, input: CreateDonation)
    -> impl Future<Output = BloodlinkResult<Donation>> + Send;
    fn list_by_donor(
        &self,
        donor: &str,
    ) -> impl Future<Output = BloodlinkResult<Vec<Donation>>> + Send;
    fn list(&self) -> impl Future<Output = BloodlinkResult<Vec<Donation>>> + Send;
    /// Add `quantity` to the counter for `blood_group` and return the new level.
    fn increment_inventory(
        &self,
        blood_group: BloodGroup,
        quantity: u32,
    ) -> impl Future<Output = BloodlinkResult<InventoryLevel>> + Send;
    /// One entry per blood group, zero when nothing was donated.
    fn inventory(&self) -> impl Future<Output = BloodlinkResult<Vec<InventoryLevel>>> + Send;
}
