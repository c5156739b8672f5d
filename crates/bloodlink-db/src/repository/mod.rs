//! SurrealDB repository implementations.

mod blood_request;
mod donation;
mod donor_response;
mod notification;
mod one_time_code;
mod user;

pub use blood_request::SurrealBloodRequestRepository;
pub use donation::SurrealDonationRepository;
pub use donor_response::SurrealDonorResponseRepository;
pub use notification::SurrealNotificationRepository;
pub use one_time_code::SurrealOneTimeCodeRepository;
pub use user::SurrealUserRepository;

use std::str::FromStr;

use bloodlink_core::error::BloodlinkError;
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::DbError;

/// Parse a string column back into its domain enum.
fn decode<T>(value: &str, column: &str) -> Result<T, DbError>
where
    T: FromStr<Err = BloodlinkError>,
{
    value
        .parse()
        .map_err(|e: BloodlinkError| DbError::Decode(format!("{column}: {e}")))
}

fn decode_uuid(value: &str) -> Result<Uuid, DbError> {
    Uuid::parse_str(value).map_err(|e| DbError::Decode(format!("invalid UUID: {e}")))
}

/// Row struct for count queries.
#[derive(Debug, SurrealValue)]
struct CountRow {
    total: u64,
}
