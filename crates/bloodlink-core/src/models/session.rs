//! Caller context.

use serde::{Deserialize, Serialize};

use super::user::UserRole;

/// The authenticated caller, produced by a successful login and passed
/// explicitly into every operation that acts on behalf of a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub username: String,
    pub role: UserRole,
}

impl Session {
    pub fn is_donor(&self) -> bool {
        self.role == UserRole::Donor
    }
}
