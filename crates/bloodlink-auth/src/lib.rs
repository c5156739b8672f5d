//! bloodlink auth: one-time code issuance and verification, password
//! hashing, and the account flows built on them (registration, login,
//! password reset and change).

pub mod account;
pub mod code;
pub mod config;
pub mod error;
pub mod issuance;
mod messages;
pub mod password;

pub use account::{AccountService, RegisterUser, Registration};
pub use config::AuthConfig;
pub use error::AuthError;
pub use issuance::{CodeIssuanceService, IssuedCode};
