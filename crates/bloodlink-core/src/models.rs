//! Domain models for bloodlink.
//!
//! These are the core types shared across all crates.

pub mod blood_group;
pub mod blood_request;
pub mod donation;
pub mod donor_response;
pub mod notification;
pub mod one_time_code;
pub mod session;
pub mod user;
