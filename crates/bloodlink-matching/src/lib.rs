//! bloodlink matching: the request ledger, the matching and response
//! engine that routes requests to compatible donors, and the donation
//! ledger that feeds the blood inventory.

pub mod donation;
pub mod engine;
pub mod ledger;
mod messages;

pub use donation::{DonationLedger, DonationReceipt};
pub use engine::{
    MatchReport, MatchingEngine, NewDonorResponse, RequestSubmission, RequestWithResponses,
    ResponseReceipt,
};
pub use ledger::{NewBloodRequest, RequestLedger};
