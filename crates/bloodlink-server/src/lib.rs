//! bloodlink server: the application facade that wires every service
//! over one database handle and reports results as serializable
//! envelopes.

pub mod app;
pub mod outcome;

pub use app::App;
pub use outcome::{DataOutcome, MessageOutcome, RequestOutcome};
