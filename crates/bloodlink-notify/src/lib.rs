//! bloodlink notify: the outbound email/SMS log.
//!
//! There is no real transport: "sending" appends a record to the
//! notification log, and success means the record was persisted.

mod sink;

pub use sink::NotificationSink;
