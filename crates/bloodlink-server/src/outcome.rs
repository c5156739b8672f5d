//! Result envelopes returned to the CLI layer.
//!
//! Failures never escape as errors past the facade; each envelope carries
//! a `success` flag and, when it is false, an error description.

use std::fmt::Display;

use bloodlink_core::error::BloodlinkResult;
use serde::Serialize;

/// Outcome of a request submission.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RequestOutcome {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    pub notifications_sent: usize,
    pub total_compatible: usize,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RequestOutcome {
    pub fn failed(error: impl Display) -> Self {
        Self {
            error: Some(error.to_string()),
            ..Self::default()
        }
    }
}

/// Outcome of a code, account or response operation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MessageOutcome {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl MessageOutcome {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            ..Self::default()
        }
    }

    pub fn failed(error: impl Display) -> Self {
        Self {
            error: Some(error.to_string()),
            ..Self::default()
        }
    }

    pub fn with_warnings(mut self, warnings: impl IntoIterator<Item = String>) -> Self {
        self.warnings.extend(warnings);
        self
    }
}

/// Outcome of a read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DataOutcome<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> DataOutcome<T> {
    pub fn failed(error: impl Display) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.to_string()),
        }
    }
}

impl<T> From<BloodlinkResult<T>> for DataOutcome<T> {
    fn from(result: BloodlinkResult<T>) -> Self {
        match result {
            Ok(data) => Self {
                success: true,
                data: Some(data),
                error: None,
            },
            Err(e) => Self::failed(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bloodlink_core::error::BloodlinkError;

    #[test]
    fn failed_message_serializes_without_empty_fields() {
        let outcome = MessageOutcome::failed("boom");
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json, serde_json::json!({"success": false, "error": "boom"}));
    }

    #[test]
    fn request_outcome_always_carries_counts() {
        let json = serde_json::to_value(RequestOutcome::failed("nope")).unwrap();
        assert_eq!(json["notifications_sent"], 0);
        assert_eq!(json["total_compatible"], 0);
        assert!(json.get("request_id").is_none());
    }

    #[test]
    fn data_outcome_from_result() {
        let ok: DataOutcome<u32> = Ok(7).into();
        assert!(ok.success);
        assert_eq!(ok.data, Some(7));

        let err: DataOutcome<u32> = Err(BloodlinkError::not_found("request", "REQ_x")).into();
        assert!(!err.success);
        assert!(err.error.unwrap().contains("REQ_x"));
    }
}
