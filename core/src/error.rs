//! Error types for the Raseed API client.
//!
//! # Design
//! Every endpoint call fails in one of a few ways and callers branch on the
//! variant, not on message text. Non-200 responses keep the numeric status;
//! the backend's error body is retained only for diagnostics.

use std::time::Duration;

use thiserror::Error;

/// Errors returned by `RaseedClient` parse methods and `Transport` impls.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request never produced a response (DNS, refused, reset).
    #[error("network error: {0}")]
    Transport(String),

    /// No response arrived within the request's timeout.
    #[error("request timed out after {}s", .0.as_secs_f32())]
    Timeout(Duration),

    /// The server answered with anything other than 200.
    #[error("request failed with status {status}")]
    Status { status: u16, body: String },

    /// The response body was not the JSON shape the endpoint returns.
    #[error("could not decode response: {0}")]
    Decode(String),

    /// The request payload could not be serialized to JSON.
    #[error("could not encode request: {0}")]
    Serialization(String),
}

impl ApiError {
    /// The HTTP status code, when the failure came from a response.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// True when no response was received at all.
    pub fn is_transport(&self) -> bool {
        matches!(self, ApiError::Transport(_) | ApiError::Timeout(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_is_exposed_only_for_status_failures() {
        let err = ApiError::Status {
            status: 404,
            body: "{\"detail\":\"Not Found\"}".to_string(),
        };
        assert_eq!(err.status(), Some(404));
        assert!(!err.is_transport());
        assert_eq!(ApiError::Decode("eof".to_string()).status(), None);
    }

    #[test]
    fn timeouts_count_as_transport_failures() {
        let err = ApiError::Timeout(Duration::from_millis(1500));
        assert!(err.is_transport());
        assert_eq!(err.to_string(), "request timed out after 1.5s");
    }

    #[test]
    fn status_message_omits_body() {
        let err = ApiError::Status {
            status: 500,
            body: "stack trace".to_string(),
        };
        assert_eq!(err.to_string(), "request failed with status 500");
    }
}
