//! Error types for the API client.
//!
//! # Design
//! Every failure a call can produce is a variant here and is returned by
//! value; nothing is raised past the client. `Rejected` gets a dedicated
//! variant because callers distinguish "the server answered with an error
//! envelope" from "the request never completed". JSON parse failures on the
//! response are not errors at all: the raw body is handed back as data.

use std::fmt;
use std::time::Duration;

use serde_json::Value;

/// Errors returned in the error slot of an `ApiResult`.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ApiError {
    /// The transport could not complete the exchange (connect, I/O, body read).
    #[error("transport error: {0}")]
    Transport(String),

    /// No response arrived before the client's deadline.
    #[error("timeout after {0:?}")]
    Timeout(Duration),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// The server answered with a payload whose `statusCode` is 400 or above.
    #[error("{0}")]
    Rejected(Rejection),
}

impl ApiError {
    /// Status code embedded in a rejected payload, if any.
    pub fn status_code(&self) -> Option<u64> {
        match self {
            ApiError::Rejected(rejection) => Some(rejection.status_code),
            _ => None,
        }
    }
}

/// An application-level failure reported inside a JSON payload.
#[derive(Debug, Clone, PartialEq)]
pub struct Rejection {
    pub status_code: u64,
    /// The payload's `message` field when it is a string.
    pub message: Option<String>,
    /// The full payload as received.
    pub payload: Value,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.message {
            Some(message) => write!(f, "API rejected request ({}): {message}", self.status_code),
            None => write!(f, "API rejected request ({})", self.status_code),
        }
    }
}
