//! Response payloads and their classification.
//!
//! # Design
//! The API reports application failures inside an otherwise ordinary JSON
//! body (`{"error": true, "statusCode": 404, "message": ...}`) rather than
//! through the HTTP status line. `classify` decodes that envelope shape first
//! and falls back to the raw payload, so every body lands in exactly one
//! `Classified` case.

use serde::Deserialize;
use serde_json::{Number, Value};

use crate::error::Rejection;

/// Parsed response data handed back to callers.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// The body was empty (or the session expired, see `Classified`).
    Empty,
    /// The body parsed as JSON.
    Json(Value),
    /// The body was not JSON; this is the text as received.
    Text(String),
}

impl Payload {
    pub fn is_empty(&self) -> bool {
        matches!(self, Payload::Empty)
    }

    pub fn as_json(&self) -> Option<&Value> {
        match self {
            Payload::Json(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Payload::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Embedded `statusCode` of an object payload, for callers inspecting
    /// upload results or convenience-form data themselves.
    pub fn status_code(&self) -> Option<u64> {
        self.as_json()
            .and_then(Envelope::decode)
            .and_then(|e| e.status())
            .map(truncate_status)
    }
}

/// Outcome of classifying one response body.
#[derive(Debug, Clone, PartialEq)]
pub enum Classified {
    /// Ordinary data: empty, unparsed text, or JSON without a failing status.
    Data(Payload),
    /// Error envelope with `statusCode` 401; the stored session must be cleared.
    SessionExpired,
    /// Object payload with `statusCode` >= 400.
    Rejected(Rejection),
}

impl Classified {
    /// Collapse a rejection back into plain data; used where the caller wants
    /// the payload regardless of its embedded status.
    pub fn into_payload(self) -> Payload {
        match self {
            Classified::Data(payload) => payload,
            Classified::SessionExpired => Payload::Empty,
            Classified::Rejected(rejection) => Payload::Json(rejection.payload),
        }
    }
}

/// The optional error fields an API payload may carry.
#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(default)]
    error: Value,
    #[serde(rename = "statusCode", default)]
    status_code: Option<Number>,
    #[serde(default)]
    message: Value,
}

impl Envelope {
    fn decode(value: &Value) -> Option<Self> {
        // Arrays would otherwise deserialize positionally into the struct.
        if !value.is_object() {
            return None;
        }
        Envelope::deserialize(value).ok()
    }

    /// `statusCode` compared as a plain number, whatever its JSON form.
    fn status(&self) -> Option<f64> {
        self.status_code.as_ref().and_then(Number::as_f64)
    }
}

fn truncate_status(status: f64) -> u64 {
    // Saturating; fractional codes keep their integer part.
    status as u64
}

/// Classify a response body.
pub fn classify(body: &str) -> Classified {
    if body.is_empty() {
        return Classified::Data(Payload::Empty);
    }
    let value: Value = match serde_json::from_str(body) {
        Ok(value) => value,
        Err(_) => return Classified::Data(Payload::Text(body.to_string())),
    };
    let Some(envelope) = Envelope::decode(&value) else {
        return Classified::Data(Payload::Json(value));
    };
    match envelope.status() {
        Some(status) if status == 401.0 && is_truthy(&envelope.error) => Classified::SessionExpired,
        Some(status) if status >= 400.0 => Classified::Rejected(Rejection {
            status_code: truncate_status(status),
            message: envelope.message.as_str().map(str::to_string),
            payload: value,
        }),
        _ => Classified::Data(Payload::Json(value)),
    }
}

/// JSON truthiness: `false`, `null`, `0`, and `""` are falsy.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
