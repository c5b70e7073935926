//! HTTP transport types for the host-does-IO pattern.
//!
//! # Design
//! These types describe HTTP requests and responses as plain data. The client
//! builds `HttpRequest` values and classifies `HttpResponse` values; a
//! `Transport` implementation performs the actual I/O in between. Keeping the
//! wire exchange as data lets tests substitute canned responses without a
//! network.

use std::fmt;
use std::time::Duration;

use bytes::Bytes;

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
        }
    }
}

/// Standard reason phrase for a status code, e.g. `Forbidden` for 403.
pub fn reason_phrase(status: u64) -> Option<&'static str> {
    let status = u16::try_from(status).ok()?;
    ::http::StatusCode::from_u16(status).ok()?.canonical_reason()
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Request payload as it goes on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestBody {
    /// Serialized JSON text.
    Json(String),
    /// Opaque bytes, sent unmodified (uploads).
    Raw(Bytes),
}

impl RequestBody {
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            RequestBody::Json(text) => text.as_bytes(),
            RequestBody::Raw(bytes) => bytes,
        }
    }

    pub fn into_bytes(self) -> Bytes {
        match self {
            RequestBody::Json(text) => Bytes::from(text),
            RequestBody::Raw(bytes) => bytes,
        }
    }
}

/// An HTTP request described as plain data.
///
/// Built by `ApiClient::build_request` / `ApiClient::build_upload`. The
/// transport executes it and returns the corresponding `HttpResponse`.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub endpoint: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<RequestBody>,
    /// Hint for transports that support their own deadline.
    pub timeout: Duration,
}

impl HttpRequest {
    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// An HTTP response described as plain data.
///
/// `status` is informational only: success and failure are decided from the
/// body, never from the status line.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub status_text: String,
    pub headers: Vec<(String, String)>,
    pub body: Bytes,
}

impl HttpResponse {
    /// A 200 response with the given body, mostly for tests and stub transports.
    pub fn ok(body: impl Into<Bytes>) -> Self {
        Self {
            status: 200,
            status_text: "OK".to_string(),
            headers: Vec::new(),
            body: body.into(),
        }
    }

    /// Body as text; invalid UTF-8 sequences are replaced rather than rejected.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}
