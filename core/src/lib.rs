//! Async client core for a JSON-over-HTTP API.
//!
//! # Overview
//! `ApiClient` resolves paths against a configured API root, attaches the
//! caller's bearer token, sends JSON (or opaque upload bytes) through a
//! pluggable `Transport` under a fixed deadline, and classifies the response
//! body into a `Payload` or an `ApiError`.
//!
//! # Design
//! - Calls never panic and never raise: every outcome is an `ApiResult`.
//! - Application failures travel inside the body (`statusCode` envelopes);
//!   the HTTP status line is ignored for classification.
//! - An envelope with an error flag and `statusCode` 401 clears the session in
//!   the `AuthStore` and reads as an empty payload.
//! - Failures are published on an injected `FailureBus` unless the caller
//!   suppresses notification for that call.

pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod events;
pub mod http;
pub mod payload;
pub mod transport;

pub use auth::{AuthStore, MemoryAuthStore};
pub use client::{join_url, request_headers, ApiClient, ApiResult, REQUEST_TIMEOUT};
pub use config::{Configuration, API_ROOT, DEFAULT_API_ROOT};
pub use error::{ApiError, Rejection};
pub use events::{FailureBus, FailureEvent};
pub use http::{HttpMethod, HttpRequest, HttpResponse, RequestBody};
pub use payload::{classify, Classified, Payload};
pub use transport::{ReqwestTransport, Transport};
