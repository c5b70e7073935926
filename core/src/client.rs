//! Request builder, executor, and response classifier for the JSON API.
//!
//! # Design
//! `ApiClient` owns no per-call state. Each call is split the way the wire
//! exchange is: `build_request` / `build_upload` produce an `HttpRequest`,
//! the injected `Transport` executes it under a deadline, and the body is
//! classified into an `ApiResult`. All four collaborators (configuration,
//! auth store, transport, failure bus) are passed in at construction, so a
//! host decides where each one lives.
//!
//! No operation panics or hands an error past its return value. Failures land
//! in the error slot of the `ApiResult` and, unless suppressed, on the
//! failure bus.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use serde::Serialize;
use tracing::{debug, error, warn};

use crate::auth::AuthStore;
use crate::config::Configuration;
use crate::error::ApiError;
use crate::events::{FailureBus, FailureEvent};
use crate::http::{reason_phrase, HttpMethod, HttpRequest, HttpResponse, RequestBody};
use crate::payload::{classify, Classified, Payload};
use crate::transport::{ReqwestTransport, Transport};

/// Deadline applied to every call; long enough for large uploads on slow links.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(60 * 60);

pub const CONTENT_TYPE_JSON: &str = "application/json";

/// Data slot on success, error slot on failure.
pub type ApiResult = Result<Payload, ApiError>;

#[derive(Clone)]
pub struct ApiClient {
    config: Arc<Configuration>,
    auth: Arc<dyn AuthStore>,
    transport: Arc<dyn Transport>,
    failures: FailureBus,
    timeout: Duration,
}

impl fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiClient")
            .field("api_root", &self.config.api_root())
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    pub fn new(
        config: Arc<Configuration>,
        auth: Arc<dyn AuthStore>,
        transport: Arc<dyn Transport>,
        failures: FailureBus,
    ) -> Self {
        Self {
            config,
            auth,
            transport,
            failures,
            timeout: REQUEST_TIMEOUT,
        }
    }

    /// Client over the default `reqwest` transport.
    pub fn with_reqwest(
        config: Arc<Configuration>,
        auth: Arc<dyn AuthStore>,
        failures: FailureBus,
    ) -> Result<Self, ApiError> {
        let transport = Arc::new(ReqwestTransport::new()?);
        Ok(Self::new(config, auth, transport, failures))
    }

    /// Replace the per-client deadline.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn failures(&self) -> &FailureBus {
        &self.failures
    }

    /// Resolve `path` against the configured API root.
    pub fn url(&self, path: &str) -> String {
        let root = self.config.api_root().unwrap_or_else(|| {
            warn!("API_ROOT is not configured; using path as-is");
            String::new()
        });
        join_url(&root, path)
    }

    // -----------------------------------------------------------------------
    // Convenience forms: data slot only
    // -----------------------------------------------------------------------

    /// GET `path` and return the parsed body. `None` means the call failed
    /// before a response was read.
    pub async fn get(&self, path: &str, suppress_notify: bool) -> Option<Payload> {
        body_of(self.request::<()>(HttpMethod::Get, path, None, suppress_notify).await)
    }

    pub async fn post<B>(&self, path: &str, body: &B, suppress_notify: bool) -> Option<Payload>
    where
        B: Serialize + ?Sized,
    {
        body_of(self.request(HttpMethod::Post, path, Some(body), suppress_notify).await)
    }

    pub async fn put<B>(&self, path: &str, body: &B, suppress_notify: bool) -> Option<Payload>
    where
        B: Serialize + ?Sized,
    {
        body_of(self.request(HttpMethod::Put, path, Some(body), suppress_notify).await)
    }

    pub async fn del(&self, path: &str, suppress_notify: bool) -> Option<Payload> {
        body_of(self.request::<()>(HttpMethod::Delete, path, None, suppress_notify).await)
    }

    // -----------------------------------------------------------------------
    // Full result forms
    // -----------------------------------------------------------------------

    /// Send a JSON request. A payload with an embedded `statusCode` of 400 or
    /// more is returned as `ApiError::Rejected`.
    pub async fn request<B>(
        &self,
        method: HttpMethod,
        path: &str,
        body: Option<&B>,
        suppress_notify: bool,
    ) -> ApiResult
    where
        B: Serialize + ?Sized,
    {
        let result = self.exchange(method, path, body).await;
        self.finish(method, path, result, suppress_notify)
    }

    /// Send an opaque body unmodified. The transport picks the content type
    /// (e.g. a multipart boundary). Payloads are never reshaped into errors
    /// here; inspect `Payload::status_code` if needed.
    pub async fn upload(
        &self,
        method: HttpMethod,
        path: &str,
        body: Option<Bytes>,
        suppress_notify: bool,
    ) -> ApiResult {
        let request = self.build_upload(method, path, body).await;
        let result = match self.send(request).await {
            Ok(response) => Ok(self.receive(response).await.into_payload()),
            Err(e) => Err(e),
        };
        self.finish(method, path, result, suppress_notify)
    }

    // -----------------------------------------------------------------------
    // Building
    // -----------------------------------------------------------------------

    pub async fn build_request<B>(
        &self,
        method: HttpMethod,
        path: &str,
        body: Option<&B>,
    ) -> Result<HttpRequest, ApiError>
    where
        B: Serialize + ?Sized,
    {
        let body = body
            .map(|b| serde_json::to_string(b).map(RequestBody::Json))
            .transpose()
            .map_err(|e| ApiError::Serialization(e.to_string()))?;
        let token = self.auth.token().await;
        Ok(HttpRequest {
            method,
            endpoint: self.url(path),
            headers: request_headers(body.is_some(), token.as_deref(), false),
            body,
            timeout: self.timeout,
        })
    }

    pub async fn build_upload(
        &self,
        method: HttpMethod,
        path: &str,
        body: Option<Bytes>,
    ) -> HttpRequest {
        let token = self.auth.token().await;
        let body = body.map(RequestBody::Raw);
        HttpRequest {
            method,
            endpoint: self.url(path),
            headers: request_headers(body.is_some(), token.as_deref(), true),
            body,
            timeout: self.timeout,
        }
    }

    // -----------------------------------------------------------------------
    // Executing
    // -----------------------------------------------------------------------

    async fn exchange<B>(&self, method: HttpMethod, path: &str, body: Option<&B>) -> ApiResult
    where
        B: Serialize + ?Sized,
    {
        let request = self.build_request(method, path, body).await?;
        let response = self.send(request).await?;
        match self.receive(response).await {
            Classified::Rejected(rejection) => Err(ApiError::Rejected(rejection)),
            classified => Ok(classified.into_payload()),
        }
    }

    /// Race the transport against the deadline. The exchange runs on its own
    /// task, so a timeout only stops waiting for it; the task is left to
    /// finish or fail in the background.
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        debug!(method = %request.method, endpoint = %request.endpoint, "sending API request");
        let transport = Arc::clone(&self.transport);
        let in_flight = tokio::spawn(async move { transport.execute(request).await });
        match tokio::time::timeout(self.timeout, in_flight).await {
            Ok(Ok(result)) => result,
            Ok(Err(join_error)) => Err(ApiError::Transport(join_error.to_string())),
            Err(_) => Err(ApiError::Timeout(self.timeout)),
        }
    }

    /// Classify a response body, clearing the session if it expired.
    async fn receive(&self, response: HttpResponse) -> Classified {
        debug!(status = response.status, bytes = response.body.len(), "API response received");
        match classify(&response.text()) {
            Classified::SessionExpired => {
                warn!("API session expired; clearing stored credentials");
                self.auth.clear_token().await;
                self.auth.clear_user_id().await;
                Classified::Data(Payload::Empty)
            }
            classified => classified,
        }
    }

    fn finish(
        &self,
        method: HttpMethod,
        path: &str,
        result: ApiResult,
        suppress_notify: bool,
    ) -> ApiResult {
        if let Err(e) = &result {
            let endpoint = self.url(path);
            let message = failure_summary(method, &endpoint, e);
            if suppress_notify {
                debug!("{message}");
            } else {
                error!("{message}");
                self.failures.publish(FailureEvent {
                    method,
                    endpoint,
                    status: e.status_code(),
                    message,
                });
            }
        }
        result
    }
}

/// Join a root and a path with exactly one `/` between them.
pub fn join_url(root: &str, path: &str) -> String {
    let root = root.trim_end_matches('/');
    if path.starts_with('/') {
        format!("{root}{path}")
    } else {
        format!("{root}/{path}")
    }
}

/// Headers for a request. Uploads never declare a content type.
pub fn request_headers(has_body: bool, token: Option<&str>, upload: bool) -> Vec<(String, String)> {
    let mut headers = vec![("Accept".to_string(), CONTENT_TYPE_JSON.to_string())];
    if has_body && !upload {
        headers.push(("Content-Type".to_string(), CONTENT_TYPE_JSON.to_string()));
    }
    if let Some(token) = token.filter(|t| !t.is_empty()) {
        headers.push(("Authorization".to_string(), format!("bearer {token}")));
    }
    headers
}

/// Best-effort log line for a failed call.
fn failure_summary(method: HttpMethod, endpoint: &str, e: &ApiError) -> String {
    match e {
        ApiError::Rejected(rejection) => {
            let code = rejection.status_code;
            let status = match rejection.message.as_deref().or_else(|| reason_phrase(code)) {
                Some(text) => format!("{code} {text}"),
                None => code.to_string(),
            };
            format!(
                "API request {method} {endpoint} responded with ({status}): {}",
                rejection.payload
            )
        }
        other => format!("API request {method} {endpoint} failed with message \"{other}\""),
    }
}

fn body_of(result: ApiResult) -> Option<Payload> {
    match result {
        Ok(payload) => Some(payload),
        Err(ApiError::Rejected(rejection)) => Some(Payload::Json(rejection.payload)),
        Err(_) => None,
    }
}
