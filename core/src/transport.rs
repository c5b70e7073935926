//! The network seam.
//!
//! # Design
//! `Transport` is the only place I/O happens. The client hands it a fully
//! built `HttpRequest` and gets back an `HttpResponse` with the raw body, or a
//! transport error. Any status code counts as a completed exchange; deciding
//! what the body means is the client's job.

use async_trait::async_trait;
use reqwest::Method;

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};

/// Executes requests on behalf of `ApiClient`.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError>;
}

/// `Transport` backed by a `reqwest::Client`.
#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new() -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("api-core/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        Ok(Self { client })
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl From<HttpMethod> for Method {
    fn from(method: HttpMethod) -> Self {
        match method {
            HttpMethod::Get => Method::GET,
            HttpMethod::Post => Method::POST,
            HttpMethod::Put => Method::PUT,
            HttpMethod::Patch => Method::PATCH,
            HttpMethod::Delete => Method::DELETE,
        }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        let timeout = request.timeout;
        let mut builder = self
            .client
            .request(request.method.into(), &request.endpoint)
            .timeout(timeout);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = request.body {
            builder = builder.body(body.into_bytes());
        }

        let response = builder.send().await.map_err(|e| map_reqwest_error(e, timeout))?;
        let status = response.status();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|value| (name.as_str().to_string(), value.to_string()))
            })
            .collect();
        let body = response.bytes().await.map_err(|e| map_reqwest_error(e, timeout))?;

        Ok(HttpResponse {
            status: status.as_u16(),
            status_text: status.canonical_reason().unwrap_or_default().to_string(),
            headers,
            body,
        })
    }
}

fn map_reqwest_error(e: reqwest::Error, timeout: std::time::Duration) -> ApiError {
    if e.is_timeout() {
        ApiError::Timeout(timeout)
    } else {
        ApiError::Transport(e.to_string())
    }
}
