//! HTTP transport used by the API-backed mailers

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
#[cfg(test)]
use mockall::mock;
use reqwest::header;
use tracing::debug;

/// Status and body of an HTTP response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    /// HTTP status code
    pub status: u16,

    /// Raw response body
    pub body: String,
}

impl HttpResponse {
    /// Creates a response
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Whether the status is in the 2xx range
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Authenticated JSON-over-HTTP capability
#[async_trait]
pub trait HttpClient: Send + Sync + 'static {
    /// POSTs a serialized JSON `body` to `url`, authenticating with `api_key`.
    ///
    /// Any response that arrives is returned regardless of its status; only
    /// transport failures are errors.
    async fn post_json(&self, url: &str, api_key: &str, body: String) -> Result<HttpResponse>;
}

#[cfg(test)]
mock! {
    pub HttpClient {}

    #[async_trait]
    impl HttpClient for HttpClient {
        async fn post_json(&self, url: &str, api_key: &str, body: String) -> Result<HttpResponse>;
    }
}

/// [`HttpClient`] backed by reqwest
#[derive(Debug, Clone)]
pub struct ReqwestHttpClient {
    http: reqwest::Client,
}

impl ReqwestHttpClient {
    /// Creates a client; `timeout` bounds each whole request
    pub fn new(timeout: Option<Duration>) -> Result<Self> {
        let mut builder = reqwest::Client::builder()
            .user_agent(concat!("sparkpost-transport/", env!("CARGO_PKG_VERSION")));

        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            http: builder.build().context("failed to build HTTP client")?,
        })
    }
}

#[async_trait]
impl HttpClient for ReqwestHttpClient {
    async fn post_json(&self, url: &str, api_key: &str, body: String) -> Result<HttpResponse> {
        debug!(url, "POST");

        let response = self
            .http
            .post(url)
            .header(header::AUTHORIZATION, api_key)
            .header(header::CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await
            .with_context(|| format!("POST {url} failed"))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .with_context(|| format!("failed to read response body from {url}"))?;

        debug!(url, status, "response received");

        Ok(HttpResponse { status, body })
    }
}
