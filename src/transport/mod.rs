//! HTTP transport layer for the Passive Data Kit API.
//!
//! The PDK wire protocol is form-encoded POST requests with JSON responses,
//! so the transport surface is a single `post_form` operation behind a trait
//! for testability.

use crate::errors::TransportError;
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, StatusCode};
use std::borrow::Cow;
use std::time::Duration;
use url::Url;

/// HTTP transport abstraction for testability.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Sends a form-encoded POST request and receives the full response.
    async fn post_form(
        &self,
        url: Url,
        body: String,
        timeout: Option<Duration>,
    ) -> Result<HttpResponse, TransportError>;
}

/// HTTP response representation.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    /// Response status code.
    pub status: StatusCode,
    /// Response body.
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// Creates a new HTTP response.
    pub fn new(status: StatusCode, body: Vec<u8>) -> Self {
        Self { status, body }
    }

    /// Returns the body as text, lossily decoded.
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }
}

/// Reqwest-based HTTP transport implementation.
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Creates a new reqwest transport around an existing client.
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Creates a new reqwest transport with a default client.
    pub fn with_defaults() -> Result<Self, TransportError> {
        let client = Client::builder()
            .build()
            .map_err(|e| TransportError::Http(format!("failed to create client: {}", e)))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn post_form(
        &self,
        url: Url,
        body: String,
        timeout: Option<Duration>,
    ) -> Result<HttpResponse, TransportError> {
        let mut request = self
            .client
            .post(url)
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(body);

        if let Some(timeout) = timeout {
            request = request.timeout(timeout);
        }

        let response = request.send().await?;

        let status = response.status();
        let body = response.bytes().await?.to_vec();

        Ok(HttpResponse::new(status, body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_text() {
        let response = HttpResponse::new(StatusCode::OK, b"{\"count\": 3}".to_vec());
        assert_eq!(response.text(), "{\"count\": 3}");
    }

    #[test]
    fn test_with_defaults() {
        assert!(ReqwestTransport::with_defaults().is_ok());
    }
}
