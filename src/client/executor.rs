//! Request executor: form encoding, retry, and error mapping.

use crate::config::PdkConfig;
use crate::errors::{
    AuthenticationError, PdkError, PdkResult, RequestError, ResponseError, ServerError,
};
use crate::resilience::RetryExecutor;
use crate::transport::{HttpResponse, HttpTransport};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use tracing::debug;
use url::Url;

/// Executes form-encoded POST requests against the PDK server.
///
/// Encodes the payload, runs the request through the retry loop, maps
/// non-success statuses to domain errors, and decodes the JSON response.
pub struct RequestExecutor {
    config: PdkConfig,
    transport: Arc<dyn HttpTransport>,
    retry: RetryExecutor,
}

impl RequestExecutor {
    /// Creates a new request executor.
    pub fn new(config: PdkConfig, transport: Arc<dyn HttpTransport>) -> Self {
        let retry = RetryExecutor::new(config.retry.clone());
        Self {
            config,
            transport,
            retry,
        }
    }

    /// Posts a form payload to `path` and decodes the JSON response.
    pub async fn execute_form<P, T>(&self, path: &str, payload: &P) -> PdkResult<T>
    where
        P: Serialize,
        T: DeserializeOwned,
    {
        let url = self.build_url(path)?;
        let body = serde_urlencoded::to_string(payload).map_err(|e| {
            RequestError::ValidationError(format!("failed to encode form payload: {}", e))
        })?;

        debug!(url = %url, "posting form request");

        let response = self
            .retry
            .execute(|| {
                let url = url.clone();
                let body = body.clone();
                async move {
                    let response = self
                        .transport
                        .post_form(url, body, self.config.timeout)
                        .await?;

                    if response.status.is_success() {
                        Ok(response)
                    } else {
                        Err(self.map_error_response(response))
                    }
                }
            })
            .await?;

        serde_json::from_slice(&response.body).map_err(|e| {
            ResponseError::Deserialization(format!("failed to decode response body: {}", e)).into()
        })
    }

    /// Builds a full URL from a path relative to the server URL.
    pub fn build_url(&self, path: &str) -> PdkResult<Url> {
        let path = path.trim_start_matches('/');

        self.config.server_url.join(path).map_err(|e| {
            RequestError::ValidationError(format!("invalid request path '{}': {}", path, e)).into()
        })
    }

    /// Maps a non-success response to a domain error.
    ///
    /// 5xx and 429 become retryable server errors; semantic 4xx rejections
    /// fail fast.
    fn map_error_response(&self, response: HttpResponse) -> PdkError {
        let status = response.status;
        let text = response.text().trim().to_string();
        let message = if text.is_empty() {
            format!("HTTP {}", status.as_u16())
        } else {
            text
        };

        match status {
            StatusCode::BAD_REQUEST => RequestError::ValidationError(message).into(),
            StatusCode::UNAUTHORIZED => AuthenticationError::InvalidCredentials(message).into(),
            StatusCode::FORBIDDEN => AuthenticationError::Forbidden(message).into(),
            StatusCode::NOT_FOUND => RequestError::NotFound(message).into(),
            StatusCode::TOO_MANY_REQUESTS => ServerError::RateLimited(message).into(),
            StatusCode::BAD_GATEWAY => ServerError::BadGateway(message).into(),
            StatusCode::SERVICE_UNAVAILABLE => ServerError::ServiceUnavailable(message).into(),
            status if status.is_server_error() => ServerError::InternalError(message).into(),
            status => {
                ServerError::InternalError(format!("HTTP {}: {}", status.as_u16(), message)).into()
            }
        }
    }
}
