//! Mock transport for exercising the client without a network.

use crate::client::PdkClient;
use crate::config::PdkConfig;
use crate::errors::TransportError;
use crate::transport::{HttpResponse, HttpTransport};
use crate::types::Record;
use async_trait::async_trait;
use chrono::{Duration as ChronoDuration, Utc};
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::json;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use url::Url;

/// Token injected by [`connected_test_client`].
pub const TEST_TOKEN: &str = "test-token";

/// A recorded request for verification.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    /// Request URL.
    pub url: String,
    /// Form-encoded request body.
    pub body: String,
}

/// A canned response to return.
#[derive(Debug, Clone)]
pub struct MockResponse {
    status: u16,
    body: Vec<u8>,
}

impl MockResponse {
    /// Creates a successful JSON response.
    pub fn json(body: impl serde::Serialize) -> Self {
        Self {
            status: 200,
            body: serde_json::to_vec(&body).unwrap(),
        }
    }

    /// Creates an error response with a plain-text body.
    pub fn error(status: u16, message: &str) -> Self {
        Self {
            status,
            body: message.as_bytes().to_vec(),
        }
    }

    /// Creates a response with an arbitrary status and body.
    pub fn raw(status: u16, body: Vec<u8>) -> Self {
        Self { status, body }
    }

    fn into_http(self) -> HttpResponse {
        HttpResponse::new(StatusCode::from_u16(self.status).unwrap(), self.body)
    }
}

#[derive(Debug, Deserialize)]
struct PageForm {
    page_size: u64,
    page_index: u64,
}

/// Mock transport: replays queued responses, or serves pages out of a fixed
/// record catalog the way a PDK server would.
pub struct MockTransport {
    responses: Mutex<VecDeque<MockResponse>>,
    requests: Mutex<Vec<RecordedRequest>>,
    default_response: Option<MockResponse>,
    catalog: Option<Vec<Record>>,
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl MockTransport {
    /// Creates a new mock transport with no canned responses.
    pub fn new() -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
            default_response: None,
            catalog: None,
        }
    }

    /// Creates a transport serving pages over `total` synthetic records.
    pub fn serving_items(total: u64) -> Self {
        let catalog = (0..total)
            .map(|i| {
                let value = json!({"pk": i, "value": format!("item-{}", i)});
                match value {
                    serde_json::Value::Object(map) => map,
                    _ => unreachable!(),
                }
            })
            .collect();

        Self {
            responses: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
            default_response: None,
            catalog: Some(catalog),
        }
    }

    /// Adds a response to the queue.
    pub fn enqueue_response(&self, response: MockResponse) {
        self.responses.lock().unwrap().push_back(response);
    }

    /// Sets a response for when the queue is empty.
    pub fn with_default_response(mut self, response: MockResponse) -> Self {
        self.default_response = Some(response);
        self
    }

    /// Returns the number of requests seen so far.
    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    /// Returns the most recent request, if any.
    pub fn last_request(&self) -> Option<RecordedRequest> {
        self.requests.lock().unwrap().last().cloned()
    }

    fn page_response(&self, body: &str) -> Option<MockResponse> {
        let catalog = self.catalog.as_ref()?;
        let form: PageForm = serde_urlencoded::from_str(body).ok()?;

        let start = (form.page_index * form.page_size) as usize;
        let end = start.saturating_add(form.page_size as usize).min(catalog.len());
        let matches: Vec<&Record> = if start < catalog.len() {
            catalog[start..end].iter().collect()
        } else {
            Vec::new()
        };

        Some(MockResponse::json(json!({
            "count": catalog.len(),
            "page_index": form.page_index,
            "page_size": form.page_size,
            "matches": matches,
        })))
    }
}

#[async_trait]
impl HttpTransport for MockTransport {
    async fn post_form(
        &self,
        url: Url,
        body: String,
        _timeout: Option<Duration>,
    ) -> Result<HttpResponse, TransportError> {
        self.requests.lock().unwrap().push(RecordedRequest {
            url: url.to_string(),
            body: body.clone(),
        });

        if let Some(response) = self.responses.lock().unwrap().pop_front() {
            return Ok(response.into_http());
        }

        if let Some(response) = self.page_response(&body) {
            return Ok(response.into_http());
        }

        if let Some(response) = &self.default_response {
            return Ok(response.clone().into_http());
        }

        Err(TransportError::Http("no mock response queued".to_string()))
    }
}

/// Builds a client over the given mock transport, with no token held.
pub fn test_client(transport: Arc<MockTransport>) -> PdkClient {
    let config = PdkConfig::builder()
        .server_url("http://pdk.example.test")
        .build()
        .unwrap();

    PdkClient::with_transport(config, transport).unwrap()
}

/// Builds a client over the given mock transport with [`TEST_TOKEN`]
/// injected and valid for an hour.
pub fn connected_test_client(transport: Arc<MockTransport>) -> PdkClient {
    let client = test_client(transport);
    client.set_token(TEST_TOKEN, Utc::now() + ChronoDuration::hours(1));
    client
}
