//! Wire types for the Passive Data Kit API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An opaque data record as returned by the server.
///
/// The client does not interpret record schema; records pass through
/// unmodified as JSON objects.
pub type Record = serde_json::Map<String, serde_json::Value>;

/// Credentials payload for the token endpoint.
#[derive(Debug, Serialize)]
pub struct TokenRequest<'a> {
    /// Account name.
    pub username: &'a str,
    /// Account password.
    pub password: &'a str,
}

/// Response from the token endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    /// Bearer token for subsequent requests.
    pub token: String,
    /// Token expiry as an ISO-8601 timestamp.
    pub expires: DateTime<Utc>,
}

/// Form payload for a page request.
#[derive(Debug, Serialize)]
pub struct PagePayload<'a> {
    /// Bearer token.
    pub token: &'a str,
    /// Requested page size.
    pub page_size: u64,
    /// Requested page index.
    pub page_index: u64,
    /// Filter clause sets, serialized to JSON.
    pub filters: String,
    /// Exclusion clause sets, serialized to JSON.
    pub excludes: String,
    /// Ordering directives, serialized to JSON.
    pub order_by: String,
}

/// One page of query results.
#[derive(Debug, Clone, Deserialize)]
pub struct PageResponse {
    /// Total number of matches across all pages.
    pub count: u64,
    /// Index of this page.
    pub page_index: u64,
    /// Page size in effect; the server may adjust the requested size.
    pub page_size: u64,
    /// The records on this page.
    pub matches: Vec<Record>,
}
