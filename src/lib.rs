//! Passive Data Kit Integration Module
//!
//! This module provides a type-safe client for Passive Data Kit (PDK)
//! servers: authenticated, paginated, filterable access to the data point
//! and data source collections.
//!
//! # Features
//!
//! - **Sessions**: token login exchange, expiry tracking, explicit token
//!   injection
//! - **Query Builder**: immutable, chainable filter / exclude / order-by
//!   specifications that can be reused as templates
//! - **Lazy Pagination**: cursors fetch pages on demand, cache the current
//!   window, and expose sequential and random-access views
//! - **Resilience**: transparent exponential-backoff retry of transient
//!   transport failures, bounded by a backoff ceiling
//!
//! # Example
//!
//! ```no_run
//! use integrations_pdk::{ClauseSet, PdkClient, PdkConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = PdkConfig::builder()
//!     .server_url("https://pdk.example.com")
//!     .build()?;
//!
//! let client = PdkClient::new(config)?;
//! client.login("researcher", "hunter2").await?;
//!
//! let query = client
//!     .query_data_points()
//!     .filter(ClauseSet::new().with("generator_id", "pdk-location"))
//!     .order_by(["-recorded"]);
//!
//! let mut points = query.items().await?;
//! while let Some(point) = points.next().await? {
//!     println!("{:?}", point);
//! }
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_inception)]

// Core modules
pub mod client;
pub mod config;
pub mod errors;
pub mod pagination;
pub mod query;
pub mod resilience;
pub mod transport;
pub mod types;

// Internal modules (not part of public API)
#[cfg(test)]
mod mocks;

// Re-exports for convenience
pub use client::{AccessToken, PdkClient, PdkClientBuilder};
pub use config::{PdkConfig, PdkConfigBuilder};
pub use errors::{PdkError, PdkResult};
pub use pagination::Cursor;
pub use query::{ClauseSet, Query, Resource, Value};
pub use types::Record;

/// Prelude module with commonly used types and traits.
///
/// ```no_run
/// use integrations_pdk::prelude::*;
/// ```
pub mod prelude {
    // Client
    pub use crate::client::{AccessToken, PdkClient, PdkClientBuilder};

    // Configuration
    pub use crate::config::{PdkConfig, PdkConfigBuilder};

    // Queries and pagination
    pub use crate::pagination::Cursor;
    pub use crate::query::{ClauseSet, Query, Resource, Value};
    pub use crate::types::Record;

    // Resilience
    pub use crate::resilience::RetryConfig;

    // Errors
    pub use crate::errors::{PdkError, PdkResult};
}
