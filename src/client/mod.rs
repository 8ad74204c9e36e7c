//! Passive Data Kit client implementation.
//!
//! [`PdkClient`] is the session and credential holder: it owns the bearer
//! token and its expiry, performs the login exchange, and hands out query
//! builders for the two resource collections.

use crate::config::PdkConfig;
use crate::errors::{AuthenticationError, PdkError, PdkResult};
use crate::query::{ClauseSet, Query, Resource, DEFAULT_PAGE_SIZE};
use crate::resilience::RetryConfig;
use crate::transport::{HttpTransport, ReqwestTransport};
use crate::types::{TokenRequest, TokenResponse};
use chrono::{DateTime, Utc};
use secrecy::{ExposeSecret, SecretString};
use std::sync::{Arc, RwLock};
use std::time::Duration;
use tracing::debug;

mod executor;
pub use executor::RequestExecutor;

pub(crate) const TOKEN_ENDPOINT: &str = "api/request-token.json";

/// Bearer token with its expiry.
#[derive(Debug, Clone)]
pub struct AccessToken {
    /// The token string.
    pub token: SecretString,
    /// Expiration time reported by the server.
    pub expires_at: DateTime<Utc>,
}

impl AccessToken {
    /// Creates a new access token.
    pub fn new(token: impl Into<String>, expires_at: DateTime<Utc>) -> Self {
        Self {
            token: SecretString::new(token.into()),
            expires_at,
        }
    }

    /// Checks if the token is expired.
    pub fn is_expired(&self) -> bool {
        Utc::now() >= self.expires_at
    }
}

/// Shared session state: the request executor plus the token slot.
///
/// Queries hold an `Arc` of this so a fresh login benefits traversals
/// derived before it.
pub(crate) struct SessionInner {
    pub(crate) executor: RequestExecutor,
    pub(crate) token: RwLock<Option<AccessToken>>,
}

impl SessionInner {
    pub(crate) fn bearer_token(&self) -> PdkResult<String> {
        let guard = self.token.read().expect("token lock poisoned");
        guard
            .as_ref()
            .map(|token| token.token.expose_secret().to_string())
            .ok_or_else(|| {
                AuthenticationError::NotConnected(
                    "no bearer token held; call login first".to_string(),
                )
                .into()
            })
    }
}

/// Passive Data Kit API client.
///
/// This is the main entry point: it holds the session credentials and
/// produces [`Query`] builders over data points and data sources.
///
/// # Example
///
/// ```no_run
/// use integrations_pdk::{PdkClient, PdkConfig};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = PdkConfig::builder()
///     .server_url("https://pdk.example.com")
///     .build()?;
///
/// let client = PdkClient::new(config)?;
/// client.login("researcher", "hunter2").await?;
///
/// let count = client.query_data_points().count().await?;
/// println!("{count} data points");
/// # Ok(())
/// # }
/// ```
pub struct PdkClient {
    config: PdkConfig,
    session: Arc<SessionInner>,
}

impl PdkClient {
    /// Creates a new client with the given configuration.
    pub fn new(config: PdkConfig) -> PdkResult<Self> {
        config.validate()?;

        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| PdkError::configuration(format!("failed to build HTTP client: {}", e)))?;

        Self::with_transport(config, Arc::new(ReqwestTransport::new(client)))
    }

    /// Creates a new client over a custom transport.
    ///
    /// Intended for tests and callers that need to interpose on the wire.
    pub fn with_transport(
        config: PdkConfig,
        transport: Arc<dyn HttpTransport>,
    ) -> PdkResult<Self> {
        config.validate()?;

        let executor = RequestExecutor::new(config.clone(), transport);

        Ok(Self {
            config,
            session: Arc::new(SessionInner {
                executor,
                token: RwLock::new(None),
            }),
        })
    }

    /// Creates a new client builder.
    pub fn builder() -> PdkClientBuilder {
        PdkClientBuilder::new()
    }

    /// Exchanges credentials for a bearer token.
    ///
    /// On success the token and its expiry replace any previously held
    /// session state. Authentication rejections surface immediately; only
    /// transient transport failures are retried underneath.
    pub async fn login(&self, username: &str, password: &str) -> PdkResult<()> {
        let request = TokenRequest { username, password };

        let response: TokenResponse = self
            .session
            .executor
            .execute_form(TOKEN_ENDPOINT, &request)
            .await?;

        debug!(expires_at = %response.expires, "acquired bearer token");

        let mut guard = self.session.token.write().expect("token lock poisoned");
        *guard = Some(AccessToken::new(response.token, response.expires));

        Ok(())
    }

    /// Injects an externally issued bearer token.
    pub fn set_token(&self, token: impl Into<String>, expires_at: DateTime<Utc>) {
        let mut guard = self.session.token.write().expect("token lock poisoned");
        *guard = Some(AccessToken::new(token, expires_at));
    }

    /// Returns true if the held token's expiry has passed, or if no expiry
    /// is recorded at all.
    pub fn expired(&self) -> bool {
        let guard = self.session.token.read().expect("token lock poisoned");
        match guard.as_ref() {
            Some(token) => token.is_expired(),
            None => true,
        }
    }

    /// Returns true if a token is held and not expired.
    pub fn connected(&self) -> bool {
        let guard = self.session.token.read().expect("token lock poisoned");
        matches!(guard.as_ref(), Some(token) if !token.is_expired())
    }

    /// Returns a query over the data point collection.
    ///
    /// The query is pre-filtered to `recorded <= now` so the result set
    /// cannot grow underneath a paged traversal as new points arrive.
    pub fn query_data_points(&self) -> Query {
        Query::new(self.session.clone(), Resource::DataPoints, DEFAULT_PAGE_SIZE)
            .filter(ClauseSet::new().with("recorded__lte", Utc::now()))
    }

    /// Returns a query over the data source collection.
    ///
    /// Sources without a primary key are excluded up front as a sanity
    /// filter.
    pub fn query_data_sources(&self) -> Query {
        Query::new(self.session.clone(), Resource::DataSources, DEFAULT_PAGE_SIZE)
            .exclude(ClauseSet::new().with("pk__isnull", true))
    }

    /// Gets the configuration.
    pub fn config(&self) -> &PdkConfig {
        &self.config
    }

    #[cfg(test)]
    pub(crate) fn session(&self) -> Arc<SessionInner> {
        self.session.clone()
    }
}

/// Builder for [`PdkClient`].
pub struct PdkClientBuilder {
    config_builder: crate::config::PdkConfigBuilder,
    token: Option<(String, DateTime<Utc>)>,
}

impl PdkClientBuilder {
    /// Creates a new builder.
    pub fn new() -> Self {
        Self {
            config_builder: PdkConfig::builder(),
            token: None,
        }
    }

    /// Sets the PDK server URL.
    pub fn server_url(mut self, url: impl Into<String>) -> Self {
        self.config_builder = self.config_builder.server_url(url);
        self
    }

    /// Sets the per-request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config_builder = self.config_builder.timeout(timeout);
        self
    }

    /// Removes the per-request timeout.
    pub fn no_timeout(mut self) -> Self {
        self.config_builder = self.config_builder.no_timeout();
        self
    }

    /// Sets the retry policy.
    pub fn retry(mut self, retry: RetryConfig) -> Self {
        self.config_builder = self.config_builder.retry(retry);
        self
    }

    /// Sets the user agent.
    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.config_builder = self.config_builder.user_agent(ua);
        self
    }

    /// Injects an externally issued bearer token instead of logging in.
    pub fn token(mut self, token: impl Into<String>, expires_at: DateTime<Utc>) -> Self {
        self.token = Some((token.into(), expires_at));
        self
    }

    /// Builds the client.
    pub fn build(self) -> PdkResult<PdkClient> {
        let config = self.config_builder.build()?;
        let client = PdkClient::new(config)?;

        if let Some((token, expires_at)) = self.token {
            client.set_token(token, expires_at);
        }

        Ok(client)
    }
}

impl Default for PdkClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}
