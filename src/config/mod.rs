//! Configuration for the Passive Data Kit client.

use crate::errors::{ConfigurationError, PdkError, PdkResult};
use crate::resilience::RetryConfig;
use std::time::Duration;
use url::Url;

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Configuration for the Passive Data Kit client.
#[derive(Debug, Clone)]
pub struct PdkConfig {
    /// Base URL of the PDK server.
    pub server_url: Url,

    /// Per-request timeout. `None` means unbounded.
    pub timeout: Option<Duration>,

    /// Retry policy for transient transport failures.
    pub retry: RetryConfig,

    /// User agent string.
    pub user_agent: String,
}

impl PdkConfig {
    /// Creates a new configuration builder.
    pub fn builder() -> PdkConfigBuilder {
        PdkConfigBuilder::new()
    }

    /// Validates the configuration.
    pub fn validate(&self) -> PdkResult<()> {
        match self.server_url.scheme() {
            "http" | "https" => {}
            other => {
                return Err(PdkError::Configuration(ConfigurationError::InvalidUrl(
                    format!("unsupported scheme '{}'", other),
                )));
            }
        }

        Ok(())
    }
}

/// Builder for [`PdkConfig`].
pub struct PdkConfigBuilder {
    server_url: Option<String>,
    timeout: Option<Duration>,
    retry: RetryConfig,
    user_agent: Option<String>,
}

impl PdkConfigBuilder {
    /// Creates a new builder.
    pub fn new() -> Self {
        Self {
            server_url: None,
            timeout: Some(DEFAULT_TIMEOUT),
            retry: RetryConfig::default(),
            user_agent: None,
        }
    }

    /// Sets the PDK server URL. Endpoint paths are joined onto it, so a
    /// URL with a path component should carry a trailing slash.
    pub fn server_url(mut self, url: impl Into<String>) -> Self {
        self.server_url = Some(url.into());
        self
    }

    /// Sets the per-request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Removes the per-request timeout, leaving requests unbounded.
    pub fn no_timeout(mut self) -> Self {
        self.timeout = None;
        self
    }

    /// Sets the retry policy.
    pub fn retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Sets the user agent string.
    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.user_agent = Some(ua.into());
        self
    }

    /// Builds the configuration.
    pub fn build(self) -> PdkResult<PdkConfig> {
        let raw = self.server_url.ok_or_else(|| {
            PdkError::Configuration(ConfigurationError::InvalidConfiguration(
                "server URL is required".to_string(),
            ))
        })?;

        let server_url = Url::parse(&raw).map_err(|e| {
            PdkError::Configuration(ConfigurationError::InvalidUrl(format!("{}: {}", raw, e)))
        })?;

        let user_agent = self
            .user_agent
            .unwrap_or_else(|| format!("integrations-pdk/{}", env!("CARGO_PKG_VERSION")));

        let config = PdkConfig {
            server_url,
            timeout: self.timeout,
            retry: self.retry,
            user_agent,
        };

        config.validate()?;

        Ok(config)
    }
}

impl Default for PdkConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
