//! Error types for the Passive Data Kit integration.

use reqwest::StatusCode;
use thiserror::Error;

/// Result type for Passive Data Kit operations.
pub type PdkResult<T> = Result<T, PdkError>;

/// Top-level error type for the Passive Data Kit integration.
#[derive(Debug, Error)]
pub enum PdkError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    /// Authentication error.
    #[error("Authentication error: {0}")]
    Authentication(#[from] AuthenticationError),

    /// Request error.
    #[error("Request error: {0}")]
    Request(#[from] RequestError),

    /// Network error.
    #[error("Network error: {0}")]
    Network(#[from] NetworkError),

    /// Server error.
    #[error("Server error: {0}")]
    Server(#[from] ServerError),

    /// Response error.
    #[error("Response error: {0}")]
    Response(#[from] ResponseError),
}

impl PdkError {
    /// Creates a configuration error.
    pub fn configuration(msg: impl Into<String>) -> Self {
        PdkError::Configuration(ConfigurationError::InvalidConfiguration(msg.into()))
    }

    /// Creates a network (connection) error.
    pub fn network(msg: impl Into<String>) -> Self {
        PdkError::Network(NetworkError::ConnectionFailed(msg.into()))
    }

    /// Creates a timeout error.
    pub fn timeout(msg: impl Into<String>) -> Self {
        PdkError::Network(NetworkError::Timeout(msg.into()))
    }

    /// Creates a server error.
    pub fn server(msg: impl Into<String>) -> Self {
        PdkError::Server(ServerError::InternalError(msg.into()))
    }

    /// Creates a deserialization error.
    pub fn deserialization(msg: impl Into<String>) -> Self {
        PdkError::Response(ResponseError::Deserialization(msg.into()))
    }

    /// Returns true if the error is transient and worth retrying.
    ///
    /// Network-level failures (connection errors, timeouts) and server-side
    /// failures (5xx, 429) are retryable; semantic rejections such as bad
    /// credentials or invalid parameters fail fast.
    pub fn is_retryable(&self) -> bool {
        matches!(self, PdkError::Network(_) | PdkError::Server(_))
    }

    /// Returns the HTTP status code if applicable.
    pub fn status_code(&self) -> Option<StatusCode> {
        match self {
            PdkError::Authentication(AuthenticationError::InvalidCredentials(_))
            | PdkError::Authentication(AuthenticationError::InvalidToken(_)) => {
                Some(StatusCode::UNAUTHORIZED)
            }
            PdkError::Authentication(AuthenticationError::Forbidden(_)) => {
                Some(StatusCode::FORBIDDEN)
            }
            PdkError::Request(RequestError::NotFound(_)) => Some(StatusCode::NOT_FOUND),
            PdkError::Request(_) => Some(StatusCode::BAD_REQUEST),
            PdkError::Server(ServerError::RateLimited(_)) => {
                Some(StatusCode::TOO_MANY_REQUESTS)
            }
            PdkError::Server(ServerError::BadGateway(_)) => Some(StatusCode::BAD_GATEWAY),
            PdkError::Server(ServerError::ServiceUnavailable(_)) => {
                Some(StatusCode::SERVICE_UNAVAILABLE)
            }
            PdkError::Server(ServerError::InternalError(_)) => {
                Some(StatusCode::INTERNAL_SERVER_ERROR)
            }
            _ => None,
        }
    }
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    /// Invalid configuration.
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Invalid server URL.
    #[error("Invalid server URL: {0}")]
    InvalidUrl(String),
}

/// Authentication errors.
#[derive(Debug, Error)]
pub enum AuthenticationError {
    /// The server rejected the supplied credentials.
    #[error("Invalid credentials: {0}")]
    InvalidCredentials(String),

    /// The server rejected the bearer token.
    #[error("Invalid token: {0}")]
    InvalidToken(String),

    /// The server refused access to the resource.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// No bearer token is held by the session.
    #[error("Not connected: {0}")]
    NotConnected(String),
}

/// Request errors.
#[derive(Debug, Error)]
pub enum RequestError {
    /// Validation error.
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Index outside the bounds of the result set.
    #[error("Index out of range: {0}")]
    OutOfRange(String),
}

/// Network errors.
#[derive(Debug, Error)]
pub enum NetworkError {
    /// Connection failed.
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Timeout.
    #[error("Request timeout: {0}")]
    Timeout(String),
}

/// Server errors.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Internal error.
    #[error("Internal server error: {0}")]
    InternalError(String),

    /// Bad gateway.
    #[error("Bad gateway: {0}")]
    BadGateway(String),

    /// Service unavailable.
    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    /// The server asked us to back off.
    #[error("Rate limited: {0}")]
    RateLimited(String),
}

/// Response errors.
#[derive(Debug, Error)]
pub enum ResponseError {
    /// Deserialization error.
    #[error("Deserialization error: {0}")]
    Deserialization(String),

    /// Unexpected format.
    #[error("Unexpected response format: {0}")]
    UnexpectedFormat(String),
}

/// Transport errors.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Network error.
    #[error("Network error: {0}")]
    Network(String),

    /// Timeout error.
    #[error("Timeout: {0}")]
    Timeout(String),

    /// HTTP error.
    #[error("HTTP error: {0}")]
    Http(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            TransportError::Timeout(err.to_string())
        } else if err.is_connect() {
            TransportError::Network(err.to_string())
        } else {
            TransportError::Http(err.to_string())
        }
    }
}

impl From<TransportError> for PdkError {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::Timeout(msg) => PdkError::Network(NetworkError::Timeout(msg)),
            // Request-level failures that are not clean timeouts (dropped
            // connections, interrupted body reads) are treated as transient.
            TransportError::Network(msg) | TransportError::Http(msg) => {
                PdkError::Network(NetworkError::ConnectionFailed(msg))
            }
        }
    }
}
