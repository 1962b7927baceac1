//! HTTP transport port

use std::time::Duration;

use async_trait::async_trait;
use centinela_domain::{ApiResponse, Headers, HttpMethod};
use url::Url;

/// A fully prepared request: absolute URL, final headers, serialized body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingRequest {
    /// HTTP method
    pub method: HttpMethod,
    /// Absolute URL including the query string
    pub url: Url,
    /// Final header set
    pub headers: Headers,
    /// Serialized body
    pub body: Option<Vec<u8>>,
    /// Deadline for the whole exchange
    pub timeout: Duration,
}

impl OutgoingRequest {
    /// Returns the bearer token carried by this request, if any.
    #[must_use]
    pub fn bearer_token(&self) -> Option<&str> {
        self.headers
            .get("Authorization")
            .and_then(|value| value.strip_prefix("Bearer "))
    }

    /// Returns the URL path.
    #[must_use]
    pub fn path(&self) -> &str {
        self.url.path()
    }
}

/// Errors raised below HTTP semantics: the exchange itself failed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    /// The URL could not be used by the transport.
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// The exchange did not finish in time.
    #[error("request timed out after {timeout_ms} ms")]
    Timeout {
        /// The timeout that elapsed
        timeout_ms: u64,
    },

    /// Name resolution failed.
    #[error("DNS lookup failed for {host}: {message}")]
    Dns {
        /// Host being resolved
        host: String,
        /// Underlying message
        message: String,
    },

    /// The server refused the connection.
    #[error("connection refused by {host}:{port}")]
    ConnectionRefused {
        /// Target host
        host: String,
        /// Target port
        port: u16,
    },

    /// Connecting failed for another reason (TLS, reset, ...).
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// The response body could not be read.
    #[error("failed to read response body: {0}")]
    Body(String),

    /// Anything else.
    #[error("transport error: {0}")]
    Other(String),
}

/// Port for sending prepared requests over the network.
///
/// Implementations return every HTTP status as `Ok`; only failures of the
/// exchange itself are errors.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Sends the request and returns the raw response.
    ///
    /// # Errors
    ///
    /// Returns a `TransportError` when no HTTP response was obtained.
    async fn execute(&self, request: &OutgoingRequest) -> Result<ApiResponse, TransportError>;
}
