//! Response types returned by the transport.

use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::request::Headers;

/// A raw HTTP response from the backend.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ApiResponse {
    /// HTTP status code
    pub status: u16,
    /// Response headers
    pub headers: Headers,
    /// Raw response body
    pub body: Vec<u8>,
    /// Time from dispatch to the last body byte
    pub duration: Duration,
}

impl ApiResponse {
    /// Creates a response with the given status and body.
    #[must_use]
    pub fn new(status: u16, headers: Headers, body: Vec<u8>, duration: Duration) -> Self {
        Self {
            status,
            headers,
            body,
            duration,
        }
    }

    /// Returns true if the status code indicates success (2xx).
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }

    /// Returns true if the status code indicates a client error (4xx).
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        self.status >= 400 && self.status < 500
    }

    /// Returns true if the status code indicates a server error (5xx).
    #[must_use]
    pub const fn is_server_error(&self) -> bool {
        self.status >= 500 && self.status < 600
    }

    /// Returns the body as text, replacing invalid UTF-8 sequences.
    #[must_use]
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Decodes the body as JSON. An empty body decodes as `null`.
    ///
    /// # Errors
    ///
    /// Returns the serde error if the body does not match `T`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        if self.body.iter().all(u8::is_ascii_whitespace) {
            serde_json::from_slice(b"null")
        } else {
            serde_json::from_slice(&self.body)
        }
    }

    /// Extracts the backend's structured error body, if the body is one.
    #[must_use]
    pub fn error_body(&self) -> Option<ApiErrorBody> {
        serde_json::from_slice::<ApiErrorBody>(&self.body)
            .ok()
            .filter(|body| body.code.is_some() || body.message.is_some() || body.error.is_some())
    }
}

/// Error payload the backend sends with non-2xx responses.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiErrorBody {
    /// Machine-readable code such as `ACCOUNT_DISABLED`
    #[serde(default)]
    pub code: Option<String>,
    /// Human-readable message
    #[serde(default)]
    pub message: Option<String>,
    /// Short error label (Spring's default error body)
    #[serde(default)]
    pub error: Option<String>,
}

impl ApiErrorBody {
    /// Best human-readable description: `message`, then `error`.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.message.as_deref().or(self.error.as_deref())
    }
}
