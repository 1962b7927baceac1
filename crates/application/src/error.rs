//! Client error types
//!
//! Authentication failures are resolved inside the refresh coordinator and
//! only surface here when they are terminal. Everything else passes through
//! with its status and the backend's error description.

use std::fmt;

use centinela_domain::DomainError;
use thiserror::Error;

use crate::ports::{CredentialStoreError, TransportError};

/// Why a token refresh failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshFailure {
    /// Status of the refresh endpoint response, when one arrived
    pub status: Option<u16>,
    /// Description of the failure
    pub message: String,
}

impl RefreshFailure {
    /// Creates a failure description.
    #[must_use]
    pub fn new(status: Option<u16>, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    /// The refresh endpoint answered with a non-2xx status.
    #[must_use]
    pub fn rejected(status: u16, message: impl Into<String>) -> Self {
        Self::new(Some(status), message)
    }

    /// The refresh call did not settle within its deadline.
    #[must_use]
    pub fn timed_out(timeout_ms: u64) -> Self {
        Self::new(None, format!("refresh did not settle within {timeout_ms} ms"))
    }

    /// The refresh cycle stopped before answering this caller.
    #[must_use]
    pub fn aborted() -> Self {
        Self::new(None, "refresh cycle ended without a result")
    }
}

impl fmt::Display for RefreshFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status {
            Some(status) => write!(f, "status {status}: {}", self.message),
            None => f.write_str(&self.message),
        }
    }
}

/// Errors returned by the API client.
#[derive(Debug, Error)]
pub enum ClientError {
    /// No credentials are held where some are required.
    #[error("not authenticated")]
    Unauthenticated,

    /// The backend rejected the credentials even after a refresh.
    #[error("authentication expired (status {status})")]
    AuthenticationExpired {
        /// Status of the final rejection
        status: u16,
    },

    /// The refresh endpoint failed; the session was torn down.
    #[error("session refresh failed: {0}")]
    RefreshFailed(RefreshFailure),

    /// The exchange failed below HTTP.
    #[error("network error: {0}")]
    Network(#[from] TransportError),

    /// The backend answered with a non-authentication error status.
    #[error("request rejected with status {status}: {message}")]
    RequestRejected {
        /// HTTP status
        status: u16,
        /// Machine-readable code from the error body
        code: Option<String>,
        /// Human-readable description
        message: String,
    },

    /// The response body did not match the expected shape.
    #[error("failed to decode response: {0}")]
    Decode(String),

    /// The request could not be built.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Durable credential storage failed.
    #[error("credential storage error: {0}")]
    Storage(#[from] CredentialStoreError),
}

impl From<DomainError> for ClientError {
    fn from(error: DomainError) -> Self {
        Self::InvalidRequest(error.to_string())
    }
}

/// Discriminant of [`ClientError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// See [`ClientError::Unauthenticated`]
    Unauthenticated,
    /// See [`ClientError::AuthenticationExpired`]
    AuthenticationExpired,
    /// See [`ClientError::RefreshFailed`]
    RefreshFailed,
    /// See [`ClientError::Network`]
    Network,
    /// See [`ClientError::RequestRejected`]
    RequestRejected,
    /// See [`ClientError::Decode`]
    Decode,
    /// See [`ClientError::InvalidRequest`]
    InvalidRequest,
    /// See [`ClientError::Storage`]
    Storage,
}

impl ClientError {
    /// Returns the error kind.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Unauthenticated => ErrorKind::Unauthenticated,
            Self::AuthenticationExpired { .. } => ErrorKind::AuthenticationExpired,
            Self::RefreshFailed(_) => ErrorKind::RefreshFailed,
            Self::Network(_) => ErrorKind::Network,
            Self::RequestRejected { .. } => ErrorKind::RequestRejected,
            Self::Decode(_) => ErrorKind::Decode,
            Self::InvalidRequest(_) => ErrorKind::InvalidRequest,
            Self::Storage(_) => ErrorKind::Storage,
        }
    }

    /// Returns the HTTP status associated with the error, if any.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::AuthenticationExpired { status } | Self::RequestRejected { status, .. } => {
                Some(*status)
            }
            Self::RefreshFailed(failure) => failure.status,
            _ => None,
        }
    }

    /// Whether the user must log in again.
    #[must_use]
    pub const fn requires_login(&self) -> bool {
        matches!(
            self,
            Self::Unauthenticated | Self::AuthenticationExpired { .. } | Self::RefreshFailed(_)
        )
    }

    /// Returns the backend error code of a rejected request.
    #[must_use]
    pub fn code(&self) -> Option<&str> {
        match self {
            Self::RequestRejected { code, .. } => code.as_deref(),
            _ => None,
        }
    }
}

/// Result type alias for client operations.
pub type ClientResult<T> = Result<T, ClientError>;
