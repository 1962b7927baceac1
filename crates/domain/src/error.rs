//! Domain error types

use thiserror::Error;

/// Domain-level errors that can occur during validation or processing.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// The request path is empty or malformed.
    #[error("invalid path: {0}")]
    InvalidPath(String),

    /// A header name is invalid.
    #[error("invalid header name: {0}")]
    InvalidHeaderName(String),

    /// The HTTP method is not supported.
    #[error("unsupported HTTP method: {0}")]
    UnsupportedMethod(String),

    /// The request body could not be serialized.
    #[error("invalid body: {0}")]
    InvalidBody(String),

    /// A role string is not one the backend knows about.
    #[error("unknown role: {0}")]
    UnknownRole(String),
}

/// Result type alias for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
