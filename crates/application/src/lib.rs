//! Centinela Application - Session handling and use cases
//!
//! This crate holds the authenticated API client:
//! - the in-memory access token store,
//! - the request pipeline that attaches credentials,
//! - the refresh coordinator that renews the session once for any number of
//!   concurrent authentication failures,
//! - typed use cases for the dashboard endpoints.
//!
//! I/O goes through the ports in [`ports`]; adapters live in the
//! infrastructure crate.

pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod ports;
pub mod use_cases;

#[cfg(test)]
mod test_support;

pub use auth::{InMemoryCredentialStore, RefreshPhase, SessionEvent, SessionStatus, TokenStore};
pub use client::ApiClient;
pub use config::{ClientConfig, ConfigError};
pub use error::{ClientError, ClientResult, ErrorKind, RefreshFailure};
pub use pipeline::RequestPipeline;
