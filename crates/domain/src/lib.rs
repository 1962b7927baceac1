//! Centinela Domain - Core types
//!
//! This crate defines the domain model for the Centinela API client:
//! request and response descriptors, authentication payloads and the
//! administrative resources exposed by the backend.
//! All types here are pure Rust with no I/O dependencies.

pub mod admin;
pub mod auth;
pub mod error;
pub mod request;
pub mod response;

pub use auth::{
    LoginCredentials, LoginResponse, RefreshRequest, RefreshResponse, Role, Session, UserProfile,
    token_preview,
};
pub use error::{DomainError, DomainResult};
pub use request::{ApiRequest, AuthMode, Header, Headers, HttpMethod};
pub use response::{ApiErrorBody, ApiResponse};
