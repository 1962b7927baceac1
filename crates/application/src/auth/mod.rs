//! Session handling for the Centinela API client.
//!
//! This module provides:
//! - In-memory access token storage
//! - The single-flight refresh coordinator
//! - Session lifecycle events
//! - A credential store that never leaves memory

mod events;
mod memory_credentials;
pub(crate) mod refresh;
mod token_store;

pub use events::{RefreshPhase, SessionEvent, SessionStatus};
pub use memory_credentials::InMemoryCredentialStore;
pub use token_store::TokenStore;
