//! Centinela Infrastructure - Adapters and implementations
//!
//! This crate provides concrete implementations of the ports
//! defined in the application layer.

pub mod adapters;
pub mod config;
pub mod persistence;
pub mod serialization;

pub use adapters::ReqwestTransport;
pub use config::{CREDENTIALS_FILE, ConfigLoadError, default_credentials_path, load_config};
pub use persistence::{FileCredentialStore, InMemoryCredentialStore, TokioFileSystem};
pub use serialization::{SerializationError, from_json_bytes, to_json_stable, to_json_stable_bytes};
