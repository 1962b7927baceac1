//! Persistence adapters.

mod file_credential_store;
mod file_system;

pub use file_credential_store::FileCredentialStore;
pub use file_system::TokioFileSystem;
pub use centinela_application::InMemoryCredentialStore;
