//! File-backed credential store.
//!
//! The refresh token and user profile live in one JSON document:
//! ```json
//! {
//!   "schema_version": 1,
//!   "refresh_token": "eyJhbGciOi...",
//!   "user": { "email": "ana@centinela.cl", "role": "ADMIN_VILLA", ... }
//! }
//! ```
//! A missing file means nothing is stored.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use centinela_application::ports::{
    CREDENTIALS_SCHEMA_VERSION, CredentialStore, CredentialStoreError, FileSystem,
    FileSystemError, StoredCredentials,
};
use tracing::debug;

use crate::serialization::{from_json_bytes, to_json_stable_bytes};

/// Credential store persisting to a single JSON file.
#[derive(Debug, Clone)]
pub struct FileCredentialStore<F> {
    fs: F,
    path: PathBuf,
}

impl<F: FileSystem> FileCredentialStore<F> {
    /// Creates a store backed by the file at `path`.
    pub fn new(fs: F, path: impl Into<PathBuf>) -> Self {
        Self {
            fs,
            path: path.into(),
        }
    }

    /// Returns the path of the credentials file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl<F: FileSystem> CredentialStore for FileCredentialStore<F> {
    async fn load(&self) -> Result<StoredCredentials, CredentialStoreError> {
        let content = match self.fs.read_file(&self.path).await {
            Ok(content) => content,
            Err(FileSystemError::NotFound(_)) => return Ok(StoredCredentials::new()),
            Err(e) => return Err(CredentialStoreError::Io(e.into())),
        };

        let stored: StoredCredentials = from_json_bytes(&content)
            .map_err(|e| CredentialStoreError::Serialization(e.to_string()))?;
        if stored.schema_version > CREDENTIALS_SCHEMA_VERSION {
            return Err(CredentialStoreError::Serialization(format!(
                "unsupported schema version {}",
                stored.schema_version
            )));
        }
        Ok(stored)
    }

    async fn save(&self, credentials: &StoredCredentials) -> Result<(), CredentialStoreError> {
        if credentials.is_empty() {
            debug!(path = %self.path.display(), "removing credentials file");
            return self
                .fs
                .remove_file(&self.path)
                .await
                .map_err(|e| CredentialStoreError::Io(e.into()));
        }

        let content = to_json_stable_bytes(credentials)
            .map_err(|e| CredentialStoreError::Serialization(e.to_string()))?;
        self.fs
            .write_file(&self.path, &content)
            .await
            .map_err(|e| CredentialStoreError::Io(e.into()))
    }
}
