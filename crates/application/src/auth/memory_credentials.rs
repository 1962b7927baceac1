//! Credential store kept in process memory, for tests and sessions that
//! must not touch disk.

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::ports::{CredentialStore, CredentialStoreError, StoredCredentials};

/// Credential store that forgets everything when dropped.
#[derive(Debug, Default)]
pub struct InMemoryCredentialStore {
    stored: RwLock<StoredCredentials>,
}

impl InMemoryCredentialStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store already holding `credentials`.
    #[must_use]
    pub fn with_credentials(credentials: StoredCredentials) -> Self {
        Self {
            stored: RwLock::new(credentials),
        }
    }
}

#[async_trait]
impl CredentialStore for InMemoryCredentialStore {
    async fn load(&self) -> Result<StoredCredentials, CredentialStoreError> {
        Ok(self.stored.read().await.clone())
    }

    async fn save(&self, credentials: &StoredCredentials) -> Result<(), CredentialStoreError> {
        *self.stored.write().await = credentials.clone();
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn test_default_methods_keep_other_fields() {
        let store = InMemoryCredentialStore::new();
        assert!(store.load().await.unwrap().is_empty());

        store.save_refresh_token("refresh-0001").await.unwrap();
        assert_eq!(
            store.load_refresh_token().await.unwrap().as_deref(),
            Some("refresh-0001")
        );
        assert_eq!(store.load_user().await.unwrap(), None);

        store.clear_refresh_token().await.unwrap();
        assert!(store.load().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_with_credentials_starts_populated() {
        let store = InMemoryCredentialStore::with_credentials(StoredCredentials {
            refresh_token: Some("refresh-0002".to_string()),
            ..StoredCredentials::new()
        });
        assert_eq!(
            store.load_refresh_token().await.unwrap().as_deref(),
            Some("refresh-0002")
        );
        store.clear().await.unwrap();
        assert!(store.load().await.unwrap().is_empty());
    }
}
