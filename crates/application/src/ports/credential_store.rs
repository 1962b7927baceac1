//! Durable credential storage port
//!
//! Holds what must survive a restart: the refresh token and the
//! non-sensitive profile of the logged-in user. The access token never
//! goes through this port.

use async_trait::async_trait;
use centinela_domain::UserProfile;
use serde::{Deserialize, Serialize};

/// Current version of the persisted credentials document.
pub const CREDENTIALS_SCHEMA_VERSION: u32 = 1;

/// Errors that can occur during credential storage operations.
#[derive(Debug, thiserror::Error)]
pub enum CredentialStoreError {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(String),
}

/// The persisted credentials document.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredCredentials {
    /// Document version
    pub schema_version: u32,
    /// Durable refresh token
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    /// Profile of the logged-in user
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<UserProfile>,
}

impl StoredCredentials {
    /// Creates an empty document.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            schema_version: CREDENTIALS_SCHEMA_VERSION,
            refresh_token: None,
            user: None,
        }
    }

    /// Returns true if nothing is stored.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.refresh_token.is_none() && self.user.is_none()
    }
}

impl Default for StoredCredentials {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for StoredCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoredCredentials")
            .field("schema_version", &self.schema_version)
            .field("has_refresh_token", &self.refresh_token.is_some())
            .field("user", &self.user)
            .finish()
    }
}

/// Repository trait for durable credentials.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Loads the stored credentials. Returns an empty document if nothing
    /// was stored yet.
    async fn load(&self) -> Result<StoredCredentials, CredentialStoreError>;

    /// Replaces the stored credentials.
    ///
    /// # Errors
    /// Returns an error if the document cannot be written.
    async fn save(&self, credentials: &StoredCredentials) -> Result<(), CredentialStoreError>;

    /// Returns the stored refresh token.
    async fn load_refresh_token(&self) -> Result<Option<String>, CredentialStoreError> {
        Ok(self.load().await?.refresh_token)
    }

    /// Stores a refresh token, keeping the stored user.
    async fn save_refresh_token(&self, token: &str) -> Result<(), CredentialStoreError> {
        let mut credentials = self.load().await?;
        credentials.refresh_token = Some(token.to_string());
        self.save(&credentials).await
    }

    /// Removes the refresh token, keeping the stored user.
    async fn clear_refresh_token(&self) -> Result<(), CredentialStoreError> {
        let mut credentials = self.load().await?;
        credentials.refresh_token = None;
        self.save(&credentials).await
    }

    /// Returns the stored user profile.
    async fn load_user(&self) -> Result<Option<UserProfile>, CredentialStoreError> {
        Ok(self.load().await?.user)
    }

    /// Stores the user profile, keeping the refresh token.
    async fn save_user(&self, user: &UserProfile) -> Result<(), CredentialStoreError> {
        let mut credentials = self.load().await?;
        credentials.user = Some(user.clone());
        self.save(&credentials).await
    }

    /// Removes the user profile, keeping the refresh token.
    async fn clear_user(&self) -> Result<(), CredentialStoreError> {
        let mut credentials = self.load().await?;
        credentials.user = None;
        self.save(&credentials).await
    }

    /// Removes everything.
    async fn clear(&self) -> Result<(), CredentialStoreError> {
        self.save(&StoredCredentials::new()).await
    }
}
