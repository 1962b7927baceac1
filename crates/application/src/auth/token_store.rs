//! In-memory access token storage.
//!
//! The store is the single source of truth for the current access token
//! within the running process. It is never persisted; the durable refresh
//! token is what survives restarts.

use std::fmt;
use std::sync::Arc;

use centinela_domain::token_preview;
use tokio::sync::RwLock;

/// Thread-safe in-memory access token holder.
///
/// Clones share the same slot. Outside this crate the handle is read-only:
/// the token changes only through the refresh coordinator, which versions
/// every write.
#[derive(Clone, Default)]
pub struct TokenStore {
    token: Arc<RwLock<Option<String>>>,
}

impl TokenStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a token, replacing any previous one.
    pub(crate) async fn set(&self, token: impl Into<String>) {
        let mut slot = self.token.write().await;
        *slot = Some(token.into());
    }

    /// Returns the current token, if any.
    pub async fn get(&self) -> Option<String> {
        self.token.read().await.clone()
    }

    /// Removes the token.
    pub(crate) async fn clear(&self) {
        let mut slot = self.token.write().await;
        *slot = None;
    }

    /// Returns true if a token is held.
    pub async fn is_set(&self) -> bool {
        self.token.read().await.is_some()
    }

    /// Returns a log-safe preview of the current token.
    pub async fn preview(&self) -> Option<String> {
        self.token.read().await.as_deref().map(token_preview)
    }
}

impl fmt::Debug for TokenStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let held = self.token.try_read().map_or("<locked>", |slot| {
            if slot.is_some() { "<set>" } else { "<empty>" }
        });
        f.debug_struct("TokenStore").field("token", &held).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn test_set_and_get() {
        let store = TokenStore::new();
        assert_eq!(store.get().await, None);
        assert!(!store.is_set().await);

        store.set("eyJhbGciOiJIUzI1NiJ9.first").await;
        assert_eq!(store.get().await.as_deref(), Some("eyJhbGciOiJIUzI1NiJ9.first"));
        assert!(store.is_set().await);
    }

    #[tokio::test]
    async fn test_repeated_reads_are_stable() {
        let store = TokenStore::new();
        store.set("token-a").await;
        let first = store.get().await;
        let second = store.get().await;
        let third = store.get().await;
        assert_eq!(first, second);
        assert_eq!(second, third);
    }

    #[tokio::test]
    async fn test_set_overwrites_and_clear_empties() {
        let store = TokenStore::new();
        store.set("token-a").await;
        store.set("token-b").await;
        assert_eq!(store.get().await.as_deref(), Some("token-b"));

        store.clear().await;
        assert_eq!(store.get().await, None);
    }

    #[tokio::test]
    async fn test_clones_share_the_slot() {
        let store = TokenStore::new();
        let other = store.clone();
        store.set("shared-token").await;
        assert_eq!(other.get().await.as_deref(), Some("shared-token"));
    }

    #[tokio::test]
    async fn test_debug_hides_token() {
        let store = TokenStore::new();
        store.set("super-secret-access-token").await;
        let printed = format!("{store:?}");
        assert!(!printed.contains("super-secret"));
        assert!(printed.contains("<set>"));
        assert_eq!(store.preview().await.as_deref(), Some("super-se..."));
    }
}
