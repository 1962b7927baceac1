//! Session lifecycle events.

use centinela_domain::Role;
use chrono::{DateTime, Utc};

/// Broadcast whenever the session changes.
///
/// `Expired` is the teardown signal: the embedding UI should send the user
/// back to the login screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// A login succeeded.
    LoggedIn {
        /// Backend id of the user
        user_id: Option<i64>,
        /// Role granted by the backend
        role: Role,
    },
    /// The access token was silently replaced.
    TokenRefreshed {
        /// Log-safe prefix of the new token
        token_preview: String,
    },
    /// The session could not be renewed and was destroyed.
    Expired {
        /// Why the refresh failed
        reason: String,
    },
    /// The user logged out.
    LoggedOut,
}

impl SessionEvent {
    /// Whether the UI should return to the login screen.
    #[must_use]
    pub const fn requires_login(&self) -> bool {
        matches!(self, Self::Expired { .. } | Self::LoggedOut)
    }
}

/// Phase of the refresh coordinator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RefreshPhase {
    /// No refresh in flight.
    #[default]
    Idle,
    /// A refresh call is in flight; authentication failures queue up.
    Refreshing,
}

/// Diagnostic snapshot of the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionStatus {
    /// Whether an access token is held in memory
    pub has_access_token: bool,
    /// Coordinator phase
    pub phase: RefreshPhase,
    /// Requests waiting for the in-flight refresh
    pub queued: usize,
    /// Token generation; bumped on every login, refresh and teardown
    pub generation: u64,
    /// When the last successful refresh completed
    pub last_refreshed_at: Option<DateTime<Utc>>,
}

impl SessionStatus {
    /// Returns true while a refresh call is in flight.
    #[must_use]
    pub fn is_refreshing(&self) -> bool {
        self.phase == RefreshPhase::Refreshing
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_requires_login() {
        assert!(SessionEvent::LoggedOut.requires_login());
        assert!(
            SessionEvent::Expired {
                reason: "status 400: expired".to_string()
            }
            .requires_login()
        );
        assert!(
            !SessionEvent::TokenRefreshed {
                token_preview: "abcdefgh...".to_string()
            }
            .requires_login()
        );
        assert!(
            !SessionEvent::LoggedIn {
                user_id: Some(7),
                role: Role::AdminVilla
            }
            .requires_login()
        );
    }
}
