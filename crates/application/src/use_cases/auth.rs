//! Login, logout and session restore.

use centinela_domain::{ApiRequest, LoginCredentials, LoginResponse, Role, UserProfile};
use thiserror::Error;
use tracing::{info, warn};

use crate::client::ApiClient;
use crate::error::ClientError;
use crate::ports::{CredentialStoreError, TransportError};

/// Why a login attempt failed.
#[derive(Debug, Error)]
pub enum LoginError {
    /// Wrong email or password.
    #[error("email or password is incorrect")]
    InvalidCredentials,

    /// The account exists but is pending verification or disabled.
    #[error("the account is pending verification; contact an administrator")]
    AccountDisabled,

    /// Residents may only use the mobile app.
    #[error("this account has no web access; use the mobile app")]
    NoWebAccess,

    /// The backend refused access for another reason.
    #[error("access denied: {0}")]
    AccessDenied(String),

    /// No account with that email.
    #[error("user not found")]
    UserNotFound,

    /// The login succeeded but the role may not use the dashboard.
    #[error("role {0} has no access to the dashboard")]
    NoDashboardAccess(Role),

    /// The backend failed.
    #[error("server error (status {status}): {message}")]
    Server {
        /// HTTP status
        status: u16,
        /// Backend description
        message: String,
    },

    /// The backend could not be reached.
    #[error("could not reach the server: {0}")]
    Unreachable(TransportError),

    /// Any other rejection.
    #[error("login rejected (status {status}): {message}")]
    Rejected {
        /// HTTP status
        status: u16,
        /// Backend description
        message: String,
    },

    /// The login response could not be decoded.
    #[error("invalid login response: {0}")]
    InvalidResponse(String),

    /// The session could not be persisted.
    #[error("credential storage error: {0}")]
    Storage(#[from] CredentialStoreError),
}

impl LoginError {
    fn from_client(error: ClientError) -> Self {
        match error {
            ClientError::RequestRejected {
                status,
                code,
                message,
            } => match (status, code.as_deref()) {
                (401, _) => Self::InvalidCredentials,
                (403, Some("ACCOUNT_DISABLED")) => Self::AccountDisabled,
                (403, Some("VECINO_NO_WEB_ACCESS")) => Self::NoWebAccess,
                (403, _) => Self::AccessDenied(message),
                (404, _) => Self::UserNotFound,
                (500..=599, _) => Self::Server { status, message },
                _ => Self::Rejected { status, message },
            },
            ClientError::Network(error) => Self::Unreachable(error),
            ClientError::Decode(message) => Self::InvalidResponse(message),
            ClientError::Storage(error) => Self::Storage(error),
            other => Self::Rejected {
                status: other.status().unwrap_or_default(),
                message: other.to_string(),
            },
        }
    }
}

/// Session use cases of the dashboard.
#[derive(Debug, Clone)]
pub struct AuthService {
    client: ApiClient,
}

impl AuthService {
    /// Creates the service.
    #[must_use]
    pub const fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Exchanges email and password for a session.
    ///
    /// # Errors
    ///
    /// Returns a [`LoginError`] describing why the backend refused, or
    /// `NoDashboardAccess` when the role may not use the dashboard; the
    /// session is already torn down in that case.
    pub async fn login(&self, email: &str, password: &str) -> Result<UserProfile, LoginError> {
        let request = ApiRequest::post(self.client.config().login_path.clone())
            .anonymous()
            .with_json(&LoginCredentials::new(email, password))
            .map_err(|e| LoginError::InvalidResponse(e.to_string()))?;
        let response: LoginResponse = self
            .client
            .execute_json(request)
            .await
            .map_err(LoginError::from_client)?;

        let session = response.into_session(email);
        let user = session.user.clone();
        self.client
            .begin_session(session)
            .await
            .map_err(LoginError::from_client)?;

        if !user.role.can_access_dashboard() {
            info!(role = %user.role, "role without dashboard access, logging out");
            self.logout().await;
            return Err(LoginError::NoDashboardAccess(user.role));
        }
        Ok(user)
    }

    /// Clears the session. No network call is made.
    pub async fn logout(&self) {
        if let Err(error) = self.client.end_session().await {
            warn!(%error, "failed to clear stored credentials on logout");
        }
    }

    /// Restores a persisted session by refreshing the access token.
    ///
    /// Returns the stored user when the session is still valid. A stored user
    /// whose refresh fails is logged out.
    pub async fn restore(&self) -> Option<UserProfile> {
        let user = self.current_user().await?;
        match self.client.refresh_session().await {
            Ok(()) => Some(user),
            Err(error) => {
                info!(%error, "stored session could not be restored");
                self.logout().await;
                None
            }
        }
    }

    /// Returns the stored profile of the logged-in user.
    pub async fn current_user(&self) -> Option<UserProfile> {
        match self.client.credentials().load_user().await {
            Ok(user) => user,
            Err(error) => {
                warn!(%error, "failed to read stored user");
                None
            }
        }
    }

    /// Whether both a stored user and a refresh token are present.
    pub async fn is_authenticated(&self) -> bool {
        self.client
            .credentials()
            .load()
            .await
            .is_ok_and(|stored| stored.user.is_some() && stored.refresh_token.is_some())
    }
}
