//! Authentication and session types.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};

/// Returns a log-safe preview of a token (first 8 chars + `...`).
#[must_use]
pub fn token_preview(token: &str) -> String {
    if token.chars().count() > 12 {
        let head: String = token.chars().take(8).collect();
        format!("{head}...")
    } else {
        "***".to_string()
    }
}

/// Role of a platform user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    /// Administers every villa.
    SuperAdmin,
    /// Administers a single villa.
    AdminVilla,
    /// Resident; uses the mobile app only.
    Vecino,
    /// A role this client does not know about.
    #[serde(other)]
    Unknown,
}

impl Role {
    /// Whether users with this role may use the web dashboard.
    #[must_use]
    pub const fn can_access_dashboard(self) -> bool {
        matches!(self, Self::SuperAdmin | Self::AdminVilla)
    }

    /// Whether this role may change other users' roles or villas.
    #[must_use]
    pub const fn can_manage_roles(self) -> bool {
        matches!(self, Self::SuperAdmin)
    }

    /// Returns the wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SuperAdmin => "SUPER_ADMIN",
            Self::AdminVilla => "ADMIN_VILLA",
            Self::Vecino => "VECINO",
            Self::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = DomainError;

    fn from_str(s: &str) -> DomainResult<Self> {
        match s.to_uppercase().as_str() {
            "SUPER_ADMIN" => Ok(Self::SuperAdmin),
            "ADMIN_VILLA" => Ok(Self::AdminVilla),
            "VECINO" => Ok(Self::Vecino),
            other => Err(DomainError::UnknownRole(other.to_string())),
        }
    }
}

/// Non-sensitive profile of the logged-in user, safe to persist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    /// Backend user id
    pub user_id: Option<i64>,
    /// Login email (or username when the backend sends no email)
    pub email: String,
    /// Role
    pub role: Role,
    /// Admin flag as reported by the backend
    #[serde(default)]
    pub is_admin: bool,
    /// Given name
    #[serde(default)]
    pub first_name: String,
    /// Family name
    #[serde(default)]
    pub last_name: String,
    /// Sector within the villa
    #[serde(default)]
    pub sector: String,
    /// Villa (tenant) id
    #[serde(default)]
    pub villa_id: Option<i64>,
    /// Villa display name
    #[serde(default)]
    pub villa_name: String,
}

impl UserProfile {
    /// Full display name, falling back to the email.
    #[must_use]
    pub fn display_name(&self) -> String {
        let name = format!("{} {}", self.first_name, self.last_name);
        let name = name.trim();
        if name.is_empty() {
            self.email.clone()
        } else {
            name.to_string()
        }
    }
}

/// Body of `POST /api/auth/login`.
#[derive(Clone, Serialize)]
pub struct LoginCredentials {
    /// Login email
    pub email: String,
    /// Plain-text password
    pub password: String,
}

impl LoginCredentials {
    /// Creates login credentials.
    #[must_use]
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for LoginCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginCredentials")
            .field("email", &self.email)
            .field("password", &"***")
            .finish()
    }
}

/// Successful response of `POST /api/auth/login`.
#[derive(Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    /// Short-lived bearer token
    pub access_token: String,
    /// Long-lived refresh token
    pub refresh_token: String,
    /// Role of the user
    pub role: Role,
    /// Admin flag
    #[serde(default)]
    pub is_admin: Option<bool>,
    /// User id
    #[serde(default)]
    pub user_id: Option<i64>,
    /// Username, sent by some backend versions instead of the email
    #[serde(default)]
    pub username: Option<String>,
    /// Given name
    #[serde(default, rename = "nombre")]
    pub first_name: Option<String>,
    /// Family name
    #[serde(default, rename = "apellido")]
    pub last_name: Option<String>,
    /// Sector
    #[serde(default)]
    pub sector: Option<String>,
    /// Villa id
    #[serde(default)]
    pub villa_id: Option<i64>,
    /// Villa name
    #[serde(default, rename = "villaNombre")]
    pub villa_name: Option<String>,
}

impl LoginResponse {
    /// Builds the session, using `email` when the backend sends no username.
    #[must_use]
    pub fn into_session(self, email: &str) -> Session {
        let email = if email.is_empty() {
            self.username.unwrap_or_default()
        } else {
            email.to_string()
        };
        let user = UserProfile {
            user_id: self.user_id,
            email,
            role: self.role,
            is_admin: self.is_admin.unwrap_or(false),
            first_name: self.first_name.unwrap_or_default(),
            last_name: self.last_name.unwrap_or_default(),
            sector: self.sector.unwrap_or_default(),
            villa_id: self.villa_id,
            villa_name: self.villa_name.unwrap_or_default(),
        };
        Session {
            access_token: self.access_token,
            refresh_token: self.refresh_token,
            user,
        }
    }
}

impl fmt::Debug for LoginResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginResponse")
            .field("access_token", &token_preview(&self.access_token))
            .field("refresh_token", &"***")
            .field("role", &self.role)
            .field("user_id", &self.user_id)
            .finish_non_exhaustive()
    }
}

/// Body of `POST /api/auth/refresh`.
#[derive(Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    /// The durable refresh token
    pub refresh_token: String,
}

impl fmt::Debug for RefreshRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RefreshRequest")
            .field("refresh_token", &"***")
            .finish()
    }
}

/// Successful response of `POST /api/auth/refresh`.
#[derive(Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshResponse {
    /// New access token
    pub access_token: String,
    /// Rotated refresh token, when the backend rotates
    #[serde(default)]
    pub refresh_token: Option<String>,
}

impl fmt::Debug for RefreshResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RefreshResponse")
            .field("access_token", &token_preview(&self.access_token))
            .field("rotated", &self.refresh_token.is_some())
            .finish()
    }
}

/// The authenticated identity created by a successful login.
#[derive(Clone, PartialEq, Eq)]
pub struct Session {
    /// In-memory bearer token
    pub access_token: String,
    /// Durable refresh token
    pub refresh_token: String,
    /// Profile of the logged-in user
    pub user: UserProfile,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("access_token", &token_preview(&self.access_token))
            .field("refresh_token", &"***")
            .field("user", &self.user)
            .finish()
    }
}
