//! Client configuration

use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

/// Errors detected while validating a [`ClientConfig`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// The base URL is not an absolute http(s) URL.
    #[error("invalid base URL '{0}'")]
    InvalidBaseUrl(String),

    /// An endpoint path does not start with '/'.
    #[error("invalid endpoint path '{0}'")]
    InvalidPath(String),

    /// A timeout is zero.
    #[error("{0} must be greater than zero")]
    ZeroTimeout(&'static str),
}

/// Settings of an [`crate::ApiClient`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Backend root, e.g. `https://api.example.com`
    pub base_url: String,

    /// Deadline for ordinary requests
    #[serde(with = "duration_millis")]
    pub request_timeout: Duration,

    /// Deadline for the refresh call; exceeding it fails the refresh
    #[serde(with = "duration_millis")]
    pub refresh_timeout: Duration,

    /// Treat 403 like 401 and refresh
    pub refresh_on_forbidden: bool,

    /// Login endpoint path
    pub login_path: String,

    /// Refresh endpoint path
    pub refresh_path: String,

    /// User-Agent sent by the transport
    pub user_agent: String,

    /// Headers added to every request
    pub default_headers: BTreeMap<String, String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8082".to_string(),
            request_timeout: Duration::from_secs(30),
            refresh_timeout: Duration::from_secs(15),
            refresh_on_forbidden: false,
            login_path: "/api/auth/login".to_string(),
            refresh_path: "/api/auth/refresh".to_string(),
            user_agent: format!("centinela/{}", env!("CARGO_PKG_VERSION")),
            default_headers: BTreeMap::new(),
        }
    }
}

impl ClientConfig {
    /// Creates a configuration for the given backend root.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Sets the request timeout.
    #[must_use]
    pub const fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Sets the refresh timeout.
    #[must_use]
    pub const fn with_refresh_timeout(mut self, timeout: Duration) -> Self {
        self.refresh_timeout = timeout;
        self
    }

    /// Enables or disables refreshing on 403.
    #[must_use]
    pub const fn with_refresh_on_forbidden(mut self, enabled: bool) -> Self {
        self.refresh_on_forbidden = enabled;
        self
    }

    /// Adds a header sent with every request.
    #[must_use]
    pub fn with_default_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.default_headers.insert(name.into(), value.into());
        self
    }

    /// Returns true if `status` signals expired credentials.
    #[must_use]
    pub const fn is_auth_failure(&self, status: u16) -> bool {
        status == 401 || (self.refresh_on_forbidden && status == 403)
    }

    /// Checks the configuration for values the client cannot work with.
    ///
    /// # Errors
    ///
    /// Returns the first problem found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = Url::parse(&self.base_url)
            .map_err(|_| ConfigError::InvalidBaseUrl(self.base_url.clone()))?;
        if !matches!(url.scheme(), "http" | "https") || url.cannot_be_a_base() {
            return Err(ConfigError::InvalidBaseUrl(self.base_url.clone()));
        }
        for path in [&self.login_path, &self.refresh_path] {
            if !path.starts_with('/') {
                return Err(ConfigError::InvalidPath(path.clone()));
            }
        }
        if self.request_timeout.is_zero() {
            return Err(ConfigError::ZeroTimeout("request_timeout"));
        }
        if self.refresh_timeout.is_zero() {
            return Err(ConfigError::ZeroTimeout("refresh_timeout"));
        }
        Ok(())
    }
}

mod duration_millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    #[allow(clippy::cast_possible_truncation)]
    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_millis() as u64)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.base_url, "http://localhost:8082");
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert_eq!(config.refresh_timeout, Duration::from_secs(15));
        assert!(!config.refresh_on_forbidden);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_auth_failure_statuses() {
        let config = ClientConfig::default();
        assert!(config.is_auth_failure(401));
        assert!(!config.is_auth_failure(403));
        assert!(!config.is_auth_failure(500));

        let config = config.with_refresh_on_forbidden(true);
        assert!(config.is_auth_failure(403));
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: ClientConfig = serde_json::from_str(
            r#"{"base_url": "https://api.centinela.cl", "refresh_timeout": 2500}"#,
        )
        .unwrap();
        assert_eq!(config.base_url, "https://api.centinela.cl");
        assert_eq!(config.refresh_timeout, Duration::from_millis(2500));
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert_eq!(config.refresh_path, "/api/auth/refresh");
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        assert_eq!(
            ClientConfig::new("localhost:8082").validate(),
            Err(ConfigError::InvalidBaseUrl("localhost:8082".to_string()))
        );
        let mut config = ClientConfig::default();
        config.refresh_path = "api/auth/refresh".to_string();
        assert_eq!(
            config.validate(),
            Err(ConfigError::InvalidPath("api/auth/refresh".to_string()))
        );
        let config = ClientConfig::default().with_refresh_timeout(Duration::ZERO);
        assert_eq!(
            config.validate(),
            Err(ConfigError::ZeroTimeout("refresh_timeout"))
        );
    }
}
