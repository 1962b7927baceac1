//! Configuration file loading.

use std::path::{Path, PathBuf};

use centinela_application::{ClientConfig, ConfigError};
use thiserror::Error;

use crate::serialization::{SerializationError, from_json_bytes};

/// File name of the credentials document inside the config directory.
pub const CREDENTIALS_FILE: &str = "credentials.json";

/// Errors raised while loading a configuration file.
#[derive(Debug, Error)]
pub enum ConfigLoadError {
    /// The file could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        /// File being read
        path: PathBuf,
        /// Underlying error
        source: std::io::Error,
    },

    /// YAML parsing failed.
    #[error("invalid YAML in {path}: {source}")]
    Yaml {
        /// File being parsed
        path: PathBuf,
        /// Underlying error
        source: serde_yaml::Error,
    },

    /// JSON parsing failed.
    #[error("invalid JSON in {path}: {source}")]
    Json {
        /// File being parsed
        path: PathBuf,
        /// Underlying error
        source: SerializationError,
    },

    /// The file parsed but holds unusable values.
    #[error(transparent)]
    Invalid(#[from] ConfigError),
}

/// Loads a [`ClientConfig`] from a `.yaml`/`.yml` or JSON file. Missing keys
/// take their defaults.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed, or if the
/// resulting configuration is invalid.
pub async fn load_config(path: &Path) -> Result<ClientConfig, ConfigLoadError> {
    let content = tokio::fs::read(path).await.map_err(|source| ConfigLoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let is_yaml = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"));

    let config: ClientConfig = if is_yaml {
        serde_yaml::from_slice(&content).map_err(|source| ConfigLoadError::Yaml {
            path: path.to_path_buf(),
            source,
        })?
    } else {
        from_json_bytes(&content).map_err(|source| ConfigLoadError::Json {
            path: path.to_path_buf(),
            source,
        })?
    };

    config.validate()?;
    Ok(config)
}

/// Default location of the credentials file: `<config dir>/centinela/credentials.json`.
#[must_use]
pub fn default_credentials_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("centinela").join(CREDENTIALS_FILE))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::time::Duration;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_load_yaml() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("centinela.yaml");
        std::fs::write(
            &path,
            "base_url: https://api.centinela.cl\nrefresh_on_forbidden: true\nrequest_timeout: 10000\ndefault_headers:\n  X-Client: dashboard\n",
        )
        .unwrap();

        let config = load_config(&path).await.unwrap();
        assert_eq!(config.base_url, "https://api.centinela.cl");
        assert!(config.refresh_on_forbidden);
        assert_eq!(config.request_timeout, Duration::from_secs(10));
        assert_eq!(config.refresh_timeout, Duration::from_secs(15));
        assert_eq!(
            config.default_headers.get("X-Client").map(String::as_str),
            Some("dashboard")
        );
    }

    #[tokio::test]
    async fn test_load_json() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("centinela.json");
        std::fs::write(&path, r#"{"base_url": "http://10.0.0.5:8082"}"#).unwrap();

        let config = load_config(&path).await.unwrap();
        assert_eq!(config.base_url, "http://10.0.0.5:8082");
        assert_eq!(config.login_path, "/api/auth/login");
    }

    #[tokio::test]
    async fn test_invalid_values_are_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("centinela.yml");
        std::fs::write(&path, "base_url: not a url\n").unwrap();

        assert!(matches!(
            load_config(&path).await,
            Err(ConfigLoadError::Invalid(ConfigError::InvalidBaseUrl(_)))
        ));
    }

    #[tokio::test]
    async fn test_missing_file() {
        let dir = tempdir().unwrap();
        assert!(matches!(
            load_config(&dir.path().join("absent.yaml")).await,
            Err(ConfigLoadError::Io { .. })
        ));
    }

    #[test]
    fn test_default_credentials_path_file_name() {
        if let Some(path) = default_credentials_path() {
            assert!(path.ends_with("centinela/credentials.json"));
        }
    }
}
