//! Request descriptor passed through the request pipeline.

use std::fmt::Display;

use serde::{Deserialize, Serialize};

use super::{Headers, HttpMethod};
use crate::error::{DomainError, DomainResult};

/// How a request participates in bearer authentication.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthMode {
    /// Attach the access token when one is held; anonymous calls pass through.
    #[default]
    Optional,
    /// Fail fast when the client holds no credentials at all.
    Required,
    /// Never attach a token and never take part in the refresh protocol.
    Anonymous,
}

impl AuthMode {
    /// Whether the bearer token is attached to requests in this mode.
    #[must_use]
    pub const fn attaches_token(self) -> bool {
        !matches!(self, Self::Anonymous)
    }

    /// Whether an authentication failure may trigger a token refresh.
    #[must_use]
    pub const fn allows_refresh(self) -> bool {
        !matches!(self, Self::Anonymous)
    }
}

/// A backend API call: method, path relative to the base URL, query, body
/// and extra headers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiRequest {
    /// HTTP method
    pub method: HttpMethod,
    /// Path relative to the configured base URL (e.g. `/api/admin/users`)
    pub path: String,
    /// Query parameters in insertion order
    #[serde(default)]
    pub query: Vec<(String, String)>,
    /// JSON body, if any
    #[serde(default)]
    pub body: Option<serde_json::Value>,
    /// Extra headers applied on top of the pipeline defaults
    #[serde(default)]
    pub headers: Headers,
    /// Authentication participation
    #[serde(default)]
    pub auth: AuthMode,
}

impl ApiRequest {
    /// Creates a request with the given method and path.
    #[must_use]
    pub fn new(method: HttpMethod, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
            headers: Headers::new(),
            auth: AuthMode::default(),
        }
    }

    /// Creates a GET request.
    #[must_use]
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, path)
    }

    /// Creates a POST request.
    #[must_use]
    pub fn post(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Post, path)
    }

    /// Creates a PUT request.
    #[must_use]
    pub fn put(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Put, path)
    }

    /// Creates a PATCH request.
    #[must_use]
    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Patch, path)
    }

    /// Creates a DELETE request.
    #[must_use]
    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Delete, path)
    }

    /// Appends a query parameter.
    #[must_use]
    pub fn with_query(mut self, key: impl Into<String>, value: impl Display) -> Self {
        self.query.push((key.into(), value.to_string()));
        self
    }

    /// Appends a query parameter only when a value is present.
    #[must_use]
    pub fn with_optional_query<V: Display>(self, key: impl Into<String>, value: Option<V>) -> Self {
        match value {
            Some(value) => self.with_query(key, value),
            None => self,
        }
    }

    /// Sets a JSON body from any serializable value.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidBody` if the value cannot be serialized.
    pub fn with_json<T: Serialize + ?Sized>(mut self, body: &T) -> DomainResult<Self> {
        let value =
            serde_json::to_value(body).map_err(|e| DomainError::InvalidBody(e.to_string()))?;
        self.body = Some(value);
        Ok(self)
    }

    /// Sets an already-built JSON body.
    #[must_use]
    pub fn with_body(mut self, body: serde_json::Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Adds an extra header, replacing any header with the same name.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.set(name, value);
        self
    }

    /// Sets the authentication mode.
    #[must_use]
    pub const fn with_auth(mut self, auth: AuthMode) -> Self {
        self.auth = auth;
        self
    }

    /// Marks the request as anonymous (no token, no refresh).
    #[must_use]
    pub const fn anonymous(self) -> Self {
        self.with_auth(AuthMode::Anonymous)
    }

    /// Marks the request as requiring credentials.
    #[must_use]
    pub const fn authenticated(self) -> Self {
        self.with_auth(AuthMode::Required)
    }

    /// Validates the path and extra headers.
    ///
    /// # Errors
    ///
    /// Returns an error if the path is not an absolute path on the API host
    /// or if an extra header has an invalid name.
    pub fn validate(&self) -> DomainResult<()> {
        if !self.path.starts_with('/') || self.path.starts_with("//") || self.path.contains("://")
        {
            return Err(DomainError::InvalidPath(self.path.clone()));
        }
        if self.path.contains('?') || self.path.contains('#') {
            return Err(DomainError::InvalidPath(self.path.clone()));
        }
        for header in self.headers.iter() {
            header.validate()?;
        }
        Ok(())
    }
}
