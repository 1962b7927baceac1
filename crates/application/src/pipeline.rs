//! Request pipeline: turns an [`ApiRequest`] into an [`OutgoingRequest`].

use centinela_domain::{ApiRequest, Headers};
use url::Url;

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};
use crate::ports::OutgoingRequest;

/// Builds outgoing requests with consistent URL, headers and body.
#[derive(Debug, Clone)]
pub struct RequestPipeline {
    base_url: String,
    defaults: Headers,
    request_timeout: std::time::Duration,
}

impl RequestPipeline {
    /// Creates a pipeline for the given configuration.
    #[must_use]
    pub fn new(config: &ClientConfig) -> Self {
        let mut defaults = Headers::default();
        defaults.set("Content-Type", "application/json");
        defaults.set("Accept", "application/json");
        for (name, value) in &config.default_headers {
            defaults.set(name.clone(), value.clone());
        }
        Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            defaults,
            request_timeout: config.request_timeout,
        }
    }

    /// Prepares `request`, attaching `token` as a bearer credential when
    /// given and the request's auth mode allows it.
    ///
    /// # Errors
    ///
    /// Returns `InvalidRequest` if the path, headers, query or body cannot be
    /// turned into a valid HTTP request.
    pub fn prepare(&self, request: &ApiRequest, token: Option<&str>) -> ClientResult<OutgoingRequest> {
        request.validate()?;

        let mut raw = format!("{}{}", self.base_url, request.path);
        if !request.query.is_empty() {
            let query = serde_urlencoded::to_string(&request.query)
                .map_err(|e| ClientError::InvalidRequest(format!("query: {e}")))?;
            raw.push('?');
            raw.push_str(&query);
        }
        let url = Url::parse(&raw).map_err(|e| ClientError::InvalidRequest(format!("{e}: {raw}")))?;

        let mut headers = self.defaults.clone();
        if let Some(token) = token.filter(|_| request.auth.attaches_token()) {
            headers.set("Authorization", format!("Bearer {token}"));
        }
        headers.merge(&request.headers);

        let body = request
            .body
            .as_ref()
            .map(serde_json::to_vec)
            .transpose()
            .map_err(|e| ClientError::InvalidRequest(format!("body: {e}")))?;

        Ok(OutgoingRequest {
            method: request.method,
            url,
            headers,
            body,
            timeout: self.request_timeout,
        })
    }
}
