//! HTTP transport implementation using reqwest.
//!
//! This adapter implements the `HttpTransport` port. Every HTTP status is
//! returned as a response; only failures of the exchange are errors.

use std::time::Instant;

use async_trait::async_trait;
use centinela_application::ClientConfig;
use centinela_application::ports::{HttpTransport, OutgoingRequest, TransportError};
use centinela_domain::{ApiResponse, Headers, HttpMethod};
use reqwest::{Client, Method};

const MAX_REDIRECTS: usize = 10;

/// HTTP transport backed by `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Creates a transport with the configured user agent.
    ///
    /// Defaults:
    /// - Follow redirects: up to 10
    /// - TLS verification: enabled
    ///
    /// # Errors
    ///
    /// Returns an error if the client cannot be created.
    pub fn new(config: &ClientConfig) -> Result<Self, TransportError> {
        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .build()
            .map_err(|e| TransportError::Other(e.to_string()))?;

        Ok(Self { client })
    }

    /// Wraps an existing reqwest client.
    #[must_use]
    pub const fn with_client(client: Client) -> Self {
        Self { client }
    }

    /// Converts domain `HttpMethod` to reqwest `Method`.
    const fn to_reqwest_method(method: HttpMethod) -> Method {
        match method {
            HttpMethod::Get => Method::GET,
            HttpMethod::Post => Method::POST,
            HttpMethod::Put => Method::PUT,
            HttpMethod::Patch => Method::PATCH,
            HttpMethod::Delete => Method::DELETE,
        }
    }

    /// Maps reqwest errors to `TransportError`.
    fn map_error(error: &reqwest::Error, timeout_ms: u64) -> TransportError {
        if error.is_timeout() {
            return TransportError::Timeout { timeout_ms };
        }

        let host = || {
            error
                .url()
                .and_then(|u| u.host_str())
                .unwrap_or("unknown")
                .to_string()
        };

        if error.is_connect() {
            let message = error.to_string();
            let lower = message.to_lowercase();
            if lower.contains("dns") || lower.contains("resolve") {
                return TransportError::Dns {
                    host: host(),
                    message,
                };
            }
            if lower.contains("refused") {
                return TransportError::ConnectionRefused {
                    host: host(),
                    port: error
                        .url()
                        .and_then(reqwest::Url::port_or_known_default)
                        .unwrap_or(80),
                };
            }
            return TransportError::ConnectionFailed(message);
        }

        if error.is_redirect() {
            return TransportError::Other(format!("more than {MAX_REDIRECTS} redirects"));
        }

        if error.is_body() || error.is_decode() {
            return TransportError::Body(error.to_string());
        }

        TransportError::Other(error.to_string())
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn execute(&self, request: &OutgoingRequest) -> Result<ApiResponse, TransportError> {
        let timeout_ms = u64::try_from(request.timeout.as_millis()).unwrap_or(u64::MAX);
        let started = Instant::now();

        let mut builder = self
            .client
            .request(Self::to_reqwest_method(request.method), request.url.clone())
            .timeout(request.timeout);
        for header in request.headers.iter() {
            builder = builder.header(header.name.as_str(), header.value.as_str());
        }
        if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }

        let response = builder
            .send()
            .await
            .map_err(|e| Self::map_error(&e, timeout_ms))?;

        let status = response.status().as_u16();
        let headers: Headers = response
            .headers()
            .iter()
            .map(|(name, value)| {
                centinela_domain::Header::new(
                    name.as_str(),
                    value.to_str().unwrap_or("<binary>"),
                )
            })
            .collect();

        let body = response
            .bytes()
            .await
            .map_err(|e| Self::map_error(&e, timeout_ms))?
            .to_vec();

        Ok(ApiResponse::new(status, headers, body, started.elapsed()))
    }
}
