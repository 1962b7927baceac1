//! The authenticated API client.
//!
//! [`ApiClient`] sends requests through the [`RequestPipeline`], hands
//! authentication failures to the refresh coordinator and replays parked
//! requests once the single in-flight refresh settles.

use std::sync::Arc;
use std::time::Instant;

use centinela_domain::{
    ApiRequest, ApiResponse, AuthMode, RefreshRequest, RefreshResponse, token_preview,
};
use futures::future::join_all;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::sync::broadcast;
use tracing::{Instrument, debug, info, info_span, warn};
use uuid::Uuid;

use crate::auth::refresh::{Admission, Pending, RefreshCoordinator, RefreshError};
use crate::auth::{SessionEvent, SessionStatus, TokenStore};
use crate::config::{ClientConfig, ConfigError};
use crate::error::{ClientError, ClientResult, RefreshFailure};
use crate::pipeline::RequestPipeline;
use crate::ports::{CredentialStore, HttpTransport, StoredCredentials};

const EVENT_CAPACITY: usize = 16;

/// Authenticated client for the Centinela backend.
///
/// Cheap to clone; clones share the token, the refresh queue and the event
/// channel. Build one per application and hand clones to every call site.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    config: ClientConfig,
    pipeline: RequestPipeline,
    transport: Arc<dyn HttpTransport>,
    credentials: Arc<dyn CredentialStore>,
    coordinator: RefreshCoordinator,
    events: broadcast::Sender<SessionEvent>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.inner.config.base_url)
            .field("tokens", self.inner.coordinator.tokens())
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    /// Creates a client.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn new(
        config: ClientConfig,
        transport: Arc<dyn HttpTransport>,
        credentials: Arc<dyn CredentialStore>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Ok(Self {
            inner: Arc::new(ClientInner {
                pipeline: RequestPipeline::new(&config),
                config,
                transport,
                credentials,
                coordinator: RefreshCoordinator::new(TokenStore::new()),
                events,
            }),
        })
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    /// Returns a read-only view of the in-memory access token.
    ///
    /// Use [`Self::begin_session`] and [`Self::end_session`] to change it.
    #[must_use]
    pub fn tokens(&self) -> &TokenStore {
        self.inner.coordinator.tokens()
    }

    /// Returns the durable credential store.
    #[must_use]
    pub fn credentials(&self) -> &Arc<dyn CredentialStore> {
        &self.inner.credentials
    }

    /// Subscribes to session events.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.inner.events.subscribe()
    }

    /// Returns a diagnostic snapshot of the session.
    pub async fn session_status(&self) -> SessionStatus {
        self.inner.coordinator.status().await
    }

    /// Sends a request.
    ///
    /// Authentication failures are resolved transparently through a single
    /// shared refresh; the caller only sees them when the refresh fails or the
    /// refreshed token is rejected as well.
    ///
    /// # Errors
    ///
    /// Returns `Unauthenticated` for a `Required` request without any
    /// credentials, `RefreshFailed` when the session could not be renewed,
    /// `AuthenticationExpired` when a replayed request is rejected again,
    /// `RequestRejected` for other error statuses and `Network` for transport
    /// failures.
    #[tracing::instrument(
        name = "api_request",
        skip_all,
        fields(request_id = %Uuid::now_v7(), method = %request.method, path = %request.path)
    )]
    pub async fn send(&self, request: ApiRequest) -> ClientResult<ApiResponse> {
        let inner = &self.inner;
        request.validate()?;

        if request.auth == AuthMode::Required
            && !inner.coordinator.tokens().is_set().await
            && inner.credentials.load_refresh_token().await?.is_none()
        {
            return Err(ClientError::Unauthenticated);
        }

        let (generation, response) = inner.dispatch(&request).await?;
        if !request.auth.allows_refresh() || !inner.config.is_auth_failure(response.status) {
            return interpret(response);
        }

        debug!(status = response.status, generation, "authentication failure");
        match inner.coordinator.admit_request(request, generation).await {
            Admission::ReplayNow(request) => {
                debug!("token replaced since dispatch, replaying");
                inner.replay(&request).await
            }
            Admission::Queued {
                receiver,
                start_cycle,
            } => {
                if start_cycle {
                    ClientInner::spawn_cycle(&self.inner);
                }
                receiver
                    .await
                    .unwrap_or_else(|_| Err(ClientError::RefreshFailed(RefreshFailure::aborted())))
            }
        }
    }

    /// Sends a request and decodes the JSON response body.
    ///
    /// # Errors
    ///
    /// Returns the errors of [`Self::send`], or `Decode` if the body does not
    /// match `T`.
    pub async fn execute_json<T: DeserializeOwned>(&self, request: ApiRequest) -> ClientResult<T> {
        let response = self.send(request).await?;
        response
            .json()
            .map_err(|e| ClientError::Decode(format!("{e} (status {})", response.status)))
    }

    /// `GET path` decoding the response.
    ///
    /// # Errors
    ///
    /// See [`Self::execute_json`].
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        self.execute_json(ApiRequest::get(path)).await
    }

    /// `POST path` with a JSON body, decoding the response.
    ///
    /// # Errors
    ///
    /// See [`Self::execute_json`].
    pub async fn post_json<B, T>(&self, path: &str, body: &B) -> ClientResult<T>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        self.execute_json(ApiRequest::post(path).with_json(body)?)
            .await
    }

    /// `PUT path` with a JSON body, decoding the response.
    ///
    /// # Errors
    ///
    /// See [`Self::execute_json`].
    pub async fn put_json<B, T>(&self, path: &str, body: &B) -> ClientResult<T>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        self.execute_json(ApiRequest::put(path).with_json(body)?)
            .await
    }

    /// `DELETE path`, decoding the response.
    ///
    /// # Errors
    ///
    /// See [`Self::execute_json`].
    pub async fn delete_json<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        self.execute_json(ApiRequest::delete(path)).await
    }

    /// Renews the access token, joining a refresh already in flight.
    ///
    /// # Errors
    ///
    /// Returns `Unauthenticated` if no refresh token is stored, or
    /// `RefreshFailed` if the backend refused it. Either way the session has
    /// been torn down.
    pub async fn refresh_session(&self) -> ClientResult<()> {
        match self.inner.coordinator.admit_waiter().await {
            Admission::Queued {
                receiver,
                start_cycle,
            } => {
                if start_cycle {
                    ClientInner::spawn_cycle(&self.inner);
                }
                receiver
                    .await
                    .unwrap_or_else(|_| Err(ClientError::RefreshFailed(RefreshFailure::aborted())))
            }
            Admission::ReplayNow(_) => Ok(()),
        }
    }

    /// Installs a freshly issued session: the access token in memory, the
    /// refresh token and profile in durable storage.
    ///
    /// # Errors
    ///
    /// Returns `Storage` if the credentials could not be persisted. The access
    /// token is installed regardless.
    pub async fn begin_session(&self, session: centinela_domain::Session) -> ClientResult<()> {
        let stored = StoredCredentials {
            refresh_token: Some(session.refresh_token),
            user: Some(session.user.clone()),
            ..StoredCredentials::new()
        };
        self.inner
            .coordinator
            .install(Some(session.access_token), self.inner.credentials.save(&stored))
            .await?;
        info!(user_id = ?session.user.user_id, role = %session.user.role, "session started");
        self.inner.emit(SessionEvent::LoggedIn {
            user_id: session.user.user_id,
            role: session.user.role,
        });
        Ok(())
    }

    /// Destroys the session: the access token, the refresh token and the
    /// stored profile. Broadcasts [`SessionEvent::LoggedOut`].
    ///
    /// # Errors
    ///
    /// Returns `Storage` if the durable credentials could not be cleared. The
    /// access token is dropped regardless.
    pub async fn end_session(&self) -> ClientResult<()> {
        let cleared = self
            .inner
            .coordinator
            .install(None, self.inner.credentials.clear())
            .await;
        info!("session ended");
        self.inner.emit(SessionEvent::LoggedOut);
        cleared.map_err(ClientError::from)
    }
}

impl ClientInner {
    /// Sends once with the current token. Returns the token generation the
    /// request was sent with.
    async fn dispatch(&self, request: &ApiRequest) -> ClientResult<(u64, ApiResponse)> {
        let (generation, token) = self.coordinator.snapshot().await;
        let outgoing = self.pipeline.prepare(request, token.as_deref())?;

        let started = Instant::now();
        let result = self.transport.execute(&outgoing).await;
        let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

        match &result {
            Ok(response) => debug!(
                method = %outgoing.method,
                path = outgoing.path(),
                status = response.status,
                elapsed_ms,
                "response received"
            ),
            Err(error) => debug!(
                method = %outgoing.method,
                path = outgoing.path(),
                elapsed_ms,
                %error,
                "transport failed"
            ),
        }
        Ok((generation, result?))
    }

    /// Sends a request for the second and last time.
    async fn replay(&self, request: &ApiRequest) -> ClientResult<ApiResponse> {
        let (_, response) = self.dispatch(request).await?;
        if self.config.is_auth_failure(response.status) {
            warn!(
                path = %request.path,
                status = response.status,
                "request rejected again with a renewed token"
            );
            return Err(ClientError::AuthenticationExpired {
                status: response.status,
            });
        }
        interpret(response)
    }

    fn spawn_cycle(inner: &Arc<Self>) {
        let inner = Arc::clone(inner);
        let span = info_span!("refresh_cycle", cycle_id = %Uuid::now_v7());
        tokio::spawn(inner.run_refresh_cycle().instrument(span));
    }

    async fn run_refresh_cycle(self: Arc<Self>) {
        info!("refreshing access token");
        match self.request_new_token().await {
            Ok(RefreshResponse {
                access_token,
                refresh_token,
            }) => {
                let preview = token_preview(&access_token);
                let persist = async {
                    match &refresh_token {
                        Some(rotated) => self.credentials.save_refresh_token(rotated).await,
                        None => Ok(()),
                    }
                };
                let settled = self.coordinator.complete_success(access_token, persist).await;
                if settled.superseded {
                    info!("session replaced during refresh, keeping the new session");
                } else {
                    info!(
                        token_preview = %preview,
                        released = settled.pending.len(),
                        "access token refreshed"
                    );
                    self.emit(SessionEvent::TokenRefreshed {
                        token_preview: preview,
                    });
                }
                self.resume(settled.pending, &Ok(())).await;
            }
            Err(error) => {
                let settled = self
                    .coordinator
                    .complete_failure(self.credentials.clear())
                    .await;
                if settled.superseded {
                    warn!(%error, "refresh failed after the session was replaced");
                    self.resume(settled.pending, &Err(error)).await;
                    return;
                }
                warn!(
                    %error,
                    rejected = settled.pending.len(),
                    "refresh failed, session destroyed"
                );
                self.emit(SessionEvent::Expired {
                    reason: error.to_string(),
                });
                for pending in settled.pending {
                    match pending {
                        Pending::Replay(entry) => {
                            let _ = entry.responder.send(Err(error.clone().into()));
                        }
                        Pending::Notify(responder) => {
                            let _ = responder.send(Err(error.clone().into()));
                        }
                    }
                }
            }
        }
    }

    /// Answers waiters with `outcome`, then replays parked requests. Replays
    /// are sent in arrival order and run concurrently.
    async fn resume(&self, pending: Vec<Pending>, outcome: &Result<(), RefreshError>) {
        let mut replays = Vec::with_capacity(pending.len());
        for entry in pending {
            match entry {
                Pending::Notify(responder) => {
                    let _ = responder.send(outcome.clone().map_err(ClientError::from));
                }
                Pending::Replay(entry) => {
                    if entry.responder.is_closed() {
                        debug!(pending_id = %entry.id, "caller went away, skipping replay");
                        continue;
                    }
                    replays.push(async move {
                        debug!(pending_id = %entry.id, path = %entry.request.path, "replaying");
                        let result = self.replay(&entry.request).await;
                        let _ = entry.responder.send(result);
                    });
                }
            }
        }
        // first polls happen in order, so replays leave in arrival order
        join_all(replays).await;
    }

    async fn request_new_token(&self) -> Result<RefreshResponse, RefreshError> {
        let refresh_token = match self.credentials.load_refresh_token().await {
            Ok(Some(token)) => token,
            Ok(None) => return Err(RefreshError::MissingRefreshToken),
            Err(e) => {
                return Err(RefreshError::Failed(RefreshFailure::new(
                    None,
                    format!("credential store: {e}"),
                )));
            }
        };

        let request = ApiRequest::post(self.config.refresh_path.clone())
            .anonymous()
            .with_json(&RefreshRequest { refresh_token })
            .map_err(|e| RefreshError::Failed(RefreshFailure::new(None, e.to_string())))?;
        let mut outgoing = self
            .pipeline
            .prepare(&request, None)
            .map_err(|e| RefreshError::Failed(RefreshFailure::new(None, e.to_string())))?;
        let timeout = self.config.refresh_timeout;
        outgoing.timeout = timeout;

        let response = tokio::time::timeout(timeout, self.transport.execute(&outgoing))
            .await
            .map_err(|_| {
                RefreshError::Failed(RefreshFailure::timed_out(
                    u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
                ))
            })?
            .map_err(|e| RefreshError::Failed(RefreshFailure::new(None, e.to_string())))?;

        if !response.is_success() {
            let message = response
                .error_body()
                .and_then(|body| body.description().map(str::to_string))
                .unwrap_or_else(|| "refresh token rejected".to_string());
            return Err(RefreshError::Failed(RefreshFailure::rejected(
                response.status,
                message,
            )));
        }

        let body: RefreshResponse = response.json().map_err(|e| {
            RefreshError::Failed(RefreshFailure::new(
                Some(response.status),
                format!("malformed refresh response: {e}"),
            ))
        })?;
        if body.access_token.is_empty() {
            return Err(RefreshError::Failed(RefreshFailure::new(
                Some(response.status),
                "refresh response carried no access token",
            )));
        }
        Ok(body)
    }

    fn emit(&self, event: SessionEvent) {
        // No subscribers is fine.
        let _ = self.events.send(event);
    }
}

/// Maps an error status to `RequestRejected`; everything below 400 passes.
fn interpret(response: ApiResponse) -> ClientResult<ApiResponse> {
    if response.status < 400 {
        return Ok(response);
    }
    let body = response.error_body();
    let code = body.as_ref().and_then(|body| body.code.clone());
    let message = body
        .as_ref()
        .and_then(|body| body.description().map(str::to_string))
        .unwrap_or_else(|| {
            let text = response.text();
            let text = text.trim();
            if text.is_empty() {
                format!("HTTP {}", response.status)
            } else {
                text.to_string()
            }
        });
    Err(ClientError::RequestRejected {
        status: response.status,
        code,
        message,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use centinela_domain::Headers;
    use pretty_assertions::assert_eq;
    use std::time::Duration;

    fn response(status: u16, body: &str) -> ApiResponse {
        ApiResponse::new(
            status,
            Headers::default(),
            body.as_bytes().to_vec(),
            Duration::ZERO,
        )
    }

    #[test]
    fn test_interpret_passes_success() {
        let ok = interpret(response(204, "")).unwrap();
        assert_eq!(ok.status, 204);
    }

    #[test]
    fn test_interpret_extracts_error_body() {
        let error = interpret(response(
            409,
            r#"{"code": "EMAIL_TAKEN", "message": "El email ya existe"}"#,
        ))
        .unwrap_err();
        match error {
            ClientError::RequestRejected {
                status,
                code,
                message,
            } => {
                assert_eq!(status, 409);
                assert_eq!(code.as_deref(), Some("EMAIL_TAKEN"));
                assert_eq!(message, "El email ya existe");
            }
            other => unreachable!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_interpret_falls_back_to_text_and_status() {
        let error = interpret(response(502, "Bad Gateway")).unwrap_err();
        assert_eq!(error.to_string(), "request rejected with status 502: Bad Gateway");

        let error = interpret(response(500, "  ")).unwrap_err();
        assert_eq!(error.to_string(), "request rejected with status 500: HTTP 500");
    }
}
