//! Refresh coordination state.
//!
//! The coordinator owns the access token slot and the refresh queue. All
//! transitions happen under one mutex; when both are needed the state lock
//! is taken before the token lock.

use std::collections::VecDeque;
use std::future::Future;

use centinela_domain::{ApiRequest, ApiResponse};
use chrono::{DateTime, Utc};
use tokio::sync::{Mutex, oneshot};
use tracing::warn;
use uuid::Uuid;

use super::events::{RefreshPhase, SessionStatus};
use super::token_store::TokenStore;
use crate::error::{ClientError, ClientResult, RefreshFailure};
use crate::ports::CredentialStoreError;

/// Why a refresh cycle failed.
#[derive(Debug, Clone)]
pub(crate) enum RefreshError {
    /// No durable refresh token was available.
    MissingRefreshToken,
    /// The refresh call failed.
    Failed(RefreshFailure),
}

impl From<RefreshError> for ClientError {
    fn from(error: RefreshError) -> Self {
        match error {
            RefreshError::MissingRefreshToken => Self::Unauthenticated,
            RefreshError::Failed(failure) => Self::RefreshFailed(failure),
        }
    }
}

impl std::fmt::Display for RefreshError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingRefreshToken => f.write_str("no refresh token stored"),
            Self::Failed(failure) => failure.fmt(f),
        }
    }
}

/// A request parked until the in-flight refresh settles.
#[derive(Debug)]
pub(crate) struct PendingRequest {
    pub id: Uuid,
    pub request: ApiRequest,
    pub responder: oneshot::Sender<ClientResult<ApiResponse>>,
}

/// An entry of the refresh queue.
#[derive(Debug)]
pub(crate) enum Pending {
    /// Replay the request with the new token.
    Replay(PendingRequest),
    /// Only report the outcome of the refresh.
    Notify(oneshot::Sender<ClientResult<()>>),
}

/// Outcome of reporting an authentication failure.
#[derive(Debug)]
pub(crate) enum Admission<T> {
    /// The token changed after the request left; replay it right away.
    ReplayNow(ApiRequest),
    /// Parked; await the receiver. `start_cycle` is set for the caller that
    /// moved the coordinator into `Refreshing`.
    Queued {
        receiver: oneshot::Receiver<ClientResult<T>>,
        start_cycle: bool,
    },
}

/// Entries released by a settled cycle.
#[derive(Debug)]
pub(crate) struct Settled {
    pub pending: Vec<Pending>,
    /// A login or logout replaced the session while the cycle ran.
    pub superseded: bool,
}

#[derive(Debug, Default)]
struct RefreshState {
    phase: RefreshPhase,
    queue: VecDeque<Pending>,
    generation: u64,
    cycle_generation: u64,
    last_refreshed_at: Option<DateTime<Utc>>,
}

impl RefreshState {
    fn push(&mut self, pending: Pending) -> bool {
        self.queue.push_back(pending);
        if self.phase == RefreshPhase::Refreshing {
            return false;
        }
        self.phase = RefreshPhase::Refreshing;
        self.cycle_generation = self.generation;
        true
    }

    fn settle(&mut self) -> Settled {
        self.phase = RefreshPhase::Idle;
        Settled {
            pending: self.queue.drain(..).collect(),
            superseded: self.generation != self.cycle_generation,
        }
    }
}

/// Single-flight refresh state machine.
#[derive(Debug, Default)]
pub(crate) struct RefreshCoordinator {
    state: Mutex<RefreshState>,
    tokens: TokenStore,
}

impl RefreshCoordinator {
    pub(crate) fn new(tokens: TokenStore) -> Self {
        Self {
            state: Mutex::default(),
            tokens,
        }
    }

    pub(crate) const fn tokens(&self) -> &TokenStore {
        &self.tokens
    }

    /// Reads the generation and the token as one consistent pair.
    pub(crate) async fn snapshot(&self) -> (u64, Option<String>) {
        let state = self.state.lock().await;
        (state.generation, self.tokens.get().await)
    }

    /// Parks a request that failed authentication with the token of `generation`.
    pub(crate) async fn admit_request(
        &self,
        request: ApiRequest,
        generation: u64,
    ) -> Admission<ApiResponse> {
        let mut state = self.state.lock().await;
        if state.phase == RefreshPhase::Idle && state.generation != generation {
            return Admission::ReplayNow(request);
        }
        let (responder, receiver) = oneshot::channel();
        let start_cycle = state.push(Pending::Replay(PendingRequest {
            id: Uuid::now_v7(),
            request,
            responder,
        }));
        Admission::Queued {
            receiver,
            start_cycle,
        }
    }

    /// Joins the in-flight refresh or starts one, without a request to replay.
    pub(crate) async fn admit_waiter(&self) -> Admission<()> {
        let mut state = self.state.lock().await;
        let (responder, receiver) = oneshot::channel();
        let start_cycle = state.push(Pending::Notify(responder));
        Admission::Queued {
            receiver,
            start_cycle,
        }
    }

    /// Installs the refreshed token and releases the queue.
    ///
    /// `persist` runs under the state lock, and only when no login or logout
    /// replaced the session while the cycle ran.
    pub(crate) async fn complete_success<F>(&self, token: String, persist: F) -> Settled
    where
        F: Future<Output = Result<(), CredentialStoreError>>,
    {
        let mut state = self.state.lock().await;
        let settled = state.settle();
        if !settled.superseded {
            if let Err(error) = persist.await {
                warn!(%error, "failed to persist rotated refresh token");
            }
            self.tokens.set(token).await;
            state.generation += 1;
            state.last_refreshed_at = Some(Utc::now());
        }
        settled
    }

    /// Drops the access token, runs `persist` to clear durable credentials and
    /// releases the queue. A superseded cycle leaves the session untouched.
    pub(crate) async fn complete_failure<F>(&self, persist: F) -> Settled
    where
        F: Future<Output = Result<(), CredentialStoreError>>,
    {
        let mut state = self.state.lock().await;
        let settled = state.settle();
        if !settled.superseded {
            self.tokens.clear().await;
            if let Err(error) = persist.await {
                warn!(%error, "failed to clear stored credentials");
            }
            state.generation += 1;
        }
        settled
    }

    /// Replaces the access token outside a refresh cycle (login, logout).
    ///
    /// `persist` runs under the state lock so a refresh cycle never observes
    /// a half-installed session.
    pub(crate) async fn install<F>(&self, token: Option<String>, persist: F) -> Result<(), CredentialStoreError>
    where
        F: Future<Output = Result<(), CredentialStoreError>>,
    {
        let mut state = self.state.lock().await;
        let persisted = persist.await;
        match token {
            Some(token) => self.tokens.set(token).await,
            None => self.tokens.clear().await,
        }
        state.generation += 1;
        persisted
    }

    pub(crate) async fn status(&self) -> SessionStatus {
        let state = self.state.lock().await;
        SessionStatus {
            has_access_token: self.tokens.is_set().await,
            phase: state.phase,
            queued: state.queue.len(),
            generation: state.generation,
            last_refreshed_at: state.last_refreshed_at,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::sync::atomic::{AtomicBool, Ordering};

    async fn persisted() -> Result<(), CredentialStoreError> {
        Ok(())
    }

    fn queued<T>(admission: Admission<T>) -> (oneshot::Receiver<ClientResult<T>>, bool) {
        match admission {
            Admission::Queued {
                receiver,
                start_cycle,
            } => (receiver, start_cycle),
            Admission::ReplayNow(_) => panic!("expected the request to be queued"),
        }
    }

    #[tokio::test]
    async fn test_only_first_failure_starts_a_cycle() {
        let coordinator = RefreshCoordinator::default();
        let (generation, _) = coordinator.snapshot().await;

        let (_first, start) = queued(
            coordinator
                .admit_request(ApiRequest::get("/api/a"), generation)
                .await,
        );
        assert!(start);
        let (_second, start) = queued(
            coordinator
                .admit_request(ApiRequest::get("/api/b"), generation)
                .await,
        );
        assert!(!start);
        let (_waiter, start) = queued(coordinator.admit_waiter().await);
        assert!(!start);

        let status = coordinator.status().await;
        assert_eq!(status.phase, RefreshPhase::Refreshing);
        assert_eq!(status.queued, 3);
    }

    #[tokio::test]
    async fn test_success_installs_token_and_drains_in_order() {
        let coordinator = RefreshCoordinator::default();
        let (generation, _) = coordinator.snapshot().await;
        for path in ["/api/1", "/api/2", "/api/3"] {
            let _ = coordinator
                .admit_request(ApiRequest::get(path), generation)
                .await;
        }

        let settled = coordinator
            .complete_success("fresh".to_string(), persisted())
            .await;
        assert!(!settled.superseded);
        let paths: Vec<_> = settled
            .pending
            .iter()
            .map(|pending| match pending {
                Pending::Replay(entry) => entry.request.path.clone(),
                Pending::Notify(_) => String::new(),
            })
            .collect();
        assert_eq!(paths, vec!["/api/1", "/api/2", "/api/3"]);

        let (new_generation, token) = coordinator.snapshot().await;
        assert_eq!(new_generation, generation + 1);
        assert_eq!(token.as_deref(), Some("fresh"));
        let status = coordinator.status().await;
        assert_eq!(status.phase, RefreshPhase::Idle);
        assert_eq!(status.queued, 0);
        assert!(status.last_refreshed_at.is_some());
    }

    #[tokio::test]
    async fn test_stale_generation_replays_without_refresh() {
        let coordinator = RefreshCoordinator::default();
        let (generation, _) = coordinator.snapshot().await;
        coordinator
            .install(Some("newer".to_string()), persisted())
            .await
            .unwrap();

        let admission = coordinator
            .admit_request(ApiRequest::get("/api/a"), generation)
            .await;
        assert!(matches!(admission, Admission::ReplayNow(_)));
        assert_eq!(coordinator.status().await.phase, RefreshPhase::Idle);
    }

    #[tokio::test]
    async fn test_failure_clears_token() {
        let coordinator = RefreshCoordinator::default();
        coordinator
            .install(Some("old".to_string()), persisted())
            .await
            .unwrap();
        let (generation, _) = coordinator.snapshot().await;
        let _ = coordinator
            .admit_request(ApiRequest::get("/api/a"), generation)
            .await;

        let settled = coordinator.complete_failure(persisted()).await;
        assert!(!settled.superseded);
        assert_eq!(settled.pending.len(), 1);
        assert_eq!(coordinator.tokens().get().await, None);
    }

    #[tokio::test]
    async fn test_login_during_cycle_supersedes_it() {
        let coordinator = RefreshCoordinator::default();
        let (generation, _) = coordinator.snapshot().await;
        let _ = coordinator.admit_waiter().await;
        coordinator
            .install(Some("from-login".to_string()), persisted())
            .await
            .unwrap();

        let settled = coordinator.complete_failure(persisted()).await;
        assert!(settled.superseded);
        let (current, token) = coordinator.snapshot().await;
        assert_eq!(current, generation + 1);
        assert_eq!(token.as_deref(), Some("from-login"));
    }

    #[tokio::test]
    async fn test_superseded_success_keeps_logout() {
        let coordinator = RefreshCoordinator::default();
        let _ = coordinator.admit_waiter().await;
        coordinator.install(None, persisted()).await.unwrap();

        let ran = AtomicBool::new(false);
        let settled = coordinator
            .complete_success("late".to_string(), async {
                ran.store(true, Ordering::SeqCst);
                Ok(())
            })
            .await;
        assert!(settled.superseded);
        assert!(!ran.load(Ordering::SeqCst));
        assert_eq!(coordinator.tokens().get().await, None);
    }
}
