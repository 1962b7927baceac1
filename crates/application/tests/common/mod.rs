//! In-process backend for the refresh coordination tests.
#![allow(clippy::unwrap_used, clippy::expect_used, dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use centinela_application::ports::{CredentialStore, HttpTransport, OutgoingRequest, TransportError};
use centinela_application::{ApiClient, ClientConfig, InMemoryCredentialStore};
use centinela_domain::{ApiResponse, Headers, Role, Session, UserProfile};
use tokio::sync::Semaphore;

/// One request seen by the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
    pub method: String,
    pub path: String,
    pub bearer: Option<String>,
}

/// Resources answer 200 for the currently valid token and `reject_status`
/// otherwise. The refresh endpoint issues `next_token`.
pub struct MockBackend {
    valid_token: Mutex<Option<String>>,
    next_token: Mutex<String>,
    rotated_refresh_token: Mutex<Option<String>>,
    refresh_status: Mutex<u16>,
    reject_status: Mutex<u16>,
    always_reject: Mutex<HashSet<String>>,
    refresh_gate: Mutex<Option<Arc<Semaphore>>>,
    path_gates: Mutex<HashMap<String, Arc<Semaphore>>>,
    refresh_calls: AtomicUsize,
    calls: Mutex<Vec<Call>>,
}

impl Default for MockBackend {
    fn default() -> Self {
        Self {
            valid_token: Mutex::new(Some("access-valid-0001".to_string())),
            next_token: Mutex::new("access-fresh-0002".to_string()),
            rotated_refresh_token: Mutex::new(None),
            refresh_status: Mutex::new(200),
            reject_status: Mutex::new(401),
            always_reject: Mutex::default(),
            refresh_gate: Mutex::new(None),
            path_gates: Mutex::default(),
            refresh_calls: AtomicUsize::new(0),
            calls: Mutex::default(),
        }
    }
}

impl MockBackend {
    pub fn set_refresh_status(&self, status: u16) {
        *self.refresh_status.lock().unwrap() = status;
    }

    pub fn set_reject_status(&self, status: u16) {
        *self.reject_status.lock().unwrap() = status;
    }

    pub fn rotate_refresh_token(&self, token: &str) {
        *self.rotated_refresh_token.lock().unwrap() = Some(token.to_string());
    }

    pub fn next_token(&self) -> String {
        self.next_token.lock().unwrap().clone()
    }

    /// `path` answers 401 whatever the token.
    pub fn always_reject(&self, path: &str) {
        self.always_reject.lock().unwrap().insert(path.to_string());
    }

    /// Holds refresh calls until the returned semaphore gets a permit.
    pub fn hold_refresh(&self) -> Arc<Semaphore> {
        let gate = Arc::new(Semaphore::new(0));
        *self.refresh_gate.lock().unwrap() = Some(gate.clone());
        gate
    }

    /// Holds requests to `path` (after recording them) until released.
    pub fn hold_path(&self, path: &str) -> Arc<Semaphore> {
        let gate = Arc::new(Semaphore::new(0));
        self.path_gates
            .lock()
            .unwrap()
            .insert(path.to_string(), gate.clone());
        gate
    }

    pub fn refresh_calls(&self) -> usize {
        self.refresh_calls.load(Ordering::SeqCst)
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    /// Resource calls (not login/refresh) that carried `token`, in order.
    pub fn paths_with_token(&self, token: &str) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|call| !call.path.starts_with("/api/auth/"))
            .filter(|call| call.bearer.as_deref() == Some(token))
            .map(|call| call.path)
            .collect()
    }

    fn record(&self, request: &OutgoingRequest) {
        self.calls.lock().unwrap().push(Call {
            method: request.method.to_string(),
            path: request.path().to_string(),
            bearer: request.bearer_token().map(str::to_string),
        });
    }

    async fn refresh(&self) -> (u16, String) {
        self.refresh_calls.fetch_add(1, Ordering::SeqCst);
        let gate = self.refresh_gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.acquire().await.expect("gate closed").forget();
        }
        let status = *self.refresh_status.lock().unwrap();
        if status != 200 {
            return (status, r#"{"error": "invalid refresh token"}"#.to_string());
        }
        let token = self.next_token();
        *self.valid_token.lock().unwrap() = Some(token.clone());
        let body = match self.rotated_refresh_token.lock().unwrap().clone() {
            Some(rotated) => serde_json::json!({"accessToken": token, "refreshToken": rotated}),
            None => serde_json::json!({"accessToken": token}),
        };
        (200, body.to_string())
    }

    async fn resource(&self, request: &OutgoingRequest) -> (u16, String) {
        let path = request.path().to_string();
        let gate = self.path_gates.lock().unwrap().get(&path).cloned();
        if let Some(gate) = gate {
            gate.acquire().await.expect("gate closed").forget();
        }
        if self.always_reject.lock().unwrap().contains(&path) {
            return (401, String::new());
        }
        let valid = self.valid_token.lock().unwrap().clone();
        match (request.bearer_token(), valid) {
            (Some(bearer), Some(valid)) if bearer == valid => (
                200,
                serde_json::json!({"path": path, "token": bearer}).to_string(),
            ),
            _ => (*self.reject_status.lock().unwrap(), String::new()),
        }
    }
}

#[async_trait]
impl HttpTransport for MockBackend {
    async fn execute(&self, request: &OutgoingRequest) -> Result<ApiResponse, TransportError> {
        self.record(request);
        let (status, body) = match request.path() {
            "/api/auth/refresh" => self.refresh().await,
            "/api/auth/login" => {
                *self.valid_token.lock().unwrap() = Some("access-login-0003".to_string());
                (
                    200,
                    r#"{"accessToken": "access-login-0003", "refreshToken": "refresh-login-0003",
                        "role": "SUPER_ADMIN", "userId": 1}"#
                        .to_string(),
                )
            }
            _ => self.resource(request).await,
        };
        Ok(ApiResponse::new(
            status,
            Headers::default(),
            body.into_bytes(),
            Duration::from_millis(1),
        ))
    }
}

pub struct Harness {
    pub client: ApiClient,
    pub backend: Arc<MockBackend>,
    pub credentials: Arc<InMemoryCredentialStore>,
}

pub fn admin() -> UserProfile {
    UserProfile {
        user_id: Some(1),
        email: "root@centinela.cl".to_string(),
        role: Role::SuperAdmin,
        is_admin: true,
        first_name: String::new(),
        last_name: String::new(),
        sector: String::new(),
        villa_id: None,
        villa_name: String::new(),
    }
}

/// A client with a stored refresh token and no access token, as after a
/// restart.
pub async fn restarted_harness(config: ClientConfig) -> Harness {
    let backend = Arc::new(MockBackend::default());
    let credentials = Arc::new(InMemoryCredentialStore::new());
    credentials
        .save_refresh_token("refresh-stored-0001")
        .await
        .unwrap();
    let client = ApiClient::new(config, backend.clone(), credentials.clone()).unwrap();
    Harness {
        client,
        backend,
        credentials,
    }
}

/// A client holding a stale access token and a stored refresh token.
pub async fn harness(config: ClientConfig) -> Harness {
    let h = restarted_harness(config).await;
    h.client
        .begin_session(Session {
            access_token: "access-stale-0000".to_string(),
            refresh_token: "refresh-stored-0001".to_string(),
            user: admin(),
        })
        .await
        .unwrap();
    h
}

pub fn config() -> ClientConfig {
    ClientConfig::new("http://backend.test")
}

/// Waits until `queued` requests wait on the in-flight refresh.
pub async fn wait_for_queue(client: &ApiClient, queued: usize) {
    tokio::time::timeout(Duration::from_secs(5), async {
        while client.session_status().await.queued < queued {
            tokio::time::sleep(Duration::from_millis(2)).await;
        }
    })
    .await
    .expect("requests never queued");
}

/// Waits until the backend saw a call to `path`.
pub async fn wait_for_call(backend: &MockBackend, path: &str) {
    tokio::time::timeout(Duration::from_secs(5), async {
        while !backend.calls().iter().any(|call| call.path == path) {
            tokio::time::sleep(Duration::from_millis(2)).await;
        }
    })
    .await
    .expect("call never arrived");
}
