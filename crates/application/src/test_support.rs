//! Scripted collaborators for unit tests.

#![allow(clippy::unwrap_used)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use centinela_domain::{ApiResponse, Headers};

use crate::auth::InMemoryCredentialStore;
use crate::client::ApiClient;
use crate::config::ClientConfig;
use crate::ports::{HttpTransport, OutgoingRequest, TransportError};

/// Answers `"METHOD /path"` keys with canned responses; anything else is 404.
#[derive(Default)]
pub struct ScriptedTransport {
    routes: Mutex<HashMap<String, Result<(u16, String), TransportError>>>,
    requests: Mutex<Vec<OutgoingRequest>>,
}

impl ScriptedTransport {
    pub fn respond(&self, route: &str, status: u16, body: &str) {
        self.routes
            .lock()
            .unwrap()
            .insert(route.to_string(), Ok((status, body.to_string())));
    }

    pub fn fail(&self, route: &str, error: TransportError) {
        self.routes
            .lock()
            .unwrap()
            .insert(route.to_string(), Err(error));
    }

    pub fn requests(&self) -> Vec<OutgoingRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn last(&self) -> OutgoingRequest {
        self.requests().pop().unwrap()
    }
}

#[async_trait]
impl HttpTransport for ScriptedTransport {
    async fn execute(&self, request: &OutgoingRequest) -> Result<ApiResponse, TransportError> {
        self.requests.lock().unwrap().push(request.clone());
        let key = format!("{} {}", request.method, request.path());
        let route = self.routes.lock().unwrap().get(&key).cloned();
        let (status, body) = route.unwrap_or_else(|| Ok((404, String::new())))?;
        Ok(ApiResponse::new(
            status,
            Headers::default(),
            body.into_bytes(),
            std::time::Duration::ZERO,
        ))
    }
}

pub fn client() -> (ApiClient, Arc<ScriptedTransport>, Arc<InMemoryCredentialStore>) {
    let transport = Arc::new(ScriptedTransport::default());
    let credentials = Arc::new(InMemoryCredentialStore::new());
    let client = ApiClient::new(
        ClientConfig::new("http://backend.test"),
        transport.clone(),
        credentials.clone(),
    )
    .unwrap();
    (client, transport, credentials)
}
