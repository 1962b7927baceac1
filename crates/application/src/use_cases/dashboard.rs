//! Dashboard landing page data.

use centinela_domain::ApiRequest;
use centinela_domain::admin::DashboardStats;

use crate::client::ApiClient;
use crate::error::ClientResult;

/// Typed access to the dashboard summary endpoints.
#[derive(Debug, Clone)]
pub struct DashboardService {
    client: ApiClient,
}

impl DashboardService {
    /// Creates the service.
    #[must_use]
    pub const fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// User counters.
    ///
    /// # Errors
    ///
    /// Returns the client error of the underlying request.
    pub async fn stats(&self) -> ClientResult<DashboardStats> {
        self.client
            .execute_json(ApiRequest::get("/api/admin/dashboard/stats").authenticated())
            .await
    }

    /// Checks that the backend accepts the current session. Returns the
    /// backend's message.
    ///
    /// # Errors
    ///
    /// Returns the client error of the underlying request.
    pub async fn test_connection(&self) -> ClientResult<String> {
        let response = self
            .client
            .send(ApiRequest::get("/api/admin/test").authenticated())
            .await?;
        Ok(response.text())
    }
}
