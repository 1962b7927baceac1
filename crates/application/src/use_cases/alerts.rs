//! Alert monitoring.

use centinela_domain::ApiRequest;
use centinela_domain::admin::{Alert, AlertStats, AlertStatsFilter, Page, SortDirection};

use crate::client::ApiClient;
use crate::error::ClientResult;

/// Default sort column of the alert listing.
pub const DEFAULT_ALERT_SORT: &str = "fechaHora";

/// Typed access to `/api/alertas`.
#[derive(Debug, Clone)]
pub struct AlertsService {
    client: ApiClient,
}

impl AlertsService {
    /// Creates the service.
    #[must_use]
    pub const fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Aggregated statistics; unset filters are left out of the query.
    ///
    /// # Errors
    ///
    /// Returns the client error of the underlying request.
    pub async fn stats(&self, filter: &AlertStatsFilter) -> ClientResult<AlertStats> {
        let request = ApiRequest::get("/api/alertas/stats")
            .authenticated()
            .with_optional_query("villaId", filter.villa_id)
            .with_optional_query("sector", filter.sector.as_deref())
            .with_optional_query("fechaInicio", filter.from)
            .with_optional_query("fechaFin", filter.to);
        self.client.execute_json(request).await
    }

    /// The latest alerts shown on the dashboard.
    ///
    /// # Errors
    ///
    /// Returns the client error of the underlying request.
    pub async fn recent(&self, limit: u32) -> ClientResult<Vec<Alert>> {
        let request = ApiRequest::get("/api/alertas/recientes-dashboard")
            .authenticated()
            .with_query("limit", limit);
        self.client.execute_json(request).await
    }

    /// One page of all alerts.
    ///
    /// # Errors
    ///
    /// Returns the client error of the underlying request.
    pub async fn list(
        &self,
        page: u32,
        size: u32,
        sort_by: &str,
        sort_dir: SortDirection,
    ) -> ClientResult<Page<Alert>> {
        let request = ApiRequest::get("/api/alertas")
            .authenticated()
            .with_query("page", page)
            .with_query("size", size)
            .with_query("sortBy", sort_by)
            .with_query("sortDir", sort_dir);
        self.client.execute_json(request).await
    }
}
