//! User administration.

use centinela_domain::admin::{
    AdminUser, NewUser, Page, RoleChange, Sector, SortDirection, UserUpdate, VerificationChange,
};
use centinela_domain::{ApiRequest, Role};

use crate::client::ApiClient;
use crate::error::ClientResult;

const USERS: &str = "/api/admin/users";

/// Default sort column of the recent-users listing.
pub const DEFAULT_USER_SORT: &str = "fechaRegistro";

/// Typed access to `/api/admin/users`.
#[derive(Debug, Clone)]
pub struct UsersService {
    client: ApiClient,
}

impl UsersService {
    /// Creates the service.
    #[must_use]
    pub const fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Lists users, most recent registrations first by default.
    ///
    /// # Errors
    ///
    /// Returns the client error of the underlying request.
    pub async fn recent(
        &self,
        page: u32,
        size: u32,
        sort_by: &str,
        sort_dir: SortDirection,
    ) -> ClientResult<Page<AdminUser>> {
        let request = ApiRequest::get(format!("{USERS}/recent"))
            .authenticated()
            .with_query("page", page)
            .with_query("size", size)
            .with_query("sortBy", sort_by)
            .with_query("sortDir", sort_dir);
        self.client.execute_json(request).await
    }

    /// Searches users by name, email or RUT across all villas.
    ///
    /// # Errors
    ///
    /// Returns the client error of the underlying request.
    pub async fn search(&self, query: &str, page: u32, size: u32) -> ClientResult<Page<AdminUser>> {
        let request = ApiRequest::get(format!("{USERS}/search-global"))
            .authenticated()
            .with_query("query", query)
            .with_query("page", page)
            .with_query("size", size);
        self.client.execute_json(request).await
    }

    /// Fetches one user.
    ///
    /// # Errors
    ///
    /// Returns the client error of the underlying request.
    pub async fn get(&self, id: i64) -> ClientResult<AdminUser> {
        self.client
            .execute_json(ApiRequest::get(format!("{USERS}/{id}")).authenticated())
            .await
    }

    /// Creates a user.
    ///
    /// # Errors
    ///
    /// Returns the client error of the underlying request.
    pub async fn create(&self, user: &NewUser) -> ClientResult<AdminUser> {
        let request = ApiRequest::post(USERS).authenticated().with_json(user)?;
        self.client.execute_json(request).await
    }

    /// Updates the given fields of a user.
    ///
    /// # Errors
    ///
    /// Returns the client error of the underlying request.
    pub async fn update(&self, id: i64, update: &UserUpdate) -> ClientResult<AdminUser> {
        let request = ApiRequest::put(format!("{USERS}/{id}"))
            .authenticated()
            .with_json(update)?;
        self.client.execute_json(request).await
    }

    /// Flips the verification flag, optionally assigning a sector.
    ///
    /// # Errors
    ///
    /// Returns the client error of the underlying request.
    pub async fn toggle_verification(&self, id: i64, sector: Option<&str>) -> ClientResult<AdminUser> {
        let change = VerificationChange {
            sector: sector.map(str::to_string),
        };
        let request = ApiRequest::put(format!("{USERS}/{id}/verification"))
            .authenticated()
            .with_json(&change)?;
        self.client.execute_json(request).await
    }

    /// Enables or disables the account.
    ///
    /// # Errors
    ///
    /// Returns the client error of the underlying request.
    pub async fn toggle_account_status(&self, id: i64) -> ClientResult<AdminUser> {
        self.client
            .execute_json(ApiRequest::put(format!("{USERS}/{id}/status")).authenticated())
            .await
    }

    /// Changes the role of a user.
    ///
    /// # Errors
    ///
    /// Returns the client error of the underlying request.
    pub async fn change_role(&self, id: i64, role: Role) -> ClientResult<AdminUser> {
        let request = ApiRequest::put(format!("{USERS}/{id}/role"))
            .authenticated()
            .with_json(&RoleChange { role })?;
        self.client.execute_json(request).await
    }

    /// Deletes a user.
    ///
    /// # Errors
    ///
    /// Returns the client error of the underlying request.
    pub async fn delete(&self, id: i64) -> ClientResult<()> {
        self.client
            .send(ApiRequest::delete(format!("{USERS}/{id}")).authenticated())
            .await
            .map(|_| ())
    }

    /// Lists the sectors an administrator may assign.
    ///
    /// # Errors
    ///
    /// Returns the client error of the underlying request.
    pub async fn sectors(&self) -> ClientResult<Vec<Sector>> {
        self.client
            .execute_json(ApiRequest::get("/api/admin/sectores").authenticated())
            .await
    }
}
