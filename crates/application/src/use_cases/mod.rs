//! Application use cases: typed wrappers over the backend endpoints.

mod alerts;
mod auth;
mod dashboard;
mod geography;
mod users;

pub use alerts::{AlertsService, DEFAULT_ALERT_SORT};
pub use auth::{AuthService, LoginError};
pub use dashboard::DashboardService;
pub use geography::GeographyService;
pub use users::{DEFAULT_USER_SORT, UsersService};
