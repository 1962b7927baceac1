//! Payloads of the administrative resource endpoints

mod alerts;
mod dashboard;
mod geography;
mod page;
mod users;

pub use alerts::{Alert, AlertKind, AlertStats, AlertStatsFilter, AlertStatus, SectorCount};
pub use dashboard::DashboardStats;
pub use geography::{City, CityNode, Commune, CommuneNode, Sector, Villa};
pub use page::{Page, SortDirection};
pub use users::{AdminUser, NewUser, RoleChange, UserUpdate, VerificationChange};
