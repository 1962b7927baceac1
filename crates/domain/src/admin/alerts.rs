//! Alert monitoring payloads.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Lifecycle state of an alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AlertStatus {
    /// Raised and not yet handled
    Activa,
    /// Being handled
    EnProceso,
    /// Handled
    Atendida,
    /// Closed as resolved
    Resuelta,
    /// Marked as a false alarm
    Falsa,
    /// A state this client does not know about
    #[serde(other)]
    Unknown,
}

impl AlertStatus {
    /// Whether the alert still needs attention.
    #[must_use]
    pub const fn is_open(self) -> bool {
        matches!(self, Self::Activa | Self::EnProceso)
    }
}

/// Category of an alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AlertKind {
    /// Generic emergency
    Emergencia,
    /// Robbery
    Robo,
    /// Fire
    Incendio,
    /// Suspicious activity
    Sospechoso,
    /// Vandalism
    Vandalismo,
    /// A category this client does not know about
    #[serde(other)]
    Unknown,
}

/// An alert raised by a resident.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Alert {
    /// Alert id
    #[serde(rename = "alertaId", alias = "id")]
    pub id: i64,
    /// Category
    #[serde(rename = "tipo")]
    pub kind: AlertKind,
    /// Category title shown to admins
    #[serde(default, rename = "tipoTitulo")]
    pub title: Option<String>,
    /// Category description
    #[serde(default, rename = "tipoDescripcion")]
    pub description: Option<String>,
    /// Lifecycle state
    #[serde(rename = "estado")]
    pub status: AlertStatus,
    /// Raised silently (no siren)
    #[serde(default, rename = "silenciosa")]
    pub silent: bool,
    /// Timestamp as sent by the backend
    #[serde(default, rename = "fechaHora")]
    pub raised_at: Option<String>,
    /// Name of the resident who raised it
    #[serde(default, rename = "nombreUsuario")]
    pub raised_by: Option<String>,
    /// Sector
    #[serde(default)]
    pub sector: Option<String>,
    /// Latitude
    #[serde(default, rename = "latitud")]
    pub latitude: Option<f64>,
    /// Longitude
    #[serde(default, rename = "longitud")]
    pub longitude: Option<f64>,
}

/// Number of alerts in one sector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectorCount {
    /// Sector name
    pub sector: String,
    /// Alert count
    #[serde(rename = "cantidad")]
    pub count: u64,
}

/// Aggregated alert statistics.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AlertStats {
    /// Total alerts in range
    #[serde(rename = "totalAlertas")]
    pub total: u64,
    /// Share of silent alerts, in percent
    #[serde(rename = "porcentajeSilenciosas")]
    pub silent_percentage: f64,
    /// Counts per category
    #[serde(rename = "alertasPorTipo")]
    pub by_kind: BTreeMap<String, u64>,
    /// Counts per state
    #[serde(rename = "alertasPorEstado")]
    pub by_status: BTreeMap<String, u64>,
    /// Counts per day
    #[serde(rename = "alertasPorDia")]
    pub by_day: BTreeMap<String, u64>,
    /// Counts per hour of day
    #[serde(rename = "alertasPorHora")]
    pub by_hour: BTreeMap<String, u64>,
    /// Sectors with most alerts
    #[serde(rename = "topSectores")]
    pub top_sectors: Vec<SectorCount>,
}

impl AlertStats {
    /// Share of all alerts that happened in `sector`, in percent.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn sector_share(&self, sector: &str) -> Option<f64> {
        if self.total == 0 {
            return None;
        }
        self.top_sectors
            .iter()
            .find(|s| s.sector == sector)
            .map(|s| s.count as f64 * 100.0 / self.total as f64)
    }
}

/// Filters for `GET /api/alertas/stats`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AlertStatsFilter {
    /// Restrict to one villa
    pub villa_id: Option<i64>,
    /// Restrict to one sector
    pub sector: Option<String>,
    /// First day included
    pub from: Option<NaiveDate>,
    /// Last day included
    pub to: Option<NaiveDate>,
}
