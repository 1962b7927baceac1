//! User administration payloads.

use serde::{Deserialize, Serialize};

use crate::auth::Role;

/// A platform user as listed by the admin endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminUser {
    /// User id
    #[serde(rename = "usuarioId", alias = "id")]
    pub id: i64,
    /// Email
    #[serde(default)]
    pub email: String,
    /// Given name
    #[serde(default, rename = "nombre")]
    pub first_name: String,
    /// Family name
    #[serde(default, rename = "apellido")]
    pub last_name: String,
    /// National id (RUT)
    #[serde(default)]
    pub rut: Option<String>,
    /// Street address
    #[serde(default, rename = "direccion")]
    pub address: Option<String>,
    /// Role
    pub role: Role,
    /// Whether an administrator verified the account
    #[serde(default, rename = "verificado")]
    pub verified: bool,
    /// Whether the account is enabled
    #[serde(default, rename = "estadoCuenta")]
    pub active: bool,
    /// Sector within the villa
    #[serde(default)]
    pub sector: Option<String>,
    /// Villa id
    #[serde(default)]
    pub villa_id: Option<i64>,
    /// Villa name
    #[serde(default, rename = "villaNombre")]
    pub villa_name: Option<String>,
    /// Registration timestamp as sent by the backend
    #[serde(default, rename = "fechaRegistro")]
    pub registered_at: Option<String>,
    /// Home latitude
    #[serde(default, rename = "latitud")]
    pub latitude: Option<f64>,
    /// Home longitude
    #[serde(default, rename = "longitud")]
    pub longitude: Option<f64>,
}

/// Body of `POST /api/admin/users`.
#[derive(Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    /// Given name
    #[serde(rename = "nombre")]
    pub first_name: String,
    /// Family name
    #[serde(rename = "apellido")]
    pub last_name: String,
    /// Email
    pub email: String,
    /// National id (RUT)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rut: Option<String>,
    /// Initial password
    pub password: String,
    /// Street address
    #[serde(rename = "direccion", skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    /// Home latitude
    #[serde(rename = "latitud", skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    /// Home longitude
    #[serde(rename = "longitud", skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
    /// Sector
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sector: Option<String>,
    /// Role, `VECINO` for residents
    pub role: Role,
    /// Villa id
    #[serde(skip_serializing_if = "Option::is_none")]
    pub villa_id: Option<i64>,
}

impl std::fmt::Debug for NewUser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NewUser")
            .field("email", &self.email)
            .field("role", &self.role)
            .field("villa_id", &self.villa_id)
            .finish_non_exhaustive()
    }
}

/// Body of `PUT /api/admin/users/{id}`. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserUpdate {
    /// Given name
    #[serde(rename = "nombre", skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    /// Family name
    #[serde(rename = "apellido", skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    /// Email
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// National id (RUT)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rut: Option<String>,
    /// Street address
    #[serde(rename = "direccion", skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    /// Home latitude
    #[serde(rename = "latitud", skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    /// Home longitude
    #[serde(rename = "longitud", skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
    /// Sector
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sector: Option<String>,
    /// Role
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    /// Villa id
    #[serde(skip_serializing_if = "Option::is_none")]
    pub villa_id: Option<i64>,
}

/// Body of `PUT /api/admin/users/{id}/verification`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct VerificationChange {
    /// Sector to assign while verifying
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sector: Option<String>,
}

/// Body of `PUT /api/admin/users/{id}/role`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RoleChange {
    /// New role
    pub role: Role,
}
