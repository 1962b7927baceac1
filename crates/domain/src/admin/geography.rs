//! Geography browsing payloads: cities, communes, villas and sectors.

use serde::{Deserialize, Serialize};

/// A city.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct City {
    /// City id
    pub id: i64,
    /// Name
    #[serde(rename = "nombre")]
    pub name: String,
}

/// A commune (municipality) inside a city.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Commune {
    /// Commune id
    pub id: i64,
    /// Name
    #[serde(rename = "nombre")]
    pub name: String,
    /// Owning city id
    #[serde(default, rename = "ciudadId")]
    pub city_id: Option<i64>,
    /// Owning city name
    #[serde(default, rename = "ciudadNombre")]
    pub city_name: Option<String>,
}

/// A sector inside a villa.
///
/// Some endpoints send sectors as bare strings and others as objects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "SectorRepr")]
pub struct Sector {
    /// Sector id, when the backend sends one
    pub id: Option<i64>,
    /// Name
    #[serde(rename = "nombre")]
    pub name: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SectorRepr {
    Name(String),
    Object {
        #[serde(default)]
        id: Option<i64>,
        #[serde(rename = "nombre")]
        name: String,
    },
}

impl From<SectorRepr> for Sector {
    fn from(repr: SectorRepr) -> Self {
        match repr {
            SectorRepr::Name(name) => Self { id: None, name },
            SectorRepr::Object { id, name } => Self { id, name },
        }
    }
}

/// A villa (neighborhood), the tenant unit of the platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Villa {
    /// Villa id
    pub id: i64,
    /// Name
    #[serde(rename = "nombre")]
    pub name: String,
    /// Owning commune id
    #[serde(default, rename = "comunaId")]
    pub commune_id: Option<i64>,
    /// Owning commune name
    #[serde(default, rename = "comunaNombre")]
    pub commune_name: Option<String>,
    /// Sectors, when embedded
    #[serde(default, rename = "sectores")]
    pub sectors: Vec<Sector>,
}

/// Commune node of the full hierarchy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommuneNode {
    /// Commune id
    pub id: i64,
    /// Name
    #[serde(rename = "nombre")]
    pub name: String,
    /// Villas in the commune
    #[serde(default)]
    pub villas: Vec<Villa>,
}

/// City node of the full hierarchy (`GET /api/geografia/jerarquia`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CityNode {
    /// City id
    pub id: i64,
    /// Name
    #[serde(rename = "nombre")]
    pub name: String,
    /// Communes in the city
    #[serde(default, rename = "comunas")]
    pub communes: Vec<CommuneNode>,
}

impl CityNode {
    /// Total number of villas under this city.
    #[must_use]
    pub fn villa_count(&self) -> usize {
        self.communes.iter().map(|c| c.villas.len()).sum()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_sector_accepts_string_or_object() {
        let sectors: Vec<Sector> =
            serde_json::from_value(json!(["Norte", { "id": 2, "nombre": "Sur" }])).unwrap();
        assert_eq!(
            sectors,
            vec![
                Sector {
                    id: None,
                    name: "Norte".to_string()
                },
                Sector {
                    id: Some(2),
                    name: "Sur".to_string()
                },
            ]
        );
    }

    #[test]
    fn test_hierarchy() {
        let tree: Vec<CityNode> = serde_json::from_value(json!([{
            "id": 1,
            "nombre": "Santiago",
            "comunas": [
                { "id": 10, "nombre": "Maipú", "villas": [
                    { "id": 100, "nombre": "Villa A", "sectores": ["Norte"] },
                    { "id": 101, "nombre": "Villa B" }
                ]},
                { "id": 11, "nombre": "Ñuñoa" }
            ]
        }]))
        .unwrap();

        assert_eq!(tree[0].villa_count(), 2);
        assert_eq!(tree[0].communes[0].villas[0].sectors[0].name, "Norte");
        assert!(tree[0].communes[1].villas.is_empty());
    }
}
