//! Geography browsing: cities, communes, villas and sectors.

use centinela_domain::ApiRequest;
use centinela_domain::admin::{City, CityNode, Commune, Sector, Villa};

use crate::client::ApiClient;
use crate::error::ClientResult;

const GEOGRAPHY: &str = "/api/geografia";

/// Typed access to `/api/geografia`.
#[derive(Debug, Clone)]
pub struct GeographyService {
    client: ApiClient,
}

impl GeographyService {
    /// Creates the service.
    #[must_use]
    pub const fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// All cities.
    ///
    /// # Errors
    ///
    /// Returns the client error of the underlying request.
    pub async fn cities(&self) -> ClientResult<Vec<City>> {
        self.client
            .get_json(&format!("{GEOGRAPHY}/ciudades"))
            .await
    }

    /// Communes, optionally restricted to one city.
    ///
    /// # Errors
    ///
    /// Returns the client error of the underlying request.
    pub async fn communes(&self, city_id: Option<i64>) -> ClientResult<Vec<Commune>> {
        let request = ApiRequest::get(format!("{GEOGRAPHY}/comunas"))
            .with_optional_query("ciudadId", city_id);
        self.client.execute_json(request).await
    }

    /// One commune.
    ///
    /// # Errors
    ///
    /// Returns the client error of the underlying request.
    pub async fn commune(&self, id: i64) -> ClientResult<Commune> {
        self.client
            .get_json(&format!("{GEOGRAPHY}/comunas/{id}"))
            .await
    }

    /// Villas, optionally restricted to one commune.
    ///
    /// # Errors
    ///
    /// Returns the client error of the underlying request.
    pub async fn villas(&self, commune_id: Option<i64>) -> ClientResult<Vec<Villa>> {
        let request = ApiRequest::get(format!("{GEOGRAPHY}/villas"))
            .with_optional_query("comunaId", commune_id);
        self.client.execute_json(request).await
    }

    /// One villa.
    ///
    /// # Errors
    ///
    /// Returns the client error of the underlying request.
    pub async fn villa(&self, id: i64) -> ClientResult<Villa> {
        self.client
            .get_json(&format!("{GEOGRAPHY}/villas/{id}"))
            .await
    }

    /// Sectors of one villa.
    ///
    /// # Errors
    ///
    /// Returns the client error of the underlying request.
    pub async fn villa_sectors(&self, villa_id: i64) -> ClientResult<Vec<Sector>> {
        self.client
            .get_json(&format!("{GEOGRAPHY}/villas/{villa_id}/sectores"))
            .await
    }

    /// The whole city → commune → villa tree.
    ///
    /// # Errors
    ///
    /// Returns the client error of the underlying request.
    pub async fn hierarchy(&self) -> ClientResult<Vec<CityNode>> {
        self.client
            .get_json(&format!("{GEOGRAPHY}/jerarquia"))
            .await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::test_support::client;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn test_geography_is_readable_anonymously() {
        let (client, transport, _) = client();
        transport.respond(
            "GET /api/geografia/ciudades",
            200,
            r#"[{"id": 1, "nombre": "Santiago"}]"#,
        );
        let cities = GeographyService::new(client).cities().await.unwrap();
        assert_eq!(cities[0].name, "Santiago");
        assert_eq!(transport.last().bearer_token(), None);
    }

    #[tokio::test]
    async fn test_optional_parent_filter() {
        let (client, transport, _) = client();
        transport.respond("GET /api/geografia/comunas", 200, "[]");
        let geography = GeographyService::new(client);

        geography.communes(None).await.unwrap();
        assert_eq!(transport.last().url.query(), None);

        geography.communes(Some(7)).await.unwrap();
        assert_eq!(transport.last().url.query(), Some("ciudadId=7"));
    }

    #[tokio::test]
    async fn test_villa_sectors_accepts_plain_names() {
        let (client, transport, _) = client();
        transport.respond(
            "GET /api/geografia/villas/4/sectores",
            200,
            r#"["Norte", {"id": 2, "nombre": "Sur"}]"#,
        );
        let sectors = GeographyService::new(client).villa_sectors(4).await.unwrap();
        let names: Vec<_> = sectors.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Norte", "Sur"]);
    }
}
