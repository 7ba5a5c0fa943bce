//! Google Geocoding API client.
//!
//! Resolves venue addresses to coordinates (used at onsite event creation
//! when no coordinates are supplied) and coordinates back to a display
//! address. Uses an API key rather than an OAuth token; Google's geocoding
//! endpoints are not user-scoped.

use std::time::Duration;

use serde_json::Value;
use tracing::debug;

use crate::error::{OAuthError, OAuthResult};

/// Production base URL of the Maps web services.
pub const MAPS_BASE_URL: &str = "https://maps.googleapis.com/maps/api";

/// A WGS84 coordinate pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

/// Thin client over the Geocoding API.
#[derive(Debug, Clone)]
pub struct GeocodingClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl GeocodingClient {
    /// Creates a client with the given API key.
    pub fn new(http: reqwest::Client, api_key: impl Into<String>) -> Self {
        Self {
            http,
            base_url: MAPS_BASE_URL.to_string(),
            api_key: api_key.into(),
        }
    }

    /// Creates a client with its own HTTP client and outbound timeout.
    pub fn with_timeout(api_key: impl Into<String>, timeout: Duration) -> Self {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .expect("failed to create HTTP client");
        Self::new(http, api_key)
    }

    /// Builder: point the client at a different base URL.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Resolves an address to coordinates.
    pub async fn forward(&self, address: &str) -> OAuthResult<LatLng> {
        let body = self.request(&[("address", address)]).await?;
        let location = &body["results"][0]["geometry"]["location"];
        let (lat, lng) = match (location["lat"].as_f64(), location["lng"].as_f64()) {
            (Some(lat), Some(lng)) => (lat, lng),
            _ => {
                return Err(OAuthError::upstream(
                    "geocoding response carries no location",
                ));
            }
        };

        debug!(address, lat, lng, "address geocoded");
        Ok(LatLng { lat, lng })
    }

    /// Resolves coordinates to a display address.
    pub async fn reverse(&self, position: LatLng) -> OAuthResult<String> {
        let latlng = format!("{},{}", position.lat, position.lng);
        let body = self.request(&[("latlng", latlng.as_str())]).await?;
        body["results"][0]["formatted_address"]
            .as_str()
            .map(String::from)
            .ok_or_else(|| OAuthError::upstream("geocoding response carries no address"))
    }

    async fn request(&self, params: &[(&str, &str)]) -> OAuthResult<Value> {
        let url = format!("{}/geocode/json", self.base_url);
        let response = self
            .http
            .get(&url)
            .query(params)
            .query(&[("key", self.api_key.as_str())])
            .send()
            .await
            .map_err(|e| OAuthError::network(format!("geocoding request failed: {e}")))?;

        let status = response.status();
        let body: Value = response
            .json()
            .await
            .map_err(|e| OAuthError::upstream(format!("invalid geocoding response: {e}")))?;

        if !status.is_success() {
            return Err(OAuthError::upstream(format!(
                "geocoding API returned {status}"
            )));
        }
        // The API reports failures with a 200 and a non-OK status field.
        match body["status"].as_str() {
            Some("OK") => Ok(body),
            other => Err(OAuthError::upstream(format!(
                "geocoding failed with status {}",
                other.unwrap_or("unknown")
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::OAuthErrorCode;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer) -> GeocodingClient {
        GeocodingClient::new(reqwest::Client::new(), "maps-key").with_base_url(server.uri())
    }

    #[tokio::test]
    async fn forward_resolves_coordinates() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/geocode/json"))
            .and(query_param("address", "1 Broad St, Lagos"))
            .and(query_param("key", "maps-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "status": "OK",
                "results": [{
                    "geometry": { "location": { "lat": 6.4549, "lng": 3.3941 } }
                }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let position = client(&server).forward("1 Broad St, Lagos").await.unwrap();
        assert_eq!(position, LatLng { lat: 6.4549, lng: 3.3941 });
    }

    #[tokio::test]
    async fn reverse_resolves_address() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/geocode/json"))
            .and(query_param("latlng", "6.4549,3.3941"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "status": "OK",
                "results": [{ "formatted_address": "1 Broad St, Lagos Island, Lagos" }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let address = client(&server)
            .reverse(LatLng { lat: 6.4549, lng: 3.3941 })
            .await
            .unwrap();
        assert_eq!(address, "1 Broad St, Lagos Island, Lagos");
    }

    #[tokio::test]
    async fn non_ok_status_field_is_upstream_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/geocode/json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "status": "ZERO_RESULTS",
                "results": []
            })))
            .expect(1)
            .mount(&server)
            .await;

        let err = client(&server).forward("nowhere").await.unwrap_err();
        assert_eq!(err.code(), OAuthErrorCode::Upstream);
        assert!(err.message().contains("ZERO_RESULTS"));
    }
}
