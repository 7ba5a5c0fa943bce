//! Google Directions API client.
//!
//! Computes a route from an attendee's position to an onsite event venue.
//! Like geocoding, this is API-key authenticated.

use serde_json::Value;
use tracing::debug;

use crate::error::{OAuthError, OAuthResult};
use crate::google::geocoding::{LatLng, MAPS_BASE_URL};

/// How the attendee travels to the venue.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TravelMode {
    #[default]
    Driving,
    Walking,
    Bicycling,
    Transit,
}

impl TravelMode {
    /// Returns the API parameter value for this mode.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Driving => "driving",
            Self::Walking => "walking",
            Self::Bicycling => "bicycling",
            Self::Transit => "transit",
        }
    }
}

/// A computed route, summarized from the first returned leg.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    /// Total travel time as the API formats it (e.g. "25 mins").
    pub total_duration: String,
    /// Total distance as the API formats it (e.g. "12.4 km").
    pub total_distance: String,
    /// Resolved address of the route's origin.
    pub start_address: String,
    /// Resolved address of the route's destination.
    pub end_address: String,
    /// Turn-by-turn instructions, as HTML fragments.
    pub steps: Vec<String>,
}

/// Thin client over the Directions API.
#[derive(Debug, Clone)]
pub struct DirectionsClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl DirectionsClient {
    /// Creates a client with the given API key.
    pub fn new(http: reqwest::Client, api_key: impl Into<String>) -> Self {
        Self {
            http,
            base_url: MAPS_BASE_URL.to_string(),
            api_key: api_key.into(),
        }
    }

    /// Builder: point the client at a different base URL.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Computes a route between two coordinate pairs.
    pub async fn route(
        &self,
        origin: LatLng,
        destination: LatLng,
        mode: TravelMode,
    ) -> OAuthResult<Route> {
        let url = format!("{}/directions/json", self.base_url);
        let origin = format!("{},{}", origin.lat, origin.lng);
        let destination = format!("{},{}", destination.lat, destination.lng);

        let response = self
            .http
            .get(&url)
            .query(&[
                ("origin", origin.as_str()),
                ("destination", destination.as_str()),
                ("mode", mode.as_str()),
                ("key", self.api_key.as_str()),
            ])
            .send()
            .await
            .map_err(|e| OAuthError::network(format!("directions request failed: {e}")))?;

        let status = response.status();
        let body: Value = response
            .json()
            .await
            .map_err(|e| OAuthError::upstream(format!("invalid directions response: {e}")))?;

        if !status.is_success() {
            return Err(OAuthError::upstream(format!(
                "directions API returned {status}"
            )));
        }
        match body["status"].as_str() {
            Some("OK") => {}
            other => {
                return Err(OAuthError::upstream(format!(
                    "directions failed with status {}",
                    other.unwrap_or("unknown")
                )));
            }
        }

        let leg = &body["routes"][0]["legs"][0];
        let route = parse_leg(leg)?;
        debug!(
            duration = %route.total_duration,
            distance = %route.total_distance,
            "route computed"
        );
        Ok(route)
    }
}

fn parse_leg(leg: &Value) -> OAuthResult<Route> {
    let text = |value: &Value| value.as_str().map(String::from);
    let (total_duration, total_distance, start_address, end_address) = match (
        text(&leg["duration"]["text"]),
        text(&leg["distance"]["text"]),
        text(&leg["start_address"]),
        text(&leg["end_address"]),
    ) {
        (Some(duration), Some(distance), Some(start), Some(end)) => {
            (duration, distance, start, end)
        }
        _ => {
            return Err(OAuthError::upstream(
                "directions response carries no usable leg",
            ));
        }
    };

    let steps = leg["steps"]
        .as_array()
        .map(|steps| {
            steps
                .iter()
                .filter_map(|step| text(&step["html_instructions"]))
                .collect()
        })
        .unwrap_or_default();

    Ok(Route {
        total_duration,
        total_distance,
        start_address,
        end_address,
        steps,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::OAuthErrorCode;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer) -> DirectionsClient {
        DirectionsClient::new(reqwest::Client::new(), "maps-key").with_base_url(server.uri())
    }

    fn leg_body() -> serde_json::Value {
        serde_json::json!({
            "status": "OK",
            "routes": [{
                "legs": [{
                    "duration": { "text": "25 mins" },
                    "distance": { "text": "12.4 km" },
                    "start_address": "Ikeja, Lagos",
                    "end_address": "1 Broad St, Lagos Island, Lagos",
                    "steps": [
                        { "html_instructions": "Head <b>south</b>" },
                        { "html_instructions": "Turn <b>left</b> onto Broad St" }
                    ]
                }]
            }]
        })
    }

    #[tokio::test]
    async fn route_parses_first_leg() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/directions/json"))
            .and(query_param("mode", "driving"))
            .and(query_param("key", "maps-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(leg_body()))
            .expect(1)
            .mount(&server)
            .await;

        let route = client(&server)
            .route(
                LatLng { lat: 6.6018, lng: 3.3515 },
                LatLng { lat: 6.4549, lng: 3.3941 },
                TravelMode::Driving,
            )
            .await
            .unwrap();

        assert_eq!(route.total_duration, "25 mins");
        assert_eq!(route.total_distance, "12.4 km");
        assert_eq!(route.start_address, "Ikeja, Lagos");
        assert_eq!(route.end_address, "1 Broad St, Lagos Island, Lagos");
        assert_eq!(route.steps.len(), 2);
    }

    #[tokio::test]
    async fn route_surfaces_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/directions/json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "status": "NOT_FOUND",
                "routes": []
            })))
            .expect(1)
            .mount(&server)
            .await;

        let err = client(&server)
            .route(
                LatLng { lat: 0.0, lng: 0.0 },
                LatLng { lat: 0.0, lng: 0.0 },
                TravelMode::Walking,
            )
            .await
            .unwrap_err();
        assert_eq!(err.code(), OAuthErrorCode::Upstream);
        assert!(err.message().contains("NOT_FOUND"));
    }
}
