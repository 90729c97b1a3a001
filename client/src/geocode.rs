use cragcore::telemetry::LogManager;
use cragcore::Coordinate;
use serde::Deserialize;

use crate::config::GeocodeConfig;
use crate::functions::SecretsClient;

/// Secret holding the maps key when the config does not.
pub const MAPS_KEY_SECRET: &str = "GOOGLE_MAPS_API_KEY";

#[derive(Debug, Default, Deserialize)]
struct GeocodeResponse {
    #[serde(default)]
    results: Vec<GeocodeResult>,
}

#[derive(Debug, Deserialize)]
struct GeocodeResult {
    formatted_address: String,
}

/// Reverse geocoder; every failure falls back to the raw coordinate text.
pub struct Geocoder {
    http: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
    logger: LogManager,
}

impl Geocoder {
    pub fn new(config: &GeocodeConfig, api_key: Option<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint: config.endpoint.clone(),
            api_key: api_key.or_else(|| config.api_key.clone()),
            logger: LogManager::new("geocode"),
        }
    }

    /// Uses the configured key, or asks the secrets function for one.
    pub async fn from_secrets(config: &GeocodeConfig, secrets: &SecretsClient) -> Self {
        if config.api_key.is_some() {
            return Self::new(config, None);
        }
        let mut geocoder = Self::new(config, None);
        match secrets.fetch_one(MAPS_KEY_SECRET).await {
            Ok(key) => geocoder.api_key = key,
            Err(err) => geocoder
                .logger
                .warn(&format!("maps key unavailable: {}", err)),
        }
        geocoder
    }

    pub async fn reverse(&self, coordinate: Coordinate) -> String {
        match self.lookup(coordinate).await {
            Ok(Some(address)) => address,
            Ok(None) => coordinate.to_address_fallback(),
            Err(err) => {
                self.logger
                    .warn(&format!("reverse geocoding failed: {}", err));
                coordinate.to_address_fallback()
            }
        }
    }

    async fn lookup(&self, coordinate: Coordinate) -> Result<Option<String>, reqwest::Error> {
        let Some(api_key) = self.api_key.as_deref() else {
            return Ok(None);
        };
        let latlng = format!("{},{}", coordinate.lat, coordinate.lng);
        let response: GeocodeResponse = self
            .http
            .get(&self.endpoint)
            .query(&[("latlng", latlng.as_str()), ("key", api_key)])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(response
            .results
            .into_iter()
            .next()
            .map(|result| result.formatted_address))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClientConfig;
    use crate::functions::FunctionsClient;
    use cragcore::SessionStore;
    use serde_json::{json, Value};
    use std::net::SocketAddr;
    use warp::Filter;

    fn spawn_geocoder(status: u16, reply: Value) -> SocketAddr {
        let route = warp::get().map(move || {
            warp::reply::with_status(
                warp::reply::json(&reply),
                warp::http::StatusCode::from_u16(status).unwrap(),
            )
        });
        let (addr, server) = warp::serve(route).bind_ephemeral(([127, 0, 0, 1], 0));
        tokio::spawn(server);
        addr
    }

    fn geocoder(addr: SocketAddr, key: Option<&str>) -> Geocoder {
        let config = GeocodeConfig {
            endpoint: format!("http://{}/geocode/json", addr),
            api_key: None,
        };
        Geocoder::new(&config, key.map(str::to_string))
    }

    #[tokio::test]
    async fn first_formatted_address_wins() {
        let addr = spawn_geocoder(
            200,
            json!({"status": "OK", "results": [
                {"formatted_address": "Kletterhalle, Berlin"},
                {"formatted_address": "Berlin, Germany"}
            ]}),
        );
        let address = geocoder(addr, Some("maps"))
            .reverse(Coordinate::new(52.5, 13.4))
            .await;
        assert_eq!(address, "Kletterhalle, Berlin");
    }

    #[tokio::test]
    async fn empty_results_fall_back_to_coordinates() {
        let addr = spawn_geocoder(200, json!({"status": "ZERO_RESULTS", "results": []}));
        let address = geocoder(addr, Some("maps"))
            .reverse(Coordinate::new(1.5, -2.25))
            .await;
        assert_eq!(address, "1.500000, -2.250000");
    }

    #[tokio::test]
    async fn upstream_failure_falls_back_to_coordinates() {
        let addr = spawn_geocoder(500, json!({}));
        let address = geocoder(addr, Some("maps"))
            .reverse(Coordinate::new(0.0, 0.0))
            .await;
        assert_eq!(address, "0.000000, 0.000000");
    }

    fn secrets_at(status: u16, reply: Value) -> SecretsClient {
        let route = warp::path("get-secrets").map(move || {
            warp::reply::with_status(
                warp::reply::json(&reply),
                warp::http::StatusCode::from_u16(status).unwrap(),
            )
        });
        let (addr, server) = warp::serve(route).bind_ephemeral(([127, 0, 0, 1], 0));
        tokio::spawn(server);
        let config = ClientConfig {
            functions_url: Some(format!("http://{}", addr)),
            ..ClientConfig::default()
        };
        SecretsClient::new(FunctionsClient::new(&config, SessionStore::new()))
    }

    #[tokio::test]
    async fn maps_key_comes_from_the_secrets_function() {
        let addr = spawn_geocoder(200, json!({"results": [{"formatted_address": "Boulderwelt"}]}));
        let config = GeocodeConfig {
            endpoint: format!("http://{}/geocode/json", addr),
            api_key: None,
        };
        let secrets = secrets_at(200, json!({"GOOGLE_MAPS_API_KEY": "maps"}));

        let geocoder = Geocoder::from_secrets(&config, &secrets).await;
        assert_eq!(geocoder.api_key.as_deref(), Some("maps"));
        assert_eq!(geocoder.reverse(Coordinate::new(48.1, 11.5)).await, "Boulderwelt");
    }

    #[tokio::test]
    async fn unreachable_secrets_leave_the_coordinate_fallback() {
        let addr = spawn_geocoder(200, json!({"results": [{"formatted_address": "x"}]}));
        let config = GeocodeConfig {
            endpoint: format!("http://{}/geocode/json", addr),
            api_key: None,
        };
        let secrets = secrets_at(500, json!({"error": "boom"}));

        let geocoder = Geocoder::from_secrets(&config, &secrets).await;
        assert!(geocoder.api_key.is_none());
        assert_eq!(
            geocoder.reverse(Coordinate::new(3.0, 4.0)).await,
            "3.000000, 4.000000"
        );
    }

    #[tokio::test]
    async fn missing_key_skips_the_request() {
        let addr = spawn_geocoder(200, json!({"results": [{"formatted_address": "x"}]}));
        let address = geocoder(addr, None)
            .reverse(Coordinate::new(10.0, 20.0))
            .await;
        assert_eq!(address, "10.000000, 20.000000");
    }
}
