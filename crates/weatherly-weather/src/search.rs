//! Debounced city search backing the location picker.

use serde::Deserialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use weatherly_storage::Loaded;

use crate::client::ProxyClient;
use crate::types::{default_cities, LocationOption};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeoCity {
    name: String,
    country_code: String,
    #[serde(default)]
    region_code: Option<String>,
    latitude: f64,
    longitude: f64,
}

impl GeoCity {
    fn into_option(self) -> LocationOption {
        let label = match self.region_code.as_deref() {
            Some(region) if !region.is_empty() => {
                format!("{}, {}, {}", self.name, region, self.country_code)
            }
            _ => format!("{}, {}", self.name, self.country_code),
        };
        LocationOption::new(format!("{} {}", self.latitude, self.longitude), label)
    }
}

#[derive(Debug, Deserialize)]
struct CitiesResponse {
    data: Vec<GeoCity>,
}

pub struct CitySearch {
    client: ProxyClient,
    debounce: Duration,
    latest: AtomicU64,
}

impl CitySearch {
    pub fn new(client: ProxyClient, debounce: Duration) -> Self {
        Self {
            client,
            debounce,
            latest: AtomicU64::new(0),
        }
    }

    /// Options for the current search input.
    ///
    /// Blank input yields the default cities right away. Anything else waits
    /// out the debounce window; if a newer call arrives meanwhile this one
    /// returns `None` without touching the network. Lookup failures produce
    /// an empty, degraded list.
    pub async fn load_options(&self, input: &str) -> Option<Loaded<Vec<LocationOption>>> {
        let ticket = self.latest.fetch_add(1, Ordering::SeqCst) + 1;

        if input.trim().is_empty() {
            return Some(Loaded::Fresh(default_cities()));
        }

        tokio::time::sleep(self.debounce).await;
        if self.latest.load(Ordering::SeqCst) != ticket {
            tracing::trace!("Search for {:?} superseded", input);
            return None;
        }

        Some(self.lookup(input).await)
    }

    async fn lookup(&self, input: &str) -> Loaded<Vec<LocationOption>> {
        let body = match self.client.cities(input).await {
            Ok(body) => body,
            Err(e) => {
                tracing::error!("Error fetching cities: {}", e);
                return Loaded::degraded(Vec::new(), e.to_string());
            }
        };

        match serde_json::from_value::<CitiesResponse>(body) {
            Ok(response) => {
                let options: Vec<_> = response
                    .data
                    .into_iter()
                    .map(GeoCity::into_option)
                    .collect();
                tracing::debug!("Found {} cities for {:?}", options.len(), input);
                Loaded::Fresh(options)
            }
            Err(e) => {
                tracing::error!("Invalid response format from cities API: {}", e);
                Loaded::degraded(Vec::new(), format!("Invalid response format: {}", e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn search(uri: &str, debounce_ms: u64) -> CitySearch {
        let client = ProxyClient::new(uri, Duration::from_secs(5)).unwrap();
        CitySearch::new(client, Duration::from_millis(debounce_ms))
    }

    #[tokio::test]
    async fn test_blank_input_returns_defaults_without_request() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .expect(0)
            .mount(&mock_server)
            .await;

        let search = search(&mock_server.uri(), 600);
        let started = std::time::Instant::now();
        let options = search.load_options("   ").await.unwrap();

        assert!(started.elapsed() < Duration::from_millis(600));
        assert_eq!(options, Loaded::Fresh(default_cities()));
    }

    #[tokio::test]
    async fn test_labels_include_region_when_present() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/cities"))
            .and(query_param("namePrefix", "Port"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": [
                    {"name": "Portland", "countryCode": "US", "regionCode": "OR",
                     "latitude": 45.5152, "longitude": -122.6784},
                    {"name": "Porto", "countryCode": "PT", "regionCode": "",
                     "latitude": 41.15, "longitude": -8.61},
                    {"name": "Port Louis", "countryCode": "MU",
                     "latitude": -20.16, "longitude": 57.5}
                ]
            })))
            .mount(&mock_server)
            .await;

        let options = search(&mock_server.uri(), 10)
            .load_options("Port")
            .await
            .unwrap();

        assert!(!options.is_degraded());
        let options = options.into_value();
        assert_eq!(options[0].label, "Portland, OR, US");
        assert_eq!(options[0].value, "45.5152 -122.6784");
        assert_eq!(options[1].label, "Porto, PT");
        assert_eq!(options[2].label, "Port Louis, MU");
        assert_eq!(options[2].value, "-20.16 57.5");
    }

    #[tokio::test]
    async fn test_only_latest_input_is_requested() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/cities"))
            .and(query_param("namePrefix", "Lon"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": [{"name": "London", "countryCode": "GB", "regionCode": "ENG",
                          "latitude": 51.5, "longitude": -0.12}]
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let search = search(&mock_server.uri(), 50);
        let (first, second, third) = tokio::join!(
            search.load_options("L"),
            search.load_options("Lo"),
            search.load_options("Lon"),
        );

        assert!(first.is_none());
        assert!(second.is_none());
        assert_eq!(third.unwrap().value()[0].label, "London, ENG, GB");
    }

    #[tokio::test]
    async fn test_malformed_shape_degrades_to_empty() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/cities"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"data": "nope"})),
            )
            .mount(&mock_server)
            .await;

        let options = search(&mock_server.uri(), 0)
            .load_options("Rome")
            .await
            .unwrap();

        assert!(options.is_degraded());
        assert!(options.value().is_empty());
    }

    #[tokio::test]
    async fn test_proxy_error_degrades_to_empty() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/cities"))
            .respond_with(ResponseTemplate::new(500).set_body_json(serde_json::json!({
                "error": "Server configuration error"
            })))
            .mount(&mock_server)
            .await;

        let options = search(&mock_server.uri(), 0)
            .load_options("Rome")
            .await
            .unwrap();

        assert!(options.value().is_empty());
        assert!(options.reason().unwrap().contains("500"));
    }
}
