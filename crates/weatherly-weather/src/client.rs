//! HTTP client for the Weatherly proxy endpoints.

use reqwest::Client;
use std::time::Duration;
use tracing::instrument;

use crate::error::ClientError;
use crate::types::WeatherKind;

const CITIES_PATH: &str = "/api/cities";
const WEATHER_PATH: &str = "/api/weather";

#[derive(Debug, Clone)]
pub struct ProxyClient {
    client: Client,
    base_url: String,
}

impl ProxyClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ClientError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Look up cities whose name starts with `name_prefix`.
    #[instrument(skip(self), level = "debug")]
    pub async fn cities(&self, name_prefix: &str) -> Result<serde_json::Value, ClientError> {
        let response = self
            .client
            .get(format!("{}{}", self.base_url, CITIES_PATH))
            .query(&[("namePrefix", name_prefix)])
            .send()
            .await?;

        self.handle_response(response).await
    }

    /// Fetch current conditions or the forecast.
    ///
    /// `lat` and `lon` are sent exactly as given.
    #[instrument(skip(self), level = "debug")]
    pub async fn weather(
        &self,
        lat: &str,
        lon: &str,
        kind: WeatherKind,
    ) -> Result<serde_json::Value, ClientError> {
        let response = self
            .client
            .get(format!("{}{}", self.base_url, WEATHER_PATH))
            .query(&[("lat", lat), ("lon", lon), ("type", kind.as_str())])
            .send()
            .await?;

        self.handle_response(response).await
    }

    async fn handle_response(
        &self,
        response: reqwest::Response,
    ) -> Result<serde_json::Value, ClientError> {
        let status = response.status();

        if status.is_success() {
            response
                .json()
                .await
                .map_err(|e| ClientError::Decode(format!("JSON parse error: {}", e)))
        } else {
            let body = response.text().await.unwrap_or_default();
            tracing::debug!("Proxy returned {}: {}", status, body);
            Err(ClientError::Status {
                status: status.as_u16(),
                body,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(uri: &str) -> ProxyClient {
        ProxyClient::new(uri, Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn test_weather_sends_raw_coordinates() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/weather"))
            .and(query_param("lat", "45.0"))
            .and(query_param("lon", "-122.0"))
            .and(query_param("type", "forecast"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "list": []
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let body = client(&mock_server.uri())
            .weather("45.0", "-122.0", WeatherKind::Forecast)
            .await
            .unwrap();
        assert_eq!(body, serde_json::json!({"list": []}));
    }

    #[tokio::test]
    async fn test_cities_encodes_prefix() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/cities"))
            .and(query_param("namePrefix", "São Paulo"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": []
            })))
            .mount(&mock_server)
            .await;

        let body = client(&format!("{}/", mock_server.uri()))
            .cities("São Paulo")
            .await
            .unwrap();
        assert_eq!(body["data"], serde_json::json!([]));
    }

    #[tokio::test]
    async fn test_non_success_status_is_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/weather"))
            .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
                "error": "Failed to fetch weather data from OpenWeatherMap API"
            })))
            .mount(&mock_server)
            .await;

        let result = client(&mock_server.uri())
            .weather("1", "2", WeatherKind::Current)
            .await;

        match result {
            Err(ClientError::Status { status, body }) => {
                assert_eq!(status, 404);
                assert!(body.contains("OpenWeatherMap"));
            }
            other => panic!("expected status error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_non_json_body_is_decode_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/weather"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
            .mount(&mock_server)
            .await;

        let result = client(&mock_server.uri())
            .weather("1", "2", WeatherKind::Current)
            .await;
        assert!(matches!(result, Err(ClientError::Decode(_))));
    }
}
