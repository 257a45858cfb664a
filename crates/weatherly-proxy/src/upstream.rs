//! Clients for the GeoDB cities and OpenWeatherMap APIs.

use serde_json::Value;
use tracing::instrument;
use weatherly_core::ProxyConfig;

use crate::error::ProxyError;

/// Maximum cities returned per lookup
pub const CITY_LIMIT: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeatherEndpoint {
    Current,
    Forecast,
}

impl WeatherEndpoint {
    fn path(&self) -> &'static str {
        match self {
            Self::Current => "weather",
            Self::Forecast => "forecast",
        }
    }
}

pub struct Upstream {
    client: reqwest::Client,
    config: ProxyConfig,
}

impl Upstream {
    pub fn new(config: ProxyConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    #[instrument(skip(self), level = "info")]
    pub async fn cities(&self, name_prefix: &str) -> Result<Value, ProxyError> {
        let key = self
            .config
            .rapidapi_key()
            .ok_or(ProxyError::MissingCredential {
                name: "RAPIDAPI_KEY",
            })?;

        let url = format!("{}/v1/geo/cities", self.config.geo_api_base_url());
        let response = self
            .client
            .get(&url)
            .query(&[("namePrefix", name_prefix)])
            .query(&[("limit", CITY_LIMIT)])
            .header("x-rapidapi-key", key)
            .header("x-rapidapi-host", &self.config.rapidapi_host)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            tracing::error!("GeoDB API error: {}", status);
            return Err(ProxyError::Upstream {
                status: status.as_u16(),
                message: "Failed to fetch cities from GeoDB API",
                details: reason(status),
            });
        }

        decode(response).await
    }

    #[instrument(skip(self), level = "info")]
    pub async fn weather(
        &self,
        lat: f64,
        lon: f64,
        endpoint: WeatherEndpoint,
    ) -> Result<Value, ProxyError> {
        let key = self
            .config
            .weather_api_key()
            .ok_or(ProxyError::MissingCredential {
                name: "WEATHER_API_KEY",
            })?;

        let url = format!(
            "{}/{}",
            self.config.weather_api_url.trim_end_matches('/'),
            endpoint.path()
        );
        let response = self
            .client
            .get(&url)
            .query(&[
                ("lat", lat.to_string()),
                ("lon", lon.to_string()),
                ("appid", key.to_string()),
                ("units", "metric".to_string()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            tracing::error!("OpenWeatherMap API error: {}", status);
            if status == reqwest::StatusCode::UNAUTHORIZED {
                return Err(ProxyError::WeatherAuthFailed);
            }
            return Err(ProxyError::Upstream {
                status: status.as_u16(),
                message: "Failed to fetch weather data from OpenWeatherMap API",
                details: reason(status),
            });
        }

        decode(response).await
    }
}

fn reason(status: reqwest::StatusCode) -> String {
    status.canonical_reason().unwrap_or_default().to_string()
}

async fn decode(response: reqwest::Response) -> Result<Value, ProxyError> {
    response
        .json()
        .await
        .map_err(|e| ProxyError::Internal(format!("JSON parse error: {}", e)))
}
