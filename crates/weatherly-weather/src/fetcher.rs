//! Current conditions and forecast, fetched together for one location.

use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::watch;

use crate::client::ProxyClient;
use crate::error::ClientError;
use crate::types::{
    FetchState, ForecastSnapshot, LocationOption, WeatherKind, WeatherSnapshot, WeatherView,
};

pub const FETCH_FAILED_MESSAGE: &str = "Failed to fetch weather data. Please try again.";
pub const CONNECTION_MESSAGE: &str =
    "Unable to load weather data. Please check your connection and try again.";

/// Owns the weather view and keeps it consistent with the latest request.
///
/// Every `fetch_weather` and `clear_weather` starts a new generation. A fetch
/// that completes after a newer generation began is dropped, so the view
/// always reflects the most recent user action.
pub struct WeatherFetcher {
    client: ProxyClient,
    view: watch::Sender<WeatherView>,
    generation: AtomicU64,
}

impl WeatherFetcher {
    pub fn new(client: ProxyClient) -> Self {
        let (view, _) = watch::channel(WeatherView::default());
        Self {
            client,
            view,
            generation: AtomicU64::new(0),
        }
    }

    pub fn view(&self) -> WeatherView {
        self.view.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<WeatherView> {
        self.view.subscribe()
    }

    pub fn clear_weather(&self) {
        self.view.send_modify(|view| {
            self.generation.fetch_add(1, Ordering::SeqCst);
            *view = WeatherView::default();
        });
    }

    /// Load both snapshots for `location`.
    pub async fn fetch_weather(&self, location: &LocationOption) {
        let Some((lat, lon)) = location.coordinates() else {
            tracing::warn!("Location value {:?} has no coordinates", location.value);
            self.view.send_modify(|view| {
                self.generation.fetch_add(1, Ordering::SeqCst);
                *view = WeatherView {
                    state: FetchState::Error(FETCH_FAILED_MESSAGE.to_string()),
                    location_value: Some(location.value.clone()),
                };
            });
            return;
        };

        let mut generation = 0;
        self.view.send_modify(|view| {
            generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
            *view = WeatherView {
                state: FetchState::Loading,
                location_value: Some(location.value.clone()),
            };
        });

        let (current, forecast) = tokio::join!(
            self.client.weather(lat, lon, WeatherKind::Current),
            self.client.weather(lat, lon, WeatherKind::Forecast),
        );

        let state = match (current, forecast) {
            (Ok(current), Ok(forecast)) => FetchState::Success {
                current: WeatherSnapshot {
                    city: location.label.clone(),
                    data: current,
                },
                forecast: ForecastSnapshot {
                    city: location.label.clone(),
                    data: forecast,
                },
            },
            (current, forecast) => {
                let errors: Vec<ClientError> =
                    [current.err(), forecast.err()].into_iter().flatten().collect();
                for e in &errors {
                    tracing::error!("Weather fetch error: {}", e);
                }
                FetchState::Error(failure_message(&errors).to_string())
            }
        };

        let applied = self.view.send_if_modified(|view| {
            if self.generation.load(Ordering::SeqCst) != generation {
                return false;
            }
            view.state = state;
            true
        });

        if !applied {
            tracing::debug!("Discarding stale weather for {}", location.label);
        }
    }
}

/// A transport failure means we never got a status to judge; report it as a
/// connection problem even if the other request was rejected.
fn failure_message(errors: &[ClientError]) -> &'static str {
    if errors.iter().any(|e| matches!(e, ClientError::Network(_))) {
        CONNECTION_MESSAGE
    } else if errors.iter().any(|e| e.status().is_some()) {
        FETCH_FAILED_MESSAGE
    } else {
        CONNECTION_MESSAGE
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn fetcher(uri: &str) -> WeatherFetcher {
        WeatherFetcher::new(ProxyClient::new(uri, Duration::from_secs(5)).unwrap())
    }

    async fn mount_weather(server: &MockServer, lat: &str, kind: &str, body: serde_json::Value) {
        Mock::given(method("GET"))
            .and(path("/api/weather"))
            .and(query_param("lat", lat))
            .and(query_param("type", kind))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_success_populates_both_snapshots() {
        let mock_server = MockServer::start().await;
        mount_weather(&mock_server, "41.9", "current", serde_json::json!({"main": {"temp": 18.0}}))
            .await;
        mount_weather(&mock_server, "41.9", "forecast", serde_json::json!({"list": []})).await;

        let fetcher = fetcher(&mock_server.uri());
        fetcher
            .fetch_weather(&LocationOption::new("41.9 12.5", "Rome, IT"))
            .await;

        let view = fetcher.view();
        assert_eq!(view.location_value.as_deref(), Some("41.9 12.5"));
        let current = view.current_weather().unwrap();
        assert_eq!(current.city, "Rome, IT");
        assert_eq!(current.data["main"]["temp"], 18.0);
        assert_eq!(view.forecast().unwrap().data, serde_json::json!({"list": []}));
    }

    #[tokio::test]
    async fn test_either_failure_is_single_error() {
        let mock_server = MockServer::start().await;
        mount_weather(&mock_server, "1", "current", serde_json::json!({})).await;
        Mock::given(method("GET"))
            .and(path("/api/weather"))
            .and(query_param("type", "forecast"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&mock_server)
            .await;

        let fetcher = fetcher(&mock_server.uri());
        fetcher.fetch_weather(&LocationOption::new("1 2", "X")).await;

        let view = fetcher.view();
        assert_eq!(view.error(), Some(FETCH_FAILED_MESSAGE));
        assert!(view.current_weather().is_none());
        assert!(view.forecast().is_none());
    }

    #[tokio::test]
    async fn test_undecodable_body_uses_connection_message() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/weather"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&mock_server)
            .await;

        let fetcher = fetcher(&mock_server.uri());
        fetcher.fetch_weather(&LocationOption::new("1 2", "X")).await;
        assert_eq!(fetcher.view().error(), Some(CONNECTION_MESSAGE));
    }

    #[tokio::test]
    async fn test_unreachable_proxy_uses_connection_message() {
        let fetcher = fetcher("http://127.0.0.1:9");
        fetcher.fetch_weather(&LocationOption::new("1 2", "X")).await;
        assert_eq!(fetcher.view().error(), Some(CONNECTION_MESSAGE));
    }

    #[tokio::test]
    async fn test_value_without_space_fails_immediately() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&mock_server)
            .await;

        let fetcher = fetcher(&mock_server.uri());
        fetcher
            .fetch_weather(&LocationOption::new("45.0,-122.0", "Bad"))
            .await;

        let view = fetcher.view();
        assert_eq!(view.error(), Some(FETCH_FAILED_MESSAGE));
        assert_eq!(view.location_value.as_deref(), Some("45.0,-122.0"));
    }

    #[tokio::test]
    async fn test_loading_is_observable() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/weather"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({}))
                    .set_delay(Duration::from_millis(200)),
            )
            .mount(&mock_server)
            .await;

        let fetcher = Arc::new(fetcher(&mock_server.uri()));
        let mut rx = fetcher.subscribe();

        let task = {
            let fetcher = fetcher.clone();
            tokio::spawn(async move {
                fetcher.fetch_weather(&LocationOption::new("1 2", "X")).await;
            })
        };

        rx.changed().await.unwrap();
        assert!(rx.borrow_and_update().is_loading());

        task.await.unwrap();
        assert!(fetcher.view().current_weather().is_some());
    }

    #[tokio::test]
    async fn test_clear_during_fetch_stays_idle() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/weather"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({}))
                    .set_delay(Duration::from_millis(200)),
            )
            .mount(&mock_server)
            .await;

        let fetcher = Arc::new(fetcher(&mock_server.uri()));
        let task = {
            let fetcher = fetcher.clone();
            tokio::spawn(async move {
                fetcher.fetch_weather(&LocationOption::new("1 2", "X")).await;
            })
        };

        tokio::time::sleep(Duration::from_millis(50)).await;
        fetcher.clear_weather();
        task.await.unwrap();

        assert_eq!(fetcher.view(), WeatherView::default());
    }

    #[tokio::test]
    async fn test_newer_fetch_wins_over_slow_older_one() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/weather"))
            .and(query_param("lat", "10"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"slow": true}))
                    .set_delay(Duration::from_millis(300)),
            )
            .mount(&mock_server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/weather"))
            .and(query_param("lat", "20"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"fast": true})))
            .mount(&mock_server)
            .await;

        let fetcher = Arc::new(fetcher(&mock_server.uri()));
        let slow = {
            let fetcher = fetcher.clone();
            tokio::spawn(async move {
                fetcher.fetch_weather(&LocationOption::new("10 10", "Slow")).await;
            })
        };

        tokio::time::sleep(Duration::from_millis(50)).await;
        fetcher
            .fetch_weather(&LocationOption::new("20 20", "Fast"))
            .await;
        slow.await.unwrap();

        let view = fetcher.view();
        assert_eq!(view.location_value.as_deref(), Some("20 20"));
        assert_eq!(view.current_weather().unwrap().city, "Fast");
        assert_eq!(view.current_weather().unwrap().data["fast"], true);
    }

    #[test]
    fn test_failure_message_priority() {
        let status = ClientError::Status {
            status: 500,
            body: String::new(),
        };
        let decode = ClientError::Decode("eof".into());

        assert_eq!(failure_message(&[status]), FETCH_FAILED_MESSAGE);
        assert_eq!(failure_message(&[decode]), CONNECTION_MESSAGE);
    }
}
