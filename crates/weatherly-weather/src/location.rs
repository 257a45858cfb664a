//! Device location lookup.
//!
//! [`GeolocationRequester`] asks a [`PositionSource`] for a single fix and
//! turns every failure into a message in [`GeolocationState`]; callers only
//! ever see `Some(coordinates)` or `None`.

use parking_lot::Mutex;
use std::future::Future;
use std::time::Duration;

use crate::types::Coordinates;

pub const UNSUPPORTED_MESSAGE: &str = "Geolocation is not supported by your browser";
pub const PERMISSION_DENIED_MESSAGE: &str =
    "Location permission denied. Please enable location access in your browser settings.";
pub const UNAVAILABLE_MESSAGE: &str = "Location information is unavailable.";
pub const TIMEOUT_MESSAGE: &str = "Location request timed out.";
pub const GENERIC_MESSAGE: &str = "Unable to retrieve your location";

/// Request parameters passed to the position source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositionOptions {
    pub enable_high_accuracy: bool,
    pub timeout: Duration,
    /// Oldest acceptable cached fix; zero disallows cached positions
    pub maximum_age: Duration,
}

impl Default for PositionOptions {
    fn default() -> Self {
        Self {
            enable_high_accuracy: true,
            timeout: Duration::from_secs(10),
            maximum_age: Duration::ZERO,
        }
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PositionError {
    #[error("Location permission denied")]
    PermissionDenied,
    #[error("Location unavailable")]
    PositionUnavailable,
    #[error("Location request timed out")]
    Timeout,
    #[error("Location error: {0}")]
    Other(String),
}

impl PositionError {
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::PermissionDenied => PERMISSION_DENIED_MESSAGE,
            Self::PositionUnavailable => UNAVAILABLE_MESSAGE,
            Self::Timeout => TIMEOUT_MESSAGE,
            Self::Other(_) => GENERIC_MESSAGE,
        }
    }
}

/// Something that can report the device position
pub trait PositionSource: Send + Sync {
    fn current_position(
        &self,
        options: &PositionOptions,
    ) -> impl Future<Output = Result<Coordinates, PositionError>> + Send;
}

/// Position fixed in configuration, for machines without a location service.
#[derive(Debug, Clone, Copy)]
pub struct ConfiguredPosition {
    coordinates: Coordinates,
}

impl ConfiguredPosition {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            coordinates: Coordinates::new(latitude, longitude),
        }
    }
}

impl PositionSource for ConfiguredPosition {
    async fn current_position(
        &self,
        _options: &PositionOptions,
    ) -> Result<Coordinates, PositionError> {
        Ok(self.coordinates)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct GeolocationState {
    pub loading: bool,
    pub error: Option<String>,
    pub coordinates: Option<Coordinates>,
}

pub struct GeolocationRequester<S> {
    source: Option<S>,
    options: PositionOptions,
    state: Mutex<GeolocationState>,
}

impl<S: PositionSource> GeolocationRequester<S> {
    pub fn new(source: S) -> Self {
        Self::with_options(Some(source), PositionOptions::default())
    }

    /// A requester on a device with no location capability.
    pub fn unsupported() -> Self {
        Self::with_options(None, PositionOptions::default())
    }

    pub fn with_options(source: Option<S>, options: PositionOptions) -> Self {
        Self {
            source,
            options,
            state: Mutex::new(GeolocationState::default()),
        }
    }

    pub fn state(&self) -> GeolocationState {
        self.state.lock().clone()
    }

    /// Request a single position fix.
    ///
    /// Returns `None` on any failure, with the reason left in [`Self::state`].
    pub async fn get_current_location(&self) -> Option<Coordinates> {
        let Some(source) = &self.source else {
            *self.state.lock() = GeolocationState {
                loading: false,
                error: Some(UNSUPPORTED_MESSAGE.to_string()),
                coordinates: None,
            };
            return None;
        };

        *self.state.lock() = GeolocationState {
            loading: true,
            error: None,
            coordinates: None,
        };

        let result =
            match tokio::time::timeout(self.options.timeout, source.current_position(&self.options))
                .await
            {
                Ok(result) => result,
                Err(_) => Err(PositionError::Timeout),
            };

        match result {
            Ok(coordinates) => {
                tracing::info!(
                    "Got location: {}, {}",
                    coordinates.latitude,
                    coordinates.longitude
                );
                *self.state.lock() = GeolocationState {
                    loading: false,
                    error: None,
                    coordinates: Some(coordinates),
                };
                Some(coordinates)
            }
            Err(e) => {
                tracing::warn!("Location request failed: {}", e);
                *self.state.lock() = GeolocationState {
                    loading: false,
                    error: Some(e.user_message().to_string()),
                    coordinates: None,
                };
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Failing(PositionError);

    impl PositionSource for Failing {
        async fn current_position(
            &self,
            _options: &PositionOptions,
        ) -> Result<Coordinates, PositionError> {
            Err(self.0.clone())
        }
    }

    struct Hanging;

    impl PositionSource for Hanging {
        async fn current_position(
            &self,
            _options: &PositionOptions,
        ) -> Result<Coordinates, PositionError> {
            std::future::pending().await
        }
    }

    #[tokio::test]
    async fn test_request_runs_on_spawned_task() {
        fn spawn_locate<S: PositionSource + 'static>(
            requester: std::sync::Arc<GeolocationRequester<S>>,
        ) -> tokio::task::JoinHandle<Option<Coordinates>> {
            tokio::spawn(async move { requester.get_current_location().await })
        }

        let requester = std::sync::Arc::new(GeolocationRequester::new(ConfiguredPosition::new(
            -33.9, 18.4,
        )));
        let coords = spawn_locate(requester.clone()).await.unwrap();

        assert_eq!(coords, Some(Coordinates::new(-33.9, 18.4)));
        assert!(!requester.state().loading);
    }

    #[tokio::test]
    async fn test_resolves_configured_position() {
        let requester = GeolocationRequester::new(ConfiguredPosition::new(47.6, -122.3));
        let coords = requester.get_current_location().await;

        assert_eq!(coords, Some(Coordinates::new(47.6, -122.3)));
        let state = requester.state();
        assert!(!state.loading);
        assert!(state.error.is_none());
        assert_eq!(state.coordinates, coords);
    }

    #[tokio::test]
    async fn test_unsupported() {
        let requester = GeolocationRequester::<ConfiguredPosition>::unsupported();
        assert!(requester.get_current_location().await.is_none());
        assert_eq!(requester.state().error.as_deref(), Some(UNSUPPORTED_MESSAGE));
    }

    #[tokio::test]
    async fn test_failures_map_to_messages() {
        let cases = [
            (PositionError::PermissionDenied, PERMISSION_DENIED_MESSAGE),
            (PositionError::PositionUnavailable, UNAVAILABLE_MESSAGE),
            (PositionError::Timeout, TIMEOUT_MESSAGE),
            (PositionError::Other("code 9".into()), GENERIC_MESSAGE),
        ];

        for (error, message) in cases {
            let requester = GeolocationRequester::new(Failing(error));
            assert!(requester.get_current_location().await.is_none());
            let state = requester.state();
            assert_eq!(state.error.as_deref(), Some(message));
            assert!(!state.loading);
            assert!(state.coordinates.is_none());
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_times_out_after_ten_seconds() {
        let requester = GeolocationRequester::new(Hanging);
        let started = tokio::time::Instant::now();

        assert!(requester.get_current_location().await.is_none());
        assert_eq!(started.elapsed(), Duration::from_secs(10));
        assert_eq!(requester.state().error.as_deref(), Some(TIMEOUT_MESSAGE));
    }

    #[tokio::test]
    async fn test_new_request_clears_previous_error() {
        let requester = GeolocationRequester::with_options(
            Some(ConfiguredPosition::new(1.0, 2.0)),
            PositionOptions::default(),
        );
        requester.state.lock().error = Some(GENERIC_MESSAGE.to_string());

        assert!(requester.get_current_location().await.is_some());
        assert!(requester.state().error.is_none());
    }
}
