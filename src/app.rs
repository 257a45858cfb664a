use std::sync::Arc;
use std::time::Duration;

use weatherly_core::{AppError, Config, LocationError, StorageError, WeatherError};
use weatherly_storage::Storage;
use weatherly_weather::{
    CitySearch, ConfiguredPosition, Coordinates, Favorites, GeolocationRequester, LocationOption,
    ProxyClient, Settings, WeatherFetcher,
};

/// Everything a command needs, wired once from configuration
pub struct App {
    config: Arc<Config>,
    settings: Settings,
    favorites: Favorites,
    search: CitySearch,
    fetcher: WeatherFetcher,
}

impl App {
    pub fn new(config: Config) -> Result<Self, AppError> {
        let storage = Storage::file(config.client.storage_dir());
        Self::with_storage(config, storage)
    }

    pub fn with_storage(config: Config, storage: Storage) -> Result<Self, AppError> {
        let client = ProxyClient::new(
            &config.client.api_base_url,
            Duration::from_secs(config.client.request_timeout_secs),
        )?;

        tracing::debug!("Using proxy at {}", client.base_url());

        Ok(Self {
            settings: Settings::new(&storage),
            favorites: Favorites::new(&storage),
            search: CitySearch::new(
                client.clone(),
                Duration::from_millis(config.client.search_debounce_ms),
            ),
            fetcher: WeatherFetcher::new(client),
            config: Arc::new(config),
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn favorites(&self) -> &Favorites {
        &self.favorites
    }

    pub fn search(&self) -> &CitySearch {
        &self.search
    }

    pub fn fetcher(&self) -> &WeatherFetcher {
        &self.fetcher
    }

    /// Saved state that could not be read and fell back to defaults.
    pub fn storage_problems(&self) -> Vec<StorageError> {
        [
            ("favorites", self.favorites.load_status()),
            ("temperature unit", self.settings.unit_load_status()),
        ]
        .into_iter()
        .filter_map(|(name, status)| {
            status
                .reason()
                .map(|reason| StorageError::ReadFailed(format!("{}: {}", name, reason)))
        })
        .collect()
    }

    /// Geolocation backed by the position in configuration, if any.
    pub fn locator(&self) -> GeolocationRequester<ConfiguredPosition> {
        match self.config.client.fixed_position() {
            Some((lat, lon)) => GeolocationRequester::new(ConfiguredPosition::new(lat, lon)),
            None => GeolocationRequester::unsupported(),
        }
    }

    /// The device position as a selectable location.
    pub async fn locate(&self) -> Result<Coordinates, AppError> {
        if !self.config.features.enable_geolocation {
            return Err(LocationError::Unsupported.into());
        }

        let locator = self.locator();
        match locator.get_current_location().await {
            Some(coordinates) => Ok(coordinates),
            None => {
                let message = locator.state().error.unwrap_or_default();
                Err(LocationError::Unavailable(message).into())
            }
        }
    }

    /// Best match for `name`, using the first search result.
    pub async fn find_city(&self, name: &str) -> Result<LocationOption, AppError> {
        let Some(options) = self.search.load_options(name).await else {
            return Err(WeatherError::InvalidLocation(name.to_string()).into());
        };

        if let Some(reason) = options.reason() {
            tracing::warn!("City search degraded: {}", reason);
            return Err(WeatherError::ServiceUnavailable.into());
        }

        options
            .into_value()
            .into_iter()
            .next()
            .ok_or_else(|| WeatherError::InvalidLocation(name.to_string()).into())
    }
}
