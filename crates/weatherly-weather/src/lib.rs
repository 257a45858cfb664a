//! Weather client for Weatherly
//!
//! City search, device location, dual current/forecast fetching through the
//! Weatherly proxy, and the favorites and unit preference persisted through
//! `weatherly-storage`.

pub mod client;
pub mod error;
pub mod favorites;
pub mod fetcher;
pub mod forecast;
pub mod location;
pub mod search;
pub mod settings;
pub mod temperature;
pub mod types;
pub mod view;

pub use client::ProxyClient;
pub use error::ClientError;
pub use favorites::{Favorites, FAVORITES_STORAGE_KEY, MAX_FAVORITES};
pub use fetcher::WeatherFetcher;
pub use forecast::{
    current_conditions, forecast_day_labels, forecast_rows, CurrentConditions, ForecastRow,
};
pub use location::{
    ConfiguredPosition, GeolocationRequester, GeolocationState, PositionError, PositionOptions,
    PositionSource,
};
pub use search::CitySearch;
pub use settings::{Settings, UnitPreference};
pub use temperature::format_temperature;
pub use types::*;
pub use view::{select_view, Screen};
pub use weatherly_storage::Loaded;
