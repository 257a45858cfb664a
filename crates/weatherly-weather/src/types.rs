use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Label given to the location produced from the device position
pub const MY_LOCATION_LABEL: &str = "My Location";

/// Popular cities offered when the search input is empty, as `(value, label)`
pub const DEFAULT_CITIES: [(&str, &str); 8] = [
    ("40.7127281 -74.0060152", "New York, US"),
    ("51.5074456 -0.1277653", "London, GB"),
    ("48.8588897 2.3200410217200766", "Paris, FR"),
    ("35.6828387 139.7594549", "Tokyo, JP"),
    ("19.0759899 72.8773928", "Mumbai, IN"),
    ("-33.8698439 151.2082848", "Sydney, AU"),
    ("52.5170365 13.3888599", "Berlin, DE"),
    ("41.8933203 12.4829321", "Rome, IT"),
];

pub fn default_cities() -> Vec<LocationOption> {
    DEFAULT_CITIES
        .iter()
        .map(|(value, label)| LocationOption::new(*value, *label))
        .collect()
}

/// Temperature unit preference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TemperatureUnit {
    #[default]
    Celsius,
    Fahrenheit,
}

impl TemperatureUnit {
    pub fn symbol(&self) -> &'static str {
        match self {
            Self::Celsius => "°C",
            Self::Fahrenheit => "°F",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Celsius => "celsius",
            Self::Fahrenheit => "fahrenheit",
        }
    }
}

impl FromStr for TemperatureUnit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "celsius" | "c" => Ok(Self::Celsius),
            "fahrenheit" | "f" => Ok(Self::Fahrenheit),
            other => Err(format!("unknown temperature unit: {}", other)),
        }
    }
}

impl std::fmt::Display for TemperatureUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A selectable location.
///
/// `value` is `"<latitude> <longitude>"`. Lookups compare it as an exact
/// string, so `"45.0 1"` and `"45 1"` are different locations.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LocationOption {
    pub value: String,
    pub label: String,
}

impl LocationOption {
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
        }
    }

    /// Latitude and longitude as written in `value`.
    pub fn coordinates(&self) -> Option<(&str, &str)> {
        self.value.split_once(' ')
    }
}

/// Device position
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    pub fn to_location_option(&self) -> LocationOption {
        LocationOption::new(
            format!("{} {}", self.latitude, self.longitude),
            MY_LOCATION_LABEL,
        )
    }
}

/// A saved location
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FavoriteLocation {
    pub id: String,
    pub label: String,
    pub value: String,
    /// Milliseconds since the Unix epoch
    pub saved_at: i64,
}

impl FavoriteLocation {
    pub fn to_location_option(&self) -> LocationOption {
        LocationOption::new(self.value.clone(), self.label.clone())
    }
}

/// Which upstream payload the weather proxy should return
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeatherKind {
    Current,
    Forecast,
}

impl WeatherKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Current => "current",
            Self::Forecast => "forecast",
        }
    }
}

impl FromStr for WeatherKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "current" => Ok(Self::Current),
            "forecast" => Ok(Self::Forecast),
            other => Err(format!("unknown weather type: {}", other)),
        }
    }
}

/// Current conditions for a location, as returned upstream
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    pub city: String,
    pub data: serde_json::Value,
}

/// Multi-period forecast for a location, as returned upstream
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastSnapshot {
    pub city: String,
    pub data: serde_json::Value,
}

/// Progress of the most recent weather fetch
#[derive(Debug, Clone, PartialEq, Default)]
pub enum FetchState {
    #[default]
    Idle,
    Loading,
    Success {
        current: WeatherSnapshot,
        forecast: ForecastSnapshot,
    },
    Error(String),
}

/// Everything the view layer reads from the fetcher
#[derive(Debug, Clone, PartialEq, Default)]
pub struct WeatherView {
    pub state: FetchState,
    /// `value` of the location being shown, for favorite matching
    pub location_value: Option<String>,
}

impl WeatherView {
    pub fn is_loading(&self) -> bool {
        matches!(self.state, FetchState::Loading)
    }

    pub fn error(&self) -> Option<&str> {
        match &self.state {
            FetchState::Error(message) => Some(message),
            _ => None,
        }
    }

    pub fn current_weather(&self) -> Option<&WeatherSnapshot> {
        match &self.state {
            FetchState::Success { current, .. } => Some(current),
            _ => None,
        }
    }

    pub fn forecast(&self) -> Option<&ForecastSnapshot> {
        match &self.state {
            FetchState::Success { forecast, .. } => Some(forecast),
            _ => None,
        }
    }
}
