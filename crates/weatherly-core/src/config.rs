use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use url::Url;

pub const DEFAULT_API_BASE_URL: &str = "http://127.0.0.1:3000";
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";
pub const DEFAULT_RAPIDAPI_HOST: &str = "wft-geo-db.p.rapidapi.com";
pub const DEFAULT_WEATHER_API_URL: &str = "https://api.openweathermap.org/data/2.5";
pub const DEFAULT_SEARCH_DEBOUNCE_MS: u64 = 600;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Configuration validation errors
#[derive(Debug, Clone)]
pub struct ConfigValidationError {
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Result of config validation
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationResult {
    /// Returns true if there are no errors (warnings are OK)
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    pub fn add_warning(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Get a user-friendly message summarizing all errors
    pub fn error_summary(&self) -> String {
        self.errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ")
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Settings for the CLI client (search, fetch, local storage)
    #[serde(default)]
    pub client: ClientConfig,

    /// Settings for the credential-injecting proxy server
    #[serde(default)]
    pub proxy: ProxyConfig,

    #[serde(default)]
    pub features: FeatureFlags,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL of the proxy serving `/api/cities` and `/api/weather`
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Quiet period before a city search request fires
    #[serde(default = "default_search_debounce_ms")]
    pub search_debounce_ms: u64,

    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Directory holding persisted favorites and preferences
    #[serde(default)]
    pub storage_dir: Option<PathBuf>,

    /// Fixed device position used when no location service is available
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
}

fn default_api_base_url() -> String {
    DEFAULT_API_BASE_URL.to_string()
}

fn default_search_debounce_ms() -> u64 {
    DEFAULT_SEARCH_DEBOUNCE_MS
}

fn default_request_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            search_debounce_ms: default_search_debounce_ms(),
            request_timeout_secs: default_request_timeout_secs(),
            storage_dir: None,
            latitude: None,
            longitude: None,
        }
    }
}

impl ClientConfig {
    /// Configured storage directory, or `<data_dir>/weatherly`.
    pub fn storage_dir(&self) -> PathBuf {
        self.storage_dir.clone().unwrap_or_else(|| {
            dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("weatherly")
        })
    }

    /// The configured fixed position, if both coordinates are set.
    pub fn fixed_position(&self) -> Option<(f64, f64)> {
        self.latitude.zip(self.longitude)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProxyConfig {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// GeoDB Cities key (env: RAPIDAPI_KEY)
    #[serde(default)]
    pub rapidapi_key: Option<String>,

    /// GeoDB Cities host (env: RAPIDAPI_HOST)
    #[serde(default = "default_rapidapi_host")]
    pub rapidapi_host: String,

    /// Overrides `https://{rapidapi_host}` as the geocoding base URL
    #[serde(default)]
    pub geo_api_base_url: Option<String>,

    /// OpenWeatherMap key (env: WEATHER_API_KEY)
    #[serde(default)]
    pub weather_api_key: Option<String>,

    /// OpenWeatherMap base URL (env: WEATHER_API_URL)
    #[serde(default = "default_weather_api_url")]
    pub weather_api_url: String,
}

fn default_bind_addr() -> String {
    DEFAULT_BIND_ADDR.to_string()
}

fn default_rapidapi_host() -> String {
    DEFAULT_RAPIDAPI_HOST.to_string()
}

fn default_weather_api_url() -> String {
    DEFAULT_WEATHER_API_URL.to_string()
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            rapidapi_key: None,
            rapidapi_host: default_rapidapi_host(),
            geo_api_base_url: None,
            weather_api_key: None,
            weather_api_url: default_weather_api_url(),
        }
    }
}

impl ProxyConfig {
    /// Overlay credentials and hosts from the process environment.
    pub fn apply_env(&mut self) {
        self.apply_env_from(|name| std::env::var(name).ok());
    }

    /// Overlay settings using an arbitrary variable lookup.
    pub fn apply_env_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(key) = lookup("RAPIDAPI_KEY") {
            self.rapidapi_key = Some(key);
        }
        if let Some(host) = lookup("RAPIDAPI_HOST").filter(|h| !h.is_empty()) {
            self.rapidapi_host = host;
        }
        if let Some(key) = lookup("WEATHER_API_KEY") {
            self.weather_api_key = Some(key);
        }
        if let Some(url) = lookup("WEATHER_API_URL").filter(|u| !u.is_empty()) {
            self.weather_api_url = url;
        }
    }

    /// RapidAPI key, if set to a usable value.
    pub fn rapidapi_key(&self) -> Option<&str> {
        usable_secret(self.rapidapi_key.as_deref())
    }

    /// OpenWeatherMap key, if set to a usable value.
    pub fn weather_api_key(&self) -> Option<&str> {
        usable_secret(self.weather_api_key.as_deref())
    }

    /// Base URL for the GeoDB Cities API.
    pub fn geo_api_base_url(&self) -> String {
        match &self.geo_api_base_url {
            Some(url) => url.trim_end_matches('/').to_string(),
            None => format!("https://{}", self.rapidapi_host),
        }
    }
}

fn usable_secret(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty() && !v.starts_with("YOUR_"))
}

/// Toggles for optional client features
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureFlags {
    #[serde(default = "enabled")]
    pub enable_geolocation: bool,
    #[serde(default = "enabled")]
    pub enable_favorites: bool,
    #[serde(default = "enabled")]
    pub enable_unit_conversion: bool,
}

fn enabled() -> bool {
    true
}

impl Default for FeatureFlags {
    fn default() -> Self {
        Self {
            enable_geolocation: true,
            enable_favorites: true,
            enable_unit_conversion: true,
        }
    }
}

impl Config {
    /// Load configuration from the default location, creating it if missing.
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;
        Self::load_from(&config_path)
    }

    /// Load configuration from `path`, writing defaults there if it doesn't exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            let config = Self::default();
            config.save_to(path)?;
            return Ok(config);
        }

        let contents = std::fs::read_to_string(path).context("Failed to read config file")?;
        let config: Config = toml::from_str(&contents).context("Failed to parse config file")?;

        Ok(config)
    }

    /// Load configuration, overlay the environment and validate it.
    ///
    /// Warnings are logged; errors abort the load.
    pub fn load_validated() -> Result<(Self, ValidationResult)> {
        let mut config = Self::load()?;
        config.proxy.apply_env();
        let validation = config.validate();

        if !validation.is_valid() {
            anyhow::bail!(
                "Configuration validation failed: {}",
                validation.error_summary()
            );
        }

        for warning in &validation.warnings {
            tracing::warn!("Config warning: {}", warning);
        }

        Ok((config, validation))
    }

    pub fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::default();

        validate_url(&self.client.api_base_url, "client.api_base_url", &mut result);
        validate_url(&self.proxy.weather_api_url, "proxy.weather_api_url", &mut result);
        if let Some(url) = &self.proxy.geo_api_base_url {
            validate_url(url, "proxy.geo_api_base_url", &mut result);
        }

        if self.proxy.bind_addr.parse::<SocketAddr>().is_err() {
            result.add_error(
                "proxy.bind_addr",
                format!("Not a socket address: {}", self.proxy.bind_addr),
            );
        }

        if self.client.request_timeout_secs == 0 {
            result.add_error(
                "client.request_timeout_secs",
                "Request timeout must be greater than 0",
            );
        }

        if self.client.search_debounce_ms == 0 {
            result.add_warning(
                "client.search_debounce_ms",
                "Search debounce disabled (0 ms)",
            );
        } else if self.client.search_debounce_ms > 5000 {
            result.add_warning(
                "client.search_debounce_ms",
                "Search debounce is unusually long (>5s)",
            );
        }

        match (self.client.latitude, self.client.longitude) {
            (Some(lat), Some(lon)) => {
                if !(-90.0..=90.0).contains(&lat) {
                    result.add_error("client.latitude", "Latitude must be between -90 and 90");
                }
                if !(-180.0..=180.0).contains(&lon) {
                    result.add_error("client.longitude", "Longitude must be between -180 and 180");
                }
            }
            (None, None) => {}
            _ => result.add_error(
                "client.latitude",
                "Latitude and longitude must be set together",
            ),
        }

        result
    }

    /// Save configuration to the default location
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path, contents).context("Failed to write config file")?;

        Ok(())
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Failed to get config directory")?
            .join("weatherly");

        Ok(config_dir.join("config.toml"))
    }
}

fn validate_url(url_str: &str, field_name: &str, result: &mut ValidationResult) {
    match Url::parse(url_str) {
        Ok(url) => {
            if url.scheme() != "http" && url.scheme() != "https" {
                result.add_error(
                    field_name,
                    format!("URL must use http or https scheme, got: {}", url.scheme()),
                );
            }
            if url.host().is_none() {
                result.add_error(field_name, "URL must have a host");
            }
        }
        Err(e) => result.add_error(field_name, format!("Invalid URL: {}", e)),
    }
}
