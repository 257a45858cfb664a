//! Temperature conversion and display. Upstream data is always metric.

use crate::types::TemperatureUnit;

pub fn celsius_to_fahrenheit(celsius: f64) -> f64 {
    celsius * 9.0 / 5.0 + 32.0
}

/// A Celsius reading expressed in `unit`.
pub fn temperature_value(celsius: f64, unit: TemperatureUnit) -> f64 {
    match unit {
        TemperatureUnit::Celsius => celsius,
        TemperatureUnit::Fahrenheit => celsius_to_fahrenheit(celsius),
    }
}

/// Format a Celsius reading for display, e.g. `"32°F"`.
pub fn format_temperature(celsius: f64, unit: TemperatureUnit, decimals: usize) -> String {
    format!(
        "{:.*}{}",
        decimals,
        temperature_value(celsius, unit),
        unit.symbol()
    )
}
