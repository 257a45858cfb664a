//! Display rows extracted from the upstream weather payloads.
//!
//! The payloads stay opaque JSON; these helpers read the few fields the
//! views show and tolerate anything missing.

use chrono::Weekday;
use serde_json::Value;

use crate::types::{ForecastSnapshot, WeatherSnapshot};

/// Forecast periods shown
pub const FORECAST_DAYS: usize = 7;

const WEEK_DAYS: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

/// Weekday names for the forecast rows, starting the day after `today`.
pub fn forecast_day_labels(today: Weekday) -> Vec<&'static str> {
    let start = today.succ().num_days_from_monday() as usize;
    WEEK_DAYS[start..]
        .iter()
        .chain(WEEK_DAYS[..start].iter())
        .copied()
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct ForecastRow {
    pub day: &'static str,
    pub description: Option<String>,
    pub temp_min: Option<f64>,
    pub temp_max: Option<f64>,
    pub humidity: Option<f64>,
    pub pressure: Option<f64>,
    pub wind_speed: Option<f64>,
}

/// Up to [`FORECAST_DAYS`] rows from a forecast `list`.
///
/// Returns nothing when the payload has no `list` array.
pub fn forecast_rows(forecast: &ForecastSnapshot, today: Weekday) -> Vec<ForecastRow> {
    let Some(list) = forecast.data.get("list").and_then(Value::as_array) else {
        return Vec::new();
    };

    list.iter()
        .take(FORECAST_DAYS)
        .zip(forecast_day_labels(today))
        .map(|(item, day)| ForecastRow {
            day,
            description: description(item),
            temp_min: number(item, &["main", "temp_min"]),
            temp_max: number(item, &["main", "temp_max"]),
            humidity: number(item, &["main", "humidity"]),
            pressure: number(item, &["main", "pressure"]),
            wind_speed: number(item, &["wind", "speed"]),
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct CurrentConditions {
    pub description: String,
    pub temp: f64,
    pub feels_like: Option<f64>,
    pub humidity: Option<f64>,
    pub pressure: Option<f64>,
    pub wind_speed: Option<f64>,
}

/// Headline conditions, or `None` if the payload lacks a description or
/// temperature.
pub fn current_conditions(current: &WeatherSnapshot) -> Option<CurrentConditions> {
    let data = &current.data;
    Some(CurrentConditions {
        description: description(data)?,
        temp: number(data, &["main", "temp"])?,
        feels_like: number(data, &["main", "feels_like"]),
        humidity: number(data, &["main", "humidity"]),
        pressure: number(data, &["main", "pressure"]),
        wind_speed: number(data, &["wind", "speed"]),
    })
}

fn description(item: &Value) -> Option<String> {
    item.get("weather")?
        .get(0)?
        .get("description")?
        .as_str()
        .map(str::to_string)
}

fn number(item: &Value, path: &[&str]) -> Option<f64> {
    path.iter()
        .try_fold(item, |value, key| value.get(key))?
        .as_f64()
}
