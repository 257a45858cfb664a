//! Plain-text rendering of the weather screens.

use chrono::Weekday;
use std::fmt::Write;

use weatherly_weather::{
    current_conditions, format_temperature, forecast_rows, FavoriteLocation, ForecastSnapshot,
    LocationOption, Screen, TemperatureUnit, WeatherSnapshot,
};

pub fn screen(
    screen: &Screen<'_>,
    unit: TemperatureUnit,
    today: Weekday,
    is_favorite: bool,
    favorites: &[FavoriteLocation],
) -> String {
    match screen {
        Screen::Error(message) => format!("Error: {}\n", message),
        Screen::Loading => "Loading weather...\n".to_string(),
        Screen::Favorites => favorites_list(favorites),
        Screen::Empty => "Search for a city to see the weather.\n".to_string(),
        Screen::Weather { current, forecast } => {
            let mut out = current_weather(current, unit, is_favorite);
            out.push_str(&forecast_table(forecast, unit, today));
            out
        }
    }
}

fn current_weather(current: &WeatherSnapshot, unit: TemperatureUnit, is_favorite: bool) -> String {
    let mut out = String::new();
    let marker = if is_favorite { " ♥" } else { "" };
    let _ = writeln!(out, "{}{}", current.city, marker);

    let Some(conditions) = current_conditions(current) else {
        out.push_str("  (no current conditions)\n");
        return out;
    };

    let _ = writeln!(
        out,
        "  {}  {}",
        format_temperature(conditions.temp, unit, 0),
        conditions.description
    );
    if let Some(feels_like) = conditions.feels_like {
        let _ = writeln!(out, "  Feels like  {}", format_temperature(feels_like, unit, 0));
    }
    if let Some(speed) = conditions.wind_speed {
        let _ = writeln!(out, "  Wind        {} m/s", speed);
    }
    if let Some(humidity) = conditions.humidity {
        let _ = writeln!(out, "  Humidity    {}%", humidity);
    }
    if let Some(pressure) = conditions.pressure {
        let _ = writeln!(out, "  Pressure    {} hPa", pressure);
    }
    out
}

fn forecast_table(forecast: &ForecastSnapshot, unit: TemperatureUnit, today: Weekday) -> String {
    let rows = forecast_rows(forecast, today);
    if rows.is_empty() {
        return String::new();
    }

    let mut out = String::from("\nDaily\n");
    for row in rows {
        let range = match (row.temp_min, row.temp_max) {
            (Some(min), Some(max)) => format!(
                "{} / {}",
                format_temperature(min, unit, 0),
                format_temperature(max, unit, 0)
            ),
            _ => "-".to_string(),
        };
        let _ = writeln!(
            out,
            "  {:<10} {:<20} {}",
            row.day,
            row.description.as_deref().unwrap_or(""),
            range
        );
    }
    out
}

pub fn favorites_list(favorites: &[FavoriteLocation]) -> String {
    if favorites.is_empty() {
        return "No favorites yet.\n".to_string();
    }

    let mut out = String::new();
    for fav in favorites {
        let _ = writeln!(out, "{}  {}  ({})", fav.id, fav.label, fav.value);
    }
    out
}

pub fn options(options: &[LocationOption]) -> String {
    let mut out = String::new();
    for option in options {
        let _ = writeln!(out, "{:<40} {}", option.label, option.value);
    }
    out
}
