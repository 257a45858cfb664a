use crate::types::{FetchState, ForecastSnapshot, WeatherSnapshot, WeatherView};

/// The one thing the main area shows
#[derive(Debug, Clone, PartialEq)]
pub enum Screen<'a> {
    Error(&'a str),
    Loading,
    Favorites,
    Empty,
    Weather {
        current: &'a WeatherSnapshot,
        forecast: &'a ForecastSnapshot,
    },
}

/// Pick the screen for `view`. Errors win over loading, and both win over
/// the favorites panel.
pub fn select_view(view: &WeatherView, show_favorites: bool) -> Screen<'_> {
    match &view.state {
        FetchState::Error(message) => Screen::Error(message),
        FetchState::Loading => Screen::Loading,
        _ if show_favorites => Screen::Favorites,
        FetchState::Idle => Screen::Empty,
        FetchState::Success { current, forecast } => Screen::Weather { current, forecast },
    }
}
