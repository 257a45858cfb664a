//! Request validation and forwarding for the two proxy endpoints.

use std::collections::HashMap;
use std::sync::Arc;
use warp::http::{Method, StatusCode};
use warp::reply::Response;
use warp::Reply;

use crate::error::ProxyError;
use crate::upstream::{Upstream, WeatherEndpoint};

pub const MAX_NAME_PREFIX_LEN: usize = 100;

type Query = HashMap<String, String>;

/// Answer preflight and reject anything that is not a GET.
fn check_method(method: &Method) -> Option<Response> {
    if *method == Method::OPTIONS {
        return Some(StatusCode::OK.into_response());
    }
    if *method != Method::GET {
        return Some(ProxyError::MethodNotAllowed.into_response());
    }
    None
}

fn reply(result: Result<serde_json::Value, ProxyError>) -> Response {
    match result {
        Ok(data) => warp::reply::json(&data).into_response(),
        Err(e) => e.into_response(),
    }
}

pub fn parse_name_prefix(query: &Query) -> Result<&str, ProxyError> {
    let prefix = query
        .get("namePrefix")
        .map(String::as_str)
        .filter(|p| !p.trim().is_empty())
        .ok_or(ProxyError::NamePrefixRequired)?;

    if prefix.chars().count() > MAX_NAME_PREFIX_LEN {
        return Err(ProxyError::NamePrefixTooLong {
            max: MAX_NAME_PREFIX_LEN,
        });
    }
    Ok(prefix)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeatherQuery {
    pub lat: f64,
    pub lon: f64,
    pub endpoint: WeatherEndpoint,
}

impl WeatherQuery {
    pub fn parse(query: &Query) -> Result<Self, ProxyError> {
        let param = |name: &str| query.get(name).filter(|v| !v.is_empty());
        let (Some(lat), Some(lon), Some(kind)) = (param("lat"), param("lon"), param("type")) else {
            return Err(ProxyError::MissingWeatherParameters);
        };

        let lat = lat
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|lat| (-90.0..=90.0).contains(lat))
            .ok_or(ProxyError::InvalidLatitude)?;
        let lon = lon
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|lon| (-180.0..=180.0).contains(lon))
            .ok_or(ProxyError::InvalidLongitude)?;
        let endpoint = match kind.as_str() {
            "current" => WeatherEndpoint::Current,
            "forecast" => WeatherEndpoint::Forecast,
            _ => return Err(ProxyError::InvalidType),
        };

        Ok(Self { lat, lon, endpoint })
    }
}

pub async fn cities(method: Method, query: Query, upstream: Arc<Upstream>) -> Response {
    if let Some(response) = check_method(&method) {
        return response;
    }

    let result = match parse_name_prefix(&query) {
        Ok(prefix) => upstream.cities(prefix).await,
        Err(e) => Err(e),
    };
    reply(result)
}

pub async fn weather(method: Method, query: Query, upstream: Arc<Upstream>) -> Response {
    if let Some(response) = check_method(&method) {
        return response;
    }

    let result = match WeatherQuery::parse(&query) {
        Ok(q) => upstream.weather(q.lat, q.lon, q.endpoint).await,
        Err(e) => Err(e),
    };
    reply(result)
}
