//! Weatherly API proxy
//!
//! Serves `/api/cities` and `/api/weather`, validating requests and
//! forwarding them to GeoDB and OpenWeatherMap with server-side credentials.

pub mod error;
pub mod handlers;
pub mod upstream;

use std::collections::HashMap;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio_util::sync::CancellationToken;
use warp::http::header::{HeaderMap, HeaderValue};
use warp::Filter;
use weatherly_core::ProxyConfig;

pub use error::ProxyError;
pub use upstream::{Upstream, WeatherEndpoint};

fn cors_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        "access-control-allow-credentials",
        HeaderValue::from_static("true"),
    );
    headers.insert("access-control-allow-origin", HeaderValue::from_static("*"));
    headers.insert(
        "access-control-allow-methods",
        HeaderValue::from_static("GET,OPTIONS"),
    );
    headers.insert(
        "access-control-allow-headers",
        HeaderValue::from_static("Content-Type"),
    );
    headers
}

fn with_upstream(
    upstream: Arc<Upstream>,
) -> impl Filter<Extract = (Arc<Upstream>,), Error = Infallible> + Clone {
    warp::any().map(move || upstream.clone())
}

/// Both endpoints, with CORS headers on every response.
pub fn routes(
    upstream: Arc<Upstream>,
) -> impl Filter<Extract = (impl warp::Reply,), Error = warp::Rejection> + Clone {
    let cities = warp::path!("api" / "cities")
        .and(warp::method())
        .and(warp::query::<HashMap<String, String>>())
        .and(with_upstream(upstream.clone()))
        .then(handlers::cities);

    let weather = warp::path!("api" / "weather")
        .and(warp::method())
        .and(warp::query::<HashMap<String, String>>())
        .and(with_upstream(upstream))
        .then(handlers::weather);

    cities
        .or(weather)
        .unify()
        .with(warp::reply::with::headers(cors_headers()))
}

/// Run the proxy until `shutdown` is cancelled.
pub async fn serve(config: ProxyConfig, shutdown: CancellationToken) -> Result<()> {
    let addr: SocketAddr = config
        .bind_addr
        .parse()
        .with_context(|| format!("Invalid bind address: {}", config.bind_addr))?;

    if config.rapidapi_key().is_none() {
        tracing::warn!("RAPIDAPI_KEY is not set; /api/cities will fail");
    }
    if config.weather_api_key().is_none() {
        tracing::warn!("WEATHER_API_KEY is not set; /api/weather will fail");
    }

    let upstream = Arc::new(Upstream::new(config));
    let (bound, server) = warp::serve(routes(upstream))
        .try_bind_with_graceful_shutdown(addr, async move { shutdown.cancelled().await })
        .with_context(|| format!("Failed to bind {}", addr))?;

    tracing::info!("Weatherly proxy listening on http://{}", bound);
    server.await;
    tracing::info!("Weatherly proxy stopped");
    Ok(())
}
