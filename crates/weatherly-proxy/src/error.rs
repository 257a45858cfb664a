//! Proxy failures and the JSON bodies they are reported with.

use serde_json::{json, Value};
use thiserror::Error;
use warp::http::StatusCode;
use warp::reply::Response;
use warp::Reply;

#[derive(Error, Debug)]
pub enum ProxyError {
    #[error("Method not allowed")]
    MethodNotAllowed,

    #[error("namePrefix parameter is required")]
    NamePrefixRequired,

    #[error("namePrefix is too long (max {max} characters)")]
    NamePrefixTooLong { max: usize },

    #[error("Missing required parameters")]
    MissingWeatherParameters,

    #[error("Invalid latitude (must be between -90 and 90)")]
    InvalidLatitude,

    #[error("Invalid longitude (must be between -180 and 180)")]
    InvalidLongitude,

    #[error("Invalid type parameter")]
    InvalidType,

    /// A required credential is not configured; `name` is logged, never sent
    #[error("Server configuration error")]
    MissingCredential { name: &'static str },

    #[error("Weather API authentication failed")]
    WeatherAuthFailed,

    /// Upstream answered with a non-success status
    #[error("{message}")]
    Upstream {
        status: u16,
        message: &'static str,
        details: String,
    },

    #[error("Internal server error")]
    Internal(String),
}

impl ProxyError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Self::NamePrefixRequired
            | Self::NamePrefixTooLong { .. }
            | Self::MissingWeatherParameters
            | Self::InvalidLatitude
            | Self::InvalidLongitude
            | Self::InvalidType => StatusCode::BAD_REQUEST,
            Self::MissingCredential { .. } | Self::WeatherAuthFailed | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            Self::Upstream { status, .. } => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY)
            }
        }
    }

    pub fn body(&self) -> Value {
        let error = self.to_string();
        match self {
            Self::MissingWeatherParameters => json!({
                "error": error,
                "required": ["lat", "lon", "type"],
            }),
            Self::InvalidType => json!({
                "error": error,
                "allowed": ["current", "forecast"],
            }),
            Self::WeatherAuthFailed => json!({
                "error": error,
                "details": "Invalid API key configuration",
            }),
            Self::Upstream { details, .. } => json!({
                "error": error,
                "details": details,
            }),
            Self::Internal(message) => json!({
                "error": error,
                "message": message,
            }),
            _ => json!({ "error": error }),
        }
    }

    /// Server-side description, including what is kept out of the body.
    pub fn log_message(&self) -> String {
        match self {
            Self::MissingCredential { name } => format!("{} environment variable is not set", name),
            Self::Upstream { details, .. } => format!("{}: {}", self, details),
            Self::Internal(message) => format!("{}: {}", self, message),
            _ => self.to_string(),
        }
    }

    pub fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("{}: {}", status, self.log_message());
        } else {
            tracing::debug!("{}: {}", status, self);
        }
        warp::reply::with_status(warp::reply::json(&self.body()), status).into_response()
    }
}

impl From<reqwest::Error> for ProxyError {
    fn from(err: reqwest::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bodies() {
        assert_eq!(
            ProxyError::NamePrefixTooLong { max: 100 }.body(),
            json!({"error": "namePrefix is too long (max 100 characters)"})
        );
        assert_eq!(
            ProxyError::MissingCredential { name: "RAPIDAPI_KEY" }.body(),
            json!({"error": "Server configuration error"})
        );
        assert_eq!(
            ProxyError::InvalidType.body()["allowed"],
            json!(["current", "forecast"])
        );
    }

    #[test]
    fn test_missing_credential_is_logged_by_name() {
        let err = ProxyError::MissingCredential { name: "RAPIDAPI_KEY" };
        assert_eq!(err.log_message(), "RAPIDAPI_KEY environment variable is not set");
        assert!(!err.body().to_string().contains("RAPIDAPI_KEY"));
    }

    #[test]
    fn test_upstream_status_is_mirrored() {
        let err = ProxyError::Upstream {
            status: 429,
            message: "Failed to fetch cities from GeoDB API",
            details: "Too Many Requests".into(),
        };
        assert_eq!(err.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(err.body()["details"], "Too Many Requests");
        assert_eq!(ProxyError::WeatherAuthFailed.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
