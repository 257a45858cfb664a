//! Errors from talking to the Weatherly proxy.

use thiserror::Error;
use weatherly_core::{AppError, NetworkError, ReqwestErrorExt, WeatherError};

#[derive(Error, Debug)]
pub enum ClientError {
    /// The proxy answered with a non-success status
    #[error("Proxy returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    Decode(String),
}

impl ClientError {
    /// User-friendly error message for display.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::Status { status, .. } if *status >= 500 => {
                "The weather service is having trouble. Please try again later."
            }
            Self::Status { .. } => "The request was rejected. Please try again.",
            Self::Network(_) => "Network error. Check your connection.",
            Self::Decode(_) => "Received an unexpected response. Please try again.",
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<ClientError> for AppError {
    fn from(e: ClientError) -> Self {
        match e {
            ClientError::Status { status, body } if status >= 500 => {
                AppError::Network(NetworkError::ServerError {
                    status,
                    message: body,
                })
            }
            ClientError::Status { status, body } => {
                AppError::Weather(WeatherError::ApiError(format!("{}: {}", status, body)))
            }
            ClientError::Network(e) => AppError::Network(e.into_network_error()),
            ClientError::Decode(s) => AppError::Network(NetworkError::InvalidResponse(s)),
        }
    }
}
