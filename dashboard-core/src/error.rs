//! Error taxonomy for gateway operations.
//!
//! Callers need to tell three situations apart:
//! - the app is misconfigured (no credential), which retrying never fixes
//! - the input named a place the provider does not know
//! - the provider or the network failed, or sent something unusable

use thiserror::Error;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error(
        "OpenWeatherMap API key is missing.\n\
         Hint: set OPENWEATHER_API_KEY or run `weather-dashboard configure`."
    )]
    MissingCredential,

    #[error("City name must not be empty")]
    EmptyCity,

    #[error("Location '{city}' not found: {message}")]
    UnknownLocation { city: String, message: String },

    #[error("Weather provider returned status {status}: {message}")]
    Provider { status: u16, message: String },

    #[error("Request to weather provider timed out")]
    Timeout,

    #[error("Network error: {0}")]
    Network(#[source] reqwest::Error),

    #[error("Malformed provider response: {0}")]
    MalformedResponse(String),
}

impl GatewayError {
    /// True for errors caused by local setup rather than input or provider state.
    pub fn is_configuration(&self) -> bool {
        matches!(self, GatewayError::MissingCredential)
    }

    pub fn is_retryable(&self) -> bool {
        match self {
            GatewayError::Timeout | GatewayError::Network(_) => true,
            GatewayError::Provider { status, .. } => *status >= 500 || *status == 429,
            _ => false,
        }
    }

    /// Message suitable for showing to the person at the dashboard.
    pub fn user_message(&self) -> String {
        match self {
            GatewayError::MissingCredential => {
                "The weather service is not configured. Add an OpenWeatherMap API key.".to_string()
            }
            GatewayError::EmptyCity => "Enter a city name to search.".to_string(),
            GatewayError::UnknownLocation { city, .. } => {
                format!("Could not find '{city}'. Try a different name.")
            }
            GatewayError::Provider { message, .. } => message.clone(),
            GatewayError::Timeout => {
                "The weather service took too long to respond. Please try again.".to_string()
            }
            GatewayError::Network(_) => {
                "Could not reach the weather service. Check your connection.".to_string()
            }
            GatewayError::MalformedResponse(_) => {
                "The weather service sent an unexpected response. Please try again later."
                    .to_string()
            }
        }
    }
}

/// The request URL carries the API key, so it is stripped before the error is kept.
impl From<reqwest::Error> for GatewayError {
    fn from(err: reqwest::Error) -> Self {
        let err = err.without_url();
        if err.is_timeout() {
            GatewayError::Timeout
        } else if err.is_decode() {
            GatewayError::MalformedResponse(err.to_string())
        } else {
            GatewayError::Network(err)
        }
    }
}
