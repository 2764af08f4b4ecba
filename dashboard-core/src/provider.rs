use crate::{
    Config,
    error::GatewayError,
    model::{CurrentWeather, ForecastBundle},
    provider::openweather::OpenWeatherProvider,
};
use async_trait::async_trait;
use std::fmt::Debug;

pub mod openweather;

/// Transport to a weather provider: one call per endpoint, no aggregation.
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    /// Whether a usable credential is configured. Checked before any request.
    fn has_credential(&self) -> bool;

    async fn current(&self, city: &str) -> Result<CurrentWeather, GatewayError>;

    async fn forecast(&self, city: &str) -> Result<ForecastBundle, GatewayError>;
}

/// Construct the OpenWeatherMap transport from config.
///
/// A missing API key is not an error here; the gateway reports it on first use
/// so every operation fails the same way.
pub fn provider_from_config(config: &Config) -> anyhow::Result<OpenWeatherProvider> {
    OpenWeatherProvider::builder()
        .api_key(config.effective_api_key())
        .base_url(&config.base_url)
        .units(config.units)
        .timeout(config.timeout())
        .build()
}
