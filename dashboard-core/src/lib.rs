//! Core library for the weather dashboard.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - The weather data gateway over OpenWeatherMap
//! - Shared domain models (current conditions, forecasts, snapshots)
//! - Dashboard state that reacts to city changes
//!
//! It is used by `dashboard-cli`, but can also back other front ends.

pub mod config;
pub mod error;
pub mod gateway;
pub mod model;
pub mod orchestrator;
pub mod provider;
pub mod summary;

#[cfg(test)]
mod testing;

pub use config::Config;
pub use error::GatewayError;
pub use gateway::Gateway;
pub use model::{
    Condition, CurrentWeather, ForecastBundle, ForecastEntry, OtherCitySnapshot, PrimaryWeather,
    Units,
};
pub use orchestrator::{CityChangeOutcome, Dashboard, DashboardView};
pub use provider::{WeatherProvider, openweather::OpenWeatherProvider};
