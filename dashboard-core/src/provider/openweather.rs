use anyhow::Context;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, de::DeserializeOwned};
use std::{sync::Arc, time::Duration};

use crate::{
    error::GatewayError,
    model::{CurrentWeather, ForecastBundle, Units},
};

use super::WeatherProvider;

pub const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org/data/2.5";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
const USER_AGENT: &str = concat!("weather-dashboard/", env!("CARGO_PKG_VERSION"));
const GENERIC_ERROR: &str = "An error occurred while fetching data.";

#[derive(Debug, Clone)]
pub struct OpenWeatherProvider {
    api_key: Option<String>,
    base_url: String,
    units: Units,
    http: Arc<Client>,
}

#[derive(Debug, Default)]
pub struct OpenWeatherProviderBuilder {
    api_key: Option<String>,
    base_url: Option<String>,
    units: Units,
    timeout: Option<Duration>,
}

impl OpenWeatherProviderBuilder {
    pub fn api_key(mut self, api_key: Option<String>) -> Self {
        self.api_key = api_key;
        self
    }

    pub fn base_url(mut self, base_url: &str) -> Self {
        self.base_url = Some(base_url.trim_end_matches('/').to_string());
        self
    }

    pub fn units(mut self, units: Units) -> Self {
        self.units = units;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn build(self) -> anyhow::Result<OpenWeatherProvider> {
        let http = Client::builder()
            .timeout(self.timeout.unwrap_or(DEFAULT_TIMEOUT))
            .user_agent(USER_AGENT)
            .build()
            .context("Failed to build HTTP client for OpenWeatherMap")?;

        Ok(OpenWeatherProvider {
            api_key: self.api_key.filter(|k| !k.trim().is_empty()),
            base_url: self.base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            units: self.units,
            http: Arc::new(http),
        })
    }
}

impl OpenWeatherProvider {
    pub fn builder() -> OpenWeatherProviderBuilder {
        OpenWeatherProviderBuilder::default()
    }

    pub fn units(&self) -> Units {
        self.units
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        city: &str,
    ) -> Result<T, GatewayError> {
        let api_key = self.api_key.as_deref().ok_or(GatewayError::MissingCredential)?;
        let url = format!("{}/{}", self.base_url, endpoint);

        tracing::debug!(endpoint, city, "requesting OpenWeatherMap");

        let res = self
            .http
            .get(&url)
            .query(&[("q", city), ("appid", api_key), ("units", self.units.as_str())])
            .send()
            .await?;

        let status = res.status();
        let body = res.text().await?;

        if !status.is_success() {
            let message = provider_message(&body);
            tracing::debug!(endpoint, city, %status, %message, "OpenWeatherMap request failed");

            return Err(if status == StatusCode::NOT_FOUND {
                GatewayError::UnknownLocation { city: city.to_string(), message }
            } else {
                GatewayError::Provider { status: status.as_u16(), message }
            });
        }

        serde_json::from_str(&body).map_err(|e| {
            GatewayError::MalformedResponse(format!("{endpoint} for '{city}': {e}"))
        })
    }
}

/// Error payload returned alongside non-success statuses.
#[derive(Debug, Deserialize)]
struct OwErrorBody {
    #[serde(default)]
    message: Option<String>,
}

fn provider_message(body: &str) -> String {
    match serde_json::from_str::<OwErrorBody>(body) {
        Ok(OwErrorBody { message: Some(m) }) if !m.trim().is_empty() => m,
        _ if !body.trim().is_empty() && !body.trim_start().starts_with('{') => {
            truncate_body(body.trim())
        }
        _ => GENERIC_ERROR.to_string(),
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherProvider {
    fn has_credential(&self) -> bool {
        self.api_key.is_some()
    }

    async fn current(&self, city: &str) -> Result<CurrentWeather, GatewayError> {
        self.get_json("weather", city).await
    }

    async fn forecast(&self, city: &str) -> Result<ForecastBundle, GatewayError> {
        self.get_json("forecast", city).await
    }
}
