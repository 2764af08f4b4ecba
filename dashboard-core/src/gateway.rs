//! Weather data gateway: the only place that talks to the provider.
//!
//! [`Gateway::fetch_primary`] is all-or-nothing: current conditions and forecast
//! either both arrive or the call fails. [`Gateway::fetch_snapshots`] is
//! best-effort: a city that fails is dropped from the result and logged.

use futures::stream::{FuturesUnordered, StreamExt};
use std::sync::Arc;

use crate::{
    Config,
    error::GatewayError,
    model::{CurrentWeather, ForecastBundle, OtherCitySnapshot, PrimaryWeather},
    provider::{WeatherProvider, provider_from_config},
};

#[derive(Debug, Clone)]
pub struct Gateway {
    provider: Arc<dyn WeatherProvider>,
}

impl Gateway {
    pub fn new<P: WeatherProvider + 'static>(provider: P) -> Self {
        Self { provider: Arc::new(provider) }
    }

    pub fn from_arc(provider: Arc<dyn WeatherProvider>) -> Self {
        Self { provider }
    }

    /// Gateway over OpenWeatherMap, configured from `config`.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        Ok(Self::new(provider_from_config(config)?))
    }

    fn ensure_credential(&self) -> Result<(), GatewayError> {
        if self.provider.has_credential() { Ok(()) } else { Err(GatewayError::MissingCredential) }
    }

    /// Current conditions and forecast for `city`, requested concurrently.
    pub async fn fetch_primary(&self, city: &str) -> Result<PrimaryWeather, GatewayError> {
        self.ensure_credential()?;

        let city = city.trim();
        if city.is_empty() {
            return Err(GatewayError::EmptyCity);
        }

        let (current, mut forecast) =
            tokio::try_join!(self.provider.current(city), self.provider.forecast(city))?;

        validate_current(&current)?;
        validate_forecast(&mut forecast)?;

        if !current.name.eq_ignore_ascii_case(&forecast.city.name) {
            tracing::warn!(
                query = city,
                current = %current.name,
                forecast = %forecast.city.name,
                "Provider resolved current and forecast to different names"
            );
        }

        tracing::info!(
            query = city,
            resolved = %current.name,
            entries = forecast.list.len(),
            "Fetched primary weather"
        );

        Ok(PrimaryWeather { current, forecast })
    }

    /// Snapshots for every city that could be fetched, in completion order.
    ///
    /// Only a missing credential fails the whole call.
    pub async fn fetch_snapshots<S: AsRef<str>>(
        &self,
        cities: &[S],
    ) -> Result<Vec<OtherCitySnapshot>, GatewayError> {
        self.ensure_credential()?;

        if cities.is_empty() {
            return Ok(Vec::new());
        }

        let mut pending: FuturesUnordered<_> = cities
            .iter()
            .map(|city| {
                let city = city.as_ref().trim();
                async move { (city, self.fetch_snapshot(city).await) }
            })
            .collect();

        let mut snapshots = Vec::with_capacity(cities.len());
        while let Some((city, result)) = pending.next().await {
            match result {
                Ok(snapshot) => snapshots.push(snapshot),
                Err(e) => tracing::warn!(city, error = %e, "Failed to fetch weather for city"),
            }
        }

        tracing::debug!(requested = cities.len(), fetched = snapshots.len(), "Fetched snapshots");
        Ok(snapshots)
    }

    async fn fetch_snapshot(&self, city: &str) -> Result<OtherCitySnapshot, GatewayError> {
        if city.is_empty() {
            return Err(GatewayError::EmptyCity);
        }

        let current = self.provider.current(city).await?;
        validate_current(&current)?;
        Ok(current.into())
    }
}

fn validate_current(current: &CurrentWeather) -> Result<(), GatewayError> {
    if current.weather.is_empty() {
        return Err(GatewayError::MalformedResponse(format!(
            "current weather for '{}' has no conditions",
            current.name
        )));
    }
    Ok(())
}

/// Rejects entries without conditions and puts entries in time order.
fn validate_forecast(forecast: &mut ForecastBundle) -> Result<(), GatewayError> {
    if let Some(entry) = forecast.list.iter().find(|e| e.weather.is_empty()) {
        return Err(GatewayError::MalformedResponse(format!(
            "forecast entry {} for '{}' has no conditions",
            entry.dt_txt, forecast.city.name
        )));
    }

    if !forecast.list.is_sorted_by_key(|e| e.dt) {
        forecast.list.sort_by_key(|e| e.dt);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        model::fixtures,
        testing::{FakeProvider, Reply},
    };

    fn gateway(provider: &Arc<FakeProvider>) -> Gateway {
        Gateway::from_arc(provider.clone())
    }

    #[tokio::test]
    async fn primary_returns_current_and_forecast_for_same_location() {
        let provider = Arc::new(FakeProvider::new().with_city("London", "London", 15.2, 8));

        let primary = gateway(&provider).fetch_primary("London").await.unwrap();

        assert_eq!(primary.current.main.temp, 15.2);
        assert_eq!(primary.forecast.list.len(), 8);
        assert_eq!(primary.resolved_name(), primary.forecast.city.name);
        assert_eq!(provider.current_calls(), 1);
        assert_eq!(provider.forecast_calls(), 1);
    }

    #[tokio::test]
    async fn primary_uses_provider_resolved_name() {
        let provider = Arc::new(FakeProvider::new().with_city("new york", "New York", 20.0, 4));

        let primary = gateway(&provider).fetch_primary("  new york ").await.unwrap();

        assert_eq!(primary.resolved_name(), "New York");
    }

    #[tokio::test]
    async fn primary_fails_when_only_forecast_fails() {
        let provider = Arc::new(
            FakeProvider::new()
                .with_current("London", Reply::Json(fixtures::current_json("London", 15.2)))
                .with_forecast("London", Reply::Status(500)),
        );

        let err = gateway(&provider).fetch_primary("London").await.unwrap_err();

        assert!(matches!(err, GatewayError::Provider { status: 500, .. }));
    }

    #[tokio::test]
    async fn primary_fails_when_only_current_fails() {
        let provider = Arc::new(
            FakeProvider::new()
                .with_current("London", Reply::Status(401))
                .with_forecast("London", Reply::Json(fixtures::forecast_json("London", 8))),
        );

        let err = gateway(&provider).fetch_primary("London").await.unwrap_err();

        assert!(matches!(err, GatewayError::Provider { status: 401, .. }));
    }

    #[tokio::test]
    async fn primary_unknown_city_is_unknown_location() {
        let provider = Arc::new(FakeProvider::new());

        let err = gateway(&provider).fetch_primary("Atlantis").await.unwrap_err();

        assert!(matches!(err, GatewayError::UnknownLocation { .. }));
    }

    #[tokio::test]
    async fn primary_twice_gives_identical_results() {
        let provider = Arc::new(FakeProvider::new().with_city("Paris", "Paris", 18.4, 40));
        let gw = gateway(&provider);

        let first = gw.fetch_primary("Paris").await.unwrap();
        let second = gw.fetch_primary("Paris").await.unwrap();

        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn primary_rejects_blank_city_without_requests() {
        let provider = Arc::new(FakeProvider::new());

        let err = gateway(&provider).fetch_primary("   ").await.unwrap_err();

        assert!(matches!(err, GatewayError::EmptyCity));
        assert_eq!(provider.total_calls(), 0);
    }

    #[tokio::test]
    async fn primary_rejects_empty_condition_list() {
        let mut current = fixtures::current_json("London", 15.2);
        current["weather"] = serde_json::json!([]);
        let provider = Arc::new(
            FakeProvider::new()
                .with_current("London", Reply::Json(current))
                .with_forecast("London", Reply::Json(fixtures::forecast_json("London", 8))),
        );

        let err = gateway(&provider).fetch_primary("London").await.unwrap_err();

        assert!(matches!(err, GatewayError::MalformedResponse(_)));
    }

    #[tokio::test]
    async fn primary_rejects_forecast_entry_without_conditions() {
        let mut forecast = fixtures::forecast_json("London", 8);
        forecast["list"][3]["weather"] = serde_json::json!([]);
        let provider = Arc::new(
            FakeProvider::new()
                .with_current("London", Reply::Json(fixtures::current_json("London", 15.2)))
                .with_forecast("London", Reply::Json(forecast)),
        );

        let err = gateway(&provider).fetch_primary("London").await.unwrap_err();

        assert!(matches!(err, GatewayError::MalformedResponse(_)));
    }

    #[tokio::test]
    async fn primary_orders_forecast_entries_by_time() {
        let mut forecast = fixtures::forecast_json("London", 4);
        if let Some(list) = forecast["list"].as_array_mut() {
            list.reverse();
        }
        let provider = Arc::new(
            FakeProvider::new()
                .with_current("London", Reply::Json(fixtures::current_json("London", 15.2)))
                .with_forecast("London", Reply::Json(forecast)),
        );

        let primary = gateway(&provider).fetch_primary("London").await.unwrap();

        assert!(primary.forecast.list.windows(2).all(|w| w[0].dt < w[1].dt));
    }

    #[tokio::test]
    async fn missing_credential_fails_before_any_request() {
        let provider = Arc::new(
            FakeProvider::new().without_credential().with_city("London", "London", 15.2, 8),
        );
        let gw = gateway(&provider);

        let primary = gw.fetch_primary("London").await.unwrap_err();
        let snapshots = gw.fetch_snapshots(&["Paris", "Tokyo"]).await.unwrap_err();
        let empty = gw.fetch_snapshots::<&str>(&[]).await.unwrap_err();

        assert!(primary.is_configuration());
        assert!(snapshots.is_configuration());
        assert!(empty.is_configuration());
        assert_eq!(provider.total_calls(), 0);
    }

    #[tokio::test]
    async fn snapshots_skip_failed_cities() {
        let provider = Arc::new(
            FakeProvider::new()
                .with_city("Paris", "Paris", 18.0, 1)
                .with_current("Atlantis", Reply::Status(404))
                .with_city("Tokyo", "Tokyo", 24.0, 1),
        );

        let snapshots =
            gateway(&provider).fetch_snapshots(&["Paris", "Atlantis", "Tokyo"]).await.unwrap();

        let mut names: Vec<_> = snapshots.iter().map(|s| s.name.as_str()).collect();
        names.sort();
        assert_eq!(names, vec!["Paris", "Tokyo"]);
        assert_eq!(provider.current_calls(), 3);
        assert_eq!(provider.forecast_calls(), 0);
    }

    #[tokio::test]
    async fn snapshots_return_n_minus_k_results() {
        let provider = Arc::new(
            FakeProvider::new()
                .with_city("A", "A", 1.0, 1)
                .with_current("B", Reply::Status(503))
                .with_city("C", "C", 3.0, 1)
                .with_current("D", Reply::Status(404))
                .with_city("E", "E", 5.0, 1),
        );
        let cities = vec!["A".to_string(), "B".into(), "C".into(), "D".into(), "E".into()];

        let snapshots = gateway(&provider).fetch_snapshots(cities.as_slice()).await.unwrap();

        assert_eq!(snapshots.len(), 3);
    }

    #[tokio::test]
    async fn snapshots_for_empty_list_make_no_requests() {
        let provider = Arc::new(FakeProvider::new());

        let snapshots = gateway(&provider).fetch_snapshots::<String>(&[]).await.unwrap();

        assert!(snapshots.is_empty());
        assert_eq!(provider.total_calls(), 0);
    }

    #[tokio::test]
    async fn snapshots_keep_duplicates() {
        let provider = Arc::new(FakeProvider::new().with_city("Paris", "Paris", 18.0, 1));

        let snapshots = gateway(&provider).fetch_snapshots(&["Paris", "paris"]).await.unwrap();

        assert_eq!(snapshots.len(), 2);
    }

    #[tokio::test]
    async fn snapshots_skip_blank_names_without_requests() {
        let provider = Arc::new(FakeProvider::new().with_city("Paris", "Paris", 18.0, 1));

        let snapshots = gateway(&provider).fetch_snapshots(&["", "Paris", "  "]).await.unwrap();

        assert_eq!(snapshots.len(), 1);
        assert_eq!(provider.current_calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn slow_city_does_not_block_or_fail_the_others() {
        let provider = Arc::new(
            FakeProvider::new()
                .with_city("Paris", "Paris", 18.0, 1)
                .with_current("Slowtown", Reply::Status(504))
                .with_delay("Slowtown", std::time::Duration::from_secs(30))
                .with_city("Tokyo", "Tokyo", 24.0, 1),
        );

        let snapshots =
            gateway(&provider).fetch_snapshots(&["Slowtown", "Paris", "Tokyo"]).await.unwrap();

        assert_eq!(snapshots.len(), 2);
        assert!(snapshots.iter().all(|s| s.name != "Slowtown"));
    }
}
