//! In-memory provider used by gateway and orchestrator tests.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::{
    collections::HashMap,
    sync::atomic::{AtomicUsize, Ordering},
    time::Duration,
};

use crate::{
    error::GatewayError,
    model::{CurrentWeather, ForecastBundle, fixtures},
    provider::WeatherProvider,
};

#[derive(Debug, Clone)]
pub enum Reply {
    Json(Value),
    Status(u16),
}

#[derive(Debug)]
pub struct FakeProvider {
    credential: bool,
    current: HashMap<String, Reply>,
    forecast: HashMap<String, Reply>,
    delays: HashMap<String, Duration>,
    current_calls: AtomicUsize,
    forecast_calls: AtomicUsize,
}

impl FakeProvider {
    pub fn new() -> Self {
        Self {
            credential: true,
            current: HashMap::new(),
            forecast: HashMap::new(),
            delays: HashMap::new(),
            current_calls: AtomicUsize::new(0),
            forecast_calls: AtomicUsize::new(0),
        }
    }

    pub fn without_credential(mut self) -> Self {
        self.credential = false;
        self
    }

    /// Register both endpoints for `query`, resolving to the canonical `name`.
    pub fn with_city(self, query: &str, name: &str, temp: f64, steps: usize) -> Self {
        self.with_current(query, Reply::Json(fixtures::current_json(name, temp)))
            .with_forecast(query, Reply::Json(fixtures::forecast_json(name, steps)))
    }

    pub fn with_current(mut self, query: &str, reply: Reply) -> Self {
        self.current.insert(query.to_lowercase(), reply);
        self
    }

    pub fn with_forecast(mut self, query: &str, reply: Reply) -> Self {
        self.forecast.insert(query.to_lowercase(), reply);
        self
    }

    pub fn with_delay(mut self, query: &str, delay: Duration) -> Self {
        self.delays.insert(query.to_lowercase(), delay);
        self
    }

    pub fn current_calls(&self) -> usize {
        self.current_calls.load(Ordering::SeqCst)
    }

    pub fn forecast_calls(&self) -> usize {
        self.forecast_calls.load(Ordering::SeqCst)
    }

    pub fn total_calls(&self) -> usize {
        self.current_calls() + self.forecast_calls()
    }

    async fn respond<T: DeserializeOwned>(
        &self,
        table: &HashMap<String, Reply>,
        city: &str,
    ) -> Result<T, GatewayError> {
        let key = city.to_lowercase();
        if let Some(delay) = self.delays.get(&key) {
            tokio::time::sleep(*delay).await;
        }

        match table.get(&key) {
            Some(Reply::Json(value)) => serde_json::from_value(value.clone())
                .map_err(|e| GatewayError::MalformedResponse(e.to_string())),
            Some(Reply::Status(404)) | None => Err(GatewayError::UnknownLocation {
                city: city.to_string(),
                message: "city not found".into(),
            }),
            Some(Reply::Status(status)) => {
                Err(GatewayError::Provider { status: *status, message: "provider failure".into() })
            }
        }
    }
}

#[async_trait]
impl WeatherProvider for FakeProvider {
    fn has_credential(&self) -> bool {
        self.credential
    }

    async fn current(&self, city: &str) -> Result<CurrentWeather, GatewayError> {
        self.current_calls.fetch_add(1, Ordering::SeqCst);
        self.respond(&self.current, city).await
    }

    async fn forecast(&self, city: &str) -> Result<ForecastBundle, GatewayError> {
        self.forecast_calls.fetch_add(1, Ordering::SeqCst);
        self.respond(&self.forecast, city).await
    }
}
