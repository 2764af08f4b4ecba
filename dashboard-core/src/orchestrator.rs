//! Dashboard state driven by city changes.
//!
//! Each change dispatches a primary fetch and a snapshot fetch together and
//! tags both with a sequence number. A result only lands if no newer change
//! was dispatched while it was in flight.

use parking_lot::RwLock;
use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};

use crate::{
    Config,
    error::GatewayError,
    gateway::Gateway,
    model::{OtherCitySnapshot, PrimaryWeather},
};

/// Immutable view of the dashboard at one point in time.
#[derive(Debug, Clone, Default)]
pub struct DashboardView {
    /// Resolved name of the last city fetched successfully.
    pub selected_city: String,
    pub primary: Option<Arc<PrimaryWeather>>,
    pub snapshots: Arc<Vec<OtherCitySnapshot>>,
    pub last_error: Option<String>,
}

/// What one city change produced, whether or not it was applied.
#[derive(Debug)]
pub struct CityChangeOutcome {
    pub sequence: u64,
    pub primary: Result<Arc<PrimaryWeather>, GatewayError>,
    pub snapshots: Result<Arc<Vec<OtherCitySnapshot>>, GatewayError>,
    pub primary_applied: bool,
    pub snapshots_applied: bool,
}

#[derive(Debug)]
pub struct Dashboard {
    gateway: Gateway,
    secondary_cities: Vec<String>,
    state: RwLock<DashboardView>,
    sequence: AtomicU64,
}

impl Dashboard {
    pub fn new(gateway: Gateway, initial_city: &str, secondary_cities: Vec<String>) -> Self {
        Self {
            gateway,
            secondary_cities,
            state: RwLock::new(DashboardView {
                selected_city: initial_city.trim().to_string(),
                ..DashboardView::default()
            }),
            sequence: AtomicU64::new(0),
        }
    }

    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        Ok(Self::new(
            Gateway::from_config(config)?,
            &config.default_city,
            config.secondary_cities.clone(),
        ))
    }

    pub fn view(&self) -> DashboardView {
        self.state.read().clone()
    }

    pub fn selected_city(&self) -> String {
        self.state.read().selected_city.clone()
    }

    /// Secondary cities to show alongside `city`, excluding `city` itself.
    ///
    /// Matching is on the typed query, not the provider-resolved name, so
    /// `"tokyo,jp"` does not exclude `"Tokyo"`.
    pub fn secondary_for(&self, city: &str) -> Vec<String> {
        let city = city.trim();
        self.secondary_cities
            .iter()
            .filter(|c| !c.trim().eq_ignore_ascii_case(city))
            .cloned()
            .collect()
    }

    /// Re-fetch everything for the currently selected city.
    pub async fn refresh(&self) -> CityChangeOutcome {
        let city = self.selected_city();
        self.change_city(&city).await
    }

    /// Fetch `city` and the secondary list, applying each result as it lands.
    ///
    /// On primary failure the displayed primary data is cleared and the error
    /// message is kept for display. `selected_city` is left at the last
    /// successfully resolved name.
    pub async fn change_city(&self, city: &str) -> CityChangeOutcome {
        let seq = self.sequence.fetch_add(1, Ordering::SeqCst) + 1;
        let secondary = self.secondary_for(city);

        tracing::debug!(seq, city, secondary = secondary.len(), "Dispatching city change");

        let primary_branch = async {
            let result = self.gateway.fetch_primary(city).await.map(Arc::new);
            let applied = self.apply_primary(seq, &result);
            (result, applied)
        };

        let snapshot_branch = async {
            let result = self.gateway.fetch_snapshots(secondary.as_slice()).await.map(Arc::new);
            let applied = self.apply_snapshots(seq, &result);
            (result, applied)
        };

        let ((primary, primary_applied), (snapshots, snapshots_applied)) =
            tokio::join!(primary_branch, snapshot_branch);

        CityChangeOutcome { sequence: seq, primary, snapshots, primary_applied, snapshots_applied }
    }

    fn is_latest(&self, seq: u64) -> bool {
        self.sequence.load(Ordering::SeqCst) == seq
    }

    fn apply_primary(&self, seq: u64, result: &Result<Arc<PrimaryWeather>, GatewayError>) -> bool {
        let mut state = self.state.write();
        if !self.is_latest(seq) {
            tracing::debug!(seq, "Discarding stale primary result");
            return false;
        }

        match result {
            Ok(primary) => {
                state.selected_city = primary.resolved_name().to_string();
                state.primary = Some(Arc::clone(primary));
                state.last_error = None;
            }
            Err(e) => {
                tracing::error!(seq, error = %e, "Failed to fetch weather");
                state.primary = None;
                state.last_error = Some(e.user_message());
            }
        }
        true
    }

    fn apply_snapshots(
        &self,
        seq: u64,
        result: &Result<Arc<Vec<OtherCitySnapshot>>, GatewayError>,
    ) -> bool {
        let mut state = self.state.write();
        if !self.is_latest(seq) {
            tracing::debug!(seq, "Discarding stale snapshot result");
            return false;
        }

        match result {
            Ok(snapshots) => state.snapshots = Arc::clone(snapshots),
            // Only configuration errors reach here; the primary branch reports them.
            Err(_) => state.snapshots = Arc::new(Vec::new()),
        }
        true
    }
}
