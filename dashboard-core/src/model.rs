use serde::{Deserialize, Serialize};

/// Unit system passed to the provider as the `units` query parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Units {
    #[default]
    Metric,
    Imperial,
    Standard,
}

impl Units {
    pub fn as_str(&self) -> &'static str {
        match self {
            Units::Metric => "metric",
            Units::Imperial => "imperial",
            Units::Standard => "standard",
        }
    }

    pub const fn all() -> &'static [Units] {
        &[Units::Metric, Units::Imperial, Units::Standard]
    }

    /// Suffix for temperatures in this unit system.
    pub fn temperature_suffix(&self) -> &'static str {
        match self {
            Units::Metric => "°C",
            Units::Imperial => "°F",
            Units::Standard => "K",
        }
    }

    /// Suffix for wind speed in this unit system.
    pub fn speed_suffix(&self) -> &'static str {
        match self {
            Units::Imperial => "mph",
            Units::Metric | Units::Standard => "m/s",
        }
    }
}

impl std::fmt::Display for Units {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for Units {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_lowercase().as_str() {
            "metric" => Ok(Units::Metric),
            "imperial" => Ok(Units::Imperial),
            "standard" => Ok(Units::Standard),
            _ => Err(anyhow::anyhow!(
                "Unknown units '{value}'. Supported units: metric, imperial, standard."
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coord {
    pub lat: f64,
    pub lon: f64,
}

/// Categorical weather descriptor, e.g. `main = "Rain"`, `icon = "10d"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub id: u32,
    pub main: String,
    pub description: String,
    pub icon: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MainMetrics {
    pub temp: f64,
    pub feels_like: f64,
    pub temp_min: f64,
    pub temp_max: f64,
    pub pressure: u32,
    pub humidity: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Wind {
    pub speed: f64,
    #[serde(default)]
    pub deg: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gust: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Sys {
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub sunrise: Option<i64>,
    #[serde(default)]
    pub sunset: Option<i64>,
}

/// Current conditions for one resolved location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentWeather {
    #[serde(default)]
    pub id: u64,
    pub name: String,
    pub coord: Coord,
    pub weather: Vec<Condition>,
    pub main: MainMetrics,
    /// Meters. Some stations omit it.
    #[serde(default)]
    pub visibility: Option<u32>,
    pub wind: Wind,
    /// Capture time, epoch seconds.
    pub dt: i64,
    #[serde(default)]
    pub sys: Sys,
    /// Shift from UTC in seconds.
    pub timezone: i32,
}

impl CurrentWeather {
    /// First condition in the list. Validated records always have one.
    pub fn primary_condition(&self) -> Option<&Condition> {
        self.weather.first()
    }

    pub fn country(&self) -> Option<&str> {
        self.sys.country.as_deref()
    }

    pub fn sunrise(&self) -> Option<i64> {
        self.sys.sunrise
    }

    pub fn sunset(&self) -> Option<i64> {
        self.sys.sunset
    }

    pub fn visibility_km(&self) -> Option<f64> {
        self.visibility.map(|m| f64::from(m) / 1000.0)
    }
}

/// One three-hour step of the forecast.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastEntry {
    pub dt: i64,
    pub main: MainMetrics,
    pub weather: Vec<Condition>,
    pub wind: Wind,
    #[serde(default)]
    pub visibility: Option<u32>,
    /// Probability of precipitation, 0..=1.
    #[serde(default)]
    pub pop: f64,
    /// Provider timestamp text, `YYYY-MM-DD HH:MM:SS` in UTC.
    pub dt_txt: String,
}

impl ForecastEntry {
    pub fn primary_condition(&self) -> Option<&Condition> {
        self.weather.first()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastCity {
    #[serde(default)]
    pub id: u64,
    pub name: String,
    pub coord: Coord,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub timezone: i32,
    #[serde(default)]
    pub sunrise: Option<i64>,
    #[serde(default)]
    pub sunset: Option<i64>,
}

/// Forecast for one resolved location, entries ascending by `dt`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastBundle {
    pub list: Vec<ForecastEntry>,
    pub city: ForecastCity,
}

/// Reduced projection of [`CurrentWeather`] for the secondary-city list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OtherCitySnapshot {
    pub name: String,
    pub main: MainMetrics,
    pub weather: Vec<Condition>,
}

impl OtherCitySnapshot {
    pub fn primary_condition(&self) -> Option<&Condition> {
        self.weather.first()
    }
}

impl From<CurrentWeather> for OtherCitySnapshot {
    fn from(current: CurrentWeather) -> Self {
        Self { name: current.name, main: current.main, weather: current.weather }
    }
}

impl From<&CurrentWeather> for OtherCitySnapshot {
    fn from(current: &CurrentWeather) -> Self {
        Self {
            name: current.name.clone(),
            main: current.main.clone(),
            weather: current.weather.clone(),
        }
    }
}

/// Current conditions and forecast fetched together for the primary city.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrimaryWeather {
    pub current: CurrentWeather,
    pub forecast: ForecastBundle,
}

impl PrimaryWeather {
    /// Provider's canonical name for the location.
    pub fn resolved_name(&self) -> &str {
        &self.current.name
    }
}
