//! Views over a forecast for display: the next hours, one entry per day, local clock times.

use chrono::{DateTime, FixedOffset};

use crate::model::{ForecastBundle, ForecastEntry};

/// Eight three-hour steps cover the next 24 hours.
pub const HOURLY_STEPS: usize = 8;
pub const DAILY_DAYS: usize = 3;

const MIDDAY: &str = "12:00:00";

/// The first `n` forecast steps.
pub fn hourly(forecast: &ForecastBundle, n: usize) -> &[ForecastEntry] {
    &forecast.list[..n.min(forecast.list.len())]
}

/// Up to `n` entries stamped at midday, one per day.
pub fn daily_midday(forecast: &ForecastBundle, n: usize) -> Vec<&ForecastEntry> {
    forecast.list.iter().filter(|e| e.dt_txt.contains(MIDDAY)).take(n).collect()
}

/// Wall-clock time at a location `utc_offset_secs` away from UTC.
pub fn local_time(epoch: i64, utc_offset_secs: i32) -> Option<DateTime<FixedOffset>> {
    let offset = FixedOffset::east_opt(utc_offset_secs)?;
    DateTime::from_timestamp(epoch, 0).map(|dt| dt.with_timezone(&offset))
}

/// `HH:MM` in the location's local time, or `--:--` if out of range.
pub fn format_clock(epoch: i64, utc_offset_secs: i32) -> String {
    local_time(epoch, utc_offset_secs)
        .map(|t| t.format("%H:%M").to_string())
        .unwrap_or_else(|| "--:--".to_string())
}

/// Weekday name of `entry` in the location's local time.
pub fn weekday(entry: &ForecastEntry, utc_offset_secs: i32) -> String {
    local_time(entry.dt, utc_offset_secs).map(|t| t.format("%A").to_string()).unwrap_or_default()
}

pub fn pop_percent(entry: &ForecastEntry) -> u8 {
    (entry.pop.clamp(0.0, 1.0) * 100.0).round() as u8
}

/// Compass point for a wind direction in degrees.
pub fn compass(deg: u16) -> &'static str {
    const POINTS: [&str; 8] = ["N", "NE", "E", "SE", "S", "SW", "W", "NW"];
    let idx = ((f64::from(deg % 360) + 22.5) / 45.0) as usize % 8;
    POINTS[idx]
}
