use std::fmt::Write;

use dashboard_core::{
    DashboardView, OtherCitySnapshot, PrimaryWeather, Units,
    summary::{self, DAILY_DAYS, HOURLY_STEPS},
};

pub fn view(view: &DashboardView, units: Units) -> String {
    let mut out = String::new();

    if let Some(err) = &view.last_error {
        let _ = writeln!(out, "Error fetching weather data: {err}\n");
    }
    if let Some(weather) = &view.primary {
        out.push_str(&primary(weather, units));
    }
    out.push_str(&snapshots(&view.snapshots, units));
    out
}

pub fn primary(primary: &PrimaryWeather, units: Units) -> String {
    let t = units.temperature_suffix();
    let current = &primary.current;
    let offset = current.timezone;
    let mut out = String::new();

    let place = match current.country() {
        Some(country) => format!("{}, {}", current.name, country),
        None => current.name.clone(),
    };
    let _ = writeln!(out, "{place}   updated {}", summary::format_clock(current.dt, offset));

    if let Some(cond) = current.primary_condition() {
        let _ = writeln!(out, "  {:.0}{t}  {} ({})", current.main.temp, cond.main, cond.description);
    }
    let _ = writeln!(
        out,
        "  Feels like {:.0}{t}   H {:.0}{t}  L {:.0}{t}",
        current.main.feels_like, current.main.temp_max, current.main.temp_min
    );
    let _ = writeln!(
        out,
        "  Humidity {}%   Pressure {} hPa   Wind {:.1} {} {}",
        current.main.humidity,
        current.main.pressure,
        current.wind.speed,
        units.speed_suffix(),
        summary::compass(current.wind.deg)
    );
    if let Some(km) = current.visibility_km() {
        let _ = writeln!(out, "  Visibility {km:.1} km");
    }
    if let (Some(rise), Some(set)) = (current.sunrise(), current.sunset()) {
        let _ = writeln!(
            out,
            "  Sunrise {}   Sunset {}",
            summary::format_clock(rise, offset),
            summary::format_clock(set, offset)
        );
    }

    let hourly = summary::hourly(&primary.forecast, HOURLY_STEPS);
    if !hourly.is_empty() {
        let _ = writeln!(out, "\nNext hours");
        for entry in hourly {
            let label = entry.primary_condition().map(|c| c.main.as_str()).unwrap_or("");
            let _ = writeln!(
                out,
                "  {}  {:>4.0}{t}  {:>3}%  {}",
                summary::format_clock(entry.dt, offset),
                entry.main.temp,
                summary::pop_percent(entry),
                label
            );
        }
    }

    let daily = summary::daily_midday(&primary.forecast, DAILY_DAYS);
    if !daily.is_empty() {
        let _ = writeln!(out, "\nComing days");
        for entry in daily {
            let label = entry.primary_condition().map(|c| c.description.as_str()).unwrap_or("");
            let _ = writeln!(
                out,
                "  {:<10} {:>4.0}{t}  {}",
                summary::weekday(entry, offset),
                entry.main.temp,
                label
            );
        }
    }

    out
}

pub fn snapshots(snapshots: &[OtherCitySnapshot], units: Units) -> String {
    if snapshots.is_empty() {
        return String::new();
    }

    let t = units.temperature_suffix();
    let mut out = String::from("\nOther cities\n");
    for snap in snapshots {
        let label = snap.primary_condition().map(|c| c.main.as_str()).unwrap_or("");
        let _ = writeln!(out, "  {:<16} {:>4.0}{t}  {}", snap.name, snap.main.temp, label);
    }
    out
}
