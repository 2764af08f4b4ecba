use anyhow::{Context, anyhow};
use clap::{Parser, Subcommand};
use dashboard_core::{Config, Dashboard, Gateway, GatewayError, Units};
use inquire::{Password, PasswordDisplayMode, Select, Text};

use crate::render;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather-dashboard", version, about = "Weather dashboard in the terminal")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the API key, default city, secondary cities and units.
    Configure,

    /// Show current conditions, forecast and other cities.
    Show {
        /// City name; defaults to the configured default city.
        city: Option<String>,

        /// Print the fetched records as JSON instead of text.
        #[arg(long)]
        json: bool,
    },

    /// Show current conditions for a list of cities, skipping any that fail.
    Snapshots {
        #[arg(required = true)]
        cities: Vec<String>,
    },

    /// Search cities repeatedly from a prompt.
    Interactive,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        let config = Config::load()?;

        match self.command {
            Command::Configure => configure(config),
            Command::Show { city, json } => show(&config, city, json).await,
            Command::Snapshots { cities } => snapshots(&config, &cities).await,
            Command::Interactive => interactive(&config).await,
        }
    }
}

fn configure(mut config: Config) -> anyhow::Result<()> {
    let api_key = Password::new("OpenWeatherMap API key:")
        .with_display_mode(PasswordDisplayMode::Masked)
        .without_confirmation()
        .with_help_message("Leave empty to keep the current key")
        .prompt()
        .context("Failed to read API key")?;
    if !api_key.trim().is_empty() {
        config.set_api_key(api_key);
    }

    config.default_city = Text::new("Default city:")
        .with_default(&config.default_city)
        .prompt()
        .context("Failed to read default city")?
        .trim()
        .to_string();

    let secondary = Text::new("Other cities (comma separated):")
        .with_default(&config.secondary_cities.join(", "))
        .prompt()
        .context("Failed to read other cities")?;
    config.set_secondary_cities(secondary.split(','));

    let starting = Units::all().iter().position(|u| *u == config.units).unwrap_or(0);
    config.units = Select::new("Units:", Units::all().to_vec())
        .with_starting_cursor(starting)
        .prompt()
        .context("Failed to read units")?;

    let path = config.save()?;
    println!("Configuration saved to {}", path.display());

    if config.effective_api_key().is_none() {
        println!("Note: no API key configured; requests will fail until one is set.");
    }
    Ok(())
}

async fn show(config: &Config, city: Option<String>, json: bool) -> anyhow::Result<()> {
    let dashboard = Dashboard::from_config(config)?;
    let city = city.unwrap_or_else(|| config.default_city.clone());

    let outcome = dashboard.change_city(&city).await;
    let primary = outcome.primary.map_err(user_error)?;
    let snapshots = outcome.snapshots.unwrap_or_default();

    if json {
        let out = serde_json::json!({
            "primary": &*primary,
            "snapshots": snapshots.as_slice(),
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        print!("{}", render::primary(&primary, config.units));
        print!("{}", render::snapshots(&snapshots, config.units));
    }
    Ok(())
}

async fn snapshots(config: &Config, cities: &[String]) -> anyhow::Result<()> {
    let gateway = Gateway::from_config(config)?;
    let snapshots = gateway.fetch_snapshots(cities).await.map_err(user_error)?;

    if snapshots.is_empty() {
        println!("No weather available for the requested cities.");
    } else {
        print!("{}", render::snapshots(&snapshots, config.units));
    }
    Ok(())
}

async fn interactive(config: &Config) -> anyhow::Result<()> {
    let dashboard = Dashboard::from_config(config)?;

    dashboard.refresh().await;
    print!("{}", render::view(&dashboard.view(), config.units));

    loop {
        let input = Text::new("City:")
            .with_help_message("Enter a city, :r to refresh, empty or :q to quit")
            .prompt()
            .context("Failed to read city")?;

        match input.trim() {
            "" | ":q" => break,
            ":r" => {
                dashboard.refresh().await;
            }
            city => {
                dashboard.change_city(city).await;
            }
        }
        print!("{}", render::view(&dashboard.view(), config.units));
    }
    Ok(())
}

/// Configuration errors keep their setup hint; everything else gets the short message.
fn user_error(err: GatewayError) -> anyhow::Error {
    if err.is_configuration() { anyhow::Error::new(err) } else { anyhow!(err.user_message()) }
}
