use anyhow::{Context, anyhow};
use clap::{Parser, Subcommand};
use inquire::{Confirm, Password, PasswordDisplayMode};
use skyfetch_core::{
    Config, CoordinateSource, FetchOrchestrator, FixedLocation, IpLocation, RequestHandle,
    UiState, WeatherApiClient, WeatherService, config::API_KEY_ENV,
};
use std::{path::PathBuf, sync::Arc};

use crate::render;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "skyfetch", version, about = "Current weather from WeatherAPI.com")]
pub struct Cli {
    /// Use this config file instead of the platform default.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the API key and location preferences.
    Configure,

    /// Current weather for a city.
    City {
        /// City name, e.g. "London".
        name: String,
    },

    /// Current weather at a latitude/longitude.
    Coords {
        #[arg(allow_negative_numbers = true)]
        latitude: f64,
        #[arg(allow_negative_numbers = true)]
        longitude: f64,
    },

    /// Current weather where you are.
    Here,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        let config = match &self.config {
            Some(path) => Config::load_from(path)?,
            None => Config::load()?,
        };

        match self.command {
            Command::Configure => configure(config, self.config),
            Command::City { name } => {
                let orch = orchestrator(&config)?;
                follow(&orch, orch.request_by_city(&name)).await
            }
            Command::Coords { latitude, longitude } => {
                let orch = orchestrator(&config)?;
                follow(&orch, orch.request_by_coordinates(latitude, longitude)).await
            }
            Command::Here => {
                let orch = orchestrator(&config)?;
                follow(&orch, orch.request_current_location()).await
            }
        }
    }
}

fn configure(mut config: Config, path: Option<PathBuf>) -> anyhow::Result<()> {
    let api_key = Password::new("WeatherAPI.com API key:")
        .with_display_mode(PasswordDisplayMode::Masked)
        .without_confirmation()
        .prompt()
        .context("Failed to read API key")?;

    if api_key.trim().is_empty() {
        return Err(anyhow!("API key must not be empty"));
    }

    let allow_location = Confirm::new("Allow `skyfetch here` to look up your location by IP?")
        .with_default(config.location.enabled)
        .prompt()
        .context("Failed to read location preference")?;

    config.api_key = Some(api_key.trim().to_string());
    config.location.enabled = allow_location;

    let saved_to = match path {
        Some(path) => {
            config.save_to(&path)?;
            path
        }
        None => config.save()?,
    };

    println!("Saved configuration to {}", saved_to.display());
    Ok(())
}

fn orchestrator(config: &Config) -> anyhow::Result<FetchOrchestrator> {
    let api_key = config.api_key(std::env::var(API_KEY_ENV).ok())?;

    let client = WeatherApiClient::new(config.base_url.as_str(), config.timeout())
        .context("Failed to build HTTP client")?;
    let service = WeatherService::new(Arc::new(client), api_key);

    let location: Arc<dyn CoordinateSource> = match config.location.fixed_coordinates() {
        Some(coords) => Arc::new(FixedLocation(coords)),
        None => Arc::new(
            IpLocation::new(
                config.location.ip_lookup_url.as_str(),
                config.location.enabled,
                config.timeout(),
            )
            .context("Failed to build location client")?,
        ),
    };

    Ok(FetchOrchestrator::new(service, location))
}

/// Print every state the request moves through until it settles.
async fn follow(orch: &FetchOrchestrator, handle: RequestHandle) -> anyhow::Result<()> {
    let mut rx = orch.subscribe();

    loop {
        let state = rx.borrow_and_update().clone();
        match state {
            UiState::Loading => render::loading(),
            UiState::Success(weather) => {
                render::weather(&weather);
                break;
            }
            UiState::Error(message) => {
                handle.join().await;
                return Err(anyhow!(message));
            }
            UiState::Idle => break,
        }

        if rx.changed().await.is_err() {
            break;
        }
    }

    handle.join().await;
    Ok(())
}
