//! Plain-text rendering of orchestrator states.

use chrono::Local;
use skyfetch_core::{Weather, WeatherTheme};

pub fn loading() {
    eprintln!("Loading...");
}

pub fn weather(weather: &Weather) {
    print!("{}", summary(weather, &Local::now().format("%H:%M").to_string()));
}

fn place(weather: &Weather) -> String {
    [weather.city_name(), weather.region(), weather.country()]
        .into_iter()
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(", ")
}

fn summary(weather: &Weather, fetched_at: &str) -> String {
    let period = match weather.theme() {
        WeatherTheme::Day => "day",
        WeatherTheme::Night => "night",
    };

    format!(
        "{}\n  {:.1}°C  {}\n  {} · Humidity {}\n  ({period}, fetched at {fetched_at})\n",
        place(weather),
        weather.temperature_celsius(),
        weather.condition_text(),
        weather.feels_like_text(),
        weather.humidity_text(),
    )
}
