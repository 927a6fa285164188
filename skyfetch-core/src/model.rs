use serde::{Deserialize, Serialize};
use std::fmt;

/// A latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }
}

/// Formats as `"{lat},{lon}"`, the shape WeatherAPI accepts in `q`.
impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.latitude, self.longitude)
    }
}

/// What to ask the weather endpoint for.
#[derive(Debug, Clone, PartialEq)]
pub enum WeatherQuery {
    ByCity(String),
    ByCoordinates(Coordinates),
}

impl WeatherQuery {
    /// Build a city query. Returns `None` for a blank name.
    pub fn by_city(name: &str) -> Option<Self> {
        let name = name.trim();
        if name.is_empty() { None } else { Some(Self::ByCity(name.to_string())) }
    }

    pub fn by_coordinates(latitude: f64, longitude: f64) -> Self {
        Self::ByCoordinates(Coordinates::new(latitude, longitude))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WeatherTheme {
    Day,
    Night,
}

impl WeatherTheme {
    pub fn from_is_day(is_day: bool) -> Self {
        if is_day { Self::Day } else { Self::Night }
    }
}

/// Current conditions for one place, as presented to the UI.
///
/// Constructed once per successful fetch and never mutated; the theme is
/// derived from `is_day` at construction time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Weather {
    city_name: String,
    region: String,
    country: String,
    temperature_celsius: f64,
    feels_like_text: String,
    humidity_text: String,
    condition_text: String,
    condition_code: i32,
    is_day: bool,
    theme: WeatherTheme,
}

impl Weather {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        city_name: String,
        region: String,
        country: String,
        temperature_celsius: f64,
        feels_like_text: String,
        humidity_text: String,
        condition_text: String,
        condition_code: i32,
        is_day: bool,
    ) -> Self {
        Self {
            city_name,
            region,
            country,
            temperature_celsius,
            feels_like_text,
            humidity_text,
            condition_text,
            condition_code,
            is_day,
            theme: WeatherTheme::from_is_day(is_day),
        }
    }

    pub fn city_name(&self) -> &str {
        &self.city_name
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    pub fn country(&self) -> &str {
        &self.country
    }

    pub fn temperature_celsius(&self) -> f64 {
        self.temperature_celsius
    }

    pub fn feels_like_text(&self) -> &str {
        &self.feels_like_text
    }

    pub fn humidity_text(&self) -> &str {
        &self.humidity_text
    }

    pub fn condition_text(&self) -> &str {
        &self.condition_text
    }

    pub fn condition_code(&self) -> i32 {
        self.condition_code
    }

    pub fn is_day(&self) -> bool {
        self.is_day
    }

    pub fn theme(&self) -> WeatherTheme {
        self.theme
    }
}
