use std::{fmt, sync::Arc};
use tracing::{debug, instrument, warn};

use crate::{
    client::WeatherApi,
    error::{FetchResult, classify},
    model::{Coordinates, Weather, WeatherQuery},
    normalize::normalize,
};

/// Weather client, normalizer and classifier behind one interface.
///
/// Every outcome comes back as a [`FetchResult`]. Dropping the returned
/// future abandons the call; nothing is reported in that case.
#[derive(Clone)]
pub struct WeatherService {
    api: Arc<dyn WeatherApi>,
    api_key: String,
}

impl fmt::Debug for WeatherService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WeatherService")
            .field("api", &self.api)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

impl WeatherService {
    pub fn new(api: Arc<dyn WeatherApi>, api_key: impl Into<String>) -> Self {
        Self { api, api_key: api_key.into() }
    }

    #[instrument(skip(self), level = "info")]
    pub async fn fetch_by_city(&self, city: &str) -> FetchResult<Weather> {
        match self.api.current_by_city(&self.api_key, city).await {
            Ok(raw) => {
                debug!(city = %raw.location.name, "weather fetched");
                FetchResult::Success(normalize(raw))
            }
            Err(e) => {
                let domain = classify(&e);
                warn!(error = %e, ?domain, "weather fetch by city failed");
                FetchResult::Failure(domain)
            }
        }
    }

    #[instrument(skip(self), level = "info")]
    pub async fn fetch_by_coordinates(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> FetchResult<Weather> {
        let coordinates = Coordinates::new(latitude, longitude);
        match self.api.current_by_coordinates(&self.api_key, coordinates).await {
            Ok(raw) => {
                debug!(city = %raw.location.name, "weather fetched");
                FetchResult::Success(normalize(raw))
            }
            Err(e) => {
                let domain = classify(&e);
                warn!(error = %e, ?domain, "weather fetch by coordinates failed");
                FetchResult::Failure(domain)
            }
        }
    }

    pub async fn fetch(&self, query: &WeatherQuery) -> FetchResult<Weather> {
        match query {
            WeatherQuery::ByCity(city) => self.fetch_by_city(city).await,
            WeatherQuery::ByCoordinates(c) => {
                self.fetch_by_coordinates(c.latitude, c.longitude).await
            }
        }
    }
}
