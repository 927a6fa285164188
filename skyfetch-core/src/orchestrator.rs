//! The fetch state machine the presentation layer renders from.
//!
//! Every request bumps a sequence number and publishes `Loading` before the
//! first suspension point. Results are applied only while their sequence
//! number is still the latest, so a slow superseded request can never
//! overwrite a newer one.

use parking_lot::Mutex;
use std::{fmt, sync::Arc};
use tokio::{sync::watch, task::JoinHandle};
use tracing::{Instrument, debug, info_span, warn};

use crate::{
    error::{DomainError, FetchResult},
    location::CoordinateSource,
    model::{Weather, WeatherQuery},
    service::WeatherService,
};

/// What the UI should currently show.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum UiState {
    #[default]
    Idle,
    Loading,
    Success(Weather),
    Error(String),
}

impl From<FetchResult<Weather>> for UiState {
    fn from(result: FetchResult<Weather>) -> Self {
        match result {
            FetchResult::Success(weather) => UiState::Success(weather),
            FetchResult::Failure(err) => UiState::Error(err.ui_message().to_string()),
        }
    }
}

/// Sequence counter and state publisher, always touched under one lock.
struct Published {
    latest: Mutex<u64>,
    tx: watch::Sender<UiState>,
}

impl Published {
    fn begin(&self) -> u64 {
        let mut latest = self.latest.lock();
        *latest += 1;
        self.tx.send_replace(UiState::Loading);
        *latest
    }

    fn is_latest(&self, seq: u64) -> bool {
        *self.latest.lock() == seq
    }

    fn apply(&self, seq: u64, state: UiState) -> bool {
        let latest = self.latest.lock();
        if *latest != seq {
            debug!(seq, latest = *latest, "discarding superseded result");
            return false;
        }
        self.tx.send_replace(state);
        true
    }
}

/// Handle to an issued request.
///
/// Dropping it does not cancel anything; it only gives up the ability to
/// wait for the request's task.
#[derive(Debug)]
pub struct RequestHandle {
    seq: u64,
    task: Option<JoinHandle<()>>,
}

impl RequestHandle {
    pub fn seq(&self) -> u64 {
        self.seq
    }

    /// Wait until the request has either published its outcome or been
    /// discarded as superseded.
    pub async fn join(self) {
        let Some(task) = self.task else { return };
        if let Err(e) = task.await {
            warn!(seq = self.seq, error = %e, "fetch task ended abnormally");
        }
    }
}

/// Owns the single [`UiState`] and sequences location lookup and weather
/// fetches into it.
///
/// Request methods spawn onto the ambient Tokio runtime.
#[derive(Clone)]
pub struct FetchOrchestrator {
    service: WeatherService,
    location: Arc<dyn CoordinateSource>,
    published: Arc<Published>,
}

impl fmt::Debug for FetchOrchestrator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FetchOrchestrator")
            .field("service", &self.service)
            .field("location", &self.location)
            .field("latest", &*self.published.latest.lock())
            .finish()
    }
}

impl FetchOrchestrator {
    pub fn new(service: WeatherService, location: Arc<dyn CoordinateSource>) -> Self {
        let (tx, _) = watch::channel(UiState::Idle);
        Self {
            service,
            location,
            published: Arc::new(Published { latest: Mutex::new(0), tx }),
        }
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> UiState {
        self.published.tx.borrow().clone()
    }

    /// Receiver for state changes. Intermediate values may be coalesced;
    /// the latest one is always observed.
    pub fn subscribe(&self) -> watch::Receiver<UiState> {
        self.published.tx.subscribe()
    }

    pub fn request_by_city(&self, city: &str) -> RequestHandle {
        let seq = self.published.begin();

        let Some(query) = WeatherQuery::by_city(city) else {
            debug!(seq, "blank city rejected");
            self.published
                .apply(seq, UiState::Error(DomainError::InvalidRequest.ui_message().to_string()));
            return RequestHandle { seq, task: None };
        };

        self.spawn_fetch(seq, query)
    }

    pub fn request_by_coordinates(&self, latitude: f64, longitude: f64) -> RequestHandle {
        let seq = self.published.begin();
        self.spawn_fetch(seq, WeatherQuery::by_coordinates(latitude, longitude))
    }

    /// "Use my location": resolve coordinates first, then fetch.
    ///
    /// Location failures publish their own message and never reach the
    /// weather service. A cancelled lookup publishes nothing terminal; if it
    /// is still the latest request the state falls back to `Idle`.
    pub fn request_current_location(&self) -> RequestHandle {
        let seq = self.published.begin();
        let service = self.service.clone();
        let location = self.location.clone();
        let published = self.published.clone();

        let task = tokio::spawn(
            async move {
                let coordinates = match location.current_location().await {
                    Ok(c) => c,
                    Err(e) => {
                        let next = match e.ui_message() {
                            Some(msg) => UiState::Error(msg.to_string()),
                            None => UiState::Idle,
                        };
                        debug!(error = %e, "location lookup did not produce coordinates");
                        published.apply(seq, next);
                        return;
                    }
                };

                if !published.is_latest(seq) {
                    debug!(seq, "superseded before weather fetch");
                    return;
                }

                let result =
                    service.fetch_by_coordinates(coordinates.latitude, coordinates.longitude).await;
                published.apply(seq, result.into());
            }
            .instrument(info_span!("fetch", seq, kind = "location")),
        );

        RequestHandle { seq, task: Some(task) }
    }

    fn spawn_fetch(&self, seq: u64, query: WeatherQuery) -> RequestHandle {
        let service = self.service.clone();
        let published = self.published.clone();

        let task = tokio::spawn(
            async move {
                let result = service.fetch(&query).await;
                published.apply(seq, result.into());
            }
            .instrument(info_span!("fetch", seq, kind = "query")),
        );

        RequestHandle { seq, task: Some(task) }
    }
}
