//! Coordinate sources: where "use my location" gets its latitude/longitude.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::{fmt, time::Duration};
use thiserror::Error;
use tokio::sync::oneshot;
use tracing::{debug, info, instrument, warn};

use crate::model::Coordinates;

pub const DEFAULT_IP_LOOKUP_URL: &str = "http://ip-api.com/json";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LocationError {
    #[error("location permission denied")]
    PermissionDenied,
    #[error("position unavailable: {0}")]
    PositionUnavailable(String),
    /// The request was abandoned before it resolved. Not a failure.
    #[error("location request cancelled")]
    Cancelled,
}

impl LocationError {
    /// Message for the error state, or `None` when nothing should be shown.
    pub fn ui_message(&self) -> Option<&'static str> {
        match self {
            LocationError::PermissionDenied => Some("Location permission denied"),
            LocationError::PositionUnavailable(_) => Some("Unable to determine your location"),
            LocationError::Cancelled => None,
        }
    }
}

#[async_trait]
pub trait CoordinateSource: Send + Sync + fmt::Debug {
    async fn current_location(&self) -> Result<Coordinates, LocationError>;
}

/// Always reports the same coordinates.
#[derive(Debug, Clone, Copy)]
pub struct FixedLocation(pub Coordinates);

#[async_trait]
impl CoordinateSource for FixedLocation {
    async fn current_location(&self) -> Result<Coordinates, LocationError> {
        Ok(self.0)
    }
}

#[derive(Debug, Deserialize)]
struct IpApiResponse {
    status: String,
    lat: Option<f64>,
    lon: Option<f64>,
    message: Option<String>,
}

/// Approximate device location from IP geolocation.
///
/// `allowed` plays the role of the platform permission: when false the
/// lookup fails with [`LocationError::PermissionDenied`] and no request
/// leaves the machine.
#[derive(Debug, Clone)]
pub struct IpLocation {
    url: String,
    allowed: bool,
    http: Client,
}

impl IpLocation {
    pub fn new(url: impl Into<String>, allowed: bool, timeout: Duration) -> reqwest::Result<Self> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self { url: url.into(), allowed, http })
    }
}

#[async_trait]
impl CoordinateSource for IpLocation {
    #[instrument(skip(self), fields(url = %self.url), level = "debug")]
    async fn current_location(&self) -> Result<Coordinates, LocationError> {
        if !self.allowed {
            debug!("location access disabled");
            return Err(LocationError::PermissionDenied);
        }

        let unavailable = |e: reqwest::Error| {
            warn!(error = %e, "ip geolocation request failed");
            LocationError::PositionUnavailable(e.to_string())
        };

        let body: IpApiResponse = self
            .http
            .get(&self.url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(unavailable)?
            .json()
            .await
            .map_err(unavailable)?;

        match (body.status.as_str(), body.lat, body.lon) {
            ("success", Some(lat), Some(lon)) => {
                info!(lat, lon, "ip geolocation resolved");
                Ok(Coordinates::new(lat, lon))
            }
            _ => {
                let reason = body.message.unwrap_or_else(|| format!("status {}", body.status));
                warn!(%reason, "ip geolocation returned no position");
                Err(LocationError::PositionUnavailable(reason))
            }
        }
    }
}

/// One-shot completion handle for a pending location request.
///
/// Resolving consumes the handle, so a request completes at most once.
/// Dropping it unresolved cancels the request.
#[derive(Debug)]
pub struct LocationResolver {
    tx: oneshot::Sender<Result<Coordinates, LocationError>>,
}

impl LocationResolver {
    pub fn resolve(self, result: Result<Coordinates, LocationError>) {
        // Receiver gone means the caller lost interest.
        let _ = self.tx.send(result);
    }

    pub fn is_abandoned(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Bridges a callback-style location API into a [`CoordinateSource`].
///
/// `start` is invoked once per request with a fresh [`LocationResolver`]
/// and is expected to hand it to whatever completes the lookup.
pub struct CallbackLocation<F> {
    start: F,
}

impl<F> CallbackLocation<F>
where
    F: Fn(LocationResolver) + Send + Sync,
{
    pub fn new(start: F) -> Self {
        Self { start }
    }
}

impl<F> fmt::Debug for CallbackLocation<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallbackLocation").finish_non_exhaustive()
    }
}

#[async_trait]
impl<F> CoordinateSource for CallbackLocation<F>
where
    F: Fn(LocationResolver) + Send + Sync,
{
    async fn current_location(&self) -> Result<Coordinates, LocationError> {
        let (tx, rx) = oneshot::channel();
        (self.start)(LocationResolver { tx });
        rx.await.unwrap_or(Err(LocationError::Cancelled))
    }
}
