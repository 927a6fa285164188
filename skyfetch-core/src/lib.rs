//! Core library for the `skyfetch` weather tool.
//!
//! This crate defines:
//! - Coordinate sources for "use my location"
//! - The WeatherAPI.com client, response normalizer and error classifier
//! - The weather service and the fetch state machine the UI renders from
//! - Configuration & credentials handling
//!
//! It is used by `skyfetch-cli`, but any front end can drive
//! [`FetchOrchestrator`] and render its [`UiState`].

pub mod client;
pub mod config;
pub mod error;
pub mod location;
pub mod model;
pub mod normalize;
pub mod orchestrator;
pub mod service;

pub use client::{RawResponse, WeatherApi, WeatherApiClient};
pub use config::{Config, LocationConfig};
pub use error::{DomainError, FetchResult, TransportError, classify};
pub use location::{
    CallbackLocation, CoordinateSource, FixedLocation, IpLocation, LocationError, LocationResolver,
};
pub use model::{Coordinates, Weather, WeatherQuery, WeatherTheme};
pub use normalize::normalize;
pub use orchestrator::{FetchOrchestrator, RequestHandle, UiState};
pub use service::WeatherService;
