use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::{fmt::Debug, time::Duration};
use tracing::instrument;

use crate::{error::TransportError, model::Coordinates};

pub const DEFAULT_BASE_URL: &str = "http://api.weatherapi.com/v1";

/// Raw `current.json` payload from WeatherAPI.com.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RawResponse {
    pub location: RawLocation,
    pub current: RawCurrent,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RawLocation {
    pub name: String,
    pub region: String,
    pub country: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RawCurrent {
    pub is_day: i32,
    pub temp_c: f64,
    pub feelslike_c: f64,
    pub humidity: i32,
    pub uv: f64,
    pub condition: RawCondition,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RawCondition {
    pub text: String,
    pub icon: String,
    pub code: i32,
}

/// The two query shapes the weather endpoint supports.
#[async_trait]
pub trait WeatherApi: Send + Sync + Debug {
    async fn current_by_city(&self, key: &str, city: &str) -> Result<RawResponse, TransportError>;

    async fn current_by_coordinates(
        &self,
        key: &str,
        coordinates: Coordinates,
    ) -> Result<RawResponse, TransportError>;
}

/// HTTP client for `GET {base_url}/current.json?key=..&q=..`.
#[derive(Debug, Clone)]
pub struct WeatherApiClient {
    base_url: String,
    http: Client,
}

impl WeatherApiClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, TransportError> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(base_url, http))
    }

    pub fn with_client(base_url: impl Into<String>, http: Client) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { base_url, http }
    }

    async fn fetch_current(&self, key: &str, q: &str) -> Result<RawResponse, TransportError> {
        let url = format!("{}/current.json", self.base_url);

        let res = self.http.get(&url).query(&[("key", key), ("q", q)]).send().await?;

        let status = res.status();
        if !status.is_success() {
            // A response arrived; an unreadable body must not hide its status.
            let body = res.text().await.unwrap_or_default();
            return Err(TransportError::Status {
                status: status.as_u16(),
                body: truncate_body(&body),
            });
        }

        let body = res.text().await?;
        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl WeatherApi for WeatherApiClient {
    #[instrument(skip(self, key), level = "debug")]
    async fn current_by_city(&self, key: &str, city: &str) -> Result<RawResponse, TransportError> {
        self.fetch_current(key, city).await
    }

    #[instrument(skip(self, key), level = "debug")]
    async fn current_by_coordinates(
        &self,
        key: &str,
        coordinates: Coordinates,
    ) -> Result<RawResponse, TransportError> {
        self.fetch_current(key, &coordinates.to_string()).await
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn london_json() -> serde_json::Value {
        serde_json::json!({
            "location": {
                "name": "London",
                "region": "City of London, Greater London",
                "country": "United Kingdom"
            },
            "current": {
                "is_day": 1,
                "temp_c": 15.0,
                "feelslike_c": 14.0,
                "humidity": 60,
                "uv": 2.0,
                "condition": {
                    "text": "Partly cloudy",
                    "icon": "//cdn.weatherapi.com/116.png",
                    "code": 1003
                }
            }
        })
    }

    fn client_for(server: &MockServer) -> WeatherApiClient {
        WeatherApiClient::new(server.uri(), Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn city_query_sends_key_and_name() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/current.json"))
            .and(query_param("key", "KEY"))
            .and(query_param("q", "London"))
            .respond_with(ResponseTemplate::new(200).set_body_json(london_json()))
            .expect(1)
            .mount(&server)
            .await;

        let raw = client_for(&server).current_by_city("KEY", "London").await.unwrap();

        assert_eq!(raw.location.name, "London");
        assert_eq!(raw.current.condition.code, 1003);
        assert_eq!(raw.current.is_day, 1);
    }

    #[tokio::test]
    async fn coordinate_query_formats_lat_lon() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/current.json"))
            .and(query_param("q", "51.5,-0.12"))
            .respond_with(ResponseTemplate::new(200).set_body_json(london_json()))
            .expect(1)
            .mount(&server)
            .await;

        let raw = client_for(&server)
            .current_by_coordinates("KEY", Coordinates::new(51.5, -0.12))
            .await
            .unwrap();

        assert_eq!(raw.location.country, "United Kingdom");
    }

    #[tokio::test]
    async fn non_success_status_is_reported_with_body() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/current.json"))
            .respond_with(
                ResponseTemplate::new(403)
                    .set_body_string(r#"{"error":{"code":2007,"message":"quota exceeded"}}"#),
            )
            .mount(&server)
            .await;

        let err = client_for(&server).current_by_city("KEY", "London").await.unwrap_err();

        match err {
            TransportError::Status { status, body } => {
                assert_eq!(status, 403);
                assert!(body.contains("quota exceeded"));
            }
            other => panic!("expected status error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn malformed_body_is_decode_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/current.json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "location": { "name": "London" }
            })))
            .mount(&server)
            .await;

        let err = client_for(&server).current_by_city("KEY", "London").await.unwrap_err();

        assert!(matches!(err, TransportError::Decode(_)), "got {err:?}");
    }

    #[tokio::test]
    async fn unreachable_host_is_network_error() {
        let client = WeatherApiClient::new("http://127.0.0.1:1", Duration::from_secs(2)).unwrap();
        let err = client.current_by_city("KEY", "London").await.unwrap_err();

        assert!(matches!(err, TransportError::Network(_)), "got {err:?}");
    }

    #[tokio::test]
    async fn network_error_text_omits_api_key() {
        let client = WeatherApiClient::new("http://127.0.0.1:1", Duration::from_secs(2)).unwrap();
        let err = client.current_by_city("SECRET_KEY_123", "London").await.unwrap_err();

        assert!(matches!(err, TransportError::Network(_)), "got {err:?}");
        assert!(!err.to_string().contains("SECRET_KEY_123"), "{err}");
        assert!(!format!("{err:?}").contains("SECRET_KEY_123"));
    }

    #[tokio::test]
    async fn forbidden_with_empty_body_keeps_status() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/current.json"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&server)
            .await;

        let err = client_for(&server).current_by_city("KEY", "London").await.unwrap_err();

        assert_eq!(err, TransportError::Status { status: 403, body: String::new() });
    }

    #[test]
    fn long_bodies_are_truncated() {
        let body = "x".repeat(500);
        let out = truncate_body(&body);
        assert_eq!(out.len(), 203);
        assert!(out.ends_with("..."));
        assert_eq!(truncate_body("short"), "short");
    }
}
