//! Failure types for the fetch pipeline and the classifier that maps
//! transport failures onto the coarse domain taxonomy shown to users.

use thiserror::Error;

/// What the UI is allowed to know about a failed weather fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum DomainError {
    #[error("network unavailable")]
    NetworkUnavailable,
    #[error("rate limit exceeded")]
    RateLimitExceeded,
    #[error("invalid request")]
    InvalidRequest,
    #[error("unknown error")]
    Unknown,
}

impl DomainError {
    pub const fn all() -> &'static [DomainError] {
        &[
            DomainError::NetworkUnavailable,
            DomainError::RateLimitExceeded,
            DomainError::InvalidRequest,
            DomainError::Unknown,
        ]
    }

    /// User-facing message for the error state.
    pub fn ui_message(&self) -> &'static str {
        match self {
            DomainError::NetworkUnavailable => "No internet connection",
            DomainError::RateLimitExceeded => "API rate limit exceeded",
            DomainError::InvalidRequest => "Invalid request",
            DomainError::Unknown => "Something went wrong",
        }
    }
}

/// Outcome of a weather service call. Failures never carry raw transport
/// detail; that goes to the log.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchResult<T> {
    Success(T),
    Failure(DomainError),
}

/// Failure of a single HTTP exchange with the weather endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// Server answered with a non-2xx status.
    #[error("request failed with status {status}: {body}")]
    Status { status: u16, body: String },

    /// No response: connect failure, timeout, or IO while reading the body.
    #[error("network error: {0}")]
    Network(String),

    /// A body arrived but did not match the expected schema.
    #[error("failed to decode response: {0}")]
    Decode(String),

    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        // The request URL carries the API key in its query string.
        let err = err.without_url();
        if err.is_builder() {
            TransportError::InvalidResponse(err.to_string())
        } else if err.is_decode() {
            TransportError::Decode(err.to_string())
        } else if let Some(status) = err.status() {
            TransportError::Status { status: status.as_u16(), body: String::new() }
        } else {
            TransportError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for TransportError {
    fn from(err: serde_json::Error) -> Self {
        TransportError::Decode(err.to_string())
    }
}

/// Map a transport failure to the domain taxonomy.
///
/// Decode failures land in `Unknown` together with anything unrecognized.
pub fn classify(error: &TransportError) -> DomainError {
    match error {
        TransportError::Status { status: 403, .. } => DomainError::RateLimitExceeded,
        TransportError::Status { .. } => DomainError::InvalidRequest,
        TransportError::Network(_) => DomainError::NetworkUnavailable,
        TransportError::Decode(_) => DomainError::Unknown,
        TransportError::InvalidResponse(_) => DomainError::Unknown,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forbidden_is_rate_limit() {
        let err = TransportError::Status { status: 403, body: "quota".into() };
        assert_eq!(classify(&err), DomainError::RateLimitExceeded);
    }

    #[test]
    fn other_statuses_are_invalid_request() {
        for status in [400, 401, 404, 429, 500, 503] {
            let err = TransportError::Status { status, body: String::new() };
            assert_eq!(classify(&err), DomainError::InvalidRequest, "status {status}");
        }
    }

    #[test]
    fn network_failure_is_network_unavailable() {
        let err = TransportError::Network("connection refused".into());
        assert_eq!(classify(&err), DomainError::NetworkUnavailable);
    }

    #[test]
    fn decode_and_unrecognized_are_unknown() {
        assert_eq!(classify(&TransportError::Decode("missing field".into())), DomainError::Unknown);
        assert_eq!(
            classify(&TransportError::InvalidResponse("bad url".into())),
            DomainError::Unknown
        );
    }

    #[test]
    fn serde_error_converts_to_decode() {
        let err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        assert!(matches!(TransportError::from(err), TransportError::Decode(_)));
    }

    #[test]
    fn every_domain_error_has_a_message() {
        for err in DomainError::all() {
            assert!(!err.ui_message().is_empty());
        }
        assert_eq!(DomainError::NetworkUnavailable.ui_message(), "No internet connection");
        assert_eq!(DomainError::RateLimitExceeded.ui_message(), "API rate limit exceeded");
        assert_eq!(DomainError::InvalidRequest.ui_message(), "Invalid request");
        assert_eq!(DomainError::Unknown.ui_message(), "Something went wrong");
    }
}
