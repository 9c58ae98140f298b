//! Error types surfaced by the client and the date adapter.

use reqwest::StatusCode;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum WeatherError {
    /// The request never completed: DNS, connect, TLS, timeout, or an unusable base URL.
    ///
    /// The request URL is stripped: it carries the API key.
    #[error("Network error")]
    Network(#[source] reqwest::Error),

    /// The provider answered with a non-success status.
    #[error("Provider request failed with status {status}: {body}")]
    Upstream { status: StatusCode, body: String },

    #[error("Failed to decode provider response as JSON")]
    Decode(#[from] serde_json::Error),
}

impl From<reqwest::Error> for WeatherError {
    fn from(err: reqwest::Error) -> Self {
        Self::Network(err.without_url())
    }
}

impl WeatherError {
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Network(_))
    }

    pub fn is_upstream(&self) -> bool {
        matches!(self, Self::Upstream { .. })
    }

    /// HTTP status reported by the provider, if one was received.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Upstream { status, .. } => Some(*status),
            Self::Network(err) => err.status(),
            Self::Decode(_) => None,
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DateError {
    #[error("Could not parse '{0}' as a local date and time")]
    Parse(String),

    #[error("'{input}' does not exist in timezone {timezone}")]
    NonexistentLocalTime { input: String, timezone: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upstream_error_reports_status() {
        let err = WeatherError::Upstream {
            status: StatusCode::UNAUTHORIZED,
            body: "Invalid API key".into(),
        };

        assert!(err.is_upstream());
        assert!(!err.is_transport());
        assert_eq!(err.status(), Some(StatusCode::UNAUTHORIZED));
        assert!(err.to_string().contains("401"));
        assert!(err.to_string().contains("Invalid API key"));
    }

    #[test]
    fn decode_error_has_no_status() {
        let json_err = serde_json::from_str::<u8>("x").unwrap_err();
        let err = WeatherError::from(json_err);
        assert_eq!(err.status(), None);
        assert!(!err.is_upstream());
    }
}
