//! Error types for the streamscout pipeline.
//!
//! Fetch failures are not errors: they are returned as
//! [`FetchOutcome`](crate::core::FetchOutcome) values. The types here cover
//! configuration problems, transport faults and conditions that indicate a
//! bug rather than a hostile page.

use thiserror::Error;

/// The main error type for streamscout operations.
#[derive(Debug, Error)]
pub enum ScoutError {
    /// Configuration could not be loaded or is inconsistent.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A URL could not be parsed or failed a scheme check.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// The HTTP transport failed.
    #[error("{0}")]
    Transport(#[from] TransportError),

    /// A generic internal error.
    #[error("Internal error: {0}")]
    Internal(String),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ScoutError {
    /// Creates a configuration error.
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Creates an invalid URL error.
    #[must_use]
    pub fn invalid_url(message: impl Into<String>) -> Self {
        Self::InvalidUrl(message.into())
    }
}

impl From<url::ParseError> for ScoutError {
    fn from(err: url::ParseError) -> Self {
        Self::InvalidUrl(err.to_string())
    }
}

/// A failure raised by an [`HttpTransport`](crate::fetch::HttpTransport)
/// before a complete response was available.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    /// The connect or read deadline elapsed.
    #[error("Request timed out: {0}")]
    Timeout(String),

    /// The connection could not be established or was reset.
    #[error("Connection failed: {0}")]
    Connect(String),

    /// The response body exceeded the configured cap while streaming.
    #[error("Response body exceeded {limit} bytes")]
    BodyTooLarge {
        /// The cap that was exceeded.
        limit: usize,
    },

    /// The response body could not be read.
    #[error("Failed to read response body: {0}")]
    Body(String),

    /// Any other transport failure.
    #[error("Transport error: {0}")]
    Other(String),
}

impl TransportError {
    /// Whether this error came from a timeout.
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout(_))
    }

    /// Whether a fresh attempt may succeed.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        !matches!(self, Self::BodyTooLarge { .. })
    }
}

#[cfg(feature = "http")]
impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout(err.to_string())
        } else if err.is_connect() {
            Self::Connect(err.to_string())
        } else if err.is_body() || err.is_decode() {
            Self::Body(err.to_string())
        } else {
            Self::Other(err.to_string())
        }
    }
}

/// Result type alias for streamscout operations.
pub type Result<T> = std::result::Result<T, ScoutError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_display() {
        let err = ScoutError::config("max_retries must be at least 1");
        assert_eq!(
            err.to_string(),
            "Configuration error: max_retries must be at least 1"
        );
    }

    #[test]
    fn test_transport_error_classification() {
        assert!(TransportError::Timeout("read".into()).is_timeout());
        assert!(!TransportError::Connect("reset".into()).is_timeout());
        assert!(TransportError::Connect("reset".into()).is_transient());
        assert!(!TransportError::BodyTooLarge { limit: 10 }.is_transient());
    }

    #[test]
    fn test_transport_error_converts_into_scout_error() {
        let err: ScoutError = TransportError::Other("boom".into()).into();
        assert!(matches!(err, ScoutError::Transport(_)));
        assert_eq!(err.to_string(), "Transport error: boom");
    }

    #[test]
    fn test_url_parse_error_converts() {
        let err: ScoutError = url::Url::parse("not a url").unwrap_err().into();
        assert!(matches!(err, ScoutError::InvalidUrl(_)));
    }
}
