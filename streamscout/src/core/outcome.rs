//! Immutable result of a fetch.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Classification of a terminal fetch failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchFailureKind {
    /// Connect or read deadline elapsed.
    Timeout,
    /// Connection refused, reset or otherwise broken.
    Connection,
    /// HTTP 403.
    Forbidden,
    /// HTTP 429.
    RateLimited,
    /// HTTP 5xx.
    ServerError,
    /// HTTP 404 or 410.
    NotFound,
    /// Any other non-success status.
    UnexpectedStatus,
    /// Content-Type was not a text type.
    NonTextContent,
    /// Body exceeded the size cap.
    PayloadTooLarge,
    /// Decoded body was too short to be a real page.
    ContentTooShort,
    /// The URL could not be parsed or has no host.
    InvalidUrl,
}

impl FetchFailureKind {
    /// Whether another attempt may succeed.
    #[must_use]
    pub fn is_transient(self) -> bool {
        matches!(
            self,
            Self::Timeout
                | Self::Connection
                | Self::Forbidden
                | Self::RateLimited
                | Self::ServerError
                | Self::UnexpectedStatus
        )
    }

    /// Classifies an HTTP status that is not a success.
    #[must_use]
    pub fn from_status(status: u16) -> Self {
        match status {
            403 => Self::Forbidden,
            429 => Self::RateLimited,
            404 | 410 => Self::NotFound,
            500..=599 => Self::ServerError,
            _ => Self::UnexpectedStatus,
        }
    }
}

impl fmt::Display for FetchFailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Timeout => "timeout",
            Self::Connection => "connection",
            Self::Forbidden => "forbidden",
            Self::RateLimited => "rate_limited",
            Self::ServerError => "server_error",
            Self::NotFound => "not_found",
            Self::UnexpectedStatus => "unexpected_status",
            Self::NonTextContent => "non_text_content",
            Self::PayloadTooLarge => "payload_too_large",
            Self::ContentTooShort => "content_too_short",
            Self::InvalidUrl => "invalid_url",
        };
        f.write_str(label)
    }
}

/// A classified, terminal fetch failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchFailure {
    /// What went wrong.
    pub kind: FetchFailureKind,
    /// Short human-readable reason.
    pub reason: String,
    /// HTTP status of the last response, if one arrived.
    pub status: Option<u16>,
    /// Number of attempts made.
    pub attempts: usize,
}

impl FetchFailure {
    /// Creates a failure with no status.
    #[must_use]
    pub fn new(kind: FetchFailureKind, reason: impl Into<String>) -> Self {
        Self {
            kind,
            reason: reason.into(),
            status: None,
            attempts: 0,
        }
    }

    /// Sets the HTTP status.
    #[must_use]
    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    /// Sets the attempt count.
    #[must_use]
    pub fn with_attempts(mut self, attempts: usize) -> Self {
        self.attempts = attempts;
        self
    }
}

impl fmt::Display for FetchFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status {
            Some(status) => write!(f, "{} (HTTP {}): {}", self.kind, status, self.reason),
            None => write!(f, "{}: {}", self.kind, self.reason),
        }
    }
}

/// Decoded text content of a successful fetch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchedContent {
    /// Decoded body.
    pub text: String,
    /// Declared content type.
    pub content_type: String,
    /// URL after redirects.
    pub final_url: String,
    /// HTTP status.
    pub status: u16,
    /// Number of attempts it took.
    pub attempts: usize,
    /// When the body was received, RFC 3339.
    pub fetched_at: String,
}

impl FetchedContent {
    /// Whether the content is HTML.
    #[must_use]
    pub fn is_html(&self) -> bool {
        self.content_type.contains("text/html") || self.content_type.contains("application/xhtml")
    }
}

/// Outcome of one logical fetch, after all retries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum FetchOutcome {
    /// Text content was retrieved.
    Success(FetchedContent),
    /// The fetch failed terminally.
    Failure(FetchFailure),
}

impl FetchOutcome {
    /// Creates a failure outcome.
    #[must_use]
    pub fn failure(kind: FetchFailureKind, reason: impl Into<String>) -> Self {
        Self::Failure(FetchFailure::new(kind, reason))
    }

    /// Whether the fetch succeeded.
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// The decoded text, if successful.
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Success(content) => Some(&content.text),
            Self::Failure(_) => None,
        }
    }

    /// The failure, if any.
    #[must_use]
    pub fn failure_ref(&self) -> Option<&FetchFailure> {
        match self {
            Self::Success(_) => None,
            Self::Failure(failure) => Some(failure),
        }
    }

    /// Number of attempts made.
    #[must_use]
    pub fn attempts(&self) -> usize {
        match self {
            Self::Success(content) => content.attempts,
            Self::Failure(failure) => failure.attempts,
        }
    }
}
