//! The network seam.
//!
//! [`HttpTransport`] performs a single request with no retries. The
//! [`ContentFetcher`](super::ContentFetcher) layers policy on top, and tests
//! swap in scripted transports.

use async_trait::async_trait;

use crate::errors::TransportError;

/// One outbound GET request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    /// Absolute URL.
    pub url: String,
    /// Headers, `User-Agent` included.
    pub headers: Vec<(String, String)>,
    /// Body size cap in bytes.
    pub max_body_bytes: usize,
}

impl HttpRequest {
    /// Looks up a header case-insensitively.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// The `User-Agent` header, if set.
    #[must_use]
    pub fn user_agent(&self) -> Option<&str> {
        self.header("User-Agent")
    }
}

/// A response as received, before classification.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawResponse {
    /// HTTP status.
    pub status: u16,
    /// `Content-Type` header.
    pub content_type: Option<String>,
    /// `Content-Length` header.
    pub content_length: Option<u64>,
    /// URL after redirects.
    pub final_url: String,
    /// Body bytes. Left empty for error statuses and non-text types.
    pub body: Vec<u8>,
}

impl RawResponse {
    /// Whether the status is 2xx.
    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Performs HTTP requests.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Sends one request.
    async fn send(&self, request: &HttpRequest) -> Result<RawResponse, TransportError>;
}

#[cfg(feature = "http")]
pub use reqwest_impl::ReqwestTransport;

#[cfg(feature = "http")]
mod reqwest_impl {
    use async_trait::async_trait;
    use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
    use reqwest::redirect::Policy;

    use super::{HttpRequest, HttpTransport, RawResponse};
    use crate::config::FetchConfig;
    use crate::errors::{ScoutError, TransportError};
    use crate::fetch::decode::is_text_content_type;

    /// [`HttpTransport`] backed by a shared `reqwest::Client`.
    #[derive(Debug, Clone)]
    pub struct ReqwestTransport {
        client: reqwest::Client,
    }

    impl ReqwestTransport {
        /// Builds a client with the configured timeouts and redirect limit.
        pub fn new(config: &FetchConfig) -> Result<Self, ScoutError> {
            let client = reqwest::Client::builder()
                .connect_timeout(config.connect_timeout())
                .timeout(config.request_timeout())
                .redirect(Policy::limited(config.max_redirects))
                .build()
                .map_err(|e| ScoutError::config(format!("failed to build HTTP client: {e}")))?;
            Ok(Self { client })
        }
    }

    fn header_map(pairs: &[(String, String)]) -> HeaderMap {
        let mut map = HeaderMap::with_capacity(pairs.len());
        for (name, value) in pairs {
            match (
                HeaderName::from_bytes(name.as_bytes()),
                HeaderValue::from_str(value),
            ) {
                (Ok(name), Ok(value)) => {
                    map.insert(name, value);
                }
                _ => tracing::warn!(header = %name, "skipping malformed header"),
            }
        }
        map
    }

    #[async_trait]
    impl HttpTransport for ReqwestTransport {
        async fn send(&self, request: &HttpRequest) -> Result<RawResponse, TransportError> {
            let mut response = self
                .client
                .get(&request.url)
                .headers(header_map(&request.headers))
                .send()
                .await?;

            let status = response.status().as_u16();
            let final_url = response.url().to_string();
            let content_type = response
                .headers()
                .get(CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .map(String::from);
            let content_length = response.content_length();

            let mut raw = RawResponse {
                status,
                content_type,
                content_length,
                final_url,
                body: Vec::new(),
            };

            if !raw.is_success() || !is_text_content_type(raw.content_type.as_deref()) {
                return Ok(raw);
            }

            let limit = request.max_body_bytes;
            if content_length.is_some_and(|len| len > limit as u64) {
                return Err(TransportError::BodyTooLarge { limit });
            }

            while let Some(chunk) = response.chunk().await? {
                if raw.body.len() + chunk.len() > limit {
                    return Err(TransportError::BodyTooLarge { limit });
                }
                raw.body.extend_from_slice(&chunk);
            }
            Ok(raw)
        }
    }
}
