//! The resilient content fetcher.

use rand::Rng;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};
use url::Url;

use super::decode::{decode_body, is_text_content_type};
use super::identity::IdentityPool;
use super::throttle::{DomainThrottle, PerHostThrottle};
use super::transport::{HttpRequest, HttpTransport, RawResponse};
use crate::config::FetchConfig;
use crate::core::{FetchFailure, FetchFailureKind, FetchOutcome, FetchedContent};
use crate::errors::TransportError;

/// What one attempt concluded.
enum AttemptVerdict {
    Done(FetchOutcome),
    Retry(FetchFailure),
}

/// Fetches page text with retries, identity rotation and per-host spacing.
///
/// Clones share the transport, throttle and concurrency limiter.
#[derive(Clone)]
pub struct ContentFetcher {
    transport: Arc<dyn HttpTransport>,
    throttle: Arc<dyn DomainThrottle>,
    identities: IdentityPool,
    limiter: Arc<Semaphore>,
    config: FetchConfig,
}

impl std::fmt::Debug for ContentFetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContentFetcher")
            .field("identities", &self.identities.len())
            .field("available_permits", &self.limiter.available_permits())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl ContentFetcher {
    /// Creates a fetcher with a per-host throttle built from the config.
    #[must_use]
    pub fn new(transport: Arc<dyn HttpTransport>, config: FetchConfig) -> Self {
        let throttle = Arc::new(PerHostThrottle::new(config.min_request_interval()));
        Self {
            transport,
            throttle,
            identities: IdentityPool::from_config(&config),
            limiter: Arc::new(Semaphore::new(config.max_concurrent.max(1))),
            config,
        }
    }

    /// Creates a fetcher backed by reqwest.
    #[cfg(feature = "http")]
    pub fn with_reqwest(config: FetchConfig) -> crate::errors::Result<Self> {
        let transport = super::transport::ReqwestTransport::new(&config)?;
        Ok(Self::new(Arc::new(transport), config))
    }

    /// Replaces the throttle.
    #[must_use]
    pub fn with_throttle(mut self, throttle: Arc<dyn DomainThrottle>) -> Self {
        self.throttle = throttle;
        self
    }

    /// Gets the configuration.
    #[must_use]
    pub fn config(&self) -> &FetchConfig {
        &self.config
    }

    /// Fetches `url`, retrying transient failures.
    ///
    /// Never returns an error: every failure is classified into the outcome.
    pub async fn fetch(&self, url: &str) -> FetchOutcome {
        let parsed = match Url::parse(url) {
            Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => parsed,
            _ => return FetchOutcome::failure(FetchFailureKind::InvalidUrl, "unsupported URL"),
        };
        let Some(host) = parsed.host_str().map(str::to_ascii_lowercase) else {
            return FetchOutcome::failure(FetchFailureKind::InvalidUrl, "URL has no host");
        };

        let max_attempts = self.config.retry.max_attempts.max(1);
        let mut previous_agent: Option<String> = None;
        let mut last_failure = FetchFailure::new(FetchFailureKind::Connection, "no attempt made");

        for attempt in 0..max_attempts {
            let wait = self.throttle.reserve(&host);
            if !wait.is_zero() {
                debug!(host = %host, wait_ms = wait.as_millis(), "throttling request");
                tokio::time::sleep(wait).await;
            }

            let identity = self.identities.pick(previous_agent.as_deref());
            previous_agent = Some(identity.user_agent.clone());
            let request = HttpRequest {
                url: url.to_string(),
                headers: identity.header_pairs(),
                max_body_bytes: self.config.max_response_size,
            };

            debug!(url = %url, attempt = attempt + 1, "fetching");
            // The permit covers only the request itself, never throttle or
            // backoff sleeps.
            let sent = {
                let Ok(_permit) = self.limiter.acquire().await else {
                    return FetchOutcome::failure(FetchFailureKind::Connection, "fetcher shut down");
                };
                self.transport.send(&request).await
            };
            let verdict = match sent {
                Ok(response) => self.classify_response(response, attempt + 1),
                Err(err) => classify_transport_error(&err, attempt + 1),
            };

            let failure = match verdict {
                AttemptVerdict::Done(outcome) => {
                    log_outcome(url, &outcome);
                    return outcome;
                }
                AttemptVerdict::Retry(failure) => failure,
            };

            let attempts_made = attempt + 1;
            last_failure = failure.with_attempts(attempts_made);
            if attempts_made >= max_attempts {
                break;
            }

            let mut delay = self.config.retry.delay_for_attempt(attempt);
            if last_failure.kind == FetchFailureKind::RateLimited {
                delay += self.rate_limit_backoff();
            }
            warn!(
                url = %url,
                attempt = attempts_made,
                kind = %last_failure.kind,
                status = ?last_failure.status,
                delay_ms = delay.as_millis(),
                "fetch attempt failed, retrying"
            );
            tokio::time::sleep(delay).await;
        }

        warn!(url = %url, failure = %last_failure, "fetch failed after retries");
        FetchOutcome::Failure(last_failure)
    }

    fn rate_limit_backoff(&self) -> Duration {
        let retry = &self.config.retry;
        let (lo, hi) = (
            retry.rate_limit_backoff_min_seconds,
            retry.rate_limit_backoff_max_seconds,
        );
        let secs = if hi > lo {
            rand::thread_rng().gen_range(lo..hi)
        } else {
            lo
        };
        Duration::from_secs_f64(secs.max(0.0))
    }

    fn classify_response(&self, response: RawResponse, attempts: usize) -> AttemptVerdict {
        let status = response.status;
        if !response.is_success() {
            let kind = FetchFailureKind::from_status(status);
            let failure = FetchFailure::new(kind, format!("HTTP {status}")).with_status(status);
            return if kind.is_transient() {
                AttemptVerdict::Retry(failure)
            } else {
                AttemptVerdict::Done(FetchOutcome::Failure(failure.with_attempts(attempts)))
            };
        }

        let terminal = |kind: FetchFailureKind, reason: String| {
            AttemptVerdict::Done(FetchOutcome::Failure(
                FetchFailure::new(kind, reason)
                    .with_status(status)
                    .with_attempts(attempts),
            ))
        };

        let content_type = response.content_type.as_deref();
        if !is_text_content_type(content_type) {
            return terminal(
                FetchFailureKind::NonTextContent,
                format!("content type {}", content_type.unwrap_or("unknown")),
            );
        }

        let limit = self.config.max_response_size;
        let declared_too_large = response
            .content_length
            .is_some_and(|len| len > limit as u64);
        if declared_too_large || response.body.len() > limit {
            return terminal(
                FetchFailureKind::PayloadTooLarge,
                format!("body exceeds {limit} bytes"),
            );
        }

        let text = decode_body(&response.body, content_type);
        let length = text.trim().chars().count();
        if length < self.config.min_content_length {
            return terminal(
                FetchFailureKind::ContentTooShort,
                format!("only {length} characters"),
            );
        }

        AttemptVerdict::Done(FetchOutcome::Success(FetchedContent {
            text,
            content_type: response.content_type.unwrap_or_default(),
            final_url: response.final_url,
            status,
            attempts,
            fetched_at: chrono::Utc::now().to_rfc3339(),
        }))
    }
}

fn classify_transport_error(err: &TransportError, attempts: usize) -> AttemptVerdict {
    let (kind, reason) = match err {
        TransportError::Timeout(_) => (FetchFailureKind::Timeout, "request timed out"),
        TransportError::BodyTooLarge { .. } => {
            (FetchFailureKind::PayloadTooLarge, "body exceeded size cap")
        }
        TransportError::Connect(_) => (FetchFailureKind::Connection, "connection failed"),
        TransportError::Body(_) => (FetchFailureKind::Connection, "body read failed"),
        TransportError::Other(_) => (FetchFailureKind::Connection, "transport error"),
    };
    debug!(error = %err, "transport error");
    let failure = FetchFailure::new(kind, reason);
    if err.is_transient() {
        AttemptVerdict::Retry(failure)
    } else {
        AttemptVerdict::Done(FetchOutcome::Failure(failure.with_attempts(attempts)))
    }
}

fn log_outcome(url: &str, outcome: &FetchOutcome) {
    match outcome {
        FetchOutcome::Success(content) => info!(
            url = %url,
            status = content.status,
            attempts = content.attempts,
            bytes = content.text.len(),
            "fetched page"
        ),
        FetchOutcome::Failure(failure) => warn!(
            url = %url,
            kind = %failure.kind,
            status = ?failure.status,
            "fetch failed"
        ),
    }
}
