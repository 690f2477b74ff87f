//! Resilient page fetching.
//!
//! This module provides:
//! - [`ContentFetcher`] with bounded retries and identity rotation
//! - [`DomainThrottle`] implementations for per-host spacing
//! - The [`HttpTransport`] seam and its reqwest implementation
//! - Charset-aware body decoding

pub mod decode;
mod fetcher;
mod identity;
mod throttle;
mod transport;

pub use fetcher::ContentFetcher;
pub use identity::{IdentityPool, RequestIdentity};
pub use throttle::{DomainThrottle, NoOpThrottle, PerHostThrottle};
pub use transport::{HttpRequest, HttpTransport, RawResponse};

#[cfg(feature = "http")]
pub use transport::ReqwestTransport;
