//! # Streamscout
//!
//! Locates playable video stream links on web pages.
//!
//! A page goes through three layers:
//!
//! - **Fetching**: retries with backoff, per-host throttling and rotating
//!   browser identities, reported as a [`core::FetchOutcome`] value
//! - **Extraction**: six independent strategies over the page text, one of
//!   which follows player iframes a single hop deep
//! - **Validation**: security rejection, quality annotation, dedup and a
//!   stable quality-descending ranking
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use streamscout::prelude::*;
//!
//! # async fn run() -> streamscout::errors::Result<()> {
//! let engine = ExtractionEngine::with_reqwest(ScoutConfig::from_env()?)?;
//! let result = engine.extract("https://phim.example.com/xem-phim/tap-1.html").await;
//! for link in &result.links {
//!     println!("{} {} {}", link.quality, link.kind, link.url);
//! }
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    missing_docs,
    rust_2018_idioms
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc
)]

pub mod config;
pub mod core;
pub mod engine;
pub mod errors;
pub mod extract;
pub mod fetch;
pub mod observability;
pub mod security;
pub mod testing;
pub mod validate;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::config::{ExtractionConfig, FetchConfig, RetryConfig, ScoutConfig};
    pub use crate::core::{
        ExtractionStatus, FetchFailure, FetchFailureKind, FetchOutcome, FetchedContent,
        LinkCandidate, LinkKind, Provenance, Quality, RankedResult,
    };
    pub use crate::engine::ExtractionEngine;
    pub use crate::errors::{ScoutError, TransportError};
    pub use crate::extract::LinkStrategy;
    pub use crate::fetch::{
        ContentFetcher, DomainThrottle, HttpTransport, NoOpThrottle, PerHostThrottle,
    };
    pub use crate::observability::{ExtractionObserver, LoggingObserver, NoOpObserver};
    pub use crate::security::{is_supported_domain, sanitize_page_url, PageUrlLimits};
    pub use crate::validate::validate_and_rank;
}
