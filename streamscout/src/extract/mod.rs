//! Link extraction strategies.
//!
//! Each strategy turns page text into raw candidates. Strategies never
//! suppress each other; the validator deduplicates whatever they find.

mod direct_html;
mod iframe;
mod javascript;
mod json_structure;
mod meta_tags;
pub mod patterns;
mod player_config;

use std::panic::{catch_unwind, AssertUnwindSafe};
use url::Url;

use crate::config::ExtractionConfig;
use crate::core::{LinkCandidate, Provenance};

pub use direct_html::DirectHtmlStrategy;
pub use iframe::{discover_iframes, IframeResolver, MAX_IFRAME_DEPTH};
pub use javascript::JavascriptStrategy;
pub use json_structure::{parse_json_fragment, walk_json, JsonStructureStrategy};
pub use meta_tags::MetaTagStrategy;
pub use player_config::{PlayerConfigStrategy, PLAYER_SIGNATURES};

/// A synchronous extraction strategy.
pub trait LinkStrategy: Send + Sync {
    /// Provenance attached to candidates from this strategy.
    fn provenance(&self) -> Provenance;

    /// Finds candidates in `content`, resolving relative references
    /// against `base`.
    fn extract(&self, content: &str, base: &Url) -> Vec<LinkCandidate>;
}

/// Collects raw strings that pass the media heuristic into candidates.
#[derive(Debug)]
pub(crate) struct CandidateSink<'a> {
    base: &'a Url,
    min_len: usize,
    provenance: Provenance,
    found: Vec<LinkCandidate>,
}

impl<'a> CandidateSink<'a> {
    pub(crate) fn new(base: &'a Url, min_len: usize, provenance: Provenance) -> Self {
        Self {
            base,
            min_len,
            provenance,
            found: Vec::new(),
        }
    }

    /// Applies the heuristic, resolves, and keeps the result.
    pub(crate) fn offer(&mut self, raw: &str) {
        if !patterns::is_likely_media(raw, self.min_len) {
            return;
        }
        if let Some(url) = patterns::resolve_url(self.base, raw) {
            self.found.push(LinkCandidate::new(url, self.provenance));
        }
    }

    pub(crate) fn finish(self) -> Vec<LinkCandidate> {
        self.found
    }
}

/// Strategies run on iframe content, in order.
#[must_use]
pub fn frame_strategies(config: &ExtractionConfig) -> Vec<Box<dyn LinkStrategy>> {
    let mut strategies: Vec<Box<dyn LinkStrategy>> = Vec::with_capacity(3);
    if config.enable_direct_html {
        strategies.push(Box::new(DirectHtmlStrategy::new(config.min_url_length)));
    }
    if config.enable_javascript {
        strategies.push(Box::new(JavascriptStrategy::new(config.min_url_length)));
    }
    if config.enable_player_config {
        strategies.push(Box::new(PlayerConfigStrategy::new(config.min_url_length)));
    }
    strategies
}

/// All synchronous page strategies, in engine order.
#[must_use]
pub fn page_strategies(config: &ExtractionConfig) -> Vec<Box<dyn LinkStrategy>> {
    let mut strategies = frame_strategies(config);
    if config.enable_json {
        strategies.push(Box::new(JsonStructureStrategy::new(
            config.min_url_length,
            config.max_json_depth,
        )));
    }
    if config.enable_meta_tags {
        strategies.push(Box::new(MetaTagStrategy::new(config.min_url_length)));
    }
    strategies
}

/// Runs a strategy, treating a panic as "found nothing".
pub fn run_guarded(strategy: &dyn LinkStrategy, content: &str, base: &Url) -> Vec<LinkCandidate> {
    match catch_unwind(AssertUnwindSafe(|| strategy.extract(content, base))) {
        Ok(found) => {
            tracing::debug!(
                strategy = %strategy.provenance(),
                found = found.len(),
                "strategy finished"
            );
            found
        }
        Err(_) => {
            tracing::error!(
                strategy = %strategy.provenance(),
                url = %base,
                "strategy panicked, skipping"
            );
            Vec::new()
        }
    }
}
