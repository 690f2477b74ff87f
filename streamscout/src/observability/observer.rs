//! Observer callbacks for extraction runs.

use parking_lot::RwLock;

use crate::core::{FetchOutcome, Provenance, RankedResult};

/// Observability callbacks for the extraction engine.
pub trait ExtractionObserver: Send + Sync {
    /// Called when an extraction starts.
    fn on_extract_start(&self, page_url: &str, request_id: &str);

    /// Called when the page fetch finishes, successfully or not.
    fn on_fetch_complete(&self, page_url: &str, request_id: &str, outcome: &FetchOutcome);

    /// Called after each strategy with its raw candidate count.
    fn on_strategy_complete(&self, page_url: &str, request_id: &str, strategy: Provenance, found: usize);

    /// Called with the final result.
    fn on_extract_complete(&self, page_url: &str, request_id: &str, duration_ms: f64, result: &RankedResult);
}

/// No-op implementation of [`ExtractionObserver`].
#[derive(Debug, Clone, Default)]
pub struct NoOpObserver;

impl ExtractionObserver for NoOpObserver {
    fn on_extract_start(&self, _page_url: &str, _request_id: &str) {}
    fn on_fetch_complete(&self, _page_url: &str, _request_id: &str, _outcome: &FetchOutcome) {}
    fn on_strategy_complete(&self, _page_url: &str, _request_id: &str, _strategy: Provenance, _found: usize) {}
    fn on_extract_complete(&self, _page_url: &str, _request_id: &str, _duration_ms: f64, _result: &RankedResult) {}
}

/// Observer that writes structured log events.
#[derive(Debug, Clone, Default)]
pub struct LoggingObserver;

impl ExtractionObserver for LoggingObserver {
    fn on_extract_start(&self, page_url: &str, request_id: &str) {
        tracing::info!(page_url, request_id, "Extraction started");
    }

    fn on_fetch_complete(&self, page_url: &str, request_id: &str, outcome: &FetchOutcome) {
        match outcome {
            FetchOutcome::Success(content) => tracing::debug!(
                page_url,
                request_id,
                attempts = content.attempts,
                bytes = content.text.len(),
                "Page fetched"
            ),
            FetchOutcome::Failure(failure) => tracing::warn!(
                page_url,
                request_id,
                kind = %failure.kind,
                attempts = failure.attempts,
                "Page fetch failed"
            ),
        }
    }

    fn on_strategy_complete(&self, page_url: &str, request_id: &str, strategy: Provenance, found: usize) {
        tracing::debug!(page_url, request_id, strategy = %strategy, found, "Strategy complete");
    }

    fn on_extract_complete(&self, page_url: &str, request_id: &str, duration_ms: f64, result: &RankedResult) {
        tracing::info!(
            page_url,
            request_id,
            duration_ms,
            status = %result.status,
            links = result.len(),
            "Extraction complete"
        );
    }
}

/// A recorded observer callback.
#[derive(Debug, Clone, PartialEq)]
pub enum ObservedEvent {
    /// Extraction started.
    Started {
        /// Page URL.
        page_url: String,
    },
    /// Fetch finished.
    Fetched {
        /// Whether the fetch succeeded.
        success: bool,
    },
    /// A strategy finished.
    Strategy {
        /// Which strategy.
        strategy: Provenance,
        /// Raw candidates found.
        found: usize,
    },
    /// Extraction finished.
    Completed {
        /// Status label.
        status: String,
        /// Links returned.
        links: usize,
    },
}

/// Observer that records events in memory, for tests.
#[derive(Debug, Default)]
pub struct CollectingObserver {
    events: RwLock<Vec<ObservedEvent>>,
}

impl CollectingObserver {
    /// Creates a new collecting observer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns all recorded events.
    #[must_use]
    pub fn events(&self) -> Vec<ObservedEvent> {
        self.events.read().clone()
    }

    /// Strategies reported, in order.
    #[must_use]
    pub fn strategies(&self) -> Vec<Provenance> {
        self.events
            .read()
            .iter()
            .filter_map(|e| match e {
                ObservedEvent::Strategy { strategy, .. } => Some(*strategy),
                _ => None,
            })
            .collect()
    }

    /// Clears all events.
    pub fn clear(&self) {
        self.events.write().clear();
    }
}

impl ExtractionObserver for CollectingObserver {
    fn on_extract_start(&self, page_url: &str, _request_id: &str) {
        self.events.write().push(ObservedEvent::Started {
            page_url: page_url.to_string(),
        });
    }

    fn on_fetch_complete(&self, _page_url: &str, _request_id: &str, outcome: &FetchOutcome) {
        self.events.write().push(ObservedEvent::Fetched {
            success: outcome.is_success(),
        });
    }

    fn on_strategy_complete(&self, _page_url: &str, _request_id: &str, strategy: Provenance, found: usize) {
        self.events
            .write()
            .push(ObservedEvent::Strategy { strategy, found });
    }

    fn on_extract_complete(&self, _page_url: &str, _request_id: &str, _duration_ms: f64, result: &RankedResult) {
        self.events.write().push(ObservedEvent::Completed {
            status: result.status.to_string(),
            links: result.len(),
        });
    }
}
