//! Span attributes and timing for extraction runs.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::time::Instant;

use crate::core::{Provenance, RankedResult};

/// Span attributes for one extraction.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtractionSpanAttributes {
    /// Page being extracted.
    pub page_url: String,
    /// Per-run request ID.
    pub request_id: Option<String>,
    /// Final status label.
    pub status: Option<String>,
    /// Links returned.
    pub link_count: Option<usize>,
    /// Total duration in milliseconds.
    pub duration_ms: Option<f64>,
    /// Raw candidates per strategy, before validation.
    pub strategy_counts: BTreeMap<String, usize>,
}

impl ExtractionSpanAttributes {
    /// Creates attributes for a page.
    #[must_use]
    pub fn new(page_url: impl Into<String>) -> Self {
        Self {
            page_url: page_url.into(),
            ..Default::default()
        }
    }

    /// Sets the request ID.
    #[must_use]
    pub fn with_request_id(mut self, id: impl Into<String>) -> Self {
        self.request_id = Some(id.into());
        self
    }

    /// Records how many raw candidates a strategy produced.
    pub fn record_strategy(&mut self, strategy: Provenance, found: usize) {
        *self.strategy_counts.entry(strategy.to_string()).or_default() += found;
    }

    /// Fills in the outcome.
    pub fn finish(&mut self, result: &RankedResult, duration_ms: f64) {
        self.status = Some(result.status.to_string());
        self.link_count = Some(result.len());
        self.duration_ms = Some(duration_ms);
    }

    /// Converts to OpenTelemetry-style attributes.
    #[must_use]
    pub fn to_otel_attributes(&self) -> HashMap<String, String> {
        let mut attrs = HashMap::new();
        attrs.insert("extraction.page_url".to_string(), self.page_url.clone());
        if let Some(ref v) = self.request_id {
            attrs.insert("extraction.request_id".to_string(), v.clone());
        }
        if let Some(ref v) = self.status {
            attrs.insert("extraction.status".to_string(), v.clone());
        }
        if let Some(v) = self.link_count {
            attrs.insert("extraction.link_count".to_string(), v.to_string());
        }
        if let Some(v) = self.duration_ms {
            attrs.insert("extraction.duration_ms".to_string(), v.to_string());
        }
        for (strategy, count) in &self.strategy_counts {
            attrs.insert(format!("extraction.strategy.{strategy}"), count.to_string());
        }
        attrs
    }
}

/// Simple span timing helper.
#[derive(Debug)]
pub struct SpanTimer {
    start: Instant,
    name: String,
}

impl SpanTimer {
    /// Starts a new span timer.
    #[must_use]
    pub fn start(name: impl Into<String>) -> Self {
        Self {
            start: Instant::now(),
            name: name.into(),
        }
    }

    /// Returns the elapsed time in milliseconds.
    #[must_use]
    pub fn elapsed_ms(&self) -> f64 {
        self.start.elapsed().as_secs_f64() * 1000.0
    }

    /// Returns the span name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Finishes the span and returns the duration.
    #[must_use]
    pub fn finish(self) -> f64 {
        self.elapsed_ms()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ExtractionStatus;

    #[test]
    fn test_extraction_span_attributes() {
        let mut attrs = ExtractionSpanAttributes::new("https://site.example.com/ep-1")
            .with_request_id("req-1");
        attrs.record_strategy(Provenance::DirectHtml, 2);
        attrs.record_strategy(Provenance::DirectHtml, 1);
        attrs.finish(&RankedResult::empty(ExtractionStatus::TimedOut), 12.5);

        let otel = attrs.to_otel_attributes();
        assert_eq!(otel.get("extraction.request_id"), Some(&"req-1".to_string()));
        assert_eq!(otel.get("extraction.status"), Some(&"timed_out".to_string()));
        assert_eq!(otel.get("extraction.link_count"), Some(&"0".to_string()));
        assert_eq!(otel.get("extraction.strategy.direct-html"), Some(&"3".to_string()));
    }

    #[test]
    fn test_span_timer() {
        let timer = SpanTimer::start("extract");
        std::thread::sleep(std::time::Duration::from_millis(10));
        assert_eq!(timer.name(), "extract");
        assert!(timer.finish() >= 10.0);
    }
}
