//! The ranked result handed back to callers.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use super::candidate::LinkCandidate;
use super::outcome::FetchFailureKind;

/// Why an extraction produced the links it did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "reason", rename_all = "snake_case")]
pub enum ExtractionStatus {
    /// All strategies ran; the link list may still be empty.
    Completed,
    /// The page URL was rejected before any fetch.
    InvalidUrl,
    /// The page could not be fetched.
    NoContent(FetchFailureKind),
    /// The overall deadline expired.
    TimedOut,
    /// An unexpected internal fault was contained.
    Internal,
}

impl ExtractionStatus {
    /// Whether extraction ran to completion.
    #[must_use]
    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed)
    }
}

impl fmt::Display for ExtractionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Completed => write!(f, "completed"),
            Self::InvalidUrl => write!(f, "invalid_url"),
            Self::NoContent(kind) => write!(f, "no_content:{kind}"),
            Self::TimedOut => write!(f, "timed_out"),
            Self::Internal => write!(f, "internal"),
        }
    }
}

/// Ordered, deduplicated, validated candidates, best quality first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankedResult {
    /// The links, quality descending.
    pub links: Vec<LinkCandidate>,
    /// Classification of how the extraction ended.
    #[serde(flatten)]
    pub status: ExtractionStatus,
}

impl RankedResult {
    /// A completed result holding the given links.
    #[must_use]
    pub fn completed(links: Vec<LinkCandidate>) -> Self {
        Self {
            links,
            status: ExtractionStatus::Completed,
        }
    }

    /// An empty result with the given classification.
    #[must_use]
    pub fn empty(status: ExtractionStatus) -> Self {
        Self {
            links: Vec::new(),
            status,
        }
    }

    /// Number of links.
    #[must_use]
    pub fn len(&self) -> usize {
        self.links.len()
    }

    /// Whether no links were found.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    /// The highest ranked link.
    #[must_use]
    pub fn best(&self) -> Option<&LinkCandidate> {
        self.links.first()
    }

    /// Iterates over the link URLs in rank order.
    pub fn urls(&self) -> impl Iterator<Item = &str> {
        self.links.iter().map(|link| link.url.as_str())
    }

    /// Converts to dictionary.
    #[must_use]
    pub fn to_dict(&self) -> HashMap<String, serde_json::Value> {
        let mut dict = HashMap::new();
        dict.insert("status".to_string(), serde_json::json!(self.status.to_string()));
        dict.insert("count".to_string(), serde_json::json!(self.links.len()));
        dict.insert(
            "links".to_string(),
            serde_json::json!(self.links.iter().map(LinkCandidate::to_dict).collect::<Vec<_>>()),
        );
        dict
    }
}

impl Default for RankedResult {
    fn default() -> Self {
        Self::completed(Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Provenance;

    #[test]
    fn test_empty_result() {
        let result = RankedResult::empty(ExtractionStatus::TimedOut);
        assert!(result.is_empty());
        assert_eq!(result.len(), 0);
        assert!(result.best().is_none());
        assert!(!result.status.is_completed());
    }

    #[test]
    fn test_status_display() {
        assert_eq!(ExtractionStatus::Completed.to_string(), "completed");
        assert_eq!(
            ExtractionStatus::NoContent(FetchFailureKind::NotFound).to_string(),
            "no_content:not_found"
        );
    }

    #[test]
    fn test_result_to_dict() {
        let result = RankedResult::completed(vec![LinkCandidate::new(
            "https://cdn.example.com/a_720p.mp4",
            Provenance::DirectHtml,
        )]);
        let dict = result.to_dict();
        assert_eq!(dict.get("count"), Some(&serde_json::json!(1)));
        assert_eq!(dict.get("status"), Some(&serde_json::json!("completed")));
        assert_eq!(result.urls().collect::<Vec<_>>(), vec!["https://cdn.example.com/a_720p.mp4"]);
    }

    #[test]
    fn test_result_serialize_flattens_status() {
        let result = RankedResult::empty(ExtractionStatus::NoContent(FetchFailureKind::Timeout));
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["status"], "no_content");
        assert_eq!(json["reason"], "timeout");
        assert_eq!(json["links"], serde_json::json!([]));
    }
}
