//! Deduplication, rejection and ranking of candidates.

use std::collections::HashSet;
use tracing::debug;

use super::checks::check_candidate_url;
use crate::config::ExtractionConfig;
use crate::core::{LinkCandidate, RankedResult};

/// Validates and ranks candidate lists.
#[derive(Debug, Clone)]
pub struct LinkValidator {
    min_url_length: usize,
    max_url_length: usize,
    max_candidates: usize,
}

impl Default for LinkValidator {
    fn default() -> Self {
        Self::from_config(&ExtractionConfig::default())
    }
}

impl LinkValidator {
    /// Creates a validator from the extraction settings.
    #[must_use]
    pub fn from_config(config: &ExtractionConfig) -> Self {
        Self {
            min_url_length: config.min_url_length,
            max_url_length: config.max_url_length,
            max_candidates: config.max_candidates,
        }
    }

    /// Sets the output cap.
    #[must_use]
    pub fn with_max_candidates(mut self, max: usize) -> Self {
        self.max_candidates = max;
        self
    }

    /// Drops duplicates and unsafe URLs, re-annotates survivors, then sorts
    /// by quality (stable) and truncates.
    #[must_use]
    pub fn validate_and_rank(&self, candidates: Vec<LinkCandidate>) -> RankedResult {
        let total = candidates.len();
        let mut seen = HashSet::with_capacity(total);
        let mut kept = Vec::with_capacity(total);

        for mut candidate in candidates {
            if !seen.insert(candidate.url.clone()) {
                continue;
            }
            match check_candidate_url(&candidate.url, self.min_url_length, self.max_url_length) {
                Ok(parsed) => {
                    candidate.url = parsed.into();
                    candidate.annotate();
                    kept.push(candidate);
                }
                Err(reason) => {
                    debug!(url = %candidate.url, %reason, provenance = %candidate.provenance, "rejected candidate");
                }
            }
        }

        // Parsing can normalise two spellings into one URL.
        let mut normalised = HashSet::with_capacity(kept.len());
        kept.retain(|c| normalised.insert(c.url.clone()));

        kept.sort_by(|a, b| b.quality.cmp(&a.quality));
        kept.truncate(self.max_candidates);

        debug!(total, kept = kept.len(), "ranked candidates");
        RankedResult::completed(kept)
    }
}

/// Validates and ranks with the given extraction settings.
#[must_use]
pub fn validate_and_rank(candidates: Vec<LinkCandidate>, config: &ExtractionConfig) -> RankedResult {
    LinkValidator::from_config(config).validate_and_rank(candidates)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Provenance, Quality};
    use pretty_assertions::assert_eq;

    fn candidate(url: &str, provenance: Provenance) -> LinkCandidate {
        LinkCandidate::new(url, provenance)
    }

    #[test]
    fn test_dedup_keeps_first_occurrence() {
        let result = LinkValidator::default().validate_and_rank(vec![
            candidate("https://cdn.example.com/a.mp4", Provenance::DirectHtml),
            candidate("https://cdn.example.com/a.mp4", Provenance::Javascript),
        ]);
        assert_eq!(result.len(), 1);
        assert_eq!(result.links[0].provenance, Provenance::DirectHtml);
    }

    #[test]
    fn test_ranks_by_quality_descending() {
        let result = LinkValidator::default().validate_and_rank(vec![
            candidate("https://cdn.example.com/a_480p.mp4", Provenance::DirectHtml),
            candidate("https://cdn.example.com/b_4k.mp4", Provenance::DirectHtml),
            candidate("https://cdn.example.com/c.mp4", Provenance::DirectHtml),
        ]);
        let qualities: Vec<Quality> = result.links.iter().map(|l| l.quality).collect();
        assert_eq!(qualities, vec![Quality::Uhd4k, Quality::P480, Quality::Unknown]);
    }

    #[test]
    fn test_ties_keep_discovery_order() {
        let result = LinkValidator::default().validate_and_rank(vec![
            candidate("https://cdn.example.com/first.mp4", Provenance::MetaTag),
            candidate("https://cdn.example.com/second_720p.mp4", Provenance::Json),
            candidate("https://cdn.example.com/third.mp4", Provenance::DirectHtml),
        ]);
        assert_eq!(
            result.urls().collect::<Vec<_>>(),
            vec![
                "https://cdn.example.com/second_720p.mp4",
                "https://cdn.example.com/first.mp4",
                "https://cdn.example.com/third.mp4",
            ]
        );
    }

    #[test]
    fn test_rejects_unsafe_urls() {
        let result = LinkValidator::default().validate_and_rank(vec![
            candidate("javascript:alert(1)", Provenance::Javascript),
            candidate("http://127.0.0.1/video.mp4", Provenance::DirectHtml),
            candidate("https://cdn.example.com/ok.mp4", Provenance::DirectHtml),
        ]);
        assert_eq!(result.urls().collect::<Vec<_>>(), vec!["https://cdn.example.com/ok.mp4"]);
    }

    #[test]
    fn test_truncates_after_ranking() {
        let mut candidates: Vec<LinkCandidate> = (0..12)
            .map(|i| candidate(&format!("https://cdn.example.com/{i}.mp4"), Provenance::Json))
            .collect();
        candidates.push(candidate("https://cdn.example.com/best_1080p.mp4", Provenance::Json));

        let result = LinkValidator::default().validate_and_rank(candidates);
        assert_eq!(result.len(), 10);
        assert_eq!(result.links[0].quality, Quality::P1080);

        let small = LinkValidator::default()
            .with_max_candidates(2)
            .validate_and_rank(vec![
                candidate("https://cdn.example.com/x.mp4", Provenance::Json),
                candidate("https://cdn.example.com/y.mp4", Provenance::Json),
                candidate("https://cdn.example.com/z.mp4", Provenance::Json),
            ]);
        assert_eq!(small.len(), 2);
    }

    #[test]
    fn test_idempotent() {
        let input = vec![
            candidate("https://cdn.example.com/a_720p.mp4", Provenance::DirectHtml),
            candidate("https://cdn.example.com/b.m3u8", Provenance::Javascript),
        ];
        let validator = LinkValidator::default();
        let first = validator.validate_and_rank(input.clone());
        let second = validator.validate_and_rank(first.links.clone());
        assert_eq!(first, second);
        assert_eq!(first, validator.validate_and_rank(input));
    }

    #[test]
    fn test_empty_input() {
        let result = validate_and_rank(Vec::new(), &ExtractionConfig::default());
        assert!(result.is_empty());
        assert!(result.status.is_completed());
    }
}
