//! Test assertions for ranked results.

use crate::core::{ExtractionStatus, RankedResult};
use crate::validate::{check_candidate_url, has_injection_marker};

/// Asserts that the result contains the URL.
pub fn assert_contains_url(result: &RankedResult, url: &str) {
    assert!(
        result.urls().any(|u| u == url),
        "Expected result to contain '{}', got {:?}",
        url,
        result.urls().collect::<Vec<_>>()
    );
}

/// Asserts that the result does not contain the URL.
pub fn assert_lacks_url(result: &RankedResult, url: &str) {
    assert!(
        result.urls().all(|u| u != url),
        "Expected result not to contain '{url}'"
    );
}

/// Asserts the status classification.
pub fn assert_status(result: &RankedResult, expected: ExtractionStatus) {
    assert_eq!(
        result.status, expected,
        "Expected status {:?}, got {:?}",
        expected, result.status
    );
}

/// Asserts that qualities never increase down the list.
pub fn assert_ranked(result: &RankedResult) {
    for pair in result.links.windows(2) {
        assert!(
            pair[0].quality >= pair[1].quality,
            "'{}' ({}) ranked above '{}' ({})",
            pair[0].url,
            pair[0].quality,
            pair[1].url,
            pair[1].quality
        );
    }
}

/// Asserts every link is unique and passes the security checks.
pub fn assert_all_safe(result: &RankedResult) {
    let mut seen = std::collections::HashSet::new();
    for link in &result.links {
        assert!(seen.insert(&link.url), "Duplicate link '{}'", link.url);
        assert!(!has_injection_marker(&link.url), "Unsafe link '{}'", link.url);
        assert!(
            check_candidate_url(&link.url, 0, usize::MAX).is_ok(),
            "Invalid link '{}'",
            link.url
        );
    }
}
