//! Quality and kind detection from URL text.

use regex::Regex;
use std::sync::LazyLock;

use crate::core::{LinkKind, Quality};
use crate::extract::patterns::media_extension;

/// Quality markers, best first: `(numeric, word, tier)`.
///
/// Numeric markers such as `1080p` match anywhere, so `movie1080p` and
/// `1080p60` count. Word markers such as `hd` need a separator on each side.
const QUALITY_MARKERS: &[(&str, &str, Quality)] = &[
    (r"4k|2160p", r"2160|uhd|ultra[ ._-]?hd", Quality::Uhd4k),
    (r"1080[pi]", r"fullhd|fhd|full[ ._-]?hd", Quality::P1080),
    (r"720p", r"hd|high[ ._-]?def", Quality::P720),
    (r"480p", r"sd|standard[ ._-]?def", Quality::P480),
    (r"360p", r"low[ ._-]?quality", Quality::P360),
    (r"240p", r"very[ ._-]?low", Quality::P240),
];

// The `regex` crate has no lookaround, so boundaries are consumed. That is
// fine for `is_match`. Underscore counts as a separator, unlike `\b`.
#[allow(clippy::expect_used)]
static QUALITY_TABLE: LazyLock<Vec<(Regex, Quality)>> = LazyLock::new(|| {
    QUALITY_MARKERS
        .iter()
        .map(|(numeric, word, quality)| {
            let pattern =
                format!(r"(?i)(?:{numeric})|(?:^|[^a-z0-9])(?:{word})(?:[^a-z0-9]|$)");
            (
                Regex::new(&pattern).expect("quality pattern is valid"),
                *quality,
            )
        })
        .collect()
});

/// Infers the quality tier; the first table entry that matches wins.
#[must_use]
pub fn detect_quality(url: &str) -> Quality {
    QUALITY_TABLE
        .iter()
        .find(|(re, _)| re.is_match(url))
        .map_or(Quality::Unknown, |(_, quality)| *quality)
}

/// Infers the media kind from the URL suffix.
#[must_use]
pub fn detect_kind(url: &str) -> LinkKind {
    media_extension(url).map_or(LinkKind::GenericStream, |ext| ext.kind)
}

/// Container or manifest label, when the URL carries a known suffix.
#[must_use]
pub fn detect_format(url: &str) -> Option<&'static str> {
    media_extension(url).map(|ext| ext.format)
}
