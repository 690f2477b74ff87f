//! String literals and assignment idioms inside `<script>` blocks.

use regex::Regex;
use scraper::{Html, Selector};
use std::sync::LazyLock;
use url::Url;

use super::patterns::extension_alternation;
use super::{CandidateSink, LinkStrategy};
use crate::core::{LinkCandidate, Provenance};

#[allow(clippy::expect_used)]
static SCRIPT: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("script").expect("script selector is valid"));

/// Script patterns; capture group 1 is the candidate.
#[allow(clippy::expect_used)]
static SCRIPT_PATTERNS: LazyLock<Vec<(&'static str, Regex)>> = LazyLock::new(|| {
    let ext = extension_alternation();
    [
        (
            "quoted-media",
            format!(r#"(?i)["']([^"'\s]*\.(?:{ext})(?:\?[^"'\s]*)?)["']"#),
        ),
        (
            "assignment",
            r#"(?i)\b["']?(?:url|src|file|source|video)["']?\s*[:=]\s*["']([^"']+)["']"#.to_string(),
        ),
        (
            "format-key",
            r#"(?i)\b["']?(?:hls|dash|mp4|webm|mkv)["']?\s*[:=]\s*["']([^"']+)["']"#.to_string(),
        ),
        (
            "playlist",
            r#"(?i)\bplaylist["']?\s*[:=]\s*["']([^"']+\.m3u8[^"']*)["']"#.to_string(),
        ),
        (
            "manifest",
            r#"(?i)\bmanifest["']?\s*[:=]\s*["']([^"']+\.mpd[^"']*)["']"#.to_string(),
        ),
    ]
    .into_iter()
    .map(|(name, pattern)| (name, Regex::new(&pattern).expect("script pattern is valid")))
    .collect()
});

/// Scans inline scripts with static patterns. Nothing is executed.
#[derive(Debug, Clone)]
pub struct JavascriptStrategy {
    min_url_length: usize,
}

impl JavascriptStrategy {
    /// Creates the strategy.
    #[must_use]
    pub fn new(min_url_length: usize) -> Self {
        Self { min_url_length }
    }

    /// Text of every `<script>` element, in document order.
    #[must_use]
    pub fn script_blocks(content: &str) -> Vec<String> {
        let document = Html::parse_document(content);
        document
            .select(&SCRIPT)
            .map(|script| script.text().collect::<String>())
            .filter(|text| !text.trim().is_empty())
            .collect()
    }
}

impl LinkStrategy for JavascriptStrategy {
    fn provenance(&self) -> Provenance {
        Provenance::Javascript
    }

    fn extract(&self, content: &str, base: &Url) -> Vec<LinkCandidate> {
        let mut sink = CandidateSink::new(base, self.min_url_length, self.provenance());
        for block in Self::script_blocks(content) {
            for (_, pattern) in SCRIPT_PATTERNS.iter() {
                for caps in pattern.captures_iter(&block) {
                    if let Some(m) = caps.get(1) {
                        sink.offer(m.as_str());
                    }
                }
            }
        }
        sink.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn urls(html: &str) -> Vec<String> {
        let base = Url::parse("https://site.example.com/watch/ep-1").unwrap();
        JavascriptStrategy::new(10)
            .extract(html, &base)
            .into_iter()
            .map(|c| c.url)
            .collect()
    }

    #[test]
    fn test_quoted_media_string() {
        let found = urls(r#"<script>var a = "https://cdn.example.com/hls/master.m3u8?t=1";</script>"#);
        assert!(found.contains(&"https://cdn.example.com/hls/master.m3u8?t=1".to_string()));
    }

    #[test]
    fn test_assignment_idioms() {
        let found = urls(
            r#"<script>
                player.load({ file: '/videos/ep1_720p.mp4' });
                config.hls = "https://edge.example.com/live/stream";
                var x = { playlist: "https://cdn.example.com/p/list.m3u8" };
                var y = { manifest: "https://cdn.example.com/d/manifest.mpd" };
            </script>"#,
        );
        assert!(found.contains(&"https://site.example.com/videos/ep1_720p.mp4".to_string()));
        assert!(found.contains(&"https://edge.example.com/live/stream".to_string()));
        assert!(found.contains(&"https://cdn.example.com/p/list.m3u8".to_string()));
        assert!(found.contains(&"https://cdn.example.com/d/manifest.mpd".to_string()));
    }

    #[test]
    fn test_only_script_blocks_are_scanned() {
        let found = urls(r#"<p>"https://cdn.example.com/outside.mp4"</p><script>var n = 1;</script>"#);
        assert!(found.is_empty(), "{found:?}");
    }

    #[test]
    fn test_escaped_slashes() {
        let found = urls(r#"<script>var s = {"src":"https:\/\/cdn.example.com\/v\/a.mp4"};</script>"#);
        assert!(found.contains(&"https://cdn.example.com/v/a.mp4".to_string()));
    }

    #[test]
    fn test_skips_assets() {
        let found = urls(r#"<script>var u = {src: "https://cdn.example.com/js/player.js"};</script>"#);
        assert!(found.is_empty(), "{found:?}");
    }
}
