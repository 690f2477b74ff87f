//! Setup calls of well-known embeddable players.

use regex::Regex;
use std::sync::LazyLock;
use url::Url;

use super::{CandidateSink, LinkStrategy};
use crate::core::{LinkCandidate, Provenance};

/// Player name and the pattern whose group 1 is the options block (or the
/// argument list, for `videojs(..).src(..)`).
pub const PLAYER_SIGNATURES: &[(&str, &str)] = &[
    ("jwplayer", r"jwplayer\([^)]*\)\s*\.setup\(\s*\{([^}]+)\}\s*\)"),
    ("flowplayer", r"flowplayer\([^)]*,\s*\{([^}]+)\}\s*\)"),
    ("videojs", r"videojs\([^)]*\)\s*\.src\(\s*([^)]+)\s*\)"),
    ("plyr", r"new\s+Plyr\([^)]*,\s*\{([^}]+)\}\s*\)"),
    ("dplayer", r"new\s+DPlayer\(\s*\{([^}]+)\}\s*\)"),
];

#[allow(clippy::expect_used)]
static SIGNATURES: LazyLock<Vec<(&'static str, Regex)>> = LazyLock::new(|| {
    PLAYER_SIGNATURES
        .iter()
        .map(|(name, pattern)| {
            let re = Regex::new(&format!("(?is){pattern}")).expect("player pattern is valid");
            (*name, re)
        })
        .collect()
});

#[allow(clippy::expect_used)]
static OPTION_KEY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)["']?\b(?:file|src|source|url)["']?\s*:\s*["']([^"']+)["']"#)
        .expect("option key pattern is valid")
});

#[allow(clippy::expect_used)]
static LEADING_STRING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^\s*["']([^"']+)["']"#).expect("leading string pattern is valid")
});

/// Reads `file`/`src`/`source`/`url` options from player setup blocks.
#[derive(Debug, Clone)]
pub struct PlayerConfigStrategy {
    min_url_length: usize,
}

impl PlayerConfigStrategy {
    /// Creates the strategy.
    #[must_use]
    pub fn new(min_url_length: usize) -> Self {
        Self { min_url_length }
    }
}

impl LinkStrategy for PlayerConfigStrategy {
    fn provenance(&self) -> Provenance {
        Provenance::PlayerConfig
    }

    fn extract(&self, content: &str, base: &Url) -> Vec<LinkCandidate> {
        let mut sink = CandidateSink::new(base, self.min_url_length, self.provenance());
        for (player, signature) in SIGNATURES.iter() {
            for caps in signature.captures_iter(content) {
                let Some(block) = caps.get(1).map(|m| m.as_str()) else {
                    continue;
                };
                tracing::trace!(player, "found player setup");
                // `videojs(..).src("...")` passes the URL directly.
                if let Some(direct) = LEADING_STRING.captures(block).and_then(|c| c.get(1)) {
                    sink.offer(direct.as_str());
                }
                for option in OPTION_KEY.captures_iter(block) {
                    if let Some(value) = option.get(1) {
                        sink.offer(value.as_str());
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

    fn urls(content: &str) -> Vec<String> {
        let base = Url::parse("https://site.example.com/watch/ep-1").unwrap();
        PlayerConfigStrategy::new(10)
            .extract(content, &base)
            .into_iter()
            .map(|c| c.url)
            .collect()
    }

    #[test]
    fn test_jwplayer_setup() {
        let found = urls(
            r#"jwplayer("player").setup({
                file: "https://cdn.example.com/jw/master_1080p.m3u8",
                image: "https://cdn.example.com/poster.jpg"
            });"#,
        );
        assert_eq!(found, vec!["https://cdn.example.com/jw/master_1080p.m3u8"]);
    }

    #[test]
    fn test_flowplayer_and_plyr() {
        let found = urls(
            r##"flowplayer("#fp", { "src": "/fp/clip.mp4" });
               new Plyr('#plyr', { source: 'https://cdn.example.com/plyr/a.webm' });"##,
        );
        assert!(found.contains(&"https://site.example.com/fp/clip.mp4".to_string()));
        assert!(found.contains(&"https://cdn.example.com/plyr/a.webm".to_string()));
    }

    #[test]
    fn test_videojs_src_forms() {
        let found = urls(
            r#"videojs('v1').src("https://cdn.example.com/vjs/one.m3u8");
               videojs('v2').src({ type: 'application/x-mpegURL', src: 'https://cdn.example.com/vjs/two.m3u8' });"#,
        );
        assert!(found.contains(&"https://cdn.example.com/vjs/one.m3u8".to_string()));
        assert!(found.contains(&"https://cdn.example.com/vjs/two.m3u8".to_string()));
    }

    #[test]
    fn test_dplayer() {
        let found = urls(r#"const dp = new DPlayer({ container: el, url: "https://cdn.example.com/dp/ep.mp4" });"#);
        assert_eq!(found, vec!["https://cdn.example.com/dp/ep.mp4"]);
    }

    #[test]
    fn test_no_player_no_candidates() {
        assert!(urls(r#"var config = { file: "https://cdn.example.com/a.mp4" };"#).is_empty());
    }

    #[test]
    fn test_signature_table_compiles() {
        assert_eq!(SIGNATURES.len(), PLAYER_SIGNATURES.len());
    }
}
