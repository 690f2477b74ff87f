//! Shared pattern tables and the media-likelihood heuristic.
//!
//! Every table is ordered data: lookups walk it top to bottom and the
//! first hit wins.

use regex::Regex;
use std::sync::LazyLock;
use url::Url;

use crate::core::LinkKind;

/// A recognised media file suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MediaExtension {
    /// Suffix without the dot, lowercase.
    pub ext: &'static str,
    /// Kind implied by the suffix.
    pub kind: LinkKind,
    /// Format label attached to candidates.
    pub format: &'static str,
}

const fn media(ext: &'static str, kind: LinkKind, format: &'static str) -> MediaExtension {
    MediaExtension { ext, kind, format }
}

/// Media suffixes, streaming manifests first so `video.mp4/index.m3u8`
/// classifies as a playlist.
pub const MEDIA_EXTENSIONS: &[MediaExtension] = &[
    media("m3u8", LinkKind::HlsPlaylist, "HLS"),
    media("mpd", LinkKind::DashManifest, "DASH"),
    media("f4m", LinkKind::FlashManifest, "F4M"),
    media("f4v", LinkKind::FlashManifest, "F4V"),
    media("mp4", LinkKind::DirectVideo, "MP4"),
    media("mkv", LinkKind::DirectVideo, "MKV"),
    media("avi", LinkKind::DirectVideo, "AVI"),
    media("mov", LinkKind::DirectVideo, "MOV"),
    media("wmv", LinkKind::DirectVideo, "WMV"),
    media("flv", LinkKind::DirectVideo, "FLV"),
    media("webm", LinkKind::DirectVideo, "WEBM"),
    media("m4v", LinkKind::DirectVideo, "M4V"),
    media("3gp", LinkKind::DirectVideo, "3GP"),
    media("ogv", LinkKind::DirectVideo, "OGV"),
    media("ts", LinkKind::DirectVideo, "TS"),
];

/// Keywords that mark a string as stream-related when no suffix matches.
pub const STREAMING_KEYWORDS: &[&str] = &["stream", "video", "play", "hls", "dash", "cdn", "media"];

/// Path suffixes that are never media, even when a keyword matches.
pub const EXCLUDED_SUFFIXES: &[&str] = &[
    "css", "js", "json", "xml", "txt", "png", "jpg", "jpeg", "gif", "svg", "ico", "webp", "woff",
    "woff2", "ttf", "eot",
];

/// Substrings that mark tracking and advertising endpoints.
pub const EXCLUDED_MARKERS: &[&str] = &[
    "/api/track",
    "analytics",
    "/ads/",
    "advertisement",
    "doubleclick",
];

/// Iframe `src` keywords that suggest an embedded player.
pub const IFRAME_PLAYER_KEYWORDS: &[&str] = &[
    "player", "embed", "video", "stream", "play", "watch", "movie", "film", "tv", "episode",
    "show",
];

/// Iframe purposes that are never followed.
pub const IFRAME_EXCLUDED: &[&str] = &[
    "ads",
    "analytics",
    "tracking",
    "facebook",
    "twitter",
    "comment",
    "disqus",
    "share",
    "social",
    "doubleclick",
];

/// Alternation of all media suffixes, built from [`MEDIA_EXTENSIONS`].
pub fn extension_alternation() -> String {
    MEDIA_EXTENSIONS
        .iter()
        .map(|m| m.ext)
        .collect::<Vec<_>>()
        .join("|")
}

#[allow(clippy::expect_used)]
static EXTENSION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r#"(?i)\.({})(?:$|[?#&/;,"'\s)])"#,
        extension_alternation()
    ))
    .expect("extension pattern is valid")
});

#[allow(clippy::expect_used)]
static EXCLUDED_SUFFIX_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"(?i)\.(?:{})$", EXCLUDED_SUFFIXES.join("|")))
        .expect("excluded suffix pattern is valid")
});

/// Finds the highest-priority media suffix present in the text.
#[must_use]
pub fn media_extension(text: &str) -> Option<&'static MediaExtension> {
    EXTENSION_RE
        .captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .filter_map(|m| {
            let ext = m.as_str().to_ascii_lowercase();
            MEDIA_EXTENSIONS.iter().position(|known| known.ext == ext)
        })
        .min()
        .map(|idx| &MEDIA_EXTENSIONS[idx])
}

fn path_part(text: &str) -> &str {
    let end = text.find(['?', '#']).unwrap_or(text.len());
    &text[..end]
}

/// The media-likelihood heuristic applied to every raw string a strategy
/// finds.
///
/// Stylesheet, script, data and image suffixes always reject. Otherwise a
/// media suffix accepts, tracking markers reject, and a streaming keyword
/// accepts.
#[must_use]
pub fn is_likely_media(text: &str, min_len: usize) -> bool {
    let text = text.trim();
    if text.len() < min_len {
        return false;
    }
    if EXCLUDED_SUFFIX_RE.is_match(path_part(text)) {
        return false;
    }
    if media_extension(text).is_some() {
        return true;
    }
    let lower = text.to_ascii_lowercase();
    if EXCLUDED_MARKERS.iter().any(|marker| lower.contains(marker)) {
        return false;
    }
    STREAMING_KEYWORDS.iter().any(|kw| lower.contains(kw))
}

/// Whether an iframe `src` looks like an embedded player worth following.
#[must_use]
pub fn is_likely_player_iframe(src: &str) -> bool {
    let lower = src.to_ascii_lowercase();
    if IFRAME_EXCLUDED.iter().any(|marker| lower.contains(marker)) {
        return false;
    }
    IFRAME_PLAYER_KEYWORDS.iter().any(|kw| lower.contains(kw))
}

/// Resolves a raw attribute or script string against the page URL.
///
/// Undoes JSON-style `\/` escaping and `&amp;` entities first. Returns
/// `None` for empty strings and values `url` cannot join.
#[must_use]
pub fn resolve_url(base: &Url, raw: &str) -> Option<String> {
    let cleaned = raw.trim().replace("\\/", "/").replace("&amp;", "&");
    if cleaned.is_empty() {
        return None;
    }
    base.join(&cleaned).ok().map(String::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_media_extension_prefers_manifests() {
        let ext = media_extension("https://cdn.example.com/hls/movie.mp4/index.m3u8").unwrap();
        assert_eq!(ext.kind, LinkKind::HlsPlaylist);

        let ext = media_extension("https://cdn.example.com/a.MP4?token=1").unwrap();
        assert_eq!(ext.format, "MP4");

        assert!(media_extension("https://example.com/tsunami").is_none());
        assert!(media_extension("https://example.com/file.tsx").is_none());
    }

    #[test]
    fn test_is_likely_media_accepts_extensions_and_keywords() {
        assert!(is_likely_media("https://cdn.example.com/video.mp4", 10));
        assert!(is_likely_media("/media/clip.webm", 10));
        assert!(is_likely_media("https://edge.example.com/live/stream?id=7", 10));
        assert!(is_likely_media("https://example.com/x/segment-001.ts", 10));
    }

    #[test]
    fn test_is_likely_media_rejects_assets_and_tracking() {
        assert!(!is_likely_media("https://cdn.example.com/player.js", 10));
        assert!(!is_likely_media("https://cdn.example.com/video-thumb.jpg?v=2", 10));
        assert!(!is_likely_media("https://cdn.example.com/styles/video.css", 10));
        assert!(!is_likely_media("https://example.com/api/track/video", 10));
        assert!(!is_likely_media("https://doubleclick.net/stream", 10));
        assert!(!is_likely_media("https://example.com/about", 10));
    }

    #[test]
    fn test_is_likely_media_min_length() {
        assert!(!is_likely_media("a.mp4", 10));
        assert!(is_likely_media("a.mp4", 5));
    }

    #[test]
    fn test_extension_beats_tracking_marker() {
        assert!(is_likely_media("https://example.com/analytics/intro.mp4", 10));
    }

    #[test]
    fn test_is_likely_player_iframe() {
        assert!(is_likely_player_iframe("https://player.example.com/e/abc"));
        assert!(is_likely_player_iframe("/embed/12345"));
        assert!(!is_likely_player_iframe("https://www.facebook.com/plugins/video.php"));
        assert!(!is_likely_player_iframe("https://ads.example.com/player"));
        assert!(!is_likely_player_iframe("https://example.com/sidebar"));
    }

    #[test]
    fn test_player_iframe_exclusions_match_inside_words() {
        assert!(!is_likely_player_iframe("https://adserver.example.com/embed/1"));
        assert!(!is_likely_player_iframe("https://cdn.example.com/ads_player/v"));
        assert!(!is_likely_player_iframe("https://sharethis.example.com/video"));
        assert!(!is_likely_player_iframe("https://example.com/embed?utm=TRACKING"));
    }

    #[test]
    fn test_resolve_url() {
        let base = Url::parse("https://site.example.com/watch/ep-1.html").unwrap();
        assert_eq!(
            resolve_url(&base, "/media/a.mp4").as_deref(),
            Some("https://site.example.com/media/a.mp4")
        );
        assert_eq!(
            resolve_url(&base, "//cdn.example.com/a.m3u8").as_deref(),
            Some("https://cdn.example.com/a.m3u8")
        );
        assert_eq!(
            resolve_url(&base, r"https:\/\/cdn.example.com\/b.mp4?a=1&amp;b=2").as_deref(),
            Some("https://cdn.example.com/b.mp4?a=1&b=2")
        );
        assert_eq!(resolve_url(&base, "   "), None);
    }
}
