//! `<video>`/`<source>` tags and media-bearing attributes.

use scraper::{Html, Selector};
use std::sync::LazyLock;
use url::Url;

use super::patterns::media_extension;
use super::{CandidateSink, LinkStrategy};
use crate::core::{LinkCandidate, Provenance};

/// Which attribute to read, and whether it must carry a media suffix.
struct AttributeRule {
    selector: Selector,
    attribute: &'static str,
    needs_extension: bool,
}

#[allow(clippy::expect_used)]
fn rule(selector: &str, attribute: &'static str, needs_extension: bool) -> AttributeRule {
    AttributeRule {
        selector: Selector::parse(selector).expect("direct-html selector is valid"),
        attribute,
        needs_extension,
    }
}

static RULES: LazyLock<Vec<AttributeRule>> = LazyLock::new(|| {
    vec![
        rule("video[src]", "src", false),
        rule("source[src]", "src", false),
        rule("[src]:not(video):not(source)", "src", true),
        rule("[data-src]", "data-src", true),
        rule("[data-video]", "data-video", false),
        rule("[data-file]", "data-file", false),
    ]
});

/// Reads media references straight out of the markup.
#[derive(Debug, Clone)]
pub struct DirectHtmlStrategy {
    min_url_length: usize,
}

impl DirectHtmlStrategy {
    /// Creates the strategy.
    #[must_use]
    pub fn new(min_url_length: usize) -> Self {
        Self { min_url_length }
    }
}

impl LinkStrategy for DirectHtmlStrategy {
    fn provenance(&self) -> Provenance {
        Provenance::DirectHtml
    }

    fn extract(&self, content: &str, base: &Url) -> Vec<LinkCandidate> {
        let document = Html::parse_document(content);
        let mut sink = CandidateSink::new(base, self.min_url_length, self.provenance());

        for rule in RULES.iter() {
            for element in document.select(&rule.selector) {
                let Some(value) = element.value().attr(rule.attribute) else {
                    continue;
                };
                if rule.needs_extension && media_extension(value).is_none() {
                    continue;
                }
                sink.offer(value);
            }
        }
        sink.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::LinkKind;

    fn extract(html: &str) -> Vec<LinkCandidate> {
        let base = Url::parse("https://site.example.com/watch/ep-1").unwrap();
        DirectHtmlStrategy::new(10).extract(html, &base)
    }

    #[test]
    fn test_source_tag() {
        let found = extract(r#"<video><source src="https://cdn.example.com/video.mp4"></video>"#);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].url, "https://cdn.example.com/video.mp4");
        assert_eq!(found[0].kind, LinkKind::DirectVideo);
        assert_eq!(found[0].provenance, Provenance::DirectHtml);
    }

    #[test]
    fn test_video_src_and_relative_resolution() {
        let found = extract(r#"<video src="/stream/live.m3u8"></video>"#);
        let urls: Vec<&str> = found.iter().map(|c| c.url.as_str()).collect();
        assert!(urls.contains(&"https://site.example.com/stream/live.m3u8"));
    }

    #[test]
    fn test_data_attributes() {
        let found = extract(
            r#"<div data-video="https://cdn.example.com/v/episode.m3u8"></div>
               <a data-file="//files.example.com/media/ep.mkv"></a>
               <img data-src="https://cdn.example.com/lazy/clip.webm">"#,
        );
        let urls: Vec<&str> = found.iter().map(|c| c.url.as_str()).collect();
        assert!(urls.contains(&"https://cdn.example.com/v/episode.m3u8"));
        assert!(urls.contains(&"https://files.example.com/media/ep.mkv"));
        assert!(urls.contains(&"https://cdn.example.com/lazy/clip.webm"));
    }

    #[test]
    fn test_ignores_non_media_sources() {
        let found = extract(
            r#"<img src="https://cdn.example.com/poster.jpg">
               <script src="https://cdn.example.com/player.js"></script>
               <source src="https://cdn.example.com/thumb.png">"#,
        );
        assert!(found.is_empty(), "{found:?}");
    }

    #[test]
    fn test_malformed_markup_does_not_panic() {
        let found = extract(r#"<video src="https://cdn.example.com/a.mp4"<<source src=>"#);
        assert!(found.len() <= 2);
    }
}
