//! `<meta>` and `<link>` tags that advertise a video.

use scraper::{Html, Selector};
use std::sync::LazyLock;
use url::Url;

use super::{CandidateSink, LinkStrategy};
use crate::core::{LinkCandidate, Provenance};

/// `property`/`name` values whose `content` is a video URL.
pub const VIDEO_META_KEYS: &[&str] = &[
    "og:video",
    "og:video:url",
    "og:video:secure_url",
    "twitter:player:stream",
];

#[allow(clippy::expect_used)]
static META: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("meta[content]").expect("meta selector is valid"));

#[allow(clippy::expect_used)]
static LINK_VIDEO_SRC: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(r#"link[rel="video_src"][href]"#).expect("link selector is valid")
});

#[allow(clippy::expect_used)]
static LINK_VIDEO_TYPE: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(r#"link[type^="video/"][href]"#).expect("link selector is valid")
});

/// Reads Open Graph, Twitter card and `<link>` video declarations.
#[derive(Debug, Clone)]
pub struct MetaTagStrategy {
    min_url_length: usize,
}

impl MetaTagStrategy {
    /// Creates the strategy.
    #[must_use]
    pub fn new(min_url_length: usize) -> Self {
        Self { min_url_length }
    }
}

impl LinkStrategy for MetaTagStrategy {
    fn provenance(&self) -> Provenance {
        Provenance::MetaTag
    }

    fn extract(&self, content: &str, base: &Url) -> Vec<LinkCandidate> {
        let document = Html::parse_document(content);
        let mut sink = CandidateSink::new(base, self.min_url_length, self.provenance());

        for meta in document.select(&META) {
            let element = meta.value();
            let key = element
                .attr("property")
                .or_else(|| element.attr("name"))
                .map(str::to_ascii_lowercase);
            let is_video = key
                .as_deref()
                .is_some_and(|key| VIDEO_META_KEYS.contains(&key));
            if let (true, Some(value)) = (is_video, element.attr("content")) {
                sink.offer(value);
            }
        }

        for selector in [&*LINK_VIDEO_SRC, &*LINK_VIDEO_TYPE] {
            for link in document.select(selector) {
                if let Some(href) = link.value().attr("href") {
                    sink.offer(href);
                }
            }
        }
        sink.finish()
    }
}
