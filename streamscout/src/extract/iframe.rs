//! Following player iframes one hop deep.

use futures::future::join_all;
use scraper::{Html, Selector};
use std::collections::HashSet;
use std::sync::LazyLock;
use tracing::{debug, warn};
use url::Url;

use super::patterns::{is_likely_player_iframe, resolve_url};
use super::{frame_strategies, run_guarded};
use crate::config::ExtractionConfig;
use crate::core::{FetchOutcome, LinkCandidate, Provenance};
use crate::fetch::ContentFetcher;

/// Iframes found at this depth or deeper are not followed.
pub const MAX_IFRAME_DEPTH: usize = 1;

#[allow(clippy::expect_used)]
static IFRAME: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("iframe").expect("iframe selector is valid"));

/// Player iframe URLs in document order, deduplicated and capped.
///
/// Lazy-loading `data-src` is read when `src` is absent.
#[must_use]
pub fn discover_iframes(content: &str, base: &Url, max_iframes: usize) -> Vec<String> {
    let document = Html::parse_document(content);
    let mut seen = HashSet::new();
    document
        .select(&IFRAME)
        .filter_map(|frame| {
            let element = frame.value();
            element.attr("src").or_else(|| element.attr("data-src"))
        })
        .filter(|src| is_likely_player_iframe(src))
        .filter_map(|src| resolve_url(base, src))
        .filter(|url| url.starts_with("http://") || url.starts_with("https://"))
        .filter(|url| seen.insert(url.clone()))
        .take(max_iframes)
        .collect()
}

/// Fetches player iframes and runs the frame strategies on their content.
#[derive(Debug, Clone)]
pub struct IframeResolver {
    fetcher: ContentFetcher,
    config: ExtractionConfig,
}

impl IframeResolver {
    /// Creates a resolver sharing the page fetcher.
    #[must_use]
    pub fn new(fetcher: ContentFetcher, config: ExtractionConfig) -> Self {
        Self { fetcher, config }
    }

    /// Resolves iframes found in `content`, which sits at `depth` (the page
    /// itself is depth 0).
    ///
    /// Frames are fetched concurrently; candidates come back in document
    /// order, every one tagged [`Provenance::Iframe`].
    pub async fn resolve(&self, content: &str, base: &Url, depth: usize) -> Vec<LinkCandidate> {
        if depth >= MAX_IFRAME_DEPTH {
            return Vec::new();
        }
        let frames = discover_iframes(content, base, self.config.max_iframes);
        if frames.is_empty() {
            return Vec::new();
        }
        debug!(url = %base, frames = frames.len(), depth, "following iframes");

        let outcomes = join_all(frames.iter().map(|frame| self.fetcher.fetch(frame))).await;

        let strategies = frame_strategies(&self.config);
        let mut found = Vec::new();
        for (frame, outcome) in frames.iter().zip(outcomes) {
            let content = match outcome {
                FetchOutcome::Success(content) => content,
                FetchOutcome::Failure(failure) => {
                    warn!(iframe = %frame, kind = %failure.kind, "iframe fetch failed");
                    continue;
                }
            };
            let Ok(frame_base) = Url::parse(frame) else {
                continue;
            };
            for strategy in &strategies {
                found.extend(
                    run_guarded(strategy.as_ref(), &content.text, &frame_base)
                        .into_iter()
                        .map(|c| c.with_provenance(Provenance::Iframe)),
                );
            }
        }
        found
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{FetchConfig, RetryConfig};
    use crate::fetch::NoOpThrottle;
    use crate::testing::{
        iframe_with_nested_iframe, page_with_player_iframe, ScriptedTransport, FIXTURE_IFRAME_URL,
        FIXTURE_NESTED_IFRAME_URL, FIXTURE_PAGE_URL,
    };
    use std::sync::Arc;

    fn resolver(transport: Arc<ScriptedTransport>) -> IframeResolver {
        let config = FetchConfig::default().with_retry(RetryConfig::default().with_base_delay(0.01));
        let fetcher = ContentFetcher::new(transport, config).with_throttle(Arc::new(NoOpThrottle));
        IframeResolver::new(fetcher, ExtractionConfig::default())
    }

    #[test]
    fn test_discover_filters_and_caps() {
        let base = Url::parse("https://site.example.com/watch/1").unwrap();
        let html = r#"
            <iframe src="/embed/1"></iframe>
            <iframe src="/embed/1"></iframe>
            <iframe src="https://www.facebook.com/plugins/video.php"></iframe>
            <iframe data-src="https://player.example.net/e/2"></iframe>
            <iframe src="https://example.com/sidebar"></iframe>
            <iframe src="javascript:void(0)"></iframe>
            <iframe src="/embed/3"></iframe>"#;
        assert_eq!(
            discover_iframes(html, &base, 5),
            vec![
                "https://site.example.com/embed/1",
                "https://player.example.net/e/2",
                "https://site.example.com/embed/3",
            ]
        );
        assert_eq!(discover_iframes(html, &base, 1).len(), 1);
    }

    #[tokio::test]
    async fn test_resolve_follows_one_hop_only() {
        let transport = Arc::new(
            ScriptedTransport::new()
                .with_page(FIXTURE_IFRAME_URL, &iframe_with_nested_iframe())
                .with_page(FIXTURE_NESTED_IFRAME_URL, "<video src=\"https://x.example.com/n.mp4\">"),
        );
        let base = Url::parse(FIXTURE_PAGE_URL).unwrap();
        let found = resolver(transport.clone())
            .resolve(&page_with_player_iframe(), &base, 0)
            .await;

        assert!(found.iter().all(|c| c.provenance == Provenance::Iframe));
        assert!(found
            .iter()
            .any(|c| c.url == "https://stream.example.net/hls/iframe_720p.m3u8"));
        assert_eq!(transport.calls_to(FIXTURE_IFRAME_URL), 1);
        assert_eq!(transport.calls_to(FIXTURE_NESTED_IFRAME_URL), 0);
    }

    #[tokio::test]
    async fn test_resolve_at_max_depth_fetches_nothing() {
        let transport = Arc::new(ScriptedTransport::new());
        let base = Url::parse(FIXTURE_PAGE_URL).unwrap();
        let found = resolver(transport.clone())
            .resolve(&page_with_player_iframe(), &base, MAX_IFRAME_DEPTH)
            .await;
        assert!(found.is_empty());
        assert_eq!(transport.call_count(), 0);
    }

    #[tokio::test]
    async fn test_failed_iframe_is_skipped() {
        let transport = Arc::new(ScriptedTransport::new());
        let base = Url::parse(FIXTURE_PAGE_URL).unwrap();
        let found = resolver(transport.clone())
            .resolve(&page_with_player_iframe(), &base, 0)
            .await;
        assert!(found.is_empty());
        assert_eq!(transport.calls_to(FIXTURE_IFRAME_URL), 1);
    }
}
