//! End-to-end properties of the extraction engine over scripted transports.

use pretty_assertions::assert_eq;
use std::sync::Arc;
use std::time::{Duration, Instant};

use streamscout::prelude::*;
use streamscout::testing::{
    assert_all_safe, assert_contains_url, assert_lacks_url, assert_ranked, assert_status,
    full_featured_page, hostile_page, iframe_with_nested_iframe, nested_iframe_page,
    page_with_player_iframe, plain_article_page, PendingTransport, ScriptedTransport,
    FIXTURE_IFRAME_URL, FIXTURE_NESTED_IFRAME_URL, FIXTURE_PAGE_URL,
};

fn fast_config() -> ScoutConfig {
    ScoutConfig::default().with_fetch(
        FetchConfig::default()
            .with_min_request_interval(0.0)
            .with_retry(
                RetryConfig::default()
                    .with_base_delay(0.01)
                    .with_rate_limit_backoff(0.01, 0.02),
            ),
    )
}

fn engine_over(transport: Arc<dyn HttpTransport>) -> ExtractionEngine {
    ExtractionEngine::new(transport, fast_config())
        .unwrap()
        .with_throttle(Arc::new(NoOpThrottle))
}

#[tokio::test]
async fn non_web_urls_return_empty_without_fetching() {
    let transport = Arc::new(ScriptedTransport::new());
    let engine = engine_over(transport.clone());

    for url in [
        "ftp://files.example.com/movie.mp4",
        "file:///etc/passwd",
        "javascript:alert(1)",
        "data:text/html,<video>",
        "mailto:someone@example.com",
        "//cdn.example.com/no-scheme.mp4",
    ] {
        let result = engine.extract(url).await;
        assert_status(&result, ExtractionStatus::InvalidUrl);
        assert!(result.is_empty(), "{url}");
    }
    assert_eq!(transport.call_count(), 0);
}

#[tokio::test]
async fn source_tag_becomes_direct_video_candidate() {
    let page = format!(
        "<html><body><video><source src=\"https://cdn.example.com/video.mp4\"></video>{}</body></html>",
        "<p>filler text to satisfy the minimum content length.</p>".repeat(3)
    );
    let transport = Arc::new(ScriptedTransport::new().with_page(FIXTURE_PAGE_URL, &page));
    let result = engine_over(transport).extract(FIXTURE_PAGE_URL).await;

    assert!(result.status.is_completed());
    let link = result.best().expect("one link");
    assert_eq!(link.url, "https://cdn.example.com/video.mp4");
    assert_eq!(link.kind, LinkKind::DirectVideo);
    assert_eq!(link.provenance, Provenance::DirectHtml);
}

#[tokio::test]
async fn url_found_by_several_strategies_appears_once() {
    let url = "https://cdn.example.com/shared/episode_720p.m3u8";
    let page = format!(
        r#"<html><head><meta property="og:video" content="{url}"></head><body>
<video src="{url}"></video>
<script>var config = {{"file": "{url}"}}; const again = '{url}';</script>
<p>filler text to satisfy the minimum content length of the fetcher.</p>
</body></html>"#
    );
    let transport = Arc::new(ScriptedTransport::new().with_page(FIXTURE_PAGE_URL, &page));
    let result = engine_over(transport).extract(FIXTURE_PAGE_URL).await;

    assert_eq!(result.urls().filter(|u| *u == url).count(), 1);
    assert_eq!(result.len(), 1);
    assert_eq!(result.links[0].provenance, Provenance::DirectHtml);
}

#[test]
fn ranking_orders_by_quality_with_unknown_last() {
    let candidates = vec![
        LinkCandidate::new("https://cdn.example.com/a/movie_480p.mp4", Provenance::DirectHtml),
        LinkCandidate::new("https://cdn.example.com/b/movie.mp4", Provenance::Javascript),
        LinkCandidate::new("https://cdn.example.com/c/movie_4k.mp4", Provenance::Json),
    ];
    let result = validate_and_rank(candidates, &ExtractionConfig::default());

    let qualities: Vec<Quality> = result.links.iter().map(|l| l.quality).collect();
    assert_eq!(qualities, vec![Quality::Uhd4k, Quality::P480, Quality::Unknown]);
    assert_ranked(&result);
}

#[test]
fn quality_markers_are_detected() {
    let hd = LinkCandidate::new("https://cdn.example.com/v/ep01.1080p.mp4", Provenance::Json);
    let plain = LinkCandidate::new("https://cdn.example.com/v/ep01.mp4", Provenance::Json);
    assert_eq!(hd.quality, Quality::P1080);
    assert_eq!(plain.quality, Quality::Unknown);
}

#[test]
fn extraction_over_identical_content_is_idempotent() {
    let engine = engine_over(Arc::new(ScriptedTransport::new()));
    let page = full_featured_page();
    let runs: Vec<RankedResult> = (0..3)
        .map(|_| engine.extract_from_content(&page, FIXTURE_PAGE_URL))
        .collect();
    assert_eq!(runs[0], runs[1]);
    assert_eq!(runs[1], runs[2]);
}

#[test]
fn full_page_yields_every_strategy_and_ranks() {
    let engine = engine_over(Arc::new(ScriptedTransport::new()));
    let result = engine.extract_from_content(&full_featured_page(), FIXTURE_PAGE_URL);

    assert_ranked(&result);
    assert_all_safe(&result);
    assert_contains_url(&result, "https://cdn.example.com/jw/master_4k.m3u8");
    assert_contains_url(&result, "https://phim.example.com/media/movie_1080p.mp4");
    assert_contains_url(&result, "https://cdn.example.com/og/trailer_480p.mp4");
    assert_lacks_url(&result, "https://cdn.example.com/poster.jpg");
    assert_eq!(result.links[0].quality, Quality::Uhd4k);
}

#[test]
fn hostile_content_never_leaks_unsafe_links() {
    let engine = engine_over(Arc::new(ScriptedTransport::new()));
    let result = engine.extract_from_content(&hostile_page(), FIXTURE_PAGE_URL);

    assert_all_safe(&result);
    assert!(result.urls().all(|u| !u.contains("javascript:alert(1)")));
    assert_lacks_url(&result, "http://127.0.0.1/internal/video.mp4");
    assert_contains_url(&result, "https://cdn.example.com/safe/video.mp4");
}

#[test]
fn page_without_media_completes_empty() {
    let engine = engine_over(Arc::new(ScriptedTransport::new()));
    let result = engine.extract_from_content(&plain_article_page(), FIXTURE_PAGE_URL);
    assert_status(&result, ExtractionStatus::Completed);
    assert!(result.is_empty());
}

#[tokio::test]
async fn only_the_first_iframe_hop_is_followed() {
    let transport = Arc::new(
        ScriptedTransport::new()
            .with_page(FIXTURE_PAGE_URL, &page_with_player_iframe())
            .with_page(FIXTURE_IFRAME_URL, &iframe_with_nested_iframe())
            .with_page(FIXTURE_NESTED_IFRAME_URL, &nested_iframe_page()),
    );
    let result = engine_over(transport.clone()).extract(FIXTURE_PAGE_URL).await;

    assert_contains_url(&result, "https://stream.example.net/hls/iframe_720p.m3u8");
    assert_lacks_url(&result, "https://deep.example.org/should-not-appear.mp4");
    assert_eq!(result.links[0].provenance, Provenance::Iframe);
    assert_eq!(transport.calls_to(FIXTURE_IFRAME_URL), 1);
    assert_eq!(transport.calls_to(FIXTURE_NESTED_IFRAME_URL), 0);
}

#[tokio::test]
async fn disabled_iframes_are_not_fetched() {
    let transport = Arc::new(
        ScriptedTransport::new()
            .with_page(FIXTURE_PAGE_URL, &page_with_player_iframe())
            .with_page(FIXTURE_IFRAME_URL, &iframe_with_nested_iframe()),
    );
    let config = fast_config().with_extraction(ExtractionConfig::default().without_iframes());
    let engine = ExtractionEngine::new(transport.clone(), config).unwrap();

    let result = engine.extract(FIXTURE_PAGE_URL).await;
    assert!(result.is_empty());
    assert_eq!(transport.calls_to(FIXTURE_IFRAME_URL), 0);
}

#[tokio::test]
async fn never_resolving_fetch_hits_the_deadline() {
    let transport = Arc::new(PendingTransport::new());
    let config = ScoutConfig::default().with_deadline(1.0).with_fetch(
        FetchConfig::default()
            .with_request_timeout(0.5)
            .with_connect_timeout(0.25),
    );
    let engine = ExtractionEngine::new(transport.clone(), config).unwrap();

    let started = Instant::now();
    let result = engine.extract(FIXTURE_PAGE_URL).await;
    let elapsed = started.elapsed();

    assert_status(&result, ExtractionStatus::TimedOut);
    assert!(result.is_empty());
    assert!(elapsed >= Duration::from_secs(1), "{elapsed:?}");
    assert!(elapsed < Duration::from_millis(1500), "{elapsed:?}");
    assert_eq!(transport.call_count(), 1);
}

#[tokio::test]
async fn missing_page_reports_not_found() {
    let transport = Arc::new(ScriptedTransport::new());
    let result = engine_over(transport.clone()).extract(FIXTURE_PAGE_URL).await;
    assert_status(&result, ExtractionStatus::NoContent(FetchFailureKind::NotFound));
    assert_eq!(transport.call_count(), 1);
}
