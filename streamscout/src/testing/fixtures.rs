//! HTML fixtures shaped like real streaming pages.

/// Page URL used by the bundled fixtures.
pub const FIXTURE_PAGE_URL: &str = "https://phim.example.com/xem-phim/tap-1.html";

/// Iframe URL referenced by [`page_with_player_iframe`].
pub const FIXTURE_IFRAME_URL: &str = "https://player.example.net/embed/abc123";

/// Second-hop iframe URL referenced by [`iframe_with_nested_iframe`].
pub const FIXTURE_NESTED_IFRAME_URL: &str = "https://deep.example.org/player/xyz";

/// Pads a body past the minimum content length.
fn padded(body: &str) -> String {
    format!(
        "<!DOCTYPE html><html><head><title>Xem phim</title></head><body>{body}\
         <p>Phim hay cập nhật liên tục mỗi ngày, xem miễn phí chất lượng cao.</p></body></html>"
    )
}

/// A page exercising every strategy except iframes.
#[must_use]
pub fn full_featured_page() -> String {
    padded(
        r#"
<meta property="og:video" content="https://cdn.example.com/og/trailer_480p.mp4">
<link rel="video_src" href="https://cdn.example.com/link/trailer.m3u8">
<video controls src="https://cdn.example.com/direct/movie_720p.mp4">
  <source src="/media/movie_1080p.mp4" type="video/mp4">
</video>
<div class="player" data-video="https://cdn.example.com/data/episode.m3u8"></div>
<script>
  var player = jwplayer("vplayer").setup({
    "file": "https://cdn.example.com/jw/master_4k.m3u8",
    "image": "https://cdn.example.com/poster.jpg"
  });
  var sources = {"hls": "https://cdn.example.com/json/playlist.m3u8", "poster": "/img/a.png"};
  const backup = 'https://cdn.example.com/js/backup_360p.mp4';
</script>
"#,
    )
}

/// A page whose only stream lives in a player iframe.
#[must_use]
pub fn page_with_player_iframe() -> String {
    padded(&format!(
        r#"<iframe src="{FIXTURE_IFRAME_URL}" allowfullscreen></iframe>
<iframe src="https://www.facebook.com/plugins/like.php?href=x"></iframe>"#
    ))
}

/// Iframe content carrying a stream and a further iframe.
#[must_use]
pub fn iframe_with_nested_iframe() -> String {
    padded(&format!(
        r#"<video><source src="https://stream.example.net/hls/iframe_720p.m3u8"></video>
<iframe src="{FIXTURE_NESTED_IFRAME_URL}"></iframe>"#
    ))
}

/// Second-hop iframe content; must never be fetched.
#[must_use]
pub fn nested_iframe_page() -> String {
    padded(r#"<video src="https://deep.example.org/should-not-appear.mp4"></video>"#)
}

/// A page carrying injection attempts next to one real stream.
#[must_use]
pub fn hostile_page() -> String {
    padded(
        r#"
<video src="javascript:alert(1)"></video>
<source src="https://cdn.example.com/safe/video.mp4">
<a data-file="data:video/mp4;base64,AAAA"></a>
<script>var file = "http://127.0.0.1/internal/video.mp4";</script>
"#,
    )
}

/// A page with no media references at all.
#[must_use]
pub fn plain_article_page() -> String {
    padded(r#"<article><h1>Tin tức</h1><a href="/about">Giới thiệu</a></article>"#)
}
