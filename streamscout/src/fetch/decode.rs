//! Content-type inspection and charset decoding.

use encoding_rs::{Encoding, UTF_8};

/// Whether a `Content-Type` value denotes text the extractors can read.
///
/// A missing header is treated as text; servers that omit it are usually
/// serving HTML.
#[must_use]
pub fn is_text_content_type(content_type: Option<&str>) -> bool {
    let Some(ct) = content_type else {
        return true;
    };
    let mime = ct.split(';').next().unwrap_or("").trim().to_ascii_lowercase();
    mime.is_empty()
        || mime.starts_with("text/")
        || mime == "application/xhtml+xml"
        || mime == "application/xml"
        || mime == "application/json"
        || mime == "application/javascript"
        || mime == "application/x-javascript"
        || mime.ends_with("+xml")
        || mime.ends_with("+json")
}

/// Extracts the `charset` parameter from a `Content-Type` value.
#[must_use]
pub fn charset_from_content_type(content_type: &str) -> Option<&str> {
    content_type.split(';').skip(1).find_map(|param| {
        let (key, value) = param.split_once('=')?;
        key.trim()
            .eq_ignore_ascii_case("charset")
            .then(|| value.trim().trim_matches(['"', '\'']))
    })
}

/// Decodes a body using the declared charset.
///
/// A BOM overrides the header; unknown labels fall back to UTF-8 with
/// replacement characters.
#[must_use]
pub fn decode_body(bytes: &[u8], content_type: Option<&str>) -> String {
    let encoding = content_type
        .and_then(charset_from_content_type)
        .and_then(|label| Encoding::for_label(label.as_bytes()))
        .unwrap_or(UTF_8);
    let (text, used, had_errors) = encoding.decode(bytes);
    if had_errors {
        tracing::debug!(encoding = used.name(), "body contained malformed sequences");
    }
    text.into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_content_types() {
        assert!(is_text_content_type(Some("text/html; charset=utf-8")));
        assert!(is_text_content_type(Some("application/xhtml+xml")));
        assert!(is_text_content_type(Some("application/json")));
        assert!(is_text_content_type(None));
        assert!(!is_text_content_type(Some("video/mp4")));
        assert!(!is_text_content_type(Some("image/png")));
        assert!(!is_text_content_type(Some("application/octet-stream")));
    }

    #[test]
    fn test_charset_parsing() {
        assert_eq!(charset_from_content_type("text/html; charset=UTF-8"), Some("UTF-8"));
        assert_eq!(
            charset_from_content_type(r#"text/html; Charset="windows-1258""#),
            Some("windows-1258")
        );
        assert_eq!(charset_from_content_type("text/html"), None);
    }

    #[test]
    fn test_decode_legacy_charset() {
        // "é" in windows-1252.
        let text = decode_body(b"caf\xe9", Some("text/html; charset=windows-1252"));
        assert_eq!(text, "café");
    }

    #[test]
    fn test_decode_unknown_label_falls_back_to_utf8() {
        let text = decode_body("phim hay".as_bytes(), Some("text/html; charset=bogus"));
        assert_eq!(text, "phim hay");

        let lossy = decode_body(b"ok\xff", None);
        assert_eq!(lossy, "ok\u{fffd}");
    }
}
