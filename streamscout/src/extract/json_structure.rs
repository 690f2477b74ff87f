//! Embedded JSON structures.
//!
//! Fragments are cut out with patterns, cleaned of comments, parsed into a
//! [`serde_json::Value`] and walked recursively. Anything that fails to
//! parse is skipped.

use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;
use url::Url;

use super::{CandidateSink, LinkStrategy};
use crate::core::{LinkCandidate, Provenance};

const MEDIA_KEYS: &str = "url|src|file|source|video|hls|dash";

#[allow(clippy::expect_used)]
static FRAGMENT_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        format!(r#"(?i)\{{[^{{}}]*"(?:{MEDIA_KEYS})"[^{{}}]*\}}"#),
        format!(r#"(?i)\[[^\[\]]*"(?:{MEDIA_KEYS})"[^\[\]]*\]"#),
        r"(?:var|let|const)\s+[\w$]+\s*=\s*(\{[^;]+\})\s*;".to_string(),
    ]
    .iter()
    .map(|pattern| Regex::new(pattern).expect("json fragment pattern is valid"))
    .collect()
});

#[allow(clippy::expect_used)]
static BLOCK_COMMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)/\*.*?\*/").expect("block comment pattern is valid"));

// A `//` only starts a comment after whitespace or punctuation, never
// inside `https://`.
#[allow(clippy::expect_used)]
static LINE_COMMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)(^|[\s,{\[])//[^\n]*").expect("line comment pattern is valid")
});

#[allow(clippy::expect_used)]
static LINE_CONTINUATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\\\r?\n").expect("continuation pattern is valid"));

/// Strips comments and layout noise, then parses.
///
/// Returns `None` for anything that is not valid JSON afterwards.
#[must_use]
pub fn parse_json_fragment(fragment: &str) -> Option<Value> {
    let cleaned = LINE_CONTINUATION.replace_all(fragment, "");
    let cleaned = BLOCK_COMMENT.replace_all(&cleaned, "");
    let cleaned = LINE_COMMENT.replace_all(&cleaned, "$1");
    let cleaned: String = cleaned
        .chars()
        .map(|c| if matches!(c, '\r' | '\n' | '\t') { ' ' } else { c })
        .collect();
    serde_json::from_str(cleaned.trim()).ok()
}

/// Visits every string leaf up to `max_depth` levels of nesting.
pub fn walk_json<F>(value: &Value, max_depth: usize, visit: &mut F)
where
    F: FnMut(&str),
{
    fn walk<F: FnMut(&str)>(value: &Value, depth: usize, max_depth: usize, visit: &mut F) {
        if depth > max_depth {
            return;
        }
        match value {
            Value::String(s) => visit(s),
            Value::Array(items) => {
                for item in items {
                    walk(item, depth + 1, max_depth, visit);
                }
            }
            Value::Object(map) => {
                for item in map.values() {
                    walk(item, depth + 1, max_depth, visit);
                }
            }
            Value::Null | Value::Bool(_) | Value::Number(_) => {}
        }
    }
    walk(value, 0, max_depth, visit);
}

/// Finds media URLs in JSON embedded anywhere in the page.
#[derive(Debug, Clone)]
pub struct JsonStructureStrategy {
    min_url_length: usize,
    max_depth: usize,
}

impl JsonStructureStrategy {
    /// Creates the strategy.
    #[must_use]
    pub fn new(min_url_length: usize, max_depth: usize) -> Self {
        Self {
            min_url_length,
            max_depth,
        }
    }
}

impl LinkStrategy for JsonStructureStrategy {
    fn provenance(&self) -> Provenance {
        Provenance::Json
    }

    fn extract(&self, content: &str, base: &Url) -> Vec<LinkCandidate> {
        let mut sink = CandidateSink::new(base, self.min_url_length, self.provenance());
        for pattern in FRAGMENT_PATTERNS.iter() {
            for caps in pattern.captures_iter(content) {
                let Some(fragment) = caps.get(1).or_else(|| caps.get(0)) else {
                    continue;
                };
                if let Some(value) = parse_json_fragment(fragment.as_str()) {
                    walk_json(&value, self.max_depth, &mut |leaf| sink.offer(leaf));
                }
            }
        }
        sink.finish()
    }
}
