//! Caller-side policy for page URLs.
//!
//! [`ExtractionEngine::extract`](crate::engine::ExtractionEngine::extract)
//! only enforces the scheme. Front ends that accept URLs from users run them
//! through [`sanitize_page_url`] and [`is_supported_domain`] first.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use url::Url;

use crate::errors::{Result, ScoutError};
use crate::validate::{is_private_host, is_web_scheme};

/// Query parameters removed from page URLs.
pub const DANGEROUS_QUERY_PARAMS: &[&str] = &[
    "callback",
    "jsonp",
    "eval",
    "exec",
    "script",
    "onload",
    "onerror",
    "onclick",
    "javascript",
];

/// Length bounds for user-supplied page URLs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageUrlLimits {
    /// Shortest accepted URL.
    pub min_length: usize,
    /// Longest accepted URL.
    pub max_length: usize,
}

impl Default for PageUrlLimits {
    fn default() -> Self {
        Self {
            min_length: 20,
            max_length: 2000,
        }
    }
}

/// Validates a user-supplied page URL and strips dangerous query parameters.
///
/// Returns the cleaned URL, or [`ScoutError::InvalidUrl`] naming the failed
/// check.
pub fn sanitize_page_url(raw: &str, limits: PageUrlLimits) -> Result<String> {
    let trimmed = raw.trim();
    let length = trimmed.chars().count();
    if length < limits.min_length || length > limits.max_length {
        warn!(length, "page URL length out of bounds");
        return Err(ScoutError::invalid_url(format!(
            "length {length} outside {}..={}",
            limits.min_length, limits.max_length
        )));
    }

    let mut url = Url::parse(trimmed)?;
    if !is_web_scheme(&url) {
        warn!(scheme = url.scheme(), "page URL scheme rejected");
        return Err(ScoutError::invalid_url(format!(
            "scheme '{}' not allowed",
            url.scheme()
        )));
    }
    match url.host() {
        None => return Err(ScoutError::invalid_url("missing host")),
        Some(host) if is_private_host(&host) => {
            warn!(host = %host, "page URL points at a private host");
            return Err(ScoutError::invalid_url(format!("private host '{host}'")));
        }
        Some(_) => {}
    }

    strip_dangerous_params(&mut url);
    debug!(url = %url, "page URL sanitized");
    Ok(url.into())
}

fn strip_dangerous_params(url: &mut Url) {
    if url.query().is_none() {
        return;
    }
    let kept: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(key, _)| {
            let key = key.to_ascii_lowercase();
            !DANGEROUS_QUERY_PARAMS.contains(&key.as_str())
        })
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    if kept.is_empty() {
        url.set_query(None);
    } else {
        url.query_pairs_mut().clear().extend_pairs(kept);
    }
}

/// Whether the URL's host is an allowlisted domain or a subdomain of one.
///
/// A leading `www.` is ignored on both sides. An empty allowlist rejects
/// everything.
#[must_use]
pub fn is_supported_domain<S: AsRef<str>>(url: &str, allowlist: &[S]) -> bool {
    let Some(host) = Url::parse(url.trim())
        .ok()
        .and_then(|u| u.host_str().map(str::to_ascii_lowercase))
    else {
        return false;
    };
    let host = host.strip_prefix("www.").unwrap_or(&host);

    let supported = allowlist.iter().any(|entry| {
        let entry = entry.as_ref().trim().to_ascii_lowercase();
        let entry = entry.strip_prefix("www.").unwrap_or(&entry);
        !entry.is_empty()
            && (host == entry
                || host
                    .strip_suffix(entry)
                    .is_some_and(|prefix| prefix.ends_with('.')))
    });
    if !supported {
        debug!(host, "domain not in supported list");
    }
    supported
}
