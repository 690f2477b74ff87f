//! Security and format checks applied to every candidate URL.

use std::fmt;
use std::net::{Ipv4Addr, Ipv6Addr};
use url::{Host, Url};

/// Markers that indicate script injection or a non-network scheme hidden in
/// the URL text.
pub const INJECTION_MARKERS: &[&str] = &[
    "javascript:",
    "data:",
    "vbscript:",
    "file:",
    "<script",
    "eval(",
    "alert(",
    "onerror=",
];

/// Why a candidate URL was dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// The text is not a parsable absolute URL.
    Unparsable,
    /// Scheme other than http or https.
    Scheme,
    /// No host component.
    MissingHost,
    /// Loopback, private, link-local or unspecified host.
    PrivateHost,
    /// One of [`INJECTION_MARKERS`] appears in the text.
    InjectionMarker,
    /// More than one `http` occurrence, typical of open redirects.
    EmbeddedUrl,
    /// Shorter than the minimum length.
    TooShort,
    /// Longer than the maximum length.
    TooLong,
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Unparsable => "unparsable",
            Self::Scheme => "scheme",
            Self::MissingHost => "missing_host",
            Self::PrivateHost => "private_host",
            Self::InjectionMarker => "injection_marker",
            Self::EmbeddedUrl => "embedded_url",
            Self::TooShort => "too_short",
            Self::TooLong => "too_long",
        };
        f.write_str(label)
    }
}

/// Whether the scheme is one the pipeline will fetch or return.
#[must_use]
pub fn is_web_scheme(url: &Url) -> bool {
    matches!(url.scheme(), "http" | "https")
}

fn is_private_v4(ip: Ipv4Addr) -> bool {
    ip.is_private()
        || ip.is_loopback()
        || ip.is_link_local()
        || ip.is_unspecified()
        || ip.is_broadcast()
        || ip.octets()[0] == 0
}

fn is_private_v6(ip: Ipv6Addr) -> bool {
    if let Some(v4) = ip.to_ipv4_mapped() {
        return is_private_v4(v4);
    }
    let first = ip.segments()[0];
    ip.is_loopback()
        || ip.is_unspecified()
        || (first & 0xfe00) == 0xfc00 // unique local
        || (first & 0xffc0) == 0xfe80 // link-local
}

/// Whether the host points at the local machine or a private network.
#[must_use]
pub fn is_private_host(host: &Host<&str>) -> bool {
    match host {
        Host::Domain(domain) => {
            let domain = domain.trim_end_matches('.').to_ascii_lowercase();
            domain == "localhost" || domain.ends_with(".localhost")
        }
        Host::Ipv4(ip) => is_private_v4(*ip),
        Host::Ipv6(ip) => is_private_v6(*ip),
    }
}

/// Whether the text contains an injection marker, case-insensitively.
#[must_use]
pub fn has_injection_marker(text: &str) -> bool {
    let lower = text.to_ascii_lowercase();
    INJECTION_MARKERS.iter().any(|marker| lower.contains(marker))
}

/// Runs every check and returns the first failure.
pub fn check_candidate_url(text: &str, min_len: usize, max_len: usize) -> Result<Url, RejectReason> {
    if text.len() < min_len {
        return Err(RejectReason::TooShort);
    }
    if text.len() > max_len {
        return Err(RejectReason::TooLong);
    }
    if has_injection_marker(text) {
        return Err(RejectReason::InjectionMarker);
    }
    if text.to_ascii_lowercase().matches("http").count() > 1 {
        return Err(RejectReason::EmbeddedUrl);
    }
    let url = Url::parse(text).map_err(|_| RejectReason::Unparsable)?;
    if !is_web_scheme(&url) {
        return Err(RejectReason::Scheme);
    }
    let Some(host) = url.host() else {
        return Err(RejectReason::MissingHost);
    };
    if is_private_host(&host) {
        return Err(RejectReason::PrivateHost);
    }
    Ok(url)
}
