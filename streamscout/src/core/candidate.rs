//! Link candidates and their classification enums.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use crate::validate::{detect_format, detect_kind, detect_quality};

/// The kind of media resource a link points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LinkKind {
    /// A progressive video file (`.mp4`, `.mkv`, ...).
    DirectVideo,
    /// An HLS playlist (`.m3u8`).
    HlsPlaylist,
    /// A DASH manifest (`.mpd`).
    DashManifest,
    /// An Adobe HDS manifest (`.f4m`, `.f4v`).
    FlashManifest,
    /// Anything that looked like a stream but carries no known suffix.
    GenericStream,
}

impl Default for LinkKind {
    fn default() -> Self {
        Self::GenericStream
    }
}

impl fmt::Display for LinkKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DirectVideo => write!(f, "direct-video"),
            Self::HlsPlaylist => write!(f, "hls-playlist"),
            Self::DashManifest => write!(f, "dash-manifest"),
            Self::FlashManifest => write!(f, "flash-manifest"),
            Self::GenericStream => write!(f, "generic-stream"),
        }
    }
}

/// Coarse resolution tier inferred from URL text.
///
/// Variants are declared lowest first so the derived `Ord` matches ranking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Quality {
    /// No quality marker matched.
    #[serde(rename = "unknown")]
    Unknown,
    /// 240p.
    #[serde(rename = "240p")]
    P240,
    /// 360p.
    #[serde(rename = "360p")]
    P360,
    /// 480p / SD.
    #[serde(rename = "480p")]
    P480,
    /// 720p / HD.
    #[serde(rename = "720p")]
    P720,
    /// 1080p / Full HD.
    #[serde(rename = "1080p")]
    P1080,
    /// 2160p / UHD.
    #[serde(rename = "4K")]
    Uhd4k,
}

impl Default for Quality {
    fn default() -> Self {
        Self::Unknown
    }
}

impl Quality {
    /// Short display label.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Uhd4k => "4K",
            Self::P1080 => "1080p",
            Self::P720 => "720p",
            Self::P480 => "480p",
            Self::P360 => "360p",
            Self::P240 => "240p",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Quality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Which extraction strategy produced a candidate.
///
/// Used for diagnostics only; ranking never looks at it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Provenance {
    /// `<video>`/`<source>` tags and media-bearing attributes.
    DirectHtml,
    /// String literals and assignments inside `<script>` blocks.
    Javascript,
    /// Known embeddable player setup calls.
    PlayerConfig,
    /// Embedded JSON structures.
    Json,
    /// `<meta>` and `<link>` tags.
    MetaTag,
    /// Content of a followed iframe.
    Iframe,
}

impl Provenance {
    /// All strategies, in the fixed order the engine runs them.
    pub const ALL: [Self; 6] = [
        Self::DirectHtml,
        Self::Javascript,
        Self::PlayerConfig,
        Self::Json,
        Self::MetaTag,
        Self::Iframe,
    ];
}

impl fmt::Display for Provenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DirectHtml => write!(f, "direct-html"),
            Self::Javascript => write!(f, "javascript"),
            Self::PlayerConfig => write!(f, "player-config"),
            Self::Json => write!(f, "json"),
            Self::MetaTag => write!(f, "meta-tag"),
            Self::Iframe => write!(f, "iframe"),
        }
    }
}

/// A single discovered reference to a possible video resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkCandidate {
    /// Absolute URL; identity key for deduplication.
    pub url: String,
    /// Detected media kind.
    pub kind: LinkKind,
    /// Detected quality tier.
    pub quality: Quality,
    /// Strategy that produced the candidate.
    pub provenance: Provenance,
    /// Container/format label such as `MP4` or `HLS`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
}

impl LinkCandidate {
    /// Creates a candidate and classifies it from its URL text.
    #[must_use]
    pub fn new(url: impl Into<String>, provenance: Provenance) -> Self {
        let mut candidate = Self {
            url: url.into(),
            kind: LinkKind::default(),
            quality: Quality::default(),
            provenance,
            format: None,
        };
        candidate.annotate();
        candidate
    }

    /// Recomputes kind, quality and format from the URL.
    pub fn annotate(&mut self) {
        self.kind = detect_kind(&self.url);
        self.quality = detect_quality(&self.url);
        self.format = detect_format(&self.url).map(String::from);
    }

    /// Returns a copy tagged with a different provenance.
    #[must_use]
    pub fn with_provenance(mut self, provenance: Provenance) -> Self {
        self.provenance = provenance;
        self
    }

    /// Converts to dictionary.
    #[must_use]
    pub fn to_dict(&self) -> HashMap<String, serde_json::Value> {
        let mut dict = HashMap::new();
        dict.insert("url".to_string(), serde_json::json!(self.url));
        dict.insert("kind".to_string(), serde_json::json!(self.kind.to_string()));
        dict.insert("quality".to_string(), serde_json::json!(self.quality.label()));
        dict.insert("provenance".to_string(), serde_json::json!(self.provenance.to_string()));
        if let Some(ref format) = self.format {
            dict.insert("format".to_string(), serde_json::json!(format));
        }
        dict
    }
}
