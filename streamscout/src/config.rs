//! Configuration types for fetching and extraction.
//!
//! Every field has a serde default so partial JSON documents load cleanly,
//! and [`ScoutConfig::from_env`] overlays `STREAMSCOUT_*` variables on top of
//! the defaults.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

use crate::errors::{Result, ScoutError};

/// Prefix shared by all environment variables.
pub const ENV_PREFIX: &str = "STREAMSCOUT_";

/// Configuration for HTTP fetching.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Per-attempt request timeout in seconds.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: f64,
    /// Per-attempt connect timeout in seconds.
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_seconds: f64,
    /// Maximum number of redirects to follow.
    #[serde(default = "default_max_redirects")]
    pub max_redirects: usize,
    /// Maximum response size in bytes.
    #[serde(default = "default_max_size")]
    pub max_response_size: usize,
    /// Bodies shorter than this (after trimming) are rejected.
    #[serde(default = "default_min_content_length")]
    pub min_content_length: usize,
    /// Minimum spacing between requests to the same host, in seconds.
    #[serde(default = "default_min_request_interval")]
    pub min_request_interval_seconds: f64,
    /// Maximum number of in-flight fetches.
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent: usize,
    /// User agents rotated across attempts.
    #[serde(default = "default_user_agents")]
    pub user_agents: Vec<String>,
    /// Browser-like headers sent with every attempt.
    #[serde(default = "default_headers")]
    pub headers: BTreeMap<String, String>,
    /// Retry configuration.
    #[serde(default)]
    pub retry: RetryConfig,
}

fn default_request_timeout() -> f64 {
    30.0
}

fn default_connect_timeout() -> f64 {
    10.0
}

fn default_max_redirects() -> usize {
    5
}

fn default_max_size() -> usize {
    10 * 1024 * 1024 // 10MB
}

fn default_min_content_length() -> usize {
    100
}

fn default_min_request_interval() -> f64 {
    1.0
}

fn default_max_concurrent() -> usize {
    5
}

fn default_user_agents() -> Vec<String> {
    vec![
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36".to_string(),
        "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36".to_string(),
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:125.0) Gecko/20100101 Firefox/125.0".to_string(),
        "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.4 Safari/605.1.15".to_string(),
        "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36".to_string(),
    ]
}

fn default_headers() -> BTreeMap<String, String> {
    [
        ("Accept", "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8"),
        ("Accept-Language", "vi-VN,vi;q=0.9,en-US;q=0.8,en;q=0.7"),
        ("Cache-Control", "max-age=0"),
        ("DNT", "1"),
        ("Sec-Fetch-Dest", "document"),
        ("Sec-Fetch-Mode", "navigate"),
        ("Sec-Fetch-Site", "none"),
        ("Upgrade-Insecure-Requests", "1"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            request_timeout_seconds: default_request_timeout(),
            connect_timeout_seconds: default_connect_timeout(),
            max_redirects: default_max_redirects(),
            max_response_size: default_max_size(),
            min_content_length: default_min_content_length(),
            min_request_interval_seconds: default_min_request_interval(),
            max_concurrent: default_max_concurrent(),
            user_agents: default_user_agents(),
            headers: default_headers(),
            retry: RetryConfig::default(),
        }
    }
}

impl FetchConfig {
    /// Creates a new fetch configuration with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the request timeout.
    #[must_use]
    pub fn with_request_timeout(mut self, seconds: f64) -> Self {
        self.request_timeout_seconds = seconds;
        self
    }

    /// Sets the connect timeout.
    #[must_use]
    pub fn with_connect_timeout(mut self, seconds: f64) -> Self {
        self.connect_timeout_seconds = seconds;
        self
    }

    /// Sets the per-host request interval.
    #[must_use]
    pub fn with_min_request_interval(mut self, seconds: f64) -> Self {
        self.min_request_interval_seconds = seconds;
        self
    }

    /// Replaces the user agent pool.
    #[must_use]
    pub fn with_user_agents<I, S>(mut self, agents: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.user_agents = agents.into_iter().map(Into::into).collect();
        self
    }

    /// Adds a header.
    #[must_use]
    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    /// Sets the retry configuration.
    #[must_use]
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Sets the maximum number of in-flight fetches.
    #[must_use]
    pub fn with_max_concurrent(mut self, max: usize) -> Self {
        self.max_concurrent = max;
        self
    }

    /// Gets request timeout as Duration.
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs_f64(self.request_timeout_seconds)
    }

    /// Gets connect timeout as Duration.
    #[must_use]
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs_f64(self.connect_timeout_seconds)
    }

    /// Gets the per-host interval as Duration.
    #[must_use]
    pub fn min_request_interval(&self) -> Duration {
        Duration::from_secs_f64(self.min_request_interval_seconds)
    }
}

/// Retry configuration for failed requests.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of attempts, including the first.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: usize,
    /// Base delay between attempts in seconds.
    #[serde(default = "default_retry_delay")]
    pub base_delay_seconds: f64,
    /// Whether the delay grows exponentially.
    #[serde(default = "default_true")]
    pub exponential_backoff: bool,
    /// Backoff multiplier.
    #[serde(default = "default_backoff_multiplier")]
    pub backoff_multiplier: f64,
    /// Maximum delay between attempts.
    #[serde(default = "default_max_delay")]
    pub max_delay_seconds: f64,
    /// Lower bound of the extra randomized wait after HTTP 429.
    #[serde(default = "default_rate_limit_min")]
    pub rate_limit_backoff_min_seconds: f64,
    /// Upper bound of the extra randomized wait after HTTP 429.
    #[serde(default = "default_rate_limit_max")]
    pub rate_limit_backoff_max_seconds: f64,
}

fn default_max_attempts() -> usize {
    3
}

fn default_retry_delay() -> f64 {
    2.0
}

fn default_true() -> bool {
    true
}

fn default_backoff_multiplier() -> f64 {
    2.0
}

fn default_max_delay() -> f64 {
    30.0
}

fn default_rate_limit_min() -> f64 {
    2.0
}

fn default_rate_limit_max() -> f64 {
    5.0
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            base_delay_seconds: default_retry_delay(),
            exponential_backoff: true,
            backoff_multiplier: default_backoff_multiplier(),
            max_delay_seconds: default_max_delay(),
            rate_limit_backoff_min_seconds: default_rate_limit_min(),
            rate_limit_backoff_max_seconds: default_rate_limit_max(),
        }
    }
}

impl RetryConfig {
    /// Creates a new retry config.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the maximum attempts.
    #[must_use]
    pub fn with_max_attempts(mut self, attempts: usize) -> Self {
        self.max_attempts = attempts;
        self
    }

    /// Sets the base delay.
    #[must_use]
    pub fn with_base_delay(mut self, seconds: f64) -> Self {
        self.base_delay_seconds = seconds;
        self
    }

    /// Sets the randomized 429 backoff window.
    #[must_use]
    pub fn with_rate_limit_backoff(mut self, min_seconds: f64, max_seconds: f64) -> Self {
        self.rate_limit_backoff_min_seconds = min_seconds;
        self.rate_limit_backoff_max_seconds = max_seconds;
        self
    }

    /// Disables exponential growth of the delay.
    #[must_use]
    pub fn without_exponential_backoff(mut self) -> Self {
        self.exponential_backoff = false;
        self
    }

    /// Calculates the delay after the given (0-indexed) failed attempt.
    #[must_use]
    pub fn delay_for_attempt(&self, attempt: usize) -> Duration {
        let delay = if self.exponential_backoff {
            let exponent = i32::try_from(attempt).unwrap_or(i32::MAX);
            self.base_delay_seconds * self.backoff_multiplier.powi(exponent)
        } else {
            self.base_delay_seconds
        };
        let capped = delay.min(self.max_delay_seconds).max(0.0);
        Duration::from_secs_f64(capped)
    }
}

/// Configuration for the extraction strategies and ranking.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionConfig {
    /// Maximum number of links returned.
    #[serde(default = "default_max_candidates")]
    pub max_candidates: usize,
    /// Shortest string considered a media reference.
    #[serde(default = "default_min_url_length")]
    pub min_url_length: usize,
    /// Longest URL accepted by the validator.
    #[serde(default = "default_max_url_length")]
    pub max_url_length: usize,
    /// Maximum number of iframes followed per page.
    #[serde(default = "default_max_iframes")]
    pub max_iframes: usize,
    /// Nesting cap for the JSON walker.
    #[serde(default = "default_max_json_depth")]
    pub max_json_depth: usize,
    /// Run the direct-HTML strategy.
    #[serde(default = "default_true")]
    pub enable_direct_html: bool,
    /// Run the script scanning strategy.
    #[serde(default = "default_true")]
    pub enable_javascript: bool,
    /// Run the player configuration strategy.
    #[serde(default = "default_true")]
    pub enable_player_config: bool,
    /// Run the embedded JSON strategy.
    #[serde(default = "default_true")]
    pub enable_json: bool,
    /// Run the meta/link tag strategy.
    #[serde(default = "default_true")]
    pub enable_meta_tags: bool,
    /// Follow player iframes.
    #[serde(default = "default_true")]
    pub enable_iframes: bool,
}

fn default_max_candidates() -> usize {
    10
}

fn default_min_url_length() -> usize {
    10
}

fn default_max_url_length() -> usize {
    2000
}

fn default_max_iframes() -> usize {
    5
}

fn default_max_json_depth() -> usize {
    32
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            max_candidates: default_max_candidates(),
            min_url_length: default_min_url_length(),
            max_url_length: default_max_url_length(),
            max_iframes: default_max_iframes(),
            max_json_depth: default_max_json_depth(),
            enable_direct_html: true,
            enable_javascript: true,
            enable_player_config: true,
            enable_json: true,
            enable_meta_tags: true,
            enable_iframes: true,
        }
    }
}

impl ExtractionConfig {
    /// Creates a new extraction configuration with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the maximum number of links returned.
    #[must_use]
    pub fn with_max_candidates(mut self, max: usize) -> Self {
        self.max_candidates = max;
        self
    }

    /// Disables iframe following.
    #[must_use]
    pub fn without_iframes(mut self) -> Self {
        self.enable_iframes = false;
        self
    }
}

/// Top-level configuration for the fetch-and-extract pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoutConfig {
    /// Overall deadline for one extraction, in seconds.
    #[serde(default = "default_deadline")]
    pub deadline_seconds: f64,
    /// Fetch configuration.
    #[serde(default)]
    pub fetch: FetchConfig,
    /// Extraction configuration.
    #[serde(default)]
    pub extraction: ExtractionConfig,
    /// Domains the caller agrees to extract from.
    ///
    /// Gating on this list is caller policy; the engine never consults it.
    #[serde(default)]
    pub supported_domains: Vec<String>,
}

fn default_deadline() -> f64 {
    45.0
}

impl Default for ScoutConfig {
    fn default() -> Self {
        Self {
            deadline_seconds: default_deadline(),
            fetch: FetchConfig::default(),
            extraction: ExtractionConfig::default(),
            supported_domains: Vec::new(),
        }
    }
}

impl ScoutConfig {
    /// Creates a new configuration with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the overall deadline.
    #[must_use]
    pub fn with_deadline(mut self, seconds: f64) -> Self {
        self.deadline_seconds = seconds;
        self
    }

    /// Sets the fetch configuration.
    #[must_use]
    pub fn with_fetch(mut self, fetch: FetchConfig) -> Self {
        self.fetch = fetch;
        self
    }

    /// Sets the extraction configuration.
    #[must_use]
    pub fn with_extraction(mut self, extraction: ExtractionConfig) -> Self {
        self.extraction = extraction;
        self
    }

    /// Gets the deadline as Duration.
    #[must_use]
    pub fn deadline(&self) -> Duration {
        Duration::from_secs_f64(self.deadline_seconds)
    }

    /// Parses a JSON document and validates it.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads defaults overlaid with `STREAMSCOUT_*` environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads defaults overlaid with values from an arbitrary lookup.
    ///
    /// Keys are full variable names, e.g. `STREAMSCOUT_MAX_RETRIES`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(&format!("{ENV_PREFIX}{name}"));
        let mut config = Self::default();

        if let Some(v) = get("REQUEST_TIMEOUT") {
            config.fetch.request_timeout_seconds = parse_number("REQUEST_TIMEOUT", &v)?;
        }
        if let Some(v) = get("CONNECT_TIMEOUT") {
            config.fetch.connect_timeout_seconds = parse_number("CONNECT_TIMEOUT", &v)?;
        }
        if let Some(v) = get("MAX_RETRIES") {
            config.fetch.retry.max_attempts = parse_number("MAX_RETRIES", &v)?;
        }
        if let Some(v) = get("RETRY_DELAY") {
            config.fetch.retry.base_delay_seconds = parse_number("RETRY_DELAY", &v)?;
        }
        if let Some(v) = get("EXPONENTIAL_BACKOFF") {
            config.fetch.retry.exponential_backoff = parse_bool("EXPONENTIAL_BACKOFF", &v)?;
        }
        if let Some(v) = get("USER_AGENTS") {
            config.fetch.user_agents = split_list(&v, '|');
        }
        if let Some(v) = get("MIN_REQUEST_INTERVAL") {
            config.fetch.min_request_interval_seconds = parse_number("MIN_REQUEST_INTERVAL", &v)?;
        }
        if let Some(v) = get("MAX_CONCURRENT") {
            config.fetch.max_concurrent = parse_number("MAX_CONCURRENT", &v)?;
        }
        if let Some(v) = get("MAX_LINKS") {
            config.extraction.max_candidates = parse_number("MAX_LINKS", &v)?;
        }
        if let Some(v) = get("DEADLINE") {
            config.deadline_seconds = parse_number("DEADLINE", &v)?;
        }
        if let Some(v) = get("SUPPORTED_DOMAINS") {
            config.supported_domains = split_list(&v, ',');
        }

        config.validate()?;
        Ok(config)
    }

    /// Checks the configuration for values the pipeline cannot honour.
    pub fn validate(&self) -> Result<()> {
        let fetch = &self.fetch;
        if fetch.retry.max_attempts == 0 {
            return Err(ScoutError::config("retry.max_attempts must be at least 1"));
        }
        if fetch.user_agents.is_empty() {
            return Err(ScoutError::config("user_agents must not be empty"));
        }
        if fetch.max_concurrent == 0 {
            return Err(ScoutError::config("max_concurrent must be at least 1"));
        }
        let retry = &fetch.retry;
        let seconds = [
            ("deadline", self.deadline_seconds),
            ("request_timeout", fetch.request_timeout_seconds),
            ("connect_timeout", fetch.connect_timeout_seconds),
            ("min_request_interval", fetch.min_request_interval_seconds),
            ("retry.base_delay", retry.base_delay_seconds),
            ("retry.backoff_multiplier", retry.backoff_multiplier),
            ("retry.max_delay", retry.max_delay_seconds),
            ("retry.rate_limit_backoff_min", retry.rate_limit_backoff_min_seconds),
            ("retry.rate_limit_backoff_max", retry.rate_limit_backoff_max_seconds),
        ];
        // Every value here ends up in `Duration::from_secs_f64`, which panics
        // on NaN, infinity and negatives.
        for (name, value) in seconds {
            if !value.is_finite() || value < 0.0 {
                return Err(ScoutError::config(format!(
                    "{name} must be a finite, non-negative number, got {value}"
                )));
            }
        }
        if self.deadline_seconds <= 0.0 {
            return Err(ScoutError::config("deadline must be positive"));
        }
        if fetch.request_timeout_seconds <= 0.0 || fetch.connect_timeout_seconds <= 0.0 {
            return Err(ScoutError::config("timeouts must be positive"));
        }
        if fetch.connect_timeout_seconds > fetch.request_timeout_seconds {
            return Err(ScoutError::config(
                "connect timeout must not exceed the request timeout",
            ));
        }
        if fetch.request_timeout_seconds >= self.deadline_seconds {
            return Err(ScoutError::config(format!(
                "request timeout ({}s) must be shorter than the overall deadline ({}s)",
                fetch.request_timeout_seconds, self.deadline_seconds
            )));
        }
        if fetch.retry.rate_limit_backoff_min_seconds > fetch.retry.rate_limit_backoff_max_seconds {
            return Err(ScoutError::config("rate limit backoff window is inverted"));
        }
        if self.extraction.max_candidates == 0 {
            return Err(ScoutError::config("max_candidates must be at least 1"));
        }
        Ok(())
    }
}

fn parse_number<T: std::str::FromStr>(name: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| ScoutError::config(format!("{ENV_PREFIX}{name}: cannot parse '{value}'")))
}

fn parse_bool(name: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ScoutError::config(format!(
            "{ENV_PREFIX}{name}: expected a boolean, got '{value}'"
        ))),
    }
}

fn split_list(value: &str, separator: char) -> Vec<String> {
    value
        .split(separator)
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(String::from)
        .collect()
}
