//! The extraction engine: fetch, run strategies, validate and rank.

use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tracing::{error, info, warn, Instrument};
use url::Url;

use crate::config::ScoutConfig;
use crate::core::{ExtractionStatus, FetchOutcome, LinkCandidate, Provenance, RankedResult};
use crate::errors::Result;
use crate::extract::{page_strategies, run_guarded, IframeResolver, LinkStrategy};
use crate::fetch::{ContentFetcher, DomainThrottle, HttpTransport};
use crate::observability::{ExtractionObserver, ExtractionSpanAttributes, NoOpObserver, SpanTimer};
use crate::validate::{is_web_scheme, LinkValidator};

/// Orchestrates one page extraction end to end.
///
/// Cheap to clone; clones share the fetcher's throttle and concurrency
/// limiter.
#[derive(Clone)]
pub struct ExtractionEngine {
    config: ScoutConfig,
    fetcher: ContentFetcher,
    iframes: IframeResolver,
    strategies: Arc<Vec<Box<dyn LinkStrategy>>>,
    validator: LinkValidator,
    observer: Arc<dyn ExtractionObserver>,
}

impl std::fmt::Debug for ExtractionEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExtractionEngine")
            .field("config", &self.config)
            .field("strategies", &self.strategies.len())
            .finish_non_exhaustive()
    }
}

impl ExtractionEngine {
    /// Creates an engine over the given transport.
    pub fn new(transport: Arc<dyn HttpTransport>, config: ScoutConfig) -> Result<Self> {
        config.validate()?;
        let fetcher = ContentFetcher::new(transport, config.fetch.clone());
        Ok(Self::assemble(fetcher, config))
    }

    /// Creates an engine backed by reqwest.
    #[cfg(feature = "http")]
    pub fn with_reqwest(config: ScoutConfig) -> Result<Self> {
        config.validate()?;
        let fetcher = ContentFetcher::with_reqwest(config.fetch.clone())?;
        Ok(Self::assemble(fetcher, config))
    }

    fn assemble(fetcher: ContentFetcher, config: ScoutConfig) -> Self {
        Self {
            iframes: IframeResolver::new(fetcher.clone(), config.extraction.clone()),
            strategies: Arc::new(page_strategies(&config.extraction)),
            validator: LinkValidator::from_config(&config.extraction),
            observer: Arc::new(NoOpObserver),
            fetcher,
            config,
        }
    }

    /// Replaces the per-host throttle used for page and iframe fetches.
    #[must_use]
    pub fn with_throttle(self, throttle: Arc<dyn DomainThrottle>) -> Self {
        let fetcher = self.fetcher.clone().with_throttle(throttle);
        let observer = self.observer.clone();
        Self::assemble(fetcher, self.config).with_observer(observer)
    }

    /// Sets the observer.
    #[must_use]
    pub fn with_observer(mut self, observer: Arc<dyn ExtractionObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Gets the configuration.
    #[must_use]
    pub fn config(&self) -> &ScoutConfig {
        &self.config
    }

    /// Fetches a URL with the engine's retry and throttle policy.
    pub async fn fetch_content(&self, url: &str) -> FetchOutcome {
        self.fetcher.fetch(url).await
    }

    /// Extracts ranked stream links from a page.
    ///
    /// Never fails: problems are reported through [`RankedResult::status`]
    /// with an empty link list.
    pub async fn extract(&self, page_url: &str) -> RankedResult {
        let request_id = uuid::Uuid::new_v4().to_string();
        let timer = SpanTimer::start("extract");
        let mut attributes =
            ExtractionSpanAttributes::new(page_url).with_request_id(request_id.clone());
        let span = tracing::info_span!("extract", page_url = %page_url, request_id = %request_id);

        self.observer.on_extract_start(page_url, &request_id);

        let result = async {
            let Some(base) = parse_page_url(page_url) else {
                warn!("rejected page URL");
                return RankedResult::empty(ExtractionStatus::InvalidUrl);
            };

            let deadline = self.config.deadline();
            let run = self.fetch_and_extract(page_url, &base, &request_id, &mut attributes);
            let guarded = AssertUnwindSafe(run).catch_unwind();
            match tokio::time::timeout(deadline, guarded).await {
                Ok(Ok(result)) => result,
                Ok(Err(_)) => {
                    error!("extraction panicked");
                    RankedResult::empty(ExtractionStatus::Internal)
                }
                Err(_) => {
                    warn!(deadline_ms = deadline.as_millis(), "extraction deadline exceeded");
                    RankedResult::empty(ExtractionStatus::TimedOut)
                }
            }
        }
        .instrument(span)
        .await;

        let duration_ms = timer.finish();
        attributes.finish(&result, duration_ms);
        info!(
            page_url = %page_url,
            status = %result.status,
            links = result.len(),
            duration_ms,
            "extraction finished"
        );
        tracing::debug!(attributes = ?attributes.to_otel_attributes(), "extraction span");
        self.observer
            .on_extract_complete(page_url, &request_id, duration_ms, &result);
        result
    }

    async fn fetch_and_extract(
        &self,
        page_url: &str,
        base: &Url,
        request_id: &str,
        attributes: &mut ExtractionSpanAttributes,
    ) -> RankedResult {
        let outcome = self.fetcher.fetch(page_url).await;
        self.observer.on_fetch_complete(page_url, request_id, &outcome);

        let content = match outcome {
            FetchOutcome::Success(content) => content,
            FetchOutcome::Failure(failure) => {
                warn!(url = %page_url, failure = %failure, "no content to extract");
                return RankedResult::empty(ExtractionStatus::NoContent(failure.kind));
            }
        };

        // Relative references resolve against where redirects landed.
        let final_base = parse_page_url(&content.final_url).unwrap_or_else(|| base.clone());
        let candidates = self
            .collect_candidates(&content.text, &final_base, page_url, request_id, attributes)
            .await;
        self.validator.validate_and_rank(candidates)
    }

    async fn collect_candidates(
        &self,
        content: &str,
        base: &Url,
        page_url: &str,
        request_id: &str,
        attributes: &mut ExtractionSpanAttributes,
    ) -> Vec<LinkCandidate> {
        let mut candidates = Vec::new();
        for strategy in self.strategies.iter() {
            let found = run_guarded(strategy.as_ref(), content, base);
            self.report(page_url, request_id, attributes, strategy.provenance(), found.len());
            candidates.extend(found);
        }

        if self.config.extraction.enable_iframes {
            let resolve = AssertUnwindSafe(self.iframes.resolve(content, base, 0)).catch_unwind();
            let found = resolve.await.unwrap_or_else(|_| {
                error!(strategy = %Provenance::Iframe, "strategy panicked, skipping");
                Vec::new()
            });
            self.report(page_url, request_id, attributes, Provenance::Iframe, found.len());
            candidates.extend(found);
        }
        candidates
    }

    fn report(
        &self,
        page_url: &str,
        request_id: &str,
        attributes: &mut ExtractionSpanAttributes,
        strategy: Provenance,
        found: usize,
    ) {
        attributes.record_strategy(strategy, found);
        self.observer
            .on_strategy_complete(page_url, request_id, strategy, found);
    }

    /// Runs every synchronous strategy plus validation over text that was
    /// already fetched. Iframes are not followed.
    #[must_use]
    pub fn extract_from_content(&self, content: &str, base_url: &str) -> RankedResult {
        let Some(base) = parse_page_url(base_url) else {
            return RankedResult::empty(ExtractionStatus::InvalidUrl);
        };
        let candidates = self
            .strategies
            .iter()
            .flat_map(|strategy| run_guarded(strategy.as_ref(), content, &base))
            .collect();
        self.validator.validate_and_rank(candidates)
    }
}

fn parse_page_url(page_url: &str) -> Option<Url> {
    let url = Url::parse(page_url.trim()).ok()?;
    (is_web_scheme(&url) && url.host().is_some()).then_some(url)
}
