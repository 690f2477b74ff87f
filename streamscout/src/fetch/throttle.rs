//! Per-host request spacing.

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::time::Duration;
use tokio::time::Instant;

/// Enforces a minimum interval between requests to the same host.
#[cfg_attr(test, mockall::automock)]
pub trait DomainThrottle: Send + Sync {
    /// How long a caller should wait before contacting `host` right now.
    fn should_wait(&self, host: &str) -> Duration;

    /// Records a request to `host` at the current instant.
    fn record(&self, host: &str);

    /// Claims the next free slot for `host` and returns how long to wait
    /// for it.
    ///
    /// The read and update happen under one lock, so two concurrent callers
    /// never both see the same stale timestamp.
    fn reserve(&self, host: &str) -> Duration {
        let wait = self.should_wait(host);
        self.record(host);
        wait
    }
}

/// Throttle backed by a concurrent host → last-request map.
///
/// Entries are created on first contact and never removed.
#[derive(Debug)]
pub struct PerHostThrottle {
    min_interval: Duration,
    last_request: DashMap<String, Instant>,
}

impl PerHostThrottle {
    /// Creates a throttle with the given per-host interval.
    #[must_use]
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_request: DashMap::new(),
        }
    }

    /// Number of hosts seen so far.
    #[must_use]
    pub fn tracked_hosts(&self) -> usize {
        self.last_request.len()
    }
}

impl DomainThrottle for PerHostThrottle {
    fn should_wait(&self, host: &str) -> Duration {
        self.last_request.get(host).map_or(Duration::ZERO, |last| {
            (*last + self.min_interval).saturating_duration_since(Instant::now())
        })
    }

    fn record(&self, host: &str) {
        self.last_request.insert(host.to_string(), Instant::now());
    }

    fn reserve(&self, host: &str) -> Duration {
        let now = Instant::now();
        match self.last_request.entry(host.to_string()) {
            Entry::Occupied(mut last) => {
                // Later of "now" and one interval after the previous claim.
                let slot = (*last.get() + self.min_interval).max(now);
                last.insert(slot);
                slot - now
            }
            Entry::Vacant(vacant) => {
                vacant.insert(now);
                Duration::ZERO
            }
        }
    }
}

/// Throttle that never waits.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpThrottle;

impl DomainThrottle for NoOpThrottle {
    fn should_wait(&self, _host: &str) -> Duration {
        Duration::ZERO
    }

    fn record(&self, _host: &str) {}

    fn reserve(&self, _host: &str) -> Duration {
        Duration::ZERO
    }
}
