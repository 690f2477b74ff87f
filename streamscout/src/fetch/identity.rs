//! Browser-like request identities.

use rand::seq::SliceRandom;
use std::collections::BTreeMap;

use crate::config::FetchConfig;

/// The user agent and headers sent with one attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestIdentity {
    /// `User-Agent` value.
    pub user_agent: String,
    /// Remaining headers, sorted by name.
    pub headers: BTreeMap<String, String>,
}

impl RequestIdentity {
    /// All headers including `User-Agent`.
    #[must_use]
    pub fn header_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::with_capacity(self.headers.len() + 1);
        pairs.push(("User-Agent".to_string(), self.user_agent.clone()));
        pairs.extend(self.headers.iter().map(|(k, v)| (k.clone(), v.clone())));
        pairs
    }
}

/// Picks a random user agent per attempt.
///
/// Holds no per-request state: the caller passes the previous agent so a
/// retry never reuses it while the pool has alternatives.
#[derive(Debug, Clone)]
pub struct IdentityPool {
    user_agents: Vec<String>,
    headers: BTreeMap<String, String>,
}

impl IdentityPool {
    /// Creates a pool. An empty agent list falls back to a single generic
    /// agent.
    #[must_use]
    pub fn new(user_agents: Vec<String>, headers: BTreeMap<String, String>) -> Self {
        let user_agents = if user_agents.is_empty() {
            vec![concat!("streamscout/", env!("CARGO_PKG_VERSION")).to_string()]
        } else {
            user_agents
        };
        Self {
            user_agents,
            headers,
        }
    }

    /// Creates a pool from fetch settings.
    #[must_use]
    pub fn from_config(config: &FetchConfig) -> Self {
        Self::new(config.user_agents.clone(), config.headers.clone())
    }

    /// Number of distinct agents.
    #[must_use]
    pub fn len(&self) -> usize {
        self.user_agents.len()
    }

    /// Whether the pool is empty; never true after construction.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.user_agents.is_empty()
    }

    /// Picks an identity, avoiding `previous` when possible.
    #[must_use]
    pub fn pick(&self, previous: Option<&str>) -> RequestIdentity {
        let choices: Vec<&String> = self
            .user_agents
            .iter()
            .filter(|ua| self.user_agents.len() == 1 || Some(ua.as_str()) != previous)
            .collect();
        let mut rng = rand::thread_rng();
        let user_agent = choices
            .choose(&mut rng)
            .map_or_else(|| self.user_agents[0].clone(), |ua| (*ua).clone());
        RequestIdentity {
            user_agent,
            headers: self.headers.clone(),
        }
    }
}
