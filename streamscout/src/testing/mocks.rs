//! Mock transports for testing.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::time::Duration;

use crate::errors::TransportError;
use crate::fetch::{HttpRequest, HttpTransport, RawResponse};

/// Builds a 200 `text/html` response.
#[must_use]
pub fn html_response(url: &str, body: &str) -> RawResponse {
    RawResponse {
        status: 200,
        content_type: Some("text/html; charset=utf-8".to_string()),
        content_length: Some(body.len() as u64),
        final_url: url.to_string(),
        body: body.as_bytes().to_vec(),
    }
}

/// Builds an empty response with the given status.
#[must_use]
pub fn status_response(url: &str, status: u16) -> RawResponse {
    RawResponse {
        status,
        content_type: Some("text/html".to_string()),
        content_length: None,
        final_url: url.to_string(),
        body: Vec::new(),
    }
}

type Scripted = Result<RawResponse, TransportError>;

/// A transport that replays scripted responses per URL and records every
/// request it receives.
///
/// Each URL has a queue; when the queue holds one item it is repeated
/// forever. URLs with no script get a 404.
#[derive(Debug, Default)]
pub struct ScriptedTransport {
    scripts: Mutex<HashMap<String, VecDeque<Scripted>>>,
    requests: Mutex<Vec<HttpRequest>>,
    delay: Option<Duration>,
}

impl ScriptedTransport {
    /// Creates an empty transport.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a delay before every response.
    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Serves `body` as HTML at `url`.
    #[must_use]
    pub fn with_page(self, url: &str, body: &str) -> Self {
        self.push(url, Ok(html_response(url, body)));
        self
    }

    /// Queues a response for `url`.
    #[must_use]
    pub fn with_response(self, url: &str, response: RawResponse) -> Self {
        self.push(url, Ok(response));
        self
    }

    /// Queues a transport error for `url`.
    #[must_use]
    pub fn with_error(self, url: &str, error: TransportError) -> Self {
        self.push(url, Err(error));
        self
    }

    /// Queues an item for `url`.
    pub fn push(&self, url: &str, item: Result<RawResponse, TransportError>) {
        self.scripts
            .lock()
            .entry(url.to_string())
            .or_default()
            .push_back(item);
    }

    /// Every request received, in order.
    #[must_use]
    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().clone()
    }

    /// Total number of requests.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.requests.lock().len()
    }

    /// Number of requests for one URL.
    #[must_use]
    pub fn calls_to(&self, url: &str) -> usize {
        self.requests.lock().iter().filter(|r| r.url == url).count()
    }

    /// User agents sent, in order.
    #[must_use]
    pub fn user_agents(&self) -> Vec<String> {
        self.requests
            .lock()
            .iter()
            .filter_map(|r| r.user_agent().map(String::from))
            .collect()
    }

    fn next_for(&self, url: &str) -> Scripted {
        let mut scripts = self.scripts.lock();
        match scripts.get_mut(url) {
            Some(queue) if queue.len() > 1 => queue
                .pop_front()
                .unwrap_or_else(|| Ok(status_response(url, 404))),
            Some(queue) => queue
                .front()
                .cloned()
                .unwrap_or_else(|| Ok(status_response(url, 404))),
            None => Ok(status_response(url, 404)),
        }
    }
}

#[async_trait]
impl HttpTransport for ScriptedTransport {
    async fn send(&self, request: &HttpRequest) -> Result<RawResponse, TransportError> {
        self.requests.lock().push(request.clone());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.next_for(&request.url)
    }
}

/// A transport whose requests never complete.
#[derive(Debug, Default)]
pub struct PendingTransport {
    calls: Mutex<usize>,
}

impl PendingTransport {
    /// Creates a new pending transport.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of requests started.
    #[must_use]
    pub fn call_count(&self) -> usize {
        *self.calls.lock()
    }
}

#[async_trait]
impl HttpTransport for PendingTransport {
    async fn send(&self, _request: &HttpRequest) -> Result<RawResponse, TransportError> {
        *self.calls.lock() += 1;
        futures::future::pending().await
    }
}
