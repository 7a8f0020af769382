//! Dossier Source Adapter Layer
//!
//! Pluggable source adapters behind one capability trait.
//!
//! # Architecture
//!
//! Each adapter wraps one external data source's search and detail-fetch
//! behavior. Adapters stream hits through a channel (the lazy, finite,
//! non-restartable sequence the orchestrator consumes), classify every
//! failure into a [`SourceErrorKind`], and honor a caller-supplied
//! deadline: when it expires mid-sequence they stop producing and settle
//! as `Transient`, keeping whatever was already emitted.
//!
//! # Adapters
//!
//! - `MockAdapter`: deterministic scripted adapter for testing
//! - `CodeHostAdapter`: code-hosting platform JSON API
//! - `ProfessionalNetworkAdapter`: profile discovery via search footprints
//! - `WebSearchAdapter`: general web search for portfolios and resumes
//!
//! # Examples
//!
//! ```
//! use dossier_sources::MockAdapter;
//! use dossier_domain::SourceId;
//!
//! let adapter = MockAdapter::new(SourceId::CodeHost);
//! assert_eq!(adapter.call_count(), 0);
//! ```

#![warn(missing_docs)]

pub mod code_host;
pub mod professional_network;
pub mod scrape;
pub mod web_search;

use dossier_domain::{RawHit, SourceErrorKind, SourceId, TargetQuery};
use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::sync::Mutex;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::time::Instant;

pub use code_host::CodeHostAdapter;
pub use professional_network::ProfessionalNetworkAdapter;
pub use web_search::WebSearchAdapter;

/// Boxed future used to keep the adapter trait object-safe.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Channel end through which adapters stream hits as they are produced.
pub type HitSender = mpsc::Sender<RawHit>;

/// Errors that can occur while querying a source
#[derive(Error, Debug, Clone)]
pub enum SourceError {
    /// The source throttled the request
    #[error("Rate limited: {0}")]
    RateLimited(String),

    /// CAPTCHA or anti-bot interstitial detected
    #[error("Blocked by anti-bot protection: {0}")]
    Blocked(String),

    /// The source answered and had nothing for this target
    #[error("No results: {0}")]
    NotFound(String),

    /// Network failure, timeout, or deadline expiry
    #[error("Transient failure: {0}")]
    Transient(String),

    /// Malformed or unparseable response
    #[error("Malformed response: {0}")]
    Fatal(String),
}

impl SourceError {
    /// Classify into the closed error-kind set recorded on investigations.
    pub fn kind(&self) -> SourceErrorKind {
        match self {
            SourceError::RateLimited(_) => SourceErrorKind::RateLimited,
            SourceError::Blocked(_) => SourceErrorKind::Blocked,
            SourceError::NotFound(_) => SourceErrorKind::NotFound,
            SourceError::Transient(_) => SourceErrorKind::Transient,
            SourceError::Fatal(_) => SourceErrorKind::Fatal,
        }
    }

    /// Classify an HTTP status code. CAPTCHA detection is separate because
    /// it requires looking at the body.
    pub fn from_status(status: u16, context: &str) -> Self {
        match status {
            403 | 429 => SourceError::RateLimited(format!("HTTP {} from {}", status, context)),
            404 => SourceError::NotFound(format!("HTTP 404 from {}", context)),
            500..=599 => SourceError::Transient(format!("HTTP {} from {}", status, context)),
            _ => SourceError::Fatal(format!("HTTP {} from {}", status, context)),
        }
    }
}

impl From<reqwest::Error> for SourceError {
    fn from(e: reqwest::Error) -> Self {
        // All transport-level failures (connect, timeout, TLS) are retryable
        SourceError::Transient(e.to_string())
    }
}

/// Check a deadline between production steps.
///
/// Adapters call this before each network round-trip so a sequence cut off
/// mid-way settles as `Transient` with its partial hits already streamed.
pub fn check_deadline(deadline: Instant, context: &str) -> Result<(), SourceError> {
    if Instant::now() >= deadline {
        Err(SourceError::Transient(format!(
            "deadline elapsed during {}",
            context
        )))
    } else {
        Ok(())
    }
}

/// Uniform capability contract for one external data source.
///
/// `search` produces a finite sequence of hits through `out`; hits already
/// sent when an error occurs are kept by the caller. `fetch_detail` returns
/// an enriched replacement for a previously-emitted hit.
pub trait SourceAdapter: Send + Sync {
    /// Which source this adapter wraps.
    fn source(&self) -> SourceId;

    /// Search for the target, streaming hits through `out`.
    ///
    /// Returns the number of hits emitted, or the classified failure.
    fn search<'a>(
        &'a self,
        query: &'a TargetQuery,
        deadline: Instant,
        out: HitSender,
    ) -> BoxFuture<'a, Result<usize, SourceError>>;

    /// Fetch an enriched version of a previously-emitted hit.
    fn fetch_detail<'a>(
        &'a self,
        hit: &'a RawHit,
        deadline: Instant,
    ) -> BoxFuture<'a, Result<RawHit, SourceError>>;
}

/// One scripted response for the mock adapter
enum MockCall {
    Hits(Vec<RawHit>),
    Failure(SourceError),
}

/// Deterministic mock adapter for testing
///
/// Returns scripted hits or failures without any network access, with an
/// optional artificial delay to exercise deadlines and concurrency.
///
/// # Examples
///
/// ```
/// use dossier_sources::MockAdapter;
/// use dossier_domain::{RawHit, SourceId};
///
/// let adapter = MockAdapter::new(SourceId::CodeHost);
/// adapter.enqueue_hits(vec![RawHit::new(
///     SourceId::CodeHost,
///     "https://example.com/u/jdoe",
///     "Jane Doe",
///     1_000,
///     0.8,
/// )]);
/// ```
pub struct MockAdapter {
    source: SourceId,
    script: Mutex<VecDeque<MockCall>>,
    detail_fields: Mutex<Vec<(String, String)>>,
    delay: Duration,
    call_count: Mutex<usize>,
}

impl MockAdapter {
    /// Create a mock for the given source with an empty script.
    ///
    /// An unscripted `search` call reports `NotFound`.
    pub fn new(source: SourceId) -> Self {
        Self {
            source,
            script: Mutex::new(VecDeque::new()),
            detail_fields: Mutex::new(Vec::new()),
            delay: Duration::ZERO,
            call_count: Mutex::new(0),
        }
    }

    /// Add an artificial delay before every response.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Script the next search call to stream these hits and succeed.
    pub fn enqueue_hits(&self, hits: Vec<RawHit>) {
        self.script
            .lock()
            .unwrap()
            .push_back(MockCall::Hits(hits));
    }

    /// Script the next search call to fail.
    pub fn enqueue_failure(&self, error: SourceError) {
        self.script
            .lock()
            .unwrap()
            .push_back(MockCall::Failure(error));
    }

    /// Fields appended to every hit returned by `fetch_detail`.
    pub fn set_detail_field(&self, key: impl Into<String>, value: impl Into<String>) {
        self.detail_fields
            .lock()
            .unwrap()
            .push((key.into(), value.into()));
    }

    /// Number of search calls made so far.
    pub fn call_count(&self) -> usize {
        *self.call_count.lock().unwrap()
    }
}

impl SourceAdapter for MockAdapter {
    fn source(&self) -> SourceId {
        self.source
    }

    fn search<'a>(
        &'a self,
        _query: &'a TargetQuery,
        _deadline: Instant,
        out: HitSender,
    ) -> BoxFuture<'a, Result<usize, SourceError>> {
        Box::pin(async move {
            *self.call_count.lock().unwrap() += 1;

            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }

            let call = self.script.lock().unwrap().pop_front();
            match call {
                Some(MockCall::Hits(hits)) => {
                    let mut emitted = 0;
                    for hit in hits {
                        if out.send(hit).await.is_err() {
                            break;
                        }
                        emitted += 1;
                    }
                    Ok(emitted)
                }
                Some(MockCall::Failure(error)) => Err(error),
                None => Err(SourceError::NotFound("no scripted results".to_string())),
            }
        })
    }

    fn fetch_detail<'a>(
        &'a self,
        hit: &'a RawHit,
        _deadline: Instant,
    ) -> BoxFuture<'a, Result<RawHit, SourceError>> {
        Box::pin(async move {
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }

            let mut enriched = hit.clone();
            for (key, value) in self.detail_fields.lock().unwrap().iter() {
                enriched.fields.insert(key.clone(), value.clone());
            }
            Ok(enriched)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hit(url: &str) -> RawHit {
        RawHit::new(SourceId::CodeHost, url, "Jane Doe", 1, 0.8)
    }

    #[tokio::test]
    async fn test_mock_streams_scripted_hits() {
        let adapter = MockAdapter::new(SourceId::CodeHost);
        adapter.enqueue_hits(vec![hit("https://a"), hit("https://b")]);

        let (tx, mut rx) = mpsc::channel(8);
        let query = TargetQuery::new("Jane Doe");
        let deadline = Instant::now() + Duration::from_secs(1);

        let emitted = adapter.search(&query, deadline, tx).await.unwrap();
        assert_eq!(emitted, 2);
        assert_eq!(rx.recv().await.unwrap().url, "https://a");
        assert_eq!(rx.recv().await.unwrap().url, "https://b");
        assert_eq!(adapter.call_count(), 1);
    }

    #[tokio::test]
    async fn test_mock_scripted_failure() {
        let adapter = MockAdapter::new(SourceId::WebSearch);
        adapter.enqueue_failure(SourceError::Blocked("captcha".to_string()));

        let (tx, _rx) = mpsc::channel(8);
        let query = TargetQuery::new("Jane Doe");
        let deadline = Instant::now() + Duration::from_secs(1);

        let result = adapter.search(&query, deadline, tx).await;
        assert!(matches!(result, Err(SourceError::Blocked(_))));
    }

    #[tokio::test]
    async fn test_mock_unscripted_reports_not_found() {
        let adapter = MockAdapter::new(SourceId::ProfessionalNetwork);
        let (tx, _rx) = mpsc::channel(8);
        let query = TargetQuery::new("Jane Doe");
        let deadline = Instant::now() + Duration::from_secs(1);

        let result = adapter.search(&query, deadline, tx).await;
        assert!(matches!(result, Err(SourceError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_mock_detail_enrichment() {
        let adapter = MockAdapter::new(SourceId::CodeHost);
        adapter.set_detail_field("organization", "Acme");

        let deadline = Instant::now() + Duration::from_secs(1);
        let enriched = adapter.fetch_detail(&hit("https://a"), deadline).await.unwrap();
        assert_eq!(enriched.fields.get("organization").unwrap(), "Acme");
    }

    #[test]
    fn test_error_kind_classification() {
        assert_eq!(
            SourceError::RateLimited("x".into()).kind(),
            SourceErrorKind::RateLimited
        );
        assert_eq!(
            SourceError::Blocked("x".into()).kind(),
            SourceErrorKind::Blocked
        );
        assert_eq!(
            SourceError::Fatal("x".into()).kind(),
            SourceErrorKind::Fatal
        );
    }

    #[test]
    fn test_status_classification() {
        assert!(matches!(
            SourceError::from_status(429, "api"),
            SourceError::RateLimited(_)
        ));
        assert!(matches!(
            SourceError::from_status(404, "api"),
            SourceError::NotFound(_)
        ));
        assert!(matches!(
            SourceError::from_status(503, "api"),
            SourceError::Transient(_)
        ));
        assert!(matches!(
            SourceError::from_status(418, "api"),
            SourceError::Fatal(_)
        ));
    }
}
