//! Resilient fetching of remote source images.
//!
//! The fetcher is a bounded retry loop over a swappable transport: each
//! attempt is raced against a per-attempt timeout, failures back off
//! exponentially, and exhausting the policy yields `None` rather than an
//! error. Transport failure is an expected, recoverable outcome here — the
//! caller maps it to an empty result, so users never need exception handling
//! for a slow or unreachable host.
//!
//! The [`HttpTransport`] trait is the seam: production code uses
//! [`ReqwestTransport`], tests script outcomes through a mock. Cancellation
//! is cooperative — when the timeout elapses the in-flight request future is
//! dropped, which aborts the underlying request.

use std::future::Future;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TransportError {
    #[error("failed to build HTTP client: {0}")]
    Client(String),
    #[error("request failed: {0}")]
    Request(String),
}

/// Retry/backoff/timeout policy for one fetch. Immutable per invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchPolicy {
    /// Additional attempts after the first; total attempts = `retries + 1`.
    pub retries: u32,
    /// Base backoff delay; doubled after every failed attempt.
    pub retry_delay: Duration,
    /// Upper bound on a single attempt, enforced by cancellation.
    pub timeout: Duration,
    /// Cache hint: prefer cached responses up to this many seconds old.
    /// `None` (or zero) attaches no hint.
    pub revalidate: Option<u32>,
}

impl Default for FetchPolicy {
    fn default() -> Self {
        Self {
            retries: 2,
            retry_delay: Duration::from_millis(300),
            timeout: Duration::from_secs(30),
            revalidate: None,
        }
    }
}

/// Raw response from a transport attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl TransportResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Network transport capability.
///
/// One attempt, no retries, no timeout — the retry loop in [`fetch_bytes`]
/// owns both. Implementations must tolerate being dropped mid-request; that
/// drop is the cancellation signal.
pub trait HttpTransport {
    fn request(
        &self,
        url: &str,
        revalidate: Option<u32>,
    ) -> impl Future<Output = Result<TransportResponse, TransportError>> + Send;
}

/// Production transport over `reqwest`.
///
/// By default a fresh client is built per request, so nothing outlives the
/// call. Callers wanting connection reuse hand in their own client via
/// [`ReqwestTransport::with_client`].
#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    client: Option<reqwest::Client>,
}

impl ReqwestTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use an externally-owned client (connection pooling, proxies, TLS
    /// configuration).
    pub fn with_client(client: reqwest::Client) -> Self {
        Self {
            client: Some(client),
        }
    }
}

/// `Cache-Control` request header value for a positive revalidate interval.
fn cache_hint(revalidate: Option<u32>) -> Option<String> {
    let seconds = revalidate.filter(|seconds| *seconds > 0)?;
    Some(format!("max-age={seconds}"))
}

impl HttpTransport for ReqwestTransport {
    async fn request(
        &self,
        url: &str,
        revalidate: Option<u32>,
    ) -> Result<TransportResponse, TransportError> {
        let fresh;
        let client = match &self.client {
            Some(shared) => shared,
            None => {
                fresh = reqwest::Client::builder()
                    .build()
                    .map_err(|e| TransportError::Client(e.to_string()))?;
                &fresh
            }
        };

        let mut request = client.get(url);
        if let Some(hint) = cache_hint(revalidate) {
            request = request.header(reqwest::header::CACHE_CONTROL, hint);
        }

        let response = request
            .send()
            .await
            .map_err(|e| TransportError::Request(e.to_string()))?;
        let status = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .map_err(|e| TransportError::Request(e.to_string()))?
            .to_vec();

        Ok(TransportResponse { status, body })
    }
}

/// Backoff before the attempt after `attempt` (0-indexed): `base * 2^attempt`.
fn backoff_delay(base: Duration, attempt: u32) -> Duration {
    match 1u32.checked_shl(attempt) {
        Some(factor) => base.saturating_mul(factor),
        None => Duration::MAX,
    }
}

/// Fetch a remote image, retrying per `policy`. Never raises.
///
/// Attempts run strictly sequentially: each is awaited to success, failure,
/// or timeout before the next begins. A non-2xx status, a transport error,
/// and a timed-out attempt are all the same kind of failure — logged, backed
/// off, retried. Exhaustion returns `None`.
pub async fn fetch_bytes(
    transport: &impl HttpTransport,
    url: &str,
    policy: &FetchPolicy,
) -> Option<Vec<u8>> {
    for attempt in 0..=policy.retries {
        let outcome =
            tokio::time::timeout(policy.timeout, transport.request(url, policy.revalidate)).await;

        let failure = match outcome {
            Ok(Ok(response)) if response.is_success() => {
                log::debug!(
                    "fetched {} bytes on attempt {}",
                    response.body.len(),
                    attempt + 1
                );
                return Some(response.body);
            }
            Ok(Ok(response)) => format!("HTTP {}", response.status),
            Ok(Err(error)) => error.to_string(),
            Err(_) => format!("timed out after {:?}", policy.timeout),
        };

        if attempt == policy.retries {
            log::warn!(
                "fetch attempt {} failed: {failure}; no attempts remaining",
                attempt + 1
            );
            return None;
        }

        let delay = backoff_delay(policy.retry_delay, attempt);
        log::warn!(
            "fetch attempt {} failed: {failure}; retrying in {:?} ({} attempt(s) remaining)",
            attempt + 1,
            delay,
            policy.retries - attempt
        );
        tokio::time::sleep(delay).await;
    }

    None
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use tokio::time::Instant;

    /// Scripted outcome for one mock attempt.
    #[derive(Debug, Clone)]
    pub enum MockOutcome {
        Respond(u16, Vec<u8>),
        Error(String),
        /// Never completes within any reasonable timeout.
        Hang,
    }

    /// Transport that replays a script and records every attempt.
    #[derive(Default)]
    pub struct MockTransport {
        pub script: Mutex<VecDeque<MockOutcome>>,
        pub attempts: Mutex<Vec<Instant>>,
        pub revalidate_seen: Mutex<Vec<Option<u32>>>,
    }

    impl MockTransport {
        pub fn with_script(outcomes: impl IntoIterator<Item = MockOutcome>) -> Self {
            Self {
                script: Mutex::new(outcomes.into_iter().collect()),
                ..Self::default()
            }
        }

        pub fn attempt_instants(&self) -> Vec<Instant> {
            self.attempts.lock().unwrap().clone()
        }
    }

    impl HttpTransport for MockTransport {
        async fn request(
            &self,
            _url: &str,
            revalidate: Option<u32>,
        ) -> Result<TransportResponse, TransportError> {
            self.attempts.lock().unwrap().push(Instant::now());
            self.revalidate_seen.lock().unwrap().push(revalidate);

            let outcome = self
                .script
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(MockOutcome::Error("script exhausted".to_string()));

            match outcome {
                MockOutcome::Respond(status, body) => Ok(TransportResponse { status, body }),
                MockOutcome::Error(message) => Err(TransportError::Request(message)),
                MockOutcome::Hang => {
                    tokio::time::sleep(Duration::from_secs(86400)).await;
                    Err(TransportError::Request("woke from hang".to_string()))
                }
            }
        }
    }

    fn policy(retries: u32) -> FetchPolicy {
        FetchPolicy {
            retries,
            retry_delay: Duration::from_millis(300),
            timeout: Duration::from_secs(5),
            revalidate: None,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn success_on_first_attempt_makes_no_retries() {
        let transport = MockTransport::with_script([MockOutcome::Respond(200, b"bytes".to_vec())]);

        let result = fetch_bytes(&transport, "http://host/img.png", &policy(3)).await;

        assert_eq!(result, Some(b"bytes".to_vec()));
        assert_eq!(transport.attempt_instants().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn retries_follow_exponential_backoff_schedule() {
        // Two failures then success: delays must be 300ms then 600ms, in order
        let transport = MockTransport::with_script([
            MockOutcome::Error("connection refused".to_string()),
            MockOutcome::Error("connection reset".to_string()),
            MockOutcome::Respond(200, b"ok".to_vec()),
        ]);

        let result = fetch_bytes(&transport, "http://host/img.png", &policy(5)).await;

        assert_eq!(result, Some(b"ok".to_vec()));
        let instants = transport.attempt_instants();
        assert_eq!(instants.len(), 3);
        assert_eq!(instants[1] - instants[0], Duration::from_millis(300));
        assert_eq!(instants[2] - instants[1], Duration::from_millis(600));
    }

    #[tokio::test(start_paused = true)]
    async fn exhausting_retries_returns_none_not_a_panic() {
        let transport = MockTransport::with_script([
            MockOutcome::Error("down".to_string()),
            MockOutcome::Error("down".to_string()),
            MockOutcome::Error("down".to_string()),
        ]);

        let result = fetch_bytes(&transport, "http://host/img.png", &policy(2)).await;

        assert_eq!(result, None);
        assert_eq!(transport.attempt_instants().len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn zero_retries_means_exactly_one_attempt() {
        let transport = MockTransport::with_script([MockOutcome::Error("down".to_string())]);

        let result = fetch_bytes(&transport, "http://host/img.png", &policy(0)).await;

        assert_eq!(result, None);
        assert_eq!(transport.attempt_instants().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn non_success_status_is_retried_like_any_failure() {
        let transport = MockTransport::with_script([
            MockOutcome::Respond(503, Vec::new()),
            MockOutcome::Respond(200, b"recovered".to_vec()),
        ]);

        let result = fetch_bytes(&transport, "http://host/img.png", &policy(1)).await;

        assert_eq!(result, Some(b"recovered".to_vec()));
        assert_eq!(transport.attempt_instants().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn timed_out_attempt_is_cancelled_and_retried() {
        let transport = MockTransport::with_script([
            MockOutcome::Hang,
            MockOutcome::Respond(200, b"late but fine".to_vec()),
        ]);
        let policy = FetchPolicy {
            retries: 1,
            retry_delay: Duration::from_millis(300),
            timeout: Duration::from_millis(50),
            revalidate: None,
        };

        let result = fetch_bytes(&transport, "http://host/img.png", &policy).await;

        assert_eq!(result, Some(b"late but fine".to_vec()));
        let instants = transport.attempt_instants();
        assert_eq!(instants.len(), 2);
        // Second attempt starts after the 50ms timeout plus the 300ms backoff
        assert_eq!(instants[1] - instants[0], Duration::from_millis(350));
    }

    #[tokio::test(start_paused = true)]
    async fn revalidate_interval_reaches_the_transport() {
        let transport = MockTransport::with_script([MockOutcome::Respond(200, Vec::new())]);
        let policy = FetchPolicy {
            revalidate: Some(3600),
            ..FetchPolicy::default()
        };

        fetch_bytes(&transport, "http://host/img.png", &policy).await;

        assert_eq!(*transport.revalidate_seen.lock().unwrap(), vec![Some(3600)]);
    }

    #[test]
    fn backoff_delay_doubles_per_attempt() {
        let base = Duration::from_millis(300);
        assert_eq!(backoff_delay(base, 0), Duration::from_millis(300));
        assert_eq!(backoff_delay(base, 1), Duration::from_millis(600));
        assert_eq!(backoff_delay(base, 2), Duration::from_millis(1200));
        assert_eq!(backoff_delay(base, 3), Duration::from_millis(2400));
    }

    #[test]
    fn backoff_delay_saturates_instead_of_overflowing() {
        let base = Duration::from_secs(1);
        assert_eq!(backoff_delay(base, 40), Duration::MAX);
        assert!(backoff_delay(Duration::MAX, 1) == Duration::MAX);
    }

    #[test]
    fn cache_hint_only_for_positive_intervals() {
        assert_eq!(cache_hint(None), None);
        assert_eq!(cache_hint(Some(0)), None);
        assert_eq!(cache_hint(Some(3600)), Some("max-age=3600".to_string()));
    }

    #[test]
    fn success_status_range() {
        for (status, expected) in [(199, false), (200, true), (204, true), (299, true), (300, false), (404, false), (503, false)] {
            let response = TransportResponse {
                status,
                body: Vec::new(),
            };
            assert_eq!(response.is_success(), expected, "status {status}");
        }
    }
}
