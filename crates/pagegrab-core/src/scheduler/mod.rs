//! Rate-limited, retrying fetch scheduler.
//!
//! Every attempt passes the rate gate first (`min_request_interval` since the
//! previous attempt started), then, if it is a retry, sleeps the policy's retry
//! delay, then issues exactly one GET. Transport failures are retried against
//! the same URL until the policy gives up.
//!
//! The scheduler blocks the calling thread for the whole wait/request/backoff
//! cycle. State lives on the instance and is only touched through `&mut self`
//! in [`FetchScheduler::fetch`]; share an instance by serializing calls, or use
//! one instance per thread (each has its own gate).

mod gate;


pub use gate::RateGate;

use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::retry::{ErrorKind, FetchError, RetryDecision, RetryPolicy};
use crate::scribe::{Scribe, Severity, Visibility};
use crate::transport::{CurlTransport, RequestOptions, ResponseHeaders, Transport};

/// Outcome of one attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptOutcome {
    Success,
    Failed(ErrorKind),
}

/// One GET issued by the scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchAttempt {
    /// 1-based ordinal within the `fetch` call.
    pub number: u32,
    pub started: Instant,
    pub outcome: AttemptOutcome,
}

/// Successful fetch.
#[derive(Debug, Clone)]
pub struct FetchResult {
    pub body: Vec<u8>,
    pub status: u32,
    pub headers: ResponseHeaders,
    /// Time from sending the request to receiving the full body.
    pub duration: Duration,
    pub size_bytes: usize,
    /// Attempts used, including the successful one.
    pub attempts: u32,
}

impl FetchResult {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn size_kb(&self) -> f64 {
        self.size_bytes as f64 / 1024.0
    }

    /// Body as text (lossy UTF-8).
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Scheduler bookkeeping readable after a call; diagnostic only.
#[derive(Debug, Clone, Default)]
pub struct SchedulerState {
    /// Failed attempts of the in-flight (or last) request.
    pub failures: u32,
    pub attempts: Vec<FetchAttempt>,
    pub last_duration: Duration,
    pub last_size_bytes: usize,
}

impl SchedulerState {
    fn begin(&mut self) {
        self.failures = 0;
        self.attempts.clear();
    }
}

/// Rate-limited retrying GET scheduler. Construct once, reuse for every fetch.
pub struct FetchScheduler<T = CurlTransport> {
    transport: T,
    options: RequestOptions,
    policy: RetryPolicy,
    gate: RateGate,
    state: SchedulerState,
    scribe: Arc<dyn Scribe>,
}

impl FetchScheduler<CurlTransport> {
    /// Scheduler over libcurl.
    pub fn with_curl(
        options: RequestOptions,
        policy: RetryPolicy,
        min_interval: Duration,
        scribe: Arc<dyn Scribe>,
    ) -> Self {
        Self::new(CurlTransport::new(), options, policy, min_interval, scribe)
    }
}

impl<T: Transport> FetchScheduler<T> {
    pub fn new(
        transport: T,
        options: RequestOptions,
        policy: RetryPolicy,
        min_interval: Duration,
        scribe: Arc<dyn Scribe>,
    ) -> Self {
        Self {
            transport,
            options,
            policy,
            gate: RateGate::new(min_interval),
            state: SchedulerState::default(),
            scribe,
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    pub fn state(&self) -> &SchedulerState {
        &self.state
    }

    /// Attempts made by the last `fetch` call.
    pub fn attempts(&self) -> u32 {
        self.state.attempts.len() as u32
    }

    pub fn last_duration(&self) -> Duration {
        self.state.last_duration
    }

    pub fn last_size_kb(&self) -> f64 {
        self.state.last_size_bytes as f64 / 1024.0
    }

    /// Start instant of the most recent attempt.
    pub fn last_request(&self) -> Option<Instant> {
        self.gate.last_start()
    }

    /// Fetch `url`, blocking through rate limiting and retries.
    pub fn fetch(&mut self, url: &str) -> Result<FetchResult, FetchError> {
        let request = self.options.request_for(url);
        self.state.begin();
        let mut backoff = Duration::ZERO;

        loop {
            let wait = self.gate.remaining(Instant::now());
            if !wait.is_zero() {
                self.scribe.write(
                    &format!(
                        "Minimum request interval not met, waiting {:.2} sec...",
                        wait.as_secs_f64()
                    ),
                    Visibility::Debug,
                    Severity::Plain,
                );
                std::thread::sleep(wait);
            }
            if !backoff.is_zero() {
                std::thread::sleep(backoff);
            }

            let number = self.state.attempts.len() as u32 + 1;
            let started = self.gate.mark();
            self.scribe.write(
                &format!("Request sent: {}", url),
                Visibility::Debug,
                Severity::Plain,
            );
            tracing::debug!(url, attempt = number, "GET");

            match self.transport.get(&request) {
                Ok(response) => {
                    // Instant is monotonic, so the duration can't go negative.
                    let duration = started.elapsed();
                    self.state.attempts.push(FetchAttempt {
                        number,
                        started,
                        outcome: AttemptOutcome::Success,
                    });
                    self.state.last_duration = duration;
                    self.state.last_size_bytes = response.body.len();
                    self.scribe.write(
                        &format!(
                            "Response received in {:.2} sec ({:.1} KiB)",
                            duration.as_secs_f64(),
                            self.last_size_kb()
                        ),
                        Visibility::Debug,
                        Severity::Plain,
                    );
                    if !(200..300).contains(&response.status) {
                        self.scribe.write(
                            &format!("Warning: {} returned HTTP {}", url, response.status),
                            Visibility::Both,
                            Severity::Warning,
                        );
                    }
                    return Ok(FetchResult {
                        size_bytes: response.body.len(),
                        body: response.body,
                        status: response.status,
                        headers: response.headers,
                        duration,
                        attempts: number,
                    });
                }
                Err(err) => {
                    self.state.failures += 1;
                    self.state.attempts.push(FetchAttempt {
                        number,
                        started,
                        outcome: AttemptOutcome::Failed(err.kind),
                    });
                    self.state.last_duration = Duration::ZERO;
                    self.state.last_size_bytes = 0;

                    match self.policy.decide(self.state.failures, err.kind) {
                        RetryDecision::RetryAfter(delay) => {
                            self.scribe.write(
                                &format!(
                                    "Warning: Could not retrieve response from URL, retrying: {}",
                                    self.state.failures
                                ),
                                Visibility::Both,
                                Severity::Warning,
                            );
                            tracing::debug!(url, kind = %err.kind, error = %err, "attempt failed, retrying");
                            backoff = delay;
                        }
                        RetryDecision::NoRetry => {
                            self.scribe.write(
                                &format!("Error retrieving response: {}", err),
                                Visibility::Both,
                                Severity::Error,
                            );
                            return Err(FetchError::RetryExhausted {
                                url: url.to_string(),
                                attempts: number,
                                source: err,
                            });
                        }
                    }
                }
            }
        }
    }
}
