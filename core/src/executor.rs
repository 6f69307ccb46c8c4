//! Resilient request executor.
//!
//! # Design
//! `Executor` sends one logical request through a [`Transport`] and keeps
//! retrying while the transport fails before a response arrives. Any received
//! response ends the call, whatever its status: 4xx and 5xx are classified
//! and handed back, never retried, because a repeated invitation POST can
//! create duplicates.
//!
//! The backoff before retry `n` is `2^n` seconds. [`RetryPolicy`] bounds the
//! loop by retry count and by cumulative backoff; when either bound is hit
//! the call ends with a `GaveUp` outcome. Sleeping goes through [`Sleeper`]
//! so tests can observe the schedule without waiting for it.

use std::time::Duration;

use thiserror::Error;
use tracing::{debug, warn};

use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse};
use crate::outcome::{Classification, RequestOutcome};

/// Largest backoff exponent; keeps `2^n` seconds representable.
const MAX_BACKOFF_EXPONENT: u32 = 20;

/// Failure raised by a transport before any response was received.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    /// DNS, connect, reset, timeout. Worth retrying.
    #[error("network failure: {0}")]
    Network(String),

    /// The request itself cannot be sent (bad URL, bad header value).
    #[error("invalid request: {0}")]
    Invalid(String),
}

/// Executes a single HTTP round-trip.
///
/// Implementations must return `Ok` for every received response, including
/// 4xx and 5xx statuses.
pub trait Transport {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        (**self).send(request)
    }
}

/// Blocking wait used for backoff and pacing.
pub trait Sleeper {
    fn sleep(&self, duration: Duration);
}

impl<S: Sleeper + ?Sized> Sleeper for &S {
    fn sleep(&self, duration: Duration) {
        (**self).sleep(duration)
    }
}

/// Sleeps the current thread.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Bounds on the transient-failure retry loop. `None` means unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: Option<u32>,
    pub max_total_backoff: Option<Duration>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: Some(6),
            max_total_backoff: Some(Duration::from_secs(300)),
        }
    }
}

impl RetryPolicy {
    /// Retry forever. A persistent outage hangs the caller.
    pub fn unbounded() -> Self {
        Self {
            max_retries: None,
            max_total_backoff: None,
        }
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = Some(max_retries);
        self
    }

    pub fn with_max_total_backoff(mut self, max_total_backoff: Duration) -> Self {
        self.max_total_backoff = Some(max_total_backoff);
        self
    }

    /// Delay before retry number `retry` (1-based): `2^retry` seconds.
    pub fn backoff(&self, retry: u32) -> Duration {
        Duration::from_secs(1u64 << retry.min(MAX_BACKOFF_EXPONENT))
    }

    /// Whether retry number `retry` is out of budget, given the cumulative
    /// backoff it would bring the call to.
    fn exhausted(&self, retry: u32, total_backoff: Duration) -> bool {
        self.max_retries.is_some_and(|max| retry > max)
            || self.max_total_backoff.is_some_and(|max| total_backoff > max)
    }
}

/// Sends requests through `T`, retrying transient failures with backoff.
#[derive(Debug, Clone)]
pub struct Executor<T, S> {
    transport: T,
    sleeper: S,
    policy: RetryPolicy,
}

impl<T: Transport, S: Sleeper> Executor<T, S> {
    pub fn new(transport: T, sleeper: S, policy: RetryPolicy) -> Self {
        Self {
            transport,
            sleeper,
            policy,
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn sleeper(&self) -> &S {
        &self.sleeper
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Execute `request` until a response arrives or the policy gives up.
    ///
    /// Returns `Err` only for requests that were never attempted or that the
    /// transport rejected as unsendable. Every received response, and
    /// exhaustion of the retry budget, comes back as `Ok`.
    pub fn execute(&self, request: &HttpRequest) -> Result<RequestOutcome, ApiError> {
        validate(request)?;

        let mut retry: u32 = 0;
        let mut total_backoff = Duration::ZERO;
        loop {
            let attempt = retry + 1;
            let outcome = match self.transport.send(request) {
                Ok(response) => RequestOutcome::from_response(response, attempt),
                Err(TransportError::Network(msg)) => RequestOutcome::transient(msg, attempt),
                Err(TransportError::Invalid(msg)) => return Err(ApiError::Transport(msg)),
            };

            if outcome.classification() != Classification::TransientNetworkFailure {
                debug!(
                    method = %request.method,
                    url = %request.url,
                    attempt,
                    status = outcome.status(),
                    classification = %outcome.classification(),
                    "request completed"
                );
                return Ok(outcome);
            }

            let error = outcome.last_error().unwrap_or_default();
            retry += 1;
            let delay = self.policy.backoff(retry);
            if self.policy.exhausted(retry, total_backoff + delay) {
                warn!(url = %request.url, attempts = attempt, %error, "giving up after transient failures");
                return Ok(RequestOutcome::gave_up(error, attempt));
            }

            warn!(
                url = %request.url,
                attempt,
                delay_secs = delay.as_secs(),
                %error,
                "transient failure, waiting before trying again"
            );
            self.sleeper.sleep(delay);
            total_backoff += delay;
        }
    }
}

fn validate(request: &HttpRequest) -> Result<(), ApiError> {
    if request.url.trim().is_empty() {
        return Err(ApiError::InvalidRequest("empty url".to_string()));
    }
    if request.headers.is_empty() {
        return Err(ApiError::InvalidRequest("no headers".to_string()));
    }
    Ok(())
}
