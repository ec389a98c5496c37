//! Bounded-wait primitives for two independently asynchronous systems.
//!
//! The rendered page and the payment backend both converge on unknown,
//! bounded delays. Everything in this module is a polling loop with a sleep
//! between attempts: no busy-spinning, no unbounded waits, and — crucially —
//! no error on timeout. A wait that runs out of time returns
//! [`WaitOutcome::succeeded`]` == false`, because "the condition never became
//! true" is itself a legitimate test assertion (e.g. "no backend record
//! should ever appear").

use crate::error::Result;
use std::future::Future;
use std::time::{Duration, Instant};
use tokio::time::sleep;

/// UI-observation bound used throughout scenarios (12 seconds).
///
/// Success and error banners render only after the backend round trip
/// completes, so this is sized for the slowest expected processing delay.
pub const UI_TIMEOUT: Duration = Duration::from_secs(12);

/// Default poll interval between condition evaluations (200ms).
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(200);

/// Configuration for wait operations.
#[derive(Debug, Clone, Copy)]
pub struct WaitConfig {
    /// Maximum time to wait for the condition.
    pub timeout: Duration,

    /// How often to re-evaluate the condition.
    pub poll_interval: Duration,
}

impl WaitConfig {
    /// Creates a new wait configuration.
    #[must_use]
    pub fn new(timeout: Duration, poll_interval: Duration) -> Self {
        Self {
            timeout,
            poll_interval,
        }
    }

    /// Creates a config with a custom timeout and the default poll interval.
    #[must_use]
    pub fn with_timeout(timeout: Duration) -> Self {
        Self::new(timeout, DEFAULT_POLL_INTERVAL)
    }
}

impl Default for WaitConfig {
    fn default() -> Self {
        Self::new(UI_TIMEOUT, DEFAULT_POLL_INTERVAL)
    }
}

/// The result of a bounded wait.
///
/// Produced by every waiter in the harness. A failed wait is a value, not an
/// error; the caller's expectation decides whether it is a pass or a fail.
#[derive(Debug, Clone)]
pub struct WaitOutcome<T> {
    /// Whether the condition was satisfied before the deadline.
    pub succeeded: bool,

    /// The observed value, present only when the wait succeeded.
    pub value: Option<T>,

    /// How long the wait ran before returning.
    pub elapsed: Duration,
}

impl<T> WaitOutcome<T> {
    /// A wait that observed its condition.
    #[must_use]
    pub fn satisfied(value: T, elapsed: Duration) -> Self {
        Self {
            succeeded: true,
            value: Some(value),
            elapsed,
        }
    }

    /// A wait that ran out the clock without observing its condition.
    #[must_use]
    pub fn timed_out(elapsed: Duration) -> Self {
        Self {
            succeeded: false,
            value: None,
            elapsed,
        }
    }
}

/// Polls an async boolean predicate until it holds or the deadline elapses.
///
/// The predicate is evaluated immediately, then once per `poll_interval`.
/// Termination is bounded by `timeout + poll_interval`: the deadline check
/// runs after each evaluation, so a wait never returns earlier than the
/// condition becoming true and never later than one interval past the
/// deadline.
///
/// # Example
///
/// ```ignore
/// let outcome = wait_until(|| page_has_banner(), WaitConfig::default()).await;
/// assert!(outcome.succeeded);
/// ```
pub async fn wait_until<F, Fut>(condition: F, config: WaitConfig) -> WaitOutcome<bool>
where
    F: Fn() -> Fut,
    Fut: Future<Output = bool>,
{
    let start = Instant::now();

    loop {
        if condition().await {
            return WaitOutcome::satisfied(true, start.elapsed());
        }

        if start.elapsed() >= config.timeout {
            return WaitOutcome::timed_out(start.elapsed());
        }

        sleep(config.poll_interval).await;
    }
}

/// Polls a fallible predicate until it holds or the deadline elapses.
///
/// An `Err` from the predicate is infrastructural (the browser or database
/// collaborator itself broke) and propagates immediately — retrying cannot
/// fix a dead session, and swallowing the error would mask the real failure
/// behind a misleading timeout.
pub async fn try_wait_until<F, Fut>(condition: F, config: WaitConfig) -> Result<WaitOutcome<bool>>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<bool>>,
{
    let start = Instant::now();

    loop {
        if condition().await? {
            return Ok(WaitOutcome::satisfied(true, start.elapsed()));
        }

        if start.elapsed() >= config.timeout {
            return Ok(WaitOutcome::timed_out(start.elapsed()));
        }

        sleep(config.poll_interval).await;
    }
}

/// Polls a query for a value until one appears or the deadline elapses.
///
/// The query reports absence as `Ok(None)`, which is valid and keeps the
/// loop going. The first `Some` returns immediately: the records this
/// harness reads are terminal once written, so continuing to poll an
/// already-settled value cannot change it. Query errors propagate.
pub async fn wait_for_value<T, F, Fut>(query: F, config: WaitConfig) -> Result<WaitOutcome<T>>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<Option<T>>>,
{
    let start = Instant::now();

    loop {
        if let Some(value) = query().await? {
            return Ok(WaitOutcome::satisfied(value, start.elapsed()));
        }

        if start.elapsed() >= config.timeout {
            return Ok(WaitOutcome::timed_out(start.elapsed()));
        }

        sleep(config.poll_interval).await;
    }
}
