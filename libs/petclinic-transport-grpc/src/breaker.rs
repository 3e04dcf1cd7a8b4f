//! Circuit breaker guarding calls to a remote dependency.
//!
//! A [`CircuitBreaker`] is an explicit state object shared by every request
//! that talks to one dependency (wrap it in an `Arc`). It moves between three
//! states:
//!
//! - **closed**: calls pass through; consecutive failures inside the trailing
//!   `failure_window` are counted and the breaker opens once the run reaches
//!   `failure_threshold`
//! - **open**: calls are short-circuited to the fallback without being invoked
//!   until `cooldown` has elapsed
//! - **half-open**: exactly one probe call is let through; success closes the
//!   breaker, failure reopens it and restarts the cooldown
//!
//! [`CircuitBreaker::call`] wraps a call and returns a [`Guarded`] value: either
//! the call's result or the fallback together with the reason it was used.
//! Every call is bounded by `call_timeout`, and a timeout counts as a failure.
//!
//! ## Example
//!
//! ```ignore
//! let breaker = Arc::new(CircuitBreaker::new("visits", CircuitBreakerConfig::default()));
//!
//! let visits = breaker
//!     .call(|| client.find_visits_by_pet_ids(&pet_ids), Vec::new)
//!     .await
//!     .into_inner();
//! ```

use std::collections::VecDeque;
use std::fmt;
use std::future::Future;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::time::Instant;

/// Tuning knobs for a [`CircuitBreaker`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CircuitBreakerConfig {
    /// Consecutive failures (within `failure_window`) that open the breaker.
    pub failure_threshold: u32,
    /// Failures older than this no longer count toward the run.
    pub failure_window: Duration,
    /// How long the breaker stays open before admitting a probe.
    pub cooldown: Duration,
    /// Upper bound for a single guarded call.
    pub call_timeout: Duration,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 5,
            failure_window: Duration::from_secs(10),
            cooldown: Duration::from_secs(30),
            call_timeout: Duration::from_secs(2),
        }
    }
}

impl CircuitBreakerConfig {
    #[must_use]
    pub fn with_failure_threshold(mut self, threshold: u32) -> Self {
        self.failure_threshold = threshold;
        self
    }

    #[must_use]
    pub fn with_failure_window(mut self, window: Duration) -> Self {
        self.failure_window = window;
        self
    }

    #[must_use]
    pub fn with_cooldown(mut self, cooldown: Duration) -> Self {
        self.cooldown = cooldown;
        self
    }

    #[must_use]
    pub fn with_call_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout = timeout;
        self
    }
}

/// Externally visible breaker state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakerState {
    Closed,
    Open,
    HalfOpen,
}

impl BreakerState {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Closed => "closed",
            Self::Open => "open",
            Self::HalfOpen => "half_open",
        }
    }
}

impl fmt::Display for BreakerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a guarded call produced the fallback value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FallbackReason {
    /// The breaker was open (or a probe was already in flight); the call was not made.
    ShortCircuited,
    /// The call did not finish within `call_timeout`.
    TimedOut,
    /// The call returned an error.
    Failed(String),
}

impl fmt::Display for FallbackReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ShortCircuited => f.write_str("short-circuited"),
            Self::TimedOut => f.write_str("timed out"),
            Self::Failed(e) => write!(f, "failed: {e}"),
        }
    }
}

/// Result of a guarded call.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub enum Guarded<T> {
    /// The call succeeded.
    Value(T),
    /// The fallback was substituted.
    Fallback { value: T, reason: FallbackReason },
}

impl<T> Guarded<T> {
    /// The value, regardless of where it came from.
    pub fn into_inner(self) -> T {
        match self {
            Self::Value(value) | Self::Fallback { value, .. } => value,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Self::Fallback { .. })
    }

    pub fn fallback_reason(&self) -> Option<&FallbackReason> {
        match self {
            Self::Value(_) => None,
            Self::Fallback { reason, .. } => Some(reason),
        }
    }
}

/// Point-in-time view of a breaker, for health reporting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BreakerSnapshot {
    pub name: &'static str,
    pub state: BreakerState,
    pub consecutive_failures: u32,
}

#[derive(Debug, Clone, Copy)]
enum Phase {
    Closed,
    Open { opened_at: Instant },
    HalfOpen,
}

#[derive(Debug)]
struct Inner {
    phase: Phase,
    /// Timestamps of the current run of consecutive failures (closed state only).
    failures: VecDeque<Instant>,
}

enum Admission {
    Pass,
    Probe,
    Reject,
}

/// Process-wide fault boundary for one logical dependency.
#[derive(Debug)]
pub struct CircuitBreaker {
    name: &'static str,
    cfg: CircuitBreakerConfig,
    inner: Mutex<Inner>,
}

impl CircuitBreaker {
    #[must_use]
    pub fn new(name: &'static str, cfg: CircuitBreakerConfig) -> Self {
        Self {
            name,
            cfg,
            inner: Mutex::new(Inner {
                phase: Phase::Closed,
                failures: VecDeque::new(),
            }),
        }
    }

    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Current state. An open breaker whose cooldown has elapsed still reports
    /// `Open` until the next call turns it half-open.
    #[must_use]
    pub fn state(&self) -> BreakerState {
        phase_to_state(self.inner.lock().phase)
    }

    #[must_use]
    pub fn snapshot(&self) -> BreakerSnapshot {
        let inner = self.inner.lock();
        BreakerSnapshot {
            name: self.name,
            state: phase_to_state(inner.phase),
            consecutive_failures: u32::try_from(inner.failures.len()).unwrap_or(u32::MAX),
        }
    }

    /// Run `call` behind the breaker.
    ///
    /// `call` is only invoked when the breaker admits it. Otherwise, and on
    /// error or timeout, `fallback` provides the value.
    pub async fn call<T, E, F, Fut, D>(&self, call: F, fallback: D) -> Guarded<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: fmt::Display,
        D: FnOnce() -> T,
    {
        let probe = match self.admit() {
            Admission::Pass => false,
            Admission::Probe => true,
            Admission::Reject => {
                tracing::debug!(breaker = self.name, "call short-circuited");
                return Guarded::Fallback {
                    value: fallback(),
                    reason: FallbackReason::ShortCircuited,
                };
            }
        };

        let permit = Permit {
            breaker: self,
            probe,
            settled: false,
        };

        match tokio::time::timeout(self.cfg.call_timeout, call()).await {
            Ok(Ok(value)) => {
                permit.succeed();
                Guarded::Value(value)
            }
            Ok(Err(e)) => {
                permit.fail();
                let reason = FallbackReason::Failed(e.to_string());
                tracing::warn!(breaker = self.name, probe, %reason, "guarded call failed");
                Guarded::Fallback {
                    value: fallback(),
                    reason,
                }
            }
            Err(_) => {
                permit.fail();
                tracing::warn!(
                    breaker = self.name,
                    probe,
                    timeout_ms = u64::try_from(self.cfg.call_timeout.as_millis()).unwrap_or(u64::MAX),
                    "guarded call timed out"
                );
                Guarded::Fallback {
                    value: fallback(),
                    reason: FallbackReason::TimedOut,
                }
            }
        }
    }

    fn admit(&self) -> Admission {
        let mut inner = self.inner.lock();
        match inner.phase {
            Phase::Closed => Admission::Pass,
            // A probe is already in flight.
            Phase::HalfOpen => Admission::Reject,
            Phase::Open { opened_at } => {
                if opened_at.elapsed() >= self.cfg.cooldown {
                    inner.phase = Phase::HalfOpen;
                    tracing::info!(breaker = self.name, "circuit half-open, admitting probe");
                    Admission::Probe
                } else {
                    Admission::Reject
                }
            }
        }
    }

    fn on_success(&self, probe: bool) {
        let mut inner = self.inner.lock();
        match inner.phase {
            Phase::Closed => inner.failures.clear(),
            Phase::HalfOpen if probe => {
                inner.phase = Phase::Closed;
                inner.failures.clear();
                tracing::info!(breaker = self.name, "circuit closed");
            }
            // Late result of a call admitted before the last transition.
            Phase::HalfOpen | Phase::Open { .. } => {}
        }
    }

    fn on_failure(&self, probe: bool) {
        let now = Instant::now();
        let mut inner = self.inner.lock();
        match inner.phase {
            Phase::Closed => {
                let window = self.cfg.failure_window;
                while inner
                    .failures
                    .front()
                    .is_some_and(|at| now.duration_since(*at) > window)
                {
                    inner.failures.pop_front();
                }
                inner.failures.push_back(now);

                let threshold = usize::try_from(self.cfg.failure_threshold.max(1)).unwrap_or(usize::MAX);
                if inner.failures.len() >= threshold {
                    inner.phase = Phase::Open { opened_at: now };
                    inner.failures.clear();
                    tracing::warn!(
                        breaker = self.name,
                        threshold = self.cfg.failure_threshold,
                        "circuit opened"
                    );
                }
            }
            Phase::HalfOpen if probe => {
                inner.phase = Phase::Open { opened_at: now };
                tracing::warn!(breaker = self.name, "probe failed, circuit re-opened");
            }
            Phase::HalfOpen | Phase::Open { .. } => {}
        }
    }
}

fn phase_to_state(phase: Phase) -> BreakerState {
    match phase {
        Phase::Closed => BreakerState::Closed,
        Phase::Open { .. } => BreakerState::Open,
        Phase::HalfOpen => BreakerState::HalfOpen,
    }
}

/// Outcome reporter for one admitted call.
///
/// A probe dropped before it reports (the request was cancelled) counts as a
/// failure so the breaker cannot stay half-open forever.
struct Permit<'a> {
    breaker: &'a CircuitBreaker,
    probe: bool,
    settled: bool,
}

impl Permit<'_> {
    fn succeed(mut self) {
        self.settled = true;
        self.breaker.on_success(self.probe);
    }

    fn fail(mut self) {
        self.settled = true;
        self.breaker.on_failure(self.probe);
    }
}

impl Drop for Permit<'_> {
    fn drop(&mut self) {
        if !self.settled && self.probe {
            self.breaker.on_failure(true);
        }
    }
}
