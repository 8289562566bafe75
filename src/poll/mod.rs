//! 轮询模块：以可注入的策略等待远端异步计算结果。
//!
//! # Polling
//!
//! Metrics are computed by the platform some time after a trace is ingested,
//! so callers wait for them by polling. This module separates *what* is
//! probed (a closure returning a [`Probe`]) from *how* it is repeated (a
//! [`PollStrategy`]).
//!
//! The wall-clock budget is checked before each attempt, a probe is cut off
//! once it runs past the remaining budget plus one interval, and the sleep
//! after an attempt never exceeds what is left of the budget. [`poll_until`]
//! therefore returns within `max_wait + interval`.
//!
//! ```rust,no_run
//! use galileo_harness::poll::{poll_until, PollStrategy, Probe};
//! use std::time::Duration;
//!
//! # async fn demo() {
//! let strategy = PollStrategy::fixed(Duration::from_secs(10), Duration::from_secs(120));
//! let outcome = poll_until(&strategy, |attempt| async move {
//!     if attempt < 3 { Probe::Pending } else { Probe::Ready(attempt) }
//! })
//! .await;
//! assert_eq!(outcome.into_option(), Some(3));
//! # }
//! ```

use crate::Error;
use std::future::Future;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// How the delay between attempts grows.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Backoff {
    /// Same interval every time.
    Fixed,
    /// `interval * factor^(attempt-1)`, capped at `max_interval`.
    Exponential { factor: f64, max_interval: Duration },
}

#[derive(Debug, Clone, PartialEq)]
pub struct PollStrategy {
    pub interval: Duration,
    pub max_wait: Duration,
    pub max_attempts: Option<u32>,
    pub backoff: Backoff,
}

impl Default for PollStrategy {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(10),
            max_wait: Duration::from_secs(120),
            max_attempts: None,
            backoff: Backoff::Fixed,
        }
    }
}

impl PollStrategy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fixed(interval: Duration, max_wait: Duration) -> Self {
        Self {
            interval,
            max_wait,
            ..Self::default()
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn with_max_wait(mut self, max_wait: Duration) -> Self {
        self.max_wait = max_wait;
        self
    }

    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = Some(attempts.max(1));
        self
    }

    pub fn with_backoff(mut self, backoff: Backoff) -> Self {
        self.backoff = backoff;
        self
    }

    /// Same strategy with the wait budget multiplied by `factor`.
    pub fn scaled(&self, factor: f64) -> Self {
        let factor = if factor.is_finite() && factor > 0.0 {
            factor
        } else {
            1.0
        };
        Self {
            max_wait: self.max_wait.mul_f64(factor),
            ..self.clone()
        }
    }

    /// Delay after the given 1-based attempt.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        match self.backoff {
            Backoff::Fixed => self.interval,
            Backoff::Exponential {
                factor,
                max_interval,
            } => {
                let exponent = attempt.saturating_sub(1).min(i32::MAX as u32) as i32;
                let secs = self.interval.as_secs_f64() * factor.max(1.0).powi(exponent);
                let cap = max_interval.max(self.interval);
                if secs.is_finite() && secs < cap.as_secs_f64() {
                    Duration::from_secs_f64(secs)
                } else {
                    cap
                }
            }
        }
    }
}

/// Result of a single probe.
#[derive(Debug)]
pub enum Probe<T> {
    /// The awaited value is available.
    Ready(T),
    /// Not available yet; keep polling.
    Pending,
    /// The probe failed in a way that may clear up; keep polling.
    Transient(Error),
    /// The probe can never succeed; stop now.
    Permanent(Error),
}

impl<T> Probe<T> {
    /// Classify a fallible lookup.
    ///
    /// `Ok(None)` and HTTP 404 mean "not there yet"; other errors are split by
    /// [`Error::is_retryable`].
    pub fn from_result(result: crate::Result<Option<T>>) -> Self {
        match result {
            Ok(Some(value)) => Probe::Ready(value),
            Ok(None) => Probe::Pending,
            Err(e) if e.status() == Some(404) => Probe::Pending,
            Err(e) if e.is_retryable() => Probe::Transient(e),
            Err(e) => Probe::Permanent(e),
        }
    }
}

/// Final state of a polling loop.
#[derive(Debug)]
pub enum PollOutcome<T> {
    Ready {
        value: T,
        attempts: u32,
        elapsed: Duration,
    },
    TimedOut {
        attempts: u32,
        elapsed: Duration,
    },
    Failed {
        error: Error,
        attempts: u32,
        elapsed: Duration,
    },
}

impl<T> PollOutcome<T> {
    pub fn is_ready(&self) -> bool {
        matches!(self, PollOutcome::Ready { .. })
    }

    pub fn attempts(&self) -> u32 {
        match self {
            PollOutcome::Ready { attempts, .. }
            | PollOutcome::TimedOut { attempts, .. }
            | PollOutcome::Failed { attempts, .. } => *attempts,
        }
    }

    pub fn elapsed(&self) -> Duration {
        match self {
            PollOutcome::Ready { elapsed, .. }
            | PollOutcome::TimedOut { elapsed, .. }
            | PollOutcome::Failed { elapsed, .. } => *elapsed,
        }
    }

    /// The value if one arrived; timeouts and failures collapse to `None`.
    pub fn into_option(self) -> Option<T> {
        match self {
            PollOutcome::Ready { value, .. } => Some(value),
            _ => None,
        }
    }

    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> PollOutcome<U> {
        match self {
            PollOutcome::Ready {
                value,
                attempts,
                elapsed,
            } => PollOutcome::Ready {
                value: f(value),
                attempts,
                elapsed,
            },
            PollOutcome::TimedOut { attempts, elapsed } => {
                PollOutcome::TimedOut { attempts, elapsed }
            }
            PollOutcome::Failed {
                error,
                attempts,
                elapsed,
            } => PollOutcome::Failed {
                error,
                attempts,
                elapsed,
            },
        }
    }
}

/// Call `probe` until it yields a value, fails permanently, or the strategy's
/// budget runs out. `probe` receives the 1-based attempt number.
///
/// A probe still pending when the budget plus one interval has passed is
/// dropped and the outcome is `TimedOut`.
pub async fn poll_until<T, F, Fut>(strategy: &PollStrategy, mut probe: F) -> PollOutcome<T>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Probe<T>>,
{
    let start = Instant::now();
    let mut attempts = 0u32;

    while start.elapsed() < strategy.max_wait {
        attempts += 1;
        let allowance = strategy.max_wait.saturating_sub(start.elapsed()) + strategy.interval;
        let Ok(result) = tokio::time::timeout(allowance, probe(attempts)).await else {
            warn!(attempt = attempts, "probe still running when the budget ran out");
            break;
        };
        match result {
            Probe::Ready(value) => {
                return PollOutcome::Ready {
                    value,
                    attempts,
                    elapsed: start.elapsed(),
                }
            }
            Probe::Pending => debug!(attempt = attempts, "not available yet"),
            Probe::Transient(e) => warn!(attempt = attempts, error = %e, "transient failure while polling"),
            Probe::Permanent(error) => {
                warn!(attempt = attempts, error = %error, "giving up: permanent failure");
                return PollOutcome::Failed {
                    error,
                    attempts,
                    elapsed: start.elapsed(),
                };
            }
        }

        if strategy.max_attempts.is_some_and(|max| attempts >= max) {
            break;
        }

        let remaining = strategy.max_wait.saturating_sub(start.elapsed());
        if remaining.is_zero() {
            break;
        }
        tokio::time::sleep(strategy.delay_for(attempts).min(remaining)).await;
    }

    PollOutcome::TimedOut {
        attempts,
        elapsed: start.elapsed(),
    }
}
