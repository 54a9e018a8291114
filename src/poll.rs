// src/poll.rs

//! Polling with multiplicative backoff.
//!
//! A loop runs one tick at a time: the next tick is only scheduled after the
//! previous one has settled. Success resets the interval to the floor, a
//! failure multiplies it by the factor, and once it grows past the ceiling
//! the loop gives up and asks the host to reload.

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

use crate::error::ClientError;

/// Thresholds for one polling loop.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BackoffPolicy {
    /// Wait before the first tick.
    pub initial: Duration,
    /// Wait after every successful tick.
    pub floor: Duration,
    /// Give up once a failure pushes the interval above this.
    pub ceiling: Duration,
    pub factor: f64,
}

impl BackoffPolicy {
    /// Participant quiz status.
    pub const PARTICIPANT_STATUS: BackoffPolicy = BackoffPolicy {
        initial: Duration::from_millis(700),
        floor: Duration::from_millis(700),
        ceiling: Duration::from_millis(3000),
        factor: 1.3,
    };

    /// Quizmaster answer listing.
    pub const QUIZMASTER_ANSWERS: BackoffPolicy = BackoffPolicy {
        initial: Duration::from_millis(700),
        floor: Duration::from_millis(3100),
        ceiling: Duration::from_millis(10000),
        factor: 1.3,
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollState {
    Idle,
    Polling,
    Backoff,
    Failed,
}

/// Interval bookkeeping for a polling loop, free of any I/O.
#[derive(Debug, Clone)]
pub struct Backoff {
    policy: BackoffPolicy,
    interval: Duration,
    state: PollState,
    failures: u32,
}

impl Backoff {
    pub fn new(policy: BackoffPolicy) -> Self {
        Self {
            policy,
            interval: policy.initial,
            state: PollState::Idle,
            failures: 0,
        }
    }

    /// Wait before the next tick.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn state(&self) -> PollState {
        self.state
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.failures
    }

    /// Records a successful tick and returns the wait before the next one.
    pub fn on_success(&mut self) -> Duration {
        self.interval = self.policy.floor;
        self.failures = 0;
        self.state = PollState::Polling;
        self.interval
    }

    /// Records a failed tick. Returns the wait before the retry, or `None`
    /// once the interval has passed the ceiling.
    pub fn on_failure(&mut self) -> Option<Duration> {
        if self.state == PollState::Failed {
            return None;
        }
        self.interval = self.interval.mul_f64(self.policy.factor);
        self.failures += 1;
        if self.interval > self.policy.ceiling {
            self.state = PollState::Failed;
            None
        } else {
            self.state = PollState::Backoff;
            Some(self.interval)
        }
    }
}

/// Shared stop switch, checked before each tick is rescheduled.
///
/// `resume` re-arms the switch for a new loop. Loops that were started
/// before it stay stopped, so at most one loop per switch keeps running.
#[derive(Debug, Clone, Default)]
pub struct CancellationFlag {
    cancelled: Arc<AtomicBool>,
    generation: Arc<AtomicU64>,
}

impl CancellationFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn resume(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.cancelled.store(false, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Ties one loop run to the current generation of the switch.
    pub fn run_guard(&self) -> RunGuard {
        RunGuard {
            flag: self.clone(),
            generation: self.generation.load(Ordering::SeqCst),
        }
    }
}

/// A loop run's view of its `CancellationFlag`.
#[derive(Debug, Clone)]
pub struct RunGuard {
    flag: CancellationFlag,
    generation: u64,
}

impl RunGuard {
    /// Cancelled, or superseded by a `resume` since the run began.
    pub fn is_stopped(&self) -> bool {
        self.flag.is_cancelled() || self.flag.generation.load(Ordering::SeqCst) != self.generation
    }
}

/// What a successful tick saw.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Keep polling.
    Continue,
    /// Local state is stale; stop and reload.
    Diverged,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReloadReason {
    /// The server moved on to state the client does not have.
    Diverged,
    /// Too many consecutive failures.
    GaveUp,
}

/// Why a polling loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopExit {
    Reload(ReloadReason),
    Cancelled,
}

/// Runs `tick` until it diverges, the backoff gives up or `cancel` is set.
///
/// Waits `backoff.interval()` before the first tick. The flag is checked
/// before and after every wait. Failed ticks are expected to have been
/// reported already; the loop only logs them.
pub async fn run<F, Fut>(backoff: &mut Backoff, cancel: &CancellationFlag, mut tick: F) -> LoopExit
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<TickOutcome, ClientError>>,
{
    let guard = cancel.run_guard();
    let mut delay = backoff.interval();
    loop {
        if guard.is_stopped() {
            tracing::info!("Polling cancelled");
            return LoopExit::Cancelled;
        }
        tokio::time::sleep(delay).await;
        if guard.is_stopped() {
            tracing::info!("Polling cancelled while waiting");
            return LoopExit::Cancelled;
        }

        match tick().await {
            Ok(TickOutcome::Continue) => {
                delay = backoff.on_success();
            }
            Ok(TickOutcome::Diverged) => {
                tracing::info!("Server state diverged, stopping poll");
                return LoopExit::Reload(ReloadReason::Diverged);
            }
            Err(err) => match backoff.on_failure() {
                Some(next) => {
                    tracing::warn!(
                        "Poll failed ({} in a row), retrying in {:?}: {}",
                        backoff.consecutive_failures(),
                        next,
                        err
                    );
                    delay = next;
                }
                None => {
                    tracing::error!("Poll failed {} times, giving up", backoff.consecutive_failures());
                    return LoopExit::Reload(ReloadReason::GaveUp);
                }
            },
        }
    }
}
