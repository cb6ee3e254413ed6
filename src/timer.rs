//! Countdown timer state machine
//!
//! The timer counts `remaining_time` down from `total_duration` once per tick
//! while it is running. `Completed` is not a stored status: it is the
//! predicate `remaining_time <= 0`, and it blocks `start()` from every state.
//!
//! While the status is [`TimerStatus::Running`] exactly one ticker task is
//! scheduled. The ticker posts tick jobs onto the [`MainContext`]; every job
//! carries the cancellation token it was issued under and does nothing once
//! that token is cancelled, so no tick lands after `pause`, `stop`, `reset`
//! or disposal returns.

use crate::context::MainContext;
use crate::observable::{EventStream, Observable, Subscription, lock};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError, Weak};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::time::{Instant, interval_at};
use tokio_util::sync::CancellationToken;

/// Default countdown length in seconds (one hour)
pub const DEFAULT_TOTAL_DURATION_SECS: i64 = 60 * 60;

/// Default spacing between ticks
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_secs(1);

/// Stored run state of the timer
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimerStatus {
    #[default]
    Stopped,
    Running,
    Paused,
}

impl fmt::Display for TimerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TimerStatus::Stopped => "Stopped",
            TimerStatus::Running => "Running",
            TimerStatus::Paused => "Paused",
        };
        f.write_str(label)
    }
}

/// Tunables for a [`CountdownTimer`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerSettings {
    /// Value `reset()` restores, in seconds; must be positive
    pub total_duration_secs: i64,
    /// Wall-clock time per tick
    pub tick_interval: Duration,
}

impl Default for TimerSettings {
    fn default() -> Self {
        Self {
            total_duration_secs: DEFAULT_TOTAL_DURATION_SECS,
            tick_interval: DEFAULT_TICK_INTERVAL,
        }
    }
}

/// Render seconds as zero-padded `HH:MM:SS`, treating negatives as zero
pub fn format_hms(seconds: i64) -> String {
    let seconds = seconds.max(0);
    format!(
        "{:02}:{:02}:{:02}",
        seconds / 3600,
        (seconds % 3600) / 60,
        seconds % 60
    )
}

/// Fraction of `total` already elapsed, clamped into `[0, 1]`
pub fn elapsed_fraction(remaining: i64, total: i64) -> f64 {
    if total <= 0 {
        return 1.0;
    }
    (total.saturating_sub(remaining) as f64 / total as f64).clamp(0.0, 1.0)
}

/// The countdown timer
///
/// Cloning yields another handle to the same timer. Commands must be issued
/// from the designated execution context.
#[derive(Clone)]
pub struct CountdownTimer {
    inner: Arc<TimerInner>,
}

struct TimerInner {
    settings: TimerSettings,
    context: MainContext,
    remaining_time: Observable<i64>,
    status: Observable<TimerStatus>,
    completed: EventStream<()>,
    ticker: Mutex<Option<CancellationToken>>,
}

impl CountdownTimer {
    /// Create a stopped timer with the default one-hour budget
    pub fn new(context: MainContext) -> Self {
        Self::with_settings(context, TimerSettings::default())
    }

    pub fn with_settings(context: MainContext, settings: TimerSettings) -> Self {
        let inner = TimerInner {
            settings,
            remaining_time: Observable::new(context.clone(), settings.total_duration_secs),
            status: Observable::new(context.clone(), TimerStatus::Stopped),
            completed: EventStream::new(context.clone()),
            context,
            ticker: Mutex::new(None),
        };
        Self {
            inner: Arc::new(inner),
        }
    }

    // ---- commands ----

    /// Start or resume counting down
    ///
    /// Ignored when the timer is completed or already running.
    pub fn start(&self) {
        if self.is_completed() {
            tracing::debug!(
                remaining_time = self.remaining_time(),
                "start ignored: timer completed"
            );
            return;
        }
        if self.is_running() {
            return;
        }
        if !self.arm_ticker() {
            return;
        }
        self.inner.status.set(TimerStatus::Running);
        tracing::debug!(remaining_time = self.remaining_time(), "timer running");
    }

    /// Pause a running timer, keeping the remaining time
    pub fn pause(&self) {
        if !self.is_running() {
            return;
        }
        self.inner.disarm_ticker();
        self.inner.status.set(TimerStatus::Paused);
        tracing::debug!(remaining_time = self.remaining_time(), "timer paused");
    }

    /// Stop the timer without touching the remaining time
    pub fn stop(&self) {
        self.inner.disarm_ticker();
        self.inner.status.set(TimerStatus::Stopped);
        tracing::debug!(remaining_time = self.remaining_time(), "timer stopped");
    }

    /// Restore the full budget and stop
    pub fn reset(&self) {
        self.inner.disarm_ticker();
        self.inner
            .remaining_time
            .set(self.inner.settings.total_duration_secs);
        self.inner.status.set(TimerStatus::Stopped);
        tracing::debug!("timer reset");
    }

    /// Running pauses; stopped or paused starts
    pub fn toggle(&self) {
        match self.status() {
            TimerStatus::Running => self.pause(),
            TimerStatus::Stopped | TimerStatus::Paused => self.start(),
        }
    }

    /// Overwrite the remaining time
    ///
    /// Any value is accepted; derived values clamp. Status is left alone.
    pub fn set_remaining_time(&self, seconds: i64) {
        self.inner.remaining_time.set(seconds);
    }

    // ---- observation ----

    pub fn remaining_time(&self) -> i64 {
        self.inner.remaining_time.get()
    }

    pub fn total_duration(&self) -> i64 {
        self.inner.settings.total_duration_secs
    }

    pub fn status(&self) -> TimerStatus {
        self.inner.status.get()
    }

    pub fn is_running(&self) -> bool {
        self.status() == TimerStatus::Running
    }

    pub fn is_paused(&self) -> bool {
        self.status() == TimerStatus::Paused
    }

    pub fn is_completed(&self) -> bool {
        self.remaining_time() <= 0
    }

    /// Elapsed share of the budget in `[0, 1]`
    pub fn progress(&self) -> f64 {
        elapsed_fraction(self.remaining_time(), self.total_duration())
    }

    /// Remaining time as `HH:MM:SS`
    pub fn formatted_time(&self) -> String {
        format_hms(self.remaining_time())
    }

    /// Whether a ticker is currently scheduled
    pub fn has_active_tick(&self) -> bool {
        lock(&self.inner.ticker).is_some()
    }

    pub fn subscribe_remaining_time<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&i64) + Send + Sync + 'static,
    {
        self.inner.remaining_time.subscribe(callback)
    }

    pub fn subscribe_status<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&TimerStatus) + Send + Sync + 'static,
    {
        self.inner.status.subscribe(callback)
    }

    /// Fires once each time a running countdown reaches zero
    pub fn subscribe_completion<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&()) + Send + Sync + 'static,
    {
        self.inner.completed.subscribe(callback)
    }

    /// Schedule a fresh ticker, cancelling any previous one first
    fn arm_ticker(&self) -> bool {
        let Ok(runtime) = Handle::try_current() else {
            tracing::warn!("start ignored: no tokio runtime available to schedule ticks");
            return false;
        };

        let token = CancellationToken::new();
        if let Some(previous) = lock(&self.inner.ticker).replace(token.clone()) {
            previous.cancel();
        }

        let timer = Arc::downgrade(&self.inner);
        let context = self.inner.context.clone();
        let period = self.inner.settings.tick_interval;
        runtime.spawn(run_ticker(timer, context, token, period));
        true
    }
}

async fn run_ticker(
    timer: Weak<TimerInner>,
    context: MainContext,
    token: CancellationToken,
    period: Duration,
) {
    let mut interval = interval_at(Instant::now() + period, period);
    loop {
        tokio::select! {
            biased;
            _ = token.cancelled() => break,
            _ = interval.tick() => {
                let timer = timer.clone();
                let job_token = token.clone();
                let posted = context.post(move || {
                    if let Some(timer) = timer.upgrade() {
                        timer.tick(&job_token);
                    }
                });
                if !posted {
                    break;
                }
            }
        }
    }
}

impl TimerInner {
    fn disarm_ticker(&self) {
        if let Some(token) = lock(&self.ticker).take() {
            token.cancel();
        }
    }

    fn tick(&self, token: &CancellationToken) {
        if token.is_cancelled() {
            return;
        }

        let previous = self.remaining_time.get();
        if previous <= 0 {
            // Set to zero or below while running: nothing left to count.
            self.disarm_ticker();
            self.status.set(TimerStatus::Stopped);
            return;
        }

        let remaining = previous - 1;
        self.remaining_time.set(remaining);
        if remaining <= 0 {
            self.disarm_ticker();
            self.status.set(TimerStatus::Stopped);
            self.completed.emit(());
            tracing::info!(
                total_duration = self.settings.total_duration_secs,
                "countdown completed"
            );
        }
    }
}

impl Drop for TimerInner {
    fn drop(&mut self) {
        let ticker = self.ticker.get_mut().unwrap_or_else(PoisonError::into_inner);
        if let Some(token) = ticker.take() {
            token.cancel();
        }
    }
}
