//! Rest countdown timer.
//!
//! Owns at most one repeating interval. Starting a countdown replaces any
//! running interval; clearing or dropping the timer releases it.

use std::time::Duration;

use tokio::time::{interval_at, Instant, Interval};

/// Default countdown resolution.
pub const TICK_PERIOD: Duration = Duration::from_secs(1);

/// One-second interval used to drive the rest countdown.
#[derive(Debug)]
pub struct RestTimer {
    interval: Option<Interval>,
    period: Duration,
}

impl RestTimer {
    /// Create a stopped timer ticking once per second.
    pub fn new() -> Self {
        Self::with_period(TICK_PERIOD)
    }

    /// Create a stopped timer with a custom period.
    pub fn with_period(period: Duration) -> Self {
        Self {
            interval: None,
            period,
        }
    }

    /// Start ticking. The first tick fires one period from now.
    ///
    /// Must be called inside a tokio runtime.
    pub fn start(&mut self) {
        let interval = interval_at(Instant::now() + self.period, self.period);
        if self.interval.replace(interval).is_some() {
            tracing::debug!("Replaced running rest timer");
        }
    }

    /// Stop ticking. Returns whether an interval was running.
    pub fn clear(&mut self) -> bool {
        self.interval.take().is_some()
    }

    /// Whether an interval is running.
    pub fn is_running(&self) -> bool {
        self.interval.is_some()
    }

    /// Wait for the next tick. Never completes while stopped.
    pub async fn tick(&mut self) {
        match self.interval.as_mut() {
            Some(interval) => {
                interval.tick().await;
            }
            None => std::future::pending::<()>().await,
        }
    }
}

impl Default for RestTimer {
    fn default() -> Self {
        Self::new()
    }
}
