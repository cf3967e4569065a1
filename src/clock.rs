//! Wall-clock source for save and export timestamps.

use std::sync::atomic::{AtomicI64, Ordering};

use chrono::{DateTime, Utc};

/// Milliseconds since the Unix epoch, from the system clock.
pub fn unix_millis() -> i64 {
    Utc::now().timestamp_millis()
}

pub trait Clock: Send + Sync {
    /// Current time in milliseconds since the Unix epoch.
    fn now_millis(&self) -> i64;

    fn now(&self) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(self.now_millis()).unwrap_or_default()
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        unix_millis()
    }
}

/// A clock that only moves when told to. Each read returns the current value
/// and then advances it by `step` milliseconds, so consecutive saves get
/// distinct timestamps.
#[derive(Debug)]
pub struct ManualClock {
    millis: AtomicI64,
    step: i64,
}

impl ManualClock {
    pub fn new(start_millis: i64) -> Self {
        Self::with_step(start_millis, 1)
    }

    pub fn with_step(start_millis: i64, step: i64) -> Self {
        Self {
            millis: AtomicI64::new(start_millis),
            step,
        }
    }

    pub fn set(&self, millis: i64) {
        self.millis.store(millis, Ordering::SeqCst);
    }

    pub fn peek(&self) -> i64 {
        self.millis.load(Ordering::SeqCst)
    }
}

impl Clock for ManualClock {
    fn now_millis(&self) -> i64 {
        self.millis.fetch_add(self.step, Ordering::SeqCst)
    }
}
