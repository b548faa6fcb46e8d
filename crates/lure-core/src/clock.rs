use std::{
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
    time::{Duration, Instant, UNIX_EPOCH},
};

use chrono::{DateTime, Utc};

/// Time source for the fishing lifecycle.
///
/// `now` is monotonic and measured from an arbitrary origin; `timestamp` is the
/// wall-clock time stamped onto catches.
pub trait Clock {
    fn now(&self) -> Duration;
    fn timestamp(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }

    /// The instant `now()` is measured from.
    pub fn origin(&self) -> Instant {
        self.origin
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }

    fn timestamp(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A virtual clock that only moves when told to. Clones share the same time.
#[derive(Debug, Clone)]
pub struct ManualClock {
    millis: Arc<AtomicU64>,
    epoch: DateTime<Utc>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            millis: Arc::new(AtomicU64::new(0)),
            epoch: DateTime::<Utc>::from(UNIX_EPOCH),
        }
    }

    pub fn advance(&self, by: Duration) {
        self.millis
            .fetch_add(by.as_millis() as u64, Ordering::SeqCst);
    }

    pub fn set(&self, to: Duration) {
        self.millis.store(to.as_millis() as u64, Ordering::SeqCst);
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        Duration::from_millis(self.millis.load(Ordering::SeqCst))
    }

    fn timestamp(&self) -> DateTime<Utc> {
        self.epoch + chrono::Duration::milliseconds(self.millis.load(Ordering::SeqCst) as i64)
    }
}
