//! Test clock: a deterministic `Clock` for tests.

use std::sync::atomic::{AtomicI64, Ordering};

use chrono::{DateTime, TimeDelta, Utc};
use chronicle_core::clock::Clock;

/// A clock that starts at a fixed instant and advances by one second on
/// every reading. Lets tests commit several versions with distinct,
/// predictable timestamps.
#[derive(Debug)]
pub struct SteppingClock {
    start: DateTime<Utc>,
    readings: AtomicI64,
}

impl SteppingClock {
    /// Create a clock whose first reading is `start`.
    #[must_use]
    pub fn starting_at(start: DateTime<Utc>) -> Self {
        Self {
            start,
            readings: AtomicI64::new(0),
        }
    }
}

impl Clock for SteppingClock {
    fn now(&self) -> DateTime<Utc> {
        let n = self.readings.fetch_add(1, Ordering::SeqCst);
        self.start + TimeDelta::seconds(n)
    }
}
