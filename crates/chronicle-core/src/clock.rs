//! Clock abstraction for determinism.

use std::sync::Mutex;

use chrono::{DateTime, TimeDelta, Utc};

/// Abstraction over system time for deterministic behavior.
pub trait Clock: Send + Sync {
    /// Returns the current time.
    fn now(&self) -> DateTime<Utc>;
}

/// Production clock that delegates to the system clock.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Wraps another clock so that successive readings strictly increase.
///
/// Version listings are ordered by timestamp, so two versions written in
/// the same instant (or across a backwards wall-clock step) must still get
/// distinct, ordered timestamps. A reading that does not advance past the
/// previous one is bumped by one microsecond, the resolution that survives
/// an RFC 3339 round trip.
#[derive(Debug)]
pub struct MonotonicClock<C> {
    inner: C,
    last: Mutex<Option<DateTime<Utc>>>,
}

impl<C: Clock> MonotonicClock<C> {
    /// Creates a monotonic view over `inner`.
    #[must_use]
    pub fn new(inner: C) -> Self {
        Self {
            inner,
            last: Mutex::new(None),
        }
    }
}

impl<C: Clock> Clock for MonotonicClock<C> {
    fn now(&self) -> DateTime<Utc> {
        let reading = self.inner.now();
        let mut last = self
            .last
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        let next = match *last {
            Some(previous) if reading <= previous => previous + TimeDelta::microseconds(1),
            _ => reading,
        };
        *last = Some(next);
        next
    }
}
