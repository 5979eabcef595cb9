//! Time source for note timestamps.
//!
//! Timestamps are persisted as integer milliseconds, so every clock reading is
//! truncated to millisecond precision before it reaches a note.

use std::sync::Mutex;

use chrono::{DateTime, TimeDelta, Utc};

/// Supplies the current time to the note store.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        truncate_to_millis(Utc::now())
    }
}

/// A clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    current: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            current: Mutex::new(truncate_to_millis(start)),
        }
    }

    /// Moves the clock forward by `millis` milliseconds.
    pub fn advance_millis(&self, millis: i64) {
        if let Ok(mut current) = self.current.lock() {
            *current += TimeDelta::milliseconds(millis);
        }
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        match self.current.lock() {
            Ok(current) => *current,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }
}

/// Drops sub-millisecond precision.
pub fn truncate_to_millis(time: DateTime<Utc>) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(time.timestamp_millis()).unwrap_or(time)
}

/// Returns `now`, or one millisecond past `previous` when the clock has not
/// moved beyond it.
pub fn next_after(previous: DateTime<Utc>, now: DateTime<Utc>) -> DateTime<Utc> {
    if now > previous {
        now
    } else {
        previous + TimeDelta::milliseconds(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next_after_is_strictly_greater() {
        let t = truncate_to_millis(Utc::now());
        assert!(next_after(t, t) > t);
        assert!(next_after(t, t - TimeDelta::seconds(5)) > t);

        let later = t + TimeDelta::seconds(5);
        assert_eq!(next_after(t, later), later);
    }

    #[test]
    fn manual_clock_advances() {
        let start = DateTime::from_timestamp_millis(1_700_000_000_000).expect("valid timestamp");
        let clock = ManualClock::new(start);
        assert_eq!(clock.now(), start);

        clock.advance_millis(250);
        assert_eq!(clock.now().timestamp_millis(), 1_700_000_000_250);
    }

    #[test]
    fn system_clock_has_millisecond_precision() {
        let now = SystemClock.now();
        assert_eq!(now.timestamp_subsec_nanos() % 1_000_000, 0);
    }
}
