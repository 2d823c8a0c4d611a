use std::sync::atomic::{AtomicI64, Ordering};

use chrono::{DateTime, Utc};

/// Strictly increasing microsecond timestamps.
///
/// Every `created_at` and `last_read_at` comes from here, so a message is
/// unread exactly when it was written after the last read marker, even when
/// both land within the same wall-clock microsecond.
pub struct Clock {
    last: AtomicI64,
}

impl Clock {
    pub fn new() -> Self {
        Self::starting_after(0)
    }

    /// Resume after the newest timestamp already persisted, which keeps the
    /// ordering intact if the wall clock stepped backwards across a restart.
    pub fn starting_after(last: i64) -> Self {
        Self {
            last: AtomicI64::new(last),
        }
    }

    pub fn next(&self) -> i64 {
        let now = Utc::now().timestamp_micros();
        let mut prev = self.last.load(Ordering::Relaxed);
        loop {
            let candidate = now.max(prev + 1);
            match self.last.compare_exchange_weak(
                prev,
                candidate,
                Ordering::AcqRel,
                Ordering::Relaxed,
            ) {
                Ok(_) => return candidate,
                Err(actual) => prev = actual,
            }
        }
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::new()
    }
}

/// Convert a stored timestamp back into a UTC datetime.
pub fn to_datetime(micros: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp_micros(micros)
}
