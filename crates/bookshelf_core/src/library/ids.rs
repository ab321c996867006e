use chrono::Utc;
use core::sync::atomic::{AtomicI64, Ordering};

/// Hands out book ids derived from the wall clock in milliseconds.
///
/// Ids are strictly increasing for one generator even if the clock stalls or steps back, and never
/// lower than the floor passed in by the caller.
#[derive(Debug, Default)]
pub struct IdGenerator {
    last: AtomicI64,
}

impl IdGenerator {
    #[must_use]
    #[inline]
    pub const fn new() -> Self {
        Self {
            last: AtomicI64::new(0),
        }
    }

    /// Returns a fresh id that is at least `floor`, or `None` once this generator has handed out
    /// `i64::MAX`.
    #[must_use]
    #[inline]
    pub fn next_id(&self, floor: i64) -> Option<i64> {
        self.next_id_at(Utc::now().timestamp_millis(), floor)
    }

    fn next_id_at(&self, now: i64, floor: i64) -> Option<i64> {
        let mut prev = self.last.load(Ordering::Acquire);
        loop {
            let candidate = now.max(prev.checked_add(1)?).max(floor);
            match self
                .last
                .compare_exchange_weak(prev, candidate, Ordering::AcqRel, Ordering::Acquire)
            {
                Ok(_) => return Some(candidate),
                Err(actual) => prev = actual,
            }
        }
    }
}
