//! # Outstanding-demand accumulator.
//!
//! Demand is stored with an offset of `i64::MIN`, so the raw counter sits at
//! `i64::MIN` when nothing is outstanding and climbs toward `-1` as requests
//! accumulate:
//!
//! ```text
//! raw:          i64::MIN ............................ -1 | 0 ...
//! outstanding:  0 ................................ MAX   | overflow
//! ```
//!
//! ## Rules
//! - `add` is a CAS loop with checked arithmetic; a rejected add leaves the counter untouched
//! - A total of exactly `i64::MAX` is accepted, one more is an overflow
//! - `take` swaps the counter back to the baseline and returns what was outstanding

use std::sync::atomic::{AtomicI64, Ordering};

const BASELINE: i64 = i64::MIN;

/// Lock-free counter of requested-but-not-yet-fetched items.
#[derive(Debug)]
pub(crate) struct Demand {
    raw: AtomicI64,
}

impl Demand {
    /// Creates an accumulator with nothing outstanding.
    pub(crate) const fn new() -> Self {
        Self {
            raw: AtomicI64::new(BASELINE),
        }
    }

    /// Adds `n` (`n >= 1`) to the outstanding demand.
    ///
    /// Returns `Err(outstanding)` without modifying the counter when the sum would
    /// exceed `i64::MAX`.
    pub(crate) fn add(&self, n: i64) -> Result<(), i64> {
        debug_assert!(n > 0, "demand increments are positive");

        let mut current = self.raw.load(Ordering::SeqCst);
        loop {
            let outstanding = current.wrapping_sub(BASELINE);
            if outstanding.checked_add(n).is_none() {
                return Err(outstanding);
            }
            // current + n <= -1 here, so no wrap.
            match self.raw.compare_exchange_weak(
                current,
                current + n,
                Ordering::SeqCst,
                Ordering::SeqCst,
            ) {
                Ok(_) => return Ok(()),
                Err(actual) => current = actual,
            }
        }
    }

    /// Resets the counter and returns everything that was outstanding.
    pub(crate) fn take(&self) -> u64 {
        // raw is always in [i64::MIN, -1], so the difference fits in [0, i64::MAX].
        self.raw.swap(BASELINE, Ordering::SeqCst).wrapping_sub(BASELINE) as u64
    }

    /// Current outstanding demand (racy snapshot).
    pub(crate) fn outstanding(&self) -> i64 {
        self.raw.load(Ordering::SeqCst).wrapping_sub(BASELINE)
    }

    /// Returns `true` if any demand is waiting to be taken.
    pub(crate) fn is_pending(&self) -> bool {
        self.raw.load(Ordering::SeqCst) != BASELINE
    }
}
