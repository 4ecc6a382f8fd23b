//! Try-enter guard for the two drain loops.
//!
//! ```text
//! acquire(flag) ── CAS false→true ──► Some(guard)   (this thread drains)
//!               └─ already true ────► None          (active drainer will see our work)
//! drop(guard)   ── store false
//! ```
//!
//! The flag is released on unwind too, so a panicking callback does not wedge the loop.

use std::sync::atomic::{AtomicBool, Ordering};

pub(crate) struct FlagGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> FlagGuard<'a> {
    /// Claims the flag, or returns `None` if another thread holds it.
    pub(crate) fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .ok()
            .map(|_| Self { flag })
    }

    /// Adopts a flag that was initialised to `true` by its owner.
    pub(crate) fn adopt(flag: &'a AtomicBool) -> Self {
        debug_assert!(flag.load(Ordering::SeqCst), "adopted flag must already be held");
        Self { flag }
    }
}

impl Drop for FlagGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::SeqCst);
    }
}
