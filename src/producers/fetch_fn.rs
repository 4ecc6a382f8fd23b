//! # Function-backed producer (`FetchFn`)
//!
//! [`FetchFn`] wraps a closure `F: Fn(u64, &Emitter<T>)` that is invoked for every
//! fetch, with an optional second closure for the cancel hook.
//!
//! ## Concurrency semantics
//! - Fetches never overlap, but may come from different threads: the closure must be
//!   `Send + Sync` and any state it carries needs its own synchronisation (`Arc<...>`).
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicU64, Ordering};
//! use demandflow::{Emitter, FetchFn};
//!
//! let next = Arc::new(AtomicU64::new(0));
//! let counter = FetchFn::new(move |n: u64, emitter: &Emitter<u64>| {
//!     for _ in 0..n {
//!         if !emitter.on_next(next.fetch_add(1, Ordering::SeqCst)) {
//!             return;
//!         }
//!     }
//! })
//! .with_cancel(|| println!("counter cancelled"));
//! # let _ = counter;
//! ```

use std::fmt;

use crate::core::Emitter;
use crate::producers::Producer;

type CancelHook = Box<dyn Fn() + Send + Sync>;

/// Function-backed producer implementation.
pub struct FetchFn<F> {
    fetch: F,
    cancel: Option<CancelHook>,
}

impl<F> FetchFn<F> {
    /// Creates a producer from a fetch closure.
    pub fn new(fetch: F) -> Self {
        Self {
            fetch,
            cancel: None,
        }
    }

    /// Attaches a cancel hook.
    #[must_use]
    pub fn with_cancel(mut self, hook: impl Fn() + Send + Sync + 'static) -> Self {
        self.cancel = Some(Box::new(hook));
        self
    }
}

impl<T, F> Producer<T> for FetchFn<F>
where
    F: Fn(u64, &Emitter<T>) + Send + Sync + 'static,
{
    fn fetch(&self, n: u64, emitter: &Emitter<T>) {
        (self.fetch)(n, emitter);
    }

    fn on_cancel(&self) {
        if let Some(hook) = &self.cancel {
            hook();
        }
    }
}

impl<F> fmt::Debug for FetchFn<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FetchFn")
            .field("has_cancel_hook", &self.cancel.is_some())
            .finish()
    }
}
