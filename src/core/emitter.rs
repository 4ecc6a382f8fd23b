//! # Producer-facing signal handle.
//!
//! An [`Emitter`] is what a producer uses to push items, an error or completion
//! into a subscription. It holds a weak back-reference: it never keeps the
//! subscription alive, and every call on an emitter whose subscription is gone is
//! a no-op returning `false`.
//!
//! ## Example
//! ```rust
//! use demandflow::{Emitter, FetchFn, Subscriber, Subscription, SubscriptionConfig, StreamError};
//!
//! struct Print;
//! impl Subscriber<u32> for Print {
//!     fn on_subscribe(&mut self, s: Subscription<u32>) { s.request(2); }
//!     fn on_next(&mut self, item: u32) { println!("{item}"); }
//!     fn on_error(&mut self, _e: StreamError) {}
//!     fn on_complete(&mut self) {}
//! }
//!
//! let producer = FetchFn::new(|n: u64, emitter: &Emitter<u32>| {
//!     for i in 0..n as u32 {
//!         if !emitter.on_next(i) {
//!             return;
//!         }
//!     }
//! });
//! let sub = Subscription::subscribe(producer, Print, SubscriptionConfig::default());
//! assert!(!sub.is_stopped());
//! ```

use std::fmt;
use std::sync::Weak;

use crate::core::subscription::Inner;
use crate::error::StreamError;

/// Cloneable, thread-safe entry point for producer signals.
pub struct Emitter<T> {
    inner: Weak<Inner<T>>,
}

impl<T> Emitter<T> {
    pub(crate) fn new(inner: Weak<Inner<T>>) -> Self {
        Self { inner }
    }
}

impl<T: Send + 'static> Emitter<T> {
    /// Queues `item` for delivery.
    ///
    /// Returns `false` (and drops the item) once the subscription is stopped, or when
    /// it stopped while the item was being queued; producers should treat that as a
    /// signal to stop producing. An accepted item is delivered unless an error or a
    /// cancel discards the queue.
    pub fn on_next(&self, item: T) -> bool {
        self.inner
            .upgrade()
            .is_some_and(|inner| inner.on_next(item))
    }

    /// Ends the stream with an error. Only the first terminal signal is accepted.
    pub fn on_error(&self, error: StreamError) -> bool {
        self.inner
            .upgrade()
            .is_some_and(|inner| inner.on_error(error))
    }

    /// Ends the stream normally once queued items are delivered.
    /// Only the first terminal signal is accepted.
    pub fn on_complete(&self) -> bool {
        self.inner
            .upgrade()
            .is_some_and(|inner| inner.on_complete())
    }

    /// Returns `true` if signals would be ignored.
    pub fn is_stopped(&self) -> bool {
        self.inner.upgrade().map_or(true, |inner| inner.is_stopped())
    }
}

impl<T> Clone for Emitter<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Weak::clone(&self.inner),
        }
    }
}

impl<T> fmt::Debug for Emitter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Emitter")
            .field("attached", &(self.inner.strong_count() > 0))
            .finish()
    }
}
