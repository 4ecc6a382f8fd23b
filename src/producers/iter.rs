//! # Iterator-backed producer.
//!
//! [`IterProducer`] emits items of an [`Iterator`] synchronously, on the thread that
//! issues the fetch, and completes as soon as the iterator is exhausted.
//!
//! ## Rules
//! - `fetch(n)` emits at most `n` items
//! - Completion is emitted in the same fetch that yields the last item (one-item look-ahead)
//! - Emission stops as soon as the subscription reports it is stopped
//!
//! ## Example
//! ```rust
//! use demandflow::{IterProducer, StreamError, Subscriber, Subscription, SubscriptionConfig};
//!
//! struct Collect(Vec<char>);
//! impl Subscriber<char> for Collect {
//!     fn on_subscribe(&mut self, s: Subscription<char>) { s.request(i64::MAX); }
//!     fn on_next(&mut self, c: char) { self.0.push(c); }
//!     fn on_error(&mut self, _: StreamError) {}
//!     fn on_complete(&mut self) { assert_eq!(self.0, ['a', 'b', 'c']); }
//! }
//!
//! let sub = Subscription::subscribe(
//!     IterProducer::new("abc".chars()),
//!     Collect(Vec::new()),
//!     SubscriptionConfig::default(),
//! );
//! assert!(sub.is_stopped());
//! ```

use std::iter::Peekable;
use std::sync::{Mutex, PoisonError};

use crate::core::Emitter;
use crate::producers::Producer;

/// Producer over any `Send` iterator.
pub struct IterProducer<I: Iterator> {
    // Fetches never overlap, so this lock is never contended.
    iter: Mutex<Peekable<I>>,
}

impl<I: Iterator> IterProducer<I> {
    /// Wraps anything iterable.
    pub fn new(iter: impl IntoIterator<IntoIter = I>) -> Self {
        Self {
            iter: Mutex::new(iter.into_iter().peekable()),
        }
    }
}

impl<I> Producer<I::Item> for IterProducer<I>
where
    I: Iterator + Send + 'static,
    I::Item: Send + 'static,
{
    fn fetch(&self, n: u64, emitter: &Emitter<I::Item>) {
        let mut iter = self.iter.lock().unwrap_or_else(PoisonError::into_inner);

        for _ in 0..n {
            match iter.next() {
                Some(item) => {
                    if !emitter.on_next(item) {
                        return;
                    }
                }
                None => break,
            }
        }
        if iter.peek().is_none() {
            emitter.on_complete();
        }
    }
}
