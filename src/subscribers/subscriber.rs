//! # Downstream consumer trait.
//!
//! Provides [`Subscriber`], the extension point for code that consumes a stream
//! through a [`Subscription`].
//!
//! ## Signal grammar
//! ```text
//! on_subscribe  on_next*  (on_error | on_complete)?
//! ```
//!
//! ## Rules
//! - Exactly one `on_subscribe`, always first.
//! - Callbacks are never concurrent; each runs on whichever thread is delivering.
//! - At most one terminal callback, and nothing after it.
//! - Calling `request` / `cancel` on the handle from inside a callback is allowed.
//! - After `cancel()` nothing more arrives (not even a terminal callback) unless the
//!   cancel was caused by a bad request, in which case the error is delivered.
//!   When `cancel()` runs on a different thread than the one delivering, at most one
//!   item that was already being handed over may still arrive after it returns.
//!   Cancelling from inside a callback takes effect before the next one.
//! - Callbacks must not panic; a panic propagates to the delivering thread.
//!
//! ## Example
//! ```rust
//! use demandflow::{StreamError, Subscriber, Subscription};
//!
//! /// Pulls one item at a time and sums them.
//! #[derive(Default)]
//! struct Sum {
//!     sub: Option<Subscription<u64>>,
//!     total: u64,
//! }
//!
//! impl Subscriber<u64> for Sum {
//!     fn on_subscribe(&mut self, subscription: Subscription<u64>) {
//!         subscription.request(1);
//!         self.sub = Some(subscription);
//!     }
//!
//!     fn on_next(&mut self, item: u64) {
//!         self.total += item;
//!         if let Some(sub) = &self.sub {
//!             sub.request(1);
//!         }
//!     }
//!
//!     fn on_error(&mut self, error: StreamError) {
//!         eprintln!("failed: {error}");
//!     }
//!
//!     fn on_complete(&mut self) {
//!         println!("total={}", self.total);
//!     }
//!
//!     fn name(&self) -> &'static str { "sum" }
//! }
//! ```

use crate::core::Subscription;
use crate::error::StreamError;

/// Contract for stream consumers.
///
/// Methods take `&mut self`: the subscription guarantees serial delivery, so
/// implementations need no interior synchronisation of their own. The subscriber
/// is dropped once the stream has ended or been cancelled.
pub trait Subscriber<T>: Send + 'static {
    /// Handshake carrying the request/cancel handle. Delivered exactly once, first.
    fn on_subscribe(&mut self, subscription: Subscription<T>);

    /// Next item; never more than the demand requested so far.
    fn on_next(&mut self, item: T);

    /// Terminal failure.
    fn on_error(&mut self, error: StreamError);

    /// Terminal success.
    fn on_complete(&mut self);

    /// Human-readable name (for logs).
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}
