//! # Stream producers.
//!
//! This module provides the [`Producer`] trait plus reference implementations:
//! - [`FetchFn`] - closure-backed producer
//! - [`IterProducer`] - synchronous producer over an `Iterator`
//! - [`StreamProducer`] - async producer over a `futures::Stream` (feature `stream`)
//!
//! ## Quick wiring
//! ```text
//! Subscription ── fetch(n, &emitter) ──► Producer
//!      ▲                                    │
//!      └──── emitter.on_next / on_error / on_complete (any thread, any time)
//! ```

mod fetch_fn;
mod iter;
mod producer;
#[cfg(feature = "stream")]
mod stream;

pub use fetch_fn::FetchFn;
pub use iter::IterProducer;
pub use producer::Producer;
#[cfg(feature = "stream")]
pub use stream::StreamProducer;
