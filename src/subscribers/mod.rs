//! # Stream consumers.
//!
//! This module provides the [`Subscriber`] trait implemented by downstream code.
//!
//! ## Architecture
//! ```text
//! Subscription::subscribe(producer, subscriber, cfg)
//!        │
//!        ├──► subscriber.on_subscribe(handle)        (handshake)
//!        │
//!        └──► delivery drain loop ──► subscriber.on_next(item)
//!                                      subscriber.on_next(item)
//!                                      ...
//!                                      subscriber.on_complete() | on_error(e)
//! ```

mod subscriber;

pub use subscriber::Subscriber;
