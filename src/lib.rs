//! # demandflow
//!
//! **demandflow** is a demand-mediating stream subscription for Rust.
//!
//! A [`Subscription`] sits between exactly one [`Producer`] and one [`Subscriber`]
//! and enforces pull-based backpressure: the producer is only ever asked for as many
//! items as the subscriber has requested, and the subscriber receives signals one at
//! a time, in order, never concurrently. Everything is built on atomics; no thread is
//! spawned and no lock is ever waited on.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!        ┌──────────────┐                               ┌──────────────┐
//!        │  Subscriber  │ ◄───── on_subscribe ───────── │              │
//!        │  (consumer)  │ ── request(n) / cancel() ───► │              │
//!        └──────▲───────┘                               │              │
//!               │ on_next / on_error / on_complete      │ Subscription │
//!               │ (serial, in order)                    │              │
//!        ┌──────┴──────────────────────┐                │  - Demand    │
//!        │ delivery drain loop         │ ◄── Signals ── │  - Signals   │
//!        │ [delivering flag]           │                │  - flags     │
//!        └─────────────────────────────┘                └──────┬───────┘
//!                                                              │ fetch(n, &emitter)
//!                                                              ▼
//!                                                       ┌──────────────┐
//!                                                       │   Producer   │
//!                                                       │  (source)    │
//!                                                       └──────┬───────┘
//!                                                              │ Emitter::on_next / ...
//!                                                              ▼
//!                                                         back to Signals
//! ```
//!
//! ### Lifecycle
//! ```text
//! Subscription::subscribe(producer, subscriber, cfg)
//!   ├─► subscriber.on_subscribe(handle)      requests made here are banked
//!   ├─► start()  (auto_start, or later by the owner)
//!   │
//! loop {
//!   ├─► request(n)
//!   │     ├─ n <= 0          ─► NonPositiveRequest error, cancel
//!   │     ├─ overflow        ─► DemandOverflow error, cancel
//!   │     └─ ok              ─► drain_requests ─► producer.fetch(n)
//!   ├─► producer emits       ─► drain ─► subscriber.on_next(item)
//!   └─ exit conditions:
//!        - producer on_complete ─► queue drained ─► subscriber.on_complete
//!        - producer on_error    ─► subscriber.on_error (queued items dropped)
//!        - cancel()             ─► producer.on_cancel, delivery stops
//! }
//!
//! On exit: the subscriber is dropped, breaking any handle cycle.
//! ```
//!
//! ## Features
//! | Area              | Description                                                      | Key types / traits                           |
//! |-------------------|------------------------------------------------------------------|----------------------------------------------|
//! | **Mediation**     | Demand accounting, serial delivery, cancellation.                | [`Subscription`], [`SubscriptionState`]      |
//! | **Consumers**     | Receive the handshake and the serialized signal stream.          | [`Subscriber`]                               |
//! | **Producers**     | Answer fetches through an emitter.                               | [`Producer`], [`Emitter`], [`FetchFn`]       |
//! | **Sources**       | Ready-made producers over iterators and async streams.           | [`IterProducer`], `StreamProducer`           |
//! | **Errors**        | Typed terminal errors.                                           | [`StreamError`]                              |
//! | **Configuration** | Per-subscription settings.                                       | [`SubscriptionConfig`]                       |
//!
//! ## Optional features
//! - `stream` _(default)_: exports `StreamProducer`, pumping a `futures::Stream` on tokio.
//!
//! ## Example
//! ```rust
//! use std::sync::{Arc, Mutex};
//! use demandflow::{IterProducer, StreamError, Subscriber, Subscription, SubscriptionConfig};
//!
//! /// Requests two items at a time.
//! struct Batches {
//!     sub: Option<Subscription<u32>>,
//!     seen: Arc<Mutex<Vec<u32>>>,
//! }
//!
//! impl Subscriber<u32> for Batches {
//!     fn on_subscribe(&mut self, subscription: Subscription<u32>) {
//!         subscription.request(2);
//!         self.sub = Some(subscription);
//!     }
//!
//!     fn on_next(&mut self, item: u32) {
//!         let mut seen = self.seen.lock().unwrap();
//!         seen.push(item);
//!         if seen.len() % 2 == 0 {
//!             if let Some(sub) = &self.sub {
//!                 sub.request(2);
//!             }
//!         }
//!     }
//!
//!     fn on_error(&mut self, error: StreamError) {
//!         panic!("unexpected: {error}");
//!     }
//!
//!     fn on_complete(&mut self) {}
//! }
//!
//! let seen = Arc::new(Mutex::new(Vec::new()));
//! let sub = Subscription::subscribe(
//!     IterProducer::new(1..=5),
//!     Batches { sub: None, seen: Arc::clone(&seen) },
//!     SubscriptionConfig::default().with_label("numbers"),
//! );
//!
//! assert_eq!(*seen.lock().unwrap(), vec![1, 2, 3, 4, 5]);
//! assert!(sub.state().is_terminal());
//! ```
mod config;
mod core;
mod error;
mod producers;
mod subscribers;

// ---- Public re-exports ----

pub use config::SubscriptionConfig;
pub use crate::core::{Emitter, Subscription, SubscriptionState};
pub use error::{BoxError, StreamError};
pub use producers::{FetchFn, IterProducer, Producer};
pub use subscribers::Subscriber;

// Optional: async producer over `futures::Stream`.
// Enabled by default; disable with `default-features = false`.
#[cfg(feature = "stream")]
pub use producers::StreamProducer;
