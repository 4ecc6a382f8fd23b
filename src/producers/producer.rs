//! # Upstream producer trait.
//!
//! A [`Producer`] is asked for items through [`Producer::fetch`] and answers by
//! calling the [`Emitter`] it is handed, on the same thread or any other, now or later.
//!
//! ## Contract
//! - `fetch(n)` asks for **up to** `n` more items. Emitting fewer is fine; emitting
//!   more than the total requested so far breaks backpressure.
//! - `fetch` may be called again before earlier calls have delivered everything.
//! - `fetch` calls never overlap each other; they may overlap `on_cancel`.
//! - `on_cancel` runs at most once, synchronously, on the cancelling thread; it must
//!   not block. Emitter calls after cancellation are ignored, so the hook only has to
//!   release resources.
//! - An `Emitter` method returning `false` means the subscription is stopped.

use crate::core::Emitter;

/// Source side of a subscription.
pub trait Producer<T>: Send + Sync + 'static {
    /// Supply up to `n` (`n >= 1`) further items through `emitter`.
    fn fetch(&self, n: u64, emitter: &Emitter<T>);

    /// Release resources after cancellation. No-op by default.
    fn on_cancel(&self) {}
}
