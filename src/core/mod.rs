//! Subscription core: demand accounting, signal queueing and the two drain loops.
//!
//! The public API from this module is [`Subscription`], its producer-side
//! [`Emitter`] and the observable [`SubscriptionState`].
//!
//! Internal modules:
//! - [`demand`]: offset-based outstanding-demand counter with overflow detection;
//! - [`signals`]: lock-free queue of items plus the terminal error/completion slots;
//! - [`flag`]: try-enter guard shared by both drain loops;
//! - [`subscription`]: the mediator itself.

mod demand;
mod emitter;
mod flag;
mod signals;
mod state;
mod subscription;

pub use emitter::Emitter;
pub use state::SubscriptionState;
pub use subscription::Subscription;
