//! # Per-subscription configuration.
//!
//! Provides [`SubscriptionConfig`], the settings passed to
//! [`Subscription::subscribe`](crate::Subscription::subscribe).
//!
//! ## Start modes
//! - `auto_start = true` → demand drains as soon as the handshake returns
//! - `auto_start = false` → demand is banked until [`Subscription::start`](crate::Subscription::start)

use std::borrow::Cow;

/// Configuration for a single subscription.
///
/// ## Field semantics
/// - `label`: Name attached to every log record of this subscription
/// - `auto_start`: Whether draining begins right after the handshake
///
/// ## Notes
/// All fields are public for flexibility; the `with_*` helpers exist for call-site chaining.
#[derive(Clone, Debug)]
pub struct SubscriptionConfig {
    /// Name used in `tracing` records (`label = ...`).
    pub label: Cow<'static, str>,

    /// Start draining demand immediately after `on_subscribe` returns.
    ///
    /// Set to `false` when the producer must finish some setup first (open a file,
    /// connect a socket). Requests made in the meantime are banked and flushed by
    /// the first `start()` call.
    pub auto_start: bool,
}

impl SubscriptionConfig {
    /// Returns a copy with the given log label.
    #[must_use]
    pub fn with_label(mut self, label: impl Into<Cow<'static, str>>) -> Self {
        self.label = label.into();
        self
    }

    /// Returns a copy that waits for an explicit `start()`.
    #[must_use]
    pub fn deferred(mut self) -> Self {
        self.auto_start = false;
        self
    }
}

impl Default for SubscriptionConfig {
    /// Default configuration:
    ///
    /// - `label = "subscription"`
    /// - `auto_start = true`
    fn default() -> Self {
        Self {
            label: Cow::Borrowed("subscription"),
            auto_start: true,
        }
    }
}
