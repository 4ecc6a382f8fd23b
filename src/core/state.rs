//! Observable lifecycle of a subscription.
//!
//! ```text
//! NotStarted ──start──► Active ──cancel / bad request / overflow──► Cancelled
//!      │                   ├────on_complete──────────────────────► Completed
//!      │                   └────on_error─────────────────────────► Errored
//!      └──cancel / bad request / overflow──► Cancelled
//! ```
//! Terminal states are absorbing.

/// Lifecycle state reported by [`Subscription::state`](crate::Subscription::state).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubscriptionState {
    /// Subscribed; demand is banked until `start()`.
    NotStarted,
    /// Demand is being forwarded to the producer.
    Active,
    /// The producer signalled completion.
    Completed,
    /// The producer signalled an error.
    Errored,
    /// Cancelled by the subscriber, or by a protocol violation.
    Cancelled,
}

impl SubscriptionState {
    /// Returns `true` for `Completed`, `Errored` and `Cancelled`.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            SubscriptionState::Completed
                | SubscriptionState::Errored
                | SubscriptionState::Cancelled
        )
    }

    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(self) -> &'static str {
        match self {
            SubscriptionState::NotStarted => "not_started",
            SubscriptionState::Active => "active",
            SubscriptionState::Completed => "completed",
            SubscriptionState::Errored => "errored",
            SubscriptionState::Cancelled => "cancelled",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_states() {
        assert!(!SubscriptionState::NotStarted.is_terminal());
        assert!(!SubscriptionState::Active.is_terminal());
        assert!(SubscriptionState::Completed.is_terminal());
        assert!(SubscriptionState::Errored.is_terminal());
        assert!(SubscriptionState::Cancelled.is_terminal());
    }

    #[test]
    fn test_labels() {
        assert_eq!(SubscriptionState::NotStarted.as_label(), "not_started");
        assert_eq!(SubscriptionState::Cancelled.as_label(), "cancelled");
    }
}
