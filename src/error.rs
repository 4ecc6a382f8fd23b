//! Error types delivered to subscribers as terminal signals.
//!
//! [`StreamError`] covers the three ways a subscription can fail:
//!
//! - [`StreamError::NonPositiveRequest`]: the subscriber broke the request protocol.
//! - [`StreamError::DemandOverflow`]: outstanding demand would exceed `i64::MAX`.
//! - [`StreamError::Producer`]: the producer reported a failure of its own.
//!
//! Like the rest of the crate's errors it provides helper methods (`as_label`, `as_message`)
//! for logging.

use std::error::Error as StdError;
use std::sync::Arc;

use thiserror::Error;

/// Shared, type-erased producer failure.
pub type BoxError = Arc<dyn StdError + Send + Sync + 'static>;

/// # Terminal errors of a subscription.
///
/// Every variant ends the subscription: once delivered, no further signal follows.
/// The type is cheap to clone (producer failures are shared behind an `Arc`).
#[non_exhaustive]
#[derive(Error, Debug, Clone)]
pub enum StreamError {
    /// `request(n)` was called with `n <= 0`.
    #[error("request amount must be positive, got {requested}")]
    NonPositiveRequest {
        /// The rejected amount.
        requested: i64,
    },

    /// Accumulated demand would exceed `i64::MAX`.
    #[error("outstanding demand {outstanding} plus {requested} exceeds {max}", max = i64::MAX)]
    DemandOverflow {
        /// Demand still outstanding when the request arrived.
        outstanding: i64,
        /// The request that would have overflowed.
        requested: i64,
    },

    /// The producer signalled a failure.
    #[error("producer failed: {source}")]
    Producer {
        /// The underlying producer error.
        #[source]
        source: BoxError,
    },
}

impl StreamError {
    /// Wraps a producer error.
    ///
    /// # Example
    /// ```
    /// use demandflow::StreamError;
    ///
    /// let io = std::io::Error::new(std::io::ErrorKind::Other, "disk gone");
    /// let err = StreamError::producer(io);
    /// assert_eq!(err.as_label(), "stream_producer_failed");
    /// ```
    pub fn producer<E>(error: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        StreamError::Producer {
            source: Arc::new(error),
        }
    }

    /// Builds a producer error from a plain message.
    pub fn message(msg: impl Into<String>) -> Self {
        let boxed: Box<dyn StdError + Send + Sync> = msg.into().into();
        StreamError::Producer {
            source: Arc::from(boxed),
        }
    }

    /// Returns a short stable label (snake_case) for use in logs.
    ///
    /// # Example
    /// ```
    /// use demandflow::StreamError;
    ///
    /// let err = StreamError::NonPositiveRequest { requested: 0 };
    /// assert_eq!(err.as_label(), "stream_non_positive_request");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            StreamError::NonPositiveRequest { .. } => "stream_non_positive_request",
            StreamError::DemandOverflow { .. } => "stream_demand_overflow",
            StreamError::Producer { .. } => "stream_producer_failed",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            StreamError::NonPositiveRequest { requested } => {
                format!("non-positive request: {requested}")
            }
            StreamError::DemandOverflow {
                outstanding,
                requested,
            } => format!("demand overflow: outstanding={outstanding} requested={requested}"),
            StreamError::Producer { source } => format!("producer: {source}"),
        }
    }

    /// Indicates whether the subscriber caused this error by misusing the subscription.
    ///
    /// Returns `true` for [`StreamError::NonPositiveRequest`] and
    /// [`StreamError::DemandOverflow`], `false` for producer failures.
    pub fn is_protocol_violation(&self) -> bool {
        matches!(
            self,
            StreamError::NonPositiveRequest { .. } | StreamError::DemandOverflow { .. }
        )
    }
}
