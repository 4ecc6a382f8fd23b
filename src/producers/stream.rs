//! # Async stream producer.
//!
//! [`StreamProducer`] adapts a [`futures::Stream`] of `Result<T, E>` to the fetch
//! contract. A single pump task, spawned on the current tokio runtime, pulls items
//! and emits them from the runtime's worker threads.
//!
//! ## Architecture
//! ```text
//! fetch(n) ──► [unbounded pull queue] ──► pump task ──► stream.next() × n ──► emitter.on_next
//!                                              │
//!                                              ├─ Err(e) ──► emitter.on_error
//!                                              ├─ None   ──► emitter.on_complete
//!                                              └─ token cancelled ──► exit
//! ```
//!
//! ## Rules
//! - Pulls are served in fetch order; items are emitted in stream order
//! - After serving a pull the pump peeks one item ahead, so completion is signalled
//!   without waiting for another fetch
//! - `on_cancel` trips the [`CancellationToken`]; an in-flight `next()` is abandoned
//! - Dropping the producer (when the subscription is released) also stops the pump

use std::convert::Infallible;
use std::error::Error as StdError;
use std::fmt;

use futures::{Stream, StreamExt};
use tokio::sync::mpsc;
use tokio_util::sync::{CancellationToken, DropGuard};
use tracing::trace;

use crate::core::Emitter;
use crate::error::StreamError;
use crate::producers::Producer;

/// One fetch request handed to the pump.
struct Pull<T> {
    n: u64,
    emitter: Emitter<T>,
}

/// Producer driven by a tokio task.
pub struct StreamProducer<T> {
    pulls: mpsc::UnboundedSender<Pull<T>>,
    token: CancellationToken,
    _stop_on_drop: DropGuard,
}

impl<T: Send + 'static> StreamProducer<T> {
    /// Spawns the pump for a fallible stream.
    ///
    /// # Panics
    /// Panics if called outside a tokio runtime.
    pub fn new<S, E>(stream: S) -> Self
    where
        S: Stream<Item = Result<T, E>> + Send + 'static,
        E: StdError + Send + Sync + 'static,
    {
        let (tx, rx) = mpsc::unbounded_channel();
        let token = CancellationToken::new();
        tokio::spawn(pump(stream, rx, token.clone()));

        Self {
            pulls: tx,
            _stop_on_drop: token.clone().drop_guard(),
            token,
        }
    }

    /// Spawns the pump for a stream that cannot fail.
    ///
    /// # Panics
    /// Panics if called outside a tokio runtime.
    pub fn infallible<S>(stream: S) -> Self
    where
        S: Stream<Item = T> + Send + 'static,
    {
        Self::new(stream.map(Ok::<T, Infallible>))
    }
}

impl<T: Send + 'static> Producer<T> for StreamProducer<T> {
    fn fetch(&self, n: u64, emitter: &Emitter<T>) {
        let pull = Pull {
            n,
            emitter: emitter.clone(),
        };
        if self.pulls.send(pull).is_err() {
            trace!(n, "stream pump already finished");
        }
    }

    fn on_cancel(&self) {
        self.token.cancel();
    }
}

impl<T> fmt::Debug for StreamProducer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StreamProducer")
            .field("cancelled", &self.token.is_cancelled())
            .finish()
    }
}

async fn pump<T, S, E>(
    stream: S,
    mut pulls: mpsc::UnboundedReceiver<Pull<T>>,
    token: CancellationToken,
) where
    T: Send + 'static,
    S: Stream<Item = Result<T, E>> + Send + 'static,
    E: StdError + Send + Sync + 'static,
{
    let mut stream = Box::pin(stream.peekable());

    loop {
        let pull = tokio::select! {
            _ = token.cancelled() => return,
            pull = pulls.recv() => match pull {
                Some(pull) => pull,
                None => return,
            },
        };

        for _ in 0..pull.n {
            let next = tokio::select! {
                _ = token.cancelled() => return,
                next = stream.next() => next,
            };
            match next {
                Some(Ok(item)) => {
                    if !pull.emitter.on_next(item) {
                        return;
                    }
                }
                Some(Err(error)) => {
                    pull.emitter.on_error(StreamError::producer(error));
                    return;
                }
                None => {
                    pull.emitter.on_complete();
                    return;
                }
            }
        }

        let exhausted = tokio::select! {
            _ = token.cancelled() => return,
            exhausted = async { stream.as_mut().peek().await.is_none() } => exhausted,
        };
        if exhausted {
            pull.emitter.on_complete();
            return;
        }
    }
}
