//! # Demand-mediating subscription.
//!
//! [`Subscription`] sits between one [`Producer`] and one [`Subscriber`] and
//! enforces pull-based backpressure without locks that are ever waited on.
//!
//! ## Architecture
//! ```text
//! Subscriber ── request(n) ──► Demand (CAS accumulate, overflow check)
//!                                  │
//!                                  ▼
//!                       drain_requests()   [draining_requests flag]
//!                                  │ take() → fetch(n, &emitter)
//!                                  ▼
//! Producer ── on_next / on_error / on_complete ──► Signals (lock-free queue)
//!                                                      │
//!                                                      ▼
//!                                    drain()   [delivering flag]
//!                                                      │ one callback at a time
//!                                                      ▼
//!                                    Subscriber::on_next / on_error / on_complete
//! ```
//!
//! ## Drain loops
//! Both loops follow the same protocol:
//! 1. try to claim the flag; if another thread holds it, return (it will see our work)
//! 2. process everything pending
//! 3. release the flag, then re-check for work that raced the release and loop
//!
//! All callbacks run synchronously on whichever thread currently holds the flag.
//! Because the two loops use independent flags, a subscriber may call `request()` or
//! `cancel()` from inside its own callbacks.
//!
//! ## Rules
//! - **Serial delivery**: the subscriber never sees two callbacks at once
//! - **Order**: items arrive in the order they were emitted
//! - **Error preempts**: a recorded error is delivered instead of still-queued items
//! - **Completion waits**: completion is delivered only after the queue is empty
//! - **First terminal wins**: exactly one of error / completion / cancellation ends the stream
//! - **Cancel is final**: nothing reaches the subscriber after `cancel()` except the error
//!   that a protocol violation reports, and at most one item that another thread was
//!   already delivering when the cancel landed
//!
//! All flag and counter accesses are `SeqCst`: the post-release re-check must observe
//! any work published before a competing thread's failed claim.

use std::borrow::Cow;
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use tracing::{debug, trace};

use crate::config::SubscriptionConfig;
use crate::core::demand::Demand;
use crate::core::emitter::Emitter;
use crate::core::flag::FlagGuard;
use crate::core::signals::Signals;
use crate::core::state::SubscriptionState;
use crate::error::StreamError;
use crate::producers::Producer;
use crate::subscribers::Subscriber;

const RUNNING: u8 = 0;
const COMPLETED: u8 = 1;
const ERRORED: u8 = 2;
const CANCELLED: u8 = 3;

/// Shared state behind every [`Subscription`] and [`Emitter`] handle.
pub(crate) struct Inner<T> {
    label: Cow<'static, str>,
    subscriber_name: &'static str,

    producer: Box<dyn Producer<T>>,
    /// Only locked by the thread holding `delivering`, so never contended.
    subscriber: Mutex<Option<Box<dyn Subscriber<T>>>>,
    emitter: Emitter<T>,

    demand: Demand,
    signals: Signals<T>,

    started: AtomicBool,
    /// First terminal transition wins (`RUNNING` → one of the others).
    terminal: AtomicU8,
    /// Set by every `cancel()`, including one that lost the race to a natural end.
    cancelled: AtomicBool,
    /// The subscriber has been dropped; nothing more will be delivered.
    released: AtomicBool,

    draining_requests: AtomicBool,
    delivering: AtomicBool,
}

/// Handle to a live subscription.
///
/// Cloning is cheap (an `Arc`). The subscriber receives one clone in
/// [`Subscriber::on_subscribe`]; the caller of [`Subscription::subscribe`] gets another.
/// The subscription stays alive while any handle exists; it drops its subscriber as
/// soon as a terminal signal has been delivered or cancellation has been observed, so
/// a subscriber that stores its own handle does not leak.
pub struct Subscription<T> {
    inner: Arc<Inner<T>>,
}

impl<T: Send + 'static> Subscription<T> {
    /// Connects `producer` to `subscriber`.
    ///
    /// ### Sequence
    /// 1. `subscriber.on_subscribe(handle)` runs on the calling thread (the handshake
    ///    counts as a delivered signal, so nothing else reaches the subscriber meanwhile)
    /// 2. signals raised during the handshake are delivered
    /// 3. if `config.auto_start`, demand starts draining
    pub fn subscribe<P, S>(producer: P, subscriber: S, config: SubscriptionConfig) -> Self
    where
        P: Producer<T>,
        S: Subscriber<T>,
    {
        let subscriber_name = subscriber.name();
        let subscriber: Box<dyn Subscriber<T>> = Box::new(subscriber);
        let inner = Arc::new_cyclic(|me: &Weak<Inner<T>>| Inner {
            label: config.label,
            subscriber_name,
            producer: Box::new(producer),
            subscriber: Mutex::new(Some(subscriber)),
            emitter: Emitter::new(Weak::clone(me)),
            demand: Demand::new(),
            signals: Signals::new(),
            started: AtomicBool::new(false),
            terminal: AtomicU8::new(RUNNING),
            cancelled: AtomicBool::new(false),
            released: AtomicBool::new(false),
            draining_requests: AtomicBool::new(false),
            // Held until the handshake returns.
            delivering: AtomicBool::new(true),
        });
        let subscription = Subscription { inner };

        debug!(
            label = %subscription.inner.label,
            subscriber = subscription.inner.subscriber_name,
            "subscribed"
        );
        subscription.inner.handshake(subscription.clone());

        if config.auto_start {
            subscription.start();
        }
        subscription
    }

    /// Authorizes the producer to emit `n` more items.
    ///
    /// - `n <= 0` delivers [`StreamError::NonPositiveRequest`] and cancels
    /// - pushing outstanding demand past `i64::MAX` delivers
    ///   [`StreamError::DemandOverflow`] and cancels
    /// - ignored once the subscription is stopped
    ///
    /// Before [`start`](Self::start) the demand is only banked.
    pub fn request(&self, n: i64) {
        self.inner.request(n);
    }

    /// Cancels the subscription. Idempotent, callable from any thread and from inside
    /// subscriber callbacks.
    pub fn cancel(&self) {
        self.inner.cancel_with(None);
    }

    /// Begins forwarding demand to the producer. Idempotent.
    pub fn start(&self) {
        self.inner.start();
    }

    /// Returns a new producer-side handle for push-style sources.
    pub fn emitter(&self) -> Emitter<T> {
        self.inner.emitter.clone()
    }

    /// Returns `true` once cancelled or terminated.
    pub fn is_stopped(&self) -> bool {
        self.inner.is_stopped()
    }

    /// Demand requested but not yet handed to the producer.
    pub fn outstanding(&self) -> i64 {
        self.inner.demand.outstanding()
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SubscriptionState {
        self.inner.state()
    }

    /// Log label from [`SubscriptionConfig::label`].
    pub fn label(&self) -> &str {
        &self.inner.label
    }
}

impl<T> Clone for Subscription<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: Send + 'static> fmt::Debug for Subscription<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("label", &self.inner.label)
            .field("state", &self.state())
            .field("outstanding", &self.outstanding())
            .finish()
    }
}

impl<T: Send + 'static> Inner<T> {
    pub(crate) fn is_stopped(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst) || self.terminal.load(Ordering::SeqCst) != RUNNING
    }

    fn state(&self) -> SubscriptionState {
        match self.terminal.load(Ordering::SeqCst) {
            COMPLETED => SubscriptionState::Completed,
            ERRORED => SubscriptionState::Errored,
            CANCELLED => SubscriptionState::Cancelled,
            _ if self.started.load(Ordering::SeqCst) => SubscriptionState::Active,
            _ => SubscriptionState::NotStarted,
        }
    }

    fn transition(&self, to: u8) -> bool {
        self.terminal
            .compare_exchange(RUNNING, to, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
    }

    fn lock_subscriber(&self) -> MutexGuard<'_, Option<Box<dyn Subscriber<T>>>> {
        self.subscriber
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    // ---- demand side ----

    fn request(&self, n: i64) {
        if self.is_stopped() {
            return;
        }
        if n < 1 {
            debug!(label = %self.label, requested = n, "non-positive request");
            self.cancel_with(Some(StreamError::NonPositiveRequest { requested: n }));
            return;
        }
        if let Err(outstanding) = self.demand.add(n) {
            debug!(label = %self.label, outstanding, requested = n, "demand overflow");
            self.cancel_with(Some(StreamError::DemandOverflow {
                outstanding,
                requested: n,
            }));
            return;
        }
        if self.started.load(Ordering::SeqCst) {
            self.drain_requests();
        }
    }

    fn start(&self) {
        if self
            .started
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
        {
            debug!(label = %self.label, banked = self.demand.outstanding(), "started");
            self.drain_requests();
        }
    }

    fn drain_requests(&self) {
        loop {
            {
                let Some(_draining) = FlagGuard::acquire(&self.draining_requests) else {
                    return;
                };
                let mut n = self.demand.take();
                while n > 0 && !self.is_stopped() {
                    trace!(label = %self.label, n, "fetch");
                    self.producer.fetch(n, &self.emitter);
                    n = self.demand.take();
                }
            }
            // Demand that arrived while we were releasing the flag.
            if self.is_stopped() || !self.demand.is_pending() {
                return;
            }
        }
    }

    /// Ends the subscription by cancellation.
    ///
    /// `error` is reported to the subscriber only if this call is the one that ends
    /// the stream (protocol violations). The producer's cancel hook runs under the
    /// same condition, so it runs at most once.
    fn cancel_with(&self, error: Option<StreamError>) {
        let ended = self.transition(CANCELLED);
        if ended {
            if let Some(error) = error {
                self.signals.record_error(error);
            }
        }
        self.cancelled.store(true, Ordering::SeqCst);

        if ended {
            debug!(label = %self.label, "cancelled");
            self.producer.on_cancel();
        }
        self.drain();
    }

    // ---- signal side ----

    pub(crate) fn on_next(&self, item: T) -> bool {
        if self.is_stopped() {
            return false;
        }
        self.signals.push(item);
        self.drain();

        // The stream ended between the check and the push; nobody will drain this item.
        if self.released.load(Ordering::SeqCst) {
            self.signals.clear();
            return false;
        }
        true
    }

    pub(crate) fn on_error(&self, error: StreamError) -> bool {
        if !self.transition(ERRORED) {
            return false;
        }
        debug!(label = %self.label, error = %error, "producer error");
        self.signals.record_error(error);
        self.drain();
        true
    }

    pub(crate) fn on_complete(&self) -> bool {
        if !self.transition(COMPLETED) {
            return false;
        }
        debug!(label = %self.label, "producer complete");
        self.signals.mark_complete();
        self.drain();
        true
    }

    fn handshake(&self, subscription: Subscription<T>) {
        {
            let _delivering = FlagGuard::adopt(&self.delivering);
            let mut slot = self.lock_subscriber();
            if let Some(subscriber) = slot.as_mut() {
                subscriber.on_subscribe(subscription);
            }
        }
        self.drain();
    }

    fn drain(&self) {
        loop {
            {
                let Some(_delivering) = FlagGuard::acquire(&self.delivering) else {
                    return;
                };
                self.deliver_pending();
            }
            // Signals that arrived while we were releasing the flag.
            if self.released.load(Ordering::SeqCst)
                || !(self.signals.has_pending() || self.cancelled.load(Ordering::SeqCst))
            {
                return;
            }
        }
    }

    /// Delivers everything currently queued. Caller holds `delivering`.
    fn deliver_pending(&self) {
        let mut slot = self.lock_subscriber();
        let Some(subscriber) = slot.as_mut() else {
            return;
        };

        let finished = loop {
            let cancelled = self.cancelled.load(Ordering::SeqCst);
            if let Some(error) = self.signals.take_error() {
                // A producer error that lost to a cancel is swallowed.
                if !cancelled || self.terminal.load(Ordering::SeqCst) == CANCELLED {
                    debug!(label = %self.label, error = error.as_label(), "delivering error");
                    subscriber.on_error(error);
                }
                break true;
            }
            if cancelled {
                break true;
            }

            // Read before polling: every item emitted ahead of completion is then visible.
            let complete = self.signals.is_complete();
            match self.signals.pop() {
                Some(item) => subscriber.on_next(item),
                None if complete => {
                    debug!(label = %self.label, "delivering completion");
                    subscriber.on_complete();
                    break true;
                }
                None => break false,
            }
        };

        if finished {
            let released = slot.take();
            self.released.store(true, Ordering::SeqCst);
            drop(slot);
            self.signals.clear();
            trace!(label = %self.label, "subscriber released");
            drop(released);
        }
    }
}
