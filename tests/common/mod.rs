#![allow(dead_code)]

use demandflow::{StreamError, Subscriber, Subscription};
use tokio::sync::mpsc;

#[derive(Debug, Clone, PartialEq)]
pub enum Seen<T> {
    Next(T),
    Error(&'static str),
    Complete,
}

/// Forwards every signal to a channel.
///
/// Requests `initial` items on subscribe, then another `batch` whenever `batch`
/// items have arrived (`batch == 0` never re-requests). Cancels after
/// `cancel_after` items if set.
pub struct Forward<T> {
    tx: mpsc::UnboundedSender<Seen<T>>,
    initial: i64,
    batch: i64,
    cancel_after: Option<usize>,
    received: usize,
    sub: Option<Subscription<T>>,
}

impl<T: Send + 'static> Forward<T> {
    pub fn new(initial: i64) -> (Self, mpsc::UnboundedReceiver<Seen<T>>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let fwd = Self {
            tx,
            initial,
            batch: 0,
            cancel_after: None,
            received: 0,
            sub: None,
        };
        (fwd, rx)
    }

    pub fn batch(mut self, batch: i64) -> Self {
        self.batch = batch;
        self
    }

    pub fn cancel_after(mut self, items: usize) -> Self {
        self.cancel_after = Some(items);
        self
    }
}

impl<T: Send + 'static> Subscriber<T> for Forward<T> {
    fn on_subscribe(&mut self, subscription: Subscription<T>) {
        if self.initial != 0 {
            subscription.request(self.initial);
        }
        self.sub = Some(subscription);
    }

    fn on_next(&mut self, item: T) {
        let _ = self.tx.send(Seen::Next(item));
        self.received += 1;

        let Some(sub) = &self.sub else { return };
        if self.cancel_after == Some(self.received) {
            sub.cancel();
            return;
        }
        if self.batch > 0 && self.received as i64 % self.batch == 0 {
            sub.request(self.batch);
        }
    }

    fn on_error(&mut self, error: StreamError) {
        let _ = self.tx.send(Seen::Error(error.as_label()));
    }

    fn on_complete(&mut self) {
        let _ = self.tx.send(Seen::Complete);
    }

    fn name(&self) -> &'static str {
        "forward"
    }
}

/// Collects everything currently in the channel.
pub fn drain_now<T>(rx: &mut mpsc::UnboundedReceiver<Seen<T>>) -> Vec<Seen<T>> {
    let mut out = Vec::new();
    while let Ok(seen) = rx.try_recv() {
        out.push(seen);
    }
    out
}
