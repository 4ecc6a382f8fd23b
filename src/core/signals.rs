//! # Pending signals awaiting delivery.
//!
//! Producers push into [`Signals`] from any thread; only the thread holding the
//! delivery flag drains it.
//!
//! ## Rules
//! - Items are kept in push order (unbounded lock-free queue)
//! - At most one error is ever stored; callers gate `record_error` behind their own CAS
//! - Completion is a sticky marker

use std::sync::atomic::{AtomicBool, Ordering};

use crossbeam::atomic::AtomicCell;
use crossbeam::queue::SegQueue;

use crate::error::StreamError;

pub(crate) struct Signals<T> {
    items: SegQueue<T>,
    error: AtomicCell<Option<Box<StreamError>>>,
    errored: AtomicBool,
    complete: AtomicBool,
}

impl<T> Signals<T> {
    pub(crate) fn new() -> Self {
        Self {
            items: SegQueue::new(),
            error: AtomicCell::new(None),
            errored: AtomicBool::new(false),
            complete: AtomicBool::new(false),
        }
    }

    pub(crate) fn push(&self, item: T) {
        self.items.push(item);
    }

    pub(crate) fn pop(&self) -> Option<T> {
        self.items.pop()
    }

    /// Stores the terminal error. The slot is written before the flag is raised.
    pub(crate) fn record_error(&self, error: StreamError) {
        self.error.store(Some(Box::new(error)));
        self.errored.store(true, Ordering::SeqCst);
    }

    /// Removes the recorded error, if one is waiting.
    pub(crate) fn take_error(&self) -> Option<StreamError> {
        if !self.errored.load(Ordering::SeqCst) {
            return None;
        }
        self.error.take().map(|boxed| *boxed)
    }

    pub(crate) fn mark_complete(&self) {
        self.complete.store(true, Ordering::SeqCst);
    }

    pub(crate) fn is_complete(&self) -> bool {
        self.complete.load(Ordering::SeqCst)
    }

    /// Returns `true` if a drain pass would find something to do.
    pub(crate) fn has_pending(&self) -> bool {
        !self.items.is_empty() || self.is_complete() || self.errored.load(Ordering::SeqCst)
    }

    /// Drops every queued item.
    pub(crate) fn clear(&self) {
        while self.items.pop().is_some() {}
    }
}
