//! Deferred callbacks against a value that may not exist yet.

use std::fmt;
use std::mem;

/// Lifecycle of the value a queue is waiting on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadyState {
    Loading,
    Ready,
}

enum QueueState<T> {
    Loading(Vec<Box<dyn FnOnce(&T)>>),
    Ready(T),
}

/// A one-shot gate between producers of a value and callbacks that need it.
///
/// Callbacks registered while loading are queued. [`complete`] publishes
/// the value and drains the queue in registration order; from then on new
/// callbacks run synchronously. Completion happens at most once, so every
/// callback observes the same value exactly once.
///
/// [`complete`]: ReadyQueue::complete
pub struct ReadyQueue<T> {
    state: QueueState<T>,
}

impl<T> ReadyQueue<T> {
    pub fn new() -> Self {
        Self {
            state: QueueState::Loading(Vec::new()),
        }
    }

    pub fn state(&self) -> ReadyState {
        match self.state {
            QueueState::Loading(_) => ReadyState::Loading,
            QueueState::Ready(_) => ReadyState::Ready,
        }
    }

    /// Runs `callback` now if the value is published, otherwise queues it.
    pub fn ready(&mut self, callback: impl FnOnce(&T) + 'static) {
        match &mut self.state {
            QueueState::Loading(pending) => pending.push(Box::new(callback)),
            QueueState::Ready(value) => callback(value),
        }
    }

    /// Publishes the value and drains queued callbacks in order.
    ///
    /// A second completion is ignored; the first value wins.
    pub fn complete(&mut self, value: T) {
        let QueueState::Loading(_) = self.state else {
            return;
        };
        let QueueState::Loading(pending) = mem::replace(&mut self.state, QueueState::Ready(value))
        else {
            return;
        };
        let QueueState::Ready(value) = &self.state else {
            return;
        };
        for callback in pending {
            callback(value);
        }
    }

    /// The published value, once complete.
    pub fn value(&self) -> Option<&T> {
        match &self.state {
            QueueState::Loading(_) => None,
            QueueState::Ready(value) => Some(value),
        }
    }
}

impl<T> Default for ReadyQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: fmt::Debug> fmt::Debug for ReadyQueue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.state {
            QueueState::Loading(pending) => f
                .debug_struct("ReadyQueue")
                .field("state", &ReadyState::Loading)
                .field("pending", &pending.len())
                .finish(),
            QueueState::Ready(value) => f
                .debug_struct("ReadyQueue")
                .field("state", &ReadyState::Ready)
                .field("value", value)
                .finish(),
        }
    }
}
