use std::{
    collections::VecDeque,
    sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError},
    time::{Duration, Instant},
};

use thiserror::Error;

/// Reasons a receive on a [`MessageQueue`] can come back without a value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RecvError {
    /// Returned by `try_recv` when nothing is queued
    #[error("message queue is empty")]
    Empty,
    /// The deadline passed before a value arrived
    #[error("timed out waiting for a message")]
    Timeout,
    /// The queue was closed and every queued value has been drained
    #[error("message queue is closed")]
    Closed,
}

#[derive(Debug)]
struct State<T> {
    queue: VecDeque<T>,
    closed: bool,
}

/// A blocking FIFO queue handing values from producer threads to consumer threads.
///
/// Each sent value is delivered to exactly one receiver. Values are popped from the front,
/// so a single consumer observes them in the order they were sent.
#[derive(Debug)]
pub struct MessageQueue<T>
where
    T: Send,
{
    state: Mutex<State<T>>,
    available: Condvar,
}

impl<T: Send> MessageQueue<T> {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(State {
                queue: VecDeque::new(),
                closed: false,
            }),
            available: Condvar::new(),
        })
    }

    fn lock(&self) -> MutexGuard<'_, State<T>> {
        // Nothing inside the lock can panic halfway through a mutation
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Queues `value` and wakes one waiting receiver. Never blocks beyond lock contention.
    pub fn send(&self, value: T) {
        let mut state = self.lock();
        state.queue.push_back(value);
        drop(state);
        self.available.notify_one();
    }

    /// Receives an element from queue. If multiple threads are waiting on recv(), the thread chosen is nondeterministic
    pub fn recv(&self) -> Result<T, RecvError> {
        let mut state = self.lock();
        // The purpose of the loop is to handle cases of unlocks where `available` was notified spuriously
        loop {
            if let Some(value) = state.queue.pop_front() {
                return Ok(value);
            }
            if state.closed {
                return Err(RecvError::Closed);
            }
            state = self
                .available
                .wait(state)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }

    /// Like [`recv`](Self::recv), but gives up once `timeout` has elapsed
    pub fn recv_timeout(&self, timeout: Duration) -> Result<T, RecvError> {
        let deadline = Instant::now().checked_add(timeout);
        let mut state = self.lock();
        loop {
            if let Some(value) = state.queue.pop_front() {
                return Ok(value);
            }
            if state.closed {
                return Err(RecvError::Closed);
            }
            let remaining = match deadline {
                Some(deadline) => deadline.saturating_duration_since(Instant::now()),
                // Too far in the future to represent, wait as long as it takes
                None => {
                    state = self
                        .available
                        .wait(state)
                        .unwrap_or_else(PoisonError::into_inner);
                    continue;
                }
            };
            if remaining.is_zero() {
                return Err(RecvError::Timeout);
            }
            state = self
                .available
                .wait_timeout(state, remaining)
                .unwrap_or_else(PoisonError::into_inner)
                .0;
        }
    }

    pub fn try_recv(&self) -> Result<T, RecvError> {
        let mut state = self.lock();
        match state.queue.pop_front() {
            Some(value) => Ok(value),
            None if state.closed => Err(RecvError::Closed),
            None => Err(RecvError::Empty),
        }
    }

    /// Closes the queue and wakes every blocked receiver.
    ///
    /// Values already queued (or sent afterwards) can still be drained; receivers only see
    /// [`RecvError::Closed`] once the queue is empty.
    pub fn close(&self) {
        self.lock().closed = true;
        self.available.notify_all();
    }

    pub fn is_closed(&self) -> bool {
        self.lock().closed
    }

    pub fn len(&self) -> usize {
        self.lock().queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().queue.is_empty()
    }
}
