//! # Completion Signals
//!
//! The producer side of a blocking call parks on a [`BlockingRequest`] until
//! the consumer executes the unit of work that fulfils it.
//!
//! ```text
//!   Producer                          Consumer
//!   (request, responder) = BlockingRequest::pair()
//!   enqueue(|s| responder.respond(..))
//!   seal + wake ───────────────────>  drain_and_execute()
//!   request.wait()  ..parked..          └─ respond(value) ── notify_all
//!   <── value ─────────────────────────────────────────────────┘
//! ```
//!
//! A [`Responder`] dropped without responding (its unit of work was
//! discarded, or an earlier unit in the same drain panicked) still wakes the
//! producer, which then sees [`RelayError::Abandoned`].

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};

use crate::error::{RelayError, RelayResult};

/// One-shot completion flag with a wakeable wait.
pub struct CompletionSignal {
    done: AtomicBool,
    condvar: Condvar,
    mutex: Mutex<()>,
}

impl CompletionSignal {
    /// Creates an unsignalled flag.
    #[must_use]
    pub fn new() -> Self {
        Self {
            done: AtomicBool::new(false),
            condvar: Condvar::new(),
            mutex: Mutex::new(()),
        }
    }

    /// Sets the flag and wakes every waiter.
    pub fn signal(&self) {
        // Store under the mutex so a waiter between its check and its park
        // cannot miss the notification.
        let guard = self.mutex.lock();
        self.done.store(true, Ordering::Release);
        drop(guard);
        self.condvar.notify_all();
    }

    /// Parks until the flag is set.
    pub fn wait(&self) {
        if self.is_done() {
            return;
        }
        let mut guard = self.mutex.lock();
        while !self.is_done() {
            self.condvar.wait(&mut guard);
        }
    }

    /// Parks until the flag is set or `timeout` elapses. Returns true if set.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        if self.is_done() {
            return true;
        }
        let deadline = Instant::now() + timeout;
        let mut guard = self.mutex.lock();
        while !self.is_done() {
            if self.condvar.wait_until(&mut guard, deadline).timed_out() {
                return self.is_done();
            }
        }
        true
    }

    /// Returns true if already signalled.
    #[inline]
    #[must_use]
    pub fn is_done(&self) -> bool {
        self.done.load(Ordering::Acquire)
    }
}

impl Default for CompletionSignal {
    fn default() -> Self {
        Self::new()
    }
}

/// Result slot plus completion signal for one blocking call.
///
/// The producer keeps the request; the queued unit of work owns the matching
/// [`Responder`]. Both share the slot by `Arc`.
pub struct BlockingRequest<T> {
    slot: Mutex<Option<T>>,
    completion: CompletionSignal,
}

impl<T> BlockingRequest<T> {
    /// Creates an empty request and the responder that fulfils it.
    #[must_use]
    pub fn pair() -> (Arc<Self>, Responder<T>) {
        let request = Arc::new(Self {
            slot: Mutex::new(None),
            completion: CompletionSignal::new(),
        });
        let responder = Responder {
            request: Some(Arc::clone(&request)),
        };
        (request, responder)
    }

    /// Returns true once the request was answered or abandoned.
    #[inline]
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.completion.is_done()
    }

    /// Parks until answered and takes the result.
    ///
    /// Never returns if the consumer stops draining while the responder is
    /// still queued.
    ///
    /// # Errors
    ///
    /// [`RelayError::Abandoned`] if the responder was dropped unanswered or
    /// the result was already taken.
    pub fn wait(&self) -> RelayResult<T> {
        self.completion.wait();
        self.take()
    }

    /// Parks until answered or `timeout` elapses.
    ///
    /// # Errors
    ///
    /// [`RelayError::BlockingTimeout`] if `timeout` elapsed first, otherwise
    /// as [`wait`](Self::wait).
    pub fn wait_timeout(&self, timeout: Duration) -> RelayResult<T> {
        if self.completion.wait_timeout(timeout) {
            self.take()
        } else {
            Err(RelayError::BlockingTimeout {
                waited_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
            })
        }
    }

    fn take(&self) -> RelayResult<T> {
        self.slot.lock().take().ok_or(RelayError::Abandoned)
    }
}

/// Consumer-side half of a [`BlockingRequest`].
///
/// Dropping it without calling [`respond`](Self::respond) wakes the waiter
/// with [`RelayError::Abandoned`].
pub struct Responder<T> {
    request: Option<Arc<BlockingRequest<T>>>,
}

impl<T> Responder<T> {
    /// Stores the result and wakes the producer.
    pub fn respond(mut self, value: T) {
        if let Some(request) = self.request.take() {
            *request.slot.lock() = Some(value);
            request.completion.signal();
        }
    }
}

impl<T> Drop for Responder<T> {
    fn drop(&mut self) {
        if let Some(request) = self.request.take() {
            request.completion.signal();
        }
    }
}
