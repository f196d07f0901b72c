//! # Out-of-Band Flush Requests
//!
//! A blocking call cannot wait for the consumer's next natural drain (the
//! next display refresh). It asks for an immediate one through a
//! [`FlushSignal`]. Requests coalesce: any number of requests between two
//! drains wake the consumer once.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender, TryRecvError};

type FlushFn = Arc<dyn Fn() + Send + Sync>;

#[derive(Clone)]
enum FlushTarget {
    /// Wake a consumer loop parked on a [`FlushListener`].
    Channel(Sender<()>),
    /// Hand the request to the host (e.g. post a task to the GL thread).
    Callback(FlushFn),
    /// Nobody to wake; the consumer polls on its own schedule.
    Noop,
}

/// Producer-side handle for requesting a drain.
#[derive(Clone)]
pub struct FlushSignal {
    target: FlushTarget,
}

impl FlushSignal {
    /// Creates a signal connected to a consumer-side listener.
    #[must_use]
    pub fn channel() -> (Self, FlushListener) {
        // Capacity one: a queued request already guarantees a wake-up.
        let (sender, receiver) = bounded(1);
        (
            Self {
                target: FlushTarget::Channel(sender),
            },
            FlushListener { receiver },
        )
    }

    /// Creates a signal that invokes `f` on every request.
    pub fn from_fn<F>(f: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        Self {
            target: FlushTarget::Callback(Arc::new(f)),
        }
    }

    /// Creates a signal that does nothing.
    #[must_use]
    pub fn noop() -> Self {
        Self {
            target: FlushTarget::Noop,
        }
    }

    /// Requests a drain. Never blocks.
    pub fn request(&self) {
        match &self.target {
            // Full means a wake-up is already pending; disconnected means the
            // consumer is gone and there is nobody to wake.
            FlushTarget::Channel(sender) => {
                let _ = sender.try_send(());
            }
            FlushTarget::Callback(f) => f(),
            FlushTarget::Noop => {}
        }
    }
}

impl Default for FlushSignal {
    fn default() -> Self {
        Self::noop()
    }
}

impl fmt::Debug for FlushSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.target {
            FlushTarget::Channel(_) => "channel",
            FlushTarget::Callback(_) => "callback",
            FlushTarget::Noop => "noop",
        };
        f.debug_struct("FlushSignal").field("target", &kind).finish()
    }
}

/// Consumer-side receiver of flush requests.
pub struct FlushListener {
    receiver: Receiver<()>,
}

impl FlushListener {
    /// Parks until a request arrives or `timeout` elapses.
    ///
    /// Returns true if a flush was requested. A consumer loop uses the frame
    /// interval as `timeout`, so it drains at least once per frame and
    /// immediately on request.
    #[must_use]
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        match self.receiver.recv_timeout(timeout) {
            Ok(()) => true,
            Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => false,
        }
    }

    /// Consumes a pending request without parking.
    #[must_use]
    pub fn try_recv(&self) -> bool {
        match self.receiver.try_recv() {
            Ok(()) => true,
            Err(TryRecvError::Empty | TryRecvError::Disconnected) => false,
        }
    }

    /// True once every [`FlushSignal`] clone has been dropped.
    #[must_use]
    pub fn is_orphaned(&self) -> bool {
        // A disconnected channel with no queued message can never wake us.
        self.receiver.is_empty()
            && matches!(self.receiver.try_recv(), Err(TryRecvError::Disconnected))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_requests_coalesce() {
        let (signal, listener) = FlushSignal::channel();

        signal.request();
        signal.request();
        signal.request();

        assert!(listener.try_recv());
        assert!(!listener.try_recv());
    }

    #[test]
    fn test_wait_timeout_without_request() {
        let (_signal, listener) = FlushSignal::channel();
        assert!(!listener.wait_timeout(Duration::from_millis(5)));
    }

    #[test]
    fn test_callback_target() {
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&hits);
        let signal = FlushSignal::from_fn(move || {
            counter.fetch_add(1, Ordering::Relaxed);
        });

        signal.request();
        signal.clone().request();

        assert_eq!(hits.load(Ordering::Relaxed), 2);
    }

    #[test]
    fn test_orphaned_listener() {
        let (signal, listener) = FlushSignal::channel();
        assert!(!listener.is_orphaned());

        drop(signal);
        assert!(listener.is_orphaned());
    }

    #[test]
    fn test_noop_never_panics() {
        FlushSignal::noop().request();
        assert_eq!(format!("{:?}", FlushSignal::default()), "FlushSignal { target: \"noop\" }");
    }
}
