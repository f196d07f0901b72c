//! # Relay
//!
//! The two halves every graphics context is built from.
//!
//! ```text
//!  ┌──────────────── RelayProducer (script thread) ───────────────┐
//!  │ enqueue(work)              fire-and-forget                   │
//!  │ create_and_defer(factory)  returns ObjectId immediately      │
//!  │ run_blocking(work)         seal + flush + park until done    │
//!  └──────────────────────────────┬───────────────────────────────┘
//!                                 │ backlog (Mutex, swap only)
//!  ┌──────────────────────────────▼───────────────────────────────┐
//!  │ RelayConsumer (render thread)                                │
//!  │ drain_and_execute()  runs work against ConsumerState<T>      │
//!  │ ConsumerState<T> = HandleTable + native target T             │
//!  └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Failure Mode
//!
//! A blocking call parks the producer until the consumer drains. If the
//! consumer has stopped (surface torn down, render loop exited), the producer
//! never wakes. Only issue blocking calls while the render side is alive, or
//! use [`RelayProducer::run_blocking_timeout`].
//!
//! A unit of work that panics unwinds out of
//! [`RelayConsumer::drain_and_execute`] and drops the rest of that drain
//! unexecuted. Blocking calls among the dropped units return
//! [`RelayError::Abandoned`] instead of parking forever.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::config::RelayConfig;
use crate::error::{RelayError, RelayResult};
use crate::handles::{HandleTable, IdAllocator, NativeHandle, ObjectId};
use crate::sync::{command_queue, BlockingRequest, DrainReport, FlushSignal, QueueReader, QueueWriter};

/// Everything a unit of work can touch on the consumer thread.
pub struct ConsumerState<T> {
    handles: HandleTable,
    native: T,
}

impl<T> ConsumerState<T> {
    /// Resolves an identifier, yielding [`NativeHandle::NULL`] on a miss.
    #[inline]
    #[must_use]
    pub fn lookup(&self, id: ObjectId) -> NativeHandle {
        self.handles.lookup(id)
    }

    /// The handle table.
    #[inline]
    #[must_use]
    pub fn handles(&self) -> &HandleTable {
        &self.handles
    }

    /// The handle table, mutably.
    #[inline]
    pub fn handles_mut(&mut self) -> &mut HandleTable {
        &mut self.handles
    }

    /// The native target (graphics backend and its state).
    #[inline]
    #[must_use]
    pub fn native(&self) -> &T {
        &self.native
    }

    /// The native target, mutably.
    #[inline]
    pub fn native_mut(&mut self) -> &mut T {
        &mut self.native
    }

    /// Splits into the handle table and the native target.
    #[inline]
    pub fn parts_mut(&mut self) -> (&mut HandleTable, &mut T) {
        (&mut self.handles, &mut self.native)
    }
}

/// Counters shared by both halves.
#[derive(Debug, Default)]
pub struct RelayStats {
    enqueued: AtomicU64,
    sealed: AtomicU64,
    executed: AtomicU64,
    drains: AtomicU64,
    blocking_calls: AtomicU64,
}

/// Point-in-time copy of [`RelayStats`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RelayStatsSnapshot {
    /// Units of work enqueued.
    pub enqueued: u64,
    /// Batches sealed.
    pub sealed: u64,
    /// Units of work executed.
    pub executed: u64,
    /// Non-empty drains.
    pub drains: u64,
    /// Blocking calls issued.
    pub blocking_calls: u64,
}

impl RelayStats {
    /// Takes a snapshot.
    #[must_use]
    pub fn snapshot(&self) -> RelayStatsSnapshot {
        RelayStatsSnapshot {
            enqueued: self.enqueued.load(Ordering::Relaxed),
            sealed: self.sealed.load(Ordering::Relaxed),
            executed: self.executed.load(Ordering::Relaxed),
            drains: self.drains.load(Ordering::Relaxed),
            blocking_calls: self.blocking_calls.load(Ordering::Relaxed),
        }
    }
}

/// Creates a connected producer/consumer pair around `native`.
///
/// # Example
///
/// ```rust
/// use glrelay_core::{relay, FlushSignal, NativeHandle, RelayConfig};
///
/// let (mut producer, mut consumer) = relay(Vec::<u32>::new(), &RelayConfig::default(), FlushSignal::noop());
///
/// let id = producer.create_and_defer(|_| NativeHandle::new(40));
/// producer.enqueue(move |state| {
///     let raw = state.lookup(id).raw();
///     state.native_mut().push(raw);
/// });
/// producer.flush();
///
/// consumer.drain_and_execute();
/// assert_eq!(consumer.state().native(), &vec![40]);
/// ```
#[must_use]
pub fn relay<T>(native: T, config: &RelayConfig, flush: FlushSignal) -> (RelayProducer<T>, RelayConsumer<T>) {
    let (writer, reader) = command_queue(config.batch_capacity_hint);
    let stats = Arc::new(RelayStats::default());

    let producer = RelayProducer {
        writer,
        ids: Arc::new(IdAllocator::new()),
        flush,
        stats: Arc::clone(&stats),
        blocking_timeout: config.blocking_timeout(),
    };

    let consumer = RelayConsumer {
        reader,
        state: ConsumerState {
            handles: HandleTable::new(),
            native,
        },
        stats,
        log_drains: config.log_drains,
    };

    (producer, consumer)
}

/// Script-thread half.
pub struct RelayProducer<T> {
    writer: QueueWriter<ConsumerState<T>>,
    ids: Arc<IdAllocator>,
    flush: FlushSignal,
    stats: Arc<RelayStats>,
    blocking_timeout: Option<Duration>,
}

impl<T: 'static> RelayProducer<T> {
    /// Appends a unit of work to the pending batch.
    #[inline]
    pub fn enqueue<F>(&mut self, work: F)
    where
        F: FnOnce(&mut ConsumerState<T>) + Send + 'static,
    {
        self.writer.enqueue(work);
        self.stats.enqueued.fetch_add(1, Ordering::Relaxed);
    }

    /// Publishes the pending batch to the consumer.
    pub fn seal(&mut self) {
        if self.writer.seal() > 0 {
            self.stats.sealed.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Seals and asks the consumer to drain now.
    pub fn flush(&mut self) {
        self.seal();
        self.flush.request();
    }

    /// Reserves an identifier and queues the creation behind it.
    ///
    /// The identifier is usable as an argument to any later-enqueued work
    /// right away; those units resolve it with [`ConsumerState::lookup`].
    pub fn create_and_defer<F>(&mut self, factory: F) -> ObjectId
    where
        F: FnOnce(&mut ConsumerState<T>) -> NativeHandle + Send + 'static,
    {
        let id = self.ids.reserve();
        self.enqueue(move |state| {
            let handle = factory(state);
            state.handles.insert(id, handle);
        });
        id
    }

    /// Queues removal of `id`'s mapping.
    ///
    /// Safe before the creation has run: create-then-destroy with both still
    /// queued leaves no entry behind.
    pub fn destroy(&mut self, id: ObjectId) {
        self.enqueue(move |state| {
            state.handles.remove(id);
        });
    }

    /// Queues removal of `id`'s mapping and hands the removed handle to
    /// `release` (e.g. to delete the native object). `release` does not run
    /// if nothing was mapped.
    pub fn destroy_with<F>(&mut self, id: ObjectId, release: F)
    where
        F: FnOnce(&mut T, NativeHandle) + Send + 'static,
    {
        self.enqueue(move |state| {
            if let Some(handle) = state.handles.remove(id) {
                release(&mut state.native, handle);
            }
        });
    }

    /// Runs `work` on the consumer thread and returns its result.
    ///
    /// Everything enqueued before this call executes first.
    ///
    /// Parks forever if the consumer never drains again.
    ///
    /// # Errors
    ///
    /// [`RelayError::Abandoned`] if the work was dropped without running.
    pub fn run_blocking<R, F>(&mut self, work: F) -> RelayResult<R>
    where
        R: Send + 'static,
        F: FnOnce(&mut ConsumerState<T>) -> R + Send + 'static,
    {
        let request = self.submit_blocking(work);
        request.wait()
    }

    /// Like [`run_blocking`](Self::run_blocking) but gives up after the
    /// configured `blocking_timeout_ms` (or forever if none is configured).
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::BlockingTimeout`] if the consumer did not run the
    /// work in time. The work stays queued and still runs later.
    /// [`RelayError::Abandoned`] as for [`run_blocking`](Self::run_blocking).
    pub fn run_blocking_timeout<R, F>(&mut self, work: F) -> RelayResult<R>
    where
        R: Send + 'static,
        F: FnOnce(&mut ConsumerState<T>) -> R + Send + 'static,
    {
        let Some(timeout) = self.blocking_timeout else {
            return self.run_blocking(work);
        };

        let request = self.submit_blocking(work);
        request.wait_timeout(timeout).map_err(|err| {
            if let RelayError::BlockingTimeout { waited_ms } = err {
                tracing::warn!(waited_ms, "blocking call timed out");
            }
            err
        })
    }

    fn submit_blocking<R, F>(&mut self, work: F) -> Arc<BlockingRequest<R>>
    where
        R: Send + 'static,
        F: FnOnce(&mut ConsumerState<T>) -> R + Send + 'static,
    {
        let (request, responder) = BlockingRequest::pair();

        self.enqueue(move |state| responder.respond(work(state)));
        self.stats.blocking_calls.fetch_add(1, Ordering::Relaxed);
        self.flush();

        request
    }

    /// Drops unsealed work without running it.
    pub fn discard_pending(&mut self) -> usize {
        self.writer.discard_pending()
    }

    /// Units waiting in the pending batch.
    #[inline]
    #[must_use]
    pub fn pending_len(&self) -> usize {
        self.writer.pending_len()
    }

    /// The identifier allocator.
    #[inline]
    #[must_use]
    pub fn ids(&self) -> &IdAllocator {
        &self.ids
    }

    /// Shared counters.
    #[inline]
    #[must_use]
    pub fn stats(&self) -> RelayStatsSnapshot {
        self.stats.snapshot()
    }
}

/// Render-thread half.
pub struct RelayConsumer<T> {
    reader: QueueReader<ConsumerState<T>>,
    state: ConsumerState<T>,
    stats: Arc<RelayStats>,
    log_drains: bool,
}

impl<T> RelayConsumer<T> {
    /// Executes every sealed batch, in order.
    pub fn drain_and_execute(&mut self) -> DrainReport {
        let report = self.reader.drain_and_execute(&mut self.state);
        if !report.is_empty() {
            self.stats.drains.fetch_add(1, Ordering::Relaxed);
            self.stats.executed.fetch_add(report.units as u64, Ordering::Relaxed);
            if self.log_drains {
                tracing::debug!(batches = report.batches, units = report.units, "drained backlog");
            }
        }
        report
    }

    /// Drops every sealed batch without running it.
    pub fn discard_backlog(&mut self) -> usize {
        self.reader.discard_backlog()
    }

    /// Sealed batches not yet drained.
    #[must_use]
    pub fn backlog_len(&self) -> usize {
        self.reader.backlog_len()
    }

    /// Consumer-side state.
    #[inline]
    #[must_use]
    pub fn state(&self) -> &ConsumerState<T> {
        &self.state
    }

    /// Consumer-side state, mutably.
    #[inline]
    pub fn state_mut(&mut self) -> &mut ConsumerState<T> {
        &mut self.state
    }

    /// Shared counters.
    #[inline]
    #[must_use]
    pub fn stats(&self) -> RelayStatsSnapshot {
        self.stats.snapshot()
    }

    /// Tears down, returning the native target.
    #[must_use]
    pub fn into_native(self) -> T {
        self.state.native
    }
}
