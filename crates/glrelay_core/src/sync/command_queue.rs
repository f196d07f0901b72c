//! # Double-Buffered Command Queue
//!
//! Order-preserving transfer of units of work from the producer thread to
//! the consumer thread.
//!
//! ## Architecture
//!
//! ```text
//!   Producer (script)                         Consumer (render)
//!   ┌──────────────┐   seal()   ┌─────────┐   drain_and_execute()
//!   │ pending batch│ ─────────> │ backlog │ ───────swap──────> [local copy] ──> run
//!   │  (no lock)   │  (push)    │ (Mutex) │                      (no lock)
//!   └──────────────┘            └─────────┘
//! ```
//!
//! ## Lock Discipline
//!
//! - `enqueue`: no lock, producer owns the pending batch.
//! - `seal`: lock held for one `Vec::push` of a batch header.
//! - `drain_and_execute`: lock held for one `mem::swap` of the backlog.
//!
//! Lock hold time is constant regardless of batch size. Units of work run
//! with the lock released, so a slow native call never stalls the producer.
//!
//! ## Ordering
//!
//! Batches execute in seal order, units in enqueue order. A writer and a
//! reader are created together and are the only two endpoints, so a unit
//! enqueued before another always runs before it.

use std::mem;
use std::sync::Arc;

use parking_lot::Mutex;

/// The smallest unit of work: runs once against the consumer-side state.
pub type Work<S> = Box<dyn FnOnce(&mut S) + Send + 'static>;

/// Units of work that always execute together, in insertion order.
pub type Batch<S> = Vec<Work<S>>;

type Backlog<S> = Arc<Mutex<Vec<Batch<S>>>>;

/// Creates a connected writer/reader pair.
///
/// # Arguments
///
/// * `batch_capacity_hint` - Initial capacity of every fresh pending batch
///
/// # Example
///
/// ```rust
/// use glrelay_core::sync::command_queue;
///
/// let (mut writer, mut reader) = command_queue::<Vec<u32>>(16);
/// writer.enqueue(|log| log.push(1));
/// writer.enqueue(|log| log.push(2));
/// writer.seal();
///
/// let mut log = Vec::new();
/// let report = reader.drain_and_execute(&mut log);
/// assert_eq!(log, vec![1, 2]);
/// assert_eq!(report.units, 2);
/// ```
#[must_use]
pub fn command_queue<S>(batch_capacity_hint: usize) -> (QueueWriter<S>, QueueReader<S>) {
    let backlog: Backlog<S> = Arc::new(Mutex::new(Vec::new()));

    let writer = QueueWriter {
        pending: Vec::with_capacity(batch_capacity_hint),
        backlog: Arc::clone(&backlog),
        capacity_hint: batch_capacity_hint,
        sealed_batches: 0,
    };

    let reader = QueueReader {
        backlog,
        spare: Vec::new(),
        drains: 0,
    };

    (writer, reader)
}

/// Producer endpoint.
///
/// Owns the pending batch exclusively; `&mut self` on every method is what
/// makes the unsynchronized append sound.
pub struct QueueWriter<S> {
    pending: Batch<S>,
    backlog: Backlog<S>,
    capacity_hint: usize,
    sealed_batches: u64,
}

impl<S> QueueWriter<S> {
    /// Appends a closure to the pending batch. Never blocks, never fails.
    #[inline]
    pub fn enqueue<F>(&mut self, work: F)
    where
        F: FnOnce(&mut S) + Send + 'static,
    {
        self.pending.push(Box::new(work));
    }

    /// Appends an already-boxed unit of work to the pending batch.
    #[inline]
    pub fn enqueue_boxed(&mut self, work: Work<S>) {
        self.pending.push(work);
    }

    /// Moves the pending batch into the backlog and starts a fresh one.
    ///
    /// Returns the number of units sealed. An empty pending batch is not
    /// published.
    pub fn seal(&mut self) -> usize {
        if self.pending.is_empty() {
            return 0;
        }

        let batch = mem::replace(&mut self.pending, Vec::with_capacity(self.capacity_hint));
        let len = batch.len();

        self.backlog.lock().push(batch);
        self.sealed_batches += 1;

        tracing::debug!(units = len, "sealed batch");
        len
    }

    /// Number of units waiting in the pending batch.
    #[inline]
    #[must_use]
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Total batches published so far.
    #[inline]
    #[must_use]
    pub fn sealed_batches(&self) -> u64 {
        self.sealed_batches
    }

    /// Drops every unsealed unit without running it.
    pub fn discard_pending(&mut self) -> usize {
        let dropped = self.pending.len();
        self.pending.clear();
        dropped
    }
}

/// Summary of one drain.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DrainReport {
    /// Batches executed.
    pub batches: usize,
    /// Units of work executed.
    pub units: usize,
}

impl DrainReport {
    /// True when nothing was executed.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.batches == 0
    }
}

/// Consumer endpoint.
pub struct QueueReader<S> {
    backlog: Backlog<S>,
    /// Second buffer swapped with the backlog on every drain.
    spare: Vec<Batch<S>>,
    drains: u64,
}

impl<S> QueueReader<S> {
    /// Swaps the whole backlog out and runs every unit against `state`.
    ///
    /// An empty backlog costs one lock/unlock.
    pub fn drain_and_execute(&mut self, state: &mut S) -> DrainReport {
        debug_assert!(self.spare.is_empty());

        {
            let mut backlog = self.backlog.lock();
            if backlog.is_empty() {
                return DrainReport::default();
            }
            mem::swap(&mut *backlog, &mut self.spare);
        }

        let mut report = DrainReport::default();
        for batch in self.spare.drain(..) {
            report.batches += 1;
            for work in batch {
                work(state);
                report.units += 1;
            }
        }

        self.drains += 1;
        report
    }

    /// Number of sealed batches not yet drained.
    #[must_use]
    pub fn backlog_len(&self) -> usize {
        self.backlog.lock().len()
    }

    /// Number of non-empty drains performed.
    #[inline]
    #[must_use]
    pub fn drains(&self) -> u64 {
        self.drains
    }

    /// Drops every sealed batch without running it. Returns the unit count.
    pub fn discard_backlog(&mut self) -> usize {
        let batches = mem::take(&mut *self.backlog.lock());
        batches.iter().map(Vec::len).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_units_run_in_enqueue_order() {
        let (mut writer, mut reader) = command_queue::<Vec<u32>>(4);

        for i in 0..10 {
            writer.enqueue(move |log| log.push(i));
        }
        assert_eq!(writer.pending_len(), 10);
        assert_eq!(writer.seal(), 10);
        assert_eq!(writer.pending_len(), 0);

        let mut log = Vec::new();
        let report = reader.drain_and_execute(&mut log);

        assert_eq!(log, (0..10).collect::<Vec<_>>());
        assert_eq!(report, DrainReport { batches: 1, units: 10 });
    }

    #[test]
    fn test_batches_run_in_seal_order() {
        let (mut writer, mut reader) = command_queue::<Vec<u32>>(4);

        writer.enqueue(|log| log.push(1));
        writer.seal();
        writer.enqueue(|log| log.push(2));
        writer.enqueue(|log| log.push(3));
        writer.seal();
        writer.enqueue(|log| log.push(4));
        writer.seal();

        assert_eq!(reader.backlog_len(), 3);
        assert_eq!(writer.sealed_batches(), 3);

        let mut log = Vec::new();
        let report = reader.drain_and_execute(&mut log);

        assert_eq!(log, vec![1, 2, 3, 4]);
        assert_eq!(report.batches, 3);
        assert_eq!(reader.backlog_len(), 0);
    }

    #[test]
    fn test_unsealed_work_is_invisible_to_reader() {
        let (mut writer, mut reader) = command_queue::<Vec<u32>>(4);

        writer.enqueue(|log| log.push(1));

        let mut log = Vec::new();
        assert!(reader.drain_and_execute(&mut log).is_empty());
        assert!(log.is_empty());

        writer.seal();
        reader.drain_and_execute(&mut log);
        assert_eq!(log, vec![1]);
    }

    #[test]
    fn test_empty_drain_is_noop() {
        let (_writer, mut reader) = command_queue::<Vec<u32>>(4);

        let mut log = vec![7];
        let report = reader.drain_and_execute(&mut log);

        assert!(report.is_empty());
        assert_eq!(log, vec![7]);
        assert_eq!(reader.drains(), 0);
    }

    #[test]
    fn test_sealing_empty_pending_publishes_nothing() {
        let (mut writer, reader) = command_queue::<Vec<u32>>(4);

        assert_eq!(writer.seal(), 0);
        assert_eq!(writer.sealed_batches(), 0);
        assert_eq!(reader.backlog_len(), 0);
    }

    #[test]
    fn test_repeated_drains_keep_order() {
        let (mut writer, mut reader) = command_queue::<Vec<u32>>(2);
        let mut log = Vec::new();

        for round in 0..5u32 {
            writer.enqueue(move |log| log.push(round * 2));
            writer.enqueue(move |log| log.push(round * 2 + 1));
            writer.seal();
            reader.drain_and_execute(&mut log);
        }

        assert_eq!(log, (0..10).collect::<Vec<_>>());
        assert_eq!(reader.drains(), 5);
    }

    #[test]
    fn test_discard_drops_without_running() {
        let (mut writer, mut reader) = command_queue::<Vec<u32>>(4);

        writer.enqueue(|log| log.push(1));
        writer.enqueue(|log| log.push(2));
        writer.seal();
        writer.enqueue(|log| log.push(3));

        assert_eq!(writer.discard_pending(), 1);
        assert_eq!(reader.discard_backlog(), 2);

        let mut log = Vec::new();
        assert!(reader.drain_and_execute(&mut log).is_empty());
        assert!(log.is_empty());
    }
}
