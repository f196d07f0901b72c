//! # Cross-Thread Synchronization
//!
//! ## The Problem
//!
//! ```text
//! Thread 1 (Script):  ISSUES graphics calls, must not wait for them
//! Thread 2 (Render):  the ONLY thread allowed to EXECUTE graphics calls
//!
//! Per-call channel send:   one lock per call → contention on every call
//! Shared Vec under Mutex:  render holds the lock while running slow GL calls
//! ```
//!
//! ## The Solution: Double-Buffered Batches
//!
//! ```text
//! Script appends to its private pending batch (no lock)
//! seal():  push the batch header into the backlog     (lock: one push)
//! drain(): swap the backlog with an empty local Vec   (lock: one swap)
//!          run the local copy with the lock released
//! ```
//!
//! Blocking calls layer a [`BlockingRequest`] and a [`FlushSignal`] on top.

mod command_queue;
mod completion;
mod flush_signal;

pub use command_queue::{
    command_queue,
    Batch,
    DrainReport,
    QueueReader,
    QueueWriter,
    Work,
};
pub use completion::{BlockingRequest, CompletionSignal, Responder};
pub use flush_signal::{FlushListener, FlushSignal};
