//! # GLRELAY Core
//!
//! Order-preserving, mostly non-blocking transfer of graphics calls from a
//! scripting thread to the one thread allowed to execute them.
//!
//! ## Architecture Rules
//!
//! 1. **The producer never runs native calls** - it only records closures
//! 2. **The consumer never blocks the producer** - the lock covers a swap, not execution
//! 3. **Total order** - A enqueued before B always executes before B
//! 4. **Identifiers before resources** - creates return at once, resolve later
//!
//! ## Example
//!
//! ```rust,ignore
//! use glrelay_core::{relay, FlushSignal, RelayConfig};
//!
//! let (flush, listener) = FlushSignal::channel();
//! let (mut producer, mut consumer) = relay(backend, &RelayConfig::default(), flush);
//!
//! // Script thread
//! let buffer = producer.create_and_defer(|s| s.native_mut().gen_buffer());
//! producer.enqueue(move |s| { let b = s.lookup(buffer); s.native_mut().bind_buffer(b) });
//! let err = producer.run_blocking(|s| s.native_mut().get_error())?;
//!
//! // Render thread, once per frame or when woken
//! if listener.wait_timeout(frame_interval) { /* woken early */ }
//! consumer.drain_and_execute();
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod config;
pub mod error;
pub mod handles;
pub mod relay;
pub mod sync;

pub use config::RelayConfig;
pub use error::{RelayError, RelayResult};
pub use handles::{HandleTable, IdAllocator, NativeHandle, ObjectId};
pub use relay::{relay, ConsumerState, RelayConsumer, RelayProducer, RelayStats, RelayStatsSnapshot};
pub use sync::{
    BlockingRequest, CompletionSignal, DrainReport, FlushListener, FlushSignal, Responder,
};
