//! # Relay Error Types
//!
//! The queue and the handle table are infrastructure and never fail. The only
//! fallible paths are configuration loading and blocking calls: the opt-in
//! bounded wait, and work that was dropped before it could answer.

use thiserror::Error;

/// Errors that can occur in the relay.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RelayError {
    /// A bounded blocking call elapsed before the consumer executed it.
    ///
    /// The unit of work stays queued and will still run; only its result is
    /// lost to the caller.
    #[error("blocking call not executed after {waited_ms} ms")]
    BlockingTimeout {
        /// How long the producer waited.
        waited_ms: u64,
    },

    /// The blocking call's unit of work was dropped without running, e.g.
    /// discarded on teardown or skipped after an earlier unit panicked.
    #[error("blocking call dropped before it ran")]
    Abandoned,

    /// Invalid configuration file.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result type for relay operations.
pub type RelayResult<T> = Result<T, RelayError>;
