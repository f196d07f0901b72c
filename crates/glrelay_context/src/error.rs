//! # Context Error Types

use thiserror::Error;

use glrelay_core::RelayError;

use crate::lifecycle::ContextState;
use crate::registry::ContextId;

/// Errors surfaced by context entry points.
///
/// Graphics errors are NOT reported here; they stay inside the backend and
/// are read back with [`GlContext::get_error`](crate::GlContext::get_error).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ContextError {
    /// Entry point used on a context that is not Active.
    #[error("context is {state}, not active")]
    NotActive {
        /// The state the context was in.
        state: ContextState,
    },

    /// No context registered under this id.
    #[error("unknown context {0}")]
    UnknownContext(ContextId),

    /// Relay failure (bounded blocking wait, configuration).
    #[error(transparent)]
    Relay(#[from] RelayError),

    /// Pixel buffer length does not match its dimensions.
    #[error("pixel buffer holds {actual} bytes, expected {expected}")]
    MalformedPixels {
        /// `width * height * bytes_per_pixel`.
        expected: usize,
        /// Length of the supplied buffer.
        actual: usize,
    },
}

/// Result type for context operations.
pub type ContextResult<T> = Result<T, ContextError>;
