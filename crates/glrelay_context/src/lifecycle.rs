//! # Context Lifecycle
//!
//! ```text
//! Uninitialized ──new()──► Active ──destroy()──► Destroyed
//! ```
//!
//! There is no way back: each context is single-use.

use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};

/// Lifecycle state of a context.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum ContextState {
    /// Constructed, baseline batch not yet queued.
    Uninitialized = 0,
    /// Accepting calls.
    Active = 1,
    /// Torn down; every entry point fails.
    Destroyed = 2,
}

impl ContextState {
    const fn from_u8(raw: u8) -> Self {
        match raw {
            0 => Self::Uninitialized,
            1 => Self::Active,
            _ => Self::Destroyed,
        }
    }
}

impl fmt::Display for ContextState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Uninitialized => "uninitialized",
            Self::Active => "active",
            Self::Destroyed => "destroyed",
        };
        f.write_str(name)
    }
}

/// Flags read by both halves of a context.
#[derive(Debug)]
pub(crate) struct SharedFlags {
    state: AtomicU8,
    needs_redraw: AtomicBool,
    supports_webgl2: AtomicBool,
}

impl SharedFlags {
    pub(crate) fn new() -> Self {
        Self {
            state: AtomicU8::new(ContextState::Uninitialized as u8),
            needs_redraw: AtomicBool::new(false),
            supports_webgl2: AtomicBool::new(false),
        }
    }

    pub(crate) fn state(&self) -> ContextState {
        ContextState::from_u8(self.state.load(Ordering::Acquire))
    }

    /// Moves `from → to`. Returns false if the state was not `from`.
    pub(crate) fn transition(&self, from: ContextState, to: ContextState) -> bool {
        let moved = self
            .state
            .compare_exchange(from as u8, to as u8, Ordering::AcqRel, Ordering::Acquire)
            .is_ok();
        if moved {
            tracing::info!(%from, %to, "context lifecycle transition");
        }
        moved
    }

    pub(crate) fn needs_redraw(&self) -> bool {
        self.needs_redraw.load(Ordering::Acquire)
    }

    pub(crate) fn set_needs_redraw(&self, value: bool) {
        self.needs_redraw.store(value, Ordering::Release);
    }

    pub(crate) fn take_needs_redraw(&self) -> bool {
        self.needs_redraw.swap(false, Ordering::AcqRel)
    }

    pub(crate) fn supports_webgl2(&self) -> bool {
        self.supports_webgl2.load(Ordering::Acquire)
    }

    pub(crate) fn set_supports_webgl2(&self, value: bool) {
        self.supports_webgl2.store(value, Ordering::Release);
    }
}
