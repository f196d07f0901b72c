//! # Context Registry
//!
//! Maps small integer ids (what a host hands to script bindings) to live
//! contexts. Ids come from a per-registry counter and are never reused.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::backend::GlBackend;
use crate::config::ContextConfig;
use crate::context::{ContextDriver, GlContext};
use crate::error::{ContextError, ContextResult};

/// Registry-assigned context id.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ContextId(u32);

impl ContextId {
    /// Wraps a raw id.
    #[must_use]
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    /// The raw id.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Display for ContextId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ctx#{}", self.0)
    }
}

/// Shared handle to a registered context's script half.
pub type SharedContext<B> = Arc<Mutex<GlContext<B>>>;

/// Thread-safe table of live contexts.
///
/// The registry owns the script halves. The driver half of each context is
/// returned from [`create`](Self::create) and belongs to whichever thread
/// renders it.
pub struct ContextRegistry<B: GlBackend> {
    next_id: AtomicU32,
    contexts: Mutex<HashMap<ContextId, SharedContext<B>>>,
}

impl<B: GlBackend> ContextRegistry<B> {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            next_id: AtomicU32::new(1),
            contexts: Mutex::new(HashMap::new()),
        }
    }

    /// Creates and registers a context around `backend`.
    ///
    /// # Errors
    ///
    /// Returns an error if `config` fails validation.
    pub fn create(
        &self,
        backend: B,
        config: &ContextConfig,
    ) -> ContextResult<(ContextId, ContextDriver<B>)> {
        let (context, driver) = GlContext::new(backend, config)?;
        let id = ContextId(self.next_id.fetch_add(1, Ordering::Relaxed));

        self.contexts
            .lock()
            .insert(id, Arc::new(Mutex::new(context)));
        tracing::info!(%id, "context created");

        Ok((id, driver))
    }

    /// Looks up a live context.
    #[must_use]
    pub fn get(&self, id: ContextId) -> Option<SharedContext<B>> {
        self.contexts.lock().get(&id).cloned()
    }

    /// Unregisters and destroys a context.
    ///
    /// # Errors
    ///
    /// [`ContextError::UnknownContext`] if `id` is not registered.
    pub fn destroy(&self, id: ContextId) -> ContextResult<()> {
        // Release the table lock before locking the context.
        let context = self
            .contexts
            .lock()
            .remove(&id)
            .ok_or(ContextError::UnknownContext(id))?;

        let result = context.lock().destroy();
        tracing::info!(%id, "context destroyed");
        result
    }

    /// Number of live contexts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.contexts.lock().len()
    }

    /// True when no context is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.contexts.lock().is_empty()
    }

    /// Ids of live contexts, ascending.
    #[must_use]
    pub fn ids(&self) -> Vec<ContextId> {
        let mut ids: Vec<_> = self.contexts.lock().keys().copied().collect();
        ids.sort_unstable();
        ids
    }
}

impl<B: GlBackend> Default for ContextRegistry<B> {
    fn default() -> Self {
        Self::new()
    }
}
