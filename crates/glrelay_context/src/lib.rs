//! # GLRELAY Context
//!
//! Graphics contexts whose calls are recorded on a scripting thread and
//! executed on the render thread that owns the native API.
//!
//! ## Architecture Rules
//!
//! 1. **Two halves** - [`GlContext`] records, [`ContextDriver`] executes
//! 2. **The backend lives behind the relay** - only queued work touches it
//! 3. **Known starting state** - every context begins with a baseline reset batch
//! 4. **Single use** - Active → Destroyed is final
//!
//! ## Example
//!
//! ```rust
//! use glrelay_context::{ContextConfig, GlContext, HeadlessBackend, ObjectKind};
//!
//! let (mut gl, mut driver) = GlContext::new(HeadlessBackend::new(), &ContextConfig::default())?;
//!
//! let texture = gl.create_object(ObjectKind::Texture)?;
//! gl.viewport(0, 0, 64, 64)?;
//! gl.end_frame()?;
//!
//! driver.drain();
//! assert!(!driver.handles().lookup(texture).is_null());
//! assert!(driver.take_needs_redraw());
//! # Ok::<(), glrelay_context::ContextError>(())
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod backend;
pub mod config;
pub mod constants;
pub mod context;
pub mod error;
pub mod headless;
pub mod lifecycle;
pub mod pixels;
pub mod registry;
pub mod uri;

pub use backend::{FramebufferStatus, GlBackend, ObjectKind};
pub use config::ContextConfig;
pub use context::{ContextDriver, GlContext, GlState, GlTarget};
pub use error::{ContextError, ContextResult};
pub use headless::{CallRecord, HeadlessBackend};
pub use lifecycle::ContextState;
pub use registry::{ContextId, ContextRegistry, SharedContext};

pub use glrelay_core::{DrainReport, FlushSignal, NativeHandle, ObjectId, RelayConfig, RelayError};
