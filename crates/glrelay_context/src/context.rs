//! # Graphics Context
//!
//! A context is split in two, one half per thread:
//!
//! ```text
//!  Script thread                          Render thread
//!  ┌──────────────────────┐               ┌──────────────────────────┐
//!  │ GlContext<B>         │   batches     │ ContextDriver<B>         │
//!  │  create_object()     │ ────────────► │  drain()                 │
//!  │  viewport()/clear()  │               │   └─ runs work against B │
//!  │  get_error() (waits) │ ◄──────────── │  set_default_framebuffer │
//!  │  end_frame()         │  flush wakes  │  take_needs_redraw()     │
//!  └──────────────────────┘               └──────────────────────────┘
//! ```
//!
//! The backend is moved into the driver's relay state. The script half
//! never holds a reference to it; it can only queue work that receives one.

use std::sync::Arc;
use std::time::Duration;

use glrelay_core::{
    relay, ConsumerState, DrainReport, FlushListener, FlushSignal, HandleTable, ObjectId,
    RelayConsumer, RelayProducer, RelayStatsSnapshot,
};

use crate::backend::{supports_webgl2, FramebufferStatus, GlBackend, ObjectKind};
use crate::config::ContextConfig;
use crate::constants::{COLOR_BUFFER_BIT, DEPTH_BUFFER_BIT, FRAMEBUFFER, STENCIL_BUFFER_BIT};
use crate::error::{ContextError, ContextResult};
use crate::lifecycle::{ContextState, SharedFlags};
use crate::pixels;

/// Render-thread state every unit of work runs against.
#[derive(Debug)]
pub struct GlTarget<B> {
    backend: B,
    default_framebuffer: u32,
}

impl<B> GlTarget<B> {
    /// The native backend.
    #[must_use]
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// The native backend, mutably.
    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    /// Native name of the framebuffer that "no framebuffer" binds to.
    #[must_use]
    pub fn default_framebuffer(&self) -> u32 {
        self.default_framebuffer
    }
}

/// Relay state as seen by queued work.
pub type GlState<B> = ConsumerState<GlTarget<B>>;

/// Script-thread half of a context.
pub struct GlContext<B: GlBackend> {
    producer: RelayProducer<GlTarget<B>>,
    flags: Arc<SharedFlags>,
    unpack_flip_y: bool,
}

impl<B: GlBackend> GlContext<B> {
    /// Creates a context whose driver wakes through a [`FlushListener`].
    ///
    /// The baseline state-reset batch is sealed before this returns, so the
    /// driver's first drain puts the backend into a known state.
    ///
    /// # Errors
    ///
    /// Returns an error if `config` fails validation.
    pub fn new(backend: B, config: &ContextConfig) -> ContextResult<(Self, ContextDriver<B>)> {
        let (flush, listener) = FlushSignal::channel();
        let (context, mut driver) = Self::with_flush_signal(backend, config, flush)?;
        driver.listener = Some(listener);
        Ok((context, driver))
    }

    /// Creates a context whose flush requests go to `flush`, typically a host
    /// callback that schedules [`ContextDriver::drain`] on the GL thread.
    ///
    /// # Errors
    ///
    /// Returns an error if `config` fails validation.
    pub fn with_flush_signal(
        backend: B,
        config: &ContextConfig,
        flush: FlushSignal,
    ) -> ContextResult<(Self, ContextDriver<B>)> {
        config.validate()?;

        let target = GlTarget {
            backend,
            default_framebuffer: 0,
        };
        let (producer, consumer) = relay(target, &config.relay, flush);
        let flags = Arc::new(SharedFlags::new());

        let mut context = Self {
            producer,
            flags: Arc::clone(&flags),
            unpack_flip_y: false,
        };
        context.enqueue_baseline(config);
        flags.transition(ContextState::Uninitialized, ContextState::Active);

        let driver = ContextDriver {
            consumer,
            flags,
            listener: None,
            torn_down: false,
        };
        Ok((context, driver))
    }

    fn enqueue_baseline(&mut self, config: &ContextConfig) {
        let flags = Arc::clone(&self.flags);
        let [red, green, blue, alpha] = config.clear_color;
        let depth = config.clear_depth;
        let stencil = config.clear_stencil;
        let [x, y, width, height] = config.headless_viewport;

        self.producer.enqueue(move |state| {
            let target = state.native_mut();
            let backend = &mut target.backend;

            let version = backend.version_string();
            flags.set_supports_webgl2(supports_webgl2(&version));

            backend.bind_framebuffer(FRAMEBUFFER, target.default_framebuffer);
            if backend.check_framebuffer_status(FRAMEBUFFER) == FramebufferStatus::Undefined {
                // Headless: nothing to clear, start from the WebGL default viewport.
                backend.viewport(x, y, width, height);
            } else {
                backend.clear_color(red, green, blue, alpha);
                backend.clear_depth(depth);
                backend.clear_stencil(stencil);
                backend.clear(COLOR_BUFFER_BIT | DEPTH_BUFFER_BIT | STENCIL_BUFFER_BIT);
            }
        });
        self.producer.seal();
    }

    fn ensure_active(&self) -> ContextResult<()> {
        match self.flags.state() {
            ContextState::Active => Ok(()),
            state => Err(ContextError::NotActive { state }),
        }
    }

    // =========================================================================
    // Generic entry points
    // =========================================================================

    /// Queues arbitrary work against the render-thread state.
    ///
    /// # Errors
    ///
    /// [`ContextError::NotActive`] once destroyed.
    pub fn enqueue<F>(&mut self, work: F) -> ContextResult<()>
    where
        F: FnOnce(&mut GlState<B>) + Send + 'static,
    {
        self.ensure_active()?;
        self.producer.enqueue(work);
        Ok(())
    }

    /// Runs `work` on the render thread and waits for its result.
    ///
    /// Waits at most `relay.blocking_timeout_ms` when configured, forever
    /// otherwise.
    ///
    /// # Errors
    ///
    /// [`ContextError::NotActive`] once destroyed, or a wrapped
    /// [`RelayError::BlockingTimeout`](glrelay_core::RelayError::BlockingTimeout)
    /// or [`RelayError::Abandoned`](glrelay_core::RelayError::Abandoned).
    pub fn run_blocking<R, F>(&mut self, work: F) -> ContextResult<R>
    where
        R: Send + 'static,
        F: FnOnce(&mut GlState<B>) -> R + Send + 'static,
    {
        self.ensure_active()?;
        Ok(self.producer.run_blocking_timeout(work)?)
    }

    // =========================================================================
    // Objects
    // =========================================================================

    /// Reserves an id for a new object; the native object is created when
    /// the driver next drains.
    ///
    /// # Errors
    ///
    /// [`ContextError::NotActive`] once destroyed.
    pub fn create_object(&mut self, kind: ObjectKind) -> ContextResult<ObjectId> {
        self.ensure_active()?;
        Ok(self
            .producer
            .create_and_defer(move |state| state.native_mut().backend.create_object(kind)))
    }

    /// Queues deletion of the object behind `id`. Unknown ids are ignored.
    ///
    /// # Errors
    ///
    /// [`ContextError::NotActive`] once destroyed.
    pub fn delete_object(&mut self, kind: ObjectKind, id: ObjectId) -> ContextResult<()> {
        self.ensure_active()?;
        self.producer.destroy_with(id, move |target, handle| {
            target.backend.delete_object(kind, handle);
        });
        Ok(())
    }

    /// Binds a script-created framebuffer, or the default one for `None`.
    ///
    /// # Errors
    ///
    /// [`ContextError::NotActive`] once destroyed.
    pub fn bind_framebuffer(&mut self, framebuffer: Option<ObjectId>) -> ContextResult<()> {
        self.enqueue(move |state| {
            let name = match framebuffer {
                Some(id) => state.lookup(id).raw(),
                None => state.native().default_framebuffer,
            };
            state.native_mut().backend.bind_framebuffer(FRAMEBUFFER, name);
        })
    }

    // =========================================================================
    // Fire-and-forget state
    // =========================================================================

    /// Queues `glViewport`.
    ///
    /// # Errors
    ///
    /// [`ContextError::NotActive`] once destroyed.
    pub fn viewport(&mut self, x: i32, y: i32, width: i32, height: i32) -> ContextResult<()> {
        self.enqueue(move |state| state.native_mut().backend.viewport(x, y, width, height))
    }

    /// Queues `glClearColor`.
    ///
    /// # Errors
    ///
    /// [`ContextError::NotActive`] once destroyed.
    pub fn clear_color(&mut self, red: f32, green: f32, blue: f32, alpha: f32) -> ContextResult<()> {
        self.enqueue(move |state| {
            state.native_mut().backend.clear_color(red, green, blue, alpha);
        })
    }

    /// Queues `glClear`.
    ///
    /// # Errors
    ///
    /// [`ContextError::NotActive`] once destroyed.
    pub fn clear(&mut self, mask: u32) -> ContextResult<()> {
        self.enqueue(move |state| state.native_mut().backend.clear(mask))
    }

    // =========================================================================
    // Blocking queries
    // =========================================================================

    /// `glGetError`, read on the render thread after all prior work.
    ///
    /// # Errors
    ///
    /// See [`run_blocking`](Self::run_blocking).
    pub fn get_error(&mut self) -> ContextResult<u32> {
        self.run_blocking(|state| state.native_mut().backend.get_error())
    }

    /// `glGetIntegerv` for a single-valued parameter.
    ///
    /// # Errors
    ///
    /// See [`run_blocking`](Self::run_blocking).
    pub fn get_integer(&mut self, pname: u32) -> ContextResult<i32> {
        self.run_blocking(move |state| state.native_mut().backend.get_integer(pname))
    }

    /// `glIs*`: false for ids that were never created or are already deleted.
    ///
    /// # Errors
    ///
    /// See [`run_blocking`](Self::run_blocking).
    pub fn is_object(&mut self, kind: ObjectKind, id: ObjectId) -> ContextResult<bool> {
        self.run_blocking(move |state| {
            let handle = state.lookup(id);
            !handle.is_null() && state.native_mut().backend.is_object(kind, handle)
        })
    }

    // =========================================================================
    // Frames
    // =========================================================================

    /// Seals queued work and wakes the driver.
    ///
    /// # Errors
    ///
    /// [`ContextError::NotActive`] once destroyed.
    pub fn flush(&mut self) -> ContextResult<()> {
        self.ensure_active()?;
        self.producer.flush();
        Ok(())
    }

    /// Queues the redraw mark behind the frame's work, then flushes.
    ///
    /// The driver sees [`needs_redraw`](ContextDriver::needs_redraw) only
    /// after every unit queued before this call has run.
    ///
    /// # Errors
    ///
    /// [`ContextError::NotActive`] once destroyed.
    pub fn end_frame(&mut self) -> ContextResult<()> {
        self.ensure_active()?;
        let flags = Arc::clone(&self.flags);
        self.producer.enqueue(move |_| flags.set_needs_redraw(true));
        self.producer.flush();
        Ok(())
    }

    /// Sets or clears the redraw flag.
    pub fn set_needs_redraw(&self, needs_redraw: bool) {
        self.flags.set_needs_redraw(needs_redraw);
    }

    /// True if a frame is waiting to be presented.
    #[must_use]
    pub fn needs_redraw(&self) -> bool {
        self.flags.needs_redraw()
    }

    // =========================================================================
    // Pixel uploads
    // =========================================================================

    /// `pixelStorei(UNPACK_FLIP_Y_WEBGL, ...)`. Applied on this thread by
    /// [`prepare_pixels`](Self::prepare_pixels), never forwarded natively.
    pub fn set_unpack_flip_y(&mut self, flip: bool) {
        self.unpack_flip_y = flip;
    }

    /// Current unpack flip setting.
    #[must_use]
    pub fn unpack_flip_y(&self) -> bool {
        self.unpack_flip_y
    }

    /// Validates a client pixel buffer and flips its rows if requested, ready
    /// to be moved into a queued upload.
    ///
    /// # Errors
    ///
    /// [`ContextError::MalformedPixels`] if `data` does not hold exactly
    /// `width * height * bytes_per_pixel` bytes; [`ContextError::NotActive`]
    /// once destroyed.
    pub fn prepare_pixels(
        &self,
        width: u32,
        height: u32,
        bytes_per_pixel: u32,
        mut data: Vec<u8>,
    ) -> ContextResult<Vec<u8>> {
        self.ensure_active()?;

        let expected = pixels::expected_len(width, height, bytes_per_pixel).unwrap_or(usize::MAX);
        if data.len() != expected {
            return Err(ContextError::MalformedPixels {
                expected,
                actual: data.len(),
            });
        }

        if self.unpack_flip_y {
            // width * bpp fits in usize: the product with height already did.
            let bytes_per_row = expected / height.max(1) as usize;
            pixels::flip_rows(&mut data, bytes_per_row);
        }
        Ok(data)
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Active → Destroyed. Unsealed work is dropped; the driver discards the
    /// backlog and the handle table on its next drain.
    ///
    /// # Errors
    ///
    /// [`ContextError::NotActive`] if already destroyed.
    pub fn destroy(&mut self) -> ContextResult<()> {
        if !self
            .flags
            .transition(ContextState::Active, ContextState::Destroyed)
        {
            return Err(ContextError::NotActive {
                state: self.flags.state(),
            });
        }

        let dropped = self.producer.discard_pending();
        if dropped > 0 {
            tracing::debug!(dropped, "dropped unsealed work on destroy");
        }
        self.flags.set_needs_redraw(false);
        // Wake the driver so it tears down without waiting for a frame.
        self.producer.flush();
        Ok(())
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> ContextState {
        self.flags.state()
    }

    /// True once the baseline batch has run on a GLES 3.0+ backend.
    #[must_use]
    pub fn supports_webgl2(&self) -> bool {
        self.flags.supports_webgl2()
    }

    /// Units of work recorded since the last seal.
    #[must_use]
    pub fn pending_len(&self) -> usize {
        self.producer.pending_len()
    }

    /// Relay counters.
    #[must_use]
    pub fn stats(&self) -> RelayStatsSnapshot {
        self.producer.stats()
    }
}

/// Render-thread half of a context.
pub struct ContextDriver<B: GlBackend> {
    consumer: RelayConsumer<GlTarget<B>>,
    flags: Arc<SharedFlags>,
    listener: Option<FlushListener>,
    torn_down: bool,
}

impl<B: GlBackend> ContextDriver<B> {
    /// Sets the native framebuffer that the baseline batch and
    /// `bind_framebuffer(None)` bind. Call before the first drain.
    pub fn set_default_framebuffer(&mut self, framebuffer: u32) {
        self.consumer.state_mut().native_mut().default_framebuffer = framebuffer;
    }

    /// Native default framebuffer name.
    #[must_use]
    pub fn default_framebuffer(&self) -> u32 {
        self.consumer.state().native().default_framebuffer
    }

    /// Executes every sealed batch against the backend.
    ///
    /// Once the context is destroyed this tears down instead: the backlog is
    /// dropped unexecuted and the handle table cleared.
    pub fn drain(&mut self) -> DrainReport {
        if self.flags.state() == ContextState::Destroyed {
            self.tear_down();
            return DrainReport::default();
        }
        self.consumer.drain_and_execute()
    }

    /// Parks until the script side requests a flush or `timeout` elapses.
    ///
    /// Returns immediately with false when flushes go to a host callback
    /// instead (see [`GlContext::with_flush_signal`]).
    #[must_use]
    pub fn wait_for_flush(&self, timeout: Duration) -> bool {
        self.listener
            .as_ref()
            .is_some_and(|listener| listener.wait_timeout(timeout))
    }

    /// One iteration of a render loop: wait up to `frame_interval` for a
    /// flush request, then drain.
    pub fn run_frame(&mut self, frame_interval: Duration) -> DrainReport {
        let _ = self.wait_for_flush(frame_interval);
        self.drain()
    }

    fn tear_down(&mut self) {
        if self.torn_down {
            return;
        }
        self.torn_down = true;

        let discarded = self.consumer.discard_backlog();
        let released = self.consumer.state_mut().handles_mut().drain().len();
        tracing::info!(discarded, released, "context torn down");
    }

    /// Returns and clears the redraw flag. Present a frame when true.
    pub fn take_needs_redraw(&self) -> bool {
        self.flags.take_needs_redraw()
    }

    /// True if a frame is waiting to be presented.
    #[must_use]
    pub fn needs_redraw(&self) -> bool {
        self.flags.needs_redraw()
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> ContextState {
        self.flags.state()
    }

    /// True once a destroyed context has been torn down.
    #[must_use]
    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    /// The id → native handle table.
    #[must_use]
    pub fn handles(&self) -> &HandleTable {
        self.consumer.state().handles()
    }

    /// The native backend.
    #[must_use]
    pub fn backend(&self) -> &B {
        &self.consumer.state().native().backend
    }

    /// The native backend, mutably.
    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.consumer.state_mut().native_mut().backend
    }

    /// Relay counters.
    #[must_use]
    pub fn stats(&self) -> RelayStatsSnapshot {
        self.consumer.stats()
    }

    /// Consumes the driver, returning the backend.
    #[must_use]
    pub fn into_backend(self) -> B {
        self.consumer.into_native().backend
    }
}
