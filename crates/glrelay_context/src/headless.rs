//! # Headless Backend
//!
//! An in-memory [`GlBackend`] with no GPU behind it. Records every call in
//! order and hands out increasing native names, which makes it the backend
//! of choice for headless contexts and for checking what reached the render
//! thread, and in which order.

use std::collections::{HashMap, HashSet};

use glrelay_core::NativeHandle;

use crate::backend::{FramebufferStatus, GlBackend, ObjectKind};
use crate::constants::{
    FRAMEBUFFER_BINDING, FRAMEBUFFER_INCOMPLETE_MISSING_ATTACHMENT, INVALID_ENUM, INVALID_VALUE,
    MAX_TEXTURE_SIZE, NO_ERROR,
};

/// One call received by a [`HeadlessBackend`].
#[derive(Clone, Debug, PartialEq)]
pub enum CallRecord {
    /// `bind_framebuffer(target, framebuffer)`
    BindFramebuffer {
        /// Binding target.
        target: u32,
        /// Native framebuffer name.
        framebuffer: u32,
    },
    /// `check_framebuffer_status(target)` and what it returned.
    CheckFramebufferStatus(FramebufferStatus),
    /// `clear_color(r, g, b, a)`
    ClearColor([f32; 4]),
    /// `clear_depth(d)`
    ClearDepth(f32),
    /// `clear_stencil(s)`
    ClearStencil(i32),
    /// `clear(mask)`
    Clear(u32),
    /// `viewport(x, y, w, h)`
    Viewport([i32; 4]),
    /// `version_string()`
    VersionString,
    /// `create_object(kind)` and the name it handed out.
    CreateObject {
        /// Object kind.
        kind: ObjectKind,
        /// Issued native name.
        handle: NativeHandle,
    },
    /// `delete_object(kind, handle)`
    DeleteObject {
        /// Object kind.
        kind: ObjectKind,
        /// Deleted native name.
        handle: NativeHandle,
    },
    /// `is_object(kind, handle)`
    IsObject {
        /// Object kind.
        kind: ObjectKind,
        /// Queried native name.
        handle: NativeHandle,
    },
    /// `get_error()`
    GetError,
    /// `get_integer(pname)`
    GetInteger(u32),
}

/// Recording backend with no GPU.
#[derive(Debug)]
pub struct HeadlessBackend {
    version: String,
    /// Native name of the window-system drawable, if there is one.
    surface: Option<u32>,
    bound_framebuffer: u32,
    next_name: u32,
    live: HashSet<(ObjectKind, NativeHandle)>,
    integers: HashMap<u32, i32>,
    pending_error: u32,
    calls: Vec<CallRecord>,
}

impl HeadlessBackend {
    /// Version string reported unless overridden.
    pub const DEFAULT_VERSION: &'static str = "OpenGL ES 3.0 glrelay-headless";

    /// Creates a backend with no default drawable.
    #[must_use]
    pub fn new() -> Self {
        let mut integers = HashMap::new();
        integers.insert(MAX_TEXTURE_SIZE, 4096);

        Self {
            version: Self::DEFAULT_VERSION.to_string(),
            surface: None,
            bound_framebuffer: 0,
            next_name: 1,
            live: HashSet::new(),
            integers,
            pending_error: NO_ERROR,
            calls: Vec::new(),
        }
    }

    /// Creates a backend whose drawable has native framebuffer name `surface`.
    #[must_use]
    pub fn with_surface(surface: u32) -> Self {
        Self {
            surface: Some(surface),
            ..Self::new()
        }
    }

    /// Overrides the reported `GL_VERSION` string.
    #[must_use]
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    /// Sets the value reported for `pname`.
    #[must_use]
    pub fn with_integer(mut self, pname: u32, value: i32) -> Self {
        self.integers.insert(pname, value);
        self
    }

    /// Every call received so far, in order.
    #[must_use]
    pub fn calls(&self) -> &[CallRecord] {
        &self.calls
    }

    /// Takes the recorded calls, leaving the log empty.
    pub fn take_calls(&mut self) -> Vec<CallRecord> {
        std::mem::take(&mut self.calls)
    }

    /// Number of live objects of `kind`.
    #[must_use]
    pub fn live_count(&self, kind: ObjectKind) -> usize {
        self.live.iter().filter(|(k, _)| *k == kind).count()
    }

    /// Currently bound framebuffer name.
    #[must_use]
    pub fn bound_framebuffer(&self) -> u32 {
        self.bound_framebuffer
    }

    fn record_error(&mut self, error: u32) {
        // GL keeps the first error until it is read.
        if self.pending_error == NO_ERROR {
            self.pending_error = error;
        }
    }
}

impl Default for HeadlessBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl GlBackend for HeadlessBackend {
    fn bind_framebuffer(&mut self, target: u32, framebuffer: u32) {
        self.calls.push(CallRecord::BindFramebuffer {
            target,
            framebuffer,
        });
        self.bound_framebuffer = framebuffer;
    }

    fn check_framebuffer_status(&mut self, _target: u32) -> FramebufferStatus {
        let bound = self.bound_framebuffer;
        let status = if self.surface == Some(bound) {
            FramebufferStatus::Complete
        } else if bound == 0 {
            FramebufferStatus::Undefined
        } else if self
            .live
            .contains(&(ObjectKind::Framebuffer, NativeHandle::new(bound)))
        {
            FramebufferStatus::Complete
        } else {
            FramebufferStatus::Incomplete(FRAMEBUFFER_INCOMPLETE_MISSING_ATTACHMENT)
        };
        self.calls.push(CallRecord::CheckFramebufferStatus(status));
        status
    }

    fn clear_color(&mut self, red: f32, green: f32, blue: f32, alpha: f32) {
        self.calls.push(CallRecord::ClearColor([red, green, blue, alpha]));
    }

    fn clear_depth(&mut self, depth: f32) {
        self.calls.push(CallRecord::ClearDepth(depth));
    }

    fn clear_stencil(&mut self, stencil: i32) {
        self.calls.push(CallRecord::ClearStencil(stencil));
    }

    fn clear(&mut self, mask: u32) {
        self.calls.push(CallRecord::Clear(mask));
    }

    fn viewport(&mut self, x: i32, y: i32, width: i32, height: i32) {
        self.calls.push(CallRecord::Viewport([x, y, width, height]));
        if width < 0 || height < 0 {
            self.record_error(INVALID_VALUE);
        }
    }

    fn version_string(&mut self) -> String {
        self.calls.push(CallRecord::VersionString);
        self.version.clone()
    }

    fn create_object(&mut self, kind: ObjectKind) -> NativeHandle {
        let handle = NativeHandle::new(self.next_name);
        self.next_name += 1;
        self.live.insert((kind, handle));
        self.calls.push(CallRecord::CreateObject { kind, handle });
        handle
    }

    fn delete_object(&mut self, kind: ObjectKind, handle: NativeHandle) {
        self.calls.push(CallRecord::DeleteObject { kind, handle });
        // Deleting an unknown name is silently ignored, as in GL.
        self.live.remove(&(kind, handle));
        if kind == ObjectKind::Framebuffer && self.bound_framebuffer == handle.raw() {
            self.bound_framebuffer = 0;
        }
    }

    fn is_object(&mut self, kind: ObjectKind, handle: NativeHandle) -> bool {
        self.calls.push(CallRecord::IsObject { kind, handle });
        self.live.contains(&(kind, handle))
    }

    fn get_error(&mut self) -> u32 {
        self.calls.push(CallRecord::GetError);
        std::mem::replace(&mut self.pending_error, NO_ERROR)
    }

    fn get_integer(&mut self, pname: u32) -> i32 {
        self.calls.push(CallRecord::GetInteger(pname));
        if pname == FRAMEBUFFER_BINDING {
            return i32::try_from(self.bound_framebuffer).unwrap_or(i32::MAX);
        }
        if let Some(value) = self.integers.get(&pname) {
            *value
        } else {
            self.record_error(INVALID_ENUM);
            0
        }
    }
}
