//! # Native Backend Seam
//!
//! The calls a context issues on its own behalf. Everything else a script
//! does reaches the backend through queued work that receives `&mut B`.

use std::fmt;

use glrelay_core::NativeHandle;

use crate::constants::{FRAMEBUFFER_COMPLETE, FRAMEBUFFER_UNDEFINED};

/// Result of `glCheckFramebufferStatus`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FramebufferStatus {
    /// Ready to draw into.
    Complete,
    /// The default framebuffer does not exist (headless context).
    Undefined,
    /// Any other status, carrying the raw enum.
    Incomplete(u32),
}

impl FramebufferStatus {
    /// Classifies a raw status enum.
    #[must_use]
    pub const fn from_raw(raw: u32) -> Self {
        match raw {
            FRAMEBUFFER_COMPLETE => Self::Complete,
            FRAMEBUFFER_UNDEFINED => Self::Undefined,
            other => Self::Incomplete(other),
        }
    }

    /// The raw status enum.
    #[must_use]
    pub const fn raw(self) -> u32 {
        match self {
            Self::Complete => FRAMEBUFFER_COMPLETE,
            Self::Undefined => FRAMEBUFFER_UNDEFINED,
            Self::Incomplete(raw) => raw,
        }
    }
}

/// Kinds of native objects a script can create.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ObjectKind {
    /// `glGenBuffers`
    Buffer,
    /// `glGenFramebuffers`
    Framebuffer,
    /// `glGenRenderbuffers`
    Renderbuffer,
    /// `glGenTextures`
    Texture,
    /// `glCreateProgram`
    Program,
    /// `glCreateShader`
    Shader,
    /// `glGenVertexArrays`
    VertexArray,
    /// `glGenQueries`
    Query,
    /// `glGenSamplers`
    Sampler,
    /// `glFenceSync`
    Sync,
    /// `glGenTransformFeedbacks`
    TransformFeedback,
}

impl ObjectKind {
    /// Every kind, in declaration order.
    pub const ALL: [Self; 11] = [
        Self::Buffer,
        Self::Framebuffer,
        Self::Renderbuffer,
        Self::Texture,
        Self::Program,
        Self::Shader,
        Self::VertexArray,
        Self::Query,
        Self::Sampler,
        Self::Sync,
        Self::TransformFeedback,
    ];

    /// True for kinds that only exist from GLES 3.0 on.
    #[must_use]
    pub const fn requires_webgl2(self) -> bool {
        matches!(
            self,
            Self::VertexArray | Self::Query | Self::Sampler | Self::Sync | Self::TransformFeedback
        )
    }
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Buffer => "buffer",
            Self::Framebuffer => "framebuffer",
            Self::Renderbuffer => "renderbuffer",
            Self::Texture => "texture",
            Self::Program => "program",
            Self::Shader => "shader",
            Self::VertexArray => "vertex array",
            Self::Query => "query",
            Self::Sampler => "sampler",
            Self::Sync => "sync",
            Self::TransformFeedback => "transform feedback",
        };
        f.write_str(name)
    }
}

/// Native graphics API as seen from the render thread.
///
/// Implementations wrap a current GL context. They are moved into the
/// consumer half of a relay and only ever called from there, so `Send` is
/// required but `Sync` is not.
pub trait GlBackend: Send + 'static {
    /// `glBindFramebuffer`
    fn bind_framebuffer(&mut self, target: u32, framebuffer: u32);

    /// `glCheckFramebufferStatus`
    fn check_framebuffer_status(&mut self, target: u32) -> FramebufferStatus;

    /// `glClearColor`
    fn clear_color(&mut self, red: f32, green: f32, blue: f32, alpha: f32);

    /// `glClearDepthf`
    fn clear_depth(&mut self, depth: f32);

    /// `glClearStencil`
    fn clear_stencil(&mut self, stencil: i32);

    /// `glClear`
    fn clear(&mut self, mask: u32);

    /// `glViewport`
    fn viewport(&mut self, x: i32, y: i32, width: i32, height: i32);

    /// `glGetString(GL_VERSION)`
    fn version_string(&mut self) -> String;

    /// Creates one object of `kind`, returning its native name.
    fn create_object(&mut self, kind: ObjectKind) -> NativeHandle;

    /// Deletes one object of `kind`.
    fn delete_object(&mut self, kind: ObjectKind, handle: NativeHandle);

    /// `glIs*` for `kind`.
    fn is_object(&mut self, kind: ObjectKind, handle: NativeHandle) -> bool;

    /// `glGetError`
    fn get_error(&mut self) -> u32;

    /// `glGetIntegerv` for a single-valued parameter.
    fn get_integer(&mut self, pname: u32) -> i32;
}

/// Reads the GLES version out of a `GL_VERSION` string.
///
/// The string has the form `"OpenGL ES N.M <vendor info>"`; the number
/// starts right after the ten-character prefix.
#[must_use]
pub fn parse_gles_version(version: &str) -> Option<f64> {
    let rest = version.get(10..)?.trim_start();
    let end = rest
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(rest.len());
    rest[..end].parse().ok()
}

/// True when the version string reports GLES 3.0 or newer.
#[must_use]
pub fn supports_webgl2(version: &str) -> bool {
    parse_gles_version(version).is_some_and(|v| v >= 3.0)
}
