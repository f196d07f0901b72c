//! # GL Enum Values
//!
//! The subset of GLES enums the context issues itself, plus the WebGL-only
//! values that have no native counterpart and are handled before reaching
//! the backend.

// --- Framebuffers -----------------------------------------------------------

/// `GL_FRAMEBUFFER`
pub const FRAMEBUFFER: u32 = 0x8D40;
/// `GL_FRAMEBUFFER_BINDING`
pub const FRAMEBUFFER_BINDING: u32 = 0x8CA6;
/// `GL_FRAMEBUFFER_COMPLETE`
pub const FRAMEBUFFER_COMPLETE: u32 = 0x8CD5;
/// `GL_FRAMEBUFFER_UNDEFINED`: no default drawable (headless).
pub const FRAMEBUFFER_UNDEFINED: u32 = 0x8219;
/// `GL_FRAMEBUFFER_INCOMPLETE_MISSING_ATTACHMENT`
pub const FRAMEBUFFER_INCOMPLETE_MISSING_ATTACHMENT: u32 = 0x8CD7;

// --- Clearing ---------------------------------------------------------------

/// `GL_DEPTH_BUFFER_BIT`
pub const DEPTH_BUFFER_BIT: u32 = 0x0000_0100;
/// `GL_STENCIL_BUFFER_BIT`
pub const STENCIL_BUFFER_BIT: u32 = 0x0000_0400;
/// `GL_COLOR_BUFFER_BIT`
pub const COLOR_BUFFER_BIT: u32 = 0x0000_4000;

// --- Errors -----------------------------------------------------------------

/// `GL_NO_ERROR`
pub const NO_ERROR: u32 = 0;
/// `GL_INVALID_ENUM`
pub const INVALID_ENUM: u32 = 0x0500;
/// `GL_INVALID_VALUE`
pub const INVALID_VALUE: u32 = 0x0501;
/// `GL_INVALID_OPERATION`
pub const INVALID_OPERATION: u32 = 0x0502;

// --- Queries ----------------------------------------------------------------

/// `GL_VERSION`
pub const VERSION: u32 = 0x1F02;
/// `GL_MAX_TEXTURE_SIZE`
pub const MAX_TEXTURE_SIZE: u32 = 0x0D33;

// --- Pixel types and formats ------------------------------------------------

/// `GL_UNSIGNED_BYTE`
pub const UNSIGNED_BYTE: u32 = 0x1401;
/// `GL_FLOAT`
pub const FLOAT: u32 = 0x1406;
/// `GL_HALF_FLOAT`
pub const HALF_FLOAT: u32 = 0x140B;
/// `GL_UNSIGNED_SHORT_4_4_4_4`
pub const UNSIGNED_SHORT_4_4_4_4: u32 = 0x8033;
/// `GL_UNSIGNED_SHORT_5_5_5_1`
pub const UNSIGNED_SHORT_5_5_5_1: u32 = 0x8034;
/// `GL_UNSIGNED_SHORT_5_6_5`
pub const UNSIGNED_SHORT_5_6_5: u32 = 0x8363;
/// `GL_ALPHA`
pub const ALPHA: u32 = 0x1906;
/// `GL_RGB`
pub const RGB: u32 = 0x1907;
/// `GL_RGBA`
pub const RGBA: u32 = 0x1908;
/// `GL_LUMINANCE`
pub const LUMINANCE: u32 = 0x1909;
/// `GL_LUMINANCE_ALPHA`
pub const LUMINANCE_ALPHA: u32 = 0x190A;

// --- WebGL-only -------------------------------------------------------------

/// Flip uploaded pixel rows vertically.
pub const UNPACK_FLIP_Y_WEBGL: u32 = 0x9240;
/// Premultiply alpha on upload.
pub const UNPACK_PREMULTIPLY_ALPHA_WEBGL: u32 = 0x9241;
/// Context-lost query.
pub const CONTEXT_LOST_WEBGL: u32 = 0x9242;
/// Colorspace conversion on upload.
pub const UNPACK_COLORSPACE_CONVERSION_WEBGL: u32 = 0x9243;
/// Browser-default colorspace conversion.
pub const BROWSER_DEFAULT_WEBGL: u32 = 0x9244;
/// Upper bound for `clientWaitSync` timeouts.
pub const MAX_CLIENT_WAIT_TIMEOUT_WEBGL: u32 = 0x9247;

/// `GL_STENCIL_INDEX` (WebGL renderbuffer format alias).
pub const STENCIL_INDEX: u32 = 0x1901;
/// `GL_DEPTH_STENCIL`
pub const DEPTH_STENCIL: u32 = 0x84F9;
/// `GL_DEPTH_STENCIL_ATTACHMENT`
pub const DEPTH_STENCIL_ATTACHMENT: u32 = 0x821A;

/// True for pixel-store parameters that only exist in WebGL and must not be
/// forwarded to the native API.
#[must_use]
pub const fn is_webgl_only_pixel_store(pname: u32) -> bool {
    matches!(
        pname,
        UNPACK_FLIP_Y_WEBGL | UNPACK_PREMULTIPLY_ALPHA_WEBGL | UNPACK_COLORSPACE_CONVERSION_WEBGL
    )
}
