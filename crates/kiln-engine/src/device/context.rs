use std::ffi::c_void;

use crate::api::ApiRequest;
use crate::error::RenderError;

/// Window-system side of a device: whatever owns the native GL context.
///
/// The device only needs to know what the context is, make it current and
/// resolve entry points. The runtime's `GlWindow` is the shipped implementation.
pub trait GraphicsContext {
    /// API kind and version the context actually provides.
    fn descriptor(&self) -> ApiRequest;

    fn make_current(&self) -> Result<(), RenderError>;

    /// Resolves a GL entry point; null when unavailable.
    fn get_proc_address(&self, name: &str) -> *const c_void;

    /// Drawable size in physical pixels.
    fn drawable_size(&self) -> (u32, u32);
}
