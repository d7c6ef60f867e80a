//! Window + runtime loop.
//!
//! Owns the `winit` event loop and a glutin-backed window, and wires them to
//! the graphics device and renderer.

mod gl_window;
mod runtime;

pub use gl_window::GlWindow;
pub use runtime::{Runtime, RuntimeConfig};
