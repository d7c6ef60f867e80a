//! Kiln engine crate.
//!
//! A batched 2D rendering pipeline over OpenGL / OpenGL ES:
//! - `api`: the backend trait, the GL backend and an instrumented headless one
//! - `resources`: RAII wrappers for textures, buffers, shaders and targets
//! - `device`: view and render-target stacks over one backend
//! - `render`: the batching renderer
//! - `window` / `core`: a minimal winit + glutin runtime driving an `App`

pub mod api;
pub mod coords;
pub mod core;
pub mod device;
pub mod error;
pub mod logging;
pub mod render;
pub mod resources;
pub mod window;

pub use error::RenderError;
