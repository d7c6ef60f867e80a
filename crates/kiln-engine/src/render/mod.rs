//! Batched 2D rendering.
//!
//! Convention:
//! - vertices are in pixels (top-left origin, +Y down) before the submission
//!   transform is applied.
//! - the device's projection and view stack become `mvp` at draw time.

mod batch;
mod renderer;
mod shaders;
mod vertex;

pub use batch::{BatchItem, DrawRun, RenderBucket};
pub use renderer::{RenderStats, Renderer, RendererConfig, TexturedQuad, TRANSFORM_STACK_CAPACITY};
pub use shaders::sprite_sources;
pub use vertex::{PrimitiveType, Vertex};
