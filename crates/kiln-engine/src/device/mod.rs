//! Graphics device: backend ownership plus view and render-target stacks.
//!
//! This module is responsible for:
//! - loading the GL-family backend from a [`GraphicsContext`]
//! - the bounded view-matrix stack and the projection
//! - the bounded render-target stack and viewport switching

mod context;
mod graphics_device;
mod stack;

pub use context::GraphicsContext;
pub use graphics_device::{GraphicsDevice, MAX_TARGETS, VIEW_STACK_CAPACITY, ortho};
pub use stack::MatrixStack;
