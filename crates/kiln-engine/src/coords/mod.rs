//! Coordinate and color types shared by the device, renderer and drawers.
//!
//! Canonical 2D space:
//! - pixels, origin top-left
//! - +X right, +Y down
//!
//! The device's default projection maps this space to NDC.

mod color;
mod rect;
mod viewport;

pub use color::Color;
pub use rect::Rect;
pub use viewport::Viewport;

pub use glam::{Mat4, Vec2, Vec3};
