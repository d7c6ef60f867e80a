//! RAII wrappers over backend resources.
//!
//! Each wrapper keeps the id the backend assigned plus a handle to that
//! backend, and routes its `Drop` through the matching delete call.

mod buffer;
mod program;
mod program_state;
mod render_target;
mod shader;
mod texture;
mod vertex_layout;

pub use buffer::Buffer;
pub use program::ShaderProgram;
pub use program_state::ShaderProgramState;
pub use render_target::RenderTarget;
pub use shader::Shader;
pub use texture::Texture2D;
pub use vertex_layout::VertexLayout;

pub use crate::api::{LeafType, UniformDecl, UniformLayout, UniformSlot, UniformType};

use crate::api::{PlatformGraphicsApi, SharedApi};

/// Runs a delete on drop. A backend that is mid-call (only possible while
/// unwinding out of it) cannot be re-borrowed; the object is leaked then.
fn release(api: &SharedApi, what: &str, delete: impl FnOnce(&mut dyn PlatformGraphicsApi)) {
    match api.try_borrow_mut() {
        Ok(mut api) => delete(&mut *api),
        Err(_) => log::error!("{what}: backend busy during drop, leaking native object"),
    }
}
