//! Backend abstraction: one trait every native graphics API implements.

use std::cell::RefCell;
use std::rc::Rc;

use crate::coords::{Color, Viewport};
use crate::error::RenderError;

pub mod features;
pub mod format;
pub mod gl;
pub mod handle;
pub mod headless;
pub mod types;
pub mod uniform;
pub mod validate;

pub use features::{ExtensionSet, Feature, FeatureFlags};
pub use format::PixelFormat;
pub use handle::{BufferId, IdAllocator, LayoutId, ProgramId, ShaderId, TargetId, TextureId};
pub use headless::{ApiCall, CallLog, HeadlessApi};
pub use types::*;
pub use uniform::{LeafType, UniformDecl, UniformLayout, UniformSlot, UniformType};

/// Fixed attribute locations bound before every program link.
pub const ATTRIB_POSITION: u32 = 0;
pub const ATTRIB_COLOR: u32 = 1;
pub const ATTRIB_TEX_COORD: u32 = 2;

/// The attribute names matching the fixed locations, in location order.
pub const ATTRIB_NAMES: [(u32, &str); 3] = [
    (ATTRIB_POSITION, "position"),
    (ATTRIB_COLOR, "color"),
    (ATTRIB_TEX_COORD, "texCoord"),
];

/// Backend handle shared by the device and every resource it created.
pub type SharedApi = Rc<RefCell<dyn PlatformGraphicsApi>>;

pub fn share<A: PlatformGraphicsApi + 'static>(api: A) -> SharedApi {
    Rc::new(RefCell::new(api))
}

/// Uniform contract over a native graphics API.
///
/// Creates validate against [`features`](Self::features) before touching the
/// driver. Binds and deletes of ids the backend does not know are logged and
/// ignored.
pub trait PlatformGraphicsApi {
    fn name(&self) -> &str;
    fn features(&self) -> &FeatureFlags;
    fn shader_dialect(&self) -> ShaderDialect;
    fn max_texture_size(&self) -> u32;

    // textures
    fn create_texture(&mut self, desc: &TextureDesc, pixels: Option<&[u8]>) -> Result<TextureId, RenderError>;
    fn delete_texture(&mut self, id: TextureId);
    fn bind_texture(&mut self, id: Option<TextureId>, unit: u32);
    fn set_texture_filter(&mut self, id: TextureId, filter: FilterMode) -> Result<(), RenderError>;
    fn set_texture_wrap(&mut self, id: TextureId, wrap: WrapMode) -> Result<(), RenderError>;
    fn is_texture_valid(&self, id: TextureId) -> bool;
    fn compare_textures(&self, a: TextureId, b: TextureId) -> bool;

    // buffers
    fn create_buffer(&mut self, kind: BufferKind, usage: BufferUsage, size: usize) -> Result<BufferId, RenderError>;
    fn delete_buffer(&mut self, id: BufferId);
    fn bind_buffer(&mut self, id: BufferId);
    fn unbind_buffer(&mut self, kind: BufferKind);
    /// With `update`, data that fits the current allocation is written as a
    /// sub-range at offset 0; anything else reallocates the store.
    fn write_buffer(&mut self, id: BufferId, data: &[u8], element_size: usize, update: bool);
    fn is_buffer_valid(&self, id: BufferId) -> bool;

    // shaders
    fn create_shader(&mut self, stage: ShaderStage, source: &str) -> Result<ShaderId, RenderError>;
    fn delete_shader(&mut self, id: ShaderId);
    fn is_shader_valid(&self, id: ShaderId) -> bool;

    fn create_shader_program(&mut self, vertex: ShaderId, fragment: ShaderId) -> Result<ProgramId, RenderError>;
    fn delete_shader_program(&mut self, id: ProgramId);
    fn bind_shader_program(&mut self, id: Option<ProgramId>);
    /// Uploads every leaf of `layout` from the packed `data`.
    fn bind_shader_program_state(&mut self, program: ProgramId, layout: &UniformLayout, data: &[u8]);
    fn is_program_valid(&self, id: ProgramId) -> bool;

    // vertex layouts
    fn create_vertex_layout(&mut self) -> Result<LayoutId, RenderError>;
    fn delete_vertex_layout(&mut self, id: LayoutId);
    fn configure_vertex_layout(&mut self, id: LayoutId, desc: &VertexLayoutDesc) -> Result<(), RenderError>;
    fn use_vertex_layout(&mut self, id: LayoutId);
    fn stop_vertex_layout(&mut self, id: LayoutId);

    // render targets
    fn create_render_target(&mut self, width: u32, height: u32, format: PixelFormat) -> Result<TargetId, RenderError>;
    fn delete_render_target(&mut self, id: TargetId);
    fn bind_render_target(&mut self, id: Option<TargetId>);
    fn render_target_texture(&self, id: TargetId) -> Option<TextureId>;
    fn is_render_target_valid(&self, id: TargetId) -> bool;
    fn compare_render_targets(&self, a: TargetId, b: TargetId) -> bool;

    // drawing
    fn draw(&mut self, mode: PrimitiveMode, count: u32, start: u32);
    fn draw_indexed(&mut self, mode: PrimitiveMode, count: u32, start: u32, index_type: IndexType);
    /// Alpha blending on, depth test and face culling off.
    fn prepare_for_2d(&mut self);
    fn configure_viewport(&mut self, viewport: Viewport);
    fn clear(&mut self, color: Color, flags: ClearFlags);
}
