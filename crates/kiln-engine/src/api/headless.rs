//! In-memory backend that validates like the GL backend and records every
//! call it accepts.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use super::features::FeatureFlags;
use super::format::PixelFormat;
use super::handle::{BufferId, IdAllocator, LayoutId, ProgramId, ShaderId, TargetId, TextureId};
use super::types::*;
use super::uniform::UniformLayout;
use super::validate;
use super::PlatformGraphicsApi;
use crate::coords::{Color, Viewport};
use crate::error::RenderError;

/// `GL_FRAMEBUFFER_INCOMPLETE_ATTACHMENT`, the status a simulated incomplete
/// framebuffer reports.
const FRAMEBUFFER_INCOMPLETE_ATTACHMENT: u32 = 0x8CD6;

/// One accepted backend call.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiCall {
    CreateTexture { id: TextureId, desc: TextureDesc },
    DeleteTexture(TextureId),
    BindTexture { id: Option<TextureId>, unit: u32 },
    SetTextureFilter { id: TextureId, filter: FilterMode },
    SetTextureWrap { id: TextureId, wrap: WrapMode },
    CreateBuffer { id: BufferId, kind: BufferKind, size: usize },
    DeleteBuffer(BufferId),
    BindBuffer(BufferId),
    UnbindBuffer(BufferKind),
    WriteBuffer { id: BufferId, data: Vec<u8>, update: bool },
    CreateShader { id: ShaderId, stage: ShaderStage },
    DeleteShader(ShaderId),
    CreateProgram(ProgramId),
    DeleteProgram(ProgramId),
    BindProgram(Option<ProgramId>),
    BindProgramState { program: ProgramId, data: Vec<u8> },
    CreateLayout(LayoutId),
    DeleteLayout(LayoutId),
    ConfigureLayout { id: LayoutId, desc: VertexLayoutDesc },
    UseLayout(LayoutId),
    StopLayout(LayoutId),
    CreateTarget { id: TargetId, width: u32, height: u32 },
    DeleteTarget(TargetId),
    BindTarget(Option<TargetId>),
    Draw { mode: PrimitiveMode, count: u32, start: u32 },
    DrawIndexed { mode: PrimitiveMode, count: u32, start: u32, index_type: IndexType },
    PrepareFor2d,
    ConfigureViewport(Viewport),
    Clear { color: Color, flags: ClearFlags },
}

/// Shared view of a [`HeadlessApi`]'s call history; stays readable after the
/// backend has been moved into a device.
#[derive(Debug, Clone, Default)]
pub struct CallLog(Rc<RefCell<Vec<ApiCall>>>);

impl CallLog {
    fn push(&self, call: ApiCall) {
        log::trace!("headless: {call:?}");
        self.0.borrow_mut().push(call);
    }

    pub fn snapshot(&self) -> Vec<ApiCall> {
        self.0.borrow().clone()
    }

    /// Returns and forgets everything recorded so far.
    pub fn take(&self) -> Vec<ApiCall> {
        std::mem::take(&mut *self.0.borrow_mut())
    }

    pub fn clear(&self) {
        self.0.borrow_mut().clear();
    }

    pub fn len(&self) -> usize {
        self.0.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.borrow().is_empty()
    }

    pub fn count(&self, pred: impl Fn(&ApiCall) -> bool) -> usize {
        self.0.borrow().iter().filter(|c| pred(c)).count()
    }
}

#[derive(Debug)]
struct BufferState {
    kind: BufferKind,
    data: Vec<u8>,
}

#[derive(Debug)]
struct TargetState {
    texture: TextureId,
}

pub struct HeadlessApi {
    features: FeatureFlags,
    dialect: ShaderDialect,
    max_texture_size: u32,
    fail_framebuffers: bool,
    log: CallLog,

    texture_ids: IdAllocator,
    buffer_ids: IdAllocator,
    shader_ids: IdAllocator,
    program_ids: IdAllocator,
    layout_ids: IdAllocator,
    target_ids: IdAllocator,

    textures: HashMap<TextureId, TextureDesc>,
    buffers: HashMap<BufferId, BufferState>,
    shaders: HashMap<ShaderId, ShaderStage>,
    programs: HashMap<ProgramId, (ShaderId, ShaderId)>,
    layouts: HashMap<LayoutId, Option<VertexLayoutDesc>>,
    targets: HashMap<TargetId, TargetState>,
}

impl HeadlessApi {
    pub fn new(features: FeatureFlags) -> Self {
        Self {
            features,
            dialect: ShaderDialect::Glsl330,
            max_texture_size: 8192,
            fail_framebuffers: false,
            log: CallLog::default(),
            texture_ids: IdAllocator::new(),
            buffer_ids: IdAllocator::new(),
            shader_ids: IdAllocator::new(),
            program_ids: IdAllocator::new(),
            layout_ids: IdAllocator::new(),
            target_ids: IdAllocator::new(),
            textures: HashMap::new(),
            buffers: HashMap::new(),
            shaders: HashMap::new(),
            programs: HashMap::new(),
            layouts: HashMap::new(),
            targets: HashMap::new(),
        }
    }

    pub fn with_dialect(mut self, dialect: ShaderDialect) -> Self {
        self.dialect = dialect;
        self
    }

    pub fn with_max_texture_size(mut self, size: u32) -> Self {
        self.max_texture_size = size;
        self
    }

    /// Makes every render target come back incomplete, as a driver rejecting
    /// the attachment combination would.
    pub fn fail_framebuffers(mut self, fail: bool) -> Self {
        self.fail_framebuffers = fail;
        self
    }

    /// Textures alive on the backend, render target attachments included.
    pub fn live_textures(&self) -> usize {
        self.textures.len()
    }

    pub fn log(&self) -> CallLog {
        self.log.clone()
    }

    /// Current contents of a buffer, as the last write left it.
    pub fn buffer_data(&self, id: BufferId) -> Option<&[u8]> {
        self.buffers.get(&id).map(|b| b.data.as_slice())
    }

    fn insert_texture(&mut self, desc: TextureDesc) -> TextureId {
        let id = TextureId::new(self.texture_ids.next());
        self.textures.insert(id, desc);
        self.log.push(ApiCall::CreateTexture { id, desc });
        id
    }

    fn unknown(what: &str, id: impl std::fmt::Debug) {
        log::warn!("headless: ignoring {what} of unknown {id:?}");
    }
}

impl PlatformGraphicsApi for HeadlessApi {
    fn name(&self) -> &str {
        "headless"
    }

    fn features(&self) -> &FeatureFlags {
        &self.features
    }

    fn shader_dialect(&self) -> ShaderDialect {
        self.dialect
    }

    fn max_texture_size(&self) -> u32 {
        self.max_texture_size
    }

    fn create_texture(&mut self, desc: &TextureDesc, pixels: Option<&[u8]>) -> Result<TextureId, RenderError> {
        validate::validate_texture(&self.features, self.max_texture_size, desc, pixels)?;
        Ok(self.insert_texture(*desc))
    }

    fn delete_texture(&mut self, id: TextureId) {
        if self.textures.remove(&id).is_some() {
            self.log.push(ApiCall::DeleteTexture(id));
        } else {
            Self::unknown("delete", id);
        }
    }

    fn bind_texture(&mut self, id: Option<TextureId>, unit: u32) {
        match id {
            Some(t) if !self.textures.contains_key(&t) => Self::unknown("bind", t),
            _ => self.log.push(ApiCall::BindTexture { id, unit }),
        }
    }

    fn set_texture_filter(&mut self, id: TextureId, filter: FilterMode) -> Result<(), RenderError> {
        let desc = self
            .textures
            .get_mut(&id)
            .ok_or_else(|| RenderError::InvalidArgument(format!("unknown {id:?}")))?;
        let updated = desc.with_filter(filter);
        validate::validate_sampling(&self.features, &updated)?;
        *desc = updated.with_mipmaps(updated.mipmaps || filter.uses_mipmaps());
        self.log.push(ApiCall::SetTextureFilter { id, filter });
        Ok(())
    }

    fn set_texture_wrap(&mut self, id: TextureId, wrap: WrapMode) -> Result<(), RenderError> {
        let desc = self
            .textures
            .get_mut(&id)
            .ok_or_else(|| RenderError::InvalidArgument(format!("unknown {id:?}")))?;
        let updated = desc.with_wrap(wrap);
        validate::validate_sampling(&self.features, &updated)?;
        *desc = updated;
        self.log.push(ApiCall::SetTextureWrap { id, wrap });
        Ok(())
    }

    fn is_texture_valid(&self, id: TextureId) -> bool {
        self.textures.contains_key(&id)
    }

    fn compare_textures(&self, a: TextureId, b: TextureId) -> bool {
        a == b && self.is_texture_valid(a)
    }

    fn create_buffer(&mut self, kind: BufferKind, _usage: BufferUsage, size: usize) -> Result<BufferId, RenderError> {
        validate::validate_buffer(&self.features, kind)?;
        let id = BufferId::new(self.buffer_ids.next());
        self.buffers.insert(
            id,
            BufferState {
                kind,
                data: vec![0; size],
            },
        );
        self.log.push(ApiCall::CreateBuffer { id, kind, size });
        Ok(id)
    }

    fn delete_buffer(&mut self, id: BufferId) {
        if self.buffers.remove(&id).is_some() {
            self.log.push(ApiCall::DeleteBuffer(id));
        } else {
            Self::unknown("delete", id);
        }
    }

    fn bind_buffer(&mut self, id: BufferId) {
        if self.buffers.contains_key(&id) {
            self.log.push(ApiCall::BindBuffer(id));
        } else {
            Self::unknown("bind", id);
        }
    }

    fn unbind_buffer(&mut self, kind: BufferKind) {
        self.log.push(ApiCall::UnbindBuffer(kind));
    }

    fn write_buffer(&mut self, id: BufferId, data: &[u8], _element_size: usize, update: bool) {
        let Some(buffer) = self.buffers.get_mut(&id) else {
            Self::unknown("write", id);
            return;
        };
        if update && data.len() <= buffer.data.len() {
            buffer.data[..data.len()].copy_from_slice(data);
        } else {
            buffer.data = data.to_vec();
        }
        self.log.push(ApiCall::WriteBuffer {
            id,
            data: data.to_vec(),
            update,
        });
    }

    fn is_buffer_valid(&self, id: BufferId) -> bool {
        self.buffers.contains_key(&id)
    }

    fn create_shader(&mut self, stage: ShaderStage, source: &str) -> Result<ShaderId, RenderError> {
        // `#error` is how GLSL sources fail deliberately; honour it so compile
        // failures can be exercised without a driver.
        if source.trim().is_empty() || source.contains("#error") {
            log::error!("headless: {stage:?} shader failed to compile");
            return Err(RenderError::ShaderCompile(format!("{stage:?} shader rejected")));
        }
        let id = ShaderId::new(self.shader_ids.next());
        self.shaders.insert(id, stage);
        self.log.push(ApiCall::CreateShader { id, stage });
        Ok(id)
    }

    fn delete_shader(&mut self, id: ShaderId) {
        if self.shaders.remove(&id).is_some() {
            self.log.push(ApiCall::DeleteShader(id));
        } else {
            Self::unknown("delete", id);
        }
    }

    fn is_shader_valid(&self, id: ShaderId) -> bool {
        self.shaders.contains_key(&id)
    }

    fn create_shader_program(&mut self, vertex: ShaderId, fragment: ShaderId) -> Result<ProgramId, RenderError> {
        let (Some(&vs), Some(&fs)) = (self.shaders.get(&vertex), self.shaders.get(&fragment)) else {
            return Err(RenderError::InvalidArgument(format!(
                "{vertex:?} or {fragment:?} is not a live shader"
            )));
        };
        if (vs, fs) != (ShaderStage::Vertex, ShaderStage::Fragment) {
            log::error!("headless: cannot link {vertex:?} with {fragment:?}");
            panic!("shader program: link failed: {vertex:?} and {fragment:?} are not a vertex/fragment pair");
        }
        let id = ProgramId::new(self.program_ids.next());
        self.programs.insert(id, (vertex, fragment));
        self.log.push(ApiCall::CreateProgram(id));
        Ok(id)
    }

    fn delete_shader_program(&mut self, id: ProgramId) {
        if self.programs.remove(&id).is_some() {
            self.log.push(ApiCall::DeleteProgram(id));
        } else {
            Self::unknown("delete", id);
        }
    }

    fn bind_shader_program(&mut self, id: Option<ProgramId>) {
        match id {
            Some(p) if !self.programs.contains_key(&p) => Self::unknown("bind", p),
            _ => self.log.push(ApiCall::BindProgram(id)),
        }
    }

    fn bind_shader_program_state(&mut self, program: ProgramId, layout: &UniformLayout, data: &[u8]) {
        if !self.programs.contains_key(&program) {
            Self::unknown("state upload", program);
            return;
        }
        debug_assert_eq!(layout.size(), data.len());
        self.log.push(ApiCall::BindProgramState {
            program,
            data: data.to_vec(),
        });
    }

    fn is_program_valid(&self, id: ProgramId) -> bool {
        self.programs.contains_key(&id)
    }

    fn create_vertex_layout(&mut self) -> Result<LayoutId, RenderError> {
        let id = LayoutId::new(self.layout_ids.next());
        self.layouts.insert(id, None);
        self.log.push(ApiCall::CreateLayout(id));
        Ok(id)
    }

    fn delete_vertex_layout(&mut self, id: LayoutId) {
        if self.layouts.remove(&id).is_some() {
            self.log.push(ApiCall::DeleteLayout(id));
        } else {
            Self::unknown("delete", id);
        }
    }

    fn configure_vertex_layout(&mut self, id: LayoutId, desc: &VertexLayoutDesc) -> Result<(), RenderError> {
        let kind_of = |b: BufferId| self.buffers.get(&b).map(|s| s.kind);
        if kind_of(desc.vertex_buffer) != Some(BufferKind::Vertex) {
            return Err(RenderError::InvalidArgument(format!(
                "{:?} is not a live vertex buffer",
                desc.vertex_buffer
            )));
        }
        if let Some(index) = desc.index_buffer
            && kind_of(index) != Some(BufferKind::Index)
        {
            return Err(RenderError::InvalidArgument(format!("{index:?} is not a live index buffer")));
        }
        let slot = self
            .layouts
            .get_mut(&id)
            .ok_or_else(|| RenderError::InvalidArgument(format!("unknown {id:?}")))?;
        *slot = Some(desc.clone());
        self.log.push(ApiCall::ConfigureLayout { id, desc: desc.clone() });
        Ok(())
    }

    fn use_vertex_layout(&mut self, id: LayoutId) {
        match self.layouts.get(&id) {
            Some(Some(_)) => self.log.push(ApiCall::UseLayout(id)),
            Some(None) => log::warn!("headless: {id:?} used before configure"),
            None => Self::unknown("use", id),
        }
    }

    fn stop_vertex_layout(&mut self, id: LayoutId) {
        if self.layouts.contains_key(&id) {
            self.log.push(ApiCall::StopLayout(id));
        } else {
            Self::unknown("stop", id);
        }
    }

    fn create_render_target(&mut self, width: u32, height: u32, format: PixelFormat) -> Result<TargetId, RenderError> {
        validate::validate_render_target(&self.features, self.max_texture_size, width, height, format)?;
        if self.fail_framebuffers {
            log::error!("headless: {width}x{height} framebuffer incomplete");
            return Err(RenderError::IncompleteFramebuffer(FRAMEBUFFER_INCOMPLETE_ATTACHMENT));
        }
        let texture = self.insert_texture(TextureDesc::new(width, height, format));
        let id = TargetId::new(self.target_ids.next());
        self.targets.insert(id, TargetState { texture });
        self.log.push(ApiCall::CreateTarget { id, width, height });
        Ok(id)
    }

    fn delete_render_target(&mut self, id: TargetId) {
        match self.targets.remove(&id) {
            Some(target) => {
                self.textures.remove(&target.texture);
                self.log.push(ApiCall::DeleteTarget(id));
            }
            None => Self::unknown("delete", id),
        }
    }

    fn bind_render_target(&mut self, id: Option<TargetId>) {
        match id {
            Some(t) if !self.targets.contains_key(&t) => Self::unknown("bind", t),
            _ => self.log.push(ApiCall::BindTarget(id)),
        }
    }

    fn render_target_texture(&self, id: TargetId) -> Option<TextureId> {
        self.targets.get(&id).map(|t| t.texture)
    }

    fn is_render_target_valid(&self, id: TargetId) -> bool {
        self.targets.contains_key(&id)
    }

    fn compare_render_targets(&self, a: TargetId, b: TargetId) -> bool {
        a == b && self.is_render_target_valid(a)
    }

    fn draw(&mut self, mode: PrimitiveMode, count: u32, start: u32) {
        self.log.push(ApiCall::Draw { mode, count, start });
    }

    fn draw_indexed(&mut self, mode: PrimitiveMode, count: u32, start: u32, index_type: IndexType) {
        self.log.push(ApiCall::DrawIndexed {
            mode,
            count,
            start,
            index_type,
        });
    }

    fn prepare_for_2d(&mut self) {
        self.log.push(ApiCall::PrepareFor2d);
    }

    fn configure_viewport(&mut self, viewport: Viewport) {
        self.log.push(ApiCall::ConfigureViewport(viewport));
    }

    fn clear(&mut self, color: Color, flags: ClearFlags) {
        self.log.push(ApiCall::Clear { color, flags });
    }
}
