//! OpenGL / OpenGL ES backend on top of `glow`.

use std::collections::HashMap;

use glow::HasContext;

use crate::api::features::{ExtensionSet, FeatureFlags};
use crate::api::format::PixelFormat;
use crate::api::handle::{BufferId, IdAllocator, LayoutId, ProgramId, ShaderId, TargetId, TextureId};
use crate::api::types::*;
use crate::api::uniform::UniformLayout;
use crate::api::{validate, PlatformGraphicsApi, ATTRIB_NAMES};
use crate::coords::{Color, Viewport};
use crate::error::RenderError;

pub mod profile;
pub mod translate;
mod uniforms;

pub use profile::{ExtensionQuery, FormatClass, GlProfile};

use translate::Upload;
use uniforms::UniformLocations;

struct GlTexture {
    raw: glow::Texture,
    desc: TextureDesc,
}

struct GlBuffer {
    raw: glow::Buffer,
    kind: BufferKind,
    usage: BufferUsage,
    capacity: usize,
}

struct GlProgram {
    raw: glow::Program,
    locations: UniformLocations,
}

struct GlLayout {
    vao: Option<glow::VertexArray>,
    desc: Option<VertexLayoutDesc>,
}

struct GlTarget {
    fbo: glow::Framebuffer,
    depth: glow::Renderbuffer,
    texture: TextureId,
}

#[derive(Default)]
struct Ids {
    textures: IdAllocator,
    buffers: IdAllocator,
    shaders: IdAllocator,
    programs: IdAllocator,
    layouts: IdAllocator,
    targets: IdAllocator,
}

/// GL-family backend. Every method assumes the context it was built from is
/// current on the calling thread.
pub struct GlApi {
    gl: glow::Context,
    profile: GlProfile,
    features: FeatureFlags,
    max_texture_size: u32,
    name: String,

    ids: Ids,
    textures: HashMap<TextureId, GlTexture>,
    buffers: HashMap<BufferId, GlBuffer>,
    shaders: HashMap<ShaderId, glow::Shader>,
    programs: HashMap<ProgramId, GlProgram>,
    layouts: HashMap<LayoutId, GlLayout>,
    targets: HashMap<TargetId, GlTarget>,
}

impl GlApi {
    /// Wraps a loaded context and runs feature detection once.
    pub fn new(gl: glow::Context, profile: GlProfile) -> Self {
        let features = detect_features(&gl, &profile);
        // SAFETY: plain state queries on the current context.
        let (max_texture_size, renderer) = unsafe {
            (
                gl.get_parameter_i32(glow::MAX_TEXTURE_SIZE).max(1) as u32,
                gl.get_parameter_string(glow::RENDERER),
            )
        };
        let name = format!("{} ({renderer})", profile.request());
        log::info!("gl: {name}, max texture {max_texture_size}");
        log::debug!("gl: features {features:?}");

        Self {
            gl,
            profile,
            features,
            max_texture_size,
            name,
            ids: Ids::default(),
            textures: HashMap::new(),
            buffers: HashMap::new(),
            shaders: HashMap::new(),
            programs: HashMap::new(),
            layouts: HashMap::new(),
            targets: HashMap::new(),
        }
    }

    pub fn profile(&self) -> &GlProfile {
        &self.profile
    }

    /// Applies filter, wrap and anisotropy to the texture bound on `TEXTURE_2D`.
    fn apply_sampling(&self, desc: &TextureDesc) {
        let gl = &self.gl;
        let (min, mag) = translate::filter(desc.filter, desc.mipmaps);
        let wrap = translate::wrap(desc.wrap) as i32;
        unsafe {
            gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_MIN_FILTER, min as i32);
            gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_MAG_FILTER, mag as i32);
            gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_WRAP_S, wrap);
            gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_WRAP_T, wrap);
            if self.features.max_anisotropy > 0.0 {
                let level = match desc.filter {
                    FilterMode::Anisotropic(n) => f32::from(n).clamp(1.0, self.features.max_anisotropy),
                    _ => 1.0,
                };
                gl.tex_parameter_f32(glow::TEXTURE_2D, translate::TEXTURE_MAX_ANISOTROPY, level);
            }
        }
    }

    fn texture_for_update(&self, id: TextureId) -> Result<&GlTexture, RenderError> {
        self.textures
            .get(&id)
            .ok_or_else(|| RenderError::InvalidArgument(format!("unknown {id:?}")))
    }

    fn update_sampling(&mut self, id: TextureId, updated: TextureDesc) -> Result<(), RenderError> {
        validate::validate_sampling(&self.features, &updated)?;
        let texture = self.texture_for_update(id)?;
        let needs_mips = updated.filter.uses_mipmaps() && !texture.desc.mipmaps;
        let desc = updated.with_mipmaps(updated.mipmaps || needs_mips);
        let raw = texture.raw;
        unsafe {
            self.gl.active_texture(glow::TEXTURE0);
            self.gl.bind_texture(glow::TEXTURE_2D, Some(raw));
            if needs_mips {
                self.gl.generate_mipmap(glow::TEXTURE_2D);
            }
        }
        self.apply_sampling(&desc);
        if let Some(texture) = self.textures.get_mut(&id) {
            texture.desc = desc;
        }
        Ok(())
    }

    fn specify_attributes(&self, desc: &VertexLayoutDesc) {
        let gl = &self.gl;
        let (Some(vertex), index) = (
            self.buffers.get(&desc.vertex_buffer),
            desc.index_buffer.and_then(|i| self.buffers.get(&i)),
        ) else {
            log::warn!("gl: layout references a deleted vertex buffer");
            return;
        };
        unsafe {
            gl.bind_buffer(glow::ARRAY_BUFFER, Some(vertex.raw));
            if let Some(index) = index {
                gl.bind_buffer(glow::ELEMENT_ARRAY_BUFFER, Some(index.raw));
            }
            for e in &desc.elements {
                let ty = match e.kind {
                    AttributeKind::F32 => glow::FLOAT,
                    AttributeKind::U8 => glow::UNSIGNED_BYTE,
                };
                gl.enable_vertex_attrib_array(e.location);
                gl.vertex_attrib_pointer_f32(
                    e.location,
                    e.components as i32,
                    ty,
                    e.normalized,
                    desc.stride as i32,
                    e.offset as i32,
                );
            }
        }
    }

    fn unknown(what: &str, id: impl std::fmt::Debug) {
        log::warn!("gl: ignoring {what} of unknown {id:?}");
    }
}

fn detect_features(gl: &glow::Context, profile: &GlProfile) -> FeatureFlags {
    // SAFETY: string queries on the current context.
    let extensions = unsafe {
        match profile.extension_query {
            ExtensionQuery::Indexed => {
                let count = gl.get_parameter_i32(glow::NUM_EXTENSIONS).max(0) as u32;
                let mut names = Vec::with_capacity(count as usize);
                for i in 0..count {
                    names.push(gl.get_parameter_indexed_string(glow::EXTENSIONS, i));
                }
                ExtensionSet::from_indexed(names)
            }
            ExtensionQuery::Legacy => ExtensionSet::parse_legacy(&gl.get_parameter_string(glow::EXTENSIONS)),
        }
    };
    log::debug!("gl: {} extensions", extensions.len());

    FeatureFlags::detect(profile.core_features, &extensions, || unsafe {
        gl.get_parameter_f32(translate::MAX_TEXTURE_MAX_ANISOTROPY)
    })
}

// SAFETY (all `unsafe` blocks below): every native object passed to `gl` was
// created by this backend on the same context and is still live, which the id
// maps guarantee.
impl PlatformGraphicsApi for GlApi {
    fn name(&self) -> &str {
        &self.name
    }

    fn features(&self) -> &FeatureFlags {
        &self.features
    }

    fn shader_dialect(&self) -> ShaderDialect {
        self.profile.dialect
    }

    fn max_texture_size(&self) -> u32 {
        self.max_texture_size
    }

    fn create_texture(&mut self, desc: &TextureDesc, pixels: Option<&[u8]>) -> Result<TextureId, RenderError> {
        validate::validate_texture(&self.features, self.max_texture_size, desc, pixels)?;

        let gl = &self.gl;
        let raw = unsafe { gl.create_texture() }.map_err(|e| {
            log::error!("gl: texture creation failed: {e}");
            RenderError::creation("texture", e)
        })?;

        let mipmaps = desc.mipmaps || desc.filter.uses_mipmaps();
        let desc = desc.with_mipmaps(mipmaps);
        let (w, h) = (desc.width as i32, desc.height as i32);
        unsafe {
            gl.active_texture(glow::TEXTURE0);
            gl.bind_texture(glow::TEXTURE_2D, Some(raw));
            gl.pixel_store_i32(glow::UNPACK_ALIGNMENT, 1);

            match translate::upload_format(self.profile.format_class, desc.format) {
                Upload::Plain {
                    internal,
                    format,
                    ty,
                    swizzle,
                } => {
                    gl.tex_image_2d(
                        glow::TEXTURE_2D,
                        0,
                        internal as i32,
                        w,
                        h,
                        0,
                        format,
                        ty,
                        glow::PixelUnpackData::Slice(pixels),
                    );
                    if let Some([r, g, b, a]) = swizzle {
                        gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_SWIZZLE_R, r as i32);
                        gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_SWIZZLE_G, g as i32);
                        gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_SWIZZLE_B, b as i32);
                        gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_SWIZZLE_A, a as i32);
                    }
                }
                Upload::Compressed { internal } => {
                    let data = pixels.unwrap_or_default();
                    gl.compressed_tex_image_2d(glow::TEXTURE_2D, 0, internal as i32, w, h, 0, data.len() as i32, data);
                }
            }

            if mipmaps {
                gl.generate_mipmap(glow::TEXTURE_2D);
            }
        }
        self.apply_sampling(&desc);
        unsafe { self.gl.bind_texture(glow::TEXTURE_2D, None) };

        let id = TextureId::new(self.ids.textures.next());
        self.textures.insert(id, GlTexture { raw, desc });
        log::debug!("gl: created {id:?} {}x{} {:?}", desc.width, desc.height, desc.format);
        Ok(id)
    }

    fn delete_texture(&mut self, id: TextureId) {
        match self.textures.remove(&id) {
            Some(texture) => unsafe { self.gl.delete_texture(texture.raw) },
            None => Self::unknown("delete", id),
        }
    }

    fn bind_texture(&mut self, id: Option<TextureId>, unit: u32) {
        let raw = match id {
            Some(id) => match self.textures.get(&id) {
                Some(texture) => Some(texture.raw),
                None => return Self::unknown("bind", id),
            },
            None => None,
        };
        unsafe {
            self.gl.active_texture(glow::TEXTURE0 + unit);
            self.gl.bind_texture(glow::TEXTURE_2D, raw);
        }
    }

    fn set_texture_filter(&mut self, id: TextureId, filter: FilterMode) -> Result<(), RenderError> {
        let updated = self.texture_for_update(id)?.desc.with_filter(filter);
        self.update_sampling(id, updated)
    }

    fn set_texture_wrap(&mut self, id: TextureId, wrap: WrapMode) -> Result<(), RenderError> {
        let updated = self.texture_for_update(id)?.desc.with_wrap(wrap);
        self.update_sampling(id, updated)
    }

    fn is_texture_valid(&self, id: TextureId) -> bool {
        self.textures.contains_key(&id)
    }

    fn compare_textures(&self, a: TextureId, b: TextureId) -> bool {
        match (self.textures.get(&a), self.textures.get(&b)) {
            (Some(x), Some(y)) => x.raw == y.raw,
            _ => false,
        }
    }

    fn create_buffer(&mut self, kind: BufferKind, usage: BufferUsage, size: usize) -> Result<BufferId, RenderError> {
        validate::validate_buffer(&self.features, kind)?;

        let gl = &self.gl;
        let raw = unsafe { gl.create_buffer() }.map_err(|e| {
            log::error!("gl: buffer creation failed: {e}");
            RenderError::creation("buffer", e)
        })?;
        let target = translate::buffer_target(kind);
        unsafe {
            gl.bind_buffer(target, Some(raw));
            if size > 0 {
                gl.buffer_data_size(target, size as i32, translate::buffer_usage(usage));
            }
            gl.bind_buffer(target, None);
        }

        let id = BufferId::new(self.ids.buffers.next());
        self.buffers.insert(
            id,
            GlBuffer {
                raw,
                kind,
                usage,
                capacity: size,
            },
        );
        log::debug!("gl: created {id:?} {kind:?} ({size} bytes)");
        Ok(id)
    }

    fn delete_buffer(&mut self, id: BufferId) {
        match self.buffers.remove(&id) {
            Some(buffer) => unsafe { self.gl.delete_buffer(buffer.raw) },
            None => Self::unknown("delete", id),
        }
    }

    fn bind_buffer(&mut self, id: BufferId) {
        match self.buffers.get(&id) {
            Some(b) => unsafe { self.gl.bind_buffer(translate::buffer_target(b.kind), Some(b.raw)) },
            None => Self::unknown("bind", id),
        }
    }

    fn unbind_buffer(&mut self, kind: BufferKind) {
        unsafe { self.gl.bind_buffer(translate::buffer_target(kind), None) }
    }

    fn write_buffer(&mut self, id: BufferId, data: &[u8], element_size: usize, update: bool) {
        let Some(buffer) = self.buffers.get_mut(&id) else {
            return Self::unknown("write", id);
        };
        debug_assert!(element_size == 0 || data.len() % element_size == 0);

        let target = translate::buffer_target(buffer.kind);
        unsafe {
            self.gl.bind_buffer(target, Some(buffer.raw));
            if update && data.len() <= buffer.capacity {
                self.gl.buffer_sub_data_u8_slice(target, 0, data);
            } else {
                self.gl.buffer_data_u8_slice(target, data, translate::buffer_usage(buffer.usage));
                buffer.capacity = data.len();
            }
        }
    }

    fn is_buffer_valid(&self, id: BufferId) -> bool {
        self.buffers.contains_key(&id)
    }

    fn create_shader(&mut self, stage: ShaderStage, source: &str) -> Result<ShaderId, RenderError> {
        let gl = &self.gl;
        let raw = unsafe { gl.create_shader(translate::shader_stage(stage)) }.map_err(|e| {
            log::error!("gl: shader creation failed: {e}");
            RenderError::creation("shader", e)
        })?;
        unsafe {
            gl.shader_source(raw, source);
            gl.compile_shader(raw);
            if !gl.get_shader_compile_status(raw) {
                let info = gl.get_shader_info_log(raw);
                gl.delete_shader(raw);
                log::error!("gl: {stage:?} shader failed to compile: {info}");
                return Err(RenderError::ShaderCompile(info));
            }
        }

        let id = ShaderId::new(self.ids.shaders.next());
        self.shaders.insert(id, raw);
        Ok(id)
    }

    fn delete_shader(&mut self, id: ShaderId) {
        match self.shaders.remove(&id) {
            Some(raw) => unsafe { self.gl.delete_shader(raw) },
            None => Self::unknown("delete", id),
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

        let gl = &self.gl;
        let raw = unsafe { gl.create_program() }.map_err(|e| {
            log::error!("gl: program creation failed: {e}");
            RenderError::creation("shader program", e)
        })?;
        unsafe {
            gl.attach_shader(raw, vs);
            gl.attach_shader(raw, fs);
            for (location, name) in ATTRIB_NAMES {
                gl.bind_attrib_location(raw, location, name);
            }
            gl.link_program(raw);
            gl.detach_shader(raw, vs);
            gl.detach_shader(raw, fs);

            if !gl.get_program_link_status(raw) {
                let info = gl.get_program_info_log(raw);
                gl.delete_program(raw);
                log::error!("gl: program link failed: {info}");
                panic!("shader program: link failed: {info}");
            }
        }

        let id = ProgramId::new(self.ids.programs.next());
        self.programs.insert(
            id,
            GlProgram {
                raw,
                locations: UniformLocations::default(),
            },
        );
        log::debug!("gl: linked {id:?}");
        Ok(id)
    }

    fn delete_shader_program(&mut self, id: ProgramId) {
        match self.programs.remove(&id) {
            Some(program) => unsafe { self.gl.delete_program(program.raw) },
            None => Self::unknown("delete", id),
        }
    }

    fn bind_shader_program(&mut self, id: Option<ProgramId>) {
        let raw = match id {
            Some(id) => match self.programs.get(&id) {
                Some(program) => Some(program.raw),
                None => return Self::unknown("bind", id),
            },
            None => None,
        };
        unsafe { self.gl.use_program(raw) }
    }

    fn bind_shader_program_state(&mut self, program: ProgramId, layout: &UniformLayout, data: &[u8]) {
        let Some(p) = self.programs.get_mut(&program) else {
            return Self::unknown("state upload", program);
        };
        unsafe { self.gl.use_program(Some(p.raw)) };
        uniforms::upload(&self.gl, p.raw, &mut p.locations, layout, data);
    }

    fn is_program_valid(&self, id: ProgramId) -> bool {
        self.programs.contains_key(&id)
    }

    fn create_vertex_layout(&mut self) -> Result<LayoutId, RenderError> {
        let vao = if self.features.vertex_array_objects {
            let vao = unsafe { self.gl.create_vertex_array() }.map_err(|e| {
                log::error!("gl: vertex array creation failed: {e}");
                RenderError::creation("vertex layout", e)
            })?;
            Some(vao)
        } else {
            None
        };

        let id = LayoutId::new(self.ids.layouts.next());
        self.layouts.insert(id, GlLayout { vao, desc: None });
        Ok(id)
    }

    fn delete_vertex_layout(&mut self, id: LayoutId) {
        match self.layouts.remove(&id) {
            Some(GlLayout { vao: Some(vao), .. }) => unsafe { self.gl.delete_vertex_array(vao) },
            Some(_) => {}
            None => Self::unknown("delete", id),
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
        let Some(vao) = self.layouts.get(&id).map(|l| l.vao) else {
            return Err(RenderError::InvalidArgument(format!("unknown {id:?}")));
        };

        if let Some(vao) = vao {
            unsafe { self.gl.bind_vertex_array(Some(vao)) };
            self.specify_attributes(desc);
            unsafe {
                self.gl.bind_vertex_array(None);
                self.gl.bind_buffer(glow::ARRAY_BUFFER, None);
            }
        }
        if let Some(layout) = self.layouts.get_mut(&id) {
            layout.desc = Some(desc.clone());
        }
        Ok(())
    }

    fn use_vertex_layout(&mut self, id: LayoutId) {
        let Some(layout) = self.layouts.get(&id) else {
            return Self::unknown("use", id);
        };
        match (layout.vao, &layout.desc) {
            (_, None) => log::warn!("gl: {id:?} used before configure"),
            (Some(vao), Some(_)) => unsafe { self.gl.bind_vertex_array(Some(vao)) },
            (None, Some(desc)) => self.specify_attributes(desc),
        }
    }

    fn stop_vertex_layout(&mut self, id: LayoutId) {
        let Some(layout) = self.layouts.get(&id) else {
            return Self::unknown("stop", id);
        };
        unsafe {
            match (layout.vao, &layout.desc) {
                (Some(_), _) => self.gl.bind_vertex_array(None),
                (None, Some(desc)) => {
                    for e in &desc.elements {
                        self.gl.disable_vertex_attrib_array(e.location);
                    }
                }
                (None, None) => {}
            }
        }
    }

    fn create_render_target(&mut self, width: u32, height: u32, format: PixelFormat) -> Result<TargetId, RenderError> {
        validate::validate_render_target(&self.features, self.max_texture_size, width, height, format)?;

        let texture = self.create_texture(&TextureDesc::new(width, height, format), None)?;
        let Some(color) = self.textures.get(&texture).map(|t| t.raw) else {
            return Err(RenderError::creation("render target", "color texture vanished"));
        };

        let fbo = match unsafe { self.gl.create_framebuffer() } {
            Ok(fbo) => fbo,
            Err(e) => {
                self.delete_texture(texture);
                log::error!("gl: framebuffer creation failed: {e}");
                return Err(RenderError::creation("render target", e));
            }
        };
        let depth = match unsafe { self.gl.create_renderbuffer() } {
            Ok(rb) => rb,
            Err(e) => {
                unsafe { self.gl.delete_framebuffer(fbo) };
                self.delete_texture(texture);
                log::error!("gl: renderbuffer creation failed: {e}");
                return Err(RenderError::creation("render target", e));
            }
        };

        let status = {
            let gl = &self.gl;
            unsafe {
                gl.bind_renderbuffer(glow::RENDERBUFFER, Some(depth));
                gl.renderbuffer_storage(glow::RENDERBUFFER, glow::DEPTH_COMPONENT16, width as i32, height as i32);
                gl.bind_renderbuffer(glow::RENDERBUFFER, None);

                gl.bind_framebuffer(glow::FRAMEBUFFER, Some(fbo));
                gl.framebuffer_texture_2d(glow::FRAMEBUFFER, glow::COLOR_ATTACHMENT0, glow::TEXTURE_2D, Some(color), 0);
                gl.framebuffer_renderbuffer(glow::FRAMEBUFFER, glow::DEPTH_ATTACHMENT, glow::RENDERBUFFER, Some(depth));
                let status = gl.check_framebuffer_status(glow::FRAMEBUFFER);
                gl.bind_framebuffer(glow::FRAMEBUFFER, None);
                status
            }
        };

        if status != glow::FRAMEBUFFER_COMPLETE {
            unsafe {
                self.gl.delete_framebuffer(fbo);
                self.gl.delete_renderbuffer(depth);
            }
            self.delete_texture(texture);
            log::error!("gl: framebuffer incomplete (0x{status:04X})");
            return Err(RenderError::IncompleteFramebuffer(status));
        }

        let id = TargetId::new(self.ids.targets.next());
        self.targets.insert(id, GlTarget { fbo, depth, texture });
        log::debug!("gl: created {id:?} {width}x{height} {format:?}");
        Ok(id)
    }

    fn delete_render_target(&mut self, id: TargetId) {
        let Some(target) = self.targets.remove(&id) else {
            return Self::unknown("delete", id);
        };
        unsafe {
            self.gl.delete_framebuffer(target.fbo);
            self.gl.delete_renderbuffer(target.depth);
        }
        self.delete_texture(target.texture);
    }

    fn bind_render_target(&mut self, id: Option<TargetId>) {
        let fbo = match id {
            Some(id) => match self.targets.get(&id) {
                Some(target) => Some(target.fbo),
                None => return Self::unknown("bind", id),
            },
            None => None,
        };
        unsafe { self.gl.bind_framebuffer(glow::FRAMEBUFFER, fbo) }
    }

    fn render_target_texture(&self, id: TargetId) -> Option<TextureId> {
        self.targets.get(&id).map(|t| t.texture)
    }

    fn is_render_target_valid(&self, id: TargetId) -> bool {
        self.targets.contains_key(&id)
    }

    fn compare_render_targets(&self, a: TargetId, b: TargetId) -> bool {
        match (self.targets.get(&a), self.targets.get(&b)) {
            (Some(x), Some(y)) => x.fbo == y.fbo,
            _ => false,
        }
    }

    fn draw(&mut self, mode: PrimitiveMode, count: u32, start: u32) {
        unsafe { self.gl.draw_arrays(translate::primitive(mode), start as i32, count as i32) }
    }

    fn draw_indexed(&mut self, mode: PrimitiveMode, count: u32, start: u32, index_type: IndexType) {
        let offset = start as usize * index_type.size();
        unsafe {
            self.gl.draw_elements(
                translate::primitive(mode),
                count as i32,
                translate::index_type(index_type),
                offset as i32,
            )
        }
    }

    fn prepare_for_2d(&mut self) {
        unsafe {
            self.gl.enable(glow::BLEND);
            self.gl.blend_func(glow::SRC_ALPHA, glow::ONE_MINUS_SRC_ALPHA);
            self.gl.disable(glow::DEPTH_TEST);
            self.gl.disable(glow::CULL_FACE);
        }
    }

    fn configure_viewport(&mut self, viewport: Viewport) {
        unsafe {
            self.gl.viewport(
                viewport.x,
                viewport.y,
                viewport.width as i32,
                viewport.height as i32,
            )
        }
    }

    fn clear(&mut self, color: Color, flags: ClearFlags) {
        let [r, g, b, a] = color.to_f32();
        let mut mask = 0;
        if flags.color {
            mask |= glow::COLOR_BUFFER_BIT;
        }
        if flags.depth {
            mask |= glow::DEPTH_BUFFER_BIT;
        }
        unsafe {
            self.gl.clear_color(r, g, b, a);
            self.gl.clear(mask);
        }
    }
}
