use std::collections::HashMap;

use glam::{Mat4, Vec2, Vec3};

use super::batch::{BatchItem, Buckets, DrawRun};
use super::shaders;
use super::vertex::{PrimitiveType, Vertex};
use crate::api::{
    BufferKind, BufferUsage, Feature, FilterMode, IndexType, LeafType, PixelFormat, ProgramId, TextureDesc, TextureId,
    UniformDecl,
};
use crate::coords::{Color, Rect};
use crate::device::{GraphicsDevice, MatrixStack};
use crate::error::RenderError;
use crate::resources::{Buffer, RenderTarget, ShaderProgram, ShaderProgramState, Texture2D, VertexLayout};

/// Nested `push_matrix` calls allowed on a renderer.
pub const TRANSFORM_STACK_CAPACITY: usize = 32;

/// Largest staging size drawable with 16-bit indices.
const U16_INDEX_LIMIT: usize = u16::MAX as usize + 1;

/// Renderer construction options.
#[derive(Debug, Clone)]
pub struct RendererConfig {
    /// Staging capacity in vertices. Above 65 536 the backend must support
    /// 32-bit indices.
    pub max_vertices: usize,
    pub clear_color: Color,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            max_vertices: 65_536,
            clear_color: Color::BLACK,
        }
    }
}

/// Counters for one `render()` (including overflow and target flushes
/// since the previous one).
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct RenderStats {
    pub draw_calls: u32,
    pub texture_binds: u32,
    pub program_binds: u32,
    pub vertices: u32,
    pub flushes: u32,
}

/// A textured quad in destination pixels, as queued by `Texture2D::draw`
/// and `RenderTarget::draw`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct TexturedQuad {
    pub texture: TextureId,
    pub texture_size: Vec2,
    pub dest: Rect,
    /// Source region in texture pixels; whole texture when `None`.
    pub src: Option<Rect>,
    pub color: Color,
    /// Pivot in destination pixels, placed at `dest.origin`.
    pub origin: Vec2,
    /// Radians, clockwise on screen.
    pub rotation: f32,
    pub flip_v: bool,
}

/// State marking the next item.
#[derive(Debug, Copy, Clone)]
struct Pending {
    texture: Option<TextureId>,
    program: Option<ProgramId>,
    z: f32,
}

#[derive(Debug, Copy, Clone)]
struct OpenItem {
    primitive: PrimitiveType,
    texture: TextureId,
    program: ProgramId,
    z: f32,
    first: u32,
}

impl OpenItem {
    fn close(&self, count: usize) -> BatchItem {
        BatchItem {
            primitive: self.primitive,
            texture: self.texture,
            program: self.program,
            z: self.z,
            first: self.first,
            count: count as u32,
        }
    }
}

/// Batching 2D renderer.
///
/// Vertices are staged between `begin_vertices` / `end_vertices`, sorted into
/// Z buckets and drawn by [`render`](Self::render) with as few state changes
/// and draw calls as adjacency allows.
///
/// The renderer owns its [`GraphicsDevice`]; target and view changes go
/// through the renderer so pending batches are drawn with the state they
/// were submitted under.
pub struct Renderer {
    device: GraphicsDevice,
    clear_color: Color,

    capacity: usize,
    vertices: Vec<Vertex>,
    buckets: Buckets,
    open: Option<OpenItem>,
    pending: Pending,
    transform: MatrixStack,
    rendering: bool,

    index_type: IndexType,
    indices: Vec<u32>,
    runs: Vec<DrawRun>,

    vertex_buffer: Buffer,
    index_buffer: Buffer,
    layout: VertexLayout,
    default_program: ShaderProgram,
    default_id: ProgramId,
    white: Texture2D,
    states: HashMap<ProgramId, ShaderProgramState>,

    frame_stats: RenderStats,
    last_stats: RenderStats,
}

impl Renderer {
    pub fn new(device: GraphicsDevice, config: RendererConfig) -> Result<Self, RenderError> {
        let capacity = config.max_vertices;
        if capacity < 4 {
            return Err(RenderError::InvalidArgument(format!(
                "renderer staging capacity {capacity} cannot hold a quad"
            )));
        }
        let index_type = if capacity <= U16_INDEX_LIMIT {
            IndexType::U16
        } else {
            device.features().require("renderer", Feature::ElementIndexUint)?;
            IndexType::U32
        };

        let dialect = device.api().borrow().shader_dialect();
        let (vs, fs) = shaders::sprite_sources(dialect);
        let default_program = ShaderProgram::from_sources(
            &device,
            &vs,
            &fs,
            [
                UniformDecl::leaf("mvp", LeafType::Matrix4),
                UniformDecl::leaf("tex", LeafType::Sampler2D),
            ],
        )?;

        let white = Texture2D::new(
            &device,
            TextureDesc::new(1, 1, PixelFormat::R8G8B8A8).with_filter(FilterMode::Nearest),
            Some(&[255; 4]),
        )?;

        let vertex_buffer = Buffer::new(
            &device,
            BufferKind::Vertex,
            BufferUsage::Dynamic,
            capacity * Vertex::STRIDE as usize,
        )?;
        let index_buffer = Buffer::new(
            &device,
            BufferKind::Index,
            BufferUsage::Dynamic,
            PrimitiveType::Quads.index_count(capacity) * index_type.size(),
        )?;

        let mut layout = VertexLayout::new(&device)?;
        layout.set_vertex_buffer(&vertex_buffer);
        layout.set_index_buffer(&index_buffer);
        Vertex::describe(&mut layout);
        layout.configure()?;

        let default_state = ShaderProgramState::new(&default_program);
        let default_id = default_state.program();
        let states = HashMap::from([(default_id, default_state)]);

        log::info!("renderer: {capacity} staged vertices, {index_type:?} indices, {dialect:?}");

        Ok(Self {
            device,
            clear_color: config.clear_color,
            capacity,
            vertices: Vec::with_capacity(capacity),
            buckets: Buckets::default(),
            open: None,
            pending: Pending {
                texture: None,
                program: None,
                z: 0.0,
            },
            transform: MatrixStack::new("renderer", TRANSFORM_STACK_CAPACITY),
            rendering: false,
            index_type,
            indices: Vec::new(),
            runs: Vec::new(),
            vertex_buffer,
            index_buffer,
            layout,
            default_program,
            default_id,
            white,
            states,
            frame_stats: RenderStats::default(),
            last_stats: RenderStats::default(),
        })
    }

    #[inline]
    pub fn device(&self) -> &GraphicsDevice {
        &self.device
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[inline]
    pub fn index_type(&self) -> IndexType {
        self.index_type
    }

    /// Vertices waiting for the next flush.
    #[inline]
    pub fn staged_vertices(&self) -> usize {
        self.vertices.len()
    }

    /// Closed items waiting for the next flush.
    pub fn pending_items(&self) -> usize {
        self.buckets.len()
    }

    #[inline]
    pub fn in_batch(&self) -> bool {
        self.open.is_some()
    }

    /// Counters of the last completed `render()`.
    #[inline]
    pub fn stats(&self) -> RenderStats {
        self.last_stats
    }

    pub fn default_program(&self) -> &ShaderProgram {
        &self.default_program
    }

    /// Texture of the next item; `None` draws with a white texel.
    pub fn set_texture(&mut self, texture: Option<&Texture2D>) {
        self.pending.texture = texture.map(Texture2D::id);
    }

    pub fn set_texture_id(&mut self, texture: Option<TextureId>) {
        self.pending.texture = texture;
    }

    /// Program of the next item; `None` selects the built-in sprite program.
    ///
    /// # Panics
    /// If `program` is not finalized.
    pub fn set_shader(&mut self, program: Option<&ShaderProgram>) {
        self.pending.program = match program {
            Some(p) => Some(self.program_state(p).program()),
            None => None,
        };
    }

    pub fn set_z_index(&mut self, z: f32) {
        self.pending.z = z;
    }

    /// Uniform state the renderer uploads whenever it binds `program`.
    /// `mvp`, when declared, is overwritten at every bind.
    ///
    /// # Panics
    /// If `program` is not finalized.
    pub fn program_state(&mut self, program: &ShaderProgram) -> &mut ShaderProgramState {
        let Some(id) = program.id() else {
            panic!("renderer: shader program is not finalized");
        };
        self.states.entry(id).or_insert_with(|| ShaderProgramState::new(program))
    }

    /// Opens an item with the current texture, program and Z.
    ///
    /// # Panics
    /// If an item is already open.
    pub fn begin_vertices(&mut self, primitive: PrimitiveType) {
        assert!(self.open.is_none(), "renderer: begin_vertices inside a batch");
        self.open = Some(OpenItem {
            primitive,
            texture: self.pending.texture.unwrap_or_else(|| self.white.id()),
            program: self.pending.program.unwrap_or(self.default_id),
            z: self.pending.z,
            first: self.vertices.len() as u32,
        });
    }

    /// Stages one vertex, transformed by the current matrix. A full staging
    /// array is flushed first; an unfinished primitive carries over.
    ///
    /// # Panics
    /// Outside `begin_vertices` / `end_vertices`.
    pub fn push_vertex(&mut self, vertex: Vertex) {
        assert!(self.open.is_some(), "renderer: push_vertex outside a batch");
        if self.vertices.len() == self.capacity {
            self.overflow();
        }
        let v = self.transformed(vertex);
        self.vertices.push(v);
    }

    /// Stages a slice, flushing first when it does not fit. The slice stays
    /// in one flush unless the unfinished primitive carried over by that
    /// flush leaves too little room, in which case it is staged vertex by
    /// vertex and splits at a primitive boundary.
    ///
    /// # Panics
    /// Outside a batch, or if `vertices` alone exceeds the staging capacity.
    pub fn push_vertices(&mut self, vertices: &[Vertex]) {
        assert!(self.open.is_some(), "renderer: push_vertices outside a batch");
        assert!(
            vertices.len() <= self.capacity,
            "renderer: push_vertices of {} exceeds staging capacity {}",
            vertices.len(),
            self.capacity
        );
        if self.vertices.len() + vertices.len() > self.capacity {
            self.overflow();
        }
        if self.vertices.len() + vertices.len() > self.capacity {
            vertices.iter().for_each(|v| self.push_vertex(*v));
            return;
        }
        let top = self.transform.top();
        self.vertices
            .extend(vertices.iter().map(|v| Self::transform_vertex(top, *v)));
    }

    /// Closes the open item. Empty items are discarded.
    ///
    /// # Panics
    /// If no item is open.
    pub fn end_vertices(&mut self) {
        let Some(open) = self.open.take() else {
            panic!("renderer: end_vertices without begin_vertices");
        };
        let count = self.vertices.len() - open.first as usize;
        if count > 0 {
            self.buckets.push(open.close(count));
        }
    }

    /// Closes the open item at its last whole primitive, draws everything,
    /// and reopens it at offset 0 with the unfinished primitive.
    fn overflow(&mut self) {
        let Some(mut open) = self.open.take() else {
            return;
        };
        let first = open.first as usize;
        let complete = open.primitive.complete_len(self.vertices.len() - first);
        if complete > 0 {
            self.buckets.push(open.close(complete));
        }

        let carry: Vec<Vertex> = match open.primitive {
            // Continue the fan from its center and rim edge.
            PrimitiveType::TriangleFan if complete > 0 => {
                vec![self.vertices[first], self.vertices[self.vertices.len() - 1]]
            }
            _ => self.vertices[first + complete..].to_vec(),
        };

        log::debug!(
            "renderer: staging full ({} vertices), flushing with {} carried",
            self.capacity,
            carry.len()
        );
        self.flush();

        self.vertices.extend(carry);
        open.first = 0;
        self.open = Some(open);
    }

    fn transformed(&self, vertex: Vertex) -> Vertex {
        Self::transform_vertex(self.transform.top(), vertex)
    }

    fn transform_vertex(m: Mat4, vertex: Vertex) -> Vertex {
        let p = m.transform_point3(Vec3::from_array(vertex.position));
        Vertex {
            position: p.to_array(),
            ..vertex
        }
    }

    /// Draws and clears everything staged.
    ///
    /// # Panics
    /// Inside a batch, or when a previous render unwound mid-pass.
    pub fn render(&mut self) {
        assert!(self.open.is_none(), "renderer: render inside a batch");
        self.flush();
        self.last_stats = std::mem::take(&mut self.frame_stats);
    }

    fn flush(&mut self) {
        assert!(!self.rendering, "renderer: render re-entered");
        if self.buckets.is_empty() {
            self.vertices.clear();
            return;
        }
        self.rendering = true;

        self.buckets.sort();
        self.indices.clear();
        self.runs.clear();
        self.buckets.build_runs(&mut self.indices, &mut self.runs);

        if !self.runs.is_empty() {
            self.upload();
            self.draw_runs();
        }

        self.frame_stats.vertices += self.vertices.len() as u32;
        self.frame_stats.flushes += 1;
        self.vertices.clear();
        self.buckets.clear();
        self.prune_states();
        self.rendering = false;
    }

    /// Forgets uniform state of programs that have been deleted.
    fn prune_states(&mut self) {
        let api = self.device.api().borrow();
        let before = self.states.len();
        self.states.retain(|id, _| api.is_program_valid(*id));
        if self.states.len() != before {
            log::debug!("renderer: dropped state of {} deleted programs", before - self.states.len());
        }
    }

    /// Drops every staged vertex and closed item without drawing.
    ///
    /// # Panics
    /// Inside a batch.
    pub fn discard(&mut self) {
        assert!(self.open.is_none(), "renderer: discard inside a batch");
        self.vertices.clear();
        self.buckets.clear();
    }

    fn upload(&mut self) {
        self.vertex_buffer.write(&self.vertices, true);
        match self.index_type {
            IndexType::U16 => {
                let short: Vec<u16> = self.indices.iter().map(|&i| i as u16).collect();
                self.index_buffer.write(&short, true);
            }
            IndexType::U32 => self.index_buffer.write(&self.indices, true),
        }
    }

    fn draw_runs(&mut self) {
        let mvp = self.device.view_projection();
        let mut bound_program = None;
        let mut bound_texture = None;

        self.layout.use_layout();
        for run in &self.runs {
            if bound_program != Some(run.program) {
                self.device.api_mut().bind_shader_program(Some(run.program));
                match self.states.get_mut(&run.program) {
                    Some(state) => {
                        match state.set_uniform_value("mvp", &mvp) {
                            Ok(()) | Err(RenderError::UnknownUniform(_)) => {}
                            Err(e) => log::warn!("renderer: {e}"),
                        }
                        state.apply(&self.device);
                    }
                    None => log::warn!("renderer: no uniform state for {:?}", run.program),
                }
                bound_program = Some(run.program);
                self.frame_stats.program_binds += 1;
            }
            if bound_texture != Some(run.texture) {
                self.device.api_mut().bind_texture(Some(run.texture), 0);
                bound_texture = Some(run.texture);
                self.frame_stats.texture_binds += 1;
            }
            self.device
                .api_mut()
                .draw_indexed(run.mode, run.count, run.start, self.index_type);
            self.frame_stats.draw_calls += 1;
        }
        self.layout.stop();
    }

    /// Clears color and depth of the current target. Staged vertices are
    /// not affected.
    pub fn clear(&mut self) {
        self.device.clear(self.clear_color);
    }

    pub fn set_clear_color(&mut self, color: Color) {
        self.clear_color = color;
    }

    #[inline]
    pub fn clear_color(&self) -> Color {
        self.clear_color
    }

    pub fn push_matrix(&mut self) {
        self.transform.push();
    }

    pub fn pop_matrix(&mut self) {
        self.transform.pop();
    }

    pub fn load_identity(&mut self) {
        self.transform.load_identity();
    }

    pub fn translate(&mut self, x: f32, y: f32) {
        self.transform.post_mult(Mat4::from_translation(Vec3::new(x, y, 0.0)));
    }

    /// Rotates subsequent vertices by `angle` radians about the current origin.
    pub fn rotate(&mut self, angle: f32) {
        self.transform.post_mult(Mat4::from_rotation_z(angle));
    }

    pub fn scale(&mut self, x: f32, y: f32) {
        self.transform.post_mult(Mat4::from_scale(Vec3::new(x, y, 1.0)));
    }

    #[inline]
    pub fn transform(&self) -> Mat4 {
        self.transform.top()
    }

    pub fn push_target(&mut self, target: &RenderTarget) {
        self.sync("push_target");
        self.device.push_target(target);
    }

    pub fn pop_target(&mut self) {
        self.sync("pop_target");
        self.device.pop_target();
    }

    pub fn push_view_matrix(&mut self) {
        self.sync("push_view_matrix");
        self.device.push_view_matrix();
    }

    pub fn pop_view_matrix(&mut self) {
        self.sync("pop_view_matrix");
        self.device.pop_view_matrix();
    }

    pub fn load_view_identity(&mut self) {
        self.sync("load_view_identity");
        self.device.load_view_identity();
    }

    pub fn mult_view(&mut self, m: Mat4) {
        self.sync("mult_view");
        self.device.mult_view(m);
    }

    pub fn set_projection(&mut self, projection: Mat4) {
        self.sync("set_projection");
        self.device.set_projection(projection);
    }

    pub fn set_window_size(&mut self, width: u32, height: u32) {
        self.sync("set_window_size");
        self.device.set_window_size(width, height);
    }

    fn sync(&mut self, op: &str) {
        assert!(self.open.is_none(), "renderer: {op} inside a batch");
        self.flush();
    }

    /// One untextured line segment.
    pub fn draw_line(&mut self, from: Vec2, to: Vec2, color: Color) {
        self.untextured(PrimitiveType::Lines, &[
            Vertex::colored(from.x, from.y, color),
            Vertex::colored(to.x, to.y, color),
        ]);
    }

    /// One untextured filled rectangle.
    pub fn draw_rect(&mut self, rect: Rect, color: Color) {
        let [a, b, c, d] = rect.corners();
        self.untextured(PrimitiveType::Quads, &[
            Vertex::colored(a.x, a.y, color),
            Vertex::colored(b.x, b.y, color),
            Vertex::colored(c.x, c.y, color),
            Vertex::colored(d.x, d.y, color),
        ]);
    }

    fn untextured(&mut self, primitive: PrimitiveType, vertices: &[Vertex]) {
        let saved = self.pending.texture.take();
        self.begin_vertices(primitive);
        self.push_vertices(vertices);
        self.end_vertices();
        self.pending.texture = saved;
    }

    /// Queues `quad` as one item. The pending texture is left unchanged.
    pub fn draw_textured_quad(&mut self, quad: TexturedQuad) {
        let src = quad.src.unwrap_or(Rect::from_origin_size(Vec2::ZERO, quad.texture_size));
        let inv = quad.texture_size.recip();
        let (uv_min, uv_max) = (src.min() * inv, src.max() * inv);
        let (v0, v1) = if quad.flip_v {
            (1.0 - uv_min.y, 1.0 - uv_max.y)
        } else {
            (uv_min.y, uv_max.y)
        };
        let uvs = [
            Vec2::new(uv_min.x, v0),
            Vec2::new(uv_max.x, v0),
            Vec2::new(uv_max.x, v1),
            Vec2::new(uv_min.x, v1),
        ];

        let size = quad.dest.size;
        let locals = [Vec2::ZERO, Vec2::new(size.x, 0.0), size, Vec2::new(0.0, size.y)];
        let rotation = Vec2::from_angle(quad.rotation);

        let mut vertices = [Vertex::default(); 4];
        for ((v, local), uv) in vertices.iter_mut().zip(locals).zip(uvs) {
            let p = rotation.rotate(local - quad.origin) + quad.dest.origin;
            *v = Vertex::new(p.extend(0.0), uv, quad.color);
        }

        let saved = self.pending.texture.replace(quad.texture);
        self.begin_vertices(PrimitiveType::Quads);
        self.push_vertices(&vertices);
        self.end_vertices();
        self.pending.texture = saved;
    }
}

impl std::fmt::Debug for Renderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Renderer")
            .field("capacity", &self.capacity)
            .field("staged", &self.vertices.len())
            .field("items", &self.buckets.len())
            .field("in_batch", &self.open.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{ApiCall, CallLog, FeatureFlags, HeadlessApi, PrimitiveMode, ShaderDialect};

    fn renderer_with(max_vertices: usize) -> (Renderer, CallLog) {
        let api = HeadlessApi::new(FeatureFlags::all());
        let log = api.log();
        let device = GraphicsDevice::with_api(api, 320, 240);
        let renderer = Renderer::new(
            device,
            RendererConfig {
                max_vertices,
                ..RendererConfig::default()
            },
        )
        .unwrap();
        log.clear();
        (renderer, log)
    }

    fn draws(log: &CallLog) -> usize {
        log.count(|c| matches!(c, ApiCall::DrawIndexed { .. }))
    }

    fn quad(r: &mut Renderer) {
        r.begin_vertices(PrimitiveType::Quads);
        for (x, y) in [(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)] {
            r.push_vertex(Vertex::colored(x, y, Color::WHITE));
        }
        r.end_vertices();
    }

    #[test]
    #[should_panic(expected = "renderer: begin_vertices inside a batch")]
    fn double_begin_panics() {
        let (mut r, _) = renderer_with(64);
        r.begin_vertices(PrimitiveType::Quads);
        r.begin_vertices(PrimitiveType::Quads);
    }

    #[test]
    #[should_panic(expected = "renderer: end_vertices without begin_vertices")]
    fn end_without_begin_panics() {
        renderer_with(64).0.end_vertices();
    }

    #[test]
    #[should_panic(expected = "renderer: push_vertex outside a batch")]
    fn push_outside_batch_panics() {
        renderer_with(64).0.push_vertex(Vertex::default());
    }

    #[test]
    #[should_panic(expected = "renderer: render inside a batch")]
    fn render_inside_batch_panics() {
        let (mut r, _) = renderer_with(64);
        r.begin_vertices(PrimitiveType::Triangles);
        r.render();
    }

    #[test]
    #[should_panic(expected = "exceeds staging capacity")]
    fn oversized_bulk_push_panics() {
        let (mut r, _) = renderer_with(8);
        r.begin_vertices(PrimitiveType::Triangles);
        r.push_vertices(&[Vertex::default(); 9]);
    }

    #[test]
    fn empty_items_are_discarded() {
        let (mut r, log) = renderer_with(64);
        r.begin_vertices(PrimitiveType::Quads);
        r.end_vertices();
        assert_eq!(r.pending_items(), 0);
        r.render();
        assert!(log.is_empty());
    }

    #[test]
    fn render_draws_and_empties_staging() {
        let (mut r, log) = renderer_with(64);
        quad(&mut r);
        quad(&mut r);
        r.render();

        assert_eq!(draws(&log), 1);
        assert_eq!(r.staged_vertices(), 0);
        assert_eq!(r.pending_items(), 0);
        assert_eq!(
            r.stats(),
            RenderStats {
                draw_calls: 1,
                texture_binds: 1,
                program_binds: 1,
                vertices: 8,
                flushes: 1,
            }
        );
    }

    #[test]
    fn mvp_is_written_into_the_program_state() {
        let (mut r, log) = renderer_with(64);
        quad(&mut r);
        r.render();

        let data = log
            .snapshot()
            .into_iter()
            .find_map(|c| match c {
                ApiCall::BindProgramState { data, .. } => Some(data),
                _ => None,
            })
            .unwrap();
        let mvp = r.device().view_projection();
        assert_eq!(&data[..64], bytemuck::bytes_of(&mvp));
    }

    #[test]
    fn transform_applies_at_submission() {
        let (mut r, _) = renderer_with(64);
        r.translate(10.0, 20.0);
        r.scale(2.0, 2.0);
        r.begin_vertices(PrimitiveType::Lines);
        r.push_vertex(Vertex::colored(1.0, 1.0, Color::WHITE));
        r.end_vertices();
        assert_eq!(r.vertices[0].position, [12.0, 22.0, 0.0]);
    }

    #[test]
    #[should_panic(expected = "renderer: matrix stack overflow")]
    fn transform_stack_is_bounded() {
        let (mut r, _) = renderer_with(64);
        for _ in 0..=TRANSFORM_STACK_CAPACITY {
            r.push_matrix();
        }
    }

    #[test]
    fn fan_overflow_continues_from_center() {
        let (mut r, log) = renderer_with(5);
        r.begin_vertices(PrimitiveType::TriangleFan);
        for i in 0..6 {
            r.push_vertex(Vertex::colored(i as f32, 0.0, Color::WHITE));
        }
        r.end_vertices();

        // Center, rim vertex 4, then vertex 5.
        let xs: Vec<f32> = r.vertices.iter().map(|v| v.position[0]).collect();
        assert_eq!(xs, [0.0, 4.0, 5.0]);
        assert_eq!(draws(&log), 1);
    }

    #[test]
    fn quad_overflow_carries_the_unfinished_quad() {
        let (mut r, _) = renderer_with(6);
        r.begin_vertices(PrimitiveType::Quads);
        for i in 0..7 {
            r.push_vertex(Vertex::colored(i as f32, 0.0, Color::WHITE));
        }
        r.end_vertices();
        let xs: Vec<f32> = r.vertices.iter().map(|v| v.position[0]).collect();
        assert_eq!(xs, [4.0, 5.0, 6.0]);
    }

    #[test]
    fn bulk_push_after_an_unfinished_triangle_splits_at_a_primitive_boundary() {
        let (mut r, log) = renderer_with(6);
        r.begin_vertices(PrimitiveType::Triangles);
        r.push_vertex(Vertex::colored(0.0, 0.0, Color::WHITE));
        r.push_vertex(Vertex::colored(1.0, 0.0, Color::WHITE));
        let slice: Vec<Vertex> = (2..8).map(|i| Vertex::colored(i as f32, 0.0, Color::WHITE)).collect();
        r.push_vertices(&slice);

        // Two whole triangles drawn, the next two vertices staged.
        assert_eq!(draws(&log), 1);
        let xs: Vec<f32> = r.vertices.iter().map(|v| v.position[0]).collect();
        assert_eq!(xs, [6.0, 7.0]);
        r.end_vertices();
    }

    #[test]
    fn state_of_a_dropped_program_is_forgotten_at_flush() {
        let (mut r, _) = renderer_with(64);
        let (vs, fs) = shaders::sprite_sources(r.device().api().borrow().shader_dialect());
        let program = ShaderProgram::from_sources(r.device(), &vs, &fs, [UniformDecl::leaf("mvp", LeafType::Matrix4)]).unwrap();
        r.program_state(&program);
        assert_eq!(r.states.len(), 2);

        drop(program);
        quad(&mut r);
        r.render();
        assert_eq!(r.states.len(), 1);
        assert!(r.states.contains_key(&r.default_id));
    }

    #[test]
    fn discard_drops_staged_items_without_drawing() {
        let (mut r, log) = renderer_with(64);
        quad(&mut r);
        r.discard();
        r.render();
        assert_eq!(r.staged_vertices(), 0);
        assert_eq!(draws(&log), 0);
    }

    #[test]
    fn helpers_keep_the_pending_texture() {
        let (mut r, log) = renderer_with(64);
        let tex = Texture2D::from_rgba8(r.device(), 2, 2, &[0; 16]).unwrap();
        r.set_texture(Some(&tex));
        r.draw_rect(Rect::new(0.0, 0.0, 4.0, 4.0), Color::RED);
        quad(&mut r);
        r.render();

        let bound: Vec<_> = log
            .snapshot()
            .into_iter()
            .filter_map(|c| match c {
                ApiCall::BindTexture { id, .. } => id,
                _ => None,
            })
            .collect();
        assert_eq!(bound.len(), 2);
        assert_eq!(bound[1], tex.id());
    }

    #[test]
    fn lines_draw_with_line_mode() {
        let (mut r, log) = renderer_with(64);
        r.draw_line(Vec2::ZERO, Vec2::new(5.0, 5.0), Color::GREEN);
        r.render();
        assert!(log.snapshot().contains(&ApiCall::DrawIndexed {
            mode: PrimitiveMode::Lines,
            count: 2,
            start: 0,
            index_type: IndexType::U16,
        }));
    }

    #[test]
    fn textured_quad_pivots_around_origin() {
        let (mut r, _) = renderer_with(64);
        let tex = Texture2D::from_rgba8(r.device(), 4, 4, &[0; 64]).unwrap();
        tex.draw(
            &mut r,
            Rect::new(100.0, 100.0, 10.0, 20.0),
            Some(Rect::new(0.0, 0.0, 2.0, 4.0)),
            Color::WHITE,
            Vec2::new(5.0, 10.0),
            0.0,
        );
        let v = &r.vertices;
        assert_eq!(v[0].position, [95.0, 90.0, 0.0]);
        assert_eq!(v[2].position, [105.0, 110.0, 0.0]);
        assert_eq!(v[2].tex_coord, [0.5, 1.0]);
    }

    #[rstest::rstest]
    fn default_program_builds_for_every_dialect(
        #[values(ShaderDialect::Glsl120, ShaderDialect::Glsl330, ShaderDialect::GlslEs100, ShaderDialect::GlslEs300)]
        dialect: ShaderDialect,
    ) {
        let api = HeadlessApi::new(FeatureFlags::all()).with_dialect(dialect);
        let device = GraphicsDevice::with_api(api, 8, 8);
        let r = Renderer::new(device, RendererConfig::default()).unwrap();
        assert!(r.default_program().is_valid());
        assert_eq!(r.device().api().borrow().shader_dialect(), dialect);
    }

    #[test]
    fn large_staging_requires_u32_indices() {
        let device = GraphicsDevice::with_api(HeadlessApi::new(FeatureFlags::none()), 8, 8);
        let err = Renderer::new(
            device,
            RendererConfig {
                max_vertices: 70_000,
                ..RendererConfig::default()
            },
        )
        .unwrap_err();
        assert_eq!(err, RenderError::unsupported("renderer", Feature::ElementIndexUint.name()));
    }
}
