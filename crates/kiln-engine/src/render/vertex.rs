use bytemuck::{Pod, Zeroable};
use glam::{Vec2, Vec3};

use crate::api::{ATTRIB_COLOR, ATTRIB_POSITION, ATTRIB_TEX_COORD, AttributeKind, PrimitiveMode};
use crate::coords::Color;
use crate::resources::VertexLayout;

/// Batched vertex: pixel-space position, texture coordinate, straight RGBA.
#[repr(C)]
#[derive(Debug, Copy, Clone, Default, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub tex_coord: [f32; 2],
    pub color: [u8; 4],
}

impl Vertex {
    pub const STRIDE: u32 = std::mem::size_of::<Vertex>() as u32;

    #[inline]
    pub fn new(position: Vec3, tex_coord: Vec2, color: Color) -> Self {
        Self {
            position: position.to_array(),
            tex_coord: tex_coord.to_array(),
            color: color.to_array(),
        }
    }

    /// Untextured vertex at `(x, y, 0)`; samples the white texel.
    #[inline]
    pub fn colored(x: f32, y: f32, color: Color) -> Self {
        Self::new(Vec3::new(x, y, 0.0), Vec2::ZERO, color)
    }

    pub(crate) fn describe(layout: &mut VertexLayout) {
        layout.set_stride(Self::STRIDE);
        layout.add_element(ATTRIB_POSITION, 3, AttributeKind::F32, false, 0);
        layout.add_element(ATTRIB_TEX_COORD, 2, AttributeKind::F32, false, 12);
        layout.add_element(ATTRIB_COLOR, 4, AttributeKind::U8, true, 20);
    }
}

/// Shape of the vertices submitted between `begin_vertices` and `end_vertices`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum PrimitiveType {
    /// Four vertices per quad, wound around the perimeter.
    Quads,
    Triangles,
    /// First vertex is the shared center.
    TriangleFan,
    Lines,
}

impl PrimitiveType {
    /// Native primitive the expanded indices are drawn with.
    #[inline]
    pub fn draw_mode(self) -> PrimitiveMode {
        match self {
            PrimitiveType::Lines => PrimitiveMode::Lines,
            _ => PrimitiveMode::Triangles,
        }
    }

    /// Vertices closing one primitive. Fans close one triangle per vertex
    /// once the first three are in.
    #[inline]
    pub fn vertices_per_primitive(self) -> usize {
        match self {
            PrimitiveType::Quads => 4,
            PrimitiveType::Triangles => 3,
            PrimitiveType::TriangleFan => 1,
            PrimitiveType::Lines => 2,
        }
    }

    /// Leading vertices of a `count`-vertex item that form whole primitives.
    pub fn complete_len(self, count: usize) -> usize {
        match self {
            PrimitiveType::TriangleFan if count < 3 => 0,
            PrimitiveType::TriangleFan => count,
            _ => count - count % self.vertices_per_primitive(),
        }
    }

    /// Indices emitted for `count` vertices.
    pub fn index_count(self, count: usize) -> usize {
        match self {
            PrimitiveType::Quads => count / 4 * 6,
            PrimitiveType::TriangleFan => count.saturating_sub(2) * 3,
            _ => self.complete_len(count),
        }
    }

    /// Appends the triangle- or line-list indices for vertices
    /// `first..first + count`.
    pub fn emit_indices(self, first: u32, count: u32, out: &mut Vec<u32>) {
        match self {
            PrimitiveType::Quads => {
                for quad in 0..count / 4 {
                    let b = first + quad * 4;
                    out.extend_from_slice(&[b, b + 1, b + 2, b, b + 2, b + 3]);
                }
            }
            PrimitiveType::TriangleFan => {
                for i in 1..count.saturating_sub(1) {
                    out.extend_from_slice(&[first, first + i, first + i + 1]);
                }
            }
            PrimitiveType::Triangles | PrimitiveType::Lines => {
                let complete = self.complete_len(count as usize) as u32;
                out.extend(first..first + complete);
            }
        }
    }
}
