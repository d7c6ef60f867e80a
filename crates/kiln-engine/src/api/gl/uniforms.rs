use std::collections::HashMap;

use glow::HasContext;

use crate::api::uniform::{LeafType, UniformLayout, UniformSlot};

/// Location cache of one linked program. `None` marks uniforms the linker
/// optimized away, so they are not looked up again.
#[derive(Debug, Default)]
pub struct UniformLocations {
    cache: HashMap<String, Option<glow::UniformLocation>>,
}

impl UniformLocations {
    fn get(&mut self, gl: &glow::Context, program: glow::Program, path: &str) -> Option<glow::UniformLocation> {
        if let Some(loc) = self.cache.get(path) {
            return loc.clone();
        }
        // SAFETY: `program` is a live program created on `gl`.
        let loc = unsafe { gl.get_uniform_location(program, path) };
        if loc.is_none() {
            log::debug!("gl: uniform `{path}` is inactive");
        }
        self.cache.insert(path.to_owned(), loc.clone());
        loc
    }
}

/// Uploads every leaf of `layout` from the packed `data`. The program must be bound.
pub fn upload(
    gl: &glow::Context,
    program: glow::Program,
    locations: &mut UniformLocations,
    layout: &UniformLayout,
    data: &[u8],
) {
    for slot in layout.slots() {
        let Some(bytes) = data.get(slot.offset..slot.offset + slot.size) else {
            log::warn!("gl: state buffer too short for `{}`", slot.path);
            continue;
        };
        let Some(loc) = locations.get(gl, program, &slot.path) else {
            continue;
        };
        upload_leaf(gl, &loc, slot, bytes);
    }
}

/// Leaf bytes copied into typed storage; state bytes carry no alignment
/// guarantee.
#[derive(Debug, PartialEq)]
enum LeafValues {
    Ints(Vec<i32>),
    Floats(Vec<f32>),
}

fn decode_leaf(leaf: LeafType, bytes: &[u8]) -> LeafValues {
    match leaf {
        LeafType::Int | LeafType::Sampler2D => LeafValues::Ints(bytemuck::pod_collect_to_vec(bytes)),
        _ => LeafValues::Floats(bytemuck::pod_collect_to_vec(bytes)),
    }
}

fn upload_leaf(gl: &glow::Context, loc: &glow::UniformLocation, slot: &UniformSlot, bytes: &[u8]) {
    let loc = Some(loc);
    // SAFETY: the program owning `loc` is bound on `gl`.
    unsafe {
        match (slot.leaf, decode_leaf(slot.leaf, bytes)) {
            (_, LeafValues::Ints(v)) => gl.uniform_1_i32_slice(loc, &v),
            (LeafType::Float, LeafValues::Floats(v)) => gl.uniform_1_f32_slice(loc, &v),
            (LeafType::Float2, LeafValues::Floats(v)) => gl.uniform_2_f32_slice(loc, &v),
            (LeafType::Float3, LeafValues::Floats(v)) => gl.uniform_3_f32_slice(loc, &v),
            (LeafType::Float4, LeafValues::Floats(v)) => gl.uniform_4_f32_slice(loc, &v),
            (LeafType::Matrix3, LeafValues::Floats(v)) => gl.uniform_matrix_3_f32_slice(loc, false, &v),
            (LeafType::Matrix4, LeafValues::Floats(v)) => gl.uniform_matrix_4_f32_slice(loc, false, &v),
            (LeafType::Int | LeafType::Sampler2D, LeafValues::Floats(_)) => {}
        }
    }
}
