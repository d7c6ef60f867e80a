//! End-to-end batching behavior against the headless backend.

use glam::{Mat4, Vec2};
use kiln_engine::api::{
    ApiCall, CallLog, Feature, FeatureFlags, HeadlessApi, IndexType, LeafType, PixelFormat, PrimitiveMode,
    TextureDesc, UniformDecl,
};
use kiln_engine::coords::{Color, Rect};
use kiln_engine::device::{GraphicsDevice, MAX_TARGETS, VIEW_STACK_CAPACITY};
use kiln_engine::render::{PrimitiveType, Renderer, RendererConfig, Vertex};
use kiln_engine::resources::{RenderTarget, ShaderProgram, ShaderProgramState, Texture2D};
use kiln_engine::RenderError;
use rstest::rstest;

fn setup(features: FeatureFlags, max_vertices: usize) -> (Renderer, CallLog) {
    let api = HeadlessApi::new(features);
    let log = api.log();
    let device = GraphicsDevice::with_api(api, 640, 480);
    let renderer = Renderer::new(
        device,
        RendererConfig {
            max_vertices,
            ..RendererConfig::default()
        },
    )
    .expect("renderer on headless backend");
    log.clear();
    (renderer, log)
}

fn texture(r: &Renderer) -> Texture2D {
    Texture2D::from_rgba8(r.device(), 2, 2, &[255; 16]).expect("rgba texture")
}

fn quad_at(r: &mut Renderer, x: f32) {
    r.begin_vertices(PrimitiveType::Quads);
    for (dx, dy) in [(0.0, 0.0), (8.0, 0.0), (8.0, 8.0), (0.0, 8.0)] {
        r.push_vertex(Vertex::colored(x + dx, dy, Color::WHITE));
    }
    r.end_vertices();
}

fn draw_calls(log: &CallLog) -> Vec<(PrimitiveMode, u32, u32)> {
    log.snapshot()
        .into_iter()
        .filter_map(|c| match c {
            ApiCall::DrawIndexed { mode, count, start, .. } => Some((mode, count, start)),
            _ => None,
        })
        .collect()
}

/// Index stream of the last indexed upload, decoded as 16-bit indices.
fn last_u16_indices(log: &CallLog, index_bytes: usize) -> Vec<u16> {
    let data = log
        .snapshot()
        .into_iter()
        .rev()
        .find_map(|c| match c {
            ApiCall::WriteBuffer { data, .. } if data.len() == index_bytes => Some(data),
            _ => None,
        })
        .expect("index upload");
    data.chunks_exact(2).map(|b| u16::from_le_bytes([b[0], b[1]])).collect()
}

#[test]
fn three_quads_draw_in_ascending_z() {
    let (mut r, log) = setup(FeatureFlags::all(), 64);
    let tex = texture(&r);
    r.set_texture(Some(&tex));

    // Submitted in reverse so the order below comes from sorting.
    for (z, x) in [(1.0, 0.0), (0.0, 10.0), (-1.0, 20.0)] {
        r.set_z_index(z);
        quad_at(&mut r, x);
    }
    r.render();

    assert_eq!(
        draw_calls(&log),
        [
            (PrimitiveMode::Triangles, 6, 0),
            (PrimitiveMode::Triangles, 6, 6),
            (PrimitiveMode::Triangles, 6, 12),
        ]
    );
    // Z=-1 used vertices 8..12, Z=0 4..8, Z=+1 0..4.
    let indices = last_u16_indices(&log, 18 * 2);
    assert_eq!(&indices[..6], &[8, 9, 10, 8, 10, 11]);
    assert_eq!(&indices[6..12], &[4, 5, 6, 4, 6, 7]);
    assert_eq!(&indices[12..], &[0, 1, 2, 0, 2, 3]);
    // One texture for all three runs.
    assert_eq!(log.count(|c| matches!(c, ApiCall::BindTexture { .. })), 1);
}

#[test]
fn overflow_by_one_flushes_before_staging() {
    let (mut r, log) = setup(FeatureFlags::all(), 12);
    r.begin_vertices(PrimitiveType::Triangles);
    for i in 0..12 {
        r.push_vertex(Vertex::colored(i as f32, 0.0, Color::WHITE));
    }
    assert_eq!(r.staged_vertices(), 12);
    assert!(draw_calls(&log).is_empty());

    r.push_vertex(Vertex::colored(99.0, 0.0, Color::WHITE));
    assert_eq!(draw_calls(&log), [(PrimitiveMode::Triangles, 12, 0)]);
    assert_eq!(r.staged_vertices(), 1);
    r.end_vertices();
}

#[rstest]
#[case(PrimitiveType::Quads)]
#[case(PrimitiveType::Triangles)]
#[case(PrimitiveType::TriangleFan)]
#[case(PrimitiveType::Lines)]
fn staging_never_exceeds_capacity(#[case] primitive: PrimitiveType) {
    let (mut r, log) = setup(FeatureFlags::all(), 10);
    r.begin_vertices(primitive);
    for i in 0..97 {
        r.push_vertex(Vertex::colored(i as f32, 1.0, Color::WHITE));
        assert!(r.staged_vertices() <= r.capacity());
    }
    r.end_vertices();
    r.render();
    assert!(!draw_calls(&log).is_empty());
    assert_eq!(r.staged_vertices(), 0);
}

#[test]
fn bulk_submission_flushes_instead_of_splitting() {
    let (mut r, log) = setup(FeatureFlags::all(), 8);
    quad_at(&mut r, 0.0);
    r.begin_vertices(PrimitiveType::Triangles);
    r.push_vertices(&[Vertex::default(); 6]);
    r.end_vertices();

    assert_eq!(draw_calls(&log), [(PrimitiveMode::Triangles, 6, 0)]);
    assert_eq!(r.staged_vertices(), 6);
}

#[test]
fn adjacent_items_merge_non_adjacent_do_not() {
    let (mut r, log) = setup(FeatureFlags::all(), 64);
    let a = texture(&r);
    let b = texture(&r);

    for tex in [&a, &a, &b, &a] {
        r.set_texture(Some(tex));
        quad_at(&mut r, 0.0);
    }
    r.render();

    assert_eq!(
        draw_calls(&log),
        [
            (PrimitiveMode::Triangles, 12, 0),
            (PrimitiveMode::Triangles, 6, 12),
            (PrimitiveMode::Triangles, 6, 18),
        ]
    );
    assert_eq!(r.stats().draw_calls, 3);
    assert_eq!(r.stats().texture_binds, 3);
}

#[test]
fn gated_format_is_rejected_without_native_calls() {
    let (r, log) = setup(FeatureFlags::none(), 64);
    let desc = TextureDesc::new(8, 8, PixelFormat::Dxt5);
    let pixels = vec![0u8; PixelFormat::Dxt5.data_size(8, 8)];

    let first = Texture2D::new(r.device(), desc, Some(&pixels)).unwrap_err();
    let second = Texture2D::new(r.device(), desc, Some(&pixels)).unwrap_err();
    assert!(matches!(first, RenderError::UnsupportedFeature { .. }));
    assert_eq!(first, second);
    assert!(log.is_empty());
}

#[test]
fn granted_format_is_accepted() {
    let (r, _) = setup(FeatureFlags::none().with(Feature::Dxt, true), 64);
    let desc = TextureDesc::new(8, 8, PixelFormat::Dxt5);
    let pixels = vec![0u8; PixelFormat::Dxt5.data_size(8, 8)];
    assert!(Texture2D::new(r.device(), desc, Some(&pixels)).is_ok());
}

#[test]
fn target_changes_flush_pending_batches() {
    let (mut r, log) = setup(FeatureFlags::all(), 64);
    let target = RenderTarget::new(r.device(), 32, 32, PixelFormat::R8G8B8A8).unwrap();
    log.clear();

    quad_at(&mut r, 0.0);
    r.push_target(&target);
    quad_at(&mut r, 0.0);
    r.pop_target();

    let order: Vec<&str> = log
        .snapshot()
        .iter()
        .filter_map(|c| match c {
            ApiCall::DrawIndexed { .. } => Some("draw"),
            ApiCall::BindTarget(Some(_)) => Some("push"),
            ApiCall::BindTarget(None) => Some("pop"),
            _ => None,
        })
        .collect();
    assert_eq!(order, ["draw", "push", "draw", "pop"]);
    assert_eq!(r.staged_vertices(), 0);
}

#[test]
#[should_panic(expected = "render target stack overflow")]
fn target_stack_overflows_on_the_extra_push() {
    let (mut r, _) = setup(FeatureFlags::all(), 64);
    let target = RenderTarget::new(r.device(), 4, 4, PixelFormat::R8G8B8A8).unwrap();
    for _ in 0..MAX_TARGETS {
        r.push_target(&target);
    }
    assert_eq!(r.device().target_depth(), MAX_TARGETS);
    r.push_target(&target);
}

#[test]
#[should_panic(expected = "matrix stack overflow")]
fn view_stack_overflows_on_the_thirty_third_push() {
    let (mut r, _) = setup(FeatureFlags::all(), 64);
    for _ in 0..VIEW_STACK_CAPACITY {
        r.push_view_matrix();
    }
    r.push_view_matrix();
}

#[test]
#[should_panic(expected = "renderer: push_target inside a batch")]
fn target_change_inside_a_batch_panics() {
    let (mut r, _) = setup(FeatureFlags::all(), 64);
    let target = RenderTarget::new(r.device(), 4, 4, PixelFormat::R8G8B8A8).unwrap();
    r.begin_vertices(PrimitiveType::Quads);
    r.push_target(&target);
}

#[test]
fn mvp_and_tint_pack_back_to_back() {
    let (r, _) = setup(FeatureFlags::all(), 64);
    let program = ShaderProgram::from_sources(
        r.device(),
        "void main() {}",
        "void main() {}",
        [
            UniformDecl::leaf("mvp", LeafType::Matrix4),
            UniformDecl::leaf("tint", LeafType::Float4),
        ],
    )
    .unwrap();

    let mut state = ShaderProgramState::new(&program);
    state.set_uniform_value("mvp", &Mat4::IDENTITY).unwrap();
    state.set_uniform_value("tint", &[1.0f32; 4]).unwrap();

    let mut expected = Mat4::IDENTITY.to_cols_array().to_vec();
    expected.extend([1.0; 4]);
    assert_eq!(state.data(), bytemuck::cast_slice::<f32, u8>(&expected));
}

#[test]
fn custom_programs_rebind_only_on_change() {
    let (mut r, log) = setup(FeatureFlags::all(), 64);
    let tinted = ShaderProgram::from_sources(
        r.device(),
        "void main() {}",
        "void main() {}",
        [
            UniformDecl::leaf("mvp", LeafType::Matrix4),
            UniformDecl::leaf("tint", LeafType::Float4),
        ],
    )
    .unwrap();
    r.program_state(&tinted)
        .set_uniform_value("tint", &[0.5f32; 4])
        .unwrap();

    r.set_shader(Some(&tinted));
    quad_at(&mut r, 0.0);
    quad_at(&mut r, 10.0);
    r.set_shader(None);
    quad_at(&mut r, 20.0);
    r.render();

    assert_eq!(r.stats().program_binds, 2);
    assert_eq!(draw_calls(&log).len(), 2);

    let tinted_state = log
        .snapshot()
        .into_iter()
        .find_map(|c| match c {
            ApiCall::BindProgramState { program, data } if Some(program) == tinted.id() => Some(data),
            _ => None,
        })
        .unwrap();
    assert_eq!(tinted_state.len(), 80);
    assert_eq!(&tinted_state[64..], bytemuck::cast_slice::<f32, u8>(&[0.5; 4]));
}

#[test]
fn large_staging_uses_u32_indices_when_supported() {
    let (r, _) = setup(FeatureFlags::all(), 100_000);
    assert_eq!(r.index_type(), IndexType::U32);
}

#[test]
fn render_target_draws_upright() {
    let (mut r, log) = setup(FeatureFlags::all(), 64);
    let target = RenderTarget::new(r.device(), 16, 16, PixelFormat::R8G8B8A8).unwrap();
    target.draw(&mut r, Rect::new(0.0, 0.0, 16.0, 16.0), None, Color::WHITE, Vec2::ZERO, 0.0);
    r.render();

    let vertices = log
        .snapshot()
        .into_iter()
        .find_map(|c| match c {
            ApiCall::WriteBuffer { data, .. } if data.len() == 4 * 24 => Some(data),
            _ => None,
        })
        .unwrap();
    let first: Vertex = bytemuck::pod_read_unaligned(&vertices[..24]);
    assert_eq!(first.tex_coord, [0.0, 1.0]);
    assert_eq!(
        log.count(|c| matches!(c, ApiCall::BindTexture { id: Some(id), .. } if *id == target.texture_id())),
        1
    );
}

#[test]
fn dropping_a_texture_deletes_it() {
    let (r, log) = setup(FeatureFlags::all(), 64);
    let tex = texture(&r);
    let id = tex.id();
    assert!(tex.is_valid());
    drop(tex);
    assert!(log.snapshot().contains(&ApiCall::DeleteTexture(id)));
}
