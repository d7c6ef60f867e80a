use winit::event::WindowEvent;

use crate::render::Renderer;

/// Control directive returned by app callbacks.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum AppControl {
    Continue,
    Exit,
}

/// Frame timing snapshot.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct FrameTime {
    /// Seconds since the previous frame, clamped to `[0.0001, 0.25]`.
    pub dt: f32,
    pub frame_index: u64,
}

/// Per-frame context passed to [`App::on_frame`].
///
/// The runtime clears the window with the renderer's clear color before the
/// call and renders whatever is still staged afterwards.
pub struct FrameCtx<'a> {
    pub renderer: &'a mut Renderer,
    /// Drawable size in physical pixels.
    pub size: (u32, u32),
    pub time: FrameTime,
}

/// Application contract implemented by binaries.
pub trait App {
    /// Called once after the renderer exists, to create GPU resources.
    fn setup(&mut self, renderer: &mut Renderer) -> anyhow::Result<()> {
        let _ = renderer;
        Ok(())
    }

    /// Called for window events before the runtime handles them.
    fn on_window_event(&mut self, event: &WindowEvent) -> AppControl {
        let _ = event;
        AppControl::Continue
    }

    /// Called once per redraw.
    fn on_frame(&mut self, ctx: &mut FrameCtx<'_>) -> AppControl;

    /// Called before the window and its GL context go away. GPU resources
    /// the app owns must be dropped here; their deletes need the context.
    fn teardown(&mut self, renderer: &mut Renderer) {
        let _ = renderer;
    }
}
