use std::cell::{Ref, RefMut};

use glam::Mat4;

use super::context::GraphicsContext;
use super::stack::MatrixStack;
use crate::api::gl::{GlApi, GlProfile};
use crate::api::{share, ApiRequest, ClearFlags, FeatureFlags, PlatformGraphicsApi, SharedApi, TargetId};
use crate::coords::{Color, Viewport};
use crate::error::RenderError;
use crate::resources::RenderTarget;

/// Nested view-matrix pushes allowed on a device.
pub const VIEW_STACK_CAPACITY: usize = 32;

/// Nested render targets allowed on a device.
pub const MAX_TARGETS: usize = 8;

#[derive(Debug, Clone, Copy)]
struct TargetFrame {
    id: TargetId,
    viewport: Viewport,
    /// Projection active before this target was pushed.
    saved_projection: Mat4,
}

/// Owns the backend instance and the device-level transform state.
///
/// A device drawn to by a [`Renderer`](crate::render::Renderer) is owned by
/// it; target and view changes must then go through the renderer so pending
/// batches are flushed first.
pub struct GraphicsDevice {
    api: SharedApi,

    /// Window drawable area.
    window: Viewport,

    projection: Mat4,
    view: MatrixStack,
    targets: Vec<TargetFrame>,
}

impl GraphicsDevice {
    /// Loads the GL-family backend matching `request` from `context`.
    ///
    /// Fails with [`RenderError::UnsupportedApi`] for DirectX, for profiles
    /// compiled out of this build, for unknown versions, and when the context
    /// provides a different kind or an older version than requested.
    pub fn new(context: &dyn GraphicsContext, request: ApiRequest) -> Result<Self, RenderError> {
        let profile = GlProfile::lookup(request)?;

        let provided = context.descriptor();
        if provided.kind != request.kind || provided.version < request.version {
            log::error!("graphics device: context provides {provided}, {request} requested");
            return Err(RenderError::UnsupportedApi(format!(
                "context provides {provided}, {request} requested"
            )));
        }

        context.make_current()?;
        // SAFETY: the context was just made current and outlives this call;
        // the loader only resolves entry points.
        let gl = unsafe { glow::Context::from_loader_function(|name| context.get_proc_address(name)) };

        let (width, height) = context.drawable_size();
        Ok(Self::with_shared(share(GlApi::new(gl, profile)), width, height))
    }

    /// Wraps an already constructed backend.
    pub fn with_api<A: PlatformGraphicsApi + 'static>(api: A, width: u32, height: u32) -> Self {
        Self::with_shared(share(api), width, height)
    }

    pub fn with_shared(api: SharedApi, width: u32, height: u32) -> Self {
        let window = Viewport::from_size(width, height);
        {
            let mut api = api.borrow_mut();
            log::info!("graphics device: {} at {width}x{height}", api.name());
            api.prepare_for_2d();
            api.configure_viewport(window);
        }

        Self {
            api,
            window,
            projection: ortho(window),
            view: MatrixStack::new("graphics device", VIEW_STACK_CAPACITY),
            targets: Vec::with_capacity(MAX_TARGETS),
        }
    }

    #[inline]
    pub fn api(&self) -> &SharedApi {
        &self.api
    }

    pub(crate) fn api_mut(&self) -> RefMut<'_, dyn PlatformGraphicsApi> {
        self.api.borrow_mut()
    }

    /// Capability table of the backend.
    pub fn features(&self) -> Ref<'_, FeatureFlags> {
        Ref::map(self.api.borrow(), |api| api.features())
    }

    pub fn window_size(&self) -> (u32, u32) {
        (self.window.width, self.window.height)
    }

    /// Records a new drawable size. Applied immediately when no target is
    /// pushed, otherwise restored once the target stack unwinds.
    pub fn set_window_size(&mut self, width: u32, height: u32) {
        self.window = Viewport::from_size(width, height);
        match self.targets.first_mut() {
            Some(bottom) => bottom.saved_projection = ortho(self.window),
            None => {
                self.projection = ortho(self.window);
                self.api.borrow_mut().configure_viewport(self.window);
            }
        }
    }

    #[inline]
    pub fn projection(&self) -> Mat4 {
        self.projection
    }

    pub fn set_projection(&mut self, projection: Mat4) {
        self.projection = projection;
    }

    /// Top target's viewport, or the window's when no target is pushed.
    pub fn current_viewport(&self) -> Viewport {
        self.targets.last().map_or(self.window, |t| t.viewport)
    }

    pub fn configure_viewport(&mut self, viewport: Viewport) {
        self.api.borrow_mut().configure_viewport(viewport);
    }

    /// Clears color and depth of the current target.
    pub fn clear(&mut self, color: Color) {
        self.api.borrow_mut().clear(color, ClearFlags::ALL);
    }

    #[inline]
    pub fn view_matrix(&self) -> Mat4 {
        self.view.top()
    }

    pub fn view_depth(&self) -> usize {
        self.view.depth()
    }

    pub fn push_view_matrix(&mut self) {
        self.view.push();
    }

    pub fn pop_view_matrix(&mut self) {
        self.view.pop();
    }

    pub fn load_view_identity(&mut self) {
        self.view.load_identity();
    }

    /// Left-multiplies the top view matrix: `top = m * top`.
    pub fn mult_view(&mut self, m: Mat4) {
        self.view.pre_mult(m);
    }

    /// `projection * view`, what the renderer uploads as `mvp`.
    pub fn view_projection(&self) -> Mat4 {
        self.projection * self.view.top()
    }

    /// Redirects rendering to `target`: binds it, switches the viewport to its
    /// size and installs a matching top-left orthographic projection.
    pub fn push_target(&mut self, target: &RenderTarget) {
        assert!(
            self.targets.len() < MAX_TARGETS,
            "graphics device: render target stack overflow ({MAX_TARGETS} targets)"
        );

        let viewport = target.viewport();
        self.targets.push(TargetFrame {
            id: target.id(),
            viewport,
            saved_projection: self.projection,
        });
        self.projection = ortho(viewport);

        let mut api = self.api.borrow_mut();
        api.bind_render_target(Some(target.id()));
        api.configure_viewport(viewport);
    }

    /// Restores the binding, viewport and projection active before the
    /// matching push.
    pub fn pop_target(&mut self) {
        let Some(frame) = self.targets.pop() else {
            panic!("graphics device: pop_target with no target pushed");
        };
        self.projection = frame.saved_projection;

        let viewport = self.current_viewport();
        let mut api = self.api.borrow_mut();
        api.bind_render_target(self.current_target());
        api.configure_viewport(viewport);
    }

    #[inline]
    pub fn current_target(&self) -> Option<TargetId> {
        self.targets.last().map(|t| t.id)
    }

    pub fn target_depth(&self) -> usize {
        self.targets.len()
    }
}

/// Top-left origin, +Y down, pixel units.
pub fn ortho(viewport: Viewport) -> Mat4 {
    Mat4::orthographic_rh_gl(0.0, viewport.width as f32, viewport.height as f32, 0.0, -1.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{ApiCall, HeadlessApi, PixelFormat};
    use glam::Vec3;

    /// A context that never loads GL; `make_current` is only counted.
    struct StubContext {
        provides: ApiRequest,
        made_current: std::cell::Cell<u32>,
    }

    impl StubContext {
        fn new(provides: ApiRequest) -> Self {
            Self {
                provides,
                made_current: std::cell::Cell::new(0),
            }
        }
    }

    impl GraphicsContext for StubContext {
        fn descriptor(&self) -> ApiRequest {
            self.provides
        }

        fn make_current(&self) -> Result<(), RenderError> {
            self.made_current.set(self.made_current.get() + 1);
            Err(RenderError::creation("gl context", "stub context cannot be made current"))
        }

        fn get_proc_address(&self, _name: &str) -> *const std::ffi::c_void {
            std::ptr::null()
        }

        fn drawable_size(&self) -> (u32, u32) {
            (64, 64)
        }
    }

    #[rstest::rstest]
    #[case::directx(ApiRequest::opengl(3, 3), ApiRequest::new(crate::api::ApiKind::DirectX, 11, 0))]
    #[case::unknown_version(ApiRequest::opengl(3, 3), ApiRequest::opengl(9, 9))]
    #[case::kind_mismatch(ApiRequest::gles(3, 0), ApiRequest::opengl(3, 3))]
    #[case::older_context(ApiRequest::opengl(2, 1), ApiRequest::opengl(3, 3))]
    fn unsupported_requests_fail_before_touching_the_context(
        #[case] provides: ApiRequest,
        #[case] request: ApiRequest,
    ) {
        let context = StubContext::new(provides);
        let err = GraphicsDevice::new(&context, request).err();
        assert!(matches!(err, Some(RenderError::UnsupportedApi(_))), "{err:?}");
        assert_eq!(context.made_current.get(), 0);
    }

    #[test]
    fn matching_request_reaches_the_context() {
        let context = StubContext::new(ApiRequest::opengl(4, 1));
        let err = GraphicsDevice::new(&context, ApiRequest::opengl(3, 3)).err();
        assert!(matches!(err, Some(RenderError::ResourceCreation { .. })), "{err:?}");
        assert_eq!(context.made_current.get(), 1);
    }

    fn device() -> (GraphicsDevice, crate::api::CallLog) {
        let api = HeadlessApi::new(FeatureFlags::all());
        let log = api.log();
        (GraphicsDevice::with_api(api, 800, 600), log)
    }

    #[test]
    fn construction_prepares_2d_state() {
        let (device, log) = device();
        assert_eq!(
            log.snapshot(),
            [
                ApiCall::PrepareFor2d,
                ApiCall::ConfigureViewport(Viewport::from_size(800, 600))
            ]
        );
        assert_eq!(device.current_viewport(), Viewport::from_size(800, 600));
    }

    #[test]
    fn projection_maps_top_left_to_ndc_corner() {
        let (device, _) = device();
        let p = device.projection().project_point3(Vec3::new(0.0, 0.0, 0.0));
        assert!((p.x + 1.0).abs() < 1e-6 && (p.y - 1.0).abs() < 1e-6);
    }

    #[test]
    fn mult_view_left_multiplies() {
        let (mut device, _) = device();
        let a = Mat4::from_translation(Vec3::X);
        let b = Mat4::from_scale(Vec3::splat(3.0));
        device.mult_view(a);
        device.mult_view(b);
        assert_eq!(device.view_matrix(), b * a);
    }

    #[test]
    fn view_push_pop_scopes_changes() {
        let (mut device, _) = device();
        device.push_view_matrix();
        device.mult_view(Mat4::from_translation(Vec3::Y));
        device.pop_view_matrix();
        assert_eq!(device.view_matrix(), Mat4::IDENTITY);
    }

    #[test]
    #[should_panic(expected = "matrix stack overflow")]
    fn thirty_third_view_push_panics() {
        let (mut device, _) = device();
        for _ in 0..=VIEW_STACK_CAPACITY {
            device.push_view_matrix();
        }
    }

    #[test]
    fn target_push_and_pop_restore_state() {
        let (mut device, log) = device();
        let target = RenderTarget::new(&device, 128, 64, PixelFormat::R8G8B8A8).unwrap();
        let window_projection = device.projection();
        log.clear();

        device.push_target(&target);
        assert_eq!(device.current_target(), Some(target.id()));
        assert_eq!(device.current_viewport(), Viewport::from_size(128, 64));
        assert_ne!(device.projection(), window_projection);

        device.pop_target();
        assert_eq!(device.current_target(), None);
        assert_eq!(device.projection(), window_projection);
        assert_eq!(
            log.snapshot(),
            [
                ApiCall::BindTarget(Some(target.id())),
                ApiCall::ConfigureViewport(Viewport::from_size(128, 64)),
                ApiCall::BindTarget(None),
                ApiCall::ConfigureViewport(Viewport::from_size(800, 600)),
            ]
        );
    }

    #[test]
    fn max_targets_can_be_nested() {
        let (mut device, _) = device();
        let target = RenderTarget::new(&device, 16, 16, PixelFormat::R8G8B8A8).unwrap();
        for _ in 0..MAX_TARGETS {
            device.push_target(&target);
        }
        assert_eq!(device.target_depth(), MAX_TARGETS);
    }

    #[test]
    #[should_panic(expected = "render target stack overflow")]
    fn pushing_past_max_targets_panics() {
        let (mut device, _) = device();
        let target = RenderTarget::new(&device, 16, 16, PixelFormat::R8G8B8A8).unwrap();
        for _ in 0..=MAX_TARGETS {
            device.push_target(&target);
        }
    }

    #[test]
    #[should_panic(expected = "pop_target with no target pushed")]
    fn popping_empty_target_stack_panics() {
        device().0.pop_target();
    }

    #[test]
    fn resize_under_a_target_applies_after_pop() {
        let (mut device, _) = device();
        let target = RenderTarget::new(&device, 16, 16, PixelFormat::R8G8B8A8).unwrap();
        device.push_target(&target);
        device.set_window_size(400, 300);
        assert_eq!(device.current_viewport(), Viewport::from_size(16, 16));

        device.pop_target();
        assert_eq!(device.current_viewport(), Viewport::from_size(400, 300));
        assert_eq!(device.projection(), ortho(Viewport::from_size(400, 300)));
    }
}
