use std::ffi::{CString, c_void};
use std::num::NonZeroU32;
use std::panic::{self, AssertUnwindSafe};

use anyhow::{Context, Result, anyhow, bail};
use glow::HasContext;
use glutin::config::{Config, ConfigTemplateBuilder, GlConfig};
use glutin::context::{
    ContextApi, ContextAttributesBuilder, GlContext, NotCurrentGlContext, PossiblyCurrentContext,
    PossiblyCurrentGlContext, Version,
};
use glutin::display::{Display, GetGlDisplay, GlDisplay};
use glutin::surface::{GlSurface, Surface, SwapInterval, WindowSurface};
use glutin_winit::{DisplayBuilder, GlWindow as _};
use raw_window_handle::HasWindowHandle;
use winit::dpi::PhysicalSize;
use winit::event_loop::ActiveEventLoop;
use winit::window::Window;

use super::runtime::RuntimeConfig;
use crate::api::{ApiKind, ApiRequest};
use crate::device::GraphicsContext;
use crate::error::RenderError;

/// A winit window with a current glutin context, the shipped
/// [`GraphicsContext`].
pub struct GlWindow {
    /// What the driver actually created, which may differ from the request.
    provided: ApiRequest,
    display: Display,
    surface: Surface<WindowSurface>,
    context: PossiblyCurrentContext,
    // Dropped after the surface and context that reference it.
    window: Window,
}

impl GlWindow {
    pub fn new(event_loop: &ActiveEventLoop, config: &RuntimeConfig) -> Result<Self> {
        let request = config.api;
        let context_api = match request.kind {
            ApiKind::OpenGl => ContextApi::OpenGl(Some(Version::new(request.version.major, request.version.minor))),
            ApiKind::OpenGlEs => ContextApi::Gles(Some(Version::new(request.version.major, request.version.minor))),
            ApiKind::DirectX => return Err(anyhow!(RenderError::UnsupportedApi(request.to_string()))),
        };

        let attrs = Window::default_attributes()
            .with_title(config.title.clone())
            .with_inner_size(config.initial_size);
        let template = ConfigTemplateBuilder::new().with_transparency(false);

        // The picker cannot fail, so an empty config list unwinds out of it.
        let built = panic::catch_unwind(AssertUnwindSafe(|| {
            DisplayBuilder::new()
                .with_window_attributes(Some(attrs))
                .build(event_loop, template, pick_config)
        }));
        let (window, gl_config) = match built {
            Ok(result) => result.map_err(|e| anyhow!("failed to build GL display: {e}"))?,
            Err(_) => bail!("GL display offered no framebuffer configs"),
        };
        let window = window.context("glutin did not create a window")?;

        let raw = window
            .window_handle()
            .context("window has no native handle")?
            .as_raw();
        let context_attrs = ContextAttributesBuilder::new()
            .with_context_api(context_api)
            .build(Some(raw));

        let display = gl_config.display();
        // SAFETY: `raw` belongs to `window`, which outlives the context.
        let not_current = unsafe { display.create_context(&gl_config, &context_attrs) }
            .with_context(|| format!("failed to create {request} context"))?;

        let surface_attrs = window
            .build_surface_attributes(Default::default())
            .context("failed to describe window surface")?;
        // SAFETY: as above, the surface is dropped before the window.
        let surface = unsafe { display.create_window_surface(&gl_config, &surface_attrs) }
            .context("failed to create window surface")?;

        let context = not_current
            .make_current(&surface)
            .context("failed to make GL context current")?;

        let interval = if config.vsync {
            SwapInterval::Wait(NonZeroU32::MIN)
        } else {
            SwapInterval::DontWait
        };
        if let Err(e) = surface.set_swap_interval(&context, interval) {
            log::warn!("gl window: could not set swap interval: {e}");
        }

        let provided = provided_api(&display, &context);
        log::info!(
            "gl window: {provided} context ({request} requested), {} samples",
            gl_config.num_samples()
        );
        Ok(Self {
            provided,
            display,
            surface,
            context,
            window,
        })
    }

    #[inline]
    pub fn window(&self) -> &Window {
        &self.window
    }

    /// Resizes the surface; zero-sized (minimized) windows are ignored.
    pub fn resize(&self, size: PhysicalSize<u32>) {
        if let (Some(w), Some(h)) = (NonZeroU32::new(size.width), NonZeroU32::new(size.height)) {
            self.surface.resize(&self.context, w, h);
        }
    }

    pub fn swap_buffers(&self) -> Result<()> {
        self.surface
            .swap_buffers(&self.context)
            .context("failed to swap buffers")
    }
}

impl GraphicsContext for GlWindow {
    fn descriptor(&self) -> ApiRequest {
        self.provided
    }

    fn make_current(&self) -> Result<(), RenderError> {
        self.context
            .make_current(&self.surface)
            .map_err(|e| RenderError::creation("gl context", e.to_string()))
    }

    fn get_proc_address(&self, name: &str) -> *const c_void {
        match CString::new(name) {
            Ok(name) => self.display.get_proc_address(&name),
            Err(_) => std::ptr::null(),
        }
    }

    fn drawable_size(&self) -> (u32, u32) {
        let size = self.window.inner_size();
        (size.width, size.height)
    }
}

/// Most multisampled config the display offers.
fn pick_config(configs: Box<dyn Iterator<Item = Config> + '_>) -> Config {
    match configs.reduce(|best, c| if c.num_samples() > best.num_samples() { c } else { best }) {
        Some(config) => config,
        None => panic!("gl window: display offered no framebuffer configs"),
    }
}

/// Kind from glutin, version from the driver's `GL_VERSION` string.
fn provided_api(display: &Display, context: &PossiblyCurrentContext) -> ApiRequest {
    let kind = match context.context_api() {
        ContextApi::OpenGl(_) => ApiKind::OpenGl,
        ContextApi::Gles(_) => ApiKind::OpenGlEs,
    };
    // SAFETY: `context` is current on this thread; the loader only resolves
    // entry points and reads the version string.
    let gl = unsafe { glow::Context::from_loader_function_cstr(|name| display.get_proc_address(name)) };
    let version = gl.version();
    let clamp = |v: u32| u8::try_from(v).unwrap_or(u8::MAX);
    ApiRequest::new(kind, clamp(version.major), clamp(version.minor))
}
