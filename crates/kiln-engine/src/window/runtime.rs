use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::WindowId;

use super::gl_window::GlWindow;
use crate::api::ApiRequest;
use crate::core::{App, AppControl, FrameCtx, FrameTime};
use crate::device::{GraphicsContext, GraphicsDevice};
use crate::logging::{LoggingConfig, init_logging};
use crate::render::{Renderer, RendererConfig};

const DT_MIN: Duration = Duration::from_micros(100);
const DT_MAX: Duration = Duration::from_millis(250);

/// Window/runtime configuration.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub title: String,
    pub initial_size: LogicalSize<f64>,
    /// Context the window is created with and the device is loaded for.
    pub api: ApiRequest,
    pub vsync: bool,
    pub renderer: RendererConfig,
    pub logging: LoggingConfig,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            title: "kiln".to_string(),
            initial_size: LogicalSize::new(1280.0, 720.0),
            api: ApiRequest::default(),
            vsync: true,
            renderer: RendererConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

/// Entry point for the runtime.
pub struct Runtime;

impl Runtime {
    /// Opens one window, builds a device and renderer on it, and drives `app`
    /// until the window closes or the app asks to exit.
    pub fn run<A>(config: RuntimeConfig, app: A) -> Result<()>
    where
        A: App + 'static,
    {
        init_logging(config.logging.clone());
        let event_loop = EventLoop::new().context("failed to create winit EventLoop")?;
        let mut state = AppState {
            config,
            app,
            entry: None,
            failure: None,
        };

        event_loop
            .run_app(&mut state)
            .context("winit event loop terminated with error")?;

        match state.failure {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

struct WindowEntry {
    // Dropped before the window that owns the GL context.
    renderer: Renderer,
    window: GlWindow,
    last_tick: Instant,
    frame_index: u64,
}

impl WindowEntry {
    fn tick(&mut self) -> FrameTime {
        let now = Instant::now();
        let dt = now.saturating_duration_since(self.last_tick).clamp(DT_MIN, DT_MAX);
        self.last_tick = now;
        let time = FrameTime {
            dt: dt.as_secs_f32(),
            frame_index: self.frame_index,
        };
        self.frame_index = self.frame_index.wrapping_add(1);
        time
    }
}

struct AppState<A: App> {
    config: RuntimeConfig,
    app: A,
    entry: Option<WindowEntry>,
    failure: Option<anyhow::Error>,
}

impl<A: App> AppState<A> {
    fn create_entry(&mut self, event_loop: &ActiveEventLoop) -> Result<WindowEntry> {
        let window = GlWindow::new(event_loop, &self.config)?;
        let device = GraphicsDevice::new(&window, self.config.api).context("failed to create graphics device")?;
        let mut renderer = Renderer::new(device, self.config.renderer.clone()).context("failed to create renderer")?;
        if let Err(e) = self.app.setup(&mut renderer) {
            release_app_resources(&mut self.app, &mut renderer);
            return Err(e.context("app setup failed"));
        }

        Ok(WindowEntry {
            renderer,
            window,
            last_tick: Instant::now(),
            frame_index: 0,
        })
    }

    /// Releases the app's resources, then the renderer, then the window.
    fn close(&mut self, event_loop: &ActiveEventLoop) {
        if let Some(mut entry) = self.entry.take() {
            release_app_resources(&mut self.app, &mut entry.renderer);
        }
        event_loop.exit();
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, error: anyhow::Error) {
        log::error!("runtime: {error:#}");
        self.failure = Some(error);
        self.close(event_loop);
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let Some(entry) = self.entry.as_mut() else {
            return;
        };
        let time = entry.tick();
        let size = entry.window.drawable_size();

        entry.renderer.clear();
        let control = self.app.on_frame(&mut FrameCtx {
            renderer: &mut entry.renderer,
            size,
            time,
        });
        entry.renderer.render();

        if let Err(e) = entry.window.swap_buffers() {
            self.fail(event_loop, e);
            return;
        }
        if control == AppControl::Exit {
            self.close(event_loop);
        }
    }
}

impl<A: App> ApplicationHandler for AppState<A> {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.entry.is_some() {
            return;
        }
        match self.create_entry(event_loop) {
            Ok(entry) => {
                entry.window.window().request_redraw();
                self.entry = Some(entry);
            }
            Err(e) => self.fail(event_loop, e),
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        event_loop.set_control_flow(ControlFlow::Wait);
        // Continuous redraw.
        if let Some(entry) = &self.entry {
            entry.window.window().request_redraw();
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        if self.app.on_window_event(&event) == AppControl::Exit {
            self.close(event_loop);
            return;
        }

        match event {
            WindowEvent::CloseRequested => self.close(event_loop),
            WindowEvent::Resized(size) => {
                if let Some(entry) = self.entry.as_mut() {
                    entry.window.resize(size);
                    if size.width > 0 && size.height > 0 {
                        entry.renderer.set_window_size(size.width, size.height);
                    }
                }
            }
            WindowEvent::RedrawRequested => self.redraw(event_loop),
            _ => {}
        }
    }
}

/// Runs the app's teardown while the renderer's context is still current and
/// drops anything the teardown left staged.
fn release_app_resources<A: App>(app: &mut A, renderer: &mut Renderer) {
    if renderer.in_batch() {
        renderer.end_vertices();
    }
    app.teardown(renderer);
    renderer.discard();
    log::debug!("runtime: app resources released");
}
