use anyhow::{Context, Result};
use glam::Vec2;
use kiln_engine::api::{FilterMode, PixelFormat};
use kiln_engine::coords::{Color, Rect};
use kiln_engine::core::{App, AppControl, FrameCtx};
use kiln_engine::logging::LoggingConfig;
use kiln_engine::render::Renderer;
use kiln_engine::resources::{RenderTarget, Texture2D};
use kiln_engine::window::{Runtime, RuntimeConfig};

const CHECKER: u32 = 8;

/// Sprites at three Z layers, a rotating sprite, a line fan, and a
/// thumbnail rendered through an off-screen target.
#[derive(Default)]
struct Studio {
    checker: Option<Texture2D>,
    target: Option<RenderTarget>,
    angle: f32,
}

impl Studio {
    fn checker_pixels() -> Vec<u8> {
        (0..CHECKER * CHECKER)
            .flat_map(|i| {
                let (x, y) = (i % CHECKER, i / CHECKER);
                if (x + y) % 2 == 0 {
                    [230, 230, 230, 255]
                } else {
                    [40, 40, 60, 255]
                }
            })
            .collect()
    }
}

impl App for Studio {
    fn setup(&mut self, renderer: &mut Renderer) -> Result<()> {
        let device = renderer.device();
        let mut checker = Texture2D::from_rgba8(device, CHECKER, CHECKER, &Self::checker_pixels())
            .context("failed to create checker texture")?;
        checker.set_filter(FilterMode::Nearest)?;

        self.target =
            Some(RenderTarget::new(device, 128, 128, PixelFormat::R8G8B8A8).context("failed to create render target")?);
        self.checker = Some(checker);
        renderer.set_clear_color(Color::from_hex(0x1E1E28FF));
        Ok(())
    }

    fn on_frame(&mut self, ctx: &mut FrameCtx<'_>) -> AppControl {
        let (Some(checker), Some(target)) = (&self.checker, &self.target) else {
            return AppControl::Exit;
        };
        let r = &mut *ctx.renderer;
        self.angle += ctx.time.dt;

        // Off-screen pass: a spinning checker into the 128x128 target.
        r.push_target(target);
        r.clear();
        checker.draw(
            r,
            Rect::new(64.0, 64.0, 96.0, 96.0),
            None,
            Color::WHITE,
            Vec2::splat(48.0),
            self.angle,
        );
        r.pop_target();

        // Submitted back to front on purpose; Z decides the order.
        let layers = [(1.0, Color::rgb(80, 160, 255)), (0.0, Color::rgb(255, 200, 60)), (-1.0, Color::rgb(220, 70, 90))];
        for (i, (z, color)) in layers.into_iter().enumerate() {
            let offset = 40.0 + 30.0 * (2 - i) as f32;
            r.set_z_index(z);
            r.draw_rect(Rect::new(offset, offset, 160.0, 120.0), color);
        }
        r.set_z_index(0.0);

        let (w, h) = (ctx.size.0 as f32, ctx.size.1 as f32);
        let center = Vec2::new(w * 0.5, h * 0.5);
        for k in 0..24 {
            let a = self.angle * 0.25 + k as f32 * std::f32::consts::TAU / 24.0;
            let tip = center + Vec2::from_angle(a) * 140.0;
            r.draw_line(center, tip, Color::rgb(120, 220, 160));
        }

        target.draw(
            r,
            Rect::new(w - 160.0, 32.0, 128.0, 128.0),
            None,
            Color::WHITE,
            Vec2::ZERO,
            0.0,
        );

        AppControl::Continue
    }

    fn teardown(&mut self, _renderer: &mut Renderer) {
        self.target = None;
        self.checker = None;
    }
}

fn main() -> Result<()> {
    Runtime::run(
        RuntimeConfig {
            title: "Kiln Studio".to_string(),
            logging: LoggingConfig {
                trace_api_calls: std::env::var_os("KILN_TRACE_API").is_some(),
                ..LoggingConfig::default()
            },
            ..RuntimeConfig::default()
        },
        Studio::default(),
    )
}
