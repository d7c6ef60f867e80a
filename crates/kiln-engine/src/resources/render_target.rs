use glam::Vec2;

use super::release;
use crate::api::{PixelFormat, SharedApi, TargetId, TextureId};
use crate::coords::{Color, Rect, Viewport};
use crate::device::GraphicsDevice;
use crate::error::RenderError;
use crate::render::{Renderer, TexturedQuad};

/// Off-screen framebuffer: a color texture plus a depth renderbuffer.
///
/// Rendering is redirected here with `Renderer::push_target`.
pub struct RenderTarget {
    api: SharedApi,
    id: TargetId,
    texture: TextureId,
    width: u32,
    height: u32,
    format: PixelFormat,
}

impl RenderTarget {
    pub fn new(device: &GraphicsDevice, width: u32, height: u32, format: PixelFormat) -> Result<Self, RenderError> {
        let api = device.api().clone();
        let (id, texture) = {
            let mut backend = api.borrow_mut();
            let id = backend.create_render_target(width, height, format)?;
            match backend.render_target_texture(id) {
                Some(texture) => (id, texture),
                None => {
                    backend.delete_render_target(id);
                    return Err(RenderError::creation("render target", "no color attachment"));
                }
            }
        };
        Ok(Self {
            api,
            id,
            texture,
            width,
            height,
            format,
        })
    }

    #[inline]
    pub fn id(&self) -> TargetId {
        self.id
    }

    /// Color attachment; owned by the target.
    #[inline]
    pub fn texture_id(&self) -> TextureId {
        self.texture
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width as f32, self.height as f32)
    }

    #[inline]
    pub fn format(&self) -> PixelFormat {
        self.format
    }

    #[inline]
    pub fn viewport(&self) -> Viewport {
        Viewport::from_size(self.width, self.height)
    }

    pub fn is_valid(&self) -> bool {
        self.api.borrow().is_render_target_valid(self.id)
    }

    /// Queues the target's color texture as a quad, upright. Same parameters
    /// as `Texture2D::draw`.
    pub fn draw(&self, renderer: &mut Renderer, dest: Rect, src: Option<Rect>, color: Color, origin: Vec2, rotation: f32) {
        renderer.draw_textured_quad(TexturedQuad {
            texture: self.texture,
            texture_size: self.size(),
            dest,
            src,
            color,
            origin,
            rotation,
            // Framebuffer rows are stored bottom-up.
            flip_v: true,
        });
    }
}

impl PartialEq for RenderTarget {
    fn eq(&self, other: &Self) -> bool {
        self.api.borrow().compare_render_targets(self.id, other.id)
    }
}

impl Drop for RenderTarget {
    fn drop(&mut self) {
        let id = self.id;
        release(&self.api, "render target", |api| api.delete_render_target(id));
    }
}

impl std::fmt::Debug for RenderTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderTarget")
            .field("id", &self.id)
            .field("width", &self.width)
            .field("height", &self.height)
            .finish()
    }
}
