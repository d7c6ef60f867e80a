use glam::Vec2;

use super::release;
use crate::api::{FilterMode, PixelFormat, SharedApi, TextureDesc, TextureId, WrapMode};
use crate::coords::{Color, Rect};
use crate::device::GraphicsDevice;
use crate::error::RenderError;
use crate::render::{Renderer, TexturedQuad};

/// A 2D texture. Share one between many sprites with `Rc<Texture2D>`.
pub struct Texture2D {
    api: SharedApi,
    id: TextureId,
    desc: TextureDesc,
}

impl Texture2D {
    /// Creates the texture and uploads `pixels` (laid out as `desc.format`).
    /// Compressed formats require pixels; others may start uninitialized.
    pub fn new(device: &GraphicsDevice, desc: TextureDesc, pixels: Option<&[u8]>) -> Result<Self, RenderError> {
        let api = device.api().clone();
        let id = api.borrow_mut().create_texture(&desc, pixels)?;
        Ok(Self { api, id, desc })
    }

    /// Linear, clamped RGBA8 texture.
    pub fn from_rgba8(device: &GraphicsDevice, width: u32, height: u32, pixels: &[u8]) -> Result<Self, RenderError> {
        Self::new(device, TextureDesc::new(width, height, PixelFormat::R8G8B8A8), Some(pixels))
    }

    #[inline]
    pub fn id(&self) -> TextureId {
        self.id
    }

    #[inline]
    pub fn desc(&self) -> &TextureDesc {
        &self.desc
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.desc.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.desc.height
    }

    #[inline]
    pub fn size(&self) -> Vec2 {
        Vec2::new(self.desc.width as f32, self.desc.height as f32)
    }

    #[inline]
    pub fn format(&self) -> PixelFormat {
        self.desc.format
    }

    pub fn set_filter(&mut self, filter: FilterMode) -> Result<(), RenderError> {
        self.api.borrow_mut().set_texture_filter(self.id, filter)?;
        self.desc.filter = filter;
        self.desc.mipmaps |= filter.uses_mipmaps();
        Ok(())
    }

    pub fn set_wrap(&mut self, wrap: WrapMode) -> Result<(), RenderError> {
        self.api.borrow_mut().set_texture_wrap(self.id, wrap)?;
        self.desc.wrap = wrap;
        Ok(())
    }

    pub fn bind(&self, unit: u32) {
        self.api.borrow_mut().bind_texture(Some(self.id), unit);
    }

    pub fn is_valid(&self) -> bool {
        self.api.borrow().is_texture_valid(self.id)
    }

    /// Queues a textured quad.
    ///
    /// `src` is a pixel region of the texture (whole texture when `None`).
    /// `origin` is the pivot in destination pixels: it lands on `dest.origin`
    /// and the quad rotates around it by `rotation` radians.
    pub fn draw(&self, renderer: &mut Renderer, dest: Rect, src: Option<Rect>, color: Color, origin: Vec2, rotation: f32) {
        renderer.draw_textured_quad(TexturedQuad {
            texture: self.id,
            texture_size: self.size(),
            dest,
            src,
            color,
            origin,
            rotation,
            flip_v: false,
        });
    }
}

impl PartialEq for Texture2D {
    fn eq(&self, other: &Self) -> bool {
        self.api.borrow().compare_textures(self.id, other.id)
    }
}

impl Drop for Texture2D {
    fn drop(&mut self) {
        let id = self.id;
        release(&self.api, "texture", |api| api.delete_texture(id));
    }
}

impl std::fmt::Debug for Texture2D {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Texture2D")
            .field("id", &self.id)
            .field("width", &self.desc.width)
            .field("height", &self.desc.height)
            .field("format", &self.desc.format)
            .finish()
    }
}
