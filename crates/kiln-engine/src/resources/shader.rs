use super::release;
use crate::api::{ShaderId, ShaderStage, SharedApi};
use crate::device::GraphicsDevice;
use crate::error::RenderError;

/// One compiled shader stage.
pub struct Shader {
    api: SharedApi,
    id: ShaderId,
    stage: ShaderStage,
}

impl Shader {
    /// Compiles `source`. On failure the native shader is already deleted and
    /// the driver's info log is in the error.
    pub fn new(device: &GraphicsDevice, stage: ShaderStage, source: &str) -> Result<Self, RenderError> {
        let api = device.api().clone();
        let id = api.borrow_mut().create_shader(stage, source)?;
        Ok(Self { api, id, stage })
    }

    pub fn vertex(device: &GraphicsDevice, source: &str) -> Result<Self, RenderError> {
        Self::new(device, ShaderStage::Vertex, source)
    }

    pub fn fragment(device: &GraphicsDevice, source: &str) -> Result<Self, RenderError> {
        Self::new(device, ShaderStage::Fragment, source)
    }

    #[inline]
    pub fn id(&self) -> ShaderId {
        self.id
    }

    #[inline]
    pub fn stage(&self) -> ShaderStage {
        self.stage
    }

    pub fn is_valid(&self) -> bool {
        self.api.borrow().is_shader_valid(self.id)
    }
}

impl Drop for Shader {
    fn drop(&mut self) {
        let id = self.id;
        release(&self.api, "shader", |api| api.delete_shader(id));
    }
}

impl std::fmt::Debug for Shader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Shader")
            .field("id", &self.id)
            .field("stage", &self.stage)
            .finish()
    }
}
