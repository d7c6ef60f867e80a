use std::rc::Rc;

use bytemuck::Pod;

use super::program::ShaderProgram;
use crate::api::{ProgramId, UniformLayout};
use crate::device::GraphicsDevice;
use crate::error::RenderError;

/// Uniform values for one program, packed back to back in declaration order.
#[derive(Debug, Clone)]
pub struct ShaderProgramState {
    program: ProgramId,
    layout: Rc<UniformLayout>,
    data: Vec<u8>,
}

impl ShaderProgramState {
    /// Zero-initialized state for `program`.
    ///
    /// # Panics
    /// If `program` has not been finalized.
    pub fn new(program: &ShaderProgram) -> Self {
        let (Some(id), Some(layout)) = (program.id(), program.layout()) else {
            panic!("shader program state: program is not finalized");
        };
        Self {
            program: id,
            layout: Rc::clone(layout),
            data: vec![0; layout.size()],
        }
    }

    #[inline]
    pub fn program(&self) -> ProgramId {
        self.program
    }

    #[inline]
    pub fn layout(&self) -> &UniformLayout {
        &self.layout
    }

    /// The whole packed buffer.
    #[inline]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Writes `bytes` at the uniform's offset; the length must match exactly.
    pub fn set_uniform(&mut self, name: &str, bytes: &[u8]) -> Result<(), RenderError> {
        let slot = self
            .layout
            .slot(name)
            .ok_or_else(|| RenderError::UnknownUniform(name.to_owned()))?;
        if slot.size != bytes.len() {
            return Err(RenderError::UniformSizeMismatch {
                name: name.to_owned(),
                expected: slot.size,
                actual: bytes.len(),
            });
        }
        self.data[slot.offset..slot.offset + slot.size].copy_from_slice(bytes);
        Ok(())
    }

    pub fn set_uniform_value<T: Pod>(&mut self, name: &str, value: &T) -> Result<(), RenderError> {
        self.set_uniform(name, bytemuck::bytes_of(value))
    }

    pub fn set_uniform_slice<T: Pod>(&mut self, name: &str, values: &[T]) -> Result<(), RenderError> {
        self.set_uniform(name, bytemuck::cast_slice(values))
    }

    /// Exact bytes of one uniform.
    pub fn get_uniform(&self, name: &str) -> Option<&[u8]> {
        self.layout
            .slot(name)
            .map(|slot| &self.data[slot.offset..slot.offset + slot.size])
    }

    /// Uploads every uniform to the program (binding it).
    pub fn apply(&self, device: &GraphicsDevice) {
        device
            .api_mut()
            .bind_shader_program_state(self.program, &self.layout, &self.data);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{ApiCall, FeatureFlags, HeadlessApi, LeafType, UniformDecl};
    use glam::{Mat4, Vec3, Vec4};

    fn program(device: &GraphicsDevice, decls: Vec<UniformDecl>) -> ShaderProgram {
        ShaderProgram::from_sources(device, "void main() {}", "void main() {}", decls).unwrap()
    }

    fn device() -> GraphicsDevice {
        GraphicsDevice::with_api(HeadlessApi::new(FeatureFlags::none()), 32, 32)
    }

    #[test]
    fn mvp_and_tint_pack_into_eighty_bytes() {
        let device = device();
        let program = program(
            &device,
            vec![
                UniformDecl::leaf("mvp", LeafType::Matrix4),
                UniformDecl::leaf("tint", LeafType::Float4),
            ],
        );
        let mut state = ShaderProgramState::new(&program);
        let tint = Vec4::new(1.0, 0.5, 0.25, 1.0);
        state.set_uniform_value("tint", &tint).unwrap();

        assert_eq!(state.data().len(), 80);
        assert_eq!(&state.data()[64..80], bytemuck::bytes_of(&tint));
        assert!(state.data()[..64].iter().all(|&b| b == 0));
    }

    #[test]
    fn set_then_get_round_trips_exact_bytes() {
        let device = device();
        let light = vec![
            UniformDecl::leaf("color", LeafType::Float3),
            UniformDecl::leaf("power", LeafType::Float),
        ];
        let program = program(
            &device,
            vec![
                UniformDecl::leaf("mvp", LeafType::Matrix4),
                UniformDecl::struct_array("lights", light, 2),
            ],
        );
        let mut state = ShaderProgramState::new(&program);

        let mvp = Mat4::from_translation(Vec3::new(3.0, 4.0, 0.0));
        let color = [0.1f32, 0.2, 0.3];
        state.set_uniform_value("mvp", &mvp).unwrap();
        state.set_uniform_slice("lights[1].color", &color).unwrap();

        assert_eq!(state.get_uniform("mvp"), Some(bytemuck::bytes_of(&mvp)));
        assert_eq!(
            state.get_uniform("lights[1].color"),
            Some(bytemuck::cast_slice::<f32, u8>(&color))
        );
        assert_eq!(state.get_uniform("lights[0].color"), Some(&[0u8; 12][..]));
    }

    #[test]
    fn unknown_names_and_wrong_sizes_are_errors() {
        let device = device();
        let program = program(&device, vec![UniformDecl::leaf("tint", LeafType::Float4)]);
        let mut state = ShaderProgramState::new(&program);

        assert_eq!(
            state.set_uniform_value("nope", &1.0f32),
            Err(RenderError::UnknownUniform("nope".into()))
        );
        assert_eq!(
            state.set_uniform_value("tint", &1.0f32),
            Err(RenderError::UniformSizeMismatch {
                name: "tint".into(),
                expected: 16,
                actual: 4
            })
        );
        assert_eq!(state.get_uniform("nope"), None);
    }

    #[test]
    fn apply_uploads_packed_buffer() {
        let api = HeadlessApi::new(FeatureFlags::none());
        let log = api.log();
        let device = GraphicsDevice::with_api(api, 32, 32);
        let program = program(&device, vec![UniformDecl::leaf("alpha", LeafType::Float)]);
        let mut state = ShaderProgramState::new(&program);
        state.set_uniform_value("alpha", &0.5f32).unwrap();

        state.apply(&device);
        assert_eq!(
            log.snapshot().last(),
            Some(&ApiCall::BindProgramState {
                program: state.program(),
                data: 0.5f32.to_ne_bytes().to_vec()
            })
        );
    }

    #[test]
    #[should_panic(expected = "program is not finalized")]
    fn state_for_unfinalized_program_panics() {
        let device = device();
        let program = ShaderProgram::new(&device);
        let _ = ShaderProgramState::new(&program);
    }
}
