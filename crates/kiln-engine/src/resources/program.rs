use std::rc::Rc;

use super::release;
use super::shader::Shader;
use crate::api::{LeafType, ProgramId, ShaderStage, SharedApi, UniformDecl, UniformLayout};
use crate::device::GraphicsDevice;
use crate::error::RenderError;

/// A shader program assembled from stages and uniform declarations.
///
/// Stages are attached and uniforms declared first; [`finalize`](Self::finalize)
/// links the program and freezes the uniform layout. Declaring or attaching
/// afterwards panics.
pub struct ShaderProgram {
    api: SharedApi,
    vertex: Option<Shader>,
    fragment: Option<Shader>,
    decls: Vec<UniformDecl>,
    linked: Option<Linked>,
}

struct Linked {
    id: ProgramId,
    layout: Rc<UniformLayout>,
}

impl ShaderProgram {
    pub fn new(device: &GraphicsDevice) -> Self {
        Self {
            api: device.api().clone(),
            vertex: None,
            fragment: None,
            decls: Vec::new(),
            linked: None,
        }
    }

    /// Compiles both stages and links them with the given uniforms.
    pub fn from_sources(
        device: &GraphicsDevice,
        vertex: &str,
        fragment: &str,
        uniforms: impl IntoIterator<Item = UniformDecl>,
    ) -> Result<Self, RenderError> {
        let mut program = Self::new(device);
        program.attach(Shader::vertex(device, vertex)?);
        program.attach(Shader::fragment(device, fragment)?);
        for decl in uniforms {
            program.declare(decl);
        }
        program.finalize()?;
        Ok(program)
    }

    /// Attaches a stage, replacing any earlier shader of the same stage.
    pub fn attach(&mut self, shader: Shader) {
        self.assert_open("attach");
        match shader.stage() {
            ShaderStage::Vertex => self.vertex = Some(shader),
            ShaderStage::Fragment => self.fragment = Some(shader),
        }
    }

    pub fn declare(&mut self, decl: UniformDecl) {
        self.assert_open("declare uniform");
        self.decls.push(decl);
    }

    pub fn declare_leaf(&mut self, name: &str, ty: LeafType) {
        self.declare(UniformDecl::leaf(name, ty));
    }

    /// Flattens the declarations and links. Attached shaders are released
    /// once the program links.
    ///
    /// # Panics
    /// If the backend fails to link the stages.
    pub fn finalize(&mut self) -> Result<(), RenderError> {
        self.assert_open("finalize");
        let (Some(vertex), Some(fragment)) = (&self.vertex, &self.fragment) else {
            return Err(RenderError::InvalidArgument(
                "shader program needs a vertex and a fragment stage".into(),
            ));
        };

        let layout = UniformLayout::flatten(&self.decls)?;
        let id = self.api.borrow_mut().create_shader_program(vertex.id(), fragment.id())?;
        log::debug!(
            "shader program: linked {id:?} with {} uniform bytes",
            layout.size()
        );

        self.vertex = None;
        self.fragment = None;
        self.linked = Some(Linked {
            id,
            layout: Rc::new(layout),
        });
        Ok(())
    }

    #[inline]
    pub fn is_finalized(&self) -> bool {
        self.linked.is_some()
    }

    /// Backend id; `None` until finalized.
    #[inline]
    pub fn id(&self) -> Option<ProgramId> {
        self.linked.as_ref().map(|l| l.id)
    }

    /// Flattened uniform layout; `None` until finalized.
    pub fn layout(&self) -> Option<&Rc<UniformLayout>> {
        self.linked.as_ref().map(|l| &l.layout)
    }

    pub fn bind(&self) {
        match self.id() {
            Some(id) => self.api.borrow_mut().bind_shader_program(Some(id)),
            None => panic!("shader program: bind before finalize"),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.id().is_some_and(|id| self.api.borrow().is_program_valid(id))
    }

    fn assert_open(&self, op: &str) {
        assert!(self.linked.is_none(), "shader program: {op} after finalize");
    }
}

impl Drop for ShaderProgram {
    fn drop(&mut self) {
        if let Some(id) = self.id() {
            release(&self.api, "shader program", |api| api.delete_shader_program(id));
        }
    }
}

impl std::fmt::Debug for ShaderProgram {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShaderProgram")
            .field("id", &self.id())
            .field("uniforms", &self.decls.len())
            .finish()
    }
}
