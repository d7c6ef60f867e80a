//! Uniform declarations and their flattened, tightly packed layout.

use std::collections::HashMap;

use crate::error::RenderError;

/// Leaf uniform types, i.e. what a single `glUniform*` call uploads.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum LeafType {
    Int,
    Float,
    Float2,
    Float3,
    Float4,
    Matrix3,
    Matrix4,
    Sampler2D,
}

impl LeafType {
    /// Packed size of one element in bytes.
    pub const fn size(self) -> usize {
        match self {
            Self::Int | Self::Float | Self::Sampler2D => 4,
            Self::Float2 => 8,
            Self::Float3 => 12,
            Self::Float4 => 16,
            Self::Matrix3 => 36,
            Self::Matrix4 => 64,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UniformType {
    Leaf(LeafType),
    Struct(Vec<UniformDecl>),
}

/// A declared uniform; `count > 1` declares an array.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UniformDecl {
    pub name: String,
    pub ty: UniformType,
    pub count: u32,
}

impl UniformDecl {
    pub fn leaf(name: impl Into<String>, ty: LeafType) -> Self {
        Self::array(name, ty, 1)
    }

    pub fn array(name: impl Into<String>, ty: LeafType, count: u32) -> Self {
        Self {
            name: name.into(),
            ty: UniformType::Leaf(ty),
            count,
        }
    }

    pub fn structure(name: impl Into<String>, members: Vec<UniformDecl>) -> Self {
        Self::struct_array(name, members, 1)
    }

    pub fn struct_array(name: impl Into<String>, members: Vec<UniformDecl>, count: u32) -> Self {
        Self {
            name: name.into(),
            ty: UniformType::Struct(members),
            count,
        }
    }
}

/// A leaf uniform inside the packed state buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UniformSlot {
    /// Full GLSL path, e.g. `light.color` or `lights[1].color`.
    pub path: String,
    pub offset: usize,
    pub size: usize,
    pub leaf: LeafType,
    pub count: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UniformLayout {
    slots: Vec<UniformSlot>,
    by_path: HashMap<String, usize>,
    size: usize,
}

impl UniformLayout {
    /// Flattens `decls` in declaration order with no padding between leaves.
    pub fn flatten(decls: &[UniformDecl]) -> Result<Self, RenderError> {
        let mut layout = Self::default();
        for decl in decls {
            layout.push_decl("", decl)?;
        }
        Ok(layout)
    }

    fn push_decl(&mut self, prefix: &str, decl: &UniformDecl) -> Result<(), RenderError> {
        if decl.name.is_empty() || decl.count == 0 {
            return Err(RenderError::InvalidArgument(format!(
                "uniform `{prefix}{}` needs a name and a non-zero count",
                decl.name
            )));
        }

        let path = format!("{prefix}{}", decl.name);
        match &decl.ty {
            UniformType::Leaf(leaf) => {
                if self.by_path.contains_key(&path) {
                    return Err(RenderError::InvalidArgument(format!(
                        "uniform `{path}` declared twice"
                    )));
                }
                let size = leaf.size() * decl.count as usize;
                self.by_path.insert(path.clone(), self.slots.len());
                self.slots.push(UniformSlot {
                    path,
                    offset: self.size,
                    size,
                    leaf: *leaf,
                    count: decl.count,
                });
                self.size += size;
            }
            UniformType::Struct(members) => {
                for i in 0..decl.count {
                    let prefix = if decl.count == 1 {
                        format!("{path}.")
                    } else {
                        format!("{path}[{i}].")
                    };
                    for member in members {
                        self.push_decl(&prefix, member)?;
                    }
                }
            }
        }
        Ok(())
    }

    #[inline]
    pub fn slot(&self, path: &str) -> Option<&UniformSlot> {
        self.by_path.get(path).map(|&i| &self.slots[i])
    }

    #[inline]
    pub fn slots(&self) -> &[UniformSlot] {
        &self.slots
    }

    /// Total packed size in bytes.
    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }
}
