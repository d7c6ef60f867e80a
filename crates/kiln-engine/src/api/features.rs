//! Hardware capability table.
//!
//! Built exactly once per backend from the profile's core guarantees plus the
//! driver's extension list, then consulted by every format and state decision.

use std::collections::HashSet;

use crate::error::RenderError;

/// A single gateable capability.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Feature {
    VertexArrayObjects,
    NpotTextures,
    FloatTextures,
    DepthTextures,
    ElementIndexUint,
    UniformBuffers,
    Dxt,
    Etc1,
    Etc2,
    Pvrtc,
    Astc,
    AnisotropicFiltering,
    MirrorClamp,
}

impl Feature {
    pub const fn name(self) -> &'static str {
        match self {
            Self::VertexArrayObjects => "vertex array objects",
            Self::NpotTextures => "non-power-of-two textures",
            Self::FloatTextures => "float textures",
            Self::DepthTextures => "depth textures",
            Self::ElementIndexUint => "32-bit element indices",
            Self::UniformBuffers => "uniform buffers",
            Self::Dxt => "DXT compression",
            Self::Etc1 => "ETC1 compression",
            Self::Etc2 => "ETC2/EAC compression",
            Self::Pvrtc => "PVRTC compression",
            Self::Astc => "ASTC compression",
            Self::AnisotropicFiltering => "anisotropic filtering",
            Self::MirrorClamp => "mirror-clamp wrap mode",
        }
    }

    /// Extension names that each independently grant the feature.
    const fn extensions(self) -> &'static [&'static str] {
        match self {
            Self::VertexArrayObjects => &[
                "GL_ARB_vertex_array_object",
                "GL_OES_vertex_array_object",
                "GL_APPLE_vertex_array_object",
            ],
            Self::NpotTextures => &[
                "GL_ARB_texture_non_power_of_two",
                "GL_OES_texture_npot",
                "GL_IMG_texture_npot",
            ],
            Self::FloatTextures => &["GL_ARB_texture_float", "GL_OES_texture_float"],
            Self::DepthTextures => &[
                "GL_ARB_depth_texture",
                "GL_OES_depth_texture",
                "GL_ANGLE_depth_texture",
                "GL_WEBGL_depth_texture",
            ],
            Self::ElementIndexUint => &["GL_OES_element_index_uint"],
            Self::UniformBuffers => &["GL_ARB_uniform_buffer_object"],
            Self::Dxt => &[
                "GL_EXT_texture_compression_s3tc",
                "GL_WEBGL_compressed_texture_s3tc",
            ],
            Self::Etc1 => &[
                "GL_OES_compressed_ETC1_RGB8_texture",
                "GL_WEBGL_compressed_texture_etc1",
            ],
            Self::Etc2 => &["GL_ARB_ES3_compatibility", "GL_WEBGL_compressed_texture_etc"],
            Self::Pvrtc => &[
                "GL_IMG_texture_compression_pvrtc",
                "GL_WEBGL_compressed_texture_pvrtc",
            ],
            Self::Astc => &[
                "GL_KHR_texture_compression_astc_ldr",
                "GL_OES_texture_compression_astc",
                "GL_WEBGL_compressed_texture_astc",
            ],
            Self::AnisotropicFiltering => &[
                "GL_EXT_texture_filter_anisotropic",
                "GL_ARB_texture_filter_anisotropic",
            ],
            Self::MirrorClamp => &[
                "GL_ARB_texture_mirror_clamp_to_edge",
                "GL_EXT_texture_mirror_clamp_to_edge",
                "GL_EXT_texture_mirror_clamp",
                "GL_ATI_texture_mirror_once",
            ],
        }
    }

    const ALL: [Feature; 13] = [
        Feature::VertexArrayObjects,
        Feature::NpotTextures,
        Feature::FloatTextures,
        Feature::DepthTextures,
        Feature::ElementIndexUint,
        Feature::UniformBuffers,
        Feature::Dxt,
        Feature::Etc1,
        Feature::Etc2,
        Feature::Pvrtc,
        Feature::Astc,
        Feature::AnisotropicFiltering,
        Feature::MirrorClamp,
    ];
}

/// Driver extension names, however they were queried.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtensionSet {
    names: HashSet<String>,
}

impl ExtensionSet {
    /// Parses a legacy space-delimited `GL_EXTENSIONS` string (GL 2.x, GLES 2.0).
    pub fn parse_legacy(extensions: &str) -> Self {
        Self {
            names: extensions.split_whitespace().map(str::to_owned).collect(),
        }
    }

    /// Collects names returned one by one via `glGetStringi` (GL/GLES 3.0+).
    pub fn from_indexed<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names
                .into_iter()
                .map(Into::into)
                .filter(|s: &String| !s.is_empty())
                .collect(),
        }
    }

    #[inline]
    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    #[inline]
    pub fn grants(&self, feature: Feature) -> bool {
        feature.extensions().iter().any(|e| self.contains(e))
    }
}

/// Immutable capability table of one backend instance.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct FeatureFlags {
    pub vertex_array_objects: bool,
    pub npot_textures: bool,
    pub float_textures: bool,
    pub depth_textures: bool,
    pub element_index_uint: bool,
    pub uniform_buffers: bool,
    pub dxt: bool,
    pub etc1: bool,
    pub etc2: bool,
    pub pvrtc: bool,
    pub astc: bool,
    /// Maximum anisotropy level; `0.0` when anisotropic filtering is unavailable.
    pub max_anisotropy: f32,
    pub mirror_clamp: bool,
}

impl FeatureFlags {
    /// No optional capability at all (bare GLES 2.0 without extensions).
    pub const fn none() -> Self {
        Self {
            vertex_array_objects: false,
            npot_textures: false,
            float_textures: false,
            depth_textures: false,
            element_index_uint: false,
            uniform_buffers: false,
            dxt: false,
            etc1: false,
            etc2: false,
            pvrtc: false,
            astc: false,
            max_anisotropy: 0.0,
            mirror_clamp: false,
        }
    }

    /// Every capability, with 16x anisotropy.
    pub const fn all() -> Self {
        Self {
            vertex_array_objects: true,
            npot_textures: true,
            float_textures: true,
            depth_textures: true,
            element_index_uint: true,
            uniform_buffers: true,
            dxt: true,
            etc1: true,
            etc2: true,
            pvrtc: true,
            astc: true,
            max_anisotropy: 16.0,
            mirror_clamp: true,
        }
    }

    /// Combines the profile's core guarantees with the driver's extensions.
    ///
    /// `query_max_anisotropy` is only invoked when anisotropic filtering is
    /// available, since the limit query itself is an extension enum.
    pub fn detect(
        core: FeatureFlags,
        extensions: &ExtensionSet,
        query_max_anisotropy: impl FnOnce() -> f32,
    ) -> Self {
        let mut flags = core;
        for feature in Feature::ALL {
            if feature == Feature::AnisotropicFiltering {
                continue;
            }
            if !flags.supports(feature) && extensions.grants(feature) {
                flags.grant(feature);
            }
        }

        if flags.max_anisotropy <= 0.0 && extensions.grants(Feature::AnisotropicFiltering) {
            flags.max_anisotropy = query_max_anisotropy().max(1.0);
        }

        flags
    }

    pub fn supports(&self, feature: Feature) -> bool {
        match feature {
            Feature::VertexArrayObjects => self.vertex_array_objects,
            Feature::NpotTextures => self.npot_textures,
            Feature::FloatTextures => self.float_textures,
            Feature::DepthTextures => self.depth_textures,
            Feature::ElementIndexUint => self.element_index_uint,
            Feature::UniformBuffers => self.uniform_buffers,
            Feature::Dxt => self.dxt,
            Feature::Etc1 => self.etc1,
            Feature::Etc2 => self.etc2,
            Feature::Pvrtc => self.pvrtc,
            Feature::Astc => self.astc,
            Feature::AnisotropicFiltering => self.max_anisotropy > 0.0,
            Feature::MirrorClamp => self.mirror_clamp,
        }
    }

    /// Fails with a structured error naming `subsystem` when `feature` is missing.
    pub fn require(&self, subsystem: &'static str, feature: Feature) -> Result<(), RenderError> {
        if self.supports(feature) {
            Ok(())
        } else {
            Err(RenderError::unsupported(subsystem, feature.name()))
        }
    }

    /// Builder-style toggle, mostly for configuring test backends.
    pub fn with(mut self, feature: Feature, enabled: bool) -> Self {
        if enabled {
            self.grant(feature);
        } else {
            match self.flag_mut(feature) {
                Some(flag) => *flag = false,
                None => self.max_anisotropy = 0.0,
            }
        }
        self
    }

    fn grant(&mut self, feature: Feature) {
        match self.flag_mut(feature) {
            Some(flag) => *flag = true,
            None => {
                if self.max_anisotropy <= 0.0 {
                    self.max_anisotropy = 1.0;
                }
            }
        }
    }

    /// Boolean slot of `feature`; `None` for anisotropy, which is a level.
    fn flag_mut(&mut self, feature: Feature) -> Option<&mut bool> {
        let flag = match feature {
            Feature::VertexArrayObjects => &mut self.vertex_array_objects,
            Feature::NpotTextures => &mut self.npot_textures,
            Feature::FloatTextures => &mut self.float_textures,
            Feature::DepthTextures => &mut self.depth_textures,
            Feature::ElementIndexUint => &mut self.element_index_uint,
            Feature::UniformBuffers => &mut self.uniform_buffers,
            Feature::Dxt => &mut self.dxt,
            Feature::Etc1 => &mut self.etc1,
            Feature::Etc2 => &mut self.etc2,
            Feature::Pvrtc => &mut self.pvrtc,
            Feature::Astc => &mut self.astc,
            Feature::MirrorClamp => &mut self.mirror_clamp,
            Feature::AnisotropicFiltering => return None,
        };
        Some(flag)
    }
}
