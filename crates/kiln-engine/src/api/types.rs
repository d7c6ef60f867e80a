use super::format::PixelFormat;
use super::handle::BufferId;

/// Which native API family a context provides or a device requests.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ApiKind {
    OpenGl,
    OpenGlEs,
    /// Enumerated for completeness; no backend implements it.
    DirectX,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ApiVersion {
    pub major: u8,
    pub minor: u8,
}

impl ApiVersion {
    pub const fn new(major: u8, minor: u8) -> Self {
        Self { major, minor }
    }
}

impl std::fmt::Display for ApiVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

/// API kind and version a device is built for.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ApiRequest {
    pub kind: ApiKind,
    pub version: ApiVersion,
}

impl ApiRequest {
    pub const fn new(kind: ApiKind, major: u8, minor: u8) -> Self {
        Self {
            kind,
            version: ApiVersion::new(major, minor),
        }
    }

    pub const fn opengl(major: u8, minor: u8) -> Self {
        Self::new(ApiKind::OpenGl, major, minor)
    }

    pub const fn gles(major: u8, minor: u8) -> Self {
        Self::new(ApiKind::OpenGlEs, major, minor)
    }
}

impl Default for ApiRequest {
    fn default() -> Self {
        Self::opengl(3, 3)
    }
}

impl std::fmt::Display for ApiRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kind = match self.kind {
            ApiKind::OpenGl => "OpenGL",
            ApiKind::OpenGlEs => "OpenGL ES",
            ApiKind::DirectX => "DirectX",
        };
        write!(f, "{kind} {}", self.version)
    }
}

/// GLSL flavour the backend compiles.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ShaderDialect {
    Glsl120,
    Glsl330,
    GlslEs100,
    GlslEs300,
}

impl ShaderDialect {
    /// The `#version` line sources must start with.
    pub const fn version_directive(self) -> &'static str {
        match self {
            Self::Glsl120 => "#version 120",
            Self::Glsl330 => "#version 330 core",
            Self::GlslEs100 => "#version 100",
            Self::GlslEs300 => "#version 300 es",
        }
    }

    /// Dialects with `in`/`out` qualifiers instead of `attribute`/`varying`.
    pub const fn is_modern(self) -> bool {
        matches!(self, Self::Glsl330 | Self::GlslEs300)
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum FilterMode {
    Nearest,
    Linear,
    /// Linear with linear mip interpolation; requires mipmaps.
    Trilinear,
    /// Trilinear plus the given anisotropy level (clamped to the hardware maximum).
    Anisotropic(u8),
}

impl FilterMode {
    pub const fn uses_mipmaps(self) -> bool {
        matches!(self, Self::Trilinear | Self::Anisotropic(_))
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum WrapMode {
    ClampToEdge,
    Repeat,
    MirroredRepeat,
    MirrorClampToEdge,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct TextureDesc {
    pub width: u32,
    pub height: u32,
    pub format: PixelFormat,
    pub filter: FilterMode,
    pub wrap: WrapMode,
    /// Generate a full mip chain after upload.
    pub mipmaps: bool,
}

impl TextureDesc {
    /// Linear, clamped, no mipmaps.
    pub const fn new(width: u32, height: u32, format: PixelFormat) -> Self {
        Self {
            width,
            height,
            format,
            filter: FilterMode::Linear,
            wrap: WrapMode::ClampToEdge,
            mipmaps: false,
        }
    }

    pub const fn with_filter(mut self, filter: FilterMode) -> Self {
        self.filter = filter;
        self
    }

    pub const fn with_wrap(mut self, wrap: WrapMode) -> Self {
        self.wrap = wrap;
        self
    }

    pub const fn with_mipmaps(mut self, mipmaps: bool) -> Self {
        self.mipmaps = mipmaps;
        self
    }

    pub const fn is_power_of_two(&self) -> bool {
        self.width.is_power_of_two() && self.height.is_power_of_two()
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum BufferKind {
    Vertex,
    Index,
    Uniform,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum BufferUsage {
    Static,
    Dynamic,
    Stream,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum AttributeKind {
    F32,
    U8,
}

impl AttributeKind {
    pub const fn size(self) -> u32 {
        match self {
            Self::F32 => 4,
            Self::U8 => 1,
        }
    }
}

/// One attribute of an interleaved vertex.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct VertexElement {
    pub location: u32,
    pub components: u32,
    pub kind: AttributeKind,
    pub normalized: bool,
    pub offset: u32,
}

/// Everything a backend needs to wire buffers to attribute locations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VertexLayoutDesc {
    pub vertex_buffer: BufferId,
    pub index_buffer: Option<BufferId>,
    pub stride: u32,
    pub elements: Vec<VertexElement>,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PrimitiveMode {
    Triangles,
    Lines,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum IndexType {
    U16,
    U32,
}

impl IndexType {
    pub const fn size(self) -> usize {
        match self {
            Self::U16 => 2,
            Self::U32 => 4,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ClearFlags {
    pub color: bool,
    pub depth: bool,
}

impl ClearFlags {
    pub const ALL: Self = Self {
        color: true,
        depth: true,
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_request_is_gl_33() {
        let req = ApiRequest::default();
        assert_eq!(req.kind, ApiKind::OpenGl);
        assert_eq!(req.version, ApiVersion::new(3, 3));
        assert_eq!(req.to_string(), "OpenGL 3.3");
    }

    #[test]
    fn versions_order_numerically() {
        assert!(ApiVersion::new(3, 0) > ApiVersion::new(2, 1));
        assert!(ApiVersion::new(4, 6) > ApiVersion::new(4, 10 - 9));
    }

    #[test]
    fn texture_desc_power_of_two() {
        assert!(TextureDesc::new(64, 128, PixelFormat::R8G8B8A8).is_power_of_two());
        assert!(!TextureDesc::new(100, 128, PixelFormat::R8G8B8A8).is_power_of_two());
    }

    #[test]
    fn trilinear_and_anisotropic_use_mipmaps() {
        assert!(FilterMode::Trilinear.uses_mipmaps());
        assert!(FilterMode::Anisotropic(4).uses_mipmaps());
        assert!(!FilterMode::Linear.uses_mipmaps());
    }
}
