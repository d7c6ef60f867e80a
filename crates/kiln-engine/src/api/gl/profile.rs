//! Per-(kind, version) capability table for the GL family.
//!
//! Every profile-dependent decision the backend makes is read from a
//! [`GlProfile`] row instead of being branched on inline.

use crate::api::features::FeatureFlags;
use crate::api::types::{ApiKind, ApiRequest, ApiVersion, ShaderDialect};
use crate::error::RenderError;

/// How the driver's extension list is read.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ExtensionQuery {
    /// `GL_NUM_EXTENSIONS` + `glGetStringi` (GL 3.0+, GLES 3.0+).
    Indexed,
    /// One space-delimited `GL_EXTENSIONS` string.
    Legacy,
}

/// Which internal-format table texture uploads use.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum FormatClass {
    /// GL 2.1: unsized formats apart from ARB float internals, no swizzle.
    DesktopLegacy,
    /// GL 3.3+: sized formats, gray via `R8`/`RG8` and swizzles.
    DesktopCore,
    /// GLES 2.0: unsized formats only.
    Es2,
    /// GLES 3.x: sized formats with swizzles.
    Es3,
}

impl FormatClass {
    pub const fn sized(self) -> bool {
        matches!(self, Self::DesktopCore | Self::Es3)
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct GlProfile {
    pub kind: ApiKind,
    pub version: ApiVersion,
    pub extension_query: ExtensionQuery,
    pub dialect: ShaderDialect,
    pub format_class: FormatClass,
    /// Features the core version guarantees regardless of extensions.
    pub core_features: FeatureFlags,
}

impl GlProfile {
    pub fn lookup(request: ApiRequest) -> Result<Self, RenderError> {
        let row = match request.kind {
            ApiKind::OpenGl => desktop(request.version),
            ApiKind::OpenGlEs => embedded(request.version),
            ApiKind::DirectX => None,
        };
        row.ok_or_else(|| RenderError::UnsupportedApi(format!("{request} is not available in this build")))
    }

    pub fn request(&self) -> ApiRequest {
        ApiRequest {
            kind: self.kind,
            version: self.version,
        }
    }
}

const DESKTOP_VERSIONS: [(u8, u8); 9] = [(2, 1), (3, 3), (4, 0), (4, 1), (4, 2), (4, 3), (4, 4), (4, 5), (4, 6)];
const EMBEDDED_VERSIONS: [(u8, u8); 4] = [(2, 0), (3, 0), (3, 1), (3, 2)];

#[cfg(feature = "opengl")]
fn desktop(version: ApiVersion) -> Option<GlProfile> {
    let known = DESKTOP_VERSIONS
        .iter()
        .any(|&(major, minor)| ApiVersion::new(major, minor) == version);
    if !known {
        return None;
    }

    let legacy = version.major < 3;
    Some(GlProfile {
        kind: ApiKind::OpenGl,
        version,
        extension_query: if legacy { ExtensionQuery::Legacy } else { ExtensionQuery::Indexed },
        dialect: if legacy { ShaderDialect::Glsl120 } else { ShaderDialect::Glsl330 },
        format_class: if legacy { FormatClass::DesktopLegacy } else { FormatClass::DesktopCore },
        core_features: desktop_core_features(version),
    })
}

#[cfg(not(feature = "opengl"))]
fn desktop(_version: ApiVersion) -> Option<GlProfile> {
    None
}

#[cfg(feature = "gles")]
fn embedded(version: ApiVersion) -> Option<GlProfile> {
    let known = EMBEDDED_VERSIONS
        .iter()
        .any(|&(major, minor)| ApiVersion::new(major, minor) == version);
    if !known {
        return None;
    }

    let legacy = version.major < 3;
    Some(GlProfile {
        kind: ApiKind::OpenGlEs,
        version,
        extension_query: if legacy { ExtensionQuery::Legacy } else { ExtensionQuery::Indexed },
        dialect: if legacy { ShaderDialect::GlslEs100 } else { ShaderDialect::GlslEs300 },
        format_class: if legacy { FormatClass::Es2 } else { FormatClass::Es3 },
        core_features: embedded_core_features(version),
    })
}

#[cfg(not(feature = "gles"))]
fn embedded(_version: ApiVersion) -> Option<GlProfile> {
    None
}

fn desktop_core_features(version: ApiVersion) -> FeatureFlags {
    let at_least = |major, minor| version >= ApiVersion::new(major, minor);
    let mut f = FeatureFlags::none();

    // GL 2.0 made NPOT core; 2.1 also has depth textures and uint indices.
    f.npot_textures = true;
    f.depth_textures = true;
    f.element_index_uint = true;

    f.vertex_array_objects = at_least(3, 0);
    f.float_textures = at_least(3, 0);
    f.uniform_buffers = at_least(3, 1);
    f.etc2 = at_least(4, 3);
    f.mirror_clamp = at_least(4, 4);
    f
}

fn embedded_core_features(version: ApiVersion) -> FeatureFlags {
    let mut f = FeatureFlags::none();
    if version.major >= 3 {
        f.vertex_array_objects = true;
        f.npot_textures = true;
        f.float_textures = true;
        f.depth_textures = true;
        f.element_index_uint = true;
        f.uniform_buffers = true;
        f.etc2 = true;
    }
    f.astc = version >= ApiVersion::new(3, 2);
    f
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(ApiRequest::opengl(2, 1), ExtensionQuery::Legacy, ShaderDialect::Glsl120)]
    #[case(ApiRequest::opengl(3, 3), ExtensionQuery::Indexed, ShaderDialect::Glsl330)]
    #[case(ApiRequest::opengl(4, 6), ExtensionQuery::Indexed, ShaderDialect::Glsl330)]
    #[case(ApiRequest::gles(2, 0), ExtensionQuery::Legacy, ShaderDialect::GlslEs100)]
    #[case(ApiRequest::gles(3, 2), ExtensionQuery::Indexed, ShaderDialect::GlslEs300)]
    fn rows_pick_query_style_and_dialect(
        #[case] request: ApiRequest,
        #[case] query: ExtensionQuery,
        #[case] dialect: ShaderDialect,
    ) {
        let profile = GlProfile::lookup(request).unwrap();
        assert_eq!(profile.extension_query, query);
        assert_eq!(profile.dialect, dialect);
        assert_eq!(profile.request(), request);
    }

    #[rstest]
    #[case(ApiRequest::new(ApiKind::DirectX, 11, 0))]
    #[case(ApiRequest::opengl(3, 0))]
    #[case(ApiRequest::opengl(5, 0))]
    #[case(ApiRequest::gles(1, 1))]
    fn unknown_rows_are_unsupported(#[case] request: ApiRequest) {
        assert!(matches!(
            GlProfile::lookup(request),
            Err(RenderError::UnsupportedApi(_))
        ));
    }

    #[test]
    fn core_versions_imply_features() {
        let gl21 = GlProfile::lookup(ApiRequest::opengl(2, 1)).unwrap().core_features;
        assert!(gl21.npot_textures && !gl21.vertex_array_objects && !gl21.float_textures);

        let gl44 = GlProfile::lookup(ApiRequest::opengl(4, 4)).unwrap().core_features;
        assert!(gl44.vertex_array_objects && gl44.uniform_buffers && gl44.etc2 && gl44.mirror_clamp);
        assert!(!gl44.dxt);

        let es2 = GlProfile::lookup(ApiRequest::gles(2, 0)).unwrap().core_features;
        assert_eq!(es2, FeatureFlags::none());

        let es30 = GlProfile::lookup(ApiRequest::gles(3, 0)).unwrap().core_features;
        assert!(es30.etc2 && !es30.astc);
        let es32 = GlProfile::lookup(ApiRequest::gles(3, 2)).unwrap().core_features;
        assert!(es32.astc);
    }
}
