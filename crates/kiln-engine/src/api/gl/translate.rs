//! Semantic enums to GL enums.

use super::profile::FormatClass;
use crate::api::format::PixelFormat;
use crate::api::types::{BufferKind, BufferUsage, FilterMode, IndexType, PrimitiveMode, ShaderStage, WrapMode};

// Extension enums glow does not expose under these names.
pub const COMPRESSED_RGB_S3TC_DXT1: u32 = 0x83F0;
pub const COMPRESSED_RGBA_S3TC_DXT3: u32 = 0x83F2;
pub const COMPRESSED_RGBA_S3TC_DXT5: u32 = 0x83F3;
pub const ETC1_RGB8_OES: u32 = 0x8D64;
pub const COMPRESSED_RGB8_ETC2: u32 = 0x9274;
pub const COMPRESSED_RGBA8_ETC2_EAC: u32 = 0x9278;
pub const COMPRESSED_RGB_PVRTC_4BPPV1: u32 = 0x8C00;
pub const COMPRESSED_RGBA_PVRTC_4BPPV1: u32 = 0x8C02;
pub const COMPRESSED_RGBA_ASTC_4X4: u32 = 0x93B0;
pub const COMPRESSED_RGBA_ASTC_8X8: u32 = 0x93B7;
pub const MIRROR_CLAMP_TO_EDGE: u32 = 0x8743;
pub const LUMINANCE: u32 = 0x1909;
pub const LUMINANCE_ALPHA: u32 = 0x190A;
pub const LUMINANCE32F_ARB: u32 = 0x8818;
pub const TEXTURE_MAX_ANISOTROPY: u32 = 0x84FE;
pub const MAX_TEXTURE_MAX_ANISOTROPY: u32 = 0x84FF;

/// How to hand a format's bytes to the driver.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Upload {
    Plain {
        internal: u32,
        format: u32,
        ty: u32,
        /// RGBA swizzle applied after upload (gray formats on sized profiles).
        swizzle: Option<[u32; 4]>,
    },
    Compressed {
        internal: u32,
    },
}

pub fn upload_format(class: FormatClass, format: PixelFormat) -> Upload {
    use PixelFormat as F;

    let compressed = |internal| Upload::Compressed { internal };
    let plain = |sized: u32, unsized_: u32, ty: u32| Upload::Plain {
        internal: if class.sized() { sized } else { unsized_ },
        format: unsized_,
        ty,
        swizzle: None,
    };

    match format {
        F::Gray8 | F::GrayAlpha16 if class.sized() => {
            let (internal, fmt, swizzle) = if format == F::Gray8 {
                (glow::R8, glow::RED, [glow::RED, glow::RED, glow::RED, glow::ONE])
            } else {
                (glow::RG8, glow::RG, [glow::RED, glow::RED, glow::RED, glow::GREEN])
            };
            Upload::Plain {
                internal,
                format: fmt,
                ty: glow::UNSIGNED_BYTE,
                swizzle: Some(swizzle),
            }
        }
        F::Gray8 => plain(LUMINANCE, LUMINANCE, glow::UNSIGNED_BYTE),
        F::GrayAlpha16 => plain(LUMINANCE_ALPHA, LUMINANCE_ALPHA, glow::UNSIGNED_BYTE),
        F::R5G6B5 => {
            let sized = if class == FormatClass::Es3 { glow::RGB565 } else { glow::RGB8 };
            plain(sized, glow::RGB, glow::UNSIGNED_SHORT_5_6_5)
        }
        F::R8G8B8 => plain(glow::RGB8, glow::RGB, glow::UNSIGNED_BYTE),
        F::R5G5B5A1 => plain(glow::RGB5_A1, glow::RGBA, glow::UNSIGNED_SHORT_5_5_5_1),
        F::R4G4B4A4 => plain(glow::RGBA4, glow::RGBA, glow::UNSIGNED_SHORT_4_4_4_4),
        F::R8G8B8A8 => plain(glow::RGBA8, glow::RGBA, glow::UNSIGNED_BYTE),
        F::R32F if class.sized() => Upload::Plain {
            internal: glow::R32F,
            format: glow::RED,
            ty: glow::FLOAT,
            swizzle: None,
        },
        // OES_texture_float only accepts unsized internals; desktop GL 2.1
        // needs the ARB float internals or it stores 8-bit texels.
        F::R32F | F::R32G32B32F | F::R32G32B32A32F if class == FormatClass::Es2 => {
            let fmt = match format {
                F::R32F => LUMINANCE,
                F::R32G32B32F => glow::RGB,
                _ => glow::RGBA,
            };
            plain(fmt, fmt, glow::FLOAT)
        }
        F::R32F => Upload::Plain {
            internal: LUMINANCE32F_ARB,
            format: LUMINANCE,
            ty: glow::FLOAT,
            swizzle: None,
        },
        F::R32G32B32F => Upload::Plain {
            internal: glow::RGB32F,
            format: glow::RGB,
            ty: glow::FLOAT,
            swizzle: None,
        },
        F::R32G32B32A32F => Upload::Plain {
            internal: glow::RGBA32F,
            format: glow::RGBA,
            ty: glow::FLOAT,
            swizzle: None,
        },
        F::Dxt1 => compressed(COMPRESSED_RGB_S3TC_DXT1),
        F::Dxt3 => compressed(COMPRESSED_RGBA_S3TC_DXT3),
        F::Dxt5 => compressed(COMPRESSED_RGBA_S3TC_DXT5),
        F::Etc1 => compressed(ETC1_RGB8_OES),
        F::Etc2Rgb8 => compressed(COMPRESSED_RGB8_ETC2),
        F::Etc2Rgba8Eac => compressed(COMPRESSED_RGBA8_ETC2_EAC),
        F::PvrtcRgb4 => compressed(COMPRESSED_RGB_PVRTC_4BPPV1),
        F::PvrtcRgba4 => compressed(COMPRESSED_RGBA_PVRTC_4BPPV1),
        F::Astc4x4 => compressed(COMPRESSED_RGBA_ASTC_4X4),
        F::Astc8x8 => compressed(COMPRESSED_RGBA_ASTC_8X8),
    }
}

/// `(min, mag)` filters.
pub fn filter(filter: FilterMode, mipmapped: bool) -> (u32, u32) {
    match filter {
        FilterMode::Nearest if mipmapped => (glow::NEAREST_MIPMAP_NEAREST, glow::NEAREST),
        FilterMode::Nearest => (glow::NEAREST, glow::NEAREST),
        FilterMode::Linear if mipmapped => (glow::LINEAR_MIPMAP_NEAREST, glow::LINEAR),
        FilterMode::Linear => (glow::LINEAR, glow::LINEAR),
        FilterMode::Trilinear | FilterMode::Anisotropic(_) => (glow::LINEAR_MIPMAP_LINEAR, glow::LINEAR),
    }
}

pub fn wrap(wrap: WrapMode) -> u32 {
    match wrap {
        WrapMode::ClampToEdge => glow::CLAMP_TO_EDGE,
        WrapMode::Repeat => glow::REPEAT,
        WrapMode::MirroredRepeat => glow::MIRRORED_REPEAT,
        WrapMode::MirrorClampToEdge => MIRROR_CLAMP_TO_EDGE,
    }
}

pub fn buffer_target(kind: BufferKind) -> u32 {
    match kind {
        BufferKind::Vertex => glow::ARRAY_BUFFER,
        BufferKind::Index => glow::ELEMENT_ARRAY_BUFFER,
        BufferKind::Uniform => glow::UNIFORM_BUFFER,
    }
}

pub fn buffer_usage(usage: BufferUsage) -> u32 {
    match usage {
        BufferUsage::Static => glow::STATIC_DRAW,
        BufferUsage::Dynamic => glow::DYNAMIC_DRAW,
        BufferUsage::Stream => glow::STREAM_DRAW,
    }
}

pub fn shader_stage(stage: ShaderStage) -> u32 {
    match stage {
        ShaderStage::Vertex => glow::VERTEX_SHADER,
        ShaderStage::Fragment => glow::FRAGMENT_SHADER,
    }
}

pub fn primitive(mode: PrimitiveMode) -> u32 {
    match mode {
        PrimitiveMode::Triangles => glow::TRIANGLES,
        PrimitiveMode::Lines => glow::LINES,
    }
}

pub fn index_type(ty: IndexType) -> u32 {
    match ty {
        IndexType::U16 => glow::UNSIGNED_SHORT,
        IndexType::U32 => glow::UNSIGNED_INT,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gray_uses_red_channels_with_swizzle_on_core() {
        let Upload::Plain { internal, swizzle, .. } = upload_format(FormatClass::DesktopCore, PixelFormat::Gray8) else {
            panic!("gray must be a plain upload");
        };
        assert_eq!(internal, glow::R8);
        assert_eq!(swizzle, Some([glow::RED, glow::RED, glow::RED, glow::ONE]));
    }

    #[test]
    fn gray_is_unsized_luminance_on_es2() {
        assert_eq!(
            upload_format(FormatClass::Es2, PixelFormat::GrayAlpha16),
            Upload::Plain {
                internal: LUMINANCE_ALPHA,
                format: LUMINANCE_ALPHA,
                ty: glow::UNSIGNED_BYTE,
                swizzle: None
            }
        );
    }

    #[test]
    fn es2_uses_unsized_internal_formats() {
        let Upload::Plain { internal, .. } = upload_format(FormatClass::Es2, PixelFormat::R8G8B8A8) else {
            panic!("rgba must be a plain upload");
        };
        assert_eq!(internal, glow::RGBA);
    }

    #[test]
    fn every_compressed_format_maps_to_a_compressed_upload() {
        for f in PixelFormat::ALL.into_iter().filter(|f| f.is_compressed()) {
            assert!(matches!(upload_format(FormatClass::Es3, f), Upload::Compressed { .. }));
        }
    }

    #[test]
    fn float_formats_keep_full_precision_on_gl21() {
        let internal = |f| match upload_format(FormatClass::DesktopLegacy, f) {
            Upload::Plain { internal, ty, .. } => {
                assert_eq!(ty, glow::FLOAT);
                internal
            }
            Upload::Compressed { .. } => panic!("float formats are plain uploads"),
        };
        assert_eq!(internal(PixelFormat::R32F), LUMINANCE32F_ARB);
        assert_eq!(internal(PixelFormat::R32G32B32F), glow::RGB32F);
        assert_eq!(internal(PixelFormat::R32G32B32A32F), glow::RGBA32F);
    }

    #[test]
    fn float_formats_stay_unsized_on_es2() {
        assert_eq!(
            upload_format(FormatClass::Es2, PixelFormat::R32G32B32A32F),
            Upload::Plain {
                internal: glow::RGBA,
                format: glow::RGBA,
                ty: glow::FLOAT,
                swizzle: None
            }
        );
    }

    #[test]
    fn mipmapped_filters() {
        assert_eq!(filter(FilterMode::Linear, false), (glow::LINEAR, glow::LINEAR));
        assert_eq!(filter(FilterMode::Trilinear, true).0, glow::LINEAR_MIPMAP_LINEAR);
    }
}
