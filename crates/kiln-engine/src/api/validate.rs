//! Request validation shared by every backend.
//!
//! Runs before any native call so a rejected request leaves no trace on the
//! driver and can be retried with identical results.

use super::features::{Feature, FeatureFlags};
use super::format::PixelFormat;
use super::types::{BufferKind, FilterMode, TextureDesc, WrapMode};
use crate::error::RenderError;

const TEXTURE: &str = "texture";
const RENDER_TARGET: &str = "render target";
const BUFFER: &str = "buffer";

pub fn validate_texture(
    features: &FeatureFlags,
    max_size: u32,
    desc: &TextureDesc,
    pixels: Option<&[u8]>,
) -> Result<(), RenderError> {
    if desc.width == 0 || desc.height == 0 {
        return Err(RenderError::InvalidArgument(format!(
            "texture size {}x{} is empty",
            desc.width, desc.height
        )));
    }
    if desc.width > max_size || desc.height > max_size {
        return Err(RenderError::InvalidArgument(format!(
            "texture size {}x{} exceeds the maximum of {max_size}",
            desc.width, desc.height
        )));
    }

    if let Some(feature) = desc.format.required_feature() {
        features.require(TEXTURE, feature)?;
    }
    validate_sampling(features, desc)?;

    if desc.format.is_compressed() {
        if desc.mipmaps {
            return Err(RenderError::InvalidArgument(format!(
                "{:?}: mipmaps cannot be generated for compressed formats",
                desc.format
            )));
        }
        if pixels.is_none() {
            return Err(RenderError::InvalidArgument(format!(
                "{:?}: compressed textures need initial data",
                desc.format
            )));
        }
    }

    if let Some(data) = pixels {
        let expected = desc.format.data_size(desc.width, desc.height);
        if data.len() != expected {
            return Err(RenderError::InvalidArgument(format!(
                "{:?} {}x{} needs {expected} bytes, got {}",
                desc.format,
                desc.width,
                desc.height,
                data.len()
            )));
        }
    }

    Ok(())
}

/// Wrap, filter and the NPOT restrictions for a texture's current sampling state.
pub fn validate_sampling(features: &FeatureFlags, desc: &TextureDesc) -> Result<(), RenderError> {
    validate_wrap(features, desc.wrap)?;
    validate_filter(features, desc.filter)?;

    let mipmapped = desc.mipmaps || desc.filter.uses_mipmaps();
    if !features.npot_textures && !desc.is_power_of_two() && (mipmapped || desc.wrap != WrapMode::ClampToEdge) {
        return Err(RenderError::unsupported(TEXTURE, Feature::NpotTextures.name()));
    }
    if desc.format.is_compressed() && desc.filter.uses_mipmaps() {
        return Err(RenderError::InvalidArgument(format!(
            "{:?}: mipmapped filtering needs generated mipmaps",
            desc.format
        )));
    }
    Ok(())
}

pub fn validate_wrap(features: &FeatureFlags, wrap: WrapMode) -> Result<(), RenderError> {
    match wrap {
        WrapMode::MirrorClampToEdge => features.require(TEXTURE, Feature::MirrorClamp),
        _ => Ok(()),
    }
}

pub fn validate_filter(features: &FeatureFlags, filter: FilterMode) -> Result<(), RenderError> {
    match filter {
        FilterMode::Anisotropic(_) => features.require(TEXTURE, Feature::AnisotropicFiltering),
        _ => Ok(()),
    }
}

pub fn validate_render_target(
    features: &FeatureFlags,
    max_size: u32,
    width: u32,
    height: u32,
    format: PixelFormat,
) -> Result<(), RenderError> {
    if width == 0 || height == 0 || width > max_size || height > max_size {
        return Err(RenderError::InvalidArgument(format!(
            "render target size {width}x{height} outside 1..={max_size}"
        )));
    }
    if !format.is_renderable() {
        return Err(RenderError::InvalidArgument(format!(
            "{format:?} cannot back a render target"
        )));
    }
    if let Some(feature) = format.required_feature() {
        features.require(RENDER_TARGET, feature)?;
    }
    if !features.npot_textures && !(width.is_power_of_two() && height.is_power_of_two()) {
        return Err(RenderError::unsupported(RENDER_TARGET, Feature::NpotTextures.name()));
    }
    Ok(())
}

pub fn validate_buffer(features: &FeatureFlags, kind: BufferKind) -> Result<(), RenderError> {
    match kind {
        BufferKind::Uniform => features.require(BUFFER, Feature::UniformBuffers),
        BufferKind::Vertex | BufferKind::Index => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const MAX: u32 = 4096;

    fn rgba(w: u32, h: u32) -> TextureDesc {
        TextureDesc::new(w, h, PixelFormat::R8G8B8A8)
    }

    #[rstest]
    #[case(PixelFormat::Dxt1, "DXT compression")]
    #[case(PixelFormat::Etc1, "ETC1 compression")]
    #[case(PixelFormat::Etc2Rgba8Eac, "ETC2/EAC compression")]
    #[case(PixelFormat::PvrtcRgb4, "PVRTC compression")]
    #[case(PixelFormat::Astc8x8, "ASTC compression")]
    #[case(PixelFormat::R32G32B32A32F, "float textures")]
    fn gated_formats_rejected_without_feature(#[case] format: PixelFormat, #[case] name: &str) {
        let desc = TextureDesc::new(8, 8, format);
        let data = vec![0u8; format.data_size(8, 8)];
        let err = validate_texture(&FeatureFlags::none(), MAX, &desc, Some(&data)).unwrap_err();
        assert_eq!(err.to_string(), format!("texture: unsupported feature `{name}`"));
    }

    #[test]
    fn gated_format_accepted_with_feature() {
        let desc = TextureDesc::new(8, 8, PixelFormat::Dxt5);
        let data = vec![0u8; 64];
        let flags = FeatureFlags::none().with(Feature::Dxt, true);
        assert!(validate_texture(&flags, MAX, &desc, Some(&data)).is_ok());
    }

    #[test]
    fn npot_repeat_needs_feature_but_npot_clamp_does_not() {
        let flags = FeatureFlags::none();
        assert!(validate_texture(&flags, MAX, &rgba(100, 60), None).is_ok());

        let repeat = rgba(100, 60).with_wrap(WrapMode::Repeat);
        assert!(matches!(
            validate_texture(&flags, MAX, &repeat, None),
            Err(RenderError::UnsupportedFeature { .. })
        ));

        let mips = rgba(100, 60).with_mipmaps(true);
        assert!(validate_texture(&flags, MAX, &mips, None).is_err());
        let npot = flags.with(Feature::NpotTextures, true);
        assert!(validate_texture(&npot, MAX, &mips, None).is_ok());
    }

    #[test]
    fn mirror_clamp_and_anisotropy_are_gated() {
        let flags = FeatureFlags::none();
        let mirror = rgba(16, 16).with_wrap(WrapMode::MirrorClampToEdge);
        assert!(validate_texture(&flags, MAX, &mirror, None).is_err());
        let aniso = rgba(16, 16).with_filter(FilterMode::Anisotropic(8));
        assert!(validate_texture(&flags, MAX, &aniso, None).is_err());
        assert!(validate_texture(&FeatureFlags::all(), MAX, &aniso, None).is_ok());
    }

    #[test]
    fn pixel_length_must_match_format() {
        let err = validate_texture(&FeatureFlags::all(), MAX, &rgba(2, 2), Some(&[0u8; 15])).unwrap_err();
        assert!(matches!(err, RenderError::InvalidArgument(_)));
    }

    #[test]
    fn compressed_rules() {
        let flags = FeatureFlags::all();
        let desc = TextureDesc::new(4, 4, PixelFormat::Dxt1);
        assert!(validate_texture(&flags, MAX, &desc, None).is_err());
        assert!(validate_texture(&flags, MAX, &desc.with_mipmaps(true), Some(&[0u8; 8])).is_err());
        assert!(validate_texture(&flags, MAX, &desc, Some(&[0u8; 8])).is_ok());
    }

    #[test]
    fn size_limits() {
        let flags = FeatureFlags::all();
        assert!(validate_texture(&flags, MAX, &rgba(0, 4), None).is_err());
        assert!(validate_texture(&flags, MAX, &rgba(MAX + 1, 4), None).is_err());
    }

    #[test]
    fn render_target_formats() {
        let flags = FeatureFlags::all();
        assert!(validate_render_target(&flags, MAX, 64, 64, PixelFormat::R8G8B8A8).is_ok());
        assert!(validate_render_target(&flags, MAX, 64, 64, PixelFormat::Dxt1).is_err());
        assert!(validate_render_target(&FeatureFlags::none(), MAX, 64, 64, PixelFormat::R32F).is_err());
        assert!(validate_render_target(&FeatureFlags::none(), MAX, 100, 64, PixelFormat::R8G8B8A8).is_err());
    }

    #[test]
    fn uniform_buffers_are_gated() {
        assert!(validate_buffer(&FeatureFlags::none(), BufferKind::Vertex).is_ok());
        assert!(validate_buffer(&FeatureFlags::none(), BufferKind::Uniform).is_err());
    }
}
