use super::features::Feature;

/// Semantic pixel format of texture data and render target color attachments.
///
/// Byte layouts are what the caller uploads; backends translate to native
/// internal formats and reject formats whose gating [`Feature`] is missing.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum PixelFormat {
    Gray8,
    GrayAlpha16,
    R5G6B5,
    R8G8B8,
    R5G5B5A1,
    R4G4B4A4,
    R8G8B8A8,
    R32F,
    R32G32B32F,
    R32G32B32A32F,
    Dxt1,
    Dxt3,
    Dxt5,
    Etc1,
    Etc2Rgb8,
    Etc2Rgba8Eac,
    PvrtcRgb4,
    PvrtcRgba4,
    Astc4x4,
    Astc8x8,
}

/// Block geometry of a compressed format.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct BlockInfo {
    pub width: u32,
    pub height: u32,
    pub bytes: u32,
}

impl PixelFormat {
    pub const ALL: [PixelFormat; 20] = [
        PixelFormat::Gray8,
        PixelFormat::GrayAlpha16,
        PixelFormat::R5G6B5,
        PixelFormat::R8G8B8,
        PixelFormat::R5G5B5A1,
        PixelFormat::R4G4B4A4,
        PixelFormat::R8G8B8A8,
        PixelFormat::R32F,
        PixelFormat::R32G32B32F,
        PixelFormat::R32G32B32A32F,
        PixelFormat::Dxt1,
        PixelFormat::Dxt3,
        PixelFormat::Dxt5,
        PixelFormat::Etc1,
        PixelFormat::Etc2Rgb8,
        PixelFormat::Etc2Rgba8Eac,
        PixelFormat::PvrtcRgb4,
        PixelFormat::PvrtcRgba4,
        PixelFormat::Astc4x4,
        PixelFormat::Astc8x8,
    ];

    /// Bytes per pixel for uncompressed formats, `None` for block formats.
    pub const fn bytes_per_pixel(self) -> Option<u32> {
        match self {
            Self::Gray8 => Some(1),
            Self::GrayAlpha16 | Self::R5G6B5 | Self::R5G5B5A1 | Self::R4G4B4A4 => Some(2),
            Self::R8G8B8 => Some(3),
            Self::R8G8B8A8 | Self::R32F => Some(4),
            Self::R32G32B32F => Some(12),
            Self::R32G32B32A32F => Some(16),
            _ => None,
        }
    }

    /// Block geometry for compressed formats. PVRTC reports its 4x4 footprint;
    /// its minimum-size rule is applied in [`data_size`](Self::data_size).
    pub const fn block(self) -> Option<BlockInfo> {
        let (width, height, bytes) = match self {
            Self::Dxt1 | Self::Etc1 | Self::Etc2Rgb8 | Self::PvrtcRgb4 | Self::PvrtcRgba4 => (4, 4, 8),
            Self::Dxt3 | Self::Dxt5 | Self::Etc2Rgba8Eac | Self::Astc4x4 => (4, 4, 16),
            Self::Astc8x8 => (8, 8, 16),
            _ => return None,
        };
        Some(BlockInfo { width, height, bytes })
    }

    #[inline]
    pub const fn is_compressed(self) -> bool {
        self.block().is_some()
    }

    #[inline]
    pub const fn is_float(self) -> bool {
        matches!(self, Self::R32F | Self::R32G32B32F | Self::R32G32B32A32F)
    }

    /// Exact byte size of one mip level of `width x height`.
    pub fn data_size(self, width: u32, height: u32) -> usize {
        if let Some(bpp) = self.bytes_per_pixel() {
            return width as usize * height as usize * bpp as usize;
        }

        match self {
            // 4 bits per pixel with an 8x8 minimum footprint.
            Self::PvrtcRgb4 | Self::PvrtcRgba4 => {
                (width.max(8) as usize * height.max(8) as usize * 4).div_ceil(8)
            }
            _ => match self.block() {
                Some(b) => {
                    let bx = width.div_ceil(b.width) as usize;
                    let by = height.div_ceil(b.height) as usize;
                    bx * by * b.bytes as usize
                }
                None => 0,
            },
        }
    }

    /// Hardware feature gating this format, if any.
    pub const fn required_feature(self) -> Option<Feature> {
        match self {
            Self::R32F | Self::R32G32B32F | Self::R32G32B32A32F => Some(Feature::FloatTextures),
            Self::Dxt1 | Self::Dxt3 | Self::Dxt5 => Some(Feature::Dxt),
            Self::Etc1 => Some(Feature::Etc1),
            Self::Etc2Rgb8 | Self::Etc2Rgba8Eac => Some(Feature::Etc2),
            Self::PvrtcRgb4 | Self::PvrtcRgba4 => Some(Feature::Pvrtc),
            Self::Astc4x4 | Self::Astc8x8 => Some(Feature::Astc),
            _ => None,
        }
    }

    /// Whether the format can back a render target color attachment.
    #[inline]
    pub const fn is_renderable(self) -> bool {
        !self.is_compressed() && !matches!(self, Self::Gray8 | Self::GrayAlpha16)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(PixelFormat::Gray8, 4, 4, 16)]
    #[case(PixelFormat::R8G8B8, 3, 3, 27)]
    #[case(PixelFormat::R8G8B8A8, 2, 5, 40)]
    #[case(PixelFormat::R32G32B32A32F, 2, 2, 64)]
    #[case(PixelFormat::Dxt1, 4, 4, 8)]
    #[case(PixelFormat::Dxt1, 5, 5, 32)]
    #[case(PixelFormat::Dxt5, 8, 8, 64)]
    #[case(PixelFormat::Etc2Rgba8Eac, 4, 8, 32)]
    #[case(PixelFormat::Astc8x8, 16, 9, 64)]
    #[case(PixelFormat::PvrtcRgba4, 4, 4, 32)]
    #[case(PixelFormat::PvrtcRgb4, 16, 16, 128)]
    fn data_size_matches_format_geometry(
        #[case] format: PixelFormat,
        #[case] w: u32,
        #[case] h: u32,
        #[case] expected: usize,
    ) {
        assert_eq!(format.data_size(w, h), expected);
    }

    #[test]
    fn every_compressed_format_is_feature_gated() {
        for f in PixelFormat::ALL {
            if f.is_compressed() || f.is_float() {
                assert!(f.required_feature().is_some(), "{f:?} must be gated");
            }
        }
    }

    #[test]
    fn plain_formats_need_no_feature() {
        assert_eq!(PixelFormat::R8G8B8A8.required_feature(), None);
        assert_eq!(PixelFormat::Gray8.required_feature(), None);
    }

    #[test]
    fn gray_and_compressed_formats_are_not_renderable() {
        assert!(PixelFormat::R8G8B8A8.is_renderable());
        assert!(!PixelFormat::Gray8.is_renderable());
        assert!(!PixelFormat::Etc1.is_renderable());
    }
}
