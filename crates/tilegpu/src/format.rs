//! Pixel format descriptions.
//!
//! This is the format *description* service only: classification, component
//! counts and format-to-format mappings. Actual pixel conversion math lives in
//! the upload/readback paths outside this crate.

/// Hardware pixel formats addressable by the tile buffer and texture units.
///
/// All formats here are uncompressed with a 1x1 block, so bytes-per-pixel is
/// the same as bytes-per-block.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PixelFormat {
    R8Unorm,
    Rg8Unorm,
    Rgba8Unorm,
    Rgba8UnormSrgb,
    Bgra8Unorm,
    Bgra8UnormSrgb,
    Rgba16Float,
    R32Float,
    Rgba32Float,
    Depth24Stencil8,
    Depth32Float,
    Stencil8,
}

impl PixelFormat {
    /// Number of components the format actually stores.
    pub fn component_count(self) -> u32 {
        match self {
            PixelFormat::R8Unorm
            | PixelFormat::R32Float
            | PixelFormat::Depth32Float
            | PixelFormat::Stencil8 => 1,
            PixelFormat::Rg8Unorm | PixelFormat::Depth24Stencil8 => 2,
            PixelFormat::Rgba8Unorm
            | PixelFormat::Rgba8UnormSrgb
            | PixelFormat::Bgra8Unorm
            | PixelFormat::Bgra8UnormSrgb
            | PixelFormat::Rgba16Float
            | PixelFormat::Rgba32Float => 4,
        }
    }

    /// Whether the format stores an alpha channel.
    pub fn has_alpha(self) -> bool {
        matches!(
            self,
            PixelFormat::Rgba8Unorm
                | PixelFormat::Rgba8UnormSrgb
                | PixelFormat::Bgra8Unorm
                | PixelFormat::Bgra8UnormSrgb
                | PixelFormat::Rgba16Float
                | PixelFormat::Rgba32Float
        )
    }

    pub fn is_depth_or_stencil(self) -> bool {
        matches!(
            self,
            PixelFormat::Depth24Stencil8 | PixelFormat::Depth32Float | PixelFormat::Stencil8
        )
    }

    /// Whether the format packs both a depth and a stencil plane.
    pub fn is_depth_and_stencil(self) -> bool {
        matches!(self, PixelFormat::Depth24Stencil8)
    }

    /// The stencil-only format addressing the stencil plane of a packed
    /// depth-stencil format. Formats without a stencil plane map to
    /// themselves.
    pub fn stencil_only(self) -> PixelFormat {
        match self {
            PixelFormat::Depth24Stencil8 | PixelFormat::Stencil8 => PixelFormat::Stencil8,
            other => other,
        }
    }

    /// The linear (non-sRGB) variant of the format.
    pub fn linear(self) -> PixelFormat {
        match self {
            PixelFormat::Rgba8UnormSrgb => PixelFormat::Rgba8Unorm,
            PixelFormat::Bgra8UnormSrgb => PixelFormat::Bgra8Unorm,
            other => other,
        }
    }

    pub fn bytes_per_pixel(self) -> u32 {
        match self {
            PixelFormat::R8Unorm | PixelFormat::Stencil8 => 1,
            PixelFormat::Rg8Unorm => 2,
            PixelFormat::Rgba8Unorm
            | PixelFormat::Rgba8UnormSrgb
            | PixelFormat::Bgra8Unorm
            | PixelFormat::Bgra8UnormSrgb
            | PixelFormat::R32Float
            | PixelFormat::Depth24Stencil8
            | PixelFormat::Depth32Float => 4,
            PixelFormat::Rgba16Float => 8,
            PixelFormat::Rgba32Float => 16,
        }
    }
}
