use std::rc::Rc;

use crate::format::PixelFormat;

/// Storage layout of one mip slice.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TilingMode {
    /// Raster order, row by row.
    Linear,
    /// 4KB macro-tiles ("T" format), used for scanout-sized levels.
    T,
    /// Micro-tile-only layout used for small mip levels.
    Lt,
}

/// Per-mip-level layout of a [`Resource`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SliceLayout {
    pub offset: u32,
    pub stride: u32,
    pub tiling: TilingMode,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TextureTarget {
    Tex1D,
    Tex2D,
    Tex3D,
    Tex2DArray,
    Cube,
    /// 1D texture backed by a buffer resource; sampled by element index.
    Buffer,
}

/// A GPU-resident image (or buffer) resource.
///
/// `width0`/`height0` are the level-0 dimensions; per-level dimensions come
/// from [`Resource::level_width`]/[`Resource::level_height`]. For buffer
/// resources `width0` is the size in bytes.
#[derive(Clone, Debug, PartialEq)]
pub struct Resource {
    pub format: PixelFormat,
    pub target: TextureTarget,
    pub width0: u32,
    pub height0: u32,
    pub last_level: u32,
    pub array_size: u32,
    pub nr_samples: u32,
    pub slices: Vec<SliceLayout>,
}

fn minify(dim: u32, level: u32) -> u32 {
    (dim >> level).max(1)
}

impl Resource {
    pub fn level_width(&self, level: u32) -> u32 {
        minify(self.width0, level)
    }

    pub fn level_height(&self, level: u32) -> u32 {
        minify(self.height0, level)
    }

    pub fn cpp(&self) -> u32 {
        self.format.bytes_per_pixel()
    }

    /// Layout of one mip slice.
    ///
    /// # Panics
    ///
    /// Panics if `level` exceeds `last_level`; levels are laid out at
    /// allocation time, so a missing slice means corrupted resource state.
    pub fn slice(&self, level: u32) -> &SliceLayout {
        assert!(level <= self.last_level, "mip level {level} was never laid out");
        &self.slices[level as usize]
    }
}

/// A view of one mip level of a resource, usable as a render-target or
/// tile-buffer attachment.
///
/// Surfaces are created on demand and shared by reference count; dropping the
/// last `Rc` releases the view. The underlying resource outlives every
/// surface viewing it.
#[derive(Clone, Debug, PartialEq)]
pub struct Surface {
    pub resource: Rc<Resource>,
    pub format: PixelFormat,
    pub level: u32,
    pub first_layer: u32,
    pub last_layer: u32,
    pub width: u32,
    pub height: u32,
}

impl Surface {
    /// Creates a surface covering layer 0 of `level`, in the resource's own
    /// format.
    pub fn for_level(resource: &Rc<Resource>, level: u32) -> Rc<Surface> {
        Rc::new(Surface {
            resource: Rc::clone(resource),
            format: resource.format,
            level,
            first_layer: 0,
            last_layer: 0,
            width: resource.level_width(level),
            height: resource.level_height(level),
        })
    }
}
