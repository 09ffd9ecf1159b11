use std::rc::Rc;

use crate::error::GpuError;
use crate::format::PixelFormat;
use crate::resource::{Resource, TextureTarget};
use crate::swizzle::Swizzle;

/// GL-level base format of a texture, as requested by the application.
///
/// The hardware may store more components than the base format promises; the
/// gap is papered over by the derived sampler-view swizzle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BaseFormat {
    Rgba,
    Rgb,
    Rg,
    Red,
    Alpha,
    Luminance,
    LuminanceAlpha,
    Intensity,
    Depth,
    DepthStencil,
    StencilIndex,
    /// Texture object with no image uploaded yet.
    None,
}

/// How a depth or stencil texture presents its single channel to the shader.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DepthMode {
    Luminance,
    Intensity,
    Alpha,
    Red,
}

/// The slice of bound-sampler state the view cache cares about.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SamplerState {
    /// When false, sample the texture through the linear variant of its
    /// format instead of decoding sRGB.
    pub srgb_decode: bool,
}

impl Default for SamplerState {
    fn default() -> Self {
        SamplerState { srgb_decode: true }
    }
}

/// Persistent per-texture state.
///
/// Mutated by the upload and state-change paths outside this crate; the view
/// cache only reads it, apart from the cached [`SamplerView`] slot it owns.
///
/// [`SamplerView`]: crate::sampler_view::SamplerView
#[derive(Clone, Debug)]
pub struct TextureObject {
    /// Backing storage; `None` until the first upload finalizes, or after a
    /// failed allocation.
    pub resource: Option<Rc<Resource>>,
    pub target: TextureTarget,
    pub base_format: BaseFormat,
    /// Base format the first mip image was uploaded with. Drives stencil-only
    /// view narrowing independently of the current `base_format`.
    pub first_image_base_format: BaseFormat,
    pub depth_mode: DepthMode,
    /// Application-requested channel swizzle, applied on top of the
    /// format-derived one.
    pub user_swizzle: Swizzle,
    /// Set for storage-allocated (immutable-format) textures; restricts the
    /// addressable level/layer ranges.
    pub immutable: bool,
    pub base_level: u32,
    /// Highest level sampling may touch, already clamped against the mipmap
    /// completeness rules.
    pub effective_max_level: u32,
    /// First level/layer of the storage window exposed by texture views.
    pub min_level: u32,
    pub min_layer: u32,
    pub num_levels: u32,
    pub num_layers: u32,
    /// Sample the stencil plane of a packed depth-stencil texture.
    pub stencil_sampling: bool,
    /// Byte window into the backing buffer, for buffer textures.
    pub buffer_offset: u32,
    pub buffer_size: u32,
    /// Forced view format for surface-based textures (window-system images
    /// whose storage format differs from the GL-visible one).
    pub surface_format: Option<PixelFormat>,
    /// GL-visible format of the buffer object, for buffer textures.
    pub buffer_object_format: Option<PixelFormat>,

    pub(crate) cached_view: Option<Rc<crate::sampler_view::SamplerView>>,
}

impl TextureObject {
    pub fn new(resource: Rc<Resource>, base_format: BaseFormat) -> TextureObject {
        TextureObject {
            target: resource.target,
            base_format,
            first_image_base_format: base_format,
            depth_mode: DepthMode::Luminance,
            user_swizzle: Swizzle::IDENTITY,
            immutable: false,
            base_level: 0,
            effective_max_level: resource.last_level,
            min_level: 0,
            min_layer: 0,
            num_levels: resource.last_level + 1,
            num_layers: resource.array_size,
            stencil_sampling: false,
            buffer_offset: 0,
            buffer_size: u32::MAX,
            surface_format: None,
            buffer_object_format: None,
            cached_view: None,
            resource: Some(resource),
        }
    }

    /// Makes sure the texture has finalized backing storage.
    ///
    /// Storage allocation itself is owned by the upload path; by the time
    /// state validation runs, a texture without storage means that allocation
    /// failed.
    pub fn finalize(&mut self) -> Result<(), GpuError> {
        if self.resource.is_none() {
            return Err(GpuError::OutOfMemory);
        }
        Ok(())
    }
}
