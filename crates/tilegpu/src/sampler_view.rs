//! Derivation and caching of sampler views.
//!
//! A sampler view is the GPU-side description of how one texture unit reads a
//! texture: resolved format, channel swizzle and the addressable mip/layer (or
//! buffer element) window. Views are derived from texture-object state plus
//! the consuming shader's GLSL version and cached on the texture object; the
//! cache entry is released only when the freshly derived description stops
//! matching it.

use std::rc::Rc;

use tracing::debug;

use crate::context::ContextId;
use crate::format::PixelFormat;
use crate::resource::{Resource, TextureTarget};
use crate::swizzle::{format_swizzle, Swizzle};
use crate::texture::{BaseFormat, TextureObject};

/// Addressable window of a sampler view.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ViewRange {
    Image {
        first_level: u32,
        last_level: u32,
        first_layer: u32,
        last_layer: u32,
    },
    /// Element window of a buffer texture.
    Buffer { first_element: u32, last_element: u32 },
}

/// A derived, shareable texture-sampling descriptor.
///
/// Reference-counted: the cache slot on the owning texture and the in-flight
/// binding tables may hold references concurrently. Dropping the last `Rc`
/// releases the view.
#[derive(Clone, Debug, PartialEq)]
pub struct SamplerView {
    /// Context the view was created for. Views cached by another context are
    /// content-valid but must be re-created before use.
    pub context: ContextId,
    pub resource: Rc<Resource>,
    pub format: PixelFormat,
    pub swizzle: Swizzle,
    pub target: TextureTarget,
    pub range: ViewRange,
}

/// Swizzle the shader should see for `tex`: the format-derived swizzle with
/// the user-requested one composed on top.
fn texture_swizzle(tex: &TextureObject, resource: &Resource, glsl_version: u32) -> Swizzle {
    let computed = if tex.base_format == BaseFormat::None {
        Swizzle::IDENTITY
    } else {
        format_swizzle(tex.base_format, tex.depth_mode, resource.format, glsl_version)
    };
    Swizzle::compose(tex.user_swizzle, computed)
}

fn last_level(tex: &TextureObject, resource: &Resource) -> u32 {
    let mut last = (tex.min_level + tex.effective_max_level).min(resource.last_level);
    if tex.immutable {
        last = last.min(tex.min_level + tex.num_levels - 1);
    }
    last
}

fn last_layer(tex: &TextureObject, resource: &Resource) -> u32 {
    if tex.immutable && resource.array_size > 1 {
        return (tex.min_layer + tex.num_layers - 1).min(resource.array_size - 1);
    }
    resource.array_size - 1
}

/// Computes the window a view of `tex` should address.
///
/// Returns `None` when no usable window exists (buffer offset past the end of
/// the buffer, or an empty element range); the caller then treats the unit as
/// having no view rather than failing.
fn view_range(tex: &TextureObject, resource: &Resource, format: PixelFormat) -> Option<ViewRange> {
    if tex.target == TextureTarget::Buffer {
        let base = tex.buffer_offset;
        if base >= resource.width0 {
            return None;
        }
        let size = (resource.width0 - base).min(tex.buffer_size);
        let bpp = format.bytes_per_pixel();
        let first = base / bpp;
        let n = size / bpp;
        if n == 0 {
            return None;
        }
        return Some(ViewRange::Buffer {
            first_element: first,
            last_element: first + (n - 1),
        });
    }

    let first_level = tex.min_level + tex.base_level;
    let last_level = last_level(tex, resource);
    assert!(
        first_level <= last_level,
        "inverted mip range {first_level}..{last_level}"
    );
    let first_layer = tex.min_layer;
    let last_layer = last_layer(tex, resource);
    assert!(
        first_layer <= last_layer,
        "inverted layer range {first_layer}..{last_layer}"
    );
    Some(ViewRange::Image {
        first_level,
        last_level,
        first_layer,
        last_layer,
    })
}

/// Returns the cached sampler view for `tex`, rebuilding it if any derived
/// attribute changed since it was created.
///
/// `requested_format` is narrowed to the stencil-only format when the texture
/// samples its stencil plane. Returns `None` when the texture has no storage
/// or no addressable window; the caller skips the unit.
pub fn resolve_view(
    context: ContextId,
    tex: &mut TextureObject,
    requested_format: PixelFormat,
    glsl_version: u32,
) -> Option<Rc<SamplerView>> {
    let resource = tex.resource.clone()?;

    let mut format = requested_format;
    if format.is_depth_and_stencil()
        && (tex.stencil_sampling || tex.first_image_base_format == BaseFormat::StencilIndex)
    {
        format = format.stencil_only();
    }

    let swizzle = texture_swizzle(tex, &resource, glsl_version);
    let desired = view_range(tex, &resource, format);

    if let Some(cached) = &tex.cached_view {
        let stale = cached.swizzle != swizzle
            || cached.format != format
            || cached.target != tex.target
            || desired != Some(cached.range);
        if stale {
            debug!(?format, "sampler view out of date, releasing");
            tex.cached_view = None;
        }
    }

    match tex.cached_view.take() {
        None => {
            let view = Rc::new(SamplerView {
                context,
                resource,
                format,
                swizzle,
                target: tex.target,
                range: desired?,
            });
            tex.cached_view = Some(Rc::clone(&view));
            Some(view)
        }
        Some(cached) if cached.context != context => {
            // Content still valid but owned by another context; re-create the
            // view in the calling context using the old one as template.
            let view = Rc::new(SamplerView {
                context,
                ..(*cached).clone()
            });
            tex.cached_view = Some(Rc::clone(&view));
            Some(view)
        }
        Some(cached) => {
            tex.cached_view = Some(Rc::clone(&cached));
            Some(cached)
        }
    }
}
