//! Blit dispatch.
//!
//! Three strategies, tried in order: the hardware tile-copy path, a raw
//! region copy, and a shader-based quad draw through the normal pipeline.
//! Each stage either fully satisfies the request or defers to the next; the
//! final stage always runs, so [`blit`] never fails.

use std::rc::Rc;

use bitflags::bitflags;
use tracing::warn;

use crate::context::{DriverContext, ScissorRect};
use crate::format::PixelFormat;
use crate::resource::{Resource, Surface, TilingMode};

bitflags! {
    /// Channel/plane selection of a blit.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ChannelMask: u8 {
        const R = 1 << 0;
        const G = 1 << 1;
        const B = 1 << 2;
        const A = 1 << 3;
        const DEPTH = 1 << 4;
        const STENCIL = 1 << 5;

        const RGBA = Self::R.bits() | Self::G.bits() | Self::B.bits() | Self::A.bits();
        const ZS = Self::DEPTH.bits() | Self::STENCIL.bits();
    }
}

/// A pixel region within one mip level. Negative dimensions encode flipped
/// copies; those never take a fast path.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Box2D {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FilterMode {
    Nearest,
    Linear,
}

/// One side of a blit: a region of one mip level of a resource.
#[derive(Clone, Debug)]
pub struct BlitTarget {
    pub resource: Rc<Resource>,
    /// View format for the copy; may differ from the resource format (sRGB
    /// reinterpretation).
    pub format: PixelFormat,
    pub level: u32,
    pub region: Box2D,
}

/// Immutable description of one blit. Read-only to the dispatcher except for
/// the local stencil-mask adjustment in [`blit`].
#[derive(Clone, Debug)]
pub struct BlitRequest {
    pub src: BlitTarget,
    pub dst: BlitTarget,
    pub mask: ChannelMask,
    pub filter: FilterMode,
    pub scissor_enable: bool,
    pub scissor: ScissorRect,
}

fn align(value: u32, alignment: u32) -> u32 {
    (value + alignment - 1) & !(alignment - 1)
}

fn is_tile_unaligned(size: i32, tile_size: i32) -> bool {
    size & (tile_size - 1) != 0
}

/// Row stride the tile hardware will assume when reading `resource` at
/// `level` through a destination surface `dst_width` pixels wide.
///
/// The tile loader derives its stride from the render-config width rather
/// than the source slice, so a source whose stored stride differs (POT-padded
/// small mips, for instance) cannot be addressed by the tile path.
fn tile_read_stride(resource: &Resource, level: u32, dst_width: u32) -> u32 {
    let cpp = resource.cpp();
    if resource.nr_samples > 1 {
        align(dst_width, 32) * 4 * cpp
    } else if resource.slice(level).tiling == TilingMode::T {
        align(dst_width * cpp, 128)
    } else {
        align(dst_width * cpp, 16)
    }
}

/// Attempts the hardware tile-copy path. Returns false when any constraint
/// rules it out; the request is then untouched.
fn tile_blit(ctx: &mut DriverContext, info: &BlitRequest) -> bool {
    let old_msaa = ctx.msaa;
    let old_tile_width = ctx.tile_width;
    let old_tile_height = ctx.tile_height;
    let msaa = info.src.resource.nr_samples > 1 || info.dst.resource.nr_samples > 1;
    let tile_width: i32 = if msaa { 32 } else { 64 };
    let tile_height: i32 = if msaa { 32 } else { 64 };

    if info.dst.resource.format.is_depth_or_stencil() {
        return false;
    }

    if info.scissor_enable {
        return false;
    }

    if !info.mask.intersects(ChannelMask::RGBA) {
        return false;
    }

    // The tile buffer loads and stores through the same per-tile address: no
    // scaling, no flipping, no offsetting.
    if info.dst.region.x != info.src.region.x
        || info.dst.region.y != info.src.region.y
        || info.dst.region.width != info.src.region.width
        || info.dst.region.height != info.src.region.height
    {
        return false;
    }

    let dst_surface_width = info.dst.resource.level_width(info.dst.level) as i32;
    let dst_surface_height = info.dst.resource.level_height(info.dst.level) as i32;
    if is_tile_unaligned(info.dst.region.x, tile_width)
        || is_tile_unaligned(info.dst.region.y, tile_height)
        || (is_tile_unaligned(info.dst.region.width, tile_width)
            && info.dst.region.x + info.dst.region.width != dst_surface_width)
        || (is_tile_unaligned(info.dst.region.height, tile_height)
            && info.dst.region.y + info.dst.region.height != dst_surface_height)
    {
        return false;
    }

    // The tile loader computes the source stride from the destination
    // surface's width; reject sources stored with any other stride.
    let stride = tile_read_stride(&info.src.resource, info.src.level, dst_surface_width as u32);
    if stride != info.src.resource.slice(info.src.level).stride {
        return false;
    }

    if info.dst.resource.format != info.src.resource.format {
        return false;
    }

    ctx.jobs.flush();

    let dst_surf = Surface::for_level(&info.dst.resource, info.dst.level);
    let src_surf = Surface::for_level(&info.src.resource, info.src.level);
    let dst_msaa = dst_surf.resource.nr_samples > 1;

    ctx.color_read = Some(src_surf);
    ctx.color_write = if dst_msaa { None } else { Some(Rc::clone(&dst_surf)) };
    ctx.msaa_color_write = if dst_msaa { Some(Rc::clone(&dst_surf)) } else { None };
    ctx.zs_read = None;
    ctx.zs_write = None;
    ctx.msaa_zs_write = None;

    ctx.draw_min_x = info.dst.region.x as u32;
    ctx.draw_min_y = info.dst.region.y as u32;
    ctx.draw_max_x = (info.dst.region.x + info.dst.region.width) as u32;
    ctx.draw_max_y = (info.dst.region.y + info.dst.region.height) as u32;
    ctx.draw_width = dst_surf.width;
    ctx.draw_height = dst_surf.height;

    ctx.tile_width = tile_width as u32;
    ctx.tile_height = tile_height as u32;
    ctx.msaa = msaa;

    let frame = ctx.frame_snapshot();
    ctx.jobs.submit(&frame);

    ctx.msaa = old_msaa;
    ctx.tile_width = old_tile_width;
    ctx.tile_height = old_tile_height;

    true
}

/// Blits by drawing a textured quad through the normal pipeline.
///
/// Saves the full graphics state for the fallback blitter first; restoring it
/// is the blitter's job. An unsupported format pair drops the copy with a
/// diagnostic.
fn render_blit(ctx: &mut DriverContext, info: &BlitRequest) -> bool {
    if !ctx.blitter.is_blit_supported(info) {
        warn!(
            src = ?info.src.resource.format,
            dst = ?info.dst.resource.format,
            "blit unsupported"
        );
        return false;
    }

    let saved = ctx.snapshot_graphics_state();
    ctx.blitter.blit(&saved, info);
    true
}

/// Copies pixels between two surface regions. Never fails: requests the tile
/// hardware cannot satisfy fall back to a region copy, then to a quad draw.
/// Scaling, format conversion and sample-count resolves are allowed (and go
/// through the fallback paths).
pub fn blit(ctx: &mut DriverContext, request: &BlitRequest) {
    if tile_blit(ctx, request) {
        return;
    }

    if ctx.copy.try_copy_region(request) {
        return;
    }

    let mut info = request.clone();
    if info.mask.contains(ChannelMask::STENCIL) {
        // No path below can write the stencil plane.
        warn!("cannot blit stencil, skipping");
        info.mask.remove(ChannelMask::STENCIL);
    }

    render_blit(ctx, &info);
}
