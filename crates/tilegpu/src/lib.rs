//! `tilegpu` is the state-tracking core of a tile-based GPU driver.
//!
//! Currently this crate provides:
//! - A three-stage blit dispatcher that prefers a hardware tile-copy path and
//!   degrades to a raw region copy or a shader-based fallback (see [`blit`]).
//! - Derivation and caching of per-texture-unit sampler views, kept coherent
//!   across texture, sampler and per-stage program changes (see
//!   [`sampler_view`] and [`atoms`]).
//!
//! Command encoding, shader compilation and window-system integration live in
//! the surrounding driver; this crate talks to them through the collaborator
//! traits on [`DriverContext`].

mod error;
mod swizzle;

pub mod atoms;
pub mod blit;
pub mod context;
pub mod format;
pub mod resource;
pub mod sampler_view;
pub mod texture;

pub use blit::{BlitRequest, BlitTarget, Box2D, ChannelMask};
pub use context::{
    ContextId, DirtyState, DriverContext, FrameSnapshot, GraphicsState, Program, ShaderStage,
    MAX_SAMPLER_UNITS,
};
pub use error::GpuError;
pub use format::PixelFormat;
pub use resource::{Resource, Surface, TextureTarget, TilingMode};
pub use sampler_view::SamplerView;
pub use swizzle::{Swizzle, SwizzleComponent};
pub use texture::{BaseFormat, DepthMode, SamplerState, TextureObject};
