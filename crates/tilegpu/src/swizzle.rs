use crate::format::PixelFormat;
use crate::texture::{BaseFormat, DepthMode};

/// One output channel of a swizzle: a source channel or a constant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SwizzleComponent {
    X,
    Y,
    Z,
    W,
    Zero,
    One,
}

/// A 4-component channel remapping applied when sampling a texture.
///
/// `self.0[i]` names what the shader sees in output channel `i` (r, g, b, a).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Swizzle(pub [SwizzleComponent; 4]);

use SwizzleComponent::{One, Zero, W, X, Y, Z};

impl Swizzle {
    pub const IDENTITY: Swizzle = Swizzle([X, Y, Z, W]);
    pub const XXXX: Swizzle = Swizzle([X, X, X, X]);

    /// Returns `outer ∘ inner`: each live channel of `outer` is looked up in
    /// `inner`, constants pass through unchanged.
    ///
    /// The user-requested swizzle is the outer transform, the format-derived
    /// swizzle the inner one.
    pub fn compose(outer: Swizzle, inner: Swizzle) -> Swizzle {
        let mut out = [Zero; 4];
        for (i, sel) in outer.0.iter().enumerate() {
            out[i] = match sel {
                X => inner.0[0],
                Y => inner.0[1],
                Z => inner.0[2],
                W => inner.0[3],
                Zero => Zero,
                One => One,
            };
        }
        Swizzle(out)
    }
}

impl Default for Swizzle {
    fn default() -> Self {
        Swizzle::IDENTITY
    }
}

/// Computes the swizzle mapping the hardware format's channels to the values
/// the GL base format promises.
///
/// Consider a texture requested as RGB but stored in an RGBA hardware format:
/// rendering to it may have written alpha values other than 1, so sampling
/// must go through an `(x, y, z, 1)` swizzle to return the expected alpha.
///
/// For depth and stencil textures the depth read mode determines the swizzle
/// instead. The result must still be composed with the user-requested
/// swizzle (see [`Swizzle::compose`]).
///
/// # Panics
///
/// Panics on base-format/depth-mode combinations no valid texture state can
/// produce; those indicate corruption upstream, not a runtime condition.
pub fn format_swizzle(
    base_format: BaseFormat,
    depth_mode: DepthMode,
    actual_format: PixelFormat,
    glsl_version: u32,
) -> Swizzle {
    match base_format {
        BaseFormat::Rgba => Swizzle::IDENTITY,
        BaseFormat::Rgb => {
            if actual_format.has_alpha() {
                Swizzle([X, Y, Z, One])
            } else {
                Swizzle::IDENTITY
            }
        }
        BaseFormat::Rg => {
            if actual_format.component_count() > 2 {
                Swizzle([X, Y, Zero, One])
            } else {
                Swizzle::IDENTITY
            }
        }
        BaseFormat::Red => {
            if actual_format.component_count() > 1 {
                Swizzle([X, Zero, Zero, One])
            } else {
                Swizzle::IDENTITY
            }
        }
        BaseFormat::Alpha => {
            if actual_format.component_count() > 1 {
                Swizzle([Zero, Zero, Zero, W])
            } else {
                Swizzle::IDENTITY
            }
        }
        BaseFormat::Luminance => {
            if actual_format.component_count() > 1 {
                Swizzle([X, X, X, One])
            } else {
                Swizzle::IDENTITY
            }
        }
        BaseFormat::LuminanceAlpha => {
            if actual_format.component_count() > 2 {
                Swizzle([X, X, X, W])
            } else {
                Swizzle::IDENTITY
            }
        }
        BaseFormat::Intensity => {
            if actual_format.component_count() > 1 {
                Swizzle::XXXX
            } else {
                Swizzle::IDENTITY
            }
        }
        BaseFormat::Depth | BaseFormat::DepthStencil | BaseFormat::StencilIndex => {
            match depth_mode {
                DepthMode::Luminance => Swizzle([X, X, X, One]),
                DepthMode::Intensity => Swizzle::XXXX,
                DepthMode::Alpha => {
                    // The texture(sampler*Shadow) built-ins from GLSL 1.30 on
                    // ignore the depth mode and return a scalar, while the
                    // older shadow* functions return a vec4 positioned by the
                    // depth mode. Under the literal ALPHA placement the 1.30
                    // built-ins would read 0 from every live channel, so
                    // treat ALPHA as INTENSITY for shaders at version 130 or
                    // later and keep the literal placement for older ones.
                    // Sampler views must be refreshed when the bound program
                    // changes for this to hold (the state atoms do that).
                    if glsl_version >= 130 {
                        Swizzle::XXXX
                    } else {
                        Swizzle([Zero, Zero, Zero, X])
                    }
                }
                DepthMode::Red => Swizzle([X, Zero, Zero, One]),
            }
        }
        BaseFormat::None => panic!("format swizzle requested for a texture with no base format"),
    }
}
