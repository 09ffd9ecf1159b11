//! Declarative state validation.
//!
//! Each piece of derived GPU state is owned by one atom: a named update
//! function plus the set of dirty bits that trigger it. [`validate_state`]
//! walks the table once per draw, runs the triggered atoms and clears the
//! bits they consumed. The only atoms in this crate are the six per-stage
//! sampler-view refreshes, all thin wrappers over one parameterized routine.

use std::rc::Rc;

use tracing::warn;

use crate::context::{DirtyState, DriverContext, ShaderStage, MAX_SAMPLER_UNITS};
use crate::error::GpuError;
use crate::resource::TextureTarget;
use crate::sampler_view::{resolve_view, SamplerView};

/// Resolves the sampler view for one texture unit.
///
/// `Err` means the texture could not be finalized (resource exhaustion); the
/// caller skips the unit without touching its slot. `Ok(None)` means the unit
/// legitimately has no view (bad buffer window) and its slot is cleared.
fn update_single_texture(
    ctx: &mut DriverContext,
    tex_unit: usize,
    glsl_version: u32,
) -> Result<Option<Rc<SamplerView>>, GpuError> {
    let (tex_id, samp) = ctx.resolve_texture_binding(tex_unit);
    let ctx_id = ctx.id;
    let Some(tex) = ctx.textures.get_mut(&tex_id) else {
        panic!("texture unit {tex_unit} bound to unregistered texture {tex_id}");
    };

    tex.finalize()?;
    let resource_format = match &tex.resource {
        Some(resource) => resource.format,
        None => unreachable!("finalized texture has storage"),
    };

    let view_format = if tex.target == TextureTarget::Buffer {
        tex.buffer_object_format.unwrap_or(resource_format)
    } else {
        let format = tex.surface_format.unwrap_or(resource_format);
        if samp.srgb_decode {
            format
        } else {
            // sRGB decode disabled: sample through the linear variant.
            format.linear()
        }
    };

    Ok(resolve_view(ctx_id, tex, view_format, glsl_version))
}

/// Refreshes the sampler-view array of one shader stage and pushes it to the
/// binding sink.
///
/// Only units the stage's program declares used get views; trailing slots
/// beyond the highest used unit are cleared if they were populated before and
/// left alone otherwise. No used units and nothing previously populated is a
/// no-op.
pub fn update_stage_textures(ctx: &mut DriverContext, stage: ShaderStage) {
    let Some(program) = ctx.programs[stage.index()] else {
        return;
    };
    let glsl_version = program.glsl_version;
    let old_max = ctx.stage_views[stage.index()].num;
    let mut samplers_used = program.samplers_used;

    if samplers_used == 0 && old_max == 0 {
        return;
    }

    if ctx.stage_views[stage.index()].views.len() < MAX_SAMPLER_UNITS {
        ctx.stage_views[stage.index()]
            .views
            .resize(MAX_SAMPLER_UNITS, None);
    }

    let mut num = 0;
    for unit in 0..MAX_SAMPLER_UNITS {
        let used = samplers_used & 1 != 0;
        samplers_used >>= 1;

        let mut view = None;
        if used {
            let tex_unit = program.sampler_units[unit];
            match update_single_texture(ctx, tex_unit, glsl_version) {
                Ok(resolved) => {
                    view = resolved;
                    num = unit + 1;
                }
                Err(err) => {
                    warn!(%err, stage = %stage, unit, "skipping texture unit");
                    continue;
                }
            }
        } else if samplers_used == 0 && unit >= old_max {
            // All old slots reset and no used units remain.
            break;
        }

        ctx.stage_views[stage.index()].views[unit] = view;
    }
    ctx.stage_views[stage.index()].num = num;

    ctx.bindings
        .set_sampler_views(stage, &ctx.stage_views[stage.index()].views[..num]);
}

fn update_vertex_textures(ctx: &mut DriverContext) {
    update_stage_textures(ctx, ShaderStage::Vertex);
}

fn update_fragment_textures(ctx: &mut DriverContext) {
    update_stage_textures(ctx, ShaderStage::Fragment);
}

fn update_geometry_textures(ctx: &mut DriverContext) {
    update_stage_textures(ctx, ShaderStage::Geometry);
}

fn update_tessctrl_textures(ctx: &mut DriverContext) {
    update_stage_textures(ctx, ShaderStage::TessCtrl);
}

fn update_tesseval_textures(ctx: &mut DriverContext) {
    update_stage_textures(ctx, ShaderStage::TessEval);
}

fn update_compute_textures(ctx: &mut DriverContext) {
    update_stage_textures(ctx, ShaderStage::Compute);
}

/// One tracked piece of derived state: when any trigger bit is dirty, run the
/// update.
pub struct StateAtom {
    pub name: &'static str,
    pub dirty: DirtyState,
    pub update: fn(&mut DriverContext),
}

pub const TEXTURE_ATOMS: &[StateAtom] = &[
    StateAtom {
        name: "update_vertex_textures",
        dirty: DirtyState::TEXTURES
            .union(DirtyState::VERTEX_PROGRAM)
            .union(DirtyState::SAMPLER_VIEWS),
        update: update_vertex_textures,
    },
    StateAtom {
        name: "update_fragment_textures",
        dirty: DirtyState::TEXTURES
            .union(DirtyState::FRAGMENT_PROGRAM)
            .union(DirtyState::SAMPLER_VIEWS),
        update: update_fragment_textures,
    },
    StateAtom {
        name: "update_geometry_textures",
        dirty: DirtyState::TEXTURES
            .union(DirtyState::GEOMETRY_PROGRAM)
            .union(DirtyState::SAMPLER_VIEWS),
        update: update_geometry_textures,
    },
    StateAtom {
        name: "update_tessctrl_textures",
        dirty: DirtyState::TEXTURES
            .union(DirtyState::TESS_CTRL_PROGRAM)
            .union(DirtyState::SAMPLER_VIEWS),
        update: update_tessctrl_textures,
    },
    StateAtom {
        name: "update_tesseval_textures",
        dirty: DirtyState::TEXTURES
            .union(DirtyState::TESS_EVAL_PROGRAM)
            .union(DirtyState::SAMPLER_VIEWS),
        update: update_tesseval_textures,
    },
    StateAtom {
        name: "update_compute_textures",
        dirty: DirtyState::TEXTURES
            .union(DirtyState::COMPUTE_PROGRAM)
            .union(DirtyState::SAMPLER_VIEWS),
        update: update_compute_textures,
    },
];

/// Runs every atom whose trigger intersects the context's dirty set, then
/// clears the bits those atoms consumed. Called once before each draw.
pub fn validate_state(ctx: &mut DriverContext) {
    if ctx.dirty.is_empty() {
        return;
    }

    let dirty = ctx.dirty;
    let mut processed = DirtyState::empty();
    for atom in TEXTURE_ATOMS {
        if dirty.intersects(atom.dirty) {
            (atom.update)(ctx);
            processed |= atom.dirty;
        }
    }
    ctx.dirty.remove(processed);
}
