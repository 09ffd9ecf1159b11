use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use bitflags::bitflags;

use crate::blit::BlitRequest;
use crate::resource::Surface;
use crate::sampler_view::SamplerView;
use crate::texture::{SamplerState, TextureObject};

pub type ContextId = u32;
pub type TextureId = u32;

/// Opaque handle to an immutable state object (shader, blend state, ...)
/// owned by the surrounding driver.
pub type StateHandle = u32;

/// Hardware limit on sampler units per shader stage.
pub const MAX_SAMPLER_UNITS: usize = 16;

/// Texture id reserved for the context's incomplete-texture fallback.
const FALLBACK_TEXTURE: TextureId = u32::MAX;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    Vertex,
    Fragment,
    Geometry,
    TessCtrl,
    TessEval,
    Compute,
}

impl ShaderStage {
    pub const ALL: [ShaderStage; 6] = [
        ShaderStage::Vertex,
        ShaderStage::Fragment,
        ShaderStage::Geometry,
        ShaderStage::TessCtrl,
        ShaderStage::TessEval,
        ShaderStage::Compute,
    ];

    pub const fn index(self) -> usize {
        match self {
            ShaderStage::Vertex => 0,
            ShaderStage::Fragment => 1,
            ShaderStage::Geometry => 2,
            ShaderStage::TessCtrl => 3,
            ShaderStage::TessEval => 4,
            ShaderStage::Compute => 5,
        }
    }

    /// Dirty bit raised when this stage's program changes.
    pub const fn program_dirty_bit(self) -> DirtyState {
        match self {
            ShaderStage::Vertex => DirtyState::VERTEX_PROGRAM,
            ShaderStage::Fragment => DirtyState::FRAGMENT_PROGRAM,
            ShaderStage::Geometry => DirtyState::GEOMETRY_PROGRAM,
            ShaderStage::TessCtrl => DirtyState::TESS_CTRL_PROGRAM,
            ShaderStage::TessEval => DirtyState::TESS_EVAL_PROGRAM,
            ShaderStage::Compute => DirtyState::COMPUTE_PROGRAM,
        }
    }
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShaderStage::Vertex => write!(f, "vertex"),
            ShaderStage::Fragment => write!(f, "fragment"),
            ShaderStage::Geometry => write!(f, "geometry"),
            ShaderStage::TessCtrl => write!(f, "tess-ctrl"),
            ShaderStage::TessEval => write!(f, "tess-eval"),
            ShaderStage::Compute => write!(f, "compute"),
        }
    }
}

bitflags! {
    /// Categories of context state that changed since the last validation.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct DirtyState: u32 {
        /// Texture bindings or texture-object state.
        const TEXTURES = 1 << 0;
        /// Bound sampler state affecting view derivation (sRGB decode).
        const SAMPLER_VIEWS = 1 << 1;
        const VERTEX_PROGRAM = 1 << 2;
        const FRAGMENT_PROGRAM = 1 << 3;
        const GEOMETRY_PROGRAM = 1 << 4;
        const TESS_CTRL_PROGRAM = 1 << 5;
        const TESS_EVAL_PROGRAM = 1 << 6;
        const COMPUTE_PROGRAM = 1 << 7;
    }
}

/// The slice of a bound program the texture atoms consume.
#[derive(Clone, Copy, Debug)]
pub struct Program {
    /// Bitmask of sampler units the program declares used.
    pub samplers_used: u32,
    /// Sampler unit -> texture unit mapping.
    pub sampler_units: [usize; MAX_SAMPLER_UNITS],
    /// GLSL version of the linked shader, 0 for fixed function / assembly
    /// programs.
    pub glsl_version: u32,
}

impl Default for Program {
    fn default() -> Self {
        Program {
            samplers_used: 0,
            sampler_units: [0; MAX_SAMPLER_UNITS],
            glsl_version: 0,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Viewport {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ScissorRect {
    pub min_x: u32,
    pub min_y: u32,
    pub max_x: u32,
    pub max_y: u32,
}

#[derive(Clone, Debug, Default)]
pub struct FramebufferState {
    pub color: Vec<Option<Rc<Surface>>>,
    pub zs: Option<Rc<Surface>>,
}

/// Everything the render-fallback blitter clobbers and must restore.
///
/// Captured by [`DriverContext::snapshot_graphics_state`] before handing a
/// blit to the fallback path; restoration is the blitter's responsibility.
#[derive(Clone, Debug, Default)]
pub struct GraphicsState {
    pub vertex_buffer: Option<StateHandle>,
    pub vertex_elements: Option<StateHandle>,
    pub vertex_shader: Option<StateHandle>,
    pub fragment_shader: Option<StateHandle>,
    pub rasterizer: Option<StateHandle>,
    pub viewport: Viewport,
    pub scissor: ScissorRect,
    pub blend: Option<StateHandle>,
    pub depth_stencil_alpha: Option<StateHandle>,
    pub stencil_ref: [u8; 2],
    pub sample_mask: u32,
    pub framebuffer: FramebufferState,
    pub fragment_samplers: Vec<StateHandle>,
    pub fragment_sampler_views: Vec<Option<Rc<SamplerView>>>,
}

/// Surface bindings and tile configuration for one submitted frame.
#[derive(Clone, Debug)]
pub struct FrameSnapshot {
    pub color_read: Option<Rc<Surface>>,
    pub color_write: Option<Rc<Surface>>,
    pub msaa_color_write: Option<Rc<Surface>>,
    pub zs_read: Option<Rc<Surface>>,
    pub zs_write: Option<Rc<Surface>>,
    pub msaa_zs_write: Option<Rc<Surface>>,
    pub draw_min_x: u32,
    pub draw_min_y: u32,
    pub draw_max_x: u32,
    pub draw_max_y: u32,
    pub draw_width: u32,
    pub draw_height: u32,
    pub tile_width: u32,
    pub tile_height: u32,
    pub msaa: bool,
}

/// GPU command submission. Submission is fire-and-forget; nothing here
/// blocks on hardware completion.
pub trait JobQueue {
    /// Flush work already queued against the currently bound surfaces.
    fn flush(&mut self);
    /// Encode and kick one frame of tile work.
    fn submit(&mut self, frame: &FrameSnapshot);
}

/// Direct region-copy engine used when source and destination layouts permit
/// a raw copy.
pub trait CopyEngine {
    /// Returns true when the request was fully satisfied by a direct copy.
    fn try_copy_region(&mut self, req: &BlitRequest) -> bool;
}

/// Shader-based blit fallback: draws a textured quad through the normal
/// pipeline and restores the saved state afterwards.
pub trait FallbackBlitter {
    fn is_blit_supported(&self, req: &BlitRequest) -> bool;
    fn blit(&mut self, saved: &GraphicsState, req: &BlitRequest);
}

/// Receives the per-stage sampler-view arrays ahead of each draw.
pub trait StageBindingSink {
    fn set_sampler_views(&mut self, stage: ShaderStage, views: &[Option<Rc<SamplerView>>]);
}

/// Per-stage sampler-view slots, mirroring what was last pushed to the
/// binding sink.
#[derive(Clone, Debug, Default)]
pub struct StageViews {
    pub views: Vec<Option<Rc<SamplerView>>>,
    /// One past the highest populated slot.
    pub num: usize,
}

/// One driver context.
///
/// Owns every piece of state the blit dispatcher and view cache mutate; a
/// context is driven by exactly one thread and shares nothing with its
/// siblings, so no locking happens here.
pub struct DriverContext {
    pub id: ContextId,

    // Tile-buffer bindings consumed by job submission.
    pub color_read: Option<Rc<Surface>>,
    pub color_write: Option<Rc<Surface>>,
    pub msaa_color_write: Option<Rc<Surface>>,
    pub zs_read: Option<Rc<Surface>>,
    pub zs_write: Option<Rc<Surface>>,
    pub msaa_zs_write: Option<Rc<Surface>>,
    pub draw_min_x: u32,
    pub draw_min_y: u32,
    pub draw_max_x: u32,
    pub draw_max_y: u32,
    pub draw_width: u32,
    pub draw_height: u32,
    pub tile_width: u32,
    pub tile_height: u32,
    pub msaa: bool,

    pub graphics: GraphicsState,

    pub dirty: DirtyState,
    pub textures: HashMap<TextureId, TextureObject>,
    /// Texture unit -> bound texture.
    pub texture_units: Vec<Option<TextureId>>,
    /// Texture unit -> bound sampler state.
    pub samplers: Vec<SamplerState>,
    pub programs: [Option<Program>; 6],
    pub stage_views: [StageViews; 6],

    pub jobs: Box<dyn JobQueue>,
    pub copy: Box<dyn CopyEngine>,
    pub blitter: Box<dyn FallbackBlitter>,
    pub bindings: Box<dyn StageBindingSink>,
}

impl DriverContext {
    pub fn new(
        id: ContextId,
        fallback_texture: TextureObject,
        jobs: Box<dyn JobQueue>,
        copy: Box<dyn CopyEngine>,
        blitter: Box<dyn FallbackBlitter>,
        bindings: Box<dyn StageBindingSink>,
    ) -> DriverContext {
        let mut textures = HashMap::new();
        textures.insert(FALLBACK_TEXTURE, fallback_texture);
        DriverContext {
            id,
            color_read: None,
            color_write: None,
            msaa_color_write: None,
            zs_read: None,
            zs_write: None,
            msaa_zs_write: None,
            draw_min_x: 0,
            draw_min_y: 0,
            draw_max_x: 0,
            draw_max_y: 0,
            draw_width: 0,
            draw_height: 0,
            tile_width: 64,
            tile_height: 64,
            msaa: false,
            graphics: GraphicsState::default(),
            dirty: DirtyState::empty(),
            textures,
            texture_units: vec![None; MAX_SAMPLER_UNITS],
            samplers: vec![SamplerState::default(); MAX_SAMPLER_UNITS],
            programs: [None; 6],
            stage_views: std::array::from_fn(|_| StageViews::default()),
            jobs,
            copy,
            blitter,
            bindings,
        }
    }

    /// Texture resolved for `unit`, falling back to the context's default
    /// texture when nothing is bound. The fallback also forces default
    /// sampler state, matching the incomplete-texture rules.
    pub(crate) fn resolve_texture_binding(&self, unit: usize) -> (TextureId, SamplerState) {
        match self.texture_units.get(unit).copied().flatten() {
            Some(id) => (id, self.samplers[unit]),
            None => (FALLBACK_TEXTURE, SamplerState::default()),
        }
    }

    pub fn register_texture(&mut self, id: TextureId, tex: TextureObject) {
        assert!(id != FALLBACK_TEXTURE, "texture id is reserved");
        self.textures.insert(id, tex);
        self.dirty |= DirtyState::TEXTURES;
    }

    pub fn texture_mut(&mut self, id: TextureId) -> Option<&mut TextureObject> {
        self.textures.get_mut(&id)
    }

    pub fn bind_texture(&mut self, unit: usize, id: Option<TextureId>) {
        self.texture_units[unit] = id;
        self.dirty |= DirtyState::TEXTURES;
    }

    pub fn bind_sampler(&mut self, unit: usize, state: SamplerState) {
        if self.samplers[unit] != state {
            self.samplers[unit] = state;
            self.dirty |= DirtyState::SAMPLER_VIEWS;
        }
    }

    pub fn bind_program(&mut self, stage: ShaderStage, program: Option<Program>) {
        self.programs[stage.index()] = program;
        self.dirty |= stage.program_dirty_bit();
    }

    /// Captures everything the fallback blitter needs to restore.
    pub fn snapshot_graphics_state(&self) -> GraphicsState {
        let mut saved = self.graphics.clone();
        let frag = &self.stage_views[ShaderStage::Fragment.index()];
        saved.fragment_sampler_views = frag.views[..frag.num].to_vec();
        saved
    }

    /// Current surface bindings and tile configuration, as one value the job
    /// queue can encode from.
    pub fn frame_snapshot(&self) -> FrameSnapshot {
        FrameSnapshot {
            color_read: self.color_read.clone(),
            color_write: self.color_write.clone(),
            msaa_color_write: self.msaa_color_write.clone(),
            zs_read: self.zs_read.clone(),
            zs_write: self.zs_write.clone(),
            msaa_zs_write: self.msaa_zs_write.clone(),
            draw_min_x: self.draw_min_x,
            draw_min_y: self.draw_min_y,
            draw_max_x: self.draw_max_x,
            draw_max_y: self.draw_max_y,
            draw_width: self.draw_width,
            draw_height: self.draw_height,
            tile_width: self.tile_width,
            tile_height: self.tile_height,
            msaa: self.msaa,
        }
    }
}
