//! Mock hardware collaborators shared by the integration tests.

use std::cell::RefCell;
use std::rc::Rc;

use tilegpu::context::{
    CopyEngine, FallbackBlitter, FrameSnapshot, GraphicsState, JobQueue, StageBindingSink,
};
use tilegpu::resource::SliceLayout;
use tilegpu::{
    BaseFormat, BlitRequest, ChannelMask, DriverContext, PixelFormat, Resource, SamplerView,
    ShaderStage, TextureObject, TextureTarget, TilingMode,
};

/// Everything the mocks observed, shared with the test body.
#[derive(Default)]
pub struct HwLog {
    pub flushes: usize,
    pub submits: Vec<FrameSnapshot>,
    pub copy_attempts: usize,
    /// Whether `try_copy_region` reports success.
    pub copy_succeeds: bool,
    /// Whether the fallback blitter supports the format pair.
    pub fallback_supported: bool,
    pub fallback_blits: Vec<(GraphicsState, ChannelMask)>,
    pub pushed_views: Vec<(ShaderStage, Vec<Option<Rc<SamplerView>>>)>,
}

struct MockJobs(Rc<RefCell<HwLog>>);

impl JobQueue for MockJobs {
    fn flush(&mut self) {
        self.0.borrow_mut().flushes += 1;
    }

    fn submit(&mut self, frame: &FrameSnapshot) {
        self.0.borrow_mut().submits.push(frame.clone());
    }
}

struct MockCopy(Rc<RefCell<HwLog>>);

impl CopyEngine for MockCopy {
    fn try_copy_region(&mut self, _req: &BlitRequest) -> bool {
        let mut log = self.0.borrow_mut();
        log.copy_attempts += 1;
        log.copy_succeeds
    }
}

struct MockBlitter(Rc<RefCell<HwLog>>);

impl FallbackBlitter for MockBlitter {
    fn is_blit_supported(&self, _req: &BlitRequest) -> bool {
        self.0.borrow().fallback_supported
    }

    fn blit(&mut self, saved: &GraphicsState, req: &BlitRequest) {
        self.0
            .borrow_mut()
            .fallback_blits
            .push((saved.clone(), req.mask));
    }
}

struct MockBindings(Rc<RefCell<HwLog>>);

impl StageBindingSink for MockBindings {
    fn set_sampler_views(&mut self, stage: ShaderStage, views: &[Option<Rc<SamplerView>>]) {
        self.0
            .borrow_mut()
            .pushed_views
            .push((stage, views.to_vec()));
    }
}

/// Linear/LT stride rule used by the resource builders.
pub fn linear_stride(width: u32, cpp: u32) -> u32 {
    (width * cpp + 15) & !15
}

pub fn image_resource(
    format: PixelFormat,
    width: u32,
    height: u32,
    nr_samples: u32,
) -> Rc<Resource> {
    let stride = if nr_samples > 1 {
        ((width + 31) & !31) * 4 * format.bytes_per_pixel()
    } else {
        linear_stride(width, format.bytes_per_pixel())
    };
    Rc::new(Resource {
        format,
        target: TextureTarget::Tex2D,
        width0: width,
        height0: height,
        last_level: 0,
        array_size: 1,
        nr_samples,
        slices: vec![SliceLayout {
            offset: 0,
            stride,
            tiling: TilingMode::Linear,
        }],
    })
}

pub fn test_context() -> (DriverContext, Rc<RefCell<HwLog>>) {
    let log = Rc::new(RefCell::new(HwLog {
        fallback_supported: true,
        ..HwLog::default()
    }));
    let fallback = TextureObject::new(
        image_resource(PixelFormat::Rgba8Unorm, 1, 1, 1),
        BaseFormat::Rgba,
    );
    let ctx = DriverContext::new(
        1,
        fallback,
        Box::new(MockJobs(Rc::clone(&log))),
        Box::new(MockCopy(Rc::clone(&log))),
        Box::new(MockBlitter(Rc::clone(&log))),
        Box::new(MockBindings(Rc::clone(&log))),
    );
    (ctx, log)
}
