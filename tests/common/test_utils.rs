#![allow(dead_code)]

#[cfg(feature = "integration-tests")]
use festive_ngin::flow::ImageTestResult;
use festive_ngin::{
    context::Context,
    flow::{GraphicsFlow, Out},
    render::Render,
};

pub(crate) struct State {
    frame_counter: u32,
    init_invocations: u32,
    update_invocations: u32,
    custom_invocations: u32,
    pub dummy_state: String,
}

impl State {
    pub fn new() -> Self {
        Self {
            frame_counter: 0,
            init_invocations: 0,
            update_invocations: 0,
            custom_invocations: 0,
            dummy_state: String::new(),
        }
    }

    pub fn frame(&mut self) {
        self.frame_counter += 1;
    }

    pub fn init(&mut self) {
        self.init_invocations += 1;
    }

    pub fn update(&mut self) {
        self.update_invocations += 1;
    }

    pub fn custom(&mut self) {
        self.custom_invocations += 1;
    }

    pub fn frame_counter(&self) -> u32 {
        self.frame_counter
    }

    pub fn init_invocations(&self) -> u32 {
        self.init_invocations
    }

    pub fn update_invocations(&self) -> u32 {
        self.update_invocations
    }

    pub fn custom_invocations(&self) -> u32 {
        self.custom_invocations
    }
}

impl Default for State {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Default)]
pub(crate) struct FrameCounter(pub(crate) u32);

impl FrameCounter {
    pub(crate) fn frame(&self) -> u32 {
        self.0
    }

    pub(crate) fn progress(&mut self) {
        self.0 += 1;
    }
}

/// Something a golden image test draws.
pub(crate) trait TestItem {
    /// Called every frame before rendering.
    fn prepare(&mut self, _: &Context) {}

    fn render<'pass>(&self) -> Render<'_, 'pass>;
}

/// Draws nothing, only the clear colour and post-processing show up.
pub(crate) struct Empty;

impl TestItem for Empty {
    fn render<'pass>(&self) -> Render<'_, 'pass> {
        Render::None
    }
}

#[cfg(feature = "integration-tests")]
type Validate = dyn Fn(
    &Context,
    &mut FrameCounter,
    &mut image::ImageBuffer<image::Rgba<u8>, wgpu::BufferView>,
) -> Result<ImageTestResult, anyhow::Error>;

#[cfg(feature = "integration-tests")]
pub(crate) struct TestRender<T> {
    item: T,
    setup: Box<dyn Fn(&mut Context)>,
    validate: Box<Validate>,
}

#[cfg(feature = "integration-tests")]
impl<T: TestItem> TestRender<T> {
    pub(crate) fn new(
        item: T,
        setup: impl Fn(&mut Context) + 'static,
        validate: impl Fn(
            &Context,
            &mut FrameCounter,
            &mut image::ImageBuffer<image::Rgba<u8>, wgpu::BufferView>,
        ) -> Result<ImageTestResult, anyhow::Error>
        + 'static,
    ) -> Self {
        Self {
            item,
            setup: Box::new(setup),
            validate: Box::new(validate),
        }
    }
}

#[cfg(feature = "integration-tests")]
impl<T: TestItem> GraphicsFlow<FrameCounter, ()> for TestRender<T> {
    fn on_init(&mut self, ctx: &mut Context, _: &mut FrameCounter) -> Out<FrameCounter, ()> {
        (self.setup)(ctx);
        Out::Empty
    }

    fn on_update(
        &mut self,
        ctx: &Context,
        state: &mut FrameCounter,
        _: instant::Duration,
    ) -> Out<FrameCounter, ()> {
        self.item.prepare(ctx);
        state.progress();
        Out::Empty
    }

    fn on_tick(&mut self, _: &Context, _: &mut FrameCounter) -> Out<FrameCounter, ()> {
        Out::Empty
    }

    fn on_device_events(
        &mut self,
        _: &Context,
        _: &mut FrameCounter,
        _: &festive_ngin::DeviceEvent,
    ) -> Out<FrameCounter, ()> {
        Out::Empty
    }

    fn on_window_events(
        &mut self,
        _: &Context,
        _: &mut FrameCounter,
        _: &festive_ngin::WindowEvent,
    ) -> Out<FrameCounter, ()> {
        Out::Empty
    }

    fn on_custom_events(&mut self, _: &Context, _: &mut FrameCounter, event: ()) -> Option<()> {
        Some(event)
    }

    fn on_render<'pass>(&self) -> Render<'_, 'pass> {
        self.item.render()
    }

    fn render_to_texture(
        &self,
        ctx: &Context,
        state: &mut FrameCounter,
        texture: &mut image::ImageBuffer<image::Rgba<u8>, wgpu::BufferView>,
    ) -> Result<ImageTestResult, anyhow::Error> {
        (self.validate)(ctx, state, texture)
    }
}

/// Colour a fully covered pixel has after the surface encoded `colour`.
pub(crate) fn to_pixel(colour: wgpu::Color) -> image::Rgba<u8> {
    let f_to_u8 = |v: f64| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
    image::Rgba([
        f_to_u8(colour.r),
        f_to_u8(colour.g),
        f_to_u8(colour.b),
        f_to_u8(colour.a),
    ])
}

/// Run a single test flow until its validation passes.
///
/// Takes a closure from `InitContext` to the flow under test.
#[macro_export]
macro_rules! golden_image_test {
    ($constructor:expr) => {{
        use crate::common::test_utils::FrameCounter;
        use festive_ngin::flow::{FlowConsturctor, GraphicsFlow};
        let constructor: FlowConsturctor<FrameCounter, ()> = Box::new(|ctx| {
            Box::pin(async move {
                let g_flow: Box<dyn GraphicsFlow<FrameCounter, ()>> =
                    Box::new(($constructor)(ctx));
                g_flow
            })
        });

        festive_ngin::flow::run(vec![constructor])
            .expect("Failed to run flow for integration test.");
    }};
}
