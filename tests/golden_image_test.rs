#[cfg(feature = "integration-tests")]
use crate::common::test_utils::{Empty, TestItem, TestRender, to_pixel};
#[cfg(feature = "integration-tests")]
use festive_ngin::{
    context::{Context, InitContext},
    data_structures::particles::{Hsl, Particle, ParticleRaw},
    flow::ImageTestResult,
    pipelines::{particle::ParticleResources, post::RgbShiftPass},
    render::Render,
};
#[cfg(feature = "integration-tests")]
use wgpu::Color;

#[cfg(feature = "integration-tests")]
mod common;

#[cfg(feature = "integration-tests")]
struct Overlay {
    resources: ParticleResources,
    particles: Vec<ParticleRaw>,
}

#[cfg(feature = "integration-tests")]
impl Overlay {
    fn new(ctx: &InitContext, fade_alpha: f32, particles: Vec<ParticleRaw>) -> Self {
        Self {
            resources: ParticleResources::new(&ctx.device, ctx.color_format, fade_alpha),
            particles,
        }
    }
}

#[cfg(feature = "integration-tests")]
impl TestItem for Overlay {
    fn prepare(&mut self, ctx: &Context) {
        self.resources
            .write_to_buffers(&ctx.device, &ctx.queue, ctx.size(), &self.particles);
    }

    fn render<'pass>(&self) -> Render<'_, 'pass> {
        Render::Custom(Box::new(
            |_: &Context, render_pass: &mut wgpu::RenderPass<'pass>| {
                self.resources.draw(render_pass)
            },
        ))
    }
}

#[cfg(feature = "integration-tests")]
fn assert_uniform(
    texture: &image::ImageBuffer<image::Rgba<u8>, wgpu::BufferView>,
    desired_pixel: image::Rgba<u8>,
) {
    for (x, y, pixel) in texture.enumerate_pixels() {
        assert_eq!(*pixel, desired_pixel, "pixel mismatch at ({}, {})", x, y);
    }
}

#[test]
#[cfg(feature = "integration-tests")]
fn should_render_clear_colour() {
    golden_image_test!(|_: InitContext| {
        TestRender::new(
            Empty,
            |ctx: &mut Context| ctx.clear_colour = Color::WHITE,
            |_, state, texture| {
                if state.frame() == 0 {
                    return Ok(ImageTestResult::Waiting);
                }
                assert_uniform(texture, to_pixel(Color::WHITE));
                Ok(ImageTestResult::Passed)
            },
        )
    });
}

#[test]
#[cfg(feature = "integration-tests")]
fn should_keep_uniform_colour_through_rgb_shift() {
    golden_image_test!(|_: InitContext| {
        TestRender::new(
            Empty,
            |ctx: &mut Context| {
                ctx.clear_colour = Color::WHITE;
                ctx.composer.add_pass(Box::new(RgbShiftPass::new(
                    &ctx.device,
                    ctx.composer.format(),
                    0.01,
                )));
            },
            |ctx, state, texture| {
                assert_eq!(ctx.composer.passes().collect::<Vec<_>>(), vec!["RGB Shift Pass"]);
                if state.frame() == 0 {
                    return Ok(ImageTestResult::Waiting);
                }
                assert_uniform(texture, to_pixel(Color::WHITE));
                Ok(ImageTestResult::Passed)
            },
        )
    });
}

#[test]
#[cfg(feature = "integration-tests")]
fn should_fade_previous_frame_to_black() {
    golden_image_test!(|ctx: InitContext| {
        TestRender::new(
            Overlay::new(&ctx, 1.0, Vec::new()),
            |ctx: &mut Context| {
                ctx.clear_colour = Color::WHITE;
                ctx.preserve_frame = true;
            },
            |_, state, texture| {
                if state.frame() < 2 {
                    return Ok(ImageTestResult::Waiting);
                }
                assert_uniform(texture, to_pixel(Color::BLACK));
                Ok(ImageTestResult::Passed)
            },
        )
    });
}

#[test]
#[cfg(feature = "integration-tests")]
fn should_draw_particle_in_burst_colour() {
    golden_image_test!(|ctx: InitContext| {
        let [width, height] = ctx.size;
        let red = Hsl::new(0.0, 100.0, 50.0);
        let particle = Particle::new(width as f32 / 2.0, height as f32 / 2.0, 0.0, 0.0, 100, red);
        TestRender::new(
            Overlay::new(&ctx, 0.0, vec![particle.to_raw(20.0)]),
            |ctx: &mut Context| ctx.clear_colour = Color::BLACK,
            |_, state, texture| {
                if state.frame() == 0 {
                    return Ok(ImageTestResult::Waiting);
                }
                let (width, height) = texture.dimensions();
                let centre = *texture.get_pixel(width / 2, height / 2);
                // Rgba or Bgra, depending on the surface format.
                let red = image::Rgba([255, 0, 0, 255]);
                let swapped = image::Rgba([0, 0, 255, 255]);
                assert!(centre == red || centre == swapped, "centre is {:?}", centre);
                assert_eq!(*texture.get_pixel(0, 0), to_pixel(Color::BLACK));
                Ok(ImageTestResult::Passed)
            },
        )
    });
}
