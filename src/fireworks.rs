//! The fireworks page: random bursts with a fading trail, a typed greeting and
//! a countdown to the next new year.
//!
//! [`FireworkShow`] is the simulation and knows nothing about the GPU, so it
//! can be driven with a seeded rng in tests. [`FireworksFlow`] hosts it in the
//! engine: it keeps the scene target between frames (`preserve_frame`), paints
//! the fade and the particles through `Render::Custom` and drives the text
//! overlays.

use instant::Duration;
use rand::{Rng, SeedableRng, rngs::StdRng};
use winit::event::{DeviceEvent, WindowEvent};

#[cfg(feature = "integration-tests")]
use crate::flow::ImageTestResult;
use crate::{
    config::FireworksConfig,
    context::{Context, InitContext},
    countdown::{Countdown, Remaining, Typewriter},
    data_structures::particles::{Hsl, Particle, ParticleArena, ParticleRaw},
    flow::{FlowConsturctor, GraphicsFlow, Out},
    pipelines::particle::ParticleResources,
    render::Render,
    text::{TextSink, text_sink},
};

/// Uniform sample from `[lo, hi]`. An empty range collapses to `lo`.
fn sample<R: Rng + ?Sized>(rng: &mut R, lo: f32, hi: f32) -> f32 {
    if hi > lo { rng.gen_range(lo..=hi) } else { lo }
}

#[derive(Debug)]
pub struct FireworkShow {
    config: FireworksConfig,
    particles: ParticleArena,
    drawn: Vec<ParticleRaw>,
}

impl FireworkShow {
    pub fn new(config: FireworksConfig) -> Self {
        let particles = match config.max_particles {
            Some(cap) => ParticleArena::bounded(cap),
            None => ParticleArena::with_capacity(config.burst_size * 4),
        };
        Self {
            config,
            particles,
            drawn: Vec::new(),
        }
    }

    pub fn config(&self) -> &FireworksConfig {
        &self.config
    }

    pub fn particles(&self) -> &ParticleArena {
        &self.particles
    }

    /// Particles drawn by the last tick, including the ones that expired in it.
    pub fn drawn(&self) -> &[ParticleRaw] {
        &self.drawn
    }

    /// Spawn one burst at `(x, y)`. All particles share a random hue.
    /// Returns how many particles were added.
    pub fn explode<R: Rng + ?Sized>(&mut self, rng: &mut R, x: f32, y: f32) -> usize {
        let color = Hsl::new(rng.gen_range(0.0..360.0), 100.0, 50.0);
        let speed = self.config.max_speed;
        let mut added = 0;
        for _ in 0..self.config.burst_size {
            let particle = Particle::new(
                x,
                y,
                sample(rng, -speed, speed),
                sample(rng, -speed, speed),
                self.config.lifetime,
                color,
            );
            if self.particles.insert(particle).is_some() {
                added += 1;
            }
        }
        if added < self.config.burst_size {
            log::debug!(
                "Particle cap reached, dropped {} of {} particles",
                self.config.burst_size - added,
                self.config.burst_size
            );
        }
        added
    }

    /// Evaluate `countdown` at `now_millis`. From the boundary on, every call
    /// also fires one burst at the centre of the canvas.
    pub fn countdown_tick<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        countdown: &mut Countdown,
        now_millis: i64,
        width: f32,
        height: f32,
    ) -> Remaining {
        let remaining = countdown.at(now_millis);
        if countdown.has_arrived() {
            self.explode(rng, width / 2.0, height / 2.0);
        }
        remaining
    }

    /// Advance one frame on a canvas of `width` x `height` pixels.
    ///
    /// Maybe spawns a burst in the upper half, then moves every particle,
    /// records it for drawing and frees it once its lifetime is used up.
    pub fn tick<R: Rng + ?Sized>(&mut self, rng: &mut R, width: f32, height: f32) {
        if rng.r#gen::<f64>() < self.config.spawn_probability {
            let margin = self.config.margin;
            let x = sample(rng, margin, width - margin);
            let y = sample(rng, margin, height / 2.0);
            self.explode(rng, x, y);
        }

        let gravity = self.config.gravity;
        let radius = self.config.particle_radius;
        let drawn = &mut self.drawn;
        drawn.clear();
        self.particles.retain_mut(|particle| {
            let alive = particle.update(gravity);
            drawn.push(particle.to_raw(radius));
            alive
        });
    }
}

pub struct FireworksFlow {
    show: FireworkShow,
    rng: StdRng,
    resources: ParticleResources,
    device: wgpu::Device,
    queue: wgpu::Queue,
    countdown: Option<Countdown>,
    typewriter: Typewriter,
    typing_text: Box<dyn TextSink>,
    year_text: Box<dyn TextSink>,
    countdown_text: Box<dyn TextSink>,
}

impl FireworksFlow {
    pub fn new(config: FireworksConfig, ctx: InitContext) -> Self {
        Self::with_rng(config, ctx, StdRng::from_entropy())
    }

    pub fn with_rng(config: FireworksConfig, ctx: InitContext, rng: StdRng) -> Self {
        let countdown = match Countdown::next_year_from(chrono::Local::now()) {
            Ok(countdown) => Some(countdown),
            Err(e) => {
                log::warn!("Countdown disabled: {:#}", e);
                None
            }
        };
        Self {
            resources: ParticleResources::new(&ctx.device, ctx.color_format, config.fade_alpha),
            typewriter: Typewriter::new(&config.greeting, config.typing_interval),
            show: FireworkShow::new(config),
            rng,
            device: ctx.device,
            queue: ctx.queue,
            countdown,
            typing_text: text_sink("typing"),
            year_text: text_sink("year"),
            countdown_text: text_sink("countdown"),
        }
    }

    pub fn constructor<S: 'static>(config: FireworksConfig) -> FlowConsturctor<S, ()> {
        Box::new(|ctx| {
            Box::pin(async move {
                Box::new(FireworksFlow::new(config, ctx)) as Box<dyn GraphicsFlow<S, ()>>
            })
        })
    }

    pub fn show(&self) -> &FireworkShow {
        &self.show
    }

    /// Refresh the countdown text without firing anything.
    fn show_countdown(&mut self) {
        if let Some(countdown) = &mut self.countdown {
            let remaining = countdown.at(chrono::Local::now().timestamp_millis());
            self.countdown_text.set_text(&remaining.to_string());
        }
    }
}

impl<S> GraphicsFlow<S, ()> for FireworksFlow {
    fn on_init(&mut self, ctx: &mut Context, _: &mut S) -> Out<S, ()> {
        ctx.preserve_frame = true;
        ctx.clear_colour = wgpu::Color::BLACK;
        ctx.tick_duration_millis = self.show.config().countdown_interval.as_millis() as u64;

        if let Some(countdown) = &self.countdown {
            self.year_text.set_text(&countdown.target_year().to_string());
        }
        self.show_countdown();
        Out::Empty
    }

    fn on_update(&mut self, ctx: &Context, _: &mut S, dt: Duration) -> Out<S, ()> {
        if let Some(text) = self.typewriter.update(dt) {
            self.typing_text.set_text(&text);
        }

        let [width, height] = ctx.size();
        self.show.tick(&mut self.rng, width as f32, height as f32);
        self.resources
            .write_to_buffers(&self.device, &self.queue, ctx.size(), self.show.drawn());
        Out::Empty
    }

    fn on_tick(&mut self, ctx: &Context, _: &mut S) -> Out<S, ()> {
        let Some(countdown) = &mut self.countdown else {
            return Out::Empty;
        };
        let [width, height] = ctx.size();
        let remaining = self.show.countdown_tick(
            &mut self.rng,
            countdown,
            chrono::Local::now().timestamp_millis(),
            width as f32,
            height as f32,
        );
        self.countdown_text.set_text(&remaining.to_string());
        Out::Empty
    }

    fn on_device_events(&mut self, _: &Context, _: &mut S, _: &DeviceEvent) -> Out<S, ()> {
        Out::Empty
    }

    fn on_window_events(&mut self, _: &Context, _: &mut S, _: &WindowEvent) -> Out<S, ()> {
        Out::Empty
    }

    fn on_custom_events(&mut self, _: &Context, _: &mut S, event: ()) -> Option<()> {
        Some(event)
    }

    fn on_render<'pass>(&self) -> Render<'_, 'pass> {
        Render::Custom(Box::new(
            |_: &Context, render_pass: &mut wgpu::RenderPass<'pass>| {
                self.resources.draw(render_pass)
            },
        ))
    }

    #[cfg(feature = "integration-tests")]
    fn render_to_texture(
        &self,
        _: &Context,
        _: &mut S,
        _: &mut image::ImageBuffer<image::Rgba<u8>, wgpu::BufferView>,
    ) -> Result<ImageTestResult, anyhow::Error> {
        Ok(ImageTestResult::Passed)
    }
}
