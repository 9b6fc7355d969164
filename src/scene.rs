//! The 3D scene: a glTF model lit by an HDR environment, rendered through
//! the RGB shift pass and turned towards the mouse.
//!
//! The model and the environment map are requested in `on_init` as two
//! separate futures and come back as [`SceneEvent`]s independently of each
//! other. The texture descriptor is only requested once the model is in
//! place, so its textures always have materials to land on.

use std::f32::consts::PI;

use instant::Duration;
use winit::event::{DeviceEvent, WindowEvent};

#[cfg(feature = "integration-tests")]
use crate::flow::ImageTestResult;
use crate::{
    camera::Projection,
    config::SceneConfig,
    context::{Context, InitContext},
    data_structures::{
        channels::Channels,
        model::Material,
        scene_graph::{SceneNode, for_each_material},
        texture::Texture,
    },
    flow::{FlowConsturctor, GraphicsFlow, Out},
    pipelines::post::RgbShiftPass,
    render::Render,
    resources::{
        descriptor::load_texture_set, load_environment, load_model_gltf, texture::material_layout,
    },
    tween::{Ease, TweenSlot},
};

pub enum SceneEvent {
    Model(anyhow::Result<Box<dyn SceneNode>>),
    Textures(Channels<Texture>),
    Environment(anyhow::Result<Texture>),
}

/// Map a cursor position to the model's target `[pitch, yaw]` in radians.
///
/// The window centre maps to no rotation, the edges to `±range` half-turns / 2.
pub fn rotation_target(cursor: (f64, f64), size: [u32; 2], range: f32) -> [f32; 2] {
    let width = size[0].max(1) as f32;
    let height = size[1].max(1) as f32;
    let yaw = (cursor.0 as f32 / width - 0.5) * PI * range;
    let pitch = (cursor.1 as f32 / height - 0.5) * PI * range;
    [pitch, yaw]
}

/// Replace the given channels on every material below `root`.
///
/// Channels missing from `textures` are left alone. Returns the number of
/// materials whose bind group was rebuilt.
pub fn apply_textures(
    root: &mut dyn SceneNode,
    textures: &Channels<Texture>,
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
) -> usize {
    let mut updated = 0;
    for_each_material(root, &mut |material: &mut Material| {
        for (channel, texture) in textures.iter() {
            material.set_texture(channel, texture.clone());
        }
        if material.needs_update() {
            material.refresh(device, layout);
            updated += 1;
        }
    });
    updated
}

pub struct SceneFlow {
    config: SceneConfig,
    device: wgpu::Device,
    queue: wgpu::Queue,
    material_layout: wgpu::BindGroupLayout,
    model: Option<Box<dyn SceneNode>>,
    model_failed: bool,
    textures_requested: bool,
    pending_environment: Option<Texture>,
    rotation: TweenSlot<[f32; 2]>,
}

impl SceneFlow {
    pub fn new(config: SceneConfig, ctx: InitContext) -> Self {
        let material_layout = material_layout(&ctx.device);
        Self {
            config,
            device: ctx.device,
            queue: ctx.queue,
            material_layout,
            model: None,
            model_failed: false,
            textures_requested: false,
            pending_environment: None,
            rotation: TweenSlot::new([0.0, 0.0]),
        }
    }

    pub fn constructor<S: 'static>(config: SceneConfig) -> FlowConsturctor<S, SceneEvent> {
        Box::new(|ctx| {
            Box::pin(async move {
                Box::new(SceneFlow::new(config, ctx)) as Box<dyn GraphicsFlow<S, SceneEvent>>
            })
        })
    }

    pub fn has_model(&self) -> bool {
        self.model.is_some()
    }

    /// Current `[pitch, yaw]` of the model.
    pub fn rotation(&self) -> [f32; 2] {
        self.rotation.value()
    }

    fn apply_rotation(&mut self) {
        let Some(model) = &mut self.model else {
            return;
        };
        let [pitch, yaw] = self.rotation.value();
        model.get_local_transform_mut().set_euler(pitch, yaw);
        model.update_world_transform_all();
        model.write_to_buffers(&self.queue, &self.device);
    }

    fn insert_model(&mut self, mut model: Box<dyn SceneNode>) {
        let scale = self.config.model_scale;
        let local = model.get_local_transform_mut();
        local.position = cgmath::Vector3::new(0.0, 0.0, 0.0);
        local.scale = cgmath::Vector3::new(scale, scale, scale);
        self.model = Some(model);
        self.apply_rotation();
    }
}

impl<S> GraphicsFlow<S, SceneEvent> for SceneFlow {
    fn on_init(&mut self, ctx: &mut Context, _: &mut S) -> Out<S, SceneEvent> {
        ctx.camera.camera.position = cgmath::Point3::new(0.0, 0.0, self.config.camera_distance);
        ctx.camera.camera.target = cgmath::Point3::new(0.0, 0.0, 0.0);
        ctx.projection = Projection::new(
            ctx.config.width,
            ctx.config.height,
            cgmath::Deg(self.config.fovy_degrees),
            self.config.znear,
            self.config.zfar,
        );
        ctx.camera.write_to_buffer(&ctx.queue, &ctx.projection);
        ctx.composer.add_pass(Box::new(RgbShiftPass::new(
            &ctx.device,
            ctx.composer.format(),
            self.config.rgb_shift_amount,
        )));

        let (device, queue) = (self.device.clone(), self.queue.clone());
        let model_path = self.config.model_path.clone();
        let model = async move {
            SceneEvent::Model(load_model_gltf(&model_path, &device, &queue).await)
        };

        let (device, queue) = (self.device.clone(), self.queue.clone());
        let environment_url = self.config.environment_url.clone();
        let environment = async move {
            SceneEvent::Environment(load_environment(&environment_url, &device, &queue).await)
        };

        Out::FutEvent(vec![Box::new(model), Box::new(environment)])
    }

    fn on_update(&mut self, _: &Context, _: &mut S, dt: Duration) -> Out<S, SceneEvent> {
        if self.rotation.is_animating() {
            self.rotation.update(dt);
            self.apply_rotation();
        }

        if let Some(environment) = self.pending_environment.take() {
            return Out::Configure(Box::new(move |ctx| {
                ctx.environment.install(&ctx.device, &ctx.queue, environment);
            }));
        }

        if self.model.is_some() && !self.textures_requested {
            self.textures_requested = true;
            let (device, queue) = (self.device.clone(), self.queue.clone());
            let descriptor_path = self.config.descriptor_path.clone();
            let textures = async move {
                SceneEvent::Textures(load_texture_set(&descriptor_path, &device, &queue).await)
            };
            return Out::FutEvent(vec![Box::new(textures)]);
        }

        Out::Empty
    }

    fn on_tick(&mut self, _: &Context, _: &mut S) -> Out<S, SceneEvent> {
        Out::Empty
    }

    fn on_device_events(&mut self, _: &Context, _: &mut S, _: &DeviceEvent) -> Out<S, SceneEvent> {
        Out::Empty
    }

    fn on_window_events(
        &mut self,
        ctx: &Context,
        _: &mut S,
        event: &WindowEvent,
    ) -> Out<S, SceneEvent> {
        if let WindowEvent::CursorMoved { .. } = event {
            if self.model.is_some() {
                let cursor = ctx.mouse.coords;
                let target =
                    rotation_target((cursor.x, cursor.y), ctx.size(), self.config.rotation_range);
                self.rotation
                    .start(target, self.config.tween_duration, Ease::Power3Out);
            }
        }
        Out::Empty
    }

    fn on_custom_events(&mut self, _: &Context, _: &mut S, event: SceneEvent) -> Option<SceneEvent> {
        match event {
            SceneEvent::Model(Ok(model)) => {
                log::info!("Loaded {}", self.config.model_path);
                self.insert_model(model);
            }
            SceneEvent::Model(Err(e)) => {
                log::error!("Error loading GLTF model {}: {:#}", self.config.model_path, e);
                self.model_failed = true;
            }
            SceneEvent::Textures(textures) => match &mut self.model {
                Some(model) if !textures.is_empty() => {
                    let updated =
                        apply_textures(model.as_mut(), &textures, &self.device, &self.material_layout);
                    log::info!(
                        "Applied {} textures from {} to {} materials",
                        textures.len(),
                        self.config.descriptor_path,
                        updated
                    );
                }
                _ => (),
            },
            SceneEvent::Environment(Ok(environment)) => {
                log::info!("Loaded HDRI from {}", self.config.environment_url);
                self.pending_environment = Some(environment);
            }
            SceneEvent::Environment(Err(e)) => log::warn!("HDRI load failed: {:#}", e),
        }
        None
    }

    fn on_render<'pass>(&self) -> Render<'_, 'pass> {
        match &self.model {
            Some(model) => Render::from(model.as_ref()),
            None => Render::None,
        }
    }

    #[cfg(feature = "integration-tests")]
    fn render_to_texture(
        &self,
        _: &Context,
        _: &mut S,
        _: &mut image::ImageBuffer<image::Rgba<u8>, wgpu::BufferView>,
    ) -> Result<ImageTestResult, anyhow::Error> {
        if self.model.is_some() || self.model_failed {
            Ok(ImageTestResult::Passed)
        } else {
            Ok(ImageTestResult::Waiting)
        }
    }
}
