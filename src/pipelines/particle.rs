use wgpu::util::DeviceExt;

use crate::{
    data_structures::{model::Vertex, particles::ParticleRaw},
    pipelines::basic::{DepthMode, mk_render_pipeline},
};

/// Canvas size in pixels and the opacity of the trail fade.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct OverlayUniform {
    pub resolution: [f32; 2],
    pub fade_alpha: f32,
    _padding: f32,
}

impl OverlayUniform {
    pub fn new(width: u32, height: u32, fade_alpha: f32) -> Self {
        Self {
            resolution: [width.max(1) as f32, height.max(1) as f32],
            fade_alpha,
            _padding: 0.0,
        }
    }
}

/// Opacity of the black layer on a target that blends in linear space, such
/// that each frame keeps the same share of the sRGB-encoded brightness as a
/// 2D canvas painting black at `alpha`.
pub fn linear_fade_alpha(alpha: f32) -> f32 {
    1.0 - (1.0 - alpha.clamp(0.0, 1.0)).powf(2.4)
}

pub fn mk_bind_group_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        entries: &[wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        }],
        label: Some("overlay_bind_group_layout"),
    })
}

/// Darkens everything drawn before by painting black at `fade_alpha`.
pub fn mk_fade_pipeline(
    device: &wgpu::Device,
    color_format: wgpu::TextureFormat,
    overlay_bind_group_layout: &wgpu::BindGroupLayout,
) -> wgpu::RenderPipeline {
    let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("Fade Pipeline Layout"),
        bind_group_layouts: &[overlay_bind_group_layout],
        push_constant_ranges: &[],
    });
    let shader = wgpu::ShaderModuleDescriptor {
        label: Some("Fade Shader"),
        source: wgpu::ShaderSource::Wgsl(include_str!("fade.wgsl").into()),
    };
    mk_render_pipeline(
        device,
        &layout,
        color_format,
        Some(wgpu::BlendState::ALPHA_BLENDING),
        Some(DepthMode::Ignore),
        &[],
        shader,
    )
}

/// Filled circles, one instance per particle, positioned in pixels.
pub fn mk_particle_pipeline(
    device: &wgpu::Device,
    color_format: wgpu::TextureFormat,
    overlay_bind_group_layout: &wgpu::BindGroupLayout,
) -> wgpu::RenderPipeline {
    let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("Particle Pipeline Layout"),
        bind_group_layouts: &[overlay_bind_group_layout],
        push_constant_ranges: &[],
    });
    let shader = wgpu::ShaderModuleDescriptor {
        label: Some("Particle Shader"),
        source: wgpu::ShaderSource::Wgsl(include_str!("particle.wgsl").into()),
    };
    mk_render_pipeline(
        device,
        &layout,
        color_format,
        Some(wgpu::BlendState::ALPHA_BLENDING),
        Some(DepthMode::Ignore),
        &[ParticleRaw::desc()],
        shader,
    )
}

/// GPU side of the fireworks: both pipelines, the overlay uniform and a
/// growable instance buffer.
#[derive(Debug)]
pub struct ParticleResources {
    pub uniform: OverlayUniform,
    pub buffer: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
    pub fade_pipeline: wgpu::RenderPipeline,
    pub particle_pipeline: wgpu::RenderPipeline,
    instances: wgpu::Buffer,
    capacity: usize,
    amount: usize,
}

impl ParticleResources {
    const INITIAL_CAPACITY: usize = 1024;

    pub fn new(device: &wgpu::Device, color_format: wgpu::TextureFormat, fade_alpha: f32) -> Self {
        let fade_alpha = if color_format.is_srgb() {
            linear_fade_alpha(fade_alpha)
        } else {
            fade_alpha
        };
        let uniform = OverlayUniform::new(1, 1, fade_alpha);
        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Overlay Buffer"),
            contents: bytemuck::cast_slice(&[uniform]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let bind_group_layout = mk_bind_group_layout(device);
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            }],
            label: Some("overlay_bind_group"),
        });
        Self {
            uniform,
            buffer,
            bind_group,
            fade_pipeline: mk_fade_pipeline(device, color_format, &bind_group_layout),
            particle_pipeline: mk_particle_pipeline(device, color_format, &bind_group_layout),
            instances: mk_instance_buffer(device, Self::INITIAL_CAPACITY),
            capacity: Self::INITIAL_CAPACITY,
            amount: 0,
        }
    }

    pub fn amount(&self) -> usize {
        self.amount
    }

    /// Upload this frame's particles and the canvas size.
    pub fn write_to_buffers(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        size: [u32; 2],
        particles: &[ParticleRaw],
    ) {
        let uniform = OverlayUniform::new(size[0], size[1], self.uniform.fade_alpha);
        if uniform != self.uniform {
            self.uniform = uniform;
            queue.write_buffer(&self.buffer, 0, bytemuck::cast_slice(&[self.uniform]));
        }
        if particles.len() > self.capacity {
            self.capacity = particles.len().next_power_of_two();
            log::debug!("Growing the particle buffer to {} instances", self.capacity);
            self.instances = mk_instance_buffer(device, self.capacity);
        }
        if !particles.is_empty() {
            queue.write_buffer(&self.instances, 0, bytemuck::cast_slice(particles));
        }
        self.amount = particles.len();
    }

    /// Fade the previous frame, then draw the particles on top.
    pub fn draw(&self, render_pass: &mut wgpu::RenderPass<'_>) {
        render_pass.set_bind_group(0, &self.bind_group, &[]);
        render_pass.set_pipeline(&self.fade_pipeline);
        render_pass.draw(0..3, 0..1);
        if self.amount == 0 {
            return;
        }
        render_pass.set_pipeline(&self.particle_pipeline);
        render_pass.set_vertex_buffer(0, self.instances.slice(..));
        render_pass.draw(0..6, 0..self.amount as u32);
    }
}

fn mk_instance_buffer(device: &wgpu::Device, capacity: usize) -> wgpu::Buffer {
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("Particle Instance Buffer"),
        size: (capacity * std::mem::size_of::<ParticleRaw>()) as wgpu::BufferAddress,
        usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}
