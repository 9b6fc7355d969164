use wgpu::util::DeviceExt;

use crate::{data_structures::texture::Texture, resources::texture::environment_layout};

/// Image based lighting source of the model pipeline.
///
/// Until an HDR map is installed the environment is black with zero
/// intensity, so models are lit by the shader's constant ambient term only.
#[derive(Debug)]
pub struct EnvironmentResources {
    pub texture: Texture,
    pub uniform: EnvironmentUniform,
    pub buffer: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
    pub bind_group_layout: wgpu::BindGroupLayout,
}

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct EnvironmentUniform {
    pub intensity: f32,
    // Due to uniforms requiring 16 byte (4 float) spacing, we need to use a padding field here
    _padding: [f32; 3],
}

impl EnvironmentUniform {
    pub fn new(intensity: f32) -> Self {
        Self {
            intensity,
            _padding: [0.0; 3],
        }
    }
}

impl EnvironmentResources {
    pub fn new(device: &wgpu::Device, queue: &wgpu::Queue) -> Self {
        let texture = Texture::create_empty_environment(device, queue);
        let uniform = EnvironmentUniform::new(0.0);
        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Environment Buffer"),
            contents: bytemuck::cast_slice(&[uniform]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let bind_group_layout = environment_layout(device);
        let bind_group = mk_bind_group(device, &bind_group_layout, &texture, &buffer);
        Self {
            texture,
            uniform,
            buffer,
            bind_group,
            bind_group_layout,
        }
    }

    pub fn is_installed(&self) -> bool {
        self.uniform.intensity > 0.0
    }

    /// Use `texture` as the new lighting and reflection source.
    pub fn install(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, texture: Texture) {
        self.uniform = EnvironmentUniform::new(1.0);
        queue.write_buffer(&self.buffer, 0, bytemuck::cast_slice(&[self.uniform]));
        self.bind_group = mk_bind_group(device, &self.bind_group_layout, &texture, &self.buffer);
        self.texture = texture;
    }
}

fn mk_bind_group(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    texture: &Texture,
    buffer: &wgpu::Buffer,
) -> wgpu::BindGroup {
    let fallback;
    let sampler = match &texture.sampler {
        Some(sampler) => sampler,
        None => {
            fallback = device.create_sampler(&wgpu::SamplerDescriptor::default());
            &fallback
        }
    };
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::TextureView(&texture.view),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::Sampler(sampler),
            },
            wgpu::BindGroupEntry {
                binding: 2,
                resource: buffer.as_entire_binding(),
            },
        ],
        label: Some("environment_bind_group"),
    })
}
