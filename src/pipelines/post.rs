//! Screen space post-processing.
//!
//! The scene is rendered into an offscreen target owned by the
//! [`EffectComposer`]. Afterwards every [`PostPass`] reads the previous image
//! and writes the next one; the last pass writes to the frame's surface. Two
//! intermediate targets are ping-ponged so the scene target itself is never
//! written by a pass, which keeps it intact for frame accumulation.

use wgpu::util::DeviceExt;

use crate::{data_structures::texture::Texture, pipelines::basic::mk_render_pipeline};

/// A full-screen effect reading one image and writing another.
pub trait PostPass {
    fn name(&self) -> &str;

    fn render(
        &self,
        device: &wgpu::Device,
        encoder: &mut wgpu::CommandEncoder,
        input: &wgpu::TextureView,
        output: &wgpu::TextureView,
    );
}

/// A post pass driven by a WGSL fragment shader.
///
/// The shader sees the input image at `@group(0) @binding(0)`, a linear
/// sampler at binding 1 and a 16 byte uniform at binding 2.
#[derive(Debug)]
pub struct ShaderPass {
    name: String,
    pipeline: wgpu::RenderPipeline,
    bind_group_layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
    uniform: wgpu::Buffer,
}

impl ShaderPass {
    pub const UNIFORM_SIZE: usize = 16;

    pub fn new(
        device: &wgpu::Device,
        color_format: wgpu::TextureFormat,
        name: &str,
        source: &'static str,
        uniform: [u8; Self::UNIFORM_SIZE],
    ) -> Self {
        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        multisampled: false,
                        view_dimension: wgpu::TextureViewDimension::D2,
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
            ],
            label: Some(&format!("{} bind group layout", name)),
        });
        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some(&format!("{} pipeline layout", name)),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });
        let pipeline = mk_render_pipeline(
            device,
            &layout,
            color_format,
            Some(wgpu::BlendState::REPLACE),
            None,
            &[],
            wgpu::ShaderModuleDescriptor {
                label: Some(name),
                source: wgpu::ShaderSource::Wgsl(source.into()),
            },
        );
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });
        let uniform = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{} uniform", name)),
            contents: &uniform,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        Self {
            name: name.to_string(),
            pipeline,
            bind_group_layout,
            sampler,
            uniform,
        }
    }

    /// Copies the image unchanged.
    pub fn copy(device: &wgpu::Device, color_format: wgpu::TextureFormat) -> Self {
        Self::new(
            device,
            color_format,
            "Copy Pass",
            include_str!("copy.wgsl"),
            [0; Self::UNIFORM_SIZE],
        )
    }
}

impl PostPass for ShaderPass {
    fn name(&self) -> &str {
        &self.name
    }

    fn render(
        &self,
        device: &wgpu::Device,
        encoder: &mut wgpu::CommandEncoder,
        input: &wgpu::TextureView,
        output: &wgpu::TextureView,
    ) {
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &self.bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(input),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&self.sampler),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: self.uniform.as_entire_binding(),
                },
            ],
            label: Some(&self.name),
        });
        let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some(&self.name),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: output,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color::TRANSPARENT),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            occlusion_query_set: None,
            timestamp_writes: None,
        });
        render_pass.set_pipeline(&self.pipeline);
        render_pass.set_bind_group(0, &bind_group, &[]);
        render_pass.draw(0..3, 0..1);
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
struct RgbShiftUniform {
    amount: f32,
    // Due to uniforms requiring 16 byte (4 float) spacing, we need to use a padding field here
    _padding: [f32; 3],
}

/// Splits the colour channels: red is sampled at `uv + (a, -a)`, green at
/// `uv` and blue at `uv - (a, -a)`. Alpha is passed through.
#[derive(Debug)]
pub struct RgbShiftPass {
    pass: ShaderPass,
}

impl RgbShiftPass {
    pub fn new(device: &wgpu::Device, color_format: wgpu::TextureFormat, amount: f32) -> Self {
        let uniform: [u8; ShaderPass::UNIFORM_SIZE] = bytemuck::cast(RgbShiftUniform {
            amount,
            _padding: [0.0; 3],
        });
        let pass = ShaderPass::new(
            device,
            color_format,
            "RGB Shift Pass",
            include_str!("rgb_shift.wgsl"),
            uniform,
        );
        Self { pass }
    }
}

impl PostPass for RgbShiftPass {
    fn name(&self) -> &str {
        self.pass.name()
    }

    fn render(
        &self,
        device: &wgpu::Device,
        encoder: &mut wgpu::CommandEncoder,
        input: &wgpu::TextureView,
        output: &wgpu::TextureView,
    ) {
        self.pass.render(device, encoder, input, output);
    }
}

/// Owns the scene render target and runs the post passes.
pub struct EffectComposer {
    scene_target: Texture,
    ping_pong: [Texture; 2],
    passes: Vec<Box<dyn PostPass>>,
    copy: ShaderPass,
    format: wgpu::TextureFormat,
    size: [u32; 2],
}

impl std::fmt::Debug for EffectComposer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EffectComposer")
            .field("passes", &self.passes.iter().map(|p| p.name()).collect::<Vec<_>>())
            .field("format", &self.format)
            .field("size", &self.size)
            .finish()
    }
}

impl EffectComposer {
    pub fn new(device: &wgpu::Device, format: wgpu::TextureFormat, size: [u32; 2]) -> Self {
        let size = [size[0].max(1), size[1].max(1)];
        let (scene_target, ping_pong) = Self::mk_targets(device, format, size);
        Self {
            scene_target,
            ping_pong,
            passes: Vec::new(),
            copy: ShaderPass::copy(device, format),
            format,
            size,
        }
    }

    fn mk_targets(
        device: &wgpu::Device,
        format: wgpu::TextureFormat,
        size: [u32; 2],
    ) -> (Texture, [Texture; 2]) {
        (
            Texture::create_render_target(device, size, format, "scene target"),
            [
                Texture::create_render_target(device, size, format, "post target a"),
                Texture::create_render_target(device, size, format, "post target b"),
            ],
        )
    }

    pub fn add_pass(&mut self, pass: Box<dyn PostPass>) {
        log::debug!("Adding post pass {}", pass.name());
        self.passes.push(pass);
    }

    pub fn passes(&self) -> impl Iterator<Item = &str> {
        self.passes.iter().map(|pass| pass.name())
    }

    /// Where the scene pass renders to.
    pub fn scene_target(&self) -> &Texture {
        &self.scene_target
    }

    pub fn format(&self) -> wgpu::TextureFormat {
        self.format
    }

    /// Recreate all targets at the new size. A no-op if the size is unchanged
    /// or zero.
    pub fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        if width == 0 || height == 0 || [width, height] == self.size {
            return;
        }
        self.size = [width, height];
        let (scene_target, ping_pong) = Self::mk_targets(device, self.format, self.size);
        self.scene_target = scene_target;
        self.ping_pong = ping_pong;
    }

    /// Run every pass on the scene target; the last one writes to `output`.
    pub fn render(
        &self,
        device: &wgpu::Device,
        encoder: &mut wgpu::CommandEncoder,
        output: &wgpu::TextureView,
    ) {
        if self.passes.is_empty() {
            self.copy
                .render(device, encoder, &self.scene_target.view, output);
            return;
        }
        let last = self.passes.len() - 1;
        let mut input = &self.scene_target.view;
        for (i, pass) in self.passes.iter().enumerate() {
            let target = &self.ping_pong[i % 2].view;
            let out = if i == last { output } else { target };
            pass.render(device, encoder, input, out);
            input = target;
        }
    }
}
