//! Meshes, PBR materials and models.

use std::ops::Range;

use crate::data_structures::{
    channels::{Channels, MaterialChannel},
    texture::{self, ColorSpace, Texture},
};

pub trait Vertex {
    fn desc() -> wgpu::VertexBufferLayout<'static>;
}

#[repr(C)]
#[derive(Copy, Clone, Debug, Default, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ModelVertex {
    pub position: [f32; 3],
    pub tex_coords: [f32; 2],
    pub normal: [f32; 3],
    pub tangent: [f32; 3],
    pub bitangent: [f32; 3],
}

impl Vertex for ModelVertex {
    fn desc() -> wgpu::VertexBufferLayout<'static> {
        use std::mem;
        wgpu::VertexBufferLayout {
            array_stride: mem::size_of::<ModelVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 3]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x2,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 5]>() as wgpu::BufferAddress,
                    shader_location: 2,
                    format: wgpu::VertexFormat::Float32x3,
                },
                // Tangent and bitangent
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 8]>() as wgpu::BufferAddress,
                    shader_location: 3,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 11]>() as wgpu::BufferAddress,
                    shader_location: 4,
                    format: wgpu::VertexFormat::Float32x3,
                },
            ],
        }
    }
}

#[derive(Debug)]
pub struct Mesh {
    pub name: String,
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: wgpu::Buffer,
    pub num_elements: u32,
    pub material: usize,
}

/// Neutral textures for channels a material does not provide.
///
/// White colour/roughness/metalness/occlusion keep the material factors
/// unchanged, a flat normal map means no deformation and black emission means
/// the surface does not glow.
#[derive(Clone, Debug)]
pub struct MaterialDefaults {
    pub textures: Channels<Texture>,
}

impl MaterialDefaults {
    pub fn new(device: &wgpu::Device, queue: &wgpu::Queue) -> Self {
        let textures = MaterialChannel::ALL
            .into_iter()
            .map(|channel| {
                let texture = match channel {
                    MaterialChannel::Normal => {
                        Texture::create_default_normal_map(1, 1, device, queue)
                    }
                    MaterialChannel::Emissive => Texture::create_solid(
                        [0, 0, 0, 255],
                        1,
                        1,
                        ColorSpace::Srgb,
                        "default emissive map",
                        device,
                        queue,
                    ),
                    channel => Texture::create_solid(
                        [255, 255, 255, 255],
                        1,
                        1,
                        if channel.is_color() {
                            ColorSpace::Srgb
                        } else {
                            ColorSpace::Linear
                        },
                        &format!("default {channel}"),
                        device,
                        queue,
                    ),
                };
                (channel, texture)
            })
            .collect();
        Self { textures }
    }
}

/// A PBR material: one texture per [`MaterialChannel`] bound as a single group.
///
/// Replacing a channel via [`Material::set_texture`] only marks the material
/// as dirty. The bind group is rebuilt by [`Material::refresh`], mirroring how
/// a material has to be re-uploaded before its next draw.
#[derive(Clone, Debug)]
pub struct Material {
    pub name: String,
    textures: Channels<Texture>,
    pub bind_group: wgpu::BindGroup,
    dirty: bool,
}

impl Material {
    pub fn new(
        device: &wgpu::Device,
        name: &str,
        provided: Channels<Texture>,
        defaults: &MaterialDefaults,
        layout: &wgpu::BindGroupLayout,
    ) -> Self {
        let mut textures = defaults.textures.clone();
        textures.overlay(&provided);
        let bind_group = mk_bind_group(device, name, &textures, layout);
        Self {
            name: name.to_string(),
            textures,
            bind_group,
            dirty: false,
        }
    }

    pub fn texture(&self, channel: MaterialChannel) -> Option<&Texture> {
        self.textures.get(channel)
    }

    pub fn set_texture(&mut self, channel: MaterialChannel, texture: Texture) {
        self.textures.set(channel, texture);
        self.dirty = true;
    }

    pub fn needs_update(&self) -> bool {
        self.dirty
    }

    /// Rebuild the bind group if a channel changed since the last refresh.
    pub fn refresh(&mut self, device: &wgpu::Device, layout: &wgpu::BindGroupLayout) {
        if !self.dirty {
            return;
        }
        self.bind_group = mk_bind_group(device, &self.name, &self.textures, layout);
        self.dirty = false;
    }
}

fn mk_bind_group(
    device: &wgpu::Device,
    name: &str,
    textures: &Channels<Texture>,
    layout: &wgpu::BindGroupLayout,
) -> wgpu::BindGroup {
    let views: Vec<&wgpu::TextureView> = textures.iter().map(|(_, tex)| &tex.view).collect();
    let sampler = texture::create_default_sampler(device);
    let mut entries: Vec<wgpu::BindGroupEntry> = views
        .iter()
        .enumerate()
        .map(|(binding, view)| wgpu::BindGroupEntry {
            binding: binding as u32,
            resource: wgpu::BindingResource::TextureView(view),
        })
        .collect();
    entries.push(wgpu::BindGroupEntry {
        binding: MaterialChannel::ALL.len() as u32,
        resource: wgpu::BindingResource::Sampler(&sampler),
    });
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        layout,
        entries: &entries,
        label: Some(name),
    })
}

#[derive(Clone, Debug)]
pub struct Model {
    pub meshes: std::sync::Arc<Vec<Mesh>>,
    pub materials: Vec<Material>,
}

pub trait DrawModel<'a> {
    fn draw_mesh_instanced(
        &mut self,
        mesh: &'a Mesh,
        material: &'a Material,
        instances: Range<u32>,
        camera_bind_group: &'a wgpu::BindGroup,
        environment_bind_group: &'a wgpu::BindGroup,
    );
    fn draw_model_instanced(
        &mut self,
        model: &'a Model,
        instances: Range<u32>,
        camera_bind_group: &'a wgpu::BindGroup,
        environment_bind_group: &'a wgpu::BindGroup,
    );
}

impl<'a, 'b> DrawModel<'b> for wgpu::RenderPass<'a>
where
    'b: 'a,
{
    fn draw_mesh_instanced(
        &mut self,
        mesh: &'b Mesh,
        material: &'b Material,
        instances: Range<u32>,
        camera_bind_group: &'b wgpu::BindGroup,
        environment_bind_group: &'b wgpu::BindGroup,
    ) {
        self.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
        self.set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        self.set_bind_group(0, &material.bind_group, &[]);
        self.set_bind_group(1, camera_bind_group, &[]);
        self.set_bind_group(2, environment_bind_group, &[]);
        self.draw_indexed(0..mesh.num_elements, 0, instances);
    }

    fn draw_model_instanced(
        &mut self,
        model: &'b Model,
        instances: Range<u32>,
        camera_bind_group: &'b wgpu::BindGroup,
        environment_bind_group: &'b wgpu::BindGroup,
    ) {
        for mesh in model.meshes.iter() {
            let Some(material) = model
                .materials
                .get(mesh.material)
                .or_else(|| model.materials.first())
            else {
                log::warn!("Mesh {} has no material and is skipped", mesh.name);
                continue;
            };
            self.draw_mesh_instanced(
                mesh,
                material,
                instances.clone(),
                camera_bind_group,
                environment_bind_group,
            );
        }
    }
}
