use std::io::{BufReader, Cursor};

use anyhow::Context as _;

use crate::{
    data_structures::{
        channels::{Channels, MaterialChannel},
        model::{self, MaterialDefaults},
        scene_graph::{ContainerNode, SceneNode, to_scene_node},
        texture::{ColorSpace, Texture},
    },
    resources::texture::{load_binary, load_texture, material_layout},
};

/**
 * This module contains all logic for loading models, textures and environment maps from external files.
 */
pub mod descriptor;
pub mod texture;

/// Decode a texture referenced by a glTF material.
async fn load_gltf_texture(
    texture: gltf::Texture<'_>,
    buffers: &[Vec<u8>],
    label: &str,
    color_space: ColorSpace,
    device: &wgpu::Device,
    queue: &wgpu::Queue,
) -> anyhow::Result<Texture> {
    match texture.source().source() {
        gltf::image::Source::View { view, mime_type } => {
            let start = view.offset();
            let end = start + view.length();
            let bytes = buffers
                .get(view.buffer().index())
                .and_then(|buffer| buffer.get(start..end))
                .with_context(|| format!("buffer view {} is out of range", view.index()))?;
            Texture::from_bytes(
                device,
                queue,
                bytes,
                label,
                mime_type.split('/').last(),
                color_space,
            )
        }
        gltf::image::Source::Uri { uri, mime_type: _ } => {
            load_texture(uri, color_space, device, queue).await
        }
    }
}

/// The textures a glTF material provides, keyed by channel.
///
/// Metalness and roughness share one image in glTF (blue and green channel),
/// so it is bound to both channels.
async fn load_material_channels(
    material: &gltf::Material<'_>,
    buffers: &[Vec<u8>],
    file_name: &str,
    device: &wgpu::Device,
    queue: &wgpu::Queue,
) -> Channels<Texture> {
    let pbr = material.pbr_metallic_roughness();
    let sources = [
        (
            MaterialChannel::Color,
            pbr.base_color_texture().map(|info| info.texture()),
        ),
        (
            MaterialChannel::Normal,
            material.normal_texture().map(|normal| normal.texture()),
        ),
        (
            MaterialChannel::Roughness,
            pbr.metallic_roughness_texture().map(|info| info.texture()),
        ),
        (
            MaterialChannel::AmbientOcclusion,
            material.occlusion_texture().map(|occlusion| occlusion.texture()),
        ),
        (
            MaterialChannel::Emissive,
            material.emissive_texture().map(|info| info.texture()),
        ),
    ];

    let mut channels = Channels::new();
    for (channel, texture) in sources {
        let Some(texture) = texture else {
            continue;
        };
        let color_space = if channel.is_color() {
            ColorSpace::Srgb
        } else {
            ColorSpace::Linear
        };
        let label = format!("{} {}", file_name, channel);
        match load_gltf_texture(texture, buffers, &label, color_space, device, queue).await {
            Ok(texture) => {
                channels.set(channel, texture);
            }
            Err(e) => log::warn!("{}: {} could not be decoded: {}", file_name, channel, e),
        }
    }
    if let Some(metallic_roughness) = channels.get(MaterialChannel::Roughness).cloned() {
        channels.set(MaterialChannel::Metalness, metallic_roughness);
    }
    channels
}

/// Load a binary or JSON glTF file into a scene graph.
///
/// The returned root is always a container so callers can place and scale
/// the whole model without touching the file's own node transforms.
pub async fn load_model_gltf(
    file_name: &str,
    device: &wgpu::Device,
    queue: &wgpu::Queue,
) -> anyhow::Result<Box<dyn SceneNode>> {
    let gltf_bytes = load_binary(file_name)
        .await
        .with_context(|| format!("could not read {}", file_name))?;
    let gltf_reader = BufReader::new(Cursor::new(gltf_bytes));
    let gltf = gltf::Gltf::from_reader(gltf_reader)?;

    // Load buffers
    let mut buffer_data = Vec::new();
    for buffer in gltf.buffers() {
        match buffer.source() {
            gltf::buffer::Source::Bin => {
                let blob = gltf
                    .blob
                    .as_deref()
                    .with_context(|| format!("{} references a missing binary chunk", file_name))?;
                buffer_data.push(blob.into());
            }
            gltf::buffer::Source::Uri(uri) => {
                let bin = load_binary(uri).await?;
                buffer_data.push(bin);
            }
        }
    }

    // Load materials
    let layout = material_layout(device);
    let defaults = MaterialDefaults::new(device, queue);
    let mut materials = Vec::new();
    for material in gltf.materials() {
        let provided = load_material_channels(&material, &buffer_data, file_name, device, queue).await;
        let name = material
            .name()
            .map(str::to_string)
            .unwrap_or_else(|| format!("{} material {}", file_name, materials.len()));
        materials.push(model::Material::new(device, &name, provided, &defaults, &layout));
    }
    if materials.is_empty() {
        materials.push(model::Material::new(
            device,
            "default material",
            Channels::new(),
            &defaults,
            &layout,
        ));
    }

    let mut models = Vec::new();
    for scene in gltf.scenes() {
        for node in scene.nodes() {
            models.push(to_scene_node(node, &buffer_data, device, &materials));
        }
    }

    let mut root_node = ContainerNode::new(models);
    root_node.update_world_transform_all();
    Ok(Box::new(root_node))
}

/// Fetch and decode a Radiance `.hdr` environment map.
pub async fn load_environment(
    url: &str,
    device: &wgpu::Device,
    queue: &wgpu::Queue,
) -> anyhow::Result<Texture> {
    let bytes = load_binary(url)
        .await
        .with_context(|| format!("could not fetch {}", url))?;
    Texture::from_hdr_bytes(device, queue, &bytes, url)
}
