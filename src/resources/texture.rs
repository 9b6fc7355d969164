use crate::data_structures::{
    channels::MaterialChannel,
    texture::{self, ColorSpace},
};

/// Where an asset reference points to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AssetUrl {
    /// Fetched as is over the network.
    Remote(String),
    /// Relative to the asset root.
    Local(String),
}

/// Anything starting with `http` is taken as an absolute URL, everything else
/// as a path below the asset root. A leading `/` is ignored.
pub fn resolve_url(reference: &str) -> AssetUrl {
    let reference = reference.trim();
    if reference.starts_with("http") {
        AssetUrl::Remote(reference.to_string())
    } else {
        AssetUrl::Local(reference.trim_start_matches('/').to_string())
    }
}

/// Six textures, one per [`MaterialChannel`], followed by one shared sampler.
pub fn material_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    let mut entries: Vec<wgpu::BindGroupLayoutEntry> = MaterialChannel::ALL
        .iter()
        .enumerate()
        .map(|(binding, _)| wgpu::BindGroupLayoutEntry {
            binding: binding as u32,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Texture {
                multisampled: false,
                view_dimension: wgpu::TextureViewDimension::D2,
                sample_type: wgpu::TextureSampleType::Float { filterable: true },
            },
            count: None,
        })
        .collect();
    entries.push(wgpu::BindGroupLayoutEntry {
        binding: MaterialChannel::ALL.len() as u32,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
        count: None,
    });
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        entries: &entries,
        label: Some("Material texture_bind_group_layout"),
    })
}

/// HDR environment map, its sampler and the lighting uniform.
pub fn environment_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        entries: &[
            wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Texture {
                    multisampled: false,
                    view_dimension: wgpu::TextureViewDimension::D2,
                    sample_type: wgpu::TextureSampleType::Float { filterable: false },
                },
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 1,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::NonFiltering),
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
        label: Some("environment_bind_group_layout"),
    })
}

#[cfg(target_arch = "wasm32")]
fn format_url(file_name: &str) -> anyhow::Result<reqwest::Url> {
    let window = web_sys::window().ok_or_else(|| anyhow::anyhow!("no window"))?;
    let origin = window
        .location()
        .origin()
        .map_err(|e| anyhow::anyhow!("cannot read the page origin: {:?}", e))?;
    let base = reqwest::Url::parse(&format!("{}/assets/", origin))?;
    Ok(base.join(file_name)?)
}

async fn fetch(url: &str) -> anyhow::Result<reqwest::Response> {
    let response = reqwest::get(url).await?;
    Ok(response.error_for_status()?)
}

pub async fn load_string(file_name: &str) -> anyhow::Result<String> {
    let txt = match resolve_url(file_name) {
        AssetUrl::Remote(url) => fetch(&url).await?.text().await?,
        #[cfg(target_arch = "wasm32")]
        AssetUrl::Local(path) => fetch(format_url(&path)?.as_str()).await?.text().await?,
        #[cfg(not(target_arch = "wasm32"))]
        AssetUrl::Local(path) => {
            let path = std::path::Path::new("./").join("assets").join(path);
            tokio::fs::read_to_string(path).await?
        }
    };

    Ok(txt)
}

pub async fn load_binary(file_name: &str) -> anyhow::Result<Vec<u8>> {
    let data = match resolve_url(file_name) {
        AssetUrl::Remote(url) => fetch(&url).await?.bytes().await?.to_vec(),
        #[cfg(target_arch = "wasm32")]
        AssetUrl::Local(path) => fetch(format_url(&path)?.as_str())
            .await?
            .bytes()
            .await?
            .to_vec(),
        #[cfg(not(target_arch = "wasm32"))]
        AssetUrl::Local(path) => {
            let path = std::path::Path::new("./").join("assets").join(path);
            tokio::fs::read(path).await?
        }
    };

    Ok(data)
}

pub async fn load_texture(
    file_name: &str,
    color_space: ColorSpace,
    device: &wgpu::Device,
    queue: &wgpu::Queue,
) -> anyhow::Result<texture::Texture> {
    let data = load_binary(file_name).await?;
    let extension = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.split(['?', '#']).next().unwrap_or(ext));
    texture::Texture::from_bytes(device, queue, &data, file_name, extension, color_space)
}
