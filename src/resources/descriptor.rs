//! Texture descriptors: JSON files that assign images to material channels.
//!
//! A descriptor is a flat object such as
//!
//! ```json
//! { "map": "helmet/albedo.jpg", "normalMap": "https://example.com/normal.png" }
//! ```
//!
//! Keys are the [`MaterialChannel`] keys, values are asset paths or URLs (see
//! [`resolve_url`](crate::resources::texture::resolve_url)). Loading is
//! forgiving: a broken descriptor yields no textures and a broken image only
//! drops its own channel. Both are logged.

use serde::Deserialize;
use serde_json::Value;

use crate::{
    data_structures::{
        channels::{Channels, MaterialChannel},
        texture::{ColorSpace, Texture},
    },
    resources::texture::{load_string, load_texture},
};

#[derive(Debug, thiserror::Error)]
pub enum DescriptorError {
    #[error("texture descriptor {path} could not be loaded: {reason}")]
    Unavailable { path: String, reason: String },
    #[error("texture descriptor is empty")]
    Empty,
    #[error("texture descriptor is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("texture descriptor must be a JSON object, found {0}")]
    NotAnObject(&'static str),
}

/// Image references per material channel.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TextureDescriptor {
    pub sources: Channels<String>,
}

impl TextureDescriptor {
    pub fn source(&self, channel: MaterialChannel) -> Option<&str> {
        self.sources.get(channel).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawDescriptor {
    map: Option<Value>,
    normal_map: Option<Value>,
    roughness_map: Option<Value>,
    metalness_map: Option<Value>,
    ao_map: Option<Value>,
    emissive_map: Option<Value>,
}

impl RawDescriptor {
    fn into_entries(self) -> [(MaterialChannel, Option<Value>); 6] {
        [
            (MaterialChannel::Color, self.map),
            (MaterialChannel::Normal, self.normal_map),
            (MaterialChannel::Roughness, self.roughness_map),
            (MaterialChannel::Metalness, self.metalness_map),
            (MaterialChannel::AmbientOcclusion, self.ao_map),
            (MaterialChannel::Emissive, self.emissive_map),
        ]
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Parse the body of a descriptor.
///
/// Unknown keys are ignored. Recognised keys whose value is not a non-empty
/// string are skipped with a warning.
pub fn parse(text: &str) -> Result<TextureDescriptor, DescriptorError> {
    if text.trim().is_empty() {
        return Err(DescriptorError::Empty);
    }
    let value: Value = serde_json::from_str(text)?;
    if !value.is_object() {
        return Err(DescriptorError::NotAnObject(kind(&value)));
    }
    let raw: RawDescriptor = serde_json::from_value(value)?;

    let mut sources = Channels::new();
    for (channel, value) in raw.into_entries() {
        match value {
            None => (),
            Some(Value::String(path)) if !path.trim().is_empty() => {
                sources.set(channel, path.trim().to_string());
            }
            Some(other) => log::warn!(
                "Skipping texture descriptor entry '{}': expected a non-empty string, found {}",
                channel,
                kind(&other)
            ),
        }
    }
    Ok(TextureDescriptor { sources })
}

pub async fn load_descriptor(path: &str) -> Result<TextureDescriptor, DescriptorError> {
    let text = load_string(path)
        .await
        .map_err(|e| DescriptorError::Unavailable {
            path: path.to_string(),
            reason: e.to_string(),
        })?;
    parse(&text)
}

/// Load every image a descriptor references.
///
/// Never fails: descriptor problems yield an empty set, failing images are
/// left out. Images are fetched concurrently.
pub async fn load_texture_set(
    path: &str,
    device: &wgpu::Device,
    queue: &wgpu::Queue,
) -> Channels<Texture> {
    let descriptor = match load_descriptor(path).await {
        Ok(descriptor) => descriptor,
        Err(e) => {
            log::warn!("{}. No textures are applied.", e);
            return Channels::new();
        }
    };
    if descriptor.is_empty() {
        log::info!("Texture descriptor {} assigns no channels", path);
        return Channels::new();
    }

    let loads = descriptor.sources.iter().map(|(channel, source)| async move {
        let color_space = if channel.is_color() {
            ColorSpace::Srgb
        } else {
            ColorSpace::Linear
        };
        (channel, source, load_texture(source, color_space, device, queue).await)
    });

    futures::future::join_all(loads)
        .await
        .into_iter()
        .filter_map(|(channel, source, result)| match result {
            Ok(texture) => {
                log::info!("Loaded {} from {}", channel, source);
                Some((channel, texture))
            }
            Err(e) => {
                log::warn!("Could not load {} from {}: {}", channel, source, e);
                None
            }
        })
        .collect()
}
