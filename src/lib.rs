//! festive-ngin
//!
//! A small wgpu engine running natively and on WASM, together with the two
//! programs built on it: a PBR model scene seen through an RGB shift
//! post-processing pass, and a fireworks page counting down to the new year.
//!
//! High-level modules
//! - `camera`: camera, projection and the camera uniform
//! - `config`: tunables of the scene and the fireworks page
//! - `context`: central GPU and window context that owns device/queue/pipelines
//! - `countdown`: new year countdown and the typewriter greeting
//! - `data_structures`: engine data models (meshes, materials, instances, particles)
//! - `fireworks`: the particle show and its flow
//! - `flow`: high level flow control (flows, update loops, event routing)
//! - `pipelines`: render pipelines (models, particles, post-processing)
//! - `render`: render composition for efficient pipeline reuse
//! - `resources`: asset loading (glTF, texture descriptors, HDR environments)
//! - `scene`: the model scene and its flow
//! - `text`: text overlays (DOM in the browser, log output natively)
//! - `tween`: eased value animation
//!

pub mod camera;
pub mod config;
pub mod context;
pub mod countdown;
pub mod data_structures;
pub mod fireworks;
pub mod flow;
pub mod pipelines;
pub mod render;
pub mod resources;
pub mod scene;
pub mod text;
pub mod tween;

// Re-exports commonly used types for convenience in downstream code.
pub use winit::dpi::PhysicalPosition;
pub use winit::event::DeviceEvent;
pub use winit::event::WindowEvent;

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub fn start_scene() -> Result<(), JsValue> {
    let constructor = scene::SceneFlow::constructor::<()>(config::SceneConfig::default());
    flow::run(vec![constructor]).map_err(|e| JsValue::from_str(&format!("{:#}", e)))
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub fn start_fireworks() -> Result<(), JsValue> {
    let constructor =
        fireworks::FireworksFlow::constructor::<()>(config::FireworksConfig::default());
    flow::run(vec![constructor]).map_err(|e| JsValue::from_str(&format!("{:#}", e)))
}
