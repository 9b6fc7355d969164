//! Render pipelines shared by all flows.
//!
//! - `basic`: the instanced PBR model pipeline and the generic pipeline helper
//! - `environment`: HDR image based lighting bound to the model pipeline
//! - `particle`: trail fade and particle sprites for 2D overlays
//! - `post`: the post-processing composer and its screen passes

pub mod basic;
pub mod environment;
pub mod particle;
pub mod post;

/// Pipelines the engine draws with itself. Flows that bring their own
/// pipelines (like the fireworks) draw through `Render::Custom`.
#[derive(Debug)]
pub struct Pipelines {
    pub basic: wgpu::RenderPipeline,
}
