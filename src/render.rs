//! Render composition and pipeline batching.
//!
//! This module defines the [`Render`] enum, which flows return every frame to
//! describe what they want drawn into the scene target. Instanced models are
//! batched onto the shared model pipeline; special effects (the fireworks
//! trail and particles) draw themselves through [`Render::Custom`].
//!
//! # Key types
//!
//! - [`Render<'a, 'pass>`] is the primary enum describing render operations
//! - [`Instanced<'a>`] contains data for instanced rendering (model + instance buffer)

use wgpu::RenderPass;

use crate::{context::Context, data_structures::{model::Model, scene_graph::SceneNode}};

/// Data for instanced object rendering: a model and its instance buffer.
#[derive(Clone)]
pub struct Instanced<'a> {
    pub instance: &'a wgpu::Buffer,
    pub model: &'a Model,
    pub amount: usize,
}

/// Specifies how a flow should be rendered.
///
/// # Variants
///
/// - `None` renders nothing
/// - `Default(Instanced)` renders a single instanced model
/// - `Defaults(Vec<Instanced>)` renders a batch of instanced models
/// - `Composed(Vec<Render>)` recursively renders composition of multiple renders
/// - `Custom(...)` invokes a user-defined closure on the scene render pass
///
/// Custom closures run in the order they appear, before the model batch.
pub enum Render<'a, 'pass>
where
    'pass: 'a,
{
    None,
    Default(Instanced<'a>),
    Defaults(Vec<Instanced<'a>>),
    Composed(Vec<Render<'a, 'pass>>),
    Custom(Box<dyn 'a + FnOnce(&Context, &mut wgpu::RenderPass<'pass>)>),
}

impl<'a, 'pass> Render<'a, 'pass> {
    pub(crate) fn set_pipelines(
        self,
        ctx: &Context,
        render_pass: &mut RenderPass<'pass>,
        basics: &mut Vec<Instanced<'a>>,
    ) {
        match self {
            Render::Default(instanced) => basics.push(instanced),
            Render::Defaults(mut vec) => basics.append(&mut vec),
            Render::Composed(renders) => renders
                .into_iter()
                .for_each(|render| render.set_pipelines(ctx, render_pass, basics)),
            Render::Custom(f) => f(ctx, render_pass),
            Render::None => (),
        }
    }
}

impl<'a, 'pass> From<&'a dyn SceneNode> for Render<'a, 'pass> {
    fn from(sn: &'a dyn SceneNode) -> Self {
        Render::Defaults(sn.get_render())
    }
}
