//! Engine data structures: models, materials, textures, scene graphs and particles.
//!
//! - `channels` is the six-slot PBR texture channel map
//! - `model` contains mesh and material definitions, GPU resources for 3D models
//! - `texture` contains GPU texture wrapper and creation utilities
//! - `instance` holds per-instance transformation data
//! - `scene_graph` enables hierarchical scene organization
//! - `particles` stores firework particles in a slot arena

pub mod channels;
pub mod instance;
pub mod model;
pub mod particles;
pub mod scene_graph;
pub mod texture;
