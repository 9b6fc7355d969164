//! Tunables of the two programs.
//!
//! There is no configuration file. The binaries and the wasm entry points use
//! the `Default` values; embedders and tests can override single fields.

use instant::Duration;

#[derive(Clone, Debug)]
pub struct SceneConfig {
    /// glTF binary relative to the asset root.
    pub model_path: String,
    /// Texture descriptor relative to the asset root.
    pub descriptor_path: String,
    /// Radiance HDR used as ambient lighting and reflection source.
    pub environment_url: String,
    pub model_scale: f32,
    pub camera_distance: f32,
    pub fovy_degrees: f32,
    pub znear: f32,
    pub zfar: f32,
    /// UV offset of the red and blue channels in the RGB shift pass.
    pub rgb_shift_amount: f32,
    /// Fraction of a half-turn the model rotates at the window edges.
    pub rotation_range: f32,
    pub tween_duration: Duration,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            model_path: "DamagedHelmet.glb".to_string(),
            descriptor_path: "7.json".to_string(),
            environment_url:
                "https://dl.polyhaven.org/file/ph-assets/HDRIs/hdr/1k/pond_bridge_night_1k.hdr"
                    .to_string(),
            model_scale: 10.0,
            camera_distance: 40.0,
            fovy_degrees: 40.0,
            znear: 0.1,
            zfar: 200.0,
            rgb_shift_amount: 0.002,
            rotation_range: 0.5,
            tween_duration: Duration::from_millis(600),
        }
    }
}

#[derive(Clone, Debug)]
pub struct FireworksConfig {
    /// Chance per frame that a new burst is spawned.
    pub spawn_probability: f64,
    pub burst_size: usize,
    pub lifetime: i32,
    pub gravity: f32,
    /// Velocity components are sampled from `[-max_speed, max_speed]`.
    pub max_speed: f32,
    /// Bursts keep this distance (in pixels) from the left, right and top edges.
    pub margin: f32,
    pub particle_radius: f32,
    /// Opacity of the black layer painted over the previous frame.
    pub fade_alpha: f32,
    /// Upper bound on live particles. `None` keeps growth unbounded.
    pub max_particles: Option<usize>,
    pub greeting: String,
    pub typing_interval: Duration,
    pub countdown_interval: Duration,
}

impl Default for FireworksConfig {
    fn default() -> Self {
        Self {
            spawn_probability: 0.05,
            burst_size: 80,
            lifetime: 100,
            gravity: 0.05,
            max_speed: 5.0,
            margin: 100.0,
            particle_radius: 2.0,
            fade_alpha: 0.25,
            max_particles: None,
            greeting: "🎉 Happy New Year 🎉".to_string(),
            typing_interval: Duration::from_millis(120),
            countdown_interval: Duration::from_millis(1000),
        }
    }
}
