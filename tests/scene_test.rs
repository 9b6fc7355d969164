use std::f32::consts::PI;

use festive_ngin::{
    camera::Projection,
    config::{FireworksConfig, SceneConfig},
    scene::rotation_target,
};

fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < 1e-6
}

#[test]
fn centre_of_the_window_means_no_rotation() {
    assert_eq!(rotation_target((400.0, 300.0), [800, 600], 0.5), [0.0, 0.0]);
}

#[test]
fn edges_turn_a_quarter_of_a_half_turn() {
    let [pitch, yaw] = rotation_target((800.0, 0.0), [800, 600], 0.5);
    assert!(approx(yaw, PI * 0.25));
    assert!(approx(pitch, -PI * 0.25));

    let [pitch, yaw] = rotation_target((0.0, 600.0), [800, 600], 0.5);
    assert!(approx(yaw, -PI * 0.25));
    assert!(approx(pitch, PI * 0.25));
}

#[test]
fn zero_sized_window_does_not_divide_by_zero() {
    let [pitch, yaw] = rotation_target((0.0, 0.0), [0, 0], 0.5);
    assert!(pitch.is_finite() && yaw.is_finite());
}

#[test]
fn resize_sets_aspect_and_is_idempotent() {
    let mut projection = Projection::new(800, 600, cgmath::Deg(40.0), 0.1, 200.0);
    assert!(approx(projection.aspect(), 800.0 / 600.0));

    projection.resize(1920, 1080);
    let once = projection.calc_matrix();
    projection.resize(1920, 1080);
    assert_eq!(projection.calc_matrix(), once);
    assert!(approx(projection.aspect(), 16.0 / 9.0));

    projection.resize(0, 1080);
    assert!(approx(projection.aspect(), 16.0 / 9.0));
}

#[test]
fn defaults_match_the_pages() {
    let scene = SceneConfig::default();
    assert_eq!(scene.model_path, "DamagedHelmet.glb");
    assert_eq!(scene.descriptor_path, "7.json");
    assert_eq!(scene.model_scale, 10.0);
    assert_eq!(scene.camera_distance, 40.0);
    assert_eq!(scene.rgb_shift_amount, 0.002);

    let fireworks = FireworksConfig::default();
    assert_eq!(fireworks.burst_size, 80);
    assert_eq!(fireworks.lifetime, 100);
    assert_eq!(fireworks.spawn_probability, 0.05);
    assert_eq!(fireworks.fade_alpha, 0.25);
    assert_eq!(fireworks.max_particles, None);
    assert_eq!(fireworks.greeting, "🎉 Happy New Year 🎉");
}
