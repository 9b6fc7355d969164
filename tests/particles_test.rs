use festive_ngin::{
    data_structures::particles::{Hsl, Particle, ParticleArena},
    pipelines::particle::linear_fade_alpha,
};

fn particle(life: i32) -> Particle {
    Particle::new(0.0, 0.0, 1.0, -2.0, life, Hsl::new(120.0, 100.0, 50.0))
}

#[test]
fn update_applies_gravity_before_moving() {
    let mut p = particle(100);
    assert!(p.update(0.05));
    assert_eq!(p.vy, -1.95);
    assert_eq!(p.x, 1.0);
    assert_eq!(p.y, -1.95);
    assert_eq!(p.life, 99);
}

#[test]
fn update_reports_expiry_at_zero_life() {
    let mut p = particle(1);
    assert!(!p.update(0.05));
    assert_eq!(p.life, 0);
}

#[test]
fn hsl_matches_css_primaries() {
    assert_eq!(Hsl::new(0.0, 100.0, 50.0).to_rgba(), [1.0, 0.0, 0.0, 1.0]);
    assert_eq!(Hsl::new(120.0, 100.0, 50.0).to_rgba(), [0.0, 1.0, 0.0, 1.0]);
    assert_eq!(Hsl::new(240.0, 100.0, 50.0).to_rgba(), [0.0, 0.0, 1.0, 1.0]);
    assert_eq!(Hsl::new(360.0, 100.0, 50.0).to_rgba(), [1.0, 0.0, 0.0, 1.0]);
    assert_eq!(Hsl::new(42.0, 100.0, 50.0).to_string(), "hsl(42, 100%, 50%)");
}

#[test]
fn freed_slots_are_reused_before_growing() {
    let mut arena = ParticleArena::new();
    let a = arena.insert(particle(1)).unwrap();
    let b = arena.insert(particle(1)).unwrap();
    let c = arena.insert(particle(1)).unwrap();
    assert_eq!((a, b, c), (0, 1, 2));

    assert!(arena.remove(b).is_some());
    assert!(arena.remove(b).is_none());
    assert_eq!(arena.len(), 2);

    assert_eq!(arena.insert(particle(5)), Some(b));
    assert_eq!(arena.slot_count(), 3);
    assert_eq!(arena.get(b).map(|p| p.life), Some(5));
    assert_eq!(arena.insert(particle(5)), Some(3));
}

#[test]
fn retain_visits_every_particle_once() {
    let mut arena = ParticleArena::new();
    for life in [1, 3, 1, 1, 3] {
        arena.insert(particle(life));
    }
    let mut visited = 0;
    arena.retain_mut(|p| {
        visited += 1;
        p.update(0.0)
    });
    assert_eq!(visited, 5);
    assert_eq!(arena.len(), 2);
    assert!(arena.iter().all(|p| p.life == 2));

    // Adjacent removals must not shadow each other.
    arena.retain_mut(|_| false);
    assert!(arena.is_empty());
    assert_eq!(arena.iter().count(), 0);
}

#[test]
fn bounded_arena_refuses_inserts_at_cap() {
    let mut arena = ParticleArena::bounded(2);
    assert!(arena.insert(particle(1)).is_some());
    assert!(arena.insert(particle(1)).is_some());
    assert!(arena.insert(particle(1)).is_none());
    arena.remove(0);
    assert_eq!(arena.insert(particle(1)), Some(0));
}

#[test]
fn clear_forgets_all_slots() {
    let mut arena = ParticleArena::with_capacity(8);
    arena.insert(particle(1));
    arena.insert(particle(1));
    arena.remove(0);
    arena.clear();
    assert!(arena.is_empty());
    assert_eq!(arena.slot_count(), 0);
    assert_eq!(arena.insert(particle(1)), Some(0));
}

#[test]
fn fade_keeps_the_canvas_share_of_encoded_brightness() {
    assert_eq!(linear_fade_alpha(0.0), 0.0);
    assert_eq!(linear_fade_alpha(1.0), 1.0);

    let alpha = linear_fade_alpha(0.25);
    assert!((alpha - 0.4986).abs() < 1e-3, "alpha = {}", alpha);
    // A linear value v is encoded as roughly v^(1/2.4).
    let kept_encoded = (1.0 - alpha).powf(1.0 / 2.4);
    assert!((kept_encoded - 0.75).abs() < 1e-4, "kept = {}", kept_encoded);
}
