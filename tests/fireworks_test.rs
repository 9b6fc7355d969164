use festive_ngin::{
    config::FireworksConfig,
    countdown::{Countdown, Remaining},
    fireworks::FireworkShow,
};
use rand::{SeedableRng, rngs::StdRng};

fn quiet() -> FireworksConfig {
    FireworksConfig {
        spawn_probability: 0.0,
        ..Default::default()
    }
}

#[test]
fn explode_adds_one_burst_with_shared_colour() {
    let mut rng = StdRng::seed_from_u64(7);
    let mut show = FireworkShow::new(quiet());

    assert_eq!(show.explode(&mut rng, 300.0, 200.0), 80);
    assert_eq!(show.particles().len(), 80);

    let first = show.particles().iter().next().unwrap().color;
    assert!((0.0..360.0).contains(&first.hue));
    assert_eq!((first.saturation, first.lightness), (100.0, 50.0));
    for p in show.particles().iter() {
        assert_eq!(p.color, first);
        assert_eq!((p.x, p.y), (300.0, 200.0));
        assert_eq!(p.life, 100);
        assert!((-5.0..=5.0).contains(&p.vx));
        assert!((-5.0..=5.0).contains(&p.vy));
    }
}

#[test]
fn bursts_get_independent_colours() {
    let mut rng = StdRng::seed_from_u64(1);
    let mut show = FireworkShow::new(quiet());
    show.explode(&mut rng, 0.0, 0.0);
    show.explode(&mut rng, 0.0, 0.0);
    let hues: std::collections::BTreeSet<u32> = show
        .particles()
        .iter()
        .map(|p| p.color.hue.to_bits())
        .collect();
    assert_eq!(hues.len(), 2);
}

#[test]
fn tick_decrements_life_and_drops_expired() {
    let mut rng = StdRng::seed_from_u64(3);
    let mut show = FireworkShow::new(quiet());
    show.explode(&mut rng, 100.0, 100.0);

    show.tick(&mut rng, 800.0, 600.0);
    assert!(show.particles().iter().all(|p| p.life == 99));

    for _ in 0..98 {
        show.tick(&mut rng, 800.0, 600.0);
    }
    assert_eq!(show.particles().len(), 80);
    assert!(show.particles().iter().all(|p| p.life == 1));

    show.tick(&mut rng, 800.0, 600.0);
    assert!(show.particles().is_empty());
    // Particles are still drawn in the tick that expires them.
    assert_eq!(show.drawn().len(), 80);

    show.tick(&mut rng, 800.0, 600.0);
    assert!(show.drawn().is_empty());
}

#[test]
fn tick_never_keeps_dead_particles() {
    let mut rng = StdRng::seed_from_u64(11);
    let mut show = FireworkShow::new(FireworksConfig {
        spawn_probability: 0.5,
        lifetime: 3,
        ..Default::default()
    });
    for _ in 0..200 {
        show.tick(&mut rng, 1024.0, 768.0);
        assert!(show.particles().iter().all(|p| p.life > 0));
    }
}

#[test]
fn spawns_in_the_upper_half_away_from_the_edges() {
    let mut rng = StdRng::seed_from_u64(5);
    let mut show = FireworkShow::new(FireworksConfig {
        spawn_probability: 1.0,
        max_speed: 0.0,
        gravity: 0.0,
        ..Default::default()
    });
    show.tick(&mut rng, 1000.0, 800.0);
    assert_eq!(show.particles().len(), 80);
    for p in show.particles().iter() {
        assert!((100.0..=900.0).contains(&p.x), "x = {}", p.x);
        assert!((100.0..=400.0).contains(&p.y), "y = {}", p.y);
    }
}

#[test]
fn tiny_canvas_collapses_spawn_range() {
    let mut rng = StdRng::seed_from_u64(9);
    let mut show = FireworkShow::new(FireworksConfig {
        spawn_probability: 1.0,
        max_speed: 0.0,
        gravity: 0.0,
        ..Default::default()
    });
    show.tick(&mut rng, 50.0, 40.0);
    for p in show.particles().iter() {
        assert_eq!((p.x, p.y), (100.0, 100.0));
    }
}

#[test]
fn capped_show_drops_overflow() {
    let mut rng = StdRng::seed_from_u64(2);
    let mut show = FireworkShow::new(FireworksConfig {
        max_particles: Some(100),
        ..quiet()
    });
    assert_eq!(show.explode(&mut rng, 0.0, 0.0), 80);
    assert_eq!(show.explode(&mut rng, 0.0, 0.0), 20);
    assert_eq!(show.particles().len(), 100);
}

#[test]
fn same_seed_same_show() {
    let run = |seed| {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut show = FireworkShow::new(FireworksConfig {
            spawn_probability: 0.3,
            ..Default::default()
        });
        for _ in 0..50 {
            show.tick(&mut rng, 640.0, 480.0);
        }
        show.particles().iter().cloned().collect::<Vec<_>>()
    };
    assert_eq!(run(42), run(42));
}

#[test]
fn countdown_tick_is_quiet_before_the_boundary() {
    let mut rng = StdRng::seed_from_u64(4);
    let mut show = FireworkShow::new(quiet());
    let mut countdown = Countdown::new(2026, 10_000);

    let remaining = show.countdown_tick(&mut rng, &mut countdown, 5_000, 800.0, 600.0);
    assert_eq!(
        remaining,
        Remaining::Left {
            hours: 0,
            minutes: 0,
            seconds: 5
        }
    );
    assert!(show.particles().is_empty());
}

#[test]
fn every_countdown_tick_after_arrival_bursts_at_the_centre() {
    let mut rng = StdRng::seed_from_u64(8);
    let mut show = FireworkShow::new(quiet());
    let mut countdown = Countdown::new(2026, 10_000);

    for (i, now) in [10_000, 11_000, 12_000].into_iter().enumerate() {
        let remaining = show.countdown_tick(&mut rng, &mut countdown, now, 800.0, 600.0);
        assert_eq!(remaining, Remaining::Arrived);
        assert_eq!(show.particles().len(), 80 * (i + 1));
    }
    assert!(show.particles().iter().all(|p| (p.x, p.y) == (400.0, 300.0)));

    // The clock going back does not stop the celebration.
    show.countdown_tick(&mut rng, &mut countdown, 0, 800.0, 600.0);
    assert_eq!(show.particles().len(), 320);
}
