use festive_ngin::tween::{Ease, Tween, TweenSlot};
use instant::Duration;

const DURATION: Duration = Duration::from_millis(600);

#[test]
fn power3_out_eases() {
    assert_eq!(Ease::Power3Out.apply(0.0), 0.0);
    assert_eq!(Ease::Power3Out.apply(0.5), 0.875);
    assert_eq!(Ease::Power3Out.apply(1.0), 1.0);
    assert_eq!(Ease::Power3Out.apply(2.0), 1.0);
    assert_eq!(Ease::Linear.apply(0.25), 0.25);
}

#[test]
fn tween_reaches_target_exactly_at_the_end() {
    let mut tween = Tween::new(0.0_f32, 2.0, DURATION, Ease::Power3Out);
    tween.advance(Duration::from_millis(300));
    assert!(!tween.is_finished());
    assert_eq!(tween.value(), 1.75);
    assert_eq!(tween.advance(Duration::from_millis(300)), 2.0);
    assert!(tween.is_finished());
}

#[test]
fn slot_settles_and_stops() {
    let mut slot = TweenSlot::new([0.0_f32, 0.0]);
    slot.start([1.0, -1.0], DURATION, Ease::Power3Out);
    assert!(slot.is_animating());
    for _ in 0..10 {
        slot.update(Duration::from_millis(100));
    }
    assert_eq!(slot.value(), [1.0, -1.0]);
    assert!(!slot.is_animating());
}

#[test]
fn restarting_continues_from_current_value() {
    let mut slot = TweenSlot::new(0.0_f32);
    slot.start(1.0, DURATION, Ease::Linear);
    slot.update(Duration::from_millis(300));
    assert_eq!(slot.value(), 0.5);

    slot.start(-1.0, DURATION, Ease::Linear);
    assert_eq!(slot.value(), 0.5);
    slot.update(Duration::from_millis(300));
    assert_eq!(slot.value(), -0.25);
    slot.update(Duration::from_millis(300));
    assert_eq!(slot.value(), -1.0);
}

#[test]
fn set_cancels_running_tween() {
    let mut slot = TweenSlot::new(0.0_f32);
    slot.start(1.0, DURATION, Ease::Power3Out);
    slot.set(3.0);
    assert!(!slot.is_animating());
    assert_eq!(slot.update(Duration::from_millis(100)), 3.0);
}
