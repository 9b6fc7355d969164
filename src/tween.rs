//! Eased, interruptible value animation.
//!
//! A [`TweenSlot`] holds at most one running [`Tween`]. Starting a new tween on
//! a slot replaces the running one and continues from wherever the value
//! currently is, so rapid retargeting (e.g. mouse movement) never queues up
//! animations or makes the value jump.

use instant::Duration;

/// Easing curves. `Power3Out` decelerates: fast start, soft landing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Ease {
    Linear,
    Power3Out,
}

impl Ease {
    /// Map linear progress `t` in [0, 1] to eased progress.
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Ease::Linear => t,
            Ease::Power3Out => 1.0 - (1.0 - t).powi(3),
        }
    }
}

/// Values that can be interpolated component-wise.
pub trait Lerp: Copy {
    fn lerp(self, to: Self, t: f32) -> Self;
}

impl Lerp for f32 {
    fn lerp(self, to: Self, t: f32) -> Self {
        self + (to - self) * t
    }
}

impl<const N: usize> Lerp for [f32; N] {
    fn lerp(self, to: Self, t: f32) -> Self {
        let mut out = self;
        out.iter_mut()
            .zip(to)
            .for_each(|(from, to)| *from = from.lerp(to, t));
        out
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Tween<T: Lerp> {
    from: T,
    to: T,
    duration: Duration,
    elapsed: Duration,
    ease: Ease,
}

impl<T: Lerp> Tween<T> {
    pub fn new(from: T, to: T, duration: Duration, ease: Ease) -> Self {
        Self {
            from,
            to,
            duration,
            elapsed: Duration::ZERO,
            ease,
        }
    }

    pub fn is_finished(&self) -> bool {
        self.elapsed >= self.duration
    }

    pub fn value(&self) -> T {
        if self.duration.is_zero() {
            return self.to;
        }
        let t = self.elapsed.as_secs_f32() / self.duration.as_secs_f32();
        if t >= 1.0 {
            return self.to;
        }
        self.from.lerp(self.to, self.ease.apply(t))
    }

    pub fn advance(&mut self, dt: Duration) -> T {
        self.elapsed = (self.elapsed + dt).min(self.duration);
        self.value()
    }
}

/// The current animation of one target property.
#[derive(Clone, Debug)]
pub struct TweenSlot<T: Lerp> {
    value: T,
    current: Option<Tween<T>>,
}

impl<T: Lerp> TweenSlot<T> {
    pub fn new(value: T) -> Self {
        Self {
            value,
            current: None,
        }
    }

    pub fn value(&self) -> T {
        self.value
    }

    pub fn is_animating(&self) -> bool {
        self.current.is_some()
    }

    /// Animate towards `to`, cancelling whatever animation is in flight.
    pub fn start(&mut self, to: T, duration: Duration, ease: Ease) {
        self.current = Some(Tween::new(self.value, to, duration, ease));
    }

    /// Jump to `value` and cancel the running animation.
    pub fn set(&mut self, value: T) {
        self.value = value;
        self.current = None;
    }

    /// Step the running animation and return the new value.
    pub fn update(&mut self, dt: Duration) -> T {
        if let Some(tween) = &mut self.current {
            self.value = tween.advance(dt);
            if tween.is_finished() {
                self.current = None;
            }
        }
        self.value
    }
}
