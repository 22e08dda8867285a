#![forbid(unsafe_code)]

//! Easing and tween primitives.
//!
//! A [`Tween`] interpolates any [`Lerp`] value between a start and an end
//! over a fixed duration. It is clock-agnostic: callers advance it with
//! [`Tween::tick`] and read [`Tween::current`]. A host that owns its own
//! tween scheduler can instead read `start`/`end`/`duration` off a tween and
//! hand them over.

use std::time::Duration;

// ---------------------------------------------------------------------------
// Easing functions
// ---------------------------------------------------------------------------

/// Easing function signature: maps `t` in [0, 1] to output in [0, 1].
pub type EasingFn = fn(f64) -> f64;

/// Identity easing (constant velocity).
#[inline]
pub fn linear(t: f64) -> f64 {
    t.clamp(0.0, 1.0)
}

/// Cubic ease-in-out. The default easing for tree transitions.
#[inline]
pub fn ease_in_out_cubic(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    if t < 0.5 {
        4.0 * t * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
    }
}

// ---------------------------------------------------------------------------
// Interpolation
// ---------------------------------------------------------------------------

/// Values that can be linearly interpolated.
pub trait Lerp: Copy {
    /// Interpolate from `self` toward `to`; `t = 0` is `self`, `t = 1` is `to`.
    fn lerp(self, to: Self, t: f64) -> Self;
}

impl Lerp for f64 {
    #[inline]
    fn lerp(self, to: Self, t: f64) -> Self {
        // Exact at both ends so settled values compare equal to their targets.
        if t <= 0.0 {
            self
        } else if t >= 1.0 {
            to
        } else {
            self + (to - self) * t
        }
    }
}

impl Lerp for crate::geometry::Point {
    #[inline]
    fn lerp(self, to: Self, t: f64) -> Self {
        Self::new(self.x.lerp(to.x, t), self.y.lerp(to.y, t))
    }
}

fn clamp_duration(duration: Duration) -> Duration {
    if duration.is_zero() {
        Duration::from_nanos(1)
    } else {
        duration
    }
}

// ---------------------------------------------------------------------------
// Tween
// ---------------------------------------------------------------------------

/// Interpolates a value from `from` to `to` over a duration.
///
/// Elapsed time is tracked as a [`Duration`] so repeated small ticks do not
/// accumulate floating-point drift.
#[derive(Debug, Clone, Copy)]
pub struct Tween<T> {
    from: T,
    to: T,
    elapsed: Duration,
    duration: Duration,
    easing: EasingFn,
}

impl<T: Lerp> Tween<T> {
    /// Create a tween with [`ease_in_out_cubic`] easing.
    pub fn new(from: T, to: T, duration: Duration) -> Self {
        Self {
            from,
            to,
            elapsed: Duration::ZERO,
            duration: clamp_duration(duration),
            easing: ease_in_out_cubic,
        }
    }

    /// Set the easing function (builder).
    #[must_use]
    pub fn easing(mut self, easing: EasingFn) -> Self {
        self.easing = easing;
        self
    }

    pub fn start(&self) -> T {
        self.from
    }

    pub fn end(&self) -> T {
        self.to
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Advance by `dt`.
    pub fn tick(&mut self, dt: Duration) {
        self.elapsed = self.elapsed.saturating_add(dt);
    }

    pub fn is_complete(&self) -> bool {
        self.elapsed >= self.duration
    }

    /// Linear progress before easing, in [0.0, 1.0].
    fn raw_progress(&self) -> f64 {
        (self.elapsed.as_secs_f64() / self.duration.as_secs_f64()).clamp(0.0, 1.0)
    }

    /// The interpolated value at the current elapsed time.
    pub fn current(&self) -> T {
        if self.is_complete() {
            return self.to;
        }
        self.from.lerp(self.to, (self.easing)(self.raw_progress()))
    }

    /// A fresh tween that starts at the current sampled value and heads for
    /// `to`, keeping this tween's easing.
    #[must_use]
    pub fn retarget(&self, to: T, duration: Duration) -> Self {
        Self::new(self.current(), to, duration).easing(self.easing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Point;

    const MS_750: Duration = Duration::from_millis(750);

    #[test]
    fn easings_hit_endpoints() {
        for f in [linear as EasingFn, ease_in_out_cubic] {
            assert_eq!(f(0.0), 0.0);
            assert!((f(1.0) - 1.0).abs() < 1e-12);
            assert_eq!(f(-3.0), 0.0, "input is clamped below");
        }
    }

    #[test]
    fn ease_in_out_cubic_is_symmetric() {
        let a = ease_in_out_cubic(0.25);
        let b = ease_in_out_cubic(0.75);
        assert!((a + b - 1.0).abs() < 1e-12);
    }

    #[test]
    fn tween_starts_at_from_and_ends_at_to() {
        let mut t = Tween::new(10.0, 20.0, MS_750);
        assert_eq!(t.current(), 10.0);
        t.tick(MS_750);
        assert!(t.is_complete());
        assert_eq!(t.current(), 20.0);
    }

    #[test]
    fn tween_linear_midpoint() {
        let mut t = Tween::new(Point::new(0.0, 0.0), Point::new(100.0, 50.0), MS_750)
            .easing(linear);
        t.tick(Duration::from_millis(375));
        let p = t.current();
        assert!((p.x - 50.0).abs() < 1e-9);
        assert!((p.y - 25.0).abs() < 1e-9);
    }

    #[test]
    fn tween_zero_duration_completes_on_first_tick() {
        let mut t = Tween::new(0.0, 1.0, Duration::ZERO);
        assert!(!t.is_complete());
        t.tick(Duration::from_nanos(1));
        assert!(t.is_complete());
    }

    #[test]
    fn retarget_starts_from_current_sample() {
        let mut t = Tween::new(0.0, 100.0, MS_750).easing(linear);
        t.tick(Duration::from_millis(375));
        let mut r = t.retarget(0.0, MS_750);
        assert!((r.start() - 50.0).abs() < 1e-9);
        assert_eq!(r.end(), 0.0);
        assert!(!r.is_complete());
        // Easing carries over: linear half-way from 50 to 0.
        r.tick(Duration::from_millis(375));
        assert!((r.current() - 25.0).abs() < 1e-9);
    }
}
