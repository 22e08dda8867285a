#![forbid(unsafe_code)]

//! Transition drivers.
//!
//! The reconciler decides *what* moves; a [`TransitionDriver`] decides
//! *how*. The core only hands over start and end values, a duration, and an
//! easing. [`FrameDriver`] is the built-in implementation: it keeps one
//! [`Tween`] per element and samples it against a host-supplied clock.
//! Hosts with their own tween scheduler (CSS transitions, a game loop)
//! implement the trait instead.
//!
//! # Invariants
//!
//! 1. An element that receives a new transition while one is in flight is
//!    retargeted: the new tween starts from the value sampled at `now`, so
//!    the element never jumps.
//! 2. A new transition or immediate set cancels any pending removal.
//! 3. Sampling is pure: `sample(key, now)` never mutates state.

use std::hash::Hash;
use std::time::Duration;

use ftree_core::animation::{EasingFn, Lerp, Tween};
use ftree_core::geometry::Point;
use rustc_hash::FxHashMap;
use tracing::trace;

/// Visual state of one node: where it is drawn and how opaque.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ElementVisual {
    pub position: Point,
    pub opacity: f64,
}

impl ElementVisual {
    pub const fn new(position: Point, opacity: f64) -> Self {
        Self { position, opacity }
    }

    /// Fully opaque at `position`.
    pub const fn shown(position: Point) -> Self {
        Self::new(position, 1.0)
    }

    /// Fully transparent at `position`.
    pub const fn hidden(position: Point) -> Self {
        Self::new(position, 0.0)
    }
}

impl Lerp for ElementVisual {
    fn lerp(self, to: Self, t: f64) -> Self {
        Self {
            position: self.position.lerp(to.position, t),
            opacity: self.opacity.lerp(to.opacity, t),
        }
    }
}

/// Visual state of one link: both endpoints and opacity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinkVisual {
    pub source: Point,
    pub target: Point,
    pub opacity: f64,
}

impl LinkVisual {
    pub const fn new(source: Point, target: Point, opacity: f64) -> Self {
        Self {
            source,
            target,
            opacity,
        }
    }

    /// A zero-length, transparent link at `point`.
    pub const fn collapsed(point: Point) -> Self {
        Self::new(point, point, 0.0)
    }
}

impl Lerp for LinkVisual {
    fn lerp(self, to: Self, t: f64) -> Self {
        Self {
            source: self.source.lerp(to.source, t),
            target: self.target.lerp(to.target, t),
            opacity: self.opacity.lerp(to.opacity, t),
        }
    }
}

/// Receives transitions for keyed elements.
///
/// `now` and `at` are readings of the host's monotonic clock.
pub trait TransitionDriver<K, V> {
    /// Move `key` from `from` to `to` over `duration`.
    ///
    /// If `key` is already known, implementations should start from its
    /// current value instead of `from`.
    fn animate(&mut self, key: K, from: V, to: V, duration: Duration, easing: EasingFn, now: Duration);

    /// Put `key` at `value` with no transition.
    fn set_immediate(&mut self, key: K, value: V);

    /// Drop `key` now.
    fn remove(&mut self, key: &K);

    /// Drop `key` once the clock reaches `at`.
    fn remove_after(&mut self, key: K, at: Duration);

    fn contains(&self, key: &K) -> bool;
}

#[derive(Debug, Clone, Copy)]
enum Track<V> {
    Settled(V),
    Moving { tween: Tween<V>, started: Duration },
}

#[derive(Debug, Clone, Copy)]
struct Entry<V> {
    track: Track<V>,
    remove_at: Option<Duration>,
}

impl<V: Lerp> Entry<V> {
    fn sample(&self, now: Duration) -> V {
        match self.track {
            Track::Settled(v) => v,
            Track::Moving { mut tween, started } => {
                tween.tick(now.saturating_sub(started));
                tween.current()
            }
        }
    }

    fn is_moving(&self, now: Duration) -> bool {
        match self.track {
            Track::Settled(_) => false,
            Track::Moving { tween, started } => now.saturating_sub(started) < tween.duration(),
        }
    }
}

/// Built-in driver stepping [`Tween`]s against a host clock.
#[derive(Debug, Clone)]
pub struct FrameDriver<K, V> {
    entries: FxHashMap<K, Entry<V>>,
}

impl<K, V> Default for FrameDriver<K, V> {
    fn default() -> Self {
        Self {
            entries: FxHashMap::default(),
        }
    }
}

impl<K: Eq + Hash + Copy, V: Lerp> FrameDriver<K, V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Value of `key` at `now`.
    pub fn sample(&self, key: &K, now: Duration) -> Option<V> {
        self.entries.get(key).map(|e| e.sample(now))
    }

    /// Every element with its value at `now`, in no particular order.
    pub fn iter(&self, now: Duration) -> impl Iterator<Item = (K, V)> + '_ {
        self.entries.iter().map(move |(k, e)| (*k, e.sample(now)))
    }

    /// True while at least one tween has not reached its end.
    pub fn is_animating(&self, now: Duration) -> bool {
        self.entries.values().any(|e| e.is_moving(now))
    }

    /// True if `key` is scheduled for removal.
    pub fn is_leaving(&self, key: &K) -> bool {
        self.entries.get(key).is_some_and(|e| e.remove_at.is_some())
    }

    /// Settle finished tweens and drop elements whose removal time has
    /// passed. Returns the number of elements dropped.
    pub fn tick(&mut self, now: Duration) -> usize {
        let before = self.entries.len();
        self.entries
            .retain(|_, e| e.remove_at.is_none_or(|at| now < at));
        for entry in self.entries.values_mut() {
            if let Track::Moving { tween, .. } = entry.track
                && !entry.is_moving(now)
            {
                entry.track = Track::Settled(tween.end());
            }
        }
        before - self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl<K: Eq + Hash + Copy, V: Lerp> TransitionDriver<K, V> for FrameDriver<K, V> {
    fn animate(&mut self, key: K, from: V, to: V, duration: Duration, easing: EasingFn, now: Duration) {
        let tween = match self.entries.get(&key).map(|entry| entry.track) {
            Some(Track::Moving { mut tween, started }) => {
                tween.tick(now.saturating_sub(started));
                if !tween.is_complete() {
                    trace!("retargeting in-flight transition");
                }
                tween.retarget(to, duration)
            }
            Some(Track::Settled(value)) => Tween::new(value, to, duration),
            None => Tween::new(from, to, duration),
        }
        .easing(easing);
        self.entries.insert(
            key,
            Entry {
                track: Track::Moving {
                    tween,
                    started: now,
                },
                remove_at: None,
            },
        );
    }

    fn set_immediate(&mut self, key: K, value: V) {
        self.entries.insert(
            key,
            Entry {
                track: Track::Settled(value),
                remove_at: None,
            },
        );
    }

    fn remove(&mut self, key: &K) {
        self.entries.remove(key);
    }

    fn remove_after(&mut self, key: K, at: Duration) {
        if let Some(entry) = self.entries.get_mut(&key) {
            entry.remove_at = Some(at);
        }
    }

    fn contains(&self, key: &K) -> bool {
        self.entries.contains_key(key)
    }
}
