//! Typed property tweens over explicit accessor pairs.

use glam::{Vec2, Vec3, Vec4};

use crate::Ease;

/// Duration used by a tween that was never given one and is not inside a
/// timeline that supplies a default.
pub const DEFAULT_DURATION: f32 = 0.5;

/// Values that can be linearly interpolated.
pub trait Lerp: Copy {
    fn lerp(self, to: Self, t: f32) -> Self;
}

impl Lerp for f32 {
    fn lerp(self, to: Self, t: f32) -> Self {
        self + (to - self) * t
    }
}

impl Lerp for Vec2 {
    fn lerp(self, to: Self, t: f32) -> Self {
        Vec2::lerp(self, to, t)
    }
}

impl Lerp for Vec3 {
    fn lerp(self, to: Self, t: f32) -> Self {
        Vec3::lerp(self, to, t)
    }
}

impl Lerp for Vec4 {
    fn lerp(self, to: Self, t: f32) -> Self {
        Vec4::lerp(self, to, t)
    }
}

type Getter<T, V> = Box<dyn Fn(&T) -> V>;
type Setter<T, V> = Box<dyn Fn(&mut T, V)>;

/// Interpolates one property of a `T` from a start value to `to`.
///
/// The property is reached through a getter/setter pair, so a tween can
/// drive anything the closures can address: a node's scale, a material
/// color, an overlay offset. When no explicit `from` is given the start
/// value is read from the target the first time the tween steps.
pub struct Tween<T, V> {
    label: String,
    get: Getter<T, V>,
    set: Setter<T, V>,
    from: Option<V>,
    to: V,
    duration: Option<f32>,
    easing: Ease,
    start: Option<V>,
    elapsed: f32,
    finished: bool,
}

impl<T, V: Lerp> Tween<T, V> {
    /// Tween from the property's current value to `to`.
    pub fn to(
        label: impl Into<String>,
        get: impl Fn(&T) -> V + 'static,
        set: impl Fn(&mut T, V) + 'static,
        to: V,
    ) -> Self {
        Self {
            label: label.into(),
            get: Box::new(get),
            set: Box::new(set),
            from: None,
            to,
            duration: None,
            easing: Ease::default(),
            start: None,
            elapsed: 0.0,
            finished: false,
        }
    }

    /// Tween between two explicit values.
    pub fn from_to(
        label: impl Into<String>,
        get: impl Fn(&T) -> V + 'static,
        set: impl Fn(&mut T, V) + 'static,
        from: V,
        to: V,
    ) -> Self {
        let mut tween = Self::to(label, get, set, to);
        tween.from = Some(from);
        tween
    }

    /// Set the duration in seconds. Negative values become zero.
    #[must_use]
    pub fn with_duration(mut self, seconds: f32) -> Self {
        self.duration = Some(seconds.max(0.0));
        self
    }

    #[must_use]
    pub fn with_ease(mut self, easing: Ease) -> Self {
        self.easing = easing;
        self
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Effective duration in seconds.
    pub fn duration(&self) -> f32 {
        self.duration.unwrap_or(DEFAULT_DURATION)
    }

    pub fn has_duration(&self) -> bool {
        self.duration.is_some()
    }

    pub(crate) fn set_default_duration(&mut self, seconds: f32) {
        if self.duration.is_none() {
            self.duration = Some(seconds.max(0.0));
        }
    }

    pub fn easing(&self) -> Ease {
        self.easing
    }

    pub fn target_value(&self) -> V {
        self.to
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Progress in `0.0..=1.0` before easing.
    pub fn progress(&self) -> f32 {
        if self.finished {
            return 1.0;
        }
        let duration = self.duration();
        if duration <= 0.0 {
            0.0
        } else {
            (self.elapsed / duration).clamp(0.0, 1.0)
        }
    }

    /// Write the explicit `from` value, if any, without starting the tween.
    pub fn render_from(&self, target: &mut T) {
        if let Some(from) = self.from {
            (self.set)(target, from);
        }
    }

    /// Capture the start value and write it to the target.
    pub fn begin(&mut self, target: &mut T) {
        let start = self.from.unwrap_or_else(|| (self.get)(target));
        (self.set)(target, start);
        self.start = Some(start);
        self.elapsed = 0.0;
        self.finished = false;
    }

    /// Advance by `dt` seconds and write the interpolated value.
    ///
    /// Returns `Some(leftover)` once the end value has been written, where
    /// `leftover` is the part of `dt` not consumed by this tween.
    pub fn step(&mut self, dt: f32, target: &mut T) -> Option<f32> {
        if self.finished {
            return Some(dt.max(0.0));
        }
        let start = match self.start {
            Some(start) => start,
            None => {
                self.begin(target);
                self.start.unwrap_or(self.to)
            }
        };

        let duration = self.duration();
        self.elapsed += dt.max(0.0);
        if self.elapsed >= duration {
            let leftover = self.elapsed - duration;
            self.elapsed = duration;
            self.finished = true;
            (self.set)(target, self.to);
            return Some(leftover);
        }

        let t = self.easing.apply(self.elapsed / duration);
        (self.set)(target, start.lerp(self.to, t));
        None
    }

    /// Point an in-flight (or finished) tween at a new end value.
    ///
    /// The new run starts from the property's current value and restarts
    /// the clock, so repeated retargets never queue.
    pub fn retarget(&mut self, target: &T, to: V) {
        self.start = Some((self.get)(target));
        self.from = None;
        self.to = to;
        self.elapsed = 0.0;
        self.finished = false;
    }
}

impl<T, V> std::fmt::Debug for Tween<T, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tween")
            .field("label", &self.label)
            .field("duration", &self.duration)
            .field("easing", &self.easing)
            .field("elapsed", &self.elapsed)
            .field("finished", &self.finished)
            .finish_non_exhaustive()
    }
}
