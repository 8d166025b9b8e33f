//! Scene lights: one kind that falls off with distance, one that doesn't.
//!
//! Light placement lives on the owning node's transform.

use glam::Vec3;

use crate::Color;

/// Omnidirectional light with a finite range.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointLight {
    pub color: Color,
    pub intensity: f32,
    /// Range of effect. Zero means unlimited.
    pub distance: f32,
    /// Falloff exponent within the range. 1.0 fades linearly to zero.
    pub decay: f32,
}

impl PointLight {
    pub const DEFAULT_DECAY: f32 = 1.0;

    pub fn new(color: Color, intensity: f32, distance: f32) -> Self {
        Self {
            color,
            intensity,
            distance,
            decay: Self::DEFAULT_DECAY,
        }
    }

    #[must_use]
    pub fn with_decay(mut self, decay: f32) -> Self {
        self.decay = decay.max(0.0);
        self
    }

    /// Attenuation factor at `d` world units from the light.
    pub fn attenuation_at(&self, d: f32) -> f32 {
        range_falloff(d, self.distance, self.decay)
    }
}

/// `(1 - d / range)^decay`, clamped to `[0, 1]`. A range of zero or less
/// never attenuates.
pub fn range_falloff(distance: f32, range: f32, decay: f32) -> f32 {
    if range <= 0.0 {
        return 1.0;
    }
    (1.0 - distance / range).clamp(0.0, 1.0).powf(decay)
}

/// Uniform light applied equally to every surface.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AmbientLight {
    pub color: Color,
    pub intensity: f32,
}

impl AmbientLight {
    pub fn new(color: Color, intensity: f32) -> Self {
        Self { color, intensity }
    }

    /// Linear RGB premultiplied by intensity.
    pub fn radiance(&self) -> Vec3 {
        Vec3::from(self.color.to_linear()) * self.intensity
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Light {
    Point(PointLight),
    Ambient(AmbientLight),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_intensity_at_source() {
        assert!((range_falloff(0.0, 100.0, 1.0) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_zero_at_and_beyond_range() {
        assert_eq!(range_falloff(100.0, 100.0, 1.0), 0.0);
        assert_eq!(range_falloff(250.0, 100.0, 2.0), 0.0);
        let light = PointLight::new(Color::WHITE, 1.5, 100.0);
        assert_eq!(light.attenuation_at(120.0), 0.0);
    }

    #[test]
    fn test_linear_decay_at_moon_distance() {
        let light = PointLight::new(Color::from_hex(0xffecaf), 1.5, 100.0);
        // The lit face of the moon sits about 11.4 units from the light.
        assert!((light.attenuation_at(11.4) - 0.886).abs() < 1e-3);
    }

    #[test]
    fn test_falloff_is_monotonic() {
        let mut prev = range_falloff(0.0, 100.0, 2.0);
        for d in 1..100 {
            let a = range_falloff(d as f32, 100.0, 2.0);
            assert!(a < prev);
            prev = a;
        }
    }

    #[test]
    fn test_unlimited_range_never_attenuates() {
        let light = PointLight::new(Color::WHITE, 1.0, 0.0);
        assert_eq!(light.attenuation_at(10_000.0), 1.0);
    }

    #[test]
    fn test_negative_decay_is_clamped() {
        let light = PointLight::new(Color::WHITE, 1.0, 10.0).with_decay(-3.0);
        assert_eq!(light.decay, 0.0);
        assert_eq!(light.attenuation_at(5.0), 1.0);
    }

    #[test]
    fn test_ambient_radiance() {
        let ambient = AmbientLight::new(Color::WHITE, 0.1);
        assert!((ambient.radiance() - Vec3::splat(0.1)).length() < 1e-6);
        let dim = AmbientLight::new(Color::new(0.5, 0.5, 0.5), 1.0).radiance();
        assert!((dim.x - 0.214).abs() < 1e-3);
    }
}
