//! RGB colors as used by materials and lights.

use glam::Vec3;

/// An RGB color with channels in `0.0..=1.0`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Default for Color {
    fn default() -> Self {
        Self::WHITE
    }
}

impl Color {
    pub const WHITE: Self = Self::new(1.0, 1.0, 1.0);
    pub const BLACK: Self = Self::new(0.0, 0.0, 0.0);

    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Build from a packed `0xRRGGBB` value.
    pub fn from_hex(hex: u32) -> Self {
        Self::from_rgb8(
            ((hex >> 16) & 0xff) as u8,
            ((hex >> 8) & 0xff) as u8,
            (hex & 0xff) as u8,
        )
    }

    /// Build from 8-bit channels, each mapped to `channel / 255`.
    pub fn from_rgb8(r: u8, g: u8, b: u8) -> Self {
        Self::new(r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0)
    }

    /// Nearest 8-bit channels, clamped.
    pub fn to_rgb8(self) -> [u8; 3] {
        let q = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        [q(self.r), q(self.g), q(self.b)]
    }

    pub fn to_hex(self) -> u32 {
        let [r, g, b] = self.to_rgb8();
        (r as u32) << 16 | (g as u32) << 8 | b as u32
    }

    pub fn to_vec3(self) -> Vec3 {
        Vec3::new(self.r, self.g, self.b)
    }

    pub fn from_vec3(v: Vec3) -> Self {
        Self::new(v.x, v.y, v.z)
    }

    /// Convert sRGB-encoded channels to linear light for shading.
    pub fn to_linear(self) -> [f32; 3] {
        fn decode(c: f32) -> f32 {
            let c = c.clamp(0.0, 1.0);
            if c <= 0.04045 {
                c / 12.92
            } else {
                ((c + 0.055) / 1.055).powf(2.4)
            }
        }
        [decode(self.r), decode(self.g), decode(self.b)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_hex_splits_channels() {
        let c = Color::from_hex(0xffecaf);
        assert_eq!(c.to_rgb8(), [0xff, 0xec, 0xaf]);
        assert!((c.r - 1.0).abs() < 1e-6);
        assert!((c.b - 175.0 / 255.0).abs() < 1e-6);
    }

    #[test]
    fn test_hex_round_trips_through_u8() {
        for hex in [0x000000, 0xfffde7, 0x4d9996, 0xffffff] {
            assert_eq!(Color::from_hex(hex).to_hex(), hex);
        }
    }

    #[test]
    fn test_to_rgb8_clamps() {
        let c = Color::new(-0.5, 2.0, 0.5);
        assert_eq!(c.to_rgb8(), [0, 255, 128]);
    }

    #[test]
    fn test_linear_endpoints() {
        assert_eq!(Color::BLACK.to_linear(), [0.0, 0.0, 0.0]);
        let white = Color::WHITE.to_linear();
        for c in white {
            assert!((c - 1.0).abs() < 1e-6);
        }
        let mid = Color::new(0.5, 0.5, 0.5).to_linear();
        assert!(mid[0] > 0.2 && mid[0] < 0.25);
    }

    #[test]
    fn test_vec3_conversion() {
        let c = Color::from_rgb8(77, 153, 150);
        assert_eq!(Color::from_vec3(c.to_vec3()), c);
    }
}
