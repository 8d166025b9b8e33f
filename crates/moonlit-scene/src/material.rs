//! Surface material for lit meshes.

use crate::Color;
use crate::texture::TextureHandle;

/// Physically-inspired material: a base color, a roughness term, and
/// optional color and tangent-space normal maps.
#[derive(Clone, Debug, PartialEq)]
pub struct StandardMaterial {
    pub color: Color,
    /// 0.0 = mirror-like, 1.0 = fully diffuse.
    pub roughness: f32,
    pub map: Option<TextureHandle>,
    pub normal_map: Option<TextureHandle>,
}

impl Default for StandardMaterial {
    fn default() -> Self {
        Self {
            color: Color::WHITE,
            roughness: 1.0,
            map: None,
            normal_map: None,
        }
    }
}

impl StandardMaterial {
    pub fn with_color(color: Color) -> Self {
        Self {
            color,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn roughness(mut self, roughness: f32) -> Self {
        self.roughness = roughness.clamp(0.0, 1.0);
        self
    }

    #[must_use]
    pub fn map(mut self, handle: TextureHandle) -> Self {
        self.map = Some(handle);
        self
    }

    #[must_use]
    pub fn normal_map(mut self, handle: TextureHandle) -> Self {
        self.normal_map = Some(handle);
        self
    }
}
