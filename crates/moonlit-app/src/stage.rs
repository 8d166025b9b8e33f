//! Everything tweens can touch: the scene graph with its moon, and the
//! overlay UI.

use glam::Vec3;
use moonlit_config::SceneConfig;
use moonlit_scene::{
    AmbientLight, Color, ColorSpace, Light, Node, NodeId, NodeTag, PointLight, Scene,
    SphereGeometry, StandardMaterial, StarfieldGenerator, TextureHandle, TextureLoader,
};
use tracing::info;

use crate::overlay::OverlayState;

pub struct Stage {
    pub scene: Scene,
    pub moon: NodeId,
    pub overlay: OverlayState,
}

/// Texture handles queued while building the stage.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StageTextures {
    pub moon_map: TextureHandle,
    pub moon_normal: TextureHandle,
}

impl Stage {
    /// Build the moon, its lights and the starfield. Textures are queued on
    /// `loader` and bound once they finish decoding.
    pub fn build(config: &SceneConfig, loader: &mut TextureLoader) -> (Self, StageTextures) {
        let textures = StageTextures {
            moon_map: loader.load_with(config.moon_texture_path(), ColorSpace::Srgb),
            moon_normal: loader.load_with(config.normal_texture_path(), ColorSpace::Linear),
        };

        let mut scene = Scene::new();
        let material = StandardMaterial::with_color(Color::from_hex(config.moon_color))
            .roughness(config.moon_roughness)
            .map(textures.moon_map)
            .normal_map(textures.moon_normal);
        let moon = scene.add(Node::mesh(
            NodeTag::Moon,
            "moon",
            SphereGeometry::new(config.moon_radius, config.moon_segments, config.moon_segments),
            material,
        ));

        let point = PointLight::new(
            Color::from_hex(config.point_light_color),
            config.point_light_intensity,
            config.point_light_distance,
        )
        .with_decay(config.point_light_decay);
        scene.add(
            Node::light("point-light", Light::Point(point))
                .at(Vec3::from(config.point_light_position)),
        );
        scene.add(Node::light(
            "ambient-light",
            Light::Ambient(AmbientLight::new(
                Color::from_hex(config.ambient_color),
                config.ambient_intensity,
            )),
        ));

        StarfieldGenerator::new(config.star_count, config.star_spread)
            .with_seed(config.star_seed)
            .with_geometry(SphereGeometry::new(
                config.star_radius,
                config.star_segments,
                config.star_segments,
            ))
            .populate(&mut scene);

        info!(
            nodes = scene.len(),
            stars = scene.count_tagged(NodeTag::Star),
            "stage built"
        );

        let stage = Self {
            scene,
            moon,
            overlay: OverlayState::default(),
        };
        (stage, textures)
    }

    pub fn moon_scale(&self) -> Vec3 {
        self.scene
            .get(self.moon)
            .map_or(Vec3::ONE, |node| node.transform.scale)
    }

    pub fn set_moon_scale(&mut self, scale: Vec3) {
        if let Some(node) = self.scene.get_mut(self.moon) {
            node.transform.scale = scale;
        }
    }

    pub fn moon_color(&self) -> Color {
        self.scene
            .material(self.moon)
            .map_or(Color::WHITE, |m| m.color)
    }

    pub fn set_moon_color(&mut self, color: Color) {
        if let Some(material) = self.scene.material_mut(self.moon) {
            material.color = color;
        }
    }
}
