//! Random starfield: small white spheres scattered in a cube around the
//! origin.

use glam::Vec3;
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::debug;

use crate::{Color, Node, NodeId, NodeTag, Scene, SphereGeometry, StandardMaterial, Transform};

/// Places `star_count` stars uniformly in `[-spread / 2, spread / 2]` on
/// every axis.
///
/// With a seed, placement is deterministic. Without one, a seed is drawn
/// from the thread RNG and logged at debug level.
#[derive(Clone, Debug)]
pub struct StarfieldGenerator {
    star_count: u32,
    spread: f32,
    geometry: SphereGeometry,
    seed: Option<u64>,
}

impl StarfieldGenerator {
    pub fn new(star_count: u32, spread: f32) -> Self {
        Self {
            star_count,
            spread: spread.abs(),
            geometry: SphereGeometry::new(0.25, 24, 24),
            seed: None,
        }
    }

    #[must_use]
    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    /// Sphere used for every star.
    #[must_use]
    pub fn with_geometry(mut self, geometry: SphereGeometry) -> Self {
        self.geometry = geometry;
        self
    }

    pub fn star_count(&self) -> u32 {
        self.star_count
    }

    /// Half-open bounds of each coordinate.
    pub fn half_extent(&self) -> f32 {
        self.spread / 2.0
    }

    /// Generate star positions without touching a scene.
    pub fn positions(&self) -> Vec<Vec3> {
        let seed = self.seed.unwrap_or_else(|| {
            let seed = rand::rng().random::<u64>();
            debug!(seed, "starfield seeded from thread rng");
            seed
        });
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut coord = || self.spread * (0.5 - rng.random::<f32>());

        (0..self.star_count)
            .map(|_| {
                let x = coord();
                let y = coord();
                let z = coord();
                Vec3::new(x, y, z)
            })
            .collect()
    }

    /// Add every star to `scene` and return their ids. Calling this twice
    /// adds a second, independent set.
    pub fn populate(&self, scene: &mut Scene) -> Vec<NodeId> {
        let material = StandardMaterial::with_color(Color::WHITE);
        let ids: Vec<NodeId> = self
            .positions()
            .into_iter()
            .enumerate()
            .map(|(i, position)| {
                let mut node =
                    Node::mesh(NodeTag::Star, format!("star-{i}"), self.geometry, material.clone());
                node.transform = Transform::from_position(position);
                scene.add(node)
            })
            .collect();
        debug!(count = ids.len(), spread = self.spread, "starfield populated");
        ids
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_adds_exact_count() {
        let mut scene = Scene::new();
        let ids = StarfieldGenerator::new(200, 100.0).populate(&mut scene);
        assert_eq!(ids.len(), 200);
        assert_eq!(scene.count_tagged(NodeTag::Star), 200);
    }

    #[test]
    fn test_positions_within_bounds() {
        let generator = StarfieldGenerator::new(2000, 100.0).with_seed(Some(7));
        for p in generator.positions() {
            for c in p.to_array() {
                assert!((-50.0..=50.0).contains(&c), "coordinate {c} out of range");
            }
        }
    }

    #[test]
    fn test_seeded_placement_is_deterministic() {
        let a = StarfieldGenerator::new(50, 100.0).with_seed(Some(42)).positions();
        let b = StarfieldGenerator::new(50, 100.0).with_seed(Some(42)).positions();
        let c = StarfieldGenerator::new(50, 100.0).with_seed(Some(43)).positions();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_axes_are_independent() {
        let stars = StarfieldGenerator::new(500, 100.0).with_seed(Some(1)).positions();
        assert!(stars.iter().any(|p| p.x != p.y));
        // Roughly centered on the origin.
        let mean = stars.iter().copied().sum::<Vec3>() / stars.len() as f32;
        assert!(mean.length() < 10.0);
    }

    #[test]
    fn test_populate_twice_doubles_count() {
        let mut scene = Scene::new();
        let generator = StarfieldGenerator::new(10, 100.0);
        generator.populate(&mut scene);
        generator.populate(&mut scene);
        assert_eq!(scene.count_tagged(NodeTag::Star), 20);
    }

    #[test]
    fn test_zero_count_is_empty() {
        let mut scene = Scene::new();
        assert!(StarfieldGenerator::new(0, 100.0).populate(&mut scene).is_empty());
        assert!(scene.is_empty());
    }

    #[test]
    fn test_star_nodes_use_white_spheres() {
        let mut scene = Scene::new();
        let ids = StarfieldGenerator::new(3, 100.0)
            .with_seed(Some(9))
            .populate(&mut scene);
        let node = scene.get(ids[0]).unwrap();
        let mesh = node.as_mesh().unwrap();
        assert_eq!(mesh.geometry, SphereGeometry::new(0.25, 24, 24));
        assert_eq!(mesh.material.color, Color::WHITE);
        assert!(mesh.material.map.is_none());
        assert_eq!(node.transform.scale, Vec3::ONE);
    }
}
