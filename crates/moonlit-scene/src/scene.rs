//! Flat scene graph.
//!
//! Nodes are stored in insertion order and addressed by [`NodeId`]. Nothing
//! is ever removed, so an id stays valid for the life of the scene.

use glam::{Mat4, Vec3};

use crate::light::{AmbientLight, Light, PointLight};
use crate::{SphereGeometry, StandardMaterial};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// What a node represents, for counting and lookup.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NodeTag {
    Moon,
    Star,
    Light,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            scale: Vec3::ONE,
        }
    }
}

impl Transform {
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Self::default()
        }
    }

    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, glam::Quat::IDENTITY, self.position)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Mesh {
    pub geometry: SphereGeometry,
    pub material: StandardMaterial,
}

#[derive(Clone, Debug, PartialEq)]
pub enum NodeKind {
    Mesh(Mesh),
    Light(Light),
}

#[derive(Clone, Debug, PartialEq)]
pub struct Node {
    pub tag: NodeTag,
    pub name: String,
    pub transform: Transform,
    pub kind: NodeKind,
}

impl Node {
    pub fn mesh(
        tag: NodeTag,
        name: impl Into<String>,
        geometry: SphereGeometry,
        material: StandardMaterial,
    ) -> Self {
        Self {
            tag,
            name: name.into(),
            transform: Transform::default(),
            kind: NodeKind::Mesh(Mesh { geometry, material }),
        }
    }

    pub fn light(name: impl Into<String>, light: Light) -> Self {
        Self {
            tag: NodeTag::Light,
            name: name.into(),
            transform: Transform::default(),
            kind: NodeKind::Light(light),
        }
    }

    #[must_use]
    pub fn at(mut self, position: Vec3) -> Self {
        self.transform.position = position;
        self
    }

    pub fn as_mesh(&self) -> Option<&Mesh> {
        match &self.kind {
            NodeKind::Mesh(mesh) => Some(mesh),
            NodeKind::Light(_) => None,
        }
    }

    pub fn material_mut(&mut self) -> Option<&mut StandardMaterial> {
        match &mut self.kind {
            NodeKind::Mesh(mesh) => Some(&mut mesh.material),
            NodeKind::Light(_) => None,
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct Scene {
    nodes: Vec<Node>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, node: Node) -> NodeId {
        self.nodes.push(node);
        NodeId(self.nodes.len() - 1)
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.0)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.nodes.iter().enumerate().map(|(i, n)| (NodeId(i), n))
    }

    pub fn count_tagged(&self, tag: NodeTag) -> usize {
        self.nodes.iter().filter(|n| n.tag == tag).count()
    }

    /// Mesh nodes with their transforms, in insertion order.
    pub fn meshes(&self) -> impl Iterator<Item = (NodeId, &Transform, &Mesh)> {
        self.iter()
            .filter_map(|(id, node)| node.as_mesh().map(|m| (id, &node.transform, m)))
    }

    /// Point lights with their world positions.
    pub fn point_lights(&self) -> impl Iterator<Item = (Vec3, &PointLight)> {
        self.nodes.iter().filter_map(|node| match &node.kind {
            NodeKind::Light(Light::Point(light)) => Some((node.transform.position, light)),
            _ => None,
        })
    }

    /// Sum of all ambient lights in linear RGB, premultiplied by intensity.
    pub fn ambient(&self) -> Vec3 {
        self.nodes
            .iter()
            .filter_map(|node| match &node.kind {
                NodeKind::Light(Light::Ambient(a)) => Some(a),
                _ => None,
            })
            .map(AmbientLight::radiance)
            .sum()
    }

    pub fn material_mut(&mut self, id: NodeId) -> Option<&mut StandardMaterial> {
        self.get_mut(id).and_then(Node::material_mut)
    }

    pub fn material(&self, id: NodeId) -> Option<&StandardMaterial> {
        self.get(id).and_then(Node::as_mesh).map(|m| &m.material)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Color;

    fn sphere() -> Node {
        Node::mesh(
            NodeTag::Star,
            "star",
            SphereGeometry::new(0.25, 24, 24),
            StandardMaterial::default(),
        )
    }

    #[test]
    fn test_ids_follow_insertion_order() {
        let mut scene = Scene::new();
        let a = scene.add(sphere());
        let b = scene.add(sphere().at(Vec3::X));
        assert_eq!(a.index(), 0);
        assert_eq!(b.index(), 1);
        assert_eq!(scene.get(b).unwrap().transform.position, Vec3::X);
        assert_eq!(scene.len(), 2);
    }

    #[test]
    fn test_count_tagged() {
        let mut scene = Scene::new();
        scene.add(sphere());
        scene.add(sphere());
        scene.add(Node::light(
            "ambient",
            Light::Ambient(AmbientLight::new(Color::WHITE, 0.1)),
        ));
        assert_eq!(scene.count_tagged(NodeTag::Star), 2);
        assert_eq!(scene.count_tagged(NodeTag::Light), 1);
        assert_eq!(scene.count_tagged(NodeTag::Moon), 0);
        assert_eq!(scene.meshes().count(), 2);
    }

    #[test]
    fn test_material_mut_only_on_meshes() {
        let mut scene = Scene::new();
        let star = scene.add(sphere());
        let light = scene.add(Node::light(
            "point",
            Light::Point(PointLight::new(Color::WHITE, 1.0, 10.0)),
        ));
        scene.material_mut(star).unwrap().color = Color::from_hex(0x4d9996);
        assert_eq!(scene.material(star).unwrap().color.to_hex(), 0x4d9996);
        assert!(scene.material_mut(light).is_none());
    }

    #[test]
    fn test_lights_are_collected() {
        let mut scene = Scene::new();
        scene.add(
            Node::light(
                "point",
                Light::Point(PointLight::new(Color::WHITE, 1.5, 100.0)),
            )
            .at(Vec3::new(0.0, 10.0, 10.0)),
        );
        scene.add(Node::light(
            "ambient",
            Light::Ambient(AmbientLight::new(Color::WHITE, 0.1)),
        ));
        scene.add(Node::light(
            "ambient-2",
            Light::Ambient(AmbientLight::new(Color::WHITE, 0.2)),
        ));

        let points: Vec<_> = scene.point_lights().collect();
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].0, Vec3::new(0.0, 10.0, 10.0));
        assert!((scene.ambient() - Vec3::splat(0.3)).length() < 1e-6);
    }

    #[test]
    fn test_transform_matrix_scales_then_translates() {
        let t = Transform {
            position: Vec3::new(1.0, 2.0, 3.0),
            scale: Vec3::splat(2.0),
        };
        let p = t.matrix().transform_point3(Vec3::X);
        assert!((p - Vec3::new(3.0, 2.0, 3.0)).length() < 1e-6);
    }
}
