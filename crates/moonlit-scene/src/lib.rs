//! Scene description: a flat node graph of lit spheres and lights, the
//! random starfield that fills it, and background texture loading.

pub mod color;
pub mod geometry;
pub mod light;
pub mod material;
pub mod scene;
pub mod starfield;
pub mod texture;

pub use color::Color;
pub use geometry::{GeometryKey, SphereGeometry, SphereMesh, SphereVertex};
pub use light::{AmbientLight, Light, PointLight, range_falloff};
pub use material::StandardMaterial;
pub use scene::{Mesh, Node, NodeId, NodeKind, NodeTag, Scene, Transform};
pub use starfield::StarfieldGenerator;
pub use texture::{
    ColorSpace, DecodedImage, LoadedTexture, TextureHandle, TextureLoadError, TextureLoader,
};
