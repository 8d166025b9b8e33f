//! UV-sphere geometry.
//!
//! Vertices are laid out in rows from the north pole (`v = 0`) to the south
//! pole (`v = 1`), each row holding `width_segments + 1` vertices so the seam
//! column is duplicated and can carry `u = 1`. Pole rows emit one triangle
//! per quad since the other would be degenerate.

use std::f32::consts::{PI, TAU};

use bytemuck::{Pod, Zeroable};
use glam::Vec3;

const MIN_WIDTH_SEGMENTS: u32 = 3;
const MIN_HEIGHT_SEGMENTS: u32 = 2;

/// Sphere parameters. Segment counts below the minimum (3 around, 2 down)
/// are raised to it when the mesh is built.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SphereGeometry {
    pub radius: f32,
    pub width_segments: u32,
    pub height_segments: u32,
}

impl SphereGeometry {
    pub fn new(radius: f32, width_segments: u32, height_segments: u32) -> Self {
        Self {
            radius,
            width_segments,
            height_segments,
        }
    }

    /// Key identifying meshes that can share one vertex/index buffer.
    pub fn cache_key(&self) -> GeometryKey {
        GeometryKey {
            radius_bits: self.radius.to_bits(),
            width_segments: self.width_segments.max(MIN_WIDTH_SEGMENTS),
            height_segments: self.height_segments.max(MIN_HEIGHT_SEGMENTS),
        }
    }

    pub fn build(&self) -> SphereMesh {
        let w = self.width_segments.max(MIN_WIDTH_SEGMENTS);
        let h = self.height_segments.max(MIN_HEIGHT_SEGMENTS);
        let row = w + 1;

        let mut vertices = Vec::with_capacity((row * (h + 1)) as usize);
        for iy in 0..=h {
            let v = iy as f32 / h as f32;
            // Center the pole vertex's u within its single triangle.
            let u_offset = if iy == 0 {
                0.5 / w as f32
            } else if iy == h {
                -0.5 / w as f32
            } else {
                0.0
            };

            let (sin_theta, cos_theta) = (v * PI).sin_cos();
            for ix in 0..=w {
                let u = ix as f32 / w as f32;
                let (sin_phi, cos_phi) = (u * TAU).sin_cos();
                let position = Vec3::new(
                    -self.radius * cos_phi * sin_theta,
                    self.radius * cos_theta,
                    self.radius * sin_phi * sin_theta,
                );
                let normal = position.normalize_or_zero();
                vertices.push(SphereVertex {
                    position: position.to_array(),
                    normal: normal.to_array(),
                    uv: [u + u_offset, 1.0 - v],
                });
            }
        }

        let mut indices = Vec::with_capacity((6 * w * (h - 1)) as usize);
        for iy in 0..h {
            for ix in 0..w {
                let a = iy * row + ix + 1;
                let b = iy * row + ix;
                let c = (iy + 1) * row + ix;
                let d = (iy + 1) * row + ix + 1;
                if iy != 0 {
                    indices.extend_from_slice(&[a, b, d]);
                }
                if iy != h - 1 {
                    indices.extend_from_slice(&[b, c, d]);
                }
            }
        }

        SphereMesh { vertices, indices }
    }
}

/// Hashable identity of a [`SphereGeometry`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct GeometryKey {
    radius_bits: u32,
    width_segments: u32,
    height_segments: u32,
}

/// Interleaved vertex, 32 bytes.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct SphereVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

/// CPU-side triangle mesh with counter-clockwise front faces.
#[derive(Clone, Debug, Default)]
pub struct SphereMesh {
    pub vertices: Vec<SphereVertex>,
    pub indices: Vec<u32>,
}

impl SphereMesh {
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vertex_and_index_counts() {
        let mesh = SphereGeometry::new(3.0, 64, 64).build();
        assert_eq!(mesh.vertices.len(), 65 * 65);
        // Two triangles per quad, minus one per quad in each pole row.
        assert_eq!(mesh.triangle_count(), 2 * 64 * 64 - 2 * 64);
    }

    #[test]
    fn test_vertices_lie_on_sphere() {
        let radius = 3.0;
        let mesh = SphereGeometry::new(radius, 16, 12).build();
        for v in &mesh.vertices {
            let p = Vec3::from_array(v.position);
            assert!((p.length() - radius).abs() < 1e-4);
            let n = Vec3::from_array(v.normal);
            assert!((n.length() - 1.0).abs() < 1e-4);
            assert!(p.normalize().dot(n) > 0.9999);
        }
    }

    #[test]
    fn test_poles_and_uv_orientation() {
        let mesh = SphereGeometry::new(1.0, 8, 4).build();
        let north = mesh.vertices[0];
        let south = mesh.vertices[mesh.vertices.len() - 1];
        assert!((north.position[1] - 1.0).abs() < 1e-6);
        assert!((south.position[1] + 1.0).abs() < 1e-6);
        assert!((north.uv[1] - 1.0).abs() < 1e-6);
        assert!(south.uv[1].abs() < 1e-6);
    }

    #[test]
    fn test_seam_is_duplicated() {
        let w = 8;
        let mesh = SphereGeometry::new(1.0, w, 4).build();
        let row = (w + 1) as usize;
        let first = mesh.vertices[row];
        let last = mesh.vertices[2 * row - 1];
        let d = Vec3::from_array(first.position) - Vec3::from_array(last.position);
        assert!(d.length() < 1e-5);
        assert!(first.uv[0].abs() < 1e-6);
        assert!((last.uv[0] - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_indices_in_range() {
        let mesh = SphereGeometry::new(0.25, 24, 24).build();
        let n = mesh.vertices.len() as u32;
        assert!(mesh.indices.iter().all(|&i| i < n));
    }

    #[test]
    fn test_triangles_face_outward() {
        let mesh = SphereGeometry::new(2.0, 12, 8).build();
        for tri in mesh.indices.chunks_exact(3) {
            let [a, b, c] = [tri[0], tri[1], tri[2]]
                .map(|i| Vec3::from_array(mesh.vertices[i as usize].position));
            let face_normal = (b - a).cross(c - a);
            let centroid = (a + b + c) / 3.0;
            assert!(face_normal.dot(centroid) > 0.0);
        }
    }

    #[test]
    fn test_segment_minimums() {
        let geo = SphereGeometry::new(1.0, 0, 0);
        let mesh = geo.build();
        assert_eq!(mesh.vertices.len(), 4 * 3);
        assert_eq!(geo.cache_key(), SphereGeometry::new(1.0, 3, 2).cache_key());
    }

    #[test]
    fn test_cache_key_distinguishes_radius() {
        let a = SphereGeometry::new(3.0, 64, 64).cache_key();
        let b = SphereGeometry::new(0.25, 64, 64).cache_key();
        assert_ne!(a, b);
    }
}
