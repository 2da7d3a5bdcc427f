//! Mesh geometry handed to the scene sink.
//!
//! One `Mesh` is built per `TRIS` record. It owns a compact copy of the
//! vertices it uses, so its indices are local and its positions can be
//! re-centered on a pivot without touching any other object.

use serde::Serialize;
use xobj_math::{Aabb, Vec3};

/// A triangle mesh with per-vertex normals and UVs.
///
/// `positions`, `normals` and `uvs` always have the same length.
#[derive(Clone, Debug, Serialize)]
pub struct Mesh {
    /// Vertex positions (one Vec3 per vertex)
    pub positions: Vec<Vec3>,

    /// Vertex normals, as authored in the OBJ
    pub normals: Vec<Vec3>,

    /// UV coordinates (one [u, v] per vertex)
    pub uvs: Vec<[f32; 2]>,

    /// Triangle indices (every 3 indices form a triangle)
    pub indices: Vec<u32>,

    /// Axis-aligned bounding box
    pub bounds: Aabb,
}

impl Mesh {
    pub fn new(
        positions: Vec<Vec3>,
        normals: Vec<Vec3>,
        uvs: Vec<[f32; 2]>,
        indices: Vec<u32>,
    ) -> Self {
        debug_assert_eq!(positions.len(), normals.len());
        debug_assert_eq!(positions.len(), uvs.len());
        let bounds = Aabb::from_positions(&positions);
        Self {
            positions,
            normals,
            uvs,
            indices,
            bounds,
        }
    }

    /// Iterate over triangles as index triples.
    pub fn triangles(&self) -> impl Iterator<Item = [u32; 3]> + '_ {
        self.indices
            .chunks_exact(3)
            .map(|tri| [tri[0], tri[1], tri[2]])
    }

    /// Number of triangles with (near) zero area.
    ///
    /// X-Plane exporters sometimes pad index ranges with collapsed
    /// triangles; they are kept but worth reporting.
    pub fn degenerate_triangle_count(&self) -> usize {
        self.triangles()
            .filter(|&[a, b, c]| {
                let p0 = self.positions[a as usize];
                let p1 = self.positions[b as usize];
                let p2 = self.positions[c as usize];
                (p1 - p0).cross(p2 - p0).length() < 1e-8
            })
            .count()
    }

    /// Get the number of triangles in the mesh.
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Get the number of vertices in the mesh.
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }
}
