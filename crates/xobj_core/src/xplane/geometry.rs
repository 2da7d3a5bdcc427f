//! Global vertex and index buffers.
//!
//! X-Plane OBJ files declare all vertices and indices up front; each `TRIS`
//! then refers to a range of the index buffer. Buffers are kept exactly in
//! input order so a vertex index lines up with its normal and UV.

use std::collections::HashMap;

use thiserror::Error;
use xobj_math::Vec3;

use super::types::{Face, Vertex};
use crate::mesh::Mesh;

/// Errors raised when a face range or vertex index is out of bounds.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GeometryError {
    #[error("range {offset}+{count} exceeds index buffer of length {len}")]
    RangeError {
        offset: usize,
        count: usize,
        len: usize,
    },

    #[error("{count} indices do not form whole triangles")]
    PartialFace { count: usize },

    #[error("vertex index {index} out of range ({vertex_count} vertices)")]
    VertexIndex { index: u32, vertex_count: usize },
}

pub type GeometryResult<T> = Result<T, GeometryError>;

/// Ordered vertex list plus the flat index buffer.
#[derive(Clone, Debug, Default)]
pub struct GeometryAccumulator {
    vertices: Vec<Vertex>,
    indices: Vec<u32>,
}

impl GeometryAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve room for the counts announced by `POINT_COUNTS`.
    pub fn reserve(&mut self, vertices: usize, indices: usize) {
        self.vertices.reserve(vertices);
        self.indices.reserve(indices);
    }

    pub fn add_vertex(&mut self, position: Vec3, normal: Vec3, uv: [f32; 2]) {
        self.vertices.push(Vertex {
            position,
            normal,
            uv,
        });
    }

    pub fn add_indices<I: IntoIterator<Item = u32>>(&mut self, indices: I) {
        self.indices.extend(indices);
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn index_count(&self) -> usize {
        self.indices.len()
    }

    /// Return `count / 3` faces starting at `offset` in the index buffer.
    ///
    /// Every index is checked against the current vertex count.
    pub fn slice_faces(&self, offset: usize, count: usize) -> GeometryResult<Vec<Face>> {
        if count % 3 != 0 {
            return Err(GeometryError::PartialFace { count });
        }

        let end = offset
            .checked_add(count)
            .filter(|&end| end <= self.indices.len())
            .ok_or(GeometryError::RangeError {
                offset,
                count,
                len: self.indices.len(),
            })?;

        let vertex_count = self.vertices.len();
        self.indices[offset..end]
            .chunks_exact(3)
            .map(|tri| {
                if let Some(&index) = tri.iter().find(|&&i| i as usize >= vertex_count) {
                    return Err(GeometryError::VertexIndex {
                        index,
                        vertex_count,
                    });
                }
                Ok([tri[0], tri[1], tri[2]])
            })
            .collect()
    }

    /// Build a standalone mesh from `faces`, re-centered on `pivot`.
    ///
    /// Only referenced vertices are copied, in order of first use, and the
    /// indices are remapped. Positions are shifted by `-pivot`.
    pub fn extract_mesh(&self, faces: &[Face], pivot: Vec3) -> Mesh {
        let mut remap: HashMap<u32, u32> = HashMap::new();
        let mut positions = Vec::new();
        let mut normals = Vec::new();
        let mut uvs = Vec::new();
        let mut indices = Vec::with_capacity(faces.len() * 3);

        for &index in faces.iter().flatten() {
            let local = *remap.entry(index).or_insert_with(|| {
                let vertex = &self.vertices[index as usize];
                positions.push(vertex.position - pivot);
                normals.push(vertex.normal);
                uvs.push(vertex.uv);
                (positions.len() - 1) as u32
            });
            indices.push(local);
        }

        Mesh::new(positions, normals, uvs, indices)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn accumulator_with(vertex_count: usize, indices: &[u32]) -> GeometryAccumulator {
        let mut geometry = GeometryAccumulator::new();
        for i in 0..vertex_count {
            geometry.add_vertex(Vec3::new(i as f32, 0.0, 0.0), Vec3::Z, [0.0, 0.0]);
        }
        geometry.add_indices(indices.iter().copied());
        geometry
    }

    #[test]
    fn test_slice_faces_in_order() {
        let geometry = accumulator_with(4, &[0, 1, 2, 2, 1, 3, 3, 0, 1]);

        let faces = geometry.slice_faces(3, 6).unwrap();
        assert_eq!(faces, vec![[2, 1, 3], [3, 0, 1]]);

        let all = geometry.slice_faces(0, 9).unwrap();
        assert_eq!(all.len(), 3);
        assert!(geometry.slice_faces(9, 0).unwrap().is_empty());
    }

    #[test]
    fn test_slice_faces_out_of_range() {
        let geometry = accumulator_with(3, &[0, 1, 2]);

        assert_eq!(
            geometry.slice_faces(3, 3),
            Err(GeometryError::RangeError {
                offset: 3,
                count: 3,
                len: 3
            })
        );
        assert!(matches!(
            geometry.slice_faces(usize::MAX, 3),
            Err(GeometryError::RangeError { .. })
        ));
    }

    #[test]
    fn test_slice_faces_bad_vertex_index() {
        let geometry = accumulator_with(2, &[0, 1, 2]);

        assert_eq!(
            geometry.slice_faces(0, 3),
            Err(GeometryError::VertexIndex {
                index: 2,
                vertex_count: 2
            })
        );
    }

    #[test]
    fn test_slice_faces_partial_triangle() {
        let geometry = accumulator_with(3, &[0, 1, 2, 0]);
        assert_eq!(
            geometry.slice_faces(0, 4),
            Err(GeometryError::PartialFace { count: 4 })
        );
    }

    #[test]
    fn test_extract_mesh_compacts_and_shifts() {
        let geometry = accumulator_with(5, &[4, 2, 4]);
        let faces = geometry.slice_faces(0, 3).unwrap();

        let mesh = geometry.extract_mesh(&faces, Vec3::new(1.0, 0.0, 0.0));

        // Vertices 4 and 2 only, in first-use order
        assert_eq!(mesh.vertex_count(), 2);
        assert_eq!(mesh.indices, vec![0, 1, 0]);
        assert_eq!(mesh.positions[0], Vec3::new(3.0, 0.0, 0.0));
        assert_eq!(mesh.positions[1], Vec3::new(1.0, 0.0, 0.0));
        assert_eq!(mesh.normals.len(), 2);
        assert_eq!(mesh.uvs.len(), 2);
    }
}
