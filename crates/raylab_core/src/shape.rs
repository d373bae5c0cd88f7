//! Per-shape geometry buffers.
//!
//! A `Shape` pairs one vertex buffer with one index buffer. Every three
//! indices name one triangle's vertices within that shape's vertex buffer.

use raylab_math::{Aabb, Vec3};

use crate::{BuildError, Vertex};

/// One vertex buffer and the index buffer that references it.
#[derive(Clone, Debug, Default)]
pub struct Shape {
    /// Vertex buffer
    pub vertices: Vec<Vertex>,

    /// Triangle indices (every 3 indices form a triangle)
    pub indices: Vec<u32>,
}

impl Shape {
    pub fn new(vertices: Vec<Vertex>, indices: Vec<u32>) -> Self {
        Self { vertices, indices }
    }

    /// Get the number of triangles in the shape.
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Get the number of vertices in the shape.
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Vertex indices of triangle `triangle`, if it exists.
    pub fn triangle_indices(&self, triangle: usize) -> Option<[u32; 3]> {
        let start = triangle.checked_mul(3)?;
        match self.indices.get(start..start.saturating_add(3))? {
            &[a, b, c] => Some([a, b, c]),
            _ => None,
        }
    }

    /// The three vertices of triangle `triangle`.
    ///
    /// Returns `None` for a triangle or vertex index out of range; shapes that
    /// passed [`Shape::validate`] never do.
    pub fn triangle_vertices(&self, triangle: usize) -> Option<[&Vertex; 3]> {
        let [a, b, c] = self.triangle_indices(triangle)?;
        Some([
            self.vertices.get(a as usize)?,
            self.vertices.get(b as usize)?,
            self.vertices.get(c as usize)?,
        ])
    }

    /// Check the buffer pairing invariants. `index` is the shape's position in
    /// the scene and is only used for error reporting.
    pub fn validate(&self, index: usize) -> Result<(), BuildError> {
        if self.indices.len() % 3 != 0 {
            return Err(BuildError::IndexCountMismatch {
                shape: index,
                count: self.indices.len(),
            });
        }
        if self.indices.is_empty() {
            return Err(BuildError::EmptyShape { shape: index });
        }
        let vertex_count = self.vertices.len();
        if let Some(&bad) = self.indices.iter().find(|&&i| i as usize >= vertex_count) {
            return Err(BuildError::IndexOutOfRange {
                shape: index,
                index: bad,
                vertex_count,
            });
        }
        Ok(())
    }

    /// Compute axis-aligned bounding box from positions.
    pub fn bounds(&self) -> Aabb {
        if self.vertices.is_empty() {
            return Aabb::EMPTY;
        }

        let mut min = Vec3::splat(f32::INFINITY);
        let mut max = Vec3::splat(f32::NEG_INFINITY);

        for vertex in &self.vertices {
            min = min.min(vertex.position);
            max = max.max(vertex.position);
        }

        Aabb::from_points(min, max)
    }

    /// Compute smooth vertex normals by averaging face normals.
    ///
    /// For loaders whose source has no normals. Faces use counter-clockwise
    /// winding; out-of-range triangles are skipped.
    pub fn compute_normals(&mut self) {
        let vertex_count = self.vertices.len();
        let mut normals = vec![Vec3::ZERO; vertex_count];

        // Accumulate face normals at each vertex
        for face in self.indices.chunks_exact(3) {
            let i0 = face[0] as usize;
            let i1 = face[1] as usize;
            let i2 = face[2] as usize;

            if i0 >= vertex_count || i1 >= vertex_count || i2 >= vertex_count {
                continue;
            }

            let p0 = self.vertices[i0].position;
            let p1 = self.vertices[i1].position;
            let p2 = self.vertices[i2].position;

            let face_normal = (p1 - p0).cross(p2 - p0);

            normals[i0] += face_normal;
            normals[i1] += face_normal;
            normals[i2] += face_normal;
        }

        let mut degenerate = 0;
        for (vertex, normal) in self.vertices.iter_mut().zip(normals) {
            vertex.normal = match normal.try_normalize() {
                Some(n) => n,
                None => {
                    degenerate += 1;
                    Vec3::Y // Default up normal for degenerate cases
                }
            };
        }

        if degenerate > 0 {
            log::debug!("{} vertices had no usable face normal, defaulted to +Y", degenerate);
        }
    }
}
