//! Triangle view over the geometry buffers.
//!
//! Triangles are never stored: they are rebuilt from three vertices whenever
//! the acceleration structure or a shader needs one.
//! Intersection uses the Möller-Trumbore algorithm.

use raylab_core::{Shape, Vertex};
use raylab_math::{Aabb, Interval, Ray, Vec3};

use crate::Color;

/// Sine of the smallest corner angle a triangle may have before it counts as
/// degenerate. Relative to edge length, so it holds at any scene scale.
const DEGENERATE_SINE: f32 = 1e-6;

/// Below this (relative) determinant the ray grazes the triangle's plane.
const PARALLEL_EPSILON: f32 = 1e-8;

/// A triangle reconstructed from three vertices.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangle {
    /// Positions
    pub a: Vec3,
    pub b: Vec3,
    pub c: Vec3,
    /// Per-vertex shading normals
    pub na: Vec3,
    pub nb: Vec3,
    pub nc: Vec3,
    /// Vertex diffuse colors averaged over the triangle
    pub diffuse: Color,
    /// Vertex emissive colors averaged over the triangle
    pub emissive: Color,
}

/// Where a ray crosses a triangle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TriangleHit {
    /// Ray parameter
    pub t: f32,
    /// Barycentric weights of vertices a, b and c
    pub bary: Vec3,
}

impl Triangle {
    /// Build a triangle from its three vertices.
    pub fn from_vertices(a: &Vertex, b: &Vertex, c: &Vertex) -> Self {
        Self {
            a: a.position,
            b: b.position,
            c: c.position,
            na: a.normal,
            nb: b.normal,
            nc: c.normal,
            diffuse: (a.diffuse + b.diffuse + c.diffuse) / 3.0,
            emissive: (a.emissive + b.emissive + c.emissive) / 3.0,
        }
    }

    /// Reconstruct triangle `index` of `shape`.
    pub fn fetch(shape: &Shape, index: usize) -> Option<Self> {
        let [a, b, c] = shape.triangle_vertices(index)?;
        Some(Self::from_vertices(a, b, c))
    }

    /// Unnormalized face normal (counter-clockwise winding).
    #[inline]
    fn face_cross(&self) -> Vec3 {
        (self.b - self.a).cross(self.c - self.a)
    }

    /// Unit face normal, or zero for a degenerate triangle.
    pub fn geometric_normal(&self) -> Vec3 {
        self.face_cross().normalize_or_zero()
    }

    pub fn area(&self) -> f32 {
        0.5 * self.face_cross().length()
    }

    /// Zero-area, needle-thin or non-finite triangles never produce hits.
    ///
    /// Size alone never makes a triangle degenerate.
    pub fn is_degenerate(&self) -> bool {
        let cross = self.face_cross();
        let scale = (self.b - self.a).length() * (self.c - self.a).length();
        !cross.is_finite() || cross.length() <= DEGENERATE_SINE * scale
    }

    pub fn bounding_box(&self) -> Aabb {
        Aabb::from_triangle(self.a, self.b, self.c)
    }

    pub fn centroid(&self) -> Vec3 {
        (self.a + self.b + self.c) / 3.0
    }

    /// Shading normal at a hit, blended from the vertex normals.
    ///
    /// Falls back to the face normal when the vertex normals cancel out.
    pub fn interpolate_normal(&self, bary: Vec3) -> Vec3 {
        (bary.x * self.na + bary.y * self.nb + bary.z * self.nc)
            .try_normalize()
            .unwrap_or_else(|| self.geometric_normal())
    }

    /// Möller-Trumbore ray-triangle intersection.
    ///
    /// Only hits with `t` strictly inside `ray_t` are reported. Both faces
    /// are hit.
    pub fn intersect(&self, ray: &Ray, ray_t: Interval) -> Option<TriangleHit> {
        let edge1 = self.b - self.a;
        let edge2 = self.c - self.a;

        let h = ray.direction.cross(edge2);
        let det = edge1.dot(h);

        // |det| = |edge1| |edge2| sin(corner) |cos(ray, normal)|: compare
        // against the edge scale so small triangles still hit
        let scale = edge1.length() * edge2.length();
        if !det.is_finite() || det.abs() <= PARALLEL_EPSILON * scale {
            return None;
        }

        let f = 1.0 / det;
        let s = ray.origin - self.a;
        let u = f * s.dot(h);
        if !(0.0..=1.0).contains(&u) {
            return None;
        }

        let q = s.cross(edge1);
        let v = f * ray.direction.dot(q);
        if v < 0.0 || u + v > 1.0 {
            return None;
        }

        let t = f * edge2.dot(q);
        if !ray_t.surrounds(t) {
            return None;
        }

        Some(TriangleHit {
            t,
            bary: Vec3::new(1.0 - u - v, u, v),
        })
    }
}
