//! Scene data handed to the tracer.
//!
//! Geometry is an ordered list of shapes; lights are a flat list of point
//! lights. Both are finalized before the acceleration structure is built and
//! never change while rendering.

use raylab_math::{Aabb, Vec3};

use crate::{BuildError, Shape};

/// A point light.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Light {
    /// World-space position
    pub position: Vec3,

    /// Linear RGB intensity
    pub intensity: Vec3,
}

impl Light {
    pub fn new(position: Vec3, intensity: Vec3) -> Self {
        Self {
            position,
            intensity,
        }
    }
}

/// All shapes of a scene, in load order.
///
/// Shape order is significant: it defines the build order the acceleration
/// structure uses to break ties between equally distant hits.
#[derive(Clone, Debug, Default)]
pub struct SceneGeometry {
    shapes: Vec<Shape>,
}

impl SceneGeometry {
    pub fn new(shapes: Vec<Shape>) -> Self {
        Self { shapes }
    }

    /// A scene with no shapes. Legal; every ray misses.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Append a shape, returning its index.
    pub fn add_shape(&mut self, shape: Shape) -> usize {
        self.shapes.push(shape);
        self.shapes.len() - 1
    }

    pub fn shapes(&self) -> &[Shape] {
        &self.shapes
    }

    pub fn shape(&self, index: usize) -> Option<&Shape> {
        self.shapes.get(index)
    }

    pub fn shape_count(&self) -> usize {
        self.shapes.len()
    }

    /// Get the total number of triangles across all shapes.
    pub fn triangle_count(&self) -> usize {
        self.shapes.iter().map(Shape::triangle_count).sum()
    }

    /// Check every shape; reports the first malformed one.
    pub fn validate(&self) -> Result<(), BuildError> {
        self.shapes
            .iter()
            .enumerate()
            .try_for_each(|(index, shape)| shape.validate(index))
    }

    /// Compute world-space bounding box of all shapes.
    pub fn bounds(&self) -> Aabb {
        self.shapes
            .iter()
            .fold(Aabb::EMPTY, |acc, shape| Aabb::surrounding(&acc, &shape.bounds()))
    }
}
