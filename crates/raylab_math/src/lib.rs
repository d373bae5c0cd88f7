//! Math types for raylab.
//!
//! Re-exports glam and adds the few geometric primitives the tracer needs:
//! rays, intervals, bounding boxes and the camera basis.

// Re-export glam for convenience
pub use glam::*;

mod aabb;
mod camera;
mod interval;
mod ray;

pub use aabb::Aabb;
pub use camera::{Camera, CameraBasis};
pub use interval::Interval;
pub use ray::Ray;

/// Component of `v` along axis `n` (0=X, 1=Y, 2=Z).
#[inline]
pub fn axis_component(v: Vec3, n: usize) -> f32 {
    match n {
        0 => v.x,
        1 => v.y,
        _ => v.z,
    }
}
