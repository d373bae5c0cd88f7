//! raylab core - geometry buffers and scene data.
//!
//! This crate provides:
//!
//! - **Geometry buffers**: `Vertex`, `Shape` (one vertex/index buffer pair)
//!   and `SceneGeometry` (all shapes of a scene)
//! - **Lights**: point lights carried alongside the geometry
//! - **Validation**: `BuildError` for malformed buffers
//!
//! Buffers are filled once by a mesh loader and are read-only afterwards.
//!
//! # Example
//!
//! ```
//! use raylab_core::{SceneGeometry, Shape, Vertex};
//! use raylab_math::Vec3;
//!
//! let vertices = vec![
//!     Vertex::new(Vec3::new(-1.0, -1.0, 0.0), Vec3::Z),
//!     Vertex::new(Vec3::new(1.0, -1.0, 0.0), Vec3::Z),
//!     Vertex::new(Vec3::new(0.0, 1.0, 0.0), Vec3::Z),
//! ];
//! let geometry = SceneGeometry::new(vec![Shape::new(vertices, vec![0, 1, 2])]);
//! assert!(geometry.validate().is_ok());
//! assert_eq!(geometry.triangle_count(), 1);
//! ```

mod error;
pub mod scene;
pub mod shape;
mod vertex;

// Re-export commonly used types
pub use error::BuildError;
pub use scene::{Light, SceneGeometry};
pub use shape::Shape;
pub use vertex::Vertex;
