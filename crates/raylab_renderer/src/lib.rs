//! raylab renderer - CPU ray tracing with programmable shaders.
//!
//! A [`RayTracer`] renders a viewport by shooting jittered primary rays
//! through a camera basis. Intersections come from a BVH
//! ([`AccelerationStructure`]) over the scene's triangles, and what a hit
//! looks like is decided by three shader slots: miss, any-hit and
//! closest-hit. Closest-hit shaders may trace further rays through the
//! [`TraceContext`] they are given, up to a recursion limit.
//!
//! [`SceneRenderer`] is the one-call entry point: settings in, image out.

mod bvh;
mod camera;
mod integrator;
mod payload;
mod renderer;
mod settings;
mod shader;
mod target;
mod tracer;
mod triangle;

use rand::{Rng, RngCore};

pub use bvh::{AccelerationStructure, Hit, MIN_DISTANCE, TIE_EPSILON};
pub use camera::{primary_ray, sample_square};
pub use integrator::{random_hemisphere_direction, DiffuseBounce, DirectLighting, SURFACE_OFFSET};
pub use payload::{Color, Payload};
pub use renderer::{RenderError, SceneRenderer};
pub use settings::{ConfigError, RenderSettings, MAX_RAYTRACING_DEPTH};
pub use shader::{
    AnyHit, AnyHitShader, BackgroundMiss, ClosestHitShader, MissShader, NoopAnyHit,
    NoopClosestHit, NoopMiss, ShaderSet, ShadowMiss,
};
pub use target::{color_to_rgba, linear_to_gamma, RenderTarget};
pub use tracer::{RayTracer, TraceContext, DEFAULT_MAX_DISTANCE};
pub use triangle::{Triangle, TriangleHit};

/// Re-export the math and scene types the tracer API is written in
pub use raylab_core::{BuildError, Light, SceneGeometry, Shape, Vertex};
pub use raylab_math::{Aabb, Camera, CameraBasis, Interval, Ray, Vec2, Vec3};

/// Uniform f32 in [0, 1).
#[inline]
pub(crate) fn gen_f32(rng: &mut dyn RngCore) -> f32 {
    rng.gen()
}
