//! Programmable shader slots.
//!
//! A tracer has three slots: miss, any-hit and closest-hit. Each slot holds a
//! trait object, so shaders can be plain structs or closures. Empty slots are
//! filled with explicit no-op shaders rather than left absent.

use std::sync::Arc;

use raylab_math::Ray;

use crate::{Color, Payload, TraceContext, Triangle};

/// Verdict of an any-hit shader on one candidate intersection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnyHit {
    /// Keep the candidate and continue searching for a closer one.
    Accept,
    /// Pretend the candidate was not there.
    Ignore,
    /// Keep the candidate and stop searching.
    Terminate,
}

/// Runs when a ray hits nothing.
pub trait MissShader: Send + Sync {
    fn miss(&self, ray: &Ray) -> Payload;
}

/// Runs on candidate intersections before the closest one is known.
pub trait AnyHitShader: Send + Sync {
    fn any_hit(&self, ray: &Ray, payload: &Payload, triangle: &Triangle) -> AnyHit;
}

/// Runs on the closest intersection and produces its color.
///
/// `payload` arrives with `t` and `bary` set. This is the only shader that
/// may trace further rays, through `ctx`, and it must pass `depth + 1`.
pub trait ClosestHitShader: Send + Sync {
    fn closest_hit(
        &self,
        ctx: &mut TraceContext<'_>,
        ray: &Ray,
        payload: &mut Payload,
        triangle: &Triangle,
        depth: u32,
    ) -> Payload;
}

impl<F> MissShader for F
where
    F: Fn(&Ray) -> Payload + Send + Sync,
{
    fn miss(&self, ray: &Ray) -> Payload {
        self(ray)
    }
}

impl<F> AnyHitShader for F
where
    F: Fn(&Ray, &Payload, &Triangle) -> AnyHit + Send + Sync,
{
    fn any_hit(&self, ray: &Ray, payload: &Payload, triangle: &Triangle) -> AnyHit {
        self(ray, payload, triangle)
    }
}

impl<F> ClosestHitShader for F
where
    F: Fn(&mut TraceContext<'_>, &Ray, &mut Payload, &Triangle, u32) -> Payload + Send + Sync,
{
    fn closest_hit(
        &self,
        ctx: &mut TraceContext<'_>,
        ray: &Ray,
        payload: &mut Payload,
        triangle: &Triangle,
        depth: u32,
    ) -> Payload {
        self(ctx, ray, payload, triangle, depth)
    }
}

/// Black, no hit.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopMiss;

impl MissShader for NoopMiss {
    fn miss(&self, _ray: &Ray) -> Payload {
        Payload::default()
    }
}

/// Accepts every candidate.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopAnyHit;

impl AnyHitShader for NoopAnyHit {
    fn any_hit(&self, _ray: &Ray, _payload: &Payload, _triangle: &Triangle) -> AnyHit {
        AnyHit::Accept
    }
}

/// Returns the payload as it arrived.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopClosestHit;

impl ClosestHitShader for NoopClosestHit {
    fn closest_hit(
        &self,
        _ctx: &mut TraceContext<'_>,
        _ray: &Ray,
        payload: &mut Payload,
        _triangle: &Triangle,
        _depth: u32,
    ) -> Payload {
        *payload
    }
}

/// Flat background color.
#[derive(Debug, Clone, Copy)]
pub struct BackgroundMiss {
    pub color: Color,
}

impl BackgroundMiss {
    pub fn new(color: Color) -> Self {
        Self { color }
    }
}

impl MissShader for BackgroundMiss {
    fn miss(&self, _ray: &Ray) -> Payload {
        Payload::miss(self.color)
    }
}

/// Miss shader for occlusion tracers: only the `t = -1` sentinel matters.
#[derive(Debug, Clone, Copy, Default)]
pub struct ShadowMiss;

impl MissShader for ShadowMiss {
    fn miss(&self, _ray: &Ray) -> Payload {
        Payload::miss(Color::ZERO)
    }
}

/// The three shader slots of one tracer.
#[derive(Clone)]
pub struct ShaderSet {
    pub miss: Arc<dyn MissShader>,
    pub any_hit: Arc<dyn AnyHitShader>,
    pub closest_hit: Arc<dyn ClosestHitShader>,
}

impl ShaderSet {
    pub fn with_miss(mut self, shader: impl MissShader + 'static) -> Self {
        self.miss = Arc::new(shader);
        self
    }

    pub fn with_any_hit(mut self, shader: impl AnyHitShader + 'static) -> Self {
        self.any_hit = Arc::new(shader);
        self
    }

    pub fn with_closest_hit(mut self, shader: impl ClosestHitShader + 'static) -> Self {
        self.closest_hit = Arc::new(shader);
        self
    }
}

impl Default for ShaderSet {
    fn default() -> Self {
        Self {
            miss: Arc::new(NoopMiss),
            any_hit: Arc::new(NoopAnyHit),
            closest_hit: Arc::new(NoopClosestHit),
        }
    }
}

impl std::fmt::Debug for ShaderSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShaderSet").finish_non_exhaustive()
    }
}
