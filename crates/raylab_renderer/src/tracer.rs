//! Ray tracer engine.
//!
//! A `RayTracer` owns a viewport-sized render target, a shader set and a
//! handle to an acceleration structure. Several tracers can share one
//! structure: a primary tracer builds it, a shadow tracer gets the same
//! `Arc` with different shaders.
//!
//! Shaders re-enter the engine through a [`TraceContext`], which carries the
//! tracer, the render's random generator and the depth limit.

use std::sync::Arc;

use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use rayon::prelude::*;
use raylab_core::{BuildError, SceneGeometry};
use raylab_math::{CameraBasis, Ray};

use crate::camera::{primary_ray, sample_square};
use crate::settings::{validate_depth, validate_viewport};
use crate::{
    AccelerationStructure, AnyHitShader, ClosestHitShader, Color, ConfigError, MissShader, Payload,
    RenderTarget, ShaderSet,
};

/// Farthest hit distance considered unless configured otherwise.
pub const DEFAULT_MAX_DISTANCE: f32 = 1000.0;

/// The read-only half of a tracer: what shaders may reach while the render
/// target is being written.
struct Pipeline {
    acceleration: Option<Arc<AccelerationStructure>>,
    shaders: ShaderSet,
    max_distance: f32,
}

/// Samples gathered for one pixel.
#[derive(Clone, Copy)]
struct PixelSamples {
    sum: Color,
    count: u32,
}

impl Pipeline {
    fn render_row(
        &self,
        camera: &CameraBasis,
        y: u32,
        (width, height): (u32, u32),
        max_depth: u32,
        samples_per_pixel: u32,
        rng: &mut dyn RngCore,
    ) -> Vec<PixelSamples> {
        let mut ctx = TraceContext {
            pipeline: self,
            rng,
            max_depth,
        };

        (0..width)
            .map(|x| {
                let mut samples = PixelSamples {
                    sum: Color::ZERO,
                    count: 0,
                };
                for _ in 0..samples_per_pixel {
                    let jitter = sample_square(ctx.rng());
                    let ray = primary_ray(camera, x, y, width, height, jitter);
                    let color = ctx.trace_ray(&ray, 0).color;

                    // A NaN from one sample must not poison the pixel
                    if color.is_finite() {
                        samples.sum += color;
                        samples.count += 1;
                    }
                }
                samples
            })
            .collect()
    }
}

/// Handle shaders use to trace further rays.
pub struct TraceContext<'a> {
    pipeline: &'a Pipeline,
    rng: &'a mut dyn RngCore,
    max_depth: u32,
}

impl TraceContext<'_> {
    /// Trace `ray` at recursion level `depth`.
    ///
    /// Finds the closest hit (with the any-hit shader filtering candidates),
    /// then runs the closest-hit shader, or the miss shader when nothing is
    /// hit. A call with `depth` above the limit is truncated: it returns a
    /// black no-hit payload without running any shader.
    pub fn trace_ray(&mut self, ray: &Ray, depth: u32) -> Payload {
        if depth > self.max_depth {
            log::trace!(
                "trace at depth {} exceeds limit {}, truncated",
                depth,
                self.max_depth
            );
            return Payload::miss(Color::ZERO);
        }

        let pipeline = self.pipeline;
        let shaders = &pipeline.shaders;
        let Some(acceleration) = pipeline.acceleration.as_deref() else {
            return shaders.miss.miss(ray);
        };

        let closest = acceleration.intersect_filtered(ray, pipeline.max_distance, |hit, triangle| {
            shaders
                .any_hit
                .any_hit(ray, &Payload::hit(hit.t, hit.bary), triangle)
        });
        let Some((hit, triangle)) = closest.and_then(|hit| Some((hit, acceleration.triangle(&hit)?)))
        else {
            return shaders.miss.miss(ray);
        };

        let mut payload = Payload::hit(hit.t, hit.bary);
        shaders
            .closest_hit
            .closest_hit(self, ray, &mut payload, &triangle, depth)
    }

    /// Deepest level shaders may recurse to.
    pub fn max_depth(&self) -> u32 {
        self.max_depth
    }

    /// The render's random generator.
    pub fn rng(&mut self) -> &mut dyn RngCore {
        &mut *self.rng
    }
}

/// Per-row generator derived from the render seed, so rows can be rendered
/// in any order (or in parallel) and still see the same random streams.
fn row_rng(base_seed: u64, y: u32) -> StdRng {
    StdRng::seed_from_u64(base_seed ^ (u64::from(y) + 1).wrapping_mul(0x9E37_79B9_7F4A_7C15))
}

/// Viewport, render target, shaders and a shared acceleration structure.
pub struct RayTracer {
    width: u32,
    height: u32,
    render_target: RenderTarget,
    /// Per-pixel sum of the finite samples of the last render
    accumulation: Vec<Color>,
    pipeline: Pipeline,
    seed: Option<u64>,
    parallel: bool,
}

impl RayTracer {
    /// Tracer with a black `width` x `height` target, no geometry and no-op
    /// shaders.
    pub fn new(width: u32, height: u32) -> Result<Self, ConfigError> {
        validate_viewport(width, height)?;
        Ok(Self {
            width,
            height,
            render_target: RenderTarget::new(width, height),
            accumulation: vec![Color::ZERO; width as usize * height as usize],
            pipeline: Pipeline {
                acceleration: None,
                shaders: ShaderSet::default(),
                max_distance: DEFAULT_MAX_DISTANCE,
            },
            seed: None,
            parallel: false,
        })
    }

    /// Fix the render seed. Production renders leave this unset and seed from
    /// entropy.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn set_seed(&mut self, seed: Option<u64>) {
        self.seed = seed;
    }

    /// Render rows on the rayon thread pool.
    pub fn set_parallel(&mut self, parallel: bool) {
        self.parallel = parallel;
    }

    /// Resize the viewport. The render target and accumulation buffer are
    /// reallocated (black) when the size changes.
    pub fn set_viewport(&mut self, width: u32, height: u32) -> Result<(), ConfigError> {
        validate_viewport(width, height)?;
        if (width, height) != (self.width, self.height) {
            self.width = width;
            self.height = height;
            self.render_target = RenderTarget::new(width, height);
            self.accumulation = vec![Color::ZERO; width as usize * height as usize];
        }
        Ok(())
    }

    pub fn viewport(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn set_max_distance(&mut self, max_distance: f32) -> Result<(), ConfigError> {
        if !(max_distance > 0.0) {
            return Err(ConfigError::InvalidMaxDistance(max_distance));
        }
        self.pipeline.max_distance = max_distance;
        Ok(())
    }

    /// Fill every pixel with a flat color.
    pub fn clear_render_target(&mut self, color: Color) {
        self.render_target.clear(color);
    }

    pub fn render_target(&self) -> &RenderTarget {
        &self.render_target
    }

    pub fn into_render_target(self) -> RenderTarget {
        self.render_target
    }

    /// Sample sums behind the last `ray_generation`, row-major.
    pub fn accumulation(&self) -> &[Color] {
        &self.accumulation
    }

    /// Build an acceleration structure over `geometry` and use it.
    ///
    /// On error the tracer keeps whatever structure it had before.
    pub fn build_acceleration_structure(
        &mut self,
        geometry: Arc<SceneGeometry>,
    ) -> Result<(), BuildError> {
        let acceleration = AccelerationStructure::build(geometry)?;
        self.pipeline.acceleration = Some(Arc::new(acceleration));
        Ok(())
    }

    /// Use a structure built elsewhere, typically by a primary tracer.
    pub fn set_acceleration_structure(&mut self, acceleration: Arc<AccelerationStructure>) {
        self.pipeline.acceleration = Some(acceleration);
    }

    /// Shared handle to the current structure, for handing to another tracer.
    pub fn acceleration_structure(&self) -> Option<Arc<AccelerationStructure>> {
        self.pipeline.acceleration.clone()
    }

    pub fn shaders(&self) -> &ShaderSet {
        &self.pipeline.shaders
    }

    pub fn set_shaders(&mut self, shaders: ShaderSet) {
        self.pipeline.shaders = shaders;
    }

    pub fn set_miss_shader(&mut self, shader: impl MissShader + 'static) {
        self.pipeline.shaders.miss = Arc::new(shader);
    }

    pub fn set_any_hit_shader(&mut self, shader: impl AnyHitShader + 'static) {
        self.pipeline.shaders.any_hit = Arc::new(shader);
    }

    pub fn set_closest_hit_shader(&mut self, shader: impl ClosestHitShader + 'static) {
        self.pipeline.shaders.closest_hit = Arc::new(shader);
    }

    /// Trace one ray outside of ray generation.
    pub fn trace_ray(&self, ray: &Ray, depth: u32, max_depth: u32, rng: &mut dyn RngCore) -> Payload {
        let mut ctx = TraceContext {
            pipeline: &self.pipeline,
            rng,
            max_depth,
        };
        ctx.trace_ray(ray, depth)
    }

    /// Occlusion query: the first candidate the any-hit shader does not
    /// ignore, within `max_distance`.
    ///
    /// Returns a payload with that candidate's `t` and barycentrics, or the
    /// miss shader's payload when the segment is clear. The closest-hit
    /// shader is not run.
    pub fn trace_any(&self, ray: &Ray, max_distance: f32) -> Payload {
        let shaders = &self.pipeline.shaders;
        let max_distance = max_distance.min(self.pipeline.max_distance);

        let hit = self.pipeline.acceleration.as_deref().and_then(|acceleration| {
            acceleration.first_hit(ray, max_distance, |hit, triangle| {
                shaders
                    .any_hit
                    .any_hit(ray, &Payload::hit(hit.t, hit.bary), triangle)
            })
        });

        match hit {
            Some(hit) => Payload::hit(hit.t, hit.bary),
            None => shaders.miss.miss(ray),
        }
    }

    /// Render every pixel of the viewport.
    ///
    /// Each pixel averages `samples_per_pixel` jittered primary rays traced
    /// at depth 0. Rows are written to the render target in row-major order;
    /// with the same seed, sequential and parallel renders are identical.
    ///
    /// Zero samples or a `max_depth` above [`crate::MAX_RAYTRACING_DEPTH`]
    /// fail before any pixel is written.
    pub fn ray_generation(
        &mut self,
        camera: &CameraBasis,
        max_depth: u32,
        samples_per_pixel: u32,
    ) -> Result<(), ConfigError> {
        if samples_per_pixel == 0 {
            return Err(ConfigError::ZeroSamples);
        }
        validate_depth(max_depth)?;

        let base_seed = self.seed.unwrap_or_else(rand::random);
        let viewport = (self.width, self.height);
        let pipeline = &self.pipeline;

        let render_row = |y: u32| {
            let mut rng = row_rng(base_seed, y);
            pipeline.render_row(camera, y, viewport, max_depth, samples_per_pixel, &mut rng)
        };
        let rows: Vec<Vec<PixelSamples>> = if self.parallel {
            (0..self.height).into_par_iter().map(render_row).collect()
        } else {
            (0..self.height).map(render_row).collect()
        };

        let mut dropped = 0u64;
        let sums = rows.iter().flatten().map(|samples| samples.sum);
        for (slot, sum) in self.accumulation.iter_mut().zip(sums) {
            *slot = sum;
        }
        for (y, row) in (0u32..).zip(rows) {
            for (x, samples) in (0u32..).zip(row) {
                dropped += u64::from(samples_per_pixel - samples.count);
                let color = if samples.count > 0 {
                    samples.sum / samples.count as f32
                } else {
                    Color::ZERO
                };
                self.render_target.set(x, y, color);
            }
        }

        if dropped > 0 {
            log::debug!("{} non-finite samples dropped", dropped);
        }
        log::debug!(
            "Ray generation done: {}x{} @ {} spp, depth {}",
            self.width,
            self.height,
            samples_per_pixel,
            max_depth
        );
        Ok(())
    }
}
