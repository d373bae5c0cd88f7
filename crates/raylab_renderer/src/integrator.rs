//! Closest-hit shaders that turn hits into light.

use std::sync::Arc;

use rand::RngCore;
use raylab_core::Light;
use raylab_math::{Ray, Vec3};

use crate::{gen_f32, ClosestHitShader, Payload, RayTracer, TraceContext, Triangle};

/// Distance secondary rays start off the surface, along the normal.
pub const SURFACE_OFFSET: f32 = 1e-4;

/// Random direction in the hemisphere around `normal`.
///
/// Components are uniform in [-1, 1] and the result is normalized, so the
/// distribution is not uniform over the sphere. Directions below the surface
/// are mirrored rather than resampled.
pub fn random_hemisphere_direction(rng: &mut dyn RngCore, normal: Vec3) -> Vec3 {
    let v = Vec3::new(
        gen_f32(rng) * 2.0 - 1.0,
        gen_f32(rng) * 2.0 - 1.0,
        gen_f32(rng) * 2.0 - 1.0,
    );
    let direction = v.normalize_or_zero();
    if direction == Vec3::ZERO {
        return normal;
    }
    if direction.dot(normal) < 0.0 {
        -direction
    } else {
        direction
    }
}

/// Hit position and interpolated shading normal.
fn surface_point(ray: &Ray, payload: &Payload, triangle: &Triangle) -> (Vec3, Vec3) {
    (ray.at(payload.t), triangle.interpolate_normal(payload.bary))
}

/// One-bounce diffuse integrator.
///
/// Returns the triangle's emission, plus (below the depth limit) one random
/// bounce weighted by the diffuse color and the cosine term.
#[derive(Debug, Clone, Copy, Default)]
pub struct DiffuseBounce;

impl ClosestHitShader for DiffuseBounce {
    fn closest_hit(
        &self,
        ctx: &mut TraceContext<'_>,
        ray: &Ray,
        payload: &mut Payload,
        triangle: &Triangle,
        depth: u32,
    ) -> Payload {
        let (position, normal) = surface_point(ray, payload, triangle);
        let mut color = triangle.emissive;

        if depth < ctx.max_depth() {
            let direction = random_hemisphere_direction(ctx.rng(), normal);
            let bounce = Ray::new(position + normal * SURFACE_OFFSET, direction);
            let next = ctx.trace_ray(&bounce, depth + 1);
            color += triangle.diffuse * next.color * normal.dot(direction).max(0.0);
        }

        payload.color = color;
        *payload
    }
}

/// [`DiffuseBounce`] plus shadowed point lights.
///
/// Occlusion is tested with a separate tracer, normally one sharing the
/// primary tracer's acceleration structure.
pub struct DirectLighting {
    shadow: Arc<RayTracer>,
    lights: Vec<Light>,
    bounce: DiffuseBounce,
}

impl DirectLighting {
    pub fn new(shadow: Arc<RayTracer>, lights: Vec<Light>) -> Self {
        Self {
            shadow,
            lights,
            bounce: DiffuseBounce,
        }
    }

    pub fn lights(&self) -> &[Light] {
        &self.lights
    }

    fn light_contribution(&self, position: Vec3, normal: Vec3, triangle: &Triangle) -> Vec3 {
        let origin = position + normal * SURFACE_OFFSET;

        self.lights
            .iter()
            .filter_map(|light| {
                let to_light = light.position - origin;
                let distance_squared = to_light.length_squared();
                if !(distance_squared > 0.0) {
                    return None;
                }
                let distance = distance_squared.sqrt();
                let direction = to_light / distance;
                let cos_theta = normal.dot(direction);
                if cos_theta <= 0.0 {
                    return None;
                }

                let shadow_ray = Ray::new(origin, direction);
                if self.shadow.trace_any(&shadow_ray, distance).is_hit() {
                    return None;
                }
                Some(triangle.diffuse * light.intensity * cos_theta / distance_squared)
            })
            .sum()
    }
}

impl ClosestHitShader for DirectLighting {
    fn closest_hit(
        &self,
        ctx: &mut TraceContext<'_>,
        ray: &Ray,
        payload: &mut Payload,
        triangle: &Triangle,
        depth: u32,
    ) -> Payload {
        let mut result = self.bounce.closest_hit(ctx, ray, payload, triangle, depth);
        let (position, normal) = surface_point(ray, payload, triangle);
        result.color += self.light_contribution(position, normal, triangle);

        payload.color = result.color;
        *payload
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{BackgroundMiss, Color, ShadowMiss};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use raylab_core::{SceneGeometry, Shape, Vertex};

    /// Axis-aligned square facing +Z, centered at `center`.
    fn square(center: Vec3, half: f32, diffuse: Color, emissive: Color) -> Shape {
        let v = |dx: f32, dy: f32| {
            Vertex::new(center + Vec3::new(dx * half, dy * half, 0.0), Vec3::Z)
                .with_diffuse(diffuse)
                .with_emissive(emissive)
        };
        Shape::new(
            vec![v(-1.0, -1.0), v(1.0, -1.0), v(1.0, 1.0), v(-1.0, 1.0)],
            vec![0, 1, 2, 0, 2, 3],
        )
    }

    fn tracer_for(shapes: Vec<Shape>) -> RayTracer {
        let mut tracer = RayTracer::new(1, 1).unwrap();
        tracer
            .build_acceleration_structure(Arc::new(SceneGeometry::new(shapes)))
            .unwrap();
        tracer
    }

    #[test]
    fn test_hemisphere_direction_faces_normal() {
        let mut rng = StdRng::seed_from_u64(7);
        let normal = Vec3::new(1.0, 2.0, -0.5).normalize();

        for _ in 0..500 {
            let d = random_hemisphere_direction(&mut rng, normal);
            assert!(d.dot(normal) >= 0.0);
            assert!((d.length() - 1.0).abs() < 1e-4);
        }
    }

    #[test]
    fn test_depth_zero_is_emission_only() {
        let mut tracer = tracer_for(vec![square(Vec3::ZERO, 1.0, Color::ONE, Color::new(0.3, 0.6, 0.9))]);
        tracer.set_closest_hit_shader(DiffuseBounce);
        // A bright sky that any bounce would pick up
        tracer.set_miss_shader(BackgroundMiss::new(Color::splat(10.0)));

        let mut rng = StdRng::seed_from_u64(3);
        let ray = Ray::new(Vec3::new(0.1, 0.2, 1.0), Vec3::NEG_Z);
        let payload = tracer.trace_ray(&ray, 0, 0, &mut rng);
        assert!((payload.color - Color::new(0.3, 0.6, 0.9)).abs().max_element() < 1e-6);
    }

    #[test]
    fn test_bounce_gathers_background() {
        let mut tracer = tracer_for(vec![square(Vec3::ZERO, 1.0, Color::ONE, Color::ZERO)]);
        tracer.set_closest_hit_shader(DiffuseBounce);
        tracer.set_miss_shader(BackgroundMiss::new(Color::ONE));

        let mut rng = StdRng::seed_from_u64(11);
        let ray = Ray::new(Vec3::new(0.1, 0.2, 1.0), Vec3::NEG_Z);

        let mut total = 0.0;
        for _ in 0..64 {
            let color = tracer.trace_ray(&ray, 0, 1, &mut rng).color;
            assert!(color.x >= 0.0 && color.x <= 1.0);
            total += color.x;
        }
        assert!(total > 0.0);
    }

    #[test]
    fn test_direct_lighting_respects_occluders() {
        // Shaded point, kept off the floor's diagonal
        let p = Vec3::new(0.3, -0.4, 0.0);
        let floor = square(Vec3::ZERO, 1.0, Color::splat(0.5), Color::ZERO);
        let blocker = square(p + Vec3::Z, 0.1, Color::ZERO, Color::ZERO);
        let mut primary = tracer_for(vec![floor, blocker]);

        let mut shadow = RayTracer::new(1, 1).unwrap();
        shadow.set_acceleration_structure(primary.acceleration_structure().unwrap());
        shadow.set_miss_shader(ShadowMiss);
        let shadow = Arc::new(shadow);

        // Starts under the blocker and looks at p
        let ray = Ray::new(p + Vec3::new(1.0, 0.0, 0.5), Vec3::new(-1.0, 0.0, -0.5));
        let mut rng = StdRng::seed_from_u64(5);

        let hidden = Light::new(p + Vec3::new(0.0, 0.0, 2.0), Vec3::splat(4.0));
        primary.set_closest_hit_shader(DirectLighting::new(shadow.clone(), vec![hidden]));
        let payload = primary.trace_ray(&ray, 0, 0, &mut rng);
        assert!(payload.is_hit());
        assert_eq!(payload.color, Color::ZERO);

        let visible = Light::new(p + Vec3::new(1.5, 0.0, 2.0), Vec3::splat(4.0));
        primary.set_closest_hit_shader(DirectLighting::new(shadow, vec![visible]));
        let payload = primary.trace_ray(&ray, 0, 0, &mut rng);

        // 0.5 * 4 * cos / d^2 with d = 2.5, cos = 0.8
        assert!((payload.color.x - 0.256).abs() < 1e-3);
    }
}
