//! Whole-pipeline renders of small scenes.

use std::sync::Arc;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use raylab_renderer::{
    BackgroundMiss, BuildError, Camera, CameraBasis, Color, DiffuseBounce, Ray, RayTracer,
    RenderError, RenderSettings, SceneGeometry, SceneRenderer, ShadowMiss, Shape,
    Vec3, Vertex,
};

const BACKGROUND: Color = Color::new(0.1, 0.2, 0.3);

fn unit_emissive_triangle() -> Shape {
    let v = |x: f32, y: f32| {
        Vertex::new(Vec3::new(x, y, 0.0), Vec3::Z)
            .with_diffuse(Color::ZERO)
            .with_emissive(Color::ONE)
    };
    Shape::new(vec![v(-1.0, -1.0), v(1.0, -1.0), v(0.0, 1.0)], vec![0, 1, 2])
}

/// Large square in the z = 0 plane, facing +Z.
fn floor(diffuse: Color, emissive: Color) -> Shape {
    let v = |x: f32, y: f32| {
        Vertex::new(Vec3::new(x, y, 0.0), Vec3::Z)
            .with_diffuse(diffuse)
            .with_emissive(emissive)
    };
    Shape::new(
        vec![v(-100.0, -100.0), v(100.0, -100.0), v(100.0, 100.0), v(-100.0, 100.0)],
        vec![0, 1, 2, 0, 2, 3],
    )
}

fn tracer(size: u32, shapes: Vec<Shape>, background: Color) -> RayTracer {
    let mut tracer = RayTracer::new(size, size).unwrap().with_seed(0x5EED);
    tracer
        .build_acceleration_structure(Arc::new(SceneGeometry::new(shapes)))
        .unwrap();
    tracer.set_miss_shader(BackgroundMiss::new(background));
    tracer.set_closest_hit_shader(DiffuseBounce);
    tracer
}

fn camera() -> CameraBasis {
    CameraBasis::looking_down_z(Vec3::new(0.0, 0.0, 2.0))
}

fn variance(values: &[f32]) -> f32 {
    let mean = values.iter().sum::<f32>() / values.len() as f32;
    values.iter().map(|v| (v - mean) * (v - mean)).sum::<f32>() / values.len() as f32
}

#[test]
fn unit_emissive_triangle_renders_emission_or_background() {
    let mut tracer = tracer(8, vec![unit_emissive_triangle()], BACKGROUND);
    tracer.ray_generation(&camera(), 0, 1).unwrap();

    let target = tracer.render_target();
    assert!(target
        .pixels()
        .iter()
        .all(|&p| p == Color::ONE || p == BACKGROUND));
    assert_eq!(target.get(4, 4), Color::ONE);
    assert_eq!(target.get(0, 0), BACKGROUND);
    assert_eq!(target.get(7, 0), BACKGROUND);
}

#[test]
fn unit_emissive_triangle_through_scene_renderer() {
    let settings = RenderSettings {
        width: 8,
        height: 8,
        samples_per_pixel: 4,
        background: BACKGROUND.to_array(),
        parallel: true,
        ..Default::default()
    };
    let renderer = SceneRenderer::new(settings).unwrap().with_seed(9);

    // Orbit camera at rest with a 90 degree field of view
    let camera = Camera::new(Vec3::new(0.0, 0.0, 2.0), 0.0, 0.0).with_fov(90.0);
    let target = renderer
        .render(
            Arc::new(SceneGeometry::new(vec![unit_emissive_triangle()])),
            &[],
            &camera.basis(),
        )
        .unwrap();

    assert!((target.get(4, 4) - Color::ONE).abs().max_element() < 1e-6);
    assert!((target.get(0, 7) - BACKGROUND).abs().max_element() < 1e-6);
    assert_eq!(target.to_image().get_pixel(0, 7).0[3], 255);
}

#[test]
fn empty_scene_renders_background() {
    let mut tracer = tracer(4, Vec::new(), BACKGROUND);
    tracer.ray_generation(&camera(), 3, 2).unwrap();

    assert!(tracer.render_target().pixels().iter().all(|&p| p == BACKGROUND));
}

#[test]
fn malformed_geometry_leaves_target_untouched() {
    let mut tracer = RayTracer::new(4, 4).unwrap();
    tracer.clear_render_target(Color::X);

    let ragged = Shape::new(
        vec![
            Vertex::new(Vec3::ZERO, Vec3::Z),
            Vertex::new(Vec3::X, Vec3::Z),
            Vertex::new(Vec3::Y, Vec3::Z),
        ],
        vec![0, 1, 2, 0],
    );
    let result = tracer.build_acceleration_structure(Arc::new(SceneGeometry::new(vec![ragged])));

    assert!(matches!(result, Err(BuildError::IndexCountMismatch { .. })));
    assert!(tracer.acceleration_structure().is_none());
    assert!(tracer.render_target().pixels().iter().all(|&p| p == Color::X));
}

#[test]
fn malformed_geometry_aborts_scene_render() {
    let renderer = SceneRenderer::new(RenderSettings {
        width: 4,
        height: 4,
        ..Default::default()
    })
    .unwrap();
    let out_of_range = Shape::new(vec![Vertex::new(Vec3::ZERO, Vec3::Z)], vec![0, 0, 5]);

    let result = renderer.render(Arc::new(SceneGeometry::new(vec![out_of_range])), &[], &camera());
    assert!(matches!(
        result,
        Err(RenderError::Build(BuildError::IndexOutOfRange { index: 5, .. }))
    ));
}

#[test]
fn depth_zero_renders_emission_only() {
    let emission = Color::splat(0.25);
    // A bright sky that any bounce would add to the floor
    let mut tracer = tracer(6, vec![floor(Color::ONE, emission)], Color::splat(5.0));
    tracer.ray_generation(&camera(), 0, 4).unwrap();

    assert!(tracer
        .render_target()
        .pixels()
        .iter()
        .all(|&p| (p - emission).abs().max_element() < 1e-6));
}

/// Value of a single-pixel render of a diffuse floor under a white sky,
/// repeated over a range of seeds.
fn pixel_over_seeds(samples_per_pixel: u32) -> Vec<f32> {
    let mut tracer = tracer(1, vec![floor(Color::ONE, Color::ZERO)], Color::ONE);
    (0..40)
        .map(|seed| {
            tracer.set_seed(Some(seed));
            tracer.ray_generation(&camera(), 1, samples_per_pixel).unwrap();
            tracer.render_target().get(0, 0).x
        })
        .collect()
}

#[test]
fn more_samples_reduce_variance() {
    let one = variance(&pixel_over_seeds(1));
    let eight = variance(&pixel_over_seeds(8));
    let sixty_four = variance(&pixel_over_seeds(64));

    assert!(one > 0.0);
    assert!(eight < one);
    assert!(sixty_four < eight);
}

#[test]
fn parallel_and_sequential_renders_match() {
    let shapes = || vec![floor(Color::splat(0.8), Color::ZERO), unit_emissive_triangle()];

    let mut sequential = tracer(12, shapes(), Color::ONE);
    sequential.set_parallel(false);
    sequential.ray_generation(&camera(), 2, 3).unwrap();

    let mut parallel = tracer(12, shapes(), Color::ONE);
    parallel.set_parallel(true);
    parallel.ray_generation(&camera(), 2, 3).unwrap();

    assert_eq!(sequential.render_target(), parallel.render_target());
}

#[test]
fn same_seed_same_image() {
    let mut first = tracer(8, vec![floor(Color::ONE, Color::ZERO)], Color::ONE);
    first.ray_generation(&camera(), 1, 2).unwrap();
    let first = first.into_render_target();

    let mut second = tracer(8, vec![floor(Color::ONE, Color::ZERO)], Color::ONE);
    second.ray_generation(&camera(), 1, 2).unwrap();

    assert_eq!(&first, second.render_target());
}

#[test]
fn shadow_tracer_sees_primary_occluders() {
    let primary = tracer(
        2,
        vec![unit_emissive_triangle(), floor(Color::ONE, Color::ZERO)],
        BACKGROUND,
    );
    let acceleration = primary.acceleration_structure().unwrap();

    let mut shadow = RayTracer::new(1, 1).unwrap();
    shadow.set_acceleration_structure(acceleration.clone());
    shadow.set_miss_shader(ShadowMiss);

    let mut rng = StdRng::seed_from_u64(21);
    for _ in 0..200 {
        let origin = Vec3::new(
            rng.gen_range(-3.0..3.0),
            rng.gen_range(-3.0..3.0),
            rng.gen_range(0.5..3.0),
        );
        let direction = Vec3::new(
            rng.gen_range(-1.0..1.0),
            rng.gen_range(-1.0..1.0),
            rng.gen_range(-1.0..-0.1),
        );
        let ray = Ray::new(origin, direction);

        assert_eq!(
            acceleration.intersect(&ray, 50.0).is_some(),
            shadow.trace_any(&ray, 50.0).is_hit()
        );
    }
}
