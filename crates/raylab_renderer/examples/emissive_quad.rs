//! Emissive quad example.
//!
//! Renders a grey floor lit by a glowing quad and saves a PNG.
//!
//! Usage: `cargo run --example emissive_quad [settings.json] [output.png]`

use std::sync::Arc;

use anyhow::Context;
use raylab_renderer::{
    Camera, Color, Light, RenderSettings, SceneGeometry, SceneRenderer, Shape, Vec3, Vertex,
};

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut args = std::env::args().skip(1);
    let settings = match args.next() {
        Some(path) => {
            let json = std::fs::read_to_string(&path)
                .with_context(|| format!("reading settings from {}", path))?;
            RenderSettings::from_json(&json)?
        }
        None => RenderSettings {
            width: 400,
            height: 300,
            raytracing_depth: 2,
            samples_per_pixel: 64,
            background: [0.05, 0.05, 0.08],
            direct_lighting: true,
            ..Default::default()
        },
    };
    let output = args.next().unwrap_or_else(|| "emissive_quad.png".to_string());

    let geometry = Arc::new(build_scene());
    let lights = [Light::new(Vec3::new(-2.0, 3.0, 2.0), Vec3::splat(6.0))];

    // Off to the right, looking back at the origin and slightly down
    let camera = Camera::new(Vec3::new(1.5, 1.5, 5.0), -17.0, -15.0).with_fov(50.0);

    let renderer = SceneRenderer::new(settings)?;
    let target = renderer.render(geometry, &lights, &camera.basis())?;

    target
        .to_image()
        .save(&output)
        .with_context(|| format!("saving {}", output))?;
    log::info!("Saved to {}", output);

    Ok(())
}

fn quad(corners: [Vec3; 4], diffuse: Color, emissive: Color) -> Shape {
    let vertices = corners
        .iter()
        .map(|&p| Vertex::new(p, Vec3::ZERO).with_diffuse(diffuse).with_emissive(emissive))
        .collect();
    let mut shape = Shape::new(vertices, vec![0, 1, 2, 0, 2, 3]);
    shape.compute_normals();
    shape
}

fn build_scene() -> SceneGeometry {
    let mut geometry = SceneGeometry::empty();

    // Floor, facing up
    geometry.add_shape(quad(
        [
            Vec3::new(-4.0, 0.0, 4.0),
            Vec3::new(4.0, 0.0, 4.0),
            Vec3::new(4.0, 0.0, -4.0),
            Vec3::new(-4.0, 0.0, -4.0),
        ],
        Color::splat(0.6),
        Color::ZERO,
    ));

    // Light panel, facing the camera
    geometry.add_shape(quad(
        [
            Vec3::new(-1.0, 0.5, -1.0),
            Vec3::new(1.0, 0.5, -1.0),
            Vec3::new(1.0, 2.0, -1.0),
            Vec3::new(-1.0, 2.0, -1.0),
        ],
        Color::ZERO,
        Color::new(4.0, 3.2, 2.4),
    ));

    geometry
}
