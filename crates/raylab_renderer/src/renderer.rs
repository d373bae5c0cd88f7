//! Whole-scene rendering.
//!
//! Wires a primary tracer and a shadow tracer over one shared acceleration
//! structure and runs ray generation with the configured settings.

use std::sync::Arc;
use std::time::Instant;

use raylab_core::{BuildError, Light, SceneGeometry};
use raylab_math::CameraBasis;
use thiserror::Error;

use crate::{
    BackgroundMiss, Color, ConfigError, DiffuseBounce, DirectLighting, RayTracer, RenderSettings,
    RenderTarget, ShadowMiss,
};

/// Anything that stops a render before an image is produced.
#[derive(Error, Debug)]
pub enum RenderError {
    #[error(transparent)]
    Build(#[from] BuildError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Renders scenes with fixed settings.
#[derive(Debug, Clone)]
pub struct SceneRenderer {
    settings: RenderSettings,
    seed: Option<u64>,
}

impl SceneRenderer {
    /// Validates `settings` up front.
    pub fn new(settings: RenderSettings) -> Result<Self, RenderError> {
        settings.validate()?;
        Ok(Self {
            settings,
            seed: None,
        })
    }

    /// Fix the render seed (tests and reproducible renders).
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn settings(&self) -> &RenderSettings {
        &self.settings
    }

    /// Render `geometry` as seen from `camera`.
    ///
    /// `lights` are only used when direct lighting is enabled.
    pub fn render(
        &self,
        geometry: Arc<SceneGeometry>,
        lights: &[Light],
        camera: &CameraBasis,
    ) -> Result<RenderTarget, RenderError> {
        let settings = &self.settings;

        let mut primary = RayTracer::new(settings.width, settings.height)?;
        primary.set_max_distance(settings.max_distance)?;
        primary.set_parallel(settings.parallel);
        primary.set_seed(self.seed);
        primary.build_acceleration_structure(geometry)?;
        primary.clear_render_target(Color::ZERO);
        primary.set_miss_shader(BackgroundMiss::new(settings.background_color()));

        if settings.direct_lighting {
            let mut shadow = RayTracer::new(1, 1)?;
            shadow.set_max_distance(settings.max_distance)?;
            if let Some(acceleration) = primary.acceleration_structure() {
                shadow.set_acceleration_structure(acceleration);
            }
            shadow.set_miss_shader(ShadowMiss);
            primary.set_closest_hit_shader(DirectLighting::new(Arc::new(shadow), lights.to_vec()));
        } else {
            primary.set_closest_hit_shader(DiffuseBounce);
        }

        log::info!(
            "Rendering {}x{} @ {} spp, depth {}",
            settings.width,
            settings.height,
            settings.samples_per_pixel,
            settings.raytracing_depth
        );
        let start = Instant::now();
        primary.ray_generation(camera, settings.raytracing_depth, settings.samples_per_pixel)?;
        log::info!("Raytracing time: {:.2?}", start.elapsed());

        Ok(primary.into_render_target())
    }
}
