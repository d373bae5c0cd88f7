//! Render settings and configuration errors.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::Color;

/// Deepest recursion accepted. Every level of a bounce is a native stack
/// frame, so the limit keeps closed scenes from overflowing the stack.
pub const MAX_RAYTRACING_DEPTH: u32 = 64;

/// Invalid viewport, sample or distance settings. Raised before any ray is
/// traced.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("viewport must be at least 1x1, got {width}x{height}")]
    ZeroViewport { width: u32, height: u32 },

    #[error("samples per pixel must be at least 1")]
    ZeroSamples,

    #[error("raytracing depth {depth} exceeds the limit of {max}")]
    DepthTooLarge { depth: u32, max: u32 },

    #[error("max trace distance must be a positive number, got {0}")]
    InvalidMaxDistance(f32),

    #[error("failed to parse render settings: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Everything the renderer can be configured with.
///
/// Missing fields take their defaults when deserializing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderSettings {
    /// Viewport width in pixels
    pub width: u32,
    /// Viewport height in pixels
    pub height: u32,
    /// Maximum recursion depth (0 = emission only, no bounce), at most
    /// [`MAX_RAYTRACING_DEPTH`]
    pub raytracing_depth: u32,
    /// Stochastic samples averaged per pixel
    pub samples_per_pixel: u32,
    /// Linear RGB color returned for rays that hit nothing
    pub background: [f32; 3],
    /// Farthest hit distance considered
    pub max_distance: f32,
    /// Render rows on the rayon thread pool
    pub parallel: bool,
    /// Add shadowed point-light contribution on top of the diffuse bounce
    pub direct_lighting: bool,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            width: 800,
            height: 450,
            raytracing_depth: 1,
            samples_per_pixel: 16,
            background: [0.0, 0.0, 0.0],
            max_distance: 1000.0,
            parallel: true,
            direct_lighting: false,
        }
    }
}

impl RenderSettings {
    /// Parse settings from JSON and validate them.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let settings: Self = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_viewport(self.width, self.height)?;
        validate_depth(self.raytracing_depth)?;
        if self.samples_per_pixel == 0 {
            return Err(ConfigError::ZeroSamples);
        }
        if !(self.max_distance > 0.0) {
            return Err(ConfigError::InvalidMaxDistance(self.max_distance));
        }
        Ok(())
    }

    pub fn background_color(&self) -> Color {
        Color::from_array(self.background)
    }
}

pub(crate) fn validate_viewport(width: u32, height: u32) -> Result<(), ConfigError> {
    if width == 0 || height == 0 {
        return Err(ConfigError::ZeroViewport { width, height });
    }
    Ok(())
}

pub(crate) fn validate_depth(depth: u32) -> Result<(), ConfigError> {
    if depth > MAX_RAYTRACING_DEPTH {
        return Err(ConfigError::DepthTooLarge {
            depth,
            max: MAX_RAYTRACING_DEPTH,
        });
    }
    Ok(())
}
