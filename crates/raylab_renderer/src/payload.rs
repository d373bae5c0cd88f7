//! Per-trace result record.

use raylab_math::Vec3;

/// Color type alias (linear RGB, values typically 0-1)
pub type Color = Vec3;

/// What one `trace_ray` call produces.
///
/// Before the closest-hit shader runs, `t` and `bary` describe the hit; the
/// shader writes the final `color`. A negative `t` means nothing was hit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Payload {
    /// Hit distance along the ray, or [`Payload::NO_HIT`]
    pub t: f32,
    /// Barycentric weights of the hit triangle's vertices a, b and c
    pub bary: Vec3,
    /// Accumulated color
    pub color: Color,
}

impl Payload {
    /// Sentinel `t` for "no surface".
    pub const NO_HIT: f32 = -1.0;

    /// A miss carrying a background color.
    pub fn miss(color: Color) -> Self {
        Self {
            t: Self::NO_HIT,
            bary: Vec3::ZERO,
            color,
        }
    }

    /// A hit with no color yet.
    pub fn hit(t: f32, bary: Vec3) -> Self {
        Self {
            t,
            bary,
            color: Color::ZERO,
        }
    }

    pub fn is_hit(&self) -> bool {
        self.t >= 0.0
    }
}

impl Default for Payload {
    fn default() -> Self {
        Self::miss(Color::ZERO)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_hit_classification() {
        assert!(!Payload::default().is_hit());
        assert!(!Payload::miss(Color::ONE).is_hit());

        let hit = Payload::hit(2.5, Vec3::new(0.2, 0.3, 0.5));
        assert!(hit.is_hit());
        assert_eq!(hit.color, Color::ZERO);
    }
}
