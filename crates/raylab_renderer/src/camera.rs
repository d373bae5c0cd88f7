//! Primary ray generation from a camera basis.

use rand::RngCore;
use raylab_math::{CameraBasis, Ray, Vec2};

use crate::gen_f32;

/// Ray through pixel (x, y) at sub-pixel offset `jitter` in [0, 1)².
///
/// Screen coordinates run from -1 to 1 vertically and are stretched by the
/// aspect ratio horizontally; row 0 is the top of the image.
pub fn primary_ray(basis: &CameraBasis, x: u32, y: u32, width: u32, height: u32, jitter: Vec2) -> Ray {
    let width_f = width as f32;
    let height_f = height as f32;

    let u = (2.0 * (x as f32 + jitter.x) / width_f - 1.0) * (width_f / height_f);
    let v = 2.0 * (y as f32 + jitter.y) / height_f - 1.0;

    let direction = basis.direction + u * basis.right - v * basis.up;
    Ray::new(basis.position, direction)
}

/// Sample a random point in the unit square [0, 1) x [0, 1).
pub fn sample_square(rng: &mut dyn RngCore) -> Vec2 {
    Vec2::new(gen_f32(rng), gen_f32(rng))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use raylab_math::Vec3;

    #[test]
    fn test_center_ray_points_forward() {
        let basis = CameraBasis::looking_down_z(Vec3::new(0.0, 0.0, 2.0));

        // Pixel corner at the exact image center
        let ray = primary_ray(&basis, 50, 50, 100, 100, Vec2::ZERO);
        assert_eq!(ray.origin, Vec3::new(0.0, 0.0, 2.0));
        assert!((ray.direction - Vec3::NEG_Z).length() < 1e-5);
    }

    #[test]
    fn test_rows_run_top_to_bottom() {
        let basis = CameraBasis::looking_down_z(Vec3::ZERO);

        let top = primary_ray(&basis, 0, 0, 10, 10, Vec2::splat(0.5));
        let bottom = primary_ray(&basis, 0, 9, 10, 10, Vec2::splat(0.5));
        assert!(top.direction.y > 0.0);
        assert!(bottom.direction.y < 0.0);
        assert!(top.direction.x < 0.0);
    }

    #[test]
    fn test_aspect_ratio_stretches_horizontally() {
        let basis = CameraBasis::looking_down_z(Vec3::ZERO);

        // Right edge of a 2:1 image reaches u = 2
        let ray = primary_ray(&basis, 200, 50, 200, 100, Vec2::ZERO);
        let unnormalized = ray.direction / ray.direction.z.abs();
        assert!((unnormalized.x - 2.0).abs() < 1e-4);
    }

    #[test]
    fn test_sample_square_range() {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..100 {
            let s = sample_square(&mut rng);
            assert!((0.0..1.0).contains(&s.x));
            assert!((0.0..1.0).contains(&s.y));
        }
    }
}
