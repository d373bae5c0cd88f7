use glam::Vec3;

/// The four vectors ray generation needs from a camera.
///
/// `right` and `up` are expected to be scaled so that a screen coordinate of
/// ±1 maps to the edge of the field of view; `direction` is unit length.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraBasis {
    pub position: Vec3,
    pub direction: Vec3,
    pub right: Vec3,
    pub up: Vec3,
}

impl CameraBasis {
    /// Basis looking down -Z from `position` with a 90 degree vertical FOV.
    pub fn looking_down_z(position: Vec3) -> Self {
        Self {
            position,
            direction: Vec3::NEG_Z,
            right: Vec3::X,
            up: Vec3::Y,
        }
    }
}

/// Orbit-style camera described by a position and two angles.
///
/// `theta` rotates around the world Y axis, `phi` tilts up and down. Both
/// angles and the field of view are in degrees. With both angles at zero the
/// camera looks down -Z.
#[derive(Debug, Clone, Copy)]
pub struct Camera {
    pub position: Vec3,
    pub theta: f32,
    pub phi: f32,
    pub fov_y: f32,
}

impl Camera {
    /// Create a new camera
    pub fn new(position: Vec3, theta: f32, phi: f32) -> Self {
        Self {
            position,
            theta,
            phi,
            fov_y: 60.0,
        }
    }

    /// Set the vertical field of view in degrees.
    pub fn with_fov(mut self, fov_y: f32) -> Self {
        self.fov_y = fov_y;
        self
    }

    /// Unit view direction.
    pub fn direction(&self) -> Vec3 {
        let theta = self.theta.to_radians();
        let phi = self.phi.to_radians();
        Vec3::new(
            theta.sin() * phi.cos(),
            phi.sin(),
            -theta.cos() * phi.cos(),
        )
    }

    /// Unit vector to the right of the view direction.
    pub fn right(&self) -> Vec3 {
        self.direction().cross(Vec3::Y).normalize_or_zero()
    }

    /// Unit vector completing the right-handed basis.
    pub fn up(&self) -> Vec3 {
        self.right().cross(self.direction())
    }

    /// Basis with `right`/`up` scaled by the half-angle of the field of view.
    pub fn basis(&self) -> CameraBasis {
        let half_height = (self.fov_y.to_radians() * 0.5).tan();
        CameraBasis {
            position: self.position,
            direction: self.direction(),
            right: self.right() * half_height,
            up: self.up() * half_height,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < 1e-5
    }

    #[test]
    fn test_default_orientation() {
        let camera = Camera::new(Vec3::new(0.0, 1.0, 3.0), 0.0, 0.0);

        assert!(approx(camera.direction(), Vec3::NEG_Z));
        assert!(approx(camera.right(), Vec3::X));
        assert!(approx(camera.up(), Vec3::Y));
    }

    #[test]
    fn test_basis_is_orthogonal() {
        let camera = Camera::new(Vec3::ZERO, 35.0, -20.0);
        let basis = camera.basis();

        assert!((basis.direction.length() - 1.0).abs() < 1e-5);
        assert!(basis.direction.dot(basis.right).abs() < 1e-5);
        assert!(basis.direction.dot(basis.up).abs() < 1e-5);
        assert!(basis.right.dot(basis.up).abs() < 1e-5);
    }

    #[test]
    fn test_fov_scales_basis() {
        let basis = Camera::new(Vec3::ZERO, 0.0, 0.0).with_fov(90.0).basis();

        assert!((basis.up.length() - 1.0).abs() < 1e-5);
        assert!(approx_basis(basis, CameraBasis::looking_down_z(Vec3::ZERO)));
    }

    fn approx_basis(a: CameraBasis, b: CameraBasis) -> bool {
        approx(a.position, b.position)
            && approx(a.direction, b.direction)
            && approx(a.right, b.right)
            && approx(a.up, b.up)
    }
}
