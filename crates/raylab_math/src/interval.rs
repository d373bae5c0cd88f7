/// A range of ray distances, or one axis of a bounding box.
///
/// Hit tests treat the bounds as open (`surrounds`); box construction treats
/// them as closed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Interval {
    pub min: f32,
    pub max: f32,
}

impl Interval {
    /// Range with no members; `surrounding` it with anything yields the other range.
    pub const EMPTY: Interval = Interval {
        min: f32::INFINITY,
        max: f32::NEG_INFINITY,
    };

    pub fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    /// Width of the range. Negative for `EMPTY`.
    pub fn size(&self) -> f32 {
        self.max - self.min
    }

    /// Strict containment: `min < x < max`.
    pub fn surrounds(&self, x: f32) -> bool {
        self.min < x && x < self.max
    }

    /// Grow by `delta` in total, half on each side.
    pub fn expand(&self, delta: f32) -> Interval {
        let half = delta * 0.5;
        Interval::new(self.min - half, self.max + half)
    }

    /// Smallest range covering both `a` and `b`.
    pub fn surrounding(a: &Interval, b: &Interval) -> Interval {
        Interval::new(a.min.min(b.min), a.max.max(b.max))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_surrounds_excludes_bounds() {
        let hit_range = Interval::new(1e-3, 10.0);

        assert!(!hit_range.surrounds(1e-3));
        assert!(!hit_range.surrounds(10.0));
        assert!(!hit_range.surrounds(0.0));
        assert!(hit_range.surrounds(5.0));
    }

    #[test]
    fn test_expand_pads_both_sides() {
        let padded = Interval::new(2.0, 2.0).expand(1e-4);

        assert!(padded.size() > 0.0);
        assert!(padded.surrounds(2.0));
        assert!((padded.min + padded.max - 4.0).abs() < 1e-6);
    }

    #[test]
    fn test_empty_is_identity_for_surrounding() {
        assert!(Interval::EMPTY.size() < 0.0);
        assert!(!Interval::EMPTY.surrounds(0.0));

        let axis = Interval::new(-1.0, 3.0);
        assert_eq!(Interval::surrounding(&Interval::EMPTY, &axis), axis);
        assert_eq!(Interval::surrounding(&axis, &Interval::new(2.0, 7.0)), Interval::new(-1.0, 7.0));
    }
}
