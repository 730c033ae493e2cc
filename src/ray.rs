//! Ray representation for 3D ray tracing.
//!
//! A ray is defined as r(t) = origin + t * direction, representing a semi-infinite
//! line in 3D space used for intersection testing.

use glam::Vec3A;

/// Ray in 3D space defined by origin and unit direction.
///
/// Mathematical representation: r(t) = origin + t * direction
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    /// Starting point of the ray in world coordinates.
    ///
    /// A point on the image plane for primary rays, or the previous hit
    /// point for bounced rays.
    pub origin: Vec3A,

    /// Unit direction vector of the ray.
    ///
    /// Kept normalized so that `t` is a world-space distance. A degenerate
    /// (zero) input direction stays zero and never intersects anything.
    pub direction: Vec3A,
}

impl Ray {
    /// Create a new ray, normalizing the direction.
    pub fn new(origin: Vec3A, direction: Vec3A) -> Self {
        Self {
            origin,
            direction: direction.normalize_or_zero(),
        }
    }

    /// Compute a point at parameter t along the ray.
    ///
    /// Returns r(t) = origin + t * direction.
    pub fn at(&self, t: f32) -> Vec3A {
        self.origin + t * self.direction
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_is_normalized() {
        let ray = Ray::new(Vec3A::ZERO, Vec3A::new(0.0, 3.0, -4.0));
        assert!((ray.direction.length() - 1.0).abs() < 1e-6);
        assert!((ray.at(5.0) - Vec3A::new(0.0, 3.0, -4.0)).length() < 1e-5);
    }

    #[test]
    fn test_zero_direction_stays_zero() {
        let ray = Ray::new(Vec3A::ONE, Vec3A::ZERO);
        assert_eq!(ray.direction, Vec3A::ZERO);
        assert_eq!(ray.at(10.0), Vec3A::ONE);
    }
}
