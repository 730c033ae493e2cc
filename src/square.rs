//! Axis-aligned square primitive.
//!
//! The square lies in the plane `z = center.z` and spans `size` along X and Y.
//! It is two-sided: the reported normal always faces the incoming ray.

use glam::Vec3A;

use crate::hittable::{HitRecord, Hittable, ShapeKind};
use crate::interval::Interval;
use crate::material::MaterialType;
use crate::ray::Ray;

/// Square in the XY plane defined by center, side length, and material.
#[derive(Debug, Clone)]
pub struct Square {
    /// Center of the square in world coordinates.
    pub center: Vec3A,
    /// Side length (non-negative).
    pub size: f32,
    /// Material properties determining light interaction.
    pub material: MaterialType,
}

impl Square {
    /// Create a new square; negative sizes are clamped to 0.0.
    pub fn new(center: Vec3A, size: f32, material: MaterialType) -> Self {
        Self {
            center,
            size: size.max(0.0),
            material,
        }
    }
}

impl Hittable for Square {
    fn kind(&self) -> ShapeKind {
        ShapeKind::Square { size: self.size }
    }

    fn center(&self) -> Vec3A {
        self.center
    }

    fn material(&self) -> MaterialType {
        self.material
    }

    fn hit(&self, r: &Ray, ray_t: Interval) -> Option<HitRecord> {
        // Parallel to the plane
        if r.direction.z == 0.0 {
            return None;
        }

        let t = (self.center.z - r.origin.z) / r.direction.z;
        if !ray_t.surrounds(t) {
            return None;
        }

        let p = r.at(t);
        let half = self.size / 2.0;
        if (p.x - self.center.x).abs() > half || (p.y - self.center.y).abs() > half {
            return None;
        }

        let normal = if r.direction.z < 0.0 { Vec3A::Z } else { -Vec3A::Z };
        Some(HitRecord {
            p,
            normal,
            t,
            material: self.material,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square_ahead() -> Square {
        Square::new(Vec3A::new(0.0, 0.0, -3.0), 2.0, MaterialType::Diffuse)
    }

    #[test]
    fn test_ray_square_hit() {
        let ray = Ray::new(Vec3A::new(0.5, -0.5, 0.0), Vec3A::new(0.0, 0.0, -1.0));
        let rec = square_ahead()
            .hit(&ray, Interval::hit_window(f32::INFINITY))
            .expect("ray should hit");
        assert!((rec.t - 3.0).abs() < 1e-6);
        assert_eq!(rec.normal, Vec3A::Z);
        assert_eq!(rec.material, MaterialType::Diffuse);
    }

    #[test]
    fn test_normal_faces_ray_from_behind() {
        let ray = Ray::new(Vec3A::new(0.0, 0.0, -6.0), Vec3A::new(0.0, 0.0, 1.0));
        let rec = square_ahead()
            .hit(&ray, Interval::hit_window(f32::INFINITY))
            .expect("ray should hit");
        assert_eq!(rec.normal, -Vec3A::Z);
    }

    #[test]
    fn test_ray_outside_extent_misses() {
        let ray = Ray::new(Vec3A::new(1.5, 0.0, 0.0), Vec3A::new(0.0, 0.0, -1.0));
        assert!(square_ahead()
            .hit(&ray, Interval::hit_window(f32::INFINITY))
            .is_none());
    }

    #[test]
    fn test_parallel_ray_misses() {
        let ray = Ray::new(Vec3A::new(0.0, 0.0, -3.0), Vec3A::new(1.0, 0.0, 0.0));
        assert!(square_ahead()
            .hit(&ray, Interval::hit_window(f32::INFINITY))
            .is_none());
    }
}
