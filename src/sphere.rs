//! Sphere primitive for ray tracing.
//!
//! Ray-sphere intersection via the half-b form of the quadratic formula.

use glam::Vec3A;

use crate::hittable::{HitRecord, Hittable, ShapeKind};
use crate::interval::Interval;
use crate::material::MaterialType;
use crate::ray::Ray;

/// Sphere primitive defined by center, radius, and material.
#[derive(Debug, Clone)]
pub struct Sphere {
    /// Center point of the sphere in world coordinates.
    pub center: Vec3A,

    /// Radius of the sphere (always non-negative).
    ///
    /// Negative radius values are clamped to 0.0 in the constructor. A zero
    /// radius sphere is never hit.
    pub radius: f32,

    /// Material properties determining light interaction.
    pub material: MaterialType,
}

impl Sphere {
    /// Create a new sphere.
    ///
    /// Negative radius values are clamped to 0.0.
    pub fn new(center: Vec3A, radius: f32, material: MaterialType) -> Self {
        Self {
            center,
            radius: radius.max(0.0),
            material,
        }
    }
}

impl Hittable for Sphere {
    fn kind(&self) -> ShapeKind {
        ShapeKind::Sphere {
            radius: self.radius,
        }
    }

    fn center(&self) -> Vec3A {
        self.center
    }

    fn material(&self) -> MaterialType {
        self.material
    }

    fn hit(&self, r: &Ray, ray_t: Interval) -> Option<HitRecord> {
        let oc = r.origin - self.center;

        // a*t^2 + 2*half_b*t + c = 0
        let a = r.direction.length_squared();
        // Degenerate sphere or ray: the normal would divide by zero
        if a == 0.0 || self.radius == 0.0 {
            return None;
        }
        let half_b = r.direction.dot(oc);
        let c = oc.length_squared() - self.radius * self.radius;

        let discriminant = half_b * half_b - a * c;
        if discriminant <= 0.0 {
            return None;
        }

        // Only the nearer root is considered
        let t = (-half_b - discriminant.sqrt()) / a;
        if !ray_t.surrounds(t) {
            return None;
        }

        let p = r.at(t);
        let normal = (p - self.center) / self.radius;
        if !normal.is_finite() {
            return None;
        }
        Some(HitRecord {
            p,
            normal,
            t,
            material: self.material,
        })
    }
}
