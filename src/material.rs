//! Material system for ray tracing.
//!
//! Two material types: a normal visualization that terminates the path, and a
//! Lambertian-style diffuse bounce that halves the ray color each hit.

use glam::{IVec3, Vec3A};
use rand::Rng;

use crate::hittable::HitRecord;
use crate::random;
use crate::ray::Ray;

/// Integer RGB carried by a ray slot, each channel nominally in [0, 255].
pub type Color = IVec3;

/// Color every ray starts a sample with.
pub const WHITE: Color = IVec3::splat(255);

/// Color factor applied on every diffuse bounce.
pub const DIFFUSE_ATTENUATION: f32 = 0.5;

/// Material types for ray tracing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MaterialType {
    /// Paints the outward surface normal and ends the path.
    #[default]
    Normal,
    /// Matte surface: scatters into the normal's hemisphere and attenuates.
    Diffuse,
}

/// What a hit does to a ray slot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Response {
    /// Path ends here with a final color.
    Terminate {
        /// Final color of the ray slot.
        color: Color,
    },
    /// Path continues from the hit point.
    Bounce {
        /// Ray leaving the surface.
        scattered: Ray,
        /// Factor multiplied into the ray color.
        attenuation: f32,
    },
}

impl MaterialType {
    /// Compute the response of this material to a recorded hit.
    pub fn respond<R: Rng + ?Sized>(&self, rec: &HitRecord, rng: &mut R) -> Response {
        match self {
            MaterialType::Normal => Response::Terminate {
                color: normal_color(rec.normal),
            },
            MaterialType::Diffuse => {
                let direction = random::random_on_hemisphere(rng, rec.normal);
                Response::Bounce {
                    scattered: Ray::new(rec.p, direction),
                    attenuation: DIFFUSE_ATTENUATION,
                }
            }
        }
    }
}

/// Map a unit normal from [-1, 1]^3 to [0, 255]^3.
pub fn normal_color(normal: Vec3A) -> Color {
    ((normal + Vec3A::ONE) * 0.5 * 255.0).as_ivec3()
}

/// Scale an integer color, truncating toward zero.
pub fn attenuate(color: Color, factor: f32) -> Color {
    (color.as_vec3a() * factor).as_ivec3()
}

/// Tint an integer color by a float color in [0, 1]^3, truncating toward zero.
pub fn tint(color: Color, by: Vec3A) -> Color {
    (color.as_vec3a() / 255.0 * by * 255.0).as_ivec3()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::{worker_rng, Stage};

    fn record(normal: Vec3A, material: MaterialType) -> HitRecord {
        HitRecord {
            p: Vec3A::new(0.0, 0.0, -4.0),
            normal,
            t: 4.0,
            material,
        }
    }

    #[test]
    fn test_normal_material_terminates_with_normal_color() {
        let mut rng = worker_rng(Some(0), 0, Stage::Bounce(0), 0);
        let rec = record(Vec3A::Z, MaterialType::Normal);
        assert_eq!(
            MaterialType::Normal.respond(&rec, &mut rng),
            Response::Terminate {
                color: IVec3::new(127, 127, 255)
            }
        );
    }

    #[test]
    fn test_diffuse_bounces_into_hemisphere() {
        let mut rng = worker_rng(Some(0), 0, Stage::Bounce(0), 0);
        let rec = record(Vec3A::Z, MaterialType::Diffuse);
        for _ in 0..100 {
            match MaterialType::Diffuse.respond(&rec, &mut rng) {
                Response::Bounce {
                    scattered,
                    attenuation,
                } => {
                    assert_eq!(scattered.origin, rec.p);
                    assert!(scattered.direction.dot(rec.normal) >= 0.0);
                    assert!((scattered.direction.length() - 1.0).abs() < 1e-4);
                    assert_eq!(attenuation, DIFFUSE_ATTENUATION);
                }
                other => panic!("expected bounce, got {:?}", other),
            }
        }
    }

    #[test]
    fn test_integer_color_math_truncates() {
        assert_eq!(attenuate(WHITE, 0.5), IVec3::splat(127));
        assert_eq!(attenuate(IVec3::splat(127), 0.5), IVec3::splat(63));
        assert_eq!(tint(WHITE, Vec3A::ONE), WHITE);
        assert_eq!(tint(WHITE, Vec3A::new(0.5, 0.7, 1.0)), IVec3::new(127, 178, 255));
    }
}
