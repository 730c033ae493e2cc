//! Ray-object intersection system.
//!
//! Defines the Hittable trait every shape kind implements once, HitRecord for
//! storing intersection data, and HittableList, the ordered scene the
//! intersector walks without knowing concrete shape types.

use glam::Vec3A;

use crate::interval::Interval;
use crate::material::MaterialType;
use crate::ray::Ray;

/// Ray-object intersection information.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitRecord {
    /// Point where the ray intersects the object
    pub p: Vec3A,
    /// Outward surface normal at the intersection point (unit vector)
    pub normal: Vec3A,
    /// Distance along the ray to the intersection point
    pub t: f32,
    /// Material of the object at the hit point
    pub material: MaterialType,
}

/// Shape kind tag with its shape-specific parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ShapeKind {
    /// Sphere of the given radius.
    Sphere {
        /// Sphere radius.
        radius: f32,
    },
    /// Axis-aligned square in the XY plane with the given side length.
    Square {
        /// Side length.
        size: f32,
    },
}

/// Trait for objects that can be intersected by rays.
///
/// Must be thread-safe (Sync + Send) since every chunk worker reads the scene
/// concurrently.
pub trait Hittable: Sync + Send {
    /// Shape kind tag and parameters.
    fn kind(&self) -> ShapeKind;

    /// Center position in world coordinates.
    fn center(&self) -> Vec3A;

    /// Surface material.
    fn material(&self) -> MaterialType;

    /// Test for ray intersection strictly inside the given parameter range.
    fn hit(&self, r: &Ray, ray_t: Interval) -> Option<HitRecord>;
}

/// Collection of objects forming a scene.
///
/// Insertion order is the iteration order, which only matters when two shapes
/// report exactly the same hit distance: the first one inserted wins.
#[derive(Default)]
pub struct HittableList {
    /// Vector of boxed hittable objects
    pub objects: Vec<Box<dyn Hittable>>,
}

impl HittableList {
    /// Create a new empty scene.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an object to the scene.
    pub fn add(&mut self, object: Box<dyn Hittable>) {
        self.objects.push(object);
    }

    /// Number of objects in the scene.
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// True if the scene has no objects.
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Iterate objects in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &dyn Hittable> {
        self.objects.iter().map(|object| object.as_ref())
    }
}

impl std::fmt::Debug for HittableList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.iter().map(|object| (object.kind(), object.center())))
            .finish()
    }
}
