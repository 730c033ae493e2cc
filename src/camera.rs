//! Pinhole camera producing the ray context for a viewport.

use glam::Vec3A;

use crate::sampler::RayContext;

/// Pinhole camera with an image plane placed in front of it.
///
/// Only used to derive a [`RayContext`]; the engine itself never looks at the
/// camera.
#[derive(Debug, Clone)]
pub struct Camera {
    /// Vertical field of view in degrees
    pub vfov: f32,
    /// Point camera is looking from (camera position)
    pub lookfrom: Vec3A,
    /// Point camera is looking at (look target)
    pub lookat: Vec3A,
    /// Camera-relative "up" direction vector
    pub vup: Vec3A,
    /// Distance from the camera to the image plane
    pub plane_distance: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self::new()
    }
}

impl Camera {
    /// Creates a new camera at the origin looking down -Z with a 45 degree FOV.
    pub fn new() -> Self {
        Self {
            vfov: 45.0,
            lookfrom: Vec3A::ZERO,
            lookat: Vec3A::new(0.0, 0.0, -1.0),
            vup: Vec3A::Y,
            plane_distance: 1.0,
        }
    }

    /// Build the ray context for a `width` x `height` viewport.
    ///
    /// Pixels are square: the horizontal spacing is reused vertically.
    pub fn ray_context(&self, width: usize, height: usize) -> RayContext {
        let width_px = width.max(1) as f32;
        let height_px = height.max(1) as f32;

        // Determine image plane dimensions
        let theta = self.vfov.to_radians();
        let plane_height = 2.0 * (theta / 2.0).tan() * self.plane_distance;
        let plane_width = plane_height * (width_px / height_px);

        // Camera frame: u right, v up, w opposite the view direction
        let w = (self.lookfrom - self.lookat).normalize();
        let u = self.vup.cross(w).normalize();
        let v = w.cross(u);

        let plane_center = self.lookfrom - self.plane_distance * w;
        let top_left = plane_center - u * (plane_width / 2.0) + v * (plane_height / 2.0);

        RayContext {
            camera_origin: self.lookfrom,
            top_left,
            right: u,
            up: v,
            pixel_spacing: plane_width / width_px,
            width,
            height,
        }
    }
}
