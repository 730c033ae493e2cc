//! Primary ray generation on the image plane.
//!
//! Work is split by contiguous column ranges of the image, one range per
//! worker, and joined before returning. Each worker produces its rays into a
//! local block which is then scattered into the row-major slot columns.

use glam::Vec3A;
use rayon::prelude::*;

use crate::chunk::compute_chunks;
use crate::columns::RayColumns;
use crate::random::{self, worker_rng, Stage};
use crate::ray::Ray;

/// Everything needed to shoot primary rays through the image plane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayContext {
    /// Camera position; every primary ray points away from it.
    pub camera_origin: Vec3A,
    /// World position of the image plane's top-left corner.
    pub top_left: Vec3A,
    /// Unit vector along the image plane's rows.
    pub right: Vec3A,
    /// Unit vector along the image plane's columns, pointing up.
    pub up: Vec3A,
    /// World-space distance between neighbouring pixels.
    pub pixel_spacing: f32,
    /// Viewport width in pixels.
    pub width: usize,
    /// Viewport height in pixels.
    pub height: usize,
}

impl RayContext {
    /// Number of pixels in the viewport.
    pub fn num_pixels(&self) -> usize {
        self.width * self.height
    }

    /// Point on the image plane for pixel `(x, y)` offset by `jitter` pixels.
    ///
    /// A zero jitter gives the pixel's top-left corner, not its center.
    pub fn sample_point(&self, x: usize, y: usize, jitter: (f32, f32)) -> Vec3A {
        let across = self.pixel_spacing * (x as f32 + jitter.0);
        let down = self.pixel_spacing * (y as f32 + jitter.1);
        self.top_left + self.right * across - self.up * down
    }

    /// Primary ray starting on the image plane, pointing away from the camera.
    pub fn primary_ray(&self, x: usize, y: usize, jitter: (f32, f32)) -> Ray {
        let point = self.sample_point(x, y, jitter);
        Ray {
            origin: point,
            direction: (point - self.camera_origin).normalize_or_zero(),
        }
    }
}

/// Jitter policy for primary rays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Jitter {
    /// Always sample the pixel corner; fully deterministic.
    Off,
    /// Uniform offset in `[0, 1)^2` pixels per ray.
    Uniform {
        /// Optional base seed; `None` draws from OS entropy.
        seed: Option<u64>,
        /// Sample index, mixed into the per-worker stream.
        sample: u32,
    },
}

impl Jitter {
    /// Jitter policy for a run with `sample_count` target samples.
    pub fn for_sample_count(sample_count: u32, seed: Option<u64>, sample: u32) -> Self {
        if sample_count > 1 {
            Jitter::Uniform { seed, sample }
        } else {
            Jitter::Off
        }
    }
}

/// Fill `columns.origins` and `columns.directions` for every pixel.
///
/// The columns must already hold `ctx.num_pixels()` slots. Bounce budget and
/// colors are not touched.
pub fn sample_rays(ctx: &RayContext, columns: &mut RayColumns, threads: usize, jitter: Jitter) {
    debug_assert_eq!(columns.len(), ctx.num_pixels());

    let column_ranges = compute_chunks(ctx.width, threads);
    let blocks: Vec<Vec<Ray>> = column_ranges
        .par_iter()
        .enumerate()
        .map(|(worker, range)| {
            let mut rng = match jitter {
                Jitter::Off => None,
                Jitter::Uniform { seed, sample } => {
                    Some(worker_rng(seed, sample, Stage::Sampling, worker))
                }
            };

            let mut block = Vec::with_capacity(range.len() * ctx.height);
            for x in range.range() {
                for y in 0..ctx.height {
                    let offset = match rng.as_mut() {
                        Some(rng) => (random::random_f32(rng), random::random_f32(rng)),
                        None => (0.0, 0.0),
                    };
                    block.push(ctx.primary_ray(x, y, offset));
                }
            }
            block
        })
        .collect();

    for (range, block) in column_ranges.iter().zip(blocks) {
        let mut rays = block.into_iter();
        for x in range.range() {
            for y in 0..ctx.height {
                if let Some(ray) = rays.next() {
                    let index = x + y * ctx.width;
                    columns.origins[index] = ray.origin;
                    columns.directions[index] = ray.direction;
                }
            }
        }
    }
}
