//! Per-sample bounce loop.
//!
//! A sample moves through `Initializing -> Bouncing(0..max_bounces) ->
//! Resolved`. Every bounce step fans the chunk intersector out over the rayon
//! pool and joins before the miss pass reads the closest-hit column, so no
//! chunk can start bounce `k + 1` while another is still on bounce `k`.

use glam::Vec3A;
use log::{debug, trace};
use rayon::prelude::*;

use crate::chunk::{compute_chunks, Chunk};
use crate::columns::RayColumns;
use crate::config::TracerConfig;
use crate::hittable::HittableList;
use crate::intersect::trace_chunk;
use crate::material;
use crate::random::{worker_rng, Stage};
use crate::sampler::{sample_rays, Jitter, RayContext};

/// Sky color straight up.
pub const SKY_ZENITH: Vec3A = Vec3A::new(0.5, 0.7, 1.0);

/// Sky color straight down.
pub const SKY_NADIR: Vec3A = Vec3A::ONE;

/// Background gradient for a unit direction, blending white to light blue by `y`.
pub fn sky_color(direction: Vec3A) -> Vec3A {
    let a = 0.5 * (direction.y + 1.0);
    (1.0 - a) * SKY_NADIR + a * SKY_ZENITH
}

/// Where a sample is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleState {
    /// Resetting ray state and shooting primary rays.
    Initializing,
    /// Running the given bounce step.
    Bouncing(u32),
    /// Every slot has a final color.
    Resolved,
}

/// Summary of one traced sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SampleReport {
    /// Bounce steps actually run.
    pub steps: u32,
    /// Total slot hits over all steps.
    pub hits: usize,
    /// Total slots resolved against the sky.
    pub misses: usize,
}

/// Ray state plus the chunking used to trace it.
#[derive(Debug, Clone)]
pub struct BounceEngine {
    columns: RayColumns,
    chunks: Vec<Chunk>,
    max_bounces: u32,
    threads: usize,
    seed: Option<u64>,
}

impl BounceEngine {
    /// Engine for `num_rays` slots split into `threads` chunks.
    pub fn new(num_rays: usize, max_bounces: u32, threads: usize, seed: Option<u64>) -> Self {
        let threads = threads.max(1);
        Self {
            columns: RayColumns::new(num_rays),
            chunks: compute_chunks(num_rays, threads),
            max_bounces,
            threads,
            seed,
        }
    }

    /// Engine sized and tuned from a configuration.
    pub fn from_config(config: &TracerConfig) -> Self {
        Self::new(
            config.num_pixels(),
            config.max_bounces,
            config.threads,
            config.seed,
        )
    }

    /// Recreate the columns for `num_rays` slots and recompute the chunks.
    pub fn resize(&mut self, num_rays: usize) {
        debug!(
            "Resizing ray state from {} to {} slots",
            self.columns.len(),
            num_rays
        );
        self.columns.resize(num_rays);
        self.chunks = compute_chunks(num_rays, self.threads);
    }

    /// Change the bounce budget used from the next sample on.
    pub fn set_max_bounces(&mut self, max_bounces: u32) {
        self.max_bounces = max_bounces;
    }

    /// Per-slot ray state as left by the last sample.
    pub fn columns(&self) -> &RayColumns {
        &self.columns
    }

    /// Current chunk layout.
    pub fn chunks(&self) -> &[Chunk] {
        &self.chunks
    }

    /// Number of ray slots.
    pub fn num_rays(&self) -> usize {
        self.columns.len()
    }

    /// Bounce budget per ray.
    pub fn max_bounces(&self) -> u32 {
        self.max_bounces
    }

    /// Base seed for worker generators.
    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    /// Trace one full sample; `columns().colors` holds the result afterwards.
    pub fn trace_sample(
        &mut self,
        scene: &HittableList,
        ctx: &RayContext,
        jitter: Jitter,
        sample: u32,
    ) -> SampleReport {
        let mut report = SampleReport::default();
        let mut state = SampleState::Initializing;

        loop {
            state = match state {
                SampleState::Initializing => {
                    if ctx.num_pixels() != self.columns.len() {
                        self.resize(ctx.num_pixels());
                    }
                    self.columns.reset(self.max_bounces);
                    sample_rays(ctx, &mut self.columns, self.threads, jitter);
                    self.next_step(0)
                }
                SampleState::Bouncing(step) => {
                    let (hits, misses) = self.bounce(scene, step, sample);
                    report.steps = step + 1;
                    report.hits += hits;
                    report.misses += misses;

                    if self.columns.active_count() == 0 {
                        trace!("Sample {} resolved early after step {}", sample, step);
                        SampleState::Resolved
                    } else {
                        self.next_step(step + 1)
                    }
                }
                SampleState::Resolved => break,
            };
        }

        report
    }

    fn next_step(&self, step: u32) -> SampleState {
        if step < self.max_bounces {
            SampleState::Bouncing(step)
        } else {
            SampleState::Resolved
        }
    }

    /// One bounce step over every chunk, then the miss pass.
    fn bounce(&mut self, scene: &HittableList, step: u32, sample: u32) -> (usize, usize) {
        self.columns.clear_hits();

        let seed = self.seed;
        let hits: usize = self
            .columns
            .split_chunks(&self.chunks)
            .into_par_iter()
            .map(|mut view| {
                let mut rng = worker_rng(seed, sample, Stage::Bounce(step), view.index);
                trace_chunk(&mut view, scene, &mut rng)
            })
            .sum();

        let misses = resolve_misses(&mut self.columns);
        trace!(
            "Sample {} step {}: {} hits, {} sky misses",
            sample,
            step,
            hits,
            misses
        );
        (hits, misses)
    }
}

/// Resolve every active slot that hit nothing this bounce against the sky.
///
/// Returns the number of slots resolved.
pub fn resolve_misses(columns: &mut RayColumns) -> usize {
    let mut misses = 0;
    for i in 0..columns.len() {
        if columns.steps[i] > 0 && columns.closest[i] == f32::INFINITY {
            columns.colors[i] = material::tint(columns.colors[i], sky_color(columns.directions[i]));
            columns.steps[i] = 0;
            misses += 1;
        }
    }
    misses
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::{MaterialType, WHITE};
    use crate::sphere::Sphere;
    use glam::IVec3;

    fn context(width: usize, height: usize) -> RayContext {
        RayContext {
            camera_origin: Vec3A::new(0.0, 0.0, 1.0),
            top_left: Vec3A::new(-1.0, 1.0, 0.0),
            right: Vec3A::X,
            up: Vec3A::Y,
            pixel_spacing: 2.0 / width as f32,
            width,
            height,
        }
    }

    fn sphere_scene(material: MaterialType) -> HittableList {
        let mut scene = HittableList::new();
        scene.add(Box::new(Sphere::new(Vec3A::new(0.0, 0.0, -3.0), 1.5, material)));
        scene
    }

    fn expected_sky(direction: Vec3A) -> IVec3 {
        material::tint(WHITE, sky_color(direction))
    }

    #[test]
    fn test_sky_gradient_endpoints() {
        assert_eq!(sky_color(Vec3A::Y), SKY_ZENITH);
        assert_eq!(sky_color(-Vec3A::Y), SKY_NADIR);
    }

    #[test]
    fn test_empty_scene_resolves_to_sky_on_first_step() {
        let ctx = context(6, 4);
        let mut engine = BounceEngine::new(ctx.num_pixels(), 8, 3, Some(1));
        let report = engine.trace_sample(&HittableList::new(), &ctx, Jitter::Off, 0);

        assert_eq!(report.steps, 1);
        assert_eq!(report.hits, 0);
        assert_eq!(report.misses, ctx.num_pixels());
        let columns = engine.columns();
        for i in 0..columns.len() {
            assert_eq!(columns.steps[i], 0);
            assert_eq!(columns.colors[i], expected_sky(columns.directions[i]));
        }
    }

    #[test]
    fn test_shapes_outside_view_match_empty_scene() {
        let ctx = context(6, 4);
        let mut behind = HittableList::new();
        behind.add(Box::new(Sphere::new(
            Vec3A::new(0.0, 0.0, 50.0),
            2.0,
            MaterialType::Diffuse,
        )));

        let mut empty_engine = BounceEngine::new(ctx.num_pixels(), 8, 3, None);
        let mut behind_engine = BounceEngine::new(ctx.num_pixels(), 8, 3, None);
        empty_engine.trace_sample(&HittableList::new(), &ctx, Jitter::Off, 0);
        behind_engine.trace_sample(&behind, &ctx, Jitter::Off, 0);
        assert_eq!(empty_engine.columns().colors, behind_engine.columns().colors);
    }

    #[test]
    fn test_zero_radius_spheres_on_pixel_rays_match_empty_scene() {
        let ctx = context(16, 12);
        for material in [MaterialType::Normal, MaterialType::Diffuse] {
            let mut scene = HittableList::new();
            for (x, y) in [(0, 0), (3, 7), (8, 6), (11, 2), (15, 11)] {
                let ray = ctx.primary_ray(x, y, (0.0, 0.0));
                scene.add(Box::new(Sphere::new(ray.at(2.5), 0.0, material)));
            }

            let mut empty_engine = BounceEngine::new(ctx.num_pixels(), 8, 3, Some(4));
            let mut engine = BounceEngine::new(ctx.num_pixels(), 8, 3, Some(4));
            empty_engine.trace_sample(&HittableList::new(), &ctx, Jitter::Off, 0);
            let report = engine.trace_sample(&scene, &ctx, Jitter::Off, 0);

            assert_eq!(report.hits, 0);
            assert_eq!(engine.columns().colors, empty_engine.columns().colors);
        }
    }

    #[test]
    fn test_normal_material_paints_normals() {
        let ctx = context(4, 4);
        let mut engine = BounceEngine::new(ctx.num_pixels(), 8, 2, None);
        let report = engine.trace_sample(&sphere_scene(MaterialType::Normal), &ctx, Jitter::Off, 0);
        assert_eq!(report.steps, 1);

        // Pixel (2, 2) looks straight down the view axis at the sphere
        let center = 2 + 2 * ctx.width;
        assert_eq!(engine.columns().colors[center], IVec3::new(127, 127, 255));
        assert_eq!(engine.columns().steps[center], 0);
    }

    #[test]
    fn test_bounce_budget_is_monotonic_and_bounded() {
        let ctx = context(8, 8);
        let scene = sphere_scene(MaterialType::Diffuse);
        let mut engine = BounceEngine::new(ctx.num_pixels(), 5, 4, Some(11));

        engine.columns.reset(engine.max_bounces);
        sample_rays(&ctx, &mut engine.columns, engine.threads, Jitter::Off);
        let mut previous = engine.columns.steps.clone();
        for step in 0..engine.max_bounces {
            engine.bounce(&scene, step, 0);
            for (now, before) in engine.columns.steps.iter().zip(&previous) {
                assert!(now <= before);
            }
            previous = engine.columns.steps.clone();
        }
        assert!(previous.iter().all(|&steps| steps == 0));
    }

    #[test]
    fn test_seeded_diffuse_sample_is_reproducible() {
        let ctx = context(8, 8);
        let scene = sphere_scene(MaterialType::Diffuse);
        let mut a = BounceEngine::new(ctx.num_pixels(), 6, 4, Some(5));
        let mut b = BounceEngine::new(ctx.num_pixels(), 6, 4, Some(5));
        let jitter = Jitter::Uniform {
            seed: Some(5),
            sample: 0,
        };
        a.trace_sample(&scene, &ctx, jitter, 0);
        b.trace_sample(&scene, &ctx, jitter, 0);
        assert_eq!(a.columns().colors, b.columns().colors);
    }

    #[test]
    fn test_context_resize_recomputes_chunks() {
        let mut engine = BounceEngine::new(4, 3, 3, None);
        let ctx = context(5, 5);
        engine.trace_sample(&HittableList::new(), &ctx, Jitter::Off, 0);
        assert_eq!(engine.num_rays(), 25);
        assert_eq!(engine.chunks().iter().map(Chunk::len).sum::<usize>(), 25);
    }
}
