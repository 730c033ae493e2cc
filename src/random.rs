//! Random number generation for ray tracing.
//!
//! Every fork-join worker owns its own ChaCha20 generator. Without a seed the
//! generator is drawn from OS entropy, so two runs are not reproducible. With a
//! seed, each worker gets its own stream derived from the sample index, the
//! stage and the worker index, so output only depends on the seed and the
//! chunk count.

use glam::Vec3A;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;

/// Generator owned by a single worker for a single stage.
pub type WorkerRng = ChaCha20Rng;

/// Squared-length window accepted by the rejection sampler.
const MIN_LENGTH_SQUARED: f32 = 1e-40;

/// Fork-join stage a generator is created for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Primary ray generation.
    Sampling,
    /// Intersection pass for the given bounce step.
    Bounce(u32),
}

impl Stage {
    fn code(self) -> u64 {
        match self {
            Stage::Sampling => 0,
            Stage::Bounce(step) => step as u64 + 1,
        }
    }
}

/// Create the generator for one worker of one stage.
pub fn worker_rng(seed: Option<u64>, sample: u32, stage: Stage, worker: usize) -> WorkerRng {
    match seed {
        Some(seed) => {
            let mut rng = ChaCha20Rng::seed_from_u64(seed);
            rng.set_stream(stream_id(sample, stage, worker));
            rng
        }
        None => ChaCha20Rng::from_rng(&mut rand::rng()),
    }
}

/// Pack (sample, stage, worker) into a ChaCha stream id.
fn stream_id(sample: u32, stage: Stage, worker: usize) -> u64 {
    ((sample as u64) << 40) | ((stage.code() & 0xF_FFFF) << 20) | (worker as u64 & 0xF_FFFF)
}

/// Generate a random f32 in [0.0, 1.0)
pub fn random_f32<R: Rng + ?Sized>(rng: &mut R) -> f32 {
    rng.random()
}

/// Generate random unit vector by rejection sampling inside the [-1, 1) cube.
pub fn random_unit_vector<R: Rng + ?Sized>(rng: &mut R) -> Vec3A {
    loop {
        let p = Vec3A::new(
            rng.random_range(-1.0..1.0),
            rng.random_range(-1.0..1.0),
            rng.random_range(-1.0..1.0),
        );
        let length_squared = p.length_squared();
        if MIN_LENGTH_SQUARED < length_squared && length_squared <= 1.0 {
            return p / length_squared.sqrt();
        }
    }
}

/// Generate random unit vector on the hemisphere oriented by the given normal.
pub fn random_on_hemisphere<R: Rng + ?Sized>(rng: &mut R, normal: Vec3A) -> Vec3A {
    let on_unit_sphere = random_unit_vector(rng);
    if on_unit_sphere.dot(normal) < 0.0 {
        // Flip to the correct hemisphere
        -on_unit_sphere
    } else {
        on_unit_sphere
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seeded_workers_are_reproducible() {
        let mut a = worker_rng(Some(7), 3, Stage::Bounce(2), 5);
        let mut b = worker_rng(Some(7), 3, Stage::Bounce(2), 5);
        for _ in 0..16 {
            assert_eq!(random_f32(&mut a), random_f32(&mut b));
        }
    }

    #[test]
    fn test_seeded_workers_use_distinct_streams() {
        let mut a = worker_rng(Some(7), 0, Stage::Sampling, 0);
        let mut b = worker_rng(Some(7), 0, Stage::Sampling, 1);
        let xs: Vec<f32> = (0..8).map(|_| random_f32(&mut a)).collect();
        let ys: Vec<f32> = (0..8).map(|_| random_f32(&mut b)).collect();
        assert_ne!(xs, ys);
    }

    #[test]
    fn test_unit_vector_has_unit_length() {
        let mut rng = worker_rng(Some(1), 0, Stage::Bounce(0), 0);
        for _ in 0..1000 {
            let v = random_unit_vector(&mut rng);
            assert!((v.length() - 1.0).abs() < 1e-4);
        }
    }

    #[test]
    fn test_hemisphere_faces_normal() {
        let mut rng = worker_rng(Some(2), 0, Stage::Bounce(0), 0);
        let normal = Vec3A::new(0.0, 1.0, 0.0);
        for _ in 0..1000 {
            assert!(random_on_hemisphere(&mut rng, normal).dot(normal) >= 0.0);
        }
    }

    #[test]
    fn test_random_f32_in_unit_range() {
        let mut rng = worker_rng(None, 0, Stage::Sampling, 0);
        for _ in 0..1000 {
            let x = random_f32(&mut rng);
            assert!((0.0..1.0).contains(&x));
        }
    }
}
