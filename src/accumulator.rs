//! Double-buffered progressive accumulation.
//!
//! The writer keeps two per-pixel sum buffers: the one holding the sum of all
//! completed samples (front) and a retired one it writes the next sum into
//! (back). Until the first sample the zeroed back buffer is published; after
//! each sample the back buffer becomes the published snapshot and the roles
//! swap.
//!
//! A [`Snapshot`] owns both the sums and the number of samples they contain,
//! and is published as a single `Arc` behind a lock that is only ever held
//! for a pointer copy. Readers therefore always see a buffer together with
//! the count that produced it.

use std::sync::Arc;

use glam::{IVec3, Vec3A};
use log::trace;
use parking_lot::RwLock;
use rayon::prelude::*;

use crate::material::Color;

/// Per-pixel color sums together with the number of samples they contain.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    sums: Vec<Vec3A>,
    samples: u32,
}

impl Snapshot {
    fn zeroed(num_pixels: usize) -> Self {
        Self {
            sums: vec![Vec3A::ZERO; num_pixels],
            samples: 0,
        }
    }

    /// Number of completed samples summed into this snapshot.
    pub fn samples(&self) -> u32 {
        self.samples
    }

    /// Raw per-pixel float sums.
    pub fn sums(&self) -> &[Vec3A] {
        &self.sums
    }

    /// Number of pixels.
    pub fn len(&self) -> usize {
        self.sums.len()
    }

    /// True if the snapshot covers no pixels.
    pub fn is_empty(&self) -> bool {
        self.sums.is_empty()
    }

    /// Per-pixel average truncated to integer RGB; all zero before any sample.
    pub fn averaged_colors(&self) -> Vec<Color> {
        if self.samples == 0 {
            return vec![IVec3::ZERO; self.sums.len()];
        }
        let scale = self.samples as f32;
        self.sums.iter().map(|sum| (*sum / scale).as_ivec3()).collect()
    }
}

type Published = Arc<RwLock<Arc<Snapshot>>>;

/// Cloneable read handle to the latest published snapshot.
///
/// Safe to poll from any number of threads while a trace is running.
#[derive(Debug, Clone)]
pub struct SnapshotReader {
    published: Published,
}

impl SnapshotReader {
    /// Latest published snapshot.
    pub fn snapshot(&self) -> Arc<Snapshot> {
        Arc::clone(&self.published.read())
    }

    /// Sample count of the latest published snapshot.
    pub fn samples(&self) -> u32 {
        self.published.read().samples
    }

    /// Averaged colors of the latest published snapshot.
    pub fn averaged_colors(&self) -> Vec<Color> {
        self.snapshot().averaged_colors()
    }
}

/// Writer side of the progressive accumulation.
#[derive(Debug)]
pub struct Accumulator {
    published: Published,
    front: Arc<Snapshot>,
    back: Option<Arc<Snapshot>>,
}

impl Accumulator {
    /// Two zeroed buffers for `num_pixels`, publishing the inactive one with
    /// zero samples.
    pub fn new(num_pixels: usize) -> Self {
        let back = Arc::new(Snapshot::zeroed(num_pixels));
        Self {
            published: Arc::new(RwLock::new(Arc::clone(&back))),
            front: Arc::new(Snapshot::zeroed(num_pixels)),
            back: Some(back),
        }
    }

    /// Zero both buffers (possibly at a new size) and publish the inactive
    /// one with zero samples.
    ///
    /// Existing readers stay attached and observe the reset.
    pub fn reset(&mut self, num_pixels: usize) {
        let back = Arc::new(Snapshot::zeroed(num_pixels));
        self.front = Arc::new(Snapshot::zeroed(num_pixels));
        *self.published.write() = Arc::clone(&back);
        self.back = Some(back);
    }

    /// Handle for consumers of the published snapshot.
    pub fn reader(&self) -> SnapshotReader {
        SnapshotReader {
            published: Arc::clone(&self.published),
        }
    }

    /// Number of samples in the front buffer.
    pub fn samples(&self) -> u32 {
        self.front.samples
    }

    /// Number of pixels per buffer.
    pub fn num_pixels(&self) -> usize {
        self.front.len()
    }

    /// Add one completed sample and publish the new sum.
    ///
    /// Returns the new sample count.
    pub fn commit(&mut self, colors: &[Color]) -> u32 {
        debug_assert_eq!(colors.len(), self.front.len());

        let len = self.front.len();
        // Reuse the retired buffer unless a reader still holds it
        let mut target = self
            .back
            .take()
            .and_then(|back| Arc::try_unwrap(back).ok())
            .filter(|back| back.len() == len)
            .unwrap_or_else(|| {
                trace!("Retired accumulation buffer still shared; allocating a new one");
                Snapshot::zeroed(len)
            });

        target
            .sums
            .par_iter_mut()
            .zip(self.front.sums.par_iter())
            .zip(colors.par_iter())
            .for_each(|((out, previous), color)| *out = *previous + color.as_vec3a());
        target.samples = self.front.samples + 1;

        let target = Arc::new(target);
        *self.published.write() = Arc::clone(&target);
        self.back = Some(std::mem::replace(&mut self.front, target));
        self.front.samples
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_samples_average_to_zero() {
        let accumulator = Accumulator::new(3);
        let reader = accumulator.reader();
        assert_eq!(reader.samples(), 0);
        assert_eq!(reader.averaged_colors(), vec![IVec3::ZERO; 3]);
    }

    #[test]
    fn test_initial_snapshot_is_the_inactive_buffer() {
        let mut accumulator = Accumulator::new(2);
        let reader = accumulator.reader();
        let published = reader.snapshot();
        assert!(!Arc::ptr_eq(&published, &accumulator.front));
        assert!(accumulator
            .back
            .as_ref()
            .is_some_and(|back| Arc::ptr_eq(&published, back)));

        accumulator.reset(3);
        let published = reader.snapshot();
        assert!(!Arc::ptr_eq(&published, &accumulator.front));
        assert!(accumulator
            .back
            .as_ref()
            .is_some_and(|back| Arc::ptr_eq(&published, back)));
        drop(published);

        // The first sample lands in a buffer distinct from the zeroed front
        accumulator.commit(&[IVec3::splat(9); 3]);
        assert_eq!(reader.samples(), 1);
        assert_eq!(reader.averaged_colors(), vec![IVec3::splat(9); 3]);
    }

    #[test]
    fn test_repeated_identical_samples_average_to_one_sample() {
        let colors = vec![IVec3::new(255, 128, 3), IVec3::new(17, 0, 254)];
        let mut accumulator = Accumulator::new(colors.len());
        let reader = accumulator.reader();

        accumulator.commit(&colors);
        assert_eq!(reader.averaged_colors(), colors);
        for k in 2..=7 {
            assert_eq!(accumulator.commit(&colors), k);
            assert_eq!(reader.samples(), k);
            assert_eq!(reader.averaged_colors(), colors);
        }
    }

    #[test]
    fn test_average_truncates() {
        let mut accumulator = Accumulator::new(1);
        accumulator.commit(&[IVec3::new(1, 2, 3)]);
        accumulator.commit(&[IVec3::new(2, 2, 4)]);
        // (3, 4, 7) / 2
        assert_eq!(accumulator.reader().averaged_colors(), vec![IVec3::new(1, 2, 3)]);
    }

    #[test]
    fn test_held_snapshot_is_never_overwritten() {
        let mut accumulator = Accumulator::new(1);
        let reader = accumulator.reader();
        accumulator.commit(&[IVec3::splat(10)]);

        let held = reader.snapshot();
        accumulator.commit(&[IVec3::splat(20)]);
        accumulator.commit(&[IVec3::splat(30)]);
        accumulator.commit(&[IVec3::splat(40)]);

        assert_eq!(held.samples(), 1);
        assert_eq!(held.sums(), &[Vec3A::splat(10.0)]);
        let latest = reader.snapshot();
        assert_eq!(latest.samples(), 4);
        assert_eq!(latest.sums(), &[Vec3A::splat(100.0)]);
    }

    #[test]
    fn test_reset_resizes_and_republishes() {
        let mut accumulator = Accumulator::new(2);
        let reader = accumulator.reader();
        accumulator.commit(&[IVec3::ONE, IVec3::ONE]);
        accumulator.reset(5);
        assert_eq!(accumulator.num_pixels(), 5);
        assert_eq!(reader.samples(), 0);
        assert_eq!(reader.snapshot().len(), 5);
        accumulator.commit(&[IVec3::splat(2); 5]);
        assert_eq!(reader.averaged_colors(), vec![IVec3::splat(2); 5]);
    }
}
