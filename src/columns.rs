//! Per-ray state stored as parallel dense columns.
//!
//! Slot `i` of every column describes the same ray. Workers never share a
//! column; instead [`RayColumns::split_chunks`] hands each worker a
//! [`RayChunkMut`] holding disjoint mutable sub-slices of every column, so the
//! borrow checker enforces that no two chunks write the same slot.

use glam::Vec3A;

use crate::chunk::Chunk;
use crate::material::{Color, WHITE};
use crate::ray::Ray;

/// Dense per-slot ray state.
#[derive(Debug, Clone, Default)]
pub struct RayColumns {
    /// Ray origin per slot.
    pub origins: Vec<Vec3A>,
    /// Unit ray direction per slot.
    pub directions: Vec<Vec3A>,
    /// Remaining bounce budget per slot; zero means the path is resolved.
    pub steps: Vec<u32>,
    /// Integer RGB color per slot.
    pub colors: Vec<Color>,
    /// Closest hit distance found during the current bounce.
    pub closest: Vec<f32>,
}

impl RayColumns {
    /// Allocate columns for `n` slots.
    pub fn new(n: usize) -> Self {
        let mut columns = Self::default();
        columns.resize(n);
        columns
    }

    /// Number of slots.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// True if there are no slots.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Recreate every column with `n` slots; contents are reset.
    pub fn resize(&mut self, n: usize) {
        self.origins = vec![Vec3A::ZERO; n];
        self.directions = vec![Vec3A::ZERO; n];
        self.steps = vec![0; n];
        self.colors = vec![WHITE; n];
        self.closest = vec![f32::INFINITY; n];
    }

    /// Start-of-sample state: full budget, white color, no hit.
    pub fn reset(&mut self, max_bounces: u32) {
        self.steps.fill(max_bounces);
        self.colors.fill(WHITE);
        self.closest.fill(f32::INFINITY);
    }

    /// Start-of-bounce state: forget last bounce's hits on active slots.
    pub fn clear_hits(&mut self) {
        for (closest, &steps) in self.closest.iter_mut().zip(&self.steps) {
            if steps > 0 {
                *closest = f32::INFINITY;
            }
        }
    }

    /// Number of slots that still have bounce budget.
    pub fn active_count(&self) -> usize {
        self.steps.iter().filter(|&&steps| steps > 0).count()
    }

    /// Borrow the columns as one disjoint mutable view per chunk.
    ///
    /// `chunks` must partition `[0, len)` in order, as produced by
    /// [`compute_chunks`](crate::chunk::compute_chunks).
    pub fn split_chunks(&mut self, chunks: &[Chunk]) -> Vec<RayChunkMut<'_>> {
        let mut origins = self.origins.as_mut_slice();
        let mut directions = self.directions.as_mut_slice();
        let mut steps = self.steps.as_mut_slice();
        let mut colors = self.colors.as_mut_slice();
        let mut closest = self.closest.as_mut_slice();

        let mut views = Vec::with_capacity(chunks.len());
        let mut offset = 0;
        for (index, chunk) in chunks.iter().enumerate() {
            debug_assert_eq!(chunk.start, offset, "chunks must be contiguous");
            let len = chunk.len();

            let (o, rest) = std::mem::take(&mut origins).split_at_mut(len);
            origins = rest;
            let (d, rest) = std::mem::take(&mut directions).split_at_mut(len);
            directions = rest;
            let (s, rest) = std::mem::take(&mut steps).split_at_mut(len);
            steps = rest;
            let (c, rest) = std::mem::take(&mut colors).split_at_mut(len);
            colors = rest;
            let (t, rest) = std::mem::take(&mut closest).split_at_mut(len);
            closest = rest;

            views.push(RayChunkMut {
                index,
                start: chunk.start,
                origins: o,
                directions: d,
                steps: s,
                colors: c,
                closest: t,
            });
            offset = chunk.end;
        }
        debug_assert!(origins.is_empty(), "chunks must cover every slot");
        views
    }
}

/// Mutable view over one chunk of every column.
#[derive(Debug)]
pub struct RayChunkMut<'a> {
    /// Chunk index, also the worker index.
    pub index: usize,
    /// Global slot index of the view's first element.
    pub start: usize,
    /// Ray origins in the chunk.
    pub origins: &'a mut [Vec3A],
    /// Ray directions in the chunk.
    pub directions: &'a mut [Vec3A],
    /// Remaining bounces in the chunk.
    pub steps: &'a mut [u32],
    /// Ray colors in the chunk.
    pub colors: &'a mut [Color],
    /// Closest hit distances in the chunk.
    pub closest: &'a mut [f32],
}

impl RayChunkMut<'_> {
    /// Number of slots in the view.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// True if the view holds no slots.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Ray currently stored in local slot `i`.
    pub fn ray(&self, i: usize) -> Ray {
        Ray {
            origin: self.origins[i],
            direction: self.directions[i],
        }
    }
}
