//! Chunk intersector: one bounce step for one chunk of ray slots.

use rand::Rng;

use crate::columns::RayChunkMut;
use crate::hittable::{HitRecord, HittableList};
use crate::interval::Interval;
use crate::material::{self, Response};

/// Test every active slot of `view` against every shape and apply the
/// material response of the closest accepted hit.
///
/// A slot that hits nothing keeps `closest == +inf`; resolving it against the
/// sky is left to the bounce engine. Returns the number of slots that hit.
pub fn trace_chunk<R: Rng + ?Sized>(
    view: &mut RayChunkMut<'_>,
    scene: &HittableList,
    rng: &mut R,
) -> usize {
    let mut hits = 0;

    for i in 0..view.len() {
        if view.steps[i] == 0 {
            continue;
        }

        let ray = view.ray(i);

        // Ties keep the first shape inserted
        let mut nearest: Option<HitRecord> = None;
        for object in scene.iter() {
            if let Some(rec) = object.hit(&ray, Interval::hit_window(view.closest[i])) {
                view.closest[i] = rec.t;
                nearest = Some(rec);
            }
        }

        let Some(rec) = nearest else {
            continue;
        };
        hits += 1;

        match rec.material.respond(&rec, rng) {
            Response::Terminate { color } => {
                view.colors[i] = color;
                view.steps[i] = 0;
            }
            Response::Bounce {
                scattered,
                attenuation,
            } => {
                view.origins[i] = scattered.origin;
                view.directions[i] = scattered.direction;
                view.colors[i] = material::attenuate(view.colors[i], attenuation);
                view.steps[i] -= 1;
            }
        }
    }

    hits
}
