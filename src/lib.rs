//! PathGrid progressive path tracer
//!
//! Traces one ray per pixel per sample through a fixed bounce budget, keeping
//! all per-ray state in dense columns that are split into disjoint chunks for
//! the worker threads. Completed samples are summed into a double-buffered
//! accumulator whose latest snapshot can be read at any time while tracing
//! continues in the background.

#![warn(missing_docs)]
#![warn(rustdoc::broken_intra_doc_links)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod accumulator;
pub mod camera;
pub mod chunk;
pub mod columns;
pub mod config;
pub mod engine;
pub mod error;
pub mod hittable;
pub mod interval;
pub mod intersect;
pub mod material;
pub mod random;
pub mod ray;
pub mod sampler;
pub mod session;
pub mod sphere;
pub mod square;

pub use accumulator::{Accumulator, Snapshot, SnapshotReader};
pub use camera::Camera;
pub use chunk::{compute_chunks, Chunk};
pub use config::TracerConfig;
pub use engine::{BounceEngine, SampleReport};
pub use error::{Result, TraceError};
pub use hittable::{HitRecord, Hittable, HittableList, ShapeKind};
pub use material::{Color, MaterialType};
pub use sampler::{Jitter, RayContext};
pub use session::TraceSession;
pub use sphere::Sphere;
pub use square::Square;
