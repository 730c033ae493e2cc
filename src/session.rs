//! One-at-a-time background trace runs.
//!
//! A [`TraceSession`] owns the engine and the accumulator. Starting a run
//! moves both into a dedicated thread; the thread hands them back through its
//! join handle when the target sample count is reached. While a run is
//! active, consumers poll [`TraceSession::is_tracing`] and read progressive
//! results through the published snapshot; the raw ray columns are only
//! reachable once the run has been joined.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Instant;

use glam::Vec3A;
use log::{debug, info, warn};

use crate::accumulator::{Accumulator, Snapshot, SnapshotReader};
use crate::chunk::Chunk;
use crate::config::TracerConfig;
use crate::engine::BounceEngine;
use crate::error::{Result, TraceError};
use crate::hittable::HittableList;
use crate::material::Color;
use crate::sampler::{Jitter, RayContext};

/// Engine and accumulator, owned by whoever is currently tracing.
#[derive(Debug)]
struct Tracer {
    engine: BounceEngine,
    accumulator: Accumulator,
}

impl Tracer {
    fn run(mut self, scene: &HittableList, ctx: &RayContext, samples: u32) -> Self {
        info!(
            "Tracing {} sample(s) of {}x{} ({} rays, {} chunks, {} max bounces, {} shapes)",
            samples,
            ctx.width,
            ctx.height,
            self.engine.num_rays(),
            self.engine.chunks().len(),
            self.engine.max_bounces(),
            scene.len()
        );
        let started = Instant::now();

        for sample in 0..samples {
            let jitter = Jitter::for_sample_count(samples, self.engine.seed(), sample);
            let report = self.engine.trace_sample(scene, ctx, jitter, sample);
            let published = self.accumulator.commit(&self.engine.columns().colors);
            debug!(
                "Sample {}/{} resolved after {} bounce step(s): {} hits, {} sky",
                published, samples, report.steps, report.hits, report.misses
            );
        }

        info!("Traced {} sample(s) in {:.2?}", samples, started.elapsed());
        self
    }
}

/// Clears the tracing flag when the worker finishes, even by panicking.
struct TracingGuard(Arc<AtomicBool>);

impl Drop for TracingGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Owner of the background trace run and its progressive results.
#[derive(Debug)]
pub struct TraceSession {
    config: TracerConfig,
    tracing: Arc<AtomicBool>,
    reader: SnapshotReader,
    idle: Option<Tracer>,
    worker: Option<JoinHandle<Tracer>>,
}

impl TraceSession {
    /// Create an idle session sized from `config`.
    pub fn new(config: TracerConfig) -> Result<Self> {
        config.validate()?;
        let engine = BounceEngine::from_config(&config);
        let accumulator = Accumulator::new(config.num_pixels());
        let reader = accumulator.reader();
        Ok(Self {
            config,
            tracing: Arc::new(AtomicBool::new(false)),
            reader,
            idle: Some(Tracer {
                engine,
                accumulator,
            }),
            worker: None,
        })
    }

    /// Start a background run of `samples` samples.
    ///
    /// Returns `Ok(false)` without doing anything if a run is already active.
    /// Otherwise the accumulation is reset (and the ray state resized if the
    /// viewport changed) before the worker is spawned.
    pub fn start(&mut self, scene: Arc<HittableList>, ctx: RayContext) -> Result<bool> {
        if self.is_tracing() {
            debug!("Trace already running; ignoring start request");
            return Ok(false);
        }

        let mut tracer = self.take_idle()?;
        if ctx.num_pixels() != tracer.engine.num_rays() {
            tracer.engine.resize(ctx.num_pixels());
        }
        tracer.accumulator.reset(ctx.num_pixels());
        self.config.width = ctx.width;
        self.config.height = ctx.height;

        let samples = self.config.samples;
        self.tracing.store(true, Ordering::Release);
        let guard = TracingGuard(Arc::clone(&self.tracing));
        self.worker = Some(thread::spawn(move || {
            let _guard = guard;
            tracer.run(&scene, &ctx, samples)
        }));
        Ok(true)
    }

    /// Cheap lock-free poll of whether a run is active.
    pub fn is_tracing(&self) -> bool {
        self.tracing.load(Ordering::Acquire)
    }

    /// Block until the active run (if any) finishes and reclaim its state.
    pub fn wait(&mut self) -> Result<()> {
        if let Some(worker) = self.worker.take() {
            let tracer = worker.join().map_err(|_| TraceError::WorkerPanicked)?;
            self.idle = Some(tracer);
        }
        Ok(())
    }

    /// Resize the ray state for a new viewport; fails while tracing.
    pub fn resize(&mut self, width: usize, height: usize) -> Result<()> {
        let tracer = self.idle_mut()?;
        tracer.engine.resize(width * height);
        tracer.accumulator.reset(width * height);
        self.config.width = width;
        self.config.height = height;
        info!("Resized to {}x{}", width, height);
        Ok(())
    }

    /// Set the target sample count for subsequent runs; fails while tracing.
    pub fn set_sample_count(&mut self, samples: u32) -> Result<()> {
        if samples == 0 {
            return Err(TraceError::InvalidConfig("samples must be at least 1".into()));
        }
        let num_pixels = self.config.num_pixels();
        let tracer = self.idle_mut()?;
        tracer.engine.resize(num_pixels);
        tracer.accumulator.reset(num_pixels);
        self.config.samples = samples;
        Ok(())
    }

    /// Set the bounce budget for subsequent runs; fails while tracing.
    pub fn set_max_bounces(&mut self, max_bounces: u32) -> Result<()> {
        if max_bounces == 0 {
            return Err(TraceError::InvalidConfig("max_bounces must be at least 1".into()));
        }
        self.idle_mut()?.engine.set_max_bounces(max_bounces);
        self.config.max_bounces = max_bounces;
        Ok(())
    }

    /// Averaged colors of the latest published snapshot.
    pub fn averaged_colors(&self) -> Vec<Color> {
        self.reader.averaged_colors()
    }

    /// Latest published snapshot.
    pub fn snapshot(&self) -> Arc<Snapshot> {
        self.reader.snapshot()
    }

    /// Handle other threads can poll for progressive results.
    pub fn snapshot_reader(&self) -> SnapshotReader {
        self.reader.clone()
    }

    /// Samples contained in the latest published snapshot.
    pub fn published_samples(&self) -> u32 {
        self.reader.samples()
    }

    /// Remaining bounces per slot; `None` until the last run is joined.
    pub fn ray_steps(&self) -> Option<&[u32]> {
        self.idle.as_ref().map(|t| t.engine.columns().steps.as_slice())
    }

    /// Ray origins per slot; `None` until the last run is joined.
    pub fn ray_origins(&self) -> Option<&[Vec3A]> {
        self.idle.as_ref().map(|t| t.engine.columns().origins.as_slice())
    }

    /// Ray directions per slot; `None` until the last run is joined.
    pub fn ray_directions(&self) -> Option<&[Vec3A]> {
        self.idle.as_ref().map(|t| t.engine.columns().directions.as_slice())
    }

    /// Final colors of the last sample per slot; `None` until the last run is joined.
    pub fn ray_colors(&self) -> Option<&[Color]> {
        self.idle.as_ref().map(|t| t.engine.columns().colors.as_slice())
    }

    /// Chunk layout; `None` until the last run is joined.
    pub fn chunks(&self) -> Option<&[Chunk]> {
        self.idle.as_ref().map(|t| t.engine.chunks())
    }

    /// Number of ray slots.
    pub fn num_rays(&self) -> usize {
        self.config.num_pixels()
    }

    /// Number of pixels in the viewport.
    pub fn num_pixels(&self) -> usize {
        self.config.num_pixels()
    }

    /// Bounce budget per ray.
    pub fn max_bounces(&self) -> u32 {
        self.config.max_bounces
    }

    /// Target sample count per run.
    pub fn sample_count(&self) -> u32 {
        self.config.samples
    }

    /// Current configuration.
    pub fn config(&self) -> &TracerConfig {
        &self.config
    }

    fn take_idle(&mut self) -> Result<Tracer> {
        self.wait()?;
        self.idle.take().ok_or(TraceError::WorkerPanicked)
    }

    fn idle_mut(&mut self) -> Result<&mut Tracer> {
        if self.is_tracing() {
            return Err(TraceError::Busy);
        }
        self.wait()?;
        self.idle.as_mut().ok_or(TraceError::WorkerPanicked)
    }
}

impl Drop for TraceSession {
    fn drop(&mut self) {
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                warn!("Trace worker panicked before shutdown");
            }
        }
    }
}
