use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use glam::Vec3A;
use indicatif::{ProgressBar, ProgressStyle};
use log::{error, info};

use pathgrid::{
    Camera, HittableList, MaterialType, Sphere, Square, TraceError, TraceSession, TracerConfig,
};

mod cli;
mod logger;
mod viewer;

use cli::{Args, DEFAULT_CONFIG};
use logger::init_logger;
use viewer::TevStream;

/// How often the driver polls the published snapshot.
const POLL_INTERVAL: Duration = Duration::from_millis(33);

/// Two normal-shaded spheres over a diffuse floor, with a diffuse panel behind.
fn create_scene() -> HittableList {
    let mut world = HittableList::new();
    world.add(Box::new(Sphere::new(
        Vec3A::new(0.0, 0.0, -10.0),
        0.8,
        MaterialType::Normal,
    )));
    world.add(Box::new(Sphere::new(
        Vec3A::new(0.0, 0.0, -5.0),
        1.0,
        MaterialType::Normal,
    )));
    world.add(Box::new(Sphere::new(
        Vec3A::new(0.0, -101.0, -5.0),
        100.0,
        MaterialType::Diffuse,
    )));
    world.add(Box::new(Square::new(
        Vec3A::new(2.5, 0.5, -8.0),
        3.0,
        MaterialType::Diffuse,
    )));
    world
}

/// Load the config file if present, then apply command line overrides.
fn load_config(args: &Args) -> pathgrid::Result<TracerConfig> {
    let mut config = if Path::new(&args.config).exists() {
        info!("Loading configuration from {}", args.config);
        TracerConfig::load(&args.config)?
    } else if args.config == DEFAULT_CONFIG {
        TracerConfig::default()
    } else {
        return Err(TraceError::Io {
            path: args.config.clone(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "config file not found"),
        });
    };
    args.apply(&mut config);
    config.validate()?;
    Ok(config)
}

fn run(args: Args) -> pathgrid::Result<()> {
    let config = load_config(&args)?;
    info!(
        "Image resolution: {}x{}, samples per pixel: {}, max bounces: {}, chunks: {}",
        config.width, config.height, config.samples, config.max_bounces, config.threads
    );

    let world = Arc::new(create_scene());
    let ctx = Camera::new().ray_context(config.width, config.height);
    let target = config.samples;

    let mut tev = if args.tev || args.tev_address.is_some() {
        let address = args.tev_address.as_deref().unwrap_or("localhost");
        TevStream::connect(address, config.width as u32, config.height as u32)
    } else {
        None
    };

    let mut session = TraceSession::new(config)?;
    session.start(world, ctx)?;

    let pb = ProgressBar::new(target as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{bar:40} {pos}/{len} samples ETA: {eta}")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );

    // Poll progressive results while the background run continues
    let reader = session.snapshot_reader();
    let mut shown = 0;
    loop {
        let tracing = session.is_tracing();
        let snapshot = reader.snapshot();
        if snapshot.samples() > shown {
            shown = snapshot.samples();
            pb.set_position(shown as u64);
            if let Some(stream) = tev.as_mut() {
                if !stream.update(&snapshot.averaged_colors(), shown) {
                    tev = None;
                }
            }
        }
        if !tracing {
            break;
        }
        std::thread::sleep(POLL_INTERVAL);
    }
    session.wait()?;
    pb.finish();

    let colors = session.averaged_colors();
    let mean = colors.iter().map(|color| color.as_vec3a()).sum::<Vec3A>()
        / colors.len().max(1) as f32;
    info!(
        "Finished {} sample(s); mean pixel color ({:.1}, {:.1}, {:.1})",
        session.published_samples(),
        mean.x,
        mean.y,
        mean.z
    );
    Ok(())
}

fn main() {
    let args = Args::parse();

    init_logger(args.debug_level.clone().into());

    // Log application startup with version information
    info!("PathGrid - Git Version {} ({})", env!("GIT_HASH"), env!("GIT_DATE"));

    if let Err(e) = run(args) {
        error!("{}", e);
        std::process::exit(1);
    }
}
