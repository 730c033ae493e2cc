use clap::{Parser, ValueEnum};
use log::LevelFilter;

use pathgrid::TracerConfig;

/// Custom enum for log levels that can be used with clap's ValueEnum
#[derive(Debug, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convert our custom LogLevel enum to log crate's LevelFilter
impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

/// Default config file; silently skipped when absent.
pub const DEFAULT_CONFIG: &str = "pathgrid.toml";

/// Command line arguments structure using clap derive macros
#[derive(Parser, Debug)]
#[command(name = "pathgrid")]
#[command(about = "Progressive multithreaded path tracer")]
pub struct Args {
    /// TOML configuration file; flags below override its values
    #[arg(short, long, default_value = DEFAULT_CONFIG)]
    pub config: String,

    /// Set the logging level (defaults to "info")
    #[arg(long, default_value = "info", help = "Set the logging level")]
    pub debug_level: LogLevel,

    /// Image width in pixels
    #[arg(long)]
    pub width: Option<usize>,

    /// Image height in pixels
    #[arg(long)]
    pub height: Option<usize>,

    /// Number of progressive samples per pixel
    #[arg(long, short = 's')]
    pub samples: Option<u32>,

    /// Bounce budget per ray
    #[arg(long, short = 'b')]
    pub max_bounces: Option<u32>,

    /// Number of chunks per fork-join stage
    #[arg(long, short = 't')]
    pub threads: Option<usize>,

    /// Seed for reproducible runs
    #[arg(long)]
    pub seed: Option<u64>,

    /// Stream progressive results to TEV
    #[arg(long, help = "Stream progressive results to TEV")]
    pub tev: bool,

    /// TEV client IP address and port (automatically enables --tev)
    #[arg(long, help = "TEV client IP address and port (automatically enables --tev)")]
    pub tev_address: Option<String>,
}

impl Args {
    /// Apply command line overrides on top of a loaded configuration.
    pub fn apply(&self, config: &mut TracerConfig) {
        if let Some(width) = self.width {
            config.width = width;
        }
        if let Some(height) = self.height {
            config.height = height;
        }
        if let Some(samples) = self.samples {
            config.samples = samples;
        }
        if let Some(max_bounces) = self.max_bounces {
            config.max_bounces = max_bounces;
        }
        if let Some(threads) = self.threads {
            config.threads = threads;
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }
    }
}
