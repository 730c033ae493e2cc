//! Tracer configuration, loadable from TOML.
//!
//! ```toml
//! width = 800
//! height = 600
//! max_bounces = 16
//! samples = 32
//! threads = 64
//! seed = 1234
//! ```
//!
//! Every key is optional; missing keys take their default.

use std::path::Path;

use serde::Deserialize;

use crate::error::{Result, TraceError};

/// Settings for a trace session.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TracerConfig {
    /// Viewport width in pixels.
    pub width: usize,
    /// Viewport height in pixels.
    pub height: usize,
    /// Bounce budget per ray per sample.
    pub max_bounces: u32,
    /// Target number of samples per trace run.
    pub samples: u32,
    /// Number of chunks (and workers) per fork-join stage.
    pub threads: usize,
    /// Base seed for per-worker generators; `None` uses OS entropy.
    pub seed: Option<u64>,
}

impl Default for TracerConfig {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            max_bounces: 16,
            samples: 1,
            threads: rayon::current_num_threads(),
            seed: None,
        }
    }
}

impl TracerConfig {
    /// Number of pixels, and therefore ray slots.
    pub fn num_pixels(&self) -> usize {
        self.width * self.height
    }

    /// Parse a configuration from TOML text.
    pub fn from_toml(text: &str, origin: &str) -> Result<Self> {
        let config: Self = toml::from_str(text).map_err(|source| TraceError::ConfigParse {
            path: origin.to_string(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| TraceError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml(&text, &path.display().to_string())
    }

    /// Reject values the engine cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.max_bounces == 0 {
            return Err(TraceError::InvalidConfig("max_bounces must be at least 1".into()));
        }
        if self.samples == 0 {
            return Err(TraceError::InvalidConfig("samples must be at least 1".into()));
        }
        if self.threads == 0 {
            return Err(TraceError::InvalidConfig("threads must be at least 1".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = TracerConfig::from_toml("samples = 8\nseed = 42\n", "inline").unwrap();
        assert_eq!(config.samples, 8);
        assert_eq!(config.seed, Some(42));
        assert_eq!(config.max_bounces, 16);
        assert_eq!(config.num_pixels(), 800 * 600);
    }

    #[test]
    fn test_zero_values_are_rejected() {
        for text in ["max_bounces = 0", "samples = 0", "threads = 0"] {
            assert!(matches!(
                TracerConfig::from_toml(text, "inline"),
                Err(TraceError::InvalidConfig(_))
            ));
        }
    }

    #[test]
    fn test_unknown_key_is_a_parse_error() {
        assert!(matches!(
            TracerConfig::from_toml("bounces = 3", "inline"),
            Err(TraceError::ConfigParse { .. })
        ));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "width = 4\nheight = 2\nthreads = 3").unwrap();
        let config = TracerConfig::load(file.path()).unwrap();
        assert_eq!((config.width, config.height, config.threads), (4, 2, 3));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        assert!(matches!(
            TracerConfig::load("/nonexistent/pathgrid.toml"),
            Err(TraceError::Io { .. })
        ));
    }
}
