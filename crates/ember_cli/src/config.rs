//! Configuration file loading and command line overrides.

use crate::cli::Args;
use anyhow::{Context, Result};
use ember_renderer::{CameraSettings, RenderConfig};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Everything needed to render a scene, as stored on disk.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub render: RenderConfig,
    pub camera: CameraSettings,
}

impl Config {
    /// Load a configuration from a JSON file. Missing fields keep their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config = serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        log::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Load the file named by `--config` (if any) and apply the other flags on top.
    pub fn from_args(args: &Args) -> Result<Self> {
        let mut config = match &args.config {
            Some(path) => Self::load(path)?,
            None => Self::default(),
        };
        config.apply_overrides(args);
        Ok(config)
    }

    pub fn apply_overrides(&mut self, args: &Args) {
        if let Some(width) = args.width {
            self.render.image_width = width;
        }
        if let Some(samples) = args.samples {
            self.render.samples_per_pixel = samples;
        }
        if let Some(depth) = args.depth {
            self.render.max_depth = depth;
        }
        if let Some(seed) = args.seed {
            self.render.seed = seed;
        }
        // The camera always matches the image shape
        self.camera.aspect_ratio = self.render.aspect_ratio;
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
