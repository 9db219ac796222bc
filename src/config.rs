//! Generator configuration: grid size, noise, region and connection limits.
//!
//! Loaded from RON or JSON; missing fields take the defaults in `constants`.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::error::{LevelGenError, Result};
use crate::generation::automaton::SweepMode;

/// All plain-value parameters of one generator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub width: usize,
    pub height: usize,
    pub noise: NoiseSettings,
    pub min_region_size: usize,
    pub max_connection_iterations: usize,
    pub smoothing_passes: usize,
    pub sweep_mode: SweepMode,
    /// Base seed for run derivation; a random one is picked when absent
    pub seed: Option<u64>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            noise: NoiseSettings::default(),
            min_region_size: DEFAULT_MIN_REGION_SIZE,
            max_connection_iterations: DEFAULT_MAX_CONNECTION_ITERATIONS,
            smoothing_passes: DEFAULT_SMOOTHING_PASSES,
            sweep_mode: SweepMode::default(),
            seed: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NoiseSettings {
    pub scale: f32,
    pub threshold: f32,
    pub offset_range: OffsetRange,
}

impl Default for NoiseSettings {
    fn default() -> Self {
        Self {
            scale: DEFAULT_NOISE_SCALE,
            threshold: DEFAULT_NOISE_THRESHOLD,
            offset_range: OffsetRange::default(),
        }
    }
}

/// Bounds the per-run noise offset is drawn from: `[min_x, max_x) x [min_y, max_y)`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OffsetRange {
    pub min_x: f32,
    pub max_x: f32,
    pub min_y: f32,
    pub max_y: f32,
}

impl Default for OffsetRange {
    fn default() -> Self {
        let b = DEFAULT_NOISE_OFFSET_BOUND;
        Self {
            min_x: -b,
            max_x: b,
            min_y: -b,
            max_y: b,
        }
    }
}

impl OffsetRange {
    /// Degenerate range pinned to a single offset
    pub fn fixed(x: f32, y: f32) -> Self {
        Self {
            min_x: x,
            max_x: x,
            min_y: y,
            max_y: y,
        }
    }

    fn is_finite(&self) -> bool {
        [self.min_x, self.max_x, self.min_y, self.max_y]
            .iter()
            .all(|v| v.is_finite())
    }
}

impl GeneratorConfig {
    pub fn with_size(mut self, width: usize, height: usize) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !self.noise.scale.is_finite() {
            return Err(LevelGenError::InvalidConfig(format!(
                "noise scale must be finite, got {}",
                self.noise.scale
            )));
        }
        if !(0.0..=1.0).contains(&self.noise.threshold) {
            return Err(LevelGenError::InvalidConfig(format!(
                "noise threshold must lie in [0, 1], got {}",
                self.noise.threshold
            )));
        }
        if !self.noise.offset_range.is_finite() {
            return Err(LevelGenError::InvalidConfig(
                "noise offset range must be finite".into(),
            ));
        }
        Ok(())
    }

    pub fn from_ron_str(text: &str) -> Result<Self> {
        let config: Self = ron::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_str(text: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }

    /// Load from disk; `.json` files are parsed as JSON, everything else as RON
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| LevelGenError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json_str(&text),
            _ => Self::from_ron_str(&text),
        }
    }
}
