//! Initial occupancy from thresholded 2D Perlin noise.

use noise::{NoiseFn, Perlin};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::{NoiseSettings, OffsetRange};
use crate::grid::{Cell, Grid};

/// Noise-space translation applied to the whole map for one run
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct NoiseOffset {
    pub x: f64,
    pub y: f64,
}

impl NoiseOffset {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Draw uniformly from `range`. Empty or inverted axes collapse to their minimum.
    pub fn draw<R: Rng + ?Sized>(range: &OffsetRange, rng: &mut R) -> Self {
        Self {
            x: draw_axis(range.min_x, range.max_x, rng),
            y: draw_axis(range.min_y, range.max_y, rng),
        }
    }
}

fn draw_axis<R: Rng + ?Sized>(min: f32, max: f32, rng: &mut R) -> f64 {
    if max > min {
        rng.gen_range(min as f64..max as f64)
    } else {
        min as f64
    }
}

pub struct NoiseMapGenerator {
    perlin: Perlin,
    settings: NoiseSettings,
}

impl NoiseMapGenerator {
    pub fn new(settings: NoiseSettings, noise_seed: u32) -> Self {
        Self {
            perlin: Perlin::new(noise_seed),
            settings,
        }
    }

    pub fn settings(&self) -> &NoiseSettings {
        &self.settings
    }

    /// Coherent noise remapped from [-1, 1] to [0, 1]
    pub fn sample(&self, x: usize, y: usize, offset: NoiseOffset) -> f64 {
        let scale = self.settings.scale as f64;
        let raw = self
            .perlin
            .get([x as f64 * scale + offset.x, y as f64 * scale + offset.y]);
        ((raw + 1.0) * 0.5).clamp(0.0, 1.0)
    }

    /// Cell (x, y) is Occupied iff its noise sample reaches the threshold
    pub fn generate(&self, width: usize, height: usize, offset: NoiseOffset) -> Grid<Cell> {
        if width == 0 || height == 0 {
            tracing::warn!(width, height, "degenerate map size, producing an empty grid");
            return Grid::empty(width, height);
        }
        let threshold = self.settings.threshold as f64;
        let grid = Grid::from_fn(width, height, |x, y| {
            Cell::from_bool(self.sample(x, y, offset) >= threshold)
        });
        tracing::debug!(
            width,
            height,
            offset_x = offset.x,
            offset_y = offset.y,
            occupied = grid.occupied_count(),
            "noise map generated"
        );
        grid
    }
}
