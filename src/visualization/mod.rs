//! Debug bitmap of a generation run.
//!
//! Paints the occupancy grid black/white, then regions red, region
//! midpoints green and carved corridors blue, each layer over the last.

use std::path::Path;

use image::{Rgb, RgbImage};

use crate::error::Result;
use crate::generation::{Corridor, Region};
use crate::grid::{Cell, CellPos, Grid};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DebugColor {
    Empty,
    Occupied,
    Region,
    Midpoint,
    Corridor,
}

impl DebugColor {
    pub fn rgb(self) -> [u8; 3] {
        match self {
            DebugColor::Empty => [0, 0, 0],
            DebugColor::Occupied => [255, 255, 255],
            DebugColor::Region => [255, 0, 0],
            DebugColor::Midpoint => [0, 255, 0],
            DebugColor::Corridor => [0, 0, 255],
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DebugBitmap {
    pixels: Grid<DebugColor>,
}

impl DebugBitmap {
    pub fn render(grid: &Grid<Cell>, regions: &[Region], corridors: &[Corridor]) -> Self {
        let mut pixels = Grid::from_fn(grid.width(), grid.height(), |x, y| {
            if grid.is_occupied(CellPos::new(x as i32, y as i32)) {
                DebugColor::Occupied
            } else {
                DebugColor::Empty
            }
        });

        for region in regions {
            for &pos in &region.cells {
                pixels.set(pos, DebugColor::Region);
            }
        }
        for region in regions {
            pixels.set(region.midpoint, DebugColor::Midpoint);
        }
        for corridor in corridors {
            for &pos in &corridor.path {
                pixels.set(pos, DebugColor::Corridor);
            }
        }

        Self { pixels }
    }

    pub fn width(&self) -> usize {
        self.pixels.width()
    }

    pub fn height(&self) -> usize {
        self.pixels.height()
    }

    pub fn color_at(&self, x: usize, y: usize) -> Option<DebugColor> {
        self.pixels.get(CellPos::new(x as i32, y as i32)).copied()
    }

    /// Image rows run top-down, so grid row 0 lands on the bottom row
    pub fn to_image(&self) -> RgbImage {
        let (w, h) = (self.width() as u32, self.height() as u32);
        RgbImage::from_fn(w, h, |px, py| {
            let y = (h - 1 - py) as usize;
            let color = self.color_at(px as usize, y).unwrap_or(DebugColor::Empty);
            Rgb(color.rgb())
        })
    }

    pub fn save_png(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        self.to_image().save_with_format(path, image::ImageFormat::Png)?;
        tracing::info!(path = %path.display(), "debug bitmap written");
        Ok(())
    }
}
