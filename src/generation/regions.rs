//! Region discovery via stack-based flood fill.
//!
//! Regions are maximal 4-connected groups of Occupied cells. Visited state
//! is tracked in its own `Grid<bool>`; the occupancy grid is only written
//! when undersized regions are cleared at the end.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::grid::{Cell, CellPos, Grid};

pub type RegionId = usize;

/// 4-connectivity, in push order
const NEIGHBOUR_OFFSETS: [(i32, i32); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
    pub id: RegionId,
    /// Member cells in discovery order
    pub cells: Vec<CellPos>,
    /// Bounding-box centre, not the centroid
    pub midpoint: CellPos,
    /// Every region reachable from this one, excluding itself
    pub connects_to: BTreeSet<RegionId>,
}

impl Region {
    pub fn new(id: RegionId, cells: Vec<CellPos>) -> Self {
        let midpoint = bounding_box_midpoint(&cells).unwrap_or(CellPos::new(0, 0));
        Self {
            id,
            cells,
            midpoint,
            connects_to: BTreeSet::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn is_connected_to(&self, other: RegionId) -> bool {
        self.connects_to.contains(&other)
    }

    /// (min, max) corners of the bounding box
    pub fn bounds(&self) -> Option<(CellPos, CellPos)> {
        bounds(&self.cells)
    }
}

fn bounds(cells: &[CellPos]) -> Option<(CellPos, CellPos)> {
    let first = *cells.first()?;
    Some(cells.iter().fold((first, first), |(lo, hi), c| {
        (
            CellPos::new(lo.x.min(c.x), lo.y.min(c.y)),
            CellPos::new(hi.x.max(c.x), hi.y.max(c.y)),
        )
    }))
}

/// `min + (max - min) / 2` per axis, halves rounded to even
pub fn bounding_box_midpoint(cells: &[CellPos]) -> Option<CellPos> {
    let (lo, hi) = bounds(cells)?;
    let half = |lo: i32, hi: i32| lo + ((hi - lo) as f32 / 2.0).round_ties_even() as i32;
    Some(CellPos::new(half(lo.x, hi.x), half(lo.y, hi.y)))
}

/// Result of one region scan
#[derive(Debug, Clone, Default)]
pub struct RegionScan {
    pub regions: Vec<Region>,
    pub discarded_regions: usize,
    pub discarded_cells: usize,
}

pub struct RegionFinder {
    min_region_size: usize,
}

impl RegionFinder {
    pub fn new(min_region_size: usize) -> Self {
        Self { min_region_size }
    }

    /// Partition Occupied cells into regions. Regions smaller than the
    /// minimum size are dropped and their cells set Empty in `grid`.
    pub fn find(&self, grid: &mut Grid<Cell>) -> RegionScan {
        let components = connected_components(grid);
        if components.is_empty() {
            tracing::warn!("no occupied cells to partition into regions");
            return RegionScan::default();
        }

        let mut scan = RegionScan::default();
        for cells in components {
            if cells.len() < self.min_region_size {
                for &pos in &cells {
                    grid.set(pos, Cell::Empty);
                }
                scan.discarded_regions += 1;
                scan.discarded_cells += cells.len();
                continue;
            }
            let id = scan.regions.len();
            scan.regions.push(Region::new(id, cells));
        }

        tracing::info!(
            regions = scan.regions.len(),
            discarded_regions = scan.discarded_regions,
            discarded_cells = scan.discarded_cells,
            min_region_size = self.min_region_size,
            "regions found"
        );
        scan
    }
}

/// All 4-connected components of Occupied cells. Seeds are taken in
/// row-major order; cells within a component are in depth-first pop order.
pub fn connected_components(grid: &Grid<Cell>) -> Vec<Vec<CellPos>> {
    let mut visited = Grid::new(grid.width(), grid.height(), false);
    let mut components = Vec::new();
    let mut stack = Vec::new();

    for seed in grid.occupied_cells() {
        if visited.get(seed).copied().unwrap_or(true) {
            continue;
        }
        visited.set(seed, true);
        stack.push(seed);

        let mut cells = Vec::new();
        while let Some(cur) = stack.pop() {
            cells.push(cur);
            for (dx, dy) in NEIGHBOUR_OFFSETS {
                let next = cur.offset(dx, dy);
                if grid.is_occupied(next) && visited.get(next) == Some(&false) {
                    visited.set(next, true);
                    stack.push(next);
                }
            }
        }
        components.push(cells);
    }
    components
}
