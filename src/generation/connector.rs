//! Region bridging.
//!
//! Regions are nodes of an undirected graph. Each pass visits every region
//! that cannot yet reach all others, finds the closest cell pair between its
//! reachable set and any region outside it, carves a straight corridor and
//! merges the two reachable sets. Passes repeat until region 0 reaches every
//! region or the iteration cap is spent.

use std::collections::BTreeSet;

use petgraph::graph::{NodeIndex, UnGraph};
use serde::{Deserialize, Serialize};

use super::regions::{Region, RegionId};
use crate::grid::{Cell, CellPos, Grid};

/// One carved connection between two regions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Corridor {
    pub from_region: RegionId,
    pub to_region: RegionId,
    pub from: CellPos,
    pub to: CellPos,
    /// Every in-bounds cell the line stepped through
    pub path: Vec<CellPos>,
    /// Cells that were Empty before carving
    pub newly_occupied: usize,
}

#[derive(Debug, Clone)]
pub struct ConnectionReport {
    /// Region 0 reaches every region
    pub complete: bool,
    /// Full passes made over the region list
    pub iterations: usize,
    pub corridors: Vec<Corridor>,
    /// Regions region 0 still cannot reach
    pub unreachable: Vec<RegionId>,
    /// Node `i` is region `i`; edges are corridors weighted by carved cells
    pub graph: UnGraph<RegionId, usize>,
}

impl ConnectionReport {
    pub fn carved_cells(&self) -> usize {
        self.corridors.iter().map(|c| c.newly_occupied).sum()
    }

    /// Connected components of the corridor graph
    pub fn component_count(&self) -> usize {
        petgraph::algo::connected_components(&self.graph)
    }
}

/// Closest cell pair between a reachable set and an outside region
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Link {
    from_region: RegionId,
    to_region: RegionId,
    from: CellPos,
    to: CellPos,
    distance_sq: i64,
}

pub struct RegionConnector {
    max_iterations: usize,
}

impl RegionConnector {
    pub fn new(max_iterations: usize) -> Self {
        Self { max_iterations }
    }

    /// Connect `regions` in place. Region ids must equal slice positions;
    /// if they don't, regions are renumbered and their stale reach sets cleared.
    pub fn connect(&self, grid: &mut Grid<Cell>, regions: &mut [Region]) -> ConnectionReport {
        renumber_if_needed(regions);
        let n = regions.len();
        let mut graph = UnGraph::with_capacity(n, n.saturating_sub(1));
        for region in regions.iter() {
            graph.add_node(region.id);
        }

        let mut corridors = Vec::new();
        let mut iterations = 0;

        while !reaches_all(regions, 0) && iterations < self.max_iterations {
            iterations += 1;

            for i in 0..n {
                if reaches_all(regions, i) {
                    continue;
                }
                let Some(link) = closest_link(regions, i) else {
                    continue;
                };

                let (path, newly_occupied) = carve_line(grid, link.from, link.to);
                merge_reachability(regions, link.from_region, link.to_region);
                graph.add_edge(
                    NodeIndex::new(link.from_region),
                    NodeIndex::new(link.to_region),
                    newly_occupied,
                );
                tracing::debug!(
                    from_region = link.from_region,
                    to_region = link.to_region,
                    distance_sq = link.distance_sq,
                    carved = newly_occupied,
                    "regions joined"
                );
                corridors.push(Corridor {
                    from_region: link.from_region,
                    to_region: link.to_region,
                    from: link.from,
                    to: link.to,
                    path,
                    newly_occupied,
                });
            }
        }

        let unreachable: Vec<RegionId> = match regions.first() {
            Some(root) => (1..n).filter(|id| !root.is_connected_to(*id)).collect(),
            None => Vec::new(),
        };
        let complete = unreachable.is_empty();

        if complete {
            tracing::info!(
                regions = n,
                corridors = corridors.len(),
                iterations,
                "all regions connected"
            );
        } else {
            tracing::warn!(
                regions = n,
                iterations,
                max_iterations = self.max_iterations,
                unreachable = ?unreachable,
                "iteration cap reached with regions still unreachable"
            );
        }

        ConnectionReport {
            complete,
            iterations,
            corridors,
            unreachable,
            graph,
        }
    }
}

fn renumber_if_needed(regions: &mut [Region]) {
    if regions.iter().enumerate().all(|(i, r)| r.id == i) {
        return;
    }
    tracing::warn!(
        regions = regions.len(),
        "region ids do not match their positions, renumbering and clearing reach sets"
    );
    for (i, region) in regions.iter_mut().enumerate() {
        region.id = i;
        region.connects_to.clear();
    }
}

fn reaches_all(regions: &[Region], id: RegionId) -> bool {
    regions
        .get(id)
        .map_or(true, |r| r.connects_to.len() + 1 >= regions.len())
}

/// Search `origin` and everything it already reaches against every region
/// outside that set. Strictly smaller distances win, so the first minimal
/// pair in iteration order is kept.
fn closest_link(regions: &[Region], origin: RegionId) -> Option<Link> {
    let reach: BTreeSet<RegionId> = std::iter::once(origin)
        .chain(regions[origin].connects_to.iter().copied())
        .collect();
    let sources = std::iter::once(origin).chain(regions[origin].connects_to.iter().copied());

    let mut best: Option<Link> = None;
    for source in sources {
        for target in regions.iter().filter(|r| !reach.contains(&r.id)) {
            for &a in &regions[source].cells {
                for &b in &target.cells {
                    let distance_sq = a.distance_sq(b);
                    if best.map_or(true, |l| distance_sq < l.distance_sq) {
                        best = Some(Link {
                            from_region: source,
                            to_region: target.id,
                            from: a,
                            to: b,
                            distance_sq,
                        });
                    }
                }
            }
        }
    }
    best
}

/// Union both reachable sets and give every member the merged set
fn merge_reachability(regions: &mut [Region], a: RegionId, b: RegionId) {
    let mut merged: BTreeSet<RegionId> = BTreeSet::from([a, b]);
    merged.extend(regions[a].connects_to.iter().copied());
    merged.extend(regions[b].connects_to.iter().copied());

    for &member in &merged {
        let mut others = merged.clone();
        others.remove(&member);
        regions[member].connects_to = others;
    }
}

/// Step from `from` towards `to` along the normalized direction,
/// `round(max(|dx|, |dy|))` times, rounding the accumulated position to
/// the nearest cell after each step. Off-grid cells are skipped.
/// Returns the stepped cells and how many of them were newly occupied.
pub fn carve_line(grid: &mut Grid<Cell>, from: CellPos, to: CellPos) -> (Vec<CellPos>, usize) {
    let dx = (to.x - from.x) as f32;
    let dy = (to.y - from.y) as f32;
    let steps = dx.abs().max(dy.abs()).round_ties_even() as usize;
    if steps == 0 {
        return (Vec::new(), 0);
    }

    let length = (dx * dx + dy * dy).sqrt();
    let (step_x, step_y) = (dx / length, dy / length);
    let (mut fx, mut fy) = (0.0f32, 0.0f32);

    let mut path = Vec::with_capacity(steps);
    let mut newly_occupied = 0;
    for _ in 0..steps {
        fx += step_x;
        fy += step_y;
        let pos = from.offset(fx.round_ties_even() as i32, fy.round_ties_even() as i32);
        if !grid.in_bounds(pos) {
            continue;
        }
        if !grid.is_occupied(pos) {
            grid.set(pos, Cell::Occupied);
            newly_occupied += 1;
        }
        path.push(pos);
    }
    (path, newly_occupied)
}
