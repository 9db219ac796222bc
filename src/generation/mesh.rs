//! Floor mesh assembly from tile rules.
//!
//! The mesh lies on the XZ plane with cell (x, y) centred at world (x, 0, y).
//! Each cell takes the patch of the first matching tile rule; Occupied cells
//! that match nothing get a unit quad.

use serde::{Deserialize, Serialize};

use crate::grid::{Cell, CellPos, Grid};
use crate::rules::{TileRule, TileRuleSet};

/// Vertex/index/UV buffers handed to the renderer
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MeshBuffers {
    pub vertices: Vec<[f32; 3]>,
    pub triangles: Vec<u32>,
    pub uvs: Vec<[f32; 2]>,
}

impl MeshBuffers {
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.triangles.len() / 3
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Every triangle index refers to an emitted vertex
    pub fn indices_in_bounds(&self) -> bool {
        let n = self.vertices.len() as u32;
        self.triangles.iter().all(|&i| i < n)
    }

    fn push_rule(&mut self, rule: &TileRule, pos: CellPos) {
        let (ox, oz) = (pos.x as f32, pos.y as f32);
        for &[vx, vy, vz] in &rule.verts {
            self.vertices.push([vx + ox, vy, vz + oz]);
        }
        match rule.atlas_uvs() {
            Some(uvs) => self.uvs.extend_from_slice(uvs),
            None => self
                .uvs
                .extend(rule.verts.iter().map(|&[vx, _, vz]| [vx + ox, vz + oz])),
        }
        let end = self.vertices.len();
        self.triangles.extend(rule.resolve_triangles(end));
    }

    /// Unit quad centred on the cell, two clockwise triangles
    fn push_default_quad(&mut self, pos: CellPos) {
        let (x, z) = (pos.x as f32, pos.y as f32);
        let corners = [
            [x + 0.5, z - 0.5],
            [x - 0.5, z - 0.5],
            [x - 0.5, z + 0.5],
            [x + 0.5, z + 0.5],
        ];
        for [cx, cz] in corners {
            self.vertices.push([cx, 0.0, cz]);
            self.uvs.push([cx, cz]);
        }
        let n = self.vertices.len() as u32;
        self.triangles
            .extend_from_slice(&[n - 4, n - 3, n - 2, n - 4, n - 2, n - 1]);
    }
}

pub struct MeshTiler<'a> {
    rules: &'a TileRuleSet,
}

impl<'a> MeshTiler<'a> {
    pub fn new(rules: &'a TileRuleSet) -> Self {
        Self { rules }
    }

    pub fn tile(&self, grid: &Grid<Cell>) -> MeshBuffers {
        let usable: Vec<&TileRule> = self
            .rules
            .rules
            .iter()
            .enumerate()
            .filter_map(|(i, rule)| match rule.validate(i) {
                Ok(()) => Some(rule),
                Err(e) => {
                    tracing::warn!(error = %e, "skipping malformed tile rule");
                    None
                }
            })
            .collect();

        let mut mesh = MeshBuffers::default();
        let mut default_quads = 0usize;
        for (pos, cell) in grid.iter() {
            match usable.iter().find(|r| r.condition.matches(grid, pos)) {
                Some(rule) => mesh.push_rule(rule, pos),
                None if cell.is_occupied() => {
                    mesh.push_default_quad(pos);
                    default_quads += 1;
                }
                None => {}
            }
        }

        tracing::info!(
            vertices = mesh.vertex_count(),
            triangles = mesh.triangle_count(),
            default_quads,
            "mesh generated"
        );
        mesh
    }
}

/// Grid shaped like one tile rule's condition, meshed with the whole rule
/// set. `index` wraps in both directions.
pub fn preview_tile_rule(rules: &TileRuleSet, index: isize) -> Option<(Grid<Cell>, MeshBuffers)> {
    if rules.is_empty() {
        return None;
    }
    let wrapped = index.rem_euclid(rules.len() as isize) as usize;
    let condition = &rules.get(wrapped)?.condition;
    if !condition.is_well_formed() {
        return None;
    }
    let grid = Grid::from_fn(condition.width, condition.height, |x, y| {
        Cell::from_bool(condition.cells[y * condition.width + x])
    });
    let mesh = MeshTiler::new(rules).tile(&grid);
    Some((grid, mesh))
}
