//! Tile rules: a neighbourhood condition plus the mesh patch it emits.
//!
//! Vertices are in local cell space on the XZ plane. Triangle indices are
//! negative offsets from the end of the shared vertex buffer once this
//! rule's vertices have been appended, so `-1` is the rule's last vertex.
//! Winding is clockwise.

use serde::{Deserialize, Serialize};

use super::CellCondition;
use crate::error::{LevelGenError, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TileRule {
    pub condition: CellCondition,
    pub verts: Vec<[f32; 3]>,
    pub tris: Vec<i32>,
    /// Atlas UVs, one per vertex. Planar world UVs are used when absent.
    #[serde(default)]
    pub uvs: Option<Vec<[f32; 2]>>,
}

impl TileRule {
    pub fn new(condition: CellCondition, verts: Vec<[f32; 3]>, tris: Vec<i32>) -> Self {
        Self {
            condition,
            verts,
            tris,
            uvs: None,
        }
    }

    pub fn with_uvs(mut self, uvs: Vec<[f32; 2]>) -> Self {
        self.uvs = Some(uvs);
        self
    }

    /// Check the condition shape and that every triangle offset lands inside
    /// this rule's own vertices
    pub fn validate(&self, index: usize) -> Result<()> {
        let invalid = |reason: String| LevelGenError::InvalidTileRule { index, reason };

        self.condition
            .validate()
            .map_err(|e| invalid(e.to_string()))?;

        if self.tris.len() % 3 != 0 {
            return Err(invalid(format!(
                "triangle list length {} is not a multiple of 3",
                self.tris.len()
            )));
        }

        let vert_count = self.verts.len() as i64;
        if let Some(&bad) = self
            .tris
            .iter()
            .find(|&&t| (t as i64) >= 0 || (t as i64) < -vert_count)
        {
            return Err(invalid(format!(
                "triangle offset {} outside [-{}, -1]",
                bad, vert_count
            )));
        }
        Ok(())
    }

    pub fn is_well_formed(&self) -> bool {
        self.validate(0).is_ok()
    }

    /// Authored UVs, if present and sized to match the vertices
    pub fn atlas_uvs(&self) -> Option<&[[f32; 2]]> {
        self.uvs
            .as_deref()
            .filter(|uvs| uvs.len() == self.verts.len())
    }

    /// Resolve relative triangle offsets against the vertex buffer length
    /// measured after this rule's vertices were appended
    pub fn resolve_triangles(&self, vertex_count_after: usize) -> impl Iterator<Item = u32> + '_ {
        self.tris
            .iter()
            .map(move |&t| (vertex_count_after as i64 + t as i64) as u32)
    }
}

/// Stock geometry for authoring tile rules. Sides name the cell edge a
/// patch sits against: top is +z, right is +x.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TilePatch {
    /// Full cell, same as the default quad
    Square,
    /// Triangle from the centre to one edge
    TopQuarter,
    RightQuarter,
    BottomQuarter,
    LeftQuarter,
    /// Half-cell triangle covering one corner
    TopLeftHalf,
    TopRightHalf,
    BottomLeftHalf,
    BottomRightHalf,
    /// Triangle reaching from one edge into the neighbouring cell
    TopOuter,
    RightOuter,
    BottomOuter,
    LeftOuter,
}

impl TilePatch {
    pub fn verts(self) -> Vec<[f32; 3]> {
        let v = |x: f32, z: f32| [x, 0.0, z];
        match self {
            TilePatch::Square => vec![v(0.5, -0.5), v(-0.5, -0.5), v(-0.5, 0.5), v(0.5, 0.5)],
            TilePatch::TopQuarter => vec![v(0.5, 0.5), v(0.0, 0.0), v(-0.5, 0.5)],
            TilePatch::RightQuarter => vec![v(0.5, 0.5), v(0.5, -0.5), v(0.0, 0.0)],
            TilePatch::BottomQuarter => vec![v(0.5, -0.5), v(-0.5, -0.5), v(0.0, 0.0)],
            TilePatch::LeftQuarter => vec![v(0.0, 0.0), v(-0.5, -0.5), v(-0.5, 0.5)],
            TilePatch::TopLeftHalf => vec![v(0.5, 0.5), v(-0.5, -0.5), v(-0.5, 0.5)],
            TilePatch::TopRightHalf => vec![v(0.5, 0.5), v(0.5, -0.5), v(-0.5, 0.5)],
            TilePatch::BottomLeftHalf => vec![v(0.5, -0.5), v(-0.5, -0.5), v(-0.5, 0.5)],
            TilePatch::BottomRightHalf => vec![v(0.5, 0.5), v(0.5, -0.5), v(-0.5, -0.5)],
            TilePatch::TopOuter => vec![v(0.5, 0.5), v(-0.5, 0.5), v(0.0, 1.0)],
            TilePatch::RightOuter => vec![v(1.0, 0.0), v(0.5, -0.5), v(0.5, 0.5)],
            TilePatch::BottomOuter => vec![v(0.5, -0.5), v(0.0, -1.0), v(-0.5, -0.5)],
            TilePatch::LeftOuter => vec![v(-0.5, -0.5), v(-1.0, 0.0), v(-0.5, 0.5)],
        }
    }

    /// Triangle offsets relative to the end of this patch's vertices
    pub fn tris(self) -> Vec<i32> {
        match self {
            TilePatch::Square => vec![-4, -3, -2, -4, -2, -1],
            _ => vec![-3, -2, -1],
        }
    }
}

impl TileRule {
    pub fn from_patch(condition: CellCondition, patch: TilePatch) -> Self {
        Self::new(condition, patch.verts(), patch.tris())
    }

    /// Append a patch after the existing geometry. Existing triangle offsets
    /// are shifted so they keep pointing at the same vertices. Atlas UVs are
    /// dropped since they no longer cover every vertex.
    pub fn push_patch(&mut self, patch: TilePatch) {
        let added = patch.verts();
        let shift = added.len() as i32;
        for t in &mut self.tris {
            *t -= shift;
        }
        self.verts.extend(added);
        self.tris.extend(patch.tris());
        self.uvs = None;
    }
}

/// Ordered tile rules. First match wins.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TileRuleSet {
    pub rules: Vec<TileRule>,
}

impl TileRuleSet {
    pub fn new(rules: Vec<TileRule>) -> Self {
        Self { rules }
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&TileRule> {
        self.rules.get(index)
    }

    pub fn validate(&self) -> Result<()> {
        self.rules
            .iter()
            .enumerate()
            .try_for_each(|(i, rule)| rule.validate(i))
    }
}
