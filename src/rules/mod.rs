//! Neighbourhood rules.
//!
//! A `CellCondition` is an odd-sized boolean window centred on a cell.
//! Map rules pair a condition with an output cell state and drive the
//! cellular automaton; tile rules pair a condition with a mesh patch and
//! drive the mesh tiler. Both tables are ordered and first match wins.
//!
//! Conditions are stored flattened row-major: index `yf * width + xf`,
//! where `xf = 0, yf = 0` is the offset `(-edge_x, -edge_y)` from the centre.

pub mod tile;

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::constants::{NEIGHBOURHOOD_3X3_COUNT, STANDARD_CONDITION_SIDE};
use crate::error::{LevelGenError, Result};
use crate::grid::{Cell, CellPos, Grid};

pub use tile::{TilePatch, TileRule, TileRuleSet};

/// Expected occupancy pattern over a cell's local window
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellCondition {
    pub width: usize,
    pub height: usize,
    pub cells: Vec<bool>,
}

impl CellCondition {
    pub fn new(width: usize, height: usize, cells: Vec<bool>) -> Result<Self> {
        let condition = Self {
            width,
            height,
            cells,
        };
        condition.validate()?;
        Ok(condition)
    }

    /// 3x3 condition whose cell `i` is bit `i` of `id`
    pub fn from_id_3x3(id: u32) -> Self {
        let side = STANDARD_CONDITION_SIDE;
        Self {
            width: side,
            height: side,
            cells: (0..side * side).map(|n| (id >> n) & 1 == 1).collect(),
        }
    }

    /// Build from text rows, `#` = Occupied. The first row is the lowest y offset.
    pub fn from_rows(rows: &[&str]) -> Result<Self> {
        let height = rows.len();
        let width = rows.first().map(|r| r.chars().count()).unwrap_or(0);
        if rows.iter().any(|r| r.chars().count() != width) {
            return Err(LevelGenError::InvalidCondition(
                "rows must all have the same length".into(),
            ));
        }
        let cells = rows
            .iter()
            .flat_map(|r| r.chars().map(|c| c == '#'))
            .collect();
        Self::new(width, height, cells)
    }

    /// Every possible 3x3 condition, ordered by id
    pub fn all_3x3() -> impl Iterator<Item = CellCondition> {
        (0..NEIGHBOURHOOD_3X3_COUNT).map(Self::from_id_3x3)
    }

    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(LevelGenError::InvalidCondition(format!(
                "size {}x{} must be non-zero",
                self.width, self.height
            )));
        }
        if self.width % 2 == 0 || self.height % 2 == 0 {
            return Err(LevelGenError::InvalidCondition(format!(
                "size {}x{} must be odd in both dimensions",
                self.width, self.height
            )));
        }
        if self.cells.len() != self.width * self.height {
            return Err(LevelGenError::InvalidCondition(format!(
                "expected {} cells for {}x{}, got {}",
                self.width * self.height,
                self.width,
                self.height,
                self.cells.len()
            )));
        }
        Ok(())
    }

    pub fn is_well_formed(&self) -> bool {
        self.validate().is_ok()
    }

    /// Bitmask id of a 3x3 condition; `None` for any other size
    pub fn id_3x3(&self) -> Option<u32> {
        let side = STANDARD_CONDITION_SIDE;
        if self.width != side || self.height != side || self.cells.len() != side * side {
            return None;
        }
        Some(
            self.cells
                .iter()
                .enumerate()
                .fold(0, |id, (i, &on)| id | ((on as u32) << i)),
        )
    }

    /// Distance from the centre to the window edge along x and y
    pub fn edge(&self) -> (i32, i32) {
        (
            (self.width.saturating_sub(1) / 2) as i32,
            (self.height.saturating_sub(1) / 2) as i32,
        )
    }

    pub fn center(&self) -> Option<bool> {
        let (ex, ey) = self.edge();
        self.cells
            .get(ey as usize * self.width + ex as usize)
            .copied()
    }

    /// True if every window cell around `pos` equals the expected state.
    /// Off-grid neighbours read as Empty. Malformed conditions never match.
    pub fn matches(&self, grid: &Grid<Cell>, pos: CellPos) -> bool {
        if !self.is_well_formed() {
            return false;
        }
        let (ex, ey) = self.edge();
        for yf in 0..self.height {
            for xf in 0..self.width {
                let neighbour = pos.offset(xf as i32 - ex, yf as i32 - ey);
                if grid.is_occupied(neighbour) != self.cells[yf * self.width + xf] {
                    return false;
                }
            }
        }
        true
    }
}

/// If the condition matches, the centre cell becomes `output`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapRule {
    pub condition: CellCondition,
    pub output: Cell,
}

impl MapRule {
    pub fn new(condition: CellCondition, output: Cell) -> Self {
        Self { condition, output }
    }
}

/// Ordered map rules. Evaluation order is significant.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RuleTable {
    pub rules: Vec<MapRule>,
}

impl RuleTable {
    pub fn new(rules: Vec<MapRule>) -> Self {
        Self { rules }
    }

    /// One rule per 3x3 neighbourhood, in id order, for every id where `f` yields an output
    pub fn from_fn_3x3(mut f: impl FnMut(&CellCondition) -> Option<Cell>) -> Self {
        let rules = CellCondition::all_3x3()
            .filter_map(|condition| f(&condition).map(|output| MapRule::new(condition, output)))
            .collect();
        Self { rules }
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// First rule whose condition matches at `pos`
    pub fn first_match(&self, grid: &Grid<Cell>, pos: CellPos) -> Option<&MapRule> {
        self.rules.iter().find(|r| r.condition.matches(grid, pos))
    }

    pub fn validate(&self) -> Result<()> {
        for (i, rule) in self.rules.iter().enumerate() {
            rule.condition.validate().map_err(|e| {
                LevelGenError::InvalidCondition(format!("map rule {}: {}", i, e))
            })?;
        }
        Ok(())
    }
}

/// Authored rule asset: map rules for smoothing plus tile rules for meshing
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RuleAsset {
    #[serde(default)]
    pub map_rules: RuleTable,
    #[serde(default)]
    pub tile_rules: TileRuleSet,
}

impl RuleAsset {
    pub fn from_ron_str(text: &str) -> Result<Self> {
        let asset: Self = ron::from_str(text)?;
        asset.validate()?;
        Ok(asset)
    }

    pub fn to_ron_string(&self) -> Result<String> {
        Ok(ron::ser::to_string_pretty(
            self,
            ron::ser::PrettyConfig::default(),
        )?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| LevelGenError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_ron_str(&text)
    }

    pub fn validate(&self) -> Result<()> {
        self.map_rules.validate()?;
        self.tile_rules.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_roundtrip_all_3x3() {
        for (id, condition) in CellCondition::all_3x3().enumerate() {
            assert_eq!(condition.id_3x3(), Some(id as u32));
        }
        assert_eq!(CellCondition::all_3x3().count(), 512);
    }

    #[test]
    fn test_id_bit_layout() {
        // bit 4 is the centre, bit 0 is (-1, -1)
        let centre_only = CellCondition::from_id_3x3(1 << 4);
        assert_eq!(centre_only.center(), Some(true));
        assert_eq!(
            CellCondition::from_rows(&["#..", "...", "..."]).unwrap().id_3x3(),
            Some(1)
        );
    }

    #[test]
    fn test_non_3x3_has_no_id() {
        let wide = CellCondition::new(5, 3, vec![false; 15]).unwrap();
        assert_eq!(wide.id_3x3(), None);
        assert_eq!(wide.edge(), (2, 1));
    }

    #[test]
    fn test_even_size_rejected() {
        assert!(CellCondition::new(2, 3, vec![false; 6]).is_err());
        assert!(CellCondition::new(0, 0, vec![]).is_err());
        assert!(CellCondition::new(3, 3, vec![false; 8]).is_err());
    }

    #[test]
    fn test_matches_treats_off_grid_as_empty() {
        let grid = Grid::from_ascii("#");
        let lone = CellCondition::from_rows(&["...", ".#.", "..."]).unwrap();
        assert!(lone.matches(&grid, CellPos::new(0, 0)));

        let full = CellCondition::from_id_3x3(511);
        assert!(!full.matches(&grid, CellPos::new(0, 0)));
    }

    #[test]
    fn test_matches_reads_row_offsets() {
        let grid = Grid::from_ascii(
            "
            ...
            ...
            ###
            ",
        );
        let floor_below = CellCondition::from_rows(&["...", "...", "###"]).unwrap();
        assert!(floor_below.matches(&grid, CellPos::new(1, 1)));
        assert!(!floor_below.matches(&grid, CellPos::new(1, 2)));
    }

    #[test]
    fn test_first_match_respects_order() {
        let any_centre = CellCondition::from_id_3x3(1 << 4);
        let table = RuleTable::new(vec![
            MapRule::new(any_centre.clone(), Cell::Empty),
            MapRule::new(any_centre, Cell::Occupied),
        ]);
        let grid = Grid::from_ascii("#");
        let rule = table.first_match(&grid, CellPos::new(0, 0)).unwrap();
        assert_eq!(rule.output, Cell::Empty);
    }

    #[test]
    fn test_from_fn_3x3_skips_none() {
        let table = RuleTable::from_fn_3x3(|c| c.center().filter(|&on| on).map(|_| Cell::Empty));
        assert_eq!(table.len(), 256);
    }

    #[test]
    fn test_rule_asset_ron() {
        let text = r#"(
            map_rules: [
                (
                    condition: (width: 3, height: 3, cells: [
                        false, false, false,
                        false, true, false,
                        false, false, false,
                    ]),
                    output: Empty,
                ),
            ],
        )"#;
        let asset = RuleAsset::from_ron_str(text).unwrap();
        assert_eq!(asset.map_rules.len(), 1);
        assert!(asset.tile_rules.is_empty());
        let again = RuleAsset::from_ron_str(&asset.to_ron_string().unwrap()).unwrap();
        assert_eq!(again, asset);
    }

    #[test]
    fn test_rule_asset_rejects_bad_condition() {
        let text = r#"(map_rules: [(
            condition: (width: 2, height: 2, cells: [true, true, true, true]),
            output: Occupied,
        )])"#;
        assert!(matches!(
            RuleAsset::from_ron_str(text),
            Err(LevelGenError::InvalidCondition(_))
        ));
    }
}
