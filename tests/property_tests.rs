//! Property-based tests using proptest
//!
//! Tests invariants that must hold for ALL inputs:
//! - Automaton: grid size preserved, empty table is identity
//! - Regions: partition of occupied cells, size filter honoured
//! - Connector: occupied count never decreases, reachability symmetric
//! - Mesh: triangle indices always inside the vertex buffer
//! - Generator: same seed replays the same level

use std::collections::HashSet;

use proptest::prelude::*;

use levelgen_core::config::GeneratorConfig;
use levelgen_core::generation::{
    CellularAutomaton, LevelGenerator, MeshTiler, RegionConnector, RegionFinder, SweepMode,
};
use levelgen_core::grid::{Cell, Grid};
use levelgen_core::rules::{CellCondition, MapRule, RuleAsset, RuleTable, TileRule, TileRuleSet};

// ============================================================
// Strategies
// ============================================================

fn grid_strategy() -> impl Strategy<Value = Grid<Cell>> {
    (1usize..14, 1usize..14).prop_flat_map(|(w, h)| {
        prop::collection::vec(any::<bool>(), w * h).prop_map(move |bits| {
            Grid::from_fn(w, h, |x, y| Cell::from_bool(bits[y * w + x]))
        })
    })
}

fn sweep_mode_strategy() -> impl Strategy<Value = SweepMode> {
    prop_oneof![Just(SweepMode::Snapshot), Just(SweepMode::Live)]
}

fn rule_table_strategy() -> impl Strategy<Value = RuleTable> {
    prop::collection::vec((0u32..512, any::<bool>()), 0..40).prop_map(|pairs| {
        RuleTable::new(
            pairs
                .into_iter()
                .map(|(id, out)| MapRule::new(CellCondition::from_id_3x3(id), Cell::from_bool(out)))
                .collect(),
        )
    })
}

/// Tile rule whose triangle offsets all land inside its own vertices
fn tile_rule_strategy() -> impl Strategy<Value = TileRule> {
    (0u32..512, 1usize..7).prop_flat_map(|(id, vert_count)| {
        let verts = prop::collection::vec(
            (-0.5f32..0.5, -0.1f32..0.1, -0.5f32..0.5).prop_map(|(x, y, z)| [x, y, z]),
            vert_count,
        );
        let tris = prop::collection::vec(-(vert_count as i32)..=-1, 0..4)
            .prop_map(|tri| tri.into_iter().flat_map(|t| [t, t, t]).collect::<Vec<_>>());
        (verts, tris).prop_map(move |(verts, tris)| {
            TileRule::new(CellCondition::from_id_3x3(id), verts, tris)
        })
    })
}

// ============================================================
// Automaton Properties
// ============================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn prop_automaton_preserves_size(
        grid in grid_strategy(),
        rules in rule_table_strategy(),
        mode in sweep_mode_strategy(),
        passes in 0usize..4,
    ) {
        let mut out = grid.clone();
        CellularAutomaton::new(&rules, mode).run(&mut out, passes);
        prop_assert_eq!(out.width(), grid.width());
        prop_assert_eq!(out.height(), grid.height());
    }

    #[test]
    fn prop_empty_table_is_identity(grid in grid_strategy(), mode in sweep_mode_strategy()) {
        let rules = RuleTable::default();
        let mut out = grid.clone();
        let changed = CellularAutomaton::new(&rules, mode).step(&mut out);
        prop_assert_eq!(changed, 0);
        prop_assert_eq!(out, grid);
    }

    #[test]
    fn prop_snapshot_change_count_matches_diff(
        grid in grid_strategy(),
        rules in rule_table_strategy(),
    ) {
        let mut out = grid.clone();
        let changed = CellularAutomaton::new(&rules, SweepMode::Snapshot).step(&mut out);
        let diff = grid.iter().filter(|(pos, cell)| out.get(*pos) != Some(*cell)).count();
        prop_assert_eq!(changed, diff);
    }
}

// ============================================================
// Region Properties
// ============================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn prop_regions_partition_occupied_cells(grid in grid_strategy(), min_size in 1usize..8) {
        let initial = grid.occupied_count();
        let mut grid = grid;
        let scan = RegionFinder::new(min_size).find(&mut grid);

        let mut seen = HashSet::new();
        for (i, region) in scan.regions.iter().enumerate() {
            prop_assert_eq!(region.id, i);
            prop_assert!(region.len() >= min_size);
            for &pos in &region.cells {
                prop_assert!(grid.is_occupied(pos));
                prop_assert!(seen.insert(pos), "cell {:?} in two regions", pos);
            }
        }
        prop_assert_eq!(seen.len(), grid.occupied_count());
        prop_assert_eq!(seen.len() + scan.discarded_cells, initial);
    }

    #[test]
    fn prop_midpoint_inside_bounds(grid in grid_strategy()) {
        let mut grid = grid;
        let scan = RegionFinder::new(1).find(&mut grid);
        for region in &scan.regions {
            let (lo, hi) = region.bounds().unwrap();
            prop_assert!(region.midpoint.x >= lo.x && region.midpoint.x <= hi.x);
            prop_assert!(region.midpoint.y >= lo.y && region.midpoint.y <= hi.y);
        }
    }
}

// ============================================================
// Connector Properties
// ============================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(150))]

    #[test]
    fn prop_connection_only_adds_cells(grid in grid_strategy()) {
        let mut grid = grid;
        let mut regions = RegionFinder::new(1).find(&mut grid).regions;
        let before = grid.clone();
        let report = RegionConnector::new(300).connect(&mut grid, &mut regions);

        prop_assert!(report.complete);
        prop_assert_eq!(grid.occupied_count(), before.occupied_count() + report.carved_cells());
        for (pos, cell) in before.iter() {
            if cell.is_occupied() {
                prop_assert!(grid.is_occupied(pos));
            }
        }
    }

    #[test]
    fn prop_reachability_symmetric_and_transitive(grid in grid_strategy(), cap in 0usize..3) {
        let mut grid = grid;
        let mut regions = RegionFinder::new(1).find(&mut grid).regions;
        RegionConnector::new(cap).connect(&mut grid, &mut regions);

        for region in &regions {
            prop_assert!(!region.is_connected_to(region.id));
            for &other in &region.connects_to {
                prop_assert!(regions[other].is_connected_to(region.id));
                for &third in &regions[other].connects_to {
                    if third != region.id {
                        prop_assert!(region.is_connected_to(third));
                    }
                }
            }
        }
    }
}

// ============================================================
// Mesh Properties
// ============================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn prop_mesh_indices_in_bounds(
        grid in grid_strategy(),
        rules in prop::collection::vec(tile_rule_strategy(), 0..6),
    ) {
        let rules = TileRuleSet::new(rules);
        let mesh = MeshTiler::new(&rules).tile(&grid);
        prop_assert!(mesh.indices_in_bounds());
        prop_assert_eq!(mesh.triangles.len() % 3, 0);
        prop_assert_eq!(mesh.uvs.len(), mesh.vertices.len());
    }
}

// ============================================================
// Generator Properties
// ============================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(40))]

    #[test]
    fn prop_same_seed_same_level(seed in any::<u64>()) {
        let config = GeneratorConfig::default().with_size(24, 24).with_seed(seed);
        let mut a = LevelGenerator::new(config.clone(), RuleAsset::default()).unwrap();
        let mut b = LevelGenerator::new(config, RuleAsset::default()).unwrap();
        a.generate_all();
        b.generate_all();
        prop_assert_eq!(a.grid(), b.grid());
        prop_assert_eq!(a.mesh(), b.mesh());
    }
}
