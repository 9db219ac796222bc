//! Stage-by-stage level generation.
//!
//! A `LevelGenerator` owns one run at a time and exposes each stage as its
//! own call: map, regions, connection, mesh. Calls made out of order or
//! repeated without regenerating the map are logged and skipped; they never
//! fail and never touch state.

use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;
use serde::{Deserialize, Serialize};

use super::automaton::CellularAutomaton;
use super::connector::{ConnectionReport, RegionConnector};
use super::mesh::{self, MeshBuffers, MeshTiler};
use super::noise_map::{NoiseMapGenerator, NoiseOffset};
use super::regions::{Region, RegionFinder, RegionScan};
use super::GenerationSeed;
use crate::config::GeneratorConfig;
use crate::error::Result;
use crate::grid::{Cell, Grid};
use crate::logging::TimingSpan;
use crate::rules::RuleAsset;
use crate::visualization::DebugBitmap;

/// Furthest stage the current run has reached
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Stage {
    NotStarted,
    MapGenerated,
    RegionsFound,
    RegionsConnected,
    MeshGenerated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SkipReason {
    /// No map has been generated yet
    NoMap,
    /// The map has no Occupied cells
    NoOccupiedCells,
    RegionsAlreadyFound,
    RegionsNotFound,
    /// Every region was below the minimum size
    NoRegions,
    AlreadyConnected,
}

impl SkipReason {
    pub fn message(&self) -> &'static str {
        match self {
            SkipReason::NoMap => "a map must be generated first",
            SkipReason::NoOccupiedCells => {
                "a map containing at least one occupied cell must be generated first"
            }
            SkipReason::RegionsAlreadyFound => "regions have already been found",
            SkipReason::RegionsNotFound => "regions must be found first",
            SkipReason::NoRegions => "no regions survived size filtering",
            SkipReason::AlreadyConnected => "regions have already been connected",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StageOutcome {
    Completed,
    Skipped(SkipReason),
}

impl StageOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, StageOutcome::Completed)
    }

    fn skipped(reason: SkipReason) -> Self {
        tracing::warn!(reason = ?reason, "{}", reason.message());
        StageOutcome::Skipped(reason)
    }
}

pub struct LevelGenerator {
    config: GeneratorConfig,
    rules: RuleAsset,
    seed: GenerationSeed,
    noise: NoiseMapGenerator,
    run: u32,
    offset: Option<NoiseOffset>,
    grid: Option<Grid<Cell>>,
    scan: Option<RegionScan>,
    connection: Option<ConnectionReport>,
    mesh: Option<MeshBuffers>,
}

impl LevelGenerator {
    pub fn new(config: GeneratorConfig, rules: RuleAsset) -> Result<Self> {
        config.validate()?;
        rules.validate()?;
        let seed = config
            .seed
            .map(GenerationSeed::new)
            .unwrap_or_else(GenerationSeed::random);
        let noise = NoiseMapGenerator::new(config.noise, seed.noise_seed());
        tracing::debug!(
            seed = seed.seed,
            width = config.width,
            height = config.height,
            "level generator created"
        );
        Ok(Self {
            config,
            rules,
            seed,
            noise,
            run: 0,
            offset: None,
            grid: None,
            scan: None,
            connection: None,
            mesh: None,
        })
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    pub fn rules(&self) -> &RuleAsset {
        &self.rules
    }

    pub fn seed(&self) -> GenerationSeed {
        self.seed
    }

    /// Number of maps generated so far
    pub fn run(&self) -> u32 {
        self.run
    }

    pub fn offset(&self) -> Option<NoiseOffset> {
        self.offset
    }

    pub fn grid(&self) -> Option<&Grid<Cell>> {
        self.grid.as_ref()
    }

    pub fn regions(&self) -> &[Region] {
        self.scan.as_ref().map_or(&[], |s| s.regions.as_slice())
    }

    pub fn region_scan(&self) -> Option<&RegionScan> {
        self.scan.as_ref()
    }

    pub fn connection(&self) -> Option<&ConnectionReport> {
        self.connection.as_ref()
    }

    pub fn mesh(&self) -> Option<&MeshBuffers> {
        self.mesh.as_ref()
    }

    pub fn stage(&self) -> Stage {
        if self.mesh.is_some() {
            Stage::MeshGenerated
        } else if self.connection.is_some() {
            Stage::RegionsConnected
        } else if self.scan.is_some() {
            Stage::RegionsFound
        } else if self.grid.is_some() {
            Stage::MapGenerated
        } else {
            Stage::NotStarted
        }
    }

    /// Start a new run: fresh offset, noise threshold, then smoothing
    pub fn generate_map(&mut self) -> StageOutcome {
        let _span = TimingSpan::new("generate_map");
        self.run = self.run.wrapping_add(1);

        let mut rng = Xoshiro256PlusPlus::seed_from_u64(self.seed.run_hash(self.run));
        let offset = NoiseOffset::draw(&self.config.noise.offset_range, &mut rng);
        let mut grid = self
            .noise
            .generate(self.config.width, self.config.height, offset);

        let automaton = CellularAutomaton::new(&self.rules.map_rules, self.config.sweep_mode);
        let changed = automaton.run(&mut grid, self.config.smoothing_passes);

        tracing::info!(
            run = self.run,
            occupied = grid.occupied_count(),
            smoothed_cells = changed,
            "map generated"
        );
        self.offset = Some(offset);
        self.replace_map(grid);
        StageOutcome::Completed
    }

    /// Install an externally built map and reset every later stage
    pub fn set_map(&mut self, grid: Grid<Cell>) {
        self.offset = None;
        self.replace_map(grid);
    }

    fn replace_map(&mut self, grid: Grid<Cell>) {
        self.grid = Some(grid);
        self.scan = None;
        self.connection = None;
        self.mesh = None;
    }

    pub fn find_regions(&mut self) -> StageOutcome {
        let _span = TimingSpan::new("find_regions");
        let Some(grid) = self.grid.as_mut() else {
            return StageOutcome::skipped(SkipReason::NoMap);
        };
        if self.scan.is_some() {
            return StageOutcome::skipped(SkipReason::RegionsAlreadyFound);
        }
        if grid.occupied_count() == 0 {
            return StageOutcome::skipped(SkipReason::NoOccupiedCells);
        }

        let scan = RegionFinder::new(self.config.min_region_size).find(grid);
        self.scan = Some(scan);
        self.mesh = None;
        StageOutcome::Completed
    }

    pub fn join_regions(&mut self) -> StageOutcome {
        let _span = TimingSpan::new("join_regions");
        let Some(grid) = self.grid.as_mut() else {
            return StageOutcome::skipped(SkipReason::NoMap);
        };
        let Some(scan) = self.scan.as_mut() else {
            return StageOutcome::skipped(SkipReason::RegionsNotFound);
        };
        if scan.regions.is_empty() {
            return StageOutcome::skipped(SkipReason::NoRegions);
        }
        if self.connection.is_some() {
            return StageOutcome::skipped(SkipReason::AlreadyConnected);
        }

        let report = RegionConnector::new(self.config.max_connection_iterations)
            .connect(grid, &mut scan.regions);
        self.connection = Some(report);
        self.mesh = None;
        StageOutcome::Completed
    }

    /// Mesh the current map. May be repeated; each call rebuilds the mesh.
    pub fn generate_mesh(&mut self) -> StageOutcome {
        let _span = TimingSpan::new("generate_mesh");
        let Some(grid) = self.grid.as_ref() else {
            tracing::error!("{}", SkipReason::NoMap.message());
            return StageOutcome::Skipped(SkipReason::NoMap);
        };
        self.mesh = Some(MeshTiler::new(&self.rules.tile_rules).tile(grid));
        StageOutcome::Completed
    }

    /// Run every stage in order. Returns the first skipped stage's outcome,
    /// or `Completed`.
    pub fn generate_all(&mut self) -> StageOutcome {
        let stages: [fn(&mut Self) -> StageOutcome; 4] = [
            Self::generate_map,
            Self::find_regions,
            Self::join_regions,
            Self::generate_mesh,
        ];
        let mut outcome = StageOutcome::Completed;
        for stage in stages {
            let result = stage(self);
            if outcome.is_completed() {
                outcome = result;
            }
        }
        outcome
    }

    /// Debug picture of the current map, regions and corridors
    pub fn debug_bitmap(&self) -> Option<DebugBitmap> {
        let grid = self.grid.as_ref()?;
        let corridors = self
            .connection
            .as_ref()
            .map_or(&[][..], |c| c.corridors.as_slice());
        Some(DebugBitmap::render(grid, self.regions(), corridors))
    }

    /// Condition-sized grid for one tile rule, meshed with all tile rules.
    /// Does not touch the current run.
    pub fn preview_tile_rule(&self, index: isize) -> Option<(Grid<Cell>, MeshBuffers)> {
        mesh::preview_tile_rule(&self.rules.tile_rules, index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn generator(seed: u64) -> LevelGenerator {
        let config = GeneratorConfig::default().with_size(32, 32).with_seed(seed);
        LevelGenerator::new(config, RuleAsset::default()).unwrap()
    }

    #[test]
    fn test_out_of_order_calls_are_skipped() {
        let mut gen = generator(1);
        assert_eq!(gen.find_regions(), StageOutcome::Skipped(SkipReason::NoMap));
        assert_eq!(gen.join_regions(), StageOutcome::Skipped(SkipReason::NoMap));
        assert_eq!(gen.generate_mesh(), StageOutcome::Skipped(SkipReason::NoMap));
        assert_eq!(gen.stage(), Stage::NotStarted);

        gen.generate_map();
        assert_eq!(
            gen.join_regions(),
            StageOutcome::Skipped(SkipReason::RegionsNotFound)
        );
        assert_eq!(gen.stage(), Stage::MapGenerated);
    }

    #[test]
    fn test_find_regions_twice_is_noop() {
        let mut gen = generator(2);
        gen.set_map(Grid::from_ascii("#####.#####\n"));
        assert!(gen.find_regions().is_completed());
        let before = gen.regions().to_vec();
        assert_eq!(
            gen.find_regions(),
            StageOutcome::Skipped(SkipReason::RegionsAlreadyFound)
        );
        assert_eq!(gen.regions(), before.as_slice());
    }

    #[test]
    fn test_empty_map_skips_regions() {
        let mut gen = generator(3);
        gen.set_map(Grid::empty(5, 5));
        assert_eq!(
            gen.find_regions(),
            StageOutcome::Skipped(SkipReason::NoOccupiedCells)
        );
        assert_eq!(gen.stage(), Stage::MapGenerated);
    }

    #[test]
    fn test_join_twice_is_noop() {
        let mut gen = generator(4);
        gen.set_map(Grid::from_ascii("#####...#####\n"));
        gen.find_regions();
        assert!(gen.join_regions().is_completed());
        let grid = gen.grid().cloned();
        assert_eq!(
            gen.join_regions(),
            StageOutcome::Skipped(SkipReason::AlreadyConnected)
        );
        assert_eq!(gen.grid().cloned(), grid);
    }

    #[test]
    fn test_regeneration_resets_later_stages() {
        let mut gen = generator(5);
        gen.generate_all();
        assert!(gen.mesh().is_some());
        gen.generate_map();
        assert_eq!(gen.stage(), Stage::MapGenerated);
        assert!(gen.regions().is_empty());
        assert!(gen.mesh().is_none());
        assert_eq!(gen.run(), 2);
    }

    #[test]
    fn test_same_seed_replays_runs() {
        let mut a = generator(42);
        let mut b = generator(42);
        for _ in 0..3 {
            a.generate_map();
            b.generate_map();
            assert_eq!(a.grid(), b.grid());
            assert_eq!(a.offset(), b.offset());
        }
    }

    #[test]
    fn test_consecutive_runs_draw_new_offsets() {
        let mut gen = generator(42);
        gen.generate_map();
        let first = gen.offset();
        gen.generate_map();
        assert_ne!(gen.offset(), first);
    }

    #[test]
    fn test_preview_leaves_run_untouched() {
        use crate::rules::{CellCondition, TileRule, TileRuleSet};

        let rule = TileRule::new(
            CellCondition::from_id_3x3(1 << 4),
            vec![[0.0, 0.0, 0.0], [0.5, 0.0, 0.0], [0.0, 0.0, 0.5]],
            vec![-3, -2, -1],
        );
        let rules = RuleAsset {
            tile_rules: TileRuleSet::new(vec![rule]),
            ..RuleAsset::default()
        };
        let config = GeneratorConfig::default().with_size(8, 8).with_seed(9);
        let mut gen = LevelGenerator::new(config, rules).unwrap();
        gen.generate_map();
        let grid = gen.grid().cloned();

        let (preview, mesh) = gen.preview_tile_rule(0).unwrap();
        assert_eq!((preview.width(), preview.height()), (3, 3));
        assert_eq!(mesh.vertex_count(), 3);
        assert_eq!(gen.grid().cloned(), grid);
        assert_eq!(gen.stage(), Stage::MapGenerated);
    }

    #[test]
    fn test_debug_bitmap_needs_map() {
        let mut gen = generator(6);
        assert!(gen.debug_bitmap().is_none());
        gen.generate_map();
        let bitmap = gen.debug_bitmap().unwrap();
        assert_eq!((bitmap.width(), bitmap.height()), (32, 32));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = GeneratorConfig::default();
        config.noise.threshold = -0.1;
        assert!(LevelGenerator::new(config, RuleAsset::default()).is_err());
    }
}
