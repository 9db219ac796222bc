//! Level Generation - Procedural Core Library
//!
//! Builds playable 2D floor layouts and their floor meshes:
//! - Perlin noise thresholded into an occupancy grid
//! - Rule-table cellular automaton for smoothing
//! - Flood-fill region discovery with size filtering
//! - Corridor carving until every region is reachable
//! - Tile-rule mesh assembly (vertices, triangles, UVs)
//! - Debug bitmap export

pub mod config;
pub mod constants;
pub mod error;
pub mod generation;
pub mod grid;
pub mod logging;
pub mod rules;
pub mod visualization;

pub use config::GeneratorConfig;
pub use error::{LevelGenError, Result};
pub use generation::{LevelGenerator, MeshBuffers, Stage, StageOutcome};
pub use grid::{Cell, CellPos, Grid};
pub use rules::{CellCondition, MapRule, RuleAsset, RuleTable, TileRule, TileRuleSet};
pub use visualization::DebugBitmap;
