//! Centralized generation constants for the level core.
//!
//! Default values for the generator configuration live here so config
//! defaults, the pipeline and the tests agree on one source of truth.

// =====================================================
// Grid
// =====================================================

/// Default map width in cells
pub const DEFAULT_WIDTH: usize = 64;

/// Default map height in cells
pub const DEFAULT_HEIGHT: usize = 64;

// =====================================================
// Noise
// =====================================================

/// Noise value at or above which a cell starts Occupied
pub const DEFAULT_NOISE_THRESHOLD: f32 = 0.5;

/// Noise-space distance between neighbouring cells
pub const DEFAULT_NOISE_SCALE: f32 = 0.1;

/// Per-axis bound of the random noise offset: offsets are drawn from [-B, B)
pub const DEFAULT_NOISE_OFFSET_BOUND: f32 = 100.0;

// =====================================================
// Regions
// =====================================================

/// Regions with fewer cells than this are discarded
pub const DEFAULT_MIN_REGION_SIZE: usize = 5;

/// Maximum full passes the region connector may make before giving up
pub const DEFAULT_MAX_CONNECTION_ITERATIONS: usize = 300;

// =====================================================
// Rules
// =====================================================

/// Side length of the standard neighbourhood window
pub const STANDARD_CONDITION_SIDE: usize = 3;

/// Number of distinct 3x3 binary neighbourhoods (2^9)
pub const NEIGHBOURHOOD_3X3_COUNT: u32 = 1 << 9;

/// Default number of cellular automaton sweeps per map
pub const DEFAULT_SMOOTHING_PASSES: usize = 1;
