//! Cellular automaton sweep over the occupancy grid.
//!
//! Each cell is tested against the rule table in order; the first matching
//! rule's output replaces the cell, and unmatched cells keep their state.

use serde::{Deserialize, Serialize};

use crate::grid::{Cell, CellPos, Grid};
use crate::rules::RuleTable;

/// Which grid a sweep reads neighbourhoods from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SweepMode {
    /// Read a frozen copy of the pre-sweep grid; no cell sees another cell's update
    #[default]
    Snapshot,
    /// Read and write the same grid in one row-major pass, so earlier writes
    /// feed later neighbourhoods
    Live,
}

pub struct CellularAutomaton<'a> {
    rules: &'a RuleTable,
    mode: SweepMode,
}

impl<'a> CellularAutomaton<'a> {
    pub fn new(rules: &'a RuleTable, mode: SweepMode) -> Self {
        Self { rules, mode }
    }

    /// One sweep. Returns the number of cells whose state changed.
    pub fn step(&self, grid: &mut Grid<Cell>) -> usize {
        if self.rules.is_empty() || grid.is_empty() {
            return 0;
        }
        match self.mode {
            SweepMode::Snapshot => {
                let source = grid.clone();
                self.sweep(&source, grid)
            }
            SweepMode::Live => {
                let mut changed = 0;
                for y in 0..grid.height() {
                    for x in 0..grid.width() {
                        let pos = CellPos::new(x as i32, y as i32);
                        if let Some(rule) = self.rules.first_match(grid, pos) {
                            let output = rule.output;
                            if grid.get(pos) != Some(&output) {
                                grid.set(pos, output);
                                changed += 1;
                            }
                        }
                    }
                }
                changed
            }
        }
    }

    fn sweep(&self, source: &Grid<Cell>, target: &mut Grid<Cell>) -> usize {
        let mut changed = 0;
        for (pos, &before) in source.iter() {
            if let Some(rule) = self.rules.first_match(source, pos) {
                if rule.output != before {
                    target.set(pos, rule.output);
                    changed += 1;
                }
            }
        }
        changed
    }

    /// Apply `passes` sweeps, returning the total number of changes
    pub fn run(&self, grid: &mut Grid<Cell>, passes: usize) -> usize {
        let mut total = 0;
        for pass in 0..passes {
            let changed = self.step(grid);
            tracing::debug!(pass, changed, mode = ?self.mode, "automaton sweep");
            total += changed;
        }
        total
    }
}
