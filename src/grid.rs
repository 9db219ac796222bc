//! Row-major 2D grid storage.
//!
//! `Grid<Cell>` is the occupancy map every stage reads and writes.
//! `Grid<bool>` is used as scratch visited-state during flood fills so the
//! occupancy map is never overloaded with traversal bookkeeping.

use serde::{Deserialize, Serialize};

/// State of a single map cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Cell {
    #[default]
    Empty,
    Occupied,
}

impl Cell {
    pub fn from_bool(occupied: bool) -> Self {
        if occupied {
            Cell::Occupied
        } else {
            Cell::Empty
        }
    }

    pub fn is_occupied(self) -> bool {
        self == Cell::Occupied
    }

    pub fn inverted(self) -> Self {
        match self {
            Cell::Empty => Cell::Occupied,
            Cell::Occupied => Cell::Empty,
        }
    }
}

/// Integer cell coordinate. Signed so neighbourhood offsets can step off the map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellPos {
    pub x: i32,
    pub y: i32,
}

impl CellPos {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn offset(self, dx: i32, dy: i32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }

    /// Squared euclidean distance
    pub fn distance_sq(self, other: CellPos) -> i64 {
        let dx = (self.x - other.x) as i64;
        let dy = (self.y - other.y) as i64;
        dx * dx + dy * dy
    }
}

impl From<(i32, i32)> for CellPos {
    fn from((x, y): (i32, i32)) -> Self {
        Self::new(x, y)
    }
}

/// Dense 2D grid indexed by (x, y), stored row-major
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid<T> {
    width: usize,
    height: usize,
    cells: Vec<T>,
}

impl<T: Clone> Grid<T> {
    pub fn new(width: usize, height: usize, fill: T) -> Self {
        Self {
            width,
            height,
            cells: vec![fill; width * height],
        }
    }
}

impl<T> Grid<T> {
    /// Build a grid by evaluating `f(x, y)` for every cell in row-major order
    pub fn from_fn(width: usize, height: usize, mut f: impl FnMut(usize, usize) -> T) -> Self {
        let mut cells = Vec::with_capacity(width * height);
        for y in 0..height {
            for x in 0..width {
                cells.push(f(x, y));
            }
        }
        Self {
            width,
            height,
            cells,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn in_bounds(&self, pos: CellPos) -> bool {
        pos.x >= 0 && pos.y >= 0 && (pos.x as usize) < self.width && (pos.y as usize) < self.height
    }

    fn index(&self, pos: CellPos) -> Option<usize> {
        self.in_bounds(pos)
            .then(|| pos.y as usize * self.width + pos.x as usize)
    }

    pub fn get(&self, pos: CellPos) -> Option<&T> {
        self.index(pos).map(|i| &self.cells[i])
    }

    pub fn get_mut(&mut self, pos: CellPos) -> Option<&mut T> {
        self.index(pos).map(move |i| &mut self.cells[i])
    }

    /// Write a value; returns false if `pos` is off the grid
    pub fn set(&mut self, pos: CellPos, value: T) -> bool {
        match self.get_mut(pos) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }

    /// Iterate `(pos, value)` in row-major order
    pub fn iter(&self) -> impl Iterator<Item = (CellPos, &T)> {
        let width = self.width.max(1);
        self.cells
            .iter()
            .enumerate()
            .map(move |(i, v)| (CellPos::new((i % width) as i32, (i / width) as i32), v))
    }
}

impl Grid<Cell> {
    pub fn empty(width: usize, height: usize) -> Self {
        Self::new(width, height, Cell::Empty)
    }

    /// Out-of-bounds reads count as Empty
    pub fn is_occupied(&self, pos: CellPos) -> bool {
        self.get(pos).is_some_and(|c| c.is_occupied())
    }

    pub fn occupied_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_occupied()).count()
    }

    /// All occupied positions in row-major scan order
    pub fn occupied_cells(&self) -> Vec<CellPos> {
        self.iter()
            .filter(|(_, c)| c.is_occupied())
            .map(|(p, _)| p)
            .collect()
    }

    /// Parse an ASCII picture: `#` is Occupied, anything else Empty.
    /// The first line is row y = 0. Rows shorter than the widest are padded.
    pub fn from_ascii(picture: &str) -> Self {
        let rows: Vec<&str> = picture
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .collect();
        let width = rows.iter().map(|r| r.chars().count()).max().unwrap_or(0);
        Self::from_fn(width, rows.len(), |x, y| {
            Cell::from_bool(rows[y].chars().nth(x) == Some('#'))
        })
    }

    /// Inverse of `from_ascii`
    pub fn to_ascii(&self) -> String {
        let mut out = String::with_capacity((self.width + 1) * self.height);
        for y in 0..self.height {
            for x in 0..self.width {
                let pos = CellPos::new(x as i32, y as i32);
                out.push(if self.is_occupied(pos) { '#' } else { '.' });
            }
            out.push('\n');
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_out_of_bounds_is_empty() {
        let grid = Grid::new(3, 2, Cell::Occupied);
        assert!(grid.is_occupied(CellPos::new(2, 1)));
        assert!(!grid.is_occupied(CellPos::new(3, 0)));
        assert!(!grid.is_occupied(CellPos::new(-1, 0)));
        assert!(!grid.is_occupied(CellPos::new(0, 2)));
    }

    #[test]
    fn test_row_major_iteration() {
        let grid = Grid::from_fn(3, 2, |x, y| (x, y));
        let order: Vec<_> = grid.iter().map(|(_, v)| *v).collect();
        assert_eq!(order, vec![(0, 0), (1, 0), (2, 0), (0, 1), (1, 1), (2, 1)]);
    }

    #[test]
    fn test_set_off_grid_is_rejected() {
        let mut grid = Grid::empty(2, 2);
        assert!(!grid.set(CellPos::new(5, 5), Cell::Occupied));
        assert!(grid.set(CellPos::new(1, 1), Cell::Occupied));
        assert_eq!(grid.occupied_count(), 1);
    }

    #[test]
    fn test_ascii_roundtrip() {
        let picture = "#..\n.##\n";
        let grid = Grid::from_ascii(picture);
        assert_eq!(grid.width(), 3);
        assert_eq!(grid.height(), 2);
        assert!(grid.is_occupied(CellPos::new(0, 0)));
        assert!(grid.is_occupied(CellPos::new(2, 1)));
        assert_eq!(grid.to_ascii(), picture);
    }

    #[test]
    fn test_zero_size_grid() {
        let grid = Grid::empty(0, 0);
        assert!(grid.is_empty());
        assert_eq!(grid.occupied_cells(), Vec::new());
    }
}
