//! Dense numbering of the open (non-wall) cells of a grid.

use std::fmt;

use crate::error::{ConfigError, SolverError};
use crate::grid::{Grid, Point};

/// Largest number of open cells a grid may have.
pub const MAX_SPACES: usize = u16::MAX as usize;

/// 1-based number of an open cell, assigned row-major.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct SpaceIndex(u16);

impl SpaceIndex {
    #[inline(always)]
    pub const fn new(raw: u16) -> Self {
        SpaceIndex(raw)
    }

    #[inline(always)]
    pub const fn get(self) -> u16 {
        self.0
    }
}

impl fmt::Display for SpaceIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Bijection between open cells and `1..=num_spaces`.
#[derive(Clone, Debug)]
pub struct PositionIndexer {
    cols: usize,
    rows: usize,
    // 0 marks a wall
    by_cell: Vec<u16>,
    points: Vec<Point>,
}

impl PositionIndexer {
    pub fn new(grid: &Grid) -> Result<Self, ConfigError> {
        let mut by_cell = vec![0u16; grid.rows() * grid.cols()];
        let mut points = Vec::new();

        for (i, p) in grid.points().enumerate() {
            if grid.is_wall(p) {
                continue;
            }
            points.push(p);
            if points.len() > MAX_SPACES {
                return Err(ConfigError::TooManySpaces {
                    num_spaces: grid.points().filter(|&q| !grid.is_wall(q)).count(),
                    max: MAX_SPACES,
                });
            }
            by_cell[i] = points.len() as u16;
        }

        Ok(PositionIndexer {
            cols: grid.cols(),
            rows: grid.rows(),
            by_cell,
            points,
        })
    }

    #[inline]
    pub fn num_spaces(&self) -> usize {
        self.points.len()
    }

    /// Space index of `p`, or `None` for walls and points off the grid.
    #[inline]
    pub fn index_of(&self, p: Point) -> Option<SpaceIndex> {
        if p.row < 0 || p.col < 0 || p.row as usize >= self.rows || p.col as usize >= self.cols {
            return None;
        }
        match self.by_cell[p.row as usize * self.cols + p.col as usize] {
            0 => None,
            raw => Some(SpaceIndex(raw)),
        }
    }

    #[inline]
    pub fn pos_of(&self, index: SpaceIndex) -> Result<Point, SolverError> {
        (index.0 as usize)
            .checked_sub(1)
            .and_then(|i| self.points.get(i))
            .copied()
            .ok_or(SolverError::OutOfRange {
                what: "space index",
                value: u64::from(index.0),
                max: self.points.len() as u64,
            })
    }

    /// All space indices in increasing order.
    pub fn indices(&self) -> impl Iterator<Item = SpaceIndex> {
        (1..=self.points.len() as u16).map(SpaceIndex)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::MapFormat;

    fn grid() -> Grid {
        Grid::parse("XXXXX\nXMJ.X\nX.XGX\nXXXXX", MapFormat::Legacy).unwrap()
    }

    #[test]
    fn numbers_open_cells_row_major() {
        let idx = PositionIndexer::new(&grid()).unwrap();
        assert_eq!(idx.num_spaces(), 5);
        let expected = [(1, 1), (1, 2), (1, 3), (2, 1), (2, 3)];
        for (i, &(r, c)) in expected.iter().enumerate() {
            let si = SpaceIndex::new(i as u16 + 1);
            assert_eq!(idx.pos_of(si).unwrap(), Point::new(r, c));
            assert_eq!(idx.index_of(Point::new(r, c)), Some(si));
        }
    }

    #[test]
    fn walls_and_outside_have_no_index() {
        let idx = PositionIndexer::new(&grid()).unwrap();
        assert_eq!(idx.index_of(Point::new(2, 2)), None);
        assert_eq!(idx.index_of(Point::new(-1, 0)), None);
        assert_eq!(idx.index_of(Point::new(0, 9)), None);
    }

    #[test]
    fn too_many_open_cells_are_rejected() {
        let mut rows = vec![".".repeat(257); 256];
        rows[0].replace_range(0..3, "MJG");
        let grid = Grid::parse(&rows.join("\n"), MapFormat::Legacy).unwrap();
        assert_eq!(
            PositionIndexer::new(&grid).unwrap_err(),
            ConfigError::TooManySpaces {
                num_spaces: 256 * 257,
                max: MAX_SPACES
            }
        );
    }

    #[test]
    fn reverse_lookup_out_of_range_is_an_error() {
        let idx = PositionIndexer::new(&grid()).unwrap();
        for raw in [0, 6] {
            assert_eq!(
                idx.pos_of(SpaceIndex::new(raw)),
                Err(SolverError::OutOfRange {
                    what: "space index",
                    value: u64::from(raw),
                    max: 5
                })
            );
        }
    }
}
