//! Grid model: cell kinds, points, directions and the text map loader.

use std::fmt;

use crate::error::MapError;

/// What occupies a cell when the map is loaded. Never changes afterwards;
/// box and agent motion is tracked by the search state, not the grid.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum CellKind {
    Wall,
    Passage,
    Box,
    Goal,
    /// A goal that starts with a box on it.
    GoalFilled,
    AgentStart,
    /// Agent start on top of a goal (XSB `+`).
    AgentOnGoal,
}

impl CellKind {
    #[inline]
    pub fn is_wall(self) -> bool {
        self == CellKind::Wall
    }

    #[inline]
    pub fn is_goal(self) -> bool {
        matches!(
            self,
            CellKind::Goal | CellKind::GoalFilled | CellKind::AgentOnGoal
        )
    }

    #[inline]
    pub fn has_box(self) -> bool {
        matches!(self, CellKind::Box | CellKind::GoalFilled)
    }

    #[inline]
    pub fn is_agent(self) -> bool {
        matches!(self, CellKind::AgentStart | CellKind::AgentOnGoal)
    }
}

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct Point {
    pub row: i16,
    pub col: i16,
}

impl Point {
    #[inline(always)]
    pub const fn new(row: i16, col: i16) -> Self {
        Point { row, col }
    }

    #[inline(always)]
    pub fn step(self, dir: Direction) -> Self {
        let (drow, dcol) = dir.offset();
        Point::new(self.row + drow, self.col + dcol)
    }

    #[inline]
    pub fn manhattan(self, other: Point) -> u32 {
        (self.row - other.row).unsigned_abs() as u32 + (self.col - other.col).unsigned_abs() as u32
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// The four agent moves, in expansion order.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Direction {
    Left,
    Up,
    Right,
    Down,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Left,
        Direction::Up,
        Direction::Right,
        Direction::Down,
    ];

    /// `(drow, dcol)` unit vector.
    #[inline(always)]
    pub const fn offset(self) -> (i16, i16) {
        match self {
            Direction::Left => (0, -1),
            Direction::Up => (-1, 0),
            Direction::Right => (0, 1),
            Direction::Down => (1, 0),
        }
    }

    pub fn from_delta(drow: i16, dcol: i16) -> Option<Self> {
        Direction::ALL
            .into_iter()
            .find(|d| d.offset() == (drow, dcol))
    }

    /// Move-string symbol: upper case for a push, lower case for a plain move.
    #[inline]
    pub fn symbol(self, push: bool) -> char {
        let c = match self {
            Direction::Left => 'l',
            Direction::Up => 'u',
            Direction::Right => 'r',
            Direction::Down => 'd',
        };
        if push {
            c.to_ascii_uppercase()
        } else {
            c
        }
    }

    /// Inverse of [`Direction::symbol`].
    pub fn from_symbol(symbol: char) -> Option<(Self, bool)> {
        let dir = match symbol.to_ascii_lowercase() {
            'l' => Direction::Left,
            'u' => Direction::Up,
            'r' => Direction::Right,
            'd' => Direction::Down,
            _ => return None,
        };
        Some((dir, symbol.is_ascii_uppercase()))
    }
}

/// Symbol set of a text map.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum MapFormat {
    /// `X` wall, `.` passage, `J` box, `G` goal, `F` filled goal, `M` agent.
    #[default]
    Legacy,
    /// Standard XSB: `#`, ` `/`-`/`_`, `$`, `.`, `*`, `@`, `+`.
    Xsb,
}

impl MapFormat {
    fn cell(self, symbol: char) -> Option<CellKind> {
        let kind = match self {
            MapFormat::Legacy => match symbol {
                'X' => CellKind::Wall,
                '.' => CellKind::Passage,
                'J' => CellKind::Box,
                'G' => CellKind::Goal,
                'F' => CellKind::GoalFilled,
                'M' => CellKind::AgentStart,
                _ => return None,
            },
            MapFormat::Xsb => match symbol {
                '#' => CellKind::Wall,
                ' ' | '-' | '_' => CellKind::Passage,
                '$' => CellKind::Box,
                '.' => CellKind::Goal,
                '*' => CellKind::GoalFilled,
                '@' => CellKind::AgentStart,
                '+' => CellKind::AgentOnGoal,
                _ => return None,
            },
        };
        Some(kind)
    }
}

/// Largest row or column count. Every cell and its four neighbours must
/// have `i16` coordinates.
pub const MAX_EXTENT: usize = i16::MAX as usize;

/// Immutable rectangular matrix of cell kinds with exactly one agent start
/// and as many boxes as goals.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Grid {
    rows: usize,
    cols: usize,
    cells: Vec<CellKind>,
    agent: Point,
    num_boxes: usize,
}

impl Grid {
    /// Parses a text map, one row per line.
    pub fn parse(text: &str, format: MapFormat) -> Result<Self, MapError> {
        let bytes = text.as_bytes();
        let mut lines = Vec::new();
        let mut start = 0;
        for end in memchr::memchr_iter(b'\n', bytes) {
            lines.push(&text[start..end]);
            start = end + 1;
        }
        if start < bytes.len() {
            lines.push(&text[start..]);
        }

        let mut rows = Vec::with_capacity(lines.len());
        for (row, line) in lines.into_iter().enumerate() {
            let line = line.strip_suffix('\r').unwrap_or(line);
            let mut cells = Vec::with_capacity(line.len());
            for (col, symbol) in line.chars().enumerate() {
                let kind = format
                    .cell(symbol)
                    .ok_or(MapError::UnknownSymbol { row, col, symbol })?;
                cells.push(kind);
            }
            rows.push(cells);
        }
        while rows.last().is_some_and(|r| r.is_empty()) {
            rows.pop();
        }

        Self::from_rows(rows)
    }

    /// Builds a grid from an already classified matrix.
    pub fn from_rows(rows: Vec<Vec<CellKind>>) -> Result<Self, MapError> {
        let cols = rows.first().map_or(0, Vec::len);
        if rows.is_empty() || cols == 0 {
            return Err(MapError::Empty);
        }
        if rows.len() > MAX_EXTENT || cols > MAX_EXTENT {
            return Err(MapError::TooLarge {
                rows: rows.len(),
                cols,
                max: MAX_EXTENT,
            });
        }

        let mut cells = Vec::with_capacity(rows.len() * cols);
        let mut agent: Option<(usize, usize)> = None;
        let mut num_boxes = 0;
        let mut num_goals = 0;

        for (r, row) in rows.iter().enumerate() {
            if row.len() != cols {
                return Err(MapError::RaggedRow {
                    row: r,
                    expected: cols,
                    found: row.len(),
                });
            }
            for (c, &kind) in row.iter().enumerate() {
                if kind.is_agent() {
                    if let Some(first) = agent {
                        return Err(MapError::MultipleAgents {
                            first,
                            second: (r, c),
                        });
                    }
                    agent = Some((r, c));
                }
                num_boxes += usize::from(kind.has_box());
                num_goals += usize::from(kind.is_goal());
                cells.push(kind);
            }
        }

        let (agent_row, agent_col) = agent.ok_or(MapError::MissingAgent)?;
        if num_boxes != num_goals {
            return Err(MapError::BoxGoalMismatch {
                boxes: num_boxes,
                goals: num_goals,
            });
        }

        Ok(Grid {
            rows: rows.len(),
            cols,
            cells,
            agent: Point::new(agent_row as i16, agent_col as i16),
            num_boxes,
        })
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    #[inline]
    pub fn agent(&self) -> Point {
        self.agent
    }

    #[inline]
    pub fn num_boxes(&self) -> usize {
        self.num_boxes
    }

    #[inline(always)]
    pub fn contains(&self, p: Point) -> bool {
        p.row >= 0 && (p.row as usize) < self.rows && p.col >= 0 && (p.col as usize) < self.cols
    }

    /// Kind of the cell at `p`; anything outside the rectangle is a wall.
    #[inline]
    pub fn kind(&self, p: Point) -> CellKind {
        if self.contains(p) {
            self.cells[p.row as usize * self.cols + p.col as usize]
        } else {
            CellKind::Wall
        }
    }

    #[inline]
    pub fn is_wall(&self, p: Point) -> bool {
        self.kind(p).is_wall()
    }

    /// All points in row-major order.
    pub fn points(&self) -> impl Iterator<Item = Point> + '_ {
        (0..self.rows).flat_map(move |r| (0..self.cols).map(move |c| Point::new(r as i16, c as i16)))
    }

    pub fn boxes(&self) -> impl Iterator<Item = Point> + '_ {
        self.points().filter(|&p| self.kind(p).has_box())
    }

    pub fn goals(&self) -> impl Iterator<Item = Point> + '_ {
        self.points().filter(|&p| self.kind(p).is_goal())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_legacy_map() {
        let grid = Grid::parse("XXXXX\nXMJGX\nXXXXX\n", MapFormat::Legacy).unwrap();
        assert_eq!((grid.rows(), grid.cols()), (3, 5));
        assert_eq!(grid.agent(), Point::new(1, 1));
        assert_eq!(grid.boxes().collect::<Vec<_>>(), vec![Point::new(1, 2)]);
        assert_eq!(grid.goals().collect::<Vec<_>>(), vec![Point::new(1, 3)]);
        assert!(grid.is_wall(Point::new(0, 0)));
        assert!(grid.is_wall(Point::new(-1, 2)));
        assert!(grid.is_wall(Point::new(1, 5)));
    }

    #[test]
    fn parses_xsb_with_crlf_and_agent_on_goal() {
        let grid = Grid::parse("#####\r\n#+$ #\r\n#####\r\n", MapFormat::Xsb).unwrap();
        assert_eq!(grid.kind(grid.agent()), CellKind::AgentOnGoal);
        assert_eq!(grid.num_boxes(), 1);
        assert_eq!(grid.goals().count(), 1);
    }

    #[test]
    fn filled_goal_counts_as_box_and_goal() {
        let grid = Grid::parse("XXXX\nXMFX\nXXXX", MapFormat::Legacy).unwrap();
        assert_eq!(grid.num_boxes(), 1);
        assert_eq!(grid.goals().count(), 1);
    }

    #[test]
    fn rejects_malformed_maps() {
        assert_eq!(Grid::parse("", MapFormat::Legacy), Err(MapError::Empty));
        assert_eq!(
            Grid::parse("XXXX\nXMJGX\n", MapFormat::Legacy),
            Err(MapError::RaggedRow {
                row: 1,
                expected: 4,
                found: 5
            })
        );
        assert_eq!(
            Grid::parse("XJGX\n", MapFormat::Legacy),
            Err(MapError::MissingAgent)
        );
        assert_eq!(
            Grid::parse("MJGM\n", MapFormat::Legacy),
            Err(MapError::MultipleAgents {
                first: (0, 0),
                second: (0, 3)
            })
        );
        assert_eq!(
            Grid::parse("MJJG\n", MapFormat::Legacy),
            Err(MapError::BoxGoalMismatch { boxes: 2, goals: 1 })
        );
        assert_eq!(
            Grid::parse("MJ?G\n", MapFormat::Legacy),
            Err(MapError::UnknownSymbol {
                row: 0,
                col: 2,
                symbol: '?'
            })
        );
    }

    #[test]
    fn rejects_maps_beyond_point_range() {
        let wide = format!("{}MFX", "X".repeat(MAX_EXTENT - 2));
        assert_eq!(
            Grid::parse(&wide, MapFormat::Legacy),
            Err(MapError::TooLarge {
                rows: 1,
                cols: MAX_EXTENT + 1,
                max: MAX_EXTENT
            })
        );

        let tall = vec![vec![CellKind::Wall]; MAX_EXTENT + 1];
        assert_eq!(
            Grid::from_rows(tall),
            Err(MapError::TooLarge {
                rows: MAX_EXTENT + 1,
                cols: 1,
                max: MAX_EXTENT
            })
        );

        let widest = format!("{}MFX", "X".repeat(MAX_EXTENT - 3));
        let grid = Grid::parse(&widest, MapFormat::Legacy).unwrap();
        assert_eq!(grid.cols(), MAX_EXTENT);
        assert_eq!(grid.agent(), Point::new(0, MAX_EXTENT as i16 - 3));
        assert_eq!(
            grid.boxes().collect::<Vec<_>>(),
            vec![Point::new(0, MAX_EXTENT as i16 - 2)]
        );
    }

    #[test]
    fn direction_symbols_round_trip() {
        for dir in Direction::ALL {
            for push in [false, true] {
                assert_eq!(Direction::from_symbol(dir.symbol(push)), Some((dir, push)));
            }
            let (dr, dc) = dir.offset();
            assert_eq!(Direction::from_delta(dr, dc), Some(dir));
        }
        assert_eq!(Direction::from_symbol('x'), None);
        assert_eq!(Direction::from_delta(1, 1), None);
    }
}
