//! Lexicographic ranking of box placements with corner deadlock marking.
//!
//! Every sorted `num_boxes`-subset of `1..=num_spaces` gets a rank in
//! `1..=C(num_spaces, num_boxes)`, in strict lexicographic order. Ranks are
//! the same for the same subset on every run. Subsets that put a box on a
//! corner cell keep their rank but are flagged deadlocked and never become
//! live search states.

use std::fmt;

use log::debug;
use smallvec::SmallVec;

use crate::config::CodecLimits;
use crate::error::{ConfigError, SolverError};
use crate::grid::{Direction, Grid};
use crate::index::{PositionIndexer, SpaceIndex};

/// Sorted space indices of the boxes.
pub type BoxSet = SmallVec<[SpaceIndex; 8]>;

/// 1-based lexicographic rank of a box set.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct BoxesState(u32);

impl BoxesState {
    #[inline(always)]
    pub const fn new(raw: u32) -> Self {
        BoxesState(raw)
    }

    #[inline(always)]
    pub const fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Display for BoxesState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Clone, Debug)]
pub struct CombinationCodec {
    num_spaces: usize,
    num_boxes: usize,
    // binom[m * (num_boxes + 1) + j] == C(m, j), saturating
    binom: Vec<u64>,
    // rank r occupies table[(r - 1) * num_boxes..r * num_boxes]
    table: Vec<SpaceIndex>,
    // bit (r - 1) set => rank r is deadlocked
    deadlocked: Vec<u64>,
    // by space index, slot 0 unused
    corners: Vec<bool>,
    num_live: usize,
}

impl CombinationCodec {
    pub fn new(
        grid: &Grid,
        indexer: &PositionIndexer,
        num_boxes: usize,
        limits: CodecLimits,
    ) -> Result<Self, ConfigError> {
        let num_spaces = indexer.num_spaces();
        if num_boxes == 0 {
            return Err(ConfigError::NoBoxes);
        }

        let too_many = ConfigError::TooManyCombinations {
            num_spaces,
            num_boxes,
            limit: limits.max_entries,
        };
        let count = binomial(num_spaces as u64, num_boxes as u64)
            .filter(|&c| c > 0 && c <= u64::from(u32::MAX))
            .ok_or_else(|| too_many.clone())?;
        match count.checked_mul(num_boxes as u64) {
            Some(entries) if entries <= limits.max_entries => {}
            _ => return Err(too_many),
        }

        let corners = detect_corners(grid, indexer);
        let binom = binomial_table(num_spaces, num_boxes);

        let mut table = Vec::with_capacity(count as usize * num_boxes);
        let mut deadlocked = vec![0u64; (count as usize).div_ceil(64)];
        let mut num_live = 0;
        let mut combo: BoxSet = (1..=num_boxes as u16).map(SpaceIndex::new).collect();
        let mut rank0 = 0usize;
        loop {
            table.extend_from_slice(&combo);
            if combo.iter().any(|s| corners[s.get() as usize]) {
                deadlocked[rank0 / 64] |= 1u64 << (rank0 % 64);
            } else {
                num_live += 1;
            }
            rank0 += 1;
            if !next_combination(&mut combo, num_spaces) {
                break;
            }
        }
        debug_assert_eq!(rank0 as u64, count);

        debug!(
            "combination codec: C({num_spaces}, {num_boxes}) = {count} ranks, {num_live} live, {} corner cells",
            corners.iter().filter(|&&c| c).count()
        );

        Ok(CombinationCodec {
            num_spaces,
            num_boxes,
            binom,
            table,
            deadlocked,
            corners,
            num_live,
        })
    }

    #[inline]
    pub fn num_boxes(&self) -> usize {
        self.num_boxes
    }

    /// `C(num_spaces, num_boxes)`; ranks run `1..=num_combinations()`.
    #[inline]
    pub fn num_combinations(&self) -> usize {
        self.table.len() / self.num_boxes
    }

    /// Number of ranks not flagged as deadlocked.
    #[inline]
    pub fn num_live(&self) -> usize {
        self.num_live
    }

    #[inline]
    pub fn is_corner(&self, index: SpaceIndex) -> bool {
        self.corners.get(index.get() as usize).copied().unwrap_or(false)
    }

    pub fn corners(&self) -> impl Iterator<Item = SpaceIndex> + '_ {
        self.corners
            .iter()
            .enumerate()
            .filter(|&(_, &c)| c)
            .map(|(i, _)| SpaceIndex::new(i as u16))
    }

    /// Rank of a sorted box set, deadlocked or not.
    pub fn rank(&self, combo: &[SpaceIndex]) -> Result<BoxesState, SolverError> {
        if combo.len() != self.num_boxes {
            return Err(SolverError::OutOfRange {
                what: "box count",
                value: combo.len() as u64,
                max: self.num_boxes as u64,
            });
        }

        let n = self.num_spaces;
        let k = self.num_boxes;
        let mut rank0 = 0u64;
        let mut prev = 0usize;
        for (i, s) in combo.iter().enumerate() {
            let c = s.get() as usize;
            if c <= prev || c > n {
                return Err(SolverError::OutOfRange {
                    what: "space index",
                    value: c as u64,
                    max: n as u64,
                });
            }
            // combinations whose i-th element lies strictly between prev and c
            rank0 += self.choose(n - prev, k - i) - self.choose(n + 1 - c, k - i);
            prev = c;
        }
        Ok(BoxesState(rank0 as u32 + 1))
    }

    /// Rank of a sorted box set, or `None` when it puts a box on a corner.
    #[inline]
    pub fn live_rank(&self, combo: &[SpaceIndex]) -> Result<Option<BoxesState>, SolverError> {
        let state = self.rank(combo)?;
        Ok(self.is_live(state).then_some(state))
    }

    #[inline]
    pub fn is_live(&self, state: BoxesState) -> bool {
        let Some(r) = (state.0 as usize).checked_sub(1) else {
            return false;
        };
        r < self.num_combinations() && (self.deadlocked[r / 64] & (1u64 << (r % 64))) == 0
    }

    /// Sorted box set of `state`.
    pub fn combination_of(&self, state: BoxesState) -> Result<&[SpaceIndex], SolverError> {
        let r = state.0 as usize;
        if r == 0 || r > self.num_combinations() {
            return Err(SolverError::OutOfRange {
                what: "boxes state",
                value: u64::from(state.0),
                max: self.num_combinations() as u64,
            });
        }
        let start = (r - 1) * self.num_boxes;
        Ok(&self.table[start..start + self.num_boxes])
    }

    #[inline(always)]
    fn choose(&self, m: usize, j: usize) -> u64 {
        self.binom[m * (self.num_boxes + 1) + j]
    }
}

/// Open non-goal cells with at least two wall neighbours.
fn detect_corners(grid: &Grid, indexer: &PositionIndexer) -> Vec<bool> {
    let mut corners = vec![false; indexer.num_spaces() + 1];
    for (slot, index) in indexer.indices().enumerate() {
        let Ok(p) = indexer.pos_of(index) else {
            continue;
        };
        if grid.kind(p).is_goal() {
            continue;
        }
        let walls = Direction::ALL
            .iter()
            .filter(|&&d| grid.is_wall(p.step(d)))
            .count();
        corners[slot + 1] = walls >= 2;
    }
    corners
}

/// Advances to the lexicographic successor; `false` after the last one.
fn next_combination(combo: &mut [SpaceIndex], num_spaces: usize) -> bool {
    let k = combo.len();
    let Some(i) = (0..k).rev().find(|&i| (combo[i].get() as usize) < num_spaces - k + i + 1) else {
        return false;
    };
    let mut next = combo[i].get() + 1;
    for slot in &mut combo[i..] {
        *slot = SpaceIndex::new(next);
        next += 1;
    }
    true
}

fn binomial(n: u64, k: u64) -> Option<u64> {
    if k > n {
        return Some(0);
    }
    let k = k.min(n - k);
    let mut acc: u64 = 1;
    for i in 0..k {
        // exact at every step: acc == C(n - k + i + 1, i + 1) after the division
        acc = acc.checked_mul(n - k + i + 1)? / (i + 1);
    }
    Some(acc)
}

fn binomial_table(n: usize, k: usize) -> Vec<u64> {
    let w = k + 1;
    let mut t = vec![0u64; (n + 1) * w];
    for m in 0..=n {
        t[m * w] = 1;
        for j in 1..=k.min(m) {
            t[m * w + j] = t[(m - 1) * w + j - 1].saturating_add(t[(m - 1) * w + j]);
        }
    }
    t
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::{MapFormat, Point};
    use proptest::prelude::*;

    fn open_grid(rows: usize, cols: usize, boxes: usize) -> Grid {
        // agent top-left, filled goals from the bottom-right corner backwards
        let mut cells = vec![vec!['.'; cols]; rows];
        cells[0][0] = 'M';
        let mut placed = 0;
        'outer: for r in (0..rows).rev() {
            for c in (0..cols).rev() {
                if placed == boxes {
                    break 'outer;
                }
                if cells[r][c] == '.' {
                    cells[r][c] = 'F';
                    placed += 1;
                }
            }
        }
        let text: Vec<String> = cells.into_iter().map(|r| r.into_iter().collect()).collect();
        Grid::parse(&text.join("\n"), MapFormat::Legacy).unwrap()
    }

    fn codec(grid: &Grid) -> (PositionIndexer, CombinationCodec) {
        let idx = PositionIndexer::new(grid).unwrap();
        let codec =
            CombinationCodec::new(grid, &idx, grid.num_boxes(), CodecLimits::default()).unwrap();
        (idx, codec)
    }

    fn ix(raw: &[u16]) -> Vec<SpaceIndex> {
        raw.iter().copied().map(SpaceIndex::new).collect()
    }

    #[test]
    fn ranks_follow_lexicographic_order() {
        let grid = open_grid(2, 2, 2);
        let (_, codec) = codec(&grid);
        assert_eq!(codec.num_combinations(), 6);
        let expected: [&[u16]; 6] = [&[1, 2], &[1, 3], &[1, 4], &[2, 3], &[2, 4], &[3, 4]];
        for (r, combo) in expected.iter().enumerate() {
            let state = BoxesState::new(r as u32 + 1);
            assert_eq!(codec.combination_of(state).unwrap(), &ix(combo)[..]);
            assert_eq!(codec.rank(&ix(combo)).unwrap(), state);
        }
    }

    #[test]
    fn corner_cells_are_flagged_and_goals_exempt() {
        //  XXXXX
        //  XMJ.X
        //  X..GX
        //  XXXXX
        let grid = Grid::parse("XXXXX\nXMJ.X\nX..GX\nXXXXX", MapFormat::Legacy).unwrap();
        let (idx, codec) = codec(&grid);
        let corners: Vec<Point> = codec.corners().map(|s| idx.pos_of(s).unwrap()).collect();
        assert_eq!(
            corners,
            vec![Point::new(1, 1), Point::new(1, 3), Point::new(2, 1)]
        );
        assert!(!codec.is_corner(idx.index_of(Point::new(2, 3)).unwrap()));

        let corner = idx.index_of(Point::new(1, 3)).unwrap();
        let state = codec.rank(&[corner]).unwrap();
        assert!(!codec.is_live(state));
        assert_eq!(codec.live_rank(&[corner]).unwrap(), None);
        assert_eq!(codec.num_live(), 3);

        let open = idx.index_of(Point::new(1, 2)).unwrap();
        assert!(codec.live_rank(&[open]).unwrap().is_some());
    }

    #[test]
    fn lookups_outside_the_table_fail() {
        let grid = open_grid(2, 2, 2);
        let (_, codec) = codec(&grid);
        assert!(matches!(
            codec.combination_of(BoxesState::new(0)),
            Err(SolverError::OutOfRange { .. })
        ));
        assert!(matches!(
            codec.combination_of(BoxesState::new(7)),
            Err(SolverError::OutOfRange { max: 6, .. })
        ));
        assert!(matches!(
            codec.rank(&ix(&[1])),
            Err(SolverError::OutOfRange { what: "box count", .. })
        ));
        assert!(matches!(
            codec.rank(&ix(&[1, 5])),
            Err(SolverError::OutOfRange { what: "space index", .. })
        ));
        assert!(!codec.is_live(BoxesState::new(0)));
        assert!(!codec.is_live(BoxesState::new(7)));
    }

    #[test]
    fn oversized_tables_are_rejected() {
        let grid = open_grid(6, 6, 4);
        let idx = PositionIndexer::new(&grid).unwrap();
        let limits = CodecLimits { max_entries: 1000 };
        assert_eq!(
            CombinationCodec::new(&grid, &idx, 4, limits).unwrap_err(),
            ConfigError::TooManyCombinations {
                num_spaces: 36,
                num_boxes: 4,
                limit: 1000
            }
        );
        assert_eq!(
            CombinationCodec::new(&grid, &idx, 0, CodecLimits::default()).unwrap_err(),
            ConfigError::NoBoxes
        );
    }

    #[test]
    fn ranks_beyond_u32_are_rejected() {
        // C(100, 7) is about 1.6e10
        let grid = open_grid(10, 10, 7);
        let idx = PositionIndexer::new(&grid).unwrap();
        let limits = CodecLimits {
            max_entries: u64::MAX,
        };
        assert_eq!(
            CombinationCodec::new(&grid, &idx, 7, limits).unwrap_err(),
            ConfigError::TooManyCombinations {
                num_spaces: 100,
                num_boxes: 7,
                limit: u64::MAX
            }
        );
    }

    #[test]
    fn binomial_matches_table() {
        let t = binomial_table(12, 5);
        for m in 0..=12u64 {
            for j in 0..=5u64 {
                assert_eq!(Some(t[m as usize * 6 + j as usize]), binomial(m, j));
            }
        }
    }

    proptest! {
        #[test]
        fn rank_is_a_dense_bijection(rows in 1usize..5, cols in 2usize..6, boxes in 1usize..4) {
            prop_assume!(boxes < rows * cols);
            let grid = open_grid(rows, cols, boxes);
            let (_, codec) = codec(&grid);
            let expected = binomial((rows * cols) as u64, boxes as u64).unwrap();
            prop_assert_eq!(codec.num_combinations() as u64, expected);

            let mut prev: Option<Vec<SpaceIndex>> = None;
            for r in 1..=codec.num_combinations() as u32 {
                let state = BoxesState::new(r);
                let combo = codec.combination_of(state).unwrap().to_vec();
                prop_assert_eq!(codec.rank(&combo).unwrap(), state);
                if let Some(p) = prev {
                    prop_assert!(p < combo);
                }
                prev = Some(combo);
            }
        }
    }
}
