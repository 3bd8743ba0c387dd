//! Per-grid facade holding the immutable codecs shared by every search run.

use log::debug;
use smallvec::SmallVec;

use crate::combination::{BoxSet, BoxesState, CombinationCodec};
use crate::config::CodecLimits;
use crate::error::{ConfigError, Result, SolverError};
use crate::grid::{Grid, Point};
use crate::index::PositionIndexer;
use crate::state::CompositeState;

/// Built once per grid; read-only afterwards, so it can be shared across
/// sequential or parallel searches.
#[derive(Clone, Debug)]
pub struct Solver {
    indexer: PositionIndexer,
    codec: CombinationCodec,
    goals: Vec<Point>,
    goal_state: BoxesState,
    root: CompositeState,
}

impl Solver {
    pub fn new(grid: &Grid) -> Result<Self> {
        Self::with_limits(grid, CodecLimits::default())
    }

    pub fn with_limits(grid: &Grid, limits: CodecLimits) -> Result<Self> {
        if grid.num_boxes() == 0 {
            return Err(ConfigError::NoBoxes.into());
        }
        let indexer = PositionIndexer::new(grid)?;
        let codec = CombinationCodec::new(grid, &indexer, grid.num_boxes(), limits)?;

        let boxes = sorted_indices(&indexer, grid.boxes())?;
        let goals: Vec<Point> = grid.goals().collect();
        let goal_indices = sorted_indices(&indexer, goals.iter().copied())?;
        let agent = indexer
            .index_of(grid.agent())
            .ok_or(SolverError::OutOfRange {
                what: "agent position",
                value: 0,
                max: indexer.num_spaces() as u64,
            })?;

        let root = CompositeState::encode(codec.rank(&boxes)?, agent);
        let goal_state = codec.rank(&goal_indices)?;
        debug!(
            "solver: {} spaces, {} boxes, root {root}, goal boxes-state {goal_state}",
            indexer.num_spaces(),
            codec.num_boxes()
        );

        Ok(Solver {
            indexer,
            codec,
            goals,
            goal_state,
            root,
        })
    }

    #[inline]
    pub fn indexer(&self) -> &PositionIndexer {
        &self.indexer
    }

    #[inline]
    pub fn codec(&self) -> &CombinationCodec {
        &self.codec
    }

    #[inline]
    pub fn num_spaces(&self) -> usize {
        self.indexer.num_spaces()
    }

    #[inline]
    pub fn goals(&self) -> &[Point] {
        &self.goals
    }

    /// Rank of the exact goal cell set.
    #[inline]
    pub fn goal_state(&self) -> BoxesState {
        self.goal_state
    }

    /// Initial boxes and agent.
    #[inline]
    pub fn root(&self) -> CompositeState {
        self.root
    }

    #[inline]
    pub fn is_goal(&self, state: CompositeState) -> bool {
        state.boxes() == self.goal_state
    }

    pub fn box_points(&self, state: BoxesState) -> Result<SmallVec<[Point; 8]>> {
        self.codec
            .combination_of(state)?
            .iter()
            .map(|&s| self.indexer.pos_of(s))
            .collect()
    }

    pub fn agent_point(&self, state: CompositeState) -> Result<Point> {
        self.indexer.pos_of(state.agent())
    }
}

fn sorted_indices(
    indexer: &PositionIndexer,
    points: impl Iterator<Item = Point>,
) -> Result<BoxSet> {
    let mut set = points
        .map(|p| {
            indexer.index_of(p).ok_or(SolverError::OutOfRange {
                what: "cell",
                value: 0,
                max: indexer.num_spaces() as u64,
            })
        })
        .collect::<Result<BoxSet>>()?;
    set.sort_unstable();
    Ok(set)
}
