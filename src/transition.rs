//! Move and push rules. The only place that decides whether a step is legal.

use arrayvec::ArrayVec;
use log::trace;

use crate::combination::BoxSet;
use crate::error::Result;
use crate::grid::Direction;
use crate::solver::Solver;
use crate::state::CompositeState;

/// One legal step out of a state.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct Transition {
    pub direction: Direction,
    pub state: CompositeState,
    /// A box moved along with the agent.
    pub push: bool,
}

impl Solver {
    /// Successor of `state` when the agent steps in `dir`, or `None` when the
    /// step is blocked by a wall, by a box that cannot move, or because the
    /// push would leave a box in a corner.
    pub fn successor(&self, state: CompositeState, dir: Direction) -> Result<Option<Transition>> {
        let (boxes_state, agent) = state.decode();
        let boxes = self.codec().combination_of(boxes_state)?;
        let target = self.indexer().pos_of(agent)?.step(dir);

        let Some(target_ix) = self.indexer().index_of(target) else {
            return Ok(None);
        };

        let Ok(slot) = boxes.binary_search(&target_ix) else {
            return Ok(Some(Transition {
                direction: dir,
                state: CompositeState::encode(boxes_state, target_ix),
                push: false,
            }));
        };

        let Some(beyond_ix) = self.indexer().index_of(target.step(dir)) else {
            return Ok(None);
        };
        if boxes.binary_search(&beyond_ix).is_ok() {
            return Ok(None);
        }

        let mut moved = BoxSet::from_slice(boxes);
        moved[slot] = beyond_ix;
        moved.sort_unstable();

        match self.codec().live_rank(&moved)? {
            Some(next_boxes) => Ok(Some(Transition {
                direction: dir,
                state: CompositeState::encode(next_boxes, target_ix),
                push: true,
            })),
            None => {
                trace!("push {dir:?} from {state} blocked: box would land in a corner");
                Ok(None)
            }
        }
    }

    /// All legal steps out of `state`, in `Direction::ALL` order.
    pub fn successors(&self, state: CompositeState) -> Result<ArrayVec<Transition, 4>> {
        let mut out = ArrayVec::new();
        for dir in Direction::ALL {
            if let Some(t) = self.successor(state, dir)? {
                out.push(t);
            }
        }
        Ok(out)
    }
}
