//! Turning a solved node back into a move string, and replaying one.

use crate::error::{Result, SolverError};
use crate::grid::Direction;
use crate::search::{NodeArena, NodeId, Solution};
use crate::solver::Solver;
use crate::state::CompositeState;

/// Walks parent links from `goal` to the root and renders each step: the
/// direction the agent moved, upper case when the boxes-state changed.
pub fn reconstruct(solver: &Solver, arena: &NodeArena, goal: NodeId) -> Result<Solution> {
    let mut states: Vec<CompositeState> = arena.lineage(goal).collect();
    states.reverse();

    let mut moves = String::with_capacity(states.len().saturating_sub(1));
    for pair in states.windows(2) {
        let (from, to) = (pair[0], pair[1]);
        let a = solver.agent_point(from)?;
        let b = solver.agent_point(to)?;
        let dir = Direction::from_delta(b.row - a.row, b.col - a.col).ok_or(
            SolverError::OutOfRange {
                what: "agent displacement",
                value: u64::from(a.manhattan(b)),
                max: 1,
            },
        )?;
        moves.push(dir.symbol(from.boxes() != to.boxes()));
    }

    Ok(Solution { moves, states })
}

/// Plays `moves` from the root through the transition rules and returns the
/// states passed through, root first. Fails on the first symbol that is not a
/// direction, is blocked, or whose case disagrees with whether it pushes.
pub fn replay(solver: &Solver, moves: &str) -> Result<Vec<CompositeState>> {
    let mut state = solver.root();
    let mut states = Vec::with_capacity(moves.len() + 1);
    states.push(state);

    for (step, symbol) in moves.chars().enumerate() {
        let illegal = SolverError::IllegalMove { step, symbol };
        let (dir, push) = Direction::from_symbol(symbol).ok_or(illegal.clone())?;
        let t = solver.successor(state, dir)?.ok_or(illegal.clone())?;
        if t.push != push {
            return Err(illegal);
        }
        state = t.state;
        states.push(state);
    }
    Ok(states)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::{Grid, MapFormat};
    use crate::search::Node;

    fn solver() -> Solver {
        //  XXXXXXX
        //  X.....X
        //  X.MJ.GX
        //  X.....X
        //  XXXXXXX
        let grid = Grid::parse(
            "XXXXXXX\nX.....X\nX.MJ.GX\nX.....X\nXXXXXXX",
            MapFormat::Legacy,
        )
        .unwrap();
        Solver::new(&grid).unwrap()
    }

    #[test]
    fn replay_reaches_the_goal() {
        let s = solver();
        let states = replay(&s, "RR").unwrap();
        assert_eq!(states.len(), 3);
        assert_eq!(states[0], s.root());
        assert!(s.is_goal(states[2]));
    }

    #[test]
    fn replay_rejects_bad_steps() {
        let s = solver();
        // pushes written lower case
        assert_eq!(
            replay(&s, "rR"),
            Err(SolverError::IllegalMove {
                step: 0,
                symbol: 'r'
            })
        );
        // a plain move written upper case
        assert_eq!(
            replay(&s, "U"),
            Err(SolverError::IllegalMove {
                step: 0,
                symbol: 'U'
            })
        );
        assert_eq!(
            replay(&s, "uuu"),
            Err(SolverError::IllegalMove {
                step: 1,
                symbol: 'u'
            })
        );
        // after u the agent walks the row above the box, nothing to push
        assert_eq!(
            replay(&s, "uR"),
            Err(SolverError::IllegalMove {
                step: 1,
                symbol: 'R'
            })
        );
        assert_eq!(
            replay(&s, "x"),
            Err(SolverError::IllegalMove {
                step: 0,
                symbol: 'x'
            })
        );
    }

    #[test]
    fn reconstruct_renders_moves_and_pushes() {
        let s = solver();
        let states = replay(&s, "Ruld").unwrap();
        let mut arena = NodeArena::default();
        let mut parent = None;
        for (depth, &state) in states.iter().enumerate() {
            parent = Some(arena.push(Node {
                state,
                parent,
                depth: depth as u32,
                cost: 0.0,
            })
            .unwrap());
        }
        let solution = reconstruct(&s, &arena, parent.unwrap()).unwrap();
        assert_eq!(solution.moves, "Ruld");
        assert_eq!(solution.states, states);
        assert_eq!(solution.len(), 4);
        assert_eq!(solution.pushes(), 1);
    }
}
