//! Sokoban search core.
//!
//! Box placements are ranked into a dense integer range, corner deadlocks
//! are folded into that ranking, and a single frontier-driven engine runs
//! breadth-first, depth-first or best-first search over the resulting
//! composite states.
//!
//! ```
//! use sokoban_search::{Grid, MapFormat, SearchOutcome, Solver, Strategy};
//!
//! let grid = Grid::parse("MJG.\n....\n....\n....", MapFormat::Legacy)?;
//! let solver = Solver::new(&grid)?;
//! let report = solver.search(Strategy::BreadthFirst)?;
//! match report.outcome {
//!     SearchOutcome::Solved(solution) => assert_eq!(solution.moves, "R"),
//!     other => panic!("unexpected {other:?}"),
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod combination;
pub mod config;
pub mod error;
pub mod grid;
pub mod heuristic;
pub mod index;
pub mod path;
pub mod search;
pub mod solver;
pub mod state;
pub mod transition;

pub use combination::{BoxSet, BoxesState, CombinationCodec};
pub use config::{CodecLimits, SearchConfig};
pub use error::{ConfigError, MapError, SolverError};
pub use grid::{CellKind, Direction, Grid, MapFormat, Point};
pub use heuristic::{AverageManhattan, Heuristic};
pub use index::{PositionIndexer, SpaceIndex};
pub use path::{reconstruct, replay};
pub use search::{
    AbortReason, Node, NodeArena, NodeId, SearchOutcome, SearchReport, SearchStats, Solution,
    Strategy,
};
pub use solver::Solver;
pub use state::CompositeState;
pub use transition::Transition;
