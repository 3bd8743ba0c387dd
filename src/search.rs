//! Frontier-driven search over composite states.
//!
//! One engine, three exploration orders:
//!
//! * breadth-first appends children to the tail of a FIFO queue,
//! * depth-first pushes them on top of a stack,
//! * best-first keeps the frontier ordered by a [`Heuristic`] cost, ties
//!   going to the node inserted first.
//!
//! A state enters the frontier at most once per run. Each run owns its
//! frontier, membership set, visited set and node arena; the [`Solver`]
//! codecs are only read, so runs can be repeated or run side by side.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, VecDeque};
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering as AtomicOrdering};
use std::time::{Duration, Instant};

use log::{debug, info, trace};
use rayon::prelude::*;
use rustc_hash::FxHashSet;

use crate::config::SearchConfig;
use crate::error::{Result, SolverError};
use crate::heuristic::{AverageManhattan, Heuristic};
use crate::path;
use crate::solver::Solver;
use crate::state::CompositeState;

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Strategy {
    BreadthFirst,
    DepthFirst,
    BestFirst,
}

impl Strategy {
    pub const ALL: [Strategy; 3] = [
        Strategy::BreadthFirst,
        Strategy::DepthFirst,
        Strategy::BestFirst,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Strategy::BreadthFirst => "bfs",
            Strategy::DepthFirst => "dfs",
            Strategy::BestFirst => "best-first",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Handle of a node in a run's arena.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct NodeId(u32);

impl NodeId {
    fn from_index(index: usize) -> Result<Self> {
        u32::try_from(index)
            .map(NodeId)
            .map_err(|_| SolverError::OutOfRange {
                what: "node count",
                value: index as u64,
                max: u64::from(u32::MAX),
            })
    }
}

#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Node {
    pub state: CompositeState,
    pub parent: Option<NodeId>,
    pub depth: u32,
    /// Heuristic cost; zero outside best-first.
    pub cost: f64,
}

/// Every node created during one run. Nodes are never removed, so parent
/// links stay valid until the run ends.
#[derive(Clone, Debug, Default)]
pub struct NodeArena {
    nodes: Vec<Node>,
}

impl NodeArena {
    /// Fails once the arena holds more nodes than a `NodeId` can address.
    pub fn push(&mut self, node: Node) -> Result<NodeId> {
        let id = NodeId::from_index(self.nodes.len())?;
        self.nodes.push(node);
        Ok(id)
    }

    #[inline]
    pub fn get(&self, id: NodeId) -> &Node {
        &self.nodes[id.0 as usize]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// States from `id` back to the root, nearest first.
    pub fn lineage(&self, id: NodeId) -> impl Iterator<Item = CompositeState> + '_ {
        std::iter::successors(Some(id), move |&cur| self.get(cur).parent)
            .map(move |cur| self.get(cur).state)
    }
}

struct Ranked {
    cost: f64,
    seq: u64,
    node: NodeId,
}

impl Eq for Ranked {}
impl PartialEq for Ranked {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

// BinaryHeap is a max-heap: lowest cost, then earliest insertion, is greatest.
impl Ord for Ranked {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .cost
            .total_cmp(&self.cost)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for Ranked {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

enum Frontier {
    Fifo(VecDeque<NodeId>),
    Lifo(Vec<NodeId>),
    Ranked { heap: BinaryHeap<Ranked>, seq: u64 },
}

impl Frontier {
    fn new(strategy: Strategy) -> Self {
        match strategy {
            Strategy::BreadthFirst => Frontier::Fifo(VecDeque::new()),
            Strategy::DepthFirst => Frontier::Lifo(Vec::new()),
            Strategy::BestFirst => Frontier::Ranked {
                heap: BinaryHeap::new(),
                seq: 0,
            },
        }
    }

    fn insert(&mut self, node: NodeId, cost: f64) {
        match self {
            Frontier::Fifo(q) => q.push_back(node),
            Frontier::Lifo(s) => s.push(node),
            Frontier::Ranked { heap, seq } => {
                heap.push(Ranked {
                    cost,
                    seq: *seq,
                    node,
                });
                *seq += 1;
            }
        }
    }

    fn pop(&mut self) -> Option<NodeId> {
        match self {
            Frontier::Fifo(q) => q.pop_front(),
            Frontier::Lifo(s) => s.pop(),
            Frontier::Ranked { heap, .. } => heap.pop().map(|r| r.node),
        }
    }

    fn len(&self) -> usize {
        match self {
            Frontier::Fifo(q) => q.len(),
            Frontier::Lifo(s) => s.len(),
            Frontier::Ranked { heap, .. } => heap.len(),
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum AbortReason {
    /// The caller raised the abort flag.
    Cancelled,
    /// `SearchConfig::max_expansions` was reached.
    ExpansionLimit,
}

/// A found path: the move string and the states it passes through,
/// root first.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Solution {
    pub moves: String,
    pub states: Vec<CompositeState>,
}

impl Solution {
    /// Number of moves.
    pub fn len(&self) -> usize {
        self.states.len().saturating_sub(1)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn pushes(&self) -> usize {
        self.moves.chars().filter(char::is_ascii_uppercase).count()
    }
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub enum SearchOutcome {
    Solved(Solution),
    /// Every reachable state was expanded without reaching the goal.
    Exhausted,
    Aborted(AbortReason),
}

impl SearchOutcome {
    pub fn solution(&self) -> Option<&Solution> {
        match self {
            SearchOutcome::Solved(s) => Some(s),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct SearchStats {
    /// Nodes taken off the frontier and expanded.
    pub visited: usize,
    /// Nodes still on the frontier when the run stopped.
    pub pending: usize,
    /// Nodes created, root included.
    pub generated: usize,
    pub max_depth: u32,
    pub solution_len: Option<usize>,
}

#[derive(Clone, PartialEq, Debug)]
pub struct SearchReport {
    pub strategy: Strategy,
    pub outcome: SearchOutcome,
    pub stats: SearchStats,
    pub elapsed: Duration,
}

impl fmt::Display for SearchStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "visited: {:<10} pending: {:<10} generated: {:<10} depth: {:<5}",
            self.visited, self.pending, self.generated, self.max_depth
        )?;
        match self.solution_len {
            Some(n) => write!(f, " length: {n}"),
            None => write!(f, " length: -"),
        }
    }
}

/// Mutable state of one search run.
struct SearchRun<'a, H: ?Sized> {
    solver: &'a Solver,
    strategy: Strategy,
    heuristic: &'a H,
    arena: NodeArena,
    frontier: Frontier,
    queued: FxHashSet<CompositeState>,
    visited: FxHashSet<CompositeState>,
    stats: SearchStats,
}

impl<'a, H: Heuristic + ?Sized> SearchRun<'a, H> {
    fn new(solver: &'a Solver, strategy: Strategy, heuristic: &'a H) -> Self {
        SearchRun {
            solver,
            strategy,
            heuristic,
            arena: NodeArena::default(),
            frontier: Frontier::new(strategy),
            queued: FxHashSet::default(),
            visited: FxHashSet::default(),
            stats: SearchStats::default(),
        }
    }

    fn enqueue(&mut self, state: CompositeState, parent: Option<NodeId>, depth: u32) -> Result<()> {
        let cost = match self.strategy {
            Strategy::BestFirst => {
                let boxes = self.solver.box_points(state.boxes())?;
                self.heuristic.cost(&boxes, depth)
            }
            _ => 0.0,
        };
        let id = self.arena.push(Node {
            state,
            parent,
            depth,
            cost,
        })?;
        self.frontier.insert(id, cost);
        self.queued.insert(state);
        self.stats.generated += 1;

        if depth > self.stats.max_depth {
            self.stats.max_depth = depth;
            debug!(
                "{}: reached depth {depth}, {} visited",
                self.strategy, self.stats.visited
            );
        }
        Ok(())
    }

    fn run(&mut self, config: &SearchConfig, abort: Option<&AtomicBool>) -> Result<SearchOutcome> {
        self.enqueue(self.solver.root(), None, 0)?;

        loop {
            if abort.is_some_and(|flag| flag.load(AtomicOrdering::Relaxed)) {
                return Ok(SearchOutcome::Aborted(AbortReason::Cancelled));
            }
            if config
                .max_expansions
                .is_some_and(|max| self.stats.visited >= max)
            {
                return Ok(SearchOutcome::Aborted(AbortReason::ExpansionLimit));
            }

            let Some(id) = self.frontier.pop() else {
                return Ok(SearchOutcome::Exhausted);
            };
            let node = *self.arena.get(id);
            self.visited.insert(node.state);
            self.stats.visited += 1;
            trace!(
                "{}: expand {} depth {} cost {:.3}",
                self.strategy,
                node.state,
                node.depth,
                node.cost
            );

            if self.solver.is_goal(node.state) {
                let solution = path::reconstruct(self.solver, &self.arena, id)?;
                return Ok(SearchOutcome::Solved(solution));
            }

            for t in self.solver.successors(node.state)? {
                if self.visited.contains(&t.state) || self.queued.contains(&t.state) {
                    continue;
                }
                self.enqueue(t.state, Some(id), node.depth + 1)?;
            }
        }
    }
}

impl Solver {
    /// Runs `strategy` with default settings and the default cost function.
    pub fn search(&self, strategy: Strategy) -> Result<SearchReport> {
        self.search_with(strategy, &SearchConfig::default(), None)
    }

    pub fn search_with(
        &self,
        strategy: Strategy,
        config: &SearchConfig,
        abort: Option<&AtomicBool>,
    ) -> Result<SearchReport> {
        let heuristic = AverageManhattan::for_solver(self, config.depth_weight);
        self.search_with_heuristic(strategy, config, &heuristic, abort)
    }

    /// Runs `strategy` with a caller-supplied cost function. The heuristic
    /// only matters for [`Strategy::BestFirst`].
    pub fn search_with_heuristic<H: Heuristic + ?Sized>(
        &self,
        strategy: Strategy,
        config: &SearchConfig,
        heuristic: &H,
        abort: Option<&AtomicBool>,
    ) -> Result<SearchReport> {
        let started = Instant::now();
        info!(
            "{strategy}: searching from {}, goal boxes-state {}",
            self.root(),
            self.goal_state()
        );

        if !self.codec().is_live(self.root().boxes()) {
            info!("{strategy}: a box starts in a corner, nothing to search");
            return Ok(SearchReport {
                strategy,
                outcome: SearchOutcome::Exhausted,
                stats: SearchStats::default(),
                elapsed: started.elapsed(),
            });
        }

        let mut run = SearchRun::new(self, strategy, heuristic);
        let outcome = run.run(config, abort)?;

        let mut stats = run.stats;
        stats.pending = run.frontier.len();
        stats.solution_len = outcome.solution().map(Solution::len);
        let elapsed = started.elapsed();

        match &outcome {
            SearchOutcome::Solved(s) => info!(
                "{strategy}: solved in {} moves ({} pushes), {} visited, {} pending, {:?}",
                s.len(),
                s.pushes(),
                stats.visited,
                stats.pending,
                elapsed
            ),
            SearchOutcome::Exhausted => info!(
                "{strategy}: no solution, {} states visited, {:?}",
                stats.visited, elapsed
            ),
            SearchOutcome::Aborted(reason) => info!(
                "{strategy}: aborted ({reason:?}) after {} visited",
                stats.visited
            ),
        }

        Ok(SearchReport {
            strategy,
            outcome,
            stats,
            elapsed,
        })
    }

    /// Runs each strategy on its own fresh state, in parallel. Reports come
    /// back in the order of `strategies`.
    pub fn compare(
        &self,
        strategies: &[Strategy],
        config: &SearchConfig,
        abort: Option<&AtomicBool>,
    ) -> Result<Vec<SearchReport>> {
        strategies
            .par_iter()
            .map(|&strategy| self.search_with(strategy, config, abort))
            .collect()
    }
}
