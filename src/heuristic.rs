//! Cost functions ordering the best-first frontier.

use crate::grid::Point;
use crate::solver::Solver;

/// Lower is expanded first. Need not be admissible.
pub trait Heuristic: Sync {
    fn cost(&self, boxes: &[Point], depth: u32) -> f64;
}

impl<F> Heuristic for F
where
    F: Fn(&[Point], u32) -> f64 + Sync,
{
    fn cost(&self, boxes: &[Point], depth: u32) -> f64 {
        self(boxes, depth)
    }
}

/// Mean Manhattan distance from each box to its nearest goal, plus
/// `depth_weight * depth / num_spaces`.
///
/// Goals are not assigned to boxes, so two boxes may count the same goal.
/// The depth weight was tuned by hand; it is a knob, not a bound.
#[derive(Clone, Debug)]
pub struct AverageManhattan {
    goals: Vec<Point>,
    num_spaces: usize,
    depth_weight: f64,
}

impl AverageManhattan {
    pub fn new(goals: Vec<Point>, num_spaces: usize, depth_weight: f64) -> Self {
        AverageManhattan {
            goals,
            num_spaces,
            depth_weight,
        }
    }

    pub fn for_solver(solver: &Solver, depth_weight: f64) -> Self {
        Self::new(solver.goals().to_vec(), solver.num_spaces(), depth_weight)
    }
}

impl Heuristic for AverageManhattan {
    fn cost(&self, boxes: &[Point], depth: u32) -> f64 {
        if boxes.is_empty() {
            return 0.0;
        }
        let total: u32 = boxes
            .iter()
            .map(|&b| self.goals.iter().map(|&g| b.manhattan(g)).min().unwrap_or(0))
            .sum();
        let distance = f64::from(total) / boxes.len() as f64;
        distance + self.depth_weight * f64::from(depth) / self.num_spaces.max(1) as f64
    }
}
