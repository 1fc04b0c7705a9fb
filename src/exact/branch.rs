//! Depth-first branch-and-bound over LP relaxations.
//!
//! # Algorithm
//!
//! 1. Pop a node (a set of column bounds) and solve its relaxation.
//! 2. Prune when infeasible, or when `⌈bound⌉` cannot beat the incumbent
//!    (objective values of integral points are integers).
//! 3. If every integer column is integral, the point becomes the incumbent.
//! 4. Otherwise branch on one fractional column: the lowest priority class,
//!    then the value closest to 0.5, then the lowest index. The down child
//!    (`≤ ⌊v⌋`) is pushed first so the up child (`≥ ⌈v⌉`) is explored first.
//!
//! A feasible integral starting point, when supplied, is the first
//! incumbent, so a search cut short by its budget still has an allocation.
//! The node limit counts relaxations solved; the deadline is checked before
//! each node.
//!
//! # Reference
//! Land & Doig (1960), "An Automatic Method of Solving Discrete Programming Problems"

use log::debug;
use std::time::Instant;

use super::{MilpModel, Relaxation, RelaxationSolver};
use crate::error::WaveError;

/// Integrality tolerance.
const INTEGRALITY_EPS: f64 = 1e-6;

/// Outcome of a branch-and-bound search.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchResult {
    /// Best integral point found and its objective.
    pub incumbent: Option<(Vec<f64>, f64)>,
    /// Relaxations solved.
    pub nodes: u64,
    /// Node at which the first incumbent was found (0 for an accepted
    /// starting point).
    pub first_incumbent_node: Option<u64>,
    /// Whether the tree was fully explored (the incumbent, if any, is optimal).
    pub complete: bool,
    /// Proven lower bound on the optimum, when the root relaxation was solved.
    pub lower_bound: Option<f64>,
}

struct Node {
    bounds: Vec<(f64, f64)>,
    /// Objective of the parent relaxation, a lower bound for this subtree.
    parent_bound: f64,
}

/// Branch-and-bound driver for a [`MilpModel`].
#[derive(Debug)]
pub struct BranchAndBound<'a, R: RelaxationSolver> {
    model: &'a MilpModel,
    relaxation: &'a R,
    node_limit: Option<u64>,
    deadline: Option<Instant>,
    start: Option<Vec<f64>>,
}

impl<'a, R: RelaxationSolver> BranchAndBound<'a, R> {
    /// Creates an unbounded search.
    pub fn new(model: &'a MilpModel, relaxation: &'a R) -> Self {
        Self {
            model,
            relaxation,
            node_limit: None,
            deadline: None,
            start: None,
        }
    }

    /// Seeds the search with an integral point. Points that violate a row,
    /// a bound or integrality are ignored.
    pub fn with_start(mut self, point: Option<Vec<f64>>) -> Self {
        self.start = point;
        self
    }

    /// Caps the number of relaxations solved.
    pub fn with_node_limit(mut self, limit: Option<u64>) -> Self {
        self.node_limit = limit;
        self
    }

    /// Stops the search at a deadline.
    pub fn with_deadline(mut self, deadline: Option<Instant>) -> Self {
        self.deadline = deadline;
        self
    }

    /// Runs the search.
    ///
    /// # Errors
    /// Propagates relaxation backend failures.
    pub fn run(&self) -> Result<SearchResult, WaveError> {
        let mut result = SearchResult {
            incumbent: None,
            nodes: 0,
            first_incumbent_node: None,
            complete: false,
            lower_bound: None,
        };
        if let Some(point) = &self.start {
            if self.is_integral(point) && self.model.is_feasible(point, INTEGRALITY_EPS) {
                let objective = self.model.objective_value(point).round();
                debug!("starting incumbent {}", objective);
                result.incumbent = Some((point.clone(), objective));
                result.first_incumbent_node = Some(0);
            } else {
                debug!("starting point rejected");
            }
        }

        let mut stack = vec![Node {
            bounds: self.model.bounds(),
            parent_bound: f64::NEG_INFINITY,
        }];

        while let Some(node) = stack.pop() {
            if let Some((_, best)) = &result.incumbent {
                if (node.parent_bound - INTEGRALITY_EPS).ceil() >= *best {
                    continue;
                }
            }
            if self.out_of_budget(result.nodes) {
                stack.push(node);
                break;
            }
            result.nodes += 1;

            let (values, bound) = match self.relaxation.solve(self.model, &node.bounds)? {
                Relaxation::Infeasible => continue,
                Relaxation::Solved { values, objective } => (values, objective),
            };
            if result.nodes == 1 {
                result.lower_bound = Some(bound);
            }

            if let Some((_, best)) = &result.incumbent {
                if (bound - INTEGRALITY_EPS).ceil() >= *best {
                    continue;
                }
            }

            match self.branching_column(&values, &node.bounds) {
                None => {
                    let point = self.round_integers(values);
                    let objective = self.model.objective_value(&point).round();
                    debug!("node {}: incumbent {}", result.nodes, objective);
                    result.first_incumbent_node.get_or_insert(result.nodes);
                    result.incumbent = Some((point, objective));
                }
                Some(col) => {
                    let v = values[col];
                    let (lower, upper) = node.bounds[col];
                    let mut down = node.bounds.clone();
                    down[col] = (lower, v.floor());
                    let mut up = node.bounds;
                    up[col] = (v.ceil(), upper);
                    stack.push(Node {
                        bounds: down,
                        parent_bound: bound,
                    });
                    stack.push(Node {
                        bounds: up,
                        parent_bound: bound,
                    });
                }
            }
        }

        result.complete = stack.is_empty();
        let best = result.incumbent.as_ref().map(|(_, obj)| *obj);
        result.lower_bound = if result.complete {
            best.or(result.lower_bound)
        } else {
            let open = stack
                .iter()
                .map(|n| n.parent_bound)
                .fold(f64::INFINITY, f64::min);
            let open = if open.is_finite() {
                Some((open - INTEGRALITY_EPS).ceil())
            } else {
                result.lower_bound.map(|b| (b - INTEGRALITY_EPS).ceil())
            };
            match (open, best) {
                (Some(o), Some(b)) => Some(o.min(b)),
                (o, _) => o,
            }
        };

        debug!(
            "branch-and-bound: {} nodes, complete: {}, incumbent: {:?}",
            result.nodes, result.complete, best
        );
        Ok(result)
    }

    fn out_of_budget(&self, nodes: u64) -> bool {
        self.node_limit.is_some_and(|limit| nodes >= limit)
            || self.deadline.is_some_and(|d| Instant::now() >= d)
    }

    /// Fractional integer column to branch on, if any.
    fn branching_column(&self, values: &[f64], bounds: &[(f64, f64)]) -> Option<usize> {
        let mut best: Option<(u8, f64, usize)> = None;
        for (idx, column) in self.model.columns().iter().enumerate() {
            if !column.integer || bounds[idx].0 == bounds[idx].1 {
                continue;
            }
            let v = values[idx];
            let frac = v - v.floor();
            if frac <= INTEGRALITY_EPS || frac >= 1.0 - INTEGRALITY_EPS {
                continue;
            }
            let distance = (frac - 0.5).abs();
            let better = match best {
                None => true,
                Some((p, d, _)) => column.priority < p || (column.priority == p && distance < d),
            };
            if better {
                best = Some((column.priority, distance, idx));
            }
        }
        best.map(|(_, _, idx)| idx)
    }

    fn is_integral(&self, values: &[f64]) -> bool {
        values.len() == self.model.column_count()
            && values
                .iter()
                .zip(self.model.columns())
                .all(|(v, column)| !column.integer || (v - v.round()).abs() <= INTEGRALITY_EPS)
    }

    fn round_integers(&self, mut values: Vec<f64>) -> Vec<f64> {
        for (v, column) in values.iter_mut().zip(self.model.columns()) {
            if column.integer {
                *v = v.round();
            }
        }
        values
    }
}
