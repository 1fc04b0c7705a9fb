//! Solver selection and the shared solver contract.
//!
//! Every solver maps a [`ProblemInstance`] to a [`SolveOutcome`]; solvers
//! never call each other and are freely interchangeable.
//!
//! | Kind | Name | Solver |
//! |------|------|--------|
//! | `ExactPerCarton` | `exact-a` | MILP, per-carton linking |
//! | `ExactAggregated` | `exact-b` | MILP, aggregated linking |
//! | `GreedyInputOrder` | `greedy-1` | input order |
//! | `GreedyPopularity` | `greedy-2` | SKU popularity order |
//! | `GreedyInputOrderRepair` | `greedy-3` | input order + repair |
//! | `GreedyPopularityRepair` | `greedy-4` | SKU popularity order + repair |
//!
//! # Usage
//!
//! ```
//! use u_waves::models::{Carton, ProblemInstance};
//! use u_waves::solver::{solve, Budget, SolverKind};
//!
//! let instance = ProblemInstance::new(
//!     vec![
//!         Carton::new("C1").with_sku("A"),
//!         Carton::new("C2").with_sku("A"),
//!     ],
//!     2,
//! )
//! .unwrap();
//!
//! let kind: SolverKind = "greedy-4".parse().unwrap();
//! let outcome = solve(kind, &instance, &Budget::default()).unwrap();
//! assert_eq!(outcome.stats.score, 0);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt::{self, Debug};
use std::str::FromStr;
use thiserror::Error;

use crate::error::WaveError;
use crate::exact::{ExactConfig, ExactSolver, LinkingMode};
use crate::greedy::{GreedyConfig, GreedySolver, GreedyVariant};
use crate::models::{Allocation, ProblemInstance};

/// A wave allocation strategy.
pub trait WaveSolver: Send + Sync + Debug {
    /// Stable solver name (e.g., "exact-a", "greedy-4").
    fn name(&self) -> &'static str;

    /// Allocates every carton of the instance to a wave.
    fn solve(&self, instance: &ProblemInstance) -> Result<SolveOutcome, WaveError>;
}

/// How much a returned allocation is worth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SolutionStatus {
    /// Proven optimal by the exact search.
    Optimal,
    /// Feasible, found by the exact search before its budget ran out.
    Feasible,
    /// Produced by a heuristic; no optimality claim.
    Heuristic,
}

impl SolutionStatus {
    /// Whether optimality is certified.
    pub fn is_optimal(self) -> bool {
        self == SolutionStatus::Optimal
    }
}

/// Run statistics.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolveStats {
    /// Fragmentation score of the returned allocation.
    pub score: u64,
    /// Score after placement, before repair (greedy only).
    pub construction_score: Option<u64>,
    /// Best proven lower bound on the optimal score (exact only).
    pub lower_bound: Option<u64>,
    /// Applied repair moves (greedy).
    pub iterations: u64,
    /// Applied single-carton moves (greedy).
    pub moves: u64,
    /// Applied swaps (greedy).
    pub swaps: u64,
    /// LP relaxations solved (exact).
    pub nodes: u64,
    /// Whether a time or iteration budget stopped the run early.
    pub budget_hit: bool,
    /// Wall-clock time (ms).
    pub elapsed_ms: u64,
}

/// Result of a solver invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolveOutcome {
    /// Carton-to-wave allocation.
    pub allocation: Allocation,
    /// Optimality status.
    pub status: SolutionStatus,
    /// Run statistics.
    pub stats: SolveStats,
}

/// Resource budget for one solver invocation.
///
/// For exact solvers the iteration limit caps the number of LP relaxations;
/// for greedy solvers it caps the applied repair moves.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Budget {
    /// Wall-clock limit (ms).
    pub time_limit_ms: Option<u64>,
    /// Iteration cap.
    pub iteration_limit: Option<u64>,
}

impl Budget {
    /// No limits.
    pub fn unlimited() -> Self {
        Self::default()
    }

    /// Sets the time limit.
    pub fn with_time_limit_ms(mut self, ms: u64) -> Self {
        self.time_limit_ms = Some(ms);
        self
    }

    /// Sets the iteration cap.
    pub fn with_iteration_limit(mut self, limit: u64) -> Self {
        self.iteration_limit = Some(limit);
        self
    }
}

/// Selectable solvers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SolverKind {
    /// Exact, variant A.
    ExactPerCarton,
    /// Exact, variant B.
    ExactAggregated,
    /// Greedy, variant 1.
    GreedyInputOrder,
    /// Greedy, variant 2.
    GreedyPopularity,
    /// Greedy, variant 3.
    GreedyInputOrderRepair,
    /// Greedy, variant 4.
    GreedyPopularityRepair,
}

impl SolverKind {
    /// Every solver kind.
    pub const ALL: [SolverKind; 6] = [
        SolverKind::ExactPerCarton,
        SolverKind::ExactAggregated,
        SolverKind::GreedyInputOrder,
        SolverKind::GreedyPopularity,
        SolverKind::GreedyInputOrderRepair,
        SolverKind::GreedyPopularityRepair,
    ];

    /// Stable name.
    pub fn name(self) -> &'static str {
        match self {
            SolverKind::ExactPerCarton => "exact-a",
            SolverKind::ExactAggregated => "exact-b",
            SolverKind::GreedyInputOrder => "greedy-1",
            SolverKind::GreedyPopularity => "greedy-2",
            SolverKind::GreedyInputOrderRepair => "greedy-3",
            SolverKind::GreedyPopularityRepair => "greedy-4",
        }
    }

    /// Whether the kind certifies optimality when run to completion.
    pub fn is_exact(self) -> bool {
        matches!(self, SolverKind::ExactPerCarton | SolverKind::ExactAggregated)
    }

    /// Builds the solver for this kind under a budget.
    pub fn build(self, budget: &Budget) -> Box<dyn WaveSolver> {
        match self.greedy_variant() {
            Some(variant) => {
                let mut config = GreedyConfig::default();
                if let Some(limit) = budget.iteration_limit {
                    config.repair_iteration_limit = limit;
                }
                config.time_limit_ms = budget.time_limit_ms;
                Box::new(GreedySolver::new(variant).with_config(config))
            }
            None => {
                let linking = if self == SolverKind::ExactPerCarton {
                    LinkingMode::PerCarton
                } else {
                    LinkingMode::Aggregated
                };
                let config = ExactConfig {
                    time_limit_ms: budget.time_limit_ms,
                    node_limit: budget.iteration_limit,
                    ..ExactConfig::default()
                };
                Box::new(ExactSolver::new(linking).with_config(config))
            }
        }
    }

    fn greedy_variant(self) -> Option<GreedyVariant> {
        match self {
            SolverKind::GreedyInputOrder => Some(GreedyVariant::InputOrder),
            SolverKind::GreedyPopularity => Some(GreedyVariant::Popularity),
            SolverKind::GreedyInputOrderRepair => Some(GreedyVariant::InputOrderRepair),
            SolverKind::GreedyPopularityRepair => Some(GreedyVariant::PopularityRepair),
            SolverKind::ExactPerCarton | SolverKind::ExactAggregated => None,
        }
    }
}

impl fmt::Display for SolverKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when parsing an unknown solver name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown solver '{0}' (expected one of exact-a, exact-b, greedy-1..greedy-4)")]
pub struct UnknownSolverKind(pub String);

impl FromStr for SolverKind {
    type Err = UnknownSolverKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        SolverKind::ALL
            .into_iter()
            .find(|kind| kind.name() == wanted)
            .ok_or_else(|| UnknownSolverKind(s.to_string()))
    }
}

/// Runs the selected solver on an instance.
///
/// # Errors
/// Whatever the selected solver reports; see [`WaveError`].
pub fn solve(
    kind: SolverKind,
    instance: &ProblemInstance,
    budget: &Budget,
) -> Result<SolveOutcome, WaveError> {
    kind.build(budget).solve(instance)
}
