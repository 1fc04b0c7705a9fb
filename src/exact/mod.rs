//! Exact wave allocation by mixed-integer programming.
//!
//! Builds one of two formulations of the problem into a [`MilpModel`] and
//! solves it by branch-and-bound over LP relaxations.
//!
//! # Formulations
//!
//! | Variant | Linking | Rows |
//! |---------|---------|------|
//! | A | `x[b,w] ≤ y[s,w]` per carton | n + K + Σ_b \|skus(b)\|·K |
//! | B | `Σ_{b∋s} x[b,w] ≤ n_s·y[s,w]` per SKU | n + K + \|S\|·K |
//!
//! Both have the same integer optimum; they differ only in relaxation
//! strength and model size.
//!
//! # Budget
//!
//! Before branching, a first-fit-decreasing packing seeds the search with
//! an incumbent. A node limit and a time limit bound the search. When a
//! budget stops the search with a feasible allocation in hand, it is
//! returned as `SolutionStatus::Feasible`, never as optimal. Only when the
//! starting packing failed and the budget ran out before any feasible
//! allocation was found does the solver fail with
//! `WaveError::BudgetExhausted`.
//!
//! # Reference
//! Wolsey (2020), "Integer Programming", Ch. 7: Branch and Bound

mod branch;
mod formulation;
mod model;
mod relaxation;
mod start;

pub use branch::{BranchAndBound, SearchResult};
pub use formulation::{LinkingMode, WaveFormulation};
pub use model::{Column, MilpModel, Row, RowSense};
pub use relaxation::{MinilpRelaxation, Relaxation, RelaxationSolver};

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

use start::packing_start;

use crate::error::WaveError;
use crate::evaluation::fragmentation_of;
use crate::models::{Allocation, ProblemInstance};
use crate::solver::{SolutionStatus, SolveOutcome, SolveStats, WaveSolver};

/// Exact solver configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExactConfig {
    /// Wall-clock limit (ms).
    pub time_limit_ms: Option<u64>,
    /// Maximum LP relaxations solved.
    pub node_limit: Option<u64>,
    /// Fix `x[b,w] = 0` for `w > b`.
    pub use_symmetry_breaking: bool,
}

impl Default for ExactConfig {
    fn default() -> Self {
        Self {
            time_limit_ms: None,
            node_limit: None,
            use_symmetry_breaking: true,
        }
    }
}

impl ExactConfig {
    /// Sets the time limit.
    pub fn with_time_limit_ms(mut self, ms: u64) -> Self {
        self.time_limit_ms = Some(ms);
        self
    }

    /// Sets the node limit.
    pub fn with_node_limit(mut self, limit: u64) -> Self {
        self.node_limit = Some(limit);
        self
    }

    /// Enables or disables symmetry breaking.
    pub fn with_symmetry_breaking(mut self, enabled: bool) -> Self {
        self.use_symmetry_breaking = enabled;
        self
    }
}

/// MILP wave allocator.
#[derive(Debug, Clone)]
pub struct ExactSolver<R = MinilpRelaxation> {
    linking: LinkingMode,
    config: ExactConfig,
    relaxation: R,
}

impl ExactSolver {
    /// Creates a solver using the `minilp` relaxation backend.
    pub fn new(linking: LinkingMode) -> Self {
        Self {
            linking,
            config: ExactConfig::default(),
            relaxation: MinilpRelaxation,
        }
    }
}

impl<R: RelaxationSolver> ExactSolver<R> {
    /// Replaces the relaxation backend.
    pub fn with_relaxation<S: RelaxationSolver>(self, relaxation: S) -> ExactSolver<S> {
        ExactSolver {
            linking: self.linking,
            config: self.config,
            relaxation,
        }
    }

    /// Replaces the configuration.
    pub fn with_config(mut self, config: ExactConfig) -> Self {
        self.config = config;
        self
    }

    /// Linking mode.
    pub fn linking(&self) -> LinkingMode {
        self.linking
    }

    /// Configuration.
    pub fn config(&self) -> &ExactConfig {
        &self.config
    }

    /// Builds the formulation this solver would search.
    pub fn formulate(&self, instance: &ProblemInstance) -> WaveFormulation {
        WaveFormulation::build(instance, self.linking, self.config.use_symmetry_breaking)
    }
}

impl<R: RelaxationSolver> WaveSolver for ExactSolver<R> {
    fn name(&self) -> &'static str {
        match self.linking {
            LinkingMode::PerCarton => "exact-a",
            LinkingMode::Aggregated => "exact-b",
        }
    }

    fn solve(&self, instance: &ProblemInstance) -> Result<SolveOutcome, WaveError> {
        let start = Instant::now();
        let k = instance.wave_count();
        info!(
            "{}: {} cartons, {} SKUs, {} waves of {}",
            self.name(),
            instance.carton_count(),
            instance.sku_count(),
            k,
            instance.capacity()
        );

        if instance.carton_count() == 0 {
            return Ok(SolveOutcome {
                allocation: Allocation::new(k),
                status: SolutionStatus::Optimal,
                stats: SolveStats {
                    lower_bound: Some(0),
                    ..SolveStats::default()
                },
            });
        }

        let room = (k as u64).saturating_mul(instance.capacity());
        if instance.total_weight() > room {
            return Err(WaveError::Infeasible {
                reason: format!(
                    "total weight {} exceeds {} waves of capacity {}",
                    instance.total_weight(),
                    k,
                    instance.capacity()
                ),
            });
        }

        let formulation = self.formulate(instance);
        info!(
            "{}: {} columns, {} rows, relaxations by {}",
            self.name(),
            formulation.model().column_count(),
            formulation.model().row_count(),
            self.relaxation.name()
        );

        let start_point = match packing_start(instance) {
            Some(waves) => {
                debug!(
                    "{}: starting packing scores {}",
                    self.name(),
                    fragmentation_of(instance, &waves)
                );
                Some(formulation.encode(instance, &waves))
            }
            None => {
                debug!("{}: no starting packing, searching from scratch", self.name());
                None
            }
        };

        let deadline = self
            .config
            .time_limit_ms
            .map(|ms| start + Duration::from_millis(ms));
        let search = BranchAndBound::new(formulation.model(), &self.relaxation)
            .with_node_limit(self.config.node_limit)
            .with_deadline(deadline)
            .with_start(start_point)
            .run()?;

        let Some((point, _)) = search.incumbent else {
            if search.complete {
                return Err(WaveError::Infeasible {
                    reason: format!(
                        "no allocation fits {} cartons into {} waves of capacity {}",
                        instance.carton_count(),
                        k,
                        instance.capacity()
                    ),
                });
            }
            warn!(
                "{}: budget exhausted after {} nodes without a feasible allocation",
                self.name(),
                search.nodes
            );
            return Err(WaveError::BudgetExhausted {
                nodes: search.nodes,
            });
        };

        let waves = formulation.decode(&point).ok_or_else(|| {
            WaveError::Backend("integral point leaves a carton unassigned".to_string())
        })?;
        let allocation = Allocation::from_waves(instance, &waves);
        let loads = allocation.wave_loads(instance);
        if loads.iter().any(|&load| load > instance.capacity()) {
            return Err(WaveError::Backend(
                "integral point overloads a wave".to_string(),
            ));
        }

        let score = fragmentation_of(instance, &waves);
        let status = if search.complete {
            SolutionStatus::Optimal
        } else {
            warn!(
                "{}: budget hit after {} nodes, returning unproven allocation",
                self.name(),
                search.nodes
            );
            SolutionStatus::Feasible
        };

        let stats = SolveStats {
            score,
            lower_bound: search.lower_bound.map(|b| b.max(0.0) as u64),
            nodes: search.nodes,
            budget_hit: !search.complete,
            elapsed_ms: start.elapsed().as_millis() as u64,
            ..SolveStats::default()
        };

        info!(
            "{}: score {} ({:?}) after {} nodes in {} ms",
            self.name(),
            score,
            status,
            stats.nodes,
            stats.elapsed_ms
        );

        Ok(SolveOutcome {
            allocation,
            status,
            stats,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluation::SpreadEvaluator;
    use crate::generator::{GeneratorConfig, InstanceGenerator};
    use crate::models::Carton;

    fn scenario(capacity: u64) -> ProblemInstance {
        ProblemInstance::with_wave_count(
            vec![
                Carton::new("box1").with_sku("A"),
                Carton::new("box2").with_skus(["A", "B"]),
                Carton::new("box3").with_skus(["B", "C"]),
                Carton::new("box4").with_sku("C"),
            ],
            capacity,
            2,
        )
        .unwrap()
    }

    #[derive(Debug)]
    struct Broken;

    impl RelaxationSolver for Broken {
        fn name(&self) -> &'static str {
            "broken"
        }

        fn solve(&self, _: &MilpModel, _: &[(f64, f64)]) -> Result<Relaxation, WaveError> {
            Err(WaveError::Backend("solver crashed".into()))
        }
    }

    #[test]
    fn test_scenario_optimum() {
        let instance = scenario(2);
        for linking in [LinkingMode::PerCarton, LinkingMode::Aggregated] {
            let outcome = ExactSolver::new(linking).solve(&instance).unwrap();
            assert_eq!(outcome.status, SolutionStatus::Optimal);
            assert_eq!(outcome.stats.score, 1);
            assert_eq!(outcome.stats.lower_bound, Some(1));
            let score = SpreadEvaluator::new(&instance)
                .fragmentation(&outcome.allocation)
                .unwrap();
            assert_eq!(score, 1);
        }
    }

    #[test]
    fn test_variants_agree_with_and_without_symmetry_breaking() {
        let instance = ProblemInstance::with_wave_count(
            vec![
                Carton::new("C1").with_skus(["A", "B"]),
                Carton::new("C2").with_sku("B").with_weight(2),
                Carton::new("C3").with_skus(["C", "A"]),
                Carton::new("C4").with_sku("D"),
                Carton::new("C5").with_skus(["D", "C"]),
            ],
            3,
            3,
        )
        .unwrap();

        let mut scores = Vec::new();
        for linking in [LinkingMode::PerCarton, LinkingMode::Aggregated] {
            for symmetry in [true, false] {
                let config = ExactConfig::default().with_symmetry_breaking(symmetry);
                let outcome = ExactSolver::new(linking)
                    .with_config(config)
                    .solve(&instance)
                    .unwrap();
                assert!(outcome.status.is_optimal());
                scores.push(outcome.stats.score);
            }
        }
        assert!(scores.windows(2).all(|w| w[0] == w[1]), "{scores:?}");
    }

    #[test]
    fn test_more_capacity_never_hurts() {
        let scores: Vec<u64> = (2..=4)
            .map(|c| {
                ExactSolver::new(LinkingMode::PerCarton)
                    .solve(&scenario(c))
                    .unwrap()
                    .stats
                    .score
            })
            .collect();
        assert_eq!(scores, vec![1, 1, 0]);
    }

    #[test]
    fn test_total_weight_precheck() {
        let instance = ProblemInstance::with_wave_count(
            vec![
                Carton::new("C1").with_sku("A").with_weight(2),
                Carton::new("C2").with_sku("B").with_weight(2),
                Carton::new("C3").with_sku("C").with_weight(2),
            ],
            2,
            2,
        )
        .unwrap();
        let err = ExactSolver::new(LinkingMode::Aggregated)
            .solve(&instance)
            .unwrap_err();
        assert!(matches!(err, WaveError::Infeasible { .. }));
    }

    #[test]
    fn test_packing_infeasible_after_search() {
        // Total weight 8 fits two waves of 4 by volume, but no two cartons
        // can share a wave
        let instance = ProblemInstance::with_wave_count(
            vec![
                Carton::new("C1").with_sku("A").with_weight(2),
                Carton::new("C2").with_sku("B").with_weight(3),
                Carton::new("C3").with_sku("C").with_weight(3),
            ],
            4,
            2,
        )
        .unwrap();
        let err = ExactSolver::new(LinkingMode::PerCarton)
            .solve(&instance)
            .unwrap_err();
        assert!(err.is_infeasible());
        assert!(matches!(err, WaveError::Infeasible { .. }));
    }

    #[test]
    fn test_node_limit_zero_returns_starting_packing() {
        let instance = scenario(2);
        for linking in [LinkingMode::PerCarton, LinkingMode::Aggregated] {
            let outcome = ExactSolver::new(linking)
                .with_config(ExactConfig::default().with_node_limit(0))
                .solve(&instance)
                .unwrap();
            assert_eq!(outcome.status, SolutionStatus::Feasible);
            assert!(outcome.stats.budget_hit);
            assert_eq!(outcome.stats.nodes, 0);
            assert_eq!(outcome.stats.score, 1);
            assert_eq!(outcome.stats.lower_bound, None);
            assert_eq!(
                SpreadEvaluator::new(&instance).fragmentation(&outcome.allocation),
                Ok(1)
            );
        }
    }

    /// Feasible ({5,3,2} and {4,4,2}), but first-fit decreasing misses it.
    fn tight_packing() -> ProblemInstance {
        ProblemInstance::with_wave_count(
            [5, 4, 4, 3, 2, 2]
                .iter()
                .enumerate()
                .map(|(i, &w)| Carton::new(format!("C{i}")).with_sku(format!("S{i}")).with_weight(w))
                .collect(),
            10,
            2,
        )
        .unwrap()
    }

    #[test]
    fn test_budget_without_any_allocation() {
        let err = ExactSolver::new(LinkingMode::PerCarton)
            .with_config(ExactConfig::default().with_node_limit(0))
            .solve(&tight_packing())
            .unwrap_err();
        assert_eq!(err, WaveError::BudgetExhausted { nodes: 0 });
    }

    #[test]
    fn test_search_finds_packing_first_fit_misses() {
        let instance = tight_packing();
        let outcome = ExactSolver::new(LinkingMode::PerCarton)
            .solve(&instance)
            .unwrap();
        assert_eq!(outcome.status, SolutionStatus::Optimal);
        assert_eq!(outcome.stats.score, 0);
        assert!(outcome
            .allocation
            .wave_loads(&instance)
            .iter()
            .all(|&load| load == 10));
    }

    #[test]
    fn test_small_node_budget_is_unproven_not_an_error() {
        for seed in 0..4 {
            let instance = InstanceGenerator::new(GeneratorConfig::default(), seed)
                .generate()
                .unwrap();
            let outcome = ExactSolver::new(LinkingMode::Aggregated)
                .with_config(ExactConfig::default().with_node_limit(20))
                .solve(&instance)
                .unwrap();
            let expected = if outcome.stats.budget_hit {
                SolutionStatus::Feasible
            } else {
                SolutionStatus::Optimal
            };
            assert_eq!(outcome.status, expected);
            assert!(outcome.stats.nodes <= 20);
            if let Some(bound) = outcome.stats.lower_bound {
                assert!(bound <= outcome.stats.score);
            }
            assert_eq!(
                SpreadEvaluator::new(&instance).fragmentation(&outcome.allocation),
                Ok(outcome.stats.score)
            );
        }
    }

    #[test]
    fn test_backend_failure_surfaces() {
        let instance = scenario(2);
        let err = ExactSolver::new(LinkingMode::PerCarton)
            .with_relaxation(Broken)
            .solve(&instance)
            .unwrap_err();
        assert_eq!(err, WaveError::Backend("solver crashed".into()));
    }

    #[test]
    fn test_empty_instance_is_optimal() {
        let instance = ProblemInstance::new(Vec::new(), 3).unwrap();
        let outcome = ExactSolver::new(LinkingMode::PerCarton)
            .solve(&instance)
            .unwrap();
        assert_eq!(outcome.status, SolutionStatus::Optimal);
        assert_eq!(outcome.allocation.assignment_count(), 0);
    }

    #[test]
    fn test_config_serde() {
        let config = ExactConfig::default().with_node_limit(500);
        let json = serde_json::to_string(&config).unwrap();
        let back: ExactConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
        assert!(back.use_symmetry_breaking);
    }
}
