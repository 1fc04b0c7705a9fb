//! Construct-then-repair heuristics.
//!
//! # Algorithm
//!
//! 1. **Ordering**: a [`CartonOrdering`] fixes the placement sequence.
//! 2. **Placement**: each carton goes to the wave with room that gains the
//!    fewest new SKUs; ties go to the wave with the fewest cartons, then to
//!    the lowest wave index.
//! 3. **Repair** (variants 3 and 4): first-improvement moves and swaps that
//!    strictly lower the fragmentation score, bounded by an iteration cap
//!    and an optional time limit.
//!
//! | Variant | Ordering | Repair |
//! |---------|----------|--------|
//! | 1 | `InputOrder` | none |
//! | 2 | `SkuPopularity` | none |
//! | 3 | `InputOrder` | swap/move repair |
//! | 4 | `SkuPopularity` | swap/move repair |
//!
//! All tie-breaks are fixed, so a variant returns the same allocation for
//! the same instance on every run. The heuristics carry no optimality
//! guarantee; results are reported as `SolutionStatus::Heuristic`.
//!
//! # Usage
//!
//! ```
//! use u_waves::greedy::{GreedySolver, GreedyVariant};
//! use u_waves::models::{Carton, ProblemInstance};
//! use u_waves::solver::WaveSolver;
//!
//! let instance = ProblemInstance::new(
//!     vec![
//!         Carton::new("C1").with_sku("A"),
//!         Carton::new("C2").with_skus(["A", "B"]),
//!         Carton::new("C3").with_sku("B"),
//!     ],
//!     2,
//! )
//! .unwrap();
//!
//! let outcome = GreedySolver::new(GreedyVariant::PopularityRepair)
//!     .solve(&instance)
//!     .unwrap();
//! assert_eq!(outcome.allocation.assignment_count(), 3);
//! ```

mod board;
mod ordering;
mod repair;

pub use board::WaveBoard;
pub use ordering::{CartonOrdering, InputOrder, SkuPopularity};

use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

use crate::error::WaveError;
use crate::models::ProblemInstance;
use crate::solver::{SolutionStatus, SolveOutcome, SolveStats, WaveSolver};
use crate::validation::{ValidationError, ValidationErrorKind};

/// The four greedy variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GreedyVariant {
    /// Variant 1: input order, no repair.
    InputOrder,
    /// Variant 2: SKU popularity order, no repair.
    Popularity,
    /// Variant 3: input order, then repair.
    InputOrderRepair,
    /// Variant 4: SKU popularity order, then repair.
    PopularityRepair,
}

impl GreedyVariant {
    /// All variants, by number.
    pub const ALL: [GreedyVariant; 4] = [
        GreedyVariant::InputOrder,
        GreedyVariant::Popularity,
        GreedyVariant::InputOrderRepair,
        GreedyVariant::PopularityRepair,
    ];

    /// Variant number (1..=4).
    pub fn number(self) -> u8 {
        match self {
            GreedyVariant::InputOrder => 1,
            GreedyVariant::Popularity => 2,
            GreedyVariant::InputOrderRepair => 3,
            GreedyVariant::PopularityRepair => 4,
        }
    }

    /// Whether the variant runs the repair stage.
    pub fn uses_repair(self) -> bool {
        matches!(
            self,
            GreedyVariant::InputOrderRepair | GreedyVariant::PopularityRepair
        )
    }

    /// Ordering strategy of the variant.
    pub fn ordering(self) -> &'static dyn CartonOrdering {
        match self {
            GreedyVariant::InputOrder | GreedyVariant::InputOrderRepair => &InputOrder,
            GreedyVariant::Popularity | GreedyVariant::PopularityRepair => &SkuPopularity,
        }
    }
}

/// Greedy solver configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GreedyConfig {
    /// Maximum applied repair moves.
    pub repair_iteration_limit: u64,
    /// Wall-clock limit for the repair stage (ms). Placement always completes.
    pub time_limit_ms: Option<u64>,
}

impl Default for GreedyConfig {
    fn default() -> Self {
        Self {
            repair_iteration_limit: 10_000,
            time_limit_ms: None,
        }
    }
}

impl GreedyConfig {
    /// Sets the repair iteration cap.
    pub fn with_repair_iteration_limit(mut self, limit: u64) -> Self {
        self.repair_iteration_limit = limit;
        self
    }

    /// Sets the repair time limit.
    pub fn with_time_limit_ms(mut self, ms: u64) -> Self {
        self.time_limit_ms = Some(ms);
        self
    }
}

/// A greedy wave allocator.
#[derive(Debug, Clone)]
pub struct GreedySolver {
    variant: GreedyVariant,
    config: GreedyConfig,
}

impl GreedySolver {
    /// Creates a solver for a variant with the default configuration.
    pub fn new(variant: GreedyVariant) -> Self {
        Self {
            variant,
            config: GreedyConfig::default(),
        }
    }

    /// Replaces the configuration.
    pub fn with_config(mut self, config: GreedyConfig) -> Self {
        self.config = config;
        self
    }

    /// The configured variant.
    pub fn variant(&self) -> GreedyVariant {
        self.variant
    }

    /// The configuration.
    pub fn config(&self) -> &GreedyConfig {
        &self.config
    }

    /// Runs ordering and placement only.
    ///
    /// # Errors
    /// `WaveError::NoFeasiblePlacement` naming the first carton that fits in
    /// no wave.
    pub fn construct<'a>(&self, instance: &'a ProblemInstance) -> Result<WaveBoard<'a>, WaveError> {
        construct_with(self.variant.ordering(), instance)
    }
}

/// Places cartons in the order produced by `ordering`.
///
/// Repeated or out-of-range indices in the order are skipped. An order that
/// leaves a carton out fails with `WaveError::InvalidAllocation`.
pub(crate) fn construct_with<'a>(
    ordering: &dyn CartonOrdering,
    instance: &'a ProblemInstance,
) -> Result<WaveBoard<'a>, WaveError> {
    let mut board = WaveBoard::new(instance);
    for carton in ordering.order(instance) {
        if carton >= instance.carton_count() || board.wave_of(carton).is_some() {
            continue;
        }
        let wave = board
            .best_wave(carton)
            .ok_or_else(|| WaveError::NoFeasiblePlacement {
                carton_id: instance.carton(carton).id.clone(),
                weight: instance.weight(carton),
            })?;
        board.place(carton, wave);
    }
    if board.is_complete() {
        Ok(board)
    } else {
        Err(unplaced(&board))
    }
}

fn unplaced(board: &WaveBoard<'_>) -> WaveError {
    let instance = board.instance();
    let errors = (0..instance.carton_count())
        .filter(|&c| board.wave_of(c).is_none())
        .map(|c| {
            ValidationError::new(
                ValidationErrorKind::MissingCarton,
                format!("Carton '{}' is not assigned", instance.carton(c).id),
            )
        })
        .collect();
    WaveError::InvalidAllocation(errors)
}

impl WaveSolver for GreedySolver {
    fn name(&self) -> &'static str {
        match self.variant {
            GreedyVariant::InputOrder => "greedy-1",
            GreedyVariant::Popularity => "greedy-2",
            GreedyVariant::InputOrderRepair => "greedy-3",
            GreedyVariant::PopularityRepair => "greedy-4",
        }
    }

    fn solve(&self, instance: &ProblemInstance) -> Result<SolveOutcome, WaveError> {
        let start = Instant::now();
        info!(
            "{}: {} cartons, {} SKUs, {} waves of {}",
            self.name(),
            instance.carton_count(),
            instance.sku_count(),
            instance.wave_count(),
            instance.capacity()
        );

        let mut board = self.construct(instance)?;
        let construction_score = board.score();
        debug!(
            "{}: construction ({}) scored {}",
            self.name(),
            self.variant.ordering().name(),
            construction_score
        );

        let mut stats = SolveStats {
            construction_score: Some(construction_score),
            ..SolveStats::default()
        };

        if self.variant.uses_repair() {
            let deadline = self
                .config
                .time_limit_ms
                .map(|ms| start + Duration::from_millis(ms));
            let summary = repair::repair(&mut board, self.config.repair_iteration_limit, deadline);
            stats.iterations = summary.iterations;
            stats.moves = summary.moves;
            stats.swaps = summary.swaps;
            stats.budget_hit = summary.budget_hit;
        }

        stats.score = board.score();
        stats.elapsed_ms = start.elapsed().as_millis() as u64;

        let allocation = board.to_allocation().ok_or_else(|| unplaced(&board))?;

        info!(
            "{}: score {} (construction {}) in {} ms",
            self.name(),
            stats.score,
            construction_score,
            stats.elapsed_ms
        );

        Ok(SolveOutcome {
            allocation,
            status: SolutionStatus::Heuristic,
            stats,
        })
    }
}
