//! Wave allocation for warehouse picking.
//!
//! Partitions cartons into capacity-bounded picking waves so that each SKU
//! is spread over as few waves as possible. Provides the fragmentation
//! metric, two exact integer programming formulations solved by
//! branch-and-bound, and four greedy construct-and-repair heuristics.
//!
//! # Modules
//!
//! - **`models`**: Domain types: `Carton`, `ProblemInstance`, `Allocation`
//! - **`validation`**: Input and allocation integrity checks
//! - **`evaluation`**: Fragmentation score (`SpreadEvaluator`) and `WaveKpi`
//! - **`exact`**: MILP formulations (per-carton and aggregated linking) and
//!   an LP-based branch-and-bound
//! - **`greedy`**: Carton orderings, marginal-SKU placement, local repair
//! - **`solver`**: `WaveSolver` trait, `SolverKind` selection, budgets
//! - **`generator`**: Seeded random instances
//!
//! # Example
//!
//! ```
//! use u_waves::models::{Carton, ProblemInstance};
//! use u_waves::solver::{solve, Budget, SolverKind};
//!
//! let instance = ProblemInstance::with_wave_count(
//!     vec![
//!         Carton::new("box1").with_sku("A"),
//!         Carton::new("box2").with_skus(["A", "B"]),
//!         Carton::new("box3").with_skus(["B", "C"]),
//!         Carton::new("box4").with_sku("C"),
//!     ],
//!     2,
//!     2,
//! )
//! .unwrap();
//!
//! let outcome = solve(SolverKind::ExactPerCarton, &instance, &Budget::unlimited()).unwrap();
//! assert_eq!(outcome.stats.score, 1);
//! assert!(outcome.status.is_optimal());
//! ```
//!
//! # References
//!
//! - de Koster, Le-Duc & Roodbergen (2007), "Design and control of warehouse
//!   order picking: A literature review"
//! - Land & Doig (1960), "An Automatic Method of Solving Discrete Programming Problems"

pub mod error;
pub mod evaluation;
pub mod exact;
pub mod generator;
pub mod greedy;
pub mod models;
pub mod solver;
pub mod validation;

pub use error::WaveError;
pub use evaluation::{SpreadEvaluator, WaveKpi};
pub use models::{Allocation, Carton, ProblemInstance};
pub use solver::{solve, Budget, SolutionStatus, SolveOutcome, SolverKind, WaveSolver};
