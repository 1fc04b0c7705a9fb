//! Allocation scoring and quality metrics.
//!
//! # Objective
//!
//! The fragmentation score of an allocation is
//!
//! ```text
//! Σ_s (|footprint(s)| − 1)
//! ```
//!
//! where `footprint(s)` is the set of waves holding at least one carton that
//! carries SKU `s`. It is zero when every SKU is picked in a single wave and
//! grows by one for each extra wave an SKU spills into. Every solver in this
//! crate minimizes this quantity, and the same evaluator compares their
//! results.
//!
//! # KPI
//!
//! `WaveKpi` adds load statistics (wave usage ratios) and footprint
//! summaries on top of the raw score.
//!
//! # Usage
//!
//! ```
//! use u_waves::evaluation::SpreadEvaluator;
//! use u_waves::models::{Allocation, Carton, ProblemInstance};
//!
//! let instance = ProblemInstance::with_wave_count(
//!     vec![
//!         Carton::new("C1").with_sku("A"),
//!         Carton::new("C2").with_sku("A"),
//!     ],
//!     1,
//!     2,
//! )
//! .unwrap();
//! let allocation = Allocation::new(2)
//!     .with_assignment("C1", 0)
//!     .with_assignment("C2", 1);
//!
//! let evaluator = SpreadEvaluator::new(&instance);
//! assert_eq!(evaluator.fragmentation(&allocation).unwrap(), 1);
//! ```

mod kpi;
mod spread;

pub use kpi::WaveKpi;
pub use spread::{SpreadEvaluator, SpreadReport};

pub(crate) use spread::fragmentation_of;
