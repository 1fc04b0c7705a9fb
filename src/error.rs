//! Error type shared by every solver and the evaluator.
//!
//! | Variant | Raised by |
//! |---------|-----------|
//! | `InvalidInstance` | `ProblemInstance` construction |
//! | `Infeasible` | exact solver (pre-check or exhausted search) |
//! | `NoFeasiblePlacement` | greedy placement stage |
//! | `InvalidAllocation` | `SpreadEvaluator`, `WaveKpi`, greedy construction |
//! | `BudgetExhausted` | exact solver with no starting packing and no incumbent at budget end |
//! | `Backend` | LP relaxation backend |
//!
//! A budget that ends the exact search *after* a feasible allocation is known
//! is not an error: the solver reports `SolutionStatus::Feasible` instead.

use thiserror::Error;

use crate::validation::ValidationError;

/// Errors surfaced by the wave allocation engine.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum WaveError {
    /// The input cartons, capacity or wave count are malformed.
    #[error("invalid instance: {}", join_messages(.0))]
    InvalidInstance(Vec<ValidationError>),

    /// No allocation satisfies the capacity constraints.
    #[error("instance is infeasible: {reason}")]
    Infeasible {
        /// Why the instance cannot be allocated.
        reason: String,
    },

    /// The greedy placement found no wave with room for a carton.
    #[error("no wave has room for carton '{carton_id}' (weight {weight})")]
    NoFeasiblePlacement {
        /// Carton that could not be placed.
        carton_id: String,
        /// Its weight.
        weight: u64,
    },

    /// An allocation handed to the evaluator breaks an allocation invariant.
    #[error("invalid allocation: {}", join_messages(.0))]
    InvalidAllocation(Vec<ValidationError>),

    /// The exact search stopped on its budget before any feasible allocation.
    #[error("budget exhausted after {nodes} nodes without a feasible allocation")]
    BudgetExhausted {
        /// Relaxations solved before stopping.
        nodes: u64,
    },

    /// The LP relaxation backend failed.
    #[error("relaxation backend error: {0}")]
    Backend(String),
}

impl WaveError {
    /// Whether the error means that no valid allocation exists.
    ///
    /// A failed greedy placement counts as infeasibility for the chosen
    /// wave count, mirroring the exact solver.
    pub fn is_infeasible(&self) -> bool {
        matches!(
            self,
            WaveError::Infeasible { .. } | WaveError::NoFeasiblePlacement { .. }
        )
    }
}

fn join_messages(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::ValidationErrorKind;

    #[test]
    fn test_display_joins_validation_messages() {
        let err = WaveError::InvalidInstance(vec![
            ValidationError::new(ValidationErrorKind::EmptyCarton, "Carton 'C1' has no items"),
            ValidationError::new(ValidationErrorKind::ZeroCapacity, "Wave capacity is zero"),
        ]);
        assert_eq!(
            err.to_string(),
            "invalid instance: Carton 'C1' has no items; Wave capacity is zero"
        );
    }

    #[test]
    fn test_is_infeasible() {
        assert!(WaveError::Infeasible {
            reason: "too heavy".into()
        }
        .is_infeasible());
        assert!(WaveError::NoFeasiblePlacement {
            carton_id: "C1".into(),
            weight: 3
        }
        .is_infeasible());
        assert!(!WaveError::BudgetExhausted { nodes: 10 }.is_infeasible());
        assert!(!WaveError::InvalidAllocation(vec![]).is_infeasible());
    }
}
