//! Allocation (solution) model.
//!
//! An allocation assigns every carton to exactly one wave. It is produced
//! by a solver, immutable once returned, and consumed by the evaluator or a
//! reporting layer. Invariants are checked by
//! [`validate_allocation`](crate::validation::validate_allocation), not by
//! construction, so that externally built allocations can be verified.

use serde::{Deserialize, Serialize};

use super::ProblemInstance;

/// A carton-to-wave assignment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaveAssignment {
    /// Assigned carton ID.
    pub carton_id: String,
    /// Wave index in `0..wave_count`.
    pub wave: usize,
}

impl WaveAssignment {
    /// Creates a new assignment.
    pub fn new(carton_id: impl Into<String>, wave: usize) -> Self {
        Self {
            carton_id: carton_id.into(),
            wave,
        }
    }
}

/// A complete carton-to-wave allocation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Allocation {
    /// Number of waves the allocation was built for.
    pub wave_count: usize,
    /// One entry per carton.
    pub assignments: Vec<WaveAssignment>,
}

impl Allocation {
    /// Creates an empty allocation over `wave_count` waves.
    pub fn new(wave_count: usize) -> Self {
        Self {
            wave_count,
            assignments: Vec::new(),
        }
    }

    /// Builds an allocation from a wave index per carton (input order).
    pub(crate) fn from_waves(instance: &ProblemInstance, waves: &[usize]) -> Self {
        let assignments = instance
            .cartons()
            .iter()
            .zip(waves)
            .map(|(carton, &wave)| WaveAssignment::new(carton.id.clone(), wave))
            .collect();
        Self {
            wave_count: instance.wave_count(),
            assignments,
        }
    }

    /// Adds an assignment.
    pub fn add_assignment(&mut self, assignment: WaveAssignment) {
        self.assignments.push(assignment);
    }

    /// Sets the wave of a carton.
    pub fn with_assignment(mut self, carton_id: impl Into<String>, wave: usize) -> Self {
        self.add_assignment(WaveAssignment::new(carton_id, wave));
        self
    }

    /// Wave of the first assignment for a carton.
    pub fn wave_of(&self, carton_id: &str) -> Option<usize> {
        self.assignments
            .iter()
            .find(|a| a.carton_id == carton_id)
            .map(|a| a.wave)
    }

    /// Carton IDs assigned to a wave, in assignment order.
    pub fn cartons_in_wave(&self, wave: usize) -> Vec<&str> {
        self.assignments
            .iter()
            .filter(|a| a.wave == wave)
            .map(|a| a.carton_id.as_str())
            .collect()
    }

    /// Carton IDs grouped by wave (`wave_count` groups; entries beyond it are skipped).
    pub fn waves(&self) -> Vec<Vec<&str>> {
        let mut groups: Vec<Vec<&str>> = vec![Vec::new(); self.wave_count];
        for a in &self.assignments {
            if let Some(group) = groups.get_mut(a.wave) {
                group.push(&a.carton_id);
            }
        }
        groups
    }

    /// Load per wave, using carton weights from the instance.
    ///
    /// Assignments to unknown cartons or out-of-range waves are ignored.
    /// Loads saturate at `u64::MAX`.
    pub fn wave_loads(&self, instance: &ProblemInstance) -> Vec<u64> {
        let mut loads = vec![0u64; self.wave_count];
        for a in &self.assignments {
            if let (Some(idx), Some(load)) =
                (instance.carton_index(&a.carton_id), loads.get_mut(a.wave))
            {
                *load = load.saturating_add(instance.weight(idx));
            }
        }
        loads
    }

    /// Number of waves holding at least one carton.
    pub fn used_wave_count(&self) -> usize {
        self.waves().iter().filter(|w| !w.is_empty()).count()
    }

    /// Number of assignments.
    pub fn assignment_count(&self) -> usize {
        self.assignments.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Carton;

    fn sample() -> (ProblemInstance, Allocation) {
        let instance = ProblemInstance::with_wave_count(
            vec![
                Carton::new("C1").with_sku("A").with_weight(2),
                Carton::new("C2").with_sku("B"),
                Carton::new("C3").with_sku("A"),
            ],
            3,
            3,
        )
        .unwrap();
        let allocation = Allocation::from_waves(&instance, &[0, 1, 0]);
        (instance, allocation)
    }

    #[test]
    fn test_from_waves() {
        let (_, allocation) = sample();
        assert_eq!(allocation.wave_count, 3);
        assert_eq!(allocation.assignment_count(), 3);
        assert_eq!(allocation.wave_of("C3"), Some(0));
        assert_eq!(allocation.wave_of("C9"), None);
    }

    #[test]
    fn test_grouping_and_loads() {
        let (instance, allocation) = sample();
        assert_eq!(allocation.cartons_in_wave(0), vec!["C1", "C3"]);
        assert_eq!(allocation.waves(), vec![vec!["C1", "C3"], vec!["C2"], vec![]]);
        assert_eq!(allocation.wave_loads(&instance), vec![3, 1, 0]);
        assert_eq!(allocation.used_wave_count(), 2);
    }

    #[test]
    fn test_loads_saturate() {
        let heavy = u64::MAX / 2;
        let instance = ProblemInstance::new(
            vec![
                Carton::new("a").with_sku("A").with_weight(heavy),
                Carton::new("b").with_sku("A").with_weight(heavy),
            ],
            heavy,
        )
        .unwrap();
        // "a" listed three times overshoots u64 without saturation
        let allocation = Allocation::new(2)
            .with_assignment("a", 0)
            .with_assignment("a", 0)
            .with_assignment("a", 0)
            .with_assignment("b", 1);
        assert_eq!(allocation.wave_loads(&instance), vec![u64::MAX, heavy]);
    }

    #[test]
    fn test_builder() {
        let allocation = Allocation::new(2).with_assignment("X", 1).with_assignment("Y", 0);
        assert_eq!(allocation.cartons_in_wave(1), vec!["X"]);
    }

    #[test]
    fn test_serde_shape() {
        let (_, allocation) = sample();
        let value = serde_json::to_value(&allocation).unwrap();
        assert_eq!(value["wave_count"], 3);
        assert_eq!(value["assignments"][1]["carton_id"], "C2");
        assert_eq!(value["assignments"][1]["wave"], 1);
    }
}
