//! Input and solution validation.
//!
//! Checks the structural integrity of cartons before any solver runs, and
//! of allocations before they are scored. Detects:
//! - Duplicate carton IDs
//! - Empty cartons and blank SKU identifiers
//! - Zero weights, zero capacity, zero waves
//! - Cartons heavier than the wave capacity
//! - Total weight beyond the `u64` range
//! - Missing, duplicated or unknown cartons in an allocation
//! - Wave indices out of range and overloaded waves
//!
//! Every check runs; all problems are reported together.

use crate::models::{Allocation, Carton, ProblemInstance};
use std::collections::HashSet;

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// Two cartons share the same ID.
    DuplicateId,
    /// A carton holds no items.
    EmptyCarton,
    /// An item has a blank SKU identifier or zero quantity.
    EmptySku,
    /// A carton weighs nothing.
    ZeroWeight,
    /// The wave capacity is zero.
    ZeroCapacity,
    /// A fixed wave count of zero was requested for a non-empty instance.
    ZeroWaves,
    /// A carton is heavier than a whole wave.
    OversizedCarton,
    /// The summed carton weight does not fit in a `u64`.
    WeightOverflow,
    /// A carton of the instance has no assignment.
    MissingCarton,
    /// A carton is assigned more than once.
    DuplicateCarton,
    /// An assignment names a carton that is not in the instance.
    UnknownCarton,
    /// An assignment targets a wave index `>= K`.
    WaveOutOfRange,
    /// The allocation was built for a different number of waves.
    WaveCountMismatch,
    /// A wave's total weight exceeds its capacity.
    CapacityExceeded,
}

impl ValidationError {
    pub(crate) fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Validates the input data for a wave allocation problem.
///
/// Checks:
/// 1. Capacity is positive
/// 2. A fixed wave count, if given, is positive (unless there are no cartons)
/// 3. No duplicate carton IDs
/// 4. Every carton has at least one item, every item a SKU and a positive quantity
/// 5. Every carton has a positive weight not above the capacity
/// 6. The total weight is representable
///
/// # Returns
/// `Ok(())` if all checks pass, `Err(errors)` with all detected issues.
pub fn validate_instance(
    cartons: &[Carton],
    capacity: u64,
    wave_count: Option<usize>,
) -> ValidationResult {
    let mut errors = Vec::new();

    if capacity == 0 {
        errors.push(ValidationError::new(
            ValidationErrorKind::ZeroCapacity,
            "Wave capacity must be positive",
        ));
    }

    if wave_count == Some(0) && !cartons.is_empty() {
        errors.push(ValidationError::new(
            ValidationErrorKind::ZeroWaves,
            format!("Zero waves requested for {} cartons", cartons.len()),
        ));
    }

    let mut ids = HashSet::new();
    let mut total: Option<u64> = Some(0);
    for carton in cartons {
        total = total.and_then(|t| t.checked_add(carton.weight));
        if !ids.insert(carton.id.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate carton ID: {}", carton.id),
            ));
        }

        if carton.items.is_empty() {
            errors.push(ValidationError::new(
                ValidationErrorKind::EmptyCarton,
                format!("Carton '{}' has no items", carton.id),
            ));
        }

        for item in &carton.items {
            if item.sku.trim().is_empty() || item.quantity == 0 {
                errors.push(ValidationError::new(
                    ValidationErrorKind::EmptySku,
                    format!(
                        "Carton '{}' has an item with SKU '{}' and quantity {}",
                        carton.id, item.sku, item.quantity
                    ),
                ));
            }
        }

        if carton.weight == 0 {
            errors.push(ValidationError::new(
                ValidationErrorKind::ZeroWeight,
                format!("Carton '{}' has zero weight", carton.id),
            ));
        } else if capacity > 0 && carton.weight > capacity {
            errors.push(ValidationError::new(
                ValidationErrorKind::OversizedCarton,
                format!(
                    "Carton '{}' weighs {} but a wave holds at most {}",
                    carton.id, carton.weight, capacity
                ),
            ));
        }
    }

    if total.is_none() {
        errors.push(ValidationError::new(
            ValidationErrorKind::WeightOverflow,
            format!("Total weight of {} cartons overflows u64", cartons.len()),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Validates an allocation against the instance it claims to solve.
///
/// Checks:
/// 1. The allocation uses the instance's wave count
/// 2. Every assignment names a known carton and an in-range wave
/// 3. No carton is assigned twice, none is left out
/// 4. No wave is loaded beyond capacity
///
/// # Returns
/// `Ok(())` if all checks pass, `Err(errors)` with all detected issues.
pub fn validate_allocation(instance: &ProblemInstance, allocation: &Allocation) -> ValidationResult {
    resolve_allocation(instance, allocation).map(|_| ())
}

/// Validates an allocation and returns the wave of every carton (input order).
pub(crate) fn resolve_allocation(
    instance: &ProblemInstance,
    allocation: &Allocation,
) -> Result<Vec<usize>, Vec<ValidationError>> {
    let mut errors = Vec::new();
    let wave_count = instance.wave_count();

    if allocation.wave_count != wave_count {
        errors.push(ValidationError::new(
            ValidationErrorKind::WaveCountMismatch,
            format!(
                "Allocation has {} waves, instance has {}",
                allocation.wave_count, wave_count
            ),
        ));
    }

    let mut waves: Vec<Option<usize>> = vec![None; instance.carton_count()];
    let mut loads = vec![0u64; wave_count];

    for a in &allocation.assignments {
        let Some(idx) = instance.carton_index(&a.carton_id) else {
            errors.push(ValidationError::new(
                ValidationErrorKind::UnknownCarton,
                format!("Assignment references unknown carton '{}'", a.carton_id),
            ));
            continue;
        };

        if a.wave >= wave_count {
            errors.push(ValidationError::new(
                ValidationErrorKind::WaveOutOfRange,
                format!(
                    "Carton '{}' assigned to wave {} of {}",
                    a.carton_id, a.wave, wave_count
                ),
            ));
            continue;
        }

        if waves[idx].is_some() {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateCarton,
                format!("Carton '{}' is assigned more than once", a.carton_id),
            ));
            continue;
        }

        waves[idx] = Some(a.wave);
        loads[a.wave] = loads[a.wave].saturating_add(instance.weight(idx));
    }

    for (idx, wave) in waves.iter().enumerate() {
        if wave.is_none() {
            errors.push(ValidationError::new(
                ValidationErrorKind::MissingCarton,
                format!("Carton '{}' is not assigned", instance.carton(idx).id),
            ));
        }
    }

    for (wave, &load) in loads.iter().enumerate() {
        if load > instance.capacity() {
            errors.push(ValidationError::new(
                ValidationErrorKind::CapacityExceeded,
                format!(
                    "Wave {} carries {} but holds at most {}",
                    wave,
                    load,
                    instance.capacity()
                ),
            ));
        }
    }

    if errors.is_empty() {
        Ok(waves.into_iter().flatten().collect())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::WaveAssignment;

    fn sample_cartons() -> Vec<Carton> {
        vec![
            Carton::new("C1").with_sku("A"),
            Carton::new("C2").with_skus(["A", "B"]),
            Carton::new("C3").with_skus(["B", "C"]),
            Carton::new("C4").with_sku("C"),
        ]
    }

    fn sample_instance() -> ProblemInstance {
        ProblemInstance::with_wave_count(sample_cartons(), 2, 2).unwrap()
    }

    fn kinds(errors: &[ValidationError]) -> Vec<ValidationErrorKind> {
        errors.iter().map(|e| e.kind.clone()).collect()
    }

    #[test]
    fn test_valid_input() {
        assert!(validate_instance(&sample_cartons(), 2, None).is_ok());
        assert!(validate_instance(&sample_cartons(), 2, Some(3)).is_ok());
    }

    #[test]
    fn test_duplicate_carton_id() {
        let cartons = vec![
            Carton::new("C1").with_sku("A"),
            Carton::new("C1").with_sku("B"),
        ];
        let errors = validate_instance(&cartons, 2, None).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| e.kind == ValidationErrorKind::DuplicateId));
    }

    #[test]
    fn test_empty_carton() {
        let cartons = vec![Carton::new("empty")];
        let errors = validate_instance(&cartons, 2, None).unwrap_err();
        assert_eq!(kinds(&errors), vec![ValidationErrorKind::EmptyCarton]);
    }

    #[test]
    fn test_blank_sku_and_zero_quantity() {
        let cartons = vec![Carton::new("C1").with_sku("  ").with_item("A", 0)];
        let errors = validate_instance(&cartons, 2, None).unwrap_err();
        assert_eq!(errors.len(), 2);
        assert!(errors.iter().all(|e| e.kind == ValidationErrorKind::EmptySku));
    }

    #[test]
    fn test_weight_checks() {
        let cartons = vec![
            Carton::new("light").with_sku("A").with_weight(0),
            Carton::new("heavy").with_sku("B").with_weight(3),
        ];
        let errors = validate_instance(&cartons, 2, None).unwrap_err();
        assert_eq!(
            kinds(&errors),
            vec![
                ValidationErrorKind::ZeroWeight,
                ValidationErrorKind::OversizedCarton
            ]
        );
    }

    #[test]
    fn test_total_weight_overflow() {
        let heavy = (1u64 << 63) + 1;
        let cartons = vec![
            Carton::new("a").with_sku("A").with_weight(heavy),
            Carton::new("b").with_sku("B").with_weight(heavy),
        ];
        let errors = validate_instance(&cartons, heavy, Some(2)).unwrap_err();
        assert_eq!(kinds(&errors), vec![ValidationErrorKind::WeightOverflow]);
    }

    #[test]
    fn test_overloaded_wave_of_huge_cartons() {
        let heavy = u64::MAX / 2;
        let instance = ProblemInstance::new(
            vec![
                Carton::new("a").with_sku("A").with_weight(heavy),
                Carton::new("b").with_sku("B").with_weight(heavy),
            ],
            heavy,
        )
        .unwrap();
        let allocation = Allocation::new(2)
            .with_assignment("a", 0)
            .with_assignment("b", 0);
        let errors = validate_allocation(&instance, &allocation).unwrap_err();
        assert_eq!(kinds(&errors), vec![ValidationErrorKind::CapacityExceeded]);
    }

    #[test]
    fn test_zero_capacity_and_zero_waves() {
        let errors = validate_instance(&sample_cartons(), 0, Some(0)).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| e.kind == ValidationErrorKind::ZeroCapacity));
        assert!(errors
            .iter()
            .any(|e| e.kind == ValidationErrorKind::ZeroWaves));
        // Zero waves is fine when there is nothing to allocate
        assert!(validate_instance(&[], 5, Some(0)).is_ok());
    }

    #[test]
    fn test_valid_allocation() {
        let instance = sample_instance();
        let allocation = Allocation::from_waves(&instance, &[0, 0, 1, 1]);
        assert!(validate_allocation(&instance, &allocation).is_ok());
        assert_eq!(
            resolve_allocation(&instance, &allocation).unwrap(),
            vec![0, 0, 1, 1]
        );
    }

    #[test]
    fn test_missing_and_duplicate_carton() {
        let instance = sample_instance();
        let allocation = Allocation::new(2)
            .with_assignment("C1", 0)
            .with_assignment("C1", 1)
            .with_assignment("C2", 0)
            .with_assignment("C3", 1);
        let errors = validate_allocation(&instance, &allocation).unwrap_err();
        assert_eq!(
            kinds(&errors),
            vec![
                ValidationErrorKind::DuplicateCarton,
                ValidationErrorKind::MissingCarton
            ]
        );
        assert!(errors[1].message.contains("C4"));
    }

    #[test]
    fn test_unknown_carton_and_out_of_range_wave() {
        let instance = sample_instance();
        let mut allocation = Allocation::from_waves(&instance, &[0, 0, 1, 1]);
        allocation.add_assignment(WaveAssignment::new("ghost", 0));
        allocation.assignments[3].wave = 7;
        let errors = validate_allocation(&instance, &allocation).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| e.kind == ValidationErrorKind::UnknownCarton));
        assert!(errors
            .iter()
            .any(|e| e.kind == ValidationErrorKind::WaveOutOfRange));
        // The out-of-range carton also counts as unassigned
        assert!(errors
            .iter()
            .any(|e| e.kind == ValidationErrorKind::MissingCarton));
    }

    #[test]
    fn test_capacity_exceeded() {
        let instance = sample_instance();
        let allocation = Allocation::from_waves(&instance, &[0, 0, 0, 1]);
        let errors = validate_allocation(&instance, &allocation).unwrap_err();
        assert_eq!(kinds(&errors), vec![ValidationErrorKind::CapacityExceeded]);
    }

    #[test]
    fn test_wave_count_mismatch() {
        let instance = sample_instance();
        let mut allocation = Allocation::from_waves(&instance, &[0, 0, 1, 1]);
        allocation.wave_count = 3;
        let errors = validate_allocation(&instance, &allocation).unwrap_err();
        assert_eq!(kinds(&errors), vec![ValidationErrorKind::WaveCountMismatch]);
    }

    #[test]
    fn test_multiple_errors() {
        let cartons = vec![
            Carton::new("C1"),
            Carton::new("C1").with_sku("A").with_weight(9),
        ];
        let errors = validate_instance(&cartons, 4, None).unwrap_err();
        assert!(errors.len() >= 3);
    }
}
