//! SKU spread (fragmentation) evaluation.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::error::WaveError;
use crate::models::{Allocation, ProblemInstance};
use crate::validation::resolve_allocation;

/// Per-SKU diagnostic breakdown of an allocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpreadReport {
    /// Fragmentation score.
    pub score: u64,
    /// SKU id → waves holding the SKU.
    pub footprints: BTreeMap<String, BTreeSet<usize>>,
}

impl SpreadReport {
    /// SKUs whose footprint spans more than one wave.
    pub fn fragmented_skus(&self) -> Vec<&str> {
        self.footprints
            .iter()
            .filter(|(_, waves)| waves.len() > 1)
            .map(|(sku, _)| sku.as_str())
            .collect()
    }

    /// Size of the widest footprint (0 when there are no SKUs).
    pub fn widest_footprint(&self) -> usize {
        self.footprints.values().map(BTreeSet::len).max().unwrap_or(0)
    }
}

/// Scores allocations of one instance.
///
/// Every call checks the allocation first and fails with
/// `WaveError::InvalidAllocation` on a missing, duplicated or unknown carton,
/// an out-of-range wave, or an overloaded wave.
#[derive(Debug, Clone, Copy)]
pub struct SpreadEvaluator<'a> {
    instance: &'a ProblemInstance,
}

impl<'a> SpreadEvaluator<'a> {
    /// Creates an evaluator bound to an instance.
    pub fn new(instance: &'a ProblemInstance) -> Self {
        Self { instance }
    }

    /// Fragmentation score `Σ_s (|footprint(s)| − 1)`.
    ///
    /// # Errors
    /// `WaveError::InvalidAllocation` if the allocation is not valid.
    pub fn fragmentation(&self, allocation: &Allocation) -> Result<u64, WaveError> {
        let waves = self.resolve(allocation)?;
        Ok(fragmentation_of(self.instance, &waves))
    }

    /// Score plus the footprint of every SKU.
    ///
    /// # Errors
    /// `WaveError::InvalidAllocation` if the allocation is not valid.
    pub fn breakdown(&self, allocation: &Allocation) -> Result<SpreadReport, WaveError> {
        let waves = self.resolve(allocation)?;
        let footprints: BTreeMap<String, BTreeSet<usize>> = (0..self.instance.sku_count())
            .map(|s| {
                let set = self
                    .instance
                    .sku_cartons(s)
                    .iter()
                    .map(|&c| waves[c])
                    .collect();
                (self.instance.sku(s).to_string(), set)
            })
            .collect();
        let score = footprints
            .values()
            .map(|set| set.len().saturating_sub(1) as u64)
            .sum();
        Ok(SpreadReport { score, footprints })
    }

    fn resolve(&self, allocation: &Allocation) -> Result<Vec<usize>, WaveError> {
        resolve_allocation(self.instance, allocation).map_err(WaveError::InvalidAllocation)
    }
}

/// Fragmentation of a per-carton wave vector (input order), without checks.
pub(crate) fn fragmentation_of(instance: &ProblemInstance, waves: &[usize]) -> u64 {
    let mut seen = vec![false; instance.wave_count()];
    let mut total = 0u64;
    for s in 0..instance.sku_count() {
        seen.iter_mut().for_each(|flag| *flag = false);
        let mut distinct = 0u64;
        for &c in instance.sku_cartons(s) {
            let w = waves[c];
            if !seen[w] {
                seen[w] = true;
                distinct += 1;
            }
        }
        total += distinct.saturating_sub(1);
    }
    total
}
