//! Problem instance model.
//!
//! The instance is the immutable input shared by every solver: cartons,
//! the per-wave capacity `C`, and the number of waves `K`. On construction
//! the input is validated and SKU identifiers are interned so that solvers
//! work on dense indices.
//!
//! # Indexing
//! - Carton index = position in the input sequence.
//! - SKU index = order of first appearance when scanning cartons in input order.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::Carton;
use crate::error::WaveError;
use crate::validation::validate_instance;

/// Wave capacity used by the original picking operation (pieces per wave).
pub const DEFAULT_WAVE_CAPACITY: u64 = 2000;

/// Raw, unvalidated instance data (serialization form).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstanceData {
    /// Cartons in input order.
    pub cartons: Vec<Carton>,
    /// Capacity of every wave.
    pub capacity: u64,
    /// Fixed number of waves. `None` = minimal count for the total weight.
    #[serde(default)]
    pub wave_count: Option<usize>,
}

/// A validated wave allocation problem.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "InstanceData", into = "InstanceData")]
pub struct ProblemInstance {
    cartons: Vec<Carton>,
    capacity: u64,
    requested_waves: Option<usize>,
    wave_count: usize,
    total_weight: u64,
    skus: Vec<String>,
    carton_skus: Vec<Vec<usize>>,
    sku_cartons: Vec<Vec<usize>>,
    index_by_id: HashMap<String, usize>,
}

impl ProblemInstance {
    /// Builds an instance that uses the minimal wave count `⌈Σ weight / C⌉`.
    ///
    /// # Errors
    /// `WaveError::InvalidInstance` listing every problem found.
    pub fn new(cartons: Vec<Carton>, capacity: u64) -> Result<Self, WaveError> {
        Self::build(cartons, capacity, None)
    }

    /// Builds an instance with a fixed number of waves.
    ///
    /// # Errors
    /// `WaveError::InvalidInstance` listing every problem found.
    pub fn with_wave_count(
        cartons: Vec<Carton>,
        capacity: u64,
        wave_count: usize,
    ) -> Result<Self, WaveError> {
        Self::build(cartons, capacity, Some(wave_count))
    }

    fn build(
        cartons: Vec<Carton>,
        capacity: u64,
        requested_waves: Option<usize>,
    ) -> Result<Self, WaveError> {
        validate_instance(&cartons, capacity, requested_waves)
            .map_err(WaveError::InvalidInstance)?;

        let mut sku_index: HashMap<&str, usize> = HashMap::new();
        let mut skus: Vec<String> = Vec::new();
        let mut carton_skus: Vec<Vec<usize>> = Vec::with_capacity(cartons.len());

        for carton in &cartons {
            let mut indices: Vec<usize> = carton
                .skus()
                .into_iter()
                .map(|sku| {
                    *sku_index.entry(sku).or_insert_with(|| {
                        skus.push(sku.to_string());
                        skus.len() - 1
                    })
                })
                .collect();
            indices.sort_unstable();
            carton_skus.push(indices);
        }

        let mut sku_cartons: Vec<Vec<usize>> = vec![Vec::new(); skus.len()];
        for (carton, indices) in carton_skus.iter().enumerate() {
            for &s in indices {
                sku_cartons[s].push(carton);
            }
        }

        let index_by_id = cartons
            .iter()
            .enumerate()
            .map(|(i, c)| (c.id.clone(), i))
            .collect();

        // Validation rejects totals beyond u64.
        let total_weight = cartons.iter().fold(0u64, |t, c| t.saturating_add(c.weight));
        let wave_count =
            requested_waves.unwrap_or_else(|| minimal_wave_count(total_weight, capacity));

        Ok(Self {
            cartons,
            capacity,
            requested_waves,
            wave_count,
            total_weight,
            skus,
            carton_skus,
            sku_cartons,
            index_by_id,
        })
    }

    /// Cartons in input order.
    pub fn cartons(&self) -> &[Carton] {
        &self.cartons
    }

    /// Carton at input position `index`.
    pub fn carton(&self, index: usize) -> &Carton {
        &self.cartons[index]
    }

    /// Number of cartons.
    pub fn carton_count(&self) -> usize {
        self.cartons.len()
    }

    /// Per-wave capacity `C`.
    pub fn capacity(&self) -> u64 {
        self.capacity
    }

    /// Number of waves `K` used by solvers.
    pub fn wave_count(&self) -> usize {
        self.wave_count
    }

    /// The wave count given at construction, if any.
    pub fn requested_wave_count(&self) -> Option<usize> {
        self.requested_waves
    }

    /// Weight of the carton at `index`.
    #[inline]
    pub fn weight(&self, index: usize) -> u64 {
        self.cartons[index].weight
    }

    /// Total weight over all cartons.
    pub fn total_weight(&self) -> u64 {
        self.total_weight
    }

    /// Number of distinct SKUs.
    pub fn sku_count(&self) -> usize {
        self.skus.len()
    }

    /// Interned SKU identifiers, by SKU index.
    pub fn skus(&self) -> &[String] {
        &self.skus
    }

    /// SKU identifier for an SKU index.
    pub fn sku(&self, index: usize) -> &str {
        &self.skus[index]
    }

    /// Sorted distinct SKU indices carried by a carton.
    #[inline]
    pub fn carton_skus(&self, carton: usize) -> &[usize] {
        &self.carton_skus[carton]
    }

    /// Ascending carton indices that carry an SKU.
    #[inline]
    pub fn sku_cartons(&self, sku: usize) -> &[usize] {
        &self.sku_cartons[sku]
    }

    /// Input position of a carton by identifier.
    pub fn carton_index(&self, carton_id: &str) -> Option<usize> {
        self.index_by_id.get(carton_id).copied()
    }

    /// Largest carton weight (0 for an empty instance).
    pub fn max_weight(&self) -> u64 {
        self.cartons.iter().map(|c| c.weight).max().unwrap_or(0)
    }
}

impl TryFrom<InstanceData> for ProblemInstance {
    type Error = WaveError;

    fn try_from(data: InstanceData) -> Result<Self, Self::Error> {
        Self::build(data.cartons, data.capacity, data.wave_count)
    }
}

impl From<ProblemInstance> for InstanceData {
    fn from(instance: ProblemInstance) -> Self {
        Self {
            cartons: instance.cartons,
            capacity: instance.capacity,
            wave_count: instance.requested_waves,
        }
    }
}

/// Smallest `K` with `K · capacity ≥ total_weight`.
///
/// Returns 0 when there is nothing to allocate.
pub fn minimal_wave_count(total_weight: u64, capacity: u64) -> usize {
    if capacity == 0 {
        return 0;
    }
    total_weight.div_ceil(capacity) as usize
}
