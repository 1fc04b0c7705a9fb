//! Seeded random instance generator.
//!
//! Produces reproducible instances for property tests and solver
//! comparisons. The same configuration and seed always yield the same
//! sequence of instances.

use rand::prelude::*;
use rand::seq::index;
use serde::{Deserialize, Serialize};

use crate::error::WaveError;
use crate::models::{Carton, ProblemInstance};

/// Shape of generated instances.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// Number of cartons.
    pub carton_count: usize,
    /// Size of the SKU pool.
    pub sku_count: usize,
    /// Distinct SKUs per carton, inclusive range.
    pub skus_per_carton: (usize, usize),
    /// Carton weights are drawn from `1..=max_weight` (capped at capacity).
    pub max_weight: u64,
    /// Wave capacity.
    pub capacity: u64,
    /// Fixed wave count, or `None` for the minimal count.
    pub wave_count: Option<usize>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            carton_count: 20,
            sku_count: 10,
            skus_per_carton: (1, 3),
            max_weight: 1,
            capacity: 5,
            wave_count: None,
        }
    }
}

/// Generator for synthetic wave allocation instances.
#[derive(Debug, Clone)]
pub struct InstanceGenerator {
    config: GeneratorConfig,
    rng: StdRng,
}

impl InstanceGenerator {
    /// Creates a generator with a specific seed for reproducibility.
    pub fn new(config: GeneratorConfig, seed: u64) -> Self {
        Self {
            config,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// The configuration.
    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Generates the next instance.
    ///
    /// # Errors
    /// `WaveError::InvalidInstance` when the configuration cannot produce a
    /// valid instance (e.g., an empty SKU pool or zero capacity).
    pub fn generate(&mut self) -> Result<ProblemInstance, WaveError> {
        let cfg = &self.config;
        let pool = cfg.sku_count;
        let lo = cfg.skus_per_carton.0.max(1).min(pool);
        let hi = cfg.skus_per_carton.1.max(lo).min(pool);
        let max_weight = cfg.max_weight.max(1).min(cfg.capacity.max(1));

        let mut cartons = Vec::with_capacity(cfg.carton_count);
        for i in 0..cfg.carton_count {
            let mut carton = Carton::new(format!("C{i:04}"));
            let count = if pool == 0 {
                0
            } else {
                self.rng.random_range(lo..=hi)
            };
            let mut picked = index::sample(&mut self.rng, pool, count).into_vec();
            picked.sort_unstable();
            for s in picked {
                let quantity = self.rng.random_range(1..=3);
                carton = carton.with_item(format!("S{s:03}"), quantity);
            }
            carton.weight = self.rng.random_range(1..=max_weight);
            cartons.push(carton);
        }

        match cfg.wave_count {
            Some(k) => ProblemInstance::with_wave_count(cartons, cfg.capacity, k),
            None => ProblemInstance::new(cartons, cfg.capacity),
        }
    }
}
