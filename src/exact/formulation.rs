//! Integer programming formulations of wave allocation.
//!
//! # Variables
//!
//! - `x[b,w] ∈ {0,1}`: carton `b` is placed in wave `w`
//! - `y[s,w] ∈ {0,1}`: SKU `s` is present in wave `w`
//!
//! # Constraints
//!
//! | Rows | Count | Form |
//! |------|-------|------|
//! | Assignment | n | `Σ_w x[b,w] = 1` |
//! | Capacity | K | `Σ_b weight(b)·x[b,w] ≤ C` |
//! | Linking, per carton (A) | Σ_b \|skus(b)\|·K | `x[b,w] − y[s,w] ≤ 0` |
//! | Linking, aggregated (B) | \|S\|·K | `Σ_{b∋s} x[b,w] − n_s·y[s,w] ≤ 0` |
//!
//! Objective: `min Σ_{s,w} y[s,w] − |S|`, the fragmentation score.
//!
//! The aggregated row is the per-carton family summed over the `n_s`
//! cartons that carry `s`: fewer rows, weaker LP relaxation. Both variants
//! have the same integer optimum.
//!
//! # Symmetry Breaking
//!
//! Waves are interchangeable, so any allocation can be relabeled so that
//! waves are numbered in order of their lowest carton. Then carton `b` sits
//! in a wave `≤ b`, and `x[b,w]` is fixed to 0 for `w > b`.

use serde::{Deserialize, Serialize};

use super::{MilpModel, RowSense};
use crate::models::ProblemInstance;

/// Branching class of assignment columns.
const ASSIGN_PRIORITY: u8 = 0;
/// Branching class of presence columns.
const PRESENCE_PRIORITY: u8 = 1;

/// How SKU presence is linked to carton assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LinkingMode {
    /// Variant A: one row per (carton, SKU, wave).
    PerCarton,
    /// Variant B: one row per (SKU, wave).
    Aggregated,
}

/// A MILP built from an instance, with the column index of every variable.
#[derive(Debug, Clone)]
pub struct WaveFormulation {
    model: MilpModel,
    linking: LinkingMode,
    wave_count: usize,
    /// `assign[b * K + w]` = column of `x[b,w]`.
    assign: Vec<usize>,
    /// `presence[s * K + w]` = column of `y[s,w]`.
    presence: Vec<usize>,
}

impl WaveFormulation {
    /// Builds the formulation.
    pub fn build(instance: &ProblemInstance, linking: LinkingMode, symmetry_breaking: bool) -> Self {
        let n = instance.carton_count();
        let k = instance.wave_count();
        let sku_count = instance.sku_count();
        let mut model = MilpModel::new();

        let mut assign = Vec::with_capacity(n * k);
        for b in 0..n {
            for w in 0..k {
                let col = model.add_binary(format!("x[{b},{w}]"), 0.0, ASSIGN_PRIORITY);
                if symmetry_breaking && w > b {
                    model.set_upper(col, 0.0);
                }
                assign.push(col);
            }
        }

        let mut presence = Vec::with_capacity(sku_count * k);
        for s in 0..sku_count {
            for w in 0..k {
                presence.push(model.add_binary(format!("y[{s},{w}]"), 1.0, PRESENCE_PRIORITY));
            }
        }
        model.set_objective_offset(-(sku_count as f64));

        for b in 0..n {
            let terms = (0..k).map(|w| (assign[b * k + w], 1.0)).collect();
            model.add_row(format!("assign[{b}]"), terms, RowSense::Eq, 1.0);
        }

        for w in 0..k {
            let terms = (0..n)
                .map(|b| (assign[b * k + w], instance.weight(b) as f64))
                .collect();
            model.add_row(format!("cap[{w}]"), terms, RowSense::Le, instance.capacity() as f64);
        }

        match linking {
            LinkingMode::PerCarton => {
                for b in 0..n {
                    for &s in instance.carton_skus(b) {
                        for w in 0..k {
                            model.add_row(
                                format!("link[{b},{s},{w}]"),
                                vec![(assign[b * k + w], 1.0), (presence[s * k + w], -1.0)],
                                RowSense::Le,
                                0.0,
                            );
                        }
                    }
                }
            }
            LinkingMode::Aggregated => {
                for s in 0..sku_count {
                    let cartons = instance.sku_cartons(s);
                    for w in 0..k {
                        let mut terms: Vec<(usize, f64)> =
                            cartons.iter().map(|&b| (assign[b * k + w], 1.0)).collect();
                        terms.push((presence[s * k + w], -(cartons.len() as f64)));
                        model.add_row(format!("link[{s},{w}]"), terms, RowSense::Le, 0.0);
                    }
                }
            }
        }

        Self {
            model,
            linking,
            wave_count: k,
            assign,
            presence,
        }
    }

    /// The underlying model.
    pub fn model(&self) -> &MilpModel {
        &self.model
    }

    /// Linking mode used.
    pub fn linking(&self) -> LinkingMode {
        self.linking
    }

    /// Column of `x[carton, wave]`.
    pub fn assign_column(&self, carton: usize, wave: usize) -> usize {
        self.assign[carton * self.wave_count + wave]
    }

    /// Column of `y[sku, wave]`.
    pub fn presence_column(&self, sku: usize, wave: usize) -> usize {
        self.presence[sku * self.wave_count + wave]
    }

    /// Integral point of an allocation: `x` from the waves, `y` from the SKU
    /// footprints. Every wave index must be below `K`.
    pub(crate) fn encode(&self, instance: &ProblemInstance, waves: &[usize]) -> Vec<f64> {
        let mut values = vec![0.0; self.model.column_count()];
        for (b, &w) in waves.iter().enumerate() {
            values[self.assign_column(b, w)] = 1.0;
            for &s in instance.carton_skus(b) {
                values[self.presence_column(s, w)] = 1.0;
            }
        }
        values
    }

    /// Wave of every carton from an integral point. `None` if some carton
    /// has no assignment column set.
    pub fn decode(&self, values: &[f64]) -> Option<Vec<usize>> {
        self.assign
            .chunks(self.wave_count.max(1))
            .map(|cols| cols.iter().position(|&c| values[c] > 0.5))
            .collect()
    }
}
