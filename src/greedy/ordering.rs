//! Carton ordering strategies for the placement stage.
//!
//! # Strategies
//!
//! | Strategy | Order |
//! |----------|-------|
//! | `InputOrder` | Cartons as given |
//! | `SkuPopularity` | Cartons grouped by their most shared SKU, most shared first |
//!
//! Orderings are pure functions of the instance, so a variant always places
//! cartons in the same sequence.

use std::cmp::Reverse;
use std::fmt::Debug;

use crate::models::ProblemInstance;

/// A strategy that decides in which order cartons are placed.
pub trait CartonOrdering: Send + Sync + Debug {
    /// Strategy name (e.g., "INPUT", "POPULARITY").
    fn name(&self) -> &'static str;

    /// Carton indices in placement order. Must be a permutation of `0..n`.
    fn order(&self, instance: &ProblemInstance) -> Vec<usize>;

    /// Strategy description.
    fn description(&self) -> &'static str {
        self.name()
    }
}

/// Places cartons in input order.
#[derive(Debug, Clone, Copy, Default)]
pub struct InputOrder;

impl CartonOrdering for InputOrder {
    fn name(&self) -> &'static str {
        "INPUT"
    }

    fn order(&self, instance: &ProblemInstance) -> Vec<usize> {
        (0..instance.carton_count()).collect()
    }

    fn description(&self) -> &'static str {
        "Input order"
    }
}

/// Places cartons that share popular SKUs next to each other.
///
/// With `pop(s)` the number of cartons carrying SKU `s`, each carton is
/// anchored on its most popular SKU (lowest SKU index on ties). Cartons are
/// sorted by:
/// 1. descending `pop(anchor)`
/// 2. anchor SKU index
/// 3. descending naive spread `Σ_s (min(pop(s), K) − 1)`, the number of
///    extra waves its SKUs would touch if their cartons were scattered
/// 4. input index
///
/// Cartons anchored on the same SKU therefore arrive consecutively and the
/// placement stage tends to pack them into one wave. The naive spread is
/// not the primary key: it only orders cartons within one anchor group.
#[derive(Debug, Clone, Copy, Default)]
pub struct SkuPopularity;

impl CartonOrdering for SkuPopularity {
    fn name(&self) -> &'static str {
        "POPULARITY"
    }

    fn order(&self, instance: &ProblemInstance) -> Vec<usize> {
        let k = instance.wave_count();
        let popularity: Vec<usize> = (0..instance.sku_count())
            .map(|s| instance.sku_cartons(s).len())
            .collect();

        let mut keyed: Vec<_> = (0..instance.carton_count())
            .map(|c| {
                let skus = instance.carton_skus(c);
                let (anchor_pop, anchor) = skus
                    .iter()
                    .map(|&s| (popularity[s], s))
                    .min_by_key(|&(pop, s)| (Reverse(pop), s))
                    .unwrap_or((0, usize::MAX));
                let spread: usize = skus
                    .iter()
                    .map(|&s| popularity[s].min(k).saturating_sub(1))
                    .sum();
                ((Reverse(anchor_pop), anchor, Reverse(spread), c), c)
            })
            .collect();

        keyed.sort_unstable();
        keyed.into_iter().map(|(_, c)| c).collect()
    }

    fn description(&self) -> &'static str {
        "SKU popularity clusters"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Carton;

    fn scenario() -> ProblemInstance {
        ProblemInstance::with_wave_count(
            vec![
                Carton::new("box1").with_sku("A"),
                Carton::new("box2").with_skus(["A", "B"]),
                Carton::new("box3").with_skus(["B", "C"]),
                Carton::new("box4").with_sku("C"),
            ],
            2,
            2,
        )
        .unwrap()
    }

    #[test]
    fn test_input_order() {
        assert_eq!(InputOrder.order(&scenario()), vec![0, 1, 2, 3]);
        assert_eq!(InputOrder.name(), "INPUT");
    }

    #[test]
    fn test_popularity_breaks_ties_by_spread() {
        // All SKUs have popularity 2; box2 anchors on A and spreads more than box1
        assert_eq!(SkuPopularity.order(&scenario()), vec![1, 0, 2, 3]);
    }

    #[test]
    fn test_anchor_popularity_outranks_spread() {
        let instance = ProblemInstance::with_wave_count(
            vec![
                Carton::new("c0").with_sku("X"),
                Carton::new("c1").with_sku("X"),
                Carton::new("c2").with_skus(["A", "B", "C"]),
                Carton::new("c3").with_sku("X"),
                Carton::new("c4").with_sku("A"),
                Carton::new("c5").with_sku("B"),
                Carton::new("c6").with_sku("C"),
            ],
            2,
            6,
        )
        .unwrap();
        // c2 spreads over 3 extra waves, the X cartons over 2, yet the X
        // group comes first
        assert_eq!(SkuPopularity.order(&instance), vec![0, 1, 3, 2, 4, 5, 6]);
    }

    #[test]
    fn test_popularity_groups_shared_sku() {
        let instance = ProblemInstance::with_wave_count(
            vec![
                Carton::new("b0").with_sku("D"),
                Carton::new("b1").with_sku("C"),
                Carton::new("b2").with_skus(["A", "B"]),
                Carton::new("b3").with_sku("D"),
            ],
            2,
            2,
        )
        .unwrap();
        assert_eq!(SkuPopularity.order(&instance), vec![0, 3, 1, 2]);
    }

    #[test]
    fn test_popularity_is_permutation() {
        let instance = ProblemInstance::new(
            (0..12)
                .map(|i| {
                    Carton::new(format!("C{i}"))
                        .with_sku(format!("S{}", i % 5))
                        .with_sku(format!("S{}", i % 3))
                })
                .collect(),
            4,
        )
        .unwrap();
        let mut order = SkuPopularity.order(&instance);
        order.sort_unstable();
        assert_eq!(order, (0..12).collect::<Vec<_>>());
    }
}
