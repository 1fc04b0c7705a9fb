//! Carton (box) model.
//!
//! A carton is the unit assigned to a wave. It holds items of one or more
//! SKUs and consumes a positive integer weight against wave capacity.
//!
//! # Weight Model
//! By default one carton consumes one unit of capacity. Operations that
//! measure wave load in pieces use [`Carton::weighted_by_quantity`], which
//! sets the weight to the total item quantity in the carton.

use serde::{Deserialize, Serialize};

/// A quantity of one SKU stored in a carton.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartonItem {
    /// SKU identifier.
    pub sku: String,
    /// Number of pieces (at least 1).
    pub quantity: u64,
}

/// A carton (box) to be allocated to a wave.
///
/// Named `Carton` rather than `Box` to keep `std::boxed::Box` unambiguous.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Carton {
    /// Unique carton identifier.
    pub id: String,
    /// Items stored in the carton. The same SKU may appear in several lines.
    pub items: Vec<CartonItem>,
    /// Capacity consumed in a wave (default: 1).
    pub weight: u64,
}

impl Carton {
    /// Creates an empty carton with weight 1.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            items: Vec::new(),
            weight: 1,
        }
    }

    /// Adds a single piece of the given SKU.
    pub fn with_sku(self, sku: impl Into<String>) -> Self {
        self.with_item(sku, 1)
    }

    /// Adds several SKUs, one piece each.
    pub fn with_skus<I, S>(self, skus: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        skus.into_iter().fold(self, |carton, sku| carton.with_sku(sku))
    }

    /// Adds `quantity` pieces of the given SKU.
    pub fn with_item(mut self, sku: impl Into<String>, quantity: u64) -> Self {
        self.items.push(CartonItem {
            sku: sku.into(),
            quantity,
        });
        self
    }

    /// Sets the capacity weight.
    pub fn with_weight(mut self, weight: u64) -> Self {
        self.weight = weight;
        self
    }

    /// Sets the weight to the total number of pieces in the carton.
    pub fn weighted_by_quantity(mut self) -> Self {
        self.weight = self.total_quantity();
        self
    }

    /// Total pieces across all items.
    pub fn total_quantity(&self) -> u64 {
        self.items.iter().map(|item| item.quantity).sum()
    }

    /// Distinct SKU identifiers, in first-appearance order.
    pub fn skus(&self) -> Vec<&str> {
        let mut skus: Vec<&str> = Vec::with_capacity(self.items.len());
        for item in &self.items {
            if !skus.contains(&item.sku.as_str()) {
                skus.push(&item.sku);
            }
        }
        skus
    }

    /// Whether the carton holds any piece of `sku`.
    pub fn contains_sku(&self, sku: &str) -> bool {
        self.items.iter().any(|item| item.sku == sku)
    }

    /// Pieces of `sku` in this carton.
    pub fn quantity_of(&self, sku: &str) -> u64 {
        self.items
            .iter()
            .filter(|item| item.sku == sku)
            .map(|item| item.quantity)
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_carton_builder() {
        let c = Carton::new("C1").with_sku("A").with_item("B", 3);
        assert_eq!(c.id, "C1");
        assert_eq!(c.items.len(), 2);
        assert_eq!(c.weight, 1);
        assert_eq!(c.total_quantity(), 4);
    }

    #[test]
    fn test_distinct_skus_keep_order() {
        let c = Carton::new("C1")
            .with_item("B", 2)
            .with_sku("A")
            .with_item("B", 1);
        assert_eq!(c.skus(), vec!["B", "A"]);
        assert_eq!(c.quantity_of("B"), 3);
        assert!(c.contains_sku("A"));
        assert!(!c.contains_sku("Z"));
    }

    #[test]
    fn test_weighted_by_quantity() {
        let c = Carton::new("C1")
            .with_item("A", 5)
            .with_item("B", 7)
            .weighted_by_quantity();
        assert_eq!(c.weight, 12);
    }

    #[test]
    fn test_with_skus() {
        let c = Carton::new("C1").with_skus(["A", "B", "C"]).with_weight(4);
        assert_eq!(c.skus(), vec!["A", "B", "C"]);
        assert_eq!(c.weight, 4);
    }
}
