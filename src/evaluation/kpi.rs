//! Wave plan quality metrics (KPIs).
//!
//! Computes the indicators reported for a finished wave plan.
//!
//! # Metrics
//!
//! | Metric | Definition |
//! |--------|-----------|
//! | Waves | `K`, the number of waves in the plan |
//! | Used waves | Waves holding at least one carton |
//! | Usage ratio | load(w) / C, summarized as mean, median, min, max over all `K` waves |
//! | Fragmentation | Σ_s (\|footprint(s)\| − 1) |
//! | Fragmented SKUs | SKUs picked in more than one wave |
//! | Widest footprint | Largest number of waves a single SKU spans |

use crate::error::WaveError;
use crate::models::{Allocation, ProblemInstance};

use super::SpreadEvaluator;

/// Wave plan performance indicators.
#[derive(Debug, Clone, PartialEq)]
pub struct WaveKpi {
    /// Number of waves `K`.
    pub wave_count: usize,
    /// Waves holding at least one carton.
    pub used_waves: usize,
    /// Mean load / capacity over all waves (0.0..=1.0).
    pub mean_usage: f64,
    /// Median load / capacity.
    pub median_usage: f64,
    /// Lowest load / capacity.
    pub min_usage: f64,
    /// Highest load / capacity.
    pub max_usage: f64,
    /// Fragmentation score.
    pub fragmentation: u64,
    /// Number of SKUs spread over more than one wave.
    pub fragmented_skus: usize,
    /// Widest SKU footprint, in waves.
    pub widest_footprint: usize,
}

impl WaveKpi {
    /// Computes KPIs for an allocation.
    ///
    /// # Errors
    /// `WaveError::InvalidAllocation` if the allocation is not valid for the instance.
    pub fn calculate(instance: &ProblemInstance, allocation: &Allocation) -> Result<Self, WaveError> {
        let report = SpreadEvaluator::new(instance).breakdown(allocation)?;

        let capacity = instance.capacity() as f64;
        let mut usage: Vec<f64> = allocation
            .wave_loads(instance)
            .into_iter()
            .map(|load| load as f64 / capacity)
            .collect();
        usage.sort_by(f64::total_cmp);

        let (mean_usage, median_usage, min_usage, max_usage) = if usage.is_empty() {
            (0.0, 0.0, 0.0, 0.0)
        } else {
            let mean = usage.iter().sum::<f64>() / usage.len() as f64;
            let mid = usage.len() / 2;
            let median = if usage.len() % 2 == 0 {
                (usage[mid - 1] + usage[mid]) / 2.0
            } else {
                usage[mid]
            };
            (mean, median, usage[0], usage[usage.len() - 1])
        };

        Ok(Self {
            wave_count: allocation.wave_count,
            used_waves: allocation.used_wave_count(),
            mean_usage,
            median_usage,
            min_usage,
            max_usage,
            fragmentation: report.score,
            fragmented_skus: report.fragmented_skus().len(),
            widest_footprint: report.widest_footprint(),
        })
    }

    /// Whether the plan meets the given quality thresholds.
    pub fn meets_thresholds(&self, max_fragmentation: u64, min_mean_usage: f64) -> bool {
        self.fragmentation <= max_fragmentation && self.mean_usage >= min_mean_usage
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Carton;

    fn instance() -> ProblemInstance {
        ProblemInstance::with_wave_count(
            vec![
                Carton::new("C1").with_sku("A").with_weight(4),
                Carton::new("C2").with_skus(["A", "B"]).with_weight(2),
                Carton::new("C3").with_sku("B").with_weight(3),
                Carton::new("C4").with_sku("C").with_weight(1),
            ],
            5,
            3,
        )
        .unwrap()
    }

    #[test]
    fn test_kpi_basic() {
        let instance = instance();
        // loads: [4, 5, 1] of 5
        let allocation = Allocation::from_waves(&instance, &[0, 1, 1, 2]);
        let kpi = WaveKpi::calculate(&instance, &allocation).unwrap();

        assert_eq!(kpi.wave_count, 3);
        assert_eq!(kpi.used_waves, 3);
        assert!((kpi.mean_usage - 10.0 / 15.0).abs() < 1e-10);
        assert!((kpi.median_usage - 0.8).abs() < 1e-10);
        assert!((kpi.min_usage - 0.2).abs() < 1e-10);
        assert!((kpi.max_usage - 1.0).abs() < 1e-10);
        assert_eq!(kpi.fragmentation, 1);
        assert_eq!(kpi.fragmented_skus, 1);
        assert_eq!(kpi.widest_footprint, 2);
    }

    #[test]
    fn test_kpi_even_median_and_idle_wave() {
        let instance = ProblemInstance::with_wave_count(
            vec![
                Carton::new("C1").with_sku("A"),
                Carton::new("C2").with_sku("A"),
                Carton::new("C3").with_sku("B"),
            ],
            2,
            4,
        )
        .unwrap();
        // loads: [2, 1, 0, 0] of 2
        let allocation = Allocation::from_waves(&instance, &[0, 0, 1]);
        let kpi = WaveKpi::calculate(&instance, &allocation).unwrap();

        assert_eq!(kpi.used_waves, 2);
        assert!((kpi.median_usage - 0.25).abs() < 1e-10);
        assert_eq!(kpi.min_usage, 0.0);
        assert_eq!(kpi.fragmentation, 0);
        assert_eq!(kpi.widest_footprint, 1);
    }

    #[test]
    fn test_kpi_thresholds() {
        let instance = instance();
        let allocation = Allocation::from_waves(&instance, &[0, 1, 1, 2]);
        let kpi = WaveKpi::calculate(&instance, &allocation).unwrap();

        assert!(kpi.meets_thresholds(1, 0.5));
        assert!(!kpi.meets_thresholds(0, 0.5));
        assert!(!kpi.meets_thresholds(1, 0.9));
    }

    #[test]
    fn test_kpi_invalid_allocation() {
        let instance = instance();
        let allocation = Allocation::from_waves(&instance, &[0, 0, 1, 2]);
        assert!(WaveKpi::calculate(&instance, &allocation).is_err());
    }

    #[test]
    fn test_kpi_empty_plan() {
        let instance = ProblemInstance::new(Vec::new(), 10).unwrap();
        let kpi = WaveKpi::calculate(&instance, &Allocation::new(0)).unwrap();
        assert_eq!(kpi.wave_count, 0);
        assert_eq!(kpi.mean_usage, 0.0);
    }
}
