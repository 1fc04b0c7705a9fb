//! Mutable working state for greedy construction and repair.
//!
//! The board tracks, for every wave, its load, its carton count and how
//! many of its cartons carry each SKU. Those counters let placement and
//! repair evaluate a candidate move in `O(|skus(i)| + |skus(j)|)` without
//! rescoring the whole allocation.

use crate::models::{Allocation, ProblemInstance};

/// Partial or complete carton-to-wave assignment under construction.
///
/// A board is private to one solver invocation; returned allocations are
/// snapshots taken with [`WaveBoard::to_allocation`].
#[derive(Debug, Clone)]
pub struct WaveBoard<'a> {
    instance: &'a ProblemInstance,
    waves: Vec<Option<usize>>,
    loads: Vec<u64>,
    counts: Vec<usize>,
    /// `presence[w * sku_count + s]` = cartons in wave `w` carrying SKU `s`.
    presence: Vec<u32>,
}

impl<'a> WaveBoard<'a> {
    /// Creates an empty board with `instance.wave_count()` waves.
    pub fn new(instance: &'a ProblemInstance) -> Self {
        let k = instance.wave_count();
        Self {
            instance,
            waves: vec![None; instance.carton_count()],
            loads: vec![0; k],
            counts: vec![0; k],
            presence: vec![0; k * instance.sku_count()],
        }
    }

    /// The instance this board works on.
    pub fn instance(&self) -> &'a ProblemInstance {
        self.instance
    }

    /// Wave of a carton, if placed.
    pub fn wave_of(&self, carton: usize) -> Option<usize> {
        self.waves[carton]
    }

    /// Current load of a wave.
    pub fn load(&self, wave: usize) -> u64 {
        self.loads[wave]
    }

    /// Number of cartons currently in a wave.
    pub fn carton_count(&self, wave: usize) -> usize {
        self.counts[wave]
    }

    /// Whether every carton has a wave.
    pub fn is_complete(&self) -> bool {
        self.waves.iter().all(Option::is_some)
    }

    /// Whether the carton fits in the wave's residual capacity.
    pub fn fits(&self, carton: usize, wave: usize) -> bool {
        self.loads[wave].saturating_add(self.instance.weight(carton)) <= self.instance.capacity()
    }

    /// SKUs of the carton that are not yet present in the wave.
    pub fn marginal(&self, carton: usize, wave: usize) -> usize {
        self.instance
            .carton_skus(carton)
            .iter()
            .filter(|&&s| self.presence_at(wave, s) == 0)
            .count()
    }

    /// Best wave for an unplaced carton.
    ///
    /// Among waves with room, picks the smallest marginal increase, then the
    /// fewest cartons, then the lowest index. `None` if no wave has room.
    pub fn best_wave(&self, carton: usize) -> Option<usize> {
        (0..self.loads.len())
            .filter(|&w| self.fits(carton, w))
            .min_by_key(|&w| (self.marginal(carton, w), self.counts[w], w))
    }

    /// Places an unplaced carton.
    pub fn place(&mut self, carton: usize, wave: usize) {
        debug_assert!(self.waves[carton].is_none(), "carton {carton} already placed");
        self.waves[carton] = Some(wave);
        self.loads[wave] += self.instance.weight(carton);
        self.counts[wave] += 1;
        for &s in self.instance.carton_skus(carton) {
            self.presence[wave * self.instance.sku_count() + s] += 1;
        }
    }

    fn remove(&mut self, carton: usize) -> Option<usize> {
        let wave = self.waves[carton].take()?;
        self.loads[wave] -= self.instance.weight(carton);
        self.counts[wave] -= 1;
        for &s in self.instance.carton_skus(carton) {
            self.presence[wave * self.instance.sku_count() + s] -= 1;
        }
        Some(wave)
    }

    /// Moves a placed carton to another wave.
    pub fn relocate(&mut self, carton: usize, wave: usize) {
        if self.remove(carton).is_some() {
            self.place(carton, wave);
        }
    }

    /// Exchanges the waves of two placed cartons.
    pub fn swap(&mut self, i: usize, j: usize) {
        if let (Some(a), Some(b)) = (self.waves[i], self.waves[j]) {
            self.relocate(i, b);
            self.relocate(j, a);
        }
    }

    /// Whether moving a placed carton to `wave` respects capacity.
    pub fn move_fits(&self, carton: usize, wave: usize) -> bool {
        self.waves[carton] != Some(wave) && self.fits(carton, wave)
    }

    /// Whether swapping two placed cartons respects capacity on both sides.
    pub fn swap_fits(&self, i: usize, j: usize) -> bool {
        let (Some(a), Some(b)) = (self.waves[i], self.waves[j]) else {
            return false;
        };
        let (wi, wj) = (self.instance.weight(i), self.instance.weight(j));
        let cap = self.instance.capacity();
        (self.loads[a] - wi).saturating_add(wj) <= cap
            && (self.loads[b] - wj).saturating_add(wi) <= cap
    }

    /// Score change of moving a placed carton to `wave`.
    pub fn move_delta(&self, carton: usize, wave: usize) -> i64 {
        match self.waves[carton] {
            Some(from) => self.exchange_delta(from, wave, self.instance.carton_skus(carton), &[]),
            None => 0,
        }
    }

    /// Score change of swapping the waves of two placed cartons.
    pub fn swap_delta(&self, i: usize, j: usize) -> i64 {
        match (self.waves[i], self.waves[j]) {
            (Some(a), Some(b)) => self.exchange_delta(
                a,
                b,
                self.instance.carton_skus(i),
                self.instance.carton_skus(j),
            ),
            _ => 0,
        }
    }

    /// Change in fragmentation when SKUs `out_a` leave wave `a` for `b` and
    /// SKUs `out_b` leave wave `b` for `a`. Both slices are sorted.
    fn exchange_delta(&self, a: usize, b: usize, out_a: &[usize], out_b: &[usize]) -> i64 {
        if a == b {
            return 0;
        }
        let touched = out_a
            .iter()
            .chain(out_b.iter().filter(|&&s| out_a.binary_search(&s).is_err()));

        let mut delta = 0i64;
        for &s in touched {
            let leaves_a = i64::from(out_a.binary_search(&s).is_ok());
            let leaves_b = i64::from(out_b.binary_search(&s).is_ok());
            let ca = i64::from(self.presence_at(a, s));
            let cb = i64::from(self.presence_at(b, s));
            let na = ca - leaves_a + leaves_b;
            let nb = cb - leaves_b + leaves_a;
            delta += i64::from(na > 0) - i64::from(ca > 0) + i64::from(nb > 0) - i64::from(cb > 0);
        }
        delta
    }

    /// Fragmentation of the cartons placed so far.
    pub fn score(&self) -> u64 {
        let sku_count = self.instance.sku_count();
        (0..sku_count)
            .map(|s| {
                let waves = (0..self.loads.len())
                    .filter(|&w| self.presence[w * sku_count + s] > 0)
                    .count() as u64;
                waves.saturating_sub(1)
            })
            .sum()
    }

    /// Wave per carton, in input order. `None` while cartons are unplaced.
    pub fn waves(&self) -> Option<Vec<usize>> {
        self.waves.iter().copied().collect()
    }

    /// Snapshot as an allocation. `None` while cartons are unplaced.
    pub fn to_allocation(&self) -> Option<Allocation> {
        self.waves()
            .map(|waves| Allocation::from_waves(self.instance, &waves))
    }

    #[inline]
    fn presence_at(&self, wave: usize, sku: usize) -> u32 {
        self.presence[wave * self.instance.sku_count() + sku]
    }
}
