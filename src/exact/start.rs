//! Starting allocation for the branch-and-bound search.
//!
//! First-fit decreasing by weight: each carton goes to the first wave with
//! room that already holds one of its SKUs, else to the first wave with
//! room. If that packing fails, plain first-fit decreasing is tried. Waves
//! are then relabeled in order of their lowest carton, so carton `b` sits in
//! a wave `≤ b` and the point respects the symmetry-breaking bounds.
//!
//! First-fit can fail on instances that do have a feasible packing; the
//! search then starts without an incumbent.

use std::cmp::Reverse;

use crate::models::ProblemInstance;

/// Wave per carton (input order), or `None` if first-fit found no packing.
pub(crate) fn packing_start(instance: &ProblemInstance) -> Option<Vec<usize>> {
    let mut order: Vec<usize> = (0..instance.carton_count()).collect();
    order.sort_by_key(|&b| (Reverse(instance.weight(b)), b));

    first_fit(instance, &order, true)
        .or_else(|| first_fit(instance, &order, false))
        .map(relabel)
}

fn first_fit(instance: &ProblemInstance, order: &[usize], share_skus: bool) -> Option<Vec<usize>> {
    let k = instance.wave_count();
    let sku_count = instance.sku_count();
    let mut loads = vec![0u64; k];
    let mut present = vec![false; k * sku_count];
    let mut waves = vec![0; instance.carton_count()];

    for &b in order {
        let weight = instance.weight(b);
        let skus = instance.carton_skus(b);
        let room: Vec<usize> = (0..k)
            .filter(|&w| loads[w].saturating_add(weight) <= instance.capacity())
            .collect();
        let sharing = room
            .iter()
            .copied()
            .find(|&w| share_skus && skus.iter().any(|&s| present[w * sku_count + s]));
        let wave = sharing.or_else(|| room.first().copied())?;

        waves[b] = wave;
        loads[wave] += weight;
        for &s in skus {
            present[wave * sku_count + s] = true;
        }
    }
    Some(waves)
}

/// Renumbers waves by first appearance in input order.
fn relabel(waves: Vec<usize>) -> Vec<usize> {
    let mut labels: Vec<Option<usize>> = vec![None; waves.iter().max().map_or(0, |&w| w + 1)];
    let mut next = 0;
    waves
        .into_iter()
        .map(|w| {
            *labels[w].get_or_insert_with(|| {
                next += 1;
                next - 1
            })
        })
        .collect()
}
