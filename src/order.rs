//! Ordering of SRV records per [RFC 2782](https://tools.ietf.org/html/rfc2782).
//!
//! Records are grouped into tiers of equal priority, lowest first. Inside a
//! tier, records are drawn one at a time with probability proportional to
//! their weight among the records not drawn yet. Once only zero-weight
//! records remain they are appended in uniformly random order, so a
//! zero-weight record never precedes a weighted one of the same priority.

use crate::SrvRecord;
use rand::{seq::SliceRandom, Rng};

/// Produces a weighted random permutation of `0..weights.len()`.
///
/// Each step picks one of the remaining indices with probability
/// `weight / remaining_total`. When the remaining total is zero, the rest of
/// the indices are shuffled uniformly.
pub fn weighted_permutation<R: Rng>(weights: &[u16], rng: &mut R) -> Vec<usize> {
    let mut remaining: Vec<usize> = (0..weights.len()).collect();
    let mut order = Vec::with_capacity(weights.len());
    let mut total: u64 = weights.iter().map(|&w| u64::from(w)).sum();

    while total > 0 && remaining.len() > 1 {
        let pick = rng.random_range(0..total);
        let mut running = 0;
        let position = remaining
            .iter()
            .position(|&i| {
                running += u64::from(weights[i]);
                running > pick
            })
            .unwrap_or(remaining.len() - 1);

        let chosen = remaining.remove(position);
        total -= u64::from(weights[chosen]);
        order.push(chosen);
    }

    remaining.shuffle(rng);
    order.extend(remaining);
    order
}

/// Orders SRV records by ascending priority, shuffling each priority tier by
/// weight.
///
/// No record is dropped or duplicated; only relative positions within a tier
/// are randomized.
pub fn order_srv_records<T: SrvRecord, R: Rng>(records: Vec<T>, rng: &mut R) -> Vec<T> {
    let mut records = records;
    // Stable, so the pre-shuffle order inside a tier is deterministic.
    records.sort_by_key(|record| (record.priority(), record.weight()));

    let mut ordered = Vec::with_capacity(records.len());
    let mut records = records.into_iter().peekable();
    while let Some(first) = records.next() {
        let priority = first.priority();
        let mut tier = vec![first];
        while let Some(next) = records.next_if(|record| record.priority() == priority) {
            tier.push(next);
        }
        shuffle_tier(tier, rng, &mut ordered);
    }

    ordered
}

fn shuffle_tier<T: SrvRecord, R: Rng>(tier: Vec<T>, rng: &mut R, out: &mut Vec<T>) {
    if tier.len() == 1 {
        out.extend(tier);
        return;
    }

    let weights: Vec<u16> = tier.iter().map(|record| record.weight()).collect();
    let permutation = weighted_permutation(&weights, rng);

    let mut slots: Vec<Option<T>> = tier.into_iter().map(Some).collect();
    out.extend(permutation.into_iter().filter_map(|i| slots[i].take()));
}
