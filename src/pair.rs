//! Brute-force nearest-pair search.
//!
//! Every unordered pair `(i, j)` with `i < j` is evaluated exactly once, in
//! lexicographic index order. The winner is the pair with the smallest
//! distance; among equal distances the pair that comes first in that order
//! wins. The parallel variant reduces over `(distance, i, j)` tuples, which
//! gives the same answer as the sequential loop, ties included.
//!
//! Cost is O(N²·D). For large collections put a spatial index behind
//! [`PairFinder`] instead.

use std::collections::BinaryHeap;

use ordered_float::OrderedFloat;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{PairError, PairResult};
use crate::vector::{DistanceCalculator, EuclideanDistance, FeatureSet, VectorItem};

/// The closest pair found in a collection.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NearestPair<K = usize> {
    pub first: K,
    pub second: K,
    /// Position of `first` in the input; always less than `second_index`.
    pub first_index: usize,
    pub second_index: usize,
    pub distance: f64,
}

type Candidate = (OrderedFloat<f64>, usize, usize);

fn check_insufficient<K>(items: &[VectorItem<K>]) -> PairResult<()> {
    if items.len() < 2 {
        return Err(PairError::InsufficientItems { found: items.len() });
    }
    Ok(())
}

fn check_dimensions<K>(items: &[VectorItem<K>]) -> PairResult<()> {
    let expected = items.first().map_or(0, |item| item.dimension());
    match items.iter().position(|item| item.dimension() != expected) {
        Some(index) => Err(PairError::DimensionalityMismatch {
            expected,
            found: items[index].dimension(),
            index,
        }),
        None => Ok(()),
    }
}

fn pair_distance<K>(
    items: &[VectorItem<K>],
    i: usize,
    j: usize,
    calc: &dyn DistanceCalculator,
) -> PairResult<OrderedFloat<f64>> {
    let (a, b) = (&items[i].vector, &items[j].vector);
    if a.len() != b.len() {
        return Err(PairError::DimensionalityMismatch {
            expected: a.len(),
            found: b.len(),
            index: j,
        });
    }
    Ok(OrderedFloat(calc.calculate(a, b)))
}

fn to_pair<K: Clone>(items: &[VectorItem<K>], (distance, i, j): Candidate) -> NearestPair<K> {
    NearestPair {
        first: items[i].id.clone(),
        second: items[j].id.clone(),
        first_index: i,
        second_index: j,
        distance: distance.into_inner(),
    }
}

/// Finds the closest pair, sequentially.
///
/// Vectors are length-checked as each pair is evaluated, so a mismatch is
/// reported at the first offending pair.
pub fn find_nearest_pair<K: Clone>(
    items: &[VectorItem<K>],
    calc: &dyn DistanceCalculator,
) -> PairResult<NearestPair<K>> {
    check_insufficient(items)?;
    let n = items.len();

    let mut best: Option<Candidate> = None;
    for i in 0..n {
        for j in (i + 1)..n {
            let dist = pair_distance(items, i, j, calc)?;
            if best.map_or(true, |(b, _, _)| dist < b) {
                best = Some((dist, i, j));
            }
        }
    }

    // n >= 2 guarantees at least one evaluated pair
    let best = best.ok_or(PairError::InsufficientItems { found: n })?;
    debug!(
        items = n,
        i = best.1,
        j = best.2,
        distance = best.0.into_inner(),
        "nearest pair found"
    );
    Ok(to_pair(items, best))
}

/// Finds the closest pair on the rayon thread pool.
///
/// Dimensions are validated for the whole slice before any distance is
/// computed. The result is identical to [`find_nearest_pair`].
pub fn find_nearest_pair_parallel<K: Clone + Sync>(
    items: &[VectorItem<K>],
    calc: &dyn DistanceCalculator,
) -> PairResult<NearestPair<K>> {
    check_insufficient(items)?;
    check_dimensions(items)?;
    let n = items.len();

    let best = (0..n)
        .into_par_iter()
        .flat_map_iter(|i| ((i + 1)..n).map(move |j| (i, j)))
        .map(|(i, j)| {
            let dist = OrderedFloat(calc.calculate(&items[i].vector, &items[j].vector));
            (dist, i, j)
        })
        .min()
        .ok_or(PairError::InsufficientItems { found: n })?;

    debug!(
        items = n,
        i = best.1,
        j = best.2,
        distance = best.0.into_inner(),
        "nearest pair found (parallel)"
    );
    Ok(to_pair(items, best))
}

fn pair_count(n: usize) -> usize {
    n.saturating_mul(n.saturating_sub(1)) / 2
}

// Keeps the `k` smallest candidates in a max-heap.
fn push_bounded(top: &mut BinaryHeap<Candidate>, candidate: Candidate, k: usize) {
    top.push(candidate);
    if top.len() > k {
        top.pop();
    }
}

fn into_ranked<K: Clone>(
    items: &[VectorItem<K>],
    top: BinaryHeap<Candidate>,
) -> Vec<NearestPair<K>> {
    top.into_sorted_vec()
        .into_iter()
        .map(|candidate| to_pair(items, candidate))
        .collect()
}

/// Returns the `k` closest pairs in ascending distance order.
///
/// Ordering and tie-break follow [`find_nearest_pair`], so the first entry is
/// always the nearest pair. `k == 0` yields an empty list; `k` larger than
/// the number of pairs yields every pair.
pub fn closest_pairs<K: Clone>(
    items: &[VectorItem<K>],
    calc: &dyn DistanceCalculator,
    k: usize,
) -> PairResult<Vec<NearestPair<K>>> {
    check_insufficient(items)?;
    let n = items.len();
    let k = k.min(pair_count(n));

    let mut top: BinaryHeap<Candidate> = BinaryHeap::with_capacity(k + 1);
    for i in 0..n {
        for j in (i + 1)..n {
            let dist = pair_distance(items, i, j, calc)?;
            if k > 0 {
                push_bounded(&mut top, (dist, i, j), k);
            }
        }
    }

    Ok(into_ranked(items, top))
}

/// [`closest_pairs`] on the rayon thread pool. Each worker keeps its own
/// bounded heap and the heaps are merged at the end; the result is identical
/// to the sequential ranking.
pub fn closest_pairs_parallel<K: Clone + Sync>(
    items: &[VectorItem<K>],
    calc: &dyn DistanceCalculator,
    k: usize,
) -> PairResult<Vec<NearestPair<K>>> {
    check_insufficient(items)?;
    check_dimensions(items)?;
    let n = items.len();
    let k = k.min(pair_count(n));
    if k == 0 {
        return Ok(Vec::new());
    }

    let top = (0..n)
        .into_par_iter()
        .flat_map_iter(|i| ((i + 1)..n).map(move |j| (i, j)))
        .fold(BinaryHeap::new, |mut top, (i, j)| {
            let dist = OrderedFloat(calc.calculate(&items[i].vector, &items[j].vector));
            push_bounded(&mut top, (dist, i, j), k);
            top
        })
        .reduce(BinaryHeap::new, |mut left, right| {
            for candidate in right {
                push_bounded(&mut left, candidate, k);
            }
            left
        });

    Ok(into_ranked(items, top))
}

/// Nearest-pair search over a validated [`FeatureSet`] with a fixed metric.
pub struct PairFinder {
    distance_calculator: Box<dyn DistanceCalculator>,
    parallel: bool,
}

impl Default for PairFinder {
    fn default() -> Self {
        PairFinder::new(Box::new(EuclideanDistance))
    }
}

impl PairFinder {
    pub fn new(distance_calculator: Box<dyn DistanceCalculator>) -> Self {
        PairFinder { distance_calculator, parallel: false }
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn is_parallel(&self) -> bool {
        self.parallel
    }

    pub fn nearest_pair<K: Clone + Sync>(&self, set: &FeatureSet<K>) -> PairResult<NearestPair<K>> {
        if self.parallel {
            find_nearest_pair_parallel(set.items(), self.distance_calculator.as_ref())
        } else {
            find_nearest_pair(set.items(), self.distance_calculator.as_ref())
        }
    }

    pub fn closest_pairs<K: Clone + Sync>(
        &self,
        set: &FeatureSet<K>,
        k: usize,
    ) -> PairResult<Vec<NearestPair<K>>> {
        if self.parallel {
            closest_pairs_parallel(set.items(), self.distance_calculator.as_ref(), k)
        } else {
            closest_pairs(set.items(), self.distance_calculator.as_ref(), k)
        }
    }
}
