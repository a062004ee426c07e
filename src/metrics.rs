// Per-group statistics.
//
// Every metric has a defined value for empty input (0) so report fields are
// never null and never NaN. Null cells are filtered out by the caller before
// reaching these functions, usually through `present_numbers`.
use crate::coerce::as_number;
use crate::value::{field, Row};
use indexmap::IndexMap;
use std::collections::HashSet;
use std::hash::Hash;

/// Numeric values of `column` across `rows`, skipping nulls and junk.
pub fn present_numbers<'r, I>(rows: I, column: &str) -> Vec<f64>
where
    I: IntoIterator<Item = &'r Row>,
{
    rows.into_iter()
        .filter_map(|r| as_number(field(r, column)))
        .collect()
}

pub fn average(v: &[f64]) -> f64 {
    // Standard arithmetic mean; returns 0 for an empty slice to avoid NaNs.
    if v.is_empty() {
        return 0.0;
    }
    let sum: f64 = v.iter().copied().sum();
    sum / v.len() as f64
}

/// `matching / total * 100`, or 0 when there is nothing to divide by.
pub fn ratio_pct(matching: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    matching as f64 / total as f64 * 100.0
}

pub fn min(v: &[f64]) -> f64 {
    v.iter().copied().reduce(f64::min).unwrap_or(0.0)
}

pub fn max(v: &[f64]) -> f64 {
    v.iter().copied().reduce(f64::max).unwrap_or(0.0)
}

/// Sample standard deviation (n - 1 denominator); 0 below two values.
pub fn sample_std_dev(v: &[f64]) -> f64 {
    if v.len() < 2 {
        return 0.0;
    }
    let mean = average(v);
    let sum_sq: f64 = v.iter().map(|x| (x - mean).powi(2)).sum();
    (sum_sq / (v.len() - 1) as f64).sqrt()
}

/// Number of distinct non-null keys.
pub fn distinct_count<K, I>(keys: I) -> usize
where
    K: Hash + Eq,
    I: IntoIterator<Item = Option<K>>,
{
    keys.into_iter().flatten().collect::<HashSet<K>>().len()
}

/// Occurrence counts in first-seen order.
pub fn tally<K, I>(keys: I) -> IndexMap<K, u64>
where
    K: Hash + Eq,
    I: IntoIterator<Item = K>,
{
    let mut counts: IndexMap<K, u64> = IndexMap::new();
    for k in keys {
        *counts.entry(k).or_insert(0) += 1;
    }
    counts
}

/// The `n` most frequent keys of a tally, ties going to the smaller key,
/// returned in ascending key order.
pub fn top_n_keys<K>(counts: &IndexMap<K, u64>, n: usize) -> Vec<K>
where
    K: Hash + Eq + Ord + Clone,
{
    let mut ranked: Vec<(&K, &u64)> = counts.iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));
    let mut top: Vec<K> = ranked.into_iter().take(n).map(|(k, _)| k.clone()).collect();
    top.sort();
    top
}
